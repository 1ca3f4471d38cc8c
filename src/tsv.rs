//! Tokenizer for the TabSeparated text wire format.
//!
//! One response line holds one row: fields separated by tab bytes, values
//! backslash-escaped, NULL encoded as the two-byte sequence `\N`. The
//! tokenizer works on a single line at a time and never assumes the whole
//! response is in memory.

/// The two-byte wire encoding of NULL.
pub const NULL_SENTINEL: &[u8] = b"\\N";

/// How undecodable bytes are handled when a field is turned into text.
///
/// Neither policy fails the row: the wire format is produced by the server
/// and one bad byte must not abort an otherwise valid result stream.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DecodePolicy {
    /// Substitute U+FFFD for invalid byte sequences.
    #[default]
    Replace,
    /// Render each invalid byte as a `\xNN` escape.
    Escape,
}

impl DecodePolicy {
    /// Decode raw field bytes into text under this policy.
    pub fn decode(self, bytes: &[u8]) -> String {
        match self {
            DecodePolicy::Replace => String::from_utf8_lossy(bytes).into_owned(),
            DecodePolicy::Escape => decode_escaping_invalid(bytes),
        }
    }
}

fn decode_escaping_invalid(mut bytes: &[u8]) -> String {
    let mut out = String::with_capacity(bytes.len());
    loop {
        match std::str::from_utf8(bytes) {
            Ok(valid) => {
                out.push_str(valid);
                return out;
            }
            Err(err) => {
                let (valid, rest) = bytes.split_at(err.valid_up_to());
                out.push_str(std::str::from_utf8(valid).unwrap_or_default());
                let skip = err.error_len().unwrap_or(rest.len());
                for b in &rest[..skip] {
                    out.push_str(&format!("\\x{:02x}", b));
                }
                bytes = &rest[skip..];
            }
        }
    }
}

/// Split one raw line into decoded fields.
///
/// `None` entries are NULL cells (`\N` on the wire); every other field is
/// backslash-unescaped and decoded under `policy`.
pub fn parse_tsv(line: &[u8], policy: DecodePolicy) -> Vec<Option<String>> {
    line.split(|&b| b == b'\t')
        .map(|field| {
            if field == NULL_SENTINEL {
                None
            } else {
                Some(policy.decode(&unescape(field)))
            }
        })
        .collect()
}

/// Undo backslash escaping in one raw field.
///
/// Handles the named C-style escapes, `\xHH`, and up to three octal
/// digits. An unrecognized escape keeps the backslash and the byte that
/// follows it; a trailing lone backslash is kept as-is.
pub fn unescape(field: &[u8]) -> Vec<u8> {
    let mut out = Vec::with_capacity(field.len());
    let mut i = 0;
    while i < field.len() {
        let b = field[i];
        if b != b'\\' || i + 1 == field.len() {
            out.push(b);
            i += 1;
            continue;
        }
        let next = field[i + 1];
        i += 2;
        match next {
            b'n' => out.push(b'\n'),
            b't' => out.push(b'\t'),
            b'r' => out.push(b'\r'),
            b'0' if !matches!(field.get(i), Some(b'0'..=b'7')) => out.push(0),
            b'a' => out.push(0x07),
            b'b' => out.push(0x08),
            b'f' => out.push(0x0C),
            b'v' => out.push(0x0B),
            b'\\' => out.push(b'\\'),
            b'\'' => out.push(b'\''),
            b'"' => out.push(b'"'),
            b'x' => {
                let hex = field.get(i..i + 2).and_then(parse_hex_pair);
                match hex {
                    Some(byte) => {
                        out.push(byte);
                        i += 2;
                    }
                    None => out.extend_from_slice(b"\\x"),
                }
            }
            b'0'..=b'7' => {
                // Octal escape, at most three digits including `next`.
                let mut value = (next - b'0') as u32;
                let mut taken = 0;
                while taken < 2 {
                    match field.get(i) {
                        Some(d @ b'0'..=b'7') => {
                            value = value * 8 + (d - b'0') as u32;
                            i += 1;
                            taken += 1;
                        }
                        _ => break,
                    }
                }
                out.push((value & 0xFF) as u8);
            }
            other => {
                out.push(b'\\');
                out.push(other);
            }
        }
    }
    out
}

fn parse_hex_pair(digits: &[u8]) -> Option<u8> {
    let hi = (digits[0] as char).to_digit(16)?;
    let lo = (digits[1] as char).to_digit(16)?;
    Some((hi * 16 + lo) as u8)
}

/// Escape one text value for the wire.
///
/// Inverse of [`unescape`] for values without embedded tabs or newlines in
/// the escaped output; round-trips exactly through [`parse_tsv`].
pub fn escape(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    for c in value.chars() {
        match c {
            '\\' => out.push_str("\\\\"),
            '\t' => out.push_str("\\t"),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\0' => out.push_str("\\0"),
            '\u{8}' => out.push_str("\\b"),
            '\u{c}' => out.push_str("\\f"),
            '\'' => out.push_str("\\'"),
            _ => out.push(c),
        }
    }
    out
}
