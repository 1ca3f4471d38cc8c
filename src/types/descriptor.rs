//! Parsed form of a declared column type string.
//!
//! ClickHouse announces column types as strings following a small grammar:
//! a bare identifier (`Int64`), a parameterized name (`Decimal(18, 4)`,
//! `DateTime64(3)`), or the structural wrapper `Nullable(T)` around another
//! type. Each declared type is parsed exactly once per query, when the type
//! header line arrives; decoding rows then dispatches on the parsed variant
//! instead of re-matching raw strings.

/// A declared column type, classified once at header-parse time.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TypeDescriptor {
    /// Bare identifier, e.g. `Int64`.
    Simple(String),
    /// Name with parenthesized arguments, e.g. `Decimal(18, 4)`.
    Parameterized {
        /// The name before the opening parenthesis.
        name: String,
        /// Top-level arguments, trimmed, quotes preserved.
        args: Vec<String>,
    },
    /// `Nullable(T)` wrapping another descriptor.
    Nullable(Box<TypeDescriptor>),
}

impl TypeDescriptor {
    /// Parse a declared type string.
    ///
    /// Never fails: anything that does not match the
    /// `Name(args...)` shape is kept verbatim as [`TypeDescriptor::Simple`]
    /// and left to the catalog to recognize (or pass through).
    pub fn parse(type_str: &str) -> TypeDescriptor {
        let type_str = type_str.trim();
        let open = match type_str.find('(') {
            Some(pos) if pos > 0 && type_str.ends_with(')') => pos,
            _ => return TypeDescriptor::Simple(type_str.to_string()),
        };

        let name = &type_str[..open];
        let inner = &type_str[open + 1..type_str.len() - 1];

        if name == "Nullable" {
            TypeDescriptor::Nullable(Box::new(TypeDescriptor::parse(inner)))
        } else {
            TypeDescriptor::Parameterized {
                name: name.to_string(),
                args: split_args(inner),
            }
        }
    }

    /// The type name this descriptor dispatches on.
    pub fn name(&self) -> &str {
        match self {
            TypeDescriptor::Simple(name) => name,
            TypeDescriptor::Parameterized { name, .. } => name,
            TypeDescriptor::Nullable(_) => "Nullable",
        }
    }
}

/// Split a parenthesized argument list on top-level commas.
///
/// Commas inside nested parentheses or single-quoted strings do not split,
/// so `Decimal(18, 4)` inside an argument list or a quoted timezone like
/// `DateTime64(3, 'Asia/Istanbul')` stays intact.
fn split_args(args: &str) -> Vec<String> {
    let mut out = Vec::new();
    let mut depth = 0usize;
    let mut in_quote = false;
    let mut start = 0;

    for (pos, c) in args.char_indices() {
        match c {
            '\'' => in_quote = !in_quote,
            '(' if !in_quote => depth += 1,
            ')' if !in_quote => depth = depth.saturating_sub(1),
            ',' if !in_quote && depth == 0 => {
                out.push(args[start..pos].trim().to_string());
                start = pos + 1;
            }
            _ => {}
        }
    }
    let last = args[start..].trim();
    if !last.is_empty() || !out.is_empty() {
        out.push(last.to_string());
    }
    out
}
