//! Converter catalog: from declared type names to typed cell values.
//!
//! The catalog is a read-only, process-wide table built once on first use.
//! Resolution happens once per column when the type header is parsed; the
//! resolved [`Converter`] is then applied to every row of that column. An
//! unknown type resolves to no converter at all and the decoded text passes
//! through untouched; one exotic column must never fail a whole query.

use std::collections::HashMap;
use std::net::{Ipv4Addr, Ipv6Addr};

use bigdecimal::BigDecimal;
use chrono::{NaiveDate, NaiveDateTime};
use num_bigint::BigInt;
use once_cell::sync::Lazy;
use serde::{Serialize, Serializer};

use crate::error::ConvertError;
use crate::types::descriptor::TypeDescriptor;

/// Wire sentinel for a NULL `Date`.
pub const DATE_NULL: &str = "0000-00-00";
/// Wire sentinel for a NULL `DateTime`.
pub const DATETIME_NULL: &str = "0000-00-00 00:00:00";

/// Width of the second-precision datetime format, `YYYY-MM-DD HH:MM:SS`.
const DATETIME_SECONDS_LEN: usize = 19;

/// A decoded cell value.
///
/// Integer widths up to 64 bits use machine integers, the 128-bit widths
/// use Rust's native `i128`/`u128`, and the 256-bit widths fall back to an
/// arbitrary-precision integer so no declared width ever truncates.
/// Decimals keep their exact digits.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    /// NULL, from the `\N` sentinel or a type-specific zero sentinel.
    Null,
    /// Signed integers up to `Int64`.
    Int(i64),
    /// Unsigned integers up to `UInt64`.
    UInt(u64),
    /// `Int128`.
    Int128(i128),
    /// `UInt128`.
    UInt128(u128),
    /// `Int256` / `UInt256`, arbitrary precision.
    BigInt(BigInt),
    /// `Float32` / `Float64`.
    Float(f64),
    /// `Decimal(P, S)` and friends, exact digits preserved.
    Decimal(BigDecimal),
    /// `Date`.
    Date(NaiveDate),
    /// `DateTime` / `DateTime64`.
    DateTime(NaiveDateTime),
    /// `IPv4`.
    Ipv4(Ipv4Addr),
    /// `IPv6`.
    Ipv6(Ipv6Addr),
    /// Pass-through text for unconverted columns.
    Text(String),
}

impl Value {
    /// Whether this value is NULL.
    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }
}

// Numbers that fit a JSON number serialize as numbers; the wide and exact
// kinds serialize as strings so no serializer is forced to round them.
impl Serialize for Value {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Value::Null => serializer.serialize_unit(),
            Value::Int(v) => serializer.serialize_i64(*v),
            Value::UInt(v) => serializer.serialize_u64(*v),
            Value::Int128(v) => serializer.collect_str(v),
            Value::UInt128(v) => serializer.collect_str(v),
            Value::BigInt(v) => serializer.collect_str(v),
            Value::Float(v) => serializer.serialize_f64(*v),
            Value::Decimal(v) => serializer.collect_str(v),
            Value::Date(v) => v.serialize(serializer),
            Value::DateTime(v) => v.serialize(serializer),
            Value::Ipv4(v) => v.serialize(serializer),
            Value::Ipv6(v) => v.serialize(serializer),
            Value::Text(v) => serializer.serialize_str(v),
        }
    }
}

/// A resolved cell converter, constructed once per column.
///
/// `Nullable` holds its resolved inner converter, so nothing re-parses the
/// type string while rows stream.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Converter {
    /// `Int8` .. `Int64`.
    Int,
    /// `UInt8` .. `UInt64`.
    UInt,
    /// `Int128`.
    Int128,
    /// `UInt128`.
    UInt128,
    /// `Int256` / `UInt256`.
    BigInt,
    /// `Float32` / `Float64`.
    Float,
    /// `Decimal` in every declared width.
    Decimal,
    /// `Date`, with the all-zero sentinel mapping to NULL.
    Date,
    /// `DateTime` / `DateTime64`, with the all-zero sentinel mapping to NULL.
    DateTime,
    /// `IPv4`.
    Ipv4,
    /// `IPv6`.
    Ipv6,
    /// `Nothing`; every value is NULL.
    Nothing,
    /// `Nullable(T)` delegating to the resolved inner converter.
    Nullable(Box<Converter>),
}

impl Converter {
    /// Convert one decoded field into a typed value.
    ///
    /// The `\N` sentinel never reaches a converter (the tokenizer maps it
    /// to NULL first), so the input here is always actual field text.
    pub fn convert(&self, raw: &str) -> Result<Value, ConvertError> {
        match self {
            Converter::Int => raw
                .parse::<i64>()
                .map(Value::Int)
                .map_err(|e| ConvertError::new("Int", raw, e)),
            Converter::UInt => raw
                .parse::<u64>()
                .map(Value::UInt)
                .map_err(|e| ConvertError::new("UInt", raw, e)),
            Converter::Int128 => raw
                .parse::<i128>()
                .map(Value::Int128)
                .map_err(|e| ConvertError::new("Int128", raw, e)),
            Converter::UInt128 => raw
                .parse::<u128>()
                .map(Value::UInt128)
                .map_err(|e| ConvertError::new("UInt128", raw, e)),
            Converter::BigInt => raw
                .parse::<BigInt>()
                .map(Value::BigInt)
                .map_err(|e| ConvertError::new("Int256", raw, e)),
            Converter::Float => raw
                .parse::<f64>()
                .map(Value::Float)
                .map_err(|e| ConvertError::new("Float", raw, e)),
            Converter::Decimal => raw
                .parse::<BigDecimal>()
                .map(Value::Decimal)
                .map_err(|e| ConvertError::new("Decimal", raw, e)),
            Converter::Date => {
                if raw == DATE_NULL {
                    Ok(Value::Null)
                } else {
                    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
                        .map(Value::Date)
                        .map_err(|e| ConvertError::new("Date", raw, e))
                }
            }
            Converter::DateTime => {
                if raw == DATETIME_NULL {
                    Ok(Value::Null)
                } else if raw.len() > DATETIME_SECONDS_LEN {
                    NaiveDateTime::parse_from_str(raw, "%Y-%m-%d %H:%M:%S%.f")
                        .map(Value::DateTime)
                        .map_err(|e| ConvertError::new("DateTime", raw, e))
                } else {
                    NaiveDateTime::parse_from_str(raw, "%Y-%m-%d %H:%M:%S")
                        .map(Value::DateTime)
                        .map_err(|e| ConvertError::new("DateTime", raw, e))
                }
            }
            Converter::Ipv4 => raw
                .parse::<Ipv4Addr>()
                .map(Value::Ipv4)
                .map_err(|e| ConvertError::new("IPv4", raw, e)),
            Converter::Ipv6 => raw
                .parse::<Ipv6Addr>()
                .map(Value::Ipv6)
                .map_err(|e| ConvertError::new("IPv6", raw, e)),
            Converter::Nothing => Ok(Value::Null),
            Converter::Nullable(inner) => inner.convert(raw),
        }
    }
}

static CONVERTERS: Lazy<HashMap<&'static str, Converter>> = Lazy::new(|| {
    HashMap::from([
        ("Int8", Converter::Int),
        ("Int16", Converter::Int),
        ("Int32", Converter::Int),
        ("Int64", Converter::Int),
        ("UInt8", Converter::UInt),
        ("UInt16", Converter::UInt),
        ("UInt32", Converter::UInt),
        ("UInt64", Converter::UInt),
        ("Int128", Converter::Int128),
        ("UInt128", Converter::UInt128),
        ("Int256", Converter::BigInt),
        ("UInt256", Converter::BigInt),
        ("Float32", Converter::Float),
        ("Float64", Converter::Float),
        ("Decimal", Converter::Decimal),
        ("Date", Converter::Date),
        ("DateTime", Converter::DateTime),
        ("DateTime64", Converter::DateTime),
        ("IPv4", Converter::Ipv4),
        ("IPv6", Converter::Ipv6),
        ("Nothing", Converter::Nothing),
    ])
});

/// Resolve a declared type string to its converter.
///
/// Returns `None` for unrecognized types, which makes the column pass
/// through as decoded text.
pub fn resolve(type_str: &str) -> Option<Converter> {
    resolve_descriptor(&TypeDescriptor::parse(type_str))
}

/// Resolve an already-parsed descriptor.
pub fn resolve_descriptor(descriptor: &TypeDescriptor) -> Option<Converter> {
    match descriptor {
        TypeDescriptor::Simple(name) => lookup(name),
        TypeDescriptor::Parameterized { name, .. } => lookup(name),
        TypeDescriptor::Nullable(inner) => {
            resolve_descriptor(inner).map(|c| Converter::Nullable(Box::new(c)))
        }
    }
}

fn lookup(name: &str) -> Option<Converter> {
    if let Some(converter) = CONVERTERS.get(name) {
        return Some(converter.clone());
    }
    // Width-suffixed spellings, e.g. DateTime64(3) declared with extra
    // arguments, or Decimal32(9) / Decimal256(76, 10).
    if name.starts_with("DateTime64") {
        return Some(Converter::DateTime);
    }
    if name.starts_with("Decimal") {
        return Some(Converter::Decimal);
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    fn convert(type_str: &str, raw: &str) -> Value {
        resolve(type_str)
            .unwrap_or_else(|| panic!("{} must resolve", type_str))
            .convert(raw)
            .unwrap()
    }

    #[test]
    fn test_integer_widths() {
        assert_eq!(convert("Int8", "-128"), Value::Int(-128));
        assert_eq!(convert("Int64", "9223372036854775807"), Value::Int(i64::MAX));
        assert_eq!(convert("UInt64", "18446744073709551615"), Value::UInt(u64::MAX));
        assert_eq!(
            convert("Int128", "170141183460469231731687303715884105727"),
            Value::Int128(i128::MAX)
        );
        assert_eq!(
            convert("UInt128", "340282366920938463463374607431768211455"),
            Value::UInt128(u128::MAX)
        );
    }

    #[test]
    fn test_256_bit_widths_are_exact() {
        // Larger than any machine integer; must survive digit-for-digit.
        let huge = "57896044618658097711785492504343953926634992332820282019728792003956564819967";
        assert_eq!(
            convert("Int256", huge),
            Value::BigInt(BigInt::from_str(huge).unwrap())
        );
        assert_eq!(
            convert("UInt256", "1"),
            Value::BigInt(BigInt::from_str("1").unwrap())
        );
    }

    #[test]
    fn test_floats() {
        assert_eq!(convert("Float32", "1.5"), Value::Float(1.5));
        assert_eq!(convert("Float64", "-0.25"), Value::Float(-0.25));
    }

    #[test]
    fn test_decimal_preserves_exact_digits() {
        let value = convert("Decimal(18, 4)", "12.3400");
        assert_eq!(value, Value::Decimal(BigDecimal::from_str("12.34").unwrap()));
        // Not a float: 0.1 + 0.2 style drift cannot occur.
        let value = convert("Decimal(38, 10)", "0.3000000000");
        assert_eq!(value, Value::Decimal(BigDecimal::from_str("0.3").unwrap()));
    }

    #[test]
    fn test_decimal_width_spellings() {
        assert!(resolve("Decimal32(9)").is_some());
        assert!(resolve("Decimal256(76, 10)").is_some());
        assert_eq!(
            convert("Decimal256(76, 2)", "123456789012345678901234567890.12"),
            Value::Decimal(
                BigDecimal::from_str("123456789012345678901234567890.12").unwrap()
            )
        );
    }

    #[test]
    fn test_date_and_sentinel() {
        assert_eq!(
            convert("Date", "2024-02-29"),
            Value::Date(NaiveDate::from_ymd_opt(2024, 2, 29).unwrap())
        );
        assert_eq!(convert("Date", DATE_NULL), Value::Null);
    }

    #[test]
    fn test_datetime_second_and_subsecond() {
        let seconds = NaiveDate::from_ymd_opt(2023, 1, 2)
            .unwrap()
            .and_hms_opt(3, 4, 5)
            .unwrap();
        assert_eq!(convert("DateTime", "2023-01-02 03:04:05"), Value::DateTime(seconds));

        let micros = NaiveDate::from_ymd_opt(2023, 1, 2)
            .unwrap()
            .and_hms_micro_opt(3, 4, 5, 123456)
            .unwrap();
        assert_eq!(
            convert("DateTime64(6)", "2023-01-02 03:04:05.123456"),
            Value::DateTime(micros)
        );
        assert_eq!(convert("DateTime", DATETIME_NULL), Value::Null);
    }

    #[test]
    fn test_ip_addresses() {
        assert_eq!(
            convert("IPv4", "10.0.0.1"),
            Value::Ipv4(Ipv4Addr::new(10, 0, 0, 1))
        );
        assert_eq!(convert("IPv6", "::1"), Value::Ipv6(Ipv6Addr::LOCALHOST));
    }

    #[test]
    fn test_nothing_is_always_null() {
        assert_eq!(convert("Nothing", "whatever"), Value::Null);
    }

    #[test]
    fn test_nullable_delegates_for_every_base_type() {
        let cases = [
            ("Nullable(Int32)", "42", Value::Int(42)),
            ("Nullable(UInt8)", "7", Value::UInt(7)),
            ("Nullable(Float64)", "2.5", Value::Float(2.5)),
            (
                "Nullable(Decimal(10, 2))",
                "1.50",
                Value::Decimal(BigDecimal::from_str("1.5").unwrap()),
            ),
            (
                "Nullable(Date)",
                "2020-05-17",
                Value::Date(NaiveDate::from_ymd_opt(2020, 5, 17).unwrap()),
            ),
            (
                "Nullable(IPv4)",
                "127.0.0.1",
                Value::Ipv4(Ipv4Addr::LOCALHOST),
            ),
        ];
        for (type_str, raw, expected) in cases {
            assert_eq!(convert(type_str, raw), expected, "type {}", type_str);
        }
    }

    #[test]
    fn test_nullable_inner_sentinels_still_apply() {
        assert_eq!(convert("Nullable(Date)", DATE_NULL), Value::Null);
        assert_eq!(convert("Nullable(DateTime)", DATETIME_NULL), Value::Null);
    }

    #[test]
    fn test_unknown_types_resolve_to_none() {
        assert!(resolve("String").is_none());
        assert!(resolve("Array(Int64)").is_none());
        assert!(resolve("Map(String, UInt64)").is_none());
        // Nullable of an unknown inner type passes through as well.
        assert!(resolve("Nullable(String)").is_none());
    }

    #[test]
    fn test_conversion_error_carries_context() {
        let err = resolve("Int64").unwrap().convert("abc").unwrap_err();
        assert!(err.to_string().contains("abc"));
        assert_eq!(err.type_name, "Int");
    }

    #[test]
    fn test_value_serialization() {
        let row = vec![
            Value::Null,
            Value::Int(-5),
            Value::UInt(5),
            Value::BigInt(BigInt::from_str("123456789012345678901234567890").unwrap()),
            Value::Decimal(BigDecimal::from_str("12.3400").unwrap()),
            Value::Text("plain".to_string()),
            Value::Ipv4(Ipv4Addr::new(192, 168, 0, 1)),
        ];
        let json = serde_json::to_string(&row).unwrap();
        assert_eq!(
            json,
            "[null,-5,5,\"123456789012345678901234567890\",\"12.3400\",\"plain\",\"192.168.0.1\"]"
        );
    }
}
