use itertools::Itertools;
use std::fmt;

/// Runtime value types used during predicate evaluation.
///
/// Every coercion below is total: anything that cannot be interpreted
/// falls back to `0` or `false` instead of failing.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum Value {
    /// An identifier that is not present in the context.
    #[default]
    Undefined,
    Null,
    Bool(bool),
    Number(f64),
    Str(String),
}

impl Value {
    /// Numeric coercion used by arithmetic and relational operators.
    pub fn coerce_number(&self) -> f64 {
        match self {
            Value::Number(n) => *n,
            Value::Bool(b) => {
                if *b {
                    1.0
                } else {
                    0.0
                }
            }
            Value::Str(s) => parse_number(s).filter(|n| n.is_finite()).unwrap_or(0.0),
            Value::Undefined | Value::Null => 0.0,
        }
    }

    /// Truthiness used by `!`, `&&`, `||` and the final predicate result.
    pub fn is_truthy(&self) -> bool {
        match self {
            Value::Undefined | Value::Null => false,
            Value::Bool(b) => *b,
            Value::Number(n) => *n != 0.0 && !n.is_nan(),
            Value::Str(s) => !s.is_empty(),
        }
    }

    /// Equality without coercion: same variant and same payload.
    pub fn strict_eq(&self, other: &Value) -> bool {
        match (self, other) {
            (Value::Undefined, Value::Undefined) | (Value::Null, Value::Null) => true,
            (Value::Bool(a), Value::Bool(b)) => a == b,
            (Value::Number(a), Value::Number(b)) => a == b,
            (Value::Str(a), Value::Str(b)) => a == b,
            _ => false,
        }
    }

    /// Equality on the string representation of both sides, so `"5" == 5`.
    pub fn loose_eq(&self, other: &Value) -> bool {
        self.to_string() == other.to_string()
    }

    pub fn type_name(&self) -> &'static str {
        match self {
            Value::Undefined => "undefined",
            Value::Null => "null",
            Value::Bool(_) => "boolean",
            Value::Number(_) => "number",
            Value::Str(_) => "string",
        }
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Bool(b)
    }
}

impl From<f64> for Value {
    fn from(n: f64) -> Self {
        Value::Number(n)
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::Str(s.to_string())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::Str(s)
    }
}

impl From<&serde_json::Value> for Value {
    fn from(json: &serde_json::Value) -> Self {
        match json {
            serde_json::Value::Null => Value::Null,
            serde_json::Value::Bool(b) => Value::Bool(*b),
            serde_json::Value::Number(n) => Value::Number(n.as_f64().unwrap_or(0.0)),
            serde_json::Value::String(s) => Value::Str(s.clone()),
            composite => Value::Str(composite_text(composite)),
        }
    }
}

/// Text of an array or object as the editor stringifies it: array elements
/// joined by `,` with `null` left empty, objects as `[object Object]`.
fn composite_text(json: &serde_json::Value) -> String {
    match json {
        serde_json::Value::Null => String::new(),
        serde_json::Value::Array(items) => items.iter().map(composite_text).join(","),
        serde_json::Value::Object(_) => "[object Object]".to_string(),
        scalar => Value::from(scalar).to_string(),
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Undefined => write!(f, "undefined"),
            Value::Null => write!(f, "null"),
            Value::Bool(b) => write!(f, "{}", b),
            Value::Number(n) => write!(f, "{}", format_number(*n)),
            Value::Str(s) => write!(f, "{}", s),
        }
    }
}

/// Renders a number the way the editor displays it: integers without a
/// fraction, `Infinity`/`NaN` spelled out, exponent form outside `[1e-6, 1e21)`.
pub fn format_number(n: f64) -> String {
    if n.is_nan() {
        return "NaN".to_string();
    }
    if n.is_infinite() {
        return if n > 0.0 { "Infinity" } else { "-Infinity" }.to_string();
    }
    if n == 0.0 {
        return "0".to_string();
    }
    let magnitude = n.abs();
    if !(1e-6..1e21).contains(&magnitude) {
        let formatted = format!("{:e}", n);
        return match formatted.split_once('e') {
            Some((mantissa, exp)) if !exp.starts_with('-') => format!("{}e+{}", mantissa, exp),
            _ => formatted,
        };
    }
    format!("{}", n)
}

/// Parses numeric text: decimal (with optional exponent) or a `0x`/`0o`/`0b`
/// prefixed integer. Surrounding whitespace is ignored and blank text is `0`.
fn parse_number(text: &str) -> Option<f64> {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        return Some(0.0);
    }
    let radix = match trimmed.get(..2) {
        Some("0x") | Some("0X") => Some(16),
        Some("0o") | Some("0O") => Some(8),
        Some("0b") | Some("0B") => Some(2),
        _ => None,
    };
    if let Some(radix) = radix {
        return u64::from_str_radix(&trimmed[2..], radix)
            .ok()
            .map(|n| n as f64);
    }
    // Rust accepts spellings like "inf" and "nan" that are not numeric text here.
    if trimmed
        .chars()
        .any(|c| c.is_ascii_alphabetic() && c != 'e' && c != 'E')
    {
        return None;
    }
    trimmed.parse::<f64>().ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn numeric_coercion_falls_back_to_zero() {
        assert_eq!(Value::Str("12.5".into()).coerce_number(), 12.5);
        assert_eq!(Value::Str(" 7 ".into()).coerce_number(), 7.0);
        assert_eq!(Value::Str("abc".into()).coerce_number(), 0.0);
        assert_eq!(Value::Str("Infinity".into()).coerce_number(), 0.0);
        assert_eq!(Value::Str("0x10".into()).coerce_number(), 16.0);
        assert_eq!(Value::Bool(true).coerce_number(), 1.0);
        assert_eq!(Value::Undefined.coerce_number(), 0.0);
        assert_eq!(Value::Null.coerce_number(), 0.0);
    }

    #[test]
    fn truthiness() {
        assert!(!Value::Undefined.is_truthy());
        assert!(!Value::Number(0.0).is_truthy());
        assert!(!Value::Number(f64::NAN).is_truthy());
        assert!(!Value::Str(String::new()).is_truthy());
        assert!(Value::Str("false".into()).is_truthy());
        assert!(Value::Number(-2.0).is_truthy());
    }

    #[test]
    fn number_formatting() {
        assert_eq!(format_number(5.0), "5");
        assert_eq!(format_number(-0.0), "0");
        assert_eq!(format_number(2.5), "2.5");
        assert_eq!(format_number(f64::INFINITY), "Infinity");
        assert_eq!(format_number(1e21), "1e+21");
    }

    #[test]
    fn loose_and_strict_equality() {
        assert!(Value::Str("5".into()).loose_eq(&Value::Number(5.0)));
        assert!(!Value::Str("5".into()).strict_eq(&Value::Number(5.0)));
        assert!(Value::Bool(true).loose_eq(&Value::Str("true".into())));
        assert!(!Value::Number(f64::NAN).strict_eq(&Value::Number(f64::NAN)));
        assert!(!Value::Null.strict_eq(&Value::Undefined));
    }

    #[test]
    fn composite_json_is_stringified_like_the_editor() {
        let json: serde_json::Value =
            serde_json::from_str(r#"[1, [2.5, "a"], null, true, {"k": 1}]"#).unwrap();
        assert_eq!(
            Value::from(&json),
            Value::Str("1,2.5,a,,true,[object Object]".into())
        );

        let array = Value::from(&serde_json::json!([1, 2]));
        assert!(array.loose_eq(&Value::Str("1,2".into())));
        assert!(!array.strict_eq(&Value::Str("[1,2]".into())));
        assert_eq!(
            Value::from(&serde_json::json!({"a": 1})),
            Value::Str("[object Object]".into())
        );
    }
}
