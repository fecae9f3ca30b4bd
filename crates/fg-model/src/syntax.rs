//! Attribute value syntaxes.
//!
//! Values are stored as raw strings; equality depends on the syntax. Two
//! integer values `"007"` and `"7"` are equal, two string values are not.

/// Free-form string, compared exactly.
pub const STRING: &str = "string";
/// Email address, the domain part is case-insensitive.
pub const EMAIL: &str = "email";
/// Signed integer.
pub const INTEGER: &str = "integer";
/// Floating point number.
pub const FLOATING_POINT: &str = "floatingPoint";
/// Boolean.
pub const BOOLEAN: &str = "boolean";

/// Compares two raw values under the given syntax.
///
/// Unknown syntaxes, and values that do not parse under their syntax, fall
/// back to exact string comparison.
#[must_use]
pub fn values_equal(syntax: &str, a: &str, b: &str) -> bool {
    match syntax {
        EMAIL => emails_equal(a, b),
        INTEGER => match (a.trim().parse::<i64>(), b.trim().parse::<i64>()) {
            (Ok(x), Ok(y)) => x == y,
            _ => a == b,
        },
        FLOATING_POINT => match (a.trim().parse::<f64>(), b.trim().parse::<f64>()) {
            (Ok(x), Ok(y)) => x == y,
            _ => a == b,
        },
        BOOLEAN => match (parse_bool(a), parse_bool(b)) {
            (Some(x), Some(y)) => x == y,
            _ => a == b,
        },
        _ => a == b,
    }
}

fn emails_equal(a: &str, b: &str) -> bool {
    match (a.rsplit_once('@'), b.rsplit_once('@')) {
        (Some((local_a, domain_a)), Some((local_b, domain_b))) => {
            local_a == local_b && domain_a.eq_ignore_ascii_case(domain_b)
        }
        _ => a == b,
    }
}

fn parse_bool(v: &str) -> Option<bool> {
    match v.trim().to_ascii_lowercase().as_str() {
        "true" => Some(true),
        "false" => Some(false),
        _ => None,
    }
}
