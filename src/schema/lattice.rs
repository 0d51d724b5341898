//! Type compatibility between observed value types
//!
//! `convert_type` is the join of the type lattice: it returns the least
//! general type both arguments fit in, or `None` when no such type exists.
//! Every other part of the crate asks this module whether two types mix.

use super::types::{ScalarType, ValueType};

/// Return the compatible type of `a` and `b`, or `None` if they are
/// incompatible. Conversions, in order of precedence:
///
/// * type + type => type
/// * [Q]BOOLEAN + [Q]BOOLEAN => BOOLEAN
/// * [Q]INTEGER + [Q]INTEGER => INTEGER
/// * [Q]FLOAT + [Q]FLOAT => FLOAT
/// * QINTEGER + QFLOAT => QFLOAT
/// * [Q]INTEGER + [Q]FLOAT => FLOAT (except QINTEGER + QFLOAT)
/// * any two of (STRING, TIMESTAMP, DATE, TIME, QBOOLEAN, QINTEGER, QFLOAT)
///   => STRING
///
/// RECORD and the sentinel tags only join with themselves.
pub fn convert_type(a: ValueType, b: ValueType) -> Option<ValueType> {
    if a == b {
        return Some(a);
    }
    match (a, b) {
        (ValueType::Scalar(a), ValueType::Scalar(b)) => join_scalar(a, b).map(ValueType::Scalar),
        _ => None,
    }
}

/// Join two primitive types
pub fn join_scalar(a: ScalarType, b: ScalarType) -> Option<ScalarType> {
    use ScalarType::{Boolean, Float, Integer, QBoolean, QFloat, QInteger};

    if a == b {
        return Some(a);
    }

    match (a, b) {
        (Boolean, QBoolean) | (QBoolean, Boolean) => Some(Boolean),
        (Integer, QInteger) | (QInteger, Integer) => Some(Integer),
        (Float, QFloat) | (QFloat, Float) => Some(Float),

        // Both sides quoted: stays quoted
        (QInteger, QFloat) | (QFloat, QInteger) => Some(QFloat),

        (Integer, Float) | (Float, Integer) => Some(Float),
        (Integer, QFloat) | (QFloat, Integer) => Some(Float),
        (QInteger, Float) | (Float, QInteger) => Some(Float),

        (a, b) if is_string_type(a) && is_string_type(b) => Some(ScalarType::String),

        _ => None,
    }
}

/// True for the types that can always fall back to STRING
pub fn is_string_type(t: ScalarType) -> bool {
    matches!(
        t,
        ScalarType::String
            | ScalarType::Timestamp
            | ScalarType::Date
            | ScalarType::Time
            | ScalarType::QInteger
            | ScalarType::QFloat
            | ScalarType::QBoolean
    )
}
