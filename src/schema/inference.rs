//! Value type inference from JSON values

use super::lattice::convert_type;
use super::types::{ScalarType, ValueType};
use crate::error::{Error, Result};
use once_cell::sync::Lazy;
use regex::Regex;
use serde_json::{Number, Value};

/// `YYYY-[M]M-[D]D( |T)[H]H:[M]M:[S]S[.DDDDDD][time zone]`
pub static TIMESTAMP_MATCHER: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"^\d{4}-\d{1,2}-\d{1,2}[T ]\d{1,2}:\d{1,2}:\d{1,2}(\.\d{1,6})? *(([+-]\d{1,2}(:\d{1,2})?)|Z|UTC)?$",
    )
    .expect("valid timestamp regex")
});

/// `YYYY-[M]M-[D]D` with month and day in calendar range
pub static DATE_MATCHER: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^\d{4}-(?:[1-9]|0[1-9]|1[012])-(?:[1-9]|0[1-9]|[12][0-9]|3[01])$")
        .expect("valid date regex")
});

/// `[H]H:[M]M:[S]S[.DDDDDD]`
pub static TIME_MATCHER: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\d{1,2}:\d{1,2}:\d{1,2}(\.\d{1,6})?$").expect("valid time regex"));

static INTEGER_MATCHER: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[-+]?\d+$").expect("valid integer regex"));

static FLOAT_MATCHER: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^[-+]?(?:\d+\.?\d*|\.\d+)(?:[eE][-+]?\d+)?$").expect("valid float regex")
});

/// Outcome of reducing an array's elements to a single type
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArrayType {
    /// All elements join to this type
    Uniform(ValueType),
    /// Element `index` has a type incompatible with the elements before it
    Mixed {
        index: usize,
        candidate: ValueType,
        found: ValueType,
    },
}

/// Infers value type tags, honoring the quoted-values setting
#[derive(Debug, Clone, Copy, Default)]
pub struct TypeInferrer {
    /// Quoted values are always STRING (no QINTEGER, QFLOAT, QBOOLEAN)
    quoted_values_are_strings: bool,
}

impl TypeInferrer {
    /// Create an inferrer that inspects values inside quotes
    pub fn new() -> Self {
        Self::default()
    }

    /// Enable/disable treating quoted values as plain strings
    #[must_use]
    pub fn with_quoted_values_are_strings(mut self, enabled: bool) -> Self {
        self.quoted_values_are_strings = enabled;
        self
    }

    /// Infer the type tag of one value
    ///
    /// Integers outside the signed 64-bit range become FLOAT, matching what
    /// the loader accepts. The result carries no mode; callers decide it.
    pub fn infer_value_type(&self, value: &Value) -> ValueType {
        match value {
            Value::String(s) => self.infer_string_type(s).into(),
            Value::Bool(_) => ScalarType::Boolean.into(),
            Value::Number(n) => infer_number_type(n).into(),
            Value::Null => ValueType::Null,
            Value::Object(map) if map.is_empty() => ValueType::EmptyRecord,
            Value::Object(_) => ValueType::Record,
            Value::Array(arr) if arr.is_empty() => ValueType::EmptyArray,
            Value::Array(_) => ValueType::NonEmptyArray,
        }
    }

    /// Infer the type of a string, looking for date/time shapes and (unless
    /// disabled) quoted numbers and booleans
    pub fn infer_string_type(&self, s: &str) -> ScalarType {
        if TIMESTAMP_MATCHER.is_match(s) {
            return ScalarType::Timestamp;
        }
        if DATE_MATCHER.is_match(s) {
            return ScalarType::Date;
        }
        if TIME_MATCHER.is_match(s) {
            return ScalarType::Time;
        }
        if self.quoted_values_are_strings {
            return ScalarType::String;
        }

        if INTEGER_MATCHER.is_match(s) {
            // Out of i64 range still looks numeric to the loader
            return match s.parse::<i64>() {
                Ok(_) => ScalarType::QInteger,
                Err(_) => ScalarType::QFloat,
            };
        }
        if FLOAT_MATCHER.is_match(s) {
            return ScalarType::QFloat;
        }
        if s.eq_ignore_ascii_case("true") || s.eq_ignore_ascii_case("false") {
            return ScalarType::QBoolean;
        }
        ScalarType::String
    }

    /// Reduce the elements of a non-empty array to one type
    ///
    /// Sentinel tags are valid results here (e.g. `[{}]` gives
    /// `EmptyRecord`); the caller decides which of them a repeated field may
    /// hold. An empty slice is a caller bug.
    pub fn infer_array_type(&self, elements: &[Value]) -> Result<ArrayType> {
        let (first, rest) = elements
            .split_first()
            .ok_or_else(|| Error::internal("Empty array, should never happen here"))?;

        let mut candidate = self.infer_value_type(first);
        for (offset, element) in rest.iter().enumerate() {
            let found = self.infer_value_type(element);
            match convert_type(candidate, found) {
                Some(joined) => candidate = joined,
                None => {
                    return Ok(ArrayType::Mixed {
                        index: offset + 1,
                        candidate,
                        found,
                    })
                }
            }
        }
        Ok(ArrayType::Uniform(candidate))
    }
}

fn infer_number_type(n: &Number) -> ScalarType {
    if n.is_i64() {
        ScalarType::Integer
    } else {
        // u64 above i64::MAX, or a real float
        ScalarType::Float
    }
}

/// Whether the string looks like a TIMESTAMP
pub fn is_timestamp(s: &str) -> bool {
    TIMESTAMP_MATCHER.is_match(s)
}

/// Whether the string looks like a DATE
pub fn is_date(s: &str) -> bool {
    DATE_MATCHER.is_match(s)
}

/// Whether the string looks like a TIME
pub fn is_time(s: &str) -> bool {
    TIME_MATCHER.is_match(s)
}
