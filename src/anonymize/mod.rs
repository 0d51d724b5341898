//! Data anonymization
//!
//! Rewrites newline-delimited JSON so that it can be shared for
//! benchmarking: keys and values are replaced, but the deduced schema keeps
//! its shape.

mod anonymizer;

pub use anonymizer::{
    anonymize_value, increment_anon_key, Anonymizer, ANON_DATE, ANON_TIME, ANON_TIMESTAMP,
};
