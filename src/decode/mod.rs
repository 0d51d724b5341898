//! Record decoder module
//!
//! Supports: newline-delimited JSON, CSV, single JSON documents
//!
//! # Overview
//!
//! The decode module turns an input stream into the generic records the
//! schema generator consumes. Decoding is lazy; a record that fails to
//! decode is yielded as an error item so the caller decides whether to
//! skip it.

mod decoders;
mod types;

pub use decoders::{decode_all, decoder_for, CsvDecoder, JsonDecoder, JsonlDecoder};
pub use types::{DecoderConfig, RecordDecoder, RecordIter};
