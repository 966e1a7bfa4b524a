//! Bitwise context mixing compressor.
//!
//! Several hashed order-n and word models predict each bit, a gated linear
//! mixer in the logistic domain combines them and a carry-less arithmetic
//! coder turns the predictions into bytes.

pub mod compressor;
pub mod config;
pub mod entropy_coding;
pub mod error;
pub mod logistic;
pub mod macros;
pub mod mixer;
pub mod models;
pub mod probability_store;
pub mod report;
pub mod search;

pub use compressor::{
    compress, compress_with_dictionary, decompress, decompress_with_dictionary, Compressor,
};
pub use config::{CoderWidth, ModelConfig};
pub use error::{Error, Result};
pub use models::ContextKind;
