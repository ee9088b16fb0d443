//! Encoding and decoding with a trained vocabulary.
//!
//! - `byte_level`: rank-driven greedy merge application over UTF-8 bytes
//! - `decoder`: id to text, depending only on the vocabulary

pub mod byte_level;
pub mod decoder;

pub use byte_level::{ByteLevelEncoder, EncodeIter};
pub use decoder::Decoder;
