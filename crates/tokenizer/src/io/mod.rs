//! Serialization and deserialization for trained tokenizers.
//!
//! A model directory holds one `tokenizer.json` with the vocabulary, the
//! ordered merge rules and the settings needed to encode and decode.

pub mod format;
pub mod load;
pub mod save;

pub use format::{SerializedTokenizer, FORMAT_VERSION, TOKENIZER_FILE};
pub use load::TokenizerLoader;
pub use save::TokenizerSaver;
