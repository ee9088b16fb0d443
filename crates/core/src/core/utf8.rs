//! Lossy UTF-8 decoding shared by pretokenization and decoding.

use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// Controls how undecodable byte sequences are handled.
///
/// Neither policy ever fails.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Utf8Policy {
    /// Drop invalid sequences.
    Ignore,
    /// Substitute U+FFFD for each invalid sequence.
    #[default]
    Replace,
}

impl Utf8Policy {
    /// Decode bytes into a string under this policy.
    pub fn decode(self, bytes: &[u8]) -> String {
        match self {
            Utf8Policy::Replace => String::from_utf8_lossy(bytes).into_owned(),
            Utf8Policy::Ignore => {
                let mut out = String::with_capacity(bytes.len());
                for chunk in bytes.utf8_chunks() {
                    out.push_str(chunk.valid());
                }
                out
            }
        }
    }
}

impl FromStr for Utf8Policy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "ignore" => Ok(Self::Ignore),
            "replace" => Ok(Self::Replace),
            _ => Err(format!(
                "invalid UTF-8 policy: {s:?} (expected \"ignore\" or \"replace\")"
            )),
        }
    }
}
