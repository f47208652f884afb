use serde::{Deserialize, Serialize};
use std::fmt;

/// Content identifier assigned by the remote storage side.
///
/// Opaque to the engine; it is returned by the upload call and only ever
/// logged or reported.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PieceCid(pub String);

impl fmt::Display for PieceCid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<String> for PieceCid {
    fn from(value: String) -> Self {
        PieceCid(value)
    }
}
