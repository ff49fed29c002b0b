use std::str::{self, Utf8Error};

use serde_json::Value;
use tilelab_history::{NonIncreasingGameError, ProgressRecord};

/// A single line of trainer output.
#[derive(Debug, Clone, PartialEq, derive_more::IsVariant)]
pub enum TrainerMessage {
    /// Evaluation point, recognized by its `game` field.
    Progress(ProgressRecord),
    /// Serialized model. The payload is the line exactly as it was received.
    Snapshot(String),
}

#[derive(Debug, derive_more::Display, derive_more::Error, derive_more::IsVariant)]
pub enum MessageError {
    #[display("line is not valid UTF-8")]
    InvalidUtf8(Utf8Error),
    #[display("line is not valid JSON")]
    MalformedJson(serde_json::Error),
    #[display("record has a `game` field but is not a valid progress record")]
    InvalidProgress(serde_json::Error),
    #[display("progress records are out of order")]
    OutOfOrder(NonIncreasingGameError),
}

impl TrainerMessage {
    /// Classifies one output line.
    ///
    /// JSON objects carrying a `game` key must be complete progress records;
    /// every other JSON value is an opaque model snapshot.
    pub fn decode(line: &str) -> Result<Self, MessageError> {
        let value: Value = serde_json::from_str(line).map_err(MessageError::MalformedJson)?;
        if value.get("game").is_some() {
            let record = serde_json::from_value(value).map_err(MessageError::InvalidProgress)?;
            return Ok(Self::Progress(record));
        }
        Ok(Self::Snapshot(line.to_owned()))
    }

    /// Classifies one output line given as raw bytes.
    pub fn decode_bytes(line: &[u8]) -> Result<Self, MessageError> {
        let line = str::from_utf8(line).map_err(MessageError::InvalidUtf8)?;
        Self::decode(line)
    }
}
