use crate::gui::ScreenError;
use crate::key::InvalidKey;

/// A payload that could not be turned back into a typed value.
///
/// On the wire these are never fatal: the offending frame is logged and
/// dropped and the connection carries on.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum DecodeError {
    #[error("missing field `{0}`")]
    MissingField(String),
    #[error("unknown element type '{0}'")]
    UnknownElementType(String),
    #[error("unknown packet type '{0}'")]
    UnknownPacketType(String),
    #[error("unexpected end of frame, {needed} more bytes required")]
    UnexpectedEof { needed: usize },
    #[error("string field is not valid utf-8")]
    InvalidUtf8,
    #[error(transparent)]
    InvalidKey(#[from] InvalidKey),
    #[error("malformed structured payload: {0}")]
    Malformed(String),
    #[error(transparent)]
    Invariant(#[from] ScreenError),
}

impl DecodeError {
    pub(crate) fn malformed(err: impl std::fmt::Display) -> Self {
        Self::Malformed(err.to_string())
    }
}

#[derive(Debug, thiserror::Error)]
pub enum EncodeError {
    #[error("structured encoding failed: {0}")]
    Structured(#[from] serde_json::Error),
    #[error("string field of {0} bytes exceeds the frame limit")]
    StringTooLong(usize),
}
