use thiserror::Error;

use crate::types::{CallbackId, KeyframeId};

#[derive(Debug, Error, Clone, PartialEq)]
pub enum WirecamError {
    #[error("target element not found: {0}")]
    ElementNotFound(String),

    #[error("keyframe not found: {0}")]
    KeyframeNotFound(KeyframeId),

    #[error("update callback not found: {0}")]
    CallbackNotFound(CallbackId),
}

pub type Result<T> = std::result::Result<T, WirecamError>;
