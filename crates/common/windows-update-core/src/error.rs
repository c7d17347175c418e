use thiserror::Error;

use crate::value::ValueKind;

#[derive(Debug, Error)]
pub enum UpdateAgentError {
    /// A property read, property write, method call or object creation failed
    /// on the remote side. The HRESULT is carried verbatim.
    #[error("{message} (hresult {code:#010x})")]
    Remote { code: i32, message: String },

    #[error("Unknown member: {member}")]
    UnknownMember { member: String },

    #[error("Type mismatch: expected {expected}, found {found}")]
    TypeMismatch { expected: ValueKind, found: ValueKind },

    #[error("Null element at index {index}")]
    NullElement { index: i32 },

    #[error("Invalid collection count: {0}")]
    InvalidCount(i32),

    #[error("Category tree exceeds the depth limit of {0}")]
    DepthLimit(usize),

    #[error("Invalid configuration: {reason}")]
    InvalidConfig { reason: String },

    #[error("Unsupported")]
    Unsupported,

    #[error("Platform error: {0}")]
    Platform(String),
}

/// HRESULT used for remote failures that do not carry their own code (`E_FAIL`).
pub const E_FAIL: i32 = 0x8000_4005_u32 as i32;

impl UpdateAgentError {
    pub fn remote<S: ToString>(message: S) -> Self {
        Self::Remote {
            code: E_FAIL,
            message: message.to_string(),
        }
    }

    pub fn remote_with_code<S: ToString>(code: i32, message: S) -> Self {
        Self::Remote {
            code,
            message: message.to_string(),
        }
    }

    pub fn unknown_member(member: impl Into<String>) -> Self {
        Self::UnknownMember {
            member: member.into(),
        }
    }

    pub fn type_mismatch(expected: ValueKind, found: ValueKind) -> Self {
        Self::TypeMismatch { expected, found }
    }

    pub fn invalid_config(reason: impl Into<String>) -> Self {
        Self::InvalidConfig {
            reason: reason.into(),
        }
    }

    pub fn platform<S: ToString>(err: S) -> Self {
        Self::Platform(err.to_string())
    }

    /// HRESULT of a remote failure, if this error came from the remote side.
    #[must_use]
    pub fn hresult(&self) -> Option<i32> {
        match self {
            Self::Remote { code, .. } => Some(*code),
            _ => None,
        }
    }

    #[must_use]
    pub fn is_unknown_member(&self) -> bool {
        matches!(self, Self::UnknownMember { .. })
    }
}

pub type UpdateResult<T> = Result<T, UpdateAgentError>;
