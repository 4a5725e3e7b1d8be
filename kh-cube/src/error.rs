use thiserror::Error;

#[derive(Debug, Error)]
pub enum KhError { 
    #[error("invalid reference: {0}")]
    InvalidReference(String),

    #[error("capacity exceeded: {0}")]
    CapacityExceeded(String),

    #[error("internal consistency: {0}")]
    InternalConsistency(String),

    #[error("invalid diagram: {0}")]
    InvalidDiagram(String),
}

pub type Result<T> = std::result::Result<T, KhError>;

/// Returned by the invariant checks when a computed polynomial does not
/// have the predicted shape. Not a program error.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
#[error("conjecture violated: {0}")]
pub struct ConjectureViolation(pub String);

impl ConjectureViolation { 
    pub fn new<S: Into<String>>(msg: S) -> Self { 
        Self(msg.into())
    }

    pub fn message(&self) -> &str { 
        &self.0
    }
}

macro_rules! bail {
    ($kind:ident, $($arg:tt)*) => {
        return Err($crate::error::KhError::$kind(format!($($arg)*)))
    };
}

pub(crate) use bail;
