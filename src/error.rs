use thiserror::Error;

/// Result type for classweave operations
pub type Result<T> = std::result::Result<T, Error>;

/// Error types for the weaver
///
/// Every error aborts the whole-class transform; the caller keeps the
/// original bytes as the safe fallback. Errors carry the offending class
/// and method names so the operator can fix the binding configuration or
/// file a defect against the weaver.
#[derive(Error, Debug)]
pub enum Error {
    #[error("invalid binding for {class}.{method}: {reason}")]
    Binding {
        class: String,
        method: String,
        reason: String,
    },

    #[error("unsupported method shape for {class}.{method}: {detail}")]
    UnsupportedShape {
        class: String,
        method: String,
        detail: String,
    },

    #[error("malformed class file: {message}")]
    ClassFormat { message: String },

    #[error("failed to emit class {class}: {message}")]
    Emission { class: String, message: String },
}

impl From<crate::classfile::constpool::ConstPoolError> for Error {
    fn from(err: crate::classfile::constpool::ConstPoolError) -> Self {
        // the transform entry point fills in the class name
        Self::Emission {
            class: String::new(),
            message: err.to_string(),
        }
    }
}

impl Error {
    /// Attach the class name to errors raised below the per-class context
    pub(crate) fn for_class(self, class: &str) -> Self {
        match self {
            Self::Emission { class: c, message } if c.is_empty() => Self::Emission {
                class: class.to_string(),
                message,
            },
            other => other,
        }
    }

    /// Create a binding error for the given class and method
    pub fn binding(
        class: impl Into<String>,
        method: impl Into<String>,
        reason: impl Into<String>,
    ) -> Self {
        Self::Binding {
            class: class.into(),
            method: method.into(),
            reason: reason.into(),
        }
    }

    /// Create an unsupported-shape error; this signals a gap in the
    /// rewriter itself, not a user-input problem
    pub fn unsupported_shape(
        class: impl Into<String>,
        method: impl Into<String>,
        detail: impl Into<String>,
    ) -> Self {
        Self::UnsupportedShape {
            class: class.into(),
            method: method.into(),
            detail: detail.into(),
        }
    }

    /// Create a class format error
    pub fn class_format(message: impl Into<String>) -> Self {
        Self::ClassFormat {
            message: message.into(),
        }
    }
}
