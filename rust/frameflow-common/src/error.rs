use thiserror::Error;

/// Error returned by the frameflow crates.
///
/// Boxes the actual [`ErrorKind`] to keep `Result<T>` small on the happy path.
#[derive(Debug, Error)]
#[error(transparent)]
pub struct Error(Box<ErrorKind>);

impl Error {
    pub fn kind(&self) -> &ErrorKind {
        self.0.as_ref()
    }

    pub fn into_kind(self) -> ErrorKind {
        *self.0
    }

    pub fn invalid_arg(name: impl Into<String>, message: impl Into<String>) -> Error {
        Error(
            ErrorKind::InvalidArgument {
                name: name.into(),
                message: message.into(),
            }
            .into(),
        )
    }

    pub fn invalid_operation(name: impl Into<String>) -> Error {
        Error(ErrorKind::InvalidOperation { name: name.into() }.into())
    }

    pub fn allocation_failed(size: usize) -> Error {
        Error(ErrorKind::AllocationFailed { size }.into())
    }

    pub fn unsupported_depth(depth: usize) -> Error {
        Error(ErrorKind::UnsupportedElementDepth { depth }.into())
    }
}

#[derive(Debug, Error)]
pub enum ErrorKind {
    #[error("invalid argument {name}: {message}")]
    InvalidArgument { name: String, message: String },

    #[error("invalid operation {name}")]
    InvalidOperation { name: String },

    #[error("failed to allocate a buffer of {size} bytes")]
    AllocationFailed { size: usize },

    #[error("unsupported element depth {depth} (expected 1, 2, 4 or 8 bytes)")]
    UnsupportedElementDepth { depth: usize },
}

impl From<ErrorKind> for Error {
    fn from(kind: ErrorKind) -> Self {
        Error(kind.into())
    }
}
