use thiserror::Error;

/// Error of every quarry operation. Boxed so that `Result<T>` stays one word
/// wider than `T` on the hot posting paths.
#[derive(Debug, Error)]
#[error(transparent)]
pub struct Error(Box<ErrorKind>);

pub type StdErrorBoxed = Box<dyn std::error::Error + Send + Sync + 'static>;

#[derive(Debug, Error)]
pub enum ErrorKind {
    /// A caller-supplied value was rejected.
    #[error("invalid {name}: {message}")]
    InvalidArgument { name: String, message: String },

    /// The operation cannot run in the current state, e.g. a sealed writer or
    /// a query worker that went away.
    #[error("invalid operation: {name}")]
    InvalidOperation { name: String },

    #[error("'{element}' not found")]
    NotFound { element: String },

    /// Stored structures disagree with each other or with their headers.
    #[error("{element} is inconsistent: {message}")]
    FormatInconsistency { element: String, message: String },

    /// The query text or tree cannot be matched.
    #[error("unsupported query: {message}")]
    UnsupportedQuery { message: String },

    #[error("{context}: {source}")]
    Io {
        context: String,
        source: std::io::Error,
    },

    #[error("cannot (de)serialize {context}: {source}")]
    Serialization {
        context: String,
        source: StdErrorBoxed,
    },
}

impl Error {
    pub fn kind(&self) -> &ErrorKind {
        &self.0
    }

    pub fn format_inconsistency(element: impl Into<String>, message: impl Into<String>) -> Error {
        ErrorKind::FormatInconsistency {
            element: element.into(),
            message: message.into(),
        }
        .into()
    }

    pub fn invalid_arg(name: impl Into<String>, message: impl Into<String>) -> Error {
        ErrorKind::InvalidArgument {
            name: name.into(),
            message: message.into(),
        }
        .into()
    }

    pub fn invalid_operation(name: impl Into<String>) -> Error {
        ErrorKind::InvalidOperation { name: name.into() }.into()
    }

    pub fn not_found(element: impl Into<String>) -> Error {
        ErrorKind::NotFound {
            element: element.into(),
        }
        .into()
    }

    pub fn unsupported_query(message: impl Into<String>) -> Error {
        ErrorKind::UnsupportedQuery {
            message: message.into(),
        }
        .into()
    }

    pub fn io(context: impl Into<String>, source: std::io::Error) -> Error {
        ErrorKind::Io {
            context: context.into(),
            source,
        }
        .into()
    }

    pub fn serialization<E>(context: impl Into<String>, source: E) -> Error
    where
        E: std::error::Error + Send + Sync + 'static,
    {
        ErrorKind::Serialization {
            context: context.into(),
            source: Box::new(source),
        }
        .into()
    }

    /// True when stored data failed validation on open or decode.
    pub fn is_format_inconsistency(&self) -> bool {
        matches!(*self.0, ErrorKind::FormatInconsistency { .. })
    }

    pub fn is_not_found(&self) -> bool {
        matches!(*self.0, ErrorKind::NotFound { .. })
    }

    pub fn is_unsupported_query(&self) -> bool {
        matches!(*self.0, ErrorKind::UnsupportedQuery { .. })
    }
}

impl From<ErrorKind> for Error {
    fn from(kind: ErrorKind) -> Self {
        Error(Box::new(kind))
    }
}

impl From<std::io::Error> for Error {
    fn from(source: std::io::Error) -> Self {
        Error::io("index storage", source)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_messages() {
        assert_eq!(
            Error::invalid_arg("workers", "must be positive").to_string(),
            "invalid workers: must be positive"
        );
        assert_eq!(Error::not_found("FT-9").to_string(), "'FT-9' not found");
        let io: Error = std::io::Error::new(std::io::ErrorKind::UnexpectedEof, "short read").into();
        assert_eq!(io.to_string(), "index storage: short read");
        assert!(Error::not_found("x").is_not_found());
        assert!(!Error::not_found("x").is_unsupported_query());
    }
}
