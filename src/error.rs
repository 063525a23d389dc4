//! Error types used by the event-horizon engine and its scope resolver.
//!
//! This module defines two main error enums:
//!
//! - [`HorizonError`] — lookup failures surfaced to the caller (named or current scope).
//! - [`HandlerError`] — failures raised by individual handlers during delivery.
//!
//! Both types provide helper methods (`as_label`, `as_message`) for logging.
//! [`ScopeFailure`] is the value-typed form of a [`HorizonError`], returned by the
//! non-panicking `*_safe` operations.

use std::fmt;

use thiserror::Error;

/// # Errors produced by scope resolution.
///
/// These are returned synchronously to the caller of a lookup or emit-to-name
/// operation. They never come from delivery itself.
#[non_exhaustive]
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum HorizonError {
    /// The name is not bound in the caller's registry nor anywhere else in the process.
    #[error("horizon {name:?} does not exist")]
    NotFound {
        /// The requested name.
        name: String,
    },

    /// The name is bound somewhere in the process, but not reachable from the caller's scope.
    #[error("horizon {name:?} exists but is out of scope here")]
    NotInScope {
        /// The requested name.
        name: String,
    },

    /// An unqualified lookup was made with no enclosing scope at all.
    #[error("no active horizon scope")]
    NoActiveScope,
}

impl HorizonError {
    /// Returns a short stable label (snake_case) for use in logs.
    ///
    /// # Example
    /// ```
    /// use event_horizon::HorizonError;
    ///
    /// let err = HorizonError::NotInScope { name: "sidebar".into() };
    /// assert_eq!(err.as_label(), "horizon_not_in_scope");
    /// ```
    pub fn as_label(&self) -> &'static str {
        match self {
            HorizonError::NotFound { .. } => "horizon_not_found",
            HorizonError::NotInScope { .. } => "horizon_not_in_scope",
            HorizonError::NoActiveScope => "horizon_no_active_scope",
        }
    }

    /// Returns a human-readable message with details about the error.
    pub fn as_message(&self) -> String {
        match self {
            HorizonError::NotFound { name } => format!("Horizon \"{name}\" does not exist."),
            HorizonError::NotInScope { name } => {
                format!("Horizon \"{name}\" exists but is out of scope here.")
            }
            HorizonError::NoActiveScope => {
                "no enclosing horizon scope for an unqualified lookup".to_string()
            }
        }
    }

    /// Returns the stable classification code.
    pub fn code(&self) -> ErrorCode {
        match self {
            HorizonError::NotFound { .. } => ErrorCode::NotFound,
            HorizonError::NotInScope { .. } => ErrorCode::NotInScope,
            HorizonError::NoActiveScope => ErrorCode::NoActiveScope,
        }
    }
}

/// Stable classification code carried by [`ScopeFailure`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorCode {
    NotFound,
    NotInScope,
    NoActiveScope,
}

impl ErrorCode {
    /// Returns the wire-style code (`NOT_FOUND`, `NOT_IN_SCOPE`, `NO_ACTIVE_SCOPE`).
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorCode::NotFound => "NOT_FOUND",
            ErrorCode::NotInScope => "NOT_IN_SCOPE",
            ErrorCode::NoActiveScope => "NO_ACTIVE_SCOPE",
        }
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Classified failure of a non-panicking named operation.
///
/// Plain data: callers inspect `code` to react (e.g. hide a control when the
/// target is `NotInScope`) without treating it as an exceptional path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScopeFailure {
    pub code: ErrorCode,
    pub message: String,
}

impl From<HorizonError> for ScopeFailure {
    fn from(err: HorizonError) -> Self {
        Self {
            code: err.code(),
            message: err.as_message(),
        }
    }
}

impl fmt::Display for ScopeFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.code, self.message)
    }
}

/// # Errors produced by a handler during delivery.
///
/// A `HandlerError` is never returned to the emitter. The drain loop catches it
/// at the point of dispatch, reports it to the diagnostic sink and moves on to
/// the next handler.
#[non_exhaustive]
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum HandlerError {
    /// Handler returned an error.
    #[error("handler failed: {error}")]
    Failed {
        /// The underlying error message.
        error: String,
    },

    /// Handler panicked while processing the message.
    #[error("handler panicked: {info}")]
    Panicked {
        /// Panic payload rendered as text.
        info: String,
    },
}

impl HandlerError {
    /// Shorthand for [`HandlerError::Failed`].
    pub fn failed(error: impl Into<String>) -> Self {
        HandlerError::Failed {
            error: error.into(),
        }
    }

    /// Returns a short stable label (snake_case) for use in logs.
    ///
    /// # Example
    /// ```
    /// use event_horizon::HandlerError;
    ///
    /// let err = HandlerError::failed("boom");
    /// assert_eq!(err.as_label(), "handler_failed");
    /// ```
    pub fn as_label(&self) -> &'static str {
        match self {
            HandlerError::Failed { .. } => "handler_failed",
            HandlerError::Panicked { .. } => "handler_panicked",
        }
    }

    /// Returns a human-readable message with details about the error.
    pub fn as_message(&self) -> String {
        match self {
            HandlerError::Failed { error } => format!("error: {error}"),
            HandlerError::Panicked { info } => format!("panic: {info}"),
        }
    }
}
