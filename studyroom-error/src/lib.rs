//! Study-room form error handling.
//!
//! This crate provides two things:
//! 1. The [`FormError`] taxonomy shared by every form in the workspace.
//! 2. Guard macros (`require!` and friends) so form code can state a
//!    precondition on one line and bail out with a typed error.
//!
//! Validation and verification failures are normally *values* (verdicts and
//! step states) consumed by rendering. They only become a [`FormError`] when a
//! caller explicitly asks a context to justify why it is not submittable.

/// Coarse classification of a [`FormError`], mirroring how the presentation
/// layer reacts to it.
#[derive(Debug, Clone, Copy, Eq, PartialEq, Hash)]
pub enum ErrorKind {
    /// Field-scoped and recoverable by re-editing the field.
    Validation,
    /// An asynchronous verification was rejected; recoverable by re-requesting.
    Verification,
    /// The final submit failed on the transport or server side.
    Submission,
    /// Submit was attempted while the gate was closed.
    Precondition,
    /// The caller drove the engine incorrectly (unknown field, bad index, ...).
    Usage,
}

/// Errors produced by the form engine.
#[derive(Debug, Clone, Eq, PartialEq, thiserror::Error)]
pub enum FormError {
    /// A field's verdict is `Fail`.
    #[error("{message}")]
    ValidationFailure { field: &'static str, message: String },

    /// A verification step has not succeeded.
    #[error("{message}")]
    VerificationFailure { step: &'static str, message: String },

    /// The transport or the server rejected the submission. Field values are
    /// left untouched so the user can resubmit.
    #[error("{message}")]
    SubmissionFailure { status: Option<u16>, message: String },

    /// Submit attempted while the gate is closed. No request was sent.
    #[error("{message}")]
    PreconditionViolation {
        message: String,
        field: Option<&'static str>,
    },

    /// A submission for this form is already outstanding.
    #[error("A submission is already in flight")]
    SubmissionInFlight,

    /// The field is not part of the addressed context.
    #[error("Field `{field}` does not exist in context `{context}`")]
    UnknownField {
        field: &'static str,
        context: &'static str,
    },

    /// The verification step is not part of the addressed context.
    #[error("Verification step `{step}` does not exist in context `{context}`")]
    UnknownStep {
        step: &'static str,
        context: &'static str,
    },

    /// Context index out of range.
    #[error("Context index {index} is out of range ({len} contexts)")]
    UnknownContext { index: usize, len: usize },

    /// An edit carried a value of a different kind than the field declares.
    #[error("Field `{field}` expects a {expected} value, got {actual}")]
    ValueKindMismatch {
        field: &'static str,
        expected: &'static str,
        actual: &'static str,
    },
}

impl FormError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            FormError::ValidationFailure { .. } => ErrorKind::Validation,
            FormError::VerificationFailure { .. } => ErrorKind::Verification,
            FormError::SubmissionFailure { .. } | FormError::SubmissionInFlight => {
                ErrorKind::Submission
            }
            FormError::PreconditionViolation { .. } => ErrorKind::Precondition,
            FormError::UnknownField { .. }
            | FormError::UnknownStep { .. }
            | FormError::UnknownContext { .. }
            | FormError::ValueKindMismatch { .. } => ErrorKind::Usage,
        }
    }

    /// Whether the message is meant to be shown to the user as-is.
    pub fn is_user_visible(&self) -> bool {
        !matches!(self.kind(), ErrorKind::Usage) && !matches!(self, FormError::SubmissionInFlight)
    }

    pub fn precondition(message: impl Into<String>) -> Self {
        FormError::PreconditionViolation {
            message: message.into(),
            field: None,
        }
    }

    pub fn submission(status: Option<u16>, message: impl Into<String>) -> Self {
        FormError::SubmissionFailure {
            status,
            message: message.into(),
        }
    }
}

/// Convenience alias used throughout the workspace.
pub type Result<T> = core::result::Result<T, FormError>;

/// Evaluates the provided expression and returns the supplied error (converted
/// with `Into`) if the condition is `false`.
#[macro_export]
macro_rules! require {
    ($cond:expr, $err:expr $(,)?) => {
        if !$cond {
            return core::result::Result::Err($err.into());
        }
    };
}

/// Require that two expressions are equal (`==`).
///
/// Usage: `require_eq!(a, b, FormError::SubmissionInFlight);`
#[macro_export]
macro_rules! require_eq {
    ($left:expr, $right:expr, $err:expr $(,)?) => {
        $crate::require!($left == $right, $err);
    };
}

/// Require that two expressions are **not** equal (`!=`).
#[macro_export]
macro_rules! require_neq {
    ($left:expr, $right:expr, $err:expr $(,)?) => {
        $crate::require!($left != $right, $err);
    };
}

/// Require that `$left` is strictly less than `$right` (`<`).
#[macro_export]
macro_rules! require_lt {
    ($left:expr, $right:expr, $err:expr $(,)?) => {
        $crate::require!($left < $right, $err);
    };
}

/// Unwraps an `Option`, returning the supplied error when it is `None`.
#[macro_export]
macro_rules! require_some {
    ($opt:expr, $err:expr $(,)?) => {
        match $opt {
            core::option::Option::Some(value) => value,
            core::option::Option::None => return core::result::Result::Err($err.into()),
        }
    };
}
