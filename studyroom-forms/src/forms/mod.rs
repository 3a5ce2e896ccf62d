//! The concrete study-room forms built on the engine.

pub mod recruit;
pub mod signup;

/// Where the presentation layer goes after a successful submit.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Navigation {
    /// Short confirmation shown before navigating, if any.
    pub toast: Option<&'static str>,
    pub path: &'static str,
}
