use core::fmt;

/// Helper text shown under a field that has not been validated yet.
pub const PLACEHOLDER_TEXT: &str = "* 헬퍼텍스트";

/// Helper text shown under a field that passes.
pub const PASS_TEXT: &str = "* 통과";

/// Outcome of validating one field value.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Verdict {
    Pass,
    Fail(String),
}

impl Verdict {
    pub fn fail(message: impl Into<String>) -> Self {
        Verdict::Fail(message.into())
    }

    pub fn is_pass(&self) -> bool {
        matches!(self, Verdict::Pass)
    }

    pub fn message(&self) -> Option<&str> {
        match self {
            Verdict::Pass => None,
            Verdict::Fail(message) => Some(message),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum HelperTone {
    Placeholder,
    Pass,
    Fail,
}

impl HelperTone {
    /// Style class the presentation layer applies to the helper line.
    pub fn css_class(self) -> &'static str {
        match self {
            HelperTone::Placeholder => "text-gray-500",
            HelperTone::Pass => "text-blue-500",
            HelperTone::Fail => "text-red-500",
        }
    }
}

/// Line rendered under a field, derived from its verdict.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct HelperText {
    pub text: String,
    pub tone: HelperTone,
}

impl HelperText {
    pub fn for_verdict(verdict: Option<&Verdict>) -> Self {
        match verdict {
            None => Self {
                text: PLACEHOLDER_TEXT.to_string(),
                tone: HelperTone::Placeholder,
            },
            Some(Verdict::Pass) => Self {
                text: PASS_TEXT.to_string(),
                tone: HelperTone::Pass,
            },
            Some(Verdict::Fail(message)) => Self {
                text: format!("* {}", message),
                tone: HelperTone::Fail,
            },
        }
    }
}

impl fmt::Display for HelperText {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.text)
    }
}
