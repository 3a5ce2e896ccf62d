use crate::field_set::FieldSet;
use crate::key::FormKey;
use crate::validator::{FieldValidator, SiblingValues};
use crate::value::{FieldValue, ValueKind};
use crate::verdict::{HelperText, Verdict};
use core::fmt;
use studyroom_error::{require_eq, FormError, Result};

/// Value of one field together with its rule and derived verdict.
///
/// The verdict is `None` until the field is touched (edited, or forced by a
/// rejected submit); an untouched field renders the placeholder helper text.
pub struct FieldState<K: FormKey> {
    key: K,
    value: FieldValue,
    validator: Box<dyn FieldValidator<K>>,
    verdict: Option<Verdict>,
}

impl<K: FormKey> FieldState<K> {
    pub fn new(key: K, initial: FieldValue, validator: impl FieldValidator<K> + 'static) -> Self {
        Self {
            key,
            value: initial,
            validator: Box::new(validator),
            verdict: None,
        }
    }

    pub fn key(&self) -> K {
        self.key
    }

    pub fn value(&self) -> &FieldValue {
        &self.value
    }

    pub fn kind(&self) -> ValueKind {
        self.value.kind()
    }

    pub fn verdict(&self) -> Option<&Verdict> {
        self.verdict.as_ref()
    }

    pub fn is_touched(&self) -> bool {
        self.verdict.is_some()
    }

    pub fn is_pass(&self) -> bool {
        matches!(self.verdict, Some(Verdict::Pass))
    }

    pub fn helper_text(&self) -> HelperText {
        HelperText::for_verdict(self.verdict.as_ref())
    }

    pub fn dependencies(&self) -> FieldSet<K> {
        self.validator.dependencies()
    }

    /// Runs the rule without recording the result.
    pub fn evaluate(&self, siblings: &dyn SiblingValues<K>) -> Verdict {
        self.validator.validate(&self.value, siblings)
    }

    /// Stores `value`, returning whether it differs from the previous one.
    pub(crate) fn replace_value(&mut self, value: FieldValue) -> Result<bool> {
        require_eq!(
            value.kind(),
            self.kind(),
            FormError::ValueKindMismatch {
                field: self.key.name(),
                expected: self.kind().as_str(),
                actual: value.kind().as_str(),
            }
        );
        if value == self.value {
            return Ok(false);
        }
        self.value = value;
        Ok(true)
    }

    pub(crate) fn set_verdict(&mut self, verdict: Verdict) {
        self.verdict = Some(verdict);
    }

    pub(crate) fn replace_validator(&mut self, validator: Box<dyn FieldValidator<K>>) {
        self.validator = validator;
    }
}

impl<K: FormKey> fmt::Debug for FieldState<K> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FieldState")
            .field("key", &self.key)
            .field("value", &self.value)
            .field("verdict", &self.verdict)
            .finish_non_exhaustive()
    }
}
