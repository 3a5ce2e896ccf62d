use crate::field::FieldState;
use crate::field_set::FieldSet;
use crate::key::FormKey;
use crate::value::FieldValue;
use crate::verdict::Verdict;
use std::collections::BTreeMap;

/// Read access to the other values of the same context.
pub trait SiblingValues<K> {
    fn value(&self, key: K) -> Option<&FieldValue>;
}

/// No siblings at all.
impl<K> SiblingValues<K> for () {
    fn value(&self, _key: K) -> Option<&FieldValue> {
        None
    }
}

impl<K: FormKey> SiblingValues<K> for BTreeMap<K, FieldValue> {
    fn value(&self, key: K) -> Option<&FieldValue> {
        self.get(&key)
    }
}

impl<K: FormKey> SiblingValues<K> for BTreeMap<K, FieldState<K>> {
    fn value(&self, key: K) -> Option<&FieldValue> {
        self.get(&key).map(FieldState::value)
    }
}

/// Pure rule deciding whether a field value is acceptable.
///
/// `validate` must be total and deterministic. A rule that reads sibling
/// values lists them in [`FieldValidator::dependencies`], so the context
/// re-runs it when one of them changes.
pub trait FieldValidator<K: FormKey>: Send + Sync {
    fn validate(&self, value: &FieldValue, siblings: &dyn SiblingValues<K>) -> Verdict;

    fn dependencies(&self) -> FieldSet<K> {
        FieldSet::new()
    }
}

impl<K: FormKey, V: FieldValidator<K> + ?Sized> FieldValidator<K> for Box<V> {
    fn validate(&self, value: &FieldValue, siblings: &dyn SiblingValues<K>) -> Verdict {
        (**self).validate(value, siblings)
    }

    fn dependencies(&self) -> FieldSet<K> {
        (**self).dependencies()
    }
}
