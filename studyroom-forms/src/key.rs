use core::fmt::Debug;
use core::hash::Hash;

/// Identifier of a field or verification step inside a form.
///
/// Implemented by fieldless enums, normally through `#[derive(FormKey)]`.
/// `index()` must be dense (`0..ALL.len()`) and below 64 because keys are
/// packed into a [`FieldSet`](crate::FieldSet).
pub trait FormKey: Copy + Eq + Ord + Hash + Debug + Send + Sync + 'static {
    /// Every key in declaration order.
    const ALL: &'static [Self];

    fn index(self) -> usize;

    /// Wire name, used as the request key and in error messages.
    fn name(self) -> &'static str;
}

/// Step key for contexts that have no asynchronous verification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, crate::FormKey)]
pub enum NoStep {}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, crate::FormKey)]
    enum Demo {
        First,
        SecondField,
        #[form_key(rename = "third")]
        Renamed,
    }

    #[test]
    fn derive_is_dense_and_ordered() {
        assert_eq!(Demo::ALL, &[Demo::First, Demo::SecondField, Demo::Renamed]);
        for (position, key) in Demo::ALL.iter().enumerate() {
            assert_eq!(key.index(), position);
        }
        assert_eq!(Demo::SecondField.name(), "secondField");
        assert_eq!(Demo::Renamed.name(), "third");
    }

    #[test]
    fn no_step_is_empty() {
        assert!(NoStep::ALL.is_empty());
    }
}
