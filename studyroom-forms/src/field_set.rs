use crate::key::FormKey;
use core::fmt;
use core::marker::PhantomData;

/// Set of form keys packed into a single word.
///
/// Only indices below [`FieldSet::CAPACITY`] fit. A key past it is never
/// contained and can not be inserted.
pub struct FieldSet<K> {
    bits: u64,
    _key: PhantomData<K>,
}

impl<K> Clone for FieldSet<K> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<K> Copy for FieldSet<K> {}

impl<K> PartialEq for FieldSet<K> {
    fn eq(&self, other: &Self) -> bool {
        self.bits == other.bits
    }
}

impl<K> Eq for FieldSet<K> {}

impl<K: FormKey> Default for FieldSet<K> {
    fn default() -> Self {
        Self::new()
    }
}

impl<K: FormKey> fmt::Debug for FieldSet<K> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_set().entries(self.iter()).finish()
    }
}

impl<K: FormKey> FieldSet<K> {
    pub const CAPACITY: usize = u64::BITS as usize;

    pub fn new() -> Self {
        Self {
            bits: 0,
            _key: PhantomData,
        }
    }

    pub fn from_keys(keys: &[K]) -> Self {
        let mut set = Self::new();
        set.extend_from_slice(keys);
        set
    }

    fn bit(key: K) -> Option<u64> {
        let index = key.index();
        (index < Self::CAPACITY).then(|| 1u64 << index)
    }

    pub fn count(&self) -> usize {
        self.bits.count_ones() as usize
    }

    pub fn is_empty(&self) -> bool {
        self.bits == 0
    }

    pub fn contains(&self, key: K) -> bool {
        Self::bit(key).is_some_and(|bit| self.bits & bit != 0)
    }

    pub fn insert(&mut self, key: K) -> bool {
        match Self::bit(key) {
            Some(bit) if self.bits & bit == 0 => {
                self.bits |= bit;
                true
            }
            _ => false,
        }
    }

    pub fn remove(&mut self, key: K) -> bool {
        match Self::bit(key) {
            Some(bit) if self.bits & bit != 0 => {
                self.bits &= !bit;
                true
            }
            _ => false,
        }
    }

    pub fn extend_from_slice(&mut self, keys: &[K]) {
        for &key in keys {
            self.insert(key);
        }
    }

    pub fn union(self, other: Self) -> Self {
        Self {
            bits: self.bits | other.bits,
            _key: PhantomData,
        }
    }

    pub fn is_subset(&self, other: &Self) -> bool {
        self.bits & !other.bits == 0
    }

    /// Keys in declaration order.
    pub fn iter(&self) -> impl Iterator<Item = K> + '_ {
        K::ALL.iter().copied().filter(move |key| self.contains(*key))
    }

    pub fn clear(&mut self) {
        self.bits = 0;
    }
}

impl<K: FormKey> FromIterator<K> for FieldSet<K> {
    fn from_iter<I: IntoIterator<Item = K>>(iter: I) -> Self {
        let mut set = Self::new();
        for key in iter {
            set.insert(key);
        }
        set
    }
}
