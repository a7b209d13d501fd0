use crate::error::{Error, ErrorKind, Result};

/// A deterministic cursor over a key-value collection.
///
/// Entries are visited in ascending lexicographic order of their keys,
/// whatever the order of the underlying collection. The order is computed
/// when the iterator is created and never cached elsewhere, so two
/// iterators built from the same collection always produce the same
/// sequence.
///
/// The cursor starts before the first entry: call
/// [`MapIterator::advance`] to move onto an entry before reading it.
/// It is also a standard [`Iterator`] yielding the entries in the same order.
#[derive(Debug, Clone)]
pub struct MapIterator<K, V> {
    entries: Vec<(K, V)>,
    // Index of the current entry, `None` before the first advance.
    position: Option<usize>,
}

impl<K, V> MapIterator<K, V>
where
    K: AsRef<str>,
{
    /// Creates a [`MapIterator`] sorting the given collection by key.
    #[must_use]
    pub fn new<I>(collection: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
    {
        let mut entries: Vec<(K, V)> = collection.into_iter().collect();
        entries.sort_by(|a, b| a.0.as_ref().cmp(b.0.as_ref()));
        Self {
            entries,
            position: None,
        }
    }

    /// Moves the cursor onto the next entry.
    ///
    /// Returns `false` when there are no more entries.
    pub fn advance(&mut self) -> bool {
        let next = self.position.map_or(0, |position| position + 1);
        // Never move past one-after-the-end.
        self.position = Some(next.min(self.entries.len()));
        next < self.entries.len()
    }

    /// Returns the key of the current entry.
    ///
    /// # Errors
    ///
    /// Fails with [`ErrorKind::InvalidIterator`] when the cursor does not
    /// point to an entry.
    pub fn key(&self) -> Result<&str> {
        self.current().map(|(key, _)| key.as_ref())
    }

    /// Returns the value of the current entry.
    ///
    /// # Errors
    ///
    /// Fails with [`ErrorKind::InvalidIterator`] when the cursor does not
    /// point to an entry.
    pub fn value(&self) -> Result<&V> {
        self.current().map(|(_, value)| value)
    }

    /// Returns the total number of entries.
    #[must_use]
    #[inline]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Checks whether there are no entries.
    #[must_use]
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    fn current(&self) -> Result<&(K, V)> {
        self.position
            .and_then(|position| self.entries.get(position))
            .ok_or_else(|| {
                Error::new(
                    ErrorKind::InvalidIterator,
                    "The iterator does not point to any entry",
                )
            })
    }
}

impl<K, V> Iterator for MapIterator<K, V>
where
    K: AsRef<str> + Clone,
    V: Clone,
{
    type Item = (K, V);

    fn next(&mut self) -> Option<Self::Item> {
        if self.advance() {
            self.current().ok().cloned()
        } else {
            None
        }
    }
}
