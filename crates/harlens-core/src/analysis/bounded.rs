use serde::Serialize;

/// A list that stops growing at `cap` but keeps counting
///
/// Items keep first-seen order; sections that want another order sort their
/// own copy.
#[derive(Debug, Clone, Serialize)]
pub struct BoundedList<T> {
    items: Vec<T>,
    cap: usize,
    dropped: usize,
}

impl<T> BoundedList<T> {
    pub fn new(cap: usize) -> Self {
        Self {
            items: Vec::new(),
            cap,
            dropped: 0,
        }
    }

    /// Returns false when the item did not fit
    pub fn push(&mut self, item: T) -> bool {
        if self.items.len() < self.cap {
            self.items.push(item);
            true
        } else {
            self.dropped += 1;
            false
        }
    }

    pub fn items(&self) -> &[T] {
        &self.items
    }

    pub fn iter(&self) -> std::slice::Iter<'_, T> {
        self.items.iter()
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Number of items offered, kept or not
    pub fn total(&self) -> usize {
        self.items.len() + self.dropped
    }

    pub fn dropped(&self) -> usize {
        self.dropped
    }
}

impl<'a, T> IntoIterator for &'a BoundedList<T> {
    type Item = &'a T;
    type IntoIter = std::slice::Iter<'a, T>;

    fn into_iter(self) -> Self::IntoIter {
        self.items.iter()
    }
}
