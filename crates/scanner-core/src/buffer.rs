use std::collections::VecDeque;

/// Rows kept on screen.
pub const MAX_ROWS: usize = 10;

/// Fixed-capacity, newest-first record list.
///
/// Inserting into a full buffer drops the oldest entry. Entries are never
/// merged; the same symbol can appear several times and ages out like any
/// other row. Not synchronized: share it behind a single lock.
#[derive(Debug, Clone)]
pub struct RecordBuffer<T> {
    items: VecDeque<T>,
    capacity: usize,
}

impl<T> RecordBuffer<T> {
    pub fn new() -> Self {
        Self::with_capacity(MAX_ROWS)
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            items: VecDeque::with_capacity(capacity),
            capacity,
        }
    }

    /// Put `item` at the head, returning the entry evicted to make room.
    pub fn insert(&mut self, item: T) -> Option<T> {
        if self.capacity == 0 {
            return Some(item);
        }
        let evicted = if self.items.len() >= self.capacity {
            self.items.pop_back()
        } else {
            None
        };
        self.items.push_front(item);
        evicted
    }

    /// Newest first.
    pub fn iter(&self) -> impl Iterator<Item = &T> {
        self.items.iter()
    }

    pub fn newest(&self) -> Option<&T> {
        self.items.front()
    }

    pub fn oldest(&self) -> Option<&T> {
        self.items.back()
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn clear(&mut self) {
        self.items.clear();
    }
}

impl<T: Clone> RecordBuffer<T> {
    pub fn to_vec(&self) -> Vec<T> {
        self.items.iter().cloned().collect()
    }
}

impl<T> Default for RecordBuffer<T> {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_eleven_inserts_keep_last_ten_newest_first() {
        let mut buffer = RecordBuffer::new();
        for i in 1..=11 {
            buffer.insert(i);
        }
        assert_eq!(buffer.len(), MAX_ROWS);
        assert_eq!(buffer.to_vec(), (2..=11).rev().collect::<Vec<_>>());
        assert_eq!(buffer.newest(), Some(&11));
        assert_eq!(buffer.oldest(), Some(&2));
    }

    #[test]
    fn test_never_exceeds_capacity() {
        let mut buffer = RecordBuffer::new();
        for n in 1..=57 {
            buffer.insert(n);
            assert!(buffer.len() <= buffer.capacity());
        }
        assert_eq!(buffer.to_vec(), (48..=57).rev().collect::<Vec<_>>());
    }

    #[test]
    fn test_insert_returns_evicted_tail() {
        let mut buffer = RecordBuffer::with_capacity(2);
        assert_eq!(buffer.insert("a"), None);
        assert_eq!(buffer.insert("b"), None);
        assert_eq!(buffer.insert("c"), Some("a"));
        assert_eq!(buffer.to_vec(), vec!["c", "b"]);
    }

    #[test]
    fn test_duplicates_are_independent_entries() {
        let mut buffer = RecordBuffer::new();
        buffer.insert("ABCD");
        buffer.insert("WXYZ");
        buffer.insert("ABCD");
        assert_eq!(buffer.to_vec(), vec!["ABCD", "WXYZ", "ABCD"]);
    }

    #[test]
    fn test_zero_capacity_stores_nothing() {
        let mut buffer = RecordBuffer::with_capacity(0);
        assert_eq!(buffer.insert(7), Some(7));
        assert!(buffer.is_empty());
    }

    #[test]
    fn test_clear() {
        let mut buffer: RecordBuffer<u8> = RecordBuffer::default();
        buffer.insert(1);
        buffer.clear();
        assert!(buffer.is_empty());
        assert_eq!(buffer.capacity(), MAX_ROWS);
    }
}
