//! Enumerates the `(key, value)` entries of a byte trie.

use alloc::vec::Vec;

use crate::codec::bytes::{
    MAX_BRANCH_LINEAR_SUB_NODE_LENGTH, MIN_LINEAR_MATCH, MIN_VALUE_LEAD, VALUE_IS_FINAL,
    jump_by_delta, read_value, skip_delta, skip_value_bytes,
};
use crate::walk::Walk;

/// Iterator over the entries of a byte trie, in key order.
///
/// [`advance`](Self::advance) reuses one key buffer across steps; the
/// [`Iterator`] implementation copies each key out.
///
/// With a non-zero `max_length`, keys are cut off at that many bytes. A key
/// cut off before reaching a value is reported with the value `-1`, which is
/// indistinguishable from a stored `-1`.
#[derive(Clone, Debug)]
pub struct BytesTrieIter<'a> {
    walk: Walk<'a, u8>,
}

impl<'a> BytesTrieIter<'a> {
    /// Iterates over the whole trie in `bytes`. A `max_length` of zero means
    /// unlimited.
    pub fn new(bytes: &'a [u8], max_length: usize) -> Self {
        Self::from_cursor(bytes, Some(0), -1, max_length)
    }

    pub(crate) fn from_cursor(
        bytes: &'a [u8],
        pos: Option<usize>,
        remaining_match_length: i32,
        max_length: usize,
    ) -> Self {
        Self {
            walk: Walk::new(bytes, pos, remaining_match_length, max_length),
        }
    }

    /// Restarts from the cursor position the iterator was created at.
    pub fn reset(&mut self) -> &mut Self {
        self.walk.reset();
        self
    }

    /// Whether [`advance`](Self::advance) can produce another entry.
    pub fn has_next(&self) -> bool {
        self.walk.has_next()
    }

    /// The key of the current entry.
    pub fn key(&self) -> &[u8] {
        &self.walk.key
    }

    /// The value of the current entry, or `-1` for a truncated key.
    pub fn value(&self) -> i32 {
        self.walk.value
    }

    /// Moves to the next entry. Returns `false` once the trie is exhausted.
    #[allow(clippy::cognitive_complexity)]
    pub fn advance(&mut self) -> bool {
        let bytes = self.walk.units;
        let mut pos = match self.walk.pos {
            Some(pos) => pos,
            None => {
                let Some(frame) = self.walk.pop_frame() else {
                    return false;
                };
                if frame.remaining > 1 {
                    match self.branch_next(frame.pos, frame.remaining) {
                        Some(pos) => pos,
                        None => return true,
                    }
                } else {
                    self.walk.key.push(bytes[frame.pos]);
                    frame.pos + 1
                }
            }
        };
        if self.walk.remaining_match_length >= 0 {
            // Started inside a linear-match node longer than max_length.
            return self.walk.truncate();
        }
        loop {
            let node = bytes[pos];
            pos += 1;
            if node >= MIN_VALUE_LEAD {
                self.walk.value = read_value(bytes, pos, node >> 1);
                self.walk.pos = if node & VALUE_IS_FINAL != 0 || self.walk.at_max_length() {
                    None
                } else {
                    Some(skip_value_bytes(pos, node))
                };
                return true;
            }
            if self.walk.at_max_length() {
                return self.walk.truncate();
            }
            if node < MIN_LINEAR_MATCH {
                let mut length = usize::from(node);
                if length == 0 {
                    length = usize::from(bytes[pos]);
                    pos += 1;
                }
                match self.branch_next(pos, length + 1) {
                    Some(next) => pos = next,
                    None => return true,
                }
            } else {
                let length = usize::from(node - MIN_LINEAR_MATCH) + 1;
                if !self.walk.extend_linear(pos, length) {
                    return self.walk.truncate();
                }
                pos += length;
            }
        }
    }

    /// Descends into the first unit of a branch, pushing frames for the rest.
    /// Returns `None` if that unit ends in a final value.
    #[allow(clippy::cast_sign_loss)]
    fn branch_next(&mut self, mut pos: usize, mut length: usize) -> Option<usize> {
        let bytes = self.walk.units;
        while length > MAX_BRANCH_LINEAR_SUB_NODE_LENGTH {
            pos += 1; // comparison byte
            self.walk.push_frame(skip_delta(bytes, pos), length - (length >> 1));
            length >>= 1;
            pos = jump_by_delta(bytes, pos);
        }
        let unit = bytes[pos];
        let node = bytes[pos + 1];
        pos += 2;
        let value = read_value(bytes, pos, node >> 1);
        pos = skip_value_bytes(pos, node);
        self.walk.push_frame(pos, length - 1);
        self.walk.key.push(unit);
        if node & VALUE_IS_FINAL != 0 {
            self.walk.finish(value);
            None
        } else {
            Some(pos + value as usize)
        }
    }
}

impl Iterator for BytesTrieIter<'_> {
    type Item = (Vec<u8>, i32);

    fn next(&mut self) -> Option<Self::Item> {
        self.advance().then(|| (self.walk.key.clone(), self.walk.value))
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use alloc::vec;
    use alloc::vec::Vec;

    use super::BytesTrieIter;
    use crate::{BytesTrie, BytesTrieBuilder};

    const KEYS: &[(&str, i32)] = &[
        ("", -3),
        ("a", 1),
        ("ab", 2),
        ("abcdefghijklmnopqrstuvwxyz0123456789", 0x1234_5678),
        ("b", 3),
        ("c", 4),
        ("d", 5),
        ("e", 6),
        ("f", 7),
        ("g", 8),
        ("gh", -9),
    ];

    fn trie_bytes() -> Vec<u8> {
        KEYS.iter().copied().collect::<BytesTrieBuilder>().build().unwrap()
    }

    #[test]
    fn yields_every_entry_in_order() {
        let bytes = trie_bytes();
        let entries: Vec<(Vec<u8>, i32)> = BytesTrieIter::new(&bytes, 0).collect();
        let expected: Vec<(Vec<u8>, i32)> = KEYS
            .iter()
            .map(|(k, v)| (k.as_bytes().to_vec(), *v))
            .collect();
        assert_eq!(entries, expected);
    }

    #[test]
    fn reset_repeats_the_same_entries() {
        let bytes = trie_bytes();
        let mut iter = BytesTrieIter::new(&bytes, 0);
        let first: Vec<_> = iter.by_ref().collect();
        assert!(!iter.has_next());
        iter.reset();
        let second: Vec<_> = iter.collect();
        assert_eq!(first, second);
    }

    #[test]
    fn truncates_at_max_length() {
        let bytes = [("abcdef", 1), ("abx", 2), ("q", 3)]
            .into_iter()
            .collect::<BytesTrieBuilder>()
            .build()
            .unwrap();
        let entries: Vec<_> = BytesTrieIter::new(&bytes, 2).collect();
        assert_eq!(entries, vec![(b"ab".to_vec(), -1), (b"q".to_vec(), 3)]);

        let entries: Vec<_> = BytesTrieIter::new(&bytes, 4).collect();
        assert_eq!(
            entries,
            vec![
                (b"abcd".to_vec(), -1),
                (b"abx".to_vec(), 2),
                (b"q".to_vec(), 3)
            ]
        );
    }

    #[test]
    fn starts_from_cursor_inside_linear_match() {
        let bytes = trie_bytes();
        let mut trie = BytesTrie::new(&bytes);
        trie.next_seq(b"abc");
        let entries: Vec<_> = trie.iter().collect();
        assert_eq!(
            entries,
            vec![(b"defghijklmnopqrstuvwxyz0123456789".to_vec(), 0x1234_5678)]
        );

        let mut iter = trie.iter_max_length(3);
        assert!(iter.advance());
        assert_eq!(iter.key(), b"def");
        assert_eq!(iter.value(), -1);
        assert!(!iter.advance());
    }

    #[test]
    fn stopped_cursor_has_no_entries() {
        let bytes = trie_bytes();
        let mut trie = BytesTrie::new(&bytes);
        trie.next(b'z');
        assert_eq!(trie.iter().count(), 0);
    }

    #[test]
    fn iteration_matches_exhaustive_walk() {
        let bytes = trie_bytes();
        // Every iterated key reaches its value through the cursor.
        let mut trie = BytesTrie::new(&bytes);
        for (key, value) in BytesTrieIter::new(&bytes, 0) {
            assert!(trie.reset().next_seq(&key).has_value());
            assert_eq!(trie.value(), value);
        }
    }
}
