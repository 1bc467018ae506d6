//! Key and branch bookkeeping shared by [`BytesTrieIter`](crate::BytesTrieIter)
//! and [`UnitsTrieIter`](crate::UnitsTrieIter).

use alloc::vec::Vec;

/// Resume point for an unexplored part of a branch.
#[derive(Clone, Copy, Debug)]
pub(crate) struct Frame {
    pub(crate) pos: usize,
    pub(crate) remaining: usize,
    pub(crate) key_len: usize,
}

/// State of a depth-first walk over a trie of `T` units.
#[derive(Clone, Debug)]
pub(crate) struct Walk<'a, T> {
    pub(crate) units: &'a [T],
    initial_pos: Option<usize>,
    initial_remaining_match_length: i32,
    pub(crate) pos: Option<usize>,
    pub(crate) remaining_match_length: i32,
    max_length: usize,
    pub(crate) key: Vec<T>,
    pub(crate) value: i32,
    stack: Vec<Frame>,
}

impl<'a, T: Copy> Walk<'a, T> {
    pub(crate) fn new(
        units: &'a [T],
        pos: Option<usize>,
        remaining_match_length: i32,
        max_length: usize,
    ) -> Self {
        let mut walk = Self {
            units,
            initial_pos: pos,
            initial_remaining_match_length: remaining_match_length,
            pos,
            remaining_match_length,
            max_length,
            key: Vec::new(),
            value: 0,
            stack: Vec::new(),
        };
        walk.reset();
        walk
    }

    #[allow(clippy::cast_sign_loss, clippy::cast_possible_truncation, clippy::cast_possible_wrap)]
    pub(crate) fn reset(&mut self) {
        self.pos = self.initial_pos;
        self.remaining_match_length = self.initial_remaining_match_length;
        self.key.clear();
        self.stack.clear();
        self.value = 0;
        if let Some(pos) = self.pos
            && self.remaining_match_length >= 0
        {
            // Start with the rest of a pending linear-match node.
            let mut length = (self.remaining_match_length + 1) as usize;
            if self.max_length > 0 && length > self.max_length {
                // Leaves remaining_match_length >= 0 as a truncation signal.
                length = self.max_length;
            }
            self.key.extend_from_slice(&self.units[pos..pos + length]);
            self.pos = Some(pos + length);
            self.remaining_match_length -= length as i32;
        }
    }

    pub(crate) fn has_next(&self) -> bool {
        self.pos.is_some() || !self.stack.is_empty()
    }

    pub(crate) fn at_max_length(&self) -> bool {
        self.max_length > 0 && self.key.len() == self.max_length
    }

    /// Ends the current descent on `value`.
    pub(crate) fn finish(&mut self, value: i32) {
        self.pos = None;
        self.value = value;
    }

    /// Ends the current descent on a key cut off at `max_length`.
    pub(crate) fn truncate(&mut self) -> bool {
        self.finish(-1);
        true
    }

    /// Remembers `remaining` branch units at `pos` under the current key.
    pub(crate) fn push_frame(&mut self, pos: usize, remaining: usize) {
        self.stack.push(Frame {
            pos,
            remaining,
            key_len: self.key.len(),
        });
    }

    /// Takes the most recent pending branch and restores its key prefix.
    pub(crate) fn pop_frame(&mut self) -> Option<Frame> {
        let frame = self.stack.pop()?;
        self.key.truncate(frame.key_len);
        Some(frame)
    }

    /// Appends the `length` units of a linear-match node at `pos`. Returns
    /// `false` if the key had to be cut off at `max_length`.
    pub(crate) fn extend_linear(&mut self, pos: usize, length: usize) -> bool {
        if self.max_length > 0 && self.key.len() + length > self.max_length {
            let take = self.max_length - self.key.len();
            self.key.extend_from_slice(&self.units[pos..pos + take]);
            return false;
        }
        self.key.extend_from_slice(&self.units[pos..pos + length]);
        true
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::Walk;

    #[test]
    fn linear_runs_stop_at_max_length() {
        let units = [1_u16, 2, 3, 4, 5];
        let mut walk = Walk::new(&units, Some(0), -1, 3);
        assert!(walk.extend_linear(0, 2));
        assert!(!walk.extend_linear(2, 3));
        assert_eq!(walk.key, [1, 2, 3]);
        assert!(walk.at_max_length());
        assert!(walk.truncate());
        assert_eq!((walk.pos, walk.value), (None, -1));
    }

    #[test]
    fn frames_restore_the_key_prefix() {
        let units = b"abcdef";
        let mut walk = Walk::new(units, Some(0), -1, 0);
        walk.key.push(b'a');
        walk.push_frame(4, 2);
        walk.key.extend_from_slice(b"bc");
        let frame = walk.pop_frame().unwrap();
        assert_eq!((frame.pos, frame.remaining), (4, 2));
        assert_eq!(walk.key, b"a");
        assert!(walk.pop_frame().is_none());
    }

    #[test]
    fn reset_resumes_inside_a_linear_match() {
        let units = b"xyz";
        let mut walk = Walk::new(units, Some(0), 2, 2);
        assert_eq!(walk.key, b"xy");
        assert_eq!(walk.pos, Some(2));
        assert_eq!(walk.remaining_match_length, 0);
        walk.key.clear();
        walk.reset();
        assert_eq!(walk.key, b"xy");
    }
}
