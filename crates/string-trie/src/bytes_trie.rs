//! Cursor over a serialized byte trie.

use alloc::vec::Vec;

use crate::bytes_iter::BytesTrieIter;
use crate::codec::bytes::{
    MAX_BRANCH_LINEAR_SUB_NODE_LENGTH, MIN_LINEAR_MATCH, MIN_VALUE_LEAD, VALUE_IS_FINAL,
    jump_by_delta, read_value, skip_delta, skip_value, skip_value_bytes,
};
use crate::state::{self, TrieState};
use crate::{Error, TrieResult};

/// A light-weight cursor over a byte trie.
///
/// The cursor borrows the serialized buffer and holds only a position and a
/// pending linear-match length, so cloning it is cheap. Once a call returns
/// [`TrieResult::NoMatch`] the cursor stays stopped until [`reset`](Self::reset).
#[derive(Clone, Debug)]
pub struct BytesTrie<'a> {
    bytes: &'a [u8],
    root: usize,
    pos: Option<usize>,
    // Remaining length of a pending linear-match node, minus one.
    remaining_match_length: i32,
}

fn value_result(node: u8) -> TrieResult {
    if node & VALUE_IS_FINAL == 0 {
        TrieResult::IntermediateValue
    } else {
        TrieResult::FinalValue
    }
}

impl<'a> BytesTrie<'a> {
    /// Creates a cursor at the start of `bytes`.
    pub fn new(bytes: &'a [u8]) -> Self {
        Self::with_root(bytes, 0)
    }

    /// Creates a cursor for a trie that starts at `root` inside `bytes`.
    pub fn with_root(bytes: &'a [u8], root: usize) -> Self {
        Self {
            bytes,
            root,
            pos: Some(root),
            remaining_match_length: -1,
        }
    }

    /// Returns the cursor to the root.
    pub fn reset(&mut self) -> &mut Self {
        self.pos = Some(self.root);
        self.remaining_match_length = -1;
        self
    }

    /// Packs the cursor position into a `u64` for [`reset_to_state64`](Self::reset_to_state64).
    ///
    /// The packed state is only meaningful for a cursor over the same buffer
    /// and root.
    pub fn save_state(&self) -> u64 {
        state::pack(self.pos, self.remaining_match_length)
    }

    /// Restores a position from [`save_state`](Self::save_state) without validation.
    pub fn reset_to_state64(&mut self, saved: u64) -> &mut Self {
        (self.pos, self.remaining_match_length) = state::unpack(saved);
        self
    }

    /// Captures the cursor position along with the identity of its trie.
    pub fn state(&self) -> TrieState {
        TrieState::capture(self.bytes, self.root, self.pos, self.remaining_match_length)
    }

    /// Restores a captured position.
    ///
    /// # Errors
    ///
    /// Returns [`Error::IncompatibleState`] if `saved` was captured from a
    /// cursor over a different buffer or root.
    pub fn reset_to_state(&mut self, saved: &TrieState) -> Result<&mut Self, Error> {
        (self.pos, self.remaining_match_length) = saved.restore(self.bytes, self.root)?;
        Ok(self)
    }

    fn stop(&mut self) {
        self.pos = None;
    }

    fn result_at(&self, pos: usize, remaining_match_length: i32) -> TrieResult {
        let node = self.bytes[pos];
        if remaining_match_length < 0 && node >= MIN_VALUE_LEAD {
            value_result(node)
        } else {
            TrieResult::NoValue
        }
    }

    /// Result for the input matched so far, without consuming anything.
    pub fn current(&self) -> TrieResult {
        match self.pos {
            Some(pos) => self.result_at(pos, self.remaining_match_length),
            None => TrieResult::NoMatch,
        }
    }

    /// Resets the cursor and matches `byte`.
    pub fn first(&mut self, byte: u8) -> TrieResult {
        self.reset();
        self.next(byte)
    }

    /// Matches one more byte.
    pub fn next(&mut self, byte: u8) -> TrieResult {
        let Some(mut pos) = self.pos else {
            return TrieResult::NoMatch;
        };
        let mut length = self.remaining_match_length;
        if length < 0 {
            return self.next_impl(pos, byte);
        }
        // Continue a pending linear-match node.
        if byte == self.bytes[pos] {
            pos += 1;
            length -= 1;
            self.remaining_match_length = length;
            self.pos = Some(pos);
            self.result_at(pos, length)
        } else {
            self.stop();
            TrieResult::NoMatch
        }
    }

    fn next_impl(&mut self, mut pos: usize, byte: u8) -> TrieResult {
        loop {
            let node = self.bytes[pos];
            pos += 1;
            if node < MIN_LINEAR_MATCH {
                return self.branch_next(pos, usize::from(node), byte);
            } else if node < MIN_VALUE_LEAD {
                let length = i32::from(node - MIN_LINEAR_MATCH);
                if byte == self.bytes[pos] {
                    pos += 1;
                    self.remaining_match_length = length - 1;
                    self.pos = Some(pos);
                    return self.result_at(pos, length - 1);
                }
                break;
            } else if node & VALUE_IS_FINAL != 0 {
                break;
            } else {
                pos = skip_value_bytes(pos, node);
                debug_assert!(self.bytes[pos] < MIN_VALUE_LEAD);
            }
        }
        self.stop();
        TrieResult::NoMatch
    }

    fn branch_next(&mut self, mut pos: usize, mut length: usize, byte: u8) -> TrieResult {
        if length == 0 {
            length = usize::from(self.bytes[pos]);
            pos += 1;
        }
        length += 1;
        while length > MAX_BRANCH_LINEAR_SUB_NODE_LENGTH {
            let middle = self.bytes[pos];
            pos += 1;
            if byte < middle {
                length >>= 1;
                pos = jump_by_delta(self.bytes, pos);
            } else {
                length -= length >> 1;
                pos = skip_delta(self.bytes, pos);
            }
        }
        // Linear search over the last few units; length >= 2 here.
        loop {
            let unit = self.bytes[pos];
            pos += 1;
            if byte == unit {
                let node = self.bytes[pos];
                debug_assert!(node >= MIN_VALUE_LEAD);
                let result = if node & VALUE_IS_FINAL != 0 {
                    // Leave the final value for value() to read.
                    TrieResult::FinalValue
                } else {
                    // A non-final value here is a jump delta.
                    pos += 1;
                    #[allow(clippy::cast_sign_loss)]
                    let delta = read_value(self.bytes, pos, node >> 1) as usize;
                    pos = skip_value_bytes(pos, node) + delta;
                    self.result_at(pos, -1)
                };
                self.pos = Some(pos);
                return result;
            }
            length -= 1;
            pos = skip_value(self.bytes, pos);
            if length <= 1 {
                break;
            }
        }
        if byte == self.bytes[pos] {
            pos += 1;
            self.pos = Some(pos);
            self.result_at(pos, -1)
        } else {
            self.stop();
            TrieResult::NoMatch
        }
    }

    /// Matches a whole byte sequence.
    ///
    /// Equivalent to calling [`next`](Self::next) for each byte; an empty
    /// sequence returns [`current`](Self::current).
    #[allow(clippy::cognitive_complexity)]
    pub fn next_seq(&mut self, seq: &[u8]) -> TrieResult {
        if seq.is_empty() {
            return self.current();
        }
        let Some(mut pos) = self.pos else {
            return TrieResult::NoMatch;
        };
        let mut input = seq.iter().copied();
        let mut length = self.remaining_match_length;
        loop {
            // Fetch the next input byte, continuing a pending linear match.
            let mut byte;
            loop {
                let Some(next) = input.next() else {
                    self.remaining_match_length = length;
                    self.pos = Some(pos);
                    return self.result_at(pos, length);
                };
                byte = next;
                if length < 0 {
                    self.remaining_match_length = length;
                    break;
                }
                if byte != self.bytes[pos] {
                    self.stop();
                    return TrieResult::NoMatch;
                }
                pos += 1;
                length -= 1;
            }
            loop {
                let node = self.bytes[pos];
                pos += 1;
                if node < MIN_LINEAR_MATCH {
                    let result = self.branch_next(pos, usize::from(node), byte);
                    if result == TrieResult::NoMatch {
                        return TrieResult::NoMatch;
                    }
                    let Some(next) = input.next() else {
                        return result;
                    };
                    if result == TrieResult::FinalValue {
                        self.stop();
                        return TrieResult::NoMatch;
                    }
                    byte = next;
                    let Some(after) = self.pos else {
                        return TrieResult::NoMatch;
                    };
                    pos = after;
                } else if node < MIN_VALUE_LEAD {
                    length = i32::from(node - MIN_LINEAR_MATCH);
                    if byte != self.bytes[pos] {
                        self.stop();
                        return TrieResult::NoMatch;
                    }
                    pos += 1;
                    length -= 1;
                    break;
                } else if node & VALUE_IS_FINAL != 0 {
                    self.stop();
                    return TrieResult::NoMatch;
                } else {
                    pos = skip_value_bytes(pos, node);
                    debug_assert!(self.bytes[pos] < MIN_VALUE_LEAD);
                }
            }
        }
    }

    /// The value for the input matched so far.
    ///
    /// Only meaningful right after a call returned
    /// [`IntermediateValue`](TrieResult::IntermediateValue) or
    /// [`FinalValue`](TrieResult::FinalValue).
    pub fn value(&self) -> i32 {
        debug_assert!(
            self.current().has_value(),
            "value() called without a matched value"
        );
        let Some(pos) = self.pos else {
            return 0;
        };
        read_value(self.bytes, pos + 1, self.bytes[pos] >> 1)
    }

    /// Returns the value shared by every key that continues the current
    /// input, or `None` if there are none or they disagree.
    pub fn unique_value(&self) -> Option<i32> {
        let pos = self.pos?;
        // Skip the rest of a pending linear-match node.
        #[allow(clippy::cast_sign_loss)]
        let start = pos + (self.remaining_match_length + 1) as usize;
        let mut unique = None;
        find_unique_value(self.bytes, start, &mut unique)?;
        unique
    }

    /// Appends every byte that can continue the current input to `out` and
    /// returns how many were appended. The cursor does not move.
    pub fn next_bytes(&self, out: &mut Vec<u8>) -> usize {
        let Some(mut pos) = self.pos else {
            return 0;
        };
        if self.remaining_match_length >= 0 {
            out.push(self.bytes[pos]);
            return 1;
        }
        let mut node = self.bytes[pos];
        pos += 1;
        if node >= MIN_VALUE_LEAD {
            if node & VALUE_IS_FINAL != 0 {
                return 0;
            }
            pos = skip_value_bytes(pos, node);
            node = self.bytes[pos];
            pos += 1;
        }
        if node < MIN_LINEAR_MATCH {
            let mut length = usize::from(node);
            if length == 0 {
                length = usize::from(self.bytes[pos]);
                pos += 1;
            }
            length += 1;
            next_branch_bytes(self.bytes, pos, length, out);
            length
        } else {
            out.push(self.bytes[pos]);
            1
        }
    }

    /// Iterates over every key that continues the current input, with its value.
    pub fn iter(&self) -> BytesTrieIter<'a> {
        BytesTrieIter::from_cursor(self.bytes, self.pos, self.remaining_match_length, 0)
    }

    /// Like [`iter`](Self::iter), but stops each key after `max_length` bytes
    /// (zero means unlimited).
    pub fn iter_max_length(&self, max_length: usize) -> BytesTrieIter<'a> {
        BytesTrieIter::from_cursor(self.bytes, self.pos, self.remaining_match_length, max_length)
    }
}

/// Walks every node reachable from `pos`. Returns `None` on conflicting values.
fn find_unique_value(bytes: &[u8], mut pos: usize, unique: &mut Option<i32>) -> Option<()> {
    loop {
        let node = bytes[pos];
        pos += 1;
        if node < MIN_LINEAR_MATCH {
            let mut length = usize::from(node);
            if length == 0 {
                length = usize::from(bytes[pos]);
                pos += 1;
            }
            pos = find_unique_value_from_branch(bytes, pos, length + 1, unique)?;
        } else if node < MIN_VALUE_LEAD {
            pos += usize::from(node - MIN_LINEAR_MATCH) + 1;
        } else {
            merge_unique(unique, read_value(bytes, pos, node >> 1))?;
            if node & VALUE_IS_FINAL != 0 {
                return Some(());
            }
            pos = skip_value_bytes(pos, node);
        }
    }
}

/// Returns the position of the branch's last sub-node.
#[allow(clippy::cast_sign_loss)]
fn find_unique_value_from_branch(
    bytes: &[u8],
    mut pos: usize,
    mut length: usize,
    unique: &mut Option<i32>,
) -> Option<usize> {
    while length > MAX_BRANCH_LINEAR_SUB_NODE_LENGTH {
        pos += 1; // comparison byte
        find_unique_value_from_branch(bytes, jump_by_delta(bytes, pos), length >> 1, unique)?;
        length -= length >> 1;
        pos = skip_delta(bytes, pos);
    }
    while length > 1 {
        pos += 1; // key byte
        let node = bytes[pos];
        let value = read_value(bytes, pos + 1, node >> 1);
        pos = skip_value_bytes(pos + 1, node);
        if node & VALUE_IS_FINAL != 0 {
            merge_unique(unique, value)?;
        } else {
            find_unique_value(bytes, pos + value as usize, unique)?;
        }
        length -= 1;
    }
    // The last key byte has no value; its sub-node follows directly.
    Some(pos + 1)
}

pub(crate) fn merge_unique(unique: &mut Option<i32>, value: i32) -> Option<()> {
    match *unique {
        Some(existing) if existing != value => None,
        _ => {
            *unique = Some(value);
            Some(())
        }
    }
}

fn next_branch_bytes(bytes: &[u8], mut pos: usize, mut length: usize, out: &mut Vec<u8>) {
    while length > MAX_BRANCH_LINEAR_SUB_NODE_LENGTH {
        pos += 1; // comparison byte
        next_branch_bytes(bytes, jump_by_delta(bytes, pos), length >> 1, out);
        length -= length >> 1;
        pos = skip_delta(bytes, pos);
    }
    while length > 1 {
        out.push(bytes[pos]);
        pos = skip_value(bytes, pos + 1);
        length -= 1;
    }
    out.push(bytes[pos]);
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use alloc::format;
    use alloc::string::String;
    use alloc::vec;
    use alloc::vec::Vec;

    use super::BytesTrie;
    use crate::{BytesTrieBuilder, Error, TrieResult};

    fn build(entries: &[(&str, i32)]) -> Vec<u8> {
        entries.iter().copied().collect::<BytesTrieBuilder>().build().unwrap()
    }

    #[test]
    fn prefix_chain() {
        let bytes = build(&[("a", 1), ("ab", 2), ("abc", 3)]);
        let mut trie = BytesTrie::new(&bytes);
        assert_eq!(trie.current(), TrieResult::NoValue);
        assert_eq!(trie.next(b'a'), TrieResult::IntermediateValue);
        assert_eq!(trie.value(), 1);
        assert_eq!(trie.next(b'b'), TrieResult::IntermediateValue);
        assert_eq!(trie.value(), 2);
        assert_eq!(trie.next(b'c'), TrieResult::FinalValue);
        assert_eq!(trie.value(), 3);
        assert_eq!(trie.next(b'x'), TrieResult::NoMatch);
        assert_eq!(trie.current(), TrieResult::NoMatch);
        assert_eq!(trie.next(b'a'), TrieResult::NoMatch);
        assert_eq!(trie.first(b'a'), TrieResult::IntermediateValue);
    }

    #[test]
    fn wide_branch_finds_every_key() {
        let keys: Vec<(String, i32)> = (0u8..40)
            .map(|i| (format!("{}x{i}", char::from(b'0' + i)), i32::from(i) * 1000 - 7))
            .collect();
        let bytes = keys
            .iter()
            .map(|(k, v)| (k.as_str(), *v))
            .collect::<BytesTrieBuilder>()
            .build()
            .unwrap();
        let mut trie = BytesTrie::new(&bytes);
        for (key, value) in &keys {
            let result = trie.reset().next_seq(key.as_bytes());
            assert_eq!(result, TrieResult::FinalValue, "{key}");
            assert_eq!(trie.value(), *value, "{key}");
        }
        assert_eq!(trie.reset().next_seq(b"0y"), TrieResult::NoMatch);
        assert_eq!(trie.reset().next(b'~'), TrieResult::NoMatch);
    }

    #[test]
    fn batch_matches_single_steps() {
        let bytes = build(&[
            ("", 9),
            ("abcdefghijklmnopqrstuvwxyz", 1),
            ("abcq", -2),
            ("b", 3),
            ("bc", 70_000),
            ("bcd", 0x7fff_ffff),
        ]);
        let inputs: [&[u8]; 8] = [
            b"",
            b"abc",
            b"abcdefghijklmnopqrstuvwxyz",
            b"abcdefghijklmnopqrstuvwxyz!",
            b"abcq",
            b"bcd",
            b"bce",
            b"q",
        ];
        for input in inputs {
            let mut batch = BytesTrie::new(&bytes);
            let batch_result = batch.next_seq(input);
            let mut single = BytesTrie::new(&bytes);
            let mut single_result = single.current();
            for &b in input {
                single_result = single.next(b);
            }
            assert_eq!(batch_result, single_result, "{input:?}");
            assert_eq!(batch.save_state(), single.save_state(), "{input:?}");
            if batch_result.has_value() {
                assert_eq!(batch.value(), single.value());
            }
        }
    }

    #[test]
    fn unique_value_detects_conflicts() {
        let bytes = build(&[("ax", 5), ("ay", 5), ("b", 6), ("bz", 7)]);
        let mut trie = BytesTrie::new(&bytes);
        assert_eq!(trie.unique_value(), None);
        trie.next(b'a');
        assert_eq!(trie.unique_value(), Some(5));
        trie.reset().next(b'b');
        assert_eq!(trie.unique_value(), None);
        trie.next(b'z');
        assert_eq!(trie.unique_value(), Some(7));
    }

    #[test]
    fn unique_value_inside_linear_match() {
        let bytes = build(&[("hello", -4)]);
        let mut trie = BytesTrie::new(&bytes);
        trie.next(b'h');
        assert_eq!(trie.unique_value(), Some(-4));
        trie.next(b'q');
        assert_eq!(trie.unique_value(), None);
    }

    #[test]
    fn next_bytes_lists_continuations() {
        let bytes = build(&[("a", 1), ("b", 2), ("c", 3), ("d", 4), ("e", 5), ("f", 6), ("fg", 7)]);
        let mut trie = BytesTrie::new(&bytes);
        let mut out = Vec::new();
        assert_eq!(trie.next_bytes(&mut out), 6);
        assert_eq!(out, b"abcdef");
        out.clear();
        trie.next(b'f');
        assert_eq!(trie.next_bytes(&mut out), 1);
        assert_eq!(out, vec![b'g']);
        out.clear();
        trie.next(b'g');
        assert_eq!(trie.next_bytes(&mut out), 0);
    }

    #[test]
    fn saved_state_round_trips() {
        let bytes = build(&[("abc", 1), ("abd", 2), ("xyz", 3)]);
        let mut trie = BytesTrie::new(&bytes);
        trie.next(b'a');
        let saved = trie.save_state();
        let state = trie.state();
        assert_eq!(trie.next(b'b'), TrieResult::NoValue);
        assert_eq!(trie.next(b'd'), TrieResult::FinalValue);
        trie.reset_to_state64(saved);
        assert_eq!(trie.next_seq(b"bc"), TrieResult::FinalValue);
        assert_eq!(trie.value(), 1);
        trie.reset_to_state(&state).unwrap();
        assert_eq!(trie.next_seq(b"bd"), TrieResult::FinalValue);
        assert_eq!(trie.value(), 2);

        let other = bytes.clone();
        let mut foreign = BytesTrie::new(&other);
        assert_eq!(
            foreign.reset_to_state(&state).unwrap_err(),
            Error::IncompatibleState
        );
    }

    #[test]
    fn clone_is_independent() {
        let bytes = build(&[("ab", 1), ("ac", 2)]);
        let mut trie = BytesTrie::new(&bytes);
        trie.next(b'a');
        let mut copy = trie.clone();
        assert_eq!(copy.next(b'c'), TrieResult::FinalValue);
        assert_eq!(trie.next(b'b'), TrieResult::FinalValue);
        assert_eq!(trie.value(), 1);
        assert_eq!(copy.value(), 2);
    }
}
