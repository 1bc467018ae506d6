//! Cursor over a serialized trie of 16-bit code units.

use alloc::vec::Vec;

use crate::bytes_trie::merge_unique;
use crate::codec::units::{
    MAX_BRANCH_LINEAR_SUB_NODE_LENGTH, MIN_LINEAR_MATCH, MIN_VALUE_LEAD, NODE_TYPE_MASK,
    VALUE_IS_FINAL, jump_by_delta, read_node_value, read_value, skip_delta, skip_node_value,
    skip_value, skip_value_units,
};
use crate::state::{self, TrieState};
use crate::units_iter::UnitsTrieIter;
use crate::{Error, TrieResult};

/// A light-weight cursor over a trie keyed by 16-bit units, such as UTF-16
/// text.
///
/// Behaves like [`BytesTrie`](crate::BytesTrie). Intermediate values share
/// their lead unit with the node that follows them.
#[derive(Clone, Debug)]
pub struct UnitsTrie<'a> {
    units: &'a [u16],
    root: usize,
    pos: Option<usize>,
    remaining_match_length: i32,
}

fn value_result(node: u16) -> TrieResult {
    if node & VALUE_IS_FINAL == 0 {
        TrieResult::IntermediateValue
    } else {
        TrieResult::FinalValue
    }
}

impl<'a> UnitsTrie<'a> {
    pub fn new(units: &'a [u16]) -> Self {
        Self::with_root(units, 0)
    }

    pub fn with_root(units: &'a [u16], root: usize) -> Self {
        Self {
            units,
            root,
            pos: Some(root),
            remaining_match_length: -1,
        }
    }

    pub fn reset(&mut self) -> &mut Self {
        self.pos = Some(self.root);
        self.remaining_match_length = -1;
        self
    }

    pub fn save_state(&self) -> u64 {
        state::pack(self.pos, self.remaining_match_length)
    }

    pub fn reset_to_state64(&mut self, saved: u64) -> &mut Self {
        (self.pos, self.remaining_match_length) = state::unpack(saved);
        self
    }

    pub fn state(&self) -> TrieState {
        TrieState::capture(self.units, self.root, self.pos, self.remaining_match_length)
    }

    /// Restores a captured position.
    ///
    /// # Errors
    ///
    /// Returns [`Error::IncompatibleState`] if `saved` belongs to another trie.
    pub fn reset_to_state(&mut self, saved: &TrieState) -> Result<&mut Self, Error> {
        (self.pos, self.remaining_match_length) = saved.restore(self.units, self.root)?;
        Ok(self)
    }

    fn stop(&mut self) {
        self.pos = None;
    }

    fn result_at(&self, pos: usize, remaining_match_length: i32) -> TrieResult {
        let node = self.units[pos];
        if remaining_match_length < 0 && node >= MIN_VALUE_LEAD {
            value_result(node)
        } else {
            TrieResult::NoValue
        }
    }

    pub fn current(&self) -> TrieResult {
        match self.pos {
            Some(pos) => self.result_at(pos, self.remaining_match_length),
            None => TrieResult::NoMatch,
        }
    }

    pub fn first(&mut self, unit: u16) -> TrieResult {
        self.reset();
        self.next(unit)
    }

    /// Resets the cursor and matches a code point, as one or two UTF-16 units.
    pub fn first_char(&mut self, c: char) -> TrieResult {
        self.reset();
        self.next_char(c)
    }

    pub fn next(&mut self, unit: u16) -> TrieResult {
        let Some(mut pos) = self.pos else {
            return TrieResult::NoMatch;
        };
        let mut length = self.remaining_match_length;
        if length < 0 {
            return self.next_impl(pos, unit);
        }
        if unit == self.units[pos] {
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

    /// Matches a code point, as one or two UTF-16 units.
    pub fn next_char(&mut self, c: char) -> TrieResult {
        let mut buf = [0u16; 2];
        self.next_seq(c.encode_utf16(&mut buf))
    }

    fn next_impl(&mut self, mut pos: usize, unit: u16) -> TrieResult {
        let mut node = self.units[pos];
        pos += 1;
        loop {
            if node < MIN_LINEAR_MATCH {
                return self.branch_next(pos, usize::from(node), unit);
            } else if node < MIN_VALUE_LEAD {
                let length = i32::from(node - MIN_LINEAR_MATCH);
                if unit == self.units[pos] {
                    pos += 1;
                    self.remaining_match_length = length - 1;
                    self.pos = Some(pos);
                    return self.result_at(pos, length - 1);
                }
                break;
            } else if node & VALUE_IS_FINAL != 0 {
                break;
            } else {
                pos = skip_node_value(pos, node);
                node &= NODE_TYPE_MASK;
            }
        }
        self.stop();
        TrieResult::NoMatch
    }

    fn branch_next(&mut self, mut pos: usize, mut length: usize, unit: u16) -> TrieResult {
        if length == 0 {
            length = usize::from(self.units[pos]);
            pos += 1;
        }
        length += 1;
        while length > MAX_BRANCH_LINEAR_SUB_NODE_LENGTH {
            let middle = self.units[pos];
            pos += 1;
            if unit < middle {
                length >>= 1;
                pos = jump_by_delta(self.units, pos);
            } else {
                length -= length >> 1;
                pos = skip_delta(self.units, pos);
            }
        }
        loop {
            let key = self.units[pos];
            pos += 1;
            if unit == key {
                let node = self.units[pos];
                let result = if node & VALUE_IS_FINAL != 0 {
                    TrieResult::FinalValue
                } else {
                    pos += 1;
                    #[allow(clippy::cast_sign_loss)]
                    let delta = read_value(self.units, pos, node) as usize;
                    pos = skip_value_units(pos, node) + delta;
                    self.result_at(pos, -1)
                };
                self.pos = Some(pos);
                return result;
            }
            length -= 1;
            pos = skip_value(self.units, pos);
            if length <= 1 {
                break;
            }
        }
        if unit == self.units[pos] {
            pos += 1;
            self.pos = Some(pos);
            self.result_at(pos, -1)
        } else {
            self.stop();
            TrieResult::NoMatch
        }
    }

    /// Matches a whole unit sequence; same result and state as calling
    /// [`next`](Self::next) for each unit.
    #[allow(clippy::cognitive_complexity)]
    pub fn next_seq(&mut self, seq: &[u16]) -> TrieResult {
        if seq.is_empty() {
            return self.current();
        }
        let Some(mut pos) = self.pos else {
            return TrieResult::NoMatch;
        };
        let mut input = seq.iter().copied();
        let mut length = self.remaining_match_length;
        loop {
            let mut unit;
            loop {
                let Some(next) = input.next() else {
                    self.remaining_match_length = length;
                    self.pos = Some(pos);
                    return self.result_at(pos, length);
                };
                unit = next;
                if length < 0 {
                    self.remaining_match_length = length;
                    break;
                }
                if unit != self.units[pos] {
                    self.stop();
                    return TrieResult::NoMatch;
                }
                pos += 1;
                length -= 1;
            }
            let mut node = self.units[pos];
            pos += 1;
            loop {
                if node < MIN_LINEAR_MATCH {
                    let result = self.branch_next(pos, usize::from(node), unit);
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
                    unit = next;
                    let Some(after) = self.pos else {
                        return TrieResult::NoMatch;
                    };
                    node = self.units[after];
                    pos = after + 1;
                } else if node < MIN_VALUE_LEAD {
                    length = i32::from(node - MIN_LINEAR_MATCH);
                    if unit != self.units[pos] {
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
                    pos = skip_node_value(pos, node);
                    node &= NODE_TYPE_MASK;
                }
            }
        }
    }

    /// Matches a string as UTF-16.
    pub fn next_str(&mut self, s: &str) -> TrieResult {
        let units: Vec<u16> = s.encode_utf16().collect();
        self.next_seq(&units)
    }

    /// The value for the input matched so far; see [`BytesTrie::value`](crate::BytesTrie::value).
    pub fn value(&self) -> i32 {
        debug_assert!(
            self.current().has_value(),
            "value() called without a matched value"
        );
        let Some(pos) = self.pos else {
            return 0;
        };
        let lead = self.units[pos];
        if lead & VALUE_IS_FINAL != 0 {
            read_value(self.units, pos + 1, lead & !VALUE_IS_FINAL)
        } else {
            read_node_value(self.units, pos + 1, lead)
        }
    }

    pub fn unique_value(&self) -> Option<i32> {
        let pos = self.pos?;
        #[allow(clippy::cast_sign_loss)]
        let start = pos + (self.remaining_match_length + 1) as usize;
        let mut unique = None;
        find_unique_value(self.units, start, &mut unique)?;
        unique
    }

    /// Appends every unit that can continue the current input to `out` and
    /// returns how many were appended.
    pub fn next_units(&self, out: &mut Vec<u16>) -> usize {
        let Some(mut pos) = self.pos else {
            return 0;
        };
        if self.remaining_match_length >= 0 {
            out.push(self.units[pos]);
            return 1;
        }
        let mut node = self.units[pos];
        pos += 1;
        if node >= MIN_VALUE_LEAD {
            if node & VALUE_IS_FINAL != 0 {
                return 0;
            }
            pos = skip_node_value(pos, node);
            node &= NODE_TYPE_MASK;
        }
        if node < MIN_LINEAR_MATCH {
            let mut length = usize::from(node);
            if length == 0 {
                length = usize::from(self.units[pos]);
                pos += 1;
            }
            length += 1;
            next_branch_units(self.units, pos, length, out);
            length
        } else {
            out.push(self.units[pos]);
            1
        }
    }

    pub fn iter(&self) -> UnitsTrieIter<'a> {
        UnitsTrieIter::from_cursor(self.units, self.pos, self.remaining_match_length, 0)
    }

    pub fn iter_max_length(&self, max_length: usize) -> UnitsTrieIter<'a> {
        UnitsTrieIter::from_cursor(self.units, self.pos, self.remaining_match_length, max_length)
    }
}

fn find_unique_value(units: &[u16], mut pos: usize, unique: &mut Option<i32>) -> Option<()> {
    let mut node = units[pos];
    pos += 1;
    loop {
        if node < MIN_LINEAR_MATCH {
            let mut length = usize::from(node);
            if length == 0 {
                length = usize::from(units[pos]);
                pos += 1;
            }
            pos = find_unique_value_from_branch(units, pos, length + 1, unique)?;
            node = units[pos];
            pos += 1;
        } else if node < MIN_VALUE_LEAD {
            pos += usize::from(node - MIN_LINEAR_MATCH) + 1;
            node = units[pos];
            pos += 1;
        } else {
            let is_final = node & VALUE_IS_FINAL != 0;
            let value = if is_final {
                read_value(units, pos, node & !VALUE_IS_FINAL)
            } else {
                read_node_value(units, pos, node)
            };
            merge_unique(unique, value)?;
            if is_final {
                return Some(());
            }
            pos = skip_node_value(pos, node);
            node &= NODE_TYPE_MASK;
        }
    }
}

#[allow(clippy::cast_sign_loss)]
fn find_unique_value_from_branch(
    units: &[u16],
    mut pos: usize,
    mut length: usize,
    unique: &mut Option<i32>,
) -> Option<usize> {
    while length > MAX_BRANCH_LINEAR_SUB_NODE_LENGTH {
        pos += 1;
        find_unique_value_from_branch(units, jump_by_delta(units, pos), length >> 1, unique)?;
        length -= length >> 1;
        pos = skip_delta(units, pos);
    }
    while length > 1 {
        pos += 1;
        let node = units[pos];
        pos += 1;
        let lead = node & !VALUE_IS_FINAL;
        let value = read_value(units, pos, lead);
        pos = skip_value_units(pos, lead);
        if node & VALUE_IS_FINAL != 0 {
            merge_unique(unique, value)?;
        } else {
            find_unique_value(units, pos + value as usize, unique)?;
        }
        length -= 1;
    }
    Some(pos + 1)
}

fn next_branch_units(units: &[u16], mut pos: usize, mut length: usize, out: &mut Vec<u16>) {
    while length > MAX_BRANCH_LINEAR_SUB_NODE_LENGTH {
        pos += 1;
        next_branch_units(units, jump_by_delta(units, pos), length >> 1, out);
        length -= length >> 1;
        pos = skip_delta(units, pos);
    }
    while length > 1 {
        out.push(units[pos]);
        pos = skip_value(units, pos + 1);
        length -= 1;
    }
    out.push(units[pos]);
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use alloc::string::String;
    use alloc::vec::Vec;

    use super::UnitsTrie;
    use crate::{TrieResult, UnitsTrieBuilder};

    fn build(entries: &[(&str, i32)]) -> Vec<u16> {
        entries.iter().copied().collect::<UnitsTrieBuilder>().build().unwrap()
    }

    #[test]
    fn prefix_chain() {
        let units = build(&[("a", 1), ("ab", 2), ("abc", 3)]);
        let mut trie = UnitsTrie::new(&units);
        assert_eq!(trie.next(u16::from(b'a')), TrieResult::IntermediateValue);
        assert_eq!(trie.value(), 1);
        assert_eq!(trie.next(u16::from(b'b')), TrieResult::IntermediateValue);
        assert_eq!(trie.value(), 2);
        assert_eq!(trie.next(u16::from(b'c')), TrieResult::FinalValue);
        assert_eq!(trie.value(), 3);
        assert_eq!(trie.next(u16::from(b'x')), TrieResult::NoMatch);
    }

    #[test]
    fn large_node_values() {
        let units = build(&[
            ("k", 0x1234_5678),
            ("kk", -1),
            ("kkk", 0x100),
            ("kkkk", 0xfd_ffff),
            ("kkkkk", 0x3fff),
            ("kkkkkk", 0x4000),
        ]);
        let mut trie = UnitsTrie::new(&units);
        for (len, expected) in [0x1234_5678, -1, 0x100, 0xfd_ffff, 0x3fff, 0x4000]
            .into_iter()
            .enumerate()
        {
            let result = trie.next(u16::from(b'k'));
            assert!(result.has_value(), "length {}", len + 1);
            assert_eq!(trie.value(), expected, "length {}", len + 1);
        }
        assert_eq!(trie.current(), TrieResult::FinalValue);
    }

    #[test]
    fn supplementary_characters() {
        let units = build(&[("\u{1F600}", 1), ("\u{1F601}x", 2), ("\u{FFFF}", 3)]);
        let mut trie = UnitsTrie::new(&units);
        assert_eq!(trie.first_char('\u{1F600}'), TrieResult::FinalValue);
        assert_eq!(trie.value(), 1);
        assert_eq!(trie.first_char('\u{1F601}'), TrieResult::NoValue);
        assert_eq!(trie.next_char('x'), TrieResult::FinalValue);
        assert_eq!(trie.value(), 2);
        assert_eq!(trie.reset().next_str("\u{FFFF}"), TrieResult::FinalValue);
        assert_eq!(trie.value(), 3);
    }

    #[test]
    fn batch_matches_single_steps() {
        let words = [
            "apple", "applesauce", "apply", "banana", "band", "bandana", "can", "cannot", "cant",
            "d", "e", "f", "g",
        ];
        let entries: Vec<(&str, i32)> = words.iter().zip(10..).map(|(w, v)| (*w, v)).collect();
        let units = build(&entries);
        let inputs = ["", "app", "apple", "applesauce!", "band", "bandanas", "ca", "cannot", "z"];
        for input in inputs {
            let seq: Vec<u16> = input.encode_utf16().collect();
            let mut batch = UnitsTrie::new(&units);
            let batch_result = batch.next_seq(&seq);
            let mut single = UnitsTrie::new(&units);
            let mut single_result = single.current();
            for &u in &seq {
                single_result = single.next(u);
            }
            assert_eq!(batch_result, single_result, "{input}");
            assert_eq!(batch.save_state(), single.save_state(), "{input}");
            if batch_result.has_value() {
                assert_eq!(batch.value(), single.value(), "{input}");
            }
        }
    }

    #[test]
    fn unique_value_and_next_units() {
        let units = build(&[("ab", 1), ("ac", 1), ("ad", 2), ("b", 1)]);
        let mut trie = UnitsTrie::new(&units);
        assert_eq!(trie.unique_value(), None);
        let mut out = Vec::new();
        assert_eq!(trie.next_units(&mut out), 2);
        assert_eq!(String::from_utf16_lossy(&out), "ab");
        trie.next_str("a");
        out.clear();
        assert_eq!(trie.next_units(&mut out), 3);
        assert_eq!(String::from_utf16_lossy(&out), "bcd");
        assert_eq!(trie.unique_value(), None);

        let units = build(&[("xy", 4), ("xz", 4), ("x", 4)]);
        let mut trie = UnitsTrie::new(&units);
        assert_eq!(trie.unique_value(), Some(4));
        trie.next_str("x");
        assert_eq!(trie.unique_value(), Some(4));
    }
}
