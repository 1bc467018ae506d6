//! Enumerates the `(key, value)` entries of a 16-bit unit trie.

use alloc::vec::Vec;

use crate::codec::units::{
    MAX_BRANCH_LINEAR_SUB_NODE_LENGTH, MIN_LINEAR_MATCH, MIN_VALUE_LEAD, NODE_TYPE_MASK,
    VALUE_IS_FINAL, jump_by_delta, read_node_value, read_value, skip_delta, skip_node_value,
    skip_value_units,
};
use crate::walk::Walk;

/// Iterator over the entries of a [`UnitsTrie`](crate::UnitsTrie), in key order.
///
/// Truncation with `max_length` works as for
/// [`BytesTrieIter`](crate::BytesTrieIter): a cut-off key carries the value `-1`.
#[derive(Clone, Debug)]
pub struct UnitsTrieIter<'a> {
    walk: Walk<'a, u16>,
    // The lead unit at pos carries an intermediate value that was already delivered.
    skip_value: bool,
}

impl<'a> UnitsTrieIter<'a> {
    pub fn new(units: &'a [u16], max_length: usize) -> Self {
        Self::from_cursor(units, Some(0), -1, max_length)
    }

    pub(crate) fn from_cursor(
        units: &'a [u16],
        pos: Option<usize>,
        remaining_match_length: i32,
        max_length: usize,
    ) -> Self {
        Self {
            walk: Walk::new(units, pos, remaining_match_length, max_length),
            skip_value: false,
        }
    }

    pub fn reset(&mut self) -> &mut Self {
        self.walk.reset();
        self.skip_value = false;
        self
    }

    pub fn has_next(&self) -> bool {
        self.walk.has_next()
    }

    pub fn key(&self) -> &[u16] {
        &self.walk.key
    }

    pub fn value(&self) -> i32 {
        self.walk.value
    }

    /// Moves to the next entry. Returns `false` once the trie is exhausted.
    #[allow(clippy::cognitive_complexity)]
    pub fn advance(&mut self) -> bool {
        let units = self.walk.units;
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
                    self.walk.key.push(units[frame.pos]);
                    frame.pos + 1
                }
            }
        };
        if self.walk.remaining_match_length >= 0 {
            return self.walk.truncate();
        }
        loop {
            let mut node = units[pos];
            pos += 1;
            if node >= MIN_VALUE_LEAD {
                if self.skip_value {
                    pos = skip_node_value(pos, node);
                    node &= NODE_TYPE_MASK;
                    self.skip_value = false;
                } else {
                    let is_final = node & VALUE_IS_FINAL != 0;
                    self.walk.value = if is_final {
                        read_value(units, pos, node & !VALUE_IS_FINAL)
                    } else {
                        read_node_value(units, pos, node)
                    };
                    if is_final || self.walk.at_max_length() {
                        self.walk.pos = None;
                    } else {
                        // Resume on this lead unit; its node type is still unread.
                        self.walk.pos = Some(pos - 1);
                        self.skip_value = true;
                    }
                    return true;
                }
            }
            if self.walk.at_max_length() {
                return self.walk.truncate();
            }
            if node < MIN_LINEAR_MATCH {
                let mut length = usize::from(node);
                if length == 0 {
                    length = usize::from(units[pos]);
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

    #[allow(clippy::cast_sign_loss)]
    fn branch_next(&mut self, mut pos: usize, mut length: usize) -> Option<usize> {
        let units = self.walk.units;
        while length > MAX_BRANCH_LINEAR_SUB_NODE_LENGTH {
            pos += 1;
            self.walk.push_frame(skip_delta(units, pos), length - (length >> 1));
            length >>= 1;
            pos = jump_by_delta(units, pos);
        }
        let unit = units[pos];
        let node = units[pos + 1];
        pos += 2;
        let lead = node & !VALUE_IS_FINAL;
        let value = read_value(units, pos, lead);
        pos = skip_value_units(pos, lead);
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

impl Iterator for UnitsTrieIter<'_> {
    type Item = (Vec<u16>, i32);

    fn next(&mut self) -> Option<Self::Item> {
        self.advance().then(|| (self.walk.key.clone(), self.walk.value))
    }
}
