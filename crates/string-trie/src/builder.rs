//! Node writer shared by the byte and 16-bit builders.
//!
//! The trie is written back to front: every sub-node is emitted before the
//! node that refers to it, so jumps are always forward and a jump target is
//! known by its distance from the end of the buffer.

use alloc::vec::Vec;

use crate::Error;

/// A buffer that grows at the front. Offsets are distances from the end.
pub(crate) struct Sink<U> {
    reversed: Vec<U>,
}

impl<U: Copy> Sink<U> {
    fn new() -> Self {
        Self {
            reversed: Vec::new(),
        }
    }

    pub(crate) fn len(&self) -> usize {
        self.reversed.len()
    }

    pub(crate) fn write(&mut self, unit: U) -> usize {
        self.reversed.push(unit);
        self.reversed.len()
    }

    pub(crate) fn write_all(&mut self, units: &[U]) -> usize {
        self.reversed.extend(units.iter().rev());
        self.reversed.len()
    }

    fn into_forward(mut self) -> Vec<U> {
        self.reversed.reverse();
        self.reversed
    }
}

/// How one trie flavor lays out node leads, values and jumps.
pub(crate) trait NodeEncoding {
    type Unit: Copy + Ord;

    const MIN_LINEAR_MATCH: usize;
    const MAX_LINEAR_MATCH_LENGTH: usize;
    const MAX_BRANCH_LINEAR_SUB_NODE_LENGTH: usize;

    /// A node lead or explicit branch length.
    fn lead(value: usize) -> Self::Unit;

    fn write_value_and_final(sink: &mut Sink<Self::Unit>, value: i32, is_final: bool) -> usize;

    fn write_value_and_type(
        sink: &mut Sink<Self::Unit>,
        has_value: bool,
        value: i32,
        node: usize,
    ) -> usize;

    fn write_delta(sink: &mut Sink<Self::Unit>, delta: usize) -> usize;
}

/// Sorts `entries`, rejects empty or duplicate key sets, and serializes them.
pub(crate) fn build<E: NodeEncoding>(
    entries: &mut [(Vec<E::Unit>, i32)],
) -> Result<Vec<E::Unit>, Error> {
    if entries.is_empty() {
        return Err(Error::EmptyKeySet);
    }
    entries.sort_unstable_by(|a, b| a.0.cmp(&b.0));
    if let Some(pair) = entries.windows(2).find(|pair| pair[0].0 == pair[1].0) {
        return Err(Error::DuplicateKey {
            len: pair[0].0.len(),
        });
    }
    let entries: &[_] = entries;
    let mut writer = TrieWriter::<E> {
        entries,
        sink: Sink::new(),
    };
    writer.write_node(0, entries.len(), 0);
    let units = writer.sink.into_forward();
    tracing::debug!(keys = entries.len(), units = units.len(), "serialized trie");
    Ok(units)
}

struct TrieWriter<'a, E: NodeEncoding> {
    entries: &'a [(Vec<E::Unit>, i32)],
    sink: Sink<E::Unit>,
}

impl<E: NodeEncoding> TrieWriter<'_, E> {
    fn key(&self, i: usize) -> &[E::Unit] {
        &self.entries[i].0
    }

    fn unit_at(&self, i: usize, unit_index: usize) -> E::Unit {
        self.entries[i].0[unit_index]
    }

    /// Writes the node for keys `start..limit`, which share their first
    /// `unit_index` units. Returns the node's offset.
    fn write_node(&mut self, mut start: usize, limit: usize, unit_index: usize) -> usize {
        let mut has_value = false;
        let mut value = 0;
        if unit_index == self.key(start).len() {
            value = self.entries[start].1;
            start += 1;
            if start == limit {
                return E::write_value_and_final(&mut self.sink, value, true);
            }
            has_value = true;
        }
        // Every key in start..limit is now longer than unit_index.
        let node = if self.unit_at(start, unit_index) == self.unit_at(limit - 1, unit_index) {
            let mut last_unit_index = self.limit_of_linear_match(start, limit - 1, unit_index);
            self.write_node(start, limit, last_unit_index);
            let mut length = last_unit_index - unit_index;
            while length > E::MAX_LINEAR_MATCH_LENGTH {
                last_unit_index -= E::MAX_LINEAR_MATCH_LENGTH;
                length -= E::MAX_LINEAR_MATCH_LENGTH;
                self.write_key_units(start, last_unit_index, E::MAX_LINEAR_MATCH_LENGTH);
                self.sink.write(E::lead(
                    E::MIN_LINEAR_MATCH + E::MAX_LINEAR_MATCH_LENGTH - 1,
                ));
            }
            self.write_key_units(start, unit_index, length);
            E::MIN_LINEAR_MATCH + length - 1
        } else {
            let length = self.count_units(start, limit, unit_index);
            self.write_branch_sub_node(start, limit, unit_index, length);
            let length = length - 1;
            if length < E::MIN_LINEAR_MATCH {
                length
            } else {
                self.sink.write(E::lead(length));
                0
            }
        };
        E::write_value_and_type(&mut self.sink, has_value, value, node)
    }

    /// Writes a branch over `length` distinct units at `unit_index`.
    #[allow(clippy::cast_possible_truncation, clippy::cast_possible_wrap)]
    fn write_branch_sub_node(
        &mut self,
        mut start: usize,
        limit: usize,
        unit_index: usize,
        mut length: usize,
    ) -> usize {
        let mut splits = Vec::new();
        while length > E::MAX_BRANCH_LINEAR_SUB_NODE_LENGTH {
            let half = length / 2;
            let i = self.skip_by_some_units(start, limit, unit_index, half);
            let middle = self.unit_at(i, unit_index);
            let less_than = self.write_branch_sub_node(start, i, unit_index, half);
            splits.push((middle, less_than));
            start = i;
            length -= half;
        }

        let mut starts = Vec::with_capacity(length);
        let mut is_final = Vec::with_capacity(length - 1);
        for _ in 0..length - 1 {
            let unit = self.unit_at(start, unit_index);
            let next = self.index_of_next_unit(start + 1, limit, unit_index, unit);
            starts.push(start);
            is_final.push(next == start + 1 && unit_index + 1 == self.key(start).len());
            start = next;
        }
        starts.push(start);

        // Later sub-nodes first, so the first unit's jump is the shortest.
        let mut jump_targets = alloc::vec![0; length - 1];
        for n in (0..length - 1).rev() {
            if !is_final[n] {
                jump_targets[n] = self.write_node(starts[n], starts[n + 1], unit_index + 1);
            }
        }
        // The last unit falls through instead of jumping.
        self.write_node(start, limit, unit_index + 1);
        let mut offset = self.sink.write(self.unit_at(start, unit_index));
        for n in (0..length - 1).rev() {
            let first = starts[n];
            let value = if is_final[n] {
                self.entries[first].1
            } else {
                (offset - jump_targets[n]) as i32
            };
            E::write_value_and_final(&mut self.sink, value, is_final[n]);
            offset = self.sink.write(self.unit_at(first, unit_index));
        }
        while let Some((middle, less_than)) = splits.pop() {
            let delta = self.sink.len() - less_than;
            E::write_delta(&mut self.sink, delta);
            offset = self.sink.write(middle);
        }
        offset
    }

    fn write_key_units(&mut self, i: usize, unit_index: usize, length: usize) {
        let entries = self.entries;
        self.sink
            .write_all(&entries[i].0[unit_index..unit_index + length]);
    }

    fn limit_of_linear_match(&self, first: usize, last: usize, unit_index: usize) -> usize {
        let first_key = self.key(first);
        let last_key = self.key(last);
        let mut i = unit_index + 1;
        while i < first_key.len() && last_key.get(i) == Some(&first_key[i]) {
            i += 1;
        }
        i
    }

    fn count_units(&self, mut i: usize, limit: usize, unit_index: usize) -> usize {
        let mut length = 0;
        while i < limit {
            let unit = self.unit_at(i, unit_index);
            i = self.index_of_next_unit(i + 1, limit, unit_index, unit);
            length += 1;
        }
        length
    }

    fn skip_by_some_units(
        &self,
        mut i: usize,
        limit: usize,
        unit_index: usize,
        count: usize,
    ) -> usize {
        for _ in 0..count {
            let unit = self.unit_at(i, unit_index);
            i = self.index_of_next_unit(i + 1, limit, unit_index, unit);
        }
        i
    }

    fn index_of_next_unit(
        &self,
        mut i: usize,
        limit: usize,
        unit_index: usize,
        unit: E::Unit,
    ) -> usize {
        while i < limit && self.key(i).get(unit_index) == Some(&unit) {
            i += 1;
        }
        i
    }
}
