//! Compaction of a [`MutableCodePointTrie`] into the serialized index and
//! data arrays of a [`CodePointTrie`].
//!
//! Data blocks are deduplicated as whole blocks first (blocks holding one
//! repeated value), then as mixed blocks by content hash, and each new block
//! is overlapped with the tail of the data written so far. The index is built
//! the same way one level at a time.

use alloc::vec;
use alloc::vec::Vec;

use hashbrown::HashMap;

use crate::consts::{
    ASCII_I_LIMIT, ASCII_LIMIT, BMP_I_LIMIT, CP_PER_INDEX_2_ENTRY, FAST_DATA_BLOCK_LENGTH,
    FAST_SHIFT, INDEX_2_BLOCK_LENGTH, INDEX_2_MASK, INDEX_3_18BIT_BLOCK_LENGTH,
    INDEX_3_BLOCK_LENGTH, MAX_DATA_LENGTH, MAX_UNICODE, NO_DATA_NULL_OFFSET,
    NO_INDEX3_NULL_OFFSET, SHIFT_1_2, SHIFT_3, SMALL_BLOCKS_PER_FAST_BLOCK,
    SMALL_DATA_BLOCK_LENGTH, UNICODE_LIMIT,
};
use crate::mutable::{Block, MutableCodePointTrie};
use crate::{CodePointTrie, Error, TrieType, ValueWidth};

const ALL_SAME_CAPACITY: usize = 32;
const FAST_BLOCK: usize = FAST_DATA_BLOCK_LENGTH as usize;
const SMALL_BLOCK: usize = SMALL_DATA_BLOCK_LENGTH as usize;
const FAST_STEP: usize = SMALL_BLOCKS_PER_FAST_BLOCK as usize;
const INDEX_3_BLOCK: usize = INDEX_3_BLOCK_LENGTH as usize;
const INDEX_3_18BIT_BLOCK: usize = INDEX_3_18BIT_BLOCK_LENGTH as usize;

/// Filler for the index padding unit in front of 32-bit data.
const INDEX_PADDING: u16 = 0xffee;

#[tracing::instrument(level = "debug", skip_all, fields(?trie_type, ?width, high_start = trie.high_start))]
pub(crate) fn build(
    mut trie: MutableCodePointTrie,
    trie_type: TrieType,
    width: ValueWidth,
) -> Result<CodePointTrie, Error> {
    if let Some(mask) = width.mask() {
        mask_values(&mut trie, mask);
    }
    let fast_i_limit = (trie_type.fast_limit() >> SHIFT_3) as usize;
    let Compacted {
        mut index,
        mut data,
        high_start,
        high_value,
        index3_null_offset,
        data_null_offset,
    } = compact_trie(&mut trie, fast_i_limit)?;
    let error_value = trie.error_value;

    // Pad so the whole structure is a multiple of four bytes, ending with the
    // high value and the error value.
    match width {
        ValueWidth::Bits16 => {
            if (index.len() ^ data.len()) & 1 != 0 {
                data.push(error_value);
            }
            if !data.ends_with(&[high_value, error_value]) {
                data.extend([high_value, error_value]);
            }
        }
        ValueWidth::Bits32 => {
            if index.len() & 1 != 0 {
                index.push(INDEX_PADDING);
            }
            if !data.ends_with(&[high_value, error_value]) {
                if data.last() != Some(&high_value) {
                    data.push(high_value);
                }
                data.push(error_value);
            }
        }
        ValueWidth::Bits8 => {
            let mut and3 = (index.len() * 2 + data.len()) & 3;
            if and3 == 0 && data.ends_with(&[high_value, error_value]) {
                // Already aligned and terminated.
            } else if and3 == 3 && data.last() == Some(&high_value) {
                data.push(error_value);
            } else {
                while and3 != 2 {
                    data.push(high_value);
                    and3 = (and3 + 1) & 3;
                }
                data.extend([high_value, error_value]);
            }
        }
    }

    tracing::debug!(
        index_len = index.len(),
        data_len = data.len(),
        high_start,
        data_null_offset,
        index3_null_offset,
        "compacted code point trie"
    );
    Ok(CodePointTrie::from_parts(
        trie_type,
        index,
        width.narrow(data),
        high_start,
        index3_null_offset,
        data_null_offset,
    ))
}

struct Compacted {
    index: Vec<u16>,
    data: Vec<u32>,
    high_start: u32,
    high_value: u32,
    index3_null_offset: u16,
    data_null_offset: u32,
}

fn mask_values(trie: &mut MutableCodePointTrie, mask: u32) {
    trie.initial_value &= mask;
    trie.error_value &= mask;
    for block in &mut trie.blocks {
        if let Block::AllSame(value) = block {
            *value &= mask;
        }
    }
    for value in &mut trie.data {
        *value &= mask;
    }
}

#[allow(clippy::cast_possible_truncation)]
fn compact_trie(
    trie: &mut MutableCodePointTrie,
    fast_i_limit: usize,
) -> Result<Compacted, Error> {
    let mut high_value = trie.get(MAX_UNICODE);
    let real_high_start = (find_high_start(trie, high_value) + CP_PER_INDEX_2_ENTRY - 1)
        & !(CP_PER_INDEX_2_ENTRY - 1);
    if real_high_start == UNICODE_LIMIT {
        high_value = trie.initial_value;
    }

    // The fast range always gets index entries and data blocks.
    let fast_limit = (fast_i_limit as u32) << SHIFT_3;
    trie.blocks.truncate((real_high_start >> SHIFT_3) as usize);
    if real_high_start < fast_limit {
        trie.blocks.resize(fast_i_limit, Block::AllSame(high_value));
        trie.high_start = fast_limit;
    } else {
        trie.high_start = real_high_start;
    }

    let ascii: Vec<u32> = (0..ASCII_LIMIT).map(|c| trie.get(c)).collect();

    let mut all_same = AllSameBlocks::new();
    compact_whole_data_blocks(trie, fast_i_limit, &mut all_same);
    let data_null_index = all_same.most_used();

    let (data, offsets) = compact_data(trie, fast_i_limit, ascii, data_null_index);
    if data.len() > MAX_DATA_LENGTH as usize {
        return Err(Error::CapacityExceeded {
            what: "data",
            len: data.len(),
        });
    }
    let data_null_offset = data_null_index.map(|i| offsets[i]);

    let (index, index3_null_offset) =
        compact_index(trie.high_start, fast_i_limit, &offsets, data_null_offset)?;
    Ok(Compacted {
        index,
        data,
        high_start: trie.high_start,
        high_value,
        index3_null_offset,
        data_null_offset: data_null_offset.unwrap_or(NO_DATA_NULL_OFFSET),
    })
}

/// The first code point from which every value equals `high_value`.
#[allow(clippy::cast_possible_truncation)]
fn find_high_start(trie: &MutableCodePointTrie, high_value: u32) -> u32 {
    let mut i = (trie.high_start >> SHIFT_3) as usize;
    while i > 0 {
        i -= 1;
        let same = match trie.blocks[i] {
            Block::Mixed(start) => trie.data[start..start + SMALL_BLOCK]
                .iter()
                .all(|&value| value == high_value),
            Block::AllSame(_) | Block::SameAs(_) => trie.block_value(i, 0) == high_value,
        };
        if !same {
            return ((i + 1) as u32) << SHIFT_3;
        }
    }
    0
}

enum Lookup {
    Found(usize),
    Added,
    Overflow,
}

#[derive(Clone, Copy, Default)]
struct SameBlock {
    index: usize,
    value: u32,
    ref_count: usize,
}

/// Bounded cache of blocks that repeat one value, keyed by that value.
///
/// Once full, new values are not added by [`find_or_add`](Self::find_or_add);
/// the caller scans for a duplicate itself and then replaces the least-used
/// entry with [`add`](Self::add).
struct AllSameBlocks {
    entries: [SameBlock; ALL_SAME_CAPACITY],
    len: usize,
    most_recent: Option<usize>,
}

impl AllSameBlocks {
    fn new() -> Self {
        Self {
            entries: [SameBlock::default(); ALL_SAME_CAPACITY],
            len: 0,
            most_recent: None,
        }
    }

    fn find_or_add(&mut self, index: usize, count: usize, value: u32) -> Lookup {
        let found = match self.most_recent {
            Some(recent) if self.entries[recent].value == value => Some(recent),
            _ => self.entries[..self.len].iter().position(|e| e.value == value),
        };
        if let Some(i) = found {
            self.most_recent = Some(i);
            self.entries[i].ref_count += count;
            return Lookup::Found(self.entries[i].index);
        }
        if self.len == ALL_SAME_CAPACITY {
            return Lookup::Overflow;
        }
        self.entries[self.len] = SameBlock {
            index,
            value,
            ref_count: count,
        };
        self.most_recent = Some(self.len);
        self.len += 1;
        Lookup::Added
    }

    /// Replaces the least-used entry.
    fn add(&mut self, index: usize, count: usize, value: u32) {
        let least = self.entries[..self.len]
            .iter()
            .enumerate()
            .min_by_key(|(_, e)| e.ref_count)
            .map_or(0, |(i, _)| i);
        self.entries[least] = SameBlock {
            index,
            value,
            ref_count: count,
        };
        self.most_recent = Some(least);
    }

    /// The block index of the most referenced value.
    fn most_used(&self) -> Option<usize> {
        let mut best: Option<&SameBlock> = None;
        for entry in &self.entries[..self.len] {
            if best.is_none_or(|b| entry.ref_count > b.ref_count) {
                best = Some(entry);
            }
        }
        best.map(|e| e.index)
    }
}

/// Turns mixed blocks that hold a single value into [`Block::AllSame`] and
/// points repeated single-value blocks at the first one with
/// [`Block::SameAs`].
fn compact_whole_data_blocks(
    trie: &mut MutableCodePointTrie,
    fast_i_limit: usize,
    all_same: &mut AllSameBlocks,
) {
    let i_limit = (trie.high_start >> SHIFT_3) as usize;
    let mut block_length = FAST_BLOCK;
    let mut inc = FAST_STEP;
    let mut i = 0;
    while i < i_limit {
        if i == fast_i_limit {
            block_length = SMALL_BLOCK;
            inc = 1;
        }
        if let Some(value) = single_value(trie, i, block_length, inc) {
            let other = match all_same.find_or_add(i, inc, value) {
                Lookup::Found(other) => Some(other),
                Lookup::Added => None,
                Lookup::Overflow => find_same_value_block(trie, all_same, i, inc, fast_i_limit, value),
            };
            if let Some(other) = other {
                trie.blocks[i] = Block::SameAs(other);
            }
        }
        i += inc;
    }
}

/// The value of block `i` (and its `inc - 1` siblings) if it holds only one.
/// A fast block whose parts hold different values is materialized.
fn single_value(
    trie: &mut MutableCodePointTrie,
    i: usize,
    block_length: usize,
    inc: usize,
) -> Option<u32> {
    match trie.blocks[i] {
        Block::Mixed(start) => {
            let block = &trie.data[start..start + block_length];
            let value = block[0];
            if block[1..].iter().any(|&v| v != value) {
                return None;
            }
            trie.blocks[i] = Block::AllSame(value);
            Some(value)
        }
        Block::AllSame(value) => {
            if trie.blocks[i + 1..i + inc]
                .iter()
                .any(|&b| b != Block::AllSame(value))
            {
                trie.data_block(i);
                return None;
            }
            Some(value)
        }
        Block::SameAs(_) => None,
    }
}

/// Linear scan for an earlier single-value block once the cache is full.
fn find_same_value_block(
    trie: &MutableCodePointTrie,
    all_same: &mut AllSameBlocks,
    i: usize,
    inc: usize,
    fast_i_limit: usize,
    value: u32,
) -> Option<usize> {
    let mut j_inc = FAST_STEP;
    let mut j = 0;
    loop {
        if j == i {
            all_same.add(i, inc, value);
            return None;
        }
        if j == fast_i_limit {
            j_inc = 1;
        }
        if trie.blocks[j] == Block::AllSame(value) {
            all_same.add(j, j_inc + inc, value);
            return Some(j);
        }
        j += j_inc;
    }
}

/// Writes the new data array and returns it with the data offset of every
/// 16-code-point block below `high_start`.
#[allow(clippy::cast_possible_truncation, clippy::cognitive_complexity)]
fn compact_data(
    trie: &MutableCodePointTrie,
    fast_i_limit: usize,
    ascii: Vec<u32>,
    data_null_index: Option<usize>,
) -> (Vec<u32>, Vec<u32>) {
    let i_limit = (trie.high_start >> SHIFT_3) as usize;
    let mut offsets = vec![0; i_limit];
    let mut new_data = ascii;
    // ASCII is stored linearly at the start of the data.
    for (i, offset) in offsets[..ASCII_I_LIMIT as usize].iter_mut().enumerate() {
        *offset = (i * SMALL_BLOCK) as u32;
    }

    let mut block_length = FAST_BLOCK;
    let mut mixed = MixedBlocks::new(block_length);
    mixed.extend(&new_data, 0, 0, new_data.len());

    let mut inc = FAST_STEP;
    let mut fast_length = 0;
    let mut i = ASCII_I_LIMIT as usize;
    while i < i_limit {
        if i == fast_i_limit {
            block_length = SMALL_BLOCK;
            inc = 1;
            fast_length = new_data.len();
            mixed = MixedBlocks::new(block_length);
            mixed.extend(&new_data, 0, 0, new_data.len());
        }
        let offset = match trie.blocks[i] {
            Block::AllSame(value) => {
                let mut found = mixed.find_all_same_block(&new_data, value);
                // The small null block must not coincide with the start of a
                // fast block, or range enumeration would treat that whole
                // fast block as null.
                while let Some(n) = found
                    && Some(i) == data_null_index
                    && i >= fast_i_limit
                    && n < fast_length
                    && is_start_of_fast_block(n, &offsets, fast_i_limit)
                {
                    found = find_all_same_block(&new_data, n + 1, value, block_length);
                }
                found.unwrap_or_else(|| {
                    let overlap = all_same_overlap(&new_data, value, block_length);
                    let prev_length = new_data.len();
                    new_data.resize(prev_length + block_length - overlap, value);
                    mixed.extend(&new_data, 0, prev_length, new_data.len());
                    prev_length - overlap
                })
            }
            Block::Mixed(start) => {
                let block = &trie.data[start..start + block_length];
                mixed.find_block(&new_data, block).unwrap_or_else(|| {
                    let overlap = overlap(&new_data, block);
                    let prev_length = new_data.len();
                    new_data.extend_from_slice(&block[overlap..]);
                    mixed.extend(&new_data, 0, prev_length, new_data.len());
                    prev_length - overlap
                })
            }
            Block::SameAs(other) => offsets[other] as usize,
        };
        for (k, slot) in offsets[i..i + inc].iter_mut().enumerate() {
            *slot = (offset + k * SMALL_BLOCK) as u32;
        }
        i += inc;
    }
    (new_data, offsets)
}

fn is_start_of_fast_block(offset: usize, offsets: &[u32], fast_i_limit: usize) -> bool {
    offsets[..fast_i_limit]
        .iter()
        .step_by(FAST_STEP)
        .any(|&o| o as usize == offset)
}

fn find_all_same_block(data: &[u32], start: usize, value: u32, block_length: usize) -> Option<usize> {
    let last = data.len().checked_sub(block_length)?;
    let mut block = start;
    while block <= last {
        if data[block] == value {
            match data[block + 1..block + block_length]
                .iter()
                .position(|&v| v != value)
            {
                None => return Some(block),
                Some(k) => block += k + 1,
            }
        }
        block += 1;
    }
    None
}

/// How many trailing values of `data` equal `value`, up to `block_length - 1`.
fn all_same_overlap(data: &[u32], value: u32, block_length: usize) -> usize {
    data.iter()
        .rev()
        .take(block_length - 1)
        .take_while(|&&v| v == value)
        .count()
}

/// The longest proper prefix of `block` that `data` ends with.
fn overlap<T: Copy + Into<u32>, U: Copy + Into<u32>>(data: &[T], block: &[U]) -> usize {
    let mut overlap = (block.len() - 1).min(data.len());
    while overlap > 0 && !equal_blocks(&data[data.len() - overlap..], &block[..overlap]) {
        overlap -= 1;
    }
    overlap
}

fn equal_blocks<T: Copy + Into<u32>, U: Copy + Into<u32>>(a: &[T], b: &[U]) -> bool {
    a.len() == b.len() && a.iter().zip(b).all(|(&x, &y)| x.into() == y.into())
}

fn hash_block<T: Copy + Into<u32>>(block: &[T]) -> u32 {
    let mut values = block.iter().map(|&v| v.into());
    let first = values.next().unwrap_or(0);
    values.fold(first, |hash, v| hash.wrapping_mul(37).wrapping_add(v))
}

/// Index of every block-length window of an output array, keyed by content
/// hash and verified by comparison. Only the earliest window with given
/// contents is kept.
struct MixedBlocks {
    block_length: usize,
    table: HashMap<u32, Vec<usize>>,
}

impl MixedBlocks {
    fn new(block_length: usize) -> Self {
        Self {
            block_length,
            table: HashMap::new(),
        }
    }

    /// Adds the windows that end in `prev_length..new_length` and start at or
    /// after `min_start`.
    fn extend<T: Copy + Into<u32>>(
        &mut self,
        data: &[T],
        min_start: usize,
        prev_length: usize,
        new_length: usize,
    ) {
        let block_length = self.block_length;
        let mut start = match prev_length.checked_sub(block_length) {
            // That window was added last time.
            Some(start) if start >= min_start => start + 1,
            _ => min_start,
        };
        while start + block_length <= new_length {
            let block = &data[start..start + block_length];
            let starts = self.table.entry(hash_block(block)).or_default();
            if !starts
                .iter()
                .any(|&s| equal_blocks(&data[s..s + block_length], block))
            {
                starts.push(start);
            }
            start += 1;
        }
    }

    fn find_block<T: Copy + Into<u32>, U: Copy + Into<u32>>(
        &self,
        data: &[T],
        block: &[U],
    ) -> Option<usize> {
        let block_length = self.block_length;
        self.table
            .get(&hash_block(block))?
            .iter()
            .copied()
            .find(|&s| equal_blocks(&data[s..s + block_length], block))
    }

    fn find_all_same_block(&self, data: &[u32], value: u32) -> Option<usize> {
        let block_length = self.block_length;
        let hash = (1..block_length).fold(value, |hash, _| hash.wrapping_mul(37).wrapping_add(value));
        self.table
            .get(&hash)?
            .iter()
            .copied()
            .find(|&s| data[s..s + block_length].iter().all(|&v| v == value))
    }
}

/// How one index-3 block is stored.
#[derive(Clone, Copy, PartialEq, Eq)]
enum Index3 {
    /// Every entry points at the data null block.
    Null,
    /// Identical to a run of the fast index, at this offset.
    Fast(usize),
    /// All data offsets fit in 16 bits.
    Bits16,
    /// Some data offsets need 18 bits.
    Bits18,
}

/// Builds the index array: the fast index, then for tries with supplementary
/// data the index-1 table followed by the interleaved index-3 and index-2
/// blocks. Also returns the index-3 null offset.
#[allow(
    clippy::cast_possible_truncation,
    clippy::cognitive_complexity,
    clippy::too_many_lines
)]
fn compact_index(
    high_start: u32,
    fast_i_limit: usize,
    offsets: &[u32],
    data_null_offset: Option<u32>,
) -> Result<(Vec<u16>, u16), Error> {
    let fast_index_length = fast_i_limit / FAST_STEP;
    let fast_index: Vec<u16> = offsets[..fast_i_limit]
        .iter()
        .step_by(FAST_STEP)
        .map(|&o| o as u16)
        .collect();
    if (high_start >> FAST_SHIFT) as usize <= fast_index_length {
        return Ok((fast_index, NO_INDEX3_NULL_OFFSET as u16));
    }

    // A run of null entries in the fast index can serve as the index-3 null block.
    let mut index3_null_offset = None;
    let mut first_null = None;
    for (j, &offset) in offsets[..fast_i_limit].iter().step_by(FAST_STEP).enumerate() {
        if Some(offset) != data_null_offset {
            first_null = None;
        } else if let Some(first) = first_null {
            if index3_null_offset.is_none() && j - first + 1 == INDEX_3_BLOCK {
                index3_null_offset = Some(first as u32);
            }
        } else {
            first_null = Some(j);
        }
    }

    let mut mixed = MixedBlocks::new(INDEX_3_BLOCK);
    mixed.extend(&fast_index, 0, 0, fast_index_length);

    // Without a BMP fast index, the multi-stage index covers all of Unicode.
    let i_start = if fast_i_limit < BMP_I_LIMIT as usize {
        0
    } else {
        BMP_I_LIMIT as usize
    };
    let i_limit = (high_start >> SHIFT_3) as usize;
    let blocks = &offsets[i_start..i_limit];
    let kinds: Vec<Index3> = blocks
        .chunks_exact(INDEX_3_BLOCK)
        .map(|block| {
            if block.iter().all(|&o| Some(o) == data_null_offset) {
                Index3::Null
            } else if block.iter().fold(0, |acc, &o| acc | o) <= 0xffff {
                mixed
                    .find_block(&fast_index, block)
                    .map_or(Index3::Bits16, Index3::Fast)
            } else {
                Index3::Bits18
            }
        })
        .collect();

    let index2_length = kinds.len();
    let index1_length = (index2_length + INDEX_2_MASK as usize) >> SHIFT_1_2;
    let index3_start = fast_index_length + index1_length;
    let mut index = fast_index;
    index.resize(index3_start, 0);

    let mut mixed = MixedBlocks::new(INDEX_3_BLOCK);
    let mut long_blocks = MixedBlocks::new(INDEX_3_18BIT_BLOCK);
    let mut index2 = Vec::with_capacity(index2_length);
    for (&kind, block) in kinds.iter().zip(blocks.chunks_exact(INDEX_3_BLOCK)) {
        // The first null block is written like any other and then reused.
        let first_null = kind == Index3::Null && index3_null_offset.is_none();
        let kind = match kind {
            Index3::Null if first_null && block[0] <= 0xffff => Index3::Bits16,
            Index3::Null if first_null => Index3::Bits18,
            kind => kind,
        };
        let i3 = match kind {
            Index3::Null => index3_null_offset.unwrap_or(NO_INDEX3_NULL_OFFSET),
            Index3::Fast(n) => n as u32,
            Index3::Bits16 => {
                let units: Vec<u16> = block.iter().map(|&o| o as u16).collect();
                append_block(&mut index, index3_start, &units, &mut mixed, &mut long_blocks, false)
            }
            Index3::Bits18 => {
                let units = encode_18bit_block(block);
                append_block(&mut index, index3_start, &units, &mut mixed, &mut long_blocks, true)
                    | 0x8000
            }
        };
        if first_null {
            index3_null_offset = Some(i3);
        }
        index2.push(i3 as u16);
    }

    if index.len() >= (NO_INDEX3_NULL_OFFSET + INDEX_3_BLOCK_LENGTH) as usize {
        return Err(Error::CapacityExceeded {
            what: "index",
            len: index.len(),
        });
    }

    // Compact the index-2 table and fill in index-1.
    for (i1, block) in index2.chunks(INDEX_2_BLOCK_LENGTH as usize).enumerate() {
        let found = if block.len() == INDEX_2_BLOCK_LENGTH as usize {
            mixed.find_block(&index, block)
        } else {
            // highStart is inside the last index-2 block, which is shortened.
            index[index3_start..]
                .windows(block.len())
                .position(|w| w == block)
                .map(|n| n + index3_start)
        };
        let i2 = found.unwrap_or_else(|| {
            let n = if index.len() == index3_start {
                0
            } else {
                overlap(&index, block)
            };
            let prev_length = index.len();
            index.extend_from_slice(&block[n..]);
            mixed.extend(&index, index3_start, prev_length, index.len());
            prev_length - n
        });
        index[fast_index_length + i1] = i2 as u16;
    }
    if index.len() > usize::from(u16::MAX) {
        return Err(Error::CapacityExceeded {
            what: "index",
            len: index.len(),
        });
    }
    Ok((
        index,
        index3_null_offset.unwrap_or(NO_INDEX3_NULL_OFFSET) as u16,
    ))
}

/// Finds or appends one index-3 block and returns its offset.
#[allow(clippy::cast_possible_truncation)]
fn append_block(
    index: &mut Vec<u16>,
    index3_start: usize,
    units: &[u16],
    mixed: &mut MixedBlocks,
    long_blocks: &mut MixedBlocks,
    long: bool,
) -> u32 {
    let lookup = if long { &*long_blocks } else { &*mixed };
    if let Some(n) = lookup.find_block(&index[..], units) {
        return n as u32;
    }
    // No overlap across the boundary with the index-1 table.
    let n = if index.len() == index3_start {
        0
    } else {
        overlap(&index[..], units)
    };
    let prev_length = index.len();
    index.extend_from_slice(&units[n..]);
    mixed.extend(&index[..], index3_start, prev_length, index.len());
    long_blocks.extend(&index[..], index3_start, prev_length, index.len());
    (prev_length - n) as u32
}

/// Packs 32 data offsets of up to 18 bits as four groups of nine units: one
/// unit with the upper two bits of each offset, then the eight low halves.
#[allow(clippy::cast_possible_truncation)]
fn encode_18bit_block(block: &[u32]) -> [u16; INDEX_3_18BIT_BLOCK] {
    let mut units = [0; INDEX_3_18BIT_BLOCK];
    for (offsets, group) in block.chunks_exact(8).zip(units.chunks_exact_mut(9)) {
        let mut upper = 0;
        for (k, &offset) in offsets.iter().enumerate() {
            upper |= (offset & 0x3_0000) >> (2 + 2 * k);
            group[1 + k] = offset as u16;
        }
        group[0] = upper as u16;
    }
    units
}
