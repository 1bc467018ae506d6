//! The writable form of a code point trie.

use alloc::vec::Vec;

use crate::consts::{
    BMP_I_LIMIT, CP_PER_INDEX_2_ENTRY, MAX_UNICODE, SHIFT_3, SMALL_BLOCKS_PER_FAST_BLOCK,
    SMALL_DATA_BLOCK_LENGTH, SMALL_DATA_MASK,
};
use crate::range::{self, CodePointRange, RangeOption, RangeScan};
use crate::{CodePointTrie, Error, TrieType, ValueWidth};

const BLOCK_LENGTH: usize = SMALL_DATA_BLOCK_LENGTH as usize;

/// How one 16-code-point block stores its values.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum Block {
    /// Every code point in the block has this value.
    AllSame(u32),
    /// Offset of the block's values in the data array.
    Mixed(usize),
    /// Same contents as an earlier block. Only produced during compaction.
    SameAs(usize),
}

/// A code point map under construction.
///
/// Every code point starts out with the initial value. Code points are
/// grouped in blocks of 16 that hold either one repeated value or a slice of
/// the data array; blocks in the BMP are materialized four at a time so the
/// compactor can emit them as 64-value fast blocks. Above
/// [`high_start`](Self::high_start) all code points implicitly keep the
/// initial value.
///
/// [`build_immutable`](Self::build_immutable) compacts the map into a
/// [`CodePointTrie`].
///
/// ```
/// use codepoint_trie::MutableCodePointTrie;
///
/// let mut trie = MutableCodePointTrie::new(0, 0xff);
/// trie.set_range(0x41, 0x5a, 100).unwrap();
/// assert_eq!(trie.get(0x30), 0);
/// assert_eq!(trie.get(0x41), 100);
/// let range = trie.get_range(0x41).unwrap();
/// assert_eq!((range.end, range.value), (0x5a, 100));
/// ```
#[derive(Clone, Debug)]
pub struct MutableCodePointTrie {
    pub(crate) blocks: Vec<Block>,
    pub(crate) data: Vec<u32>,
    pub(crate) initial_value: u32,
    pub(crate) error_value: u32,
    pub(crate) high_start: u32,
}

impl MutableCodePointTrie {
    /// Creates a trie where every code point maps to `initial_value`.
    /// `error_value` is returned for lookups above U+10FFFF.
    pub fn new(initial_value: u32, error_value: u32) -> Self {
        Self {
            blocks: Vec::new(),
            data: Vec::new(),
            initial_value,
            error_value,
            high_start: 0,
        }
    }

    /// Copies the mapping of a compacted trie into a new mutable one.
    pub fn from_trie(trie: &CodePointTrie) -> Self {
        let initial_value = trie.null_value();
        let mut mutable = Self::new(initial_value, trie.error_value());
        for range in trie.iter_ranges() {
            if range.value == initial_value {
                continue;
            }
            mutable.fill_range(range.start, range.end, range.value);
        }
        mutable
    }

    pub fn initial_value(&self) -> u32 {
        self.initial_value
    }

    pub fn error_value(&self) -> u32 {
        self.error_value
    }

    /// The first code point of the implicit high range, a multiple of 512.
    /// It never decreases.
    pub fn high_start(&self) -> u32 {
        self.high_start
    }

    /// The value for `c`, or the error value if `c` is above U+10FFFF.
    pub fn get(&self, c: u32) -> u32 {
        if c > MAX_UNICODE {
            self.error_value
        } else if c >= self.high_start {
            self.initial_value
        } else {
            self.block_value((c >> SHIFT_3) as usize, c & SMALL_DATA_MASK)
        }
    }

    pub(crate) fn block_value(&self, i: usize, offset: u32) -> u32 {
        match self.blocks[i] {
            Block::AllSame(value) => value,
            Block::Mixed(start) => self.data[start + offset as usize],
            Block::SameAs(other) => self.block_value(other, offset),
        }
    }

    /// Sets the value for one code point.
    ///
    /// # Errors
    ///
    /// [`Error::InvalidInput`] if `c` is above U+10FFFF.
    pub fn set(&mut self, c: u32, value: u32) -> Result<(), Error> {
        if c > MAX_UNICODE {
            return Err(Error::InvalidInput { start: c, end: c });
        }
        self.ensure_high_start(c);
        let block = self.data_block((c >> SHIFT_3) as usize);
        self.data[block + (c & SMALL_DATA_MASK) as usize] = value;
        Ok(())
    }

    /// Sets the value for every code point in `start..=end`.
    ///
    /// # Errors
    ///
    /// [`Error::InvalidInput`] if either end is above U+10FFFF or `start > end`.
    /// The trie is unchanged in that case.
    pub fn set_range(&mut self, start: u32, end: u32, value: u32) -> Result<(), Error> {
        if start > MAX_UNICODE || end > MAX_UNICODE || start > end {
            return Err(Error::InvalidInput { start, end });
        }
        self.fill_range(start, end, value);
        Ok(())
    }

    fn fill_range(&mut self, start: u32, end: u32, value: u32) {
        self.ensure_high_start(end);

        let mut start = start;
        let limit = end + 1;
        if start & SMALL_DATA_MASK != 0 {
            // Partial first block.
            let block = self.data_block((start >> SHIFT_3) as usize);
            let from = block + (start & SMALL_DATA_MASK) as usize;
            let next_start = (start + SMALL_DATA_MASK) & !SMALL_DATA_MASK;
            if next_start > limit {
                self.data[from..block + (limit & SMALL_DATA_MASK) as usize].fill(value);
                return;
            }
            self.data[from..block + BLOCK_LENGTH].fill(value);
            start = next_start;
        }

        let rest = (limit & SMALL_DATA_MASK) as usize;
        let full_limit = limit & !SMALL_DATA_MASK;
        for i in (start >> SHIFT_3) as usize..(full_limit >> SHIFT_3) as usize {
            match self.blocks[i] {
                Block::Mixed(block) => self.data[block..block + BLOCK_LENGTH].fill(value),
                Block::AllSame(_) | Block::SameAs(_) => self.blocks[i] = Block::AllSame(value),
            }
        }
        if rest > 0 {
            let block = self.data_block((full_limit >> SHIFT_3) as usize);
            self.data[block..block + rest].fill(value);
        }
    }

    /// Returns the maximal range starting at `start` whose code points share
    /// one value, or `None` if `start` is above U+10FFFF.
    pub fn get_range(&self, start: u32) -> Option<CodePointRange> {
        self.get_range_with(start, RangeOption::Normal, 0, |value| value)
    }

    /// Like [`get_range`](Self::get_range), with values mapped through
    /// `filter` before comparison and surrogates handled per `option`.
    ///
    /// The initial value maps to `filter(initial_value)`.
    pub fn get_range_with(
        &self,
        start: u32,
        option: RangeOption,
        surrogate_value: u32,
        filter: impl Fn(u32) -> u32,
    ) -> Option<CodePointRange> {
        range::with_option(start, option, surrogate_value, |start| {
            self.plain_range(start, &filter)
        })
    }

    fn plain_range(&self, start: u32, filter: &impl Fn(u32) -> u32) -> Option<CodePointRange> {
        if start > MAX_UNICODE {
            return None;
        }
        let range = |end, value| Some(CodePointRange { start, end, value });
        if start >= self.high_start {
            return range(MAX_UNICODE, filter(self.initial_value));
        }

        let mut scan = RangeScan::new(self.initial_value, filter);
        let mut c = start;
        let mut i = (c >> SHIFT_3) as usize;
        while c < self.high_start {
            if let Block::Mixed(block) = self.blocks[i] {
                let mut di = block + (c & SMALL_DATA_MASK) as usize;
                loop {
                    if !scan.extend(self.data[di]) {
                        return range(c - 1, scan.value());
                    }
                    c += 1;
                    di += 1;
                    if c & SMALL_DATA_MASK == 0 {
                        break;
                    }
                }
            } else {
                if !scan.extend(self.block_value(i, 0)) {
                    return range(c - 1, scan.value());
                }
                c = (c + SMALL_DATA_BLOCK_LENGTH) & !SMALL_DATA_MASK;
            }
            i += 1;
        }
        // Continue into the high range if it has the same value.
        if scan.extend(self.initial_value) {
            range(MAX_UNICODE, scan.value())
        } else {
            range(c - 1, scan.value())
        }
    }

    /// Compacts the trie into its immutable form, masking values to `width`.
    ///
    /// # Errors
    ///
    /// [`Error::CapacityExceeded`] if the compacted data or index is too large
    /// for the binary format's offsets.
    pub fn build_immutable(
        self,
        trie_type: TrieType,
        width: ValueWidth,
    ) -> Result<CodePointTrie, Error> {
        crate::compact::build(self, trie_type, width)
    }

    /// Grows the block table so that `c` is below `high_start`.
    pub(crate) fn ensure_high_start(&mut self, c: u32) {
        if c >= self.high_start {
            let limit = (c + CP_PER_INDEX_2_ENTRY) & !(CP_PER_INDEX_2_ENTRY - 1);
            self.blocks
                .resize((limit >> SHIFT_3) as usize, Block::AllSame(self.initial_value));
            self.high_start = limit;
        }
    }

    /// Returns the data offset of block `i`, materializing it first if it is
    /// not mixed yet. BMP blocks are materialized together with the three
    /// other blocks of their fast block.
    pub(crate) fn data_block(&mut self, i: usize) -> usize {
        if let Block::Mixed(start) = self.blocks[i] {
            return start;
        }
        if i < BMP_I_LIMIT as usize {
            let first = i & !(SMALL_BLOCKS_PER_FAST_BLOCK as usize - 1);
            let mut target = 0;
            for j in first..first + SMALL_BLOCKS_PER_FAST_BLOCK as usize {
                let start = self.alloc_block(self.block_value(j, 0));
                self.blocks[j] = Block::Mixed(start);
                if j == i {
                    target = start;
                }
            }
            target
        } else {
            let start = self.alloc_block(self.block_value(i, 0));
            self.blocks[i] = Block::Mixed(start);
            start
        }
    }

    fn alloc_block(&mut self, value: u32) -> usize {
        let start = self.data.len();
        self.data.resize(start + BLOCK_LENGTH, value);
        start
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::MutableCodePointTrie;
    use crate::{Error, RangeOption};

    #[test]
    fn fresh_trie_is_one_range() {
        let trie = MutableCodePointTrie::new(7, 9);
        assert_eq!(trie.get(0), 7);
        assert_eq!(trie.get(0x10_ffff), 7);
        assert_eq!(trie.get(0x11_0000), 9);
        assert_eq!(trie.high_start(), 0);
        let range = trie.get_range(0).unwrap();
        assert_eq!((range.end, range.value), (0x10_ffff, 7));
        assert_eq!(trie.get_range(0x11_0000), None);
    }

    #[test]
    fn set_range_of_uppercase_letters() {
        let mut trie = MutableCodePointTrie::new(0, 0xff);
        trie.set_range(0x41, 0x5a, 100).unwrap();
        assert_eq!(trie.get(0x30), 0);
        assert_eq!(trie.get(0x40), 0);
        assert_eq!(trie.get(0x41), 100);
        assert_eq!(trie.get(0x5a), 100);
        assert_eq!(trie.get(0x5b), 0);
        let range = trie.get_range(0x41).unwrap();
        assert_eq!((range.start, range.end, range.value), (0x41, 0x5a, 100));
        let range = trie.get_range(0).unwrap();
        assert_eq!((range.end, range.value), (0x40, 0));
        let range = trie.get_range(0x5b).unwrap();
        assert_eq!((range.end, range.value), (0x10_ffff, 0));
    }

    #[test]
    fn high_start_is_aligned_and_monotonic() {
        let mut trie = MutableCodePointTrie::new(0, 0);
        trie.set(0x1234, 1).unwrap();
        assert_eq!(trie.high_start(), 0x1400);
        trie.set(0x10, 2).unwrap();
        assert_eq!(trie.high_start(), 0x1400);
        trie.set(0x1_0000, 3).unwrap();
        assert_eq!(trie.high_start(), 0x1_0200);
        trie.set(0x1_0000, 0).unwrap();
        assert_eq!(trie.high_start(), 0x1_0200);
    }

    #[test]
    fn rejects_invalid_ranges_without_changes() {
        let mut trie = MutableCodePointTrie::new(0, 0);
        assert_eq!(
            trie.set(0x11_0000, 1),
            Err(Error::InvalidInput {
                start: 0x11_0000,
                end: 0x11_0000
            })
        );
        assert!(trie.set_range(5, 4, 1).is_err());
        assert!(trie.set_range(0, 0x11_0000, 1).is_err());
        assert_eq!(trie.high_start(), 0);
        assert_eq!(trie.get_range(0).unwrap().end, 0x10_ffff);
    }

    #[test]
    fn partial_blocks_and_overwrites() {
        let mut trie = MutableCodePointTrie::new(0, 0);
        trie.set_range(0x23, 0x25, 1).unwrap();
        trie.set_range(0x2_0005, 0x2_0043, 2).unwrap();
        trie.set_range(0x2_0010, 0x2_001f, 3).unwrap();
        assert_eq!(trie.get(0x22), 0);
        assert_eq!(trie.get(0x23), 1);
        assert_eq!(trie.get(0x26), 0);
        assert_eq!(trie.get(0x2_0004), 0);
        assert_eq!(trie.get(0x2_0005), 2);
        assert_eq!(trie.get(0x2_000f), 2);
        assert_eq!(trie.get(0x2_0010), 3);
        assert_eq!(trie.get(0x2_0020), 2);
        assert_eq!(trie.get(0x2_0043), 2);
        assert_eq!(trie.get(0x2_0044), 0);
        let range = trie.get_range(0x2_0020).unwrap();
        assert_eq!((range.end, range.value), (0x2_0043, 2));
    }

    #[test]
    fn whole_range_moves_high_start_to_the_end() {
        let mut trie = MutableCodePointTrie::new(0, 0);
        trie.set_range(0x300, 0x10_ffff, 4).unwrap();
        assert_eq!(trie.high_start(), 0x11_0000);
        assert_eq!(trie.get(0x10_ffff), 4);
        let range = trie.get_range(0x300).unwrap();
        assert_eq!((range.end, range.value), (0x10_ffff, 4));
    }

    #[test]
    fn filter_merges_ranges() {
        let mut trie = MutableCodePointTrie::new(0, 0);
        trie.set_range(0x100, 0x1ff, 2).unwrap();
        trie.set_range(0x200, 0x2ff, 4).unwrap();
        let range = trie
            .get_range_with(0x100, RangeOption::Normal, 0, |v| v & !7)
            .unwrap();
        // 2 and 4 both filter to 0, like the initial value.
        assert_eq!((range.end, range.value), (0x10_ffff, 0));
        let range = trie
            .get_range_with(0x100, RangeOption::Normal, 0, |v| v / 3)
            .unwrap();
        assert_eq!((range.end, range.value), (0x1ff, 0));
        let range = trie
            .get_range_with(0, RangeOption::Normal, 0, |v| v + 10)
            .unwrap();
        assert_eq!((range.end, range.value), (0xff, 10));
    }

    #[test]
    fn surrogate_options() {
        let mut trie = MutableCodePointTrie::new(0, 0);
        trie.set_range(0xd800, 0xdbff, 5).unwrap();
        let range = trie.get_range(0).unwrap();
        assert_eq!(range.end, 0xd7ff);
        let range = trie
            .get_range_with(0, RangeOption::FixedLeadSurrogates, 0, |v| v)
            .unwrap();
        assert_eq!((range.end, range.value), (0x10_ffff, 0));
        let range = trie
            .get_range_with(0xd800, RangeOption::FixedAllSurrogates, 6, |v| v)
            .unwrap();
        assert_eq!((range.end, range.value), (0xdfff, 6));
    }
}
