//! Block geometry shared by the mutable trie, the compactor and the reader.

pub(crate) const MAX_UNICODE: u32 = 0x10_ffff;
pub(crate) const UNICODE_LIMIT: u32 = 0x11_0000;
pub(crate) const BMP_LIMIT: u32 = 0x1_0000;
pub(crate) const ASCII_LIMIT: u32 = 0x80;

/// Fast-range lookups use one index step into 64-value data blocks.
pub(crate) const FAST_SHIFT: u32 = 6;
pub(crate) const FAST_DATA_BLOCK_LENGTH: u32 = 1 << FAST_SHIFT;
pub(crate) const FAST_DATA_MASK: u32 = FAST_DATA_BLOCK_LENGTH - 1;

/// Last code point covered by the fast index of a small trie.
pub(crate) const SMALL_MAX: u32 = 0xfff;
pub(crate) const SMALL_LIMIT: u32 = 0x1000;

pub(crate) const BMP_INDEX_LENGTH: u32 = BMP_LIMIT >> FAST_SHIFT;
pub(crate) const SMALL_INDEX_LENGTH: u32 = SMALL_LIMIT >> FAST_SHIFT;

pub(crate) const SHIFT_3: u32 = 4;
pub(crate) const SHIFT_2: u32 = 5 + SHIFT_3;
pub(crate) const SHIFT_1: u32 = 5 + SHIFT_2;
pub(crate) const SHIFT_2_3: u32 = SHIFT_2 - SHIFT_3;
pub(crate) const SHIFT_1_2: u32 = SHIFT_1 - SHIFT_2;

/// Index-1 entries for the BMP, absent from a fast trie's index-1 table.
pub(crate) const OMITTED_BMP_INDEX_1_LENGTH: u32 = BMP_LIMIT >> SHIFT_1;

pub(crate) const INDEX_2_BLOCK_LENGTH: u32 = 1 << SHIFT_1_2;
pub(crate) const INDEX_2_MASK: u32 = INDEX_2_BLOCK_LENGTH - 1;
pub(crate) const CP_PER_INDEX_2_ENTRY: u32 = 1 << SHIFT_2;

pub(crate) const INDEX_3_BLOCK_LENGTH: u32 = 1 << SHIFT_2_3;
pub(crate) const INDEX_3_MASK: u32 = INDEX_3_BLOCK_LENGTH - 1;
/// Eight 16-bit offsets plus one unit carrying their upper two bits, four times.
pub(crate) const INDEX_3_18BIT_BLOCK_LENGTH: u32 = INDEX_3_BLOCK_LENGTH + INDEX_3_BLOCK_LENGTH / 8;

pub(crate) const SMALL_DATA_BLOCK_LENGTH: u32 = 1 << SHIFT_3;
pub(crate) const SMALL_DATA_MASK: u32 = SMALL_DATA_BLOCK_LENGTH - 1;

/// Small data blocks per fast data block.
pub(crate) const SMALL_BLOCKS_PER_FAST_BLOCK: u32 = 1 << (FAST_SHIFT - SHIFT_3);

pub(crate) const BMP_I_LIMIT: u32 = BMP_LIMIT >> SHIFT_3;
pub(crate) const ASCII_I_LIMIT: u32 = ASCII_LIMIT >> SHIFT_3;

pub(crate) const NO_INDEX3_NULL_OFFSET: u32 = 0x7fff;
pub(crate) const NO_DATA_NULL_OFFSET: u32 = 0xf_ffff;

/// Largest data length whose block offsets still fit in 18 bits.
pub(crate) const MAX_DATA_LENGTH: u32 = 0x3_ffff + SMALL_DATA_BLOCK_LENGTH;

/// Offsets from the end of the data array of the two trailing special values.
pub(crate) const HIGH_VALUE_NEG_DATA_OFFSET: usize = 2;
pub(crate) const ERROR_VALUE_NEG_DATA_OFFSET: usize = 1;

pub(crate) const SIGNATURE: u32 = 0x5472_6933; // "Tri3"
pub(crate) const HEADER_LENGTH: usize = 16;
pub(crate) const OPTIONS_RESERVED_MASK: u16 = 0x38;
