//! The compacted, read-only code point trie and its binary form.

use alloc::vec::Vec;
use core::fmt;

use crate::consts::{
    BMP_INDEX_LENGTH, BMP_LIMIT, CP_PER_INDEX_2_ENTRY, ERROR_VALUE_NEG_DATA_OFFSET,
    FAST_DATA_BLOCK_LENGTH, FAST_DATA_MASK, FAST_SHIFT, HEADER_LENGTH,
    HIGH_VALUE_NEG_DATA_OFFSET, INDEX_2_MASK, INDEX_3_BLOCK_LENGTH, INDEX_3_MASK, MAX_UNICODE,
    OMITTED_BMP_INDEX_1_LENGTH, OPTIONS_RESERVED_MASK, SHIFT_1, SHIFT_2, SHIFT_3, SIGNATURE,
    SMALL_DATA_BLOCK_LENGTH, SMALL_DATA_MASK, SMALL_INDEX_LENGTH, SMALL_LIMIT, SMALL_MAX,
    UNICODE_LIMIT,
};
use crate::range::{self, CodePointRange, RangeOption, RangeScan};
use crate::Error;

/// Which code points get the one-step fast lookup.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum TrieType {
    /// The whole BMP.
    Fast,
    /// U+0000..=U+0FFF, for a smaller index.
    Small,
}

impl TrieType {
    pub(crate) fn fast_limit(self) -> u32 {
        match self {
            Self::Fast => BMP_LIMIT,
            Self::Small => SMALL_LIMIT,
        }
    }

    fn fast_max(self) -> u32 {
        self.fast_limit() - 1
    }

    fn fast_index_length(self) -> u32 {
        match self {
            Self::Fast => BMP_INDEX_LENGTH,
            Self::Small => SMALL_INDEX_LENGTH,
        }
    }
}

impl fmt::Display for TrieType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Fast => write!(f, "fast"),
            Self::Small => write!(f, "small"),
        }
    }
}

/// Storage width of the data values. Values are masked to this width when
/// a trie is built.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ValueWidth {
    Bits16,
    Bits32,
    Bits8,
}

impl ValueWidth {
    pub(crate) fn mask(self) -> Option<u32> {
        match self {
            Self::Bits16 => Some(0xffff),
            Self::Bits32 => None,
            Self::Bits8 => Some(0xff),
        }
    }

    fn code(self) -> u16 {
        match self {
            Self::Bits16 => 0,
            Self::Bits32 => 1,
            Self::Bits8 => 2,
        }
    }

    fn from_code(code: u16) -> Option<Self> {
        match code {
            0 => Some(Self::Bits16),
            1 => Some(Self::Bits32),
            2 => Some(Self::Bits8),
            _ => None,
        }
    }

    fn bytes(self) -> usize {
        match self {
            Self::Bits16 => 2,
            Self::Bits32 => 4,
            Self::Bits8 => 1,
        }
    }

    /// Converts already masked values to this width.
    #[allow(clippy::cast_possible_truncation)]
    pub(crate) fn narrow(self, values: Vec<u32>) -> TrieData {
        match self {
            Self::Bits16 => TrieData::Bits16(values.into_iter().map(|v| v as u16).collect()),
            Self::Bits32 => TrieData::Bits32(values),
            Self::Bits8 => TrieData::Bits8(values.into_iter().map(|v| v as u8).collect()),
        }
    }
}

impl fmt::Display for ValueWidth {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let bits = match self {
            Self::Bits16 => 16,
            Self::Bits32 => 32,
            Self::Bits8 => 8,
        };
        write!(f, "{bits}")
    }
}

/// The data array of a [`CodePointTrie`], at its storage width.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum TrieData {
    Bits8(Vec<u8>),
    Bits16(Vec<u16>),
    Bits32(Vec<u32>),
}

impl TrieData {
    pub fn len(&self) -> usize {
        match self {
            Self::Bits8(d) => d.len(),
            Self::Bits16(d) => d.len(),
            Self::Bits32(d) => d.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    #[inline]
    pub fn get(&self, i: usize) -> Option<u32> {
        match self {
            Self::Bits8(d) => d.get(i).copied().map(u32::from),
            Self::Bits16(d) => d.get(i).copied().map(u32::from),
            Self::Bits32(d) => d.get(i).copied(),
        }
    }

    pub fn width(&self) -> ValueWidth {
        match self {
            Self::Bits8(_) => ValueWidth::Bits8,
            Self::Bits16(_) => ValueWidth::Bits16,
            Self::Bits32(_) => ValueWidth::Bits32,
        }
    }

    /// Iterates over the values widened to `u32`.
    pub fn iter(&self) -> impl Iterator<Item = u32> + '_ {
        (0..self.len()).filter_map(|i| self.get(i))
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
struct Header {
    trie_type: TrieType,
    high_start: u32,
    index3_null_offset: u16,
    data_null_offset: u32,
    null_value: u32,
    high_value: u32,
    error_value: u32,
}

/// A compacted, immutable map from code points to values.
///
/// Code points below the fast limit (U+10000 for [`TrieType::Fast`], U+1000
/// for [`TrieType::Small`]) are looked up with one index step; the rest go
/// through three index levels. Code points from
/// [`high_start`](Self::high_start) on share one value.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CodePointTrie {
    header: Header,
    index: Vec<u16>,
    data: TrieData,
}

impl CodePointTrie {
    pub(crate) fn from_parts(
        trie_type: TrieType,
        index: Vec<u16>,
        data: TrieData,
        high_start: u32,
        index3_null_offset: u16,
        data_null_offset: u32,
    ) -> Self {
        let from_end = |offset: usize| {
            data.len()
                .checked_sub(offset)
                .and_then(|i| data.get(i))
                .unwrap_or_default()
        };
        let high_value = from_end(HIGH_VALUE_NEG_DATA_OFFSET);
        let error_value = from_end(ERROR_VALUE_NEG_DATA_OFFSET);
        let null_value = data.get(data_null_offset as usize).unwrap_or(high_value);
        Self {
            header: Header {
                trie_type,
                high_start,
                index3_null_offset,
                data_null_offset,
                null_value,
                high_value,
                error_value,
            },
            index,
            data,
        }
    }

    pub fn trie_type(&self) -> TrieType {
        self.header.trie_type
    }

    pub fn value_width(&self) -> ValueWidth {
        self.data.width()
    }

    /// The first code point of the range that maps entirely to the high value.
    pub fn high_start(&self) -> u32 {
        self.header.high_start
    }

    /// The value of the data null block, usually the initial value of the
    /// mutable trie this was built from.
    pub fn null_value(&self) -> u32 {
        self.header.null_value
    }

    /// The value returned for code points above U+10FFFF.
    pub fn error_value(&self) -> u32 {
        self.header.error_value
    }

    pub fn high_value(&self) -> u32 {
        self.header.high_value
    }

    pub fn index3_null_offset(&self) -> u16 {
        self.header.index3_null_offset
    }

    pub fn data_null_offset(&self) -> u32 {
        self.header.data_null_offset
    }

    pub fn index(&self) -> &[u16] {
        &self.index
    }

    pub fn data(&self) -> &TrieData {
        &self.data
    }

    pub fn index_len(&self) -> usize {
        self.index.len()
    }

    pub fn data_len(&self) -> usize {
        self.data.len()
    }

    /// The value for `c`, or the error value if `c` is above U+10FFFF.
    #[inline]
    pub fn get(&self, c: u32) -> u32 {
        self.data_index(c)
            .and_then(|i| self.data.get(i))
            .unwrap_or(self.header.error_value)
    }

    #[inline]
    pub fn get_char(&self, c: char) -> u32 {
        self.get(u32::from(c))
    }

    fn data_index(&self, c: u32) -> Option<usize> {
        if c <= self.header.trie_type.fast_max() {
            let block = self.index.get((c >> FAST_SHIFT) as usize)?;
            Some(usize::from(*block) + (c & FAST_DATA_MASK) as usize)
        } else if c > MAX_UNICODE {
            None
        } else if c >= self.header.high_start {
            self.data.len().checked_sub(HIGH_VALUE_NEG_DATA_OFFSET)
        } else {
            self.small_index(c)
        }
    }

    fn small_index(&self, c: u32) -> Option<usize> {
        let i3_block = self.index3_block(c)?;
        let block = self.index3_entry(i3_block, (c >> SHIFT_3) & INDEX_3_MASK)?;
        Some((block + (c & SMALL_DATA_MASK)) as usize)
    }

    /// Offset of the index-3 block for `c`, which is above the fast range.
    fn index3_block(&self, c: u32) -> Option<u32> {
        let i1 = match self.header.trie_type {
            TrieType::Fast => (c >> SHIFT_1) + BMP_INDEX_LENGTH - OMITTED_BMP_INDEX_1_LENGTH,
            TrieType::Small => (c >> SHIFT_1) + SMALL_INDEX_LENGTH,
        };
        let i2 = u32::from(*self.index.get(i1 as usize)?) + ((c >> SHIFT_2) & INDEX_2_MASK);
        self.index.get(i2 as usize).map(|&b| u32::from(b))
    }

    /// Entry `i3` of an index-3 block. Blocks flagged with bit 15 hold 18-bit
    /// entries in groups of nine units per eight entries.
    fn index3_entry(&self, i3_block: u32, i3: u32) -> Option<u32> {
        if i3_block & 0x8000 == 0 {
            return self.index.get((i3_block + i3) as usize).map(|&e| u32::from(e));
        }
        let group = (i3_block & 0x7fff) + (i3 & !7) + (i3 >> 3);
        let k = i3 & 7;
        let upper = (u32::from(*self.index.get(group as usize)?) << (2 + 2 * k)) & 0x3_0000;
        let lower = u32::from(*self.index.get((group + 1 + k) as usize)?);
        Some(upper | lower)
    }

    /// Returns the maximal range starting at `start` whose code points share
    /// one value, or `None` if `start` is above U+10FFFF.
    pub fn get_range(&self, start: u32) -> Option<CodePointRange> {
        self.get_range_with(start, RangeOption::Normal, 0, |value| value)
    }

    /// Like [`get_range`](Self::get_range), with values mapped through
    /// `filter` before comparison and surrogates handled per `option`.
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

    /// Iterates over all ranges of equal values, from U+0000 to U+10FFFF.
    pub fn iter_ranges(&self) -> Ranges<'_> {
        Ranges {
            trie: self,
            next: Some(0),
        }
    }

    #[allow(clippy::cognitive_complexity, clippy::too_many_lines)]
    fn plain_range(&self, start: u32, filter: &impl Fn(u32) -> u32) -> Option<CodePointRange> {
        if start > MAX_UNICODE {
            return None;
        }
        let range = |end, value| Some(CodePointRange { start, end, value });
        let Header {
            trie_type,
            high_start,
            index3_null_offset,
            data_null_offset,
            null_value,
            high_value,
            ..
        } = self.header;
        if start >= high_start {
            return range(MAX_UNICODE, filter(high_value));
        }

        let mut scan = RangeScan::new(null_value, filter);
        let mut prev_i3_block = None;
        let mut prev_block = None;
        let mut c = start;
        while c < high_start {
            let (i3_block, mut i3, i3_block_length, data_block_length) =
                if c <= 0xffff && (trie_type == TrieType::Fast || c <= SMALL_MAX) {
                    // The fast index acts as a single index-3 block.
                    (
                        0,
                        c >> FAST_SHIFT,
                        trie_type.fast_index_length(),
                        FAST_DATA_BLOCK_LENGTH,
                    )
                } else {
                    let i3_block = self.index3_block(c)?;
                    if prev_i3_block == Some(i3_block) && c - start >= CP_PER_INDEX_2_ENTRY {
                        // Same index-3 block as before, known to hold only the run's value.
                        c += CP_PER_INDEX_2_ENTRY;
                        continue;
                    }
                    prev_i3_block = Some(i3_block);
                    if i3_block == u32::from(index3_null_offset) {
                        if !scan.extend(null_value) {
                            return range(c - 1, scan.value());
                        }
                        prev_block = Some(data_null_offset);
                        c = (c + CP_PER_INDEX_2_ENTRY) & !(CP_PER_INDEX_2_ENTRY - 1);
                        continue;
                    }
                    (
                        i3_block,
                        (c >> SHIFT_3) & INDEX_3_MASK,
                        INDEX_3_BLOCK_LENGTH,
                        SMALL_DATA_BLOCK_LENGTH,
                    )
                };

            let data_mask = data_block_length - 1;
            while i3 < i3_block_length {
                let block = self.index3_entry(i3_block, i3)?;
                if prev_block == Some(block) && c - start >= data_block_length {
                    // Same data block as before, known to hold only the run's value.
                    c += data_block_length;
                } else {
                    prev_block = Some(block);
                    if block == data_null_offset {
                        if !scan.extend(null_value) {
                            return range(c - 1, scan.value());
                        }
                        c = (c + data_block_length) & !data_mask;
                    } else {
                        let mut di = (block + (c & data_mask)) as usize;
                        loop {
                            if !scan.extend(self.data.get(di)?) {
                                return range(c - 1, scan.value());
                            }
                            c += 1;
                            di += 1;
                            if c & data_mask == 0 {
                                break;
                            }
                        }
                    }
                }
                i3 += 1;
            }
        }
        // Continue into the high range if it has the same value.
        if scan.extend(high_value) {
            range(MAX_UNICODE, scan.value())
        } else {
            range(c - 1, scan.value())
        }
    }

    /// The value of every code point in `s`, paired with the code point.
    /// Unpaired surrogates yield `None` and the error value.
    pub fn values_utf16<'a>(
        &'a self,
        s: &'a [u16],
    ) -> impl Iterator<Item = (Option<char>, u32)> + 'a {
        char::decode_utf16(s.iter().copied()).map(|c| match c {
            Ok(c) => (Some(c), self.get_char(c)),
            Err(_) => (None, self.header.error_value),
        })
    }

    /// The value of every code point in `s`, paired with the code point.
    /// Each maximal ill-formed subsequence yields `None` and the error value.
    pub fn values_utf8<'a>(
        &'a self,
        s: &'a [u8],
    ) -> impl Iterator<Item = (Option<char>, u32)> + 'a {
        s.utf8_chunks().flat_map(move |chunk| {
            let invalid = (!chunk.invalid().is_empty()).then_some((None, self.header.error_value));
            chunk
                .valid()
                .chars()
                .map(move |c| (Some(c), self.get_char(c)))
                .chain(invalid)
        })
    }

    /// Serializes the trie: a 16-byte header followed by the index and the
    /// data, all little-endian.
    #[allow(clippy::cast_possible_truncation)]
    pub fn to_bytes(&self) -> Vec<u8> {
        let width = self.value_width();
        let data_length = self.data.len() as u32;
        let data_null_offset = self.header.data_null_offset;
        let type_code: u16 = match self.header.trie_type {
            TrieType::Fast => 0,
            TrieType::Small => 1,
        };
        let options = ((data_length & 0xf_0000) >> 4) as u16
            | ((data_null_offset & 0xf_0000) >> 8) as u16
            | (type_code << 6)
            | width.code();

        let mut out =
            Vec::with_capacity(HEADER_LENGTH + self.index.len() * 2 + self.data.len() * width.bytes());
        out.extend_from_slice(&SIGNATURE.to_le_bytes());
        for field in [
            options,
            self.index.len() as u16,
            data_length as u16,
            self.header.index3_null_offset,
            data_null_offset as u16,
            (self.header.high_start >> SHIFT_2) as u16,
        ] {
            out.extend_from_slice(&field.to_le_bytes());
        }
        for unit in &self.index {
            out.extend_from_slice(&unit.to_le_bytes());
        }
        match &self.data {
            TrieData::Bits8(d) => out.extend_from_slice(d),
            TrieData::Bits16(d) => d.iter().for_each(|v| out.extend_from_slice(&v.to_le_bytes())),
            TrieData::Bits32(d) => d.iter().for_each(|v| out.extend_from_slice(&v.to_le_bytes())),
        }
        out
    }

    /// Parses a trie written by [`to_bytes`](Self::to_bytes). Bytes after the
    /// data are ignored.
    ///
    /// # Errors
    ///
    /// [`Error::InvalidFormat`] if the input is truncated or the header is
    /// inconsistent.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, Error> {
        let Some((header, rest)) = bytes.split_first_chunk::<HEADER_LENGTH>() else {
            return Err(Error::InvalidFormat("shorter than the header"));
        };
        let u16_at = |pos: usize| u16::from_le_bytes([header[pos], header[pos + 1]]);
        if u32::from_le_bytes([header[0], header[1], header[2], header[3]]) != SIGNATURE {
            return Err(Error::InvalidFormat("missing Tri3 signature"));
        }
        let options = u16_at(4);
        if options & OPTIONS_RESERVED_MASK != 0 {
            return Err(Error::InvalidFormat("reserved option bits are set"));
        }
        let trie_type = match (options >> 6) & 3 {
            0 => TrieType::Fast,
            1 => TrieType::Small,
            _ => return Err(Error::InvalidFormat("unknown trie type")),
        };
        let width = ValueWidth::from_code(options & 7)
            .ok_or(Error::InvalidFormat("unknown value width"))?;
        let index_length = usize::from(u16_at(6));
        let data_length = (usize::from(options & 0xf000) << 4) | usize::from(u16_at(8));
        let index3_null_offset = u16_at(10);
        let data_null_offset = (u32::from(options & 0x0f00) << 8) | u32::from(u16_at(12));
        let high_start = u32::from(u16_at(14)) << SHIFT_2;

        if high_start > UNICODE_LIMIT {
            return Err(Error::InvalidFormat("high start beyond U+10FFFF"));
        }
        if high_start <= trie_type.fast_max() {
            return Err(Error::InvalidFormat("high start below the fast range"));
        }
        if index_length < trie_type.fast_index_length() as usize {
            return Err(Error::InvalidFormat("index shorter than the fast index"));
        }
        if data_length < HIGH_VALUE_NEG_DATA_OFFSET {
            return Err(Error::InvalidFormat("data lacks the high and error values"));
        }
        let index_bytes = index_length * 2;
        if rest.len() < index_bytes + data_length * width.bytes() {
            return Err(Error::InvalidFormat("truncated index or data"));
        }
        let (index_bytes, data_bytes) = rest.split_at(index_bytes);
        let index = index_bytes
            .chunks_exact(2)
            .map(|b| u16::from_le_bytes([b[0], b[1]]))
            .collect();
        let data = match width {
            ValueWidth::Bits8 => TrieData::Bits8(data_bytes[..data_length].to_vec()),
            ValueWidth::Bits16 => TrieData::Bits16(
                data_bytes
                    .chunks_exact(2)
                    .take(data_length)
                    .map(|b| u16::from_le_bytes([b[0], b[1]]))
                    .collect(),
            ),
            ValueWidth::Bits32 => TrieData::Bits32(
                data_bytes
                    .chunks_exact(4)
                    .take(data_length)
                    .map(|b| u32::from_le_bytes([b[0], b[1], b[2], b[3]]))
                    .collect(),
            ),
        };
        tracing::debug!(%trie_type, %width, index_length, data_length, high_start, "loaded code point trie");
        Ok(Self::from_parts(
            trie_type,
            index,
            data,
            high_start,
            index3_null_offset,
            data_null_offset,
        ))
    }
}

/// Iterator over the value ranges of a [`CodePointTrie`].
#[derive(Clone, Debug)]
pub struct Ranges<'a> {
    trie: &'a CodePointTrie,
    next: Option<u32>,
}

impl Iterator for Ranges<'_> {
    type Item = CodePointRange;

    fn next(&mut self) -> Option<Self::Item> {
        let range = self.trie.get_range(self.next?)?;
        self.next = (range.end < MAX_UNICODE).then(|| range.end + 1);
        Some(range)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use alloc::vec::Vec;

    use crate::{CodePointTrie, Error, MutableCodePointTrie, TrieType, ValueWidth};

    fn letters(trie_type: TrieType, width: ValueWidth) -> CodePointTrie {
        let mut mutable = MutableCodePointTrie::new(0, 0xad);
        mutable.set_range(0x41, 0x5a, 100).unwrap();
        mutable.set_range(0x61, 0x7a, 101).unwrap();
        mutable.set(0x1_f600, 7).unwrap();
        mutable.build_immutable(trie_type, width).unwrap()
    }

    #[test]
    fn lookups_after_compaction() {
        for trie_type in [TrieType::Fast, TrieType::Small] {
            for width in [ValueWidth::Bits8, ValueWidth::Bits16, ValueWidth::Bits32] {
                let trie = letters(trie_type, width);
                assert_eq!(trie.get(0x30), 0);
                assert_eq!(trie.get(0x41), 100);
                assert_eq!(trie.get(0x5a), 100);
                assert_eq!(trie.get_char('q'), 101);
                assert_eq!(trie.get(0x1_f600), 7);
                assert_eq!(trie.get(0x1_f601), 0);
                assert_eq!(trie.get(0x10_ffff), 0);
                assert_eq!(trie.get(0x11_0000), 0xad);
                assert_eq!(trie.error_value(), 0xad);
                assert_eq!(trie.null_value(), 0);
                assert_eq!(trie.high_start(), 0x1_f800);
                assert_eq!(trie.value_width(), width);
                assert_eq!(trie.trie_type(), trie_type);
            }
        }
    }

    #[test]
    fn ranges_cover_everything() {
        let trie = letters(TrieType::Fast, ValueWidth::Bits16);
        let ranges: Vec<_> = trie
            .iter_ranges()
            .map(|r| (r.start, r.end, r.value))
            .collect();
        assert_eq!(
            ranges,
            [
                (0, 0x40, 0),
                (0x41, 0x5a, 100),
                (0x5b, 0x60, 0),
                (0x61, 0x7a, 101),
                (0x7b, 0x1_f5ff, 0),
                (0x1_f600, 0x1_f600, 7),
                (0x1_f601, 0x10_ffff, 0),
            ]
        );
    }

    #[test]
    fn values_are_masked_to_width() {
        let mut mutable = MutableCodePointTrie::new(0x1_0001, 0x1ff);
        mutable.set(0x100, 0x1234_5678).unwrap();
        let trie = mutable.build_immutable(TrieType::Small, ValueWidth::Bits8).unwrap();
        assert_eq!(trie.get(0x100), 0x78);
        assert_eq!(trie.get(0x101), 0x01);
        assert_eq!(trie.get(0x11_0000), 0xff);
    }

    #[test]
    fn utf16_and_utf8_values() {
        let trie = letters(TrieType::Fast, ValueWidth::Bits32);
        let units: Vec<u16> = "Az\u{1f600}".encode_utf16().chain([0xd800, 0x41]).collect();
        let values: Vec<_> = trie.values_utf16(&units).collect();
        assert_eq!(
            values,
            [
                (Some('A'), 100),
                (Some('z'), 101),
                (Some('\u{1f600}'), 7),
                (None, 0xad),
                (Some('A'), 100)
            ]
        );
        let bytes = b"a\xff\xe2\x82b";
        let values: Vec<_> = trie.values_utf8(bytes).collect();
        assert_eq!(
            values,
            [(Some('a'), 101), (None, 0xad), (None, 0xad), (Some('b'), 101)]
        );
    }

    #[test]
    fn binary_round_trip() {
        for width in [ValueWidth::Bits8, ValueWidth::Bits16, ValueWidth::Bits32] {
            let trie = letters(TrieType::Small, width);
            let bytes = trie.to_bytes();
            assert_eq!(&bytes[..4], b"3irT");
            assert_eq!(bytes.len() % 4, 0);
            let parsed = CodePointTrie::from_bytes(&bytes).unwrap();
            assert_eq!(parsed, trie);
        }
    }

    #[test]
    fn rejects_malformed_input() {
        let bytes = letters(TrieType::Fast, ValueWidth::Bits16).to_bytes();
        assert_eq!(
            CodePointTrie::from_bytes(&bytes[..10]),
            Err(Error::InvalidFormat("shorter than the header"))
        );
        assert_eq!(
            CodePointTrie::from_bytes(&bytes[..bytes.len() - 2]),
            Err(Error::InvalidFormat("truncated index or data"))
        );
        let mut bad = bytes.clone();
        bad[0] ^= 1;
        assert_eq!(
            CodePointTrie::from_bytes(&bad),
            Err(Error::InvalidFormat("missing Tri3 signature"))
        );
        let mut bad = bytes.clone();
        bad[4] |= 3;
        assert_eq!(
            CodePointTrie::from_bytes(&bad),
            Err(Error::InvalidFormat("unknown value width"))
        );
        let mut bad = bytes.clone();
        bad[4] |= 0x08;
        assert_eq!(
            CodePointTrie::from_bytes(&bad),
            Err(Error::InvalidFormat("reserved option bits are set"))
        );
        let mut bad = bytes.clone();
        bad[4] |= 0x80;
        assert_eq!(
            CodePointTrie::from_bytes(&bad),
            Err(Error::InvalidFormat("unknown trie type"))
        );
        let mut bad = bytes.clone();
        bad[14..16].copy_from_slice(&0x0881_u16.to_le_bytes());
        assert_eq!(
            CodePointTrie::from_bytes(&bad),
            Err(Error::InvalidFormat("high start beyond U+10FFFF"))
        );
        let mut bad = bytes.clone();
        bad[14..16].copy_from_slice(&[0, 0]);
        assert_eq!(
            CodePointTrie::from_bytes(&bad),
            Err(Error::InvalidFormat("high start below the fast range"))
        );
        let mut bad = bytes.clone();
        bad[6..8].copy_from_slice(&0x03ff_u16.to_le_bytes());
        assert_eq!(
            CodePointTrie::from_bytes(&bad),
            Err(Error::InvalidFormat("index shorter than the fast index"))
        );
        let mut bad = bytes;
        bad[5] &= 0x0f;
        bad[8..10].copy_from_slice(&1_u16.to_le_bytes());
        assert_eq!(
            CodePointTrie::from_bytes(&bad),
            Err(Error::InvalidFormat("data lacks the high and error values"))
        );
    }

    #[test]
    fn high_start_must_cover_the_fast_range() {
        let small = letters(TrieType::Small, ValueWidth::Bits8).to_bytes();
        let mut bad = small.clone();
        bad[14..16].copy_from_slice(&0x0007_u16.to_le_bytes());
        assert_eq!(
            CodePointTrie::from_bytes(&bad),
            Err(Error::InvalidFormat("high start below the fast range"))
        );
        let mut at_limit = small;
        at_limit[14..16].copy_from_slice(&0x0008_u16.to_le_bytes());
        let trie = CodePointTrie::from_bytes(&at_limit).unwrap();
        assert_eq!(trie.high_start(), 0x1000);
        assert_eq!(trie.get(0x41), 100);
        assert_eq!(trie.get_range(0x41).map(|r| (r.end, r.value)), Some((0x5a, 100)));
    }
}
