use crate::consts::MAX_UNICODE;

/// A maximal run of code points that map to the same value.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct CodePointRange {
    pub start: u32,
    pub end: u32,
    pub value: u32,
}

impl CodePointRange {
    /// Whether the range reaches U+10FFFF.
    pub fn is_last(&self) -> bool {
        self.end == MAX_UNICODE
    }
}

/// How surrogate code points are treated during range enumeration.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum RangeOption {
    /// Surrogates get their stored values.
    #[default]
    Normal,
    /// Lead surrogates U+D800..=U+DBFF are treated as having the surrogate value.
    FixedLeadSurrogates,
    /// All surrogates U+D800..=U+DFFF are treated as having the surrogate value.
    FixedAllSurrogates,
}

const FIRST_SURROGATE: u32 = 0xd800;

/// Applies a [`RangeOption`] on top of a plain range lookup.
///
/// `lookup` returns the maximal range starting at its argument with the
/// filter already applied.
pub(crate) fn with_option(
    start: u32,
    option: RangeOption,
    surrogate_value: u32,
    lookup: impl Fn(u32) -> Option<CodePointRange>,
) -> Option<CodePointRange> {
    let surrogate_end = match option {
        RangeOption::Normal => return lookup(start),
        RangeOption::FixedLeadSurrogates => 0xdbff,
        RangeOption::FixedAllSurrogates => 0xdfff,
    };
    let mut range = lookup(start)?;
    if range.end < FIRST_SURROGATE - 1 || start > surrogate_end {
        return Some(range);
    }
    // The range touches the surrogates or ends right before them.
    if range.value == surrogate_value {
        if range.end >= surrogate_end {
            return Some(range);
        }
    } else {
        if start < FIRST_SURROGATE {
            range.end = FIRST_SURROGATE - 1;
            return Some(range);
        }
        // Starts on a surrogate whose stored value differs.
        range.value = surrogate_value;
        if range.end > surrogate_end {
            range.end = surrogate_end;
            return Some(range);
        }
    }
    // Merge with an immediately following range of the same value.
    range.end = match lookup(surrogate_end + 1) {
        Some(next) if next.value == surrogate_value => next.end,
        _ => surrogate_end,
    };
    Some(range)
}

/// Accumulates one run of equal filtered values during range enumeration.
///
/// Stored values equal to the trie's null value map to `filter(null)`
/// without calling the filter again.
pub(crate) struct RangeScan<F> {
    filter: F,
    trie_null_value: u32,
    null_value: u32,
    trie_value: u32,
    value: Option<u32>,
}

impl<F: Fn(u32) -> u32> RangeScan<F> {
    pub(crate) fn new(trie_null_value: u32, filter: F) -> Self {
        let null_value = filter(trie_null_value);
        Self {
            filter,
            trie_null_value,
            null_value,
            trie_value: trie_null_value,
            value: None,
        }
    }

    fn filtered(&self, trie_value: u32) -> u32 {
        if trie_value == self.trie_null_value {
            self.null_value
        } else {
            (self.filter)(trie_value)
        }
    }

    /// Adds one stored value to the run. Returns `false` if it maps to a
    /// different value, which ends the run before it.
    pub(crate) fn extend(&mut self, trie_value: u32) -> bool {
        match self.value {
            None => {
                self.trie_value = trie_value;
                self.value = Some(self.filtered(trie_value));
                true
            }
            Some(_) if trie_value == self.trie_value => true,
            Some(value) => {
                if self.filtered(trie_value) != value {
                    return false;
                }
                // Compare later values against the newer stored value.
                self.trie_value = trie_value;
                true
            }
        }
    }

    /// The filtered value of the run.
    pub(crate) fn value(&self) -> u32 {
        self.value.unwrap_or(self.null_value)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::{CodePointRange, RangeOption, with_option};

    /// U+0000..=U+D7FF -> 1, U+D800..=U+DBFF -> 2, U+DC00..=U+DFFF -> 3, rest -> 1.
    fn lookup(start: u32) -> Option<CodePointRange> {
        let (end, value) = match start {
            0..=0xd7ff => (0xd7ff, 1),
            0xd800..=0xdbff => (0xdbff, 2),
            0xdc00..=0xdfff => (0xdfff, 3),
            0xe000..=0x10_ffff => (0x10_ffff, 1),
            _ => return None,
        };
        Some(CodePointRange { start, end, value })
    }

    #[test]
    fn normal_passes_through() {
        let range = with_option(0xd800, RangeOption::Normal, 1, lookup).unwrap();
        assert_eq!((range.end, range.value), (0xdbff, 2));
    }

    #[test]
    fn fixed_lead_surrogates() {
        let range = with_option(0xd800, RangeOption::FixedLeadSurrogates, 9, lookup).unwrap();
        assert_eq!((range.end, range.value), (0xdbff, 9));
        let range = with_option(0xdc00, RangeOption::FixedLeadSurrogates, 9, lookup).unwrap();
        assert_eq!((range.end, range.value), (0xdfff, 3));
    }

    #[test]
    fn fixed_all_surrogates_merges_with_neighbours() {
        let range = with_option(0, RangeOption::FixedAllSurrogates, 1, lookup).unwrap();
        assert_eq!((range.end, range.value), (0x10_ffff, 1));
        let range = with_option(0xd900, RangeOption::FixedAllSurrogates, 7, lookup).unwrap();
        assert_eq!((range.start, range.end, range.value), (0xd900, 0xdfff, 7));
    }
}
