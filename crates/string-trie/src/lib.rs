//! Compact serialized prefix tries.
//!
//! `string-trie` maps byte sequences ([`BytesTrie`]) or 16-bit code unit
//! sequences ([`UnitsTrie`]) to `i32` values. A trie is a flat, immutable
//! buffer produced by [`BytesTrieBuilder`] / [`UnitsTrieBuilder`] (or supplied
//! by the caller) and borrowed by any number of cursors. A cursor matches its
//! input one unit at a time, so callers can find the longest matching prefix,
//! stop as soon as nothing further can match, or ask which units could come
//! next.
//!
//! # Example
//!
//! ```
//! use string_trie::{BytesTrie, BytesTrieBuilder, TrieResult};
//!
//! let mut builder = BytesTrieBuilder::new();
//! builder.add("a", 1).add("ab", 2).add("abc", 3);
//! let bytes = builder.build().unwrap();
//!
//! let mut trie = BytesTrie::new(&bytes);
//! assert_eq!(trie.next(b'a'), TrieResult::IntermediateValue);
//! assert_eq!(trie.value(), 1);
//! assert_eq!(trie.next(b'b'), TrieResult::IntermediateValue);
//! assert_eq!(trie.value(), 2);
//! assert_eq!(trie.next(b'c'), TrieResult::FinalValue);
//! assert_eq!(trie.value(), 3);
//! assert_eq!(trie.next(b'x'), TrieResult::NoMatch);
//!
//! let entries: Vec<_> = trie.reset().iter().collect();
//! assert_eq!(entries[1], (b"ab".to_vec(), 2));
//! ```
#![no_std]
extern crate alloc;

mod builder;
pub mod bytes_builder;
pub mod bytes_iter;
pub mod bytes_trie;
pub mod codec;
mod error;
mod state;
pub mod units_builder;
pub mod units_iter;
pub mod units_trie;
mod walk;

pub use crate::bytes_builder::BytesTrieBuilder;
pub use crate::bytes_iter::BytesTrieIter;
pub use crate::bytes_trie::BytesTrie;
pub use crate::error::Error;
pub use crate::state::TrieState;
pub use crate::units_builder::UnitsTrieBuilder;
pub use crate::units_iter::UnitsTrieIter;
pub use crate::units_trie::UnitsTrie;

/// Outcome of matching one more unit (or a whole sequence) against a trie.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum TrieResult {
    /// The input is not a prefix of any key. The cursor is stopped until reset.
    NoMatch,
    /// The input is a proper prefix of at least one key, with no value of its own.
    NoValue,
    /// The input is a key with a value, and longer keys continue from it.
    IntermediateValue,
    /// The input is a key with a value, and no longer key continues from it.
    FinalValue,
}

impl TrieResult {
    /// Whether the input so far is a prefix of some key.
    pub fn matches(self) -> bool {
        !matches!(self, Self::NoMatch)
    }

    /// Whether the input so far is itself a key.
    pub fn has_value(self) -> bool {
        matches!(self, Self::IntermediateValue | Self::FinalValue)
    }

    /// Whether another unit could continue the match.
    pub fn has_next(self) -> bool {
        matches!(self, Self::NoValue | Self::IntermediateValue)
    }
}
