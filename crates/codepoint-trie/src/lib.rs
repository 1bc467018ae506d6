//! Code point tries: maps from every Unicode code point to a 32-bit value.
//!
//! Values are set on a [`MutableCodePointTrie`], which is then compacted
//! into an immutable [`CodePointTrie`] with deduplicated data blocks and a
//! multi-level index. Lookups in the fast range take one index step. The
//! compacted form can be written to and read from a little-endian binary
//! layout with [`CodePointTrie::to_bytes`] and [`CodePointTrie::from_bytes`].
//!
//! # Example
//!
//! ```
//! use codepoint_trie::{MutableCodePointTrie, TrieType, ValueWidth};
//!
//! let mut mutable = MutableCodePointTrie::new(0, 0xff);
//! mutable.set_range(0x41, 0x5a, 1).unwrap();
//! mutable.set(0x1_f600, 2).unwrap();
//!
//! let trie = mutable.build_immutable(TrieType::Fast, ValueWidth::Bits8).unwrap();
//! assert_eq!(trie.get_char('Q'), 1);
//! assert_eq!(trie.get(0x1_f600), 2);
//! assert_eq!(trie.get(0x11_0000), 0xff);
//!
//! let range = trie.get_range(0x41).unwrap();
//! assert_eq!((range.end, range.value), (0x5a, 1));
//! ```
#![no_std]
extern crate alloc;

mod compact;
mod consts;
mod error;
pub mod immutable;
pub mod mutable;
mod range;

pub use crate::error::Error;
pub use crate::immutable::{CodePointTrie, Ranges, TrieData, TrieType, ValueWidth};
pub use crate::mutable::MutableCodePointTrie;
pub use crate::range::{CodePointRange, RangeOption};
