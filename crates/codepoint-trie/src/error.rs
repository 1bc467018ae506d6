use thiserror::Error;

/// Errors from mutating, compacting or decoding a code point trie.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[non_exhaustive]
pub enum Error {
    /// A code point above U+10FFFF, or a range whose start is after its end.
    #[error("invalid code point range {start:#x}..={end:#x}")]
    InvalidInput { start: u32, end: u32 },

    /// The compacted index or data would not fit the offsets of the binary format.
    #[error("trie structure capacity exceeded: {what} length {len:#x}")]
    CapacityExceeded { what: &'static str, len: usize },

    /// A serialized trie is truncated or has an inconsistent header.
    #[error("invalid serialized trie: {0}")]
    InvalidFormat(&'static str),
}
