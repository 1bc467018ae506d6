//! Serializes `(byte key, value)` pairs into the [`BytesTrie`](crate::BytesTrie) format.

use alloc::vec::Vec;

use crate::Error;
use crate::builder::{self, NodeEncoding, Sink};
use crate::codec::bytes;

/// Collects keys and serializes them into a byte trie.
///
/// Keys may be added in any order; [`build`](Self::build) sorts them.
///
/// ```
/// use string_trie::{BytesTrie, BytesTrieBuilder};
///
/// let bytes: Vec<u8> = [("cat", 1), ("car", 2), ("cart", 3)]
///     .into_iter()
///     .collect::<BytesTrieBuilder>()
///     .build()
///     .unwrap();
/// let mut trie = BytesTrie::new(&bytes);
/// assert!(trie.next_seq(b"car").has_value());
/// assert_eq!(trie.value(), 2);
/// ```
#[derive(Clone, Debug, Default)]
pub struct BytesTrieBuilder {
    entries: Vec<(Vec<u8>, i32)>,
}

impl BytesTrieBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a key. Duplicates are reported by [`build`](Self::build).
    pub fn add(&mut self, key: impl AsRef<[u8]>, value: i32) -> &mut Self {
        self.entries.push((key.as_ref().to_vec(), value));
        self
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Removes every key so the builder can be reused.
    pub fn clear(&mut self) -> &mut Self {
        self.entries.clear();
        self
    }

    /// Serializes the keys added so far.
    ///
    /// # Errors
    ///
    /// Returns [`Error::EmptyKeySet`] if nothing was added and
    /// [`Error::DuplicateKey`] if a key was added twice.
    #[tracing::instrument(level = "debug", skip_all, fields(keys = self.entries.len()))]
    pub fn build(&mut self) -> Result<Vec<u8>, Error> {
        builder::build::<ByteNodes>(&mut self.entries)
    }
}

impl<K: AsRef<[u8]>> Extend<(K, i32)> for BytesTrieBuilder {
    fn extend<I: IntoIterator<Item = (K, i32)>>(&mut self, iter: I) {
        for (key, value) in iter {
            self.add(key, value);
        }
    }
}

impl<K: AsRef<[u8]>> FromIterator<(K, i32)> for BytesTrieBuilder {
    fn from_iter<I: IntoIterator<Item = (K, i32)>>(iter: I) -> Self {
        let mut builder = Self::new();
        builder.extend(iter);
        builder
    }
}

struct ByteNodes;

impl NodeEncoding for ByteNodes {
    type Unit = u8;

    const MIN_LINEAR_MATCH: usize = bytes::MIN_LINEAR_MATCH as usize;
    const MAX_LINEAR_MATCH_LENGTH: usize = bytes::MAX_LINEAR_MATCH_LENGTH;
    const MAX_BRANCH_LINEAR_SUB_NODE_LENGTH: usize = bytes::MAX_BRANCH_LINEAR_SUB_NODE_LENGTH;

    #[allow(clippy::cast_possible_truncation)]
    fn lead(value: usize) -> u8 {
        debug_assert!(value <= 0xff);
        value as u8
    }

    fn write_value_and_final(sink: &mut Sink<u8>, value: i32, is_final: bool) -> usize {
        sink.write_all(bytes::encode_value(value, is_final).as_slice())
    }

    fn write_value_and_type(sink: &mut Sink<u8>, has_value: bool, value: i32, node: usize) -> usize {
        let offset = sink.write(Self::lead(node));
        if has_value {
            Self::write_value_and_final(sink, value, false)
        } else {
            offset
        }
    }

    fn write_delta(sink: &mut Sink<u8>, delta: usize) -> usize {
        sink.write_all(bytes::encode_delta(delta).as_slice())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use alloc::vec;

    use super::BytesTrieBuilder;
    use crate::Error;

    #[test]
    fn single_key_layout() {
        let bytes = BytesTrieBuilder::new().add("ab", 5).build().unwrap();
        // linear match of two bytes, then final value 5
        assert_eq!(bytes, vec![0x11, b'a', b'b', ((0x10 + 5) << 1) | 1]);
    }

    #[test]
    fn empty_key_holds_a_value() {
        let bytes = BytesTrieBuilder::new().add("", 7).build().unwrap();
        assert_eq!(bytes, vec![((0x10 + 7) << 1) | 1]);
    }

    #[test]
    fn rejects_empty_and_duplicate_sets() {
        assert_eq!(BytesTrieBuilder::new().build(), Err(Error::EmptyKeySet));
        let err = BytesTrieBuilder::new()
            .add("dup", 1)
            .add("x", 2)
            .add("dup", 3)
            .build()
            .unwrap_err();
        assert_eq!(err, Error::DuplicateKey { len: 3 });
    }

    #[test]
    fn clear_resets_the_key_set() {
        let mut builder = BytesTrieBuilder::new();
        builder.add("a", 1).add("b", 2);
        assert_eq!(builder.len(), 2);
        builder.clear();
        assert!(builder.is_empty());
        assert_eq!(builder.build(), Err(Error::EmptyKeySet));
    }
}
