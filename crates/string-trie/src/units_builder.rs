//! Serializes `(16-bit key, value)` pairs into the [`UnitsTrie`](crate::UnitsTrie) format.

use alloc::vec::Vec;

use crate::Error;
use crate::builder::{self, NodeEncoding, Sink};
use crate::codec::units;

/// Collects keys of 16-bit code units and serializes them into a trie.
///
/// Keys are compared unit by unit, so UTF-16 strings sort in code unit order,
/// not code point order.
#[derive(Clone, Debug, Default)]
pub struct UnitsTrieBuilder {
    entries: Vec<(Vec<u16>, i32)>,
}

impl UnitsTrieBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a key of raw code units.
    pub fn add(&mut self, key: impl AsRef<[u16]>, value: i32) -> &mut Self {
        self.entries.push((key.as_ref().to_vec(), value));
        self
    }

    /// Adds a string key, encoded as UTF-16.
    pub fn add_str(&mut self, key: &str, value: i32) -> &mut Self {
        self.entries.push((key.encode_utf16().collect(), value));
        self
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

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
    pub fn build(&mut self) -> Result<Vec<u16>, Error> {
        builder::build::<UnitNodes>(&mut self.entries)
    }
}

impl<'k> FromIterator<(&'k str, i32)> for UnitsTrieBuilder {
    fn from_iter<I: IntoIterator<Item = (&'k str, i32)>>(iter: I) -> Self {
        let mut builder = Self::new();
        for (key, value) in iter {
            builder.add_str(key, value);
        }
        builder
    }
}

struct UnitNodes;

impl NodeEncoding for UnitNodes {
    type Unit = u16;

    const MIN_LINEAR_MATCH: usize = units::MIN_LINEAR_MATCH as usize;
    const MAX_LINEAR_MATCH_LENGTH: usize = units::MAX_LINEAR_MATCH_LENGTH;
    const MAX_BRANCH_LINEAR_SUB_NODE_LENGTH: usize = units::MAX_BRANCH_LINEAR_SUB_NODE_LENGTH;

    #[allow(clippy::cast_possible_truncation)]
    fn lead(value: usize) -> u16 {
        debug_assert!(value <= 0xffff);
        value as u16
    }

    fn write_value_and_final(sink: &mut Sink<u16>, value: i32, is_final: bool) -> usize {
        sink.write_all(units::encode_value(value, is_final).as_slice())
    }

    // An intermediate value shares its lead unit with the node type.
    fn write_value_and_type(sink: &mut Sink<u16>, has_value: bool, value: i32, node: usize) -> usize {
        if has_value {
            sink.write_all(units::encode_node_value(value, Self::lead(node)).as_slice())
        } else {
            sink.write(Self::lead(node))
        }
    }

    fn write_delta(sink: &mut Sink<u16>, delta: usize) -> usize {
        sink.write_all(units::encode_delta(delta).as_slice())
    }
}
