use thiserror::Error;

/// Errors from building a trie or restoring a cursor.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[non_exhaustive]
pub enum Error {
    /// A saved [`TrieState`](crate::TrieState) came from a different buffer
    /// or root offset than the cursor it is being restored into.
    #[error("saved trie state belongs to a different trie")]
    IncompatibleState,

    /// The same key was added more than once.
    #[error("duplicate key ({len} units)")]
    DuplicateKey { len: usize },

    /// `build` was called without any keys.
    #[error("cannot build a trie from an empty key set")]
    EmptyKeySet,
}
