use crate::Error;

/// A cursor position captured with the identity of the trie it came from.
///
/// Unlike the packed `u64` from `save_state`, restoring a `TrieState` checks
/// that the target cursor reads the same buffer from the same root.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct TrieState {
    buffer: usize,
    len: usize,
    root: usize,
    pos: Option<usize>,
    remaining_match_length: i32,
}

impl TrieState {
    pub(crate) fn capture<T>(
        buffer: &[T],
        root: usize,
        pos: Option<usize>,
        remaining_match_length: i32,
    ) -> Self {
        Self {
            buffer: buffer.as_ptr() as usize,
            len: buffer.len(),
            root,
            pos,
            remaining_match_length,
        }
    }

    /// Returns `(pos, remaining_match_length)` if this state was captured from
    /// `buffer` at `root`.
    pub(crate) fn restore<T>(
        &self,
        buffer: &[T],
        root: usize,
    ) -> Result<(Option<usize>, i32), Error> {
        if self.buffer != buffer.as_ptr() as usize || self.len != buffer.len() || self.root != root
        {
            return Err(Error::IncompatibleState);
        }
        Ok((self.pos, self.remaining_match_length))
    }
}

/// Packs a cursor into `remaining << 32 | pos`, with `u32::MAX` as the stopped
/// position.
#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
pub(crate) fn pack(pos: Option<usize>, remaining_match_length: i32) -> u64 {
    let pos = pos.map_or(u32::MAX, |pos| pos as u32);
    (u64::from(remaining_match_length as u32) << 32) | u64::from(pos)
}

#[allow(clippy::cast_possible_truncation, clippy::cast_possible_wrap)]
pub(crate) fn unpack(state: u64) -> (Option<usize>, i32) {
    let pos = state as u32;
    let remaining_match_length = (state >> 32) as u32 as i32;
    let pos = (pos != u32::MAX).then_some(pos as usize);
    (pos, remaining_match_length)
}
