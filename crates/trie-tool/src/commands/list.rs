use std::io::Write;
use std::path::PathBuf;

use anyhow::Result;
use bpaf::Bpaf;
use string_trie::BytesTrieIter;

/// Arguments for the `list` subcommand.
#[derive(Debug, Clone, Bpaf)]
pub struct ListArgs {
    /// Truncate keys to this many bytes; 0 lists whole keys. Truncated keys
    /// are printed with the value -1
    #[bpaf(long("max-length"), argument("N"), fallback(0))]
    pub max_length: usize,

    /// Binary byte trie
    #[bpaf(positional("BYTES_TRIE"))]
    pub trie: PathBuf,
}

impl ListArgs {
    pub fn run(self, out: &mut impl Write) -> Result<()> {
        let bytes = super::read_file(&self.trie)?;
        write_entries(&bytes, self.max_length, out)
    }
}

/// Writes `key<TAB>value` per entry in key order, with invalid UTF-8 escaped.
pub fn write_entries(bytes: &[u8], max_length: usize, out: &mut impl Write) -> Result<()> {
    for (key, value) in BytesTrieIter::new(bytes, max_length) {
        writeln!(out, "{}\t{value}", key.escape_ascii())?;
    }
    Ok(())
}
