use std::io::Write;
use std::path::PathBuf;

use anyhow::Result;
use bpaf::Bpaf;

use crate::config::parse_code_point;

/// Arguments for the `get` subcommand.
#[derive(Debug, Clone, Bpaf)]
pub struct GetArgs {
    /// Binary code point trie
    #[bpaf(positional("TRIE"))]
    pub trie: PathBuf,

    /// Code point as U+XXXX, 0x... or decimal
    #[bpaf(positional("CODE_POINT"))]
    pub code_point: String,
}

impl GetArgs {
    pub fn run(self, out: &mut impl Write) -> Result<()> {
        let c = parse_code_point(&self.code_point)?;
        let trie = super::load_code_point_trie(&self.trie)?;
        let value = trie.get(c);
        tracing::debug!(c, value, "lookup");
        writeln!(out, "{value}")?;
        Ok(())
    }
}
