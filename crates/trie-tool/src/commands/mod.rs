use std::fs;
use std::path::Path;

use anyhow::{Context, Result};

pub mod build;
pub mod dump;
pub mod get;
pub mod keys;
pub mod list;

fn read_file(path: &Path) -> Result<Vec<u8>> {
    fs::read(path).with_context(|| format!("failed to read {}", path.display()))
}

fn read_text(path: &Path) -> Result<String> {
    fs::read_to_string(path).with_context(|| format!("failed to read {}", path.display()))
}

fn write_file(path: &Path, contents: &[u8]) -> Result<()> {
    fs::write(path, contents).with_context(|| format!("failed to write {}", path.display()))?;
    tracing::info!(path = %path.display(), len = contents.len(), "wrote output");
    Ok(())
}

fn load_code_point_trie(path: &Path) -> Result<codepoint_trie::CodePointTrie> {
    let bytes = read_file(path)?;
    codepoint_trie::CodePointTrie::from_bytes(&bytes)
        .with_context(|| format!("{} is not a code point trie", path.display()))
}
