use std::path::PathBuf;

use anyhow::{Context, Result};
use bpaf::Bpaf;
use string_trie::BytesTrieBuilder;

use crate::config::{self, KeysConfig};

/// Arguments for the `keys` subcommand.
#[derive(Debug, Clone, Bpaf)]
pub struct KeysArgs {
    /// Output file
    #[bpaf(short('o'), long("output"), argument("OUT"))]
    pub output: PathBuf,

    /// Key set with a [keys] table of key = value pairs
    #[bpaf(positional("KEYS"))]
    pub keys: PathBuf,
}

impl KeysArgs {
    pub fn run(self) -> Result<()> {
        let text = super::read_text(&self.keys)?;
        let config = config::load_keys(&text)
            .with_context(|| format!("failed to parse {}", self.keys.display()))?;
        let bytes = build_bytes_trie(&config)?;
        super::write_file(&self.output, &bytes)
    }
}

pub fn build_bytes_trie(config: &KeysConfig) -> Result<Vec<u8>> {
    let bytes = config
        .keys
        .iter()
        .map(|(key, value)| (key.as_str(), *value))
        .collect::<BytesTrieBuilder>()
        .build()
        .context("failed to build byte trie")?;
    tracing::info!(keys = config.keys.len(), len = bytes.len(), "built byte trie");
    Ok(bytes)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use string_trie::BytesTrie;

    use super::*;

    #[test]
    fn every_key_is_found() {
        let config = config::load_keys("[keys]\na = 1\nab = 2\nabc = 3\nb = -4\n").unwrap();
        let bytes = build_bytes_trie(&config).unwrap();
        let mut trie = BytesTrie::new(&bytes);
        for (key, value) in &config.keys {
            assert!(trie.reset().next_seq(key.as_bytes()).has_value(), "{key}");
            assert_eq!(trie.value(), *value);
        }
    }

    #[test]
    fn empty_key_set_is_an_error() {
        let config = config::load_keys("[keys]\n").unwrap();
        let err = build_bytes_trie(&config).unwrap_err();
        assert_eq!(err.to_string(), "failed to build byte trie");
    }
}
