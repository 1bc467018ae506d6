use std::path::PathBuf;

use anyhow::{Context, Result};
use bpaf::Bpaf;
use codepoint_trie::{CodePointTrie, MutableCodePointTrie, TrieData};
use serde::Serialize;

use crate::config::{self, CodePointSpec, MapConfig};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    Binary,
    Toml,
}

impl core::str::FromStr for OutputFormat {
    type Err = String;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "binary" => Ok(Self::Binary),
            "toml" => Ok(Self::Toml),
            _ => Err(format!("unknown output format '{s}', expected: binary, toml")),
        }
    }
}

impl core::fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::Binary => write!(f, "binary"),
            Self::Toml => write!(f, "toml"),
        }
    }
}

/// Arguments for the `build` subcommand.
#[derive(Debug, Clone, Bpaf)]
pub struct BuildArgs {
    /// Output file
    #[bpaf(short('o'), long("output"), argument("OUT"))]
    pub output: PathBuf,

    /// Write the binary trie, or its header, index and data as TOML
    #[bpaf(
        long("format"),
        argument("binary|toml"),
        fallback(OutputFormat::Binary),
        display_fallback
    )]
    pub format: OutputFormat,

    /// Map description with a [trie] table and [[range]] entries
    #[bpaf(positional("MAP"))]
    pub map: PathBuf,
}

impl BuildArgs {
    pub fn run(self) -> Result<()> {
        let text = super::read_text(&self.map)?;
        let config = config::load_map(&text)
            .with_context(|| format!("failed to parse {}", self.map.display()))?;
        let trie = build_trie(&config)?;
        let contents = match self.format {
            OutputFormat::Binary => trie.to_bytes(),
            OutputFormat::Toml => to_toml(&trie)?.into_bytes(),
        };
        super::write_file(&self.output, &contents)
    }
}

#[tracing::instrument(level = "info", skip_all, fields(ranges = config.ranges.len()))]
pub fn build_trie(config: &MapConfig) -> Result<CodePointTrie> {
    let mut mutable =
        MutableCodePointTrie::new(config.trie.initial_value, config.trie.error_value);
    for (i, range) in config.ranges.iter().enumerate() {
        let start = range.start.resolve()?;
        let end = range.end.as_ref().map_or(Ok(start), CodePointSpec::resolve)?;
        mutable
            .set_range(start, end, range.value)
            .with_context(|| format!("range #{}", i + 1))?;
    }
    let trie = mutable.build_immutable(config.trie.trie_type(), config.trie.value_width()?)?;
    tracing::info!(
        index_len = trie.index_len(),
        data_len = trie.data_len(),
        high_start = trie.high_start(),
        "built code point trie"
    );
    Ok(trie)
}

/// Human-readable form of a compacted trie.
#[derive(Debug, Serialize)]
#[serde(rename_all = "kebab-case")]
struct TrieTable {
    #[serde(rename = "type")]
    trie_type: String,
    value_width: u8,
    high_start: u32,
    null_value: u32,
    error_value: u32,
    index3_null_offset: u16,
    data_null_offset: u32,
    index: Vec<u16>,
    data: Vec<u32>,
}

fn to_toml(trie: &CodePointTrie) -> Result<String> {
    let value_width = match trie.data() {
        TrieData::Bits8(_) => 8,
        TrieData::Bits16(_) => 16,
        TrieData::Bits32(_) => 32,
    };
    let table = TrieTable {
        trie_type: trie.trie_type().to_string(),
        value_width,
        high_start: trie.high_start(),
        null_value: trie.null_value(),
        error_value: trie.error_value(),
        index3_null_offset: trie.index3_null_offset(),
        data_null_offset: trie.data_null_offset(),
        index: trie.index().to_vec(),
        data: trie.data().iter().collect(),
    };
    toml::to_string(&table).context("failed to serialize trie as TOML")
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use codepoint_trie::{TrieType, ValueWidth};

    use super::*;

    const MAP: &str = r#"
[trie]
type = "small"
value-width = 16
error-value = 0xffff

[[range]]
start = "U+0041"
end = "U+005A"
value = 1

[[range]]
start = "U+1F600"
value = 2
"#;

    #[test]
    fn builds_from_map() {
        let trie = build_trie(&config::load_map(MAP).unwrap()).unwrap();
        assert_eq!(trie.trie_type(), TrieType::Small);
        assert_eq!(trie.value_width(), ValueWidth::Bits16);
        assert_eq!(trie.get(0x40), 0);
        assert_eq!(trie.get(0x4d), 1);
        assert_eq!(trie.get(0x1_f600), 2);
        assert_eq!(trie.get(0x11_0000), 0xffff);
    }

    #[test]
    fn rejects_reversed_range() {
        let map = "[[range]]\nstart = 0x50\nend = 0x40\nvalue = 1\n";
        let err = build_trie(&config::load_map(map).unwrap()).unwrap_err();
        assert_eq!(err.to_string(), "range #1");
    }

    #[test]
    fn toml_output_lists_header_and_arrays() {
        let trie = build_trie(&config::load_map(MAP).unwrap()).unwrap();
        let text = to_toml(&trie).unwrap();
        let table: toml::Table = toml::from_str(&text).unwrap();
        assert_eq!(table["type"].as_str(), Some("small"));
        assert_eq!(table["value-width"].as_integer(), Some(16));
        assert_eq!(table["error-value"].as_integer(), Some(0xffff));
        assert_eq!(
            table["index"].as_array().unwrap().len(),
            trie.index_len()
        );
        assert_eq!(table["data"].as_array().unwrap().len(), trie.data_len());
    }
}
