use alloc::collections::BTreeMap;

use anyhow::{Context, Result, bail};
use codepoint_trie::{TrieType, ValueWidth};
use serde::Deserialize;

/// A code point map description, loaded from TOML.
///
/// ```toml
/// [trie]
/// type = "small"
/// value-width = 16
/// initial-value = 0
/// error-value = 0xffff
///
/// [[range]]
/// start = "U+0041"
/// end = "U+005A"
/// value = 1
/// ```
#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct MapConfig {
    #[serde(default)]
    pub trie: TrieSection,
    #[serde(default, rename = "range")]
    pub ranges: Vec<RangeEntry>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields, rename_all = "kebab-case")]
pub struct TrieSection {
    #[serde(default, rename = "type")]
    pub trie_type: TrieKind,
    #[serde(default = "default_value_width")]
    pub value_width: u8,
    #[serde(default)]
    pub initial_value: u32,
    #[serde(default)]
    pub error_value: u32,
}

fn default_value_width() -> u8 {
    32
}

impl Default for TrieSection {
    fn default() -> Self {
        Self {
            trie_type: TrieKind::default(),
            value_width: default_value_width(),
            initial_value: 0,
            error_value: 0,
        }
    }
}

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum TrieKind {
    #[default]
    Fast,
    Small,
}

/// Sets `start..=end` to `value`. `end` defaults to `start`.
#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RangeEntry {
    pub start: CodePointSpec,
    pub end: Option<CodePointSpec>,
    pub value: u32,
}

/// A code point written as an integer or as `U+XXXX` / `0x…` / decimal text.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum CodePointSpec {
    Number(u32),
    Text(String),
}

impl CodePointSpec {
    pub fn resolve(&self) -> Result<u32> {
        match self {
            Self::Number(c) => Ok(*c),
            Self::Text(s) => parse_code_point(s),
        }
    }
}

impl TrieSection {
    pub fn trie_type(&self) -> TrieType {
        match self.trie_type {
            TrieKind::Fast => TrieType::Fast,
            TrieKind::Small => TrieType::Small,
        }
    }

    pub fn value_width(&self) -> Result<ValueWidth> {
        match self.value_width {
            8 => Ok(ValueWidth::Bits8),
            16 => Ok(ValueWidth::Bits16),
            32 => Ok(ValueWidth::Bits32),
            other => bail!("unsupported value width {other}, expected 8, 16 or 32"),
        }
    }
}

/// Byte trie keys, loaded from a `[keys]` table mapping each key to its value.
#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct KeysConfig {
    pub keys: BTreeMap<String, i32>,
}

/// Parses `U+0041`, `0x41` or `65`.
pub fn parse_code_point(s: &str) -> Result<u32> {
    let s = s.trim();
    let parsed = if let Some(hex) = s
        .strip_prefix("U+")
        .or_else(|| s.strip_prefix("u+"))
        .or_else(|| s.strip_prefix("0x"))
        .or_else(|| s.strip_prefix("0X"))
    {
        u32::from_str_radix(hex, 16)
    } else {
        s.parse()
    };
    parsed.with_context(|| format!("invalid code point '{s}'"))
}

pub fn load_map(toml_str: &str) -> Result<MapConfig, toml::de::Error> {
    toml::from_str(toml_str)
}

pub fn load_keys(toml_str: &str) -> Result<KeysConfig, toml::de::Error> {
    toml::from_str(toml_str)
}
