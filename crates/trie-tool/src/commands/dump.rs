use std::io::Write;
use std::path::PathBuf;

use anyhow::Result;
use bpaf::Bpaf;
use codepoint_trie::CodePointTrie;

/// Arguments for the `dump` subcommand.
#[derive(Debug, Clone, Bpaf)]
pub struct DumpArgs {
    /// Binary code point trie
    #[bpaf(positional("TRIE"))]
    pub trie: PathBuf,
}

impl DumpArgs {
    pub fn run(self, out: &mut impl Write) -> Result<()> {
        let trie = super::load_code_point_trie(&self.trie)?;
        write_ranges(&trie, out)
    }
}

/// Writes a summary line, then one line per range of equal values.
pub fn write_ranges(trie: &CodePointTrie, out: &mut impl Write) -> Result<()> {
    writeln!(
        out,
        "# {} trie, {}-bit values, high start U+{:04X}, index {} units, data {} values",
        trie.trie_type(),
        trie.value_width(),
        trie.high_start(),
        trie.index_len(),
        trie.data_len(),
    )?;
    for range in trie.iter_ranges() {
        if range.start == range.end {
            writeln!(out, "U+{:04X} {:#x}", range.start, range.value)?;
        } else {
            writeln!(
                out,
                "U+{:04X}..U+{:04X} {:#x}",
                range.start, range.end, range.value
            )?;
        }
    }
    Ok(())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use codepoint_trie::{MutableCodePointTrie, TrieType, ValueWidth};

    use super::write_ranges;

    #[test]
    fn lists_every_range() {
        let mut mutable = MutableCodePointTrie::new(0, 0);
        mutable.set_range(0x41, 0x5a, 100).unwrap();
        mutable.set(0x1_f600, 7).unwrap();
        let trie = mutable
            .build_immutable(TrieType::Fast, ValueWidth::Bits8)
            .unwrap();

        let mut out = Vec::new();
        write_ranges(&trie, &mut out).unwrap();
        let text = String::from_utf8(out).unwrap();
        let lines: Vec<_> = text.lines().collect();
        assert!(lines[0].starts_with("# fast trie, 8-bit values, high start U+1F800"));
        assert_eq!(
            &lines[1..],
            [
                "U+0000..U+0040 0x0",
                "U+0041..U+005A 0x64",
                "U+005B..U+1F5FF 0x0",
                "U+1F600 0x7",
                "U+1F601..U+10FFFF 0x0",
            ]
        );
    }
}
