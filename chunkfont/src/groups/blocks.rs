use crate::groups::Classifier;
use anyhow::*;
use chunkfont_common::paths::path_to_string;
use std::{io, ops::RangeInclusive, path::Path, sync::Arc};
use tracing::debug;
use unic_ucd_block::BlockIter;

/// Parses the `XXXX..YYYY; Name` lines of a Unicode `Blocks.txt` file, in file order.
pub(super) fn parse_blocks(text: &str) -> Result<Vec<RangeInclusive<u32>>> {
    let mut blocks = Vec::new();
    for (idx, line) in text.lines().enumerate() {
        let line = line.split('#').next().unwrap_or_default().trim();
        if line.is_empty() {
            continue;
        }

        let parsed = line.split_once(';').and_then(|(range, _)| {
            let (start, end) = range.trim().split_once("..")?;
            let start = u32::from_str_radix(start.trim(), 16).ok()?;
            let end = u32::from_str_radix(end.trim(), 16).ok()?;
            Some(start..=end)
        });
        match parsed {
            Some(range) if range.start() <= range.end() => blocks.push(range),
            _ => bail!("Invalid block on line {}: {line:?}", idx + 1),
        }
    }
    ensure!(!blocks.is_empty(), "Block table contains no blocks.");
    Ok(blocks)
}

/// The block table built into the binary.
pub(super) fn builtin_blocks() -> Vec<RangeInclusive<u32>> {
    BlockIter::new()
        .map(|block| block.range.low as u32..=block.range.high as u32)
        .collect()
}

/// Loads the block table from `path`, or uses the built-in table if the file does not exist.
pub async fn load(path: &Path) -> Result<Classifier> {
    let blocks = match tokio::fs::read_to_string(path).await {
        Result::Ok(text) => parse_blocks(&text)
            .with_context(|| format!("Could not parse '{}'", path_to_string(path)))?,
        Err(e) if e.kind() == io::ErrorKind::NotFound => {
            debug!("No block table at '{}', using built-in blocks.", path_to_string(path));
            builtin_blocks()
        }
        Err(e) => {
            return Err(e).with_context(|| format!("Could not read '{}'", path_to_string(path)))
        }
    };
    Ok(Classifier::Blocks(blocks.into()))
}
