use crate::groups::{Classifier, GroupValue};
use anyhow::*;
use chunkfont_common::{hashing::WyHashMap, paths::path_to_string};
use serde_json::Value;
use std::{collections::BTreeMap, path::Path, sync::Arc};

async fn read_table(path: &Path) -> Result<BTreeMap<String, Value>> {
    let raw = tokio::fs::read_to_string(path)
        .await
        .with_context(|| format!("Could not read '{}'", path_to_string(path)))?;
    serde_json::from_str(&raw)
        .with_context(|| format!("Could not parse '{}'", path_to_string(path)))
}

/// Parses a table key, which is either the character itself or a `U+XXXX` code point.
pub(super) fn parse_key(key: &str) -> Result<char> {
    let mut chars = key.chars();
    if let (Some(ch), None) = (chars.next(), chars.next()) {
        return Ok(ch);
    }
    if let Some(hex) = key.strip_prefix("U+").or_else(|| key.strip_prefix("u+")) {
        if let Some(ch) = u32::from_str_radix(hex, 16).ok().and_then(char::from_u32) {
            return Ok(ch);
        }
    }
    bail!("Invalid character key: {key:?}");
}

fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64() != Some(0.0),
        Value::String(s) => !s.is_empty(),
        Value::Array(_) | Value::Object(_) => true,
    }
}

fn as_number(key: &str, value: &Value) -> Result<u32> {
    let num = match value {
        Value::Number(n) => n.as_u64(),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    };
    match num.and_then(|x| u32::try_from(x).ok()) {
        Some(num) => Ok(num),
        None => bail!("Invalid value for {key:?}: {value}"),
    }
}

/// Builds a table classifier from each entry that `value` maps to a group.
async fn load_with(
    path: &Path,
    value: impl Fn(&str, &Value) -> Result<Option<GroupValue>>,
) -> Result<Classifier> {
    let raw = read_table(path).await?;
    let mut table = WyHashMap::default();
    for (key, entry) in &raw {
        if let Some(group) = value(key, entry)? {
            table.insert(parse_key(key)?, group);
        }
    }
    Ok(Classifier::Table(Arc::new(table)))
}

/// Groups characters by `rank - 1`, where rank 1 is the most frequent.
pub async fn load_frequency(path: &Path) -> Result<Classifier> {
    load_with(path, |key, value| {
        if !is_truthy(value) {
            return Ok(None);
        }
        Ok(Some(as_number(key, value)?.saturating_sub(1)))
    })
    .await
}

/// Groups characters by `strokes - 1`, using the first listed stroke count.
pub async fn load_strokes(path: &Path) -> Result<Classifier> {
    load_with(path, |key, value| match value {
        Value::Array(counts) => match counts.first() {
            Some(first) => Ok(Some(as_number(key, first)?.saturating_sub(1))),
            None => Ok(None),
        },
        Value::Null => Ok(None),
        _ => Ok(Some(as_number(key, value)?.saturating_sub(1))),
    })
    .await
}

/// Puts every listed character in group `0`.
pub async fn load_jouyou(path: &Path) -> Result<Classifier> {
    load_with(path, |_, value| Ok(is_truthy(value).then_some(0))).await
}
