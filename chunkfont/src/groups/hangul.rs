use crate::groups::Classifier;
use anyhow::*;
use chunkfont_common::{character_set::CharacterSet, paths::path_to_string};
use std::{path::PathBuf, sync::Arc};

/// Builds a Hangul classifier whose primary set is every character listed in the given files.
pub async fn load(paths: &[PathBuf]) -> Result<Classifier> {
    let mut primary = CharacterSet::new();
    for path in paths {
        let text = tokio::fs::read_to_string(path)
            .await
            .with_context(|| format!("Could not read '{}'", path_to_string(path)))?;
        primary.insert_text(&text);
    }
    ensure!(!primary.is_empty(), "Hangul tables contain no characters.");
    Ok(Classifier::Hangul(Arc::new(primary)))
}
