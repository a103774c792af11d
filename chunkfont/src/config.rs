use crate::groups::GroupName;
use anyhow::*;
use chunkfont_common::paths::path_to_string;
use chunkfont_fontops::encode::OutputFormat;
use serde::{
    de::{MapAccess, Visitor},
    Deserialize, Deserializer,
};
use std::{
    fmt::Formatter,
    num::NonZeroUsize,
    path::{Path, PathBuf},
};
use tracing::{debug, warn};

/// The default configuration.
pub const DEFAULT_CONFIG: &str = include_str!("default_config.toml");

/// Lowercases a name and strips everything but the letters `a` to `z`.
pub fn normalize_name(name: &str) -> String {
    name.chars()
        .map(|x| x.to_ascii_lowercase())
        .filter(|x| x.is_ascii_lowercase())
        .collect()
}

/// Font weights keyed by file name fragments, in the order they were written.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct WeightTable(Vec<(String, u32)>);
impl WeightTable {
    pub fn new(entries: impl IntoIterator<Item = (impl Into<String>, u32)>) -> Self {
        WeightTable(entries.into_iter().map(|(k, v)| (k.into(), v)).collect())
    }

    pub fn entries(&self) -> &[(String, u32)] {
        &self.0
    }

    /// Returns the weight of the first key contained in the normalized file name.
    pub fn lookup(&self, file_name: &str) -> Option<u32> {
        let file_name = normalize_name(file_name);
        self.0
            .iter()
            .find(|(key, _)| file_name.contains(&normalize_name(key)))
            .map(|(_, weight)| *weight)
    }
}
impl<'de> Deserialize<'de> for WeightTable {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct WeightTableVisitor;
        impl<'de> Visitor<'de> for WeightTableVisitor {
            type Value = WeightTable;

            fn expecting(&self, f: &mut Formatter) -> std::fmt::Result {
                f.write_str("a map of file name fragments to font weights")
            }

            fn visit_map<A: MapAccess<'de>>(self, mut map: A) -> Result<WeightTable, A::Error> {
                let mut entries = Vec::new();
                while let Some(entry) = map.next_entry::<String, u32>()? {
                    entries.push(entry);
                }
                Result::Ok(WeightTable(entries))
            }
        }
        deserializer.deserialize_map(WeightTableVisitor)
    }
}

fn default_formats() -> Vec<OutputFormat> {
    OutputFormat::ALL.to_vec()
}
fn default_assets_dir() -> PathBuf {
    PathBuf::from("assets")
}

/// Settings for splitting fonts into chunks.
///
/// Field names may also be written in camelCase, as in `chunkSize`.
#[derive(Clone, Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ChunkConfig {
    #[serde(alias = "chunkSize")]
    pub chunk_size: NonZeroUsize,
    #[serde(alias = "chunkOverGroups", default)]
    pub chunk_over_groups: bool,
    #[serde(alias = "groupBy")]
    pub group_by: Vec<GroupName>,
    #[serde(alias = "weightByFileName", default)]
    pub weight_by_file_name: WeightTable,
    #[serde(default = "default_formats")]
    pub formats: Vec<OutputFormat>,
    #[serde(alias = "assetsDir", default = "default_assets_dir")]
    pub assets_dir: PathBuf,
    #[serde(alias = "storeUri", default)]
    pub store_uri: String,
}
impl ChunkConfig {
    /// Parses a TOML configuration.
    pub fn from_toml(source: &str) -> Result<Self> {
        let config: ChunkConfig = toml::from_str(source)?;
        config.validate()?;
        Ok(config)
    }

    /// Parses a JSON configuration.
    pub fn from_json(source: &str) -> Result<Self> {
        let config: ChunkConfig = serde_json::from_str(source)?;
        config.validate()?;
        Ok(config)
    }

    /// Loads a configuration file. Files ending in `.json` are JSON, anything else is TOML.
    pub fn load(path: &Path) -> Result<Self> {
        let source = std::fs::read_to_string(path)
            .with_context(|| format!("Could not read config '{}'", path_to_string(path)))?;
        let is_json = path
            .extension()
            .is_some_and(|x| x.eq_ignore_ascii_case("json"));
        let config = if is_json { Self::from_json(&source) } else { Self::from_toml(&source) };
        let config =
            config.with_context(|| format!("Invalid config '{}'", path_to_string(path)))?;
        debug!("Loaded config: {config:#?}");
        Ok(config)
    }

    /// The embedded default configuration.
    pub fn default_config() -> Result<Self> {
        Self::from_toml(DEFAULT_CONFIG)
    }

    fn validate(&self) -> Result<()> {
        ensure!(!self.group_by.is_empty(), "`group_by` must name at least one group.");
        ensure!(!self.formats.is_empty(), "`formats` must name at least one format.");
        for (key, _) in self.weight_by_file_name.entries() {
            ensure!(
                !normalize_name(key).is_empty(),
                "Weight key {key:?} contains no letters, and would match every file name.",
            );
        }

        if let Some(last) = self.group_by.last() {
            if !last.is_total() {
                warn!(
                    "`group_by` ends with '{last}', which does not match every character. \
                     Characters matched by no group will be left out of the output. \
                     Add `all` or `unicode-blocks` last to include them.",
                );
            }
        }
        Ok(())
    }
}
