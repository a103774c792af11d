//! Classifiers that sort characters into groups, and the tables they are built from.

use anyhow::*;
use chunkfont_common::{character_set::CharacterSet, hashing::WyHashMap};
use serde::Deserialize;
use std::{
    fmt::{Debug, Display, Formatter},
    ops::RangeInclusive,
    path::{Path, PathBuf},
    str::FromStr,
    sync::Arc,
};
use tracing::debug;

mod blocks;
mod hangul;
mod unihan;

/// The group a classifier assigns a character to. Lower values sort first.
pub type GroupValue = u32;

/// The precomposed Hangul syllables block.
const HANGUL_SYLLABLES: RangeInclusive<char> = '\u{AC00}'..='\u{D7A3}';

/// The names of the available classifiers.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash, Deserialize)]
pub enum GroupName {
    #[serde(rename = "ideograph-frequency")]
    IdeographFrequency,
    #[serde(rename = "ideograph-strokes")]
    IdeographStrokes,
    #[serde(rename = "ideograph-jouyou")]
    IdeographJouyou,
    #[serde(rename = "hangul-2350")]
    Hangul2350,
    #[serde(rename = "hangul-2574")]
    Hangul2574,
    #[serde(rename = "unicode-blocks")]
    UnicodeBlocks,
    #[serde(rename = "all")]
    All,
}
impl GroupName {
    pub const ALL: &'static [GroupName] = &[
        GroupName::IdeographFrequency,
        GroupName::IdeographStrokes,
        GroupName::IdeographJouyou,
        GroupName::Hangul2350,
        GroupName::Hangul2574,
        GroupName::UnicodeBlocks,
        GroupName::All,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            GroupName::IdeographFrequency => "ideograph-frequency",
            GroupName::IdeographStrokes => "ideograph-strokes",
            GroupName::IdeographJouyou => "ideograph-jouyou",
            GroupName::Hangul2350 => "hangul-2350",
            GroupName::Hangul2574 => "hangul-2574",
            GroupName::UnicodeBlocks => "unicode-blocks",
            GroupName::All => "all",
        }
    }

    /// Whether the classifier matches every character.
    pub fn is_total(&self) -> bool {
        matches!(self, GroupName::UnicodeBlocks | GroupName::All)
    }
}
impl FromStr for GroupName {
    type Err = Error;
    fn from_str(s: &str) -> Result<Self> {
        match GroupName::ALL.iter().find(|x| x.as_str() == s) {
            Some(name) => Ok(*name),
            None => bail!("Unknown group name: {s:?}"),
        }
    }
}
impl Display for GroupName {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Maps a character to an optional group.
#[derive(Clone)]
pub enum Classifier {
    /// Looks the character up in a table of precomputed groups.
    Table(Arc<WyHashMap<char, GroupValue>>),
    /// `0` for members of the set, `1` for any other precomposed Hangul syllable.
    Hangul(Arc<CharacterSet>),
    /// The index of the first block containing the character, or the number of blocks.
    Blocks(Arc<[RangeInclusive<u32>]>),
    /// `0` for every character.
    All,
}
impl Classifier {
    pub fn classify(&self, ch: char) -> Option<GroupValue> {
        match self {
            Classifier::Table(table) => table.get(&ch).copied(),
            Classifier::Hangul(primary) => {
                if primary.contains(ch) {
                    Some(0)
                } else if HANGUL_SYLLABLES.contains(&ch) {
                    Some(1)
                } else {
                    None
                }
            }
            Classifier::Blocks(blocks) => {
                let cp = ch as u32;
                let idx = blocks
                    .iter()
                    .position(|x| x.contains(&cp))
                    .unwrap_or(blocks.len());
                Some(idx as GroupValue)
            }
            Classifier::All => Some(0),
        }
    }
}
impl Debug for Classifier {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Classifier::Table(table) => write!(f, "[table of {} characters]", table.len()),
            Classifier::Hangul(set) => write!(f, "[hangul, primary {set:?}]"),
            Classifier::Blocks(blocks) => write!(f, "[{} unicode blocks]", blocks.len()),
            Classifier::All => f.write_str("[all]"),
        }
    }
}

/// Builds classifiers from the reference tables in an assets directory.
#[derive(Clone, Debug)]
pub struct ClassifierRegistry {
    assets_dir: PathBuf,
}
impl ClassifierRegistry {
    pub fn new(assets_dir: impl Into<PathBuf>) -> Self {
        ClassifierRegistry { assets_dir: assets_dir.into() }
    }

    pub fn assets_dir(&self) -> &Path {
        &self.assets_dir
    }

    fn asset(&self, name: &str) -> PathBuf {
        self.assets_dir.join(name)
    }

    /// Builds the classifier for a group name.
    pub async fn load(&self, name: GroupName) -> Result<Classifier> {
        debug!("Loading classifier: {name}");
        let classifier = match name {
            GroupName::IdeographFrequency => {
                unihan::load_frequency(&self.asset("unihan/kFrequency.json")).await?
            }
            GroupName::IdeographStrokes => {
                unihan::load_strokes(&self.asset("unihan/kTotalStrokes.json")).await?
            }
            GroupName::IdeographJouyou => {
                unihan::load_jouyou(&self.asset("unihan/kJoyoKanji.json")).await?
            }
            GroupName::Hangul2350 => hangul::load(&[self.asset("ksx1001.txt")]).await?,
            GroupName::Hangul2574 => {
                hangul::load(&[self.asset("ksx1001.txt"), self.asset("hangul-additional-224.txt")])
                    .await?
            }
            GroupName::UnicodeBlocks => blocks::load(&self.asset("blocks.txt")).await?,
            GroupName::All => Classifier::All,
        };
        debug!("Loaded classifier {name}: {classifier:?}");
        Ok(classifier)
    }

    /// Builds the classifiers for a list of group names, in order.
    ///
    /// Any table failing to load fails the whole list.
    pub async fn load_all(&self, names: &[GroupName]) -> Result<Vec<Classifier>> {
        let mut classifiers = Vec::new();
        for name in names {
            let classifier = self
                .load(*name)
                .await
                .with_context(|| format!("Could not build classifier '{name}'"))?;
            classifiers.push(classifier);
        }
        Ok(classifiers)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_group_names() {
        assert_eq!("hangul-2574".parse::<GroupName>().unwrap(), GroupName::Hangul2574);
        assert_eq!("all".parse::<GroupName>().unwrap(), GroupName::All);
        assert!("hangul".parse::<GroupName>().is_err());
        for name in GroupName::ALL {
            assert_eq!(name.as_str().parse::<GroupName>().unwrap(), *name);
        }
    }

    #[test]
    fn hangul_two_tiers() {
        let classifier = Classifier::Hangul(Arc::new(CharacterSet::from_text("가각")));
        assert_eq!(classifier.classify('가'), Some(0));
        assert_eq!(classifier.classify('힣'), Some(1));
        assert_eq!(classifier.classify('\u{AC00}'), Some(0));
        assert_eq!(classifier.classify('ㄱ'), None);
        assert_eq!(classifier.classify('A'), None);
    }

    #[test]
    fn blocks_never_unmatched() {
        let blocks: Arc<[RangeInclusive<u32>]> = vec![0x00..=0x7F, 0x80..=0xFF].into();
        let classifier = Classifier::Blocks(blocks);
        assert_eq!(classifier.classify('A'), Some(0));
        assert_eq!(classifier.classify('é'), Some(1));
        assert_eq!(classifier.classify('가'), Some(2));
    }

    #[test]
    fn blocks_first_match_wins() {
        let blocks: Arc<[RangeInclusive<u32>]> = vec![0x40..=0x4F, 0x00..=0x7F].into();
        let classifier = Classifier::Blocks(blocks);
        assert_eq!(classifier.classify('A'), Some(0));
        assert_eq!(classifier.classify('a'), Some(1));
    }

    #[tokio::test]
    async fn all_needs_no_assets() {
        let registry = ClassifierRegistry::new("/nonexistent");
        let classifiers = registry.load_all(&[GroupName::All]).await.unwrap();
        assert_eq!(classifiers[0].classify('\u{1F600}'), Some(0));
    }

    #[tokio::test]
    async fn missing_table_aborts_list() {
        let registry = ClassifierRegistry::new("/nonexistent");
        let err = registry
            .load_all(&[GroupName::All, GroupName::IdeographFrequency])
            .await
            .unwrap_err();
        assert!(format!("{err:#}").contains("ideograph-frequency"));
    }
}
