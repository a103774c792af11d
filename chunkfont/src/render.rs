use crate::ranges::UnicodeRange;
use anyhow::*;
use chunkfont_common::paths::path_to_string;
use chunkfont_fontops::{encode::OutputFormat, subsetter::SubsetTarget};
use std::{
    fmt::{Display, Formatter},
    ops::RangeInclusive,
    path::Path,
};
use tracing::debug;

/// One `@font-face` rule, covering a single chunk.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct FontFaceRule {
    font_family: String,
    font_weight: Option<u32>,
    sources: Vec<(String, OutputFormat)>,
    ranges: Vec<RangeInclusive<u32>>,
}
impl FontFaceRule {
    pub fn new(
        font_family: &str,
        font_weight: Option<u32>,
        store_uri: &str,
        target: &SubsetTarget,
        ranges: Vec<RangeInclusive<u32>>,
    ) -> Self {
        let sources = target
            .formats()
            .iter()
            .map(|x| (format!("{store_uri}{}", target.file_name(*x)), *x))
            .collect();
        FontFaceRule { font_family: font_family.to_string(), font_weight, sources, ranges }
    }

    pub fn font_family(&self) -> &str {
        &self.font_family
    }

    pub fn font_weight(&self) -> Option<u32> {
        self.font_weight
    }

    /// Returns the code point ranges this rule covers.
    pub fn unicode_ranges(&self) -> &[RangeInclusive<u32>] {
        &self.ranges
    }
}
impl Display for FontFaceRule {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "@font-face {{")?;
        writeln!(f, "\tfont-family: {:?};", self.font_family)?;
        for (i, (url, format)) in self.sources.iter().enumerate() {
            let lead = if i == 0 { "\tsrc: " } else { "\t\t" };
            let tail = if i + 1 == self.sources.len() { ";" } else { "," };
            writeln!(f, "{lead}url('{url}') format('{}'){tail}", format.css_format())?;
        }
        if let Some(weight) = self.font_weight {
            writeln!(f, "\tfont-weight: {weight};")?;
        }
        writeln!(f, "\tunicode-range: {};", UnicodeRange(&self.ranges))?;
        write!(f, "}}")
    }
}

/// The rules of every emitted chunk, in emission order.
#[derive(Clone, Debug, Default)]
pub struct Stylesheet {
    rules: Vec<FontFaceRule>,
}
impl Stylesheet {
    pub fn push(&mut self, rule: FontFaceRule) {
        self.rules.push(rule);
    }

    pub fn rules(&self) -> &[FontFaceRule] {
        &self.rules
    }

    /// Writes the stylesheet to a file.
    pub fn write_to(&self, path: &Path) -> Result<()> {
        debug!("Writing {}...", path_to_string(path));
        std::fs::write(path, self.to_string())
            .with_context(|| format!("Could not write stylesheet '{}'", path_to_string(path)))
    }
}
impl Display for Stylesheet {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        for (i, rule) in self.rules.iter().enumerate() {
            if i != 0 {
                f.write_str("\n\n")?;
            }
            write!(f, "{rule}")?;
        }
        Result::Ok(())
    }
}
