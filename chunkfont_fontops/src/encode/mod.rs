use anyhow::*;
use serde::Deserialize;
use std::{
    fmt::{Display, Formatter},
    str::FromStr,
};

mod sfnt;
mod woff;
mod woff2;

/// A file format that subsets are written in.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    Woff2,
    Woff,
    Ttf,
}
impl OutputFormat {
    pub const ALL: &'static [OutputFormat] =
        &[OutputFormat::Woff2, OutputFormat::Woff, OutputFormat::Ttf];

    /// The file extension for this format.
    pub fn extension(&self) -> &'static str {
        match self {
            OutputFormat::Woff2 => "woff2",
            OutputFormat::Woff => "woff",
            OutputFormat::Ttf => "ttf",
        }
    }

    /// The name of this format in a `format()` hint.
    pub fn css_format(&self) -> &'static str {
        match self {
            OutputFormat::Woff2 => "woff2",
            OutputFormat::Woff => "woff",
            OutputFormat::Ttf => "truetype",
        }
    }

    /// Encodes raw sfnt data into this format.
    pub fn encode(&self, sfnt: &[u8]) -> Result<Vec<u8>> {
        match self {
            OutputFormat::Woff2 => woff2::compress(sfnt),
            OutputFormat::Woff => woff::compress(sfnt),
            OutputFormat::Ttf => Ok(sfnt.to_vec()),
        }
    }
}
impl FromStr for OutputFormat {
    type Err = Error;
    fn from_str(s: &str) -> Result<Self> {
        match s {
            x if x.eq_ignore_ascii_case("woff2") => Ok(OutputFormat::Woff2),
            x if x.eq_ignore_ascii_case("woff") => Ok(OutputFormat::Woff),
            x if x.eq_ignore_ascii_case("ttf") || x.eq_ignore_ascii_case("truetype") => {
                Ok(OutputFormat::Ttf)
            }
            _ => bail!("Unknown output format: {s:?}"),
        }
    }
}
impl Display for OutputFormat {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.extension())
    }
}
