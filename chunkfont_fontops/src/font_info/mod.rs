use anyhow::*;
use chunkfont_common::paths::path_to_string;
use hb_subset::{Blob, FontFace, SubsetInput};
use std::{
    fmt::{Debug, Display, Formatter},
    path::{Path, PathBuf},
    sync::Arc,
};
use tracing::debug;

/// The view of a font that the chunking pipeline needs.
pub trait FontSource {
    /// The family name written into `font-family`.
    fn family_name(&self) -> &str;

    /// The file name the font was loaded from, including its extension.
    fn file_name(&self) -> &str;

    /// Every character the font can render, in ascending code point order.
    fn characters(&self) -> &[char];
}

#[derive(Clone)]
pub struct FontFaceWrapper(Arc<FontFaceData>);
struct FontFaceData {
    font_family: String,
    font_style: String,
    font_version: String,
    characters: Arc<[char]>,
    font_data: Arc<[u8]>,
    font_index: u32,
    file_name: String,
    source_path: PathBuf,
}
impl FontFaceWrapper {
    /// Loads every font contained in a font file.
    pub fn load_path(path: &Path) -> Result<Vec<FontFaceWrapper>> {
        let data = std::fs::read(path)
            .with_context(|| format!("Could not read font '{}'", path_to_string(path)))?;
        Self::load(path, data)
            .with_context(|| format!("Could not load font '{}'", path_to_string(path)))
    }

    /// Loads every font present in a given binary font data.
    pub fn load(source_path: &Path, buffer: impl Into<Arc<[u8]>>) -> Result<Vec<FontFaceWrapper>> {
        let buffer: Arc<[u8]> = buffer.into();

        let is_woff = buffer.len() >= 4 && &buffer[0..4] == b"wOFF";
        let is_woff2 = buffer.len() >= 4 && &buffer[0..4] == b"wOF2";
        let is_collection = buffer.len() >= 4 && &buffer[0..4] == b"ttcf";

        if is_woff || is_woff2 {
            bail!("woff/woff2 input is not supported. Please convert to .ttf or .otf first.");
        }

        let mut fonts = Vec::new();
        if let Some(font) = Self::load_for_font(source_path, buffer.clone(), 0)? {
            fonts.push(font);
        } else {
            bail!("No glyphs in first font?");
        }

        if is_collection {
            let mut i = 1;
            while let Some(x) = Self::load_for_font(source_path, buffer.clone(), i)? {
                fonts.push(x);
                i += 1;
            }
        }

        debug!("Found {} fonts in collection.", fonts.len());

        Ok(fonts)
    }
    fn load_for_font(
        source_path: &Path,
        font_data: Arc<[u8]>,
        idx: u32,
    ) -> Result<Option<FontFaceWrapper>> {
        let blob = Blob::from_bytes(&font_data)?;
        let font_face = FontFace::new_with_index(blob, idx)?;
        if font_face.glyph_count() == 0 {
            return Ok(None);
        }

        let font_family = font_face.font_family();
        let font_style = font_face.font_subfamily();
        let font_version = font_face
            .version_string()
            .split(';')
            .next()
            .unwrap_or_default()
            .trim()
            .to_string();

        let mut characters = Vec::new();
        for ch in &font_face.covered_codepoints()? {
            characters.push(ch);
        }
        characters.sort_unstable();
        characters.dedup();

        let file_name = match source_path.file_name() {
            Some(name) => name.to_string_lossy().to_string(),
            None => bail!("'{}' is not a file path", path_to_string(source_path)),
        };

        debug!(
            "Loaded font: {font_family} / {font_style} / {font_version} / {} codepoints",
            characters.len(),
        );

        drop(font_face);

        Ok(Some(FontFaceWrapper(Arc::new(FontFaceData {
            font_family,
            font_style,
            font_version,
            characters: characters.into(),
            font_data,
            font_index: idx,
            file_name,
            source_path: source_path.to_path_buf(),
        }))))
    }

    pub fn font_family(&self) -> &str {
        &self.0.font_family
    }
    pub fn font_style(&self) -> &str {
        &self.0.font_style
    }
    pub fn font_version(&self) -> &str {
        &self.0.font_version
    }
    pub fn font_index(&self) -> u32 {
        self.0.font_index
    }
    pub fn source_path(&self) -> &Path {
        &self.0.source_path
    }

    /// Subsets the font to the given characters, returning the raw sfnt data.
    pub fn subset(&self, chars: &[char]) -> Result<Vec<u8>> {
        // Load the font into harfbuzz
        let blob = Blob::from_bytes(&self.0.font_data)?;
        let font = FontFace::new_with_index(blob, self.0.font_index)?;

        // Prepare the subsetting plan
        let mut subset_input = SubsetInput::new()?;
        subset_input.unicode_set().clear();
        for ch in chars {
            subset_input.unicode_set().insert(*ch);
        }

        // Subset the font
        let new_font = subset_input.subset_font(&font)?;
        let new_font = new_font.underlying_blob().to_vec();
        Ok(new_font)
    }
}
impl FontSource for FontFaceWrapper {
    fn family_name(&self) -> &str {
        &self.0.font_family
    }
    fn file_name(&self) -> &str {
        &self.0.file_name
    }
    fn characters(&self) -> &[char] {
        &self.0.characters
    }
}
impl Debug for FontFaceWrapper {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "[font: {} / {} / {} / {}]",
            self.font_family(),
            self.font_style(),
            self.font_version(),
            self.0.file_name,
        )
    }
}
impl Display for FontFaceWrapper {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} {}", self.font_family(), self.font_style())
    }
}
