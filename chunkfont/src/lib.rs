pub mod assemble;
pub mod chunk_plan;
pub mod config;
pub mod groups;
pub mod pipeline;
pub mod ranges;
pub mod render;

use anyhow::*;
use chunkfont_common::paths::path_to_string;
use std::path::{Path, PathBuf};
use tracing::info;

pub use chunkfont_fontops::{
    encode::OutputFormat,
    font_info::{FontFaceWrapper, FontSource},
    subsetter::{HarfbuzzBackend, PyftsubsetBackend, SubsetBackend, SubsetTarget},
};
pub use config::ChunkConfig;
pub use pipeline::{FontChunker, FontReport, RunContext};

const FONT_EXTENSIONS: &[&str] = &["ttf", "otf", "ttc", "otc"];

fn is_font_file(path: &Path) -> bool {
    path.is_file()
        && path.extension().is_some_and(|ext| {
            FONT_EXTENSIONS
                .iter()
                .any(|x| ext.eq_ignore_ascii_case(x))
        })
}

/// Expands a list of paths into font files. Directories are searched (non-recursively) for font
/// files, which are returned sorted by name.
pub fn find_font_files(paths: &[PathBuf]) -> Result<Vec<PathBuf>> {
    let mut files = Vec::new();
    for path in paths {
        if path.is_dir() {
            let mut found = Vec::new();
            for entry in std::fs::read_dir(path)
                .with_context(|| format!("Could not list '{}'", path_to_string(path)))?
            {
                let entry = entry?.path();
                if is_font_file(&entry) {
                    found.push(entry);
                }
            }
            found.sort();
            files.extend(found);
        } else if path.is_file() {
            files.push(path.clone());
        } else {
            bail!("'{}' does not exist.", path_to_string(path));
        }
    }
    Ok(files)
}

/// Loads every font in the given files. Any file failing to load fails the whole list.
pub fn load_fonts(paths: &[PathBuf]) -> Result<Vec<FontFaceWrapper>> {
    let mut fonts = Vec::new();
    for path in paths {
        for font in FontFaceWrapper::load_path(path)? {
            info!("Imported {font} from {}", path_to_string(path));
            fonts.push(font);
        }
    }
    Ok(fonts)
}

/// Splits fonts into chunks, writing subsets and `stylesheet.css` to `out_dir`.
///
/// Fonts are processed one at a time, and each chunk is finished before the next one starts.
pub async fn split_fonts<B: SubsetBackend>(
    config: &ChunkConfig,
    backend: &B,
    fonts: &[B::Font],
    out_dir: &Path,
) -> Result<RunContext> {
    let chunker = FontChunker::new(config, backend, out_dir).await?;
    chunker.process_fonts(fonts).await
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn finds_fonts_in_directories() {
        let dir = tempfile::tempdir().unwrap();
        for name in ["b.ttf", "a.OTF", "notes.txt", "c.ttc"] {
            std::fs::write(dir.path().join(name), b"").unwrap();
        }
        std::fs::create_dir(dir.path().join("nested.ttf")).unwrap();

        let extra = dir.path().join("notes.txt");
        let files = find_font_files(&[dir.path().to_path_buf(), extra]).unwrap();
        let names: Vec<_> = files
            .iter()
            .map(|x| x.file_name().unwrap().to_string_lossy().to_string())
            .collect();
        assert_eq!(names, ["a.OTF", "b.ttf", "c.ttc", "notes.txt"]);

        assert!(find_font_files(&[dir.path().join("missing")]).is_err());
    }
}
