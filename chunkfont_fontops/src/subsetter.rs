use crate::{
    encode::OutputFormat,
    font_info::{FontFaceWrapper, FontSource},
};
use anyhow::*;
use chunkfont_common::paths::{path_to_string, with_extension};
use std::{
    fs, io,
    path::{Path, PathBuf},
    process::Stdio,
};
use tokio::{process::Command, task};
use tracing::{debug, Span};

/// Where the artifacts of one chunk are written: `{dir}/{stem}.{ext}` for each format.
#[derive(Clone, Debug)]
pub struct SubsetTarget {
    dir: PathBuf,
    stem: String,
    formats: Vec<OutputFormat>,
}
impl SubsetTarget {
    pub fn new(dir: &Path, stem: impl Into<String>, formats: &[OutputFormat]) -> Self {
        SubsetTarget { dir: dir.to_path_buf(), stem: stem.into(), formats: formats.to_vec() }
    }

    pub fn stem(&self) -> &str {
        &self.stem
    }

    pub fn formats(&self) -> &[OutputFormat] {
        &self.formats
    }

    /// The file name of this target's artifact in a given format.
    pub fn file_name(&self, format: OutputFormat) -> String {
        format!("{}.{}", self.stem, format.extension())
    }

    pub fn path(&self, format: OutputFormat) -> PathBuf {
        with_extension(&self.dir, &self.stem, format.extension())
    }

    /// Removes any artifacts of this target that exist on disk.
    pub fn remove_artifacts(&self) -> Result<()> {
        for format in &self.formats {
            let path = self.path(*format);
            match fs::remove_file(&path) {
                Result::Ok(()) => debug!("Removed partial output {}", path_to_string(&path)),
                Err(e) if e.kind() == io::ErrorKind::NotFound => {}
                Err(e) => {
                    return Err(e)
                        .with_context(|| format!("Could not remove {}", path_to_string(&path)))
                }
            }
        }
        Ok(())
    }
}

/// Something that can turn a list of characters into subset font files.
pub trait SubsetBackend {
    type Font: FontSource;

    /// A short name for log messages.
    fn name(&self) -> &'static str;

    /// Whether this backend can write a given format.
    fn supports(&self, format: OutputFormat) -> bool;

    /// Writes one artifact per format in `target`, containing exactly `chars` from `font`.
    async fn subset(&self, font: &Self::Font, chars: &[char], target: &SubsetTarget) -> Result<()>;
}

/// Subsets fonts in-process with HarfBuzz.
#[derive(Copy, Clone, Debug, Default)]
pub struct HarfbuzzBackend;
impl SubsetBackend for HarfbuzzBackend {
    type Font = FontFaceWrapper;

    fn name(&self) -> &'static str {
        "harfbuzz"
    }

    fn supports(&self, _: OutputFormat) -> bool {
        true
    }

    async fn subset(&self, font: &FontFaceWrapper, chars: &[char], target: &SubsetTarget) -> Result<()> {
        let font = font.clone();
        let chars = chars.to_vec();
        let target = target.clone();
        let span = Span::current();
        task::spawn_blocking(move || {
            let _enter = span.enter();
            debug!("Encoding subset '{}' with {} codepoints.", target.stem(), chars.len());
            let sfnt = font.subset(&chars)?;
            for format in target.formats() {
                let data = format.encode(&sfnt)?;
                let path = target.path(*format);
                debug!("Writing {}...", path_to_string(&path));
                fs::write(&path, data)?;
            }
            Ok(())
        })
        .await?
    }
}

/// Subsets fonts by invoking fonttools' `pyftsubset`.
#[derive(Clone, Debug)]
pub struct PyftsubsetBackend {
    program: PathBuf,
}
impl PyftsubsetBackend {
    /// Checks that `pyftsubset` can be run.
    pub async fn probe() -> Result<Self> {
        Self::probe_program("pyftsubset").await
    }

    pub async fn probe_program(program: impl Into<PathBuf>) -> Result<Self> {
        let program = program.into();
        let status = Command::new(&program)
            .arg("--help")
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .status()
            .await;
        match status {
            Result::Ok(status) if status.success() => Ok(PyftsubsetBackend { program }),
            _ => bail!(
                "Subsetting tool '{}' not available. How to install: \
                 `pip install fonttools brotli zopfli`",
                path_to_string(&program),
            ),
        }
    }

    async fn run(&self, font: &FontFaceWrapper, text_file: &Path, format: OutputFormat, out: &Path) -> Result<()> {
        let mut command = Command::new(&self.program);
        command
            .arg(font.source_path())
            .arg(format!("--font-number={}", font.font_index()))
            .arg(format!("--text-file={}", path_to_string(text_file)))
            .arg("--layout-features=*")
            .arg("--symbol-cmap")
            .arg("--drop-tables=")
            .arg("--recommended-glyphs");
        match format {
            OutputFormat::Woff2 => command.arg("--flavor=woff2"),
            OutputFormat::Woff => command.arg("--flavor=woff").arg("--with-zopfli"),
            OutputFormat::Ttf => &mut command,
        };
        command.arg(format!("--output-file={}", path_to_string(out)));

        let output = command.stdin(Stdio::null()).output().await?;
        if !output.status.success() {
            bail!(
                "pyftsubset failed writing {} ({}): {}",
                path_to_string(out),
                output.status,
                String::from_utf8_lossy(&output.stderr).trim(),
            );
        }
        Ok(())
    }
}
impl SubsetBackend for PyftsubsetBackend {
    type Font = FontFaceWrapper;

    fn name(&self) -> &'static str {
        "pyftsubset"
    }

    fn supports(&self, _: OutputFormat) -> bool {
        true
    }

    async fn subset(&self, font: &FontFaceWrapper, chars: &[char], target: &SubsetTarget) -> Result<()> {
        let text_file = with_extension(&target.dir, &format!("{}_glyphs", target.stem), "txt");
        tokio::fs::write(&text_file, chars.iter().collect::<String>()).await?;

        let mut result = Ok(());
        for format in target.formats() {
            result = self.run(font, &text_file, *format, &target.path(*format)).await;
            if result.is_err() {
                break;
            }
        }

        tokio::fs::remove_file(&text_file).await?;
        result
    }
}
