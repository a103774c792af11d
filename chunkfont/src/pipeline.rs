use crate::{
    assemble::assemble,
    chunk_plan::{plan, Chunk, OverflowPolicy},
    config::ChunkConfig,
    groups::{Classifier, ClassifierRegistry},
    ranges::compact,
    render::{FontFaceRule, Stylesheet},
};
use anyhow::*;
use chunkfont_common::{
    hashing::WyHashMap,
    paths::{file_basename, path_to_string},
};
use chunkfont_fontops::{
    font_info::FontSource,
    subsetter::{SubsetBackend, SubsetTarget},
};
use std::path::{Path, PathBuf};
use tracing::{info, info_span, warn};
use tracing_futures::Instrument;

/// The name of the stylesheet written to the output directory.
pub const STYLESHEET_NAME: &str = "stylesheet.css";

/// What happened to a single font.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct FontReport {
    pub font_family: String,
    pub file_name: String,
    pub characters: usize,
    pub buckets: usize,
    pub chunks: usize,
    /// Characters matched by no classifier, and left out of every chunk.
    pub dropped: usize,
}

/// The planned chunks of one font.
#[derive(Clone, Debug)]
pub struct FontPlan {
    pub chunks: Vec<Chunk>,
    pub buckets: usize,
    pub dropped: usize,
}

/// The state carried across every font in a run.
#[derive(Debug, Default)]
pub struct RunContext {
    stylesheet: Stylesheet,
    next_index: WyHashMap<String, usize>,
    reports: Vec<FontReport>,
}
impl RunContext {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn stylesheet(&self) -> &Stylesheet {
        &self.stylesheet
    }

    pub fn reports(&self) -> &[FontReport] {
        &self.reports
    }

    /// Returns the next output index for a font file, counting from zero.
    fn take_index(&mut self, file_name: &str) -> usize {
        let index = self.next_index.entry(file_name.to_string()).or_insert(0);
        let current = *index;
        *index += 1;
        current
    }
}

/// Settings shared by every font in a run.
pub struct FontChunker<'a, B: SubsetBackend> {
    config: &'a ChunkConfig,
    classifiers: Vec<Classifier>,
    backend: &'a B,
    out_dir: PathBuf,
}
impl<'a, B: SubsetBackend> FontChunker<'a, B> {
    /// Loads the configured classifiers and checks that the backend can produce every format.
    pub async fn new(config: &'a ChunkConfig, backend: &'a B, out_dir: &Path) -> Result<Self> {
        for format in &config.formats {
            ensure!(
                backend.supports(*format),
                "The {} backend cannot write {format} files.",
                backend.name(),
            );
        }
        let classifiers = ClassifierRegistry::new(&config.assets_dir)
            .load_all(&config.group_by)
            .await?;
        Ok(FontChunker { config, classifiers, backend, out_dir: out_dir.to_path_buf() })
    }

    /// Builds a chunker from already loaded classifiers.
    pub fn with_classifiers(
        config: &'a ChunkConfig,
        classifiers: Vec<Classifier>,
        backend: &'a B,
        out_dir: &Path,
    ) -> Self {
        FontChunker { config, classifiers, backend, out_dir: out_dir.to_path_buf() }
    }

    /// Plans the chunks of a font without subsetting anything.
    pub fn plan_font(&self, font: &B::Font) -> FontPlan {
        let assembled = assemble(font.characters(), &self.classifiers);
        let policy = OverflowPolicy::from_chunk_over_groups(self.config.chunk_over_groups);
        FontPlan {
            chunks: plan(&assembled.buckets, self.config.chunk_size, policy),
            buckets: assembled.buckets.len(),
            dropped: assembled.unmatched.len(),
        }
    }

    async fn emit_chunk(&self, ctx: &mut RunContext, font: &B::Font, chunk: &Chunk) -> Result<()> {
        if chunk.chars.is_empty() {
            return Ok(());
        }

        let basename = file_basename(Path::new(font.file_name()))?;
        let index = ctx.take_index(font.file_name());
        let target = SubsetTarget::new(&self.out_dir, format!("{basename}_{index}"), &self.config.formats);

        if let Err(e) = self.backend.subset(font, &chunk.chars, &target).await {
            target.remove_artifacts()?;
            return Err(e.context(format!("Could not subset chunk '{}'", target.stem())));
        }

        let weight = self.config.weight_by_file_name.lookup(font.file_name());
        ctx.stylesheet.push(FontFaceRule::new(
            font.family_name(),
            weight,
            &self.config.store_uri,
            &target,
            compact(&chunk.chars),
        ));
        info!("Emit {} [{index}] ({} characters)", font.family_name(), chunk.chars.len());
        Ok(())
    }

    /// Splits one font, emitting every chunk in order.
    pub async fn process_font(&self, ctx: &mut RunContext, font: &B::Font) -> Result<()> {
        let FontPlan { chunks, buckets, dropped } = self.plan_font(font);
        if dropped != 0 {
            warn!(
                "{dropped} characters in {} matched no group and were left out.",
                font.file_name(),
            );
        }

        for chunk in &chunks {
            self.emit_chunk(ctx, font, chunk).await?;
        }

        info!("Transformed {} into {} chunks.", font.family_name(), chunks.len());
        ctx.reports.push(FontReport {
            font_family: font.family_name().to_string(),
            file_name: font.file_name().to_string(),
            characters: font.characters().len(),
            buckets,
            chunks: chunks.len(),
            dropped,
        });
        Ok(())
    }

    /// Splits every font in turn, then writes the stylesheet.
    pub async fn process_fonts(&self, fonts: &[B::Font]) -> Result<RunContext> {
        std::fs::create_dir_all(&self.out_dir).with_context(|| {
            format!("Could not create output directory '{}'", path_to_string(&self.out_dir))
        })?;

        let mut ctx = RunContext::new();
        for font in fonts {
            let span = info_span!("font", file = font.file_name());
            self.process_font(&mut ctx, font).instrument(span).await?;
        }

        ctx.stylesheet.write_to(&self.out_dir.join(STYLESHEET_NAME))?;
        Ok(ctx)
    }
}
