use anyhow::{bail, Result};
use chunkfont::{
    groups::{Classifier, GroupName},
    pipeline::STYLESHEET_NAME,
    ChunkConfig, FontChunker, FontSource, OutputFormat, SubsetBackend, SubsetTarget,
};
use std::{cell::RefCell, path::Path, sync::Arc};

struct StubFont {
    family: String,
    file_name: String,
    chars: Vec<char>,
}
impl StubFont {
    fn new(family: &str, file_name: &str, chars: impl IntoIterator<Item = char>) -> Self {
        StubFont {
            family: family.to_string(),
            file_name: file_name.to_string(),
            chars: chars.into_iter().collect(),
        }
    }
}
impl FontSource for StubFont {
    fn family_name(&self) -> &str {
        &self.family
    }
    fn file_name(&self) -> &str {
        &self.file_name
    }
    fn characters(&self) -> &[char] {
        &self.chars
    }
}

/// Writes the subset characters into every artifact, and records each call.
#[derive(Default)]
struct StubBackend {
    calls: RefCell<Vec<(String, Vec<char>)>>,
    fail_on: Option<String>,
}
impl SubsetBackend for StubBackend {
    type Font = StubFont;

    fn name(&self) -> &'static str {
        "stub"
    }

    fn supports(&self, format: OutputFormat) -> bool {
        format != OutputFormat::Woff
    }

    async fn subset(&self, _: &StubFont, chars: &[char], target: &SubsetTarget) -> Result<()> {
        self.calls
            .borrow_mut()
            .push((target.stem().to_string(), chars.to_vec()));
        let text: String = chars.iter().collect();
        for (i, format) in target.formats().iter().enumerate() {
            if Some(target.stem()) == self.fail_on.as_deref() && i == 1 {
                bail!("stub failure");
            }
            std::fs::write(target.path(*format), &text)?;
        }
        Ok(())
    }
}

fn config(source: &str) -> ChunkConfig {
    ChunkConfig::from_toml(source).unwrap()
}

fn letters_first() -> Vec<Classifier> {
    let vowels = ['A', 'E', 'I', 'O', 'U'].into_iter().map(|x| (x, 0)).collect();
    vec![Classifier::Table(Arc::new(vowels)), Classifier::All]
}

async fn run(config: &ChunkConfig, backend: &StubBackend, fonts: &[StubFont], out: &Path) -> Result<String> {
    let chunker = FontChunker::with_classifiers(config, letters_first(), backend, out);
    chunker.process_fonts(fonts).await?;
    Ok(std::fs::read_to_string(out.join(STYLESHEET_NAME))?)
}

const BASIC: &str = r#"
chunk_size = 3
chunk_over_groups = false
group_by = ["all"]
formats = ["woff2", "ttf"]
store_uri = "/static/"

[weight_by_file_name]
bold = 700
"#;

#[tokio::test]
async fn splits_and_renders() {
    let dir = tempfile::tempdir().unwrap();
    let config = config(BASIC);
    let backend = StubBackend::default();
    let fonts = [StubFont::new("Stub Sans", "StubSans-Bold.ttf", 'A'..='G')];

    let css = run(&config, &backend, &fonts, dir.path()).await.unwrap();

    // vowels A, E are bucket (0, 0); B C D F G are bucket (1, 0)
    let calls = backend.calls.borrow();
    let stems: Vec<_> = calls.iter().map(|x| x.0.as_str()).collect();
    assert_eq!(stems, ["StubSans-Bold_0", "StubSans-Bold_1", "StubSans-Bold_2"]);
    assert_eq!(calls[0].1, ['A', 'E']);
    assert_eq!(calls[1].1, ['B', 'C', 'D']);
    assert_eq!(calls[2].1, ['F', 'G']);

    assert_eq!(
        std::fs::read_to_string(dir.path().join("StubSans-Bold_1.woff2")).unwrap(),
        "BCD"
    );
    assert!(dir.path().join("StubSans-Bold_2.ttf").exists());

    assert_eq!(
        css,
        "@font-face {\n\
         \tfont-family: \"Stub Sans\";\n\
         \tsrc: url('/static/StubSans-Bold_0.woff2') format('woff2'),\n\
         \t\turl('/static/StubSans-Bold_0.ttf') format('truetype');\n\
         \tfont-weight: 700;\n\
         \tunicode-range: U+41, U+45;\n\
         }\n\
         \n\
         @font-face {\n\
         \tfont-family: \"Stub Sans\";\n\
         \tsrc: url('/static/StubSans-Bold_1.woff2') format('woff2'),\n\
         \t\turl('/static/StubSans-Bold_1.ttf') format('truetype');\n\
         \tfont-weight: 700;\n\
         \tunicode-range: U+42-44;\n\
         }\n\
         \n\
         @font-face {\n\
         \tfont-family: \"Stub Sans\";\n\
         \tsrc: url('/static/StubSans-Bold_2.woff2') format('woff2'),\n\
         \t\turl('/static/StubSans-Bold_2.ttf') format('truetype');\n\
         \tfont-weight: 700;\n\
         \tunicode-range: U+46-47;\n\
         }"
    );
}

#[tokio::test]
async fn pooled_leftovers_and_per_file_indexes() {
    let dir = tempfile::tempdir().unwrap();
    let config = config(&BASIC.replace("chunk_over_groups = false", "chunk_over_groups = true"));
    let backend = StubBackend::default();
    let fonts = [
        StubFont::new("One", "One.ttf", 'A'..='G'),
        StubFont::new("Two", "Two.otf", ['E', 'X']),
    ];

    let css = run(&config, &backend, &fonts, dir.path()).await.unwrap();

    let calls = backend.calls.borrow();
    let plan: Vec<_> = calls.iter().map(|(stem, chars)| (stem.as_str(), chars.len())).collect();
    // One: [A E] and [F G] are short, pooled into [A E F] [G] after the full [B C D]
    assert_eq!(plan, [("One_0", 3), ("One_1", 3), ("One_2", 1), ("Two_0", 2)]);
    assert_eq!(calls[3].1, ['E', 'X']);
    assert_eq!(calls[1].1, ['A', 'E', 'F']);
    assert_eq!(calls[2].1, ['G']);
    assert!(css.contains("U+41, U+45-46"));
    assert!(!css.contains("font-weight"));
    assert_eq!(css.matches("@font-face").count(), 4);
}

#[tokio::test]
async fn runs_are_reproducible() {
    let config = config(&BASIC.replace("chunk_over_groups = false", "chunk_over_groups = true"));
    let chars: Vec<char> = ('\u{20}'..='\u{7E}').chain('\u{AC00}'..='\u{AC40}').collect();

    let mut outputs = Vec::new();
    for _ in 0..2 {
        let dir = tempfile::tempdir().unwrap();
        let backend = StubBackend::default();
        let fonts = [StubFont::new("Stub", "Stub.ttf", chars.clone())];
        let css = run(&config, &backend, &fonts, dir.path()).await.unwrap();
        let calls = backend.calls.borrow().clone();
        outputs.push((css, calls));
    }
    assert_eq!(outputs[0], outputs[1]);
}

#[tokio::test]
async fn chunk_failure_cleans_up_and_aborts() {
    let dir = tempfile::tempdir().unwrap();
    let config = config(BASIC);
    let backend = StubBackend { fail_on: Some("Stub_1".to_string()), ..Default::default() };
    let fonts = [StubFont::new("Stub", "Stub.ttf", 'A'..='G')];

    let err = run(&config, &backend, &fonts, dir.path()).await.unwrap_err();
    assert!(format!("{err:#}").contains("Stub_1"));

    // the failed chunk leaves nothing behind, and no later chunk is attempted
    assert!(dir.path().join("Stub_0.woff2").exists());
    assert!(!dir.path().join("Stub_1.woff2").exists());
    assert!(!dir.path().join("Stub_1.ttf").exists());
    assert_eq!(backend.calls.borrow().len(), 2);
    assert!(!dir.path().join(STYLESHEET_NAME).exists());
}

#[tokio::test]
async fn unmatched_characters_are_reported() {
    let dir = tempfile::tempdir().unwrap();
    let config = config(BASIC);
    let backend = StubBackend::default();
    let only_a = vec![Classifier::Table(Arc::new([('A', 0)].into_iter().collect()))];
    let fonts = [StubFont::new("Stub", "Stub.ttf", 'A'..='C')];

    let chunker = FontChunker::with_classifiers(&config, only_a, &backend, dir.path());
    let ctx = chunker.process_fonts(&fonts).await.unwrap();

    let report = &ctx.reports()[0];
    assert_eq!((report.characters, report.chunks, report.dropped), (3, 1, 2));
    assert_eq!(ctx.stylesheet().rules()[0].unicode_ranges(), [0x41..=0x41]);
}

#[tokio::test]
async fn unsupported_formats_fail_setup() {
    let dir = tempfile::tempdir().unwrap();
    let config = config(&BASIC.replace(r#"formats = ["woff2", "ttf"]"#, r#"formats = ["woff"]"#));
    assert_eq!(config.group_by, [GroupName::All]);

    let backend = StubBackend::default();
    let result = FontChunker::new(&config, &backend, dir.path()).await;
    assert!(result.is_err());
}
