//! Batch ingestion and question answering over netlist chunks.
//!
//! The embedding model, vector index and language model are supplied by the
//! caller; the pipeline only decides what text goes where.

use std::{
    fs,
    path::{Path, PathBuf},
};

use crate::{chunk, document::{self, Document}, error::Error, parse_file, Format};

pub const DEFAULT_TOP_K: usize = 143;

pub const DEFAULT_QUESTION: &str = "You are a useful tool used by engineers to generate bring-up \
test plans. Use the provided files, which may include a netlist, BOM, hardware requirement \
document, and software requirement document. Additionally, reference the provided example \
bring-up test document for guidance. Use headings, bullet points, and numbered lists where \
appropriate. Include a title with what is being accomplished.";

/// Converts text to vectors
pub trait Embedder {
    type Error: std::error::Error + Send + Sync + 'static;

    /// One vector per input, in input order
    fn embed_batch(&self, texts: &[&str]) -> Result<Vec<Vec<f32>>, Self::Error>;
}

/// Stores snippet vectors and answers nearest-neighbour lookups
pub trait VectorIndex {
    type Error: std::error::Error + Send + Sync + 'static;

    fn insert(&mut self, text: String, vector: Vec<f32>) -> Result<(), Self::Error>;

    /// Texts of the `k` entries closest to `query`, closest first
    fn nearest(&self, query: &[f32], k: usize) -> Result<Vec<String>, Self::Error>;
}

/// Produces an answer from a question and retrieved context
pub trait Generator {
    type Error: std::error::Error + Send + Sync + 'static;

    fn generate(&self, question: &str, context: &[String]) -> Result<String, Self::Error>;
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PipelineConfig {
    /// Snippets retrieved per question
    pub top_k: usize,
    /// Question asked by [`Pipeline::generate_report`]
    pub question: String,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            top_k: DEFAULT_TOP_K,
            question: DEFAULT_QUESTION.to_owned(),
        }
    }
}

impl PipelineConfig {
    pub fn with_top_k(mut self, top_k: usize) -> Self {
        self.top_k = top_k;
        self
    }

    pub fn with_question(mut self, question: impl Into<String>) -> Self {
        self.question = question.into();
        self
    }
}

/// How a file's text was obtained
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourceKind {
    Netlist(Format),
    /// Word package; paragraph text only
    Docx,
    Text,
}

impl SourceKind {
    pub fn detect(path: &Path) -> Self {
        match Format::detect(path) {
            Format::Unknown => {
                let docx = path
                    .extension()
                    .and_then(|ext| ext.to_str())
                    .is_some_and(|ext| ext.eq_ignore_ascii_case("docx"));
                if docx {
                    Self::Docx
                } else {
                    Self::Text
                }
            }
            format => Self::Netlist(format),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FileStatus {
    Ok { snippets: usize },
    Failed(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileOutcome {
    pub file: PathBuf,
    pub kind: SourceKind,
    pub status: FileStatus,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IngestReport {
    pub files: Vec<FileOutcome>,
    pub snippet_count: usize,
}

pub struct Pipeline<E, V, G> {
    embedder: E,
    index: V,
    generator: G,
    config: PipelineConfig,
}

impl<E, V, G> Pipeline<E, V, G>
where
    E: Embedder,
    V: VectorIndex,
    G: Generator,
{
    pub fn new(embedder: E, index: V, generator: G) -> Self {
        Self {
            embedder,
            index,
            generator,
            config: PipelineConfig::default(),
        }
    }

    pub fn with_config(mut self, config: PipelineConfig) -> Self {
        self.config = config;
        self
    }

    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    pub fn index(&self) -> &V {
        &self.index
    }

    /// Turns every file into snippets and indexes them.
    ///
    /// A file that cannot be read is reported in its [`FileOutcome`] and does
    /// not stop the batch. Fails with [`Error::NoContent`] when no file
    /// produced any text.
    pub fn ingest<P: AsRef<Path>>(&mut self, paths: &[P]) -> Result<IngestReport, Error> {
        let mut snippets = Vec::new();
        let mut files = Vec::with_capacity(paths.len());

        for path in paths {
            let path = path.as_ref();
            let kind = SourceKind::detect(path);
            let status = match file_snippets(path, kind) {
                Ok(found) => {
                    tracing::info!(file = %path.display(), snippets = found.len(), "ingested file");
                    let status = FileStatus::Ok {
                        snippets: found.len(),
                    };
                    snippets.extend(found);
                    status
                }
                Err(err) => {
                    tracing::warn!(file = %path.display(), "skipping file: {err}");
                    FileStatus::Failed(err.to_string())
                }
            };
            files.push(FileOutcome {
                file: path.to_owned(),
                kind,
                status,
            });
        }

        if snippets.is_empty() {
            return Err(Error::NoContent);
        }

        let texts: Vec<&str> = snippets.iter().map(String::as_str).collect();
        let vectors = self
            .embedder
            .embed_batch(&texts)
            .map_err(Error::embedding)?;
        if vectors.len() != snippets.len() {
            return Err(Error::embedding(format!(
                "expected {} vectors, got {}",
                snippets.len(),
                vectors.len()
            )));
        }

        let snippet_count = snippets.len();
        for (text, vector) in snippets.into_iter().zip(vectors) {
            self.index
                .insert(text, vector)
                .map_err(Error::vector_index)?;
        }
        tracing::info!(files = files.len(), snippet_count, "indexed snippets");

        Ok(IngestReport {
            files,
            snippet_count,
        })
    }

    /// Retrieves the closest snippets for `question` and hands them to the generator
    pub fn answer(&self, question: &str) -> Result<String, Error> {
        let query = self
            .embedder
            .embed_batch(&[question])
            .map_err(Error::embedding)?
            .into_iter()
            .next()
            .ok_or_else(|| Error::embedding("no vector returned for question"))?;
        let context = self
            .index
            .nearest(&query, self.config.top_k)
            .map_err(Error::vector_index)?;
        tracing::debug!(retrieved = context.len(), "retrieved context");
        self.generator
            .generate(question, &context)
            .map_err(Error::generation)
    }

    /// Answers the configured question and lays the result out as a document
    pub fn generate_report(&self) -> Result<document::Document, Error> {
        let text = self.answer(&self.config.question)?;
        Ok(document::generated_report(&text, None))
    }
}

/// Netlists become one snippet per chunk. A `.docx` becomes its non-blank
/// paragraphs joined by newlines, anything else its lossy text; either is a
/// single snippet when not blank.
fn file_snippets(path: &Path, kind: SourceKind) -> Result<Vec<String>, Error> {
    let text = match kind {
        SourceKind::Netlist(_) => {
            let Some(parsed) = parse_file(path)? else {
                return Ok(vec![]);
            };
            if !parsed.skipped.is_empty() {
                tracing::info!(
                    file = %path.display(),
                    skipped = parsed.skipped.len(),
                    "dropped unrecognised netlist lines"
                );
            }
            let chunks = chunk::flatten(&parsed.netlist);
            return Ok(chunks.into_iter().map(String::from).collect());
        }
        SourceKind::Docx => Document::from_docx(&fs::read(path)?)?
            .paragraphs()
            .join("\n"),
        SourceKind::Text => String::from_utf8_lossy(&fs::read(path)?).into_owned(),
    };
    if text.trim().is_empty() {
        Ok(vec![])
    } else {
        Ok(vec![text])
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::*;
    use std::{cell::RefCell, convert::Infallible, fmt};

    macro_rules! test_path {
        ($fname:expr) => {
            concat!(env!("CARGO_MANIFEST_DIR"), "/resources/test/", $fname)
        };
    }

    #[derive(Debug)]
    struct Unavailable;

    impl fmt::Display for Unavailable {
        fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
            write!(f, "service unavailable")
        }
    }

    impl std::error::Error for Unavailable {}

    /// Embeds text as its length, so nearness is closeness in length
    struct LengthEmbedder;

    impl Embedder for LengthEmbedder {
        type Error = Infallible;

        fn embed_batch(&self, texts: &[&str]) -> Result<Vec<Vec<f32>>, Self::Error> {
            Ok(texts.iter().map(|t| vec![t.len() as f32]).collect())
        }
    }

    struct DownEmbedder;

    impl Embedder for DownEmbedder {
        type Error = Unavailable;

        fn embed_batch(&self, _: &[&str]) -> Result<Vec<Vec<f32>>, Self::Error> {
            Err(Unavailable)
        }
    }

    #[derive(Default)]
    struct MemoryIndex {
        entries: Vec<(String, Vec<f32>)>,
    }

    impl VectorIndex for MemoryIndex {
        type Error = Infallible;

        fn insert(&mut self, text: String, vector: Vec<f32>) -> Result<(), Self::Error> {
            self.entries.push((text, vector));
            Ok(())
        }

        fn nearest(&self, query: &[f32], k: usize) -> Result<Vec<String>, Self::Error> {
            let mut scored: Vec<_> = self
                .entries
                .iter()
                .map(|(text, v)| ((v[0] - query[0]).abs(), text))
                .collect();
            scored.sort_by(|a, b| a.0.total_cmp(&b.0));
            Ok(scored.into_iter().take(k).map(|(_, t)| t.clone()).collect())
        }
    }

    /// Records what it was asked and echoes the context back
    #[derive(Default)]
    struct EchoGenerator {
        questions: RefCell<Vec<String>>,
    }

    impl Generator for EchoGenerator {
        type Error = Infallible;

        fn generate(&self, question: &str, context: &[String]) -> Result<String, Self::Error> {
            self.questions.borrow_mut().push(question.to_owned());
            Ok(context.join("\n\n"))
        }
    }

    fn pipeline() -> Pipeline<LengthEmbedder, MemoryIndex, EchoGenerator> {
        Pipeline::new(LengthEmbedder, MemoryIndex::default(), EchoGenerator::default())
    }

    #[test]
    fn ingests_netlists_and_text() {
        let mut pipeline = pipeline();
        let report = pipeline
            .ingest(&[
                test_path!("board.d356"),
                test_path!("board.ipc"),
                test_path!("notes.txt"),
            ])
            .unwrap();

        // graph: metadata + 3 components + 3 nets; flat: 3 nets; text: 1
        let counts: Vec<_> = report.files.iter().map(|f| f.status.clone()).collect();
        assert_eq!(
            counts,
            [
                FileStatus::Ok { snippets: 7 },
                FileStatus::Ok { snippets: 3 },
                FileStatus::Ok { snippets: 1 },
            ]
        );
        assert_eq!(report.files[0].kind, SourceKind::Netlist(Format::Graph));
        assert_eq!(report.files[1].kind, SourceKind::Netlist(Format::Flat));
        assert_eq!(report.files[2].kind, SourceKind::Text);
        assert_eq!(report.snippet_count, 11);
        assert_eq!(pipeline.index().entries.len(), 11);
        assert_eq!(
            pipeline.index().entries[0].0,
            "Metadata:\nJOB: testboard\nUNITS: CUST 0\nTITLE: Car radio rev B"
        );
    }

    #[rstest]
    #[case("board.d356", SourceKind::Netlist(Format::Graph))]
    #[case("board.IPC", SourceKind::Netlist(Format::Flat))]
    #[case("Clemson_HW_Requirements.docx", SourceKind::Docx)]
    #[case("notes/BRINGUP.DOCX", SourceKind::Docx)]
    #[case("bom.csv", SourceKind::Text)]
    #[case("README", SourceKind::Text)]
    fn source_kind_by_extension(#[case] path: &str, #[case] expected: SourceKind) {
        assert_eq!(SourceKind::detect(Path::new(path)), expected);
    }

    #[test]
    fn docx_is_indexed_as_paragraph_text() {
        let mut pipeline = pipeline();
        let report = pipeline
            .ingest(&[test_path!("bringup_procedure.docx")])
            .unwrap();
        assert_eq!(report.files[0].kind, SourceKind::Docx);
        assert_eq!(report.files[0].status, FileStatus::Ok { snippets: 1 });

        let text = &pipeline.index().entries[0].0;
        assert_eq!(
            text,
            "Board Bring-up Procedure\n\
             Check the 5V rail before fitting U1.\n\
             Measure TP3 against GND."
        );
        assert!(!text.contains("PK"));
    }

    #[test]
    fn docx_that_is_not_a_package_fails_alone() {
        let mut pipeline = pipeline();
        let report = pipeline
            .ingest(&[test_path!("plain_text.docx"), test_path!("notes.txt")])
            .unwrap();
        let FileStatus::Failed(message) = &report.files[0].status else {
            panic!("expected a failure, got {:?}", report.files[0].status);
        };
        assert!(message.starts_with("Document extraction failed"));
        assert_eq!(report.snippet_count, 1);
        assert_eq!(
            pipeline.index().entries[0].0,
            "Bring-up notes\n\nPower the 5V rail first.\n"
        );
    }

    #[test]
    fn unreadable_file_does_not_stop_the_batch() {
        let mut pipeline = pipeline();
        let report = pipeline
            .ingest(&[test_path!("missing.ipc"), test_path!("notes.txt")])
            .unwrap();
        assert!(matches!(report.files[0].status, FileStatus::Failed(_)));
        assert_eq!(report.files[1].status, FileStatus::Ok { snippets: 1 });
        assert_eq!(report.snippet_count, 1);
    }

    #[test]
    fn nothing_to_index_is_an_error() {
        let mut pipeline = pipeline();
        let err = pipeline.ingest(&[test_path!("missing.d356")]).unwrap_err();
        assert!(matches!(err, Error::NoContent));
        assert!(pipeline.index().entries.is_empty());
    }

    #[test]
    fn embedding_failure_is_reported() {
        let mut pipeline = Pipeline::new(
            DownEmbedder,
            MemoryIndex::default(),
            EchoGenerator::default(),
        );
        let err = pipeline.ingest(&[test_path!("notes.txt")]).unwrap_err();
        assert_eq!(err.to_string(), "Embedding failed: service unavailable");
    }

    #[test]
    fn answer_uses_top_k_context() {
        let mut pipeline = pipeline().with_config(PipelineConfig::default().with_top_k(2));
        pipeline.ingest(&[test_path!("board.ipc")]).unwrap();

        let answer = pipeline.answer("Net: GND").unwrap();
        assert_eq!(answer.matches("Net: ").count(), 2);
        assert_eq!(pipeline.generator.questions.borrow().as_slice(), ["Net: GND"]);
    }

    #[test]
    fn report_asks_the_configured_question() {
        let config = PipelineConfig::default()
            .with_top_k(1)
            .with_question("Write the power-up steps");
        let mut pipeline = pipeline().with_config(config);
        pipeline.ingest(&[test_path!("notes.txt")]).unwrap();

        let report = pipeline.generate_report().unwrap();
        let paragraphs = report.paragraphs();
        assert_eq!(paragraphs[0], "Generated Test Procedure");
        assert_eq!(&paragraphs[2..4], ["Bring-up notes", "Power the 5V rail first."]);
        assert_eq!(
            pipeline.generator.questions.borrow().as_slice(),
            ["Write the power-up steps"]
        );
    }

    #[test]
    fn default_config() {
        let config = PipelineConfig::default();
        assert_eq!(config.top_k, 143);
        assert!(config.question.starts_with("You are a useful tool"));
    }
}
