//! Paragraph sequences for the generated procedure document.
//!
//! Only the text is modelled here; rendering paragraphs into a document
//! container is left to the caller.

use crate::error::Error;

const RULE_WIDTH: usize = 50;

/// An ordered sequence of non-empty paragraphs
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Document {
    paragraphs: Vec<String>,
}

impl Document {
    /// Keeps the non-blank entries of `paragraphs`, trimmed
    pub fn new<I, S>(paragraphs: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut document = Self::default();
        for paragraph in paragraphs {
            document.push(paragraph);
        }
        document
    }

    /// Splits `text` on blank lines. CR and CRLF line ends are normalized first.
    pub fn from_text(text: &str) -> Self {
        let text = normalize_newlines(text);
        Self::new(text.split("\n\n"))
    }

    /// One paragraph per non-blank line
    pub fn from_lines(text: &str) -> Self {
        let text = normalize_newlines(text);
        Self::new(text.split('\n'))
    }

    /// Paragraph text of a `.docx` package, runs concatenated. Tables and
    /// other body content are not read.
    pub fn from_docx(bytes: &[u8]) -> Result<Self, Error> {
        let docx = docx_rs::read_docx(bytes).map_err(Error::document)?;
        let mut document = Self::default();
        for child in docx.document.children {
            let docx_rs::DocumentChild::Paragraph(paragraph) = child else {
                continue;
            };
            let mut text = String::new();
            for child in paragraph.children {
                if let docx_rs::ParagraphChild::Run(run) = child {
                    for child in run.children {
                        if let docx_rs::RunChild::Text(t) = child {
                            text.push_str(&t.text);
                        }
                    }
                }
            }
            document.push(text);
        }
        Ok(document)
    }

    pub fn push(&mut self, paragraph: impl AsRef<str>) {
        let paragraph = paragraph.as_ref().trim();
        if !paragraph.is_empty() {
            self.paragraphs.push(paragraph.to_owned());
        }
    }

    pub fn paragraphs(&self) -> &[String] {
        &self.paragraphs
    }

    pub fn len(&self) -> usize {
        self.paragraphs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.paragraphs.is_empty()
    }

    pub fn into_paragraphs(self) -> Vec<String> {
        self.paragraphs
    }
}

fn normalize_newlines(text: &str) -> String {
    text.replace("\r\n", "\n").replace('\r', "\n")
}

/// Concatenates the paragraphs of `documents` in order behind a title paragraph.
///
/// Paragraphs are neither reordered nor deduplicated; empty documents
/// contribute nothing.
pub fn merge_documents(title: &str, documents: &[Document]) -> Vec<String> {
    std::iter::once(title.to_owned())
        .chain(
            documents
                .iter()
                .flat_map(|document| document.paragraphs.iter().cloned()),
        )
        .collect()
}

/// Lays out generated `text` as a procedure document: title, optional echo
/// of the source material, the generated sections and a short summary.
pub fn generated_report(text: &str, original: Option<&str>) -> Document {
    let mut document = Document::default();
    document.push("Generated Test Procedure");

    let original = original.filter(|original| !original.trim().is_empty());
    if let Some(original) = original {
        let rule = "\u{2500}".repeat(RULE_WIDTH);
        document.push("Original Input Content");
        document.push("The following is the original content that was processed:");
        document.push(&rule);
        document.paragraphs.extend(Document::from_lines(original).paragraphs);
        document.push(&rule);
    }

    document.push("Analysis Results");
    document.paragraphs.extend(Document::from_text(text).paragraphs);

    document.push("Document Information");
    document.push(format!("Content length: {} characters", text.chars().count()));
    document.push(format!("Word count: {} words", text.split_whitespace().count()));
    if let Some(original) = original {
        document.push(format!(
            "Original content length: {} characters",
            original.chars().count()
        ));
        document.push(format!(
            "Original word count: {} words",
            original.split_whitespace().count()
        ));
    }
    document
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::*;

    #[test]
    fn merge_prefixes_title_and_keeps_order() {
        let docs = [
            Document::new(["Scope", "Power rails"]),
            Document::default(),
            Document::new(["Scope", "Clocks"]),
        ];
        let merged = merge_documents("Bring-up plan", &docs);
        assert_eq!(merged, ["Bring-up plan", "Scope", "Power rails", "Scope", "Clocks"]);
    }

    #[test]
    fn merge_of_nothing_is_just_the_title() {
        assert_eq!(merge_documents("Title", &[]), ["Title"]);
    }

    #[rstest]
    #[case("one\n\ntwo", &["one", "two"])]
    #[case("one\r\n\r\ntwo\rstill two", &["one", "two\nstill two"])]
    #[case("\n\n  \n\n", &[])]
    #[case("  padded  \n\n\n\nnext", &["padded", "next"])]
    fn from_text_splits_on_blank_lines(#[case] text: &str, #[case] expected: &[&str]) {
        assert_eq!(Document::from_text(text).paragraphs(), expected);
    }

    #[test]
    fn from_lines_drops_blank_lines() {
        let doc = Document::from_lines("a\n\n b \r\nc");
        assert_eq!(doc.paragraphs(), ["a", "b", "c"]);
    }

    #[test]
    fn docx_paragraphs_skip_blank_ones() {
        let bytes = include_bytes!(concat!(
            env!("CARGO_MANIFEST_DIR"),
            "/resources/test/bringup_procedure.docx"
        ));
        let doc = Document::from_docx(bytes).unwrap();
        assert_eq!(
            doc.paragraphs(),
            [
                "Board Bring-up Procedure",
                "Check the 5V rail before fitting U1.",
                "Measure TP3 against GND.",
            ]
        );
    }

    #[test]
    fn docx_rejects_non_packages() {
        let err = Document::from_docx(b"Bring-up notes").unwrap_err();
        assert!(matches!(err, Error::Document(_)));
    }

    #[test]
    fn report_without_original() {
        let report = generated_report("Step 1\n\nStep 2 check rails", None);
        let expected = [
            "Generated Test Procedure",
            "Analysis Results",
            "Step 1",
            "Step 2 check rails",
            "Document Information",
            "Content length: 26 characters",
            "Word count: 6 words",
        ];
        assert_eq!(report.paragraphs(), expected);
    }

    #[test]
    fn report_echoes_original_lines() {
        let report = generated_report("Done", Some("line one\n\nline two"));
        let paragraphs = report.paragraphs();
        assert_eq!(paragraphs[1], "Original Input Content");
        assert_eq!(&paragraphs[4..6], ["line one", "line two"]);
        assert_eq!(paragraphs[3], paragraphs[6]);
        assert_eq!(paragraphs.last().map(String::as_str), Some("Original word count: 4 words"));
    }
}
