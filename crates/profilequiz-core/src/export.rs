//! Result export.
//!
//! The quiz describes what to export as a list of [`ExportElement`]s (see
//! [`Quiz::export_elements`](crate::Quiz::export_elements)). The
//! [`DocumentExporter`] lays them out as a Markdown document, wrapping text to
//! the page width, and writes it asynchronously.
//!
//! Export is best effort and never touches quiz state. An [`AbortSignal`]
//! raised before the file is written short-circuits without partial output.

use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use chrono::Utc;
use serde::{Deserialize, Serialize};

use crate::content::Image;
use crate::error::ExportError;

const EXPORT_FILENAME_SLUG: &str = "ProfileConfiguratorResults";

/// Characters per line.
const LINE_WIDTH: usize = 80;

/// Font size from which text is laid out as a heading.
const HEADING_SIZE_MIN: u32 = 16;

pub const FONT_SIZE_DEFAULT: u32 = 12;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FontStyle {
    #[default]
    Normal,
    Bold,
    Italic,
}

/// Layout parameters of one element.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ElementParams {
    pub size: u32,
    pub style: FontStyle,
}

impl Default for ElementParams {
    fn default() -> Self {
        Self {
            size: FONT_SIZE_DEFAULT,
            style: FontStyle::Normal,
        }
    }
}

impl ElementParams {
    pub fn heading(size: u32) -> Self {
        Self {
            size,
            style: FontStyle::Bold,
        }
    }

    pub fn bold() -> Self {
        Self {
            style: FontStyle::Bold,
            ..Self::default()
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "value", rename_all = "lowercase")]
pub enum ExportContent {
    Text(String),
    Image(Image),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExportElement {
    pub content: ExportContent,
    #[serde(default)]
    pub params: ElementParams,
}

impl ExportElement {
    pub fn text(text: impl Into<String>, params: ElementParams) -> Self {
        Self {
            content: ExportContent::Text(text.into()),
            params,
        }
    }

    pub fn image(image: Image) -> Self {
        Self {
            content: ExportContent::Image(image),
            params: ElementParams::default(),
        }
    }
}

/// Cancellation flag shared between the caller and a running export.
#[derive(Debug, Clone, Default)]
pub struct AbortSignal(Arc<AtomicBool>);

impl AbortSignal {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn abort(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    pub fn is_aborted(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}

/// Writes export elements as a Markdown document.
#[derive(Debug, Clone)]
pub struct DocumentExporter {
    output_dir: PathBuf,
}

impl DocumentExporter {
    pub fn new(output_dir: impl Into<PathBuf>) -> Self {
        Self {
            output_dir: output_dir.into(),
        }
    }

    /// Lay out elements. Empty texts and images without a path are skipped.
    pub fn render(&self, elements: &[ExportElement]) -> String {
        let mut document = String::new();

        for element in elements {
            match &element.content {
                ExportContent::Text(text) if text.trim().is_empty() => {}
                ExportContent::Text(text) => {
                    let heading = element.params.size >= HEADING_SIZE_MIN;
                    let width = if heading {
                        LINE_WIDTH - 2
                    } else {
                        LINE_WIDTH
                    };
                    for line in wrap_text(text, width) {
                        let line = match (heading, element.params.style) {
                            (true, _) => format!("# {line}"),
                            (false, FontStyle::Bold) => format!("**{line}**"),
                            (false, FontStyle::Italic) => format!("_{line}_"),
                            (false, FontStyle::Normal) => line,
                        };
                        document.push_str(&line);
                        document.push('\n');
                    }
                    document.push('\n');
                }
                ExportContent::Image(image) if image.path.is_empty() => {}
                ExportContent::Image(image) => {
                    let alt = image.alt.as_deref().unwrap_or_default();
                    document.push_str(&format!("![{alt}]({})\n\n", image.path));
                }
            }
        }

        document
    }

    /// Export to `<output_dir>/ProfileConfiguratorResults-<filename>.md`.
    ///
    /// Without a filename the current timestamp in milliseconds is used.
    ///
    /// # Errors
    ///
    /// [`ExportError::Aborted`] if the signal is raised before writing,
    /// [`ExportError::Io`] if the document cannot be written.
    pub async fn export(
        &self,
        elements: &[ExportElement],
        filename: Option<&str>,
        abort: &AbortSignal,
    ) -> Result<PathBuf, ExportError> {
        if abort.is_aborted() {
            return Err(ExportError::Aborted);
        }

        let filename = filename
            .map(str::to_string)
            .unwrap_or_else(|| Utc::now().timestamp_millis().to_string());
        let path = self
            .output_dir
            .join(format!("{EXPORT_FILENAME_SLUG}-{filename}.md"));
        let document = self.render(elements);

        tokio::fs::create_dir_all(&self.output_dir).await?;
        if abort.is_aborted() {
            return Err(ExportError::Aborted);
        }
        tokio::fs::write(&path, document).await?;

        tracing::info!(path = %path.display(), elements = elements.len(), "results exported");
        Ok(path)
    }
}

/// Greedy word wrap. Words longer than `width` get a line of their own.
fn wrap_text(text: &str, width: usize) -> Vec<String> {
    let mut lines = Vec::new();

    for paragraph in text.lines() {
        let mut line = String::new();
        for word in paragraph.split_whitespace() {
            let needed = if line.is_empty() {
                word.chars().count()
            } else {
                line.chars().count() + 1 + word.chars().count()
            };
            if needed > width && !line.is_empty() {
                lines.push(std::mem::take(&mut line));
            }
            if !line.is_empty() {
                line.push(' ');
            }
            line.push_str(word);
        }
        if !line.is_empty() {
            lines.push(line);
        }
    }

    lines
}

#[cfg(test)]
mod tests {
    use super::*;

    fn elements() -> Vec<ExportElement> {
        vec![
            ExportElement::text("Hiking results", ElementParams::heading(20)),
            ExportElement::text("Explorer", ElementParams::bold()),
            ExportElement::text("   ", ElementParams::default()),
            ExportElement::image(Image { path: "explorer.png".into(), alt: Some("Map".into()) }),
            ExportElement::image(Image::default()),
            ExportElement::text("Always off-trail.", ElementParams::default()),
        ]
    }

    #[test]
    fn wrap_respects_width() {
        let lines = wrap_text("one two three four five", 9);
        assert_eq!(lines, vec!["one two", "three", "four five"]);
    }

    #[test]
    fn wrap_keeps_long_words_whole() {
        assert_eq!(wrap_text("a extraordinarily b", 5), vec!["a", "extraordinarily", "b"]);
    }

    #[test]
    fn render_lays_out_headings_emphasis_and_images() {
        let document = DocumentExporter::new(".").render(&elements());
        assert_eq!(
            document,
            "# Hiking results\n\n**Explorer**\n\n![Map](explorer.png)\n\nAlways off-trail.\n\n"
        );
    }

    #[tokio::test]
    async fn export_writes_document() {
        let dir = tempfile::tempdir().unwrap();
        let exporter = DocumentExporter::new(dir.path());

        let path = exporter
            .export(&elements(), Some("run-1"), &AbortSignal::new())
            .await
            .unwrap();

        assert_eq!(path.file_name().unwrap(), "ProfileConfiguratorResults-run-1.md");
        let written = std::fs::read_to_string(path).unwrap();
        assert!(written.starts_with("# Hiking results"));
    }

    #[tokio::test]
    async fn aborted_export_writes_nothing() {
        let dir = tempfile::tempdir().unwrap();
        let out = dir.path().join("out");
        let exporter = DocumentExporter::new(&out);
        let abort = AbortSignal::new();
        abort.abort();

        let result = exporter.export(&elements(), Some("x"), &abort).await;
        assert!(matches!(result, Err(ExportError::Aborted)));
        assert!(!out.exists());
    }
}
