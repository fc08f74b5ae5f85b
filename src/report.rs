//! Downloadable PDF version of a summary.

use std::path::PathBuf;

use encoding_rs::WINDOWS_1252;
use genpdf::elements::{Break, Paragraph};
use genpdf::fonts::{self, Builtin};
use genpdf::style::{Style, StyledString};
use genpdf::{Alignment, Document, Mm, SimplePageDecorator};

use crate::config::Config;
use crate::error::{AppError, Result};

pub const REPORT_TITLE: &str = "World News Summarizer";
pub const REPORT_FILE_NAME: &str = "news_summary.pdf";

/// Substituted for characters the built-in fonts cannot encode.
pub const PLACEHOLDER: char = '?';

const TITLE_FONT_SIZE: u8 = 16;
const TEXT_FONT_SIZE: u8 = 12;
const PAGE_MARGIN_MM: f64 = 10.0;
const A4_WIDTH_MM: f64 = 210.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BlockStyle {
    /// Centered, bold.
    Title,
    /// Italic paragraph.
    Emphasis,
    /// Normal-weight paragraph.
    Body,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Block {
    Text { style: BlockStyle, text: String },
    Gap,
}

/// Backend-neutral layout of a report.
#[derive(Debug, Clone, PartialEq)]
pub struct ReportDocument {
    pub title: String,
    pub blocks: Vec<Block>,
}

pub trait DocumentRenderer: Send + Sync {
    fn render(&self, document: &ReportDocument) -> Result<Vec<u8>>;
}

fn is_single_byte(c: char) -> bool {
    if c.is_ascii() {
        return !c.is_ascii_control();
    }
    if c.is_control() {
        return false;
    }
    let mut buf = [0u8; 4];
    let (_, _, had_errors) = WINDOWS_1252.encode(c.encode_utf8(&mut buf));
    !had_errors
}

/// Replaces every character outside Windows-1252 with [`PLACEHOLDER`].
/// Tabs become spaces; line breaks are kept.
pub fn to_single_byte(text: &str) -> String {
    text.chars()
        .map(|c| match c {
            '\n' => '\n',
            '\t' => ' ',
            c if is_single_byte(c) => c,
            _ => PLACEHOLDER,
        })
        .collect()
}

/// Splits the whitespace-free runs of `line` that `fits` rejects so they
/// can wrap. Runs that fit are left untouched.
pub fn break_long_runs(line: &str, fits: impl Fn(&str) -> bool) -> String {
    let mut out = String::with_capacity(line.len());
    let mut rest = line;
    while let Some(start) = rest.find(|c: char| !c.is_whitespace()) {
        out.push_str(&rest[..start]);
        rest = &rest[start..];
        let end = rest.find(char::is_whitespace).unwrap_or(rest.len());
        let (run, tail) = rest.split_at(end);
        push_run(&mut out, run, &fits);
        rest = tail;
    }
    out.push_str(rest);
    out
}

fn push_run(out: &mut String, run: &str, fits: &impl Fn(&str) -> bool) {
    if fits(run) {
        out.push_str(run);
        return;
    }
    let mut piece_start = 0;
    for (i, c) in run.char_indices() {
        let piece_end = i + c.len_utf8();
        if i > piece_start && !fits(&run[piece_start..piece_end]) {
            out.push_str(&run[piece_start..i]);
            out.push(' ');
            piece_start = i;
        }
    }
    out.push_str(&run[piece_start..]);
}

fn push_paragraphs(blocks: &mut Vec<Block>, style: BlockStyle, text: &str) {
    for line in to_single_byte(text).lines() {
        let line = line.trim_end();
        if line.is_empty() {
            blocks.push(Block::Gap);
        } else {
            blocks.push(Block::Text {
                style,
                text: line.to_string(),
            });
        }
    }
}

/// Lays out the title, the question in italics and the summary.
pub fn build_report(question: &str, summary: &str) -> ReportDocument {
    let mut blocks = vec![
        Block::Text {
            style: BlockStyle::Title,
            text: REPORT_TITLE.to_string(),
        },
        Block::Gap,
    ];
    push_paragraphs(&mut blocks, BlockStyle::Emphasis, question);
    blocks.push(Block::Gap);
    push_paragraphs(&mut blocks, BlockStyle::Body, summary);

    ReportDocument {
        title: REPORT_TITLE.to_string(),
        blocks,
    }
}

pub fn render_report(renderer: &dyn DocumentRenderer, question: &str, summary: &str) -> Result<Vec<u8>> {
    let document = build_report(question, summary);
    let bytes = renderer.render(&document)?;
    tracing::debug!(bytes = bytes.len(), blocks = document.blocks.len(), "report rendered");
    Ok(bytes)
}

/// Renders with the PDF core Helvetica font. The TrueType family in
/// `font_dir` only supplies glyph metrics for line wrapping.
#[derive(Debug, Clone)]
pub struct GenPdfRenderer {
    font_dir: PathBuf,
    font_name: String,
}

impl GenPdfRenderer {
    pub fn new(font_dir: impl Into<PathBuf>, font_name: impl Into<String>) -> Self {
        Self {
            font_dir: font_dir.into(),
            font_name: font_name.into(),
        }
    }

    pub fn from_config(config: &Config) -> Self {
        Self::new(config.font_dir.clone(), config.font_name.clone())
    }

    fn style(style: BlockStyle) -> Style {
        match style {
            BlockStyle::Title => Style::new().bold().with_font_size(TITLE_FONT_SIZE),
            BlockStyle::Emphasis => Style::new().italic().with_font_size(TEXT_FONT_SIZE),
            BlockStyle::Body => Style::new().with_font_size(TEXT_FONT_SIZE),
        }
    }

    fn paragraph(style: BlockStyle, text: String) -> Paragraph {
        let paragraph = Paragraph::new(StyledString::new(text, Self::style(style)));
        match style {
            BlockStyle::Title => paragraph.aligned(Alignment::Center),
            BlockStyle::Emphasis | BlockStyle::Body => paragraph,
        }
    }
}

impl DocumentRenderer for GenPdfRenderer {
    fn render(&self, document: &ReportDocument) -> Result<Vec<u8>> {
        let family = fonts::from_files(&self.font_dir, &self.font_name, Some(Builtin::Helvetica))
            .map_err(|e| {
                AppError::Render(format!(
                    "cannot load font family {} from {}: {}",
                    self.font_name,
                    self.font_dir.display(),
                    e
                ))
            })?;

        let mut doc = Document::new(family);
        doc.set_title(document.title.clone());
        doc.set_minimal_conformance();
        doc.set_font_size(TEXT_FONT_SIZE);

        let mut decorator = SimplePageDecorator::new();
        decorator.set_margins(PAGE_MARGIN_MM);
        doc.set_page_decorator(decorator);

        let line_width = Mm::from(A4_WIDTH_MM - 2.0 * PAGE_MARGIN_MM);
        for block in &document.blocks {
            match block {
                Block::Gap => doc.push(Break::new(1)),
                Block::Text { style, text } => {
                    let metrics = Self::style(*style);
                    let text = break_long_runs(text, |run| {
                        metrics.str_width(doc.font_cache(), run) <= line_width
                    });
                    doc.push(Self::paragraph(*style, text));
                }
            }
        }

        let mut buf = Vec::new();
        doc.render(&mut buf)?;
        Ok(buf)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    #[derive(Default)]
    struct Recorder {
        seen: Mutex<Vec<ReportDocument>>,
    }

    impl DocumentRenderer for Recorder {
        fn render(&self, document: &ReportDocument) -> Result<Vec<u8>> {
            self.seen.lock().unwrap().push(document.clone());
            Ok(b"%PDF".to_vec())
        }
    }

    fn texts(doc: &ReportDocument, wanted: BlockStyle) -> Vec<String> {
        doc.blocks
            .iter()
            .filter_map(|b| match b {
                Block::Text { style, text } if *style == wanted => Some(text.clone()),
                _ => None,
            })
            .collect()
    }

    #[test]
    fn latin_text_is_untouched() {
        assert_eq!(to_single_byte("Protesta en Barcelona: ¿qué pasó? €5"), "Protesta en Barcelona: ¿qué pasó? €5");
    }

    #[test]
    fn unencodable_characters_become_placeholders() {
        assert_eq!(to_single_byte("東京 news 🚀"), "?? news ?");
        assert_eq!(to_single_byte("Ωmega\u{7}"), "?mega?");
    }

    #[test]
    fn newlines_survive_and_tabs_flatten() {
        assert_eq!(to_single_byte("a\tb\nc"), "a b\nc");
    }

    fn at_most(max: usize) -> impl Fn(&str) -> bool {
        move |run: &str| run.chars().count() <= max
    }

    #[test]
    fn overflowing_runs_are_split() {
        let url = "https://example.com/".to_string() + &"x".repeat(100);
        let broken = break_long_runs(&url, at_most(60));
        assert!(broken.split(' ').all(|part| part.chars().count() <= 60));
        assert_eq!(broken.replace(' ', ""), url);
    }

    #[test]
    fn fitting_runs_are_untouched() {
        let url = "https://www.lavanguardia.com/local/barcelona/20201016/protesta-miles-personas.html";
        assert_eq!(break_long_runs(url, at_most(90)), url);
        assert_eq!(break_long_runs("  short words\tstay ", at_most(5)), "  short words\tstay ");
    }

    #[test]
    fn layout_keeps_urls_intact() {
        let url = "https://www.lavanguardia.com/local/barcelona/20201016/protesta-miles-personas.html";
        let doc = build_report("q", &format!("1. {}", url));
        assert_eq!(texts(&doc, BlockStyle::Body), vec![format!("1. {}", url)]);
    }

    #[test]
    fn layout_orders_title_question_summary() {
        let doc = build_report("What happened?", "Line one.\n\nLine two.");
        assert_eq!(
            doc.blocks,
            vec![
                Block::Text { style: BlockStyle::Title, text: REPORT_TITLE.into() },
                Block::Gap,
                Block::Text { style: BlockStyle::Emphasis, text: "What happened?".into() },
                Block::Gap,
                Block::Text { style: BlockStyle::Body, text: "Line one.".into() },
                Block::Gap,
                Block::Text { style: BlockStyle::Body, text: "Line two.".into() },
            ]
        );
    }

    #[test]
    fn render_report_hands_sanitized_layout_to_backend() {
        let recorder = Recorder::default();
        let bytes = render_report(&recorder, "¿Qué pasó en 東京?", "Résumé ✓").unwrap();
        assert_eq!(bytes, b"%PDF");

        let seen = recorder.seen.lock().unwrap();
        assert_eq!(texts(&seen[0], BlockStyle::Emphasis), vec!["¿Qué pasó en ???"]);
        assert_eq!(texts(&seen[0], BlockStyle::Body), vec!["Résumé ?"]);
    }

    #[test]
    fn missing_fonts_are_a_render_error() {
        let renderer = GenPdfRenderer::new("/nonexistent/fonts", "NoSuchFont");
        let err = renderer.render(&build_report("q", "s")).unwrap_err();
        assert!(matches!(err, AppError::Render(_)));
    }

    fn fixture_renderer() -> GenPdfRenderer {
        GenPdfRenderer::new(concat!(env!("CARGO_MANIFEST_DIR"), "/tests/fonts"), "DejaVuSans")
    }

    #[test]
    fn renders_pdf_bytes_deterministically() {
        let renderer = fixture_renderer();
        let first = render_report(&renderer, "What happened in Barcelona in 2020?", "Protests.").unwrap();
        let second = render_report(&renderer, "What happened in Barcelona in 2020?", "Protests.").unwrap();
        assert!(first.starts_with(b"%PDF"));
        assert_eq!(first.len(), second.len());
    }

    #[test]
    fn renders_unencodable_summary_without_error() {
        let summary = "Tokyo 東京 update 🚀\n".repeat(200);
        let bytes = render_report(&fixture_renderer(), "q", &summary).unwrap();
        assert!(bytes.starts_with(b"%PDF"));
    }

    #[test]
    fn renders_overlong_run_without_error() {
        let summary = format!("See https://example.com/{}", "a".repeat(400));
        let bytes = render_report(&fixture_renderer(), "q", &summary).unwrap();
        assert!(bytes.starts_with(b"%PDF"));
    }
}
