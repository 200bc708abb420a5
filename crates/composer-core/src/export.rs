//! Article export
//!
//! The backend can render every format and hand back a download link. When it
//! cannot be reached the article is rendered locally: Markdown and HTML have
//! local converters, PDF and DOCX do not and degrade to Markdown text.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::domain::ArticleContent;
use crate::error::{ComposerError, ComposerResult};

/// Downloadable artifact formats
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExportFormat {
    Markdown,
    Html,
    Pdf,
    Docx,
}

impl ExportFormat {
    pub fn extension(self) -> &'static str {
        match self {
            ExportFormat::Markdown => "md",
            ExportFormat::Html => "html",
            ExportFormat::Pdf => "pdf",
            ExportFormat::Docx => "docx",
        }
    }

    pub fn mime_type(self) -> &'static str {
        match self {
            ExportFormat::Markdown => "text/markdown",
            ExportFormat::Html => "text/html",
            ExportFormat::Pdf => "application/pdf",
            ExportFormat::Docx => {
                "application/vnd.openxmlformats-officedocument.wordprocessingml.document"
            }
        }
    }
}

impl fmt::Display for ExportFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.extension())
    }
}

impl FromStr for ExportFormat {
    type Err = ComposerError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "md" | "markdown" => Ok(ExportFormat::Markdown),
            "html" | "htm" => Ok(ExportFormat::Html),
            "pdf" => Ok(ExportFormat::Pdf),
            "docx" | "word" => Ok(ExportFormat::Docx),
            other => Err(ComposerError::Validation(format!("Unknown export format: {}", other))),
        }
    }
}

/// Backend answer to an export request
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RemoteExport {
    pub download_url: String,
    #[serde(default)]
    pub preview_content: String,
}

/// Where the artifact's bytes live
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", tag = "kind")]
pub enum ArtifactBody {
    /// Rendered locally, ready to write out
    Inline { text: String },
    /// Rendered by the backend, fetch from the link
    Remote { download_url: String },
}

/// Result of an export
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExportArtifact {
    /// Format the caller asked for
    pub requested: ExportFormat,
    /// Format actually produced
    pub format: ExportFormat,
    pub file_name: String,
    pub body: ArtifactBody,
    pub preview: String,
    /// Why the requested path was not used, if it was not
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fallback: Option<String>,
}

impl ExportArtifact {
    pub fn from_remote(article: &ArticleContent, format: ExportFormat, remote: RemoteExport) -> Self {
        Self {
            requested: format,
            format,
            file_name: file_name(&article.title, format),
            body: ArtifactBody::Remote {
                download_url: remote.download_url,
            },
            preview: remote.preview_content,
            fallback: None,
        }
    }

    pub fn is_fallback(&self) -> bool {
        self.fallback.is_some()
    }
}

/// File name derived from the article title
pub fn file_name(title: &str, format: ExportFormat) -> String {
    let mut slug = String::with_capacity(title.len());
    for c in title.chars() {
        if c.is_ascii_alphanumeric() {
            slug.push(c.to_ascii_lowercase());
        } else if !slug.is_empty() && !slug.ends_with('-') {
            slug.push('-');
        }
    }
    let slug = slug.trim_end_matches('-');
    let stem = if slug.is_empty() { "article" } else { slug };
    format!("{}.{}", stem, format.extension())
}

/// Markdown text of the article, with a references section
pub fn render_markdown(article: &ArticleContent) -> String {
    let mut out = String::new();
    if !article.content.trim_start().starts_with("# ") {
        out.push_str(&format!("# {}\n\n", article.title));
    }
    out.push_str(article.content.trim_end());
    out.push('\n');

    if !article.citations.is_empty() && !article.content.contains("## References") {
        out.push_str("\n## References\n\n");
        for citation in &article.citations {
            out.push_str(&format!("[{}] {}. {}", citation.number, citation.title, citation.source));
            if !citation.url.is_empty() {
                out.push_str(&format!(" <{}>", citation.url));
            }
            out.push('\n');
        }
    }
    out
}

fn escape_html(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            _ => out.push(c),
        }
    }
    out
}

/// Standalone HTML document rendered from the Markdown text
pub fn render_html(article: &ArticleContent) -> String {
    let markdown = render_markdown(article);
    let mut body = String::new();
    let mut paragraph: Vec<&str> = Vec::new();
    let mut in_list = false;

    fn flush(body: &mut String, paragraph: &mut Vec<&str>) {
        if !paragraph.is_empty() {
            body.push_str(&format!("<p>{}</p>\n", escape_html(&paragraph.join(" "))));
            paragraph.clear();
        }
    }

    for line in markdown.lines() {
        let trimmed = line.trim();
        let is_item = trimmed.starts_with("- ") || trimmed.starts_with("* ");
        if in_list && !is_item {
            body.push_str("</ul>\n");
            in_list = false;
        }

        if trimmed.is_empty() {
            flush(&mut body, &mut paragraph);
        } else if let Some(heading) = trimmed.strip_prefix("### ") {
            flush(&mut body, &mut paragraph);
            body.push_str(&format!("<h3>{}</h3>\n", escape_html(heading)));
        } else if let Some(heading) = trimmed.strip_prefix("## ") {
            flush(&mut body, &mut paragraph);
            body.push_str(&format!("<h2>{}</h2>\n", escape_html(heading)));
        } else if let Some(heading) = trimmed.strip_prefix("# ") {
            flush(&mut body, &mut paragraph);
            body.push_str(&format!("<h1>{}</h1>\n", escape_html(heading)));
        } else if is_item {
            flush(&mut body, &mut paragraph);
            if !in_list {
                body.push_str("<ul>\n");
                in_list = true;
            }
            body.push_str(&format!("<li>{}</li>\n", escape_html(&trimmed[2..])));
        } else {
            paragraph.push(trimmed);
        }
    }
    flush(&mut body, &mut paragraph);
    if in_list {
        body.push_str("</ul>\n");
    }

    format!(
        "<!DOCTYPE html>\n<html lang=\"en\">\n<head>\n<meta charset=\"utf-8\">\n<title>{}</title>\n</head>\n<body>\n{}</body>\n</html>\n",
        escape_html(&article.title),
        body
    )
}

/// Render with a local converter
pub fn render_local(article: &ArticleContent, format: ExportFormat) -> ComposerResult<String> {
    match format {
        ExportFormat::Markdown => Ok(render_markdown(article)),
        ExportFormat::Html => Ok(render_html(article)),
        ExportFormat::Pdf | ExportFormat::Docx => Err(ComposerError::Export(format!(
            "no local {} converter available",
            format.extension()
        ))),
    }
}

/// Render locally, degrading to Markdown when the format has no converter
pub fn export_locally(article: &ArticleContent, format: ExportFormat) -> ExportArtifact {
    let preview = render_markdown(article);
    match render_local(article, format) {
        Ok(text) => ExportArtifact {
            requested: format,
            format,
            file_name: file_name(&article.title, format),
            body: ArtifactBody::Inline { text },
            preview,
            fallback: None,
        },
        Err(e) => {
            warn!(requested = %format, "Local export failed, falling back to markdown: {}", e);
            ExportArtifact {
                requested: format,
                format: ExportFormat::Markdown,
                file_name: file_name(&article.title, ExportFormat::Markdown),
                body: ArtifactBody::Inline { text: preview.clone() },
                preview,
                fallback: Some(e.to_string()),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::Citation;

    fn article() -> ArticleContent {
        ArticleContent {
            title: "AI in Healthcare: 2024 Review".to_string(),
            content: "## Introduction\n\nAI <matters> & helps.\n\n- faster\n- cheaper\n".to_string(),
            citations: vec![Citation {
                id: "1".to_string(),
                number: 1,
                title: "The Future of AI".to_string(),
                source: "nature.com".to_string(),
                url: String::new(),
            }],
            outline: vec![],
            metrics: None,
        }
    }

    #[test]
    fn format_parses_aliases() {
        assert_eq!("md".parse::<ExportFormat>().unwrap(), ExportFormat::Markdown);
        assert_eq!("DOCX".parse::<ExportFormat>().unwrap(), ExportFormat::Docx);
        assert!("rtf".parse::<ExportFormat>().is_err());
    }

    #[test]
    fn mime_types_match_formats() {
        assert_eq!(ExportFormat::Markdown.mime_type(), "text/markdown");
        assert_eq!(ExportFormat::Html.mime_type(), "text/html");
        assert_eq!(ExportFormat::Pdf.mime_type(), "application/pdf");
        assert!(ExportFormat::Docx.mime_type().ends_with("wordprocessingml.document"));
    }

    #[test]
    fn file_name_is_slugged() {
        assert_eq!(file_name("AI in Healthcare: 2024 Review", ExportFormat::Pdf), "ai-in-healthcare-2024-review.pdf");
        assert_eq!(file_name("???", ExportFormat::Markdown), "article.md");
    }

    #[test]
    fn markdown_adds_title_and_references() {
        let text = render_markdown(&article());
        assert!(text.starts_with("# AI in Healthcare: 2024 Review\n\n## Introduction"));
        assert!(text.contains("## References\n\n[1] The Future of AI. nature.com\n"));
    }

    #[test]
    fn html_escapes_and_structures() {
        let html = render_html(&article());
        assert!(html.starts_with("<!DOCTYPE html>"));
        assert!(html.contains("<h2>Introduction</h2>"));
        assert!(html.contains("<p>AI &lt;matters&gt; &amp; helps.</p>"));
        assert!(html.contains("<ul>\n<li>faster</li>\n<li>cheaper</li>\n</ul>"));
    }

    #[test]
    fn pdf_degrades_to_markdown() {
        let artifact = export_locally(&article(), ExportFormat::Pdf);
        assert_eq!(artifact.requested, ExportFormat::Pdf);
        assert_eq!(artifact.format, ExportFormat::Markdown);
        assert!(artifact.is_fallback());
        assert_eq!(artifact.file_name, "ai-in-healthcare-2024-review.md");
    }

    #[test]
    fn html_export_is_inline() {
        let artifact = export_locally(&article(), ExportFormat::Html);
        assert!(!artifact.is_fallback());
        assert!(matches!(artifact.body, ArtifactBody::Inline { ref text } if text.contains("<h1>")));
    }
}
