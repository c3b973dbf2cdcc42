//! Parser for the rich-text subset produced by the summary editor.
//!
//! The editor only emits `<p>` (optionally with an inline `text-align`
//! style), `<strong>`/`<b>` and `<br>`. Content is read into a small tagged
//! tree of paragraphs holding plain spans, bold spans and line breaks. Any
//! other markup is dropped while its text is kept, and malformed markup never
//! fails: an unterminated tag is read as text.

use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::model::{Alignment, Paragraph, TextRun};

/// Placeholder shown for a summary without content.
pub const NO_CONTENT: &str = "Sin contenido";

static ALIGN_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)text-align\s*:\s*(left|center|right|justify)").unwrap());

/// Inline content of an editor paragraph.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "text", rename_all = "snake_case")]
pub enum Inline {
    /// Normal-weight text
    Text(String),
    /// Bold text
    Bold(String),
    /// Forced line break
    LineBreak,
}

/// One editor paragraph.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContentParagraph {
    /// Alignment from the inline style, left when absent
    pub alignment: Alignment,
    /// Spans in order
    pub inlines: Vec<Inline>,
}

impl ContentParagraph {
    fn new(alignment: Alignment) -> Self {
        Self {
            alignment,
            inlines: Vec::new(),
        }
    }

    /// Text of the paragraph with line breaks as `\n`.
    pub fn plain_text(&self) -> String {
        self.inlines
            .iter()
            .map(|i| match i {
                Inline::Text(t) | Inline::Bold(t) => t.as_str(),
                Inline::LineBreak => "\n",
            })
            .collect()
    }

    fn has_text(&self) -> bool {
        self.inlines.iter().any(|i| match i {
            Inline::Text(t) | Inline::Bold(t) => !t.trim().is_empty(),
            Inline::LineBreak => false,
        })
    }

    fn push_text(&mut self, text: &str, bold: bool) {
        if text.is_empty() {
            return;
        }
        match (self.inlines.last_mut(), bold) {
            (Some(Inline::Text(prev)), false) | (Some(Inline::Bold(prev)), true) => {
                prev.push_str(text)
            }
            _ => self.inlines.push(if bold {
                Inline::Bold(text.to_string())
            } else {
                Inline::Text(text.to_string())
            }),
        }
    }
}

enum Token<'a> {
    Text(&'a str),
    Open { name: String, attrs: &'a str },
    Close { name: String },
}

fn tokenize(html: &str) -> Vec<Token<'_>> {
    let mut tokens = Vec::new();
    let mut pos = 0;

    while pos < html.len() {
        let rest = &html[pos..];
        let Some(lt) = rest.find('<') else {
            tokens.push(Token::Text(rest));
            break;
        };
        if lt > 0 {
            tokens.push(Token::Text(&rest[..lt]));
        }
        let after = &rest[lt + 1..];
        let Some(gt) = after.find('>') else {
            tokens.push(Token::Text(&rest[lt..]));
            break;
        };
        let inner = &after[..gt];

        if inner.starts_with('!') || inner.starts_with('?') {
            pos += lt + gt + 2;
            continue;
        }
        let (closing, body) = match inner.strip_prefix('/') {
            Some(body) => (true, body),
            None => (false, inner),
        };
        let name_len = body
            .find(|c: char| !c.is_ascii_alphanumeric())
            .unwrap_or(body.len());
        if name_len == 0 {
            // "< 5" and the like: a literal angle bracket
            tokens.push(Token::Text(&rest[lt..lt + 1]));
            pos += lt + 1;
            continue;
        }

        let name = body[..name_len].to_ascii_lowercase();
        if closing {
            tokens.push(Token::Close { name });
        } else {
            tokens.push(Token::Open {
                name,
                attrs: &body[name_len..],
            });
        }
        pos += lt + gt + 2;
    }

    tokens
}

/// Parse editor content into paragraphs.
///
/// Text found outside any `<p>` is gathered into left-aligned paragraphs.
pub fn parse(html: &str) -> Vec<ContentParagraph> {
    let mut paragraphs = Vec::new();
    let mut current: Option<ContentParagraph> = None;
    let mut explicit = false;
    let mut bold_depth = 0usize;

    for token in tokenize(html) {
        match token {
            Token::Open { name, attrs } => match name.as_str() {
                "p" => {
                    if let Some(p) = current.take() {
                        if explicit || p.has_text() {
                            paragraphs.push(p);
                        }
                    }
                    let alignment = ALIGN_RE
                        .captures(attrs)
                        .and_then(|c| c.get(1))
                        .and_then(|m| Alignment::from_css(m.as_str()))
                        .unwrap_or_default();
                    current = Some(ContentParagraph::new(alignment));
                    explicit = true;
                    bold_depth = 0;
                }
                "strong" | "b" => bold_depth += 1,
                "br" => current
                    .get_or_insert_with(|| ContentParagraph::new(Alignment::Left))
                    .inlines
                    .push(Inline::LineBreak),
                _ => {}
            },
            Token::Close { name } => match name.as_str() {
                "p" => {
                    if let Some(p) = current.take() {
                        if explicit || p.has_text() {
                            paragraphs.push(p);
                        }
                    }
                    explicit = false;
                    bold_depth = 0;
                }
                "strong" | "b" => bold_depth = bold_depth.saturating_sub(1),
                _ => {}
            },
            Token::Text(raw) => {
                let text = decode_entities(&collapse_whitespace(raw));
                if current.is_none() {
                    if text.trim().is_empty() {
                        continue;
                    }
                    current = Some(ContentParagraph::new(Alignment::Left));
                    explicit = false;
                }
                if let Some(p) = current.as_mut() {
                    p.push_text(&text, bold_depth > 0);
                }
            }
        }
    }

    if let Some(p) = current {
        if p.has_text() {
            paragraphs.push(p);
        }
    }

    paragraphs
}

/// Convert editor content into styled paragraphs for the page tree.
///
/// Empty content yields a single "Sin contenido" paragraph.
pub fn to_paragraphs(html: &str) -> Vec<Paragraph> {
    let parsed = parse(html);
    if !parsed.iter().any(ContentParagraph::has_text) {
        return vec![Paragraph::with_text(NO_CONTENT)];
    }

    parsed
        .into_iter()
        .map(|cp| {
            let mut p = Paragraph::new().aligned(cp.alignment);
            for inline in cp.inlines {
                match inline {
                    Inline::Text(t) => p.add_run(TextRun::new(t)),
                    Inline::Bold(t) => p.add_run(TextRun::bold(t)),
                    Inline::LineBreak => p.add_line_break(),
                }
            }
            p
        })
        .collect()
}

/// Plain text of editor content, paragraphs separated by blank lines.
pub fn to_plain_text(html: &str) -> String {
    parse(html)
        .iter()
        .map(ContentParagraph::plain_text)
        .map(|t| t.trim().to_string())
        .filter(|t| !t.is_empty())
        .collect::<Vec<_>>()
        .join("\n\n")
}

fn collapse_whitespace(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut in_space = false;
    for ch in text.chars() {
        if ch.is_ascii_whitespace() {
            if !in_space {
                out.push(' ');
            }
            in_space = true;
        } else {
            out.push(ch);
            in_space = false;
        }
    }
    out
}

/// Decode the character references the editor emits.
pub fn decode_entities(text: &str) -> String {
    if !text.contains('&') {
        return text.to_string();
    }

    let mut out = String::with_capacity(text.len());
    let mut rest = text;
    while let Some(amp) = rest.find('&') {
        out.push_str(&rest[..amp]);
        let tail = &rest[amp..];
        let decoded = tail.find(';').filter(|&semi| semi <= 10).and_then(|semi| {
            let name = &tail[1..semi];
            let ch = match name {
                "nbsp" => Some(' '),
                "amp" => Some('&'),
                "lt" => Some('<'),
                "gt" => Some('>'),
                "quot" => Some('"'),
                "apos" => Some('\''),
                _ => name
                    .strip_prefix("#x")
                    .or_else(|| name.strip_prefix("#X"))
                    .and_then(|hex| u32::from_str_radix(hex, 16).ok())
                    .or_else(|| name.strip_prefix('#').and_then(|dec| dec.parse().ok()))
                    .and_then(char::from_u32),
            };
            ch.map(|c| (c, semi))
        });
        match decoded {
            Some((ch, semi)) => {
                out.push(ch);
                rest = &tail[semi + 1..];
            }
            None => {
                out.push('&');
                rest = &tail[1..];
            }
        }
    }
    out.push_str(rest);
    out
}
