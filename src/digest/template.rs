// src/digest/template.rs
//! Post template: literal text with `{Title}`, `{Text}`, `{Preview}`, `{Link}` and `{Ups}`
//! placeholders. Parsed once, rendered per post.

use once_cell::sync::OnceCell;
use regex::Regex;

use crate::digest::FilteredPost;
use crate::error::RenderError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Field {
    Title,
    Text,
    Preview,
    Link,
    Ups,
}

impl Field {
    fn parse(name: &str) -> Option<Self> {
        match name {
            "Title" => Some(Self::Title),
            "Text" => Some(Self::Text),
            "Preview" => Some(Self::Preview),
            "Link" => Some(Self::Link),
            "Ups" => Some(Self::Ups),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Segment {
    Literal(String),
    Field(Field),
}

#[derive(Debug, Clone)]
pub struct PostTemplate {
    segments: Vec<Segment>,
    max_text_chars: usize,
}

impl PostTemplate {
    pub fn new(src: &str) -> Result<Self, RenderError> {
        let mut segments = Vec::new();
        let mut rest = src;
        let mut offset = 0usize;

        while let Some(open) = rest.find('{') {
            if open > 0 {
                segments.push(Segment::Literal(rest[..open].to_string()));
            }
            let after = &rest[open + 1..];
            let close = after
                .find('}')
                .ok_or(RenderError::Unclosed(offset + open))?;
            let name = after[..close].trim();
            let field =
                Field::parse(name).ok_or_else(|| RenderError::UnknownField(name.to_string()))?;
            segments.push(Segment::Field(field));

            let consumed = open + 1 + close + 1;
            offset += consumed;
            rest = &rest[consumed..];
        }
        if !rest.is_empty() {
            segments.push(Segment::Literal(rest.to_string()));
        }

        Ok(Self {
            segments,
            max_text_chars: usize::MAX,
        })
    }

    /// Cap `{Text}` to `n` characters (an ellipsis marks the cut).
    pub fn with_text_limit(mut self, n: usize) -> Self {
        self.max_text_chars = n.max(1);
        self
    }

    /// Render one post. Field values are entity-decoded (before the text cap is applied) and
    /// blank-line runs collapsed.
    pub fn render(&self, post: &FilteredPost) -> Result<String, RenderError> {
        let mut out = String::new();
        for seg in &self.segments {
            match seg {
                Segment::Literal(s) => out.push_str(s),
                Segment::Field(Field::Title) => out.push_str(&decode(&post.title)),
                Segment::Field(Field::Text) => {
                    let text = decode(post.body_text.as_deref().unwrap_or_default());
                    out.push_str(&truncate_chars(&text, self.max_text_chars));
                }
                Segment::Field(Field::Preview) => {
                    out.push_str(&decode(post.preview_url.as_deref().unwrap_or_default()))
                }
                Segment::Field(Field::Link) => out.push_str(&decode(&post.link)),
                Segment::Field(Field::Ups) => out.push_str(&post.score.to_string()),
            }
        }

        let text = collapse_blank_lines(&out);
        if text.is_empty() {
            return Err(RenderError::EmptyOutput);
        }
        Ok(text)
    }
}

fn decode(s: &str) -> std::borrow::Cow<'_, str> {
    html_escape::decode_html_entities(s)
}

fn truncate_chars(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        return s.to_string();
    }
    let mut cut: String = s.chars().take(max).collect();
    cut.push('…');
    cut
}

fn collapse_blank_lines(s: &str) -> String {
    static RE_BLANKS: OnceCell<Regex> = OnceCell::new();
    let re = RE_BLANKS.get_or_init(|| Regex::new(r"\n[ \t]*(?:\n[ \t]*)+\n").unwrap());
    re.replace_all(s.trim(), "\n\n").to_string()
}
