//! Splitting author text into literal and `$…$` math spans.

use crate::render::MathRenderer;
use regex::Regex;

lazy_static::lazy_static! {
    static ref MATH_SPAN: Regex = Regex::new(r"\$[^$]+\$").expect("math span pattern is valid");
}

/// Shown in place of a math span the renderer rejects.
pub const INVALID_MATH_MARKER: &str = "[Invalid LaTeX]";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Segment {
    Text(String),
    Math(String),
}

/// Split `input` into literal text and math spans. A `$` with no partner,
/// and the empty pair `$$`, stay literal.
pub fn segment(input: &str) -> Vec<Segment> {
    let mut segments = Vec::new();
    let mut last = 0;

    for m in MATH_SPAN.find_iter(input) {
        if m.start() > last {
            segments.push(Segment::Text(input[last..m.start()].to_string()));
        }
        let inner = &input[m.start() + 1..m.end() - 1];
        segments.push(Segment::Math(inner.to_string()));
        last = m.end();
    }

    if last < input.len() {
        segments.push(Segment::Text(input[last..].to_string()));
    }

    segments
}

/// Inverse of [`segment`]: math spans are wrapped back in `$…$`.
pub fn join(segments: &[Segment]) -> String {
    let mut out = String::new();
    for seg in segments {
        match seg {
            Segment::Text(text) => out.push_str(text),
            Segment::Math(latex) => {
                out.push('$');
                out.push_str(latex);
                out.push('$');
            }
        }
    }
    out
}

pub fn has_math(input: &str) -> bool {
    MATH_SPAN.is_match(input)
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Rendered {
    Text(String),
    Math(String),
    /// The span failed to typeset; carries the original LaTeX.
    Invalid(String),
}

impl Rendered {
    pub fn display(&self) -> &str {
        match self {
            Rendered::Text(text) | Rendered::Math(text) => text,
            Rendered::Invalid(_) => INVALID_MATH_MARKER,
        }
    }
}

/// Typeset every math span. A failure only affects its own span.
pub fn render_mixed(input: &str, renderer: &dyn MathRenderer) -> Vec<Rendered> {
    segment(input)
        .into_iter()
        .map(|seg| match seg {
            Segment::Text(text) => Rendered::Text(text),
            Segment::Math(latex) => match renderer.render_inline(&latex) {
                Ok(out) => Rendered::Math(out),
                Err(_) => Rendered::Invalid(latex),
            },
        })
        .collect()
}

/// Plain-string rendering of mixed text, for places without styling.
pub fn render_mixed_plain(input: &str, renderer: &dyn MathRenderer) -> String {
    render_mixed(input, renderer)
        .iter()
        .map(Rendered::display)
        .collect()
}

/// Insert `$latex$` at a char cursor. Returns the new text and the cursor
/// placed just after the closing `$`.
pub fn insert_math_at(text: &str, cursor: usize, latex: &str) -> (String, usize) {
    let byte_idx = text
        .char_indices()
        .nth(cursor)
        .map(|(i, _)| i)
        .unwrap_or(text.len());
    let cursor = text[..byte_idx].chars().count();

    let mut out = String::with_capacity(text.len() + latex.len() + 2);
    out.push_str(&text[..byte_idx]);
    out.push('$');
    out.push_str(latex);
    out.push('$');
    out.push_str(&text[byte_idx..]);

    (out, cursor + latex.chars().count() + 2)
}
