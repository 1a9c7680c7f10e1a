use crate::render::MathRenderer;
use crate::segment::{Rendered, render_mixed};
use ratatui::{
    style::{Color, Modifier, Style},
    text::{Line, Span},
};

fn math_style() -> Style {
    Style::default()
        .fg(Color::LightMagenta)
        .add_modifier(Modifier::ITALIC)
}

fn invalid_style() -> Style {
    Style::default().fg(Color::Red).add_modifier(Modifier::BOLD)
}

/// Spans for one line of mixed text. Math is typeset and styled; a span
/// the renderer rejects shows the invalid marker in red.
pub fn mixed_spans(text: &str, renderer: &dyn MathRenderer) -> Vec<Span<'static>> {
    render_mixed(text, renderer)
        .into_iter()
        .map(|piece| match piece {
            Rendered::Text(text) => Span::from(text),
            Rendered::Math(out) => Span::styled(out, math_style()),
            invalid @ Rendered::Invalid(_) => {
                Span::styled(invalid.display().to_string(), invalid_style())
            }
        })
        .collect()
}

/// Render mixed text to ratatui lines. Newlines split lines before
/// segmenting, so a math span never crosses a line.
pub fn render_mixed_text(text: &str, renderer: &dyn MathRenderer) -> Vec<Line<'static>> {
    text.lines()
        .map(|line| Line::from(mixed_spans(line, renderer)))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::render::UnicodeRenderer;
    use crate::segment::INVALID_MATH_MARKER;

    fn plain(line: &Line) -> String {
        line.spans.iter().map(|s| s.content.as_ref()).collect()
    }

    #[test]
    fn test_math_spans_are_styled() {
        let renderer = UnicodeRenderer::new();
        let spans = mixed_spans("Solve $x^2$ now", &renderer);
        assert_eq!(spans.len(), 3);
        assert_eq!(spans[1].content, "x²");
        assert_eq!(spans[1].style, math_style());
        assert_eq!(spans[0].style, Style::default());
    }

    #[test]
    fn test_invalid_math_is_marked() {
        let renderer = UnicodeRenderer::new();
        let spans = mixed_spans("a $\\frac{1$", &renderer);
        assert_eq!(spans[1].content, INVALID_MATH_MARKER);
        assert_eq!(spans[1].style, invalid_style());
    }

    #[test]
    fn test_multiline() {
        let renderer = UnicodeRenderer::new();
        let lines = render_mixed_text("first $a$\nsecond", &renderer);
        assert_eq!(lines.len(), 2);
        assert_eq!(plain(&lines[0]), "first a");
        assert_eq!(plain(&lines[1]), "second");
    }
}
