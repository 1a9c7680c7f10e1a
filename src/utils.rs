use unicode_width::UnicodeWidthChar;

pub mod input;
pub mod math_text;

/// Shorten to at most `max_len` chars, ending in `...` when cut.
pub fn truncate_string(s: &str, max_len: usize) -> String {
    if s.chars().count() <= max_len {
        s.to_string()
    } else {
        let kept: String = s.chars().take(max_len.saturating_sub(3)).collect();
        format!("{}...", kept)
    }
}

/// One visual line after wrapping: its chars and the char range it covers.
struct WrappedLine {
    chars: Vec<char>,
    start: usize,
    end: usize,
}

/// Wrap like ratatui `Wrap { trim: true }` at `max_width` display columns,
/// breaking at explicit newlines as well. Indices are char offsets.
fn simulate_wrapped_lines(text: &str, max_width: usize) -> Vec<WrappedLine> {
    let mut lines = Vec::new();
    let mut current: Vec<char> = Vec::new();
    let mut current_width = 0;
    let mut line_start = 0;
    let mut total = 0;

    for (idx, ch) in text.chars().enumerate() {
        total = idx + 1;
        if ch == '\n' {
            lines.push(WrappedLine {
                chars: std::mem::take(&mut current),
                start: line_start,
                end: idx,
            });
            current_width = 0;
            line_start = idx + 1;
            continue;
        }

        let width = ch.width().unwrap_or(1);
        if current_width + width > max_width && current_width > 0 {
            lines.push(WrappedLine {
                chars: std::mem::take(&mut current),
                start: line_start,
                end: idx,
            });
            current_width = 0;
            line_start = idx;
        }
        current.push(ch);
        current_width += width;
    }

    if !current.is_empty() || text.ends_with('\n') {
        lines.push(WrappedLine {
            chars: current,
            start: line_start,
            end: total,
        });
    }

    for line in &mut lines {
        while line.chars.last().is_some_and(|c| c.is_whitespace()) {
            line.chars.pop();
        }
    }
    lines
}

fn display_width(chars: &[char]) -> usize {
    chars.iter().map(|c| c.width().unwrap_or(1)).sum()
}

/// Visual `(line, column)` of a char cursor inside wrapped text. The column
/// is in display cells, so wide characters count twice.
pub fn calculate_wrapped_cursor_position(
    text: &str,
    cursor_index: usize,
    max_width: usize,
) -> (usize, usize) {
    if text.is_empty() || cursor_index == 0 {
        return (0, 0);
    }

    let wrapped_lines = simulate_wrapped_lines(text, max_width);

    for (line_idx, line) in wrapped_lines.iter().enumerate() {
        if cursor_index >= line.start && cursor_index <= line.end {
            let offset = (cursor_index - line.start).min(line.chars.len());
            return (line_idx, display_width(&line.chars[..offset]));
        }
    }

    match wrapped_lines.last() {
        Some(last) => (wrapped_lines.len() - 1, display_width(&last.chars)),
        None => (0, 0),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn line_texts(text: &str, width: usize) -> Vec<String> {
        simulate_wrapped_lines(text, width)
            .into_iter()
            .map(|l| l.chars.into_iter().collect())
            .collect()
    }

    #[test]
    fn test_truncate_string_no_truncation() {
        assert_eq!(truncate_string("Short string", 20), "Short string");
    }

    #[test]
    fn test_truncate_string_with_truncation() {
        let result = truncate_string("This is a very long string that should be truncated", 20);
        assert_eq!(result, "This is a very lo...");
        assert_eq!(result.chars().count(), 20);
    }

    #[test]
    fn test_truncate_string_multibyte() {
        assert_eq!(truncate_string("넓이는 πr² 입니다 그리고 더", 8), "넓이는 π...");
    }

    #[test]
    fn test_truncate_string_empty() {
        assert_eq!(truncate_string("", 20), "");
    }

    #[test]
    fn test_cursor_empty_text() {
        assert_eq!(calculate_wrapped_cursor_position("", 0, 10), (0, 0));
    }

    #[test]
    fn test_cursor_single_line() {
        assert_eq!(calculate_wrapped_cursor_position("Hello", 3, 10), (0, 3));
    }

    #[test]
    fn test_cursor_wraps_to_second_line() {
        let text = "This is a long line that should wrap";
        assert_eq!(calculate_wrapped_cursor_position(text, 15, 10), (1, 5));
    }

    #[test]
    fn test_cursor_beyond_text() {
        assert_eq!(calculate_wrapped_cursor_position("Hi", 10, 10), (0, 2));
    }

    #[test]
    fn test_cursor_at_exact_wrap_boundary() {
        let text = "0123456789A";
        assert_eq!(calculate_wrapped_cursor_position(text, 10, 10), (0, 10));
        assert_eq!(calculate_wrapped_cursor_position(text, 11, 10), (1, 1));
    }

    #[test]
    fn test_cursor_in_trimmed_space() {
        // The trailing space is trimmed, so the cursor sits after "d"
        assert_eq!(calculate_wrapped_cursor_position("hello world ", 11, 10), (1, 1));
    }

    #[test]
    fn test_wide_chars_count_two_columns() {
        assert_eq!(calculate_wrapped_cursor_position("가나다", 2, 10), (0, 4));
        assert_eq!(line_texts("가나다", 4), vec!["가나", "다"]);
    }

    #[test]
    fn test_explicit_newlines() {
        assert_eq!(line_texts("Line 1\nLine 2\nLine 3", 20), vec!["Line 1", "Line 2", "Line 3"]);
        assert_eq!(calculate_wrapped_cursor_position("Line 1\nLine 2", 8, 20), (1, 1));
    }
}
