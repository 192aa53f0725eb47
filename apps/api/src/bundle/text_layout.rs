//! Letter layout: greedy word wrap and top-to-bottom pagination.
//!
//! Geometry mirrors a plain A4 letter: 15 mm margins, Helvetica 11 pt,
//! 5 mm line pitch. The cursor is measured from the top of the page and a
//! new page starts whenever the next line would cross the bottom margin.

use crate::bundle::font_metrics::FontMetricTable;

/// Points per millimetre.
pub const MM: f32 = 72.0 / 25.4;
pub const A4_WIDTH: f32 = 595.28;
pub const A4_HEIGHT: f32 = 841.89;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LetterLayout {
    pub page_width: f32,
    pub page_height: f32,
    pub margin: f32,
    pub font_size: f32,
    pub line_height: f32,
}

impl Default for LetterLayout {
    fn default() -> Self {
        Self {
            page_width: A4_WIDTH,
            page_height: A4_HEIGHT,
            margin: 15.0 * MM,
            font_size: 11.0,
            line_height: 5.0 * MM,
        }
    }
}

impl LetterLayout {
    pub fn printable_width(&self) -> f32 {
        self.page_width - 2.0 * self.margin
    }
}

/// A line placed on a page, in PDF user space (origin bottom-left).
#[derive(Debug, Clone, PartialEq)]
pub struct PlacedLine {
    pub text: String,
    pub x: f32,
    /// Baseline.
    pub y: f32,
}

/// Wraps and paginates `text`. Always returns at least one page.
pub fn layout_letter(
    text: &str,
    metrics: &FontMetricTable,
    layout: &LetterLayout,
) -> Vec<Vec<PlacedLine>> {
    let lines = wrap_text(text, metrics, layout.font_size, layout.printable_width());
    paginate(lines, layout)
}

/// Splits `text` into paragraphs on newlines and greedily wraps each one to
/// `max_width` points. A blank paragraph becomes one empty line.
pub fn wrap_text(
    text: &str,
    metrics: &FontMetricTable,
    font_size: f32,
    max_width: f32,
) -> Vec<String> {
    let normalized = text.replace("\r\n", "\n");
    let mut lines = Vec::new();
    for paragraph in normalized.split('\n') {
        wrap_paragraph(paragraph, metrics, font_size, max_width, &mut lines);
    }
    lines
}

fn wrap_paragraph(
    paragraph: &str,
    metrics: &FontMetricTable,
    font_size: f32,
    max_width: f32,
    out: &mut Vec<String>,
) {
    let words: Vec<&str> = paragraph.split_whitespace().collect();
    if words.is_empty() {
        out.push(String::new());
        return;
    }

    let space_w = metrics.space_width * font_size;
    let mut current = String::new();
    let mut current_width = 0.0_f32;

    for word in words {
        let word_w = metrics.measure_str(word) * font_size;

        if word_w > max_width {
            // Flush, then hard-break the word; its tail carries on as the current line.
            if !current.is_empty() {
                out.push(std::mem::take(&mut current));
            }
            let mut pieces = break_word(word, metrics, font_size, max_width);
            let tail = pieces.pop().unwrap_or_default();
            out.extend(pieces);
            current_width = metrics.measure_str(&tail) * font_size;
            current = tail;
            continue;
        }

        if current.is_empty() {
            current.push_str(word);
            current_width = word_w;
        } else if current_width + space_w + word_w > max_width {
            out.push(std::mem::replace(&mut current, word.to_string()));
            current_width = word_w;
        } else {
            current.push(' ');
            current.push_str(word);
            current_width += space_w + word_w;
        }
    }
    out.push(current);
}

/// Breaks a single over-wide word into chunks that each fit `max_width`.
/// Every chunk holds at least one char.
fn break_word(word: &str, metrics: &FontMetricTable, font_size: f32, max_width: f32) -> Vec<String> {
    let mut pieces = Vec::new();
    let mut piece = String::new();
    let mut width = 0.0_f32;
    for c in word.chars() {
        let w = metrics.char_width(c) * font_size;
        if !piece.is_empty() && width + w > max_width {
            pieces.push(std::mem::take(&mut piece));
            width = 0.0;
        }
        piece.push(c);
        width += w;
    }
    if !piece.is_empty() {
        pieces.push(piece);
    }
    pieces
}

/// Lays lines top to bottom at a fixed pitch, starting a new page when the
/// next line would pass `page_height - margin`.
pub fn paginate(lines: Vec<String>, layout: &LetterLayout) -> Vec<Vec<PlacedLine>> {
    let mut pages: Vec<Vec<PlacedLine>> = vec![Vec::new()];
    let mut cursor = layout.margin;

    for text in lines {
        if cursor + layout.line_height > layout.page_height - layout.margin {
            pages.push(Vec::new());
            cursor = layout.margin;
        }
        if let Some(page) = pages.last_mut() {
            page.push(PlacedLine {
                text,
                x: layout.margin,
                y: layout.page_height - cursor,
            });
        }
        cursor += layout.line_height;
    }
    pages
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bundle::font_metrics::HELVETICA;

    fn layout() -> LetterLayout {
        LetterLayout::default()
    }

    fn lines(n: usize) -> Vec<String> {
        (0..n).map(|i| format!("line {i}")).collect()
    }

    #[test]
    fn test_short_text_single_line() {
        let out = wrap_text("Dear Hiring Manager,", &HELVETICA, 11.0, layout().printable_width());
        assert_eq!(out, vec!["Dear Hiring Manager,"]);
    }

    #[test]
    fn test_newlines_and_blank_paragraphs_preserved() {
        let out = wrap_text("Dear Team,\r\n\nThanks.", &HELVETICA, 11.0, 500.0);
        assert_eq!(out, vec!["Dear Team,", "", "Thanks."]);
    }

    #[test]
    fn test_wrapped_lines_fit_width() {
        let text = "Experienced engineer with a track record of shipping reliable services. ".repeat(20);
        let max = layout().printable_width();
        let out = wrap_text(&text, &HELVETICA, 11.0, max);
        assert!(out.len() > 1);
        for line in &out {
            assert!(HELVETICA.measure_str(line) * 11.0 <= max + 1e-3, "too wide: {line}");
        }
        // No words lost or reordered.
        let rejoined = out.join(" ");
        assert_eq!(
            rejoined.split_whitespace().collect::<Vec<_>>(),
            text.split_whitespace().collect::<Vec<_>>()
        );
    }

    #[test]
    fn test_overlong_word_is_broken() {
        let word = "x".repeat(300);
        let out = wrap_text(&format!("see {word} end"), &HELVETICA, 11.0, 100.0);
        assert_eq!(out.first().map(String::as_str), Some("see"));
        for line in &out {
            assert!(HELVETICA.measure_str(line) * 11.0 <= 100.0 + 1e-3);
        }
        assert_eq!(out.concat().matches('x').count(), 300);
        assert!(out.last().unwrap().ends_with("end"));
    }

    #[test]
    fn test_empty_text_is_one_blank_page() {
        let pages = layout_letter("", &HELVETICA, &layout());
        assert_eq!(pages.len(), 1);
        assert_eq!(pages[0].len(), 1);
        assert!(pages[0][0].text.is_empty());
    }

    #[test]
    fn test_page_break_after_53_lines() {
        assert_eq!(paginate(lines(53), &layout()).len(), 1);
        let pages = paginate(lines(54), &layout());
        assert_eq!(pages.len(), 2);
        assert_eq!(pages[1].len(), 1);
        assert_eq!(pages[1][0].text, "line 53");
    }

    #[test]
    fn test_cursor_resets_to_top_margin() {
        let l = layout();
        let pages = paginate(lines(60), &l);
        let top = l.page_height - l.margin;
        assert!((pages[0][0].y - top).abs() < 1e-3);
        assert!((pages[1][0].y - top).abs() < 1e-3);
        for page in &pages {
            for line in page {
                assert!(line.y >= l.margin, "baseline below bottom margin: {}", line.y);
                assert_eq!(line.x, l.margin);
            }
        }
    }
}
