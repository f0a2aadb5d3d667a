//! Usage bars and history graphs drawn cell by cell.

use ratatui::{buffer::Buffer, layout::Rect, style::Style, widgets::Widget};
use unicode_width::{UnicodeWidthChar, UnicodeWidthStr};

use crate::history::HistoryBuffer;

pub const BAR_FILLED: &str = "█";
pub const BAR_EMPTY: &str = "░";
pub const GRAPH_CELL: &str = "█";

/// Number of filled cells for a bar `width` cells wide.
pub fn bar_fill(width: u16, percent: f32) -> u16 {
    if !percent.is_finite() {
        return 0;
    }
    let width_f = f32::from(width);
    (width_f * percent / 100.0).round().clamp(0.0, width_f) as u16
}

/// Column heights for a bar chart `height` rows tall.
///
/// Values are scaled against the largest one; a max of zero scales by 1 so
/// an all-zero history yields no bars.
pub fn graph_heights(values: &[f32], height: u16) -> Vec<u16> {
    let max = values.iter().copied().fold(0.0f32, f32::max);
    let max = if max > 0.0 { max } else { 1.0 };
    values
        .iter()
        .map(|&v| {
            if !v.is_finite() || v <= 0.0 {
                return 0;
            }
            ((v / max) * f32::from(height)).floor().min(f32::from(height)) as u16
        })
        .collect()
}

/// Shorten `s` to at most `max_width` columns, ending in "..." when cut.
pub fn truncate_with_ellipsis(s: &str, max_width: usize) -> String {
    const ELLIPSIS: &str = "...";

    if s.width() <= max_width {
        return s.to_string();
    }
    if max_width <= ELLIPSIS.len() {
        return ".".repeat(max_width);
    }

    let budget = max_width - ELLIPSIS.len();
    let mut result = String::new();
    let mut current_width = 0;
    for c in s.chars() {
        let char_width = c.width().unwrap_or(0);
        if current_width + char_width > budget {
            break;
        }
        result.push(c);
        current_width += char_width;
    }
    result.push_str(ELLIPSIS);
    result
}

/// Horizontal usage bar filling the whole area width on its first row
pub struct UsageBar {
    percent: f32,
    filled_style: Style,
    empty_style: Style,
}

impl UsageBar {
    pub fn new(percent: f32) -> Self {
        Self {
            percent,
            filled_style: Style::default(),
            empty_style: Style::default(),
        }
    }

    pub fn filled_style(mut self, style: Style) -> Self {
        self.filled_style = style;
        self
    }

    pub fn empty_style(mut self, style: Style) -> Self {
        self.empty_style = style;
        self
    }
}

impl Widget for UsageBar {
    fn render(self, area: Rect, buf: &mut Buffer) {
        if area.is_empty() {
            return;
        }
        let filled = bar_fill(area.width, self.percent);
        for i in 0..area.width {
            let (symbol, style) = if i < filled {
                (BAR_FILLED, self.filled_style)
            } else {
                (BAR_EMPTY, self.empty_style)
            };
            if let Some(cell) = buf.cell_mut((area.x + i, area.y)) {
                cell.set_symbol(symbol).set_style(style);
            }
        }
    }
}

/// Bar chart of a history buffer, newest sample on the right.
///
/// Only the most recent `area.width` samples are drawn, scaled against the
/// maximum of the whole buffer.
pub struct HistoryGraph<'a> {
    history: &'a HistoryBuffer,
    style: Style,
}

impl<'a> HistoryGraph<'a> {
    pub fn new(history: &'a HistoryBuffer) -> Self {
        Self {
            history,
            style: Style::default(),
        }
    }

    pub fn style(mut self, style: Style) -> Self {
        self.style = style;
        self
    }
}

impl Widget for HistoryGraph<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        if area.is_empty() {
            return;
        }
        let heights = graph_heights(&self.history.to_vec(), area.height);
        let visible = heights.len().min(usize::from(area.width));
        let start_x = area.x + area.width - visible as u16;
        let bottom = area.y + area.height - 1;

        for (i, &bar) in heights[heights.len() - visible..].iter().enumerate() {
            let x = start_x + i as u16;
            for j in 0..bar {
                if let Some(cell) = buf.cell_mut((x, bottom - j)) {
                    cell.set_symbol(GRAPH_CELL).set_style(self.style);
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(buf: &Buffer, y: u16) -> String {
        (buf.area.x..buf.area.x + buf.area.width)
            .map(|x| buf[(x, y)].symbol().to_string())
            .collect()
    }

    #[test]
    fn test_bar_fill() {
        assert_eq!(bar_fill(25, 40.0), 10);
        assert_eq!(bar_fill(10, 0.0), 0);
        assert_eq!(bar_fill(10, 100.0), 10);
        assert_eq!(bar_fill(10, 250.0), 10);
        assert_eq!(bar_fill(10, -5.0), 0);
        assert_eq!(bar_fill(10, f32::NAN), 0);
        assert_eq!(bar_fill(3, 50.0), 2);
    }

    #[test]
    fn test_graph_heights_scaling() {
        assert_eq!(graph_heights(&[0.0, 0.0, 50.0, 100.0], 10), vec![0, 0, 5, 10]);
        assert_eq!(graph_heights(&[0.0; 8], 10), vec![0; 8]);
        assert!(graph_heights(&[], 10).is_empty());
        assert_eq!(graph_heights(&[0.5, 1.0], 4), vec![2, 4]);
    }

    #[test]
    fn test_truncate_with_ellipsis() {
        assert_eq!(truncate_with_ellipsis("bash", 20), "bash");
        assert_eq!(
            truncate_with_ellipsis("Intel(R) Core(TM) i7-9750H CPU @ 2.60GHz", 20),
            "Intel(R) Core(TM)..."
        );
        assert_eq!(truncate_with_ellipsis("abcdef", 3), "...");
        assert_eq!(truncate_with_ellipsis("abcdef", 0), "");
        let wide = truncate_with_ellipsis("日本語のプロセス名", 9);
        assert!(wide.width() <= 9);
        assert!(wide.ends_with("..."));
    }

    #[test]
    fn test_usage_bar_render() {
        let area = Rect::new(0, 0, 25, 1);
        let mut buf = Buffer::empty(area);
        UsageBar::new(40.0).render(area, &mut buf);
        let line = row(&buf, 0);
        assert_eq!(line.matches(BAR_FILLED).count(), 10);
        assert_eq!(line.matches(BAR_EMPTY).count(), 15);
        assert!(line.starts_with(BAR_FILLED));
    }

    #[test]
    fn test_history_graph_render() {
        let mut history = HistoryBuffer::new(4);
        for v in [0.0, 0.0, 50.0, 100.0] {
            history.push(v);
        }
        let area = Rect::new(0, 0, 4, 10);
        let mut buf = Buffer::empty(area);
        HistoryGraph::new(&history).render(area, &mut buf);

        assert_eq!(row(&buf, 0), "   █");
        assert_eq!(row(&buf, 4), "   █");
        assert_eq!(row(&buf, 5), "  ██");
        assert_eq!(row(&buf, 9), "  ██");
    }

    #[test]
    fn test_history_graph_all_zero_draws_nothing() {
        let history = HistoryBuffer::prefilled(30);
        let area = Rect::new(0, 0, 20, 5);
        let mut buf = Buffer::empty(area);
        HistoryGraph::new(&history).render(area, &mut buf);
        for y in 0..5 {
            assert_eq!(row(&buf, y).trim(), "");
        }
    }

    #[test]
    fn test_history_graph_keeps_newest_when_narrow() {
        let mut history = HistoryBuffer::new(10);
        for v in [100.0, 0.0, 0.0, 0.0, 0.0, 0.0, 0.0, 0.0, 10.0, 20.0] {
            history.push(v);
        }
        let area = Rect::new(0, 0, 2, 10);
        let mut buf = Buffer::empty(area);
        HistoryGraph::new(&history).render(area, &mut buf);
        // Scaled against the off-screen 100: 10 -> 1 row, 20 -> 2 rows
        assert_eq!(row(&buf, 9), "██");
        assert_eq!(row(&buf, 8), " █");
        assert_eq!(row(&buf, 7), "  ");
    }
}
