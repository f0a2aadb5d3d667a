use ratatui::{
    layout::{Constraint, Layout, Rect},
    style::Style,
    text::{Line, Span},
    widgets::Paragraph,
    Frame,
};

use super::panel_block;
use super::widgets::{truncate_with_ellipsis, HistoryGraph, UsageBar};
use crate::app::App;

/// CPU model strings are cut to this many columns
pub const MODEL_WIDTH: usize = 40;

pub fn draw(frame: &mut Frame, app: &App, area: Rect) {
    let theme = &app.theme;
    let block = panel_block(" CPU ", theme.cpu, theme);
    let inner = block.inner(area);
    frame.render_widget(block, area);

    let [model_row, usage_row, bar_row, graph_area] = Layout::vertical([
        Constraint::Length(1),
        Constraint::Length(1),
        Constraint::Length(1),
        Constraint::Min(0),
    ])
    .areas(inner);

    let hw = &app.hardware;
    let model = truncate_with_ellipsis(hw.cpu_model_or_unknown(), MODEL_WIDTH);
    let mut spans = vec![Span::styled(model, theme.text())];
    if hw.logical_cores > 0 {
        let detail = match hw.cpu_mhz {
            Some(mhz) => format!(" ({} threads @ {:.0} MHz)", hw.logical_cores, mhz),
            None => format!(" ({} threads)", hw.logical_cores),
        };
        spans.push(Span::styled(detail, theme.dim()));
    }
    frame.render_widget(Paragraph::new(Line::from(spans)), model_row);

    let usage = app.snapshot.cpu.total_usage;
    let line = Line::from(vec![
        Span::styled("Total CPU Usage: ", theme.label(theme.cpu)),
        Span::styled(format!("{:.1}%", usage), theme.text()),
    ]);
    frame.render_widget(Paragraph::new(line), usage_row);

    frame.render_widget(
        UsageBar::new(usage)
            .filled_style(Style::default().fg(theme.bar))
            .empty_style(Style::default().fg(theme.bar_empty)),
        bar_row,
    );
    frame.render_widget(
        HistoryGraph::new(&app.histories.cpu).style(Style::default().fg(theme.graph)),
        graph_area,
    );
}
