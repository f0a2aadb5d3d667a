use ratatui::{
    layout::{Constraint, Layout, Rect},
    style::Style,
    text::{Line, Span},
    widgets::Paragraph,
    Frame,
};

use super::panel_block;
use super::widgets::{HistoryGraph, UsageBar};
use crate::app::App;
use crate::system::format_gib;

pub fn draw(frame: &mut Frame, app: &App, area: Rect) {
    let theme = &app.theme;
    let block = panel_block(" Memory ", theme.memory, theme);
    let inner = block.inner(area);
    frame.render_widget(block, area);

    let [mem_row, swap_row, bar_row, graph_area] = Layout::vertical([
        Constraint::Length(1),
        Constraint::Length(1),
        Constraint::Length(1),
        Constraint::Min(0),
    ])
    .areas(inner);

    let mem = &app.snapshot.memory;
    let line = Line::from(vec![
        Span::styled("Memory: ", theme.label(theme.memory)),
        Span::styled(
            format!(
                "{}/{} GB ({:.1}%)",
                format_gib(mem.used),
                format_gib(mem.total),
                mem.used_percent
            ),
            theme.text(),
        ),
    ]);
    frame.render_widget(Paragraph::new(line), mem_row);

    let swap = Line::from(vec![
        Span::styled("Swap: ", theme.label(theme.memory)),
        Span::styled(
            format!("{}/{} GB", format_gib(mem.swap_used), format_gib(mem.swap_total)),
            theme.dim(),
        ),
    ]);
    frame.render_widget(Paragraph::new(swap), swap_row);

    frame.render_widget(
        UsageBar::new(mem.used_percent)
            .filled_style(Style::default().fg(theme.bar))
            .empty_style(Style::default().fg(theme.bar_empty)),
        bar_row,
    );
    frame.render_widget(
        HistoryGraph::new(&app.histories.memory).style(Style::default().fg(theme.graph)),
        graph_area,
    );
}
