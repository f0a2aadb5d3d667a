use ratatui::{
    layout::{Constraint, Layout, Rect},
    style::Style,
    widgets::Paragraph,
    Frame,
};

use super::panel_block;
use super::widgets::{truncate_with_ellipsis, HistoryGraph};
use crate::app::App;

/// One small graph per core, for the first `max_core_graphs` cores.
pub fn draw(frame: &mut Frame, app: &App, area: Rect) {
    let theme = &app.theme;
    let block = panel_block(" Cores ", theme.cpu, theme);
    let inner = block.inner(area);
    frame.render_widget(block, area);

    let usage = &app.snapshot.cpu.core_usage;
    let shown = usage
        .len()
        .min(app.histories.cores.len())
        .min(app.config.max_core_graphs);
    if shown == 0 {
        frame.render_widget(Paragraph::new("No per-core data").style(theme.dim()), inner);
        return;
    }

    let columns = Layout::horizontal(vec![Constraint::Ratio(1, shown as u32); shown])
        .spacing(1)
        .split(inner);

    for (i, column) in columns.iter().enumerate() {
        let [label_row, graph_area] =
            Layout::vertical([Constraint::Length(1), Constraint::Min(0)]).areas(*column);
        let label = format!("Core {}: {:.1}%", i, usage[i]);
        frame.render_widget(
            Paragraph::new(truncate_with_ellipsis(&label, usize::from(column.width)))
                .style(theme.label(theme.cpu)),
            label_row,
        );
        frame.render_widget(
            HistoryGraph::new(&app.histories.cores[i]).style(Style::default().fg(theme.graph)),
            graph_area,
        );
    }
}
