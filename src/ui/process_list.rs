use ratatui::{
    layout::{Constraint, Rect},
    style::Modifier,
    widgets::{Cell, Row, Table},
    Frame,
};

use super::panel_block;
use super::widgets::truncate_with_ellipsis;
use crate::app::App;
use crate::system::format_bytes;

/// Process names are cut to this many columns
pub const NAME_WIDTH: usize = 20;

pub fn draw(frame: &mut Frame, app: &App, area: Rect) {
    let theme = &app.theme;
    let block = panel_block(" Top Processes ", theme.processes, theme);

    let header = Row::new(["PID", "CPU%", "MEM", "NAME"])
        .style(theme.label(theme.processes).add_modifier(Modifier::BOLD));

    let visible = usize::from(area.height.saturating_sub(3));
    let rows: Vec<Row> = app
        .snapshot
        .processes
        .iter()
        .take(visible)
        .map(|p| {
            Row::new(vec![
                Cell::from(p.pid.to_string()),
                Cell::from(format!("{:.1}", p.cpu_percent)),
                Cell::from(format_bytes(p.rss_bytes)),
                Cell::from(truncate_with_ellipsis(&p.name, NAME_WIDTH)),
            ])
            .style(theme.text())
        })
        .collect();

    let widths = [
        Constraint::Length(7),
        Constraint::Length(6),
        Constraint::Length(6),
        Constraint::Min(NAME_WIDTH as u16),
    ];

    let table = Table::new(rows, widths)
        .header(header)
        .block(block)
        .column_spacing(1);

    frame.render_widget(table, area);
}
