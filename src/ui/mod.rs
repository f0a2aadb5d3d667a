pub mod colors;
mod cores_panel;
mod cpu_panel;
mod footer;
mod header;
pub mod layout;
mod memory_panel;
mod network_panel;
mod process_list;
pub mod widgets;

pub use footer::format_uptime;

use ratatui::{
    style::{Color, Style},
    text::Span,
    widgets::Block,
    Frame,
};

use crate::app::App;
use colors::Theme;
use layout::DashboardLayout;

/// Draw the entire UI
pub fn draw(frame: &mut Frame, app: &App) {
    let size = frame.area();
    let theme = &app.theme;

    let bg_block = Block::default().style(Style::default().bg(theme.background));
    frame.render_widget(bg_block, size);

    // Fresh geometry every frame
    let layout = DashboardLayout::compute(size);

    header::draw(frame, app, layout.header);
    cpu_panel::draw(frame, app, layout.cpu);
    memory_panel::draw(frame, app, layout.memory);

    if let Some(area) = layout.processes {
        process_list::draw(frame, app, area);
    }
    if let Some(area) = layout.network {
        network_panel::draw(frame, app, area);
    }
    if let Some(area) = layout.cores
        && app.config.show_core_graphs
    {
        cores_panel::draw(frame, app, area);
    }

    footer::draw(frame, app, layout.footer);
}

/// Bordered panel with an accent-colored title
fn panel_block<'a>(title: &'a str, accent: Color, theme: &Theme) -> Block<'a> {
    Block::bordered()
        .border_style(theme.border())
        .title(Span::styled(title, theme.label(accent)))
}
