use ratatui::{
    layout::{Constraint, Layout, Rect},
    text::{Line, Span},
    widgets::Paragraph,
    Frame,
};

use crate::app::App;

pub const TITLE: &str = "RPLEX SYSTEM MONITOR";

pub fn draw(frame: &mut Frame, app: &App, area: Rect) {
    let theme = &app.theme;
    let [title_row, info_row] =
        Layout::vertical([Constraint::Length(1), Constraint::Length(1)]).areas(area);

    let clock = chrono::Local::now().format("%H:%M:%S").to_string();
    let title = format!(" {} v{}", TITLE, env!("CARGO_PKG_VERSION"));

    // Clock right-aligned on the same bar
    let gap = usize::from(title_row.width).saturating_sub(title.len() + clock.len() + 1);
    let line = Line::from(vec![
        Span::raw(title),
        Span::raw(" ".repeat(gap)),
        Span::raw(clock),
        Span::raw(" "),
    ]);
    frame.render_widget(Paragraph::new(line).style(theme.title()), title_row);

    let hw = &app.hardware;
    let info = Line::from(vec![
        Span::styled(" Host: ", theme.label(theme.cpu)),
        Span::styled(hw.hostname.as_deref().unwrap_or("unknown"), theme.text()),
        Span::styled(" | Kernel: ", theme.label(theme.cpu)),
        Span::styled(hw.kernel.as_deref().unwrap_or("unknown"), theme.text()),
        Span::styled(" | ", theme.dim()),
        Span::styled(hw.summary(), theme.dim()),
    ]);
    frame.render_widget(Paragraph::new(info), info_row);
}
