use ratatui::{
    layout::Rect,
    text::{Line, Span},
    widgets::Paragraph,
    Frame,
};

use crate::app::App;

pub fn draw(frame: &mut Frame, app: &App, area: Rect) {
    let theme = &app.theme;
    let refresh_secs = app.config.refresh_rate_ms as f64 / 1000.0;

    let line = Line::from(vec![
        Span::styled("Press 'q' to quit", theme.label(theme.cpu)),
        Span::styled(format!(" | Refresh: {:.1}s", refresh_secs), theme.dim()),
        Span::styled(
            format!(" | Up: {}", format_uptime(app.snapshot.uptime_secs)),
            theme.dim(),
        ),
    ]);
    frame.render_widget(Paragraph::new(line), area);
}

/// Format uptime as `HH:MM:SS`, with a day count once past 24 hours.
pub fn format_uptime(secs: u64) -> String {
    let days = secs / 86_400;
    let hours = (secs % 86_400) / 3600;
    let minutes = (secs % 3600) / 60;
    let seconds = secs % 60;
    if days > 0 {
        format!("{}d {:02}:{:02}:{:02}", days, hours, minutes, seconds)
    } else {
        format!("{:02}:{:02}:{:02}", hours, minutes, seconds)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_uptime() {
        assert_eq!(format_uptime(0), "00:00:00");
        assert_eq!(format_uptime(3_725), "01:02:05");
        assert_eq!(format_uptime(2 * 86_400 + 3_600 * 3 + 7), "2d 03:00:07");
    }
}
