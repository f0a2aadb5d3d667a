use ratatui::{
    layout::{Constraint, Layout, Rect},
    style::Style,
    text::{Line, Span},
    widgets::Paragraph,
    Frame,
};

use super::panel_block;
use super::widgets::HistoryGraph;
use crate::app::App;
use crate::system::format_rate;

pub fn draw(frame: &mut Frame, app: &App, area: Rect) {
    let theme = &app.theme;
    let block = panel_block(" Network ", theme.network, theme);
    let inner = block.inner(area);
    frame.render_widget(block, area);

    let [ip_row, rate_row, graph_area] = Layout::vertical([
        Constraint::Length(1),
        Constraint::Length(1),
        Constraint::Min(0),
    ])
    .areas(inner);

    let ip = Line::from(vec![
        Span::styled("Public IP: ", theme.label(theme.network)),
        Span::styled(app.ip_display(), theme.text()),
    ]);
    frame.render_widget(Paragraph::new(ip), ip_row);

    let traffic = &app.snapshot.network;
    let rates = Line::from(vec![
        Span::styled("RX: ", theme.label(theme.network)),
        Span::styled(format_rate(traffic.rx_rate), theme.text()),
        Span::styled("  TX: ", theme.label(theme.network)),
        Span::styled(format_rate(traffic.tx_rate), theme.text()),
    ]);
    frame.render_widget(Paragraph::new(rates), rate_row);

    let [rx_area, tx_area] =
        Layout::horizontal([Constraint::Percentage(50), Constraint::Percentage(50)])
            .spacing(1)
            .areas(graph_area);
    let graph_style = Style::default().fg(theme.graph);
    frame.render_widget(
        HistoryGraph::new(&app.histories.net_rx).style(graph_style),
        rx_area,
    );
    frame.render_widget(
        HistoryGraph::new(&app.histories.net_tx).style(graph_style),
        tx_area,
    );
}
