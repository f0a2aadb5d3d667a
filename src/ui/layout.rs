//! Panel geometry, computed fresh from the terminal size on every frame.

use ratatui::layout::{Constraint, Layout, Rect};

/// Title line plus host/hardware line
pub const HEADER_HEIGHT: u16 = 2;
pub const FOOTER_HEIGHT: u16 = 1;
/// Borders, IP line, rx/tx line and a small graph
pub const NETWORK_HEIGHT: u16 = 7;
/// The process panel only appears when it can hold more rows than this
pub const MIN_PROCESS_ROWS: u16 = 10;
/// The network panel only appears on terminals taller than this
pub const MIN_NETWORK_TERMINAL_HEIGHT: u16 = 16;
/// Borders plus a label row and at least one graph row
pub const MIN_CORES_HEIGHT: u16 = 4;
const MIN_TOP_HEIGHT: u16 = 8;

/// Where every panel goes for one frame
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DashboardLayout {
    pub header: Rect,
    pub cpu: Rect,
    pub memory: Rect,
    pub processes: Option<Rect>,
    pub network: Option<Rect>,
    pub cores: Option<Rect>,
    pub footer: Rect,
}

impl DashboardLayout {
    /// Header on top, footer on the bottom, CPU and memory side by side, then
    /// processes on the left with network and per-core graphs stacked on the
    /// right.
    pub fn compute(area: Rect) -> Self {
        let [header, body, footer] = Layout::vertical([
            Constraint::Length(HEADER_HEIGHT),
            Constraint::Min(0),
            Constraint::Length(FOOTER_HEIGHT),
        ])
        .areas(area);

        let lower_visible = area.height > MIN_NETWORK_TERMINAL_HEIGHT;
        let (top, lower) = if lower_visible {
            let top_height = (body.height * 2 / 5).max(MIN_TOP_HEIGHT).min(body.height);
            let [top, lower] =
                Layout::vertical([Constraint::Length(top_height), Constraint::Min(0)]).areas(body);
            (top, Some(lower))
        } else {
            (body, None)
        };

        let [cpu, memory] =
            Layout::horizontal([Constraint::Percentage(50), Constraint::Percentage(50)]).areas(top);

        let mut layout = Self {
            header,
            cpu,
            memory,
            processes: None,
            network: None,
            cores: None,
            footer,
        };

        let Some(lower) = lower else {
            return layout;
        };

        let [left, right] =
            Layout::horizontal([Constraint::Percentage(50), Constraint::Percentage(50)]).areas(lower);

        let side = if table_rows(left) > MIN_PROCESS_ROWS {
            layout.processes = Some(left);
            right
        } else {
            lower
        };

        let network_height = NETWORK_HEIGHT.min(side.height);
        if network_height == 0 {
            return layout;
        }
        layout.network = Some(Rect {
            height: network_height,
            ..side
        });

        let remaining = side.height - network_height;
        if remaining >= MIN_CORES_HEIGHT {
            layout.cores = Some(Rect {
                y: side.y + network_height,
                height: remaining,
                ..side
            });
        }
        layout
    }

    /// How many process rows the current frame can show.
    pub fn process_rows(&self) -> usize {
        self.processes.map_or(0, |area| usize::from(table_rows(area)))
    }
}

/// Rows left for table entries after the borders and column header.
fn table_rows(area: Rect) -> u16 {
    area.height.saturating_sub(3)
}
