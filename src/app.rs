use std::time::{Duration, Instant};

use ratatui::layout::Rect;
use tracing::{debug, info};

use crate::config::Config;
use crate::history::MetricHistories;
use crate::system::{
    HardwareInfo, HttpIpLookup, MetricSource, PublicIpCache, SystemSampler, SystemSnapshot,
};
use crate::ui::colors::Theme;
use crate::ui::layout::DashboardLayout;

/// Main loop state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunState {
    Running,
    Terminated,
}

/// Application state
pub struct App {
    /// Application configuration
    pub config: Config,
    /// Current color theme (derived from config)
    pub theme: Theme,
    pub state: RunState,
    /// Most recent sample of every source
    pub snapshot: SystemSnapshot,
    pub histories: MetricHistories,
    /// Probed once at startup
    pub hardware: HardwareInfo,
    pub public_ip: PublicIpCache,
    source: Box<dyn MetricSource>,
    /// Ticks completed so far
    pub iteration_count: u64,
    /// Stop after this many ticks (from CLI -n)
    pub max_iterations: Option<u64>,
    /// Process rows the current terminal can show (set from the layout)
    pub process_rows: usize,
}

impl App {
    /// Dashboard over the live `/proc`, with the IP refresher configured from `config`.
    pub fn new(config: Config) -> Self {
        let public_ip = public_ip_cache(&config);
        Self::with_source(config, Box::new(SystemSampler::new()), public_ip)
    }

    pub fn with_source(
        config: Config,
        source: Box<dyn MetricSource>,
        public_ip: PublicIpCache,
    ) -> Self {
        let hardware = source.probe_hardware();
        debug!("hardware: {:?}", hardware);
        Self {
            theme: config.theme(),
            histories: MetricHistories::new(config.history_len),
            config,
            state: RunState::Running,
            snapshot: SystemSnapshot::default(),
            hardware,
            public_ip,
            source,
            iteration_count: 0,
            max_iterations: None,
            process_rows: 0,
        }
    }

    /// Sample every source and push the results into the histories.
    pub fn refresh_system(&mut self) {
        self.refresh_at(Instant::now());
    }

    pub fn refresh_at(&mut self, now: Instant) {
        let snapshot = self.source.sample(self.process_rows, now);
        self.histories.record(&snapshot);
        self.snapshot = snapshot;
        self.iteration_count += 1;
    }

    /// Size the process listing to what the terminal can display.
    pub fn fit_to(&mut self, area: Rect) {
        self.process_rows = DashboardLayout::compute(area).process_rows();
    }

    /// Refit after a terminal resize. True when the panel grew past the
    /// current listing, so the next sample should not wait for the tick.
    pub fn resize(&mut self, area: Rect) -> bool {
        let previous = self.process_rows;
        self.fit_to(area);
        self.process_rows > previous
    }

    pub fn quit(&mut self) {
        if self.state == RunState::Running {
            info!("quitting after {} ticks", self.iteration_count);
        }
        self.state = RunState::Terminated;
    }

    pub fn is_running(&self) -> bool {
        self.state == RunState::Running
    }

    /// Whether the tick limit has been reached.
    pub fn iterations_exhausted(&self) -> bool {
        self.max_iterations
            .is_some_and(|max| self.iteration_count >= max)
    }

    /// Last-known public IP; never waits on the network.
    pub fn ip_display(&self) -> String {
        self.public_ip.current()
    }

    pub fn tick_rate(&self) -> Duration {
        self.config.tick_rate()
    }
}

/// Start the background IP refresher, or a disabled placeholder.
pub fn public_ip_cache(config: &Config) -> PublicIpCache {
    if !config.ip_lookup_enabled {
        return PublicIpCache::disabled();
    }
    let lookup = HttpIpLookup::new(
        config.ip_endpoint.clone(),
        Duration::from_secs(config.ip_timeout_secs),
    );
    PublicIpCache::spawn(
        Box::new(lookup),
        Duration::from_secs(config.ip_refresh_secs),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::system::{MockFs, IP_DISABLED};

    fn mock_fs(busy: u64, idle: u64) -> MockFs {
        let mut fs = MockFs::new();
        fs.add_file(
            "/proc/stat",
            format!(
                "cpu  {busy} 0 0 {idle} 0 0 0 0 0 0\ncpu0 {busy} 0 0 {idle} 0 0 0 0 0 0\n"
            ),
        );
        fs.add_file(
            "/proc/meminfo",
            "MemTotal:       16777216 kB\nMemFree:         8388608 kB\n",
        );
        fs
    }

    fn test_app(fs: MockFs) -> App {
        App::with_source(
            Config::default(),
            Box::new(SystemSampler::with_fs(fs)),
            PublicIpCache::fixed("203.0.113.7"),
        )
    }

    #[test]
    fn test_first_refresh_is_zero_then_rates() {
        let mut app = test_app(mock_fs(20, 80));
        app.refresh_system();
        assert_eq!(app.snapshot.cpu.total_usage, 0.0);
        assert_eq!(app.snapshot.memory.used_percent, 50.0);
        assert_eq!(app.iteration_count, 1);
        assert_eq!(app.histories.cpu.len(), app.config.history_len);
        assert_eq!(app.histories.cores.len(), 1);
    }

    #[test]
    fn test_quit_transitions_state() {
        let mut app = test_app(MockFs::new());
        assert!(app.is_running());
        app.quit();
        assert_eq!(app.state, RunState::Terminated);
        assert!(!app.is_running());
    }

    #[test]
    fn test_iteration_limit() {
        let mut app = test_app(MockFs::new());
        app.max_iterations = Some(2);
        app.refresh_system();
        assert!(!app.iterations_exhausted());
        app.refresh_system();
        assert!(app.iterations_exhausted());
    }

    #[test]
    fn test_fit_to_sets_process_rows() {
        let mut app = test_app(MockFs::new());
        app.fit_to(Rect::new(0, 0, 80, 16));
        assert_eq!(app.process_rows, 0);
        app.fit_to(Rect::new(0, 0, 120, 40));
        assert!(app.process_rows > 10);
    }

    #[test]
    fn test_resize_wants_sample_only_when_growing() {
        let mut app = test_app(MockFs::new());
        app.fit_to(Rect::new(0, 0, 80, 24));
        assert!(app.resize(Rect::new(0, 0, 120, 40)));
        let rows = app.process_rows;
        assert!(!app.resize(Rect::new(0, 0, 120, 40)));
        assert!(!app.resize(Rect::new(0, 0, 80, 24)));
        assert!(app.process_rows < rows);
    }

    #[test]
    fn test_ip_display() {
        let app = test_app(MockFs::new());
        assert_eq!(app.ip_display(), "203.0.113.7");

        let config = Config {
            ip_lookup_enabled: false,
            ..Config::default()
        };
        assert_eq!(public_ip_cache(&config).current(), IP_DISABLED);
    }
}
