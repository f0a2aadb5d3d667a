//! Network statistics: interface byte rates and the public IP address.
//!
//! The public IP comes from a blocking HTTPS lookup, so it is refreshed on a
//! background thread and published through `PublicIpCache`. The render loop
//! only ever reads the last-known value.

use std::sync::mpsc::{self, RecvTimeoutError, Sender};
use std::sync::{Arc, RwLock};
use std::thread;
use std::time::{Duration, Instant};

use tracing::{debug, info, warn};

use super::procfs::NetDevStats;

/// Shown when the lookup failed
pub const IP_UNAVAILABLE: &str = "Unavailable";
/// Shown until the first lookup finishes
pub const IP_RESOLVING: &str = "Resolving...";
/// Shown when lookups are turned off
pub const IP_DISABLED: &str = "Disabled";

/// Aggregate traffic over all non-loopback interfaces for one tick
#[derive(Debug, Default, Clone, Copy, PartialEq)]
pub struct NetworkTraffic {
    pub rx_bytes: u64,
    pub tx_bytes: u64,
    /// Bytes per second received since the previous sample
    pub rx_rate: f64,
    /// Bytes per second transmitted since the previous sample
    pub tx_rate: f64,
}

/// Previous interface totals for rate calculation
#[derive(Debug, Default)]
pub struct TrafficTracker {
    prev: Option<(u64, u64, Instant)>,
}

impl TrafficTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Sum the interfaces and derive rates against the previous call.
    pub fn update(&mut self, devices: &[NetDevStats], now: Instant) -> NetworkTraffic {
        let (rx_bytes, tx_bytes) = devices
            .iter()
            .filter(|d| d.interface != "lo")
            .fold((0u64, 0u64), |(rx, tx), d| {
                (rx.saturating_add(d.rx_bytes), tx.saturating_add(d.tx_bytes))
            });

        let mut traffic = NetworkTraffic {
            rx_bytes,
            tx_bytes,
            ..NetworkTraffic::default()
        };

        if let Some((prev_rx, prev_tx, prev_at)) = self.prev {
            let secs = now.saturating_duration_since(prev_at).as_secs_f64();
            if secs > 0.0 {
                // An interface going away shrinks the totals; report 0 rather than wrap
                traffic.rx_rate = rx_bytes.saturating_sub(prev_rx) as f64 / secs;
                traffic.tx_rate = tx_bytes.saturating_sub(prev_tx) as f64 / secs;
            }
        }
        self.prev = Some((rx_bytes, tx_bytes, now));
        traffic
    }

    /// Drop the baseline after a failed read so the next rate is not a spike.
    pub fn reset(&mut self) {
        self.prev = None;
    }
}

/// Format a byte rate, e.g. `1.2 MB/s`
pub fn format_rate(bytes_per_sec: f64) -> String {
    const KB: f64 = 1024.0;
    const MB: f64 = KB * 1024.0;
    const GB: f64 = MB * 1024.0;

    if bytes_per_sec >= GB {
        format!("{:.1} GB/s", bytes_per_sec / GB)
    } else if bytes_per_sec >= MB {
        format!("{:.1} MB/s", bytes_per_sec / MB)
    } else if bytes_per_sec >= KB {
        format!("{:.1} KB/s", bytes_per_sec / KB)
    } else {
        format!("{:.0} B/s", bytes_per_sec.max(0.0))
    }
}

/// Something that can resolve this host's public IP address
pub trait IpLookup: Send {
    /// One blocking attempt, no retry. `None` on any failure.
    fn lookup(&self) -> Option<String>;
}

/// Resolves the public IP by asking an HTTP echo service such as ipify.
pub struct HttpIpLookup {
    endpoint: String,
    timeout: Duration,
}

impl HttpIpLookup {
    pub fn new(endpoint: impl Into<String>, timeout: Duration) -> Self {
        Self {
            endpoint: endpoint.into(),
            timeout,
        }
    }
}

impl IpLookup for HttpIpLookup {
    fn lookup(&self) -> Option<String> {
        let client = match reqwest::blocking::Client::builder()
            .timeout(self.timeout)
            .build()
        {
            Ok(c) => c,
            Err(e) => {
                warn!("cannot build HTTP client: {}", e);
                return None;
            }
        };

        let start = Instant::now();
        let response = client.get(&self.endpoint).send();
        match response {
            Ok(resp) if resp.status().is_success() => {
                let body = resp.text().ok()?;
                debug!(
                    "IP lookup via {} took {} ms",
                    self.endpoint,
                    start.elapsed().as_millis()
                );
                sanitize_ip(&body)
            }
            Ok(resp) => {
                warn!("IP lookup via {} returned HTTP {}", self.endpoint, resp.status().as_u16());
                None
            }
            Err(e) => {
                warn!("IP lookup via {} failed: {}", self.endpoint, e);
                None
            }
        }
    }
}

/// Accept a response body only if it looks like a bare address.
fn sanitize_ip(body: &str) -> Option<String> {
    let ip = body.trim();
    let plausible = !ip.is_empty()
        && ip.len() <= 45
        && ip
            .chars()
            .all(|c| c.is_ascii_hexdigit() || c == '.' || c == ':');
    plausible.then(|| ip.to_string())
}

/// Run one lookup and map failure to the sentinel.
pub fn lookup_public_ip(lookup: &dyn IpLookup) -> String {
    lookup
        .lookup()
        .unwrap_or_else(|| IP_UNAVAILABLE.to_string())
}

/// Last-known public IP, refreshed by a background thread.
///
/// Dropping the cache stops the refresher after its current lookup.
pub struct PublicIpCache {
    value: Arc<RwLock<String>>,
    _stop: Option<Sender<()>>,
}

impl PublicIpCache {
    /// Spawn a refresher that looks up immediately, then every `interval`.
    pub fn spawn(lookup: Box<dyn IpLookup>, interval: Duration) -> Self {
        let value = Arc::new(RwLock::new(IP_RESOLVING.to_string()));
        let (stop_tx, stop_rx) = mpsc::channel::<()>();
        let shared = Arc::clone(&value);

        let spawned = thread::Builder::new()
            .name("rplex-ip".to_string())
            .spawn(move || {
                loop {
                    let ip = lookup_public_ip(lookup.as_ref());
                    info!("public IP refreshed: {}", ip);
                    if let Ok(mut slot) = shared.write() {
                        *slot = ip;
                    }
                    match stop_rx.recv_timeout(interval) {
                        Err(RecvTimeoutError::Timeout) => continue,
                        Ok(()) | Err(RecvTimeoutError::Disconnected) => break,
                    }
                }
                debug!("IP refresher stopped");
            });

        if let Err(e) = spawned {
            warn!("cannot start IP refresher: {}", e);
            if let Ok(mut slot) = value.write() {
                *slot = IP_UNAVAILABLE.to_string();
            }
        }

        Self {
            value,
            _stop: Some(stop_tx),
        }
    }

    /// A cache that never looks anything up.
    pub fn disabled() -> Self {
        Self::fixed(IP_DISABLED)
    }

    /// A cache holding a constant value.
    pub fn fixed(value: &str) -> Self {
        Self {
            value: Arc::new(RwLock::new(value.to_string())),
            _stop: None,
        }
    }

    /// The last-known value. Never blocks on the network.
    pub fn current(&self) -> String {
        match self.value.read() {
            Ok(v) => v.clone(),
            Err(_) => IP_UNAVAILABLE.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct FixedLookup(Option<&'static str>);

    impl IpLookup for FixedLookup {
        fn lookup(&self) -> Option<String> {
            self.0.map(str::to_string)
        }
    }

    struct CountingLookup(Arc<AtomicUsize>);

    impl IpLookup for CountingLookup {
        fn lookup(&self) -> Option<String> {
            self.0.fetch_add(1, Ordering::SeqCst);
            Some("203.0.113.7".to_string())
        }
    }

    fn dev(name: &str, rx: u64, tx: u64) -> NetDevStats {
        NetDevStats {
            interface: name.to_string(),
            rx_bytes: rx,
            tx_bytes: tx,
        }
    }

    fn wait_for(cache: &PublicIpCache, expected: &str) -> bool {
        let deadline = Instant::now() + Duration::from_secs(5);
        while Instant::now() < deadline {
            if cache.current() == expected {
                return true;
            }
            thread::sleep(Duration::from_millis(10));
        }
        false
    }

    #[test]
    fn test_traffic_rates() {
        let mut tracker = TrafficTracker::new();
        let t0 = Instant::now();
        let first = tracker.update(&[dev("lo", 999, 999), dev("eth0", 1_000, 500)], t0);
        assert_eq!(first.rx_bytes, 1_000);
        assert_eq!(first.rx_rate, 0.0);

        let second = tracker.update(
            &[dev("lo", 5_000, 5_000), dev("eth0", 3_000, 1_500)],
            t0 + Duration::from_secs(2),
        );
        assert_eq!(second.rx_rate, 1_000.0);
        assert_eq!(second.tx_rate, 500.0);
    }

    #[test]
    fn test_traffic_counter_shrink_is_zero_rate() {
        let mut tracker = TrafficTracker::new();
        let t0 = Instant::now();
        tracker.update(&[dev("eth0", 1_000, 1_000), dev("wlan0", 1_000, 1_000)], t0);
        let after = tracker.update(&[dev("eth0", 1_100, 1_100)], t0 + Duration::from_secs(1));
        assert_eq!(after.rx_rate, 0.0);
        assert_eq!(after.tx_rate, 0.0);
    }

    #[test]
    fn test_format_rate() {
        assert_eq!(format_rate(512.0), "512 B/s");
        assert_eq!(format_rate(2048.0), "2.0 KB/s");
        assert_eq!(format_rate(3.0 * 1024.0 * 1024.0), "3.0 MB/s");
    }

    #[test]
    fn test_lookup_sentinel() {
        assert_eq!(lookup_public_ip(&FixedLookup(None)), IP_UNAVAILABLE);
        assert_eq!(lookup_public_ip(&FixedLookup(Some("198.51.100.1"))), "198.51.100.1");
    }

    #[test]
    fn test_sanitize_ip() {
        assert_eq!(sanitize_ip("198.51.100.1\n").as_deref(), Some("198.51.100.1"));
        assert_eq!(sanitize_ip("2001:db8::1").as_deref(), Some("2001:db8::1"));
        assert_eq!(sanitize_ip("<html>error</html>"), None);
        assert_eq!(sanitize_ip("   "), None);
    }

    #[test]
    fn test_cache_publishes_result() {
        let cache = PublicIpCache::spawn(
            Box::new(FixedLookup(Some("192.0.2.44"))),
            Duration::from_secs(3600),
        );
        assert!(wait_for(&cache, "192.0.2.44"));
    }

    #[test]
    fn test_cache_failure_shows_sentinel() {
        let cache = PublicIpCache::spawn(Box::new(FixedLookup(None)), Duration::from_secs(3600));
        assert!(wait_for(&cache, IP_UNAVAILABLE));
    }

    #[test]
    fn test_cache_refreshes_on_interval() {
        let calls = Arc::new(AtomicUsize::new(0));
        let cache = PublicIpCache::spawn(
            Box::new(CountingLookup(Arc::clone(&calls))),
            Duration::from_millis(20),
        );
        let deadline = Instant::now() + Duration::from_secs(5);
        while calls.load(Ordering::SeqCst) < 3 && Instant::now() < deadline {
            thread::sleep(Duration::from_millis(10));
        }
        assert!(calls.load(Ordering::SeqCst) >= 3);
        drop(cache);
    }

    #[test]
    fn test_disabled_cache() {
        assert_eq!(PublicIpCache::disabled().current(), IP_DISABLED);
    }
}
