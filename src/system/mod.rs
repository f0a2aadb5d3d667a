mod cpu;
mod hardware;
mod memory;
mod network;
mod process;
pub mod procfs;

use std::path::Path;
use std::time::Instant;

use tracing::debug;

pub use cpu::{usage_between, CounterSnapshot, CpuDeltaTracker, CpuInfo};
pub use hardware::{HardwareInfo, HardwareInventory, SysfsInventory};
pub use memory::{format_bytes, format_gib, memory_percent, MemoryInfo};
pub use network::{
    format_rate, lookup_public_ip, HttpIpLookup, IpLookup, NetworkTraffic, PublicIpCache,
    TrafficTracker, IP_DISABLED, IP_RESOLVING, IP_UNAVAILABLE,
};
pub use process::{cpu_share, top_by_cpu, ProcessEntry, ProcessSampler, CLK_TCK};
pub use procfs::{FileSystem, MockFs, RealFs};

use procfs::{parse_cpu_times, parse_meminfo, parse_net_dev, parse_uptime};

/// Everything sampled during one tick
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SystemSnapshot {
    pub cpu: CpuInfo,
    pub memory: MemoryInfo,
    pub processes: Vec<ProcessEntry>,
    pub network: NetworkTraffic,
    pub uptime_secs: u64,
}

/// Anything that can produce one tick's worth of metrics
pub trait MetricSource {
    /// Sample every source, keeping at most `process_limit` processes.
    fn sample(&mut self, process_limit: usize, now: Instant) -> SystemSnapshot;

    /// Static hardware facts, probed once at startup.
    fn probe_hardware(&self) -> HardwareInfo;
}

/// Reads OS counters and owns all previous-sample state needed to turn
/// them into rates. Every read failure degrades to a zeroed value.
pub struct SystemSampler<F: FileSystem = RealFs> {
    fs: F,
    cpu: CpuDeltaTracker,
    core_count: usize,
    processes: ProcessSampler,
    traffic: TrafficTracker,
}

impl SystemSampler<RealFs> {
    pub fn new() -> Self {
        Self::with_fs(RealFs)
    }
}

impl Default for SystemSampler<RealFs> {
    fn default() -> Self {
        Self::new()
    }
}

impl<F: FileSystem> SystemSampler<F> {
    pub fn with_fs(fs: F) -> Self {
        Self {
            fs,
            cpu: CpuDeltaTracker::new(),
            core_count: 0,
            processes: ProcessSampler::new(),
            traffic: TrafficTracker::new(),
        }
    }

    pub fn fs_mut(&mut self) -> &mut F {
        &mut self.fs
    }

    fn read(&self, path: &str) -> Option<String> {
        self.fs
            .read_to_string(Path::new(path))
            .map_err(|e| debug!("degraded read of {}: {}", path, e))
            .ok()
    }

    fn sample_cpu(&mut self) -> CpuInfo {
        let readings = self
            .read("/proc/stat")
            .and_then(|content| {
                parse_cpu_times(&content)
                    .map_err(|e| debug!("bad /proc/stat: {}", e))
                    .ok()
            });
        match readings {
            Some(readings) => {
                let info = CpuInfo::from_times(&mut self.cpu, &readings);
                self.core_count = info.core_usage.len();
                info
            }
            // Keep the core layout stable so per-core graphs survive a bad read
            None => CpuInfo {
                total_usage: 0.0,
                core_usage: vec![0.0; self.core_count],
            },
        }
    }

    fn sample_memory(&self) -> MemoryInfo {
        self.read("/proc/meminfo")
            .and_then(|content| {
                parse_meminfo(&content)
                    .map_err(|e| debug!("bad /proc/meminfo: {}", e))
                    .ok()
            })
            .map(|counters| MemoryInfo::from_counters(&counters))
            .unwrap_or_default()
    }

    fn sample_network(&mut self, now: Instant) -> NetworkTraffic {
        let devices = self.read("/proc/net/dev").and_then(|content| {
            parse_net_dev(&content)
                .map_err(|e| debug!("bad /proc/net/dev: {}", e))
                .ok()
        });
        match devices {
            Some(devices) => self.traffic.update(&devices, now),
            None => {
                self.traffic.reset();
                NetworkTraffic::default()
            }
        }
    }

    fn sample_uptime(&self) -> u64 {
        self.read("/proc/uptime")
            .and_then(|content| parse_uptime(&content).ok())
            .unwrap_or(0)
    }
}

impl<F: FileSystem> MetricSource for SystemSampler<F> {
    fn sample(&mut self, process_limit: usize, now: Instant) -> SystemSnapshot {
        SystemSnapshot {
            cpu: self.sample_cpu(),
            memory: self.sample_memory(),
            processes: self.processes.sample(&self.fs, process_limit, now),
            network: self.sample_network(now),
            uptime_secs: self.sample_uptime(),
        }
    }

    fn probe_hardware(&self) -> HardwareInfo {
        SysfsInventory::new(&self.fs).probe()
    }
}
