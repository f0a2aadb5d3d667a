use std::collections::HashMap;
use std::path::Path;
use std::time::{Duration, Instant};

use tracing::{debug, trace};

use super::procfs::{parse_proc_stat, parse_vm_rss_kb, FileSystem};

/// Clock ticks per second (USER_HZ). Standard value for Linux.
pub const CLK_TCK: u64 = 100;

/// One row of the top-processes panel
#[derive(Debug, Clone, PartialEq)]
pub struct ProcessEntry {
    pub pid: u32,
    pub name: String,
    /// Resident set size in bytes
    pub rss_bytes: u64,
    /// CPU share since the previous sample; multi-threaded processes can exceed 100
    pub cpu_percent: f32,
}

/// Enumerates `/proc` and turns cumulative per-process CPU ticks into
/// percentages normalized by wall-clock time between samples.
#[derive(Debug)]
pub struct ProcessSampler {
    prev_ticks: HashMap<u32, u64>,
    last_sample: Option<Instant>,
}

impl Default for ProcessSampler {
    fn default() -> Self {
        Self::new()
    }
}

impl ProcessSampler {
    pub fn new() -> Self {
        Self {
            prev_ticks: HashMap::new(),
            last_sample: None,
        }
    }

    /// List the `limit` busiest processes as of `now`.
    ///
    /// Processes seen for the first time report 0% since there is no
    /// interval to measure yet. Processes that vanish between the directory
    /// listing and reading their files are skipped.
    pub fn sample<F: FileSystem>(&mut self, fs: &F, limit: usize, now: Instant) -> Vec<ProcessEntry> {
        let elapsed = self
            .last_sample
            .map(|last| now.saturating_duration_since(last));
        self.last_sample = Some(now);

        let mut pids: Vec<u32> = match fs.read_dir(Path::new("/proc")) {
            Ok(paths) => paths
                .iter()
                .filter_map(|p| p.file_name()?.to_str()?.parse().ok())
                .collect(),
            Err(e) => {
                debug!("cannot list /proc: {}", e);
                self.prev_ticks.clear();
                return Vec::new();
            }
        };
        pids.sort_unstable();

        let mut entries = Vec::with_capacity(pids.len());
        let mut next_ticks = HashMap::with_capacity(pids.len());

        for pid in pids {
            let Some((mut entry, ticks)) = self.read_process(fs, pid) else {
                continue;
            };
            if let (Some(&prev), Some(elapsed)) = (self.prev_ticks.get(&pid), elapsed) {
                entry.cpu_percent = cpu_share(ticks.saturating_sub(prev), elapsed, CLK_TCK);
            }
            next_ticks.insert(pid, ticks);
            entries.push(entry);
        }

        self.prev_ticks = next_ticks;
        top_by_cpu(entries, limit)
    }

    fn read_process<F: FileSystem>(&self, fs: &F, pid: u32) -> Option<(ProcessEntry, u64)> {
        let stat = fs
            .read_to_string(Path::new(&format!("/proc/{pid}/stat")))
            .map_err(|e| trace!("stat of {} vanished: {}", pid, e))
            .ok()?;
        let stat = parse_proc_stat(&stat)
            .map_err(|e| debug!("bad stat for {}: {}", pid, e))
            .ok()?;
        let status = fs
            .read_to_string(Path::new(&format!("/proc/{pid}/status")))
            .map_err(|e| trace!("status of {} vanished: {}", pid, e))
            .ok()?;
        let rss_kb = parse_vm_rss_kb(&status).unwrap_or(0);

        Some((
            ProcessEntry {
                pid,
                name: stat.comm,
                rss_bytes: rss_kb.saturating_mul(1024),
                cpu_percent: 0.0,
            },
            stat.utime.saturating_add(stat.stime),
        ))
    }
}

/// Percentage of one CPU used by `delta_ticks` over `elapsed`.
pub fn cpu_share(delta_ticks: u64, elapsed: Duration, clock_ticks: u64) -> f32 {
    let secs = elapsed.as_secs_f64();
    if secs <= 0.0 || clock_ticks == 0 {
        return 0.0;
    }
    (delta_ticks as f64 / clock_ticks as f64 / secs * 100.0) as f32
}

/// Sort by CPU share descending (stable for ties) and keep the first `limit`.
pub fn top_by_cpu(mut entries: Vec<ProcessEntry>, limit: usize) -> Vec<ProcessEntry> {
    entries.sort_by(|a, b| b.cpu_percent.total_cmp(&a.cpu_percent));
    entries.truncate(limit);
    entries
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::system::procfs::MockFs;

    fn entry(pid: u32, cpu: f32) -> ProcessEntry {
        ProcessEntry {
            pid,
            name: format!("p{pid}"),
            rss_bytes: 0,
            cpu_percent: cpu,
        }
    }

    #[test]
    fn test_cpu_share() {
        assert_eq!(cpu_share(50, Duration::from_secs(1), 100), 50.0);
        assert_eq!(cpu_share(100, Duration::from_millis(500), 100), 200.0);
        assert_eq!(cpu_share(100, Duration::ZERO, 100), 0.0);
    }

    #[test]
    fn test_top_by_cpu_limits_and_sorts() {
        let entries = (1..=10).map(|pid| entry(pid, pid as f32)).collect();
        let top = top_by_cpu(entries, 5);
        assert_eq!(top.len(), 5);
        let pids: Vec<u32> = top.iter().map(|e| e.pid).collect();
        assert_eq!(pids, vec![10, 9, 8, 7, 6]);
    }

    #[test]
    fn test_top_by_cpu_ties_keep_order() {
        let entries = vec![entry(3, 1.0), entry(1, 5.0), entry(7, 1.0), entry(2, 1.0)];
        let top = top_by_cpu(entries, 5);
        let pids: Vec<u32> = top.iter().map(|e| e.pid).collect();
        assert_eq!(pids, vec![1, 3, 7, 2]);
    }

    #[test]
    fn test_sample_normalizes_by_wall_time() {
        let mut fs = MockFs::new();
        fs.add_process(10, "busy", 1_000, 0, 2048);
        fs.add_process(11, "idle", 10, 0, 1024);

        let mut sampler = ProcessSampler::new();
        let t0 = Instant::now();
        let first = sampler.sample(&fs, 5, t0);
        assert_eq!(first.len(), 2);
        assert!(first.iter().all(|e| e.cpu_percent == 0.0));

        // busy burns 100 ticks in 2s => 50% of a core
        fs.add_process(10, "busy", 1_080, 20, 2048);
        fs.add_process(11, "idle", 12, 0, 1024);
        let second = sampler.sample(&fs, 5, t0 + Duration::from_secs(2));
        assert_eq!(second[0].pid, 10);
        assert!((second[0].cpu_percent - 50.0).abs() < 0.01);
        assert_eq!(second[0].rss_bytes, 2048 * 1024);
        assert!((second[1].cpu_percent - 1.0).abs() < 0.01);
    }

    #[test]
    fn test_sample_skips_vanished_processes() {
        let mut fs = MockFs::new();
        fs.add_process(1, "init", 0, 0, 100);
        fs.add_process(2, "gone", 0, 0, 100);
        fs.remove_file("/proc/2/status");
        fs.add_file("/proc/3/stat", "garbage");
        fs.add_file("/proc/self/stat", "ignored");

        let mut sampler = ProcessSampler::new();
        let entries = sampler.sample(&fs, 10, Instant::now());
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].name, "init");
    }

    #[test]
    fn test_huge_counters_saturate() {
        let mut fs = MockFs::new();
        fs.add_process(7, "runaway", u64::MAX, 10, u64::MAX);
        let t0 = Instant::now();
        let mut sampler = ProcessSampler::new();
        let first = sampler.sample(&fs, 5, t0);
        assert_eq!(first[0].rss_bytes, u64::MAX);

        let second = sampler.sample(&fs, 5, t0 + Duration::from_secs(1));
        assert_eq!(second[0].cpu_percent, 0.0);
    }

    #[test]
    fn test_sample_without_proc_is_empty() {
        let fs = MockFs::new();
        let mut sampler = ProcessSampler::new();
        assert!(sampler.sample(&fs, 5, Instant::now()).is_empty());
    }
}
