//! Filesystem access and parsers for `/proc` and `/sys`.
//!
//! The sampler never touches `std::fs` directly. It reads through the
//! `FileSystem` trait so tests can feed it canned `/proc` contents via
//! `MockFs`. The parsers are pure functions over file contents.

use std::collections::{HashMap, HashSet};
use std::io;
use std::path::{Path, PathBuf};

/// Read-only filesystem operations used by the sampler.
pub trait FileSystem {
    /// Reads the entire contents of a file as a string.
    fn read_to_string(&self, path: &Path) -> io::Result<String>;

    /// Reads a binary file.
    fn read_bytes(&self, path: &Path) -> io::Result<Vec<u8>>;

    /// Lists entries of a directory as full paths.
    fn read_dir(&self, path: &Path) -> io::Result<Vec<PathBuf>>;
}

/// The real filesystem, delegating to `std::fs`.
#[derive(Debug, Default, Clone, Copy)]
pub struct RealFs;

impl FileSystem for RealFs {
    fn read_to_string(&self, path: &Path) -> io::Result<String> {
        std::fs::read_to_string(path)
    }

    fn read_bytes(&self, path: &Path) -> io::Result<Vec<u8>> {
        std::fs::read(path)
    }

    fn read_dir(&self, path: &Path) -> io::Result<Vec<PathBuf>> {
        let mut paths = Vec::new();
        for entry in std::fs::read_dir(path)? {
            paths.push(entry?.path());
        }
        Ok(paths)
    }
}

/// In-memory filesystem for tests.
#[derive(Debug, Clone, Default)]
pub struct MockFs {
    files: HashMap<PathBuf, String>,
    directories: HashSet<PathBuf>,
}

impl MockFs {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a file, creating its parent directories.
    pub fn add_file(&mut self, path: impl AsRef<Path>, content: impl Into<String>) {
        let path = path.as_ref().to_path_buf();
        let mut parent = path.parent();
        while let Some(p) = parent {
            if !p.as_os_str().is_empty() {
                self.directories.insert(p.to_path_buf());
            }
            parent = p.parent();
        }
        self.files.insert(path, content.into());
    }

    /// Removes a file, e.g. to simulate a process exiting between reads.
    pub fn remove_file(&mut self, path: impl AsRef<Path>) {
        self.files.remove(path.as_ref());
    }

    /// Adds a `/proc/[pid]` directory with `stat` and `status` files.
    pub fn add_process(&mut self, pid: u32, name: &str, utime: u64, stime: u64, rss_kb: u64) {
        self.add_file(
            format!("/proc/{pid}/stat"),
            proc_stat_line(pid, name, utime, stime),
        );
        self.add_file(
            format!("/proc/{pid}/status"),
            format!("Name:\t{name}\nState:\tS (sleeping)\nVmRSS:\t{rss_kb} kB\nThreads:\t1\n"),
        );
    }

    /// Removes every file of a `/proc/[pid]` directory.
    pub fn remove_process(&mut self, pid: u32) {
        let base = PathBuf::from(format!("/proc/{pid}"));
        self.files.retain(|path, _| !path.starts_with(&base));
        self.directories.remove(&base);
    }
}

impl FileSystem for MockFs {
    fn read_to_string(&self, path: &Path) -> io::Result<String> {
        self.files.get(path).cloned().ok_or_else(|| {
            io::Error::new(io::ErrorKind::NotFound, format!("{} not found", path.display()))
        })
    }

    fn read_bytes(&self, path: &Path) -> io::Result<Vec<u8>> {
        self.read_to_string(path).map(String::into_bytes)
    }

    fn read_dir(&self, path: &Path) -> io::Result<Vec<PathBuf>> {
        if !self.directories.contains(path) {
            return Err(io::Error::new(
                io::ErrorKind::NotFound,
                format!("{} not found", path.display()),
            ));
        }
        let mut entries: HashSet<PathBuf> = HashSet::new();
        for candidate in self.files.keys().chain(self.directories.iter()) {
            if let Ok(rest) = candidate.strip_prefix(path)
                && let Some(first) = rest.components().next()
            {
                entries.insert(path.join(first));
            }
        }
        let mut entries: Vec<PathBuf> = entries.into_iter().collect();
        entries.sort();
        Ok(entries)
    }
}

/// Builds a `/proc/[pid]/stat` line with the given CPU times.
pub fn proc_stat_line(pid: u32, name: &str, utime: u64, stime: u64) -> String {
    format!(
        "{pid} ({name}) S 1 {pid} {pid} 0 -1 4194304 100 0 0 0 {utime} {stime} 0 0 20 0 1 0 100 10000000 500 18446744073709551615 0 0 0 0 0 0 0 0 0 0 0 0 17 0 0 0 0 0 0"
    )
}

/// Error type for parsing failures.
#[derive(Debug, Clone, PartialEq)]
pub struct ParseError {
    pub message: String,
}

impl ParseError {
    pub fn new(msg: impl Into<String>) -> Self {
        Self {
            message: msg.into(),
        }
    }
}

impl std::fmt::Display for ParseError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "parse error: {}", self.message)
    }
}

impl std::error::Error for ParseError {}

/// Which CPU a `/proc/stat` line describes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum CpuId {
    Aggregate,
    Core(usize),
}

/// Cumulative tick counters of one `cpu` line in `/proc/stat`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CpuTimes {
    pub user: u64,
    pub nice: u64,
    pub system: u64,
    pub idle: u64,
    pub iowait: u64,
    pub irq: u64,
    pub softirq: u64,
}

impl CpuTimes {
    pub fn total(&self) -> u64 {
        [self.user, self.nice, self.system, self.irq, self.softirq]
            .into_iter()
            .fold(self.idle_total(), u64::saturating_add)
    }

    /// Ticks not spent doing work. iowait counts as idle for every stream.
    pub fn idle_total(&self) -> u64 {
        self.idle.saturating_add(self.iowait)
    }
}

/// Parses the `cpu` and `cpuN` lines of `/proc/stat`.
///
/// Missing trailing columns (very old kernels) are read as zero.
pub fn parse_cpu_times(content: &str) -> Result<Vec<(CpuId, CpuTimes)>, ParseError> {
    let mut cpus = Vec::new();

    for line in content.lines() {
        let mut fields = line.split_whitespace();
        let Some(label) = fields.next() else {
            continue;
        };
        let Some(suffix) = label.strip_prefix("cpu") else {
            continue;
        };
        let id = if suffix.is_empty() {
            CpuId::Aggregate
        } else {
            let index = suffix
                .parse()
                .map_err(|_| ParseError::new(format!("invalid cpu label '{label}'")))?;
            CpuId::Core(index)
        };

        let mut values = [0u64; 7];
        for (slot, raw) in values.iter_mut().zip(fields) {
            *slot = raw
                .parse()
                .map_err(|_| ParseError::new(format!("invalid counter '{raw}' for {label}")))?;
        }
        let [user, nice, system, idle, iowait, irq, softirq] = values;
        cpus.push((
            id,
            CpuTimes {
                user,
                nice,
                system,
                idle,
                iowait,
                irq,
                softirq,
            },
        ));
    }

    if cpus.is_empty() {
        return Err(ParseError::new("no cpu lines in /proc/stat"));
    }
    Ok(cpus)
}

/// Memory counters from `/proc/meminfo`, in kB.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MemCounters {
    pub total_kb: u64,
    pub free_kb: u64,
    pub swap_total_kb: u64,
    pub swap_free_kb: u64,
}

/// Parses `/proc/meminfo`. `MemTotal` is required, everything else defaults to 0.
pub fn parse_meminfo(content: &str) -> Result<MemCounters, ParseError> {
    let mut counters = MemCounters::default();
    let mut saw_total = false;

    for line in content.lines() {
        let Some((key, rest)) = line.split_once(':') else {
            continue;
        };
        let value = rest
            .split_whitespace()
            .next()
            .and_then(|v| v.parse::<u64>().ok());
        let Some(value) = value else {
            continue;
        };
        match key {
            "MemTotal" => {
                counters.total_kb = value;
                saw_total = true;
            }
            "MemFree" => counters.free_kb = value,
            "SwapTotal" => counters.swap_total_kb = value,
            "SwapFree" => counters.swap_free_kb = value,
            _ => {}
        }
    }

    if !saw_total {
        return Err(ParseError::new("MemTotal missing from /proc/meminfo"));
    }
    Ok(counters)
}

/// The fields of `/proc/[pid]/stat` the dashboard needs.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProcStat {
    pub pid: u32,
    pub comm: String,
    pub utime: u64,
    pub stime: u64,
}

/// Parses `/proc/[pid]/stat`.
///
/// The comm field may contain spaces and parentheses, so it is delimited by
/// the first `(` and the last `)`.
pub fn parse_proc_stat(content: &str) -> Result<ProcStat, ParseError> {
    let content = content.trim();
    let open_paren = content
        .find('(')
        .ok_or_else(|| ParseError::new("missing '(' in stat"))?;
    let close_paren = content
        .rfind(')')
        .ok_or_else(|| ParseError::new("missing ')' in stat"))?;
    if close_paren <= open_paren {
        return Err(ParseError::new("invalid parentheses in stat"));
    }

    let pid = content[..open_paren]
        .trim()
        .parse()
        .map_err(|_| ParseError::new("invalid pid"))?;
    let comm = content[open_paren + 1..close_paren].to_string();

    // After ')': state(0) ppid(1) ... utime(11) stime(12)
    let fields: Vec<&str> = content[close_paren + 1..].split_whitespace().collect();
    let field = |idx: usize, name: &str| -> Result<u64, ParseError> {
        fields
            .get(idx)
            .ok_or_else(|| ParseError::new(format!("missing field {name}")))?
            .parse()
            .map_err(|_| ParseError::new(format!("invalid {name}")))
    };

    Ok(ProcStat {
        pid,
        comm,
        utime: field(11, "utime")?,
        stime: field(12, "stime")?,
    })
}

/// Extracts `VmRSS` (kB) from `/proc/[pid]/status`. Kernel threads have none.
pub fn parse_vm_rss_kb(content: &str) -> Option<u64> {
    content.lines().find_map(|line| {
        line.strip_prefix("VmRSS:")
            .and_then(|rest| rest.split_whitespace().next())
            .and_then(|v| v.parse().ok())
    })
}

/// Byte counters of one interface in `/proc/net/dev`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NetDevStats {
    pub interface: String,
    pub rx_bytes: u64,
    pub tx_bytes: u64,
}

/// Parses `/proc/net/dev`, skipping the two header lines.
pub fn parse_net_dev(content: &str) -> Result<Vec<NetDevStats>, ParseError> {
    let mut devices = Vec::new();

    for line in content.lines() {
        if line.contains('|') || line.trim().is_empty() {
            continue;
        }
        let Some((interface, counters)) = line.split_once(':') else {
            return Err(ParseError::new(format!("malformed net/dev line '{line}'")));
        };
        let values: Vec<&str> = counters.split_whitespace().collect();
        if values.len() < 9 {
            return Err(ParseError::new(format!(
                "not enough fields for {}: {}",
                interface.trim(),
                values.len()
            )));
        }
        let get = |idx: usize| -> u64 { values[idx].parse().unwrap_or(0) };
        devices.push(NetDevStats {
            interface: interface.trim().to_string(),
            rx_bytes: get(0),
            tx_bytes: get(8),
        });
    }

    Ok(devices)
}

/// Static CPU facts from `/proc/cpuinfo`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CpuInfoFacts {
    pub model: Option<String>,
    pub physical_cores: Option<usize>,
    pub logical_cores: usize,
    pub mhz: Option<f64>,
}

/// Parses `/proc/cpuinfo`.
///
/// Physical cores are counted as distinct `(physical id, core id)` pairs,
/// falling back to the `cpu cores` field of the first processor.
pub fn parse_cpuinfo(content: &str) -> CpuInfoFacts {
    let mut facts = CpuInfoFacts::default();
    let mut cores: HashSet<(String, String)> = HashSet::new();
    let mut physical_id = String::new();
    let mut cpu_cores_field: Option<usize> = None;

    for line in content.lines() {
        let Some((key, value)) = line.split_once(':') else {
            continue;
        };
        let key = key.trim();
        let value = value.trim();
        match key {
            "processor" => facts.logical_cores += 1,
            "model name" | "Model" if facts.model.is_none() && !value.is_empty() => {
                facts.model = Some(value.to_string());
            }
            "cpu MHz" if facts.mhz.is_none() => facts.mhz = value.parse().ok(),
            "cpu cores" if cpu_cores_field.is_none() => cpu_cores_field = value.parse().ok(),
            "physical id" => physical_id = value.to_string(),
            "core id" => {
                cores.insert((physical_id.clone(), value.to_string()));
            }
            _ => {}
        }
    }

    facts.physical_cores = if cores.is_empty() {
        cpu_cores_field
    } else {
        Some(cores.len())
    };
    facts
}

/// Parses the first field of `/proc/uptime` into whole seconds.
pub fn parse_uptime(content: &str) -> Result<u64, ParseError> {
    let first = content
        .split_whitespace()
        .next()
        .ok_or_else(|| ParseError::new("empty /proc/uptime"))?;
    let secs: f64 = first
        .parse()
        .map_err(|_| ParseError::new(format!("invalid uptime '{first}'")))?;
    Ok(secs.max(0.0) as u64)
}
