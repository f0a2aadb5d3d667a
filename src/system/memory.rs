use super::procfs::MemCounters;

/// Memory usage information
#[derive(Debug, Default, Clone, Copy, PartialEq)]
pub struct MemoryInfo {
    /// Total physical memory in bytes
    pub total: u64,
    /// Free physical memory in bytes
    pub free: u64,
    /// Used physical memory in bytes (total - free)
    pub used: u64,
    /// Memory used percentage
    pub used_percent: f32,
    /// Total swap in bytes
    pub swap_total: u64,
    /// Used swap in bytes
    pub swap_used: u64,
    /// Swap used percentage
    pub swap_percent: f32,
}

impl MemoryInfo {
    pub fn from_counters(counters: &MemCounters) -> Self {
        let total = kb_to_bytes(counters.total_kb);
        let free = kb_to_bytes(counters.free_kb).min(total);
        let swap_total = kb_to_bytes(counters.swap_total_kb);
        let swap_used = swap_total.saturating_sub(kb_to_bytes(counters.swap_free_kb));

        Self {
            total,
            free,
            used: total - free,
            used_percent: memory_percent(total, free),
            swap_total,
            swap_used,
            swap_percent: memory_percent(swap_total, swap_total - swap_used),
        }
    }
}

/// Used percentage of a pool; 0 for an empty (or unreadable) pool.
pub fn memory_percent(total: u64, free: u64) -> f32 {
    if total == 0 {
        return 0.0;
    }
    let used = total.saturating_sub(free);
    (used as f64 / total as f64 * 100.0) as f32
}

/// `/proc` reports kibibytes; absurd values pin at `u64::MAX`.
fn kb_to_bytes(kb: u64) -> u64 {
    kb.saturating_mul(1024)
}

const GIB: f64 = 1024.0 * 1024.0 * 1024.0;

/// Bytes as fractional gibibytes, e.g. `7.8`
pub fn format_gib(bytes: u64) -> String {
    format!("{:.1}", bytes as f64 / GIB)
}

/// Format bytes into a compact human-readable string
pub fn format_bytes(bytes: u64) -> String {
    const KB: u64 = 1024;
    const MB: u64 = KB * 1024;
    const GB: u64 = MB * 1024;

    if bytes >= GB {
        format!("{:.1}G", bytes as f64 / GB as f64)
    } else if bytes >= MB {
        format!("{:.0}M", bytes as f64 / MB as f64)
    } else if bytes >= KB {
        format!("{:.0}K", bytes as f64 / KB as f64)
    } else {
        format!("{}B", bytes)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_half_used() {
        let counters = MemCounters {
            total_kb: 16_777_216,
            free_kb: 8_388_608,
            ..MemCounters::default()
        };
        let mem = MemoryInfo::from_counters(&counters);
        assert_eq!(mem.used_percent, 50.0);
        assert_eq!(mem.used, 8_388_608 * 1024);
        assert_eq!(format_gib(mem.total), "16.0");
    }

    #[test]
    fn test_zero_total_is_zero_percent() {
        assert_eq!(memory_percent(0, 0), 0.0);
        let mem = MemoryInfo::from_counters(&MemCounters::default());
        assert_eq!(mem.used_percent, 0.0);
        assert_eq!(mem.swap_percent, 0.0);
    }

    #[test]
    fn test_free_larger_than_total() {
        let counters = MemCounters {
            total_kb: 100,
            free_kb: 200,
            swap_total_kb: 10,
            swap_free_kb: 20,
        };
        let mem = MemoryInfo::from_counters(&counters);
        assert_eq!(mem.used, 0);
        assert_eq!(mem.used_percent, 0.0);
        assert_eq!(mem.swap_used, 0);
    }

    #[test]
    fn test_huge_counters_saturate() {
        let counters = MemCounters {
            total_kb: u64::MAX,
            free_kb: u64::MAX / 2,
            swap_total_kb: u64::MAX,
            swap_free_kb: 0,
        };
        let mem = MemoryInfo::from_counters(&counters);
        assert_eq!(mem.total, u64::MAX);
        assert_eq!(mem.free, u64::MAX);
        assert_eq!(mem.used, 0);
        assert_eq!(mem.swap_used, u64::MAX);
        assert_eq!(mem.swap_percent, 100.0);
    }

    #[test]
    fn test_format_bytes() {
        assert_eq!(format_bytes(512), "512B");
        assert_eq!(format_bytes(2048), "2K");
        assert_eq!(format_bytes(5 * 1024 * 1024), "5M");
        assert_eq!(format_bytes(3 * 1024 * 1024 * 1024 / 2), "1.5G");
    }
}
