use std::collections::HashMap;

use super::procfs::{CpuId, CpuTimes};

/// The last-seen cumulative counters of one CPU
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CounterSnapshot {
    pub total: u64,
    pub idle: u64,
}

impl From<CpuTimes> for CounterSnapshot {
    fn from(times: CpuTimes) -> Self {
        Self {
            total: times.total(),
            idle: times.idle_total(),
        }
    }
}

/// Busy percentage between two snapshots.
///
/// Returns 0 when no ticks elapsed or the counters went backwards.
pub fn usage_between(prev: CounterSnapshot, now: CounterSnapshot) -> f32 {
    let total_diff = now.total.saturating_sub(prev.total);
    if total_diff == 0 {
        return 0.0;
    }
    // idle can never exceed total within one interval; clamp against odd kernels
    let idle_diff = now.idle.saturating_sub(prev.idle).min(total_diff);
    (100.0 * (total_diff - idle_diff) as f64 / total_diff as f64) as f32
}

/// Delta calculator state: one baseline per tracked CPU
#[derive(Debug, Default)]
pub struct CpuDeltaTracker {
    prev: HashMap<CpuId, CounterSnapshot>,
}

impl CpuDeltaTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a new reading and return the usage since the previous one.
    ///
    /// The first reading of a CPU only becomes the baseline and yields 0.
    /// A counter that went backwards (reset/hotplug) is re-baselined the same way.
    pub fn update(&mut self, id: CpuId, now: CounterSnapshot) -> f32 {
        match self.prev.insert(id, now) {
            Some(prev) if now.total >= prev.total => usage_between(prev, now),
            _ => 0.0,
        }
    }

    /// Forget CPUs that disappeared from `/proc/stat` (offlined cores).
    pub fn retain(&mut self, seen: &[CpuId]) {
        self.prev.retain(|id, _| seen.contains(id));
    }

    pub fn tracked(&self) -> usize {
        self.prev.len()
    }
}

/// CPU usage information for one tick
#[derive(Debug, Default, Clone, PartialEq)]
pub struct CpuInfo {
    /// Aggregate usage across all cores
    pub total_usage: f32,
    /// Per-core usage percentages, indexed by core number
    pub core_usage: Vec<f32>,
}

impl CpuInfo {
    /// Feed a `/proc/stat` reading through the tracker.
    pub fn from_times(tracker: &mut CpuDeltaTracker, readings: &[(CpuId, CpuTimes)]) -> Self {
        let mut info = CpuInfo::default();
        let mut seen = Vec::with_capacity(readings.len());

        for &(id, times) in readings {
            let usage = tracker.update(id, times.into());
            seen.push(id);
            match id {
                CpuId::Aggregate => info.total_usage = usage,
                CpuId::Core(index) => {
                    if info.core_usage.len() <= index {
                        info.core_usage.resize(index + 1, 0.0);
                    }
                    info.core_usage[index] = usage;
                }
            }
        }

        tracker.retain(&seen);
        info
    }
}
