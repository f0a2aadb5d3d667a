//! Rolling sample histories that feed the time-series graphs.

use std::collections::VecDeque;

use crate::system::SystemSnapshot;

/// Fixed-capacity FIFO of recent samples, oldest first.
#[derive(Debug, Clone, PartialEq)]
pub struct HistoryBuffer {
    values: VecDeque<f32>,
    capacity: usize,
}

impl HistoryBuffer {
    /// An empty buffer.
    pub fn new(capacity: usize) -> Self {
        Self {
            values: VecDeque::with_capacity(capacity),
            capacity,
        }
    }

    /// A buffer already full of zeros, so graphs start with a full-width baseline.
    pub fn prefilled(capacity: usize) -> Self {
        Self {
            values: std::iter::repeat_n(0.0, capacity).collect(),
            capacity,
        }
    }

    /// Append a sample, evicting the oldest once full.
    pub fn push(&mut self, value: f32) {
        if self.capacity == 0 {
            return;
        }
        if self.values.len() >= self.capacity {
            self.values.pop_front();
        }
        self.values.push_back(value);
    }

    /// Samples in chronological order.
    pub fn values(&self) -> impl DoubleEndedIterator<Item = f32> + ExactSizeIterator + '_ {
        self.values.iter().copied()
    }

    pub fn to_vec(&self) -> Vec<f32> {
        self.values().collect()
    }

    pub fn latest(&self) -> Option<f32> {
        self.values.back().copied()
    }

    /// Largest sample, or 0 when empty.
    pub fn max(&self) -> f32 {
        self.values().fold(0.0, f32::max)
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

/// One history per tracked metric stream
#[derive(Debug, Clone)]
pub struct MetricHistories {
    capacity: usize,
    pub cpu: HistoryBuffer,
    pub memory: HistoryBuffer,
    pub cores: Vec<HistoryBuffer>,
    pub net_rx: HistoryBuffer,
    pub net_tx: HistoryBuffer,
}

impl MetricHistories {
    pub fn new(capacity: usize) -> Self {
        Self {
            capacity,
            cpu: HistoryBuffer::prefilled(capacity),
            memory: HistoryBuffer::prefilled(capacity),
            cores: Vec::new(),
            net_rx: HistoryBuffer::prefilled(capacity),
            net_tx: HistoryBuffer::prefilled(capacity),
        }
    }

    /// Push one tick's values into every stream.
    ///
    /// Core histories are created (zero-filled) the first time a core shows
    /// up and dropped when cores go offline.
    pub fn record(&mut self, snapshot: &SystemSnapshot) {
        self.cpu.push(snapshot.cpu.total_usage);
        self.memory.push(snapshot.memory.used_percent);
        self.net_rx.push(snapshot.network.rx_rate as f32);
        self.net_tx.push(snapshot.network.tx_rate as f32);

        let cores = &snapshot.cpu.core_usage;
        if self.cores.len() != cores.len() {
            let capacity = self.capacity;
            self.cores
                .resize_with(cores.len(), || HistoryBuffer::prefilled(capacity));
        }
        for (history, &usage) in self.cores.iter_mut().zip(cores) {
            history.push(usage);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::system::CpuInfo;

    #[test]
    fn test_never_exceeds_capacity() {
        let mut history = HistoryBuffer::new(60);
        for i in 0..1_000 {
            history.push(i as f32);
            assert!(history.len() <= 60);
        }
        assert_eq!(history.len(), 60);
    }

    #[test]
    fn test_keeps_most_recent_in_order() {
        let mut history = HistoryBuffer::new(5);
        for i in 0..12 {
            history.push(i as f32);
        }
        assert_eq!(history.to_vec(), vec![7.0, 8.0, 9.0, 10.0, 11.0]);
        assert_eq!(history.latest(), Some(11.0));
    }

    #[test]
    fn test_prefilled_baseline() {
        let mut history = HistoryBuffer::prefilled(50);
        assert_eq!(history.len(), 50);
        assert_eq!(history.max(), 0.0);
        history.push(42.0);
        assert_eq!(history.len(), 50);
        assert_eq!(history.to_vec()[49], 42.0);
        assert_eq!(history.max(), 42.0);
    }

    #[test]
    fn test_zero_capacity_stays_empty() {
        let mut history = HistoryBuffer::new(0);
        history.push(1.0);
        assert!(history.is_empty());
        assert_eq!(history.max(), 0.0);
    }

    #[test]
    fn test_record_tracks_core_count() {
        let mut histories = MetricHistories::new(10);
        let mut snapshot = SystemSnapshot {
            cpu: CpuInfo {
                total_usage: 25.0,
                core_usage: vec![10.0, 40.0],
            },
            ..SystemSnapshot::default()
        };
        histories.record(&snapshot);
        assert_eq!(histories.cores.len(), 2);
        assert_eq!(histories.cores[1].latest(), Some(40.0));
        assert_eq!(histories.cores[1].len(), 10);
        assert_eq!(histories.cpu.latest(), Some(25.0));

        snapshot.cpu.core_usage = vec![5.0];
        histories.record(&snapshot);
        assert_eq!(histories.cores.len(), 1);
        assert_eq!(histories.cores[0].latest(), Some(5.0));
    }
}
