//! Keyed delayed tasks on a host-supplied clock
//!
//! At most one task per key: scheduling again supersedes the earlier
//! deadline. Time is in milliseconds and only advances when the host says so.

/// Pending deadlines keyed by task identity
#[derive(Debug, Clone)]
pub struct TimerQueue<K> {
    pending: Vec<(K, f64)>,
}

impl<K> Default for TimerQueue<K> {
    fn default() -> Self {
        Self {
            pending: Vec::new(),
        }
    }
}

impl<K: Copy + PartialEq> TimerQueue<K> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Schedule `key` at `deadline`. Returns true if an earlier task was replaced.
    pub fn schedule(&mut self, key: K, deadline: f64) -> bool {
        let superseded = self.cancel(key);
        self.pending.push((key, deadline));
        superseded
    }

    /// Returns true if something was pending
    pub fn cancel(&mut self, key: K) -> bool {
        let before = self.pending.len();
        self.pending.retain(|(k, _)| *k != key);
        self.pending.len() != before
    }

    pub fn deadline(&self, key: K) -> Option<f64> {
        self.pending.iter().find(|(k, _)| *k == key).map(|(_, d)| *d)
    }

    pub fn is_pending(&self, key: K) -> bool {
        self.deadline(key).is_some()
    }

    /// Earliest deadline, for arming a host wakeup
    pub fn next_deadline(&self) -> Option<f64> {
        self.pending.iter().map(|(_, d)| *d).reduce(f64::min)
    }

    /// Remove and return every task due at `now`, earliest first
    pub fn pop_due(&mut self, now: f64) -> Vec<K> {
        let mut due: Vec<(K, f64)> = Vec::new();
        self.pending.retain(|&(k, d)| {
            if d <= now {
                due.push((k, d));
                false
            } else {
                true
            }
        });
        due.sort_by(|a, b| a.1.total_cmp(&b.1));
        due.into_iter().map(|(k, _)| k).collect()
    }

    pub fn clear(&mut self) {
        self.pending.clear();
    }

    pub fn len(&self) -> usize {
        self.pending.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }
}
