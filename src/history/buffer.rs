use std::collections::VecDeque;

/// One cycle as shown on the live graphs. `t` is seconds since the first tick.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WindowPoint {
    pub t: f64,
    pub gpu: Option<f64>,
    pub cpu: Option<f64>,
    pub ram: Option<f64>,
}

/// Bounded FIFO of the most recent cycles, kept as four index-aligned sequences.
///
/// A metric that failed to read in a cycle is stored as `None` so the
/// sequences never drift apart and never show a fabricated zero.
pub struct RecentWindow {
    timestamps: VecDeque<f64>,
    gpu: VecDeque<Option<f64>>,
    cpu: VecDeque<Option<f64>>,
    ram: VecDeque<Option<f64>>,
    capacity: usize,
}

impl RecentWindow {
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            timestamps: VecDeque::with_capacity(capacity),
            gpu: VecDeque::with_capacity(capacity),
            cpu: VecDeque::with_capacity(capacity),
            ram: VecDeque::with_capacity(capacity),
            capacity,
        }
    }

    pub fn append(&mut self, point: WindowPoint) {
        self.timestamps.push_back(point.t);
        self.gpu.push_back(point.gpu);
        self.cpu.push_back(point.cpu);
        self.ram.push_back(point.ram);

        while self.timestamps.len() > self.capacity {
            self.timestamps.pop_front();
            self.gpu.pop_front();
            self.cpu.pop_front();
            self.ram.pop_front();
        }
    }

    pub fn snapshot(&self) -> Vec<WindowPoint> {
        self.timestamps.iter()
            .zip(&self.gpu)
            .zip(&self.cpu)
            .zip(&self.ram)
            .map(|(((&t, &gpu), &cpu), &ram)| WindowPoint { t, gpu, cpu, ram })
            .collect()
    }

    pub fn latest(&self) -> Option<WindowPoint> {
        let last = self.len().checked_sub(1)?;
        Some(WindowPoint {
            t: self.timestamps[last],
            gpu: self.gpu[last],
            cpu: self.cpu[last],
            ram: self.ram[last],
        })
    }

    /// Lengths of the four sequences, in (timestamps, gpu, cpu, ram) order.
    pub fn lengths(&self) -> (usize, usize, usize, usize) {
        (self.timestamps.len(), self.gpu.len(), self.cpu.len(), self.ram.len())
    }

    pub fn len(&self) -> usize {
        self.timestamps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.timestamps.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }
}

impl Default for RecentWindow {
    fn default() -> Self {
        Self::new(100)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn point(i: usize) -> WindowPoint {
        WindowPoint {
            t: i as f64,
            gpu: Some(i as f64),
            cpu: Some(i as f64 + 0.5),
            ram: Some(i as f64 + 0.25),
        }
    }

    #[test]
    fn test_keeps_last_hundred_in_order() {
        let mut window = RecentWindow::new(100);
        for i in 1..=150 {
            window.append(point(i));
        }

        let snapshot = window.snapshot();
        assert_eq!(snapshot.len(), 100);
        assert_eq!(snapshot[0], point(51));
        assert_eq!(snapshot[99], point(150));
        assert!(snapshot.windows(2).all(|w| w[0].t < w[1].t));
    }

    #[test]
    fn test_sequences_stay_aligned() {
        let mut window = RecentWindow::new(7);
        for i in 0..40 {
            let mut p = point(i);
            if i % 3 == 0 {
                p.gpu = None;
            }
            if i % 5 == 0 {
                p.ram = None;
            }
            window.append(p);
            let (t, gpu, cpu, ram) = window.lengths();
            assert!(t == gpu && gpu == cpu && cpu == ram);
            assert!(t <= window.capacity());
        }
    }

    #[test]
    fn test_missing_metric_is_not_zero() {
        let mut window = RecentWindow::new(3);
        window.append(WindowPoint { t: 0.0, gpu: None, cpu: Some(0.0), ram: Some(12.0) });

        let latest = window.latest().unwrap();
        assert_eq!(latest.gpu, None);
        assert_eq!(latest.cpu, Some(0.0));
    }

    #[test]
    fn test_snapshot_is_a_copy() {
        let mut window = RecentWindow::new(2);
        window.append(point(1));
        let mut snapshot = window.snapshot();
        snapshot[0].gpu = Some(99.0);
        snapshot.clear();
        assert_eq!(window.latest(), Some(point(1)));
    }

    #[test]
    fn test_zero_capacity_holds_one() {
        let mut window = RecentWindow::new(0);
        window.append(point(1));
        window.append(point(2));
        assert_eq!(window.len(), 1);
        assert_eq!(window.latest(), Some(point(2)));
    }
}
