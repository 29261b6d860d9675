/// Статистика одного успешного запуска
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct RunMetrics {
    pub limit: usize,
    pub workers: usize,
    pub dispatched: usize,
    pub collected: usize,
    pub peak_in_flight: usize,
}

impl RunMetrics {
    pub fn utilization(&self) -> f64 {
        if self.limit == 0 {
            return 0.0;
        }
        self.peak_in_flight as f64 / self.limit as f64
    }

    pub fn pending(&self) -> usize {
        self.dispatched.saturating_sub(self.collected)
    }
}
