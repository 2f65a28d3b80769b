/// Current value and online mean of one scalar signal.
///
/// The mean is undefined until the first update, so `val` and `avg`
/// return `None` on a fresh meter.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct AverageMeter {
    val:   f64,
    sum:   f64,
    count: u64,
}

impl AverageMeter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn reset(&mut self) {
        *self = Self::default();
    }

    /// Record one observation.
    pub fn update(&mut self, val: f64) {
        self.update_n(val, 1);
    }

    /// Record `val` as the mean of `n` observations.
    pub fn update_n(&mut self, val: f64, n: u64) {
        self.val    = val;
        self.sum   += val * n as f64;
        self.count += n;
    }

    pub fn val(&self) -> Option<f64> {
        (self.count > 0).then_some(self.val)
    }

    pub fn avg(&self) -> Option<f64> {
        (self.count > 0).then(|| self.sum / self.count as f64)
    }

    pub fn sum(&self) -> f64 {
        self.sum
    }

    pub fn count(&self) -> u64 {
        self.count
    }
}
