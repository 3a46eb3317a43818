//! Learning-rate warmup followed by linear decay.

/// Linear warmup from 0 to `base_lr` over `warmup_steps`, then
/// linear decay to 0 at `total_steps`.
///
/// `total_steps` may be fractional when the sample count does not
/// divide evenly into updates.
///
/// `lr()` is the rate for the next optimizer update; `step()`
/// is called after every update.
#[derive(Clone, Debug)]
pub struct WarmupLinearSchedule {
    base_lr:      f64,
    warmup_steps: usize,
    total_steps:  f64,
    current:      usize,
}

impl WarmupLinearSchedule {
    pub fn new(base_lr: f64, warmup_steps: usize, total_steps: f64) -> Self {
        Self { base_lr, warmup_steps, total_steps, current: 0 }
    }

    /// Scale factor applied to `base_lr` at `step`.
    pub fn multiplier(&self, step: usize) -> f64 {
        if step < self.warmup_steps {
            return step as f64 / self.warmup_steps.max(1) as f64;
        }
        let remaining = self.total_steps - step as f64;
        let span = (self.total_steps - self.warmup_steps as f64).max(1.0);
        (remaining / span).max(0.0)
    }

    pub fn lr(&self) -> f64 {
        self.base_lr * self.multiplier(self.current)
    }

    pub fn step(&mut self) {
        self.current += 1;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_warmup_is_linear() {
        let s = WarmupLinearSchedule::new(1.0, 4, 12.0);
        assert_eq!(s.multiplier(0), 0.0);
        assert_eq!(s.multiplier(1), 0.25);
        assert_eq!(s.multiplier(2), 0.5);
    }

    #[test]
    fn test_peak_then_decay_to_zero() {
        let s = WarmupLinearSchedule::new(1.0, 4, 12.0);
        assert_eq!(s.multiplier(4), 1.0);
        assert_eq!(s.multiplier(8), 0.5);
        assert_eq!(s.multiplier(12), 0.0);
        assert_eq!(s.multiplier(20), 0.0);
    }

    #[test]
    fn test_no_warmup() {
        let s = WarmupLinearSchedule::new(2.0, 0, 10.0);
        assert_eq!(s.multiplier(0), 1.0);
        assert_eq!(s.multiplier(5), 0.5);
    }

    #[test]
    fn test_step_advances_lr() {
        let mut s = WarmupLinearSchedule::new(0.1, 2, 10.0);
        assert_eq!(s.lr(), 0.0);
        s.step();
        assert!((s.lr() - 0.05).abs() < 1e-12);
        s.step();
        assert!((s.lr() - 0.1).abs() < 1e-12);
    }

    #[test]
    fn test_fractional_total_is_not_floored() {
        let s = WarmupLinearSchedule::new(1.0, 1, 2.5);
        assert!((s.multiplier(2) - 0.5 / 1.5).abs() < 1e-12);
        assert_eq!(s.multiplier(3), 0.0);
    }
}
