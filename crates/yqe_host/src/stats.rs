//! Survival statistics over independent randomized benchmarking runs.
//!
//! Each run reports, per circuit length, the number of failed shots. These
//! trackers turn the failures into survival probabilities and summarise
//! them across runs so the decay with length is visible at a glance.

const BUCKETS: usize = 20;

/// Summary of the survival probabilities observed at one circuit length.
#[derive(Debug, Clone, PartialEq)]
pub struct SurvivalStats {
    pub length: u32,
    pub min: f64,
    pub max: f64,
    pub sum: f64,
    pub sum_sq: f64,
    pub count: u64,
    /// Histogram in 5% buckets of survival probability.
    pub buckets: [u64; BUCKETS],
}

impl SurvivalStats {
    pub fn new(length: u32) -> Self {
        Self {
            length,
            min: f64::INFINITY,
            max: f64::NEG_INFINITY,
            sum: 0.0,
            sum_sq: 0.0,
            count: 0,
            buckets: [0; BUCKETS],
        }
    }

    /// Records one run: `failures` out of `shots`.
    pub fn update(&mut self, failures: i32, shots: u64) {
        if shots == 0 {
            return;
        }
        let survival = (1.0 - f64::from(failures) / shots as f64).clamp(0.0, 1.0);
        self.min = self.min.min(survival);
        self.max = self.max.max(survival);
        self.sum += survival;
        self.sum_sq += survival * survival;
        self.count += 1;

        let idx = ((survival * BUCKETS as f64) as usize).min(BUCKETS - 1);
        self.buckets[idx] += 1;
    }

    /// Mean survival, 0.0 before any update.
    pub fn mean(&self) -> f64 {
        if self.count == 0 {
            0.0
        } else {
            self.sum / self.count as f64
        }
    }

    /// Sample standard deviation, 0.0 for fewer than two runs.
    pub fn std_dev(&self) -> f64 {
        if self.count < 2 {
            return 0.0;
        }
        let n = self.count as f64;
        let var = (self.sum_sq - self.sum * self.sum / n) / (n - 1.0);
        var.max(0.0).sqrt()
    }

    pub fn print_report(&self) {
        println!(
            "L={:<5} runs={:<4} mean={:.4} sd={:.4} min={:.4} max={:.4}",
            self.length,
            self.count,
            self.mean(),
            self.std_dev(),
            self.min,
            self.max
        );
        for (i, &count) in self.buckets.iter().enumerate() {
            if count > 0 {
                let lower = i * 100 / BUCKETS;
                let upper = (i + 1) * 100 / BUCKETS;
                println!("    [{:3}-{:3}%]: {}", lower, upper, count);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tracks_extremes_and_mean() {
        let mut s = SurvivalStats::new(8);
        s.update(0, 1000);
        s.update(200, 1000);
        s.update(100, 1000);
        assert_eq!(s.count, 3);
        assert_eq!(s.max, 1.0);
        assert!((s.min - 0.8).abs() < 1e-12);
        assert!((s.mean() - 0.9).abs() < 1e-12);
        assert!((s.std_dev() - 0.1).abs() < 1e-12);
        assert_eq!(s.buckets[BUCKETS - 1], 1);
        assert_eq!(s.buckets[18], 1);
        assert_eq!(s.buckets[16], 1);
    }

    #[test]
    fn empty_stats_are_zero() {
        let mut s = SurvivalStats::new(1);
        s.update(5, 0);
        assert_eq!(s.count, 0);
        assert_eq!(s.mean(), 0.0);
        assert_eq!(s.std_dev(), 0.0);
    }
}
