use std::sync::atomic::{AtomicUsize, Ordering};

/// Source of uniformly distributed values in `[0, 1)`
pub trait RandomSource: Send + Sync {
    fn uniform(&self) -> f64;
}

/// Thread-local generator from `rand`
#[derive(Debug, Default, Clone, Copy)]
pub struct ThreadRandom;

impl RandomSource for ThreadRandom {
    fn uniform(&self) -> f64 {
        rand::random::<f64>()
    }
}

/// Replays a fixed sequence of values, wrapping around at the end
///
/// Used to make weighted draws deterministic.
#[derive(Debug)]
pub struct FixedRandom {
    values: Vec<f64>,
    cursor: AtomicUsize,
}

impl FixedRandom {
    /// Panics if `values` is empty or contains anything outside `[0, 1)`
    pub fn new(values: Vec<f64>) -> Self {
        assert!(!values.is_empty(), "FixedRandom needs at least one value");
        assert!(
            values.iter().all(|v| (0.0..1.0).contains(v)),
            "FixedRandom values must lie in [0, 1)"
        );
        Self {
            values,
            cursor: AtomicUsize::new(0),
        }
    }
}

impl RandomSource for FixedRandom {
    fn uniform(&self) -> f64 {
        let index = self.cursor.fetch_add(1, Ordering::Relaxed);
        self.values[index % self.values.len()]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_thread_random_stays_in_unit_interval() {
        let source = ThreadRandom;
        for _ in 0..1_000 {
            let value = source.uniform();
            assert!((0.0..1.0).contains(&value));
        }
    }

    #[test]
    fn test_fixed_random_wraps() {
        let source = FixedRandom::new(vec![0.1, 0.9]);
        assert_eq!(source.uniform(), 0.1);
        assert_eq!(source.uniform(), 0.9);
        assert_eq!(source.uniform(), 0.1);
    }

    #[test]
    #[should_panic(expected = "[0, 1)")]
    fn test_fixed_random_rejects_one() {
        FixedRandom::new(vec![1.0]);
    }
}
