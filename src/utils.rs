use rand::Rng;
use rand_distr::{Distribution, Normal, Poisson};

/// Draw an event count with the given mean. Non-positive or non-finite means yield zero.
pub fn poisson_count<R: Rng + ?Sized>(mean: f64, rng: &mut R) -> u64 {
    if !(mean.is_finite() && mean > 0.0) {
        return 0;
    }
    match Poisson::new(mean) {
        Ok(dist) => {
            let sample: f64 = dist.sample(rng);
            sample as u64
        }
        Err(_) => 0,
    }
}

/// Normal draw clamped at zero. A zero spread returns the mean without touching the RNG.
pub fn normal_non_negative<R: Rng + ?Sized>(mean: f64, std_dev: f64, rng: &mut R) -> f64 {
    if std_dev <= 0.0 {
        return mean.max(0.0);
    }
    match Normal::new(mean, std_dev) {
        Ok(dist) => dist.sample(rng).max(0.0),
        Err(_) => mean.max(0.0),
    }
}

/// Multiplicative noise centred on 1.
pub fn noise_multiplier<R: Rng + ?Sized>(std_dev: f64, rng: &mut R) -> f64 {
    normal_non_negative(1.0, std_dev, rng)
}
