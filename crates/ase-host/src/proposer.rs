//! # Step Proposers
//!
//! Seeded generators of *proposed* changes. A proposer stands in for the
//! optimizer, controller or agent that drives a real host. Proposals are
//! deliberately unreliable: occasional spikes and injected non-finite
//! components exercise every enforcement path.
//!
//! Every proposer owns a [`StdRng`] seeded at construction, so the same seed
//! yields the same proposal sequence on every run.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use rand_distr::{Distribution, Normal};

use ase_envelope::LearningState;

/// Default descent rate.
pub const DEFAULT_ETA: f64 = 0.02;
/// Default standard deviation of the Gaussian proposal noise.
pub const DEFAULT_NOISE: f64 = 0.02;
/// Default probability that a proposal is amplified.
pub const DEFAULT_SPIKE_PROB: f64 = 0.02;
/// Default spike amplification.
pub const DEFAULT_SPIKE_FACTOR: f64 = 50.0;
/// Default probability of injecting `+∞` (component 0) or NaN (component 1).
pub const DEFAULT_FAULT_PROB: f64 = 0.005;

/// A source of proposed changes for states of type `S`.
pub trait Proposer<S> {
    /// Proposed change type.
    type Step;

    /// Propose the next change at `state`.
    fn propose(&mut self, state: &S) -> Self::Step;
}

impl<S, P: Proposer<S> + ?Sized> Proposer<S> for &mut P {
    type Step = P::Step;

    fn propose(&mut self, state: &S) -> Self::Step {
        (**self).propose(state)
    }
}

// ─── Noisy Descent ──────────────────────────────────────────────────

/// Noisy weight-decay descent on a parameter vector.
///
/// ```text
/// Δθᵢ = -η · θᵢ + N(0, noise²)
/// ```
///
/// With probability `spike_prob` the whole proposal is multiplied by
/// `spike_factor`; with probability `fault_prob` each, component 0 becomes
/// `+∞` and component 1 becomes NaN.
#[derive(Debug, Clone)]
pub struct NoisyDescent {
    rng: StdRng,
    eta: f64,
    noise: Option<Normal<f64>>,
    spike_prob: f64,
    spike_factor: f64,
    fault_prob: f64,
}

impl NoisyDescent {
    /// Proposer with the default noise, spike and fault rates.
    pub fn new(seed: u64, eta: f64) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
            eta,
            noise: gaussian(DEFAULT_NOISE),
            spike_prob: DEFAULT_SPIKE_PROB,
            spike_factor: DEFAULT_SPIKE_FACTOR,
            fault_prob: DEFAULT_FAULT_PROB,
        }
    }

    /// Override the noise standard deviation. Zero or non-finite disables
    /// the noise.
    pub fn with_noise(mut self, std_dev: f64) -> Self {
        self.noise = gaussian(std_dev);
        self
    }

    /// Override the spike probability and amplification.
    pub fn with_spikes(mut self, prob: f64, factor: f64) -> Self {
        self.spike_prob = probability(prob);
        self.spike_factor = factor;
        self
    }

    /// Override the per-component non-finite injection probability.
    pub fn with_faults(mut self, prob: f64) -> Self {
        self.fault_prob = probability(prob);
        self
    }

    /// Descent rate.
    pub fn eta(&self) -> f64 {
        self.eta
    }

    fn descend(&mut self, theta: &[f64]) -> Vec<f64> {
        let mut d: Vec<f64> = theta
            .iter()
            .map(|t| -self.eta * t + self.jitter())
            .collect();

        if self.rng.gen_bool(self.spike_prob) {
            d.iter_mut().for_each(|x| *x *= self.spike_factor);
        }
        if self.rng.gen_bool(self.fault_prob) {
            if let Some(x) = d.get_mut(0) {
                *x = f64::INFINITY;
            }
        }
        if self.rng.gen_bool(self.fault_prob) {
            if let Some(x) = d.get_mut(1) {
                *x = f64::NAN;
            }
        }
        d
    }

    fn jitter(&mut self) -> f64 {
        match self.noise {
            Some(normal) => normal.sample(&mut self.rng),
            None => 0.0,
        }
    }
}

impl Proposer<Vec<f64>> for NoisyDescent {
    type Step = Vec<f64>;

    fn propose(&mut self, state: &Vec<f64>) -> Vec<f64> {
        self.descend(state)
    }
}

impl Proposer<LearningState> for NoisyDescent {
    type Step = Vec<f64>;

    fn propose(&mut self, state: &LearningState) -> Vec<f64> {
        self.descend(&state.theta)
    }
}

// ─── Scalar Walk ────────────────────────────────────────────────────

/// Uniform random walk proposals for scalar domains.
///
/// Proposals are `U(-amplitude, amplitude)`, amplified by `spike_factor` with
/// probability `spike_prob`, and replaced by NaN with probability
/// `fault_prob`.
#[derive(Debug, Clone)]
pub struct ScalarWalk {
    rng: StdRng,
    amplitude: f64,
    spike_prob: f64,
    spike_factor: f64,
    fault_prob: f64,
}

impl ScalarWalk {
    /// Walk with half-width `amplitude` and the default spike and fault rates.
    pub fn new(seed: u64, amplitude: f64) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
            amplitude: magnitude(amplitude),
            spike_prob: DEFAULT_SPIKE_PROB,
            spike_factor: DEFAULT_SPIKE_FACTOR,
            fault_prob: DEFAULT_FAULT_PROB,
        }
    }

    /// Override the spike probability and amplification.
    pub fn with_spikes(mut self, prob: f64, factor: f64) -> Self {
        self.spike_prob = probability(prob);
        self.spike_factor = factor;
        self
    }

    /// Override the NaN injection probability.
    pub fn with_faults(mut self, prob: f64) -> Self {
        self.fault_prob = probability(prob);
        self
    }
}

impl Proposer<f64> for ScalarWalk {
    type Step = f64;

    fn propose(&mut self, _state: &f64) -> f64 {
        let mut d = if self.amplitude > 0.0 {
            self.rng.gen_range(-self.amplitude..=self.amplitude)
        } else {
            0.0
        };
        if self.rng.gen_bool(self.spike_prob) {
            d *= self.spike_factor;
        }
        if self.rng.gen_bool(self.fault_prob) {
            d = f64::NAN;
        }
        d
    }
}

/// Clamp to `[0, 1]`; NaN disables the event.
fn probability(p: f64) -> f64 {
    if p.is_nan() {
        0.0
    } else {
        p.clamp(0.0, 1.0)
    }
}

/// Widths whose symmetric range `[-w, w]` is not finite disable the source.
fn magnitude(w: f64) -> f64 {
    if (2.0 * w).is_finite() {
        w.abs()
    } else {
        0.0
    }
}

fn gaussian(std_dev: f64) -> Option<Normal<f64>> {
    match magnitude(std_dev) {
        s if s > 0.0 => Normal::new(0.0, s).ok(),
        _ => None,
    }
}

/// Starting parameters used by the reference scenarios: every component at
/// `0.20`, the sign-preserved prefix at `0.15`.
pub fn initial_theta(dim: usize, sign_preserve: usize) -> Vec<f64> {
    (0..dim)
        .map(|i| if i < sign_preserve { 0.15 } else { 0.20 })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn bits(v: &[f64]) -> Vec<u64> {
        v.iter().map(|x| x.to_bits()).collect()
    }

    #[test]
    fn test_same_seed_same_sequence() {
        let theta = initial_theta(16, 4);
        let mut a = NoisyDescent::new(12345, DEFAULT_ETA);
        let mut b = NoisyDescent::new(12345, DEFAULT_ETA);
        for _ in 0..200 {
            let pa: Vec<f64> = a.propose(&theta);
            let pb: Vec<f64> = b.propose(&theta);
            assert_eq!(bits(&pa), bits(&pb));
        }
    }

    #[test]
    fn test_different_seeds_diverge() {
        let theta = initial_theta(16, 4);
        let pa: Vec<f64> = NoisyDescent::new(1, DEFAULT_ETA).propose(&theta);
        let pb: Vec<f64> = NoisyDescent::new(2, DEFAULT_ETA).propose(&theta);
        assert_ne!(bits(&pa), bits(&pb));
    }

    #[test]
    fn test_noiseless_descent_is_weight_decay() {
        let mut p = NoisyDescent::new(7, 0.1)
            .with_noise(0.0)
            .with_spikes(0.0, 50.0)
            .with_faults(0.0);
        let d: Vec<f64> = p.propose(&vec![1.0, -2.0]);
        assert_eq!(d, vec![-0.1, 0.2]);
    }

    #[test]
    fn test_fault_injection_targets_first_components() {
        let mut p = NoisyDescent::new(3, DEFAULT_ETA).with_faults(1.0);
        let d: Vec<f64> = p.propose(&vec![0.1; 4]);
        assert_eq!(d[0], f64::INFINITY);
        assert!(d[1].is_nan());
        assert!(d[2].is_finite() && d[3].is_finite());
    }

    #[test]
    fn test_fault_injection_on_short_vectors() {
        let mut p = NoisyDescent::new(3, DEFAULT_ETA).with_faults(1.0);
        let d: Vec<f64> = p.propose(&vec![0.1]);
        assert_eq!(d.len(), 1);
        assert_eq!(d[0], f64::INFINITY);
    }

    #[test]
    fn test_learning_state_proposals_follow_theta() {
        let mut p = NoisyDescent::new(9, 0.5)
            .with_noise(0.0)
            .with_spikes(0.0, 1.0)
            .with_faults(0.0);
        let d = p.propose(&LearningState::new(vec![2.0, 4.0]));
        assert_eq!(d, vec![-1.0, -2.0]);
    }

    #[test]
    fn test_scalar_walk_bounds_without_spikes() {
        let mut w = ScalarWalk::new(11, 0.3).with_spikes(0.0, 1.0).with_faults(0.0);
        for _ in 0..500 {
            let d = w.propose(&0.0);
            assert!(d.abs() <= 0.3);
        }
    }

    #[test]
    fn test_scalar_walk_injects_nan() {
        let mut w = ScalarWalk::new(11, 0.3).with_faults(1.0);
        assert!(w.propose(&0.0).is_nan());
    }

    #[test]
    fn test_descent_noise_is_gaussian() {
        let mut p = NoisyDescent::new(21, 0.0)
            .with_spikes(0.0, 1.0)
            .with_faults(0.0);
        let d: Vec<f64> = p.propose(&vec![0.0; 20_000]);
        let n = d.len() as f64;
        let mean = d.iter().sum::<f64>() / n;
        let var = d.iter().map(|x| (x - mean).powi(2)).sum::<f64>() / n;
        assert!(mean.abs() < 1e-3, "mean {mean}");
        assert!((var.sqrt() - DEFAULT_NOISE).abs() < 1e-3, "std {}", var.sqrt());
        assert!(d.iter().any(|x| x.abs() > 2.0 * DEFAULT_NOISE));
    }

    #[test]
    fn test_overflowing_widths_disable_noise() {
        let mut w = ScalarWalk::new(5, 1e308).with_spikes(0.0, 1.0).with_faults(0.0);
        assert_eq!(w.propose(&0.0), 0.0);

        let mut p = NoisyDescent::new(5, 0.5)
            .with_noise(f64::MAX)
            .with_spikes(0.0, 1.0)
            .with_faults(0.0);
        let d: Vec<f64> = p.propose(&vec![1.0, 2.0]);
        assert_eq!(d, vec![-0.5, -1.0]);
    }

    #[test]
    fn test_initial_theta() {
        let t = initial_theta(5, 2);
        assert_eq!(t, vec![0.15, 0.15, 0.20, 0.20, 0.20]);
    }
}
