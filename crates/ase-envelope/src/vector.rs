//! Dense `f64` vector helpers shared by the vector envelopes.
//!
//! Norms use Neumaier-compensated summation so that long runs near the
//! envelope boundary do not drift across it through accumulated rounding.

/// Sum with Neumaier compensation.
fn compensated_sum(values: impl Iterator<Item = f64>) -> f64 {
    let mut sum = 0.0_f64;
    let mut carry = 0.0_f64;
    for x in values {
        let t = sum + x;
        if sum.abs() >= x.abs() {
            carry += (sum - t) + x;
        } else {
            carry += (x - t) + sum;
        }
        sum = t;
    }
    sum + carry
}

/// Euclidean norm.
pub fn l2_norm(v: &[f64]) -> f64 {
    compensated_sum(v.iter().map(|x| x * x)).sqrt()
}

/// Euclidean distance `‖a - b‖₂`. Extra components of the longer slice are ignored.
pub fn l2_distance(a: &[f64], b: &[f64]) -> f64 {
    compensated_sum(a.iter().zip(b).map(|(x, y)| (x - y) * (x - y))).sqrt()
}

/// Largest absolute component, `‖v‖∞`. Zero for an empty slice.
pub fn max_abs(v: &[f64]) -> f64 {
    v.iter().fold(0.0_f64, |acc, x| acc.max(x.abs()))
}

/// `a + b`, component-wise.
pub fn add(a: &[f64], b: &[f64]) -> Vec<f64> {
    a.iter().zip(b).map(|(x, y)| x + y).collect()
}

/// `a - b`, component-wise.
pub fn sub(a: &[f64], b: &[f64]) -> Vec<f64> {
    a.iter().zip(b).map(|(x, y)| x - y).collect()
}

/// `k · v`.
pub fn scaled(v: &[f64], k: f64) -> Vec<f64> {
    v.iter().map(|x| x * k).collect()
}

/// Whether every component is finite.
pub fn all_finite(v: &[f64]) -> bool {
    v.iter().all(|x| x.is_finite())
}

/// Shrink `v` radially onto the ball of the given radius if it lies outside.
pub fn project_onto_ball(v: &mut [f64], radius: f64) {
    let n = l2_norm(v);
    if n > radius && n > 0.0 {
        let k = radius / n;
        v.iter_mut().for_each(|x| *x *= k);
    }
}

/// Clamp the first `prefix` components to be non-negative.
pub fn clamp_sign_prefix(v: &mut [f64], prefix: usize) {
    v.iter_mut().take(prefix).for_each(|x| {
        if *x < 0.0 {
            *x = 0.0;
        }
    });
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_l2_norm() {
        assert_eq!(l2_norm(&[3.0, 4.0]), 5.0);
        assert_eq!(l2_norm(&[]), 0.0);
        assert!(l2_norm(&[f64::NAN, 1.0]).is_nan());
    }

    #[test]
    fn test_compensated_sum_keeps_small_terms() {
        let values = [1e16, 1.0, -1e16];
        assert_eq!(compensated_sum(values.into_iter()), 1.0);
    }

    #[test]
    fn test_l2_distance() {
        assert_eq!(l2_distance(&[1.0, 1.0], &[4.0, 5.0]), 5.0);
    }

    #[test]
    fn test_arithmetic() {
        assert_eq!(add(&[1.0, 2.0], &[0.5, -2.0]), vec![1.5, 0.0]);
        assert_eq!(sub(&[1.0, 2.0], &[0.5, -2.0]), vec![0.5, 4.0]);
        assert_eq!(scaled(&[1.0, -2.0], 0.5), vec![0.5, -1.0]);
        assert_eq!(max_abs(&[0.5, -3.0, 2.0]), 3.0);
    }

    #[test]
    fn test_project_onto_ball() {
        let mut v = vec![6.0, 8.0];
        project_onto_ball(&mut v, 5.0);
        assert!((l2_norm(&v) - 5.0).abs() < 1e-12);
        assert!((v[0] - 3.0).abs() < 1e-12);

        let mut inside = vec![1.0, 1.0];
        project_onto_ball(&mut inside, 5.0);
        assert_eq!(inside, vec![1.0, 1.0]);
    }

    #[test]
    fn test_clamp_sign_prefix() {
        let mut v = vec![-1.0, 2.0, -3.0];
        clamp_sign_prefix(&mut v, 2);
        assert_eq!(v, vec![0.0, 2.0, -3.0]);
    }
}
