/*!
The four-parameter psychometric response model.

A [`Psychometric`] maps a signed stimulus intensity (e.g. contrast times
position, negative for leftward stimuli) to the probability of a rightward
choice. The curve is a cumulative normal with threshold `mu` and slope
`sigma`, mixed with a stimulus-independent lapse process: on a lapse trial
(probability `lapse_rate`) the subject guesses rightward with probability
`lapse_bias`.

The struct is generic over the floating-point precision (e.g., `f32` or
`f64`) using the [`num_traits::Float`] trait.

# Examples

```rust
use psyfit::psychometric::Psychometric;

let model: Psychometric<f64> = Psychometric::new(0.0, 0.5, 0.1, 0.5).unwrap();
let p = model.prob_rightward(0.25);
assert!(p > 0.5 && p < 1.0);
```
*/

use crate::error::Error;
use ndarray::Array1;
use num_traits::Float;
use rand::Rng;
use std::f64::consts::SQRT_2;

/// Standard normal cumulative distribution function.
pub fn norm_cdf(z: f64) -> f64 {
    0.5 * (1.0 + libm::erf(z / SQRT_2))
}

/// A sigmoid-with-lapse response-probability model.
///
/// Parameter order, as used by [`Psychometric::from_params`] and everywhere a
/// flat `theta` vector appears, is `[mu, sigma, lapse_rate, lapse_bias]`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Psychometric<T: Float> {
    /// Threshold: the signed stimulus at which the lapse-free curve crosses 0.5.
    pub mu: T,
    /// Slope of the cumulative normal, in stimulus units. Must be positive.
    pub sigma: T,
    /// Probability of a stimulus-independent lapse trial, in [0, 1].
    pub lapse_rate: T,
    /// Probability of a rightward guess on a lapse trial, in [0, 1].
    pub lapse_bias: T,
}

impl<T: Float> Psychometric<T> {
    pub fn new(mu: T, sigma: T, lapse_rate: T, lapse_bias: T) -> Result<Self, Error> {
        if !mu.is_finite() {
            return Err(Error::InvalidParameter("mu must be finite"));
        }
        if !(sigma.is_finite() && sigma > T::zero()) {
            return Err(Error::InvalidParameter("sigma must be positive and finite"));
        }
        if !(lapse_rate >= T::zero() && lapse_rate <= T::one()) {
            return Err(Error::InvalidParameter("lapse_rate must be in [0, 1]"));
        }
        if !(lapse_bias >= T::zero() && lapse_bias <= T::one()) {
            return Err(Error::InvalidParameter("lapse_bias must be in [0, 1]"));
        }
        Ok(Self {
            mu,
            sigma,
            lapse_rate,
            lapse_bias,
        })
    }

    /// Builds a model from a flat `[mu, sigma, lapse_rate, lapse_bias]` vector.
    pub fn from_params(theta: &[T]) -> Result<Self, Error> {
        if theta.len() != 4 {
            return Err(Error::InvalidParameter(
                "theta must have exactly four elements",
            ));
        }
        Self::new(theta[0], theta[1], theta[2], theta[3])
    }

    /// Returns the model parameters as a flat vector.
    pub fn params(&self) -> Vec<T> {
        vec![self.mu, self.sigma, self.lapse_rate, self.lapse_bias]
    }

    /// Probability of a rightward choice at the given signed stimulus.
    ///
    /// `p(s) = lapse_rate * lapse_bias + (1 - lapse_rate) * Phi((s - mu) / sigma)`
    pub fn prob_rightward(&self, signed_stimulus: T) -> T {
        let z = ((signed_stimulus - self.mu) / self.sigma)
            .to_f64()
            .unwrap_or(f64::NAN);
        let phi = T::from(norm_cdf(z)).unwrap();
        self.lapse_rate * self.lapse_bias + (T::one() - self.lapse_rate) * phi
    }

    /// Vectorized [`Self::prob_rightward`] over an array of signed stimuli.
    pub fn prob_rightward_arr(&self, signed_stimuli: &Array1<T>) -> Array1<T> {
        signed_stimuli.mapv(|s| self.prob_rightward(s))
    }

    /// Draws Bernoulli choices (+1 rightward, -1 leftward) at the given stimuli.
    pub fn simulate<R: Rng>(&self, signed_stimuli: &[T], rng: &mut R) -> Vec<i8> {
        signed_stimuli
            .iter()
            .map(|&s| {
                let p = self.prob_rightward(s).to_f64().unwrap_or(0.5);
                if rng.gen::<f64>() < p {
                    1
                } else {
                    -1
                }
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    #[test]
    fn lapse_free_curve_matches_normal_cdf() {
        let model = Psychometric::new(0.0, 1.0, 0.0, 0.5).unwrap();
        assert_abs_diff_eq!(model.prob_rightward(0.0), 0.5, epsilon = 1e-12);
        assert_abs_diff_eq!(model.prob_rightward(1.0), 0.8413447460685429, epsilon = 1e-9);
        assert_abs_diff_eq!(
            model.prob_rightward(-1.0),
            1.0 - 0.8413447460685429,
            epsilon = 1e-9
        );
    }

    #[test]
    fn lapse_mixture_value() {
        // p = gamma*lambda + (1-lambda)*Phi(z); at s = mu, Phi = 0.5.
        let model = Psychometric::new(0.2, 0.5, 0.2, 0.75).unwrap();
        assert_abs_diff_eq!(
            model.prob_rightward(0.2),
            0.2 * 0.75 + 0.8 * 0.5,
            epsilon = 1e-12
        );
    }

    #[test]
    fn bounded_in_unit_interval() {
        let models = [
            Psychometric::new(0.0, 0.1, 0.0, 0.0).unwrap(),
            Psychometric::new(-0.5, 2.0, 1.0, 1.0).unwrap(),
            Psychometric::new(0.3, 0.01, 0.5, 0.25).unwrap(),
        ];
        for model in &models {
            for i in -100..=100 {
                let s = i as f64 * 0.1;
                let p = model.prob_rightward(s);
                assert!((0.0..=1.0).contains(&p), "p={p} out of [0,1] at s={s}");
            }
            // Extremes of the stimulus axis stay bounded too.
            assert!((0.0..=1.0).contains(&model.prob_rightward(f64::MAX)));
            assert!((0.0..=1.0).contains(&model.prob_rightward(f64::MIN)));
        }
    }

    #[test]
    fn monotone_in_signed_stimulus() {
        let model = Psychometric::new(0.1, 0.3, 0.15, 0.6).unwrap();
        let mut prev = model.prob_rightward(-2.0);
        for i in 1..=400 {
            let s = -2.0 + i as f64 * 0.01;
            let p = model.prob_rightward(s);
            assert!(p >= prev, "non-monotone at s={s}: {p} < {prev}");
            prev = p;
        }
    }

    #[test]
    fn rejects_bad_parameters() {
        assert!(Psychometric::new(0.0, 0.0, 0.1, 0.5).is_err());
        assert!(Psychometric::new(0.0, -1.0, 0.1, 0.5).is_err());
        assert!(Psychometric::new(0.0, 1.0, 1.5, 0.5).is_err());
        assert!(Psychometric::new(0.0, 1.0, 0.1, -0.1).is_err());
        assert!(Psychometric::new(f64::NAN, 1.0, 0.1, 0.5).is_err());
        assert!(Psychometric::<f64>::from_params(&[0.0, 1.0, 0.1]).is_err());
    }

    #[test]
    fn simulate_tracks_probability() {
        use rand::rngs::SmallRng;
        use rand::SeedableRng;

        let model = Psychometric::new(0.0, 0.5, 0.1, 0.5).unwrap();
        let mut rng = SmallRng::seed_from_u64(7);
        let stimuli = vec![0.5; 20_000];
        let choices = model.simulate(&stimuli, &mut rng);
        let p_hat =
            choices.iter().filter(|&&c| c > 0).count() as f64 / choices.len() as f64;
        assert_abs_diff_eq!(p_hat, model.prob_rightward(0.5), epsilon = 0.01);
    }
}
