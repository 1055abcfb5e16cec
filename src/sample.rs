/*!
Posterior approximation through the external `emcee` ensemble sampler.

The sampler itself is a black box: this module only adapts [`Posterior`] to
its [`emcee::Prob`] interface, configures walkers, and collects the walker
positions of each post-burn-in iteration into an [`ndarray::Array2`] of
draws.
*/

use crate::error::Error;
use crate::likelihood::log_likelihood;
use crate::posterior::{LogDensity, Posterior};
use crate::priors::LnPrior;
use crate::psychometric::Psychometric;
use emcee::{EnsembleSampler, Guess, Prob};
use ndarray::{Array1, Array2, Axis};

impl Prob for Posterior<'_> {
    fn lnlike(&self, params: &Guess) -> f32 {
        let theta: Vec<f64> = params.values.iter().map(|&v| v as f64).collect();
        match Psychometric::from_params(&theta) {
            Ok(model) => log_likelihood(self.data(), &model) as f32,
            Err(_) => f32::NEG_INFINITY,
        }
    }

    fn lnprior(&self, params: &Guess) -> f32 {
        let theta: Vec<f64> = params.values.iter().map(|&v| v as f64).collect();
        self.prior().ln_pdf(&theta) as f32
    }
}

/// Walker and chain-length configuration for the ensemble sampler.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SampleConfig {
    /// Number of walkers; must be even and should exceed twice the dimension.
    pub nwalkers: usize,
    /// Post-burn-in iterations to keep.
    pub nsamples: usize,
    /// Leading iterations to discard.
    pub burnin: usize,
}

impl Default for SampleConfig {
    fn default() -> Self {
        Self {
            nwalkers: 64,
            nsamples: 500,
            burnin: 200,
        }
    }
}

/// Flattened post-burn-in posterior draws, one row per draw.
#[derive(Debug, Clone, PartialEq)]
pub struct PosteriorSamples {
    pub samples: Array2<f64>,
}

impl PosteriorSamples {
    pub fn len(&self) -> usize {
        self.samples.shape()[0]
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn ndim(&self) -> usize {
        self.samples.shape()[1]
    }

    /// Posterior mean of each parameter.
    pub fn mean(&self) -> Array1<f64> {
        self.samples
            .mean_axis(Axis(0))
            .expect("Expecting at least one posterior draw.")
    }

    /// Posterior standard deviation of each parameter.
    pub fn std(&self) -> Array1<f64> {
        self.samples.std_axis(Axis(0), 1.0)
    }

    /// The draw with the highest value of `target`, and that value.
    pub fn best_draw<D: LogDensity>(&self, target: &D) -> (Vec<f64>, f64) {
        let mut best = (Vec::new(), f64::NEG_INFINITY);
        for row in self.samples.axis_iter(Axis(0)) {
            let theta = row.to_vec();
            let lp = target.unnorm_log_prob(&theta);
            if lp > best.1 || best.0.is_empty() {
                best = (theta, lp);
            }
        }
        best
    }
}

/// Runs the ensemble sampler on a posterior, walkers initialized in a small
/// ball around `center` (typically the MAP estimate).
pub fn sample_posterior(
    posterior: &Posterior<'_>,
    config: &SampleConfig,
    center: &[f64],
) -> Result<PosteriorSamples, Error> {
    let ndim = center.len();
    if config.nwalkers < 2 * ndim || config.nwalkers % 2 != 0 {
        return Err(Error::Sampler(format!(
            "nwalkers must be even and at least {}, got {}",
            2 * ndim,
            config.nwalkers
        )));
    }

    let center32: Vec<f32> = center.iter().map(|&v| v as f32).collect();
    let guess = Guess::new(&center32);
    let initial = guess.create_initial_guess(config.nwalkers);

    let mut sampler = EnsembleSampler::new(config.nwalkers, ndim, posterior)
        .map_err(|e| Error::Sampler(format!("{e:?}")))?;
    let n_iterations = config.burnin + config.nsamples;

    // Collect every walker's position once per post-burn-in iteration; one
    // row per draw, nwalkers draws per iteration.
    let mut samples = Array2::<f64>::zeros((config.nsamples * config.nwalkers, ndim));
    let mut iteration = 0usize;
    sampler
        .sample(&initial, n_iterations, |step| {
            if iteration >= config.burnin {
                let row0 = (iteration - config.burnin) * config.nwalkers;
                for (w, walker) in step.pos.iter().enumerate() {
                    for (j, &v) in walker.values.iter().enumerate() {
                        samples[[row0 + w, j]] = v as f64;
                    }
                }
            }
            iteration += 1;
        })
        .map_err(|e| Error::Sampler(format!("{e:?}")))?;
    log::debug!(
        "kept {} posterior draws from {} walkers x {} iterations",
        samples.shape()[0],
        config.nwalkers,
        n_iterations
    );
    Ok(PosteriorSamples { samples })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bounds::ParameterBounds;
    use crate::data::Dataset;
    use crate::priors::Prior;
    use crate::psychometric::Psychometric;
    use approx::assert_abs_diff_eq;
    use ndarray::arr2;
    use rand::rngs::SmallRng;
    use rand::SeedableRng;

    fn bounds() -> ParameterBounds {
        ParameterBounds::new(
            vec![-1.0, 0.01, 0.0, 0.0],
            vec![1.0, 2.0, 1.0, 1.0],
            vec![-0.5, 0.05, 0.01, 0.2],
            vec![0.5, 1.0, 0.5, 0.8],
        )
        .unwrap()
    }

    #[test]
    fn summaries() {
        let samples = PosteriorSamples {
            samples: arr2(&[[0.0, 1.0], [2.0, 3.0], [4.0, 5.0]]),
        };
        assert_eq!(samples.len(), 3);
        assert_eq!(samples.ndim(), 2);
        assert_abs_diff_eq!(samples.mean()[0], 2.0, epsilon = 1e-12);
        assert_abs_diff_eq!(samples.std()[1], 2.0, epsilon = 1e-12);
    }

    #[test]
    fn keeps_one_row_per_walker_per_kept_iteration() {
        let data = Dataset::new(vec![]);
        let posterior = Posterior::new(&data, Prior::uniform_box(bounds()));
        let config = SampleConfig {
            nwalkers: 10,
            nsamples: 20,
            burnin: 5,
        };
        let samples = sample_posterior(&posterior, &config, &[0.0, 0.3, 0.1, 0.5]).unwrap();
        assert_eq!(samples.len(), config.nwalkers * config.nsamples);
        assert_eq!(samples.ndim(), 4);
        // Every kept draw must be a full walker position inside the prior box.
        let b = bounds();
        for row in samples.samples.axis_iter(ndarray::Axis(0)) {
            assert!(b.contains(&row.to_vec()));
        }
    }

    #[test]
    fn rejects_bad_walker_count() {
        let data = Dataset::new(vec![]);
        let posterior = Posterior::new(&data, Prior::uniform_box(bounds()));
        let config = SampleConfig {
            nwalkers: 7,
            nsamples: 10,
            burnin: 0,
        };
        assert!(sample_posterior(&posterior, &config, &[0.0, 0.3, 0.1, 0.5]).is_err());
    }

    #[test]
    #[ignore = "Slow test: run only when explicitly requested"]
    fn recovers_threshold_from_synthetic_session() {
        let truth = Psychometric::new(0.1, 0.2, 0.1, 0.5).unwrap();
        let mut rng = SmallRng::seed_from_u64(5);
        let data = Dataset::synthetic(&truth, &[0.0, 0.0625, 0.125, 0.25, 1.0], 2000, &mut rng);
        let posterior = Posterior::new(&data, Prior::trapezoidal(bounds()));

        let config = SampleConfig {
            nwalkers: 32,
            nsamples: 400,
            burnin: 300,
        };
        let samples =
            sample_posterior(&posterior, &config, &[0.0, 0.3, 0.1, 0.5]).unwrap();
        assert_eq!(samples.ndim(), 4);
        let mean = samples.mean();
        assert_abs_diff_eq!(mean[0], truth.mu, epsilon = 0.1);
        assert_abs_diff_eq!(mean[1], truth.sigma, epsilon = 0.15);
    }
}
