/*!
MAP estimation by delegation to an external optimizer.

The preferred engine is COBYLA (Constrained Optimization BY Linear
Approximations), a derivative-free algorithm that takes the negated
log-posterior and the hard box bounds as-is. It lives behind the default-on
`cobyla` cargo feature; with the feature disabled, [`MapAlgorithm::default`]
falls back to the generic alternative of taking the best draw of the
ensemble sampler. Neither path implements any optimization in this crate.
*/

use crate::bounds::ParameterBounds;
use crate::error::Error;
use crate::posterior::Posterior;
use crate::sample::{sample_posterior, SampleConfig};

/// A maximum-a-posteriori estimate.
#[derive(Debug, Clone, PartialEq)]
pub struct MapEstimate {
    /// Parameter vector at the optimum, `[mu, sigma, lapse_rate, lapse_bias]`.
    pub theta: Vec<f64>,
    /// Unnormalized log-posterior at `theta`.
    pub log_prob: f64,
    /// Whether the engine reported convergence.
    pub success: bool,
}

/// COBYLA stopping configuration.
#[cfg(feature = "cobyla")]
#[derive(Debug, Clone, PartialEq)]
pub struct CobylaConfig {
    /// Maximum number of objective evaluations.
    pub niterations: u32,
    /// Initial change to the parameters.
    pub rhobeg: f64,
    /// Relative tolerance on the objective for convergence.
    pub ftol_rel: f64,
}

#[cfg(feature = "cobyla")]
impl Default for CobylaConfig {
    fn default() -> Self {
        Self {
            niterations: 2000,
            rhobeg: 0.25,
            ftol_rel: 1e-8,
        }
    }
}

/// The engine used for MAP estimation.
#[derive(Debug, Clone, PartialEq)]
pub enum MapAlgorithm {
    #[cfg(feature = "cobyla")]
    Cobyla(CobylaConfig),
    /// Best draw of the ensemble sampler; the fallback when the
    /// derivative-free optimizer is compiled out.
    EnsembleBest(SampleConfig),
}

impl Default for MapAlgorithm {
    #[cfg(feature = "cobyla")]
    fn default() -> Self {
        MapAlgorithm::Cobyla(CobylaConfig::default())
    }

    #[cfg(not(feature = "cobyla"))]
    fn default() -> Self {
        MapAlgorithm::EnsembleBest(SampleConfig::default())
    }
}

impl MapAlgorithm {
    /// Maximizes the posterior within the hard bounds, starting at `x0`.
    pub fn estimate(
        &self,
        posterior: &Posterior<'_>,
        bounds: &ParameterBounds,
        x0: &[f64],
    ) -> Result<MapEstimate, Error> {
        if !bounds.contains(x0) {
            return Err(Error::InvalidParameter(
                "starting point must lie inside the hard bounds",
            ));
        }
        match self {
            #[cfg(feature = "cobyla")]
            MapAlgorithm::Cobyla(config) => Ok(cobyla_estimate(config, posterior, bounds, x0)),
            MapAlgorithm::EnsembleBest(config) => {
                ensemble_best_estimate(config, posterior, x0)
            }
        }
    }
}

/// MAP estimation with the default engine, starting from the plausible
/// midpoint of the prior bounds.
pub fn map_estimate(
    posterior: &Posterior<'_>,
    bounds: &ParameterBounds,
) -> Result<MapEstimate, Error> {
    MapAlgorithm::default().estimate(posterior, bounds, &bounds.plausible_midpoint())
}

#[cfg(feature = "cobyla")]
fn cobyla_estimate(
    config: &CobylaConfig,
    posterior: &Posterior<'_>,
    bounds: &ParameterBounds,
    x0: &[f64],
) -> MapEstimate {
    use cobyla::{minimize, Func, RhoBeg, StopTols};

    let objective =
        move |x: &[f64], _user_data: &mut ()| -> f64 { posterior.neg_log_prob(x) };

    let cobyla_bounds = bounds.to_pairs();

    // No constraints beyond the box bounds.
    let constraints: Vec<&dyn Func<()>> = vec![];

    let stop_tol = StopTols {
        ftol_rel: config.ftol_rel,
        ..StopTols::default()
    };

    let result = minimize(
        objective,
        x0,
        &cobyla_bounds,
        &constraints,
        (),
        config.niterations as usize,
        RhoBeg::All(config.rhobeg),
        Some(stop_tol),
    );

    match result {
        Ok((status, theta, neg_log_prob)) => {
            let success = matches!(
                status,
                cobyla::SuccessStatus::Success
                    | cobyla::SuccessStatus::FtolReached
                    | cobyla::SuccessStatus::XtolReached
            );
            log::debug!("COBYLA converged: {success}");
            MapEstimate {
                theta,
                log_prob: -neg_log_prob,
                success,
            }
        }
        Err((_status, theta, neg_log_prob)) => {
            log::warn!("COBYLA did not converge; reporting the best point seen");
            MapEstimate {
                theta,
                log_prob: -neg_log_prob,
                success: false,
            }
        }
    }
}

fn ensemble_best_estimate(
    config: &SampleConfig,
    posterior: &Posterior<'_>,
    x0: &[f64],
) -> Result<MapEstimate, Error> {
    let samples = sample_posterior(posterior, config, x0)?;
    let (theta, log_prob) = samples.best_draw(posterior);
    Ok(MapEstimate {
        theta,
        log_prob,
        success: log_prob.is_finite(),
    })
}
