/*!
The unnormalized log-posterior and a brute-force 1-D posterior grid.

[`Posterior`] combines a dataset's Bernoulli log-likelihood with one of the
bounded priors; it is the objective handed to the external optimizer and
sampler. [`posterior_grid_1d`] evaluates that objective along a single
parameter axis (the others held fixed) and exp-normalizes the result into a
proper density over the grid.
*/

use crate::data::Dataset;
use crate::error::Error;
use crate::likelihood::log_likelihood;
use crate::priors::{LnPrior, Prior};
use crate::psychometric::Psychometric;
use indicatif::{ProgressBar, ProgressStyle};
use ndarray::Array1;
use ndarray_stats::QuantileExt;
use rayon::prelude::*;

/// A function proportional to a log-density over a flat parameter vector.
pub trait LogDensity {
    /// Returns the log of the unnormalized density for state `theta`.
    fn unnorm_log_prob(&self, theta: &[f64]) -> f64;
}

/// The unnormalized log-posterior of a psychometric model given trial data.
#[derive(Debug, Clone)]
pub struct Posterior<'a> {
    data: &'a Dataset,
    prior: Prior,
}

impl<'a> Posterior<'a> {
    pub fn new(data: &'a Dataset, prior: Prior) -> Self {
        Self { data, prior }
    }

    pub fn data(&self) -> &Dataset {
        self.data
    }

    pub fn prior(&self) -> &Prior {
        &self.prior
    }

    /// The negated log-posterior, the shape the minimizer expects.
    pub fn neg_log_prob(&self, theta: &[f64]) -> f64 {
        -self.unnorm_log_prob(theta)
    }
}

impl LogDensity for Posterior<'_> {
    fn unnorm_log_prob(&self, theta: &[f64]) -> f64 {
        let lp = self.prior.ln_pdf(theta);
        if !lp.is_finite() {
            return f64::NEG_INFINITY;
        }
        // Inside the prior support theta is a valid parameter vector unless
        // the bounds were chosen to permit degenerate models.
        let model = match Psychometric::from_params(theta) {
            Ok(model) => model,
            Err(_) => return f64::NEG_INFINITY,
        };
        lp + log_likelihood(self.data, &model)
    }
}

/// A normalized posterior density over a 1-D parameter grid.
#[derive(Debug, Clone, PartialEq)]
pub struct PosteriorGrid1d {
    /// Grid knots, ascending.
    pub grid: Array1<f64>,
    /// Unnormalized log-posterior at each knot.
    pub log_prob: Array1<f64>,
    /// Density normalized by trapezoidal quadrature over the grid.
    pub pdf: Array1<f64>,
    map_index: usize,
}

impl PosteriorGrid1d {
    /// Grid knot with the highest posterior density.
    pub fn map(&self) -> f64 {
        self.grid[self.map_index]
    }

    /// Posterior mean under the grid density.
    pub fn mean(&self) -> f64 {
        trapezoid(&self.grid, &(&self.grid * &self.pdf))
    }

    /// Posterior standard deviation under the grid density.
    pub fn std(&self) -> f64 {
        let mean = self.mean();
        let second = self
            .grid
            .mapv(|x| (x - mean) * (x - mean))
            * &self.pdf;
        trapezoid(&self.grid, &second).sqrt()
    }
}

fn trapezoid(x: &Array1<f64>, y: &Array1<f64>) -> f64 {
    let mut acc = 0.0;
    for i in 0..x.len() - 1 {
        acc += 0.5 * (y[i] + y[i + 1]) * (x[i + 1] - x[i]);
    }
    acc
}

fn check_grid(base: &[f64], index: usize, grid: &Array1<f64>) -> Result<(), Error> {
    if index >= base.len() {
        return Err(Error::ParamIndexOutOfRange {
            index,
            ndim: base.len(),
        });
    }
    if grid.len() < 2 {
        return Err(Error::Grid("grid needs at least two points"));
    }
    if grid.windows(2).into_iter().any(|w| w[0] >= w[1]) {
        return Err(Error::Grid("grid must be strictly ascending"));
    }
    Ok(())
}

fn normalize(grid: Array1<f64>, log_prob: Array1<f64>) -> Result<PosteriorGrid1d, Error> {
    if log_prob.iter().any(|lp| lp.is_nan()) {
        return Err(Error::Grid("log-posterior is NaN on the grid"));
    }
    let map_index = log_prob
        .argmax()
        .map_err(|_| Error::Grid("log-posterior has no maximum"))?;
    let shift = log_prob[map_index];
    if !shift.is_finite() {
        return Err(Error::Grid("posterior is zero everywhere on the grid"));
    }
    let weights = log_prob.mapv(|lp| (lp - shift).exp());
    let mass = trapezoid(&grid, &weights);
    let pdf = weights / mass;
    Ok(PosteriorGrid1d {
        grid,
        log_prob,
        pdf,
        map_index,
    })
}

fn eval_axis<D: LogDensity + Sync>(
    target: &D,
    base: &[f64],
    index: usize,
    grid: &Array1<f64>,
    pb: Option<&ProgressBar>,
) -> Array1<f64> {
    let knots: Vec<f64> = grid.to_vec();
    let log_prob: Vec<f64> = knots
        .par_iter()
        .map(|&x| {
            let mut theta = base.to_vec();
            theta[index] = x;
            let lp = target.unnorm_log_prob(&theta);
            if let Some(pb) = pb {
                pb.inc(1);
            }
            lp
        })
        .collect();
    Array1::from(log_prob)
}

/// Brute-force posterior over one parameter, the others fixed at `base`.
///
/// Evaluates `target` at every grid knot in parallel, then exp-normalizes
/// with a max-shift and trapezoidal quadrature.
pub fn posterior_grid_1d<D: LogDensity + Sync>(
    target: &D,
    base: &[f64],
    index: usize,
    grid: Array1<f64>,
) -> Result<PosteriorGrid1d, Error> {
    check_grid(base, index, &grid)?;
    let log_prob = eval_axis(target, base, index, &grid, None);
    normalize(grid, log_prob)
}

/// Same as [`posterior_grid_1d`], with a progress bar over grid knots.
pub fn posterior_grid_1d_with_progress<D: LogDensity + Sync>(
    target: &D,
    base: &[f64],
    index: usize,
    grid: Array1<f64>,
) -> Result<PosteriorGrid1d, Error> {
    check_grid(base, index, &grid)?;
    let pb = ProgressBar::new(grid.len() as u64);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("{prefix} [{elapsed_precise}] {bar:40.cyan/blue} {pos}/{len} {msg}")
            .expect("Expecting progress bar template to parse.")
            .progress_chars("##-"),
    );
    pb.set_prefix(format!("Grid axis {index}"));
    let log_prob = eval_axis(target, base, index, &grid, Some(&pb));
    pb.finish_with_message("Done!");
    normalize(grid, log_prob)
}
