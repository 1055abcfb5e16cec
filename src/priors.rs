/*!
Bounded prior densities over the model parameters.

All three priors factorize over parameters and share the same support, the
hard box of a [`ParameterBounds`]. They differ in shape:

- [`UniformBoxPrior`]: constant over the hard box.
- [`TrapezoidalPrior`]: flat over the plausible box, falling linearly to zero
  at the hard bounds.
- [`SmoothedTrapezoidalPrior`]: same plateau and support, with raised-cosine
  ramps that are continuously differentiable at the knots.

A raised-cosine ramp carries the same mass as a linear ramp over the same
interval, so the trapezoidal and smoothed-trapezoidal priors share one
normalization: plateau height `2 / ((ub - lb) + (pub - plb))` per dimension.
*/

use crate::bounds::ParameterBounds;
use std::f64::consts::PI;

/// A log-density over the full parameter vector.
pub trait LnPrior {
    /// Natural logarithm of the prior density at `theta`; `-inf` outside the
    /// support.
    fn ln_pdf(&self, theta: &[f64]) -> f64;
}

/// One of the three bounded prior shapes.
#[derive(Debug, Clone, PartialEq)]
pub enum Prior {
    UniformBox(UniformBoxPrior),
    Trapezoidal(TrapezoidalPrior),
    SmoothedTrapezoidal(SmoothedTrapezoidalPrior),
}

impl Prior {
    pub fn uniform_box(bounds: ParameterBounds) -> Self {
        Prior::UniformBox(UniformBoxPrior::new(bounds))
    }

    pub fn trapezoidal(bounds: ParameterBounds) -> Self {
        Prior::Trapezoidal(TrapezoidalPrior::new(bounds))
    }

    pub fn smoothed_trapezoidal(bounds: ParameterBounds) -> Self {
        Prior::SmoothedTrapezoidal(SmoothedTrapezoidalPrior::new(bounds))
    }

    pub fn bounds(&self) -> &ParameterBounds {
        match self {
            Prior::UniformBox(p) => &p.bounds,
            Prior::Trapezoidal(p) => &p.bounds,
            Prior::SmoothedTrapezoidal(p) => &p.bounds,
        }
    }

    /// Density of the 1-D marginal for parameter `dim` at `x`.
    pub fn pdf_1d(&self, dim: usize, x: f64) -> f64 {
        match self {
            Prior::UniformBox(p) => p.pdf_1d(dim, x),
            Prior::Trapezoidal(p) => p.pdf_1d(dim, x),
            Prior::SmoothedTrapezoidal(p) => p.pdf_1d(dim, x),
        }
    }
}

impl LnPrior for Prior {
    fn ln_pdf(&self, theta: &[f64]) -> f64 {
        match self {
            Prior::UniformBox(p) => p.ln_pdf(theta),
            Prior::Trapezoidal(p) => p.ln_pdf(theta),
            Prior::SmoothedTrapezoidal(p) => p.ln_pdf(theta),
        }
    }
}

fn product_ln_pdf(prior: &impl Fn(usize, f64) -> f64, theta: &[f64], ndim: usize) -> f64 {
    if theta.len() != ndim {
        return f64::NEG_INFINITY;
    }
    theta
        .iter()
        .enumerate()
        .map(|(i, &x)| prior(i, x).ln())
        .sum()
}

/// Uniform density over the hard box.
#[derive(Debug, Clone, PartialEq)]
pub struct UniformBoxPrior {
    bounds: ParameterBounds,
}

impl UniformBoxPrior {
    pub fn new(bounds: ParameterBounds) -> Self {
        Self { bounds }
    }

    pub fn pdf_1d(&self, dim: usize, x: f64) -> f64 {
        let (lb, ub) = (self.bounds.lower()[dim], self.bounds.upper()[dim]);
        if x < lb || x > ub {
            0.0
        } else {
            1.0 / (ub - lb)
        }
    }
}

impl LnPrior for UniformBoxPrior {
    fn ln_pdf(&self, theta: &[f64]) -> f64 {
        product_ln_pdf(&|i, x| self.pdf_1d(i, x), theta, self.bounds.ndim())
    }
}

/// Plateau height shared by the trapezoidal shapes.
fn plateau_height(lb: f64, plb: f64, pub_: f64, ub: f64) -> f64 {
    2.0 / ((ub - lb) + (pub_ - plb))
}

/// Trapezoidal density: linear ramps between hard and plausible bounds.
#[derive(Debug, Clone, PartialEq)]
pub struct TrapezoidalPrior {
    bounds: ParameterBounds,
}

impl TrapezoidalPrior {
    pub fn new(bounds: ParameterBounds) -> Self {
        Self { bounds }
    }

    pub fn pdf_1d(&self, dim: usize, x: f64) -> f64 {
        let (lb, ub) = (self.bounds.lower()[dim], self.bounds.upper()[dim]);
        let (plb, pub_) = (
            self.bounds.plausible_lower()[dim],
            self.bounds.plausible_upper()[dim],
        );
        let h = plateau_height(lb, plb, pub_, ub);
        if x < lb || x > ub {
            0.0
        } else if x < plb {
            h * (x - lb) / (plb - lb)
        } else if x > pub_ {
            h * (ub - x) / (ub - pub_)
        } else {
            h
        }
    }
}

impl LnPrior for TrapezoidalPrior {
    fn ln_pdf(&self, theta: &[f64]) -> f64 {
        product_ln_pdf(&|i, x| self.pdf_1d(i, x), theta, self.bounds.ndim())
    }
}

/// Trapezoid with raised-cosine ramps instead of linear ones.
#[derive(Debug, Clone, PartialEq)]
pub struct SmoothedTrapezoidalPrior {
    bounds: ParameterBounds,
}

impl SmoothedTrapezoidalPrior {
    pub fn new(bounds: ParameterBounds) -> Self {
        Self { bounds }
    }

    pub fn pdf_1d(&self, dim: usize, x: f64) -> f64 {
        let (lb, ub) = (self.bounds.lower()[dim], self.bounds.upper()[dim]);
        let (plb, pub_) = (
            self.bounds.plausible_lower()[dim],
            self.bounds.plausible_upper()[dim],
        );
        let h = plateau_height(lb, plb, pub_, ub);
        if x < lb || x > ub {
            0.0
        } else if x < plb {
            h * 0.5 * (1.0 - (PI * (x - lb) / (plb - lb)).cos())
        } else if x > pub_ {
            h * 0.5 * (1.0 - (PI * (ub - x) / (ub - pub_)).cos())
        } else {
            h
        }
    }
}

impl LnPrior for SmoothedTrapezoidalPrior {
    fn ln_pdf(&self, theta: &[f64]) -> f64 {
        product_ln_pdf(&|i, x| self.pdf_1d(i, x), theta, self.bounds.ndim())
    }
}
