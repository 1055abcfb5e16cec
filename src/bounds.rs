/*!
Hard and plausible box bounds for the model parameters.

Hard bounds delimit the support of the priors and the search region of the
optimizer; plausible bounds mark the high-density plateau of the trapezoidal
priors and provide the default starting point for fits.
*/

use crate::error::Error;

/// Box bounds with an inner plausible region, one entry per parameter.
///
/// Invariant: `lower <= plausible_lower < plausible_upper <= upper` holds
/// element-wise and every entry is finite.
#[derive(Debug, Clone, PartialEq)]
pub struct ParameterBounds {
    lower: Vec<f64>,
    upper: Vec<f64>,
    plausible_lower: Vec<f64>,
    plausible_upper: Vec<f64>,
}

impl ParameterBounds {
    pub fn new(
        lower: Vec<f64>,
        upper: Vec<f64>,
        plausible_lower: Vec<f64>,
        plausible_upper: Vec<f64>,
    ) -> Result<Self, Error> {
        let ndim = lower.len();
        if upper.len() != ndim || plausible_lower.len() != ndim || plausible_upper.len() != ndim {
            return Err(Error::InvalidBounds(format!(
                "bound vectors have mismatched lengths: {} / {} / {} / {}",
                lower.len(),
                upper.len(),
                plausible_lower.len(),
                plausible_upper.len()
            )));
        }
        if ndim == 0 {
            return Err(Error::InvalidBounds("bounds are empty".to_string()));
        }
        for i in 0..ndim {
            let (lb, plb, pub_, ub) = (lower[i], plausible_lower[i], plausible_upper[i], upper[i]);
            if !(lb.is_finite() && plb.is_finite() && pub_.is_finite() && ub.is_finite()) {
                return Err(Error::InvalidBounds(format!(
                    "bounds for parameter {i} must be finite"
                )));
            }
            if !(lb <= plb && plb < pub_ && pub_ <= ub) {
                return Err(Error::InvalidBounds(format!(
                    "parameter {i} violates lb <= plb < pub <= ub: \
                     {lb} / {plb} / {pub_} / {ub}"
                )));
            }
        }
        Ok(Self {
            lower,
            upper,
            plausible_lower,
            plausible_upper,
        })
    }

    pub fn ndim(&self) -> usize {
        self.lower.len()
    }

    pub fn lower(&self) -> &[f64] {
        &self.lower
    }

    pub fn upper(&self) -> &[f64] {
        &self.upper
    }

    pub fn plausible_lower(&self) -> &[f64] {
        &self.plausible_lower
    }

    pub fn plausible_upper(&self) -> &[f64] {
        &self.plausible_upper
    }

    /// Whether `theta` lies inside the hard box (boundaries included).
    pub fn contains(&self, theta: &[f64]) -> bool {
        theta.len() == self.ndim()
            && theta
                .iter()
                .zip(self.lower.iter().zip(&self.upper))
                .all(|(&x, (&lb, &ub))| x >= lb && x <= ub)
    }

    /// Whether `theta` lies inside the plausible box (boundaries included).
    pub fn plausible_contains(&self, theta: &[f64]) -> bool {
        theta.len() == self.ndim()
            && theta
                .iter()
                .zip(self.plausible_lower.iter().zip(&self.plausible_upper))
                .all(|(&x, (&lb, &ub))| x >= lb && x <= ub)
    }

    /// Midpoint of the plausible box, the default starting point for fits.
    pub fn plausible_midpoint(&self) -> Vec<f64> {
        self.plausible_lower
            .iter()
            .zip(&self.plausible_upper)
            .map(|(&lb, &ub)| 0.5 * (lb + ub))
            .collect()
    }

    /// Hard bounds as `(low, high)` pairs, the shape the optimizer expects.
    pub fn to_pairs(&self) -> Vec<(f64, f64)> {
        self.lower
            .iter()
            .zip(&self.upper)
            .map(|(&lb, &ub)| (lb, ub))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    fn bounds() -> ParameterBounds {
        ParameterBounds::new(
            vec![-1.0, 0.001, 0.0, 0.0],
            vec![1.0, 2.0, 1.0, 1.0],
            vec![-0.5, 0.05, 0.01, 0.2],
            vec![0.5, 1.0, 0.2, 0.8],
        )
        .unwrap()
    }

    #[test]
    fn accepts_valid_bounds() {
        let b = bounds();
        assert_eq!(b.ndim(), 4);
        assert!(b.contains(&[0.0, 0.5, 0.1, 0.5]));
        assert!(b.contains(&[-1.0, 2.0, 0.0, 1.0]));
        assert!(!b.contains(&[1.5, 0.5, 0.1, 0.5]));
        assert!(b.plausible_contains(&[0.0, 0.5, 0.1, 0.5]));
        assert!(!b.plausible_contains(&[0.6, 0.5, 0.1, 0.5]));
    }

    #[test]
    fn midpoint_and_pairs() {
        let b = bounds();
        let mid = b.plausible_midpoint();
        assert_eq!(mid.len(), 4);
        for (got, want) in mid.iter().zip([0.0, 0.525, 0.105, 0.5]) {
            assert_abs_diff_eq!(*got, want, epsilon = 1e-12);
        }
        assert_eq!(b.to_pairs()[0], (-1.0, 1.0));
    }

    #[test]
    fn rejects_bad_bounds() {
        assert!(ParameterBounds::new(vec![0.0], vec![1.0], vec![0.5], vec![]).is_err());
        assert!(ParameterBounds::new(vec![], vec![], vec![], vec![]).is_err());
        // plb must be strictly below pub
        assert!(ParameterBounds::new(vec![0.0], vec![1.0], vec![0.5], vec![0.5]).is_err());
        // plausible range must sit inside the hard range
        assert!(ParameterBounds::new(vec![0.0], vec![1.0], vec![-0.5], vec![0.5]).is_err());
        assert!(
            ParameterBounds::new(vec![0.0], vec![f64::INFINITY], vec![0.1], vec![0.5]).is_err()
        );
    }
}
