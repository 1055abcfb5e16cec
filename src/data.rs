/*!
Trial records and session-level datasets.

A [`Dataset`] is loaded once from CSV (see [`crate::io::load_trials`]) and
never mutated; analysis works on per-session views produced by
[`Dataset::session`]. The only derived quantity is the signed contrast,
`contrast * position`, which folds the stimulus side into its sign.
*/

use crate::error::Error;
use crate::psychometric::Psychometric;
use ndarray::Array1;
use rand::Rng;
use rand_distr::{Distribution, LogNormal};
use serde::Deserialize;
use std::collections::BTreeSet;

/// One behavioral trial, as read from a CSV row.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Trial {
    pub trial_num: u32,
    pub session_num: u32,
    /// Block prior probability that the stimulus appears on the left.
    /// Carried through from the file format; unused by the model.
    pub stim_probability_left: f64,
    /// Stimulus contrast in [0, 1].
    pub contrast: f64,
    /// Stimulus side: -1 for left, +1 for right.
    pub position: f64,
    /// Subject's choice: -1 for leftward, +1 for rightward.
    pub response_choice: i8,
    pub trial_correct: f64,
    /// Seconds from stimulus onset to response; may be blank in the file.
    pub reaction_time: Option<f64>,
}

impl Trial {
    /// Contrast with the stimulus side folded into its sign.
    pub fn signed_contrast(&self) -> f64 {
        self.contrast * self.position
    }

    pub fn chose_rightward(&self) -> bool {
        self.response_choice > 0
    }
}

/// Choice proportion at one signed-contrast level.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ContrastBin {
    pub signed_contrast: f64,
    pub p_rightward: f64,
    pub n_trials: usize,
}

/// An immutable collection of trials.
#[derive(Debug, Clone, PartialEq)]
pub struct Dataset {
    trials: Vec<Trial>,
}

impl Dataset {
    pub fn new(trials: Vec<Trial>) -> Self {
        Self { trials }
    }

    pub fn trials(&self) -> &[Trial] {
        &self.trials
    }

    pub fn len(&self) -> usize {
        self.trials.len()
    }

    pub fn is_empty(&self) -> bool {
        self.trials.is_empty()
    }

    /// Distinct session ids, ascending.
    pub fn sessions(&self) -> Vec<u32> {
        let set: BTreeSet<u32> = self.trials.iter().map(|t| t.session_num).collect();
        set.into_iter().collect()
    }

    /// Returns the trials belonging to one session.
    pub fn session(&self, id: u32) -> Result<Dataset, Error> {
        let trials: Vec<Trial> = self
            .trials
            .iter()
            .filter(|t| t.session_num == id)
            .cloned()
            .collect();
        if trials.is_empty() {
            return Err(Error::UnknownSession(id));
        }
        Ok(Dataset::new(trials))
    }

    pub fn signed_contrasts(&self) -> Array1<f64> {
        self.trials.iter().map(Trial::signed_contrast).collect()
    }

    pub fn choices(&self) -> Array1<i8> {
        self.trials.iter().map(|t| t.response_choice).collect()
    }

    /// Groups trials by signed contrast and computes the rightward-choice
    /// proportion at each level, ascending in signed contrast.
    pub fn proportion_rightward(&self) -> Vec<ContrastBin> {
        let mut pairs: Vec<(f64, bool)> = self
            .trials
            .iter()
            .map(|t| (t.signed_contrast(), t.chose_rightward()))
            .collect();
        pairs.sort_by(|a, b| a.0.total_cmp(&b.0));

        let mut bins = Vec::new();
        let mut i = 0;
        while i < pairs.len() {
            let level = pairs[i].0;
            let mut n = 0usize;
            let mut n_right = 0usize;
            while i < pairs.len() && pairs[i].0 == level {
                n += 1;
                if pairs[i].1 {
                    n_right += 1;
                }
                i += 1;
            }
            bins.push(ContrastBin {
                signed_contrast: level,
                p_rightward: n_right as f64 / n as f64,
                n_trials: n,
            });
        }
        bins
    }

    /// Generates a synthetic single-session dataset from a ground-truth model.
    ///
    /// Contrast levels are drawn uniformly from `contrasts`, the stimulus side
    /// is a fair coin, choices are Bernoulli draws from the model, and
    /// reaction times come from a log-normal. With no contrast levels there
    /// is nothing to draw from and the dataset is empty.
    pub fn synthetic<R: Rng>(
        model: &Psychometric<f64>,
        contrasts: &[f64],
        n_trials: usize,
        rng: &mut R,
    ) -> Dataset {
        if contrasts.is_empty() {
            return Dataset::new(Vec::new());
        }
        let rt_distr = LogNormal::new(-1.0, 0.4)
            .expect("Expecting creation of log-normal distribution to succeed.");
        let trials = (0..n_trials)
            .map(|i| {
                let contrast = contrasts[rng.gen_range(0..contrasts.len())];
                let position = if rng.gen_bool(0.5) { 1.0 } else { -1.0 };
                let signed = contrast * position;
                let p = model.prob_rightward(signed);
                let choice: i8 = if rng.gen::<f64>() < p { 1 } else { -1 };
                let correct = if choice as f64 * position > 0.0 { 1.0 } else { 0.0 };
                Trial {
                    trial_num: i as u32 + 1,
                    session_num: 1,
                    stim_probability_left: 0.5,
                    contrast,
                    position,
                    response_choice: choice,
                    trial_correct: correct,
                    reaction_time: Some(rt_distr.sample(rng)),
                }
            })
            .collect();
        Dataset::new(trials)
    }
}
