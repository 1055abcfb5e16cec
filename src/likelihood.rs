/*!
Bernoulli log-likelihood of a trial dataset under a psychometric model.

Each trial contributes `ln p` when the subject chose rightward and
`ln (1 - p)` otherwise, where `p` is the model's rightward-choice probability
at the trial's signed contrast. Probabilities are not clamped: with a zero
lapse rate a trial can saturate to `p = 0` or `p = 1` and the total becomes
`-inf`. The bounded priors are what keeps fits away from that edge.
*/

use crate::data::Dataset;
use crate::psychometric::Psychometric;
use ndarray::Array1;

/// Log-probability of one trial's choice.
fn trial_log_prob(model: &Psychometric<f64>, signed_contrast: f64, chose_rightward: bool) -> f64 {
    let p = model.prob_rightward(signed_contrast);
    if chose_rightward {
        p.ln()
    } else {
        (1.0 - p).ln()
    }
}

/// Per-trial log-probabilities, in dataset order.
pub fn per_trial_log_likelihood(data: &Dataset, model: &Psychometric<f64>) -> Array1<f64> {
    data.trials()
        .iter()
        .map(|t| trial_log_prob(model, t.signed_contrast(), t.chose_rightward()))
        .collect()
}

/// Total log-likelihood: the exact sum of the per-trial terms.
pub fn log_likelihood(data: &Dataset, model: &Psychometric<f64>) -> f64 {
    data.trials()
        .iter()
        .map(|t| trial_log_prob(model, t.signed_contrast(), t.chose_rightward()))
        .sum()
}
