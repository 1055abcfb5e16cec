/*!
Bayesian fitting of a four-parameter psychometric function (threshold,
slope, lapse rate, lapse bias) to behavioral choice data.

The crate keeps the statistical model in-repo — trial data, the
cumulative-normal-with-lapse curve, the Bernoulli log-likelihood, bounded
priors, and a brute-force 1-D posterior grid — and delegates the heavy
numerics: MAP estimation goes to the external COBYLA derivative-free
optimizer (default-on `cobyla` feature) and full-posterior approximation to
the external `emcee` ensemble sampler.

# Example

```rust
use psyfit::data::Dataset;
use psyfit::likelihood::log_likelihood;
use psyfit::psychometric::Psychometric;
use rand::rngs::SmallRng;
use rand::SeedableRng;

let truth: Psychometric<f64> = Psychometric::new(0.0, 0.3, 0.1, 0.5).unwrap();
let mut rng = SmallRng::seed_from_u64(42);
let data = Dataset::synthetic(&truth, &[0.0, 0.25, 1.0], 200, &mut rng);
assert!(log_likelihood(&data, &truth).is_finite());
```
*/

pub mod bounds;
pub mod data;
pub mod error;
pub mod fit;
pub mod io;
pub mod likelihood;
pub mod plot;
pub mod posterior;
pub mod priors;
pub mod psychometric;
pub mod sample;
