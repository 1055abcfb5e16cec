//! End-to-end walkthrough: load (or synthesize) a session of behavioral
//! trials, look at the psychometric curve, brute-force the 1-D lapse-rate
//! posterior, fit the MAP with the external derivative-free optimizer, and
//! approximate the full posterior with the ensemble sampler.
//!
//! Usage: `demo [trials.csv] [session_id]`

use ndarray::Array1;
use psyfit::bounds::ParameterBounds;
use psyfit::data::Dataset;
use psyfit::fit::map_estimate;
use psyfit::io::{load_trials, save_samples_csv};
use psyfit::likelihood::log_likelihood;
use psyfit::plot::{plot_posterior_grid, plot_psychometric, plot_sample_scatter};
use psyfit::posterior::{posterior_grid_1d_with_progress, Posterior};
use psyfit::priors::Prior;
use psyfit::psychometric::Psychometric;
use psyfit::sample::{sample_posterior, SampleConfig};
use rand::rngs::SmallRng;
use rand::SeedableRng;
use std::error::Error;

const PARAM_NAMES: [&str; 4] = ["mu", "sigma", "lapse_rate", "lapse_bias"];

/// Hard and plausible bounds for `[mu, sigma, lapse_rate, lapse_bias]` on the
/// signed-contrast scale of the data ([-1, 1]).
fn default_bounds() -> ParameterBounds {
    ParameterBounds::new(
        vec![-1.0, 0.001, 0.0, 0.0],
        vec![1.0, 2.0, 1.0, 1.0],
        vec![-0.5, 0.05, 0.01, 0.2],
        vec![0.5, 1.0, 0.5, 0.8],
    )
    .expect("Expecting default bounds to be valid.")
}

fn main() -> Result<(), Box<dyn Error>> {
    env_logger::init();

    // Step 1: load the trial table, or simulate a session when none is given.
    let args: Vec<String> = std::env::args().collect();
    let full_data = match args.get(1) {
        Some(path) => {
            println!("Loading trials from {path}");
            load_trials(path)?
        }
        None => {
            log::warn!("no CSV given; simulating a session from a known model");
            let truth = Psychometric::new(0.05, 0.2, 0.1, 0.5)?;
            println!("Simulating 600 trials from {truth:?}");
            let mut rng = SmallRng::seed_from_u64(42);
            Dataset::synthetic(
                &truth,
                &[0.0, 0.0625, 0.125, 0.25, 0.5, 1.0],
                600,
                &mut rng,
            )
        }
    };
    let sessions = full_data.sessions();
    let session_id = match args.get(2) {
        Some(s) => s.parse::<u32>()?,
        None => *sessions.first().ok_or("the trial table is empty")?,
    };
    let data = full_data.session(session_id)?;
    println!(
        "Loaded {} trials across sessions {:?}; analyzing session {} ({} trials)",
        full_data.len(),
        sessions,
        session_id,
        data.len()
    );

    // Step 2: eyeball the data against a hand-picked model.
    let guess = Psychometric::new(0.0, 0.25, 0.1, 0.5)?;
    plot_psychometric(&data, &[("initial guess", &guess)], "psychometric.png")?;
    println!("Saved data and initial-guess curve to psychometric.png");
    println!(
        "Log-likelihood of the initial guess: {:.2}",
        log_likelihood(&data, &guess)
    );

    // Step 3: brute-force the posterior over the lapse rate, the other
    // parameters held at the initial guess.
    let bounds = default_bounds();
    let posterior = Posterior::new(&data, Prior::trapezoidal(bounds.clone()));
    let base = guess.params();
    let grid = Array1::linspace(0.0, 1.0, 401);
    let lapse_grid = posterior_grid_1d_with_progress(&posterior, &base, 2, grid)?;
    println!(
        "Grid posterior over lapse rate: MAP {:.3}, mean {:.3} +/- {:.3}",
        lapse_grid.map(),
        lapse_grid.mean(),
        lapse_grid.std()
    );
    plot_posterior_grid(&lapse_grid, "Lapse rate", "lapse_posterior.png")?;
    println!("Saved grid posterior to lapse_posterior.png");

    // Step 4: hand the joint problem to the external optimizer.
    let map = map_estimate(&posterior, &bounds)?;
    println!(
        "MAP estimate (converged: {}): log posterior {:.2}",
        map.success, map.log_prob
    );
    for (name, value) in PARAM_NAMES.iter().zip(&map.theta) {
        println!("  {name:>10} = {value:.4}");
    }
    let fitted = Psychometric::from_params(&map.theta)?;
    plot_psychometric(
        &data,
        &[("initial guess", &guess), ("MAP fit", &fitted)],
        "psychometric_fit.png",
    )?;
    println!("Saved fitted curve to psychometric_fit.png");

    // Step 5: approximate the full posterior with the ensemble sampler,
    // walkers started at the MAP.
    let config = SampleConfig::default();
    let samples = sample_posterior(&posterior, &config, &map.theta)?;
    let (mean, std) = (samples.mean(), samples.std());
    println!("Posterior from {} draws:", samples.len());
    for (i, name) in PARAM_NAMES.iter().enumerate() {
        println!("  {name:>10} = {:.4} +/- {:.4}", mean[i], std[i]);
    }
    let (best, best_lp) = samples.best_draw(&posterior);
    println!(
        "Best sampled draw has log posterior {best_lp:.2} at {best:?} \
         (MAP had {:.2})",
        map.log_prob
    );

    save_samples_csv(&samples.samples, &PARAM_NAMES, "posterior_samples.csv")?;
    println!("Saved posterior draws to posterior_samples.csv");
    plot_sample_scatter(
        &samples,
        (0, 2),
        ("mu", "lapse_rate"),
        "posterior_scatter.png",
    )?;
    println!("Saved posterior scatter to posterior_scatter.png");

    Ok(())
}
