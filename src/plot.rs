/*!
Figures for the fitting narrative: data with psychometric curves, the 1-D
grid posterior, and scatter plots of posterior draws. All functions render
PNG files through the plotters bitmap backend.
*/

use crate::data::Dataset;
use crate::error::Error;
use crate::posterior::PosteriorGrid1d;
use crate::psychometric::Psychometric;
use crate::sample::PosteriorSamples;
use ndarray::Array1;
use plotters::prelude::*;

fn plot_err<E: std::fmt::Display>(e: E) -> Error {
    Error::Plot(e.to_string())
}

/// Choice proportions per signed contrast with model curves overlaid.
///
/// Each entry of `curves` is a legend label and a model; the curves are drawn
/// over the span of the data.
pub fn plot_psychometric(
    data: &Dataset,
    curves: &[(&str, &Psychometric<f64>)],
    filename: &str,
) -> Result<(), Error> {
    let bins = data.proportion_rightward();
    if bins.is_empty() {
        return Err(Error::InvalidParameter("dataset has no trials to plot"));
    }
    let x_min = bins.first().map(|b| b.signed_contrast).unwrap_or(-1.0);
    let x_max = bins.last().map(|b| b.signed_contrast).unwrap_or(1.0);
    let pad = 0.05 * (x_max - x_min).max(1e-6);
    let x_range = (x_min - pad)..(x_max + pad);

    let root = BitMapBackend::new(filename, (1000, 750)).into_drawing_area();
    root.fill(&WHITE).map_err(plot_err)?;

    let mut chart = ChartBuilder::on(&root)
        .caption("Psychometric function", ("sans-serif", 40))
        .margin(10)
        .x_label_area_size(50)
        .y_label_area_size(50)
        .build_cartesian_2d(x_range, -0.02f64..1.02f64)
        .map_err(plot_err)?;

    chart
        .configure_mesh()
        .x_desc("Signed contrast")
        .y_desc("P(rightward choice)")
        .light_line_style(WHITE.mix(0.8))
        .bold_line_style(BLACK.mix(0.5))
        .draw()
        .map_err(plot_err)?;

    chart
        .draw_series(bins.iter().map(|b| {
            Circle::new(
                (b.signed_contrast, b.p_rightward),
                5,
                BLACK.mix(0.7).filled(),
            )
        }))
        .map_err(plot_err)?
        .label("data")
        .legend(|(x, y)| Circle::new((x, y), 5, BLACK.filled()));

    let grid = Array1::linspace(x_min - pad, x_max + pad, 256);
    for (i, (label, model)) in curves.iter().enumerate() {
        let color = Palette99::pick(i).to_rgba();
        chart
            .draw_series(LineSeries::new(
                grid.iter().map(|&s| (s, model.prob_rightward(s))),
                color.stroke_width(2),
            ))
            .map_err(plot_err)?
            .label(*label)
            .legend(move |(x, y)| {
                PathElement::new(vec![(x, y), (x + 20, y)], color.stroke_width(2))
            });
    }

    chart
        .configure_series_labels()
        .border_style(BLACK)
        .background_style(WHITE.mix(0.9))
        .label_font(("sans-serif", 25))
        .draw()
        .map_err(plot_err)?;

    root.present().map_err(plot_err)?;
    Ok(())
}

/// The normalized density of a 1-D grid posterior as a line plot.
pub fn plot_posterior_grid(
    result: &PosteriorGrid1d,
    x_label: &str,
    filename: &str,
) -> Result<(), Error> {
    let x_min = result.grid[0];
    let x_max = result.grid[result.grid.len() - 1];
    let y_max = result.pdf.iter().cloned().fold(0.0f64, f64::max) * 1.05;

    let root = BitMapBackend::new(filename, (1000, 750)).into_drawing_area();
    root.fill(&WHITE).map_err(plot_err)?;

    let mut chart = ChartBuilder::on(&root)
        .caption("Grid posterior", ("sans-serif", 40))
        .margin(10)
        .x_label_area_size(50)
        .y_label_area_size(60)
        .build_cartesian_2d(x_min..x_max, 0.0f64..y_max)
        .map_err(plot_err)?;

    chart
        .configure_mesh()
        .x_desc(x_label)
        .y_desc("Posterior density")
        .draw()
        .map_err(plot_err)?;

    chart
        .draw_series(LineSeries::new(
            result
                .grid
                .iter()
                .zip(result.pdf.iter())
                .map(|(&x, &p)| (x, p)),
            BLUE.stroke_width(2),
        ))
        .map_err(plot_err)?;

    root.present().map_err(plot_err)?;
    Ok(())
}

/// Scatter of two marginals of the posterior draws, clipped to the central
/// 99% of each axis to keep stray walkers from stretching the view.
pub fn plot_sample_scatter(
    samples: &PosteriorSamples,
    dims: (usize, usize),
    labels: (&str, &str),
    filename: &str,
) -> Result<(), Error> {
    let (di, dj) = dims;
    if di >= samples.ndim() || dj >= samples.ndim() {
        return Err(Error::ParamIndexOutOfRange {
            index: di.max(dj),
            ndim: samples.ndim(),
        });
    }
    if samples.is_empty() {
        return Err(Error::InvalidParameter("no posterior draws to plot"));
    }

    let mut xs: Vec<f64> = samples.samples.column(di).to_vec();
    let mut ys: Vec<f64> = samples.samples.column(dj).to_vec();
    xs.sort_unstable_by(|a, b| a.total_cmp(b));
    ys.sort_unstable_by(|a, b| a.total_cmp(b));
    let lower_idx = (0.005 * xs.len() as f64) as usize;
    let upper_idx = ((0.995 * xs.len() as f64) as usize).min(xs.len() - 1);
    let pad_x = 0.05 * (xs[upper_idx] - xs[lower_idx]).max(1e-9);
    let pad_y = 0.05 * (ys[upper_idx] - ys[lower_idx]).max(1e-9);
    let x_range = (xs[lower_idx] - pad_x)..(xs[upper_idx] + pad_x);
    let y_range = (ys[lower_idx] - pad_y)..(ys[upper_idx] + pad_y);

    let root = BitMapBackend::new(filename, (1000, 750)).into_drawing_area();
    root.fill(&WHITE).map_err(plot_err)?;

    let mut chart = ChartBuilder::on(&root)
        .caption("Posterior draws", ("sans-serif", 40))
        .margin(10)
        .x_label_area_size(50)
        .y_label_area_size(60)
        .build_cartesian_2d(x_range.clone(), y_range.clone())
        .map_err(plot_err)?;

    chart
        .configure_mesh()
        .x_desc(labels.0)
        .y_desc(labels.1)
        .draw()
        .map_err(plot_err)?;

    chart
        .draw_series(
            samples
                .samples
                .column(di)
                .iter()
                .zip(samples.samples.column(dj).iter())
                .filter(|(&x, &y)| x_range.contains(&x) && y_range.contains(&y))
                .map(|(&x, &y)| Circle::new((x, y), 2, RGBAColor(70, 130, 180, 0.5).filled())),
        )
        .map_err(plot_err)?;

    root.present().map_err(plot_err)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::Dataset;
    use crate::posterior::{posterior_grid_1d, LogDensity};
    use ndarray::{arr2, Array1};
    use rand::rngs::SmallRng;
    use rand::SeedableRng;

    struct Quadratic;

    impl LogDensity for Quadratic {
        fn unnorm_log_prob(&self, theta: &[f64]) -> f64 {
            -0.5 * theta[0] * theta[0]
        }
    }

    #[test]
    fn renders_all_figures() {
        let dir = tempfile::tempdir().expect("Could not create temp dir");
        let model = Psychometric::new(0.0, 0.3, 0.1, 0.5).unwrap();
        let mut rng = SmallRng::seed_from_u64(2);
        let data = Dataset::synthetic(&model, &[0.0, 0.25, 1.0], 300, &mut rng);

        let psycho = dir.path().join("psychometric.png");
        plot_psychometric(&data, &[("model", &model)], psycho.to_str().unwrap())
            .expect("Expecting psychometric plot to succeed");
        assert!(psycho.exists());

        let grid_result =
            posterior_grid_1d(&Quadratic, &[0.0], 0, Array1::linspace(-3.0, 3.0, 101)).unwrap();
        let grid_png = dir.path().join("grid.png");
        plot_posterior_grid(&grid_result, "x", grid_png.to_str().unwrap())
            .expect("Expecting grid plot to succeed");
        assert!(grid_png.exists());

        let samples = PosteriorSamples {
            samples: arr2(&[[0.0, 1.0], [0.1, 1.1], [0.2, 0.9], [0.3, 1.2]]),
        };
        let scatter = dir.path().join("scatter.png");
        plot_sample_scatter(&samples, (0, 1), ("a", "b"), scatter.to_str().unwrap())
            .expect("Expecting scatter plot to succeed");
        assert!(scatter.exists());
    }

    #[test]
    fn scatter_rejects_bad_dims() {
        let samples = PosteriorSamples {
            samples: arr2(&[[0.0, 1.0]]),
        };
        assert!(plot_sample_scatter(&samples, (0, 2), ("a", "b"), "/tmp/unused.png").is_err());
    }
}
