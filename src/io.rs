/*!
# CSV I/O

Reads trial tables and writes posterior draws as CSV.
*/

use crate::data::{Dataset, Trial};
use crate::error::Error;
use csv::{Reader, Writer};
use ndarray::{Array2, Axis};
use std::fs::File;
use std::path::Path;

/// Loads a trial table from a CSV file with a header row.
///
/// Expected columns: `trial_num`, `session_num`, `stim_probability_left`,
/// `contrast`, `position`, `response_choice`, `trial_correct`,
/// `reaction_time` (the last one may be blank).
pub fn load_trials<P: AsRef<Path>>(path: P) -> Result<Dataset, Error> {
    let mut rdr = Reader::from_path(path)?;
    let mut trials: Vec<Trial> = Vec::new();
    for record in rdr.deserialize() {
        trials.push(record?);
    }
    log::debug!("loaded {} trials", trials.len());
    Ok(Dataset::new(trials))
}

/**
Saves posterior draws as a CSV file.

The data is expected to be in a shape of **draw × parameter**, and
`param_names` must have one entry per column. The resulting file has a header
row containing `"sample"` followed by the parameter names, then one row per
draw.
*/
pub fn save_samples_csv(
    samples: &Array2<f64>,
    param_names: &[&str],
    filename: &str,
) -> Result<(), Error> {
    if samples.shape()[1] != param_names.len() {
        return Err(Error::InvalidParameter(
            "param_names length must match the number of sample columns",
        ));
    }
    let mut wtr = Writer::from_writer(File::create(filename)?);

    let mut header: Vec<String> = vec!["sample".to_string()];
    header.extend(param_names.iter().map(|s| s.to_string()));
    wtr.write_record(&header)?;

    for (draw_idx, draw) in samples.axis_iter(Axis(0)).enumerate() {
        let mut row = vec![draw_idx.to_string()];
        row.extend(draw.iter().map(|v| v.to_string()));
        wtr.write_record(&row)?;
    }

    wtr.flush()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::arr2;
    use std::fs;
    use std::io::Write as _;
    use tempfile::NamedTempFile;

    #[test]
    fn load_trials_parses_header_and_rows() {
        let mut file = NamedTempFile::new().expect("Could not create temp file");
        writeln!(
            file,
            "trial_num,session_num,stim_probability_left,contrast,position,response_choice,trial_correct,reaction_time\n\
             1,1,0.5,0.25,1,1,1.0,0.31\n\
             2,1,0.5,0.0625,-1,-1,1.0,\n\
             3,2,0.2,1,1,1,1.0,0.44"
        )
        .unwrap();

        let data = load_trials(file.path()).expect("Expecting loading trials to succeed");
        assert_eq!(data.len(), 3);
        assert_eq!(data.sessions(), vec![1, 2]);
        let t = &data.trials()[1];
        assert_eq!(t.response_choice, -1);
        assert_eq!(t.reaction_time, None);
        assert_eq!(t.signed_contrast(), -0.0625);
    }

    #[test]
    fn load_trials_rejects_malformed_rows() {
        let mut file = NamedTempFile::new().expect("Could not create temp file");
        writeln!(
            file,
            "trial_num,session_num,stim_probability_left,contrast,position,response_choice,trial_correct,reaction_time\n\
             1,1,0.5,not-a-number,1,1,1.0,0.31"
        )
        .unwrap();
        assert!(load_trials(file.path()).is_err());
    }

    #[test]
    fn save_samples_roundtrip() {
        let samples = arr2(&[[1.0, 2.0], [3.0, 4.0]]);
        let file = NamedTempFile::new().expect("Could not create temp file");
        let filename = file.path().to_str().unwrap();

        save_samples_csv(&samples, &["mu", "sigma"], filename)
            .expect("Expecting saving samples to succeed");

        let contents = fs::read_to_string(filename).unwrap();
        let expected = "\
sample,mu,sigma
0,1,2
1,3,4";
        assert_eq!(contents.trim(), expected);
    }

    #[test]
    fn save_samples_checks_names() {
        let samples = arr2(&[[1.0, 2.0]]);
        let file = NamedTempFile::new().expect("Could not create temp file");
        let result = save_samples_csv(&samples, &["mu"], file.path().to_str().unwrap());
        assert!(result.is_err());
    }
}
