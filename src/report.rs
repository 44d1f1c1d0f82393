use std::{io::Write, path::Path};

use csv::Writer;

use crate::{convergence::ConvergenceResult, error::LaxError};

/// Writes the samples of a sweep as `nx,dx,error` rows.
pub fn write_csv<W: Write>(result: &ConvergenceResult, output: W) -> Result<(), LaxError> {
    let mut wtr = Writer::from_writer(output);
    for sample in result.samples() {
        wtr.serialize(sample)?;
    }
    wtr.flush()?;
    Ok(())
}

pub fn write_csv_to_path(
    result: &ConvergenceResult,
    path: impl AsRef<Path>,
) -> Result<(), LaxError> {
    let file = std::fs::File::create(path)?;
    write_csv(result, std::io::BufWriter::new(file))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::convergence::ConvergenceSample;

    #[test]
    fn writes_header_and_rows_in_order() {
        let result = ConvergenceResult::from_samples(vec![
            ConvergenceSample {
                nx: 10,
                dx: 0.5,
                error: 0.25,
            },
            ConvergenceSample {
                nx: 20,
                dx: 0.25,
                error: 0.125,
            },
        ])
        .unwrap();

        let mut buffer = Vec::new();
        write_csv(&result, &mut buffer).unwrap();
        let text = String::from_utf8(buffer).unwrap();
        assert_eq!(text, "nx,dx,error\n10,0.5,0.25\n20,0.25,0.125\n");
    }
}
