//! The module responsible for writing output data to disk.
use crate::reaction::ReactionID;
use crate::sweep::{FactorLabel, ResultSource, SweepResults};
use anyhow::{Context, Result, ensure};
use serde::{Deserialize, Serialize};
use std::fmt::Write;
use std::fs;
use std::fs::File;
use std::path::{Path, PathBuf};

pub mod metadata;
pub mod plot;

/// The root folder in which model-specific output folders will be created
const OUTPUT_DIRECTORY_ROOT: &str = "fluxsweep_results";

/// The output file name for the summary of each solve
pub const SWEEP_RESULTS_FILE_NAME: &str = "sweep_results.csv";

/// The output file name for reaction fluxes
pub const REACTION_FLUXES_FILE_NAME: &str = "reaction_fluxes.csv";

/// Get the default output directory for the model specified at `model_dir`
pub fn get_output_dir(model_dir: &Path) -> Result<PathBuf> {
    // Get the model name from the dir path. This ends up being convoluted because we need to check
    // for all possible errors. Ugh.
    let model_dir = model_dir
        .canonicalize() // canonicalise in case the user has specified "."
        .context("Could not resolve path to model")?;

    let model_name = model_dir
        .file_name()
        .context("Model cannot be in root folder")?
        .to_str()
        .context("Invalid chars in model dir name")?;

    // Construct path
    Ok([OUTPUT_DIRECTORY_ROOT, model_name].iter().collect())
}

/// Create a new output directory.
///
/// If the directory already exists and is not empty, it is only replaced if `allow_overwrite` is
/// true.
///
/// # Returns
///
/// True if an existing directory was overwritten, false otherwise.
pub fn create_output_directory(output_dir: &Path, allow_overwrite: bool) -> Result<bool> {
    let overwrite = if output_dir.is_dir() {
        if fs::read_dir(output_dir)?.next().is_none() {
            // Empty folder
            return Ok(false);
        }

        ensure!(
            allow_overwrite,
            "Output folder already exists and is not empty. Use --overwrite to replace it."
        );
        fs::remove_dir_all(output_dir)?;
        true
    } else {
        false
    };

    // Try to create the directory, with parents
    fs::create_dir_all(output_dir)?;

    Ok(overwrite)
}

/// Represents a row in the sweep results CSV file
#[derive(Serialize, Deserialize, Debug, PartialEq)]
struct SweepResultRow {
    label: FactorLabel,
    factor: f64,
    #[serde(rename = "ATP_production")]
    atp_production: f64,
    #[serde(rename = "O2_consumption")]
    o2_consumption: f64,
    #[serde(rename = "NADH_turnover")]
    nadh_turnover: f64,
    growth_rate: f64,
    source: ResultSource,
}

/// Represents a row in the reaction fluxes CSV file
#[derive(Serialize, Deserialize, Debug, PartialEq)]
struct ReactionFluxRow {
    label: FactorLabel,
    reaction: ReactionID,
    flux: f64,
}

/// An object for writing sweep results to file
pub struct DataWriter {
    results_writer: csv::Writer<File>,
    fluxes_writer: Option<csv::Writer<File>>,
}

impl DataWriter {
    /// Open CSV files to write output data to
    ///
    /// # Arguments
    ///
    /// * `output_path` - Folder where files will be saved
    /// * `write_reaction_fluxes` - Whether to write the flux through every reaction
    pub fn create(output_path: &Path, write_reaction_fluxes: bool) -> Result<Self> {
        let new_writer = |file_name| {
            let file_path = output_path.join(file_name);
            csv::Writer::from_path(&file_path)
                .with_context(|| format!("Could not create {}", file_path.display()))
        };

        let fluxes_writer = if write_reaction_fluxes {
            Some(new_writer(REACTION_FLUXES_FILE_NAME)?)
        } else {
            None
        };

        Ok(Self {
            results_writer: new_writer(SWEEP_RESULTS_FILE_NAME)?,
            fluxes_writer,
        })
    }

    /// Write one row per label to the sweep results file and, if enabled, the fluxes file
    pub fn write_results(&mut self, results: &SweepResults) -> Result<()> {
        for (label, record) in results {
            let row = SweepResultRow {
                label: label.clone(),
                factor: record.factor,
                atp_production: record.result.atp_production,
                o2_consumption: record.result.o2_consumption,
                nadh_turnover: record.result.nadh_turnover,
                growth_rate: record.result.growth_rate,
                source: record.source,
            };
            self.results_writer.serialize(row)?;

            if let Some(wtr) = &mut self.fluxes_writer {
                for (reaction, flux) in &record.fluxes {
                    wtr.serialize(ReactionFluxRow {
                        label: label.clone(),
                        reaction: reaction.clone(),
                        flux: *flux,
                    })?;
                }
            }
        }

        Ok(())
    }

    /// Flush the underlying streams
    pub fn flush(&mut self) -> Result<()> {
        self.results_writer.flush()?;
        if let Some(wtr) = &mut self.fluxes_writer {
            wtr.flush()?;
        }

        Ok(())
    }
}

/// Format the results as a table for display on the console
pub fn format_results_table(results: &SweepResults) -> Result<String> {
    let mut out = format!(
        "{:<12}{:>16}{:>16}{:>16}{:>14}  {}\n",
        "", "ATP_production", "O2_consumption", "NADH_turnover", "growth_rate", "source"
    );
    for (label, record) in results {
        let result = &record.result;
        writeln!(
            &mut out,
            "{:<12}{:>16.4}{:>16.4}{:>16.4}{:>14.5}  {}",
            label.as_str(),
            result.atp_production,
            result.o2_consumption,
            result.nadh_turnover,
            result.growth_rate,
            record.source
        )?;
    }

    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixture::sweep_result;
    use crate::sweep::{SweepRecord, SweepResult};
    use indexmap::indexmap;
    use itertools::{Itertools, assert_equal};
    use rstest::{fixture, rstest};
    use tempfile::tempdir;

    #[fixture]
    fn results(sweep_result: SweepResult) -> SweepResults {
        let mut results = SweepResults::default();
        results.insert(SweepRecord {
            factor: 2.0,
            result: sweep_result.scaled(2.0),
            source: ResultSource::Solver,
            fluxes: indexmap! {ReactionID::new("R1") => 1.5, ReactionID::new("R2") => -3.0},
        });
        results.insert_native(SweepRecord {
            factor: 1.0,
            result: sweep_result,
            source: ResultSource::InsufficientData,
            fluxes: indexmap! {ReactionID::new("R1") => 0.5, ReactionID::new("R2") => -1.0},
        });
        results
    }

    #[rstest]
    fn test_write_results(results: SweepResults) {
        let dir = tempdir().unwrap();

        {
            let mut writer = DataWriter::create(dir.path(), true).unwrap();
            writer.write_results(&results).unwrap();
            writer.flush().unwrap();
        }

        // Read back and compare
        let records: Vec<SweepResultRow> =
            csv::Reader::from_path(dir.path().join(SWEEP_RESULTS_FILE_NAME))
                .unwrap()
                .into_deserialize()
                .try_collect()
                .unwrap();
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].label, FactorLabel::native());
        assert_eq!(records[0].source, ResultSource::InsufficientData);
        assert_eq!(records[1].label, FactorLabel::for_factor(2.0));
        assert_eq!(records[1].growth_rate, 2.0);
        assert_eq!(records[1].o2_consumption, 8.0);

        let fluxes: Vec<ReactionFluxRow> =
            csv::Reader::from_path(dir.path().join(REACTION_FLUXES_FILE_NAME))
                .unwrap()
                .into_deserialize()
                .try_collect()
                .unwrap();
        assert_equal(
            fluxes.iter().map(|row| (row.label.as_str(), row.flux)),
            [
                ("Native", 0.5),
                ("Native", -1.0),
                ("Factor_2.0", 1.5),
                ("Factor_2.0", -3.0),
            ],
        );
    }

    #[rstest]
    fn test_sweep_results_header(results: SweepResults) {
        let dir = tempdir().unwrap();
        {
            let mut writer = DataWriter::create(dir.path(), false).unwrap();
            writer.write_results(&results).unwrap();
            writer.flush().unwrap();
        }

        let contents = fs::read_to_string(dir.path().join(SWEEP_RESULTS_FILE_NAME)).unwrap();
        assert_eq!(
            contents.lines().next().unwrap(),
            "label,factor,ATP_production,O2_consumption,NADH_turnover,growth_rate,source"
        );
        assert!(!dir.path().join(REACTION_FLUXES_FILE_NAME).exists());
    }

    #[rstest]
    fn test_format_results_table(results: SweepResults) {
        let table = format_results_table(&results).unwrap();
        let lines: Vec<_> = table.lines().collect();
        assert_eq!(lines.len(), 3);
        assert!(lines[1].starts_with("Native"));
        assert!(lines[1].ends_with("insufficient_data"));
        assert!(lines[2].starts_with("Factor_2.0"));
    }

    #[test]
    fn test_create_output_directory() {
        let dir = tempdir().unwrap();
        let output_dir = dir.path().join("a").join("b");

        // New folder, with parents
        assert!(!create_output_directory(&output_dir, false).unwrap());
        assert!(output_dir.is_dir());

        // Empty folder is reused
        assert!(!create_output_directory(&output_dir, false).unwrap());

        // Non-empty folder needs permission to overwrite
        fs::write(output_dir.join("file.txt"), "x").unwrap();
        assert!(create_output_directory(&output_dir, false).is_err());
        assert!(create_output_directory(&output_dir, true).unwrap());
        assert!(!output_dir.join("file.txt").exists());
    }

    #[test]
    fn test_get_output_dir() {
        let dir = tempdir().unwrap();
        let model_dir = dir.path().join("my_model");
        fs::create_dir(&model_dir).unwrap();
        assert_eq!(
            get_output_dir(&model_dir).unwrap(),
            Path::new(OUTPUT_DIRECTORY_ROOT).join("my_model")
        );
    }
}
