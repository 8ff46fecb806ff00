//! Common routines for handling input data.
use crate::experiment::ExperimentParameters;
use crate::model::Model;
use anyhow::{Context, Result};
use itertools::Itertools;
use log::info;
use serde::de::DeserializeOwned;
use std::fs;
use std::path::Path;

pub mod cobra_json;
use cobra_json::read_cobra_json;

/// The name of the model file in a model directory
pub const MODEL_FILE_NAME: &str = "model.json";

/// Read a TOML file at the specified path.
///
/// # Arguments
///
/// * `file_path` - The path to the TOML file
///
/// # Returns
///
/// * The deserialised TOML data or an error if the file could not be read or parsed.
pub fn read_toml<T: DeserializeOwned>(file_path: &Path) -> Result<T> {
    let toml_str = fs::read_to_string(file_path).with_context(|| input_err_msg(file_path))?;
    let toml_data = toml::from_str(&toml_str).with_context(|| input_err_msg(file_path))?;
    Ok(toml_data)
}

/// Format an error message to include the file path. To be used with `anyhow::Context`.
pub fn input_err_msg<P: AsRef<Path>>(file_path: P) -> String {
    format!("Error reading {}", file_path.as_ref().to_string_lossy())
}

/// Read a model and its experiment from the specified directory.
///
/// The experiment's exchange bounds are applied to the model before it is returned.
///
/// # Arguments
///
/// * `model_dir` - Folder containing model configuration files
///
/// # Returns
///
/// The model and experiment parameters or an error.
pub fn load_model<P: AsRef<Path>>(model_dir: P) -> Result<(Model, ExperimentParameters)> {
    let model_dir = model_dir.as_ref();
    let params = ExperimentParameters::from_path(model_dir)?;

    let file_path = model_dir.join(MODEL_FILE_NAME);
    let mut model = read_cobra_json(&file_path)?;
    info!(
        "Available reaction IDs: [{}]",
        model.iter_reaction_ids().join(", ")
    );

    params.apply_exchange_bounds(&mut model)?;
    params.objective_for(&model)?;

    Ok((model, params))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::experiment::EXPERIMENT_FILE_NAME;
    use serde::Deserialize;
    use std::fs::File;
    use std::io::Write;
    use std::path::PathBuf;
    use tempfile::tempdir;

    #[derive(Debug, Deserialize, PartialEq)]
    struct Record {
        id: String,
        value: u32,
    }

    /// Create an example TOML file in dir_path
    fn create_toml_file(dir_path: &Path) -> PathBuf {
        let file_path = dir_path.join("test.toml");
        let mut file = File::create(&file_path).unwrap();
        writeln!(file, "id = \"hello\"\nvalue = 1").unwrap();
        file_path
    }

    /// Test a normal read
    #[test]
    fn test_read_toml() {
        let dir = tempdir().unwrap();
        let file_path = create_toml_file(dir.path());

        assert_eq!(
            read_toml::<Record>(&file_path).unwrap(),
            Record {
                id: "hello".to_string(),
                value: 1,
            }
        );

        // File doesn't exist
        assert!(read_toml::<Record>(Path::new("NON_EXISTENT.toml")).is_err());
    }

    #[test]
    fn test_load_model_missing() {
        let dir = tempdir().unwrap();
        assert!(load_model(dir.path()).is_err());
    }

    #[test]
    fn test_load_model_bad_objective() {
        let dir = tempdir().unwrap();
        fs::write(
            dir.path().join(MODEL_FILE_NAME),
            r#"{"id": "m", "metabolites": [{"id": "a_c"}],
                "reactions": [{"id": "EX_a", "metabolites": {"a_c": -1.0},
                               "lower_bound": -10.0, "upper_bound": 1000.0}]}"#,
        )
        .unwrap();

        // Default objective refers to reactions which are not present
        assert!(load_model(dir.path()).is_err());

        fs::write(
            dir.path().join(EXPERIMENT_FILE_NAME),
            "bound_overrides = {}\nobjective = {EX_a = 1.0}",
        )
        .unwrap();
        let (model, params) = load_model(dir.path()).unwrap();
        assert_eq!(model.id, "m");
        assert!(params.bound_overrides.is_empty());
    }
}
