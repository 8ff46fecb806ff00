//! Code for writing metadata to file
use crate::experiment::{BoundUpdate, ExperimentParameters, ZeroResultPolicy};
use anyhow::{Context, Result, anyhow};
use chrono::prelude::*;
use platform_info::{PlatformInfo, PlatformInfoAPI, UNameAPI};
use serde::Serialize;
use std::fs;
use std::path::Path;

/// The output file name for metadata
const METADATA_FILE_NAME: &str = "metadata.toml";

/// Information about the program build via `built` crate
mod built_info {
    // The file has been placed there by the build script.
    include!(concat!(env!("OUT_DIR"), "/built.rs"));
}

/// Get information about program version from git
fn get_git_hash() -> String {
    let Some(hash) = built_info::GIT_COMMIT_HASH_SHORT else {
        return "unknown".into();
    };

    if built_info::GIT_DIRTY == Some(true) {
        format!("{hash}-dirty")
    } else {
        hash.into()
    }
}

/// The contents of the metadata file
#[derive(Serialize)]
struct Metadata<'a> {
    run: RunMetadata<'a>,
    program: ProgramMetadata<'a>,
    platform: PlatformMetadata,
}

/// Information about the sweep
#[derive(Serialize)]
struct RunMetadata<'a> {
    /// Path to the model which was run
    model_path: &'a Path,
    /// The ID given in the model file
    model_id: &'a str,
    /// The date and time on which the run started
    datetime: String,
    /// The factors which were swept over
    factors: &'a [f64],
    /// How bounds were treated between factors
    bound_update: BoundUpdate,
    /// How zero results were handled
    zero_result_policy: ZeroResultPolicy,
}

impl<'a> RunMetadata<'a> {
    fn new(model_path: &'a Path, model_id: &'a str, params: &'a ExperimentParameters) -> Self {
        Self {
            model_path,
            model_id,
            datetime: Local::now().to_rfc2822(),
            factors: &params.factors,
            bound_update: params.bound_update,
            zero_result_policy: params.zero_result_policy,
        }
    }
}

#[derive(Serialize)]
struct ProgramMetadata<'a> {
    /// The program name
    name: &'a str,
    /// The program version as specified in Cargo.toml
    version: &'a str,
    /// The target architecture for the build (e.g. x86_64-unknown-linux-gnu)
    target: &'a str,
    /// Whether it is a debug build
    is_debug: bool,
    /// The version of rustc used to compile fluxsweep
    rustc_version: &'a str,
    /// When fluxsweep was built
    build_time_utc: &'a str,
    /// The git commit hash for the version of fluxsweep (if known)
    git_commit_hash: String,
}

impl Default for ProgramMetadata<'_> {
    fn default() -> Self {
        Self {
            name: built_info::PKG_NAME,
            version: built_info::PKG_VERSION,
            target: built_info::TARGET,
            is_debug: built_info::DEBUG,
            rustc_version: built_info::RUSTC_VERSION,
            build_time_utc: built_info::BUILT_TIME_UTC,
            git_commit_hash: get_git_hash(),
        }
    }
}

/// Information about the platform on which fluxsweep is running.
///
/// The fields correspond to different data available from the [`PlatformInfo`] struct.
#[derive(Serialize)]
struct PlatformMetadata {
    sysname: String,
    nodename: String,
    release: String,
    version: String,
    machine: String,
    osname: String,
}

impl PlatformMetadata {
    fn new() -> Result<Self> {
        let info = PlatformInfo::new()
            .map_err(|err| anyhow!("Unable to determine platform info: {err}"))?;
        Ok(Self {
            sysname: info.sysname().to_string_lossy().into(),
            nodename: info.nodename().to_string_lossy().into(),
            release: info.release().to_string_lossy().into(),
            version: info.version().to_string_lossy().into(),
            machine: info.machine().to_string_lossy().into(),
            osname: info.osname().to_string_lossy().into(),
        })
    }
}

/// Write metadata to the specified output path in TOML format
pub fn write_metadata(
    output_path: &Path,
    model_path: &Path,
    model_id: &str,
    params: &ExperimentParameters,
) -> Result<()> {
    let metadata = Metadata {
        run: RunMetadata::new(model_path, model_id, params),
        program: ProgramMetadata::default(),
        platform: PlatformMetadata::new()?,
    };
    let file_path = output_path.join(METADATA_FILE_NAME);
    fs::write(&file_path, toml::to_string(&metadata)?)
        .with_context(|| format!("Could not write {}", file_path.display()))?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_write_metadata() {
        let dir = tempdir().unwrap();
        let params = ExperimentParameters::default();
        write_metadata(dir.path(), Path::new("models/e_coli_core"), "e_coli_core", &params)
            .unwrap();

        let contents = fs::read_to_string(dir.path().join(METADATA_FILE_NAME)).unwrap();
        let metadata: toml::Table = toml::from_str(&contents).unwrap();
        let run = metadata["run"].as_table().unwrap();
        assert_eq!(run["model_id"].as_str(), Some("e_coli_core"));
        assert_eq!(run["factors"].as_array().unwrap().len(), 4);
        assert_eq!(run["bound_update"].as_str(), Some("baseline"));
        assert_eq!(run["zero_result_policy"].as_str(), Some("flag"));
        assert_eq!(
            metadata["program"]["name"].as_str(),
            Some(env!("CARGO_PKG_NAME"))
        );
        assert!(metadata.contains_key("platform"));
    }
}
