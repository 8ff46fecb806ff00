//! Code related to the built-in models and the CLI commands for interacting with them.
use super::{RunOpts, handle_run_command};
use crate::settings::Settings;
use anyhow::{Context, Result, bail, ensure};
use clap::Subcommand;
use include_dir::{Dir, DirEntry, include_dir};
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

/// The directory containing the built-in models.
const MODELS_DIR: Dir = include_dir!("$CARGO_MANIFEST_DIR/models");

/// The available subcommands for managing built-in models.
#[derive(Subcommand)]
pub enum ExampleSubcommands {
    /// List available models.
    List,
    /// Provide information about the specified model.
    Info {
        /// The name of the model.
        name: String,
    },
    /// Extract a model to a new directory.
    Extract {
        /// The name of the model to extract.
        name: String,
        /// The destination folder for the model.
        new_path: Option<PathBuf>,
    },
    /// Run a sweep on a built-in model.
    Run {
        /// The name of the model to run.
        name: String,
        /// Other run options
        #[command(flatten)]
        opts: RunOpts,
    },
}

impl ExampleSubcommands {
    /// Execute the supplied example subcommand
    pub fn execute(self) -> Result<()> {
        match self {
            Self::List => handle_example_list_command(),
            Self::Info { name } => handle_example_info_command(&name)?,
            Self::Extract {
                name,
                new_path: dest,
            } => handle_example_extract_command(&name, dest.as_deref())?,
            Self::Run { name, opts } => handle_example_run_command(&name, &opts, None)?,
        }

        Ok(())
    }
}

/// Names of the built-in models
pub fn iter_example_names() -> impl Iterator<Item = String> {
    MODELS_DIR
        .dirs()
        .map(|dir| dir.path().to_string_lossy().into_owned())
}

/// Handle the `example list` command.
fn handle_example_list_command() {
    for name in iter_example_names() {
        println!("{name}");
    }
}

/// Get the README for a built-in model
fn get_example_readme(name: &str) -> Result<&'static str> {
    let path: PathBuf = [name, "README.txt"].iter().collect();
    MODELS_DIR
        .get_file(path)
        .context("Example not found.")?
        .contents_utf8()
        .context("README.txt is not UTF-8 encoded")
}

/// Handle the `example info` command.
fn handle_example_info_command(name: &str) -> Result<()> {
    println!("{}", get_example_readme(name)?);

    Ok(())
}

/// Handle the `example extract` command
fn handle_example_extract_command(name: &str, dest: Option<&Path>) -> Result<()> {
    let dest = dest.unwrap_or(Path::new(name));
    extract_example(name, dest)
}

/// Extract the specified built-in model to a new directory
fn extract_example(name: &str, new_path: &Path) -> Result<()> {
    // Find the subdirectory in MODELS_DIR whose name matches `name`.
    let sub_dir = MODELS_DIR.get_dir(name).context("Example not found.")?;

    ensure!(
        !new_path.exists(),
        "Destination directory {} already exists",
        new_path.display()
    );

    // Copy the contents of the subdirectory to the destination
    fs::create_dir(new_path)?;
    for entry in sub_dir.entries() {
        match entry {
            DirEntry::Dir(_) => bail!("Subdirectories in built-in models are not supported"),
            DirEntry::File(f) => {
                let file_name = f.path().file_name().context("Invalid file name")?;
                fs::write(new_path.join(file_name), f.contents())?;
            }
        }
    }

    Ok(())
}

/// Handle the `example run` command.
pub fn handle_example_run_command(
    name: &str,
    opts: &RunOpts,
    settings: Option<Settings>,
) -> Result<()> {
    let temp_dir = TempDir::new().context("Failed to create temporary directory.")?;
    let model_path = temp_dir.path().join(name);
    extract_example(name, &model_path)?;
    handle_run_command(&model_path, opts, settings)
}
