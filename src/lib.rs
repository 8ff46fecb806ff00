//! Common functionality for fluxsweep.
#![warn(missing_docs)]
use std::path::PathBuf;

pub mod cli;
pub mod experiment;
pub mod id;
pub mod input;
pub mod log;
pub mod metabolite;
pub mod model;
pub mod optimisation;
pub mod output;
pub mod reaction;
pub mod settings;
pub mod simulation;
pub mod sweep;

#[cfg(test)]
mod fixture;

/// Get the folder in which the program's configuration files are stored.
///
/// Falls back to a relative folder if the platform has no config folder.
pub fn get_fluxsweep_config_dir() -> PathBuf {
    let mut path = dirs::config_dir().unwrap_or_default();
    path.push("fluxsweep");

    path
}
