//! Integration tests for the `example run` command.
use fluxsweep::cli::RunOpts;
use fluxsweep::cli::example::handle_example_run_command;
use fluxsweep::output::plot::GROWTH_RATE_PLOT_FILE_NAME;
use fluxsweep::output::{REACTION_FLUXES_FILE_NAME, SWEEP_RESULTS_FILE_NAME};
use fluxsweep::settings::Settings;
use tempfile::tempdir;

/// An integration test for the `example run` command.
#[test]
fn test_handle_example_run_command() {
    unsafe { std::env::set_var("FLUXSWEEP_LOG_LEVEL", "off") };

    let tempdir = tempdir().unwrap();
    let opts = RunOpts {
        output_dir: Some(tempdir.path().to_path_buf()),
        ..Default::default()
    };
    handle_example_run_command("e_coli_core", &opts, Some(Settings::default())).unwrap();

    for file_name in [
        SWEEP_RESULTS_FILE_NAME,
        REACTION_FLUXES_FILE_NAME,
        GROWTH_RATE_PLOT_FILE_NAME,
        "metadata.toml",
        "fluxsweep_info.log",
    ] {
        assert!(tempdir.path().join(file_name).is_file(), "{file_name} missing");
    }
}
