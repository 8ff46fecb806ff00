//! Functionality for running a sweep from start to finish.
use crate::experiment::ExperimentParameters;
use crate::model::Model;
use crate::output::metadata::write_metadata;
use crate::output::plot::{GROWTH_RATE_PLOT_FILE_NAME, plot_growth_rate};
use crate::output::{DataWriter, format_results_table};
use crate::settings::Settings;
use crate::sweep::changes::summarise_flux_changes;
use crate::sweep::fallback::apply_zero_result_policy;
use crate::sweep::{SweepResults, SweepRunner};
use anyhow::{Context, Result};
use log::{info, warn};
use std::path::Path;

/// Run the sweep and write the results.
///
/// # Arguments:
///
/// * `model` - The model to run, with exchange bounds already applied
/// * `params` - Experiment parameters
/// * `model_path` - Path to the model directory
/// * `output_path` - The folder to which output files will be written
/// * `settings` - Program settings
pub fn run(
    model: Model,
    params: &ExperimentParameters,
    model_path: &Path,
    output_path: &Path,
    settings: &Settings,
) -> Result<SweepResults> {
    write_metadata(output_path, model_path, &model.id, params)
        .context("Failed to save metadata.")?;

    let mut runner = SweepRunner::new(model, params)?;
    let mut results = runner.run(&params.factors)?;
    info!(
        "Found optimal solutions for {} of {} factors",
        results.len(),
        params.factors.len()
    );

    if params.include_native {
        match runner.run_native()? {
            Some(record) => results.insert_native(record),
            None => warn!("No optimal solution for Native run; omitting it from results"),
        }
    }

    apply_zero_result_policy(&mut results, params.zero_result_policy, &params.estimate);
    info!("Results:\n{}", format_results_table(&results)?);

    let mut writer = DataWriter::create(output_path, settings.write_reaction_fluxes)?;
    writer.write_results(&results)?;
    writer.flush()?;

    if settings.plot_growth_rate {
        if results.is_empty() {
            warn!("No results to plot");
        } else {
            plot_growth_rate(&output_path.join(GROWTH_RATE_PLOT_FILE_NAME), &results)
                .context("Failed to plot growth rate.")?;
        }
    }

    let changes = summarise_flux_changes(
        &results,
        params.flux_change_threshold,
        params.top_flux_changes,
    );
    info!("Top {} flux changes: {changes}", params.top_flux_changes);

    Ok(results)
}
