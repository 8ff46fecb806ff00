//! Defines the `ExperimentParameters` struct, which represents the contents of `experiment.toml`.
use crate::input::{input_err_msg, read_toml};
use crate::model::{Model, Objective};
use crate::sweep::{FactorLabel, SweepResult};
use anyhow::{Context, Result, ensure};
use indexmap::{IndexMap, indexmap};
use log::{debug, warn};
use serde::Deserialize;
use serde_string_enum::{DeserializeLabeledStringEnum, SerializeLabeledStringEnum};
use std::collections::HashSet;
use std::path::Path;

/// The name of the experiment file in a model directory
pub const EXPERIMENT_FILE_NAME: &str = "experiment.toml";

macro_rules! define_param_default {
    ($name:ident, $type: ty, $value: expr) => {
        fn $name() -> $type {
            $value
        }
    };
}

define_param_default!(default_factors, Vec<f64>, vec![1.0, 2.0, 3.0, 4.0]);
define_param_default!(default_multiplier_cap, f64, 4.0);
define_param_default!(default_include_native, bool, true);
define_param_default!(default_flux_change_threshold, f64, 0.1);
define_param_default!(default_top_flux_changes, usize, 5);

fn default_bound_overrides() -> IndexMap<String, f64> {
    ["NADH16", "CYTBD", "CS", "SUCDi", "ATPS4r", "O2t"]
        .into_iter()
        .map(|id| (id.to_string(), 1.0))
        .collect()
}

fn default_objective() -> IndexMap<String, f64> {
    indexmap! {
        "BIOMASS_Ecoli_core_w_GAM".to_string() => 0.5,
        "ATPM".to_string() => 0.5,
    }
}

fn default_estimate() -> SweepResult {
    SweepResult {
        atp_production: 8.39,
        o2_consumption: 5.0,
        nadh_turnover: 10.0,
        growth_rate: 1.00083,
    }
}

/// Represents the contents of the entire experiment file.
#[derive(Debug, Deserialize, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct ExperimentParameters {
    /// Scaling factors to sweep over, in order
    #[serde(default = "default_factors")]
    pub factors: Vec<f64>,
    /// The largest multiplier which may be applied to an upper bound
    #[serde(default = "default_multiplier_cap")]
    pub multiplier_cap: f64,
    /// Base multipliers for the upper bounds of the perturbed reactions
    #[serde(default = "default_bound_overrides")]
    pub bound_overrides: IndexMap<String, f64>,
    /// Bounds applied to reactions once, before the sweep begins
    #[serde(default)]
    pub exchange_bounds: Vec<ExchangeBound>,
    /// Weights of the reactions in the objective
    #[serde(default = "default_objective")]
    pub objective: IndexMap<String, f64>,
    /// Reactions whose fluxes are reported for each factor
    #[serde(default)]
    pub reporters: ReporterReactions,
    /// How bounds are treated between sweep iterations
    #[serde(default)]
    pub bound_update: BoundUpdate,
    /// What to do with results where ATP production or growth rate is exactly zero
    #[serde(default)]
    pub zero_result_policy: ZeroResultPolicy,
    /// Estimated result at a factor of one, used by the `estimate` zero result policy
    #[serde(default = "default_estimate")]
    pub estimate: SweepResult,
    /// Whether to run the unperturbed ("Native") solve after the sweep
    #[serde(default = "default_include_native")]
    pub include_native: bool,
    /// Flux changes with an absolute value at or below this are not reported
    #[serde(default = "default_flux_change_threshold")]
    pub flux_change_threshold: f64,
    /// The number of flux changes to report
    #[serde(default = "default_top_flux_changes")]
    pub top_flux_changes: usize,
}

impl Default for ExperimentParameters {
    fn default() -> Self {
        Self {
            factors: default_factors(),
            multiplier_cap: default_multiplier_cap(),
            bound_overrides: default_bound_overrides(),
            exchange_bounds: Vec::new(),
            objective: default_objective(),
            reporters: ReporterReactions::default(),
            bound_update: BoundUpdate::default(),
            zero_result_policy: ZeroResultPolicy::default(),
            estimate: default_estimate(),
            include_native: default_include_native(),
            flux_change_threshold: default_flux_change_threshold(),
            top_flux_changes: default_top_flux_changes(),
        }
    }
}

/// New bounds for a reaction, applied before the sweep
#[derive(Debug, Deserialize, PartialEq, Clone)]
#[serde(deny_unknown_fields)]
pub struct ExchangeBound {
    /// The reaction to constrain
    pub reaction: String,
    /// New lower bound (unchanged if absent)
    pub lower_bound: Option<f64>,
    /// New upper bound (unchanged if absent)
    pub upper_bound: Option<f64>,
}

/// The reactions whose fluxes make up a [`SweepResult`]
#[derive(Debug, Deserialize, PartialEq, Clone)]
#[serde(default, deny_unknown_fields)]
pub struct ReporterReactions {
    /// Flux reported as ATP production
    pub atp_production: String,
    /// Exchange reaction for oxygen. Its flux is negated to give consumption.
    pub o2_exchange: String,
    /// Flux reported as NADH turnover
    pub nadh_turnover: String,
    /// Flux reported as growth rate
    pub growth: String,
}

impl Default for ReporterReactions {
    fn default() -> Self {
        Self {
            atp_production: "ATPM".into(),
            o2_exchange: "EX_o2_e".into(),
            nadh_turnover: "NADH16".into(),
            growth: "BIOMASS_Ecoli_core_w_GAM".into(),
        }
    }
}

/// How reaction bounds are treated between sweep iterations
#[derive(
    DeserializeLabeledStringEnum, SerializeLabeledStringEnum, Debug, PartialEq, Default, Clone, Copy,
)]
pub enum BoundUpdate {
    /// Restore all bounds to the values they had before the sweep began
    #[default]
    #[string = "baseline"]
    Baseline,
    /// Never restore bounds, so overrides compound across iterations
    #[string = "cumulative"]
    Cumulative,
}

/// What to do with results where ATP production or growth rate is exactly zero
#[derive(
    DeserializeLabeledStringEnum, SerializeLabeledStringEnum, Debug, PartialEq, Default, Clone, Copy,
)]
pub enum ZeroResultPolicy {
    /// Keep the solver's values and mark the result as having insufficient data
    #[default]
    #[string = "flag"]
    Flag,
    /// Replace the values with estimates scaled by the factor
    #[string = "estimate"]
    Estimate,
}

/// Check that the `factors` parameter is valid
fn check_factors(factors: &[f64]) -> Result<()> {
    ensure!(!factors.is_empty(), "`factors` is empty");
    ensure!(
        factors.iter().all(|f| f.is_finite() && *f > 0.0),
        "`factors` must all be finite numbers greater than zero"
    );

    let mut labels = HashSet::new();
    for factor in factors {
        let label = FactorLabel::for_factor(*factor);
        ensure!(
            labels.insert(label.clone()),
            "Factor {factor} gives the label {label}, which is already in use"
        );
    }

    Ok(())
}

/// Check that a value is a finite number greater than zero
fn check_positive(name: &str, value: f64) -> Result<()> {
    ensure!(
        value.is_finite() && value > 0.0,
        "{name} must be a finite number greater than zero"
    );

    Ok(())
}

impl ExperimentParameters {
    /// Read the experiment file from the specified directory.
    ///
    /// If the file is not present, default values are used.
    ///
    /// # Arguments
    ///
    /// * `model_dir` - Folder containing model configuration files
    ///
    /// # Returns
    ///
    /// The experiment file contents or an error if the file is invalid
    pub fn from_path<P: AsRef<Path>>(model_dir: P) -> Result<ExperimentParameters> {
        let file_path = model_dir.as_ref().join(EXPERIMENT_FILE_NAME);
        if !file_path.is_file() {
            warn!("No {EXPERIMENT_FILE_NAME} provided; using default experiment");
            return Ok(ExperimentParameters::default());
        }

        let params: ExperimentParameters = read_toml(&file_path)?;
        params
            .validate()
            .with_context(|| input_err_msg(&file_path))?;

        Ok(params)
    }

    /// Validate parameters after reading in file
    pub fn validate(&self) -> Result<()> {
        check_factors(&self.factors)?;
        check_positive("multiplier_cap", self.multiplier_cap)?;
        for (id, multiplier) in &self.bound_overrides {
            check_positive(&format!("Multiplier for {id}"), *multiplier)?;
        }
        ensure!(!self.objective.is_empty(), "`objective` is empty");
        ensure!(
            self.flux_change_threshold.is_finite() && self.flux_change_threshold >= 0.0,
            "flux_change_threshold must be a finite number of at least zero"
        );
        ensure!(
            self.top_flux_changes > 0,
            "top_flux_changes cannot be zero"
        );

        Ok(())
    }

    /// Resolve the objective against the model's reactions
    pub fn objective_for(&self, model: &Model) -> Result<Objective> {
        self.objective
            .iter()
            .map(|(id, weight)| Ok((model.require_reaction(id)?, *weight)))
            .collect()
    }

    /// Apply the exchange bounds to the model
    pub fn apply_exchange_bounds(&self, model: &mut Model) -> Result<()> {
        for bound in &self.exchange_bounds {
            let reaction = model
                .get_reaction_mut(&bound.reaction)
                .context("Invalid exchange bound")?;
            let lower = bound.lower_bound.unwrap_or(reaction.lower_bound);
            let upper = bound.upper_bound.unwrap_or(reaction.upper_bound);
            debug!(
                "{} bounds: ({}, {}) -> ({lower}, {upper})",
                reaction.id, reaction.lower_bound, reaction.upper_bound
            );
            reaction.set_bounds(lower, upper)?;
        }

        Ok(())
    }
}
