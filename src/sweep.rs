//! Sweep a set of reaction upper bounds over a range of scaling factors, running FBA for each.
use crate::experiment::{BoundUpdate, ExperimentParameters, ReporterReactions};
use crate::model::{BoundsSnapshot, Model, Objective};
use crate::optimisation::{FbaSolution, perform_fba};
use crate::reaction::ReactionID;
use anyhow::{Context, Result};
use derive_more::Display;
use indexmap::IndexMap;
use itertools::Itertools;
use log::{debug, info, warn};
use serde::{Deserialize, Serialize};

pub mod changes;
pub mod fallback;

/// The label used for the unperturbed run
const NATIVE_LABEL: &str = "Native";

/// The number of fluxes shown in the flux summary for each factor
const FLUX_SUMMARY_LEN: usize = 5;

/// Identifies a row of the results: either a swept factor or the Native run
#[derive(Debug, Display, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct FactorLabel(String);

impl FactorLabel {
    /// The label for a swept factor, e.g. `Factor_2.0`
    pub fn for_factor(factor: f64) -> Self {
        Self(format!("Factor_{factor:.1}"))
    }

    /// The label for the Native run
    pub fn native() -> Self {
        Self(NATIVE_LABEL.into())
    }

    /// Whether this is the label for the Native run
    pub fn is_native(&self) -> bool {
        self.0 == NATIVE_LABEL
    }

    /// The label as a string slice
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// The summary quantities reported for each factor
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SweepResult {
    /// Flux through the ATP maintenance reaction
    #[serde(rename = "ATP_production")]
    pub atp_production: f64,
    /// Negated flux through the oxygen exchange reaction
    #[serde(rename = "O2_consumption")]
    pub o2_consumption: f64,
    /// Flux through NADH dehydrogenase
    #[serde(rename = "NADH_turnover")]
    pub nadh_turnover: f64,
    /// Flux through the biomass reaction
    pub growth_rate: f64,
}

impl SweepResult {
    /// Extract the summary quantities from an FBA solution.
    ///
    /// Reactions which are absent from the solution count as zero flux.
    pub fn from_solution(solution: &FbaSolution, reporters: &ReporterReactions) -> Self {
        let flux = |id: &str| solution.flux(id).unwrap_or(0.0);
        Self {
            atp_production: flux(&reporters.atp_production),
            o2_consumption: -flux(&reporters.o2_exchange),
            nadh_turnover: flux(&reporters.nadh_turnover),
            growth_rate: flux(&reporters.growth),
        }
    }

    /// Multiply every quantity by `factor`
    pub fn scaled(&self, factor: f64) -> Self {
        Self {
            atp_production: self.atp_production * factor,
            o2_consumption: self.o2_consumption * factor,
            nadh_turnover: self.nadh_turnover * factor,
            growth_rate: self.growth_rate * factor,
        }
    }

    /// Whether ATP production or growth rate is exactly zero
    pub fn has_zero_output(&self) -> bool {
        self.atp_production == 0.0 || self.growth_rate == 0.0
    }

    /// Iterate over the quantities along with their column names
    pub fn iter_fields(&self) -> impl Iterator<Item = (&'static str, f64)> {
        [
            ("ATP_production", self.atp_production),
            ("O2_consumption", self.o2_consumption),
            ("NADH_turnover", self.nadh_turnover),
            ("growth_rate", self.growth_rate),
        ]
        .into_iter()
    }
}

/// Where the values of a [`SweepRecord`] came from
#[derive(Debug, Display, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResultSource {
    /// Values are those calculated by the solver
    #[display("solver")]
    Solver,
    /// Values were replaced by estimates
    #[display("estimate")]
    Estimate,
    /// Values are those calculated by the solver, but ATP production or growth rate is zero
    #[display("insufficient_data")]
    InsufficientData,
}

/// The result of a single solve within a sweep
#[derive(Debug, Clone, PartialEq)]
pub struct SweepRecord {
    /// The scaling factor used
    pub factor: f64,
    /// The reported quantities
    pub result: SweepResult,
    /// Where `result` came from
    pub source: ResultSource,
    /// Flux through every reaction, as calculated by the solver
    pub fluxes: IndexMap<ReactionID, f64>,
}

/// Sweep records keyed by label, with the Native run (if any) first
#[derive(Debug, Default, Clone, PartialEq)]
pub struct SweepResults(IndexMap<FactorLabel, SweepRecord>);

impl SweepResults {
    /// Add a record for a swept factor
    pub fn insert(&mut self, record: SweepRecord) {
        self.0.insert(FactorLabel::for_factor(record.factor), record);
    }

    /// Add the record for the Native run, placing it before all other records
    pub fn insert_native(&mut self, record: SweepRecord) {
        self.0.shift_insert(0, FactorLabel::native(), record);
    }

    /// Get the record for a label
    pub fn get(&self, label: &FactorLabel) -> Option<&SweepRecord> {
        self.0.get(label)
    }

    /// Get the record for the Native run
    pub fn native(&self) -> Option<&SweepRecord> {
        self.get(&FactorLabel::native())
    }

    /// Iterate over all records in order
    pub fn iter(&self) -> indexmap::map::Iter<'_, FactorLabel, SweepRecord> {
        self.0.iter()
    }

    /// Iterate mutably over all records in order
    pub fn iter_mut(&mut self) -> indexmap::map::IterMut<'_, FactorLabel, SweepRecord> {
        self.0.iter_mut()
    }

    /// Iterate over the records for swept factors, excluding Native
    pub fn iter_swept(&self) -> impl Iterator<Item = (&FactorLabel, &SweepRecord)> {
        self.0.iter().filter(|(label, _)| !label.is_native())
    }

    /// The swept record with the largest factor
    pub fn highest_factor(&self) -> Option<(&FactorLabel, &SweepRecord)> {
        self.iter_swept()
            .max_by(|(_, a), (_, b)| a.factor.total_cmp(&b.factor))
    }

    /// The number of records, including Native
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Whether there are no records
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl<'a> IntoIterator for &'a SweepResults {
    type Item = (&'a FactorLabel, &'a SweepRecord);
    type IntoIter = indexmap::map::Iter<'a, FactorLabel, SweepRecord>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

impl<'a> IntoIterator for &'a mut SweepResults {
    type Item = (&'a FactorLabel, &'a mut SweepRecord);
    type IntoIter = indexmap::map::IterMut<'a, FactorLabel, SweepRecord>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter_mut()
    }
}

/// The multiplier applied to an upper bound for a given factor
pub fn effective_multiplier(base: f64, factor: f64, cap: f64) -> f64 {
    (factor * base).min(cap)
}

/// Base multipliers for the upper bounds of the perturbed reactions
#[derive(Debug, Clone, PartialEq)]
pub struct BoundOverrideTable {
    multipliers: IndexMap<String, f64>,
    cap: f64,
}

impl BoundOverrideTable {
    /// Create a new table
    pub fn new(multipliers: IndexMap<String, f64>, cap: f64) -> Self {
        Self { multipliers, cap }
    }

    /// Iterate over reaction IDs with their effective multiplier for the given factor
    pub fn iter_scaled(&self, factor: f64) -> impl Iterator<Item = (&str, f64)> {
        self.multipliers
            .iter()
            .map(move |(id, base)| (id.as_str(), effective_multiplier(*base, factor, self.cap)))
    }

    /// Scale the upper bounds of the model's reactions for the given factor.
    ///
    /// Reactions not in the model are skipped.
    pub fn apply(&self, model: &mut Model, factor: f64) -> Result<()> {
        for (id, multiplier) in self.iter_scaled(factor) {
            let Ok(reaction) = model.get_reaction_mut(id) else {
                debug!("Reaction {id} is not in the model; skipping bound override");
                continue;
            };

            let old = reaction
                .scale_upper_bound(multiplier)
                .with_context(|| format!("Could not apply factor {factor} to reaction {id}"))?;
            info!("{id} upper bound: {old} -> {}", reaction.upper_bound);
        }

        Ok(())
    }
}

/// Runs FBA for each factor of a sweep.
///
/// The runner owns the model and mutates its bounds as the sweep progresses.
pub struct SweepRunner {
    model: Model,
    overrides: BoundOverrideTable,
    objective: Objective,
    reporters: ReporterReactions,
    bound_update: BoundUpdate,
    baseline: BoundsSnapshot,
}

impl SweepRunner {
    /// Create a new runner.
    ///
    /// The model's current bounds are recorded as the baseline for the sweep.
    pub fn new(model: Model, params: &ExperimentParameters) -> Result<Self> {
        let objective = params.objective_for(&model)?;
        let baseline = model.snapshot_bounds();

        Ok(Self {
            model,
            overrides: BoundOverrideTable::new(
                params.bound_overrides.clone(),
                params.multiplier_cap,
            ),
            objective,
            reporters: params.reporters.clone(),
            bound_update: params.bound_update,
            baseline,
        })
    }

    /// Run FBA for each factor in turn.
    ///
    /// Factors for which no optimal solution is found are omitted from the results.
    pub fn run(&mut self, factors: &[f64]) -> Result<SweepResults> {
        let mut results = SweepResults::default();
        for factor in factors {
            if let Some(record) = self.run_factor(*factor)? {
                results.insert(record);
            }
        }

        Ok(results)
    }

    /// Run FBA for a single factor.
    ///
    /// # Returns
    ///
    /// The record for this factor, or `None` if the solver did not find an optimal solution.
    pub fn run_factor(&mut self, factor: f64) -> Result<Option<SweepRecord>> {
        if self.bound_update == BoundUpdate::Baseline {
            self.model.restore_bounds(&self.baseline);
        }
        self.overrides.apply(&mut self.model, factor)?;
        self.model.set_objective(self.objective.clone())?;

        let solution = perform_fba(&self.model)?;
        if !solution.is_optimal() {
            warn!(
                "Solver status is '{}' for factor {factor}. Skipping.",
                solution.status
            );
            return Ok(None);
        }

        info!(
            "Objective value for factor {factor}: {:.4}. Flux summary: {}",
            solution.objective_value,
            solution
                .iter_fluxes()
                .take(FLUX_SUMMARY_LEN)
                .map(|(id, flux)| format!("{id}={flux}"))
                .join(", ")
        );

        Ok(Some(SweepRecord {
            factor,
            result: SweepResult::from_solution(&solution, &self.reporters),
            source: ResultSource::Solver,
            fluxes: solution.into_fluxes(),
        }))
    }

    /// Run FBA at a factor of one on the model as the sweep left it
    pub fn run_native(&mut self) -> Result<Option<SweepRecord>> {
        info!("Running Native solve");
        self.run_factor(1.0)
    }
}
