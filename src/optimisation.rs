//! Code for performing flux balance analysis (FBA).
//!
//! FBA finds the flux distribution `v` which maximises the objective `c·v` subject to the
//! steady-state constraint `S·v = 0` and each reaction's flux bounds.
use crate::metabolite::MetaboliteID;
use crate::model::Model;
use crate::reaction::ReactionID;
use anyhow::{Result, anyhow};
use highs::{HighsModelStatus, RowProblem as Problem, Sense};
use indexmap::IndexMap;
use log::LevelFilter;
use std::fmt;

/// A decision variable in the optimisation
type Variable = highs::Col;

/// The outcome of an FBA solve, as reported by the solver
#[derive(Debug, Clone, PartialEq)]
pub enum FbaStatus {
    /// An optimal solution was found
    Optimal,
    /// The constraints cannot be satisfied
    Infeasible,
    /// The objective can be increased without limit
    Unbounded,
    /// Any other status
    Other(String),
}

impl From<HighsModelStatus> for FbaStatus {
    fn from(status: HighsModelStatus) -> Self {
        match status {
            HighsModelStatus::Optimal => Self::Optimal,
            HighsModelStatus::Infeasible => Self::Infeasible,
            HighsModelStatus::Unbounded => Self::Unbounded,
            status => Self::Other(format!("{status:?}").to_lowercase()),
        }
    }
}

impl fmt::Display for FbaStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Optimal => write!(f, "optimal"),
            Self::Infeasible => write!(f, "infeasible"),
            Self::Unbounded => write!(f, "unbounded"),
            Self::Other(status) => write!(f, "{status}"),
        }
    }
}

/// The solution to an FBA problem
#[derive(Debug, Clone, PartialEq)]
pub struct FbaSolution {
    /// The solver status
    pub status: FbaStatus,
    /// Value of the objective function. Zero unless the solve was optimal.
    pub objective_value: f64,
    /// Flux through each reaction, in model order. Empty unless the solve was optimal.
    fluxes: IndexMap<ReactionID, f64>,
}

impl FbaSolution {
    /// Whether an optimal solution was found
    pub fn is_optimal(&self) -> bool {
        self.status == FbaStatus::Optimal
    }

    /// Get the flux through a reaction, if it is present in the solution
    pub fn flux(&self, id: &str) -> Option<f64> {
        self.fluxes.get(id).copied()
    }

    /// Iterate over reaction fluxes in model order
    pub fn iter_fluxes(&self) -> impl Iterator<Item = (&ReactionID, f64)> {
        self.fluxes.iter().map(|(id, flux)| (id, *flux))
    }

    /// Consume the solution, returning the flux vector
    pub fn into_fluxes(self) -> IndexMap<ReactionID, f64> {
        self.fluxes
    }
}

/// Perform flux balance analysis on the model, maximising its current objective.
///
/// A non-optimal status is not an error: it is returned as part of the solution so that the caller
/// can decide what to do. Errors reported by the solver itself are returned as errors.
///
/// # Arguments
///
/// * `model` - The model, with its bounds and objective already set
///
/// # Returns
///
/// The solver status and, for optimal solves, the objective value and fluxes.
pub fn perform_fba(model: &Model) -> Result<FbaSolution> {
    // Set up problem
    let mut problem = Problem::default();
    let variables = add_variables(&mut problem, model);

    // Add constraints
    add_mass_balance_constraints(&mut problem, model, &variables);

    // Solve problem
    let mut highs_model = problem.optimise(Sense::Maximise);
    configure_highs_logging(&mut highs_model);
    let solved = highs_model
        .try_solve()
        .map_err(|status| anyhow!("Could not solve: {status:?}"))?;

    let status = FbaStatus::from(solved.status());
    if status != FbaStatus::Optimal {
        return Ok(FbaSolution {
            status,
            objective_value: 0.0,
            fluxes: IndexMap::new(),
        });
    }

    let solution = solved.get_solution();
    let fluxes = variables
        .keys()
        .cloned()
        .zip(solution.columns().iter().copied())
        .collect();

    Ok(FbaSolution {
        status,
        objective_value: solved.objective_value(),
        fluxes,
    })
}

/// Only show HiGHS console output when debug logging is enabled
fn configure_highs_logging(model: &mut highs::Model) {
    let verbose = log::max_level() >= LevelFilter::Debug;
    model.set_option("output_flag", verbose);
    model.set_option("log_to_console", verbose);
}

/// Add one variable per reaction, bounded by the reaction's flux bounds
fn add_variables(problem: &mut Problem, model: &Model) -> IndexMap<ReactionID, Variable> {
    model
        .reactions
        .values()
        .map(|reaction| {
            let coeff = model.objective().get(&reaction.id).copied().unwrap_or(0.0);
            let var = problem.add_column(coeff, reaction.lower_bound..=reaction.upper_bound);
            (reaction.id.clone(), var)
        })
        .collect()
}

/// Add the steady-state constraint `S·v = 0`, one row per metabolite
fn add_mass_balance_constraints(
    problem: &mut Problem,
    model: &Model,
    variables: &IndexMap<ReactionID, Variable>,
) {
    let mut terms: IndexMap<&MetaboliteID, Vec<(Variable, f64)>> = model
        .metabolites
        .keys()
        .map(|id| (id, Vec::new()))
        .collect();
    for (reaction, var) in model.reactions.values().zip(variables.values()) {
        for (metabolite_id, coeff) in &reaction.metabolites {
            if let Some(row) = terms.get_mut(metabolite_id) {
                row.push((*var, *coeff));
            }
        }
    }

    for row in terms.into_values().filter(|row| !row.is_empty()) {
        problem.add_row(0.0..=0.0, row);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixture::toy_model;
    use float_cmp::assert_approx_eq;
    use indexmap::indexmap;
    use rstest::rstest;

    fn set_blended_objective(model: &mut Model) {
        model
            .set_objective(indexmap! {
                ReactionID::new("GROWTH") => 0.5,
                ReactionID::new("MAINT") => 0.5,
            })
            .unwrap();
    }

    #[rstest]
    fn test_perform_fba(mut toy_model: Model) {
        set_blended_objective(&mut toy_model);
        let solution = perform_fba(&toy_model).unwrap();
        assert!(solution.is_optimal());
        assert_approx_eq!(f64, solution.objective_value, 1.5, epsilon = 1e-6);
        assert_approx_eq!(f64, solution.flux("GROWTH").unwrap(), 1.0, epsilon = 1e-6);
        assert_approx_eq!(f64, solution.flux("MAINT").unwrap(), 2.0, epsilon = 1e-6);
        assert_approx_eq!(f64, solution.flux("RESP").unwrap(), 3.0, epsilon = 1e-6);
        assert_approx_eq!(f64, solution.flux("EX_S").unwrap(), -4.0, epsilon = 1e-6);
        assert_approx_eq!(f64, solution.flux("EX_P").unwrap(), 3.0, epsilon = 1e-6);
        assert!(solution.flux("MISSING").is_none());

        let ids: Vec<_> = solution.iter_fluxes().map(|(id, _)| id.to_string()).collect();
        assert_eq!(ids, ["EX_S", "UPTAKE", "GROWTH", "RESP", "MAINT", "EX_P"]);
    }

    #[rstest]
    fn test_perform_fba_single_objective(toy_model: Model) {
        // Growth only: maintenance sits at its lower bound
        let solution = perform_fba(&toy_model).unwrap();
        assert!(solution.is_optimal());
        assert_approx_eq!(f64, solution.objective_value, 1.5, epsilon = 1e-6);
        assert_approx_eq!(f64, solution.flux("GROWTH").unwrap(), 1.5, epsilon = 1e-6);
        assert_approx_eq!(f64, solution.flux("MAINT").unwrap(), 1.0, epsilon = 1e-6);
    }

    #[rstest]
    fn test_perform_fba_infeasible(mut toy_model: Model) {
        // Not enough substrate to cover maintenance
        toy_model
            .get_reaction_mut("UPTAKE")
            .unwrap()
            .set_bounds(0.0, 0.5)
            .unwrap();
        let solution = perform_fba(&toy_model).unwrap();
        assert!(!solution.is_optimal());
        assert_eq!(solution.iter_fluxes().count(), 0);
    }

    #[test]
    fn test_status_display() {
        assert_eq!(FbaStatus::Optimal.to_string(), "optimal");
        assert_eq!(FbaStatus::Infeasible.to_string(), "infeasible");
        assert_eq!(
            FbaStatus::from(HighsModelStatus::ModelEmpty).to_string(),
            "modelempty"
        );
    }
}
