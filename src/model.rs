//! The metabolic model: reactions, metabolites and the current objective.
use crate::id::IDCollection;
use crate::metabolite::{Metabolite, MetaboliteID};
use crate::reaction::{Reaction, ReactionID};
use anyhow::{Context, Result, ensure};
use indexmap::IndexMap;

/// The objective function: a weighted sum of reaction fluxes to maximise
pub type Objective = IndexMap<ReactionID, f64>;

/// A genome-scale metabolic model
#[derive(PartialEq, Debug, Clone)]
pub struct Model {
    /// Identifier for the model (e.g. "e_coli_core")
    pub id: String,
    /// Reactions, in the order they were defined
    pub reactions: IndexMap<ReactionID, Reaction>,
    /// Metabolites, in the order they were defined
    pub metabolites: IndexMap<MetaboliteID, Metabolite>,
    /// The current objective
    objective: Objective,
}

/// The flux bounds of every reaction at a given point in time
#[derive(PartialEq, Debug, Clone)]
pub struct BoundsSnapshot(IndexMap<ReactionID, (f64, f64)>);

impl BoundsSnapshot {
    /// Get the `(lower, upper)` bounds recorded for a reaction
    pub fn get(&self, id: &ReactionID) -> Option<(f64, f64)> {
        self.0.get(id).copied()
    }
}

impl Model {
    /// Create a new model.
    ///
    /// The objective is taken from the reactions' objective coefficients.
    pub fn new(
        id: String,
        reactions: IndexMap<ReactionID, Reaction>,
        metabolites: IndexMap<MetaboliteID, Metabolite>,
    ) -> Self {
        let objective = reactions
            .values()
            .filter(|reaction| reaction.objective_coefficient != 0.0)
            .map(|reaction| (reaction.id.clone(), reaction.objective_coefficient))
            .collect();

        Self {
            id,
            reactions,
            metabolites,
            objective,
        }
    }

    /// Iterate over the IDs of all reactions
    pub fn iter_reaction_ids(&self) -> impl Iterator<Item = &ReactionID> {
        self.reactions.keys()
    }

    /// Get a reaction by its string ID
    pub fn get_reaction_mut(&mut self, id: &str) -> Result<&mut Reaction> {
        let id = self.reactions.get_id_by_str(id)?;
        Ok(&mut self.reactions[&id])
    }

    /// The current objective
    pub fn objective(&self) -> &Objective {
        &self.objective
    }

    /// Replace the objective with the given weighted sum of reaction fluxes
    pub fn set_objective(&mut self, objective: Objective) -> Result<()> {
        ensure!(!objective.is_empty(), "Objective cannot be empty");
        for (id, weight) in &objective {
            ensure!(
                self.reactions.contains_key(id),
                "Objective reaction {id} is not in the model"
            );
            ensure!(
                weight.is_finite(),
                "Objective weight for {id} must be a finite number"
            );
        }

        for reaction in self.reactions.values_mut() {
            reaction.objective_coefficient = objective.get(&reaction.id).copied().unwrap_or(0.0);
        }
        self.objective = objective;

        Ok(())
    }

    /// Record the current flux bounds of every reaction
    pub fn snapshot_bounds(&self) -> BoundsSnapshot {
        BoundsSnapshot(
            self.reactions
                .iter()
                .map(|(id, reaction)| (id.clone(), (reaction.lower_bound, reaction.upper_bound)))
                .collect(),
        )
    }

    /// Restore flux bounds from a snapshot.
    ///
    /// Reactions not present in the snapshot are left unchanged.
    pub fn restore_bounds(&mut self, snapshot: &BoundsSnapshot) {
        for (id, reaction) in &mut self.reactions {
            if let Some((lower, upper)) = snapshot.get(id) {
                reaction.lower_bound = lower;
                reaction.upper_bound = upper;
            }
        }
    }

    /// Check that the model is internally consistent
    pub fn validate(&self) -> Result<()> {
        ensure!(!self.reactions.is_empty(), "Model has no reactions");

        for reaction in self.reactions.values() {
            crate::reaction::check_bounds(&reaction.id, reaction.lower_bound, reaction.upper_bound)?;
            for (metabolite_id, coeff) in &reaction.metabolites {
                ensure!(
                    self.metabolites.contains_key(metabolite_id),
                    "Reaction {} refers to unknown metabolite {metabolite_id}",
                    reaction.id
                );
                ensure!(
                    coeff.is_finite(),
                    "Reaction {} has a non-finite coefficient for {metabolite_id}",
                    reaction.id
                );
            }
        }

        Ok(())
    }

    /// Check that the model has the given reaction, returning its ID
    pub fn require_reaction(&self, id: &str) -> Result<ReactionID> {
        self.reactions
            .get_id_by_str(id)
            .with_context(|| format!("Reaction {id} not found in model {}", self.id))
    }
}
