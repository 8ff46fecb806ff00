//! Reactions are the decision variables of flux balance analysis.
use crate::id::define_id_type;
use crate::metabolite::MetaboliteID;
use anyhow::{Result, ensure};
use indexmap::IndexMap;

define_id_type! {ReactionID}

/// A reaction in the metabolic model
#[derive(PartialEq, Debug, Clone)]
pub struct Reaction {
    /// Unique identifier for the reaction (e.g. "PGI")
    pub id: ReactionID,
    /// Stoichiometric coefficients: negative for substrates, positive for products
    pub metabolites: IndexMap<MetaboliteID, f64>,
    /// The minimum allowed flux
    pub lower_bound: f64,
    /// The maximum allowed flux
    pub upper_bound: f64,
    /// Coefficient of this reaction in the objective the model was distributed with
    pub objective_coefficient: f64,
}

/// Check that a pair of flux bounds is valid
pub fn check_bounds(id: &ReactionID, lower_bound: f64, upper_bound: f64) -> Result<()> {
    ensure!(
        !lower_bound.is_nan() && !upper_bound.is_nan(),
        "Bounds for reaction {id} cannot be NaN"
    );
    ensure!(
        lower_bound <= upper_bound,
        "Reaction {id} has lower bound {lower_bound} greater than upper bound {upper_bound}"
    );

    Ok(())
}

impl Reaction {
    /// Set both flux bounds, checking that the result is valid
    pub fn set_bounds(&mut self, lower_bound: f64, upper_bound: f64) -> Result<()> {
        check_bounds(&self.id, lower_bound, upper_bound)?;
        self.lower_bound = lower_bound;
        self.upper_bound = upper_bound;

        Ok(())
    }

    /// Multiply the upper bound by `multiplier`.
    ///
    /// # Returns
    ///
    /// The upper bound before the change, or an error if the new bound would be below the lower
    /// bound.
    pub fn scale_upper_bound(&mut self, multiplier: f64) -> Result<f64> {
        let old = self.upper_bound;
        self.set_bounds(self.lower_bound, old * multiplier)?;

        Ok(old)
    }
}
