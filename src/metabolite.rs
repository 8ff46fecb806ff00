//! Metabolites are the species whose mass balance constrains the flux solution.
use crate::id::define_id_type;

define_id_type! {MetaboliteID}

/// A metabolite in the model
#[derive(PartialEq, Debug, Clone)]
pub struct Metabolite {
    /// Unique identifier for the metabolite (e.g. "atp_c")
    pub id: MetaboliteID,
    /// Short name of the compartment the metabolite is in (e.g. "c", "e")
    pub compartment: Option<String>,
}
