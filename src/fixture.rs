//! Fixtures for tests
use crate::experiment::{ExperimentParameters, ReporterReactions};
use crate::metabolite::{Metabolite, MetaboliteID};
use crate::model::Model;
use crate::reaction::{Reaction, ReactionID};
use crate::sweep::SweepResult;
use indexmap::{IndexMap, indexmap};
use rstest::fixture;

/// Assert that an error with the given message occurs
macro_rules! assert_error {
    ($result:expr, $msg:expr) => {
        assert_eq!(
            $result.unwrap_err().chain().next().unwrap().to_string(),
            $msg
        );
    };
}
pub(crate) use assert_error;

/// Build a reaction with the given stoichiometry and bounds
pub fn build_reaction(
    id: &str,
    metabolites: &[(&str, f64)],
    lower_bound: f64,
    upper_bound: f64,
) -> Reaction {
    Reaction {
        id: id.into(),
        metabolites: metabolites
            .iter()
            .map(|(met, coeff)| (MetaboliteID::new(met), *coeff))
            .collect(),
        lower_bound,
        upper_bound,
        objective_coefficient: 0.0,
    }
}

#[fixture]
pub fn reaction() -> Reaction {
    build_reaction("R1", &[("a_c", -1.0), ("b_c", 1.0)], 0.0, 1000.0)
}

/// A six-reaction network with a conserved ATP/ADP pool.
///
/// Substrate S is taken up (`EX_S`, at most 10) and transported (`UPTAKE`, at most 4). Each unit
/// of S either feeds growth (consuming one ATP) or respiration (producing one ATP and one unit of
/// P, which is secreted by `EX_P`). `MAINT` hydrolyses between 1 and 2 ATP.
///
/// Maximising `0.5 GROWTH + 0.5 MAINT` gives `2 GROWTH + MAINT = uptake` with MAINT at its upper
/// bound, so an uptake of 4 gives GROWTH = 1, MAINT = 2 and RESP = 3.
#[fixture]
pub fn toy_model() -> Model {
    let mut reactions = vec![
        build_reaction("EX_S", &[("S_e", -1.0)], -10.0, 1000.0),
        build_reaction("UPTAKE", &[("S_e", -1.0), ("S_c", 1.0)], 0.0, 4.0),
        build_reaction(
            "GROWTH",
            &[("S_c", -1.0), ("atp_c", -1.0), ("adp_c", 1.0)],
            0.0,
            1000.0,
        ),
        build_reaction(
            "RESP",
            &[("S_c", -1.0), ("adp_c", -1.0), ("atp_c", 1.0), ("P_c", 1.0)],
            0.0,
            1000.0,
        ),
        build_reaction("MAINT", &[("atp_c", -1.0), ("adp_c", 1.0)], 1.0, 2.0),
        build_reaction("EX_P", &[("P_c", -1.0)], 0.0, 1000.0),
    ];
    reactions[2].objective_coefficient = 1.0;

    let metabolites = ["S_e", "S_c", "atp_c", "adp_c", "P_c"]
        .into_iter()
        .map(|id| {
            let metabolite = Metabolite {
                id: id.into(),
                compartment: id.split('_').next_back().map(str::to_string),
            };
            (metabolite.id.clone(), metabolite)
        })
        .collect();

    Model::new(
        "toy".into(),
        reactions
            .into_iter()
            .map(|reaction| (reaction.id.clone(), reaction))
            .collect::<IndexMap<ReactionID, Reaction>>(),
        metabolites,
    )
}

/// Experiment parameters matching [`toy_model`]
#[fixture]
pub fn toy_experiment() -> ExperimentParameters {
    ExperimentParameters {
        factors: vec![1.0, 2.0, 3.0],
        bound_overrides: indexmap! {"UPTAKE".into() => 1.0, "MISSING".into() => 1.0},
        objective: indexmap! {"GROWTH".into() => 0.5, "MAINT".into() => 0.5},
        reporters: ReporterReactions {
            atp_production: "MAINT".into(),
            o2_exchange: "EX_S".into(),
            nadh_turnover: "RESP".into(),
            growth: "GROWTH".into(),
        },
        ..ExperimentParameters::default()
    }
}

#[fixture]
pub fn sweep_result() -> SweepResult {
    SweepResult {
        atp_production: 2.0,
        o2_consumption: 4.0,
        nadh_turnover: 3.0,
        growth_rate: 1.0,
    }
}
