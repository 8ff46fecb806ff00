//! Ranking of the largest changes between the highest swept factor and the Native run.
use super::{FactorLabel, SweepResults};
use itertools::Itertools;
use std::fmt;

/// The difference in a quantity between two records
#[derive(Debug, Clone, PartialEq)]
pub struct FluxChange {
    /// Name of the quantity or reaction
    pub name: String,
    /// Value for the compared record minus value for Native
    pub delta: f64,
}

/// The outcome of comparing the highest swept factor against Native
#[derive(Debug, Clone, PartialEq)]
pub enum FluxChangeSummary {
    /// The sweep produced no records
    NoValidSolutions,
    /// There is no Native record to compare against
    InsufficientData,
    /// The largest changes, in descending order of magnitude
    Changes {
        /// Label of the record compared against Native
        compared: FactorLabel,
        /// Changes in the summary quantities
        fields: Vec<FluxChange>,
        /// Changes in individual reaction fluxes
        reactions: Vec<FluxChange>,
    },
}

impl fmt::Display for FluxChangeSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let format_changes = |changes: &[FluxChange]| {
            if changes.is_empty() {
                return "none".to_string();
            }
            changes
                .iter()
                .map(|change| format!("{}: {:+.4}", change.name, change.delta))
                .join(", ")
        };

        match self {
            Self::NoValidSolutions => write!(f, "No valid solutions"),
            Self::InsufficientData => write!(f, "Insufficient data for flux changes"),
            Self::Changes {
                compared,
                fields,
                reactions,
            } => write!(
                f,
                "{compared} vs Native: {}; reactions: {}",
                format_changes(fields),
                format_changes(reactions)
            ),
        }
    }
}

/// Keep changes whose magnitude exceeds `threshold`, returning the `top_n` largest.
///
/// Changes of equal magnitude keep their input order.
pub fn rank_changes<I, S>(changes: I, threshold: f64, top_n: usize) -> Vec<FluxChange>
where
    I: IntoIterator<Item = (S, f64)>,
    S: Into<String>,
{
    let mut changes: Vec<_> = changes
        .into_iter()
        .filter(|(_, delta)| delta.abs() > threshold)
        .map(|(name, delta)| FluxChange {
            name: name.into(),
            delta,
        })
        .collect();
    changes.sort_by(|a, b| b.delta.abs().total_cmp(&a.delta.abs()));
    changes.truncate(top_n);
    changes
}

/// Compare the record with the highest factor against the Native record
pub fn summarise_flux_changes(
    results: &SweepResults,
    threshold: f64,
    top_n: usize,
) -> FluxChangeSummary {
    let Some((compared, record)) = results.highest_factor() else {
        return FluxChangeSummary::NoValidSolutions;
    };
    let Some(native) = results.native() else {
        return FluxChangeSummary::InsufficientData;
    };

    let fields = rank_changes(
        record
            .result
            .iter_fields()
            .zip(native.result.iter_fields())
            .map(|((name, value), (_, native_value))| (name, value - native_value)),
        threshold,
        top_n,
    );
    let reactions = rank_changes(
        record.fluxes.iter().map(|(id, flux)| {
            let native_flux = native.fluxes.get(id).copied().unwrap_or(0.0);
            (id.to_string(), flux - native_flux)
        }),
        threshold,
        top_n,
    );

    FluxChangeSummary::Changes {
        compared: compared.clone(),
        fields,
        reactions,
    }
}
