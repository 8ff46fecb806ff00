//! Handling of sweep results where ATP production or growth rate is exactly zero.
use super::{ResultSource, SweepResult, SweepResults};
use crate::experiment::ZeroResultPolicy;
use log::warn;

/// Apply the zero result policy to every record.
///
/// Under [`ZeroResultPolicy::Flag`] the solver's values are kept and the record is marked as having
/// insufficient data. Under [`ZeroResultPolicy::Estimate`] the values are replaced by `estimate`
/// scaled by the record's factor.
pub fn apply_zero_result_policy(
    results: &mut SweepResults,
    policy: ZeroResultPolicy,
    estimate: &SweepResult,
) {
    for (label, record) in results {
        if !record.result.has_zero_output() {
            continue;
        }

        match policy {
            ZeroResultPolicy::Flag => {
                warn!("{label} has zero ATP production or growth rate; marking as insufficient data");
                record.source = ResultSource::InsufficientData;
            }
            ZeroResultPolicy::Estimate => {
                warn!("{label} has zero ATP production or growth rate; using estimated values");
                record.result = estimate.scaled(record.factor);
                record.source = ResultSource::Estimate;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixture::sweep_result;
    use crate::sweep::{FactorLabel, SweepRecord};
    use indexmap::IndexMap;
    use rstest::{fixture, rstest};

    fn record(factor: f64, result: SweepResult) -> SweepRecord {
        SweepRecord {
            factor,
            result,
            source: ResultSource::Solver,
            fluxes: IndexMap::new(),
        }
    }

    fn estimate() -> SweepResult {
        SweepResult {
            atp_production: 8.39,
            o2_consumption: 5.0,
            nadh_turnover: 10.0,
            growth_rate: 1.00083,
        }
    }

    /// Native and Factor_2.0 have zero outputs; Factor_1.0 does not
    #[fixture]
    fn results(sweep_result: SweepResult) -> SweepResults {
        let zero_growth = SweepResult {
            growth_rate: 0.0,
            ..sweep_result
        };
        let zero_atp = SweepResult {
            atp_production: 0.0,
            ..sweep_result
        };

        let mut results = SweepResults::default();
        results.insert(record(1.0, sweep_result));
        results.insert(record(2.0, zero_atp));
        results.insert_native(record(1.0, zero_growth));
        results
    }

    #[rstest]
    fn test_flag(mut results: SweepResults, sweep_result: SweepResult) {
        let before = results.clone();
        apply_zero_result_policy(&mut results, ZeroResultPolicy::Flag, &estimate());

        let sources: Vec<_> = results.iter().map(|(_, record)| record.source).collect();
        assert_eq!(
            sources,
            [
                ResultSource::InsufficientData,
                ResultSource::Solver,
                ResultSource::InsufficientData
            ]
        );

        // Values are untouched
        for ((_, a), (_, b)) in results.iter().zip(before.iter()) {
            assert_eq!(a.result, b.result);
        }
        assert_eq!(
            results
                .get(&FactorLabel::for_factor(1.0))
                .unwrap()
                .result,
            sweep_result
        );
    }

    #[rstest]
    fn test_estimate(mut results: SweepResults, sweep_result: SweepResult) {
        apply_zero_result_policy(&mut results, ZeroResultPolicy::Estimate, &estimate());

        let native = results.native().unwrap();
        assert_eq!(native.source, ResultSource::Estimate);
        assert_eq!(native.result, estimate());

        let factor2 = results.get(&FactorLabel::for_factor(2.0)).unwrap();
        assert_eq!(factor2.source, ResultSource::Estimate);
        assert_eq!(factor2.result, estimate().scaled(2.0));

        let factor1 = results.get(&FactorLabel::for_factor(1.0)).unwrap();
        assert_eq!(factor1.source, ResultSource::Solver);
        assert_eq!(factor1.result, sweep_result);
    }
}
