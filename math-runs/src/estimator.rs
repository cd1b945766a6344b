//! Runs estimation
//!
//! Each run gives `own_rate` experience to the played class and `other_rate`
//! to every other class. With `x[j]` runs played as class `j`, class `i`
//! gains `own_rate * x[i] + other_rate * sum_{j != i} x[j]`, so the runs
//! needed to close every deficit solve `A x = b` with
//!
//! ```text
//! A[i][j] = own_rate   if i == j
//!           other_rate otherwise
//! b[i]    = deficit of class i
//! ```
//!
//! The continuous solution is rounded half away from zero, then classes whose
//! deficit is not positive are forced to zero runs. The clamp happens after
//! solving with the true deficits, so a capped class still shifts the counts
//! of the others.

use crate::config::{RunsConfig, SolverStrategy, check_rate};
use crate::error::{Result, RunsError};
use crate::types::{ClassDeficits, ClassExperience, ClassMap, RunsResult};
use math_runs_solvers::{doolittle_solve, lu_solve, max_residual};
use ndarray::{Array1, Array2};
use std::collections::HashSet;

/// Build the runs system `(A, b)` for `class_names` in the given order
///
/// Every name must have a deficit, and `deficits` must not hold any other
/// class.
pub fn build_system<S: AsRef<str>>(
    class_names: &[S],
    deficits: &ClassDeficits,
    own_rate: f64,
    other_rate: f64,
) -> Result<(Array2<f64>, Array1<f64>)> {
    check_rate("own_rate", own_rate)?;
    check_rate("other_rate", other_rate)?;

    let n = class_names.len();
    if n != deficits.len() {
        return Err(RunsError::InputShape(format!(
            "{} class names but {} deficits",
            n,
            deficits.len()
        )));
    }

    let mut seen = HashSet::with_capacity(n);
    let mut b = Array1::<f64>::zeros(n);
    for (i, name) in class_names.iter().enumerate() {
        let name = name.as_ref();
        if !seen.insert(name) {
            return Err(RunsError::InputShape(format!(
                "class '{}' is listed twice",
                name
            )));
        }
        let deficit = *deficits
            .get(name)
            .ok_or_else(|| RunsError::InputShape(format!("no deficit for class '{}'", name)))?;
        if !deficit.is_finite() {
            return Err(RunsError::InvalidDeficit {
                class: name.to_string(),
                value: deficit,
            });
        }
        b[i] = deficit;
    }

    let a = Array2::from_shape_fn((n, n), |(i, j)| if i == j { own_rate } else { other_rate });

    Ok((a, b))
}

/// Round a continuous run count half away from zero
///
/// Returns `None` when the rounded value does not fit in an `i64`.
pub fn round_runs(x: f64) -> Option<i64> {
    let r = x.round();
    // i64::MIN is exactly representable, i64::MAX rounds up to 2^63
    if r >= i64::MIN as f64 && r < i64::MAX as f64 {
        Some(r as i64)
    } else {
        None
    }
}

/// Estimate the runs needed per class with the Doolittle solver
///
/// Classes listed in `class_names` without a deficit are skipped; a deficit
/// for a class that is not listed is rejected.
pub fn estimate_runs<S: AsRef<str>>(
    class_names: &[S],
    deficits: &ClassDeficits,
    own_rate: f64,
    other_rate: f64,
) -> Result<RunsResult> {
    estimate_with(
        class_names,
        deficits,
        own_rate,
        other_rate,
        SolverStrategy::Doolittle,
        false,
    )
}

/// Deficit of every class: `cap - experience`
///
/// Classes above the cap get a negative deficit; they are clamped to zero
/// runs after solving.
pub fn deficits_from_experience(experience: &ClassExperience, cap: f64) -> ClassDeficits {
    experience
        .iter()
        .map(|(class, xp)| (class, cap - xp))
        .collect()
}

fn estimate_with<S: AsRef<str>>(
    class_names: &[S],
    deficits: &ClassDeficits,
    own_rate: f64,
    other_rate: f64,
    strategy: SolverStrategy,
    clamp_negative: bool,
) -> Result<RunsResult> {
    let listed: HashSet<&str> = class_names.iter().map(|c| c.as_ref()).collect();
    if let Some(unknown) = deficits.names().find(|c| !listed.contains(c)) {
        return Err(RunsError::InputShape(format!(
            "deficit given for unknown class '{}'",
            unknown
        )));
    }

    let present: Vec<&str> = class_names
        .iter()
        .map(|c| c.as_ref())
        .filter(|c| {
            let found = deficits.contains(c);
            if !found {
                log::warn!("No experience data for class '{}', skipping it", c);
            }
            found
        })
        .collect();

    let (a, b) = build_system(&present, deficits, own_rate, other_rate)?;

    let x = match strategy {
        SolverStrategy::Doolittle => doolittle_solve(&a, &b)?,
        SolverStrategy::PartialPivoting => lu_solve(&a, &b)?,
    };

    if log::log_enabled!(log::Level::Debug)
        && let Ok(residual) = max_residual(&a, &x, &b)
    {
        log::debug!(
            "Solved {}x{} runs system ({:?}), residual {:.3e}",
            present.len(),
            present.len(),
            strategy,
            residual
        );
    }

    let mut runs = ClassMap::new();
    for (i, class) in present.iter().enumerate() {
        let count = if b[i] <= 0.0 {
            0
        } else {
            let count = round_runs(x[i]).ok_or_else(|| RunsError::RunsOutOfRange {
                class: class.to_string(),
                value: x[i],
            })?;
            if clamp_negative { count.max(0) } else { count }
        };
        runs.insert(*class, count);
    }

    Ok(RunsResult::from_map(runs))
}

/// Runs estimator bound to a validated [`RunsConfig`]
#[derive(Debug, Clone, Default)]
pub struct RunsEstimator {
    config: RunsConfig,
}

impl RunsEstimator {
    /// Create an estimator after validating `config`
    pub fn new(config: RunsConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self { config })
    }

    /// Configuration in use
    pub fn config(&self) -> &RunsConfig {
        &self.config
    }

    /// Runs needed for the given deficits, in configured class order
    pub fn estimate(&self, deficits: &ClassDeficits) -> Result<RunsResult> {
        estimate_with(
            &self.config.classes,
            deficits,
            self.config.own_class_rate,
            self.config.other_class_rate,
            self.config.strategy,
            self.config.clamp_negative_runs,
        )
    }

    /// Runs needed to bring every class from `experience` to the cap
    pub fn estimate_from_experience(&self, experience: &ClassExperience) -> Result<RunsResult> {
        let deficits = deficits_from_experience(experience, self.config.max_experience);
        self.estimate(&deficits)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{DEFAULT_CLASSES, MAX_CLASS_EXPERIENCE, OTHER_CLASS_RATE, OWN_CLASS_RATE};
    use approx::assert_relative_eq;

    /// Closed form of the runs system:
    /// x_i = (b_i - other * sum(b) / (own + (n - 1) * other)) / (own - other)
    fn closed_form(b: &[f64], own: f64, other: f64) -> Vec<f64> {
        let n = b.len() as f64;
        let sum: f64 = b.iter().sum();
        let shared = other * sum / (own + (n - 1.0) * other);
        b.iter().map(|bi| (bi - shared) / (own - other)).collect()
    }

    fn deficits(values: &[f64]) -> ClassDeficits {
        DEFAULT_CLASSES
            .iter()
            .zip(values.iter())
            .map(|(c, v)| (*c, *v))
            .collect()
    }

    #[test]
    fn test_build_system_layout() {
        let d = deficits(&[5.0, 4.0, 3.0, 2.0, 1.0]);

        let (a, b) = build_system(&DEFAULT_CLASSES, &d, 362_000.0, 89_000.0).unwrap();

        assert_eq!(a.dim(), (5, 5));
        for i in 0..5 {
            for j in 0..5 {
                let expected = if i == j { 362_000.0 } else { 89_000.0 };
                assert_eq!(a[[i, j]], expected);
            }
        }
        assert_eq!(b.to_vec(), vec![5.0, 4.0, 3.0, 2.0, 1.0]);
    }

    #[test]
    fn test_build_system_follows_name_order() {
        let d: ClassDeficits = [("mage", 1.0), ("tank", 2.0)].into_iter().collect();

        let (_, b) = build_system(&["tank", "mage"], &d, 3.0, 1.0).unwrap();

        assert_eq!(b.to_vec(), vec![2.0, 1.0]);
    }

    #[test]
    fn test_build_system_rejects_shape_errors() {
        let d: ClassDeficits = [("mage", 1.0), ("tank", 2.0)].into_iter().collect();

        let err = build_system(&["mage"], &d, 3.0, 1.0).unwrap_err();
        assert!(err.is_input_error());

        let err = build_system(&["mage", "mage"], &d, 3.0, 1.0).unwrap_err();
        assert!(matches!(err, RunsError::InputShape(_)));

        let err = build_system(&["mage", "archer"], &d, 3.0, 1.0).unwrap_err();
        assert!(matches!(err, RunsError::InputShape(_)));
    }

    #[test]
    fn test_build_system_rejects_bad_rates_and_deficits() {
        let d: ClassDeficits = [("mage", 1.0)].into_iter().collect();

        let err = build_system(&["mage"], &d, 0.0, 1.0).unwrap_err();
        assert!(matches!(err, RunsError::InvalidRate { name: "own_rate", .. }));

        let err = build_system(&["mage"], &d, 1.0, f64::NAN).unwrap_err();
        assert!(matches!(err, RunsError::InvalidRate { name: "other_rate", .. }));

        let d: ClassDeficits = [("mage", f64::INFINITY)].into_iter().collect();
        let err = build_system(&["mage"], &d, 1.0, 1.0).unwrap_err();
        assert!(matches!(err, RunsError::InvalidDeficit { .. }));
    }

    #[test]
    fn test_all_classes_from_zero() {
        let d = deficits(&[MAX_CLASS_EXPERIENCE; 5]);

        let result = estimate_runs(&DEFAULT_CLASSES, &d, OWN_CLASS_RATE, OTHER_CLASS_RATE).unwrap();

        for class in DEFAULT_CLASSES {
            assert_eq!(result.get(class), Some(794));
        }
        assert_eq!(result.total(), Some(3970));
    }

    #[test]
    fn test_matches_closed_form() {
        let values = [
            400_000_000.0,
            250_123_456.0,
            569_809_640.0,
            100_000_000.0,
            320_000_000.0,
        ];
        let d = deficits(&values);

        let result = estimate_runs(&DEFAULT_CLASSES, &d, OWN_CLASS_RATE, OTHER_CLASS_RATE).unwrap();
        let expected = closed_form(&values, OWN_CLASS_RATE, OTHER_CLASS_RATE);

        for (i, class) in DEFAULT_CLASSES.iter().enumerate() {
            assert_eq!(result.get(class), Some(expected[i].round() as i64));
        }
    }

    #[test]
    fn test_capped_class_is_zero_and_still_counts() {
        // Tank is 5M over the cap: its negative deficit enters the solve
        let values = [
            MAX_CLASS_EXPERIENCE,
            -5_000_000.0,
            MAX_CLASS_EXPERIENCE,
            MAX_CLASS_EXPERIENCE,
            MAX_CLASS_EXPERIENCE,
        ];
        let d = deficits(&values);

        let result = estimate_runs(&DEFAULT_CLASSES, &d, OWN_CLASS_RATE, OTHER_CLASS_RATE).unwrap();
        let expected = closed_form(&values, OWN_CLASS_RATE, OTHER_CLASS_RATE);

        assert_eq!(result.get("tank"), Some(0));
        assert!(expected[1] < 0.0);
        assert_eq!(result.get("mage"), Some(expected[0].round() as i64));

        // Zeroing the deficit before solving would give a different answer
        let mut zeroed = values;
        zeroed[1] = 0.0;
        let pre_clamped = closed_form(&zeroed, OWN_CLASS_RATE, OTHER_CLASS_RATE);
        assert_ne!(result.get("mage"), Some(pre_clamped[0].round() as i64));
    }

    #[test]
    fn test_zero_deficit_is_zero_runs() {
        let d = deficits(&[0.0, 1e8, 2e8, 3e8, 4e8]);

        let result = estimate_runs(&DEFAULT_CLASSES, &d, OWN_CLASS_RATE, OTHER_CLASS_RATE).unwrap();

        assert_eq!(result.get("mage"), Some(0));
    }

    #[test]
    fn test_stray_negative_is_kept_but_not_totalled() {
        let values = [1_000_000.0, 5e8, 5e8, 5e8, 5e8];
        let d = deficits(&values);

        let result = estimate_runs(&DEFAULT_CLASSES, &d, OWN_CLASS_RATE, OTHER_CLASS_RATE).unwrap();

        let mage = result.get("mage").unwrap();
        assert!(mage < 0);
        let others: i64 = result.iter().skip(1).map(|(_, r)| r).sum();
        assert_eq!(result.total(), Some(others));
    }

    #[test]
    fn test_clamp_negative_option() {
        let config = RunsConfig {
            clamp_negative_runs: true,
            ..Default::default()
        };
        let estimator = RunsEstimator::new(config).unwrap();
        let d = deficits(&[1_000_000.0, 5e8, 5e8, 5e8, 5e8]);

        let result = estimator.estimate(&d).unwrap();

        assert_eq!(result.get("mage"), Some(0));
        assert!(result.iter().all(|(_, r)| r >= 0));
    }

    #[test]
    fn test_permutation_permutes_result() {
        let names = ["mage", "tank", "healer"];
        let d: ClassDeficits = [("mage", 3e6), ("tank", 1e6), ("healer", 7e6)]
            .into_iter()
            .collect();
        let permuted_names = ["healer", "mage", "tank"];
        let permuted: ClassDeficits = [("healer", 7e6), ("mage", 3e6), ("tank", 1e6)]
            .into_iter()
            .collect();

        let a = estimate_runs(&names, &d, 10_000.0, 2_000.0).unwrap();
        let b = estimate_runs(&permuted_names, &permuted, 10_000.0, 2_000.0).unwrap();

        for class in names {
            assert_eq!(a.get(class), b.get(class));
        }
        let order: Vec<&str> = b.iter().map(|(c, _)| c).collect();
        assert_eq!(order, permuted_names);
    }

    #[test]
    fn test_rounding_half_away_from_zero() {
        assert_eq!(round_runs(2.5), Some(3));
        assert_eq!(round_runs(-2.5), Some(-3));
        assert_eq!(round_runs(2.4999), Some(2));

        // 2 * x = 5 lands exactly on 2.5
        let d: ClassDeficits = [("mage", 5.0)].into_iter().collect();
        let result = estimate_runs(&["mage"], &d, 2.0, 1.0).unwrap();
        assert_eq!(result.get("mage"), Some(3));

        // Two classes, exact in binary: x = [2.5, -1]
        let d: ClassDeficits = [("mage", 8.0), ("tank", 1.0)].into_iter().collect();
        let result = estimate_runs(&["mage", "tank"], &d, 4.0, 2.0).unwrap();
        assert_eq!(result.get("mage"), Some(3));
        assert_eq!(result.get("tank"), Some(-1));
    }

    #[test]
    fn test_round_runs_rejects_values_outside_i64() {
        assert_eq!(round_runs(1e300), None);
        assert_eq!(round_runs(-1e300), None);
        assert_eq!(round_runs(f64::NAN), None);
        assert_eq!(round_runs(9.3e18), None);
        assert_eq!(round_runs(-9_223_372_036_854_775_808.0), Some(i64::MIN));
        assert_eq!(round_runs(9.2e18), Some(9_200_000_000_000_000_000));
    }

    #[test]
    fn test_huge_deficits_are_reported_not_saturated() {
        let d: ClassDeficits = [("mage", 1e300), ("tank", 1e300)].into_iter().collect();

        let err = estimate_runs(&["mage", "tank"], &d, 2.0, 1.0).unwrap_err();

        assert!(matches!(err, RunsError::RunsOutOfRange { ref class, .. } if class == "mage"));
        assert!(err.is_input_error());
    }

    #[test]
    fn test_huge_value_for_capped_class_is_still_zero() {
        // Both classes solve to about -3.3e299 but are clamped before rounding
        let d: ClassDeficits = [("mage", -1e300), ("tank", -1e300)].into_iter().collect();

        let result = estimate_runs(&["mage", "tank"], &d, 2.0, 1.0).unwrap();

        assert_eq!(result.get("mage"), Some(0));
        assert_eq!(result.get("tank"), Some(0));
        assert_eq!(result.total(), Some(0));
    }

    #[test]
    fn test_missing_class_is_skipped() {
        let d: ClassDeficits = [("mage", MAX_CLASS_EXPERIENCE), ("archer", 1e8)]
            .into_iter()
            .collect();

        let result = estimate_runs(&DEFAULT_CLASSES, &d, OWN_CLASS_RATE, OTHER_CLASS_RATE).unwrap();

        assert_eq!(result.len(), 2);
        assert!(result.get("tank").is_none());
        let order: Vec<&str> = result.iter().map(|(c, _)| c).collect();
        assert_eq!(order, vec!["mage", "archer"]);
    }

    #[test]
    fn test_unknown_class_in_deficits_is_rejected() {
        let d: ClassDeficits = [("mage", 1.0), ("necromancer", 1.0)].into_iter().collect();

        let err =
            estimate_runs(&DEFAULT_CLASSES, &d, OWN_CLASS_RATE, OTHER_CLASS_RATE).unwrap_err();

        assert!(err.is_input_error());
    }

    #[test]
    fn test_no_data_gives_empty_result() {
        let result = estimate_runs(
            &DEFAULT_CLASSES,
            &ClassDeficits::new(),
            OWN_CLASS_RATE,
            OTHER_CLASS_RATE,
        )
        .unwrap();

        assert!(result.is_empty());
        assert_eq!(result.total(), Some(0));
    }

    #[test]
    fn test_equal_rates_are_singular() {
        let d: ClassDeficits = [("mage", 1.0), ("tank", 2.0)].into_iter().collect();

        let err = estimate_runs(&["mage", "tank"], &d, 5.0, 5.0).unwrap_err();
        assert!(err.is_singular());

        let config = RunsConfig {
            own_class_rate: 5.0,
            other_class_rate: 5.0,
            classes: vec!["mage".into(), "tank".into()],
            strategy: SolverStrategy::PartialPivoting,
            ..Default::default()
        };
        let err = RunsEstimator::new(config).unwrap().estimate(&d).unwrap_err();
        assert!(err.is_singular());
    }

    #[test]
    fn test_strategies_agree() {
        let experience: ClassExperience = [
            ("mage", 120_000_000.0),
            ("tank", 33_000_000.0),
            ("healer", 569_809_640.0),
            ("berserker", 0.0),
            ("archer", 410_000_000.0),
        ]
        .into_iter()
        .collect();

        let doolittle = RunsEstimator::default()
            .estimate_from_experience(&experience)
            .unwrap();
        let pivoting = RunsEstimator::new(RunsConfig {
            strategy: SolverStrategy::PartialPivoting,
            ..Default::default()
        })
        .unwrap()
        .estimate_from_experience(&experience)
        .unwrap();

        assert_eq!(doolittle, pivoting);
        assert_eq!(doolittle.get("healer"), Some(0));
    }

    #[test]
    fn test_deficits_from_experience() {
        let experience: ClassExperience = [("mage", 69_809_640.0), ("tank", 600_000_000.0)]
            .into_iter()
            .collect();

        let d = deficits_from_experience(&experience, MAX_CLASS_EXPERIENCE);

        assert_relative_eq!(*d.get("mage").unwrap(), 500_000_000.0);
        assert!(*d.get("tank").unwrap() < 0.0);
    }

    #[test]
    fn test_estimator_rejects_invalid_config() {
        let config = RunsConfig {
            own_class_rate: -1.0,
            ..Default::default()
        };
        assert!(RunsEstimator::new(config).is_err());
    }
}
