//! Runs needed to bring every dungeon class to the experience cap
//!
//! Each run awards a large amount of experience to the class that was played
//! and a smaller amount to every other class. Finding how many runs to play
//! with each class so that all of them reach the cap is a small dense linear
//! system, solved with [`math_runs_solvers`].
//!
//! - [`estimate_runs`] / [`RunsEstimator`]: build, solve, round and clamp
//! - [`RunsConfig`]: cap, rates and class order, loadable from JSON
//! - [`profile`]: class experience from a downloaded player profile
//!
//! # Example
//!
//! ```
//! use math_runs::{ClassDeficits, DEFAULT_CLASSES, estimate_runs};
//!
//! let deficits: ClassDeficits = DEFAULT_CLASSES
//!     .iter()
//!     .map(|class| (*class, 569_809_640.0))
//!     .collect();
//!
//! let runs = estimate_runs(&DEFAULT_CLASSES, &deficits, 362_000.0, 89_000.0).unwrap();
//! assert_eq!(runs.get("mage"), Some(794));
//! assert_eq!(runs.total(), Some(3970));
//! ```

mod config;
mod error;
mod estimator;
pub mod profile;
mod types;

pub use config::{
    DEFAULT_CLASSES, MAX_CLASS_EXPERIENCE, OTHER_CLASS_RATE, OWN_CLASS_RATE, RunsConfig,
    SolverStrategy,
};
pub use error::{Result, RunsError};
pub use estimator::{
    RunsEstimator, build_system, deficits_from_experience, estimate_runs, round_runs,
};
pub use profile::{extract_class_experience, parse_profile, resolve_class};
pub use types::{ClassDeficits, ClassExperience, ClassMap, RunsResult};

/// Library version
pub fn version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
