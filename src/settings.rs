//! Analysis configuration.
//!
//! Settings are plain values that can be built in code or loaded from TOML:
//!
//! ```toml
//! cancellativity = "weak_cancellativity"
//! max_path_length = 12
//! parallel = true
//!
//! [early_termination]
//! on_cancellativity_failure = true
//! ```

use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use thiserror::Error;

/// Which cancellativity conditions the analysis checks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CancellativityMode {
    /// No check; sign conflicts silently make a class zero.
    #[default]
    None,
    /// Per-vertex necessary conditions: sign conflicts and right cancellation.
    WeakCancellativity,
    /// The weak conditions plus left cancellation (via the opposite QP).
    Cancellativity,
}

impl CancellativityMode {
    /// Checks whether any failure is recorded in this mode.
    #[inline]
    pub fn checks(self) -> bool {
        self != CancellativityMode::None
    }
}

/// Conditions under which the analysis stops before visiting every vertex.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct EarlyTerminationCondition {
    /// Stop once a cancellativity failure is found.
    pub on_cancellativity_failure: bool,
    /// Stop once a vertex exceeds the maximal path length.
    pub on_non_admissibility: bool,
    /// Stop once a vertex has more than one maximal class.
    pub on_non_self_injectivity: bool,
}

impl EarlyTerminationCondition {
    /// Never stop early.
    pub const NONE: Self = Self {
        on_cancellativity_failure: false,
        on_non_admissibility: false,
        on_non_self_injectivity: false,
    };

    /// Stop on the first negative finding of any kind.
    pub const ANY: Self = Self {
        on_cancellativity_failure: true,
        on_non_admissibility: true,
        on_non_self_injectivity: true,
    };
}

/// Error type for loading settings.
#[derive(Debug, Error)]
pub enum SettingsError {
    /// The TOML document did not describe valid settings.
    #[error("invalid analysis settings: {0}")]
    Toml(#[from] toml::de::Error),
}

/// Configuration of a single analysis run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalysisSettings {
    /// Cancellativity conditions to check.
    pub cancellativity: CancellativityMode,
    /// Upper bound on explored path lengths; `None` is unbounded.
    ///
    /// `Some(0)` admits only stationary paths, so every vertex with an
    /// outgoing nonzero arrow aborts.
    pub max_path_length: Option<usize>,
    /// When to stop before all vertices are analyzed.
    pub early_termination: EarlyTerminationCondition,
    /// Analyze vertices on the rayon thread pool.
    pub parallel: bool,
}

impl AnalysisSettings {
    /// Creates sequential settings.
    pub fn new(
        cancellativity: CancellativityMode,
        max_path_length: Option<usize>,
        early_termination: EarlyTerminationCondition,
    ) -> Self {
        Self {
            cancellativity,
            max_path_length,
            early_termination,
            parallel: false,
        }
    }

    /// Sets the cancellativity mode.
    pub fn with_cancellativity(mut self, mode: CancellativityMode) -> Self {
        self.cancellativity = mode;
        self
    }

    /// Bounds the explored path length.
    pub fn with_max_path_length(mut self, max: usize) -> Self {
        self.max_path_length = Some(max);
        self
    }

    /// Sets the early-termination conditions.
    pub fn with_early_termination(mut self, condition: EarlyTerminationCondition) -> Self {
        self.early_termination = condition;
        self
    }

    /// Enables or disables the parallel vertex loop.
    pub fn with_parallel(mut self, parallel: bool) -> Self {
        self.parallel = parallel;
        self
    }

    /// Parses settings from a TOML document; missing keys take defaults.
    pub fn from_toml_str(source: &str) -> Result<Self, SettingsError> {
        Ok(toml::from_str(source)?)
    }
}

/// Cooperative cancellation flag shared by the per-vertex runs.
#[derive(Debug, Clone, Default)]
pub struct CancellationToken(Arc<AtomicBool>);

impl CancellationToken {
    /// Creates an unset token.
    pub fn new() -> Self {
        Self::default()
    }

    /// Requests cancellation.
    pub fn cancel(&self) {
        self.0.store(true, Ordering::Release);
    }

    /// Checks whether cancellation was requested.
    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::Acquire)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_permissive() {
        let settings = AnalysisSettings::default();
        assert_eq!(settings.cancellativity, CancellativityMode::None);
        assert_eq!(settings.max_path_length, None);
        assert_eq!(settings.early_termination, EarlyTerminationCondition::NONE);
        assert!(!settings.parallel);
    }

    #[test]
    fn loads_from_toml() {
        let settings = AnalysisSettings::from_toml_str(
            r#"
            cancellativity = "weak_cancellativity"
            max_path_length = 12

            [early_termination]
            on_cancellativity_failure = true
            "#,
        )
        .unwrap();
        assert_eq!(
            settings,
            AnalysisSettings::default()
                .with_cancellativity(CancellativityMode::WeakCancellativity)
                .with_max_path_length(12)
                .with_early_termination(EarlyTerminationCondition {
                    on_cancellativity_failure: true,
                    ..EarlyTerminationCondition::NONE
                })
        );
        assert_eq!(AnalysisSettings::from_toml_str("").unwrap(), AnalysisSettings::default());
    }

    #[test]
    fn rejects_bad_toml() {
        assert!(matches!(
            AnalysisSettings::from_toml_str("cancellativity = \"strong\""),
            Err(SettingsError::Toml(_))
        ));
        assert!(matches!(
            AnalysisSettings::from_toml_str("max_path_length = -1"),
            Err(SettingsError::Toml(_))
        ));
    }

    #[test]
    fn zero_bound_is_accepted_on_every_path() {
        let expected = AnalysisSettings::default().with_max_path_length(0);
        assert_eq!(AnalysisSettings::from_toml_str("max_path_length = 0").unwrap(), expected);
        assert_eq!(
            AnalysisSettings::new(CancellativityMode::None, Some(0), EarlyTerminationCondition::NONE),
            expected
        );
    }

    #[test]
    fn token_is_shared_between_clones() {
        let token = CancellationToken::new();
        let clone = token.clone();
        assert!(!clone.is_cancelled());
        token.cancel();
        assert!(clone.is_cancelled());
    }
}
