//! Fit diagnostics: verbosity levels, the observer side-channel and
//! serializable per-level traces.
//!
//! Verbosity is purely diagnostic; no setting changes the produced result.
//! The engine reports through an injected [`FitObserver`] so tests can
//! capture progress without scraping log output. [`LogObserver`] is the
//! default sink and routes everything to the `log` crate.

use serde::{Deserialize, Serialize};

/// How much fitting progress to report.
///
/// Ordered: each level includes everything the previous one reports.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Verbosity {
    /// Silent.
    #[default]
    NoVerbose,
    /// One report per pyramid level.
    AtLevel,
    /// One report per inner iteration.
    AtIteration,
    /// One report per landmark candidate selection.
    AtPoint,
}

/// Progress callbacks invoked by the fitting engine.
///
/// All methods have empty defaults so observers implement only what they
/// need. Callbacks arrive strictly sequentially, after any parallel
/// per-landmark work has been joined.
pub trait FitObserver {
    fn level_started(&mut self, _level: usize, _width: usize, _height: usize) {}

    fn level_finished(&mut self, _trace: &LevelTrace) {}

    /// Reported once per inner iteration with the mean landmark shift (in
    /// current-level pixels) and the mean Mahalanobis distance of the
    /// selected candidates.
    fn iteration(&mut self, _level: usize, _iteration: usize, _mean_shift: f64, _mean_distance: f64) {
    }

    /// Reported per landmark at `Verbosity::AtPoint`: the chosen offset
    /// along the normal and its Mahalanobis distance.
    fn point(&mut self, _level: usize, _landmark: usize, _offset: i32, _distance: f64) {}
}

/// Observer that ignores everything.
#[derive(Clone, Copy, Debug, Default)]
pub struct NullObserver;

impl FitObserver for NullObserver {}

/// Observer routing progress to the `log` crate, gated by [`Verbosity`].
#[derive(Clone, Copy, Debug)]
pub struct LogObserver {
    verbosity: Verbosity,
}

impl LogObserver {
    pub fn new(verbosity: Verbosity) -> Self {
        Self { verbosity }
    }
}

impl FitObserver for LogObserver {
    fn level_started(&mut self, level: usize, width: usize, height: usize) {
        if self.verbosity >= Verbosity::AtLevel {
            log::debug!("level {level}: search on {width}x{height}");
        }
    }

    fn level_finished(&mut self, trace: &LevelTrace) {
        if self.verbosity >= Verbosity::AtLevel {
            if trace.converged {
                log::debug!(
                    "level {}: converged after {} iterations (mean shift {:.4} px)",
                    trace.level_index,
                    trace.iterations,
                    trace.mean_shift
                );
            } else {
                log::debug!(
                    "level {}: iteration budget exhausted, carrying best estimate \
                     (mean shift {:.4} px)",
                    trace.level_index,
                    trace.mean_shift
                );
            }
        }
    }

    fn iteration(&mut self, level: usize, iteration: usize, mean_shift: f64, mean_distance: f64) {
        if self.verbosity >= Verbosity::AtIteration {
            log::debug!(
                "level {level} iter {iteration}: mean shift {mean_shift:.4} px, \
                 mean distance {mean_distance:.4}"
            );
        }
    }

    fn point(&mut self, level: usize, landmark: usize, offset: i32, distance: f64) {
        if self.verbosity >= Verbosity::AtPoint {
            log::trace!(
                "level {level} landmark {landmark}: offset {offset:+} distance {distance:.4}"
            );
        }
    }
}

/// Convergence summary for one pyramid level.
#[derive(Clone, Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LevelTrace {
    pub level_index: usize,
    pub width: usize,
    pub height: usize,
    /// Inner iterations actually executed.
    pub iterations: usize,
    /// Whether the mean shift fell below the threshold within the budget.
    pub converged: bool,
    /// Mean landmark shift of the final iteration, in level pixels.
    pub mean_shift: f64,
    /// Observation-noise variance estimated by the last BTSM solve.
    pub sigma2: f64,
}

/// Full per-fit trace assembled by the traced entry points.
#[derive(Clone, Debug, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FitTrace {
    pub levels: Vec<LevelTrace>,
}
