use crate::diagnostics::Verbosity;
use serde::Deserialize;

/// Parameters controlling the multi-resolution ASM search.
#[derive(Clone, Debug, Deserialize)]
pub struct FitOptions {
    /// Number of pyramid levels walked coarse → fine. Must not exceed the
    /// levels the appearance statistics were trained for.
    pub pyramid_levels: usize,
    /// Half-width `k` of the candidate scan along the normal: candidates sit
    /// at integer offsets `−k..=k`, one pixel apart at the current level.
    pub search_radius: usize,
    /// Profile half-length `ns`; extracted profiles have `2·ns + 1` samples
    /// and must match the trained statistics.
    pub profile_half_len: usize,
    /// Truncation factor `m`: shape parameters are clamped to `± m·√λᵢ`.
    pub truncation: f64,
    /// Maximum inner iterations per pyramid level.
    pub max_iterations: usize,
    /// Convergence threshold on the mean landmark shift, in level pixels.
    pub convergence_threshold: f64,
    /// Diagnostic verbosity for the default log observer.
    pub verbosity: Verbosity,
    /// Parallel execution gating (requires the `parallel` feature).
    #[serde(skip)]
    pub parallel: ParallelFitOptions,
}

impl Default for FitOptions {
    fn default() -> Self {
        Self {
            pyramid_levels: 3,
            search_radius: 4,
            profile_half_len: 6,
            truncation: 3.0,
            max_iterations: 20,
            convergence_threshold: 0.3,
            verbosity: Verbosity::NoVerbose,
            parallel: ParallelFitOptions::default(),
        }
    }
}

impl FitOptions {
    /// Profile length implied by `profile_half_len`.
    #[inline]
    pub fn profile_len(&self) -> usize {
        2 * self.profile_half_len + 1
    }
}

/// Controls whether per-landmark search and per-region fits run
/// sequentially or with Rayon.
#[derive(Clone, Copy, Debug)]
pub struct ParallelFitOptions {
    enabled: bool,
    min_landmarks_for_parallel: usize,
    min_regions_for_parallel: usize,
}

impl ParallelFitOptions {
    /// Construct explicit options.
    pub fn new(enabled: bool, min_landmarks: usize, min_regions: usize) -> Self {
        Self {
            enabled,
            min_landmarks_for_parallel: min_landmarks.max(1),
            min_regions_for_parallel: min_regions.max(1),
        }
    }

    /// Disable parallel execution regardless of workload size.
    pub fn disabled() -> Self {
        Self {
            enabled: false,
            min_landmarks_for_parallel: usize::MAX,
            min_regions_for_parallel: usize::MAX,
        }
    }

    /// Returns true when the landmark sweep should fan out for `count`
    /// landmarks.
    pub fn should_parallelize_landmarks(&self, count: usize) -> bool {
        self.enabled && count >= self.min_landmarks_for_parallel
    }

    /// Returns true when `fit_all` should fan out for `count` regions.
    pub fn should_parallelize_regions(&self, count: usize) -> bool {
        self.enabled && count >= self.min_regions_for_parallel
    }
}

impl Default for ParallelFitOptions {
    fn default() -> Self {
        Self {
            enabled: cfg!(feature = "parallel"),
            min_landmarks_for_parallel: 32,
            min_regions_for_parallel: 2,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_documented_values() {
        let opts = FitOptions::default();
        assert_eq!(opts.pyramid_levels, 3);
        assert_eq!(opts.search_radius, 4);
        assert_eq!(opts.profile_half_len, 6);
        assert_eq!(opts.profile_len(), 13);
        assert!((opts.truncation - 3.0).abs() < 1e-12);
    }

    #[test]
    fn disabled_parallel_never_fans_out() {
        let p = ParallelFitOptions::disabled();
        assert!(!p.should_parallelize_landmarks(usize::MAX - 1));
        assert!(!p.should_parallelize_regions(usize::MAX - 1));
    }

    #[test]
    fn options_deserialize_from_json() {
        let opts: FitOptions = serde_json::from_str(
            r#"{
                "pyramid_levels": 2,
                "search_radius": 3,
                "profile_half_len": 5,
                "truncation": 2.5,
                "max_iterations": 10,
                "convergence_threshold": 0.5,
                "verbosity": "at-level"
            }"#,
        )
        .unwrap();
        assert_eq!(opts.pyramid_levels, 2);
        assert_eq!(opts.verbosity, Verbosity::AtLevel);
    }
}
