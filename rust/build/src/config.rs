// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Build tolerances, loadable from environment variables.

use serde::{Deserialize, Serialize};

/// Numeric tolerances shared by every builder.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BuildConfig {
    /// Outline corners turning less than this (radians) are pruned before
    /// skeleton construction.
    pub collinear_angle: f64,
    /// Distance below which lifted skeleton vertices are welded.
    pub weld_distance: f64,
    /// Minimum normal z for a face to count as roof.
    pub up_facing_z: f64,
    /// Tolerance for dimension and direction comparisons.
    pub equal_epsilon: f64,
    /// Gap kept between an opening and the edges of its host face.
    pub limit_inset: f64,
    /// Hard cap on processed skeleton events.
    pub max_skeleton_events: usize,
}

impl Default for BuildConfig {
    fn default() -> Self {
        Self {
            collinear_angle: 0.001,
            weld_distance: 1e-4,
            up_facing_z: 0.001,
            equal_epsilon: 0.001,
            limit_inset: 0.01,
            max_skeleton_events: 10_000,
        }
    }
}

impl BuildConfig {
    /// Load configuration from environment variables.
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            collinear_angle: std::env::var("ARCHGEN_COLLINEAR_ANGLE")
                .unwrap_or_else(|_| "0.001".into())
                .parse()
                .unwrap_or(defaults.collinear_angle),
            weld_distance: std::env::var("ARCHGEN_WELD_DISTANCE")
                .unwrap_or_else(|_| "0.0001".into())
                .parse()
                .unwrap_or(defaults.weld_distance),
            up_facing_z: std::env::var("ARCHGEN_UP_FACING_Z")
                .unwrap_or_else(|_| "0.001".into())
                .parse()
                .unwrap_or(defaults.up_facing_z),
            equal_epsilon: std::env::var("ARCHGEN_EQUAL_EPSILON")
                .unwrap_or_else(|_| "0.001".into())
                .parse()
                .unwrap_or(defaults.equal_epsilon),
            limit_inset: std::env::var("ARCHGEN_LIMIT_INSET")
                .unwrap_or_else(|_| "0.01".into())
                .parse()
                .unwrap_or(defaults.limit_inset),
            max_skeleton_events: std::env::var("ARCHGEN_MAX_SKELETON_EVENTS")
                .unwrap_or_else(|_| "10000".into())
                .parse()
                .unwrap_or(defaults.max_skeleton_events),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_documented_tolerances() {
        let config = BuildConfig::default();
        assert_eq!(config.collinear_angle, 0.001);
        assert_eq!(config.weld_distance, 1e-4);
        assert_eq!(config.limit_inset, 0.01);
    }

    #[test]
    fn partial_json_falls_back_to_defaults() {
        let config: BuildConfig = serde_json::from_str(r#"{"weld_distance": 0.001}"#).unwrap();
        assert_eq!(config.weld_distance, 0.001);
        assert_eq!(config.up_facing_z, 0.001);
        assert_eq!(config.max_skeleton_events, 10_000);
    }
}
