//! Blend configuration.

use serde::{Deserialize, Serialize};

use crate::blend::BlendFunction;
use crate::error::TweenError;

/// How the raw UI value in [-1, 1] is expanded before it reaches a blend function.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScaleMode {
    /// ±100%.
    #[default]
    Normalized,
    /// ±200%.
    Overshoot,
}

impl ScaleMode {
    #[inline]
    pub fn scale(self, raw: f64) -> f64 {
        match self {
            ScaleMode::Normalized => raw,
            ScaleMode::Overshoot => 2.0 * raw,
        }
    }
}

/// Settings for one blend model. Changes take effect on the next start.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub function: BlendFunction,
    pub scale_mode: ScaleMode,
    /// Label handed to the host transaction scope, if one wraps the model.
    pub transaction_label: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            function: BlendFunction::Neighbor,
            scale_mode: ScaleMode::Normalized,
            transaction_label: "Blend Keys".to_string(),
        }
    }
}

impl Config {
    /// Parse host-provided JSON settings. Missing fields fall back to defaults.
    pub fn from_json(json: &str) -> Result<Self, TweenError> {
        Ok(serde_json::from_str(json)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn overshoot_doubles_normalized() {
        for v in [-1.0, -0.37, 0.0, 0.25, 1.0] {
            assert_eq!(
                ScaleMode::Overshoot.scale(v),
                2.0 * ScaleMode::Normalized.scale(v)
            );
        }
    }

    #[test]
    fn partial_json_uses_defaults() {
        let cfg = Config::from_json(r#"{ "function": "push_pull" }"#).expect("config parses");
        assert_eq!(cfg.function, BlendFunction::PushPull);
        assert_eq!(cfg.scale_mode, ScaleMode::Normalized);
        assert_eq!(cfg.transaction_label, "Blend Keys");

        let cfg = Config::from_json(r#"{ "scale_mode": "overshoot" }"#).expect("config parses");
        assert_eq!(cfg.function, BlendFunction::Neighbor);
        assert_eq!(cfg.scale_mode, ScaleMode::Overshoot);
    }

    #[test]
    fn unknown_function_is_rejected() {
        let err = Config::from_json(r#"{ "function": "wobble" }"#).unwrap_err();
        assert!(matches!(err, TweenError::Config(_)));
    }
}
