//! Engine configuration
//!
//! Default timings for delayed and animated changes, and the frame interval a
//! host is expected to drive the scheduler with. Loadable from RON.

use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Configuration for a trellis document
///
/// # Example
///
/// ```
/// use trellis_core::EngineConfig;
///
/// let config = EngineConfig::from_ron_str("(default_animation_ms: 250)").unwrap();
/// assert_eq!(config.default_animation().as_millis(), 250);
/// assert_eq!(config.frame_interval().as_millis(), 16);
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Delay used by timed changes built from this config
    pub default_delay_ms: u64,
    /// Duration used by animated changes built from this config
    pub default_animation_ms: u64,
    /// Expected time between two host frames
    ///
    /// Clamped to at least 1ms.
    pub frame_interval_ms: u64,
    /// Snap discrete values halfway through an animation instead of at the end
    pub halfway_step: bool,
}

impl EngineConfig {
    /// Parse a configuration from RON text
    ///
    /// Missing fields fall back to their defaults.
    pub fn from_ron_str(text: &str) -> Result<Self> {
        let config: Self = ron::from_str(text).map_err(|e| Error::Config(e.to_string()))?;
        Ok(config.normalized())
    }

    pub fn default_delay(&self) -> Duration {
        Duration::from_millis(self.default_delay_ms)
    }

    pub fn default_animation(&self) -> Duration {
        Duration::from_millis(self.default_animation_ms)
    }

    pub fn frame_interval(&self) -> Duration {
        Duration::from_millis(self.frame_interval_ms.max(1))
    }

    fn normalized(mut self) -> Self {
        self.frame_interval_ms = self.frame_interval_ms.max(1);
        self
    }
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            default_delay_ms: 100,
            default_animation_ms: 300,
            frame_interval_ms: 16,
            halfway_step: false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = EngineConfig::default();
        assert_eq!(config.default_delay(), Duration::from_millis(100));
        assert_eq!(config.default_animation(), Duration::from_millis(300));
        assert!(!config.halfway_step);
    }

    #[test]
    fn test_from_ron_partial() {
        let config = EngineConfig::from_ron_str("(default_delay_ms: 40, halfway_step: true)").unwrap();
        assert_eq!(config.default_delay_ms, 40);
        assert!(config.halfway_step);
        assert_eq!(config.default_animation_ms, 300);
    }

    #[test]
    fn test_zero_frame_interval_clamped() {
        let config = EngineConfig::from_ron_str("(frame_interval_ms: 0)").unwrap();
        assert_eq!(config.frame_interval_ms, 1);
        assert_eq!(config.frame_interval(), Duration::from_millis(1));
    }

    #[test]
    fn test_invalid_ron() {
        let err = EngineConfig::from_ron_str("(default_delay_ms: \"soon\")").unwrap_err();
        assert!(matches!(err, Error::Config(_)));
    }

    #[test]
    fn test_roundtrip() {
        let config = EngineConfig {
            default_delay_ms: 5,
            default_animation_ms: 50,
            frame_interval_ms: 8,
            halfway_step: true,
        };
        let text = ron::to_string(&config).unwrap();
        assert_eq!(EngineConfig::from_ron_str(&text).unwrap(), config);
    }
}
