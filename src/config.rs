use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::registry::MAX_CHANNELS;

pub const DEFAULT_STEP_DEGREES: i16 = 1;
pub const DEFAULT_STEP_INTERVAL_MS: u64 = 15;

/// Descriptor for one servo channel: identity, mechanical limits, and the
/// pose the joint is driven to at startup.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChannelConfig {
    pub id: alloc::string::String,
    pub label: alloc::string::String,
    pub min_deg: i16,
    pub max_deg: i16,
    pub initial_deg: i16,
}

impl ChannelConfig {
    pub fn new(id: &str, label: &str, min_deg: i16, max_deg: i16, initial_deg: i16) -> Self {
        Self {
            id: alloc::string::ToString::to_string(id),
            label: alloc::string::ToString::to_string(label),
            min_deg,
            max_deg,
            initial_deg,
        }
    }
}

/// Full controller configuration: the ordered channel table plus the motion
/// stepper tuning. Injectable so tests and multi-arm setups can build
/// independent instances instead of sharing a process-wide table.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ArmConfig {
    pub channels: alloc::vec::Vec<ChannelConfig>,
    #[serde(default = "default_step_degrees")]
    pub step_deg: i16,
    #[serde(default = "default_step_interval_ms")]
    pub step_interval_ms: u64,
}

fn default_step_degrees() -> i16 {
    DEFAULT_STEP_DEGREES
}

fn default_step_interval_ms() -> u64 {
    DEFAULT_STEP_INTERVAL_MS
}

impl ArmConfig {
    /// Stock six-joint Braccio arm table. Ranges and the safety pose come
    /// from the shipped firmware; labels from the control-panel tooling.
    pub fn braccio() -> Self {
        Self {
            channels: vec![
                ChannelConfig::new("m1", "Base", 0, 270, 90),
                ChannelConfig::new("m2", "Shoulder", 15, 165, 45),
                ChannelConfig::new("m3", "Elbow", 0, 180, 180),
                ChannelConfig::new("m4", "Wrist Vertical", 0, 180, 180),
                ChannelConfig::new("m5", "Wrist Rotation", 0, 180, 90),
                ChannelConfig::new("m6", "Gripper", 10, 110, 10),
            ],
            step_deg: DEFAULT_STEP_DEGREES,
            step_interval_ms: DEFAULT_STEP_INTERVAL_MS,
        }
    }

    /// Validate the table before it is frozen into a registry. This is the
    /// only fallible path in the controller; everything downstream relies on
    /// the invariants checked here.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.channels.is_empty() {
            return Err(ConfigError::NoChannels);
        }

        if self.channels.len() > MAX_CHANNELS {
            return Err(ConfigError::TooManyChannels {
                count: self.channels.len(),
            });
        }

        if self.step_deg < 1 {
            return Err(ConfigError::InvalidStepSize {
                step_deg: self.step_deg,
            });
        }

        for (index, channel) in self.channels.iter().enumerate() {
            if channel.min_deg > channel.max_deg {
                return Err(ConfigError::InvalidRange {
                    id: channel.id.clone(),
                });
            }

            if !(channel.min_deg..=channel.max_deg).contains(&channel.initial_deg) {
                return Err(ConfigError::InitialPoseOutOfRange {
                    id: channel.id.clone(),
                });
            }

            if self.channels[..index].iter().any(|c| c.id.eq_ignore_ascii_case(&channel.id)) {
                return Err(ConfigError::DuplicateId {
                    id: channel.id.clone(),
                });
            }
        }

        Ok(())
    }
}

impl Default for ArmConfig {
    fn default() -> Self {
        Self::braccio()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    #[error("channel table is empty")]
    NoChannels,
    #[error("channel table has {count} entries, limit is {MAX_CHANNELS}")]
    TooManyChannels { count: usize },
    #[error("step size {step_deg} must be at least 1 degree")]
    InvalidStepSize { step_deg: i16 },
    #[error("channel {id} has an inverted angle range")]
    InvalidRange { id: alloc::string::String },
    #[error("channel {id} initial pose is outside its safe range")]
    InitialPoseOutOfRange { id: alloc::string::String },
    #[error("channel id {id} appears more than once")]
    DuplicateId { id: alloc::string::String },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_braccio_table_is_valid() {
        let config = ArmConfig::braccio();
        assert!(config.validate().is_ok());
        assert_eq!(config.channels.len(), 6);
        assert_eq!(config.step_deg, DEFAULT_STEP_DEGREES);
        assert_eq!(config.step_interval_ms, DEFAULT_STEP_INTERVAL_MS);
    }

    #[test]
    fn test_inverted_range_rejected() {
        let mut config = ArmConfig::braccio();
        config.channels[2].min_deg = 200;
        assert_eq!(
            config.validate(),
            Err(ConfigError::InvalidRange {
                id: alloc::string::ToString::to_string("m3")
            })
        );
    }

    #[test]
    fn test_initial_pose_must_be_in_range() {
        let mut config = ArmConfig::braccio();
        config.channels[5].initial_deg = 5; // gripper range starts at 10
        assert!(matches!(
            config.validate(),
            Err(ConfigError::InitialPoseOutOfRange { .. })
        ));
    }

    #[test]
    fn test_duplicate_id_rejected_case_insensitively() {
        let mut config = ArmConfig::braccio();
        config.channels[3].id = alloc::string::ToString::to_string("M1");
        assert!(matches!(config.validate(), Err(ConfigError::DuplicateId { .. })));
    }

    #[test]
    fn test_config_round_trips_through_json() {
        let config = ArmConfig::braccio();
        let json = serde_json::to_string(&config).unwrap();
        let parsed: ArmConfig = serde_json::from_str(&json).unwrap();
        assert!(parsed.validate().is_ok());
        assert_eq!(parsed.channels[0].max_deg, 270);
    }

    #[test]
    fn test_step_fields_default_when_omitted() {
        let json = r#"{"channels":[{"id":"m1","label":"Base","min_deg":0,"max_deg":180,"initial_deg":90}]}"#;
        let parsed: ArmConfig = serde_json::from_str(json).unwrap();
        assert_eq!(parsed.step_deg, DEFAULT_STEP_DEGREES);
        assert_eq!(parsed.step_interval_ms, DEFAULT_STEP_INTERVAL_MS);
    }
}
