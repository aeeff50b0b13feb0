//! Conveyance settings loaded from `config/conveyance.toml`.
use std::{fs, path::Path};

use bevy::prelude::*;
use serde::Deserialize;

use crate::{interactor::discovery::DiscoveryMode, replication::role::NetRole};

const CONFIG_PATH: &str = "config/conveyance.toml";

const DEFAULT_RAYCAST_RANGE: f32 = 6.0;
const MIN_RAYCAST_RANGE: f32 = 0.1;
const DEFAULT_TELEMETRY_CAPACITY: usize = 64;
const DEFAULT_TELEMETRY_LOG_PATH: &str = "logs/interaction_history.jsonl";

#[derive(Debug, Clone, Deserialize, Default)]
struct RawConveyanceConfig {
    #[serde(default)]
    network: RawNetworkSection,
    #[serde(default)]
    discovery: RawDiscoverySection,
    #[serde(default)]
    telemetry: RawTelemetrySection,
}

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
struct RawNetworkSection {
    role: NetRole,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
struct RawDiscoverySection {
    mode: DiscoveryMode,
    raycast_range: f32,
}

impl Default for RawDiscoverySection {
    fn default() -> Self {
        Self {
            mode: DiscoveryMode::default(),
            raycast_range: DEFAULT_RAYCAST_RANGE,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
struct RawTelemetrySection {
    log_path: String,
    capacity: usize,
}

impl Default for RawTelemetrySection {
    fn default() -> Self {
        Self {
            log_path: DEFAULT_TELEMETRY_LOG_PATH.to_string(),
            capacity: DEFAULT_TELEMETRY_CAPACITY,
        }
    }
}

/// How candidates are found for the local agent.
#[derive(Resource, Debug, Clone, Copy, PartialEq)]
pub struct DiscoverySettings {
    pub mode: DiscoveryMode,
    /// Maximum ray length in world units.
    pub raycast_range: f32,
}

impl Default for DiscoverySettings {
    fn default() -> Self {
        RawDiscoverySection::default().into()
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct TelemetrySettings {
    pub log_path: String,
    pub capacity: usize,
}

/// Tunables for the conveyance layer and its collaborators.
#[derive(Resource, Debug, Clone, PartialEq)]
pub struct ConveyanceSettings {
    pub role: NetRole,
    pub discovery: DiscoverySettings,
    pub telemetry: TelemetrySettings,
}

impl ConveyanceSettings {
    pub fn load_or_default() -> Self {
        let path = Path::new(CONFIG_PATH);
        match fs::read_to_string(path) {
            Ok(data) => Self::from_toml_or_default(&data),
            Err(err) => {
                warn!(
                    "Failed to read {} ({}). Falling back to defaults.",
                    CONFIG_PATH, err
                );
                RawConveyanceConfig::default().into()
            }
        }
    }

    fn from_toml_or_default(data: &str) -> Self {
        match toml::from_str::<RawConveyanceConfig>(data) {
            Ok(raw) => raw.into(),
            Err(err) => {
                warn!(
                    "Failed to parse {} ({}). Falling back to defaults.",
                    CONFIG_PATH, err
                );
                RawConveyanceConfig::default().into()
            }
        }
    }
}

impl Default for ConveyanceSettings {
    fn default() -> Self {
        RawConveyanceConfig::default().into()
    }
}

impl From<RawDiscoverySection> for DiscoverySettings {
    fn from(value: RawDiscoverySection) -> Self {
        let raycast_range = if value.raycast_range.is_finite() {
            value.raycast_range.max(MIN_RAYCAST_RANGE)
        } else {
            DEFAULT_RAYCAST_RANGE
        };
        Self {
            mode: value.mode,
            raycast_range,
        }
    }
}

impl From<RawConveyanceConfig> for ConveyanceSettings {
    fn from(value: RawConveyanceConfig) -> Self {
        let log_path = if value.telemetry.log_path.trim().is_empty() {
            DEFAULT_TELEMETRY_LOG_PATH.to_string()
        } else {
            value.telemetry.log_path
        };

        Self {
            role: value.network.role,
            discovery: value.discovery.into(),
            telemetry: TelemetrySettings {
                log_path,
                capacity: value.telemetry.capacity.max(1),
            },
        }
    }
}
