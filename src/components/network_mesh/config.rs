use std::f64::consts::PI;

use serde::Deserialize;

use super::error::ConfigError;
use super::types::Theme;

#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(default)]
pub struct CameraConfig {
	/// Vertical field of view in degrees.
	pub fov: f64,
	pub near: f64,
	pub far: f64,
	pub z: f64,
}

impl Default for CameraConfig {
	fn default() -> Self {
		Self {
			fov: 50.0,
			near: 0.1,
			far: 1000.0,
			z: 20.0,
		}
	}
}

/// Opacity as `base + t * variation`, `t` being a normalised x position.
#[derive(Clone, Copy, Debug, PartialEq, Deserialize)]
pub struct OpacityRamp {
	pub base: f64,
	pub variation: f64,
}

impl OpacityRamp {
	pub fn at(&self, t: f64) -> f64 {
		self.base + t * self.variation
	}
}

/// A value that differs between the light and dark theme.
#[derive(Clone, Copy, Debug, PartialEq, Deserialize)]
pub struct Themed<T> {
	pub light: T,
	pub dark: T,
}

impl<T: Copy> Themed<T> {
	pub fn pick(&self, theme: Theme) -> T {
		match theme {
			Theme::Light => self.light,
			Theme::Dark => self.dark,
		}
	}
}

#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(default)]
pub struct NodeConfig {
	pub target_count: usize,
	pub min_distance: f64,
	pub max_attempts: usize,
	pub radius: f64,
	pub opacity: Themed<OpacityRamp>,
	pub color: Themed<u32>,
}

impl Default for NodeConfig {
	fn default() -> Self {
		Self {
			target_count: 80,
			min_distance: 4.0,
			max_attempts: 500,
			radius: 0.05,
			opacity: Themed {
				light: OpacityRamp {
					base: 0.08,
					variation: 0.04,
				},
				dark: OpacityRamp {
					base: 0.04,
					variation: 0.02,
				},
			},
			color: Themed {
				light: 0x475569,
				dark: 0x94a3b8,
			},
		}
	}
}

#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(default)]
pub struct EdgeConfig {
	pub max_distance: f64,
	/// Radians.
	pub min_angle_separation: f64,
	pub opacity: Themed<OpacityRamp>,
	pub color: Themed<u32>,
}

impl Default for EdgeConfig {
	fn default() -> Self {
		Self {
			max_distance: 16.0,
			min_angle_separation: PI / 6.0,
			opacity: Themed {
				light: OpacityRamp {
					base: 0.15,
					variation: 0.1,
				},
				dark: OpacityRamp {
					base: 0.08,
					variation: 0.06,
				},
			},
			color: Themed {
				light: 0x334155,
				dark: 0x64748b,
			},
		}
	}
}

/// Per-node connection budget tiers. `medium_chance` is cumulative.
#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(default)]
pub struct BudgetConfig {
	pub hub_chance: f64,
	pub hub_connections: usize,
	pub medium_chance: f64,
	pub medium_connections: usize,
	pub default_connections: usize,
}

impl Default for BudgetConfig {
	fn default() -> Self {
		Self {
			hub_chance: 0.2,
			hub_connections: 6,
			medium_chance: 0.5,
			medium_connections: 5,
			default_connections: 4,
		}
	}
}

impl BudgetConfig {
	pub fn budget_for(&self, roll: f64) -> usize {
		if roll < self.hub_chance {
			self.hub_connections
		} else if roll < self.medium_chance {
			self.medium_connections
		} else {
			self.default_connections
		}
	}
}

#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(default)]
pub struct FloatConfig {
	pub speed: f64,
	pub amount: f64,
	pub y_multiplier: f64,
	pub z_multiplier: f64,
}

impl Default for FloatConfig {
	fn default() -> Self {
		Self {
			speed: 0.5,
			amount: 0.4,
			y_multiplier: 1.2,
			z_multiplier: 0.5,
		}
	}
}

#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(default)]
pub struct PointerConfig {
	pub influence_range: f64,
	pub attraction_strength: f64,
	pub opacity_boost: f64,
	pub scale_boost: f64,
	pub edge_influence_range: f64,
	pub edge_opacity_boost: f64,
}

impl Default for PointerConfig {
	fn default() -> Self {
		Self {
			influence_range: 25.0,
			attraction_strength: 0.01,
			opacity_boost: 0.08,
			scale_boost: 0.15,
			edge_influence_range: 30.0,
			edge_opacity_boost: 0.12,
		}
	}
}

#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(default)]
pub struct EnvironmentResponse {
	pub wind_drift_factor: f64,
	/// Upper bound on the accumulated wind drift, in world units.
	pub max_wind_drift: f64,
	pub temperature_factor: f64,
	pub neutral_temperature: f64,
}

impl Default for EnvironmentResponse {
	fn default() -> Self {
		Self {
			wind_drift_factor: 0.0001,
			max_wind_drift: 2.0,
			temperature_factor: 0.001,
			neutral_temperature: 20.0,
		}
	}
}

#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(default)]
pub struct AnimationConfig {
	pub time_step: f64,
	pub float: FloatConfig,
	pub pointer: PointerConfig,
	pub environment: EnvironmentResponse,
}

impl Default for AnimationConfig {
	fn default() -> Self {
		Self {
			time_step: 0.0015,
			float: FloatConfig::default(),
			pointer: PointerConfig::default(),
			environment: EnvironmentResponse::default(),
		}
	}
}

/// Every tunable of the mesh. Partial JSON documents override only the
/// fields they name.
#[derive(Clone, Debug, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct MeshConfig {
	pub camera: CameraConfig,
	pub nodes: NodeConfig,
	pub edges: EdgeConfig,
	pub budget: BudgetConfig,
	pub animation: AnimationConfig,
}

impl MeshConfig {
	pub fn from_json(json: &str) -> Result<Self, ConfigError> {
		let config: Self = serde_json::from_str(json)?;
		config.validate()?;
		Ok(config)
	}

	fn validate(&self) -> Result<(), ConfigError> {
		if self.nodes.min_distance < 0.0 {
			return Err(ConfigError::Invalid("nodes.min_distance must not be negative"));
		}
		if self.animation.pointer.influence_range <= 0.0
			|| self.animation.pointer.edge_influence_range <= 0.0
		{
			return Err(ConfigError::Invalid("influence ranges must be positive"));
		}
		if self.camera.near <= 0.0 || self.camera.far <= self.camera.near {
			return Err(ConfigError::Invalid("camera planes must satisfy 0 < near < far"));
		}
		Ok(())
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn partial_json_keeps_defaults() {
		let config = MeshConfig::from_json(r#"{ "nodes": { "target_count": 12 } }"#).unwrap();
		assert_eq!(config.nodes.target_count, 12);
		assert_eq!(config.nodes.min_distance, 4.0);
		assert_eq!(config.edges, EdgeConfig::default());
	}

	#[test]
	fn rejects_nonsense_camera() {
		let err = MeshConfig::from_json(r#"{ "camera": { "near": 5.0, "far": 1.0 } }"#);
		assert!(matches!(err, Err(ConfigError::Invalid(_))));
	}

	#[test]
	fn malformed_json_is_a_parse_error() {
		assert!(matches!(MeshConfig::from_json("{"), Err(ConfigError::Parse(_))));
	}

	#[test]
	fn budget_tiers() {
		let budget = BudgetConfig::default();
		assert_eq!(budget.budget_for(0.1), 6);
		assert_eq!(budget.budget_for(0.3), 5);
		assert_eq!(budget.budget_for(0.9), 4);
	}
}
