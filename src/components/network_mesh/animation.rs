use std::f64::consts::PI;

use glam::{DVec2, DVec3};

use super::config::MeshConfig;
use super::generator::{edge_opacity, node_opacity};
use super::types::{Edge, Node, PointerState, SceneStyle, Theme};
use crate::environment::{EnvironmentState, TimeOfDay, Weather};

/// Proximity falloff in `[0, 1]`, zero at and beyond `range`.
pub fn influence(pointer: DVec2, point: DVec2, range: f64) -> f64 {
	(1.0 - pointer.distance(point) / range).max(0.0)
}

/// Floating amplitude multiplier per weather condition.
pub fn weather_amplitude(weather: Weather, time: f64) -> f64 {
	match weather {
		Weather::Storm => 1.5 + (time * 2.0).sin() * 0.3,
		Weather::Rain => 1.2,
		Weather::Snow => 0.7,
		Weather::Fog => 0.8,
		Weather::Clear | Weather::Clouds => 1.0,
	}
}

pub fn fog_density(weather: Weather) -> f64 {
	match weather {
		Weather::Fog => 0.03,
		Weather::Rain | Weather::Storm => 0.015,
		Weather::Snow => 0.02,
		Weather::Clouds => 0.008,
		Weather::Clear => 0.003,
	}
}

/// Overall mesh opacity for the weather and time of day.
pub fn mesh_opacity(env: &EnvironmentState) -> f64 {
	let mut opacity = 1.0;
	match env.weather {
		Weather::Fog => opacity *= 0.5,
		Weather::Storm => opacity *= 1.3,
		_ => {}
	}
	match env.time_of_day {
		TimeOfDay::Night => opacity *= 0.7,
		TimeOfDay::Dawn | TimeOfDay::Evening => opacity *= 0.85,
		_ => {}
	}
	opacity
}

/// Rotation of the mesh about Z for a local hour in `[0, 24)`.
pub fn hour_rotation(hour: f64) -> f64 {
	hour / 24.0 * PI * 0.1
}

pub fn scene_style(env: &EnvironmentState, hour: f64) -> SceneStyle {
	SceneStyle {
		fog_density: fog_density(env.weather),
		opacity: mesh_opacity(env),
		rotation: hour_rotation(hour),
	}
}

fn wind_drift(config: &MeshConfig, env: &EnvironmentState, time: f64) -> f64 {
	let response = &config.animation.environment;
	let drift = env.wind_speed * response.wind_drift_factor * time;
	drift.clamp(-response.max_wind_drift, response.max_wind_drift)
}

fn temperature_scale(config: &MeshConfig, env: &EnvironmentState) -> f64 {
	let response = &config.animation.environment;
	1.0 + (env.temperature - response.neutral_temperature) * response.temperature_factor
}

/// Moves every node to its animated position and refreshes its material.
pub fn animate_nodes(
	nodes: &mut [Node],
	pointer: &PointerState,
	time: f64,
	theme: Theme,
	config: &MeshConfig,
	env: &EnvironmentState,
) {
	let float = &config.animation.float;
	let mouse = &config.animation.pointer;
	let (amount, drift, size) = (
		float.amount * weather_amplitude(env.weather, time),
		wind_drift(config, env, time),
		temperature_scale(config, env),
	);
	let target = DVec2::new(pointer.world_x, pointer.world_y);

	for node in nodes.iter_mut() {
		let base = node.position;
		let inf = influence(target, base.truncate(), mouse.influence_range);
		let pull = (target - base.truncate()) * inf * mouse.attraction_strength;

		node.rendered = DVec3::new(
			base.x
				+ (time * float.speed + node.phase + inf * 0.5).sin() * amount
				+ pull.x + drift,
			base.y
				+ (time * float.speed * 1.3 + node.phase + inf * 0.5).sin()
					* amount * float.y_multiplier
				+ pull.y,
			base.z + (time * float.speed * 0.7 + node.phase).cos() * amount * float.z_multiplier,
		);

		node.material.opacity = (node_opacity(config, theme, base.x)
			+ (time * 2.0 + node.phase).sin() * 0.02
			+ inf * mouse.opacity_boost)
			.clamp(0.0, 1.0);
		node.scale = (1.0 + inf * mouse.scale_boost) * size;
	}
}

/// Copies node positions into edge endpoints. Run after [`animate_nodes`].
pub fn animate_edges(
	edges: &mut [Edge],
	nodes: &[Node],
	pointer: &PointerState,
	time: f64,
	theme: Theme,
	config: &MeshConfig,
) {
	let mouse = &config.animation.pointer;
	let target = DVec2::new(pointer.world_x, pointer.world_y);

	for edge in edges.iter_mut() {
		let (Some(a), Some(b)) = (nodes.get(edge.start), nodes.get(edge.end)) else {
			continue;
		};
		edge.points = [a.rendered, b.rendered];

		let mid = (a.rendered + b.rendered).truncate() * 0.5;
		let inf = influence(target, mid, mouse.edge_influence_range);
		let base_mid_x = (a.position.x + b.position.x) * 0.5;

		edge.material.opacity = (edge_opacity(config, theme, base_mid_x)
			+ (time * 3.0 + edge.start as f64 * 0.2).sin() * 0.03
			+ inf * mouse.edge_opacity_boost)
			.clamp(0.0, 1.0);
	}
}

/// One frame of animation: every node first, then every edge.
pub fn animate_frame(
	nodes: &mut [Node],
	edges: &mut [Edge],
	pointer: &PointerState,
	time: f64,
	theme: Theme,
	config: &MeshConfig,
	env: &EnvironmentState,
) {
	animate_nodes(nodes, pointer, time, theme, config, env);
	animate_edges(edges, nodes, pointer, time, theme, config);
}
