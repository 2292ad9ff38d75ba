//! Procedural placement of the network: rejection-sampled nodes and a
//! sparse, angle-spread edge set over them.

use std::f64::consts::{PI, TAU};

use glam::DVec3;
use rand::Rng;

use super::config::MeshConfig;
use super::host::DrawSurface;
use super::types::{Edge, Material, Node, PrimitiveKind, Theme};

/// Standard normal sample via Box-Muller.
fn gaussian(rng: &mut impl Rng) -> f64 {
	// (0, 1] keeps ln() finite
	let u1: f64 = 1.0 - rng.gen_range(0.0..1.0);
	let u2: f64 = rng.gen_range(0.0..1.0);
	(-2.0 * u1.ln()).sqrt() * (TAU * u2).cos()
}

/// Uniform along X, gaussian-biased radial offset in YZ so density
/// concentrates around the horizontal centre line.
fn sample_position(rng: &mut impl Rng) -> DVec3 {
	let t: f64 = rng.gen_range(0.0..1.0);
	let x = (t - 0.5) * 100.0;
	let spread = 0.5 + t * 0.5;

	let angle = rng.gen_range(0.0..TAU);
	let radius = (gaussian(rng).abs() / 3.0 * 12.0).min(12.0) * spread;

	DVec3::new(x, angle.sin() * radius, angle.cos() * radius * 0.3)
}

fn is_separated(candidate: DVec3, placed: &[DVec3], min_distance: f64) -> bool {
	placed
		.iter()
		.all(|p| p.distance(candidate) >= min_distance)
}

/// Places up to `target_count` positions, giving up after `max_attempts`
/// samples. O(n²) in the node count.
pub fn place_positions(config: &MeshConfig, rng: &mut impl Rng) -> Vec<DVec3> {
	let nodes = &config.nodes;
	let mut placed = Vec::with_capacity(nodes.target_count);
	let mut attempts = 0;

	while placed.len() < nodes.target_count && attempts < nodes.max_attempts {
		attempts += 1;
		let candidate = sample_position(rng);
		if is_separated(candidate, &placed, nodes.min_distance) {
			placed.push(candidate);
		}
	}

	if placed.len() < nodes.target_count {
		log::debug!(
			"placed {}/{} nodes after {} attempts",
			placed.len(),
			nodes.target_count,
			attempts
		);
	}
	placed
}

pub(crate) fn node_opacity(config: &MeshConfig, theme: Theme, x: f64) -> f64 {
	config.nodes.opacity.pick(theme).at((x + 45.0) / 90.0)
}

pub(crate) fn edge_opacity(config: &MeshConfig, theme: Theme, mid_x: f64) -> f64 {
	config.edges.opacity.pick(theme).at(mid_x / 45.0 + 0.5)
}

/// Builds nodes at the given positions, allocating one sphere per node.
pub fn build_nodes<S: DrawSurface + ?Sized>(
	positions: Vec<DVec3>,
	config: &MeshConfig,
	theme: Theme,
	rng: &mut impl Rng,
	surface: &mut S,
) -> Vec<Node> {
	let kind = PrimitiveKind::Sphere {
		radius: config.nodes.radius,
	};
	positions
		.into_iter()
		.map(|position| {
			let material = Material {
				color: config.nodes.color.pick(theme),
				opacity: node_opacity(config, theme, position.x).clamp(0.0, 1.0),
			};
			Node {
				position,
				rendered: position,
				scale: 1.0,
				material,
				handle: surface.allocate(kind, &material),
				connections: Vec::new(),
				budget: 0,
				phase: rng.gen_range(0.0..TAU),
			}
		})
		.collect()
}

pub fn generate_nodes<S: DrawSurface + ?Sized>(
	config: &MeshConfig,
	theme: Theme,
	rng: &mut impl Rng,
	surface: &mut S,
) -> Vec<Node> {
	let positions = place_positions(config, rng);
	build_nodes(positions, config, theme, rng, surface)
}

struct Candidate {
	index: usize,
	distance: f64,
	bearing: f64,
}

/// True when `bearing` is at least `separation` away from every accepted
/// bearing, measured both ways round the circle.
fn spreads_out(bearing: f64, accepted: &[f64], separation: f64) -> bool {
	accepted.iter().all(|&prev| {
		let diff = (bearing - prev).abs();
		diff >= separation && diff <= 2.0 * PI - separation
	})
}

/// Connects nodes in index order. Budgets and connection lists are mutated
/// in place, so the result depends on node order.
pub fn generate_edges<S: DrawSurface + ?Sized>(
	nodes: &mut [Node],
	config: &MeshConfig,
	theme: Theme,
	rng: &mut impl Rng,
	surface: &mut S,
) -> Vec<Edge> {
	let mut edges = Vec::new();
	for node in nodes.iter_mut() {
		node.budget = config.budget.budget_for(rng.gen_range(0.0..1.0));
	}

	for i in 0..nodes.len() {
		if nodes[i].connections.len() >= nodes[i].budget {
			continue;
		}

		let origin = nodes[i].position;
		let mut candidates: Vec<Candidate> = nodes
			.iter()
			.enumerate()
			.filter(|(j, other)| {
				*j != i
					&& other.connections.len() < other.budget
					&& !nodes[i].connections.contains(j)
			})
			.filter_map(|(j, other)| {
				let distance = origin.distance(other.position);
				(distance < config.edges.max_distance).then(|| {
					let delta = other.position - origin;
					Candidate {
						index: j,
						distance,
						bearing: delta.y.atan2(delta.x),
					}
				})
			})
			.collect();
		candidates.sort_by(|a, b| a.distance.total_cmp(&b.distance));

		let target = if rng.gen_bool(0.5) { 4 } else { 3 };
		let to_make = (nodes[i].budget - nodes[i].connections.len())
			.min(candidates.len())
			.min(target);

		let mut bearings: Vec<f64> = Vec::with_capacity(to_make);
		for candidate in &candidates {
			if bearings.len() >= to_make {
				break;
			}
			let first = bearings.is_empty();
			if !first
				&& !spreads_out(
					candidate.bearing,
					&bearings,
					config.edges.min_angle_separation,
				) {
				continue;
			}
			bearings.push(candidate.bearing);

			let j = candidate.index;
			let (a, b) = (nodes[i].position, nodes[j].position);
			let material = Material {
				color: config.edges.color.pick(theme),
				opacity: edge_opacity(config, theme, (a.x + b.x) * 0.5).clamp(0.0, 1.0),
			};
			edges.push(Edge {
				start: i,
				end: j,
				points: [a, b],
				material,
				handle: surface.allocate(PrimitiveKind::Line, &material),
			});
			nodes[i].connections.push(j);
			nodes[j].connections.push(i);
		}
	}

	edges
}

#[cfg(test)]
mod tests {
	use rand::SeedableRng;
	use rand::rngs::SmallRng;

	use super::*;
	use crate::components::network_mesh::host::testing::RecordingSurface;

	fn mesh(seed: u64) -> (Vec<Node>, Vec<Edge>, RecordingSurface) {
		let config = MeshConfig::default();
		let mut rng = SmallRng::seed_from_u64(seed);
		let mut surface = RecordingSurface::default();
		let mut nodes = generate_nodes(&config, Theme::Light, &mut rng, &mut surface);
		let edges = generate_edges(&mut nodes, &config, Theme::Light, &mut rng, &mut surface);
		(nodes, edges, surface)
	}

	#[test]
	fn nodes_respect_min_distance() {
		let config = MeshConfig::default();
		for seed in 0..20 {
			let positions = place_positions(&config, &mut SmallRng::seed_from_u64(seed));
			assert!(!positions.is_empty());
			assert!(positions.len() <= config.nodes.target_count);
			for (i, a) in positions.iter().enumerate() {
				for b in &positions[i + 1..] {
					assert!(a.distance(*b) >= config.nodes.min_distance);
				}
			}
		}
	}

	#[test]
	fn attempt_budget_caps_placement() {
		let mut config = MeshConfig::default();
		config.nodes.target_count = 1000;
		config.nodes.max_attempts = 50;
		let positions = place_positions(&config, &mut SmallRng::seed_from_u64(7));
		assert!(positions.len() <= 50);
	}

	#[test]
	fn separation_is_inclusive() {
		let a = DVec3::ZERO;
		let b = DVec3::new(4.0, 0.0, 0.0);
		assert!(is_separated(b, &[a], 4.0));
		assert!(!is_separated(DVec3::new(3.999, 0.0, 0.0), &[a], 4.0));
	}

	#[test]
	fn positions_stay_inside_sampling_envelope() {
		let mut rng = SmallRng::seed_from_u64(3);
		for _ in 0..1000 {
			let p = sample_position(&mut rng);
			assert!((-50.0..50.0).contains(&p.x));
			assert!(p.y.abs() <= 12.0 + 1e-9);
			assert!(p.z.abs() <= 3.6 + 1e-9);
		}
	}

	#[test]
	fn edges_are_symmetric_and_within_budget() {
		for seed in 0..20 {
			let (nodes, edges, _) = mesh(seed);
			for edge in &edges {
				assert_ne!(edge.start, edge.end);
				assert!(nodes[edge.start].connections.contains(&edge.end));
				assert!(nodes[edge.end].connections.contains(&edge.start));
			}
			for (i, node) in nodes.iter().enumerate() {
				assert!(node.connections.len() <= node.budget, "node {i} over budget");
				for &j in &node.connections {
					assert!(nodes[j].connections.contains(&i));
				}
			}
			let degree_sum: usize = nodes.iter().map(|n| n.connections.len()).sum();
			assert_eq!(degree_sum, edges.len() * 2);
		}
	}

	#[test]
	fn edges_respect_max_distance() {
		let config = MeshConfig::default();
		let (nodes, edges, _) = mesh(11);
		for edge in &edges {
			let d = nodes[edge.start].position.distance(nodes[edge.end].position);
			assert!(d < config.edges.max_distance);
		}
	}

	#[test]
	fn same_seed_same_graph() {
		let (_, a, _) = mesh(42);
		let (_, b, _) = mesh(42);
		let pairs = |edges: &[Edge]| edges.iter().map(|e| (e.start, e.end)).collect::<Vec<_>>();
		assert_eq!(pairs(&a), pairs(&b));
	}

	#[test]
	fn no_nodes_no_edges() {
		let config = MeshConfig::default();
		let mut surface = RecordingSurface::default();
		let mut rng = SmallRng::seed_from_u64(1);
		let mut nodes = build_nodes(Vec::new(), &config, Theme::Dark, &mut rng, &mut surface);
		let edges = generate_edges(&mut nodes, &config, Theme::Dark, &mut rng, &mut surface);
		assert!(edges.is_empty());
		assert_eq!(surface.live(), 0);
	}

	#[test]
	fn saturated_node_is_never_a_candidate() {
		let mut config = MeshConfig::default();
		config.budget.hub_chance = 0.0;
		config.budget.medium_chance = 0.0;
		// spokes only reach the hub, which fills up before its own pass
		config.edges.max_distance = 6.0;
		let mut surface = RecordingSurface::default();
		let mut rng = SmallRng::seed_from_u64(5);
		let positions = vec![
			DVec3::new(5.0, 0.0, 0.0),
			DVec3::new(0.0, 5.0, 0.0),
			DVec3::new(-5.0, 0.0, 0.0),
			DVec3::new(0.0, -5.0, 0.0),
			DVec3::ZERO,
			DVec3::new(0.0, 0.0, 4.0),
		];
		let mut nodes = build_nodes(positions, &config, Theme::Light, &mut rng, &mut surface);
		let edges = generate_edges(&mut nodes, &config, Theme::Light, &mut rng, &mut surface);

		assert!(nodes.iter().all(|n| n.budget == 4));
		assert_eq!(nodes[4].connections, vec![0, 1, 2, 3]);
		// within reach of the hub only, which is already full
		assert!(nodes[5].connections.is_empty());
		assert_eq!(edges.len(), 4);
	}

	#[test]
	fn bearings_must_spread_from_every_accepted_edge() {
		let sep = PI / 6.0;
		assert!(spreads_out(1.0, &[], sep));
		assert!(spreads_out(PI / 2.0, &[0.0], sep));
		assert!(!spreads_out(0.1, &[0.0], sep));
		// near-parallel to the second accepted bearing only
		assert!(!spreads_out(PI / 2.0 + 0.1, &[0.0, PI / 2.0], sep));
		// -π and +π point the same way
		assert!(!spreads_out(PI - 0.05, &[-PI + 0.05], sep));
	}

	#[test]
	fn every_primitive_gets_a_handle() {
		let (nodes, edges, surface) = mesh(9);
		assert_eq!(surface.live(), nodes.len() + edges.len());
	}
}
