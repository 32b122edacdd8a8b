//! The public facade (§4.6): builds a network once, then answers repeated
//! `find_path` queries against it.

use serde_json::Value;

use crate::compact::{compact, CompactedGraph};
use crate::coordinate::{key_for, Coordinate, KeyFn, VKey};
use crate::error::PathFinderError;
use crate::phantom::{coordinate_of, PhantomOverlay};
use crate::search::context::{DirectionBias, NodeExpandedCallback, TransitionGuard};
use crate::search::{astar, dijkstra};
use crate::topology::{build_raw_graph, PayloadConfig, PolylineFeature, ProgressFn, RawGraph, TopologyOptions, WeightFn};

/// Construction-time options (§4.1/§4.2 knobs exposed to the facade).
pub struct PathFinderOptions {
	pub tolerance: f64,
	pub key: Option<KeyFn>,
	pub payload: Option<PayloadConfig>,
	pub progress: Option<ProgressFn>,
}

impl Default for PathFinderOptions {
	fn default() -> Self {
		Self { tolerance: 1e-5, key: None, payload: None, progress: None }
	}
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SearchAlgorithm {
	Dijkstra,
	AStar,
}

/// Per-query search options (§4.5).
#[derive(Clone)]
pub struct SearchOptions {
	pub algorithm: SearchAlgorithm,
	pub transition_guard: Option<TransitionGuard>,
	pub direction_bias: Option<DirectionBias>,
	/// Whether the built-in "no doubling back" filter runs alongside
	/// `transition_guard`. Defaults to on; see [`SearchOptions::default`].
	pub obtuse_turn_filter: bool,
	/// Invoked exactly once per accepted pop, immediately before the goal
	/// check (§4.5 "onNodeExpanded"). Useful for progress reporting or
	/// visualizing the search frontier.
	pub on_node_expanded: Option<NodeExpandedCallback>,
}

impl Default for SearchOptions {
	fn default() -> Self {
		// A* by default: edge weights produced by a typical `weight`
		// callback are distance-like, so the haversine heuristic is
		// admissible and strictly cuts down on expanded vertices. Callers
		// whose weight isn't distance-like (e.g. time under variable speed
		// limits) should ask for `Dijkstra` explicitly.
		Self { algorithm: SearchAlgorithm::AStar, transition_guard: None, direction_bias: None, obtuse_turn_filter: true, on_node_expanded: None }
	}
}

/// A found path: full coordinate sequence (including the query's own start
/// coordinate), one payload slot per traversed compacted edge, and total
/// cost.
#[derive(Clone, Debug)]
pub struct Path {
	pub coordinates: Vec<Coordinate>,
	pub edge_payloads: Vec<Option<Value>>,
	pub cost: f64,
}

/// A preprocessed network, ready to answer `find_path` queries.
#[derive(Clone)]
pub struct PathFinder {
	raw: RawGraph,
	compacted: CompactedGraph,
	tolerance: f64,
	key: Option<KeyFn>,
	payload: Option<PayloadConfig>,
}

impl PathFinder {
	/// Builds a network from polylines (§4.2 + §4.3 in one step).
	pub fn new(polylines: &[PolylineFeature], weight: &WeightFn, options: PathFinderOptions) -> Self {
		let topo_opts = TopologyOptions { tolerance: options.tolerance, key: options.key.clone() };
		let raw = build_raw_graph(polylines, &topo_opts, weight, options.payload.as_ref(), options.progress.as_ref());
		let compacted = compact(&raw, options.payload.as_ref(), options.progress.as_ref());
		log::info!("path finder ready: {} junctions over {} raw vertices", compacted.vertices.len(), raw.source_coordinates.len());
		Self { raw, compacted, tolerance: options.tolerance, key: options.key, payload: options.payload }
	}

	/// Wraps an already-built raw/compacted graph pair, e.g. one restored
	/// from a cache, without re-running preprocessing.
	pub fn from_preprocessed(raw: RawGraph, compacted: CompactedGraph, tolerance: f64, key: Option<KeyFn>, payload: Option<PayloadConfig>) -> Self {
		Self { raw, compacted, tolerance, key, payload }
	}

	/// Resolves a query coordinate to a vertex key (§4.6 "Endpoint
	/// resolution"): an exact tolerance-rounded match first, then a scan
	/// for raw vertices within `tolerance` of the coordinate. `Ok(None)`
	/// means no vertex is within tolerance — per §7 this is "no path", not
	/// an error.
	fn resolve_endpoint(&self, coord: Coordinate) -> Result<Option<VKey>, PathFinderError> {
		let (key, _rounded) = key_for(&coord, self.tolerance, self.key.as_ref());
		if self.compacted.is_vertex(&key) || self.raw.source_coordinates.contains_key(&key) {
			return Ok(Some(key));
		}
		let mut candidates: Vec<VKey> = self
			.raw
			.source_coordinates
			.iter()
			.filter(|(_, c)| {
				let (dx, dy) = (c.x - coord.x, c.y - coord.y);
				(dx * dx + dy * dy).sqrt() <= self.tolerance
			})
			.map(|(k, _)| k.clone())
			.collect();
		match candidates.len() {
			0 => Ok(None),
			1 => Ok(Some(candidates.remove(0))),
			_ => {
				candidates.sort();
				Err(PathFinderError::AmbiguousEndpoint { candidates })
			}
		}
	}

	/// Finds the cheapest path from `start` to `goal` (§4.5, §4.6). Returns
	/// `Ok(None)` if the network is connected but no route exists between
	/// the resolved endpoints.
	pub fn find_path(&self, start: Coordinate, goal: Coordinate, options: &SearchOptions) -> Result<Option<Path>, PathFinderError> {
		let start_key = match self.resolve_endpoint(start)? {
			Some(k) => k,
			None => return Ok(None),
		};
		let goal_key = match self.resolve_endpoint(goal)? {
			Some(k) => k,
			None => return Ok(None),
		};
		log::debug!("find_path: {} -> {} via {:?}", start_key, goal_key, options.algorithm);

		let mut overlay = PhantomOverlay::new();
		overlay.inject(&self.compacted, &self.raw, self.payload.as_ref(), &start_key);
		overlay.inject(&self.compacted, &self.raw, self.payload.as_ref(), &goal_key);

		let outcome = match options.algorithm {
			SearchAlgorithm::Dijkstra => dijkstra::search(
				&self.compacted,
				&overlay,
				&start_key,
				&goal_key,
				options.transition_guard.as_ref(),
				options.direction_bias.as_ref(),
				options.obtuse_turn_filter,
				options.on_node_expanded.as_ref(),
			)?,
			SearchAlgorithm::AStar => astar::search(
				&self.compacted,
				&overlay,
				&start_key,
				&goal_key,
				options.transition_guard.as_ref(),
				options.direction_bias.as_ref(),
				options.obtuse_turn_filter,
				options.on_node_expanded.as_ref(),
			)?,
		};

		let outcome = match outcome {
			Some(o) => o,
			None => {
				log::debug!("find_path: no route between {} and {}", start_key, goal_key);
				return Ok(None);
			}
		};

		let start_coord = coordinate_of(&self.compacted, &overlay, &start_key).unwrap_or(start);
		let mut coordinates = Vec::with_capacity(outcome.edges.iter().map(|e| e.coordinates.len()).sum::<usize>() + 1);
		coordinates.push(start_coord);
		let mut edge_payloads: Vec<Option<Value>> = Vec::with_capacity(outcome.edges.len());
		for edge in &outcome.edges {
			coordinates.extend(edge.coordinates.iter().copied());
			edge_payloads.push(edge.payload.clone());
		}

		Ok(Some(Path { coordinates, edge_payloads, cost: outcome.cost }))
	}

	pub fn vertex_count(&self) -> usize {
		self.compacted.vertices.len()
	}

	pub fn raw_vertex_count(&self) -> usize {
		self.raw.source_coordinates.len()
	}
}
