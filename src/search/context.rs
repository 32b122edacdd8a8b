//! The context handed to user `transition_guard`/`direction_bias` callbacks
//! during search (§4.5), plus the built-in obtuse-turn filter.

use std::sync::Arc;

use crate::chain::CompactedEdge;
use crate::coordinate::{Coordinate, VKey};
use crate::error::SearchError;

/// A 2D direction vector (elevation is ignored for turn geometry).
pub type Vector2 = (f64, f64);

fn vector(from: Coordinate, to: Coordinate) -> Vector2 {
	(to.x - from.x, to.y - from.y)
}

fn dot(a: Vector2, b: Vector2) -> f64 {
	a.0 * b.0 + a.1 * b.1
}

fn norm(v: Vector2) -> f64 {
	(v.0 * v.0 + v.1 * v.1).sqrt()
}

/// The direction an edge leaves its start vertex: the vector from the start
/// coordinate to the first recorded intermediate/destination coordinate.
fn exit_vector(edge: &CompactedEdge, from: Coordinate) -> Vector2 {
	match edge.coordinates.first() {
		Some(&c) => vector(from, c),
		None => (0.0, 0.0),
	}
}

/// The direction an edge arrives at its end vertex: the vector of its last
/// recorded segment.
fn entry_vector(edge: &CompactedEdge, from: Coordinate) -> Vector2 {
	let n = edge.coordinates.len();
	if n >= 2 {
		vector(edge.coordinates[n - 2], edge.coordinates[n - 1])
	} else if n == 1 {
		vector(from, edge.coordinates[0])
	} else {
		(0.0, 0.0)
	}
}

/// Everything a transition callback needs to judge one candidate step of the
/// search, from `from` to `to` via `edge`, while extending a path that so
/// far cost `cost_so_far` to reach `from`.
pub struct TraversalContext<'a> {
	pub from: &'a VKey,
	pub to: &'a VKey,
	pub goal: &'a VKey,
	pub edge: &'a CompactedEdge,
	pub cost_so_far: f64,
	/// Coordinate of `from`, needed to walk the edge's own internal bends.
	pub from_coord: Coordinate,
	/// Direction of travel leaving `from` along `edge`.
	pub from_to_vector: Vector2,
	/// Direction from `from` straight to the goal.
	pub from_goal_vector: Vector2,
	/// Direction from `to` straight to the goal.
	pub to_goal_vector: Vector2,
	/// The vertex visited immediately before `from`, if any.
	pub previous: Option<&'a VKey>,
	/// Direction of travel arriving at `from` along the edge used to reach
	/// it, if `from` isn't the search origin.
	pub previous_to_from_vector: Option<Vector2>,
	/// Direction of travel arriving at `previous` along the edge used to
	/// reach it, if a second predecessor level exists.
	pub previous_previous_to_previous_vector: Option<Vector2>,
}

impl<'a> TraversalContext<'a> {
	#[allow(clippy::too_many_arguments)]
	pub fn new(
		from: &'a VKey,
		to: &'a VKey,
		goal: &'a VKey,
		edge: &'a CompactedEdge,
		cost_so_far: f64,
		from_coord: Coordinate,
		to_coord: Coordinate,
		goal_coord: Coordinate,
		previous: Option<&'a VKey>,
		previous_edge: Option<(&'a CompactedEdge, Coordinate)>,
		previous_previous_edge: Option<(&'a CompactedEdge, Coordinate)>,
	) -> Self {
		Self {
			from,
			to,
			goal,
			edge,
			cost_so_far,
			from_coord,
			from_to_vector: exit_vector(edge, from_coord),
			from_goal_vector: vector(from_coord, goal_coord),
			to_goal_vector: vector(to_coord, goal_coord),
			previous,
			previous_to_from_vector: previous_edge.map(|(pe, pfrom)| entry_vector(pe, pfrom)),
			previous_previous_to_previous_vector: previous_previous_edge.map(|(ppe, ppfrom)| entry_vector(ppe, ppfrom)),
		}
	}
}

/// A user callback that may reject a candidate transition outright (§4.5
/// "transitionGuard"). Errors abort the whole search.
pub type TransitionGuard = Arc<dyn Fn(&TraversalContext) -> Result<bool, SearchError> + Send + Sync>;

/// A user callback that adds an extra, non-negative cost bias to a
/// candidate transition (§4.5 "directionBias"). Errors abort the whole
/// search.
pub type DirectionBias = Arc<dyn Fn(&TraversalContext) -> Result<f64, SearchError> + Send + Sync>;

/// A callback invoked once per accepted pop during search, immediately
/// before the goal check (§4.5 "onNodeExpanded").
pub type NodeExpandedCallback = Arc<dyn Fn(&VKey, f64) + Send + Sync>;

/// Whether the turn from direction `a` to direction `b` is obtuse enough to
/// pass the "no doubling back" filter: true unless the turn bends back more
/// than 90 degrees.
fn turn_is_acceptable(a: Vector2, b: Vector2) -> bool {
	let (na, nb) = (norm(a), norm(b));
	if na == 0.0 || nb == 0.0 {
		return true;
	}
	dot(a, b) / (na * nb) > 0.0
}

/// The built-in "no doubling back" filter (§4.6): rejects a transition if
/// the previous-previous-to-previous heading (if available), the
/// previous-to-from heading, or any consecutive triple of points along the
/// candidate edge's own internal geometry turns back more than 90 degrees.
pub fn obtuse_turn_guard(ctx: &TraversalContext) -> Result<bool, SearchError> {
	if let (Some(pp_to_p), Some(p_to_from)) = (ctx.previous_previous_to_previous_vector, ctx.previous_to_from_vector) {
		if !turn_is_acceptable(pp_to_p, p_to_from) {
			return Ok(false);
		}
	}
	if let Some(incoming) = ctx.previous_to_from_vector {
		if !turn_is_acceptable(incoming, ctx.from_to_vector) {
			return Ok(false);
		}
	}
	let mut points = Vec::with_capacity(ctx.edge.coordinates.len() + 1);
	points.push(ctx.from_coord);
	points.extend(ctx.edge.coordinates.iter().copied());
	for w in points.windows(3) {
		if !turn_is_acceptable(vector(w[0], w[1]), vector(w[1], w[2])) {
			return Ok(false);
		}
	}
	Ok(true)
}
