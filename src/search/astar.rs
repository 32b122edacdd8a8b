//! A*: the shared search loop biased by a haversine-distance-to-goal
//! heuristic, admissible as long as edge weights are themselves
//! distance-like (§4.5 "A* heuristic").

use geo::prelude::HaversineDistance;
use geo::Point;

use super::context::{DirectionBias, NodeExpandedCallback, TransitionGuard};
use super::{run, SearchOutcome};
use crate::compact::CompactedGraph;
use crate::coordinate::VKey;
use crate::error::SearchError;
use crate::phantom::{coordinate_of, PhantomOverlay};

/// `geo`'s `haversine_distance` returns meters; the heuristic is specified
/// in kilometers (§4.5) so it stays admissible against a `weight` callback
/// written in the spec's own distance vocabulary.
const METERS_PER_KILOMETER: f64 = 1000.0;

#[allow(clippy::too_many_arguments)]
pub fn search(
	graph: &CompactedGraph,
	overlay: &PhantomOverlay,
	start: &VKey,
	goal: &VKey,
	transition_guard: Option<&TransitionGuard>,
	direction_bias: Option<&DirectionBias>,
	obtuse_turn_filter: bool,
	on_node_expanded: Option<&NodeExpandedCallback>,
) -> Result<Option<SearchOutcome>, SearchError> {
	let goal_coord = match coordinate_of(graph, overlay, goal) {
		Some(c) => c,
		None => return Ok(None),
	};
	let goal_point: Point<f64> = goal_coord.into();

	let heuristic = |v: &VKey| -> f64 {
		match coordinate_of(graph, overlay, v) {
			Some(c) => {
				let p: Point<f64> = c.into();
				p.haversine_distance(&goal_point) / METERS_PER_KILOMETER
			}
			None => 0.0,
		}
	};

	run(graph, overlay, start, goal, heuristic, transition_guard, direction_bias, obtuse_turn_filter, on_node_expanded)
}
