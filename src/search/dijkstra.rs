//! Plain Dijkstra: the shared search loop with a zero heuristic.

use super::context::{DirectionBias, NodeExpandedCallback, TransitionGuard};
use super::{run, SearchOutcome};
use crate::compact::CompactedGraph;
use crate::coordinate::VKey;
use crate::error::SearchError;
use crate::phantom::PhantomOverlay;

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
	run(graph, overlay, start, goal, |_| 0.0, transition_guard, direction_bias, obtuse_turn_filter, on_node_expanded)
}
