//! The search engine (§4.5): a single relaxation/pop loop shared by plain
//! Dijkstra and A*, the two differing only in the heuristic fed to the
//! priority queue.

pub mod astar;
pub mod context;
pub mod dijkstra;

use std::cmp::Reverse;
use std::collections::HashSet;

use indexmap::IndexMap;
use noisy_float::types::n64;
use priority_queue::PriorityQueue;

use crate::chain::CompactedEdge;
use crate::compact::CompactedGraph;
use crate::coordinate::VKey;
use crate::error::SearchError;
use crate::phantom::{coordinate_of, neighbors, PhantomOverlay};
use context::{DirectionBias, NodeExpandedCallback, TransitionGuard, TraversalContext};

/// A found path: the vertex sequence and the compacted edges joining
/// consecutive vertices (`edges.len() == vertices.len() - 1`), plus the
/// total cost.
#[derive(Clone, Debug)]
pub struct SearchOutcome {
	pub vertices: Vec<VKey>,
	pub edges: Vec<CompactedEdge>,
	pub cost: f64,
}

/// Runs the shared search loop. `heuristic` returns an admissible
/// lower-bound estimate of the remaining cost from a vertex to the goal;
/// passing a constant `0.0` recovers plain Dijkstra.
#[allow(clippy::too_many_arguments)]
pub fn run<H>(
	graph: &CompactedGraph,
	overlay: &PhantomOverlay,
	start: &VKey,
	goal: &VKey,
	heuristic: H,
	transition_guard: Option<&TransitionGuard>,
	direction_bias: Option<&DirectionBias>,
	obtuse_turn_filter: bool,
	on_node_expanded: Option<&NodeExpandedCallback>,
) -> Result<Option<SearchOutcome>, SearchError>
where
	H: Fn(&VKey) -> f64,
{
	let goal_coord = match coordinate_of(graph, overlay, goal) {
		Some(c) => c,
		None => return Ok(None),
	};
	if coordinate_of(graph, overlay, start).is_none() {
		return Ok(None);
	}
	if start == goal {
		return Ok(Some(SearchOutcome { vertices: vec![start.clone()], edges: Vec::new(), cost: 0.0 }));
	}

	let mut dist: IndexMap<VKey, f64> = IndexMap::new();
	let mut prev: IndexMap<VKey, (VKey, CompactedEdge)> = IndexMap::new();
	let mut closed: HashSet<VKey> = HashSet::new();
	let mut queue: PriorityQueue<VKey, Reverse<noisy_float::types::N64>> = PriorityQueue::new();

	dist.insert(start.clone(), 0.0);
	queue.push(start.clone(), Reverse(n64(heuristic(start))));

	while let Some((u, _)) = queue.pop() {
		if closed.contains(&u) {
			continue;
		}
		let u_cost = dist[&u];
		if let Some(cb) = on_node_expanded {
			cb(&u, u_cost);
		}
		if u == *goal {
			return Ok(Some(reconstruct(&u, &prev, u_cost)));
		}
		closed.insert(u.clone());

		let u_coord = match coordinate_of(graph, overlay, &u) {
			Some(c) => c,
			None => continue,
		};
		let previous = prev.get(&u).map(|(p, _)| p);
		let previous_edge = prev.get(&u).and_then(|(p, e)| coordinate_of(graph, overlay, p).map(|pc| (e, pc)));
		let previous_previous_edge = previous
			.and_then(|p| prev.get(p))
			.and_then(|(pp, ppe)| coordinate_of(graph, overlay, pp).map(|ppc| (ppe, ppc)));

		for (to, edge) in neighbors(graph, overlay, &u) {
			if closed.contains(&to) {
				continue;
			}
			let to_coord = match coordinate_of(graph, overlay, &to) {
				Some(c) => c,
				None => continue,
			};
			let ctx = TraversalContext::new(&u, &to, goal, &edge, u_cost, u_coord, to_coord, goal_coord, previous, previous_edge, previous_previous_edge);

			if obtuse_turn_filter && !context::obtuse_turn_guard(&ctx)? {
				continue;
			}
			if let Some(guard) = transition_guard {
				if !guard(&ctx)? {
					continue;
				}
			}
			let mut step_cost = edge.weight;
			if let Some(bias) = direction_bias {
				step_cost += bias(&ctx)?;
			}
			let new_cost = u_cost + step_cost;
			let better = dist.get(&to).map_or(true, |&existing| new_cost < existing);
			if better {
				dist.insert(to.clone(), new_cost);
				prev.insert(to.clone(), (u.clone(), edge.clone()));
				queue.push(to.clone(), Reverse(n64(new_cost + heuristic(&to))));
			}
		}
	}

	Ok(None)
}

fn reconstruct(goal: &VKey, prev: &IndexMap<VKey, (VKey, CompactedEdge)>, cost: f64) -> SearchOutcome {
	let mut vertices = vec![goal.clone()];
	let mut edges = Vec::new();
	let mut cur = goal.clone();
	while let Some((p, e)) = prev.get(&cur) {
		edges.push(e.clone());
		vertices.push(p.clone());
		cur = p.clone();
	}
	vertices.reverse();
	edges.reverse();
	SearchOutcome { vertices, edges, cost }
}
