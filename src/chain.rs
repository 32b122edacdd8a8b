//! Shared chain-walking primitive used by both the compactor (§4.3) and the
//! phantom injector (§4.4): starting from a vertex and a first hop, follow
//! degree-two ("compactable") vertices until a junction, another compacted
//! vertex, or the start itself (a self-loop) is reached.

use std::collections::HashSet;

use serde_json::Value;

use crate::coordinate::{Coordinate, VKey};
use crate::topology::{PayloadConfig, RawGraph};

/// A compacted directed edge `(u, v)`: cumulative weight, the intermediate
/// geometry (excluding `u`, including `v`'s coordinate last), and the
/// reduced payload (absent if no reducer was configured).
#[derive(Clone, Debug)]
pub struct CompactedEdge {
	pub weight: f64,
	pub coordinates: Vec<Coordinate>,
	pub payload: Option<Value>,
}

/// Whether a degree-two vertex `cur`, reached while walking away from
/// `came_from`, has a continuation edge in the direction we're walking.
/// Returns the next vertex and the weight of the edge to it, if so.
fn compactable_continue(raw: &RawGraph, cur: &VKey, came_from: &VKey, reverse: bool) -> Option<(VKey, f64)> {
	let neighbors = raw.undirected_neighbors(cur);
	if neighbors.len() != 2 {
		return None;
	}
	let other = neighbors.iter().find(|n| *n != came_from)?;
	let adj = if reverse { &raw.reverse_vertices } else { &raw.vertices };
	adj.get(cur).and_then(|m| m.get(other)).map(|w| (other.clone(), *w))
}

fn true_edge(from: &VKey, to: &VKey, reverse: bool) -> (VKey, VKey) {
	if reverse {
		(to.clone(), from.clone())
	} else {
		(from.clone(), to.clone())
	}
}

/// Walks from `start` via `first_hop` until a junction or a loop back to
/// `start` is reached.
///
/// `reverse` selects which raw adjacency drives the walk: `false` walks
/// along outgoing edges (used for normal compaction, and for a phantom's own
/// outgoing table); `true` walks along incoming edges (used to discover the
/// chain a neighboring junction would use to reach a freshly phantom-ed
/// vertex).
///
/// Returns the vertex the walk terminated at, the total weight, and the true
/// directed edges traversed **in walk order** (not yet corrected for
/// physical direction — see [`materialize`]).
pub fn walk_chain(raw: &RawGraph, start: &VKey, first_hop: &VKey, first_weight: f64, reverse: bool) -> (VKey, f64, Vec<(VKey, VKey)>) {
	let mut visited = HashSet::new();
	visited.insert(first_hop.clone());
	let mut true_edges = vec![true_edge(start, first_hop, reverse)];
	let mut total = first_weight;
	let mut prev = start.clone();
	let mut cur = first_hop.clone();
	loop {
		if cur == *start {
			break;
		}
		match compactable_continue(raw, &cur, &prev, reverse) {
			Some((next, w)) if next == *start || !visited.contains(&next) => {
				true_edges.push(true_edge(&cur, &next, reverse));
				total += w;
				prev = cur;
				cur = next;
				if cur != *start {
					visited.insert(cur.clone());
				}
			}
			_ => break,
		}
	}
	(cur, total, true_edges)
}

/// Turns the true edges discovered by [`walk_chain`] into a [`CompactedEdge`]
/// oriented from the walk's start to its end.
///
/// For a forward walk (`reverse == false`) the true edges already run in
/// physical order. For a backward walk (`reverse == true`) — used to derive
/// the incoming edge a neighboring junction gets onto a freshly injected
/// phantom — the true edges are discovered in the opposite order they're
/// physically traversed and must be reversed first.
pub fn materialize(raw: &RawGraph, true_edges_walk_order: Vec<(VKey, VKey)>, total_weight: f64, reverse: bool, payload_cfg: Option<&PayloadConfig>) -> CompactedEdge {
	let mut physical = true_edges_walk_order;
	if reverse {
		physical.reverse();
	}
	let mut coordinates = Vec::with_capacity(physical.len());
	let mut payload: Option<Value> = None;
	for (from, to) in &physical {
		coordinates.push(raw.source_coordinates[to]);
		if let Some(cfg) = payload_cfg {
			if let Some(edge_payload) = raw.edge_payloads.get(&(from.clone(), to.clone())) {
				payload = Some(match payload {
					None => edge_payload.clone(),
					Some(acc) => (cfg.reduce)(&acc, edge_payload),
				});
			}
		}
	}
	CompactedEdge { weight: total_weight, coordinates, payload }
}

#[cfg(test)]
mod test {
	use super::*;
	use crate::coordinate::Coordinate;
	use indexmap::IndexMap;

	fn chain_graph() -> RawGraph {
		let mut g = RawGraph::default();
		let pts = [("j1", 0.0), ("m1", 1.0), ("m2", 2.0), ("j2", 3.0)];
		for (k, x) in &pts {
			g.source_coordinates.insert((*k).into(), Coordinate::new_2d(*x, 0.0));
		}
		let mut insert = |a: &str, b: &str, w: f64| {
			g.vertices.entry(a.into()).or_insert_with(IndexMap::new).insert(b.into(), w);
			g.reverse_vertices.entry(b.into()).or_insert_with(IndexMap::new).insert(a.into(), w);
		};
		insert("j1", "m1", 1.0);
		insert("m1", "m2", 1.0);
		insert("m2", "j2", 1.0);
		g
	}

	#[test]
	fn forward_walk_reaches_junction() {
		let g = chain_graph();
		let (end, weight, edges) = walk_chain(&g, &"j1".to_string(), &"m1".to_string(), 1.0, false);
		assert_eq!(end, "j2");
		assert_eq!(weight, 3.0);
		let edge = materialize(&g, edges, weight, false, None);
		assert_eq!(edge.coordinates.len(), 3);
		assert_eq!(edge.coordinates.last().unwrap(), &Coordinate::new_2d(3.0, 0.0));
	}

	#[test]
	fn backward_walk_produces_physical_order_ending_at_k() {
		let g = chain_graph();
		// Simulate phantom injection at m2: discover the incoming edge from j1.
		let (end, weight, edges) = walk_chain(&g, &"m2".to_string(), &"m1".to_string(), 1.0, true);
		assert_eq!(end, "j1");
		assert_eq!(weight, 2.0);
		let edge = materialize(&g, edges, weight, true, None);
		assert_eq!(edge.coordinates, vec![Coordinate::new_2d(1.0, 0.0), Coordinate::new_2d(2.0, 0.0)]);
	}
}
