//! Compactor (§4.3): collapses degree-two chains of the raw graph into a
//! smaller graph holding only junctions, dead-ends, and the walked-through
//! geometry/payload of the collapsed chains.

use indexmap::IndexMap;

use crate::chain::{materialize, walk_chain, CompactedEdge};
use crate::coordinate::{Coordinate, VKey};
use crate::topology::{PayloadConfig, ProgressFn, RawGraph};

/// The compacted graph: vertices are exactly the raw graph's junctions
/// (undirected degree != 2) plus any dead-end discovered mid-walk by a
/// one-way break. Source coordinates are carried through in full so
/// endpoint resolution (§4.6) can scan them.
/// Parallel routes between the same pair of junctions (e.g. two separate
/// ways across the same intersection) are kept side by side rather than
/// collapsed to the cheapest one, so a `directionBias` callback can still
/// choose between them at search time (§8 "Parallel alternative with
/// directionBias").
#[derive(Clone, Debug, Default)]
pub struct CompactedGraph {
	pub vertices: IndexMap<VKey, IndexMap<VKey, Vec<CompactedEdge>>>,
	pub source_coordinates: IndexMap<VKey, Coordinate>,
}

impl CompactedGraph {
	pub fn is_vertex(&self, key: &VKey) -> bool {
		self.vertices.contains_key(key)
	}

	fn insert_edge(&mut self, from: VKey, to: VKey, edge: CompactedEdge) {
		self.vertices.entry(from).or_default().entry(to).or_default().push(edge);
	}
}

/// Every vertex of the raw graph whose undirected degree is not exactly 2:
/// forks, dead-ends (degree 1), and isolated vertices (degree 0).
fn junctions(raw: &RawGraph) -> Vec<VKey> {
	raw.source_coordinates.keys().filter(|v| raw.undirected_degree(v) != 2).cloned().collect()
}

/// Collapses `raw` into a [`CompactedGraph`] (§4.3).
pub fn compact(raw: &RawGraph, payload_cfg: Option<&PayloadConfig>, progress: Option<&ProgressFn>) -> CompactedGraph {
	let mut out = CompactedGraph { vertices: IndexMap::new(), source_coordinates: raw.source_coordinates.clone() };

	let mut starts = junctions(raw);
	if starts.is_empty() {
		// Every vertex has degree 2: a closed ring with no natural anchor.
		// Pick the first vertex in insertion order as an ad hoc junction so
		// the ring is still searchable (§4.3 "no junctions" edge case).
		if let Some(any) = raw.source_coordinates.keys().next() {
			starts.push(any.clone());
		}
	}

	for j in &starts {
		out.vertices.entry(j.clone()).or_default();
		let out_edges = match raw.vertices.get(j) {
			Some(e) => e,
			None => continue,
		};
		let total = out_edges.len();
		for (i, (neighbor, &w)) in out_edges.iter().enumerate() {
			let (end, weight, walked) = walk_chain(raw, j, neighbor, w, false);
			let edge = materialize(raw, walked, weight, false, payload_cfg);
			out.insert_edge(j.clone(), end, edge);
			if let Some(cb) = progress {
				cb("compact", i + 1, total);
			}
		}
	}

	log::debug!("compact: {} junctions, {} raw vertices", out.vertices.len(), raw.source_coordinates.len());
	out
}
