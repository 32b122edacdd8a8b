//! Phantom-node injection (§4.4), implemented as an overlay rather than an
//! in-place mutation of the shared compacted graph.
//!
//! §9's design note points out that mutating the shared graph forces every
//! search to acquire/release phantoms under a non-reentrancy constraint
//! (§5). Here a fresh, empty [`PhantomOverlay`] is built for each search and
//! consulted by [`neighbors`] *before* the base graph; once the overlay is
//! dropped at the end of the search, the mutation vanishes with it — there
//! is no `_removePhantom` step and no scoped-release obligation to get
//! wrong on an early return or an aborted search.

use indexmap::IndexMap;

use crate::chain::{materialize, walk_chain, CompactedEdge};
use crate::compact::CompactedGraph;
use crate::coordinate::{Coordinate, VKey};
use crate::topology::{PayloadConfig, RawGraph};

/// Transient edges grafted onto the compacted graph for the duration of one
/// search.
#[derive(Default)]
pub struct PhantomOverlay {
	/// phantom key -> neighbor compacted vertex -> edges out of the phantom
	/// (a `Vec` since parallel raw edges can produce more than one route to
	/// the same neighbor, same as [`CompactedGraph`]).
	outgoing: IndexMap<VKey, IndexMap<VKey, Vec<CompactedEdge>>>,
	/// existing junction key -> phantom key -> edges into the phantom.
	incoming_on_junction: IndexMap<VKey, IndexMap<VKey, Vec<CompactedEdge>>>,
	coordinates: IndexMap<VKey, Coordinate>,
}

impl PhantomOverlay {
	pub fn new() -> Self {
		Self::default()
	}

	/// Grafts `k` into the overlay if it isn't already a compacted vertex.
	/// Returns `false` (§4.4 step 1, "no phantom") when nothing needed to
	/// change.
	pub fn inject(&mut self, graph: &CompactedGraph, raw: &RawGraph, payload_cfg: Option<&PayloadConfig>, k: &VKey) -> bool {
		if graph.is_vertex(k) || self.outgoing.contains_key(k) {
			return false;
		}
		let coord = match raw.source_coordinates.get(k) {
			Some(&c) => c,
			None => return false,
		};
		self.coordinates.insert(k.clone(), coord);

		let mut out_table: IndexMap<VKey, Vec<CompactedEdge>> = IndexMap::new();
		if let Some(out_edges) = raw.vertices.get(k) {
			for (x, &w) in out_edges {
				let (end, weight, walked) = walk_chain(raw, k, x, w, false);
				let edge = materialize(raw, walked, weight, false, payload_cfg);
				out_table.entry(end).or_default().push(edge);
			}
		}
		self.outgoing.insert(k.clone(), out_table);

		if let Some(in_edges) = raw.reverse_vertices.get(k) {
			for (y, &w) in in_edges {
				let (end, weight, walked) = walk_chain(raw, k, y, w, true);
				let edge = materialize(raw, walked, weight, true, payload_cfg);
				self.incoming_on_junction.entry(end).or_default().entry(k.clone()).or_default().push(edge);
			}
		}
		true
	}

	pub fn coordinate_of(&self, k: &VKey) -> Option<Coordinate> {
		self.coordinates.get(k).copied()
	}
}

/// The neighbors of `v` visible during this search: the base compacted
/// graph's own edges, plus any phantom-only edges the overlay contributes
/// (either `v` being a phantom with its own outgoing table, or `v` being a
/// real junction that gained an extra edge into a phantom).
pub fn neighbors(graph: &CompactedGraph, overlay: &PhantomOverlay, v: &VKey) -> Vec<(VKey, CompactedEdge)> {
	let mut out = Vec::new();
	if let Some(row) = graph.vertices.get(v) {
		for (k, edges) in row {
			out.extend(edges.iter().map(|e| (k.clone(), e.clone())));
		}
	}
	if let Some(row) = overlay.outgoing.get(v) {
		for (k, edges) in row {
			out.extend(edges.iter().map(|e| (k.clone(), e.clone())));
		}
	}
	if let Some(row) = overlay.incoming_on_junction.get(v) {
		for (k, edges) in row {
			out.extend(edges.iter().map(|e| (k.clone(), e.clone())));
		}
	}
	out
}

/// Resolves the geometry of `key`, checking the overlay first (for
/// phantoms) and falling back to the compacted graph's carried-through
/// source coordinates.
pub fn coordinate_of(graph: &CompactedGraph, overlay: &PhantomOverlay, key: &VKey) -> Option<Coordinate> {
	overlay.coordinate_of(key).or_else(|| graph.source_coordinates.get(key).copied())
}

#[cfg(test)]
mod test {
	use super::*;
	use crate::topology::{build_raw_graph, PolylineFeature, TopologyOptions, WeightFn, WeightOutcome};
	use std::sync::Arc;

	fn euclid_weight() -> WeightFn {
		Arc::new(|a, b, _| {
			let (dx, dy) = (a.x - b.x, a.y - b.y);
			WeightOutcome::Symmetric((dx * dx + dy * dy).sqrt())
		})
	}

	#[test]
	fn injecting_a_midchain_point_grafts_both_directions() {
		let coords: Vec<_> = (0..5).map(|i| crate::coordinate::Coordinate::new_2d(i as f64, 0.0)).collect();
		let lines = vec![PolylineFeature { coordinates: coords, properties: serde_json::Value::Null }];
		let raw = build_raw_graph(&lines, &TopologyOptions::default(), &euclid_weight(), None, None);
		let compacted = crate::compact::compact(&raw, None, None);
		assert_eq!(compacted.vertices.len(), 2); // "0,0" and "4,0"

		let mut overlay = PhantomOverlay::new();
		let k = "2,0".to_string();
		assert!(overlay.inject(&compacted, &raw, None, &k));
		// phantom has outgoing edges to both real endpoints
		let out = neighbors(&compacted, &overlay, &k);
		assert_eq!(out.len(), 2);
		// both real junctions gained an edge into the phantom
		let from_start = neighbors(&compacted, &overlay, &"0,0".to_string());
		assert!(from_start.iter().any(|(to, _)| to == &k));
		let from_end = neighbors(&compacted, &overlay, &"4,0".to_string());
		assert!(from_end.iter().any(|(to, _)| to == &k));
	}

	#[test]
	fn injecting_an_existing_vertex_is_a_no_op() {
		let lines = vec![PolylineFeature {
			coordinates: vec![crate::coordinate::Coordinate::new_2d(0.0, 0.0), crate::coordinate::Coordinate::new_2d(1.0, 0.0)],
			properties: serde_json::Value::Null,
		}];
		let raw = build_raw_graph(&lines, &TopologyOptions::default(), &euclid_weight(), None, None);
		let compacted = crate::compact::compact(&raw, None, None);
		let mut overlay = PhantomOverlay::new();
		assert!(!overlay.inject(&compacted, &raw, None, &"0,0".to_string()));
	}
}
