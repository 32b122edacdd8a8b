//! Topology builder (§4.2): turns a collection of polylines into a raw
//! vertex/edge graph with forward/backward weights and per-edge payloads.

use std::sync::Arc;

use indexmap::IndexMap;
use serde_json::Value;

use crate::coordinate::{key_for, Coordinate, KeyFn, VKey};

/// One polyline feature: an ordered coordinate sequence plus an opaque
/// properties bag, handed to `weight` and to the payload seed.
#[derive(Clone, Debug)]
pub struct PolylineFeature {
	pub coordinates: Vec<Coordinate>,
	pub properties: Value,
}

/// The result of a user `weight` callback for one directed segment.
#[derive(Clone, Copy, Debug)]
pub enum WeightOutcome {
	/// The segment cannot be traversed in either direction.
	Impassable,
	/// Both directions are traversable at the same cost.
	Symmetric(f64),
	/// Each direction is independently traversable (or not).
	Asymmetric { forward: Option<f64>, backward: Option<f64> },
}

pub type WeightFn = Arc<dyn Fn(&Coordinate, &Coordinate, &Value) -> WeightOutcome + Send + Sync>;

/// Optional progress callback: `(phase, done, total)`, invoked during
/// preprocessing. Mirrors the teacher's `log::debug!` progress lines but
/// exposed to callers who want their own progress bar.
pub type ProgressFn = Arc<dyn Fn(&str, usize, usize) + Send + Sync>;

/// A paired seed/reduce closure set that aggregates per-raw-edge payloads
/// (§3 "Edge payload table", §4.2). Payloads are represented as
/// [`serde_json::Value`] so the reducer can be as opaque or as structured as
/// the caller needs, without threading a generic parameter through every
/// module of the crate.
#[derive(Clone)]
pub struct PayloadConfig {
	pub seed: Arc<dyn Fn(&Value) -> Value + Send + Sync>,
	pub reduce: Arc<dyn Fn(&Value, &Value) -> Value + Send + Sync>,
}

impl PayloadConfig {
	fn seed_for(&self, props: &Value) -> Value {
		(self.seed)(props)
	}
	fn fold(&self, existing: &Value, props: &Value) -> Value {
		(self.reduce)(existing, &self.seed_for(props))
	}
}

/// The raw vertex graph plus its source coordinates and per-edge payloads.
#[derive(Clone, Debug, Default)]
pub struct RawGraph {
	/// Forward adjacency: `from -> to -> weight`.
	pub vertices: IndexMap<VKey, IndexMap<VKey, f64>>,
	/// Reverse adjacency, maintained alongside `vertices` so chain walks can
	/// run against either direction without rebuilding an index (§9 design
	/// note: avoid per-edge map lookups during search by precomputing once
	/// at preprocessing time).
	pub reverse_vertices: IndexMap<VKey, IndexMap<VKey, f64>>,
	pub edge_payloads: IndexMap<(VKey, VKey), Value>,
	pub source_coordinates: IndexMap<VKey, Coordinate>,
}

impl RawGraph {
	/// The set of distinct neighbors of `v`, regardless of edge direction.
	pub fn undirected_degree(&self, v: &VKey) -> usize {
		self.undirected_neighbors(v).len()
	}

	pub fn undirected_neighbors(&self, v: &VKey) -> std::collections::HashSet<VKey> {
		let mut s = std::collections::HashSet::new();
		if let Some(out) = self.vertices.get(v) {
			s.extend(out.keys().cloned());
		}
		if let Some(inc) = self.reverse_vertices.get(v) {
			s.extend(inc.keys().cloned());
		}
		s
	}

	fn insert_directed(&mut self, from: VKey, to: VKey, w: f64) {
		let fwd = self.vertices.entry(from.clone()).or_default();
		let keep = fwd.get(&to).map_or(true, |&existing| w < existing);
		if keep {
			fwd.insert(to.clone(), w);
			self.reverse_vertices.entry(to).or_default().insert(from, w);
		}
	}

	fn fold_payload(&mut self, from: VKey, to: VKey, props: &Value, payload: &PayloadConfig) {
		let key = (from, to);
		let folded = match self.edge_payloads.get(&key) {
			Some(existing) => payload.fold(existing, props),
			None => payload.seed_for(props),
		};
		self.edge_payloads.insert(key, folded);
	}
}

/// Options controlling raw-graph construction (§6 "PathFinder options",
/// restricted to the subset topology itself consumes).
pub struct TopologyOptions {
	pub tolerance: f64,
	pub key: Option<KeyFn>,
}

impl Default for TopologyOptions {
	fn default() -> Self {
		Self { tolerance: 1e-5, key: None }
	}
}

/// Builds the raw vertex graph from a collection of polylines (§4.2).
pub fn build_raw_graph(
	polylines: &[PolylineFeature],
	opts: &TopologyOptions,
	weight: &WeightFn,
	payload: Option<&PayloadConfig>,
	progress: Option<&ProgressFn>,
) -> RawGraph {
	let mut graph = RawGraph::default();
	let total = polylines.len();
	for (done, line) in polylines.iter().enumerate() {
		for pair in line.coordinates.windows(2) {
			let (a, b) = (pair[0], pair[1]);
			let (ka, _) = key_for(&a, opts.tolerance, opts.key.as_ref());
			let (kb, _) = key_for(&b, opts.tolerance, opts.key.as_ref());
			if ka == kb {
				continue;
			}
			// Source coordinates keep the caller's original, un-rounded
			// precision (§3) -- only the key itself is derived from the
			// rounded form.
			graph.source_coordinates.entry(ka.clone()).or_insert(a);
			graph.source_coordinates.entry(kb.clone()).or_insert(b);

			match weight(&a, &b, &line.properties) {
				WeightOutcome::Impassable => {}
				WeightOutcome::Symmetric(w) if w > 0.0 => {
					graph.insert_directed(ka.clone(), kb.clone(), w);
					graph.insert_directed(kb.clone(), ka.clone(), w);
					if let Some(p) = payload {
						graph.fold_payload(ka.clone(), kb.clone(), &line.properties, p);
						graph.fold_payload(kb.clone(), ka.clone(), &line.properties, p);
					}
				}
				WeightOutcome::Symmetric(_) => {}
				WeightOutcome::Asymmetric { forward, backward } => {
					if let Some(w) = forward.filter(|w| *w > 0.0) {
						graph.insert_directed(ka.clone(), kb.clone(), w);
						if let Some(p) = payload {
							graph.fold_payload(ka.clone(), kb.clone(), &line.properties, p);
						}
					}
					if let Some(w) = backward.filter(|w| *w > 0.0) {
						graph.insert_directed(kb.clone(), ka.clone(), w);
						if let Some(p) = payload {
							graph.fold_payload(kb.clone(), ka.clone(), &line.properties, p);
						}
					}
				}
			}
		}
		if let Some(cb) = progress {
			cb("topology", done + 1, total);
		}
		log::trace!("topology: processed polyline {}/{}", done + 1, total);
	}
	log::debug!(
		"topology: {} vertices, {} source coordinates",
		graph.vertices.len(),
		graph.source_coordinates.len()
	);
	graph
}
