//! End-to-end scenarios exercising the whole pipeline: ingestion ->
//! topology -> compaction -> phantom injection -> search -> path
//! reconstruction.

use std::sync::Arc;

use geo_path_finder::{Coordinate, PathFinder, PathFinderOptions, PolylineFeature, SearchAlgorithm, SearchOptions, WeightFn, WeightOutcome, WorkerPool};
use serde_json::Value;

fn euclidean_weight() -> WeightFn {
	Arc::new(|a, b, _props| {
		let (dx, dy) = (a.x - b.x, a.y - b.y);
		WeightOutcome::Symmetric((dx * dx + dy * dy).sqrt())
	})
}

fn dijkstra_options() -> SearchOptions {
	SearchOptions { algorithm: SearchAlgorithm::Dijkstra, ..Default::default() }
}

/// Two segments meeting at a right angle: the straightforward case that
/// compaction and search both have to get right before anything fancier.
#[test]
fn two_segment_l() {
	let lines = vec![
		PolylineFeature { coordinates: vec![Coordinate::new_2d(0.0, 0.0), Coordinate::new_2d(1.0, 0.0)], properties: Value::Null },
		PolylineFeature { coordinates: vec![Coordinate::new_2d(1.0, 0.0), Coordinate::new_2d(1.0, 1.0)], properties: Value::Null },
	];
	let pf = PathFinder::new(&lines, &euclidean_weight(), PathFinderOptions::default());
	// the corner has undirected degree 2, so it compacts away; only the
	// two dead-end endpoints remain as vertices.
	assert_eq!(pf.vertex_count(), 2);

	let path = pf.find_path(Coordinate::new_2d(0.0, 0.0), Coordinate::new_2d(1.0, 1.0), &dijkstra_options()).unwrap().unwrap();
	assert_eq!(path.cost, 2.0);
	assert_eq!(path.coordinates, vec![Coordinate::new_2d(0.0, 0.0), Coordinate::new_2d(1.0, 0.0), Coordinate::new_2d(1.0, 1.0)]);
}

/// Two routes between the same pair of junctions: a short straight one and
/// a longer detour. A `direction_bias` that heavily penalizes the straight
/// edge must be able to push the search onto the detour instead.
#[test]
fn parallel_alternative_with_direction_bias() {
	let lines = vec![
		PolylineFeature { coordinates: vec![Coordinate::new_2d(0.0, 0.0), Coordinate::new_2d(4.0, 0.0)], properties: Value::Null },
		PolylineFeature {
			coordinates: vec![Coordinate::new_2d(0.0, 0.0), Coordinate::new_2d(2.0, 3.0), Coordinate::new_2d(4.0, 0.0)],
			properties: Value::Null,
		},
	];
	let pf = PathFinder::new(&lines, &euclidean_weight(), PathFinderOptions::default());

	let plain = pf.find_path(Coordinate::new_2d(0.0, 0.0), Coordinate::new_2d(4.0, 0.0), &dijkstra_options()).unwrap().unwrap();
	assert_eq!(plain.cost, 4.0); // the straight route wins with no bias

	let bias: geo_path_finder::DirectionBias = Arc::new(|ctx| if ctx.cost_so_far == 0.0 && ctx.edge.weight < 4.5 { Ok(1000.0) } else { Ok(0.0) });
	let biased_options = SearchOptions { algorithm: SearchAlgorithm::Dijkstra, direction_bias: Some(bias), ..Default::default() };
	let detoured = pf.find_path(Coordinate::new_2d(0.0, 0.0), Coordinate::new_2d(4.0, 0.0), &biased_options).unwrap().unwrap();
	assert!(detoured.coordinates.len() > 2); // took the multi-point detour
	assert!(detoured.cost < 1000.0); // only the biased edge's raw weight plus the bias is paid once, not twice
}

/// A one-way segment can only be traversed in the direction its `weight`
/// callback allows.
#[test]
fn one_way_segment() {
	let one_way: WeightFn = Arc::new(|a, b, _| {
		let (dx, dy) = (a.x - b.x, a.y - b.y);
		WeightOutcome::Asymmetric { forward: Some((dx * dx + dy * dy).sqrt()), backward: None }
	});
	let lines = vec![PolylineFeature { coordinates: vec![Coordinate::new_2d(0.0, 0.0), Coordinate::new_2d(1.0, 0.0)], properties: Value::Null }];
	let pf = PathFinder::new(&lines, &one_way, PathFinderOptions::default());

	let forward = pf.find_path(Coordinate::new_2d(0.0, 0.0), Coordinate::new_2d(1.0, 0.0), &dijkstra_options()).unwrap();
	assert!(forward.is_some());

	let backward = pf.find_path(Coordinate::new_2d(1.0, 0.0), Coordinate::new_2d(0.0, 0.0), &dijkstra_options()).unwrap();
	assert!(backward.is_none());
}

/// Elevation is carried through geometry untouched even though it never
/// drives keying or search cost.
#[test]
fn three_d_lift() {
	let lines = vec![PolylineFeature {
		coordinates: vec![Coordinate::new_3d(0.0, 0.0, 0.0), Coordinate::new_3d(1.0, 0.0, 100.0), Coordinate::new_3d(2.0, 0.0, 0.0)],
		properties: Value::Null,
	}];
	let pf = PathFinder::new(&lines, &euclidean_weight(), PathFinderOptions::default());
	let path = pf.find_path(Coordinate::new_3d(0.0, 0.0, 0.0), Coordinate::new_3d(2.0, 0.0, 0.0), &dijkstra_options()).unwrap().unwrap();
	assert!(path.coordinates.iter().any(|c| c.z == Some(100.0)));
}

/// A long chain with no internal junctions: compaction should collapse it
/// to a single edge, and repeated queries (including from a mid-chain
/// phantom point) must never perturb the shared compacted graph.
#[test]
fn no_fork_chain_with_repeat_queries() {
	let coords: Vec<_> = (0..=20).map(|i| Coordinate::new_2d(i as f64, 0.0)).collect();
	let lines = vec![PolylineFeature { coordinates: coords, properties: Value::Null }];
	let pf = PathFinder::new(&lines, &euclidean_weight(), PathFinderOptions::default());
	assert_eq!(pf.vertex_count(), 2);

	let before = pf.vertex_count();
	for _ in 0..20 {
		let path = pf.find_path(Coordinate::new_2d(0.0, 0.0), Coordinate::new_2d(10.5, 0.0), &dijkstra_options()).unwrap().unwrap();
		assert_eq!(path.cost, 10.5);
	}
	assert_eq!(pf.vertex_count(), before);
}

/// `on_node_expanded` sees every vertex the search actually settles,
/// including both endpoints, with correct accumulated costs.
#[test]
fn on_node_expanded_observes_the_whole_search_frontier() {
	let lines = vec![
		PolylineFeature { coordinates: vec![Coordinate::new_2d(0.0, 0.0), Coordinate::new_2d(1.0, 0.0)], properties: Value::Null },
		PolylineFeature { coordinates: vec![Coordinate::new_2d(1.0, 0.0), Coordinate::new_2d(1.0, 1.0)], properties: Value::Null },
	];
	let pf = PathFinder::new(&lines, &euclidean_weight(), PathFinderOptions::default());

	let seen = Arc::new(std::sync::Mutex::new(Vec::new()));
	let recorder = seen.clone();
	let options = SearchOptions {
		algorithm: SearchAlgorithm::Dijkstra,
		on_node_expanded: Some(Arc::new(move |key, cost| recorder.lock().unwrap().push((key.clone(), cost)))),
		..Default::default()
	};
	let path = pf.find_path(Coordinate::new_2d(0.0, 0.0), Coordinate::new_2d(1.0, 1.0), &options).unwrap().unwrap();

	let seen = seen.lock().unwrap();
	assert!(seen.iter().any(|(k, cost)| k == "0,0" && *cost == 0.0));
	assert!(seen.iter().any(|(k, cost)| k == "1,1" && *cost == path.cost));
}

/// A `WorkerPool` of clones must agree with the single-threaded facade on
/// the cost of a path.
#[test]
fn worker_pool_parity_with_direct_search() {
	let lines = vec![
		PolylineFeature { coordinates: vec![Coordinate::new_2d(0.0, 0.0), Coordinate::new_2d(1.0, 0.0)], properties: Value::Null },
		PolylineFeature { coordinates: vec![Coordinate::new_2d(1.0, 0.0), Coordinate::new_2d(1.0, 1.0)], properties: Value::Null },
	];
	let pf = PathFinder::new(&lines, &euclidean_weight(), PathFinderOptions::default());
	let direct = pf.find_path(Coordinate::new_2d(0.0, 0.0), Coordinate::new_2d(1.0, 1.0), &dijkstra_options()).unwrap().unwrap();

	let pool_master = pf.clone();
	let mut pool = WorkerPool::new(move || pool_master.clone(), Some(3));
	for _ in 0..6 {
		let via_pool = pool.find_path(Coordinate::new_2d(0.0, 0.0), Coordinate::new_2d(1.0, 1.0), dijkstra_options()).unwrap().unwrap();
		assert_eq!(via_pool.cost, direct.cost);
		assert_eq!(via_pool.coordinates, direct.coordinates);
	}
	pool.close();
}
