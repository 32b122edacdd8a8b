//! Thin demonstration binary: load a GeoJSON network, find the shortest
//! path between two coordinates, write it back out as GeoJSON.

use std::convert::TryFrom;
use std::fs::File;
use std::sync::Arc;

use clap::{crate_version, App, Arg};

use geo_path_finder::{Coordinate, PathFinder, PathFinderOptions, SearchAlgorithm, SearchOptions, WeightFn, WeightOutcome};

fn parse_coordinate(s: &str) -> Coordinate {
	let mut parts = s.split(',');
	let x: f64 = parts.next().expect("missing longitude").trim().parse().expect("invalid longitude");
	let y: f64 = parts.next().expect("missing latitude").trim().parse().expect("invalid latitude");
	Coordinate::new_2d(x, y)
}

fn euclidean_weight() -> WeightFn {
	Arc::new(|a, b, _props| {
		let (dx, dy) = (a.x - b.x, a.y - b.y);
		WeightOutcome::Symmetric((dx * dx + dy * dy).sqrt())
	})
}

fn main() -> std::io::Result<()> {
	env_logger::init_from_env(env_logger::Env::default().filter_or(env_logger::DEFAULT_FILTER_ENV, "info"));
	let matches = App::new("geo-path-finder")
		.version(crate_version!())
		.about("Find the shortest path across a network of polyline geographic features")
		.arg(Arg::with_name("network").takes_value(true).required(true).index(1).help("GeoJSON FeatureCollection of LineString/MultiLineString network features"))
		.arg(Arg::with_name("start").takes_value(true).required(true).index(2).help(r#"Start coordinate as "lon,lat""#))
		.arg(Arg::with_name("goal").takes_value(true).required(true).index(3).help(r#"Destination coordinate as "lon,lat""#))
		.arg(Arg::with_name("output").takes_value(true).required(true).index(4).help("Output GeoJSON LineString path"))
		.arg(Arg::with_name("tolerance").long("tolerance").takes_value(true).default_value("0.00001").help("Coordinate snapping tolerance"))
		.arg(Arg::with_name("dijkstra").long("dijkstra").takes_value(false).help("Use plain Dijkstra instead of A*"))
		.get_matches();

	log::info!("Loading network...");
	let raw_geojson: geojson::GeoJson = serde_json::from_reader(File::open(matches.value_of("network").unwrap())?).expect("network invalid GeoJSON");
	let fc = geojson::FeatureCollection::try_from(raw_geojson).expect("network is not a FeatureCollection");
	let polylines = geo_path_finder::gj::feature_collection_to_polylines(&fc);
	log::info!("Loaded {} polylines", polylines.len());

	let tolerance: f64 = matches.value_of("tolerance").unwrap().parse().expect("tolerance must be a number");
	let pf = PathFinder::new(&polylines, &euclidean_weight(), PathFinderOptions { tolerance, ..Default::default() });
	log::info!("Preprocessed network: {} junctions over {} raw vertices", pf.vertex_count(), pf.raw_vertex_count());

	let start = parse_coordinate(matches.value_of("start").unwrap());
	let goal = parse_coordinate(matches.value_of("goal").unwrap());
	let algorithm = if matches.is_present("dijkstra") { SearchAlgorithm::Dijkstra } else { SearchAlgorithm::AStar };
	let options = SearchOptions { algorithm, ..Default::default() };

	match pf.find_path(start, goal, &options).expect("search failed") {
		Some(path) => {
			log::info!("Found path of cost {}", path.cost);
			let positions: Vec<Vec<f64>> = path.coordinates.iter().map(|&c| c.into()).collect();
			let geometry = geojson::Geometry::new(geojson::Value::LineString(positions));
			serde_json::to_writer(File::create(matches.value_of("output").unwrap())?, &geometry).expect("failed to write output");
		}
		None => log::info!("No path found"),
	}
	Ok(())
}
