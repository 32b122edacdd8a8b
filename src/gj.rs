//! GeoJSON conversion: ingesting a network from a `FeatureCollection` (§4.1
//! "Network ingestion") and rendering a found path back out as GeoJSON, for
//! the demo binary and any caller that wants a quick visualization.

use geojson::{FeatureCollection, Geometry, Value as GeoValue};
use serde_json::Value;

use crate::chain::CompactedEdge;
use crate::coordinate::Coordinate;
use crate::topology::PolylineFeature;

fn positions_to_coordinates(positions: &[Vec<f64>]) -> Vec<Coordinate> {
	positions
		.iter()
		.map(|p| match p.as_slice() {
			[x, y] => Coordinate::new_2d(*x, *y),
			[x, y, z, ..] => Coordinate::new_3d(*x, *y, *z),
			_ => Coordinate::new_2d(0.0, 0.0),
		})
		.collect()
}

/// Flattens a `FeatureCollection` into the polyline features the topology
/// builder consumes. `LineString` features become one polyline each;
/// `MultiLineString` features become one polyline per part, each carrying a
/// clone of the parent feature's properties. Every other geometry type is
/// skipped.
pub fn feature_collection_to_polylines(fc: &FeatureCollection) -> Vec<PolylineFeature> {
	let mut out = Vec::new();
	for feature in &fc.features {
		let properties = feature.properties.clone().map(Value::Object).unwrap_or(Value::Null);
		let geometry = match &feature.geometry {
			Some(g) => g,
			None => continue,
		};
		match &geometry.value {
			GeoValue::LineString(positions) => {
				out.push(PolylineFeature { coordinates: positions_to_coordinates(positions), properties });
			}
			GeoValue::MultiLineString(parts) => {
				for positions in parts {
					out.push(PolylineFeature { coordinates: positions_to_coordinates(positions), properties: properties.clone() });
				}
			}
			_ => {}
		}
	}
	out
}

/// Renders a found path (start coordinate plus the sequence of compacted
/// edges traversed) as a single GeoJSON `LineString` geometry.
pub fn path_to_geometry(start: Coordinate, edges: &[CompactedEdge]) -> Geometry {
	let mut positions: Vec<Vec<f64>> = vec![start.into()];
	for edge in edges {
		positions.extend(edge.coordinates.iter().map(|&c| Vec::<f64>::from(c)));
	}
	Geometry::new(GeoValue::LineString(positions))
}

#[cfg(test)]
mod test {
	use super::*;
	use geojson::GeoJson;
	use std::convert::TryFrom;

	#[test]
	fn reads_a_linestring_feature() {
		let raw = serde_json::json!({
			"type": "FeatureCollection",
			"features": [{
				"type": "Feature",
				"properties": {"oneway": true},
				"geometry": {"type": "LineString", "coordinates": [[0.0, 0.0], [1.0, 0.0]]}
			}]
		});
		let geojson: GeoJson = GeoJson::from_json_value(raw).unwrap();
		let fc = FeatureCollection::try_from(geojson).unwrap();
		let lines = feature_collection_to_polylines(&fc);
		assert_eq!(lines.len(), 1);
		assert_eq!(lines[0].coordinates.len(), 2);
		assert_eq!(lines[0].properties["oneway"], serde_json::json!(true));
	}

	#[test]
	fn splits_a_multilinestring_into_one_polyline_per_part() {
		let raw = serde_json::json!({
			"type": "FeatureCollection",
			"features": [{
				"type": "Feature",
				"properties": null,
				"geometry": {"type": "MultiLineString", "coordinates": [[[0.0, 0.0], [1.0, 0.0]], [[2.0, 2.0], [3.0, 3.0]]]}
			}]
		});
		let geojson: GeoJson = GeoJson::from_json_value(raw).unwrap();
		let fc = FeatureCollection::try_from(geojson).unwrap();
		let lines = feature_collection_to_polylines(&fc);
		assert_eq!(lines.len(), 2);
	}

	#[test]
	fn path_to_geometry_includes_the_start_coordinate() {
		let edge = CompactedEdge { weight: 1.0, coordinates: vec![Coordinate::new_2d(1.0, 0.0)], payload: None };
		let geom = path_to_geometry(Coordinate::new_2d(0.0, 0.0), &[edge]);
		match geom.value {
			GeoValue::LineString(positions) => assert_eq!(positions, vec![vec![0.0, 0.0], vec![1.0, 0.0]]),
			_ => panic!("expected LineString"),
		}
	}
}
