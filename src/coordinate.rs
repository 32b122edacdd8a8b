//! Coordinates and the tolerance-snapped vertex keys derived from them.

use std::sync::Arc;

use serde::{Deserialize, Serialize};

/// A vertex key: a deterministic string identifying a coordinate after
/// tolerance-snapping. Two coordinates that round to the same key are the
/// same vertex.
pub type VKey = String;

/// A 2D or 3D geographic coordinate (longitude, latitude, optional elevation).
///
/// Only `x`/`y` drive keying and distance; `z` is carried through unchanged.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Coordinate {
	pub x: f64,
	pub y: f64,
	pub z: Option<f64>,
}

impl Coordinate {
	pub fn new_2d(x: f64, y: f64) -> Self {
		Self { x, y, z: None }
	}
	pub fn new_3d(x: f64, y: f64, z: f64) -> Self {
		Self { x, y, z: Some(z) }
	}
	/// Whether this coordinate carries an elevation component.
	pub fn is_3d(&self) -> bool {
		self.z.is_some()
	}
	/// The 2D (x, y) part, dropping elevation.
	pub fn xy(&self) -> (f64, f64) {
		(self.x, self.y)
	}
}

impl From<Coordinate> for geo::Point<f64> {
	fn from(c: Coordinate) -> Self {
		geo::Point::new(c.x, c.y)
	}
}

impl From<&Coordinate> for geo::Point<f64> {
	fn from(c: &Coordinate) -> Self {
		geo::Point::new(c.x, c.y)
	}
}

impl From<Coordinate> for Vec<f64> {
	fn from(c: Coordinate) -> Self {
		match c.z {
			Some(z) => vec![c.x, c.y, z],
			None => vec![c.x, c.y],
		}
	}
}

/// Rounds the 2D part of `coord` to the nearest multiple of `tolerance`,
/// passing any elevation through untouched.
///
/// Idempotent: `round(round(c, t), t) == round(c, t)`.
pub fn round(coord: &Coordinate, tolerance: f64) -> Coordinate {
	Coordinate {
		x: (coord.x / tolerance).round() * tolerance,
		y: (coord.y / tolerance).round() * tolerance,
		z: coord.z,
	}
}

/// The default vertex key: `"x,y"` of the already-rounded 2D part.
///
/// Callers are expected to pass an already-[`round`]ed coordinate; the
/// formatting itself does no further snapping.
pub fn default_key(rounded: &Coordinate) -> VKey {
	format!("{},{}", rounded.x, rounded.y)
}

/// A user-suppliable coordinate-to-key function. Must be deterministic and
/// depend only on the rounded input, per §4.1.
pub type KeyFn = Arc<dyn Fn(&Coordinate) -> VKey + Send + Sync>;

/// Resolves the key for a raw (un-rounded) coordinate, given a tolerance and
/// an optional custom key function.
pub fn key_for(coord: &Coordinate, tolerance: f64, key_fn: Option<&KeyFn>) -> (VKey, Coordinate) {
	let rounded = round(coord, tolerance);
	let key = match key_fn {
		Some(f) => f(&rounded),
		None => default_key(&rounded),
	};
	(key, rounded)
}
