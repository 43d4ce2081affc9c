//! Pan and zoom transform between screen and graph coordinates.

use crate::graph::Vector;

/// Screen position of the graph origin (`x`, `y`) and scale `k`.
#[derive(Clone, Debug, PartialEq)]
pub struct ViewTransform {
	/// Horizontal screen offset.
	pub x: f64,
	/// Vertical screen offset.
	pub y: f64,
	/// Scale.
	pub k: f64,
}

impl Default for ViewTransform {
	fn default() -> Self {
		Self {
			x: 0.0,
			y: 0.0,
			k: 1.0,
		}
	}
}

impl ViewTransform {
	/// Centered on a `width` by `height` surface at scale 1.
	pub fn centered(width: f64, height: f64) -> Self {
		Self {
			x: width / 2.0,
			y: height / 2.0,
			k: 1.0,
		}
	}

	/// Graph point drawn at the screen point `p`.
	pub fn screen_to_graph(&self, p: Vector) -> Vector {
		Vector::new((p.x - self.x) / self.k, (p.y - self.y) / self.k)
	}

	/// Screen point where the graph point `p` is drawn.
	pub fn graph_to_screen(&self, p: Vector) -> Vector {
		Vector::new(p.x * self.k + self.x, p.y * self.k + self.y)
	}

	/// Moves the graph by `delta` screen pixels.
	pub fn pan_by(&mut self, delta: Vector) {
		self.x += delta.x;
		self.y += delta.y;
	}

	/// Scales by `factor` (clamped to `[min, max]`) keeping the graph point under
	/// the screen point `p` fixed.
	///
	/// When `min > max` the scale settles on `max`. A NaN bound is ignored.
	pub fn zoom_at(&mut self, p: Vector, factor: f64, min: f64, max: f64) {
		let new_k = (self.k * factor).max(min).min(max);
		if !new_k.is_finite() || new_k <= 0.0 {
			return;
		}
		let ratio = new_k / self.k;
		self.x = p.x - (p.x - self.x) * ratio;
		self.y = p.y - (p.y - self.y) * ratio;
		self.k = new_k;
	}
}

#[cfg(test)]
mod tests {
	use float_cmp::approx_eq;

	use super::*;

	#[test]
	fn zoom_keeps_point_under_cursor() {
		let mut view = ViewTransform {
			x: 312.0,
			y: -40.5,
			k: 0.8,
		};
		let cursor = Vector::new(123.0, 456.0);
		let before = view.screen_to_graph(cursor);
		view.zoom_at(cursor, 1.1, 0.1, 10.0);
		let after = view.screen_to_graph(cursor);
		assert!(approx_eq!(f64, before.x, after.x, epsilon = 1e-9));
		assert!(approx_eq!(f64, before.y, after.y, epsilon = 1e-9));
		assert!(approx_eq!(f64, view.k, 0.88, epsilon = 1e-12));
	}

	#[test]
	fn zoom_is_clamped_and_still_anchored() {
		let mut view = ViewTransform::centered(800.0, 600.0);
		let cursor = Vector::new(10.0, 20.0);
		let before = view.screen_to_graph(cursor);
		view.zoom_at(cursor, 100.0, 0.1, 10.0);
		assert_eq!(view.k, 10.0);
		let after = view.screen_to_graph(cursor);
		assert!(approx_eq!(f64, before.x, after.x, epsilon = 1e-9));
		assert!(approx_eq!(f64, before.y, after.y, epsilon = 1e-9));
	}

	#[test]
	fn inverted_or_nan_bounds_do_not_panic() {
		let mut view = ViewTransform::default();
		let cursor = Vector::new(50.0, 50.0);
		view.zoom_at(cursor, 1.1, 5.0, 1.0);
		assert_eq!(view.k, 1.0);
		view.zoom_at(cursor, 1.1, f64::NAN, 2.0);
		assert!(approx_eq!(f64, view.k, 1.1, epsilon = 1e-12));
		view.zoom_at(cursor, 1.1, 0.1, f64::NAN);
		assert!(approx_eq!(f64, view.k, 1.21, epsilon = 1e-12));
	}

	#[test]
	fn screen_and_graph_round_trip() {
		let view = ViewTransform {
			x: 400.0,
			y: 300.0,
			k: 2.0,
		};
		let p = Vector::new(10.0, -5.0);
		assert_eq!(view.graph_to_screen(p), Vector::new(420.0, 290.0));
		assert_eq!(view.screen_to_graph(view.graph_to_screen(p)), p);
	}
}
