//! Labeled n-dimensional sample point.

use serde::{Deserialize, Serialize};

/// A labeled point in R^n.
///
/// Points are the read-only input of the synthesis pipeline. Positive
/// points (`label == true`) must end up satisfying every synthesized
/// constraint of their cluster; negative points should violate at least
/// one. Equality is identity: the pipeline never merges or deduplicates
/// points, even when coordinates coincide.
///
/// # Example
///
/// ```
/// use constraint_synth_core::model::Point;
///
/// let p = Point::positive(vec![1.0, 2.0]);
/// assert_eq!(p.dims(), 2);
/// assert_eq!(p.coord(1), 2.0);
/// assert!(p.is_positive());
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Point {
    coords: Vec<f64>,
    label: bool,
}

impl Point {
    /// Create a point with the given coordinates and an explicit label.
    pub fn new(coords: Vec<f64>, label: bool) -> Self {
        Self { coords, label }
    }

    /// Create a positive-labeled point.
    pub fn positive(coords: Vec<f64>) -> Self {
        Self::new(coords, true)
    }

    /// Create a negative-labeled point.
    pub fn negative(coords: Vec<f64>) -> Self {
        Self::new(coords, false)
    }

    /// Number of coordinates.
    #[inline]
    pub fn dims(&self) -> usize {
        self.coords.len()
    }

    /// Coordinate at `index`.
    ///
    /// # Panics
    ///
    /// Panics if `index >= dims()`; mixing dimensionalities is a
    /// programmer error.
    #[inline]
    pub fn coord(&self, index: usize) -> f64 {
        self.coords[index]
    }

    /// Overwrite the coordinate at `index`.
    ///
    /// Only external collaborators (synthetic data generation) mutate
    /// coordinates; the core treats points as frozen input.
    pub fn set_coord(&mut self, index: usize, value: f64) {
        self.coords[index] = value;
    }

    /// All coordinates as a slice.
    #[inline]
    pub fn coords(&self) -> &[f64] {
        &self.coords
    }

    /// The point's label.
    #[inline]
    pub fn label(&self) -> bool {
        self.label
    }

    /// Whether the point is positive-labeled.
    #[inline]
    pub fn is_positive(&self) -> bool {
        self.label
    }
}

impl std::fmt::Display for Point {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let coords = self
            .coords
            .iter()
            .map(|c| c.to_string())
            .collect::<Vec<_>>()
            .join(", ");
        write!(f, "{} {}", coords, self.label)
    }
}
