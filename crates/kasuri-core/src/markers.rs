use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::error::{KasuriError, Result};
use crate::geometry::point::{clamp_unit, Point2};
use crate::grid::GridSpec;

/// A measured point in normalized rectified space with the grid cell it was
/// assigned when created. The cell is not recomputed if the GridSpec changes.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Marker {
    pub normalized_x: f64,
    pub normalized_y: f64,
    pub row_index: u32,
    pub col_index: u32,
}

impl Marker {
    /// Create a marker at `p`, clamping it into [0, 1] and deriving its cell.
    pub fn at(p: Point2, grid: &GridSpec) -> Self {
        let x = clamp_unit(p.x);
        let y = clamp_unit(p.y);
        let cell = grid.cell_at(x, y);
        Self {
            normalized_x: x,
            normalized_y: y,
            row_index: cell.row,
            col_index: cell.col,
        }
    }

    pub fn position(&self) -> Point2 {
        Point2::new(self.normalized_x, self.normalized_y)
    }
}

/// Read-only view of the marker list at one point in time.
pub type MarkerSnapshot = Arc<[Marker]>;

/// Ordered marker list. Every mutation publishes a fresh snapshot, so a
/// snapshot handed out earlier never changes underneath its reader.
#[derive(Clone, Debug)]
pub struct MarkerStore {
    markers: MarkerSnapshot,
}

impl MarkerStore {
    pub fn new() -> Self {
        Self {
            markers: Arc::from(Vec::<Marker>::new()),
        }
    }

    pub fn from_markers(markers: Vec<Marker>) -> Self {
        Self {
            markers: Arc::from(markers),
        }
    }

    pub fn snapshot(&self) -> MarkerSnapshot {
        Arc::clone(&self.markers)
    }

    pub fn len(&self) -> usize {
        self.markers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.markers.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&Marker> {
        self.markers.get(index)
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Marker> {
        self.markers.iter()
    }

    pub fn append(&mut self, marker: Marker) {
        let mut next = self.markers.to_vec();
        next.push(marker);
        self.markers = Arc::from(next);
    }

    pub fn remove_at(&mut self, index: usize) -> Result<Marker> {
        let total = self.markers.len();
        if index >= total {
            return Err(KasuriError::MarkerIndexOutOfRange { index, total });
        }
        let mut next = self.markers.to_vec();
        let removed = next.remove(index);
        self.markers = Arc::from(next);
        Ok(removed)
    }

    /// Remove the most recent marker. No-op on an empty store.
    pub fn remove_last(&mut self) -> Option<Marker> {
        let (last, rest) = self.markers.split_last()?;
        let last = *last;
        self.markers = Arc::from(rest.to_vec());
        Some(last)
    }

    /// Replace the whole list, e.g. on session import.
    pub fn replace_all(&mut self, markers: Vec<Marker>) {
        self.markers = Arc::from(markers);
    }

    pub fn clear(&mut self) {
        self.replace_all(Vec::new());
    }

    pub fn to_vec(&self) -> Vec<Marker> {
        self.markers.to_vec()
    }
}

impl Default for MarkerStore {
    fn default() -> Self {
        Self::new()
    }
}
