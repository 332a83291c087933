//! Per-column surface elevation data over a rectangular footprint.

use bevy_math::IVec2;
use serde::{Deserialize, Serialize};

use crate::coordinates::Area;

/// A surface elevation value for every column of an [`Area`].
///
/// Columns where no surface could be determined are explicitly *unresolved* instead of
/// silently defaulting to zero, so consumers have to decide how to treat them.
#[derive(Clone, Eq, PartialEq, Debug, Serialize, Deserialize)]
pub struct HeightField {
    area: Area,
    // Dense row-major storage, indexed by area-local (x, z) offsets.
    columns: Vec<Option<i32>>,
}

impl HeightField {
    /// Creates a field over the given area with every column unresolved.
    pub fn unresolved(area: Area) -> Self {
        Self {
            area,
            columns: vec![None; area.cell_count()],
        }
    }

    /// The footprint this field covers.
    pub fn area(&self) -> Area {
        self.area
    }

    fn index(&self, column: IVec2) -> Option<usize> {
        if !self.area.contains(column) {
            return None;
        }
        let local = column - self.area.min();
        Some((local.x + local.y * self.area.width()) as usize)
    }

    /// Returns the elevation of the given column, or `None` if outside the area or unresolved.
    pub fn get(&self, column: IVec2) -> Option<i32> {
        self.columns[self.index(column)?]
    }

    /// Records the surface elevation of the given column. Columns outside the area are ignored.
    pub fn insert(&mut self, column: IVec2, elevation: i32) {
        if let Some(idx) = self.index(column) {
            self.columns[idx] = Some(elevation);
        }
    }

    /// Iterates over all resolved columns and their elevations.
    pub fn iter_resolved(&self) -> impl Iterator<Item = (IVec2, i32)> + '_ {
        self.area
            .iter()
            .filter_map(|column| self.get(column).map(|elevation| (column, elevation)))
    }

    /// Number of columns with a known surface elevation.
    pub fn resolved_count(&self) -> usize {
        self.columns.iter().filter(|c| c.is_some()).count()
    }

    /// Checks if every column of the area has a known surface elevation.
    pub fn is_fully_resolved(&self) -> bool {
        self.columns.iter().all(|c| c.is_some())
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn starts_unresolved() {
        let area = Area::from_corners(IVec2::new(0, 0), IVec2::new(3, 3));
        let field = HeightField::unresolved(area);
        assert_eq!(field.resolved_count(), 0);
        assert!(!field.is_fully_resolved());
        assert_eq!(field.get(IVec2::new(1, 1)), None);
    }

    #[test]
    fn insert_and_iterate() {
        let area = Area::from_corners(IVec2::new(-2, -2), IVec2::new(1, 1));
        let mut field = HeightField::unresolved(area);
        field.insert(IVec2::new(-2, -2), 10);
        field.insert(IVec2::new(1, 1), -4);
        // outside of the area, silently ignored
        field.insert(IVec2::new(2, 2), 99);

        assert_eq!(field.get(IVec2::new(-2, -2)), Some(10));
        assert_eq!(field.get(IVec2::new(1, 1)), Some(-4));
        assert_eq!(field.get(IVec2::new(2, 2)), None);
        assert_eq!(field.resolved_count(), 2);

        let resolved: Vec<_> = field.iter_resolved().collect();
        assert_eq!(resolved.len(), 2);
        assert!(resolved.contains(&(IVec2::new(-2, -2), 10)));
    }
}
