//! Sensor grid state.
//!
//! Each sensor name owns exactly one cell. Cells are placed row-major in
//! the order their sensors first appear and never move or disappear.

use chrono::{DateTime, Utc};
use std::collections::HashMap;

/// Grid coordinates of a cell
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CellPosition {
    pub row: usize,
    pub col: usize,
}

/// One sensor's cell in the grid
#[derive(Debug, Clone)]
pub struct SensorCell {
    pub name: String,
    pub temp: f64,
    pub position: CellPosition,
    /// Number of readings applied, including the first
    pub updates: u64,
    pub last_update: DateTime<Utc>,
}

/// Outcome of an upsert
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Upsert {
    Created(CellPosition),
    Updated(CellPosition),
}

/// Owned mapping from sensor name to its cell
pub struct SensorGrid {
    columns: usize,
    max_temp: f64,
    cells: Vec<SensorCell>,
    index: HashMap<String, usize>,
}

impl SensorGrid {
    pub fn new(columns: usize, max_temp: f64) -> Self {
        Self {
            columns: columns.max(1),
            max_temp,
            cells: Vec::new(),
            index: HashMap::new(),
        }
    }

    /// Create the cell for `name` or refresh it in place
    pub fn upsert(&mut self, name: &str, temp: f64) -> Upsert {
        self.upsert_at(name, temp, Utc::now())
    }

    pub fn upsert_at(&mut self, name: &str, temp: f64, at: DateTime<Utc>) -> Upsert {
        if let Some(&idx) = self.index.get(name) {
            let cell = &mut self.cells[idx];
            cell.temp = temp;
            cell.updates += 1;
            cell.last_update = at;
            return Upsert::Updated(cell.position);
        }

        let position = self.position_for(self.cells.len());
        self.index.insert(name.to_string(), self.cells.len());
        self.cells.push(SensorCell {
            name: name.to_string(),
            temp,
            position,
            updates: 1,
            last_update: at,
        });
        Upsert::Created(position)
    }

    fn position_for(&self, idx: usize) -> CellPosition {
        CellPosition {
            row: idx / self.columns,
            col: idx % self.columns,
        }
    }

    pub fn get(&self, name: &str) -> Option<&SensorCell> {
        self.index.get(name).map(|&idx| &self.cells[idx])
    }

    pub fn position(&self, name: &str) -> Option<CellPosition> {
        self.get(name).map(|cell| cell.position)
    }

    /// Cells in creation order
    pub fn cells(&self) -> impl Iterator<Item = &SensorCell> {
        self.cells.iter()
    }

    pub fn len(&self) -> usize {
        self.cells.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    /// Rows currently occupied
    pub fn rows(&self) -> usize {
        self.cells.len().div_ceil(self.columns)
    }

    /// Linear fill fraction of the thermometer. Not clamped: readings above
    /// `max_temp` exceed 1.0 and negative readings go below 0.0.
    pub fn fill_fraction(&self, temp: f64) -> f64 {
        temp / self.max_temp
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_repeated_name_updates_in_place() {
        let mut grid = SensorGrid::new(10, 100.0);
        assert_eq!(
            grid.upsert("A", 20.0),
            Upsert::Created(CellPosition { row: 0, col: 0 })
        );
        assert_eq!(
            grid.upsert("A", 35.0),
            Upsert::Updated(CellPosition { row: 0, col: 0 })
        );

        assert_eq!(grid.len(), 1);
        let cell = grid.get("A").unwrap();
        assert_eq!(cell.temp, 35.0);
        assert_eq!(cell.updates, 2);
        assert!((grid.fill_fraction(cell.temp) - 0.35).abs() < 1e-9);
    }

    #[test]
    fn test_cell_count_matches_distinct_names() {
        let mut grid = SensorGrid::new(10, 100.0);
        let names = ["A", "B", "A", "C", "B", "A", "C", "C"];
        for (i, name) in names.iter().enumerate() {
            grid.upsert(name, i as f64);
        }
        assert_eq!(grid.len(), 3);
        assert_eq!(grid.get("A").unwrap().temp, 5.0);
        assert_eq!(grid.get("B").unwrap().temp, 4.0);
        assert_eq!(grid.get("C").unwrap().temp, 7.0);
    }

    #[test]
    fn test_eleventh_sensor_wraps_to_next_row() {
        let mut grid = SensorGrid::new(10, 100.0);
        for i in 0..11 {
            let name = ((b'A' + i as u8) as char).to_string();
            grid.upsert(&name, 20.0);
        }
        assert_eq!(grid.position("J"), Some(CellPosition { row: 0, col: 9 }));
        assert_eq!(grid.position("K"), Some(CellPosition { row: 1, col: 0 }));
        assert_eq!(grid.rows(), 2);
    }

    #[test]
    fn test_position_fixed_at_creation() {
        let mut grid = SensorGrid::new(2, 100.0);
        grid.upsert("x", 1.0);
        grid.upsert("y", 2.0);
        grid.upsert("z", 3.0);
        grid.upsert("x", 4.0);
        let order: Vec<&str> = grid.cells().map(|c| c.name.as_str()).collect();
        assert_eq!(order, vec!["x", "y", "z"]);
        assert_eq!(grid.position("x"), Some(CellPosition { row: 0, col: 0 }));
        assert_eq!(grid.position("z"), Some(CellPosition { row: 1, col: 0 }));
    }

    #[test]
    fn test_fill_fraction_is_unclamped() {
        let grid = SensorGrid::new(10, 100.0);
        assert_eq!(grid.fill_fraction(150.0), 1.5);
        assert_eq!(grid.fill_fraction(-10.0), -0.1);
    }

    #[test]
    fn test_unknown_sensor() {
        let grid = SensorGrid::new(10, 100.0);
        assert!(grid.get("nope").is_none());
        assert!(grid.is_empty());
        assert_eq!(grid.rows(), 0);
    }
}
