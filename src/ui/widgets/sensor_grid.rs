//! Grid of thermometer cells.

use crate::ui::grid::SensorGrid;
use crate::ui::widgets::thermometer::{render_thermometer, CELL_HEIGHT, CELL_WIDTH};
use ratatui::{layout::Rect, Frame};

/// Horizontal gap between cells
const CELL_PADDING: u16 = 1;

/// Screen rectangle for a grid position, if it fits inside `area`
pub fn cell_rect(area: Rect, row: usize, col: usize) -> Option<Rect> {
    let x = area.x as usize + col * (CELL_WIDTH + CELL_PADDING) as usize;
    let y = area.y as usize + row * CELL_HEIGHT as usize;
    if x + CELL_WIDTH as usize > area.right() as usize
        || y + CELL_HEIGHT as usize > area.bottom() as usize
    {
        return None;
    }
    Some(Rect::new(x as u16, y as u16, CELL_WIDTH, CELL_HEIGHT))
}

/// Render every cell that fits; returns how many did not
pub fn render_sensor_grid(frame: &mut Frame, area: Rect, grid: &SensorGrid) -> usize {
    if grid.is_empty() {
        return 0;
    }

    let mut hidden = 0;
    for cell in grid.cells() {
        match cell_rect(area, cell.position.row, cell.position.col) {
            Some(rect) => render_thermometer(frame, rect, cell, grid.fill_fraction(cell.temp)),
            None => hidden += 1,
        }
    }
    hidden
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ui::widgets::tests::buffer_text;
    use ratatui::{backend::TestBackend, Terminal};

    #[test]
    fn test_cell_rect_layout() {
        let area = Rect::new(0, 0, 180, 20);
        assert_eq!(cell_rect(area, 0, 0), Some(Rect::new(0, 0, 17, 9)));
        assert_eq!(cell_rect(area, 1, 2), Some(Rect::new(36, 9, 17, 9)));
        assert_eq!(cell_rect(area, 2, 0), None);
        assert_eq!(cell_rect(area, 0, 10), None);
    }

    #[test]
    fn test_grid_skips_cells_outside_area() {
        let mut grid = SensorGrid::new(10, 100.0);
        for name in ["A", "B", "C", "D"] {
            grid.upsert(name, 42.0);
        }

        let mut terminal = Terminal::new(TestBackend::new(40, 10)).unwrap();
        let mut hidden = 0;
        terminal
            .draw(|f| hidden = render_sensor_grid(f, f.area(), &grid))
            .unwrap();

        // Two 17-wide cells plus padding fit in 40 columns.
        assert_eq!(hidden, 2);
        let text = buffer_text(terminal.backend().buffer());
        assert!(text.contains(" A ") && text.contains(" B "));
        assert!(!text.contains(" C "));
    }
}
