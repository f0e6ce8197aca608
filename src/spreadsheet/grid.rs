use crate::spreadsheet::cell::Cell;
use crate::spreadsheet::cell::CellValue;
use crate::spreadsheet::styles::Fill;
use crate::spreadsheet::styles::Styles;
use std::collections::HashMap;

/// One worksheet loaded into memory, addressed by 1-based `(row, col)`.
///
/// The grid is sparse: cells missing from the worksheet XML read as empty.
/// `max_row` and `max_column` follow the last row and column holding any cell,
/// styled empty cells included.
#[derive(Clone, Debug, Default)]
pub struct Grid {
    /// Source file name or URL
    pub file_name: String,
    /// Sheet name
    pub name: String,
    cells: HashMap<(usize, usize), Cell>,
    styles: Styles,
    max_row: usize,
    max_column: usize,
}

impl Grid {
    pub fn new(file_name: &str, name: &str, styles: Styles) -> Self {
        Grid {
            file_name: file_name.to_owned(),
            name: name.to_owned(),
            styles,
            ..Default::default()
        }
    }

    /// Builds an unstyled grid from rows of text, starting at A1; empty strings leave holes.
    pub fn from_rows<R, S>(rows: R) -> Self
    where
        R: IntoIterator,
        R::Item: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut grid = Grid::default();
        for (row, values) in rows.into_iter().enumerate() {
            for (col, value) in values.into_iter().enumerate() {
                if !value.as_ref().is_empty() {
                    grid.push(Cell::text(row + 1, col + 1, value.as_ref()));
                }
            }
        }
        grid
    }

    /// Adds a cell, replacing any previous cell at the same position.
    pub fn push(&mut self, cell: Cell) {
        self.update_bound(cell.row, cell.col);
        self.cells.insert((cell.row, cell.col), cell);
    }

    fn update_bound(&mut self, row: usize, col: usize) {
        self.max_row = self.max_row.max(row);
        self.max_column = self.max_column.max(col);
    }

    /// Returns true if the grid holds no cells.
    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    /// Last populated row, 0 for an empty grid.
    pub fn max_row(&self) -> usize {
        self.max_row
    }

    /// Last populated column, 0 for an empty grid.
    pub fn max_column(&self) -> usize {
        self.max_column
    }

    pub fn cell(&self, row: usize, col: usize) -> Option<&Cell> {
        self.cells.get(&(row, col))
    }

    /// Value of a cell, `Empty` for missing cells.
    pub fn value(&self, row: usize, col: usize) -> &CellValue {
        static EMPTY: CellValue = CellValue::Empty;
        self.cell(row, col).map(|cell| &cell.value).unwrap_or(&EMPTY)
    }

    /// Trimmed text of a cell, `None` when missing or blank.
    pub fn text(&self, row: usize, col: usize) -> Option<String> {
        self.value(row, col).text()
    }

    /// Resolved fill of a cell; `None` when the cell, its style or the fill is missing.
    pub fn fill(&self, row: usize, col: usize) -> Option<&Fill> {
        let style = self.cell(row, col)?.style?;
        self.styles.fill(style)
    }

    /// Text of every cell in `row` from `first_col` to the last populated column.
    pub fn row_texts(&self, row: usize, first_col: usize) -> impl Iterator<Item = (usize, Option<String>)> + '_ {
        (first_col.max(1)..=self.max_column).map(move |col| (col, self.text(row, col)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::spreadsheet::styles::FillColor;

    #[test]
    fn grid_initial() {
        let grid = Grid::new("a.xlsx", "Лист1", Styles::default());
        assert!(grid.is_empty());
        assert_eq!(grid.max_row(), 0);
        assert_eq!(grid.max_column(), 0);
        assert_eq!(grid.value(1, 1), &CellValue::Empty);
    }

    #[test]
    fn grid_update() {
        let mut grid = Grid::default();
        grid.push(Cell::text(1, 1, "a"));
        grid.push(Cell::text(3, 2, "b"));
        grid.push(Cell::new(9, 5, CellValue::Empty, Some(0)));

        assert_eq!(grid.max_row(), 9);
        assert_eq!(grid.max_column(), 5);
        assert_eq!(grid.text(3, 2).as_deref(), Some("b"));
        assert_eq!(grid.text(2, 2), None);
        assert_eq!(grid.text(9, 5), None);
    }

    #[test]
    fn grid_from_rows() {
        let grid = Grid::from_rows([vec!["№", "", "ИС25"], vec!["Понедельник"]]);
        assert_eq!(grid.max_row(), 2);
        assert_eq!(grid.max_column(), 3);
        assert_eq!(grid.cell(1, 2), None);
        let header: Vec<_> = grid.row_texts(1, 2).collect();
        assert_eq!(header, vec![(2, None), (3, Some("ИС25".to_owned()))]);
    }

    #[test]
    fn grid_fill_lookup() {
        let styles = Styles::new(vec![Fill::default(), Fill::solid(FillColor::Theme(9))], vec![0, 1]);
        let mut grid = Grid::new("a.xlsx", "Лист1", styles);
        grid.push(Cell::new(7, 4, CellValue::Text("Физика".to_owned()), Some(1)));
        grid.push(Cell::new(8, 4, CellValue::Text("Химия".to_owned()), Some(42)));
        grid.push(Cell::text(9, 4, "История"));

        assert_eq!(grid.fill(7, 4), Some(&Fill::solid(FillColor::Theme(9))));
        assert_eq!(grid.fill(8, 4), None);
        assert_eq!(grid.fill(9, 4), None);
        assert_eq!(grid.fill(10, 4), None);
    }
}
