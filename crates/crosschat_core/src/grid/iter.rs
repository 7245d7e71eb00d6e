use crate::{Grid, Position};

impl<T> Grid<T> {
    /// Creates an iterator over the [positions](Position) of the grid in row-major order
    pub fn positions(&self) -> impl Iterator<Item = Position> + '_ {
        (0..self.data.len()).map(move |idx| Position::from_row_order(idx, self.cols))
    }

    /// Creates an iterator over the grid in row-major order
    pub fn iter(&self) -> impl Iterator<Item = &T> {
        self.data.iter()
    }

    /// Creates a mutable iterator over the grid in row-major order
    pub fn iter_mut(&mut self) -> impl Iterator<Item = &mut T> {
        self.data.iter_mut()
    }

    /// Creates an indexed iterator over the grid in row-major order
    pub fn iter_indexed(&self) -> impl Iterator<Item = (Position, &T)> {
        self.data
            .iter()
            .enumerate()
            .map(|(idx, val)| (Position::from_row_order(idx, self.cols), val))
    }

    /// Creates a mutable indexed iterator over the grid in row-major order
    pub fn iter_indexed_mut(&mut self) -> impl Iterator<Item = (Position, &mut T)> {
        let cols = self.cols;

        self.data
            .iter_mut()
            .enumerate()
            .map(move |(idx, val)| (Position::from_row_order(idx, cols), val))
    }

    /// Creates an iterator over a specified row of the grid
    pub fn iter_row(&self, row: usize) -> impl Iterator<Item = &T> {
        let range = if row < self.rows {
            let start = row * self.cols;
            start..start + self.cols
        } else {
            0..0
        };

        self.data[range].iter()
    }

    /// Creates an iterator over a specified column of the grid
    pub fn iter_col(&self, col: usize) -> impl Iterator<Item = &T> {
        let slice = if col < self.cols {
            &self.data[col..]
        } else {
            &[]
        };

        slice.iter().step_by(self.cols.max(1))
    }

    /// Creates an iterator over the rows of the grid
    pub fn iter_rows(&self) -> impl Iterator<Item = impl Iterator<Item = &T>> {
        (0..self.rows).map(move |row| self.iter_row(row))
    }
}
