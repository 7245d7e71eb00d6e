mod index;
mod iter;

#[cfg(feature = "serde")]
mod serde_impl;

/// Row-major 2-dimensional collection addressed by [`Position`](crate::Position)
///
/// Grids are allowed to be non-square; `rows` and `cols` are independent.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct Grid<T> {
    cols: usize,
    rows: usize,
    data: Vec<T>,
}

impl<T> Grid<T> {
    /// Build a grid from row-major data with a given number of columns.
    /// Returns [`None`] when the data does not evenly fill the rows.
    pub fn from_vec(data: Vec<T>, cols: usize) -> Option<Self> {
        if cols == 0 || data.len() % cols != 0 {
            return None;
        }

        let rows = data.len() / cols;
        Some(Self { cols, rows, data })
    }

    /// Build a grid from a list of equally-sized rows.
    /// Returns [`None`] when the rows differ in length or there are none.
    pub fn from_rows(rows: Vec<Vec<T>>) -> Option<Self> {
        let cols = rows.first()?.len();
        if rows.iter().any(|row| row.len() != cols) {
            return None;
        }

        let data: Vec<T> = rows.into_iter().flatten().collect();
        Self::from_vec(data, cols)
    }

    pub fn cols(&self) -> usize {
        self.cols
    }

    pub fn rows(&self) -> usize {
        self.rows
    }

    pub fn data(&self) -> &[T] {
        &self.data
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }
}

impl<T> Grid<T>
where
    T: Clone,
{
    /// Create a grid of the given dimensions with every entry set to `value`
    pub fn filled(rows: usize, cols: usize, value: T) -> Self {
        Self {
            rows,
            cols,
            data: vec![value; rows * cols],
        }
    }

    /// Create the transposed grid: entry `(r, c)` becomes entry `(c, r)`
    pub fn transposed(&self) -> Self {
        let mut data = Vec::with_capacity(self.data.len());

        for col in 0..self.cols {
            for row in 0..self.rows {
                data.push(self.data[row * self.cols + col].clone());
            }
        }

        Self {
            rows: self.cols,
            cols: self.rows,
            data,
        }
    }
}
