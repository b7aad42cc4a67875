//! Dense row-major matrix used for grid coordinates and depths

use crate::error::{FormatError, Result};

/// Row-major matrix of `f64`
#[derive(Debug, Clone, PartialEq)]
pub struct Matrix {
    rows: usize,
    cols: usize,
    data: Vec<f64>,
}

impl Matrix {
    /// Create a matrix from row-major data
    pub fn new(rows: usize, cols: usize, data: Vec<f64>) -> Result<Self> {
        if rows.checked_mul(cols) != Some(data.len()) {
            return Err(FormatError::DimensionMismatch {
                section: "matrix".to_string(),
                expected: format!("{rows}x{cols} ({} values)", rows.saturating_mul(cols)),
                actual: format!("{} values", data.len()),
            });
        }
        Ok(Self { rows, cols, data })
    }

    /// Create a matrix with every cell set to `value`
    pub fn filled(rows: usize, cols: usize, value: f64) -> Self {
        Self {
            rows,
            cols,
            data: vec![value; rows * cols],
        }
    }

    /// Create a matrix from a list of equally long rows
    pub fn from_rows(rows: Vec<Vec<f64>>) -> Result<Self> {
        let cols = rows.first().map_or(0, Vec::len);
        if let Some((index, row)) = rows.iter().enumerate().find(|(_, row)| row.len() != cols) {
            return Err(FormatError::DimensionMismatch {
                section: format!("matrix row {index}"),
                expected: format!("{cols} columns"),
                actual: format!("{} columns", row.len()),
            });
        }
        let count = rows.len();
        Ok(Self {
            rows: count,
            cols,
            data: rows.into_iter().flatten().collect(),
        })
    }

    /// Number of rows
    pub fn rows(&self) -> usize {
        self.rows
    }

    /// Number of columns
    pub fn cols(&self) -> usize {
        self.cols
    }

    /// `(rows, cols)`
    pub fn shape(&self) -> (usize, usize) {
        (self.rows, self.cols)
    }

    /// True when the matrix holds no cells
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Value at `(row, col)`
    pub fn get(&self, row: usize, col: usize) -> Option<f64> {
        if row < self.rows && col < self.cols {
            self.data.get(row * self.cols + col).copied()
        } else {
            None
        }
    }

    /// Set the value at `(row, col)`; returns false when out of bounds
    pub fn set(&mut self, row: usize, col: usize, value: f64) -> bool {
        if row < self.rows && col < self.cols {
            self.data[row * self.cols + col] = value;
            true
        } else {
            false
        }
    }

    /// One row as a slice
    pub fn row(&self, row: usize) -> Option<&[f64]> {
        if row < self.rows {
            Some(&self.data[row * self.cols..(row + 1) * self.cols])
        } else {
            None
        }
    }

    /// Iterate over rows
    pub fn iter_rows(&self) -> impl Iterator<Item = &[f64]> {
        // chunks(0) panics, and an empty matrix has no rows to yield anyway
        self.data.chunks(self.cols.max(1)).take(self.rows)
    }

    /// All values in row-major order
    pub fn as_slice(&self) -> &[f64] {
        &self.data
    }

    /// All values in row-major order, mutable
    pub fn as_mut_slice(&mut self) -> &mut [f64] {
        &mut self.data
    }

    /// Copy of this matrix with one extra row and one extra column set to `value`
    pub fn with_border(&self, value: f64) -> Self {
        let cols = self.cols + 1;
        let mut data = Vec::with_capacity((self.rows + 1) * cols);
        for row in self.iter_rows() {
            data.extend_from_slice(row);
            data.push(value);
        }
        data.extend(std::iter::repeat_n(value, cols));
        Self {
            rows: self.rows + 1,
            cols,
            data,
        }
    }

    /// Copy of this matrix without its last row and last column
    pub fn without_border(&self) -> Self {
        let rows = self.rows.saturating_sub(1);
        let cols = self.cols.saturating_sub(1);
        let data = self
            .iter_rows()
            .take(rows)
            .flat_map(|row| row[..cols].iter().copied())
            .collect();
        Self { rows, cols, data }
    }
}

#[cfg(test)]
#[allow(clippy::expect_used, clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_new_checks_length() {
        assert!(Matrix::new(2, 3, vec![0.0; 6]).is_ok());
        assert!(matches!(
            Matrix::new(2, 3, vec![0.0; 5]),
            Err(FormatError::DimensionMismatch { .. })
        ));
    }

    #[test]
    fn test_from_rows() {
        let matrix = Matrix::from_rows(vec![vec![1.0, 2.0], vec![3.0, 4.0]])
            .expect("Test operation should succeed");
        assert_eq!(matrix.shape(), (2, 2));
        assert_eq!(matrix.get(1, 0), Some(3.0));
        assert_eq!(matrix.get(2, 0), None);
        assert!(Matrix::from_rows(vec![vec![1.0], vec![2.0, 3.0]]).is_err());
    }

    #[test]
    fn test_border_round_trip() {
        let matrix = Matrix::from_rows(vec![vec![1.0, 2.0], vec![3.0, 4.0]])
            .expect("Test operation should succeed");
        let bordered = matrix.with_border(-999.0);
        assert_eq!(bordered.shape(), (3, 3));
        assert_eq!(bordered.row(0), Some(&[1.0, 2.0, -999.0][..]));
        assert_eq!(bordered.row(2), Some(&[-999.0, -999.0, -999.0][..]));
        assert_eq!(bordered.without_border(), matrix);
    }

    #[test]
    fn test_set() {
        let mut matrix = Matrix::filled(2, 2, 0.0);
        assert!(matrix.set(1, 1, 5.0));
        assert!(!matrix.set(2, 0, 5.0));
        assert_eq!(matrix.get(1, 1), Some(5.0));
    }
}
