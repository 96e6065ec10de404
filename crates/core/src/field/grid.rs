//! Main Field type

use crate::error::{Error, Result};
use crate::field::FieldElement;
use ndarray::Array2;

/// A dense 2D scalar field.
///
/// `Field<T>` stores one value of type `T` per grid cell in row-major
/// `(row, col)` order, with an optional no-data marker for cells that hold
/// no measurement. Observed (sparse) fields and reconstructed (dense) fields
/// share this type.
///
/// # Example
///
/// ```
/// use fieldrecon_core::Field;
///
/// let mut field: Field<f64> = Field::new(3, 4);
/// field.set(1, 2, 298.5).unwrap();
/// assert_eq!(field.get(1, 2).unwrap(), 298.5);
/// assert_eq!(field.shape(), (3, 4));
/// ```
#[derive(Debug, Clone)]
pub struct Field<T: FieldElement> {
    data: Array2<T>,
    nodata: Option<T>,
}

impl<T: FieldElement> Field<T> {
    /// Create a new field filled with zeros
    pub fn new(rows: usize, cols: usize) -> Self {
        Self::from_array(Array2::zeros((rows, cols)))
    }

    /// Create a new field filled with a specific value
    pub fn filled(rows: usize, cols: usize, value: T) -> Self {
        Self::from_array(Array2::from_elem((rows, cols), value))
    }

    /// Create a field from row-major data
    pub fn from_vec(data: Vec<T>, rows: usize, cols: usize) -> Result<Self> {
        if data.len() != rows * cols {
            return Err(Error::InvalidDimensions { rows, cols });
        }

        let array = Array2::from_shape_vec((rows, cols), data)
            .map_err(|e| Error::Other(e.to_string()))?;

        Ok(Self::from_array(array))
    }

    /// Create a field from an ndarray
    pub fn from_array(data: Array2<T>) -> Self {
        Self { data, nodata: None }
    }

    /// Create a field with the same shape and no-data marker, filled with a value
    pub fn like(&self, fill_value: T) -> Self {
        Self {
            data: Array2::from_elem(self.data.dim(), fill_value),
            nodata: self.nodata,
        }
    }

    // Dimensions

    /// Number of rows
    pub fn rows(&self) -> usize {
        self.data.nrows()
    }

    /// Number of columns
    pub fn cols(&self) -> usize {
        self.data.ncols()
    }

    /// Dimensions as (rows, cols)
    pub fn shape(&self) -> (usize, usize) {
        self.data.dim()
    }

    /// Total number of cells
    pub fn len(&self) -> usize {
        self.data.len()
    }

    /// Whether the field has no cells
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Whether (row, col) lies inside the grid
    pub fn contains(&self, row: usize, col: usize) -> bool {
        row < self.rows() && col < self.cols()
    }

    // Data access

    /// Get value at (row, col)
    pub fn get(&self, row: usize, col: usize) -> Result<T> {
        self.data
            .get((row, col))
            .copied()
            .ok_or(Error::IndexOutOfBounds {
                row,
                col,
                rows: self.rows(),
                cols: self.cols(),
            })
    }

    /// Set value at (row, col)
    pub fn set(&mut self, row: usize, col: usize, value: T) -> Result<()> {
        match self.data.get_mut((row, col)) {
            Some(cell) => {
                *cell = value;
                Ok(())
            }
            None => Err(Error::IndexOutOfBounds {
                row,
                col,
                rows: self.rows(),
                cols: self.cols(),
            }),
        }
    }

    /// Get a reference to the underlying array
    pub fn data(&self) -> &Array2<T> {
        &self.data
    }

    /// Iterate over valid cells as `(row, col, value)` in row-major order.
    pub fn valid_cells(&self) -> impl Iterator<Item = (usize, usize, T)> + '_ {
        let nodata = self.nodata;
        self.data
            .indexed_iter()
            .filter(move |(_, v)| v.is_valid(nodata))
            .map(|((row, col), &v)| (row, col, v))
    }

    // Metadata

    /// Get the no-data value
    pub fn nodata(&self) -> Option<T> {
        self.nodata
    }

    /// Set the no-data value
    pub fn set_nodata(&mut self, nodata: Option<T>) {
        self.nodata = nodata;
    }

    /// Check if a value is no-data
    pub fn is_nodata(&self, value: T) -> bool {
        value.is_nodata(self.nodata)
    }

    // Statistics

    /// Calculate basic statistics over valid cells
    pub fn statistics(&self) -> FieldStatistics {
        let mut min = f64::INFINITY;
        let mut max = f64::NEG_INFINITY;
        let mut sum = 0.0;
        let mut count = 0usize;

        for (_, _, value) in self.valid_cells() {
            let v = value.to_f64().unwrap_or(f64::NAN);
            min = min.min(v);
            max = max.max(v);
            sum += v;
            count += 1;
        }

        if count == 0 {
            return FieldStatistics {
                min: None,
                max: None,
                mean: None,
                valid_count: 0,
                nodata_count: self.len(),
            };
        }

        FieldStatistics {
            min: Some(min),
            max: Some(max),
            mean: Some(sum / count as f64),
            valid_count: count,
            nodata_count: self.len() - count,
        }
    }
}

/// Basic statistics for a field
#[derive(Debug, Clone, PartialEq)]
pub struct FieldStatistics {
    pub min: Option<f64>,
    pub max: Option<f64>,
    pub mean: Option<f64>,
    pub valid_count: usize,
    pub nodata_count: usize,
}
