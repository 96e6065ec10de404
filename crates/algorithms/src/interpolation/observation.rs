//! Observation sets: the known samples a reconstruction starts from

use fieldrecon_core::{Error, Field, FieldElement, Result};

/// A grid coordinate with a known scalar value.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Observation {
    pub row: usize,
    pub col: usize,
    pub value: f64,
}

impl Observation {
    pub fn new(row: usize, col: usize, value: f64) -> Self {
        Self { row, col, value }
    }

    /// Squared Euclidean distance to a grid cell, in (row, col) units
    #[inline]
    pub fn dist_sq(&self, row: usize, col: usize) -> f64 {
        let dr = self.row as f64 - row as f64;
        let dc = self.col as f64 - col as f64;
        dr * dr + dc * dc
    }

    /// Euclidean distance to a grid cell
    #[inline]
    pub fn dist(&self, row: usize, col: usize) -> f64 {
        self.dist_sq(row, col).sqrt()
    }
}

/// Which cells of an observed field count as observations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Support {
    /// Valid cells holding a non-zero value. Observed fields that zero-fill
    /// unmonitored cells use this convention.
    #[default]
    NonZero,
    /// Every valid cell (not no-data, finite)
    Valid,
}

/// Ordered, immutable collection of observations.
///
/// The order is significant: when two observations are equally distant from
/// a query cell, the one stored first is selected first.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ObservationSet {
    points: Vec<Observation>,
}

impl ObservationSet {
    pub fn new(points: Vec<Observation>) -> Self {
        Self { points }
    }

    /// Collect the support of an observed field in row-major order.
    pub fn from_field<T: FieldElement>(field: &Field<T>, support: Support) -> Self {
        let points = field
            .valid_cells()
            .filter_map(|(row, col, v)| v.to_f64().map(|value| Observation::new(row, col, value)))
            .filter(|obs| support == Support::Valid || obs.value != 0.0)
            .collect();
        Self { points }
    }

    /// Take the observations at explicit coordinate lists.
    ///
    /// `rows[i]` and `cols[i]` together name the i-th observation; its value
    /// is read from `field`. Duplicate coordinates are kept.
    pub fn from_coords<T: FieldElement>(
        field: &Field<T>,
        rows: &[usize],
        cols: &[usize],
    ) -> Result<Self> {
        if rows.len() != cols.len() {
            return Err(Error::InvalidConfiguration {
                name: "cols",
                value: cols.len().to_string(),
                reason: format!("expected {} column indices to match the row indices", rows.len()),
            });
        }

        let (nrows, ncols) = field.shape();
        let points = rows
            .iter()
            .zip(cols)
            .map(|(&row, &col)| {
                if !field.contains(row, col) {
                    return Err(Error::OutOfBoundsCoordinate {
                        row,
                        col,
                        rows: nrows,
                        cols: ncols,
                    });
                }
                let cell = field.get(row, col)?;
                match cell.to_f64() {
                    Some(value) if cell.is_valid(field.nodata()) => {
                        Ok(Observation::new(row, col, value))
                    }
                    _ => Err(Error::Algorithm(format!(
                        "observation ({}, {}) holds no valid value",
                        row, col
                    ))),
                }
            })
            .collect::<Result<Vec<_>>>()?;

        Ok(Self { points })
    }

    /// Number of observations
    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&Observation> {
        self.points.get(index)
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Observation> {
        self.points.iter()
    }

    pub fn as_slice(&self) -> &[Observation] {
        &self.points
    }

    /// Row indices, in observation order
    pub fn rows(&self) -> Vec<usize> {
        self.points.iter().map(|p| p.row).collect()
    }

    /// Column indices, in observation order
    pub fn cols(&self) -> Vec<usize> {
        self.points.iter().map(|p| p.col).collect()
    }

    /// Fail with `OutOfBoundsCoordinate` on the first observation outside a
    /// `rows x cols` grid.
    pub fn check_bounds(&self, rows: usize, cols: usize) -> Result<()> {
        match self.points.iter().find(|p| p.row >= rows || p.col >= cols) {
            Some(p) => Err(Error::OutOfBoundsCoordinate {
                row: p.row,
                col: p.col,
                rows,
                cols,
            }),
            None => Ok(()),
        }
    }
}

impl FromIterator<Observation> for ObservationSet {
    fn from_iter<I: IntoIterator<Item = Observation>>(iter: I) -> Self {
        Self::new(iter.into_iter().collect())
    }
}

impl<'a> IntoIterator for &'a ObservationSet {
    type Item = &'a Observation;
    type IntoIter = std::slice::Iter<'a, Observation>;

    fn into_iter(self) -> Self::IntoIter {
        self.points.iter()
    }
}
