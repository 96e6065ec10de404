//! Synthetic temperature fields for trying the pipeline without sensor data.

use fieldrecon_core::{Field, Result};

/// A Gaussian bump added to the background temperature.
struct HeatSource {
    /// Center as a fraction of (rows, cols)
    center: (f64, f64),
    /// Peak temperature offset in kelvin; negative values are cold spots
    amplitude: f64,
    /// Standard deviation as a fraction of the shorter grid side
    spread: f64,
}

const SOURCES: &[HeatSource] = &[
    HeatSource { center: (0.30, 0.25), amplitude: 12.0, spread: 0.15 },
    HeatSource { center: (0.70, 0.70), amplitude: 8.0, spread: 0.20 },
    HeatSource { center: (0.20, 0.80), amplitude: -4.0, spread: 0.10 },
];

/// Background temperature plus a few smooth heat sources.
pub fn temperature_field(rows: usize, cols: usize, base: f64) -> Result<Field<f64>> {
    let side = rows.min(cols).max(1) as f64;
    let mut data = Vec::with_capacity(rows * cols);

    for row in 0..rows {
        for col in 0..cols {
            let bump: f64 = SOURCES
                .iter()
                .map(|s| {
                    let dr = row as f64 - s.center.0 * rows as f64;
                    let dc = col as f64 - s.center.1 * cols as f64;
                    let sigma = s.spread * side;
                    s.amplitude * (-(dr * dr + dc * dc) / (2.0 * sigma * sigma)).exp()
                })
                .sum();
            data.push(base + bump);
        }
    }

    Field::from_vec(data, rows, cols)
}

/// Keep the readings of sensors placed every `stride` cells, starting half a
/// stride in from the top-left corner; every other cell is zero.
pub fn sample_sensors(truth: &Field<f64>, stride: usize) -> Result<Field<f64>> {
    let stride = stride.max(1);
    let mut observed = truth.like(0.0);

    for row in (stride / 2..truth.rows()).step_by(stride) {
        for col in (stride / 2..truth.cols()).step_by(stride) {
            observed.set(row, col, truth.get(row, col)?)?;
        }
    }

    Ok(observed)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn field_stays_near_base() {
        let field = temperature_field(60, 80, 298.0).unwrap();
        let stats = field.statistics();
        assert_eq!(field.shape(), (60, 80));
        assert!(stats.min.unwrap() > 290.0);
        assert!(stats.max.unwrap() < 312.0);
        assert!(stats.max.unwrap() > 305.0);
    }

    #[test]
    fn sensors_on_lattice() {
        let truth = temperature_field(20, 20, 298.0).unwrap();
        let observed = sample_sensors(&truth, 5).unwrap();

        let sensors: Vec<_> = observed.valid_cells().filter(|&(_, _, v)| v != 0.0).collect();
        assert_eq!(sensors.len(), 16);
        assert_eq!(observed.get(2, 2).unwrap(), truth.get(2, 2).unwrap());
        assert_eq!(observed.get(0, 0).unwrap(), 0.0);
    }
}
