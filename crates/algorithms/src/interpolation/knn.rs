//! k-nearest-neighbor interpolation with inverse-exponential-distance weights
//!
//! Every cell of the target grid is estimated from its k closest
//! observations. Each selected neighbor at distance `d` receives the weight
//! `exp(-d)`, weights are normalized to sum to one, and the estimate is the
//! weighted sum of the neighbors' values:
//!
//! ```text
//! z(r,c) = Σ vi · wi / Σ wj      over the k nearest observations
//! where wi = exp(-d(r,c, ri,ci))
//! ```
//!
//! Distances are Euclidean in (row, col) index space. Neighbors at equal
//! distance are taken in observation order.

use std::cmp::Ordering;

use fieldrecon_core::{Error, Field, FieldElement, Result};
use tracing::debug;

use super::{ObservationSet, Support};
use crate::maybe_rayon::*;

/// Parameters for k-nearest-neighbor interpolation
#[derive(Debug, Clone)]
pub struct KnnParams {
    /// Number of nearest observations combined per cell (default: 5).
    /// Values above the observation count use every observation.
    pub k: usize,
    /// Output field rows. Callers normally supply the shape of the field
    /// being reconstructed; the default only fills in a placeholder grid.
    pub rows: usize,
    /// Output field columns, see `rows`
    pub cols: usize,
}

impl Default for KnnParams {
    fn default() -> Self {
        Self {
            k: 5,
            rows: 100,
            cols: 100,
        }
    }
}

/// One selected observation relative to a query cell.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Neighbor {
    /// Position in the observation set
    pub index: usize,
    pub row: usize,
    pub col: usize,
    pub value: f64,
    /// Euclidean distance to the query cell
    pub distance: f64,
    /// Normalized weight; the weights of one query sum to 1
    pub weight: f64,
}

/// Reconstructs a dense field from an observation set.
///
/// The observation set, k and the target shape are fixed at construction;
/// [`predict`](Self::predict) is a pure function of them and can be called
/// any number of times.
#[derive(Debug, Clone)]
pub struct KnnInterpolator {
    observations: ObservationSet,
    k: usize,
    rows: usize,
    cols: usize,
}

impl KnnInterpolator {
    /// Validate the configuration and take ownership of the observations.
    ///
    /// # Errors
    /// - [`Error::InvalidConfiguration`] if `k < 1`
    /// - [`Error::InvalidDimensions`] if the target grid has no cells
    /// - [`Error::EmptyObservationSet`] if there is nothing to interpolate from
    /// - [`Error::OutOfBoundsCoordinate`] if an observation lies outside the grid
    pub fn new(observations: ObservationSet, params: KnnParams) -> Result<Self> {
        if params.k < 1 {
            return Err(Error::InvalidConfiguration {
                name: "k",
                value: params.k.to_string(),
                reason: "at least one neighbor is required".into(),
            });
        }
        if params.rows == 0 || params.cols == 0 {
            return Err(Error::InvalidDimensions {
                rows: params.rows,
                cols: params.cols,
            });
        }
        if observations.is_empty() {
            return Err(Error::EmptyObservationSet);
        }
        observations.check_bounds(params.rows, params.cols)?;

        if params.k > observations.len() {
            debug!(
                k = params.k,
                observations = observations.len(),
                "k exceeds the observation count, every observation will be used"
            );
        }

        Ok(Self {
            observations,
            k: params.k,
            rows: params.rows,
            cols: params.cols,
        })
    }

    /// Build from the support of an observed field; the target grid has the
    /// observed field's shape.
    pub fn from_field<T: FieldElement>(
        observed: &Field<T>,
        support: Support,
        k: usize,
    ) -> Result<Self> {
        let (rows, cols) = observed.shape();
        Self::new(
            ObservationSet::from_field(observed, support),
            KnnParams { k, rows, cols },
        )
    }

    /// Build from explicit coordinate lists into an observed field.
    pub fn from_coords<T: FieldElement>(
        observed: &Field<T>,
        rows: &[usize],
        cols: &[usize],
        shape: (usize, usize),
        k: usize,
    ) -> Result<Self> {
        Self::new(
            ObservationSet::from_coords(observed, rows, cols)?,
            KnnParams {
                k,
                rows: shape.0,
                cols: shape.1,
            },
        )
    }

    /// Configured neighbor count
    pub fn k(&self) -> usize {
        self.k
    }

    /// Neighbors actually combined per cell: `min(k, observations)`
    pub fn effective_k(&self) -> usize {
        self.k.min(self.observations.len())
    }

    /// Target grid shape as (rows, cols)
    pub fn shape(&self) -> (usize, usize) {
        (self.rows, self.cols)
    }

    pub fn observations(&self) -> &ObservationSet {
        &self.observations
    }

    /// Coordinates of the nearest observations to (row, col), closest first.
    ///
    /// Returns `(rows, cols)` of length [`effective_k`](Self::effective_k).
    pub fn knearest(&self, row: usize, col: usize) -> (Vec<usize>, Vec<usize>) {
        let mut scratch = Vec::with_capacity(self.observations.len());
        self.select(row, col, &mut scratch);

        let points = self.observations.as_slice();
        scratch
            .iter()
            .map(|&(_, idx)| (points[idx].row, points[idx].col))
            .unzip()
    }

    /// The selected neighbors of (row, col) with distances and normalized weights.
    pub fn neighbors(&self, row: usize, col: usize) -> Vec<Neighbor> {
        let mut scratch = Vec::with_capacity(self.observations.len());
        self.select(row, col, &mut scratch);
        let total = weigh(&mut scratch);

        let points = self.observations.as_slice();
        scratch
            .iter()
            .map(|&(w, idx)| {
                let p = points[idx];
                Neighbor {
                    index: idx,
                    row: p.row,
                    col: p.col,
                    value: p.value,
                    distance: p.dist(row, col),
                    weight: w / total,
                }
            })
            .collect()
    }

    /// Estimate every cell of the target grid.
    pub fn predict(&self) -> Result<Field<f64>> {
        let rows = self.rows;
        let cols = self.cols;

        let data: Vec<f64> = (0..rows)
            .into_par_iter()
            .flat_map(|row| {
                let mut scratch = Vec::with_capacity(self.observations.len());
                (0..cols)
                    .map(|col| self.estimate(row, col, &mut scratch))
                    .collect::<Vec<f64>>()
            })
            .collect();

        Field::from_vec(data, rows, cols)
    }

    fn estimate(&self, row: usize, col: usize, scratch: &mut Vec<(f64, usize)>) -> f64 {
        self.select(row, col, scratch);
        let total = weigh(scratch);

        let points = self.observations.as_slice();
        scratch
            .iter()
            .map(|&(w, idx)| points[idx].value * (w / total))
            .sum()
    }

    /// Fill `scratch` with `(squared distance, index)` of the nearest
    /// observations, ascending by distance then index.
    fn select(&self, row: usize, col: usize, scratch: &mut Vec<(f64, usize)>) {
        scratch.clear();
        scratch.extend(
            self.observations
                .iter()
                .enumerate()
                .map(|(idx, p)| (p.dist_sq(row, col), idx)),
        );

        let k = self.effective_k();
        if k < scratch.len() {
            scratch.select_nth_unstable_by(k - 1, by_distance_then_index);
            scratch.truncate(k);
        }
        // (distance, index) pairs are unique, so this matches a stable sort
        scratch.sort_unstable_by(by_distance_then_index);
    }
}

fn by_distance_then_index(a: &(f64, usize), b: &(f64, usize)) -> Ordering {
    a.0.total_cmp(&b.0).then(a.1.cmp(&b.1))
}

/// Replace squared distances with unnormalized weights and return their sum.
///
/// Weights are `exp(-(d - d0))` with `d0` the nearest distance. The common
/// factor `exp(d0)` cancels on normalization and keeps the nearest weight at
/// 1, so far-away cells cannot underflow every weight to zero.
fn weigh(selected: &mut [(f64, usize)]) -> f64 {
    let Some(&(nearest_sq, _)) = selected.first() else {
        return 0.0;
    };
    let d0 = nearest_sq.sqrt();

    let mut total = 0.0;
    for entry in selected.iter_mut() {
        let w = (-(entry.0.sqrt() - d0)).exp();
        entry.0 = w;
        total += w;
    }
    total
}

/// Perform k-nearest-neighbor interpolation from observations to a dense field.
///
/// # Arguments
/// * `observations` - Known samples on the target grid
/// * `params` - Neighbor count and output grid shape
///
/// # Returns
/// Field of shape `(params.rows, params.cols)` with an estimate in every cell
pub fn knn_interpolation(observations: &ObservationSet, params: KnnParams) -> Result<Field<f64>> {
    KnnInterpolator::new(observations.clone(), params)?.predict()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::interpolation::Observation;

    fn corner_observations() -> ObservationSet {
        vec![
            Observation::new(0, 0, 10.0),
            Observation::new(0, 9, 20.0),
            Observation::new(9, 0, 30.0),
            Observation::new(9, 9, 40.0),
            Observation::new(4, 5, 25.0),
        ]
        .into_iter()
        .collect()
    }

    fn params(k: usize) -> KnnParams {
        KnnParams {
            k,
            rows: 10,
            cols: 10,
        }
    }

    #[test]
    fn test_two_point_scenario() {
        let obs: ObservationSet = vec![Observation::new(0, 0, 10.0), Observation::new(0, 2, 20.0)]
            .into_iter()
            .collect();
        let interp = KnnInterpolator::new(obs, KnnParams { k: 2, rows: 1, cols: 3 }).unwrap();
        let result = interp.predict().unwrap();
        assert_eq!(result.shape(), (1, 3));

        let far = (-2.0_f64).exp();
        let left = 10.0 * (1.0 / (1.0 + far)) + 20.0 * (far / (1.0 + far));
        let right = 20.0 * (1.0 / (1.0 + far)) + 10.0 * (far / (1.0 + far));

        assert!((result.get(0, 0).unwrap() - left).abs() < 1e-12);
        assert!((result.get(0, 2).unwrap() - right).abs() < 1e-12);
        // Equidistant neighbors share the weight evenly
        assert!((result.get(0, 1).unwrap() - 15.0).abs() < 1e-12);

        assert!(result.get(0, 0).unwrap() < 12.0);
        assert!(result.get(0, 2).unwrap() > 18.0);
    }

    #[test]
    fn test_single_observation_fills_grid() {
        let obs: ObservationSet = vec![Observation::new(1, 0, 5.0)].into_iter().collect();
        let interp = KnnInterpolator::new(obs, KnnParams { k: 1, rows: 2, cols: 2 }).unwrap();
        let result = interp.predict().unwrap();

        for row in 0..2 {
            for col in 0..2 {
                assert_eq!(result.get(row, col).unwrap(), 5.0);
            }
        }
    }

    #[test]
    fn test_k1_exact_at_observations() {
        let obs = corner_observations();
        let interp = KnnInterpolator::new(obs.clone(), params(1)).unwrap();
        let result = interp.predict().unwrap();

        for p in &obs {
            assert_eq!(result.get(p.row, p.col).unwrap(), p.value);
        }
    }

    #[test]
    fn test_observation_dominates_its_own_cell() {
        let interp = KnnInterpolator::new(corner_observations(), params(5)).unwrap();
        let neighbors = interp.neighbors(4, 5);

        assert_eq!(neighbors[0].index, 4);
        assert_eq!(neighbors[0].distance, 0.0);
        assert!(neighbors[0].weight > 0.99);
    }

    #[test]
    fn test_partition_of_unity() {
        let obs = corner_observations();
        for k in 1..=7 {
            let interp = KnnInterpolator::new(obs.clone(), params(k)).unwrap();
            for row in 0..10 {
                for col in 0..10 {
                    let sum: f64 = interp.neighbors(row, col).iter().map(|n| n.weight).sum();
                    assert!((sum - 1.0).abs() < 1e-9, "k={} ({}, {}) sums to {}", k, row, col, sum);
                }
            }
        }
    }

    #[test]
    fn test_knearest_count_and_order() {
        let obs = corner_observations();
        for k in 1..=8 {
            let interp = KnnInterpolator::new(obs.clone(), params(k)).unwrap();
            let (rows, cols) = interp.knearest(2, 7);
            assert_eq!(rows.len(), k.min(obs.len()));
            assert_eq!(cols.len(), rows.len());

            let dists: Vec<f64> = rows
                .iter()
                .zip(&cols)
                .map(|(&r, &c)| Observation::new(r, c, 0.0).dist(2, 7))
                .collect();
            assert!(dists.windows(2).all(|w| w[0] <= w[1]), "not ascending: {:?}", dists);
        }
    }

    #[test]
    fn test_knearest_matches_brute_force() {
        let interp = KnnInterpolator::new(corner_observations(), params(3)).unwrap();
        // From (1, 8): (0,9) at √2, (4,5) at √18, (0,0) at √65
        let (rows, cols) = interp.knearest(1, 8);
        assert_eq!(rows, vec![0, 4, 0]);
        assert_eq!(cols, vec![9, 5, 0]);
    }

    #[test]
    fn test_ties_follow_observation_order() {
        let a = Observation::new(0, 0, 1.0);
        let b = Observation::new(0, 2, 2.0);
        let shape = KnnParams { k: 1, rows: 1, cols: 3 };

        let forward = KnnInterpolator::new(vec![a, b].into_iter().collect(), shape.clone()).unwrap();
        assert_eq!(forward.knearest(0, 1), (vec![0], vec![0]));

        let reverse = KnnInterpolator::new(vec![b, a].into_iter().collect(), shape).unwrap();
        assert_eq!(reverse.knearest(0, 1), (vec![0], vec![2]));
        assert_eq!(reverse.predict().unwrap().get(0, 1).unwrap(), 2.0);
    }

    #[test]
    fn test_duplicates_are_independent_candidates() {
        let obs: ObservationSet = vec![
            Observation::new(0, 0, 10.0),
            Observation::new(0, 0, 10.0),
            Observation::new(0, 4, 20.0),
        ]
        .into_iter()
        .collect();
        let interp = KnnInterpolator::new(obs, KnnParams { k: 3, rows: 1, cols: 5 }).unwrap();

        // Midway, the duplicated point holds two thirds of the weight
        let neighbors = interp.neighbors(0, 2);
        assert_eq!(neighbors.len(), 3);
        assert_eq!(neighbors[0].index, 0);
        assert_eq!(neighbors[1].index, 1);
        let value = interp.predict().unwrap().get(0, 2).unwrap();
        assert!((value - 40.0 / 3.0).abs() < 1e-12);
    }

    #[test]
    fn test_k_above_count_uses_all_observations() {
        let obs = corner_observations();
        let all = KnnInterpolator::new(obs.clone(), params(5)).unwrap().predict().unwrap();
        let more = KnnInterpolator::new(obs, params(50)).unwrap();

        assert_eq!(more.k(), 50);
        assert_eq!(more.effective_k(), 5);
        assert_eq!(more.predict().unwrap().data(), all.data());
    }

    #[test]
    fn test_estimates_stay_within_observed_range() {
        let obs = corner_observations();
        for k in 1..=5 {
            let result = KnnInterpolator::new(obs.clone(), params(k)).unwrap().predict().unwrap();
            for &v in result.data().iter() {
                assert!((10.0..=40.0).contains(&v), "k={} produced {}", k, v);
            }
        }
    }

    #[test]
    fn test_predict_matches_neighbor_weights() {
        let interp = KnnInterpolator::new(corner_observations(), params(3)).unwrap();
        let result = interp.predict().unwrap();

        for row in 0..10 {
            for col in 0..10 {
                let expected: f64 = interp
                    .neighbors(row, col)
                    .iter()
                    .map(|n| n.value * n.weight)
                    .sum();
                assert_eq!(result.get(row, col).unwrap().to_bits(), expected.to_bits());
            }
        }
    }

    #[test]
    fn test_deterministic() {
        let first = KnnInterpolator::new(corner_observations(), params(4)).unwrap();
        let second = KnnInterpolator::new(corner_observations(), params(4)).unwrap();

        let a = first.predict().unwrap();
        let b = first.predict().unwrap();
        let c = second.predict().unwrap();

        let bits = |f: &Field<f64>| f.data().iter().map(|v| v.to_bits()).collect::<Vec<_>>();
        assert_eq!(bits(&a), bits(&b));
        assert_eq!(bits(&a), bits(&c));
    }

    #[test]
    fn test_far_cells_do_not_underflow() {
        let obs: ObservationSet = vec![Observation::new(0, 0, 1.0), Observation::new(0, 1, 3.0)]
            .into_iter()
            .collect();
        let interp = KnnInterpolator::new(obs, KnnParams { k: 2, rows: 1, cols: 2000 }).unwrap();
        let result = interp.predict().unwrap();

        let far = result.get(0, 1999).unwrap();
        assert!(far.is_finite());
        assert!(far > 2.0 && far < 3.0);
    }

    #[test]
    fn test_predictions_change_continuously_in_k() {
        let obs = corner_observations();
        let range = 40.0 - 10.0;

        for k in 1..obs.len() {
            let fewer = KnnInterpolator::new(obs.clone(), params(k)).unwrap();
            let more = KnnInterpolator::new(obs.clone(), params(k + 1)).unwrap();
            let a = fewer.predict().unwrap();
            let b = more.predict().unwrap();

            for row in 0..10 {
                for col in 0..10 {
                    // Adding a neighbor of weight w moves the estimate by w * (v - estimate)
                    let added = *more.neighbors(row, col).last().unwrap();
                    let change = (b.get(row, col).unwrap() - a.get(row, col).unwrap()).abs();
                    assert!(
                        change <= added.weight * range + 1e-12,
                        "k={} ({}, {}): moved {} with new weight {}",
                        k,
                        row,
                        col,
                        change,
                        added.weight
                    );
                }
            }
        }

        // (9, 9) is ~12.7 cells from the corner and barely registers there
        let four = KnnInterpolator::new(obs.clone(), params(4)).unwrap().predict().unwrap();
        let five = KnnInterpolator::new(obs, params(5)).unwrap().predict().unwrap();
        assert!((five.get(0, 0).unwrap() - four.get(0, 0).unwrap()).abs() < 1e-3);
    }

    #[test]
    fn test_shifted_weights_match_plain_exponentials() {
        let obs: ObservationSet = (0..8)
            .flat_map(|i| (0..8).map(move |j| (i * 5 + 2, j * 5 + 2)))
            .map(|(r, c)| {
                let value = 290.0 + (r as f64 * 0.3).sin() * 10.0 + c as f64 * 0.2;
                Observation::new(r, c, value)
            })
            .collect();
        let interp = KnnInterpolator::new(obs, KnnParams { k: 4, rows: 40, cols: 40 }).unwrap();
        let result = interp.predict().unwrap();

        for row in 0..40 {
            for col in 0..40 {
                let neighbors = interp.neighbors(row, col);
                let total: f64 = neighbors.iter().map(|n| (-n.distance).exp()).sum();
                let plain: f64 = neighbors
                    .iter()
                    .map(|n| n.value * ((-n.distance).exp() / total))
                    .sum();
                let shifted = result.get(row, col).unwrap();
                assert!(
                    (shifted - plain).abs() <= 1e-12 * plain.abs(),
                    "({}, {}): {} vs {}",
                    row,
                    col,
                    shifted,
                    plain
                );
            }
        }
    }

    #[test]
    fn test_invalid_k() {
        let result = KnnInterpolator::new(corner_observations(), params(0));
        assert!(matches!(result, Err(Error::InvalidConfiguration { name: "k", .. })));
    }

    #[test]
    fn test_empty_observations() {
        let result = KnnInterpolator::new(ObservationSet::default(), params(3));
        assert!(matches!(result, Err(Error::EmptyObservationSet)));

        let result = knn_interpolation(&ObservationSet::default(), params(3));
        assert!(matches!(result, Err(Error::EmptyObservationSet)));
    }

    #[test]
    fn test_out_of_bounds_observation() {
        let obs: ObservationSet = vec![Observation::new(10, 2, 1.0)].into_iter().collect();
        let result = KnnInterpolator::new(obs, params(1));
        assert!(matches!(
            result,
            Err(Error::OutOfBoundsCoordinate { row: 10, col: 2, rows: 10, cols: 10 })
        ));
    }

    #[test]
    fn test_empty_grid() {
        let result = KnnInterpolator::new(corner_observations(), KnnParams { k: 1, rows: 0, cols: 10 });
        assert!(matches!(result, Err(Error::InvalidDimensions { .. })));
    }

    #[test]
    fn test_from_field_uses_field_shape() {
        let mut observed: Field<f64> = Field::new(4, 6);
        observed.set(0, 0, 300.0).unwrap();
        observed.set(3, 5, 310.0).unwrap();

        let interp = KnnInterpolator::from_field(&observed, Support::NonZero, 5).unwrap();
        assert_eq!(interp.shape(), (4, 6));
        assert_eq!(interp.observations().len(), 2);
        assert_eq!(interp.effective_k(), 2);

        let result = interp.predict().unwrap();
        assert_eq!(result.shape(), (4, 6));
        assert!(result.data().iter().all(|&v| (300.0..=310.0).contains(&v)));
    }

    #[test]
    fn test_from_field_without_observations() {
        let observed: Field<f64> = Field::new(4, 6);
        let result = KnnInterpolator::from_field(&observed, Support::NonZero, 5);
        assert!(matches!(result, Err(Error::EmptyObservationSet)));
    }

    #[test]
    fn test_from_coords_into_larger_grid() {
        let mut observed: Field<f64> = Field::new(3, 3);
        observed.set(1, 1, 7.0).unwrap();
        observed.set(2, 0, 9.0).unwrap();

        let interp = KnnInterpolator::from_coords(&observed, &[1, 2], &[1, 0], (5, 5), 1).unwrap();
        let result = interp.predict().unwrap();
        assert_eq!(result.shape(), (5, 5));
        assert_eq!(result.get(1, 1).unwrap(), 7.0);
        assert_eq!(result.get(4, 0).unwrap(), 9.0);
    }

    #[test]
    fn test_instances_are_independent() {
        let near = KnnInterpolator::new(corner_observations(), params(1)).unwrap();
        let wide = KnnInterpolator::new(corner_observations(), params(5)).unwrap();

        let a = near.predict().unwrap();
        let _ = wide.predict().unwrap();
        assert_eq!(near.predict().unwrap().data(), a.data());
    }
}
