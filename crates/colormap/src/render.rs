//! Field-to-RGBA rendering using color schemes.

use crate::scheme::{evaluate, ColorScheme, Rgb};
use fieldrecon_core::{Field, FieldElement};

/// Parameters for colormap rendering.
#[derive(Debug, Clone)]
pub struct ColormapParams {
    /// Color scheme to use.
    pub scheme: ColorScheme,
    /// Value mapped to the start of the scheme. Lower values are clamped.
    pub min: f64,
    /// Value mapped to the end of the scheme. Higher values are clamped.
    pub max: f64,
    /// Color for no-data cells (RGBA). Default: fully transparent.
    pub nodata_color: [u8; 4],
}

impl ColormapParams {
    /// Params over the unit range; see [`auto_params`] to fit a field.
    pub fn new(scheme: ColorScheme) -> Self {
        Self::with_range(scheme, 0.0, 1.0)
    }

    /// Params with an explicit min/max range.
    pub fn with_range(scheme: ColorScheme, min: f64, max: f64) -> Self {
        Self {
            scheme,
            min,
            max,
            nodata_color: [0, 0, 0, 0],
        }
    }

    /// Position of `value` in the range, unclamped.
    pub fn normalize(&self, value: f64) -> f64 {
        let range = self.max - self.min;
        if range.abs() > f64::EPSILON {
            (value - self.min) / range
        } else {
            0.0
        }
    }
}

fn value_range<T: FieldElement>(field: &Field<T>) -> Option<(f64, f64)> {
    let stats = field.statistics();
    stats.min.zip(stats.max)
}

fn params_from_range(range: Option<(f64, f64)>, scheme: ColorScheme) -> ColormapParams {
    match range {
        // Constant field: widen so every cell lands on the first color
        Some((min, max)) if (max - min).abs() < f64::EPSILON => {
            ColormapParams::with_range(scheme, min, min + 1.0)
        }
        Some((min, max)) => ColormapParams::with_range(scheme, min, max),
        None => ColormapParams::new(scheme),
    }
}

/// Detect the value range of a field, returning `ColormapParams` ready to use.
///
/// All-no-data fields fall back to `[0, 1]`.
pub fn auto_params<T: FieldElement>(field: &Field<T>, scheme: ColorScheme) -> ColormapParams {
    params_from_range(value_range(field), scheme)
}

/// One range covering several fields, so they share a color scale.
pub fn shared_params<T: FieldElement>(fields: &[&Field<T>], scheme: ColorScheme) -> ColormapParams {
    let range = fields
        .iter()
        .filter_map(|f| value_range(f))
        .reduce(|(lo, hi), (min, max)| (lo.min(min), hi.max(max)));
    params_from_range(range, scheme)
}

/// Convert a field to an RGBA pixel buffer.
///
/// Returns `rows * cols * 4` bytes in row-major order. No-data cells are
/// rendered with `params.nodata_color`.
pub fn field_to_rgba<T: FieldElement>(field: &Field<T>, params: &ColormapParams) -> Vec<u8> {
    let nodata = field.nodata();
    let mut rgba = Vec::with_capacity(field.len() * 4);

    for &val in field.data().iter() {
        match val.to_f64() {
            Some(v) if val.is_valid(nodata) => {
                let Rgb { r, g, b } = evaluate(params.scheme, params.normalize(v));
                rgba.extend_from_slice(&[r, g, b, 255]);
            }
            _ => rgba.extend_from_slice(&params.nodata_color),
        }
    }

    rgba
}
