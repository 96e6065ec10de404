//! Numeric element trait for field cells

use num_traits::{NumCast, Zero};
use std::fmt::Debug;

/// Trait for types that can be stored in a field cell.
///
/// Bounds the cell types to plain numeric values that can be cast to and
/// from `f64` and shared across threads.
pub trait FieldElement:
    Copy + Debug + PartialOrd + PartialEq + NumCast + Zero + Send + Sync + 'static
{
    /// Default no-data value for this type
    fn default_nodata() -> Self;

    /// Check if this value represents no-data
    fn is_nodata(&self, nodata: Option<Self>) -> bool;

    /// Convert self to f64
    fn to_f64(self) -> Option<f64> {
        NumCast::from(self)
    }

    /// A cell is valid when it is not no-data and converts to a finite `f64`.
    fn is_valid(&self, nodata: Option<Self>) -> bool {
        !self.is_nodata(nodata) && self.to_f64().is_some_and(f64::is_finite)
    }
}

macro_rules! impl_field_element_int {
    ($($t:ty),*) => {
        $(
            impl FieldElement for $t {
                fn default_nodata() -> Self {
                    <$t>::MIN
                }

                fn is_nodata(&self, nodata: Option<Self>) -> bool {
                    nodata == Some(*self)
                }
            }
        )*
    };
}

macro_rules! impl_field_element_float {
    ($($t:ty),*) => {
        $(
            impl FieldElement for $t {
                fn default_nodata() -> Self {
                    <$t>::NAN
                }

                fn is_nodata(&self, nodata: Option<Self>) -> bool {
                    if self.is_nan() {
                        return true;
                    }
                    match nodata {
                        Some(nd) => (self - nd).abs() < <$t>::EPSILON * 100.0,
                        None => false,
                    }
                }
            }
        )*
    };
}

impl_field_element_int!(i8, i16, i32, i64, u8, u16, u32, u64);
impl_field_element_float!(f32, f64);
