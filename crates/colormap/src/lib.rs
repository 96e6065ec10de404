//! # fieldrecon colormap
//!
//! Color mapping, field-to-RGBA rendering and PNG figures.
//!
//! A field is normalized into `[0, 1]` with [`ColormapParams`], mapped
//! through a [`ColorScheme`], and either returned as a raw RGBA buffer
//! ([`field_to_rgba`]) or laid out as figure panels with a color bar and
//! written to disk ([`save_panels`]).
//!
//! ## Usage
//!
//! ```ignore
//! use fieldrecon_colormap::{shared_params, save_panels, ColorScheme, Panel};
//!
//! let params = shared_params(&[&truth, &predicted], ColorScheme::Jet);
//! let panels = [Panel::new(&truth, params.clone()), Panel::new(&predicted, params)];
//! save_panels(&panels, 2, "prediction.png")?;
//! ```

mod figure;
mod render;
mod scheme;

pub use figure::{compose, render_panel, save_field_png, save_panels, Panel};
pub use render::{auto_params, field_to_rgba, shared_params, ColormapParams};
pub use scheme::{evaluate, ColorScheme, ColorStop, Rgb};
