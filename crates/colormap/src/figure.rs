//! Figure panels: a rendered field next to its color bar, saved as PNG.

use std::path::Path;

use fieldrecon_core::{Error, Field, FieldElement, Result};
use image::{Rgba, RgbaImage};

use crate::render::{field_to_rgba, ColormapParams};
use crate::scheme::evaluate;

/// Padding around and between panels, in pixels
const MARGIN: u32 = 8;
/// Space between a field and its color bar
const BAR_GAP: u32 = 4;
const BAR_WIDTH: u32 = 12;
const BACKGROUND: Rgba<u8> = Rgba([255, 255, 255, 255]);
/// Largest panel rendered, 1 GiB of RGBA
const MAX_PIXELS: u64 = 1 << 28;

/// One field of a figure together with its color mapping.
#[derive(Debug, Clone)]
pub struct Panel<'a, T: FieldElement> {
    pub field: &'a Field<T>,
    pub params: ColormapParams,
}

impl<'a, T: FieldElement> Panel<'a, T> {
    pub fn new(field: &'a Field<T>, params: ColormapParams) -> Self {
        Self { field, params }
    }
}

fn to_u32(value: usize, name: &'static str) -> Result<u32> {
    u32::try_from(value).map_err(|_| Error::InvalidConfiguration {
        name,
        value: value.to_string(),
        reason: "too large for an image".into(),
    })
}

/// Render one field, magnified `scale` times, with a vertical color bar on
/// its right running from `params.max` (top) to `params.min` (bottom).
pub fn render_panel<T: FieldElement>(
    field: &Field<T>,
    params: &ColormapParams,
    scale: u32,
) -> Result<RgbaImage> {
    if scale == 0 {
        return Err(Error::InvalidConfiguration {
            name: "scale",
            value: scale.to_string(),
            reason: "must be at least 1".into(),
        });
    }

    let rows = to_u32(field.rows(), "rows")?;
    let cols = to_u32(field.cols(), "cols")?;
    let too_large = || Error::InvalidConfiguration {
        name: "scale",
        value: scale.to_string(),
        reason: format!("a {} x {} field does not fit in an image at this scale", rows, cols),
    };
    let width = cols
        .checked_mul(scale)
        .and_then(|w| w.checked_add(BAR_GAP + BAR_WIDTH))
        .ok_or_else(too_large)?;
    let height = rows.checked_mul(scale).ok_or_else(too_large)?;
    if u64::from(width) * u64::from(height) > MAX_PIXELS {
        return Err(too_large());
    }
    let mut img = RgbaImage::from_pixel(width, height, BACKGROUND);

    let rgba = field_to_rgba(field, params);
    for (i, px) in rgba.chunks_exact(4).enumerate() {
        let row = i as u32 / cols;
        let col = i as u32 % cols;
        let color = Rgba([px[0], px[1], px[2], px[3]]);
        for dy in 0..scale {
            for dx in 0..scale {
                img.put_pixel(col * scale + dx, row * scale + dy, color);
            }
        }
    }

    let bar_x = cols * scale + BAR_GAP;
    for y in 0..height {
        let t = if height > 1 {
            1.0 - y as f64 / (height - 1) as f64
        } else {
            0.5
        };
        let c = evaluate(params.scheme, t);
        for x in bar_x..bar_x + BAR_WIDTH {
            img.put_pixel(x, y, Rgba([c.r, c.g, c.b, 255]));
        }
    }

    Ok(img)
}

/// Lay rendered panels out left to right on a white background.
pub fn compose(images: &[RgbaImage]) -> RgbaImage {
    let width = MARGIN + images.iter().map(|img| img.width() + MARGIN).sum::<u32>();
    let height = 2 * MARGIN + images.iter().map(RgbaImage::height).max().unwrap_or(0);
    let mut canvas = RgbaImage::from_pixel(width, height, BACKGROUND);

    let mut x0 = MARGIN;
    for img in images {
        for (x, y, px) in img.enumerate_pixels() {
            canvas.put_pixel(x0 + x, MARGIN + y, *px);
        }
        x0 += img.width() + MARGIN;
    }

    canvas
}

fn save_png<P: AsRef<Path>>(img: &RgbaImage, path: P) -> Result<()> {
    img.save_with_format(path.as_ref(), image::ImageFormat::Png)
        .map_err(|e| match e {
            image::ImageError::IoError(io) => Error::Io(io),
            other => Error::Other(format!("PNG encode error: {}", other)),
        })
}

/// Render each panel and write them side by side to a PNG file.
pub fn save_panels<T, P>(panels: &[Panel<'_, T>], scale: u32, path: P) -> Result<()>
where
    T: FieldElement,
    P: AsRef<Path>,
{
    let images = panels
        .iter()
        .map(|p| render_panel(p.field, &p.params, scale))
        .collect::<Result<Vec<_>>>()?;
    save_png(&compose(&images), path)
}

/// Write a single field with its color bar to a PNG file.
pub fn save_field_png<T, P>(
    field: &Field<T>,
    params: &ColormapParams,
    scale: u32,
    path: P,
) -> Result<()>
where
    T: FieldElement,
    P: AsRef<Path>,
{
    save_png(&render_panel(field, params, scale)?, path)
}
