//! Single-band TIFF reading/writing
//!
//! Fields are written as 32-bit float images. The no-data marker travels in
//! the GDAL_NODATA ASCII tag so that GIS tools and this reader agree on it.

use crate::error::{Error, Result};
use crate::field::{Field, FieldElement};
use std::fs::File;
use std::io::{BufReader, BufWriter, Cursor, Read, Seek, Write};
use std::path::Path;
use tiff::decoder::{Decoder, DecodingResult};
use tiff::encoder::colortype::Gray32Float;
use tiff::encoder::TiffEncoder;
use tiff::tags::Tag;

/// GDAL_NODATA
const NODATA_TAG: u16 = 42113;

/// Read a TIFF file into a Field
pub fn read_field<T, P>(path: P) -> Result<Field<T>>
where
    T: FieldElement,
    P: AsRef<Path>,
{
    let file = File::open(path.as_ref())?;
    decode_field(BufReader::new(file))
}

/// Read a TIFF image from an in-memory buffer into a Field
pub fn read_field_from_buffer<T: FieldElement>(data: &[u8]) -> Result<Field<T>> {
    decode_field(Cursor::new(data))
}

fn cast_samples<S, T>(buf: Vec<S>) -> Vec<T>
where
    S: num_traits::NumCast,
    T: FieldElement,
{
    buf.into_iter()
        .map(|v| num_traits::cast(v).unwrap_or_else(T::default_nodata))
        .collect()
}

fn decode_field<T, R>(reader: R) -> Result<Field<T>>
where
    T: FieldElement,
    R: Read + Seek,
{
    let mut decoder =
        Decoder::new(reader).map_err(|e| Error::Other(format!("TIFF decode error: {}", e)))?;

    let (width, height) = decoder
        .dimensions()
        .map_err(|e| Error::Other(format!("Cannot read dimensions: {}", e)))?;
    let rows = height as usize;
    let cols = width as usize;

    let image = decoder
        .read_image()
        .map_err(|e| Error::Other(format!("Cannot read image data: {}", e)))?;

    let data: Vec<T> = match image {
        DecodingResult::F32(buf) => cast_samples(buf),
        DecodingResult::F64(buf) => cast_samples(buf),
        DecodingResult::U8(buf) => cast_samples(buf),
        DecodingResult::U16(buf) => cast_samples(buf),
        DecodingResult::U32(buf) => cast_samples(buf),
        DecodingResult::I8(buf) => cast_samples(buf),
        DecodingResult::I16(buf) => cast_samples(buf),
        DecodingResult::I32(buf) => cast_samples(buf),
        _ => {
            return Err(Error::UnsupportedDataType(
                "Unsupported TIFF sample format".to_string(),
            ))
        }
    };

    // Multi-sample (RGB etc.) images decode into more samples than cells
    if data.len() != rows * cols {
        return Err(Error::UnsupportedDataType(format!(
            "Expected a single-band image, got {} samples for {}x{} pixels",
            data.len(),
            rows,
            cols
        )));
    }

    let mut field = Field::from_vec(data, rows, cols)?;
    field.set_nodata(read_nodata(&mut decoder));

    Ok(field)
}

fn read_nodata<T, R>(decoder: &mut Decoder<R>) -> Option<T>
where
    T: FieldElement,
    R: Read + Seek,
{
    let text = decoder
        .get_tag_ascii_string(Tag::from_u16_exhaustive(NODATA_TAG))
        .ok()?;
    let value: f64 = text
        .trim_matches(|c: char| c == '\0' || c.is_whitespace())
        .parse()
        .ok()?;
    num_traits::cast(value)
}

/// Write a Field to a TIFF file as 32-bit float samples
pub fn write_field<T, P>(field: &Field<T>, path: P) -> Result<()>
where
    T: FieldElement,
    P: AsRef<Path>,
{
    let file = File::create(path.as_ref())?;
    let mut writer = BufWriter::new(file);
    encode_field(field, &mut writer)?;
    writer.flush()?;
    Ok(())
}

/// Write a Field to an in-memory TIFF buffer
pub fn write_field_to_buffer<T: FieldElement>(field: &Field<T>) -> Result<Vec<u8>> {
    let mut buf = Vec::new();
    encode_field(field, Cursor::new(&mut buf))?;
    Ok(buf)
}

fn encode_field<T, W>(field: &Field<T>, writer: W) -> Result<()>
where
    T: FieldElement,
    W: Write + Seek,
{
    let mut encoder =
        TiffEncoder::new(writer).map_err(|e| Error::Other(format!("TIFF encoder error: {}", e)))?;

    let (rows, cols) = field.shape();
    let data: Vec<f32> = field
        .data()
        .iter()
        .map(|&v| num_traits::cast(v).unwrap_or(f32::NAN))
        .collect();

    let mut image = encoder
        .new_image::<Gray32Float>(cols as u32, rows as u32)
        .map_err(|e| Error::Other(format!("Cannot create TIFF image: {}", e)))?;

    if let Some(nodata) = field.nodata().and_then(FieldElement::to_f64) {
        let text = nodata.to_string();
        image
            .encoder()
            .write_tag(Tag::from_u16_exhaustive(NODATA_TAG), text.as_str())
            .map_err(|e| Error::Other(format!("Cannot write nodata tag: {}", e)))?;
    }

    image
        .write_data(&data)
        .map_err(|e| Error::Other(format!("Cannot write image data: {}", e)))?;

    Ok(())
}
