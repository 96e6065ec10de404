//! Reading and writing fields as single-band TIFF files

mod tiff_io;

pub use tiff_io::{read_field, read_field_from_buffer, write_field, write_field_to_buffer};
