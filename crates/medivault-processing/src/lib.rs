//! Medivault Processing Library
//!
//! Upload-path processing: payload validation (size, extension) and raster
//! dimension extraction. Dimension extraction is a tolerated soft failure -
//! non-raster payloads such as DICOM simply yield no dimensions.

pub mod dimensions;
pub mod validator;

pub use dimensions::{extract_dimensions, ImageDimensions};
pub use validator::{UploadValidator, ValidationError};
