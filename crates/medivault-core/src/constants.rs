//! Shared constants

/// Maximum accepted upload payload, in bytes (10 MiB).
pub const MAX_UPLOAD_SIZE_BYTES: usize = 10 * 1024 * 1024;

/// File extensions accepted on the upload path.
pub const ALLOWED_EXTENSIONS: [&str; 5] = ["jpg", "jpeg", "png", "dicom", "dcm"];
