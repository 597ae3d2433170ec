//! Upload fixtures for integration tests.

use axum_test::multipart::{MultipartForm, Part};
use axum_test::TestServer;
use std::io::Cursor;
use uuid::Uuid;

/// A small valid PNG (4x3) produced by the image crate.
pub fn png_bytes() -> Vec<u8> {
    let img = image::RgbImage::new(4, 3);
    let mut out = Cursor::new(Vec::new());
    image::DynamicImage::ImageRgb8(img)
        .write_to(&mut out, image::ImageFormat::Png)
        .expect("encode png");
    out.into_inner()
}

/// Bytes that start with the DICOM preamble and do not decode as a raster image.
pub fn dicom_bytes() -> Vec<u8> {
    let mut data = vec![0u8; 128];
    data.extend_from_slice(b"DICM");
    data.extend_from_slice(&[0u8; 256]);
    data
}

pub fn upload_form(filename: &str, content_type: &str, data: Vec<u8>, title: &str) -> MultipartForm {
    MultipartForm::new()
        .add_part(
            "file",
            Part::bytes(data).file_name(filename).mime_type(content_type),
        )
        .add_text("title", title)
        .add_text("description", "uploaded in test")
}

/// Upload an image and return its id and response body.
pub async fn upload_image(
    server: &TestServer,
    token: &str,
    filename: &str,
    content_type: &str,
    data: Vec<u8>,
) -> (Uuid, serde_json::Value) {
    let response = server
        .post(&super::api_path("/images"))
        .authorization_bearer(token)
        .multipart(upload_form(filename, content_type, data, "test scan"))
        .await;
    response.assert_status(axum::http::StatusCode::CREATED);

    let body: serde_json::Value = response.json();
    let id = body["id"]
        .as_str()
        .and_then(|s| Uuid::parse_str(s).ok())
        .expect("image id in response");

    (id, body)
}
