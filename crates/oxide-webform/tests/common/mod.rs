#![allow(dead_code)]

use std::io::Write;

use image::{ImageBuffer, Rgb};
use tempfile::NamedTempFile;

use oxide_webform::{Form, ParamBag, Request, UploadedFile};

/// Builds an unprotected form named `test` for the request.
pub fn form(request: Request) -> Form {
    Form::builder("test")
        .csrf_protection(false)
        .build(request)
        .unwrap_or_else(|e| panic!("Failed to build form: {e}"))
}

/// Builds a form using GET as its method.
pub fn get_form(request: Request) -> Form {
    Form::builder("test")
        .with_method(oxide_webform::Method::Get)
        .csrf_protection(false)
        .build(request)
        .unwrap_or_else(|e| panic!("Failed to build form: {e}"))
}

/// Converts a JSON object into a parameter bag.
pub fn bag(value: serde_json::Value) -> ParamBag {
    serde_json::from_value(value).unwrap_or_else(|e| panic!("Not a parameter bag: {e}"))
}

/// A POST request carrying the given body bag.
pub fn post(body: serde_json::Value) -> Request {
    let mut request = Request::post();
    request.body = bag(body);
    request
}

/// A GET request carrying the given query bag.
pub fn get(query: serde_json::Value) -> Request {
    let mut request = Request::get();
    request.query = bag(query);
    request
}

/// Writes a PNG of the given size to a temporary file.
pub fn png_fixture(width: u32, height: u32) -> NamedTempFile {
    let file = tempfile::Builder::new()
        .suffix(".png")
        .tempfile()
        .expect("create temp file");
    let img: ImageBuffer<Rgb<u8>, Vec<u8>> = ImageBuffer::from_pixel(width, height, Rgb([200, 30, 30]));
    img.save_with_format(file.path(), image::ImageFormat::Png)
        .expect("write png");
    file
}

/// Writes arbitrary bytes to a temporary file.
pub fn bytes_fixture(bytes: &[u8]) -> NamedTempFile {
    let mut file = NamedTempFile::new().expect("create temp file");
    file.write_all(bytes).expect("write fixture");
    file
}

/// Describes a stored fixture as an upload named `name`.
pub fn upload(name: &str, file: &NamedTempFile) -> UploadedFile {
    let size = std::fs::metadata(file.path()).map(|m| m.len()).unwrap_or(0);
    UploadedFile::new(name, file.path(), size)
}
