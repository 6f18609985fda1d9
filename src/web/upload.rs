//! Parsing the campaign upload form.

use std::io::Cursor;

use axum::extract::Multipart;
use image::{DynamicImage, ImageFormat, ImageReader};

use crate::campaign::CampaignRequest;
use crate::constants::MIN_VARIATIONS;
use crate::error::StudioError;

/// Raw form fields, before any decoding.
#[derive(Debug, Default)]
pub(crate) struct UploadForm {
    pub(crate) csrf_token: Option<String>,
    pub(crate) product: Option<Vec<u8>>,
    pub(crate) logo: Option<Vec<u8>>,
    pub(crate) description: String,
    pub(crate) variations: Option<String>,
}

fn read_error(err: axum::extract::multipart::MultipartError) -> StudioError {
    StudioError::BadRequest(format!("Failed to read upload: {}", err.body_text()))
}

impl UploadForm {
    pub(crate) async fn from_multipart(mut multipart: Multipart) -> Result<Self, StudioError> {
        let mut form = Self::default();
        while let Some(field) = multipart.next_field().await.map_err(read_error)? {
            let field_name = field.name().unwrap_or_default().to_string();
            match field_name.as_str() {
                "csrf_token" => form.csrf_token = Some(field.text().await.map_err(read_error)?),
                "product" => form.product = Some(field.bytes().await.map_err(read_error)?.to_vec()),
                "logo" => form.logo = Some(field.bytes().await.map_err(read_error)?.to_vec()),
                "description" => form.description = field.text().await.map_err(read_error)?,
                "variations" => form.variations = Some(field.text().await.map_err(read_error)?),
                _ => {}
            }
        }
        Ok(form)
    }

    /// Decodes the uploads into a campaign request.
    ///
    /// Browsers send an empty part for an unselected file input, so empty
    /// uploads count as missing.
    pub(crate) fn into_request(self) -> Result<CampaignRequest, StudioError> {
        let product = decode_upload(self.product.as_deref(), "product")?;
        let logo = decode_upload(self.logo.as_deref(), "logo")?;
        let variations = match self.variations.as_deref().map(str::trim) {
            None | Some("") => MIN_VARIATIONS,
            Some(value) => value.parse::<usize>().map_err(|_| {
                StudioError::BadRequest(format!("Invalid number of variations: {value}"))
            })?,
        };
        Ok(CampaignRequest {
            product,
            logo,
            description: self.description,
            variations,
        })
    }
}

/// Decodes a PNG or JPEG upload.
pub(crate) fn decode_upload(bytes: Option<&[u8]>, label: &str) -> Result<DynamicImage, StudioError> {
    let bytes = bytes
        .filter(|bytes| !bytes.is_empty())
        .ok_or_else(|| StudioError::BadRequest(format!("Please upload a {label} image")))?;
    let invalid = || StudioError::BadRequest(format!("The {label} image must be a PNG or JPEG"));

    let reader = ImageReader::new(Cursor::new(bytes))
        .with_guessed_format()
        .map_err(|_| invalid())?;
    match reader.format() {
        Some(ImageFormat::Png | ImageFormat::Jpeg) => {}
        _ => return Err(invalid()),
    }
    reader.decode().map_err(|_| invalid())
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{Rgba, RgbaImage};

    fn png_bytes() -> Vec<u8> {
        let mut output = Cursor::new(Vec::new());
        RgbaImage::from_pixel(2, 3, Rgba([5, 6, 7, 128]))
            .write_to(&mut output, ImageFormat::Png)
            .expect("encode png");
        output.into_inner()
    }

    #[test]
    fn decodes_png_uploads() {
        let image = decode_upload(Some(&png_bytes()), "product").expect("decode");
        assert_eq!((image.width(), image.height()), (2, 3));
    }

    #[test]
    fn empty_or_missing_uploads_are_rejected() {
        for bytes in [None, Some(&b""[..])] {
            let err = decode_upload(bytes, "logo").expect_err("missing logo");
            assert_eq!(err.to_string(), "Please upload a logo image");
        }
    }

    #[test]
    fn non_image_uploads_are_rejected() {
        let err = decode_upload(Some(b"GIF89a not really"), "product").expect_err("gif");
        assert_eq!(err.to_string(), "The product image must be a PNG or JPEG");
        let err = decode_upload(Some(b"plain text"), "product").expect_err("text");
        assert_eq!(err.to_string(), "The product image must be a PNG or JPEG");
    }

    #[test]
    fn variation_count_defaults_and_parses() {
        let form = UploadForm {
            product: Some(png_bytes()),
            logo: Some(png_bytes()),
            description: "A description".to_string(),
            ..Default::default()
        };
        assert_eq!(form.into_request().expect("request").variations, MIN_VARIATIONS);

        let form = UploadForm {
            product: Some(png_bytes()),
            logo: Some(png_bytes()),
            variations: Some("seven".to_string()),
            ..Default::default()
        };
        assert!(matches!(form.into_request(), Err(StudioError::BadRequest(_))));
    }
}
