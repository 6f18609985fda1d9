//! Packs a finished campaign into a ZIP download.

use std::io::{Cursor, Write};

use image::{ImageFormat, RgbaImage};
use zip::CompressionMethod;
use zip::write::{SimpleFileOptions, ZipWriter};

use crate::campaign::{CampaignReport, Variation};
use crate::constants::CAPTIONS_FILE_NAME;

/// Errors while encoding or zipping a campaign.
#[derive(Debug, thiserror::Error)]
pub enum ArchiveError {
    /// PNG encoding failed.
    #[error("failed to encode image: {0}")]
    Encode(#[from] image::ImageError),
    /// Writing the ZIP failed.
    #[error("failed to write archive: {0}")]
    Zip(#[from] zip::result::ZipError),
    /// Writing an entry's bytes failed.
    #[error("failed to write archive entry: {0}")]
    Io(#[from] std::io::Error),
}

/// File name of a variation inside the archive.
pub fn variation_file_name(number: usize) -> String {
    format!("ad_variation_{number}.png")
}

/// Encodes an image as PNG.
pub fn encode_png(image: &RgbaImage) -> Result<Vec<u8>, ArchiveError> {
    let mut output = Cursor::new(Vec::new());
    image.write_to(&mut output, ImageFormat::Png)?;
    Ok(output.into_inner())
}

/// The captions file: one block per variation, separated by a blank line.
pub fn captions_text(variations: &[Variation]) -> String {
    variations
        .iter()
        .map(|variation| format!("Variation {}:\n{}", variation.number, variation.caption))
        .collect::<Vec<_>>()
        .join("\n\n")
}

/// Builds the ZIP: a PNG per variation plus the captions file.
pub fn build_archive(report: &CampaignReport) -> Result<Vec<u8>, ArchiveError> {
    let options = SimpleFileOptions::default().compression_method(CompressionMethod::Deflated);
    let mut zip = ZipWriter::new(Cursor::new(Vec::new()));

    for variation in &report.variations {
        zip.start_file(variation_file_name(variation.number), options)?;
        zip.write_all(&encode_png(&variation.image)?)?;
    }

    zip.start_file(CAPTIONS_FILE_NAME, options)?;
    zip.write_all(captions_text(&report.variations).as_bytes())?;

    Ok(zip.finish()?.into_inner())
}
