//! Places a product and a logo onto a background.
//!
//! The layout is fixed: the product sits centred near the bottom edge, the
//! logo sits in the top-right corner. Both keep their aspect ratio and are
//! resampled with Lanczos3, since generated backgrounds and uploaded assets
//! rarely share a resolution.

use image::imageops::{self, FilterType};
use image::{DynamicImage, Pixel, Rgba, RgbaImage};

use crate::constants::{
    DEFAULT_LOGO_SIZE_RATIO, DEFAULT_PRODUCT_SIZE_RATIO, LOGO_MARGIN_RATIO,
    PRODUCT_BOTTOM_MARGIN_RATIO, PRODUCT_MAX_WIDTH_RATIO,
};

/// Size ratios for the overlaid layers.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct CompositeOptions {
    product_size_ratio: f64,
    logo_size_ratio: f64,
}

impl Default for CompositeOptions {
    fn default() -> Self {
        Self {
            product_size_ratio: DEFAULT_PRODUCT_SIZE_RATIO,
            logo_size_ratio: DEFAULT_LOGO_SIZE_RATIO,
        }
    }
}

impl CompositeOptions {
    /// Both ratios must be in `(0, 1]`.
    pub fn new(product_size_ratio: f64, logo_size_ratio: f64) -> Option<Self> {
        let valid = |ratio: f64| ratio > 0.0 && ratio <= 1.0;
        if valid(product_size_ratio) && valid(logo_size_ratio) {
            Some(Self {
                product_size_ratio,
                logo_size_ratio,
            })
        } else {
            None
        }
    }

    /// Product height as a fraction of the background height.
    pub fn product_size_ratio(&self) -> f64 {
        self.product_size_ratio
    }

    /// Logo width as a fraction of the background width.
    pub fn logo_size_ratio(&self) -> f64 {
        self.logo_size_ratio
    }
}

/// Where a resized layer lands on the background.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct Placement {
    /// Left edge; may be negative, in which case the layer is clipped.
    pub x: i64,
    /// Top edge; may be negative, in which case the layer is clipped.
    pub y: i64,
    /// Resized width.
    pub width: u32,
    /// Resized height.
    pub height: u32,
}

/// Layers `product` then `logo` over `background`.
///
/// The inputs are left untouched; the result always has the background's
/// dimensions and an alpha channel.
pub fn compose(
    background: &DynamicImage,
    product: &DynamicImage,
    logo: &DynamicImage,
    options: &CompositeOptions,
) -> RgbaImage {
    let mut composite = to_rgba(background);
    let (bg_width, bg_height) = composite.dimensions();

    let product = to_rgba(product);
    let placement = product_placement(
        bg_width,
        bg_height,
        product.dimensions(),
        options.product_size_ratio,
    );
    let resized = imageops::resize(
        &product,
        placement.width,
        placement.height,
        FilterType::Lanczos3,
    );
    paste_with_alpha(&mut composite, &resized, placement.x, placement.y);

    let logo = to_rgba(logo);
    let placement = logo_placement(bg_width, logo.dimensions(), options.logo_size_ratio);
    let resized = imageops::resize(&logo, placement.width, placement.height, FilterType::Lanczos3);
    paste_with_alpha(&mut composite, &resized, placement.x, placement.y);

    composite
}

/// Converts any pixel layout to RGBA; images without alpha come out fully opaque.
pub fn to_rgba(image: &DynamicImage) -> RgbaImage {
    match image {
        DynamicImage::ImageRgba8(rgba) => rgba.clone(),
        other => other.to_rgba8(),
    }
}

/// Size and position of the product on a `bg_width` x `bg_height` background.
pub fn product_placement(
    bg_width: u32,
    bg_height: u32,
    (src_width, src_height): (u32, u32),
    size_ratio: f64,
) -> Placement {
    let aspect = aspect_ratio(src_width, src_height);
    let max_width = f64::from(bg_width) * PRODUCT_MAX_WIDTH_RATIO;

    let mut height = round_px(f64::from(bg_height) * size_ratio);
    let mut width = round_px(f64::from(height) * aspect);
    if f64::from(width) > max_width {
        // floor, so the cap holds even when 0.9 * width lands on .5
        width = (max_width.floor() as u32).max(1);
        height = round_px(f64::from(width) / aspect);
    }

    let bottom_margin = (f64::from(bg_height) * PRODUCT_BOTTOM_MARGIN_RATIO).round() as i64;
    Placement {
        x: (i64::from(bg_width) - i64::from(width)) / 2,
        y: i64::from(bg_height) - i64::from(height) - bottom_margin,
        width,
        height,
    }
}

/// Size and position of the logo on a background `bg_width` pixels wide.
pub fn logo_placement(
    bg_width: u32,
    (src_width, src_height): (u32, u32),
    size_ratio: f64,
) -> Placement {
    let aspect = aspect_ratio(src_width, src_height);
    let width = round_px(f64::from(bg_width) * size_ratio);
    let height = round_px(f64::from(width) / aspect);
    let margin = (f64::from(bg_width) * LOGO_MARGIN_RATIO).round() as i64;

    Placement {
        x: i64::from(bg_width) - i64::from(width) - margin,
        y: margin,
        width,
        height,
    }
}

/// True when the logo, resized for a `bg_width` x `bg_height` background,
/// is no taller than the background itself.
pub fn logo_fits(bg_width: u32, bg_height: u32, logo: (u32, u32), size_ratio: f64) -> bool {
    logo_placement(bg_width, logo, size_ratio).height <= bg_height
}

/// Blends `overlay` onto `base` with its top-left corner at (`x`, `y`).
///
/// Straight-alpha Porter-Duff "over". Anything outside `base` is dropped.
pub fn paste_with_alpha(base: &mut RgbaImage, overlay: &RgbaImage, x: i64, y: i64) {
    let (base_width, base_height) = base.dimensions();
    for (ox, oy, src) in overlay.enumerate_pixels() {
        let bx = x + i64::from(ox);
        let by = y + i64::from(oy);
        if bx < 0 || by < 0 || bx >= i64::from(base_width) || by >= i64::from(base_height) {
            continue;
        }
        // bounds checked above
        blend_over(base.get_pixel_mut(bx as u32, by as u32), src);
    }
}

/// Fully transparent and fully opaque sources are exact; the rest goes
/// through `Pixel::blend`.
fn blend_over(dst: &mut Rgba<u8>, src: &Rgba<u8>) {
    match src.0[3] {
        0 => {}
        255 => *dst = *src,
        _ => dst.blend(src),
    }
}

fn aspect_ratio(width: u32, height: u32) -> f64 {
    f64::from(width.max(1)) / f64::from(height.max(1))
}

fn round_px(value: f64) -> u32 {
    (value.round() as u32).max(1)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn solid(width: u32, height: u32, color: [u8; 4]) -> DynamicImage {
        DynamicImage::ImageRgba8(RgbaImage::from_pixel(width, height, Rgba(color)))
    }

    #[test]
    fn default_product_layout_on_square_background() {
        let placement = product_placement(1024, 1024, (500, 500), DEFAULT_PRODUCT_SIZE_RATIO);
        assert_eq!(
            placement,
            Placement {
                x: 307,
                y: 563,
                width: 410,
                height: 410
            }
        );
    }

    #[test]
    fn default_logo_layout_on_square_background() {
        let placement = logo_placement(1024, (200, 100), DEFAULT_LOGO_SIZE_RATIO);
        assert_eq!(
            placement,
            Placement {
                x: 850,
                y: 20,
                width: 154,
                height: 77
            }
        );
    }

    #[test]
    fn wide_product_is_capped_at_ninety_percent() {
        // 4:1 product would be 1640 wide at 40% height
        let placement = product_placement(1024, 1024, (400, 100), DEFAULT_PRODUCT_SIZE_RATIO);
        assert_eq!(placement.width, 921);
        assert_eq!(placement.height, 230);
        assert_eq!(placement.x, (1024 - 921) / 2);
    }

    #[test]
    fn product_width_bound_holds_on_half_pixel_caps() {
        // 0.9 * 1025 = 922.5
        let placement = product_placement(1025, 1000, (10, 1), 1.0);
        assert!(f64::from(placement.width) <= 0.9 * 1025.0);
    }

    #[test]
    fn tiny_inputs_still_get_a_pixel() {
        let placement = logo_placement(3, (1000, 1), 0.15);
        assert_eq!(placement.width, 1);
        assert_eq!(placement.height, 1);
    }

    #[test]
    fn tall_logos_do_not_fit() {
        assert!(logo_fits(1024, 1024, (200, 100), DEFAULT_LOGO_SIZE_RATIO));
        // 154 wide at 1:20000 would be over three million rows
        assert!(!logo_fits(1024, 1024, (1, 20000), DEFAULT_LOGO_SIZE_RATIO));
        // 154 x 1024 is the tallest that still fits
        assert!(logo_fits(1024, 1024, (154, 1024), DEFAULT_LOGO_SIZE_RATIO));
        assert!(!logo_fits(1024, 1024, (154, 1030), DEFAULT_LOGO_SIZE_RATIO));
    }

    #[test]
    fn options_reject_out_of_range_ratios() {
        assert!(CompositeOptions::new(0.0, 0.15).is_none());
        assert!(CompositeOptions::new(0.4, 1.5).is_none());
        assert!(CompositeOptions::new(f64::NAN, 0.15).is_none());
        let options = CompositeOptions::new(1.0, 0.2).expect("valid ratios");
        assert_eq!(options.product_size_ratio(), 1.0);
        assert_eq!(options.logo_size_ratio(), 0.2);
    }

    #[test]
    fn transparent_overlay_leaves_background_alone() {
        let mut base = RgbaImage::from_pixel(1, 1, Rgba([10, 20, 30, 255]));
        let overlay = RgbaImage::from_pixel(1, 1, Rgba([200, 200, 200, 0]));
        paste_with_alpha(&mut base, &overlay, 0, 0);
        assert_eq!(*base.get_pixel(0, 0), Rgba([10, 20, 30, 255]));
    }

    #[test]
    fn opaque_overlay_replaces_background() {
        let mut base = RgbaImage::from_pixel(2, 2, Rgba([10, 20, 30, 255]));
        let overlay = RgbaImage::from_pixel(1, 1, Rgba([200, 100, 50, 255]));
        paste_with_alpha(&mut base, &overlay, 1, 1);
        assert_eq!(*base.get_pixel(1, 1), Rgba([200, 100, 50, 255]));
        assert_eq!(*base.get_pixel(0, 0), Rgba([10, 20, 30, 255]));
    }

    #[test]
    fn half_transparent_overlay_blends_linearly() {
        let mut base = RgbaImage::from_pixel(1, 1, Rgba([0, 0, 0, 255]));
        let overlay = RgbaImage::from_pixel(1, 1, Rgba([255, 255, 255, 128]));
        paste_with_alpha(&mut base, &overlay, 0, 0);
        let pixel = base.get_pixel(0, 0);
        assert_eq!(pixel.0[3], 255);
        assert!((127..=129).contains(&pixel.0[0]), "got {pixel:?}");
    }

    #[test]
    fn blending_onto_transparent_base_keeps_source_colour() {
        let mut base = RgbaImage::from_pixel(1, 1, Rgba([0, 0, 0, 0]));
        let overlay = RgbaImage::from_pixel(1, 1, Rgba([255, 0, 0, 128]));
        paste_with_alpha(&mut base, &overlay, 0, 0);
        let pixel = base.get_pixel(0, 0);
        assert!((127..=128).contains(&pixel.0[3]), "got {pixel:?}");
        assert!(pixel.0[0] >= 254 && pixel.0[1] == 0, "got {pixel:?}");
    }

    #[test]
    fn paste_clips_at_every_edge() {
        let mut base = RgbaImage::from_pixel(4, 4, Rgba([0, 0, 0, 255]));
        let overlay = RgbaImage::from_pixel(3, 3, Rgba([255, 0, 0, 255]));
        paste_with_alpha(&mut base, &overlay, -2, 3);
        assert_eq!(*base.get_pixel(0, 3), Rgba([255, 0, 0, 255]));
        assert_eq!(*base.get_pixel(1, 3), Rgba([0, 0, 0, 255]));
        assert_eq!(*base.get_pixel(0, 2), Rgba([0, 0, 0, 255]));
    }

    #[test]
    fn rgb_inputs_are_treated_as_opaque() {
        let rgb = DynamicImage::ImageRgb8(image::RgbImage::from_pixel(2, 2, image::Rgb([1, 2, 3])));
        let rgba = to_rgba(&rgb);
        assert_eq!(*rgba.get_pixel(1, 1), Rgba([1, 2, 3, 255]));
    }

    #[test]
    fn compose_keeps_background_size_and_inputs() {
        let background = DynamicImage::ImageRgb8(image::RgbImage::from_pixel(
            200,
            100,
            image::Rgb([0, 0, 255]),
        ));
        let product = solid(50, 50, [255, 0, 0, 255]);
        let logo = solid(20, 10, [0, 255, 0, 255]);
        let before = background.clone();

        let composite = compose(&background, &product, &logo, &CompositeOptions::default());

        assert_eq!(composite.dimensions(), (200, 100));
        assert_eq!(background, before);
        // product is 40x40 at (80, 55); its centre is red
        let centre = composite.get_pixel(100, 75);
        assert!(centre.0[0] >= 250 && centre.0[2] <= 5, "got {centre:?}");
        // logo is 30x15 at (166, 4)
        let logo_pixel = composite.get_pixel(180, 10);
        assert!(logo_pixel.0[1] >= 250 && logo_pixel.0[2] <= 5, "got {logo_pixel:?}");
        // untouched corner
        assert_eq!(*composite.get_pixel(0, 0), Rgba([0, 0, 255, 255]));
    }
}
