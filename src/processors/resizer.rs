// synothumb/src/processors/resizer.rs
use crate::core::PreviewSpec;
use image::{imageops, imageops::FilterType, DynamicImage, RgbImage};

pub struct Resizer {
    filter: FilterType,
}

impl Resizer {
    pub fn new(filter: FilterType) -> Self {
        Self { filter }
    }

    /// Shrinks `image` to fit inside `max_w` x `max_h`. Images that already fit
    /// are returned unchanged; nothing is ever enlarged.
    pub fn fit_within(&self, image: &DynamicImage, max_w: u32, max_h: u32) -> DynamicImage {
        let (width, height) = fit_dimensions(image.width(), image.height(), max_w, max_h);

        if width == image.width() && height == image.height() {
            log::debug!("Image dimensions unchanged, skipping resize");
            return image.clone();
        }

        log::debug!(
            "Resizing image from {}x{} to {}x{}",
            image.width(),
            image.height(),
            width,
            height
        );

        image.resize_exact(width, height, self.filter)
    }

    /// Fits `image` inside the preview box, then centres it on a canvas of
    /// exactly the preview size filled with the padding colour.
    pub fn letterbox(&self, image: &DynamicImage, preview: &PreviewSpec) -> RgbImage {
        let fitted = self.fit_within(image, preview.width, preview.height).into_rgb8();

        let mut canvas = RgbImage::from_pixel(preview.width, preview.height, preview.padding);
        let x = (preview.width - fitted.width()) / 2;
        let y = (preview.height - fitted.height()) / 2;
        imageops::replace(&mut canvas, &fitted, i64::from(x), i64::from(y));

        canvas
    }
}

impl Default for Resizer {
    fn default() -> Self {
        Self::new(FilterType::Lanczos3)
    }
}

/// Largest size with the source aspect ratio that fits the box, capped at the
/// source size. Each side is rounded and kept at least one pixel.
pub fn fit_dimensions(orig_w: u32, orig_h: u32, max_w: u32, max_h: u32) -> (u32, u32) {
    if orig_w == 0 || orig_h == 0 || (orig_w <= max_w && orig_h <= max_h) {
        return (orig_w, orig_h);
    }

    let ratio_w = max_w as f64 / orig_w as f64;
    let ratio_h = max_h as f64 / orig_h as f64;
    let ratio = ratio_w.min(ratio_h);

    let new_w = ((orig_w as f64 * ratio).round() as u32).clamp(1, max_w);
    let new_h = ((orig_h as f64 * ratio).round() as u32).clamp(1, max_h);

    (new_w, new_h)
}
