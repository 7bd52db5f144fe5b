use image::{imageops, DynamicImage, GenericImageView, Rgba, RgbaImage};

/// Canvas background the resized image is drawn onto
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Background {
    /// Cleared canvas, alpha is preserved
    Transparent,
    /// Opaque white, transparent pixels are blended against it
    White,
}

/// Image resize operations
pub struct ImageResize;

impl ImageResize {
    /// Output size for a requested box.
    ///
    /// Without `lock_aspect_ratio` the requested size is used verbatim. With
    /// it, the result is the largest box inside the requested one that keeps
    /// the source aspect ratio.
    pub fn target_dimensions(
        orig_width: u32,
        orig_height: u32,
        requested_width: u32,
        requested_height: u32,
        lock_aspect_ratio: bool,
    ) -> (u32, u32) {
        if !lock_aspect_ratio || orig_width == 0 || orig_height == 0 || requested_height == 0 {
            return (requested_width, requested_height);
        }

        let ratio = orig_width as f64 / orig_height as f64;
        if requested_width as f64 / requested_height as f64 > ratio {
            let width = (requested_height as f64 * ratio).round() as u32;
            (width.max(1), requested_height)
        } else {
            let height = (requested_width as f64 / ratio).round() as u32;
            (requested_width, height.max(1))
        }
    }

    /// Select appropriate filter type based on resize ratio
    pub fn select_filter(
        orig_width: u32,
        orig_height: u32,
        new_width: u32,
        new_height: u32,
    ) -> imageops::FilterType {
        let width_ratio = orig_width as f32 / new_width as f32;
        let height_ratio = orig_height as f32 / new_height as f32;
        let max_ratio = width_ratio.max(height_ratio);

        if max_ratio > 2.0 {
            imageops::FilterType::Triangle
        } else if max_ratio > 1.5 {
            imageops::FilterType::CatmullRom
        } else {
            imageops::FilterType::Lanczos3
        }
    }

    /// Resize image to exact dimensions
    pub fn resize_image(img: &DynamicImage, width: u32, height: u32) -> DynamicImage {
        let (orig_width, orig_height) = img.dimensions();
        if (orig_width, orig_height) == (width, height) {
            return img.clone();
        }
        let filter = Self::select_filter(orig_width, orig_height, width, height);
        img.resize_exact(width, height, filter)
    }

    /// Resize `img` to exactly `width`x`height` and draw it onto a fresh canvas
    pub fn render_on_canvas(
        img: &DynamicImage,
        width: u32,
        height: u32,
        background: Background,
    ) -> DynamicImage {
        let resized = Self::resize_image(img, width, height);

        match background {
            Background::Transparent => DynamicImage::ImageRgba8(resized.to_rgba8()),
            Background::White => {
                let bg_color = Rgba([255u8, 255u8, 255u8, 255u8]);
                let mut canvas = RgbaImage::from_pixel(width, height, bg_color);
                imageops::overlay(&mut canvas, &resized.to_rgba8(), 0, 0);
                DynamicImage::ImageRgba8(canvas)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unlocked_dimensions_are_verbatim() {
        assert_eq!(
            ImageResize::target_dimensions(800, 600, 100, 400, false),
            (100, 400)
        );
    }

    #[test]
    fn test_locked_square_box_landscape_source() {
        // 4:3 source into a 400x400 box keeps the width
        assert_eq!(
            ImageResize::target_dimensions(800, 600, 400, 400, true),
            (400, 300)
        );
    }

    #[test]
    fn test_locked_wide_box_fixes_height() {
        // Requested ratio 2.0 is wider than the 4:3 source
        assert_eq!(
            ImageResize::target_dimensions(800, 600, 800, 400, true),
            (533, 400)
        );
    }

    #[test]
    fn test_locked_portrait_source() {
        assert_eq!(
            ImageResize::target_dimensions(600, 900, 300, 300, true),
            (200, 300)
        );
    }

    #[test]
    fn test_locked_upscale() {
        assert_eq!(
            ImageResize::target_dimensions(100, 50, 1000, 1000, true),
            (1000, 500)
        );
    }

    #[test]
    fn test_locked_never_below_one_pixel() {
        assert_eq!(
            ImageResize::target_dimensions(10_000, 1, 10, 10, true),
            (10, 1)
        );
    }

    #[test]
    fn test_locked_ratio_within_one_pixel() {
        let sources = [(800, 600), (1920, 1080), (333, 777), (1, 1), (4000, 3)];
        let boxes = [(400, 400), (1280, 720), (50, 900), (7, 3)];
        for &(sw, sh) in &sources {
            for &(bw, bh) in &boxes {
                let (w, h) = ImageResize::target_dimensions(sw, sh, bw, bh, true);
                assert!(w <= bw && h <= bh, "{}x{} escapes {}x{}", w, h, bw, bh);
                let ratio = sw as f64 / sh as f64;
                if w == bw {
                    let ideal = w as f64 / ratio;
                    assert!((h as f64 - ideal.max(1.0)).abs() <= 1.0);
                } else {
                    let ideal = h as f64 * ratio;
                    assert!((w as f64 - ideal.max(1.0)).abs() <= 1.0);
                }
            }
        }
    }

    #[test]
    fn test_resize_image() {
        let img = DynamicImage::ImageRgba8(RgbaImage::from_pixel(100, 100, Rgba([255, 0, 0, 255])));
        let resized = ImageResize::resize_image(&img, 50, 20);
        assert_eq!(resized.dimensions(), (50, 20));
    }

    #[test]
    fn test_transparent_canvas_keeps_alpha() {
        let img = DynamicImage::ImageRgba8(RgbaImage::from_pixel(10, 10, Rgba([0, 0, 0, 0])));
        let rendered = ImageResize::render_on_canvas(&img, 10, 10, Background::Transparent);
        assert_eq!(rendered.to_rgba8().get_pixel(5, 5)[3], 0);
    }

    #[test]
    fn test_white_canvas_fills_transparency() {
        let img = DynamicImage::ImageRgba8(RgbaImage::from_pixel(10, 10, Rgba([0, 0, 0, 0])));
        let rendered = ImageResize::render_on_canvas(&img, 10, 10, Background::White);
        assert_eq!(*rendered.to_rgba8().get_pixel(5, 5), Rgba([255, 255, 255, 255]));
    }

    #[test]
    fn test_white_canvas_keeps_opaque_pixels() {
        let img = DynamicImage::ImageRgba8(RgbaImage::from_pixel(10, 10, Rgba([10, 20, 30, 255])));
        let rendered = ImageResize::render_on_canvas(&img, 5, 5, Background::White);
        assert_eq!(rendered.dimensions(), (5, 5));
        assert_eq!(*rendered.to_rgba8().get_pixel(2, 2), Rgba([10, 20, 30, 255]));
    }
}
