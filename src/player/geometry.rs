/// Destination rectangle in logical (CSS) pixels.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct DrawRect {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

/// Scales a `image_width` x `image_height` source so it covers the whole
/// surface, keeping its aspect ratio, and centers it. Overflow on one axis
/// ends up outside the surface and is cropped by the canvas.
///
/// Returns `None` when either rectangle has no area.
pub fn cover_fit(
    surface_width: f64,
    surface_height: f64,
    image_width: f64,
    image_height: f64,
) -> Option<DrawRect> {
    if !(surface_width > 0.0 && surface_height > 0.0 && image_width > 0.0 && image_height > 0.0) {
        return None;
    }
    let scale = f64::max(surface_width / image_width, surface_height / image_height);
    let width = image_width * scale;
    let height = image_height * scale;
    Some(DrawRect {
        x: surface_width / 2.0 - width / 2.0,
        y: surface_height / 2.0 - height / 2.0,
        width,
        height,
    })
}

/// Missing, zero, negative and non-finite ratios all mean 1.
pub fn normalize_pixel_ratio(pixel_ratio: Option<f64>) -> f64 {
    match pixel_ratio {
        Some(ratio) if ratio.is_finite() && ratio > 0.0 => ratio,
        _ => 1.0,
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SurfaceGeometry {
    pub css_width: f64,
    pub css_height: f64,
    pub pixel_ratio: f64,
}

impl SurfaceGeometry {
    pub fn new(css_width: f64, css_height: f64, pixel_ratio: Option<f64>) -> SurfaceGeometry {
        SurfaceGeometry {
            css_width: css_width.max(0.0),
            css_height: css_height.max(0.0),
            pixel_ratio: normalize_pixel_ratio(pixel_ratio),
        }
    }

    /// Backing store size in physical pixels. Fractions are truncated the
    /// same way the canvas `width`/`height` attributes truncate them.
    pub fn backing_size(&self) -> (u32, u32) {
        (
            (self.css_width * self.pixel_ratio).floor() as u32,
            (self.css_height * self.pixel_ratio).floor() as u32,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cover_fit_wider_surface() {
        // 800x600 surface over a 400x400 image: width decides the scale.
        let rect = cover_fit(800.0, 600.0, 400.0, 400.0).unwrap();
        assert_eq!(rect.width, 800.0);
        assert_eq!(rect.height, 800.0);
        assert_eq!(rect.x, 0.0);
        assert_eq!(rect.y, -100.0);
    }

    #[test]
    fn test_cover_fit_taller_surface() {
        let rect = cover_fit(300.0, 600.0, 1920.0, 1080.0).unwrap();
        let scale = f64::max(300.0 / 1920.0, 600.0 / 1080.0);
        assert_eq!(rect.width, 1920.0 * scale);
        assert_eq!(rect.height, 1080.0 * scale);
        assert_eq!(rect.x, 150.0 - (1920.0 * scale) / 2.0);
        assert_eq!(rect.y, 300.0 - (1080.0 * scale) / 2.0);
        assert!(rect.width >= 300.0 && rect.height >= 600.0);
    }

    #[test]
    fn test_cover_fit_exact_aspect() {
        let rect = cover_fit(1280.0, 720.0, 1920.0, 1080.0).unwrap();
        assert!(rect.x.abs() < 1e-9);
        assert!(rect.y.abs() < 1e-9);
        assert!((rect.width - 1280.0).abs() < 1e-9);
        assert!((rect.height - 720.0).abs() < 1e-9);
    }

    #[test]
    fn test_cover_fit_empty() {
        assert_eq!(cover_fit(0.0, 600.0, 100.0, 100.0), None);
        assert_eq!(cover_fit(800.0, 600.0, 0.0, 100.0), None);
        assert_eq!(cover_fit(f64::NAN, 600.0, 100.0, 100.0), None);
    }

    #[test]
    fn test_backing_size() {
        let geometry = SurfaceGeometry::new(800.0, 600.0, Some(2.0));
        assert_eq!(geometry.backing_size(), (1600, 1200));
        let geometry = SurfaceGeometry::new(333.3, 100.0, Some(1.5));
        assert_eq!(geometry.backing_size(), (499, 150));
    }

    #[test]
    fn test_normalize_pixel_ratio() {
        assert_eq!(normalize_pixel_ratio(None), 1.0);
        assert_eq!(normalize_pixel_ratio(Some(0.0)), 1.0);
        assert_eq!(normalize_pixel_ratio(Some(-2.0)), 1.0);
        assert_eq!(normalize_pixel_ratio(Some(f64::INFINITY)), 1.0);
        assert_eq!(normalize_pixel_ratio(Some(3.0)), 3.0);
    }
}
