//! A4 page geometry
//!
//! Fixed scale-and-centre computations shared by PDF page normalisation and
//! image placement. All page coordinates are PDF points (72 per inch).

use serde::Serialize;

/// A4 width in points (210 mm)
pub const A4_WIDTH_PT: f64 = 595.276;
/// A4 height in points (297 mm)
pub const A4_HEIGHT_PT: f64 = 841.89;
/// Resolution used when rasterising images onto an A4 canvas
pub const DEFAULT_DPI: u32 = 300;
/// Highest accepted resolution; an A4 canvas at 1200 DPI is about 9900x14000
pub const MAX_DPI: u32 = 1200;

const POINTS_PER_INCH: f64 = 72.0;

/// Convert a length in points to whole pixels at `dpi`
pub fn pts_to_pixels(points: f64, dpi: u32) -> u32 {
    let inches = points / POINTS_PER_INCH;
    (inches * dpi as f64).round() as u32
}

/// Convert a pixel count at `dpi` back to points
pub fn pixels_to_pts(pixels: u32, dpi: u32) -> f64 {
    pixels as f64 * POINTS_PER_INCH / dpi as f64
}

/// A page rectangle given by its lower-left and upper-right corners
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct PageBox {
    pub llx: f64,
    pub lly: f64,
    pub urx: f64,
    pub ury: f64,
}

impl PageBox {
    pub fn new(llx: f64, lly: f64, urx: f64, ury: f64) -> Self {
        // Boxes may be written with corners in any order
        Self {
            llx: llx.min(urx),
            lly: lly.min(ury),
            urx: llx.max(urx),
            ury: lly.max(ury),
        }
    }

    pub fn a4() -> Self {
        Self::new(0.0, 0.0, A4_WIDTH_PT, A4_HEIGHT_PT)
    }

    pub fn width(&self) -> f64 {
        self.urx - self.llx
    }

    pub fn height(&self) -> f64 {
        self.ury - self.lly
    }

    /// True when the box cannot be scaled meaningfully
    pub fn is_degenerate(&self) -> bool {
        let (w, h) = (self.width(), self.height());
        !w.is_finite() || !h.is_finite() || w <= 0.0 || h <= 0.0
    }
}

/// Uniform scale followed by translation: the PDF matrix `s 0 0 s tx ty`
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct FitTransform {
    pub scale: f64,
    pub tx: f64,
    pub ty: f64,
}

impl FitTransform {
    /// Render as a `cm` operator line
    pub fn to_cm(&self) -> String {
        format!(
            "{:.6} 0 0 {:.6} {:.6} {:.6} cm",
            self.scale, self.scale, self.tx, self.ty
        )
    }

    /// Apply to a point in source space
    pub fn apply(&self, x: f64, y: f64) -> (f64, f64) {
        (self.scale * x + self.tx, self.scale * y + self.ty)
    }
}

/// Scale `source` (up or down) to the largest size fitting inside A4 while
/// keeping its aspect ratio, centred on the page.
///
/// Returns `None` for degenerate boxes.
pub fn fit_to_a4(source: &PageBox) -> Option<FitTransform> {
    if source.is_degenerate() {
        return None;
    }

    let (w, h) = (source.width(), source.height());
    let scale = (A4_WIDTH_PT / w).min(A4_HEIGHT_PT / h);

    let tx = (A4_WIDTH_PT - w * scale) / 2.0 - scale * source.llx;
    let ty = (A4_HEIGHT_PT - h * scale) / 2.0 - scale * source.lly;

    Some(FitTransform { scale, tx, ty })
}

/// Where a resized image lands on the A4 canvas
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ImagePlacement {
    /// Canvas size in pixels at the target DPI
    pub canvas_width_px: u32,
    pub canvas_height_px: u32,
    /// Size the image is resized to
    pub width_px: u32,
    pub height_px: u32,
    /// Offset of the image's top-left corner from the canvas' top-left corner
    pub offset_x_px: u32,
    pub offset_y_px: u32,
    pub dpi: u32,
}

impl ImagePlacement {
    /// Drawing rectangle in points, origin at the bottom-left of the page:
    /// `(x, y, width, height)`
    pub fn rect_pts(&self) -> (f64, f64, f64, f64) {
        let x = pixels_to_pts(self.offset_x_px, self.dpi);
        let bottom_px = self
            .canvas_height_px
            .saturating_sub(self.offset_y_px + self.height_px);
        let y = pixels_to_pts(bottom_px, self.dpi);
        (
            x,
            y,
            pixels_to_pts(self.width_px, self.dpi),
            pixels_to_pts(self.height_px, self.dpi),
        )
    }
}

/// Fit an image of `width_px` x `height_px` inside an A4 canvas at `dpi`
pub fn image_placement(width_px: u32, height_px: u32, dpi: u32) -> Option<ImagePlacement> {
    if width_px == 0 || height_px == 0 || dpi == 0 || dpi > MAX_DPI {
        return None;
    }

    let canvas_w = pts_to_pixels(A4_WIDTH_PT, dpi);
    let canvas_h = pts_to_pixels(A4_HEIGHT_PT, dpi);

    let scale = (canvas_w as f64 / width_px as f64).min(canvas_h as f64 / height_px as f64);
    let new_w = ((width_px as f64 * scale).round() as u32).clamp(1, canvas_w);
    let new_h = ((height_px as f64 * scale).round() as u32).clamp(1, canvas_h);

    Some(ImagePlacement {
        canvas_width_px: canvas_w,
        canvas_height_px: canvas_h,
        width_px: new_w,
        height_px: new_h,
        offset_x_px: (canvas_w - new_w) / 2,
        offset_y_px: (canvas_h - new_h) / 2,
        dpi,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    const EPS: f64 = 1e-6;

    #[test]
    fn test_a4_canvas_at_300_dpi() {
        assert_eq!(pts_to_pixels(A4_WIDTH_PT, 300), 2480);
        assert_eq!(pts_to_pixels(A4_HEIGHT_PT, 300), 3508);
    }

    #[test]
    fn test_fit_letter_page() {
        let letter = PageBox::new(0.0, 0.0, 612.0, 792.0);
        let fit = fit_to_a4(&letter).unwrap();

        // Width is the limiting side
        assert!((fit.scale - A4_WIDTH_PT / 612.0).abs() < EPS);
        assert!(fit.tx.abs() < EPS);
        let scaled_h = 792.0 * fit.scale;
        assert!((fit.ty - (A4_HEIGHT_PT - scaled_h) / 2.0).abs() < EPS);
    }

    #[test]
    fn test_fit_a4_is_identity() {
        let fit = fit_to_a4(&PageBox::a4()).unwrap();
        assert!((fit.scale - 1.0).abs() < EPS);
        assert!(fit.tx.abs() < EPS);
        assert!(fit.ty.abs() < EPS);
    }

    #[test]
    fn test_fit_small_page_scales_up() {
        let card = PageBox::new(0.0, 0.0, 100.0, 50.0);
        let fit = fit_to_a4(&card).unwrap();
        assert!(fit.scale > 5.0);
    }

    #[test]
    fn test_fit_accounts_for_mediabox_origin() {
        let shifted = PageBox::new(100.0, 200.0, 712.0, 992.0);
        let plain = PageBox::new(0.0, 0.0, 612.0, 792.0);

        let a = fit_to_a4(&shifted).unwrap();
        let b = fit_to_a4(&plain).unwrap();

        let (x0, y0) = a.apply(100.0, 200.0);
        let (x1, y1) = b.apply(0.0, 0.0);
        assert!((x0 - x1).abs() < EPS);
        assert!((y0 - y1).abs() < EPS);
    }

    #[test]
    fn test_degenerate_box_is_rejected() {
        assert!(fit_to_a4(&PageBox::new(0.0, 0.0, 0.0, 100.0)).is_none());
        assert!(fit_to_a4(&PageBox::new(0.0, 0.0, f64::NAN, 100.0)).is_none());
    }

    #[test]
    fn test_page_box_normalises_corners() {
        let b = PageBox::new(612.0, 792.0, 0.0, 0.0);
        assert_eq!(b.width(), 612.0);
        assert_eq!(b.height(), 792.0);
    }

    #[test]
    fn test_image_placement_landscape() {
        let p = image_placement(4000, 2000, 300).unwrap();
        assert_eq!(p.width_px, 2480);
        assert_eq!(p.height_px, 1240);
        assert_eq!(p.offset_x_px, 0);
        assert_eq!(p.offset_y_px, (3508 - 1240) / 2);
    }

    #[test]
    fn test_image_placement_tiny_image_upscales() {
        let p = image_placement(10, 10, 300).unwrap();
        assert_eq!(p.width_px, 2480);
        assert_eq!(p.height_px, 2480);
    }

    #[test]
    fn test_image_placement_rect_is_centred() {
        let p = image_placement(1000, 1000, 300).unwrap();
        let (x, y, w, h) = p.rect_pts();
        assert!((x + w / 2.0 - pixels_to_pts(2480, 300) / 2.0).abs() < 0.5);
        assert!((y + h / 2.0 - pixels_to_pts(3508, 300) / 2.0).abs() < 0.5);
    }

    #[test]
    fn test_image_placement_rejects_excessive_dpi() {
        assert!(image_placement(100, 100, MAX_DPI).is_some());
        assert!(image_placement(100, 100, MAX_DPI + 1).is_none());
        assert!(image_placement(100, 100, 100_000).is_none());
    }

    #[test]
    fn test_image_placement_zero_size() {
        assert!(image_placement(0, 10, 300).is_none());
        assert!(image_placement(10, 10, 0).is_none());
    }

    #[test]
    fn test_cm_operator_format() {
        let t = FitTransform {
            scale: 0.5,
            tx: 10.0,
            ty: 20.25,
        };
        assert_eq!(
            t.to_cm(),
            "0.500000 0 0 0.500000 10.000000 20.250000 cm"
        );
    }
}
