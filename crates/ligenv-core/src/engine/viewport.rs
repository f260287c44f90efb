use crate::core::geometry::{BoundingBox, Point};
use serde::{Deserialize, Serialize};

/// Share of the viewport the fitted scene may occupy.
pub const FIT_MARGIN: f64 = 0.85;
pub const SCALE_EXTENT: (f64, f64) = (0.1, 10.0);

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Viewport {
    pub width: f64,
    pub height: f64,
}

impl Viewport {
    pub fn new(width: f64, height: f64) -> Self {
        Self { width, height }
    }

    pub fn center(&self) -> Point {
        Point::new(self.width / 2.0, self.height / 2.0)
    }
}

/// Uniform scale followed by a translation: `p' = p * k + (x, y)`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ZoomTransform {
    pub k: f64,
    pub x: f64,
    pub y: f64,
}

impl Default for ZoomTransform {
    fn default() -> Self {
        Self::IDENTITY
    }
}

impl ZoomTransform {
    pub const IDENTITY: Self = Self { k: 1.0, x: 0.0, y: 0.0 };

    pub fn new(k: f64, x: f64, y: f64) -> Self {
        Self { k, x, y }
    }

    pub fn apply(&self, p: Point) -> Point {
        Point::new(p.x * self.k + self.x, p.y * self.k + self.y)
    }

    pub fn invert(&self, p: Point) -> Point {
        Point::new((p.x - self.x) / self.k, (p.y - self.y) / self.k)
    }

    /// SVG `transform` attribute value.
    pub fn to_svg(&self) -> String {
        format!("translate({},{}) scale({})", self.x, self.y, self.k)
    }
}

/// Transform that centers `bbox` in `viewport`, scaled to fill [`FIT_MARGIN`] of it.
///
/// A box that is flat along one axis is fitted along the other; a single point keeps unit
/// scale and is only translated.
pub fn fit(bbox: &BoundingBox, viewport: &Viewport) -> ZoomTransform {
    let (w, h) = (bbox.width(), bbox.height());
    let ratio = match (w > 0.0, h > 0.0) {
        (true, true) => (viewport.width / w).min(viewport.height / h),
        (true, false) => viewport.width / w,
        (false, true) => viewport.height / h,
        (false, false) => 1.0 / FIT_MARGIN,
    };
    let k = ratio * FIT_MARGIN;
    ZoomTransform {
        k,
        x: -bbox.min.x * k + (viewport.width - w * k) / 2.0,
        y: -bbox.min.y * k + (viewport.height - h * k) / 2.0,
    }
}

/// Interactive zoom/pan state. Programmatic transforms are taken as-is; user zooming is
/// clamped to [`SCALE_EXTENT`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ZoomState {
    transform: ZoomTransform,
    pub enabled: bool,
}

impl Default for ZoomState {
    fn default() -> Self {
        Self {
            transform: ZoomTransform::IDENTITY,
            enabled: true,
        }
    }
}

impl ZoomState {
    pub fn transform(&self) -> ZoomTransform {
        self.transform
    }

    pub fn set_transform(&mut self, transform: ZoomTransform) {
        self.transform = transform;
    }

    /// Scales by `factor` around the screen point `anchor`, which stays fixed.
    pub fn zoom_by(&mut self, factor: f64, anchor: Point) {
        if !self.enabled {
            return;
        }
        let world = self.transform.invert(anchor);
        let k = (self.transform.k * factor).clamp(SCALE_EXTENT.0, SCALE_EXTENT.1);
        self.transform = ZoomTransform {
            k,
            x: anchor.x - world.x * k,
            y: anchor.y - world.y * k,
        };
    }

    pub fn pan_by(&mut self, dx: f64, dy: f64) {
        if self.enabled {
            self.transform.x += dx;
            self.transform.y += dy;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn close(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-9
    }

    #[test]
    fn fitted_box_is_centered_and_fills_margin() {
        let bbox = BoundingBox {
            min: Point::new(-50.0, 10.0),
            max: Point::new(150.0, 60.0),
        };
        let viewport = Viewport::new(800.0, 400.0);
        let t = fit(&bbox, &viewport);

        assert!(close(t.k, 4.0 * FIT_MARGIN));
        let lo = t.apply(bbox.min);
        let hi = t.apply(bbox.max);
        assert!(close((lo.x + hi.x) / 2.0, 400.0));
        assert!(close((lo.y + hi.y) / 2.0, 200.0));
        assert!(close(hi.x - lo.x, 800.0 * FIT_MARGIN));
        assert!(hi.y - lo.y <= 400.0 * FIT_MARGIN + 1e-9);
    }

    #[test]
    fn fit_round_trips_through_inverse() {
        let bbox = BoundingBox {
            min: Point::new(3.0, 4.0),
            max: Point::new(30.0, 90.0),
        };
        let t = fit(&bbox, &Viewport::new(500.0, 500.0));
        let p = Point::new(12.5, 47.0);
        let back = t.invert(t.apply(p));
        assert!(close(back.x, p.x) && close(back.y, p.y));
    }

    #[test]
    fn degenerate_boxes_still_center() {
        let viewport = Viewport::new(200.0, 100.0);
        let point = BoundingBox {
            min: Point::new(7.0, 7.0),
            max: Point::new(7.0, 7.0),
        };
        let t = fit(&point, &viewport);
        assert!(close(t.k, 1.0));
        let mapped = t.apply(Point::new(7.0, 7.0));
        assert!(close(mapped.x, 100.0) && close(mapped.y, 50.0));

        let flat = BoundingBox {
            min: Point::new(0.0, 5.0),
            max: Point::new(100.0, 5.0),
        };
        let t = fit(&flat, &viewport);
        assert!(close(t.k, 2.0 * FIT_MARGIN));
        assert!(t.k.is_finite() && t.x.is_finite() && t.y.is_finite());
    }

    #[test]
    fn user_zoom_is_clamped_and_keeps_anchor_fixed() {
        let mut zoom = ZoomState::default();
        let anchor = Point::new(100.0, 50.0);
        zoom.zoom_by(2.0, anchor);
        assert!(close(zoom.transform().k, 2.0));
        let fixed = zoom.transform().apply(Point::new(100.0, 50.0));
        assert!(close(fixed.x, anchor.x) && close(fixed.y, anchor.y));

        zoom.zoom_by(1000.0, anchor);
        assert_eq!(zoom.transform().k, SCALE_EXTENT.1);
        zoom.zoom_by(1e-6, anchor);
        assert_eq!(zoom.transform().k, SCALE_EXTENT.0);
    }

    #[test]
    fn programmatic_transform_is_not_clamped() {
        let mut zoom = ZoomState::default();
        zoom.set_transform(ZoomTransform::new(25.0, 1.0, 2.0));
        assert_eq!(zoom.transform().k, 25.0);
        assert_eq!(zoom.transform().to_svg(), "translate(1,2) scale(25)");
    }
}
