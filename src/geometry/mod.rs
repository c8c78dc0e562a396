//! Geometric primitives for field placement.
//!
//! Field rectangles live in page-local UI space: origin at the top-left
//! corner of the page, y increasing downward, scale 1.0. PDF space has its
//! origin at the bottom-left corner; conversion happens only at the PDF
//! boundary through [`Rect::to_pdf`] and [`Rect::from_pdf`].

use serde::{Deserialize, Serialize};

/// A 2D point in page space.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Point {
    /// X coordinate
    pub x: f32,
    /// Y coordinate
    pub y: f32,
}

impl Point {
    /// Create a new point.
    ///
    /// # Examples
    ///
    /// ```
    /// use form_oxide::geometry::Point;
    ///
    /// let point = Point::new(10.0, 20.0);
    /// assert_eq!(point.x, 10.0);
    /// assert_eq!(point.y, 20.0);
    /// ```
    pub fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }
}

/// A rectangle in page space.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Rect {
    /// X coordinate of top-left corner
    pub x: f32,
    /// Y coordinate of top-left corner
    pub y: f32,
    /// Width of rectangle
    pub width: f32,
    /// Height of rectangle
    pub height: f32,
}

impl Rect {
    /// Create a new rectangle from position and dimensions.
    ///
    /// # Examples
    ///
    /// ```
    /// use form_oxide::geometry::Rect;
    ///
    /// let rect = Rect::new(0.0, 0.0, 150.0, 30.0);
    /// assert_eq!(rect.width, 150.0);
    /// assert_eq!(rect.height, 30.0);
    /// ```
    pub fn new(x: f32, y: f32, width: f32, height: f32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// Create a rectangle from two corner points.
    pub fn from_points(x0: f32, y0: f32, x1: f32, y1: f32) -> Self {
        Self {
            x: x0.min(x1),
            y: y0.min(y1),
            width: (x1 - x0).abs(),
            height: (y1 - y0).abs(),
        }
    }

    /// Get the left edge x-coordinate.
    pub fn left(&self) -> f32 {
        self.x
    }

    /// Get the right edge x-coordinate.
    pub fn right(&self) -> f32 {
        self.x + self.width
    }

    /// Get the top edge y-coordinate.
    pub fn top(&self) -> f32 {
        self.y
    }

    /// Get the bottom edge y-coordinate.
    pub fn bottom(&self) -> f32 {
        self.y + self.height
    }

    /// Top-left corner.
    pub fn origin(&self) -> Point {
        Point::new(self.x, self.y)
    }

    /// The same rectangle moved so its top-left corner is at `p`.
    pub fn with_origin(&self, p: Point) -> Rect {
        Rect::new(p.x, p.y, self.width, self.height)
    }

    /// Check if this rectangle intersects with another.
    ///
    /// Rectangles that only share an edge do not intersect: the
    /// separating comparisons are strict.
    ///
    /// # Examples
    ///
    /// ```
    /// use form_oxide::geometry::Rect;
    ///
    /// let r1 = Rect::new(0.0, 0.0, 100.0, 100.0);
    /// let r2 = Rect::new(50.0, 50.0, 100.0, 100.0);
    /// let touching = Rect::new(100.0, 0.0, 100.0, 100.0);
    ///
    /// assert!(r1.intersects(&r2));
    /// assert!(!r1.intersects(&touching));
    /// ```
    pub fn intersects(&self, other: &Rect) -> bool {
        let separated = self.right() <= other.left()
            || other.right() <= self.left()
            || self.bottom() <= other.top()
            || other.bottom() <= self.top();
        !separated
    }

    /// Check if this rectangle contains a point (edges included).
    pub fn contains_point(&self, p: &Point) -> bool {
        p.x >= self.left() && p.x <= self.right() && p.y >= self.top() && p.y <= self.bottom()
    }

    /// True when every component is finite and the size is positive.
    pub fn is_valid(&self) -> bool {
        self.x.is_finite()
            && self.y.is_finite()
            && self.width.is_finite()
            && self.height.is_finite()
            && self.width > 0.0
            && self.height > 0.0
    }

    /// Convert a top-left-origin rectangle to PDF space on a page of the
    /// given height: `pdfY = pageHeight - y - height`.
    ///
    /// # Examples
    ///
    /// ```
    /// use form_oxide::geometry::Rect;
    ///
    /// let ui = Rect::new(10.0, 50.0, 150.0, 30.0);
    /// let pdf = ui.to_pdf(792.0);
    /// assert_eq!(pdf.y, 712.0);
    /// ```
    pub fn to_pdf(&self, page_height: f32) -> Rect {
        Rect::new(self.x, page_height - self.y - self.height, self.width, self.height)
    }

    /// Inverse of [`Rect::to_pdf`].
    pub fn from_pdf(pdf: &Rect, page_height: f32) -> Rect {
        Rect::new(pdf.x, page_height - pdf.y - pdf.height, pdf.width, pdf.height)
    }

    /// PDF `/Rect` array layout `[llx, lly, urx, ury]`.
    pub fn to_corners(&self) -> [f32; 4] {
        [self.x, self.y, self.x + self.width, self.y + self.height]
    }
}

/// Compute the Euclidean distance between two points.
///
/// # Examples
///
/// ```
/// use form_oxide::geometry::{Point, euclidean_distance};
///
/// let p1 = Point::new(0.0, 0.0);
/// let p2 = Point::new(3.0, 4.0);
///
/// assert_eq!(euclidean_distance(&p1, &p2), 5.0);
/// ```
pub fn euclidean_distance(p1: &Point, p2: &Point) -> f32 {
    ((p2.x - p1.x).powi(2) + (p2.y - p1.y).powi(2)).sqrt()
}

/// Quantize a coordinate to the nearest multiple of `grid_size`.
///
/// Halves round up (toward positive infinity), so with a grid of 10,
/// `25` snaps to `30` and `-25` snaps to `-20`.
pub fn snap_value(value: f32, grid_size: f32) -> f32 {
    if grid_size.is_nan() || grid_size <= 0.0 || !value.is_finite() {
        return value;
    }
    (value / grid_size + 0.5).floor() * grid_size
}

/// Snap a point to the grid when `enabled`, otherwise return it unchanged.
///
/// # Examples
///
/// ```
/// use form_oxide::geometry::{Point, snap_to_grid};
///
/// let snapped = snap_to_grid(Point::new(23.0, 25.0), 10.0, true);
/// assert_eq!(snapped, Point::new(20.0, 30.0));
///
/// let raw = snap_to_grid(Point::new(23.0, 25.0), 10.0, false);
/// assert_eq!(raw, Point::new(23.0, 25.0));
/// ```
pub fn snap_to_grid(p: Point, grid_size: f32, enabled: bool) -> Point {
    if !enabled {
        return p;
    }
    Point::new(snap_value(p.x, grid_size), snap_value(p.y, grid_size))
}
