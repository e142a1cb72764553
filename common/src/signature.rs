//! Signature pad raster
//!
//! Each [`SignatureSurface`] owns one RGBA bitmap and its own drawing state.
//! Strokes are rasterized as they arrive; the bitmap round-trips through a
//! PNG data URL so it can be embedded in JSON records and HTML.

use crate::error::{Error, Result};
use base64::{engine::general_purpose::STANDARD, Engine as _};
use image::imageops::{self, FilterType};
use image::{ImageFormat, Pixel, Rgba, RgbaImage};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::io::Cursor;
use std::sync::atomic::{AtomicU32, Ordering};

/// Line width in pixels
pub const STROKE_WIDTH: f32 = 2.0;
/// Opaque black ink
pub const STROKE_COLOR: Rgba<u8> = Rgba([0, 0, 0, 255]);
/// Fully transparent background
pub const BACKGROUND: Rgba<u8> = Rgba([0, 0, 0, 0]);

const DATA_URL_PREFIX: &str = "data:image/png;base64,";
/// Distance between disk stamps along a segment
const STAMP_STEP: f32 = 0.5;

static NEXT_SURFACE_ID: AtomicU32 = AtomicU32::new(1);

/// Identity of one surface instance, used to attribute input events.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SurfaceId(u32);

/// Surface-relative pixel coordinate (origin top-left)
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Point {
    pub x: f32,
    pub y: f32,
}

impl Point {
    pub fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    fn distance(&self, other: &Point) -> f32 {
        ((self.x - other.x).powi(2) + (self.y - other.y).powi(2)).sqrt()
    }

    fn is_finite(&self) -> bool {
        self.x.is_finite() && self.y.is_finite()
    }

    fn lerp(&self, other: &Point, t: f32) -> Point {
        Point::new(
            self.x + (other.x - self.x) * t,
            self.y + (other.y - self.y) * t,
        )
    }
}

/// One pointer-down-to-pointer-up gesture
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Stroke {
    points: Vec<Point>,
}

impl Stroke {
    pub fn points(&self) -> &[Point] {
        &self.points
    }
}

/// A decoded encoded image, ready to be drawn.
///
/// Decoding and drawing are separate steps so a caller can decode off the
/// UI thread and only draw once the bitmap is available.
#[derive(Clone)]
pub struct DecodedSignature {
    bitmap: RgbaImage,
}

impl DecodedSignature {
    /// Decode a `data:image/png;base64,...` URL (a bare base64 payload is accepted too).
    pub fn decode(data: &str) -> Result<Self> {
        let payload = match data.strip_prefix("data:") {
            Some(rest) => rest
                .split_once(";base64,")
                .map(|(_, b64)| b64)
                .ok_or_else(|| Error::decode("signature", "data URL is not base64"))?,
            None => data,
        };

        let bytes = STANDARD
            .decode(payload.trim())
            .map_err(|e| Error::decode("signature", e))?;
        let bitmap = image::load_from_memory(&bytes)
            .map_err(|e| Error::decode("signature", e))?
            .to_rgba8();

        Ok(Self { bitmap })
    }

    /// Wrap an image decoded elsewhere (e.g. loaded from a file)
    pub fn from_rgba(bitmap: RgbaImage) -> Self {
        Self { bitmap }
    }

    pub fn width(&self) -> u32 {
        self.bitmap.width()
    }

    pub fn height(&self) -> u32 {
        self.bitmap.height()
    }

    /// The bitmap scaled to `width` x `height` (unchanged when sizes match).
    fn scaled(&self, width: u32, height: u32) -> RgbaImage {
        if self.bitmap.dimensions() == (width, height) {
            self.bitmap.clone()
        } else {
            imageops::resize(&self.bitmap, width, height, FilterType::Triangle)
        }
    }
}

impl fmt::Debug for DecodedSignature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DecodedSignature")
            .field("width", &self.width())
            .field("height", &self.height())
            .finish()
    }
}

/// Raster drawing surface for one signature.
pub struct SignatureSurface {
    id: SurfaceId,
    bitmap: RgbaImage,
    strokes: Vec<Stroke>,
    active: Option<Stroke>,
}

impl SignatureSurface {
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            id: SurfaceId(NEXT_SURFACE_ID.fetch_add(1, Ordering::Relaxed)),
            bitmap: RgbaImage::from_pixel(width, height, BACKGROUND),
            strokes: Vec::new(),
            active: None,
        }
    }

    /// New surface with `data` drawn onto it, scaled to fit.
    pub fn from_encoded(data: &str, width: u32, height: u32) -> Result<Self> {
        let mut surface = Self::new(width, height);
        surface.import_encoded(data, width, height)?;
        Ok(surface)
    }

    pub fn id(&self) -> SurfaceId {
        self.id
    }

    pub fn width(&self) -> u32 {
        self.bitmap.width()
    }

    pub fn height(&self) -> u32 {
        self.bitmap.height()
    }

    pub fn bitmap(&self) -> &RgbaImage {
        &self.bitmap
    }

    /// Strokes completed since the last clear
    pub fn strokes(&self) -> &[Stroke] {
        &self.strokes
    }

    pub fn is_drawing(&self) -> bool {
        self.active.is_some()
    }

    /// Start a stroke at `point`. Ignored while a stroke is active or when
    /// the point is not finite.
    pub fn begin_stroke(&mut self, point: Point) {
        if self.active.is_some() || !point.is_finite() {
            return;
        }
        self.active = Some(Stroke {
            points: vec![point],
        });
    }

    /// Append `point` to the active stroke and rasterize the new segment.
    ///
    /// Ignored unless a stroke is active and `origin` is this surface.
    /// Non-finite points are dropped.
    pub fn extend_stroke(&mut self, origin: SurfaceId, point: Point) {
        if origin != self.id || !point.is_finite() {
            return;
        }
        let Some(stroke) = self.active.as_mut() else {
            return;
        };
        let from = stroke.points.last().copied().unwrap_or(point);
        stroke.points.push(point);
        self.draw_segment(from, point);
    }

    pub fn end_stroke(&mut self) {
        if let Some(stroke) = self.active.take() {
            self.strokes.push(stroke);
        }
    }

    pub fn clear(&mut self) {
        for pixel in self.bitmap.pixels_mut() {
            *pixel = BACKGROUND;
        }
        self.strokes.clear();
        self.active = None;
    }

    pub fn is_empty(&self) -> bool {
        self.bitmap.pixels().all(|p| *p == BACKGROUND)
    }

    /// Copy of the current bitmap, drawable onto another surface
    pub fn snapshot(&self) -> DecodedSignature {
        DecodedSignature {
            bitmap: self.bitmap.clone(),
        }
    }

    /// PNG data URL of the current bitmap
    pub fn export_encoded(&self) -> Result<String> {
        let mut bytes = Vec::new();
        self.bitmap
            .write_to(&mut Cursor::new(&mut bytes), ImageFormat::Png)
            .map_err(|e| Error::Image(e.to_string()))?;
        Ok(format!("{}{}", DATA_URL_PREFIX, STANDARD.encode(&bytes)))
    }

    /// Decode `data` and draw it at the origin, scaled to the target size.
    ///
    /// A decode failure leaves the bitmap untouched.
    pub fn import_encoded(&mut self, data: &str, target_width: u32, target_height: u32) -> Result<()> {
        let decoded = DecodedSignature::decode(data)?;
        self.draw_decoded(&decoded, target_width, target_height);
        Ok(())
    }

    /// Source-over composite of an already decoded image.
    pub fn draw_decoded(&mut self, decoded: &DecodedSignature, target_width: u32, target_height: u32) {
        let scaled = decoded.scaled(target_width, target_height);
        let (width, height) = self.bitmap.dimensions();

        for (x, y, src) in scaled.enumerate_pixels() {
            if x >= width || y >= height || src[3] == 0 {
                continue;
            }
            let dst = self.bitmap.get_pixel_mut(x, y);
            if src[3] == u8::MAX {
                *dst = *src;
            } else {
                dst.blend(src);
            }
        }
    }

    /// Stamp along the part of the segment that can touch the bitmap.
    fn draw_segment(&mut self, from: Point, to: Point) {
        let Some((from, to)) = self.clip_segment(from, to) else {
            return;
        };
        let steps = (from.distance(&to) / STAMP_STEP).ceil().max(1.0) as usize;
        for i in 0..=steps {
            let t = i as f32 / steps as f32;
            self.stamp(from.lerp(&to, t));
        }
    }

    /// Liang-Barsky clip against the bitmap grown by the stroke radius.
    ///
    /// Computed in f64 so far-off coordinates cannot overflow.
    fn clip_segment(&self, from: Point, to: Point) -> Option<(Point, Point)> {
        let margin = f64::from(STROKE_WIDTH);
        let (min_x, min_y) = (-margin, -margin);
        let max_x = f64::from(self.bitmap.width()) + margin;
        let max_y = f64::from(self.bitmap.height()) + margin;

        let (x0, y0) = (f64::from(from.x), f64::from(from.y));
        let (dx, dy) = (f64::from(to.x) - x0, f64::from(to.y) - y0);
        let (mut t0, mut t1) = (0.0_f64, 1.0_f64);

        for (p, q) in [(-dx, x0 - min_x), (dx, max_x - x0), (-dy, y0 - min_y), (dy, max_y - y0)] {
            if p == 0.0 {
                if q < 0.0 {
                    return None;
                }
                continue;
            }
            let r = q / p;
            if p < 0.0 {
                if r > t1 {
                    return None;
                }
                t0 = t0.max(r);
            } else {
                if r < t0 {
                    return None;
                }
                t1 = t1.min(r);
            }
        }

        let at = |t: f64| Point::new((x0 + dx * t) as f32, (y0 + dy * t) as f32);
        Some((at(t0), at(t1)))
    }

    /// Fill the disk of diameter [`STROKE_WIDTH`] around `center` (round caps and joins).
    fn stamp(&mut self, center: Point) {
        let radius = STROKE_WIDTH / 2.0;
        let (width, height) = (self.bitmap.width() as i64, self.bitmap.height() as i64);

        let x0 = ((center.x - radius).floor() as i64).max(0);
        let x1 = ((center.x + radius).ceil() as i64).min(width - 1);
        let y0 = ((center.y - radius).floor() as i64).max(0);
        let y1 = ((center.y + radius).ceil() as i64).min(height - 1);

        for py in y0..=y1 {
            for px in x0..=x1 {
                let dx = px as f32 + 0.5 - center.x;
                let dy = py as f32 + 0.5 - center.y;
                if dx * dx + dy * dy <= radius * radius {
                    self.bitmap.put_pixel(px as u32, py as u32, STROKE_COLOR);
                }
            }
        }
    }
}

impl fmt::Debug for SignatureSurface {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SignatureSurface")
            .field("id", &self.id)
            .field("width", &self.width())
            .field("height", &self.height())
            .field("strokes", &self.strokes.len())
            .field("drawing", &self.is_drawing())
            .finish()
    }
}
