//! Tiled text watermark
//!
//! The overlay covers a canvas of the image's size with the same short text,
//! repeated on a staggered grid and rotated 45 degrees counter-clockwise.
//! Placements start one canvas width/height before the image and run two
//! past it so the rotated rows reach every corner.
//!
//! The overlay is described once ([`WatermarkComposer::compose`]) and can be
//! emitted either as SVG markup or rasterized directly onto an RGBA buffer.

use ab_glyph::{Font, PxScale, ScaleFont};
use convertly_core::constants::WATERMARK_OPACITY;
use convertly_core::models::WatermarkMode;
use image::{GrayImage, Luma, Rgba, RgbaImage};
use imageproc::drawing::{draw_text_mut, text_size};

use super::font::WatermarkFont;

/// Counter-clockwise tilt applied around each placement anchor.
const ROTATION_DEGREES: f32 = -45.0;

/// Divisor applied to the image width to derive the font size.
const FONT_SIZE_DIVISOR: u32 = 30;

/// Baseline start of one text instance, in canvas coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Placement {
    pub x: i64,
    pub y: i64,
}

/// Where the overlay sits relative to the image it is composited onto.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Gravity {
    #[default]
    Center,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum BlendMode {
    /// Porter-Duff source-over.
    #[default]
    Over,
}

/// Full description of a watermark overlay for one image.
#[derive(Debug, Clone, PartialEq)]
pub struct WatermarkOverlay {
    pub width: u32,
    pub height: u32,
    pub text: String,
    pub font_size: u32,
    /// RGB; alpha is carried by `opacity`.
    pub color: [u8; 3],
    pub opacity: f32,
    pub rotation_degrees: f32,
    pub placements: Vec<Placement>,
    pub gravity: Gravity,
    pub blend: BlendMode,
}

pub struct WatermarkComposer;

impl WatermarkComposer {
    /// Build the overlay for an image of `width x height`.
    ///
    /// Returns `None` when there is nothing to draw: empty text, mode
    /// `None`, or an image too narrow for a non-zero font size.
    pub fn compose(
        width: u32,
        height: u32,
        text: &str,
        mode: WatermarkMode,
    ) -> Option<WatermarkOverlay> {
        let text = text.trim();
        let color = match mode {
            WatermarkMode::None => return None,
            WatermarkMode::Light => [255, 255, 255],
            WatermarkMode::Dark => [0, 0, 0],
        };
        if text.is_empty() {
            return None;
        }

        let font_size = width / FONT_SIZE_DIVISOR;
        if font_size == 0 {
            tracing::debug!(width, "Image too narrow for a watermark, skipping");
            return None;
        }

        Some(WatermarkOverlay {
            width,
            height,
            text: text.to_string(),
            font_size,
            color,
            opacity: WATERMARK_OPACITY,
            rotation_degrees: ROTATION_DEGREES,
            placements: tile_placements(width, height, font_size),
            gravity: Gravity::Center,
            blend: BlendMode::Over,
        })
    }
}

/// Staggered grid of anchors.
///
/// Rows are `6 * font_size` apart and columns `4 * font_size`. Rows whose `y`
/// is an even multiple of the row spacing start flush; every other row is
/// shifted right by half a column.
pub fn tile_placements(width: u32, height: u32, font_size: u32) -> Vec<Placement> {
    let (width, height) = (width as i64, height as i64);
    let h_spacing = font_size as i64 * 4;
    let v_spacing = font_size as i64 * 6;
    if h_spacing == 0 {
        return Vec::new();
    }

    let mut placements = Vec::new();
    let mut y = -height;
    while y < height * 2 {
        let offset = if y % v_spacing == 0 && (y / v_spacing) % 2 == 0 {
            0
        } else {
            h_spacing / 2
        };

        let mut x = -width;
        while x < width * 2 {
            placements.push(Placement { x: x + offset, y });
            x += h_spacing;
        }
        y += v_spacing;
    }
    placements
}

impl WatermarkOverlay {
    /// SVG markup with one `<text>` element per placement.
    pub fn to_svg(&self) -> String {
        let fill = format!(
            "rgba({},{},{},{})",
            self.color[0], self.color[1], self.color[2], self.opacity
        );
        let text = escape_xml(&self.text);

        let mut svg = format!(
            r#"<svg xmlns="http://www.w3.org/2000/svg" width="{}" height="{}">"#,
            self.width, self.height
        );
        for p in &self.placements {
            svg.push_str(&format!(
                r#"<text x="{x}" y="{y}" fill="{fill}" font-size="{size}" font-family="Arial" transform="rotate({rot} {x},{y})">{text}</text>"#,
                x = p.x,
                y = p.y,
                fill = fill,
                size = self.font_size,
                rot = self.rotation_degrees,
                text = text,
            ));
        }
        svg.push_str("</svg>");
        svg
    }

    /// Rasterize the overlay and blend it onto `target`.
    ///
    /// The text is rendered once into a coverage stamp and stamped at every
    /// placement; pixels falling outside `target` are clipped.
    pub fn composite_onto(&self, target: &mut RgbaImage, font: &WatermarkFont) {
        let stamp = self.render_stamp(font);
        if stamp.is_empty() {
            return;
        }

        let (offset_x, offset_y) = match self.gravity {
            Gravity::Center => (
                (target.width() as i64 - self.width as i64) / 2,
                (target.height() as i64 - self.height as i64) / 2,
            ),
        };
        let (target_w, target_h) = (target.width() as i64, target.height() as i64);
        let bounds = StampBounds::of(&stamp);

        for placement in &self.placements {
            let origin_x = offset_x + placement.x;
            let origin_y = offset_y + placement.y;
            if !bounds.intersects(origin_x, origin_y, target_w, target_h) {
                continue;
            }

            for px in &stamp {
                let tx = origin_x + px.dx as i64;
                let ty = origin_y + px.dy as i64;
                if tx < 0 || ty < 0 || tx >= target_w || ty >= target_h {
                    continue;
                }

                let alpha = (px.coverage as f32 / 255.0) * self.opacity;
                let pixel = target.get_pixel_mut(tx as u32, ty as u32);
                *pixel = match self.blend {
                    BlendMode::Over => blend_over(*pixel, self.color, alpha),
                };
            }
        }
    }

    /// Coverage of one rotated text instance, relative to its anchor.
    fn render_stamp(&self, font: &WatermarkFont) -> Vec<StampPixel> {
        let font = font.as_font();
        let scale = PxScale::from(self.font_size as f32);
        let (text_w, _) = text_size(scale, font, &self.text);

        let scaled = font.as_scaled(scale);
        let ascent = scaled.ascent();
        let descent = scaled.descent();

        let pad = self.font_size.max(2);
        let mask_w = text_w + pad * 2;
        let mask_h = (ascent - descent).ceil().max(1.0) as u32 + pad * 2;

        let mut mask = GrayImage::new(mask_w, mask_h);
        draw_text_mut(
            &mut mask,
            Luma([255u8]),
            pad as i32,
            pad as i32,
            scale,
            font,
            &self.text,
        );

        let anchor = (pad as f32, pad as f32 + ascent);
        rotate_sparse(&mask, anchor, self.rotation_degrees)
    }
}

#[derive(Debug, Clone, Copy)]
struct StampPixel {
    dx: i32,
    dy: i32,
    coverage: u8,
}

/// Inclusive extent of a stamp relative to its anchor.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct StampBounds {
    min_dx: i64,
    max_dx: i64,
    min_dy: i64,
    max_dy: i64,
}

impl StampBounds {
    /// `stamp` must not be empty.
    fn of(stamp: &[StampPixel]) -> Self {
        let mut bounds = StampBounds {
            min_dx: i64::MAX,
            max_dx: i64::MIN,
            min_dy: i64::MAX,
            max_dy: i64::MIN,
        };
        for px in stamp {
            bounds.min_dx = bounds.min_dx.min(px.dx as i64);
            bounds.max_dx = bounds.max_dx.max(px.dx as i64);
            bounds.min_dy = bounds.min_dy.min(px.dy as i64);
            bounds.max_dy = bounds.max_dy.max(px.dy as i64);
        }
        bounds
    }

    /// Whether the stamp anchored at `(x, y)` touches a `width` x `height` canvas.
    fn intersects(&self, x: i64, y: i64, width: i64, height: i64) -> bool {
        x + self.max_dx >= 0
            && y + self.max_dy >= 0
            && x + self.min_dx < width
            && y + self.min_dy < height
    }
}

/// Rotate `mask` about `anchor` and keep only covered pixels.
///
/// Each destination row is clipped analytically to the rotated rectangle so
/// the cost follows the text area rather than its bounding box.
fn rotate_sparse(mask: &GrayImage, anchor: (f32, f32), degrees: f32) -> Vec<StampPixel> {
    let (sin, cos) = degrees.to_radians().sin_cos();
    let (ax, ay) = anchor;

    // Mask rectangle in anchor-relative coordinates.
    let (u0, u1) = (-ax, mask.width() as f32 - ax);
    let (v0, v1) = (-ay, mask.height() as f32 - ay);

    let corners = [(u0, v0), (u1, v0), (u0, v1), (u1, v1)];
    let (mut min_x, mut max_x) = (f32::MAX, f32::MIN);
    let (mut min_y, mut max_y) = (f32::MAX, f32::MIN);
    for (u, v) in corners {
        let x = u * cos - v * sin;
        let y = u * sin + v * cos;
        min_x = min_x.min(x);
        max_x = max_x.max(x);
        min_y = min_y.min(y);
        max_y = max_y.max(y);
    }

    let mut stamp = Vec::new();
    for dy in (min_y.floor() as i32)..=(max_y.ceil() as i32) {
        let cy = dy as f32 + 0.5;

        // Inverse rotation: u = x*cos + y*sin, v = -x*sin + y*cos.
        let (lo_u, hi_u) = solve_range(cos, cy * sin, u0, u1);
        let (lo_v, hi_v) = solve_range(-sin, cy * cos, v0, v1);
        let lo = lo_u.max(lo_v).max(min_x);
        let hi = hi_u.min(hi_v).min(max_x);
        if lo > hi {
            continue;
        }

        for dx in ((lo - 0.5).floor() as i32)..=((hi - 0.5).ceil() as i32) {
            let cx = dx as f32 + 0.5;
            let u = cx * cos + cy * sin;
            let v = -cx * sin + cy * cos;
            let coverage = sample_bilinear(mask, u + ax - 0.5, v + ay - 0.5);
            if coverage > 0 {
                stamp.push(StampPixel { dx, dy, coverage });
            }
        }
    }
    stamp
}

/// Range of `x` satisfying `lo <= a * x + b <= hi`.
fn solve_range(a: f32, b: f32, lo: f32, hi: f32) -> (f32, f32) {
    if a.abs() < 1e-6 {
        return if b >= lo && b <= hi {
            (f32::MIN, f32::MAX)
        } else {
            (f32::MAX, f32::MIN)
        };
    }
    let p = (lo - b) / a;
    let q = (hi - b) / a;
    (p.min(q), p.max(q))
}

fn sample_bilinear(mask: &GrayImage, x: f32, y: f32) -> u8 {
    let x0 = x.floor();
    let y0 = y.floor();
    let fx = x - x0;
    let fy = y - y0;
    let (x0, y0) = (x0 as i64, y0 as i64);

    let at = |x: i64, y: i64| -> f32 {
        if x < 0 || y < 0 || x >= mask.width() as i64 || y >= mask.height() as i64 {
            0.0
        } else {
            mask.get_pixel(x as u32, y as u32)[0] as f32
        }
    };

    let top = at(x0, y0) * (1.0 - fx) + at(x0 + 1, y0) * fx;
    let bottom = at(x0, y0 + 1) * (1.0 - fx) + at(x0 + 1, y0 + 1) * fx;
    (top * (1.0 - fy) + bottom * fy).round().clamp(0.0, 255.0) as u8
}

fn blend_over(background: Rgba<u8>, color: [u8; 3], fg_alpha: f32) -> Rgba<u8> {
    let fg_alpha = fg_alpha.clamp(0.0, 1.0);
    let bg_alpha = background[3] as f32 / 255.0;

    let out_alpha = fg_alpha + bg_alpha * (1.0 - fg_alpha);
    if out_alpha < 0.001 {
        return Rgba([0, 0, 0, 0]);
    }

    let blend_channel = |fg: u8, bg: u8| -> u8 {
        let fg_f = fg as f32 / 255.0;
        let bg_f = bg as f32 / 255.0;
        let result = (fg_f * fg_alpha + bg_f * bg_alpha * (1.0 - fg_alpha)) / out_alpha;
        (result * 255.0).round().clamp(0.0, 255.0) as u8
    };

    Rgba([
        blend_channel(color[0], background[0]),
        blend_channel(color[1], background[1]),
        blend_channel(color[2], background[2]),
        (out_alpha * 255.0).round() as u8,
    ])
}

fn escape_xml(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&apos;"),
            _ => escaped.push(c),
        }
    }
    escaped
}
