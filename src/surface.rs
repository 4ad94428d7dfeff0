use egui::{Color32, Pos2, Rect, Vec2};
use image::{Rgba, RgbaImage};
use uuid::Uuid;

use crate::style::PaperTexture;

pub const LOGICAL_WIDTH: u32 = 1200;
pub const LOGICAL_HEIGHT: u32 = 800;

/// Number of grain fibres scattered over washi paper
pub const GRAIN_LINES: usize = 50;
/// Fibre color on washi paper
pub const GRAIN_COLOR: Color32 = Color32::from_rgb(0xee, 0xee, 0xee);
const GRAIN_WIDTH: f32 = 1.0;

/// Size of the drawing surface
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SurfaceConfig {
    pub logical_width: u32,
    pub logical_height: u32,
    /// Physical pixels per logical pixel, never below 1
    pub device_pixel_ratio: f32,
}

impl Default for SurfaceConfig {
    fn default() -> Self {
        Self {
            logical_width: LOGICAL_WIDTH,
            logical_height: LOGICAL_HEIGHT,
            device_pixel_ratio: 1.0,
        }
    }
}

impl SurfaceConfig {
    pub fn with_pixel_ratio(self, ratio: f32) -> Self {
        let device_pixel_ratio = if ratio.is_finite() { ratio.max(1.0) } else { 1.0 };
        Self {
            device_pixel_ratio,
            ..self
        }
    }

    pub fn logical_size(&self) -> Vec2 {
        Vec2::new(self.logical_width as f32, self.logical_height as f32)
    }

    /// Backing buffer size in physical pixels (floored)
    pub fn pixel_size(&self) -> [u32; 2] {
        [
            (self.logical_width as f32 * self.device_pixel_ratio).floor() as u32,
            (self.logical_height as f32 * self.device_pixel_ratio).floor() as u32,
        ]
    }
}

/// xorshift64 generator for the paper grain
#[derive(Debug, Clone)]
pub(crate) struct GrainRng(u64);

impl GrainRng {
    pub(crate) fn new(seed: u64) -> Self {
        // xorshift never leaves zero
        Self(if seed == 0 { 0x9e37_79b9_7f4a_7c15 } else { seed })
    }

    fn next_u64(&mut self) -> u64 {
        let mut state = self.0;
        state ^= state << 13;
        state ^= state >> 7;
        state ^= state << 17;
        self.0 = state;
        state
    }

    /// Uniform in `[0, 1)`
    pub(crate) fn next_f32(&mut self) -> f32 {
        (self.next_u64() >> 40) as f32 / (1u64 << 24) as f32
    }
}

/// The raster that ink is painted onto.
///
/// All coordinates and widths passed in are logical; they are scaled by
/// the device pixel ratio when rasterized.
#[derive(Debug, Clone)]
pub struct Surface {
    id: Uuid,
    config: SurfaceConfig,
    paper: PaperTexture,
    pixels: RgbaImage,
    version: u64,
}

impl Surface {
    /// Allocates a fresh surface, filled with the paper background, with a
    /// random grain layout
    pub fn new(config: SurfaceConfig, paper: PaperTexture) -> Self {
        let id = Uuid::new_v4();
        let bits = id.as_u128();
        let seed = (bits as u64) ^ ((bits >> 64) as u64);
        Self::with_id(id, config, paper, seed)
    }

    /// Same as [`Surface::new`] with a fixed grain layout
    pub fn with_seed(config: SurfaceConfig, paper: PaperTexture, seed: u64) -> Self {
        Self::with_id(Uuid::new_v4(), config, paper, seed)
    }

    fn with_id(id: Uuid, config: SurfaceConfig, paper: PaperTexture, seed: u64) -> Self {
        let [width, height] = config.pixel_size();
        let mut surface = Self {
            id,
            config,
            paper,
            pixels: RgbaImage::from_pixel(width, height, Rgba(Color32::WHITE.to_array())),
            version: 0,
        };
        surface.fill(paper.background());
        if paper.has_grain() {
            surface.scatter_grain(&mut GrainRng::new(seed));
        }
        log::debug!(
            "Surface {} allocated: {}x{} px, paper {}",
            surface.id,
            width,
            height,
            paper.name()
        );
        surface
    }

    fn fill(&mut self, color: Color32) {
        let [r, g, b, a] = color.to_array();
        for pixel in self.pixels.pixels_mut() {
            *pixel = Rgba([r, g, b, a]);
        }
        self.version += 1;
    }

    fn scatter_grain(&mut self, rng: &mut GrainRng) {
        let size = self.config.logical_size();
        for _ in 0..GRAIN_LINES {
            let from = Pos2::new(rng.next_f32() * size.x, rng.next_f32() * size.y);
            let to = Pos2::new(rng.next_f32() * size.x, rng.next_f32() * size.y);
            self.paint_segment(from, to, GRAIN_WIDTH, GRAIN_COLOR, 1.0);
        }
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn config(&self) -> SurfaceConfig {
        self.config
    }

    pub fn paper(&self) -> PaperTexture {
        self.paper
    }

    pub fn background(&self) -> Color32 {
        self.paper.background()
    }

    pub fn width(&self) -> u32 {
        self.pixels.width()
    }

    pub fn height(&self) -> u32 {
        self.pixels.height()
    }

    pub fn image(&self) -> &RgbaImage {
        &self.pixels
    }

    /// Bumped on every change to the pixels
    pub fn version(&self) -> u64 {
        self.version
    }

    pub fn pixel(&self, x: u32, y: u32) -> Option<Color32> {
        if x >= self.width() || y >= self.height() {
            return None;
        }
        let [r, g, b, a] = self.pixels.get_pixel(x, y).0;
        Some(Color32::from_rgba_unmultiplied(r, g, b, a))
    }

    /// True if every pixel is the paper background
    pub fn is_blank(&self) -> bool {
        let background = Rgba(self.background().to_array());
        self.pixels.pixels().all(|p| *p == background)
    }

    /// Copy suitable for uploading as an egui texture
    pub fn to_color_image(&self) -> egui::ColorImage {
        egui::ColorImage::from_rgba_unmultiplied(
            [self.width() as usize, self.height() as usize],
            self.pixels.as_raw(),
        )
    }

    /// Paints a straight, round-capped segment in one pass.
    ///
    /// Each covered pixel is blended exactly once with alpha
    /// `opacity * color alpha * coverage`, so overlapping parts of the same segment do not
    /// darken. Returns the device-pixel rect that was touched, if any.
    pub fn paint_segment(
        &mut self,
        from: Pos2,
        to: Pos2,
        width: f32,
        color: Color32,
        opacity: f32,
    ) -> Option<Rect> {
        if !(from.is_finite() && to.is_finite() && width.is_finite()) || width <= 0.0 {
            return None;
        }
        // A translucent color scales the opacity like a canvas rgba stroke
        let [r, g, b, a] = color.to_srgba_unmultiplied();
        let opacity = opacity.clamp(0.0, 1.0) * a as f32 / 255.0;
        if opacity == 0.0 {
            return None;
        }

        let ratio = self.config.device_pixel_ratio;
        let start = Pos2::new(from.x * ratio, from.y * ratio);
        let end = Pos2::new(to.x * ratio, to.y * ratio);
        let radius = width * ratio / 2.0;
        // One extra pixel for the anti-aliased rim
        let reach = radius + 1.0;

        let min_x = (start.x.min(end.x) - reach).floor().max(0.0) as u32;
        let min_y = (start.y.min(end.y) - reach).floor().max(0.0) as u32;
        let max_x = ((start.x.max(end.x) + reach).ceil().max(0.0) as u32).min(self.width());
        let max_y = ((start.y.max(end.y) + reach).ceil().max(0.0) as u32).min(self.height());
        if min_x >= max_x || min_y >= max_y {
            return None;
        }

        for y in min_y..max_y {
            for x in min_x..max_x {
                let center = Pos2::new(x as f32 + 0.5, y as f32 + 0.5);
                let coverage = (radius + 0.5 - distance_to_segment(center, start, end)).clamp(0.0, 1.0);
                if coverage > 0.0 {
                    let dst = self.pixels.get_pixel_mut(x, y);
                    *dst = blend_over(*dst, [r, g, b], opacity * coverage);
                }
            }
        }
        self.version += 1;

        Some(Rect::from_min_max(
            Pos2::new(min_x as f32, min_y as f32),
            Pos2::new(max_x as f32, max_y as f32),
        ))
    }
}

/// Source-over of an opaque color at `alpha`
fn blend_over(dst: Rgba<u8>, src: [u8; 3], alpha: f32) -> Rgba<u8> {
    let dst_a = dst[3] as f32 / 255.0;
    let out_a = alpha + dst_a * (1.0 - alpha);
    if out_a <= 0.0 {
        return Rgba([0, 0, 0, 0]);
    }
    let channel = |s: u8, d: u8| {
        ((s as f32 * alpha + d as f32 * dst_a * (1.0 - alpha)) / out_a)
            .round()
            .clamp(0.0, 255.0) as u8
    };
    Rgba([
        channel(src[0], dst[0]),
        channel(src[1], dst[1]),
        channel(src[2], dst[2]),
        (out_a * 255.0).round().clamp(0.0, 255.0) as u8,
    ])
}

/// Distance from `point` to the closed segment `start..=end`
pub(crate) fn distance_to_segment(point: Pos2, start: Pos2, end: Pos2) -> f32 {
    let line = end - start;
    let len_sq = line.length_sq();
    if len_sq == 0.0 {
        return point.distance(start);
    }
    let t = ((point - start).dot(line) / len_sq).clamp(0.0, 1.0);
    point.distance(start + line * t)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn small_config() -> SurfaceConfig {
        SurfaceConfig {
            logical_width: 40,
            logical_height: 30,
            device_pixel_ratio: 1.0,
        }
    }

    #[test]
    fn test_pixel_size_scales_and_floors() {
        let config = SurfaceConfig::default().with_pixel_ratio(1.5);
        assert_eq!(config.pixel_size(), [1800, 1200]);

        let config = SurfaceConfig::default().with_pixel_ratio(1.333);
        assert_eq!(config.pixel_size(), [1599, 1066]);

        let config = SurfaceConfig::default().with_pixel_ratio(0.5);
        assert_eq!(config.device_pixel_ratio, 1.0);
        assert_eq!(config.pixel_size(), [1200, 800]);
    }

    #[test]
    fn test_new_surface_is_blank() {
        let surface = Surface::new(small_config(), PaperTexture::White);
        assert!(surface.is_blank());
        assert_eq!(surface.pixel(0, 0), Some(Color32::WHITE));
        assert_eq!(surface.pixel(40, 0), None);
    }

    #[test]
    fn test_washi_grain_is_seeded() {
        let a = Surface::with_seed(SurfaceConfig::default(), PaperTexture::Washi, 7);
        let b = Surface::with_seed(SurfaceConfig::default(), PaperTexture::Washi, 7);
        let c = Surface::with_seed(SurfaceConfig::default(), PaperTexture::Washi, 8);
        assert_eq!(a.image(), b.image());
        assert_ne!(a.image(), c.image());
        assert!(!a.is_blank());
    }

    #[test]
    fn test_paint_segment_blends_once() {
        let mut surface = Surface::new(small_config(), PaperTexture::White);
        let touched = surface
            .paint_segment(Pos2::new(5.0, 15.0), Pos2::new(35.0, 15.0), 6.0, Color32::BLACK, 0.5)
            .unwrap();
        assert!(touched.contains(Pos2::new(20.0, 15.0)));

        // Half black over white on the centre line
        let mid = surface.pixel(20, 15).unwrap();
        assert!((mid.r() as i32 - 128).abs() <= 1, "{:?}", mid);
        assert_eq!(mid.a(), 255);

        // Far from the segment stays untouched
        assert_eq!(surface.pixel(20, 2), Some(Color32::WHITE));
    }

    #[test]
    fn test_translucent_color_is_not_darkened() {
        let mut surface = Surface::new(small_config(), PaperTexture::White);
        let red = Color32::from_rgba_unmultiplied(255, 0, 0, 128);
        surface.paint_segment(Pos2::new(5.0, 15.0), Pos2::new(35.0, 15.0), 6.0, red, 1.0);

        // Half red over white: full red channel, the others halfway
        let mid = surface.pixel(20, 15).unwrap();
        assert!(mid.r() >= 253, "{:?}", mid);
        assert!((mid.g() as i32 - 127).abs() <= 2, "{:?}", mid);

        let version = surface.version();
        let clear = Color32::from_rgba_unmultiplied(0, 0, 0, 0);
        assert!(surface.paint_segment(Pos2::new(5.0, 5.0), Pos2::new(35.0, 5.0), 6.0, clear, 1.0).is_none());
        assert_eq!(surface.version(), version);
    }

    #[test]
    fn test_paint_segment_respects_pixel_ratio() {
        let config = small_config().with_pixel_ratio(2.0);
        let mut surface = Surface::new(config, PaperTexture::White);
        assert_eq!((surface.width(), surface.height()), (80, 60));

        surface.paint_segment(Pos2::new(10.0, 10.0), Pos2::new(30.0, 10.0), 2.0, Color32::BLACK, 1.0);
        assert_eq!(surface.pixel(40, 20), Some(Color32::BLACK));
        assert_eq!(surface.pixel(20, 10), Some(Color32::WHITE));
    }

    #[test]
    fn test_degenerate_segments() {
        let mut surface = Surface::new(small_config(), PaperTexture::White);
        let version = surface.version();
        assert!(surface
            .paint_segment(Pos2::ZERO, Pos2::new(10.0, 10.0), 0.0, Color32::BLACK, 1.0)
            .is_none());
        assert!(surface
            .paint_segment(Pos2::new(f32::NAN, 0.0), Pos2::ZERO, 4.0, Color32::BLACK, 1.0)
            .is_none());
        assert!(surface
            .paint_segment(Pos2::new(500.0, 500.0), Pos2::new(600.0, 600.0), 4.0, Color32::BLACK, 1.0)
            .is_none());
        assert_eq!(surface.version(), version);

        // A zero-length segment still leaves a dot
        surface.paint_segment(Pos2::new(10.0, 10.0), Pos2::new(10.0, 10.0), 6.0, Color32::BLACK, 1.0);
        assert_eq!(surface.pixel(10, 10), Some(Color32::BLACK));
    }

    #[test]
    fn test_distance_to_segment() {
        let a = Pos2::new(0.0, 0.0);
        let b = Pos2::new(10.0, 0.0);
        assert_eq!(distance_to_segment(Pos2::new(5.0, 3.0), a, b), 3.0);
        assert_eq!(distance_to_segment(Pos2::new(13.0, 4.0), a, b), 5.0);
        assert_eq!(distance_to_segment(Pos2::new(3.0, 4.0), a, a), 5.0);
    }
}
