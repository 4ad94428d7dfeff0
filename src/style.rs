use egui::Color32;
use serde::{Deserialize, Serialize};

use crate::error::StyleError;

/// Slider range for the base brush width
pub const BASE_WIDTH_RANGE: std::ops::RangeInclusive<f32> = 4.0..=80.0;
/// Slider range for global stroke opacity
pub const OPACITY_RANGE: std::ops::RangeInclusive<f32> = 0.1..=1.0;
/// Slider range for the water amount
pub const WATER_RANGE: std::ops::RangeInclusive<f32> = 0.0..=1.0;

/// Brush presets, each a fixed width multiplier
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum BrushType {
    #[default]
    Normal,
    Thin,
    Bold,
    Uno,
}

impl BrushType {
    pub const ALL: [BrushType; 4] = [Self::Normal, Self::Thin, Self::Bold, Self::Uno];

    pub fn width_multiplier(self) -> f32 {
        match self {
            Self::Normal => 1.0,
            Self::Thin => 0.4,
            Self::Bold => 2.0,
            Self::Uno => 1.2,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Self::Normal => "normal",
            Self::Thin => "thin",
            Self::Bold => "bold",
            Self::Uno => "uno",
        }
    }
}

/// Paper presets. Each one scales the stroke width, and washi also tints
/// the background and adds grain.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum PaperTexture {
    #[default]
    White,
    Washi,
    Hanshi,
    Gassen,
}

impl PaperTexture {
    pub const ALL: [PaperTexture; 4] = [Self::White, Self::Washi, Self::Hanshi, Self::Gassen];

    pub fn width_multiplier(self) -> f32 {
        match self {
            Self::White => 1.0,
            Self::Washi => 1.5,
            Self::Hanshi => 1.2,
            Self::Gassen => 0.7,
        }
    }

    /// Background color the surface is filled with
    pub fn background(self) -> Color32 {
        match self {
            Self::Washi => Color32::from_rgb(0xfd, 0xfc, 0xf7),
            _ => Color32::WHITE,
        }
    }

    pub fn has_grain(self) -> bool {
        matches!(self, Self::Washi)
    }

    pub fn name(self) -> &'static str {
        match self {
            Self::White => "white",
            Self::Washi => "washi",
            Self::Hanshi => "hanshi",
            Self::Gassen => "gassen",
        }
    }
}

/// Width before pressure is applied
pub fn width_for(base_width: f32, brush: BrushType, paper: PaperTexture) -> f32 {
    base_width * brush.width_multiplier() * paper.width_multiplier()
}

/// Everything the host UI can tweak about the ink.
///
/// The renderer only ever reads this; a new value is passed in with each
/// draw call.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StyleConfiguration {
    pub stroke_color: Color32,
    pub base_width: f32,
    pub opacity: f32,
    pub paper_texture: PaperTexture,
    pub brush_type: BrushType,
    /// Exposed to the host but not used by the renderer
    pub water_amount: f32,
}

impl Default for StyleConfiguration {
    fn default() -> Self {
        Self {
            stroke_color: Color32::BLACK,
            base_width: 24.0,
            opacity: 0.7,
            paper_texture: PaperTexture::White,
            brush_type: BrushType::Normal,
            water_amount: 0.3,
        }
    }
}

impl StyleConfiguration {
    /// Stroke width for the current brush and paper, before pressure
    pub fn line_width(&self) -> f32 {
        width_for(self.base_width, self.brush_type, self.paper_texture)
    }

    /// Copy with every slider value pulled into its UI range
    pub fn clamped(self) -> Self {
        Self {
            base_width: self
                .base_width
                .clamp(*BASE_WIDTH_RANGE.start(), *BASE_WIDTH_RANGE.end()),
            opacity: self.opacity.clamp(*OPACITY_RANGE.start(), *OPACITY_RANGE.end()),
            water_amount: self
                .water_amount
                .clamp(*WATER_RANGE.start(), *WATER_RANGE.end()),
            ..self
        }
    }

    pub fn with_color(self, stroke_color: Color32) -> Self {
        Self { stroke_color, ..self }
    }

    pub fn with_hex_color(self, hex: &str) -> Result<Self, StyleError> {
        Ok(self.with_color(parse_hex_color(hex)?))
    }

    pub fn with_base_width(self, base_width: f32) -> Self {
        Self { base_width, ..self }
    }

    pub fn with_opacity(self, opacity: f32) -> Self {
        Self { opacity, ..self }
    }

    pub fn with_paper(self, paper_texture: PaperTexture) -> Self {
        Self { paper_texture, ..self }
    }

    pub fn with_brush(self, brush_type: BrushType) -> Self {
        Self { brush_type, ..self }
    }

    pub fn with_water(self, water_amount: f32) -> Self {
        Self { water_amount, ..self }
    }
}

/// Parses `#rrggbb` (the leading `#` is optional) into an opaque color
pub fn parse_hex_color(hex: &str) -> Result<Color32, StyleError> {
    let invalid = || StyleError::InvalidColor(hex.to_owned());
    let digits = hex.strip_prefix('#').unwrap_or(hex);
    if digits.len() != 6 || !digits.is_ascii() {
        return Err(invalid());
    }

    let channel = |i: usize| u8::from_str_radix(&digits[i..i + 2], 16).map_err(|_| invalid());
    Ok(Color32::from_rgb(channel(0)?, channel(2)?, channel(4)?))
}
