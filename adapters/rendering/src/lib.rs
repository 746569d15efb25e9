#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Shared rendering contracts for Fear the Water adapters.
//!
//! Entities never talk to a concrete backend. They draw through the
//! [`Surface`] capability set in game-logical coordinates; adapters wrap their
//! backend surface in a [`ScaledSurface`] so a single scale factor maps logical
//! units onto pixels.

use anyhow::Result as AnyResult;
use fear_the_water_core::WELCOME_BANNER;
use glam::Vec2;
use std::{error::Error, fmt, time::Duration};

/// RGBA color used when presenting frames.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Color {
    /// Red channel intensity in the range 0.0..=1.0.
    pub red: f32,
    /// Green channel intensity in the range 0.0..=1.0.
    pub green: f32,
    /// Blue channel intensity in the range 0.0..=1.0.
    pub blue: f32,
    /// Alpha channel intensity in the range 0.0..=1.0.
    pub alpha: f32,
}

impl Color {
    /// Opaque white.
    pub const WHITE: Self = Self::new(1.0, 1.0, 1.0, 1.0);

    /// Opaque black.
    pub const BLACK: Self = Self::new(0.0, 0.0, 0.0, 1.0);

    /// Creates a new color from floating point channels.
    #[must_use]
    pub const fn new(red: f32, green: f32, blue: f32, alpha: f32) -> Self {
        Self {
            red,
            green,
            blue,
            alpha,
        }
    }

    /// Creates an opaque color from byte RGB values.
    #[must_use]
    pub const fn from_rgb_u8(red: u8, green: u8, blue: u8) -> Self {
        Self::from_rgba_u8(red, green, blue, 255)
    }

    /// Creates a color from byte RGBA values.
    #[must_use]
    pub const fn from_rgba_u8(red: u8, green: u8, blue: u8, alpha: u8) -> Self {
        Self {
            red: red as f32 / 255.0,
            green: green as f32 / 255.0,
            blue: blue as f32 / 255.0,
            alpha: alpha as f32 / 255.0,
        }
    }

    /// Parses a CSS-style hex color: `#rgb`, `#rgba`, `#rrggbb` or `#rrggbbaa`.
    pub fn from_hex(value: &str) -> Result<Self, RenderingError> {
        let invalid = || RenderingError::InvalidColor {
            value: value.to_owned(),
        };

        let digits = value.trim().strip_prefix('#').ok_or_else(invalid)?;
        if !digits.chars().all(|digit| digit.is_ascii_hexdigit()) {
            return Err(invalid());
        }

        let nibble = |index: usize| -> Result<u8, RenderingError> {
            u8::from_str_radix(&digits[index..=index], 16).map_err(|_| invalid())
        };
        let byte = |index: usize| -> Result<u8, RenderingError> {
            u8::from_str_radix(&digits[index..index + 2], 16).map_err(|_| invalid())
        };

        match digits.len() {
            3 | 4 => {
                let alpha = if digits.len() == 4 { nibble(3)? } else { 0xf };
                Ok(Self::from_rgba_u8(
                    nibble(0)? * 0x11,
                    nibble(1)? * 0x11,
                    nibble(2)? * 0x11,
                    alpha * 0x11,
                ))
            }
            6 | 8 => {
                let alpha = if digits.len() == 8 { byte(6)? } else { 0xff };
                Ok(Self::from_rgba_u8(byte(0)?, byte(2)?, byte(4)?, alpha))
            }
            _ => Err(invalid()),
        }
    }

    /// Returns the same color with a replaced alpha channel.
    #[must_use]
    pub fn with_alpha(self, alpha: f32) -> Self {
        Self {
            alpha: alpha.clamp(0.0, 1.0),
            ..self
        }
    }

    /// Returns a new color lightened towards white by the provided amount.
    #[must_use]
    pub fn lighten(self, amount: f32) -> Self {
        let amount = amount.clamp(0.0, 1.0);

        Self {
            red: lighten_channel(self.red, amount),
            green: lighten_channel(self.green, amount),
            blue: lighten_channel(self.blue, amount),
            alpha: self.alpha,
        }
    }
}

fn lighten_channel(channel: f32, amount: f32) -> f32 {
    channel + (1.0 - channel) * amount
}

/// Drawing capabilities consumed by renderable entities.
///
/// Coordinates are expressed in the surface's own space; wrap a backend in a
/// [`ScaledSurface`] to accept game-logical coordinates.
pub trait Surface {
    /// Clears a rectangular region back to the backend's clear color.
    fn clear_rect(&mut self, origin: Vec2, size: Vec2);

    /// Fills an axis-aligned rectangle.
    fn fill_rect(&mut self, origin: Vec2, size: Vec2, color: Color);

    /// Width of `text` when drawn at `font_size`.
    fn measure_text(&self, text: &str, font_size: f32) -> f32;

    /// Draws `text` with its baseline starting at `position`.
    fn fill_text(&mut self, text: &str, position: Vec2, font_size: f32, color: Color);
}

/// Surface adapter that maps logical coordinates onto an inner surface.
#[derive(Debug)]
pub struct ScaledSurface<'a, S: Surface + ?Sized> {
    inner: &'a mut S,
    scale: f32,
}

impl<'a, S: Surface + ?Sized> ScaledSurface<'a, S> {
    /// Wraps `inner`, multiplying every coordinate by `scale`.
    pub fn new(inner: &'a mut S, scale: f32) -> Self {
        Self { inner, scale }
    }

    /// Scale factor applied to outgoing coordinates.
    #[must_use]
    pub fn scale(&self) -> f32 {
        self.scale
    }
}

impl<S: Surface + ?Sized> Surface for ScaledSurface<'_, S> {
    fn clear_rect(&mut self, origin: Vec2, size: Vec2) {
        self.inner.clear_rect(origin * self.scale, size * self.scale);
    }

    fn fill_rect(&mut self, origin: Vec2, size: Vec2, color: Color) {
        self.inner
            .fill_rect(origin * self.scale, size * self.scale, color);
    }

    fn measure_text(&self, text: &str, font_size: f32) -> f32 {
        if self.scale <= f32::EPSILON {
            return 0.0;
        }
        self.inner.measure_text(text, font_size * self.scale) / self.scale
    }

    fn fill_text(&mut self, text: &str, position: Vec2, font_size: f32, color: Color) {
        self.inner
            .fill_text(text, position * self.scale, font_size * self.scale, color);
    }
}

/// Shared capability implemented by every drawable entity.
pub trait Renderable {
    /// Top-left corner in logical coordinates.
    fn position(&self) -> Vec2;

    /// Extent in logical coordinates.
    fn size(&self) -> Vec2;

    /// Draws the entity onto `surface`.
    fn render(&self, surface: &mut dyn Surface);

    /// Advances any time-based state. Static entities ignore this.
    fn update(&mut self, _dt: Duration) {}

    /// Whether `point` lies inside the entity's bounds.
    fn contains(&self, point: Vec2) -> bool {
        let min = self.position();
        let max = min + self.size();
        point.x >= min.x && point.y >= min.y && point.x < max.x && point.y < max.y
    }
}

/// Single draw call captured by a [`RecordingSurface`].
#[derive(Clone, Debug, PartialEq)]
pub enum DrawCommand {
    /// Region cleared to the backend clear color.
    Clear {
        /// Top-left corner of the region.
        origin: Vec2,
        /// Extent of the region.
        size: Vec2,
    },
    /// Filled rectangle.
    FillRect {
        /// Top-left corner of the rectangle.
        origin: Vec2,
        /// Extent of the rectangle.
        size: Vec2,
        /// Fill color.
        color: Color,
    },
    /// Drawn text.
    Text {
        /// Drawn string.
        text: String,
        /// Baseline origin.
        position: Vec2,
        /// Font size in surface units.
        font_size: f32,
        /// Text color.
        color: Color,
    },
}

/// Headless surface that records draw calls instead of producing pixels.
///
/// Text is measured as a monospace run whose glyphs are half as wide as the
/// font size.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct RecordingSurface {
    commands: Vec<DrawCommand>,
}

impl RecordingSurface {
    /// Creates an empty recording.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Commands recorded so far, in submission order.
    #[must_use]
    pub fn commands(&self) -> &[DrawCommand] {
        &self.commands
    }

    /// Returns the recorded commands and starts a fresh recording.
    pub fn take_commands(&mut self) -> Vec<DrawCommand> {
        std::mem::take(&mut self.commands)
    }
}

impl Surface for RecordingSurface {
    fn clear_rect(&mut self, origin: Vec2, size: Vec2) {
        self.commands.push(DrawCommand::Clear { origin, size });
    }

    fn fill_rect(&mut self, origin: Vec2, size: Vec2, color: Color) {
        self.commands
            .push(DrawCommand::FillRect { origin, size, color });
    }

    fn measure_text(&self, text: &str, font_size: f32) -> f32 {
        text.chars().count() as f32 * font_size * 0.5
    }

    fn fill_text(&mut self, text: &str, position: Vec2, font_size: f32, color: Color) {
        self.commands.push(DrawCommand::Text {
            text: text.to_owned(),
            position,
            font_size,
            color,
        });
    }
}

/// Input snapshot gathered by adapters before a frame is drawn.
#[derive(Clone, Copy, Debug, PartialEq, Default)]
pub struct FrameInput {
    /// Primary pointer press observed this frame, in logical coordinates.
    pub pointer_press: Option<Vec2>,
}

/// Presentation descriptor consumed by rendering backends.
#[derive(Clone, Debug, PartialEq)]
pub struct Presentation {
    /// Title used by the created window.
    pub window_title: String,
    /// Solid color used to clear each frame.
    pub clear_color: Color,
    /// Logical screen dimensions.
    pub logical_size: Vec2,
    /// Uniform multiplier from logical coordinates to pixels.
    pub scale: f32,
}

impl Presentation {
    /// Constructs a new presentation descriptor.
    #[must_use]
    pub fn new<T>(window_title: T, clear_color: Color, logical_size: Vec2, scale: f32) -> Self
    where
        T: Into<String>,
    {
        Self {
            window_title: window_title.into(),
            clear_color,
            logical_size,
            scale,
        }
    }

    /// Presentation titled with the game banner.
    #[must_use]
    pub fn titled(clear_color: Color, logical_size: Vec2, scale: f32) -> Self {
        Self::new(WELCOME_BANNER, clear_color, logical_size, scale)
    }

    /// Window dimensions in pixels.
    #[must_use]
    pub fn window_size(&self) -> Vec2 {
        self.logical_size * self.scale
    }

    /// Converts a pixel-space position into logical coordinates.
    #[must_use]
    pub fn to_logical(&self, pixel: Vec2) -> Vec2 {
        if self.scale <= f32::EPSILON {
            return Vec2::ZERO;
        }
        pixel / self.scale
    }
}

/// Rendering backend capable of driving a frame loop.
pub trait RenderingBackend {
    /// Runs the rendering backend until it is requested to exit.
    ///
    /// The `frame` closure receives the simulated frame delta, the per-frame
    /// input and a surface that already accepts logical coordinates.
    fn run<F>(self, presentation: Presentation, frame: F) -> AnyResult<()>
    where
        F: FnMut(Duration, FrameInput, &mut dyn Surface) + 'static;
}

/// Errors that can occur when constructing rendering descriptors.
#[derive(Debug, PartialEq, Eq)]
pub enum RenderingError {
    /// A color string could not be parsed as hex.
    InvalidColor {
        /// Rejected input.
        value: String,
    },
}

impl fmt::Display for RenderingError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidColor { value } => {
                write!(f, "'{value}' is not a #rgb, #rgba, #rrggbb or #rrggbbaa color")
            }
        }
    }
}

impl Error for RenderingError {}

#[cfg(test)]
mod tests {
    use super::*;

    struct Square {
        origin: Vec2,
        edge: f32,
    }

    impl Renderable for Square {
        fn position(&self) -> Vec2 {
            self.origin
        }

        fn size(&self) -> Vec2 {
            Vec2::splat(self.edge)
        }

        fn render(&self, surface: &mut dyn Surface) {
            surface.fill_rect(self.origin, self.size(), Color::WHITE);
        }
    }

    #[test]
    fn hex_colors_parse_all_supported_lengths() {
        assert_eq!(
            Color::from_hex("#fff").expect("short hex"),
            Color::from_rgb_u8(255, 255, 255)
        );
        assert_eq!(
            Color::from_hex("#1e90ff").expect("long hex"),
            Color::from_rgb_u8(0x1e, 0x90, 0xff)
        );
        assert_eq!(
            Color::from_hex("#1e90ff40").expect("hex with alpha"),
            Color::from_rgba_u8(0x1e, 0x90, 0xff, 0x40)
        );
        assert_eq!(
            Color::from_hex("#0008").expect("short hex with alpha"),
            Color::from_rgba_u8(0, 0, 0, 0x88)
        );
    }

    #[test]
    fn hex_colors_reject_malformed_input() {
        for value in ["fff", "#ff", "#gggggg", "#12345", "", "#ÿÿÿ"] {
            let error = Color::from_hex(value).expect_err("malformed color must fail");
            assert_eq!(
                error,
                RenderingError::InvalidColor {
                    value: value.to_owned()
                }
            );
        }
    }

    #[test]
    fn lighten_moves_channels_towards_white() {
        let color = Color::from_rgb_u8(0, 0, 0).lighten(0.5);
        assert!((color.red - 0.5).abs() < f32::EPSILON);
        assert!((color.alpha - 1.0).abs() < f32::EPSILON);
    }

    #[test]
    fn scaled_surface_multiplies_coordinates() {
        let mut recording = RecordingSurface::new();
        {
            let mut scaled = ScaledSurface::new(&mut recording, 2.0);
            scaled.clear_rect(Vec2::ZERO, Vec2::new(10.0, 5.0));
            scaled.fill_rect(Vec2::new(1.0, 2.0), Vec2::splat(3.0), Color::BLACK);
            scaled.fill_text("hi", Vec2::new(4.0, 4.0), 10.0, Color::WHITE);
        }

        assert_eq!(
            recording.commands(),
            &[
                DrawCommand::Clear {
                    origin: Vec2::ZERO,
                    size: Vec2::new(20.0, 10.0),
                },
                DrawCommand::FillRect {
                    origin: Vec2::new(2.0, 4.0),
                    size: Vec2::splat(6.0),
                    color: Color::BLACK,
                },
                DrawCommand::Text {
                    text: "hi".to_owned(),
                    position: Vec2::new(8.0, 8.0),
                    font_size: 20.0,
                    color: Color::WHITE,
                },
            ]
        );
    }

    #[test]
    fn scaled_surface_measures_text_in_logical_units() {
        let mut recording = RecordingSurface::new();
        let scaled = ScaledSurface::new(&mut recording, 3.0);
        assert!((scaled.measure_text("abcd", 10.0) - 20.0).abs() < 1e-4);
    }

    #[test]
    fn renderable_contains_uses_half_open_bounds() {
        let square = Square {
            origin: Vec2::new(10.0, 10.0),
            edge: 5.0,
        };

        assert!(square.contains(Vec2::new(10.0, 10.0)));
        assert!(square.contains(Vec2::new(14.9, 14.9)));
        assert!(!square.contains(Vec2::new(15.0, 12.0)));

        let mut recording = RecordingSurface::new();
        square.render(&mut recording);
        assert_eq!(recording.take_commands().len(), 1);
        assert!(recording.commands().is_empty());
    }

    #[test]
    fn presentation_converts_pixels_to_logical_space() {
        let presentation = Presentation::titled(Color::BLACK, Vec2::new(640.0, 480.0), 1.5);
        assert_eq!(presentation.window_title, WELCOME_BANNER);
        assert_eq!(presentation.window_size(), Vec2::new(960.0, 720.0));
        assert_eq!(
            presentation.to_logical(Vec2::new(150.0, 300.0)),
            Vec2::new(100.0, 200.0)
        );
    }
}
