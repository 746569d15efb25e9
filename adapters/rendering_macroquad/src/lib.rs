#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Macroquad-backed rendering adapter for Fear the Water.
//!
//! Macroquad's optional audio stack depends on native ALSA development
//! libraries, which are unavailable in the containerised CI environment, so the
//! crate depends on macroquad without its default `audio` feature.
//!
//! The frame closure draws in logical coordinates through a [`ScaledSurface`]
//! wrapped around a [`MacroquadSurface`]; pointer presses are converted back
//! into logical coordinates before they reach the closure.

use anyhow::Result;
use fear_the_water_rendering::{
    Color, FrameInput, Presentation, RenderingBackend, ScaledSurface, Surface,
};
use glam::Vec2;
use macroquad::input::{
    is_key_pressed, is_mouse_button_pressed, mouse_position, KeyCode, MouseButton,
};
use std::time::{Duration, Instant};

/// Latches pointer presses so each one is delivered to exactly one frame.
#[doc(hidden)]
#[derive(Clone, Copy, Debug, Default)]
pub struct PointerInputState {
    press_latched: Option<Vec2>,
}

impl PointerInputState {
    /// Returns the latched press, if any, and clears the latch.
    pub fn take_press(&mut self) -> Option<Vec2> {
        self.press_latched.take()
    }

    /// Latches a press in logical coordinates. A later press replaces an
    /// undelivered earlier one.
    pub fn register_press(&mut self, position: Vec2) {
        self.press_latched = Some(position);
    }
}

/// Surface that draws straight into the current macroquad frame.
#[derive(Clone, Copy, Debug)]
pub struct MacroquadSurface {
    clear_color: macroquad::color::Color,
}

impl MacroquadSurface {
    /// Creates a surface whose clears paint `clear_color`.
    #[must_use]
    pub fn new(clear_color: Color) -> Self {
        Self {
            clear_color: to_macroquad_color(clear_color),
        }
    }
}

impl Surface for MacroquadSurface {
    fn clear_rect(&mut self, origin: Vec2, size: Vec2) {
        macroquad::shapes::draw_rectangle(origin.x, origin.y, size.x, size.y, self.clear_color);
    }

    fn fill_rect(&mut self, origin: Vec2, size: Vec2, color: Color) {
        macroquad::shapes::draw_rectangle(
            origin.x,
            origin.y,
            size.x,
            size.y,
            to_macroquad_color(color),
        );
    }

    fn measure_text(&self, text: &str, font_size: f32) -> f32 {
        macroquad::text::measure_text(text, None, font_size.max(1.0) as u16, 1.0).width
    }

    fn fill_text(&mut self, text: &str, position: Vec2, font_size: f32, color: Color) {
        let _ = macroquad::text::draw_text(
            text,
            position.x,
            position.y,
            font_size,
            to_macroquad_color(color),
        );
    }
}

/// Rendering backend implemented on top of macroquad.
#[derive(Debug, Default)]
pub struct MacroquadBackend {
    vsync: Option<bool>,
    show_fps: bool,
}

impl MacroquadBackend {
    /// Backend that leaves vsync at the platform default and stays quiet.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Waits for the display refresh when `enabled`, otherwise presents
    /// frames as soon as they are drawn.
    #[must_use]
    pub fn with_vsync(self, enabled: bool) -> Self {
        Self {
            vsync: Some(enabled),
            ..self
        }
    }

    /// Logs frame rate and frame cost once per second when `show` is set.
    #[must_use]
    pub fn with_show_fps(self, show: bool) -> Self {
        Self {
            show_fps: show,
            ..self
        }
    }
}

/// One second's worth of frame timing.
#[derive(Clone, Copy, Debug, PartialEq)]
struct FrameReport {
    frames_per_second: f32,
    mean_frame_cost: Duration,
}

/// Folds frame deltas into a report per elapsed second.
#[derive(Debug, Default)]
struct FpsCounter {
    window: Duration,
    frames: u32,
    cost: Duration,
}

impl FpsCounter {
    const WINDOW: Duration = Duration::from_secs(1);

    fn record_frame(&mut self, delta: Duration, cost: Duration) -> Option<FrameReport> {
        self.window += delta;
        self.frames = self.frames.saturating_add(1);
        self.cost += cost;
        if self.window < Self::WINDOW {
            return None;
        }

        let Self {
            window,
            frames,
            cost,
        } = std::mem::take(self);
        Some(FrameReport {
            frames_per_second: frames as f32 / window.as_secs_f32(),
            mean_frame_cost: cost / frames,
        })
    }
}

impl RenderingBackend for MacroquadBackend {
    fn run<F>(self, presentation: Presentation, mut frame: F) -> Result<()>
    where
        F: FnMut(Duration, FrameInput, &mut dyn Surface) + 'static,
    {
        let Self { vsync, show_fps } = self;

        let window_size = presentation.window_size();
        let mut config = macroquad::window::Conf {
            window_title: presentation.window_title.clone(),
            window_width: window_size.x.round() as i32,
            window_height: window_size.y.round() as i32,
            window_resizable: false,
            ..macroquad::window::Conf::default()
        };
        if let Some(vsync) = vsync {
            config.platform.swap_interval = Some(i32::from(vsync));
        }

        tracing::info!(
            title = %presentation.window_title,
            width = config.window_width,
            height = config.window_height,
            "opening window"
        );

        macroquad::Window::from_config(config, async move {
            let background = to_macroquad_color(presentation.clear_color);
            let mut surface = MacroquadSurface::new(presentation.clear_color);
            let mut pointer = PointerInputState::default();
            let mut fps_counter = FpsCounter::default();

            loop {
                if is_key_pressed(KeyCode::Escape) {
                    break;
                }

                if is_mouse_button_pressed(MouseButton::Left) {
                    let (x, y) = mouse_position();
                    pointer.register_press(presentation.to_logical(Vec2::new(x, y)));
                }

                macroquad::window::clear_background(background);

                let dt_seconds = macroquad::time::get_frame_time();
                let frame_dt = Duration::from_secs_f32(dt_seconds.max(0.0));
                let input = FrameInput {
                    pointer_press: pointer.take_press(),
                };

                let work_start = Instant::now();
                {
                    let mut scaled = ScaledSurface::new(&mut surface, presentation.scale);
                    frame(frame_dt, input, &mut scaled);
                }
                let work = work_start.elapsed();

                if let Some(report) = fps_counter.record_frame(frame_dt, work) {
                    if show_fps {
                        tracing::info!(
                            fps = report.frames_per_second,
                            frame_ms = report.mean_frame_cost.as_secs_f64() * 1_000.0,
                            "frame timing"
                        );
                    }
                }

                macroquad::window::next_frame().await;
            }

            tracing::info!("window closed");
        });

        Ok(())
    }
}

fn to_macroquad_color(color: Color) -> macroquad::color::Color {
    macroquad::color::Color::new(color.red, color.green, color.blue, color.alpha)
}
