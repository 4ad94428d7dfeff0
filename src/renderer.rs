// src/renderer.rs
use crate::error::{RenderError, RenderResult};
use crate::export::ExportedImage;
use crate::stroke::{Segment, StrokePoint, StrokeSession};
use crate::style::{PaperTexture, StyleConfiguration};
use crate::surface::{Surface, SurfaceConfig};
use crate::util::time::{Clock, SystemClock};

/// Turns pointer gestures into ink on a raster surface.
///
/// The renderer owns the surface and the transient stroke session. Style is
/// not stored here; the host passes its current [`StyleConfiguration`] into
/// every draw call. Operations that hit a missing precondition are no-ops;
/// the `try_*` variants report them instead.
#[derive(Debug)]
pub struct StrokeRenderer<C: Clock = SystemClock> {
    config: SurfaceConfig,
    surface: Option<Surface>,
    session: Option<StrokeSession>,
    clock: C,
    grain_seed: Option<u64>,
    segments_drawn: usize,
}

impl Default for StrokeRenderer<SystemClock> {
    fn default() -> Self {
        Self::new(SurfaceConfig::default())
    }
}

impl StrokeRenderer<SystemClock> {
    pub fn new(config: SurfaceConfig) -> Self {
        Self::with_clock(config, SystemClock)
    }
}

impl<C: Clock> StrokeRenderer<C> {
    pub fn with_clock(config: SurfaceConfig, clock: C) -> Self {
        Self {
            config,
            surface: None,
            session: None,
            clock,
            grain_seed: None,
            segments_drawn: 0,
        }
    }

    /// Use a fixed grain layout for every washi surface
    pub fn with_grain_seed(mut self, seed: u64) -> Self {
        self.grain_seed = Some(seed);
        self
    }

    pub fn config(&self) -> SurfaceConfig {
        self.config
    }

    /// Takes effect on the next [`StrokeRenderer::init_surface`]
    pub fn set_config(&mut self, config: SurfaceConfig) {
        self.config = config;
    }

    pub fn surface(&self) -> Option<&Surface> {
        self.surface.as_ref()
    }

    pub fn session(&self) -> Option<&StrokeSession> {
        self.session.as_ref()
    }

    pub fn is_initialized(&self) -> bool {
        self.surface.is_some()
    }

    pub fn is_drawing(&self) -> bool {
        self.session.is_some()
    }

    /// Segments painted since the last surface init
    pub fn segments_drawn(&self) -> usize {
        self.segments_drawn
    }

    /// Allocates a fresh surface for `texture`, discarding every stroke and
    /// any stroke in progress.
    pub fn init_surface(&mut self, texture: PaperTexture) -> &Surface {
        let surface = match self.grain_seed {
            Some(seed) => Surface::with_seed(self.config, texture, seed),
            None => Surface::new(self.config, texture),
        };
        log::info!(
            "Initialized {} surface ({}x{} px)",
            texture.name(),
            surface.width(),
            surface.height()
        );

        self.session = None;
        self.segments_drawn = 0;
        self.surface.insert(surface)
    }

    pub fn try_begin_stroke(&mut self, point: StrokePoint) -> RenderResult<()> {
        if self.surface.is_none() {
            return Err(RenderError::NotInitialized);
        }
        self.session = Some(StrokeSession::begin(point, self.clock.now_millis()));
        log::debug!("Stroke started at ({:.1}, {:.1})", point.pos.x, point.pos.y);
        Ok(())
    }

    /// Starts a stroke at `point`. Ignored until a surface exists.
    pub fn begin_stroke(&mut self, point: StrokePoint) {
        if let Err(err) = self.try_begin_stroke(point) {
            log::warn!("Ignoring stroke start: {}", err);
        }
    }

    pub fn try_extend_stroke(
        &mut self,
        point: StrokePoint,
        style: &StyleConfiguration,
    ) -> RenderResult<Segment> {
        let session = self.session.as_mut().ok_or(RenderError::NoActiveSession)?;
        let surface = self.surface.as_mut().ok_or(RenderError::NotInitialized)?;

        let (prev, velocity) = session.advance(point, self.clock.now_millis());
        let segment = Segment {
            from: prev.pos,
            to: point.pos,
            width: style.line_width() * point.width_pressure(),
            color: style.stroke_color,
            opacity: style.opacity,
            velocity,
        };
        surface.paint_segment(
            segment.from,
            segment.to,
            segment.width,
            segment.color,
            segment.opacity,
        );
        self.segments_drawn += 1;

        Ok(segment)
    }

    /// Paints one straight segment from the last point to `point`.
    /// Returns `None` when no stroke is in progress.
    pub fn extend_stroke(
        &mut self,
        point: StrokePoint,
        style: &StyleConfiguration,
    ) -> Option<Segment> {
        match self.try_extend_stroke(point, style) {
            Ok(segment) => Some(segment),
            Err(err) => {
                log::debug!("Ignoring stroke sample: {}", err);
                None
            }
        }
    }

    /// Ends the current stroke, if any
    pub fn end_stroke(&mut self) {
        if self.session.take().is_some() {
            log::debug!("Stroke ended");
        }
    }

    pub fn try_export_raster(&self) -> RenderResult<ExportedImage> {
        let surface = self.surface.as_ref().ok_or(RenderError::NotInitialized)?;
        let timestamp = self.clock.now_millis() as u64;
        Ok(ExportedImage::from_surface(surface, timestamp)?)
    }

    /// PNG snapshot of the surface, or `None` before the first init
    pub fn export_raster(&self) -> Option<ExportedImage> {
        match self.try_export_raster() {
            Ok(exported) => Some(exported),
            Err(RenderError::NotInitialized) => {
                log::warn!("Nothing to export: surface is not initialized");
                None
            }
            Err(err) => {
                log::error!("Export failed: {}", err);
                None
            }
        }
    }
}
