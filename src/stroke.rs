use egui::{Color32, Pos2};

/// Pressure assumed when the input device reports none
pub const DEFAULT_PRESSURE: f32 = 0.5;

/// One pointer sample in surface-local logical coordinates
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StrokePoint {
    pub pos: Pos2,
    pub pressure: f32,
}

impl StrokePoint {
    pub fn new(pos: Pos2, pressure: f32) -> Self {
        Self { pos, pressure }
    }

    /// Sample from a device that may not report pressure
    pub fn from_optional(pos: Pos2, pressure: Option<f32>) -> Self {
        Self::new(pos, pressure.unwrap_or(DEFAULT_PRESSURE))
    }

    pub fn at(x: f32, y: f32) -> Self {
        Self::new(Pos2::new(x, y), DEFAULT_PRESSURE)
    }

    /// Pressure used to scale the width. A reported zero counts as full
    /// pressure, otherwise a stylus hovering at zero force would draw nothing.
    pub fn width_pressure(&self) -> f32 {
        if self.pressure == 0.0 { 1.0 } else { self.pressure }
    }
}

pub fn midpoint(a: Pos2, b: Pos2) -> Pos2 {
    a.lerp(b, 0.5)
}

/// Units per millisecond. A zero interval is treated as 1 ms.
pub fn velocity(distance: f32, elapsed_ms: f64) -> f32 {
    let elapsed = if elapsed_ms == 0.0 { 1.0 } else { elapsed_ms };
    (distance as f64 / elapsed) as f32
}

/// Transient state between pointer-down and pointer-up
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StrokeSession {
    last_point: StrokePoint,
    last_midpoint: Pos2,
    last_sample_time: f64,
    velocity: f32,
}

impl StrokeSession {
    pub fn begin(point: StrokePoint, now_ms: f64) -> Self {
        Self {
            last_point: point,
            last_midpoint: point.pos,
            last_sample_time: now_ms,
            velocity: 0.0,
        }
    }

    pub fn last_point(&self) -> StrokePoint {
        self.last_point
    }

    /// Midpoint of the last segment. Not used for smoothing.
    pub fn last_midpoint(&self) -> Pos2 {
        self.last_midpoint
    }

    pub fn last_sample_time(&self) -> f64 {
        self.last_sample_time
    }

    /// Velocity of the most recent sample, in units per millisecond
    pub fn velocity(&self) -> f32 {
        self.velocity
    }

    /// Moves the session on to `point` and returns the previous point and
    /// the velocity between the two.
    pub fn advance(&mut self, point: StrokePoint, now_ms: f64) -> (StrokePoint, f32) {
        let prev = self.last_point;
        let distance = prev.pos.distance(point.pos);
        let velocity = velocity(distance, now_ms - self.last_sample_time);

        self.velocity = velocity;
        self.last_point = point;
        self.last_midpoint = midpoint(prev.pos, point.pos);
        self.last_sample_time = now_ms;

        (prev, velocity)
    }
}

/// A straight segment that was painted onto the surface
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Segment {
    pub from: Pos2,
    pub to: Pos2,
    /// Logical width, already scaled by pressure
    pub width: f32,
    pub color: Color32,
    pub opacity: f32,
    pub velocity: f32,
}
