use egui::{Context, Event, PointerButton, Pos2, Rect, TouchPhase, Vec2};

mod router;
pub use router::route_event;

use crate::stroke::StrokePoint;

/// Where an input event happened, already in surface-local logical
/// coordinates
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct InputLocation {
    pub position: Pos2,
    /// Stylus or touch force, if the device reports one
    pub pressure: Option<f32>,
}

impl InputLocation {
    pub fn to_stroke_point(self) -> StrokePoint {
        StrokePoint::from_optional(self.position, self.pressure)
    }
}

/// Pointer gestures the drawing surface cares about
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum InputEvent {
    /// Primary button pressed over the canvas
    PointerDown { location: InputLocation },
    /// Pointer moved, pressed or not
    PointerMove { location: InputLocation },
    /// Primary button released
    PointerUp { location: InputLocation },
    /// Pointer left the canvas or the window
    PointerLeave,
}

/// Converts raw egui input into [`InputEvent`]s for the canvas
#[derive(Debug, Clone)]
pub struct InputHandler {
    canvas_rect: Rect,
    logical_size: Vec2,
    last_pointer_pos: Option<Pos2>,
    touch_force: Option<f32>,
}

impl Default for InputHandler {
    fn default() -> Self {
        let logical_size = crate::surface::SurfaceConfig::default().logical_size();
        Self::new(Rect::from_min_size(Pos2::ZERO, logical_size), logical_size)
    }
}

impl InputHandler {
    pub fn new(canvas_rect: Rect, logical_size: Vec2) -> Self {
        Self {
            canvas_rect,
            logical_size,
            last_pointer_pos: None,
            touch_force: None,
        }
    }

    /// Update the canvas rectangle (e.g. if window is resized)
    pub fn set_canvas_rect(&mut self, rect: Rect) {
        self.canvas_rect = rect;
    }

    pub fn canvas_rect(&self) -> Rect {
        self.canvas_rect
    }

    /// Screen position to surface-local logical position
    pub fn to_surface(&self, screen_pos: Pos2) -> Pos2 {
        let offset = screen_pos - self.canvas_rect.min;
        let size = self.canvas_rect.size();
        let scale = Vec2::new(
            if size.x > 0.0 { self.logical_size.x / size.x } else { 1.0 },
            if size.y > 0.0 { self.logical_size.y / size.y } else { 1.0 },
        );
        Pos2::new(offset.x * scale.x, offset.y * scale.y)
    }

    fn make_location(&self, screen_pos: Pos2) -> InputLocation {
        InputLocation {
            position: self.to_surface(screen_pos),
            pressure: self.touch_force,
        }
    }

    /// Process this frame's egui input
    pub fn process_input(&mut self, ctx: &Context) -> Vec<InputEvent> {
        ctx.input(|input| self.process_events(&input.raw.events))
    }

    /// Translate raw events, in delivery order
    pub fn process_events(&mut self, raw: &[Event]) -> Vec<InputEvent> {
        let mut events = Vec::new();

        for event in raw {
            match event {
                Event::Touch { phase, force, .. } => {
                    // Zero force means the device cannot measure it
                    self.touch_force = match phase {
                        TouchPhase::Start | TouchPhase::Move => force.filter(|f| *f > 0.0),
                        TouchPhase::End | TouchPhase::Cancel => None,
                    };
                }
                Event::PointerButton {
                    pos,
                    button: PointerButton::Primary,
                    pressed,
                    ..
                } => {
                    let inside = self.canvas_rect.contains(*pos);
                    if *pressed && inside {
                        events.push(InputEvent::PointerDown {
                            location: self.make_location(*pos),
                        });
                    } else if !*pressed {
                        events.push(InputEvent::PointerUp {
                            location: self.make_location(*pos),
                        });
                    }
                    self.last_pointer_pos = Some(*pos);
                }
                Event::PointerMoved(pos) => {
                    let was_inside = self
                        .last_pointer_pos
                        .is_some_and(|last| self.canvas_rect.contains(last));
                    if self.canvas_rect.contains(*pos) {
                        events.push(InputEvent::PointerMove {
                            location: self.make_location(*pos),
                        });
                    } else if was_inside {
                        events.push(InputEvent::PointerLeave);
                    }
                    self.last_pointer_pos = Some(*pos);
                }
                Event::PointerGone => {
                    if self.last_pointer_pos.take().is_some() {
                        events.push(InputEvent::PointerLeave);
                    }
                    self.touch_force = None;
                }
                _ => {}
            }
        }

        events
    }
}
