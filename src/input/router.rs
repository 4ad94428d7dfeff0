use super::InputEvent;
use crate::renderer::StrokeRenderer;
use crate::stroke::Segment;
use crate::style::StyleConfiguration;
use crate::util::time::Clock;

/// Dispatch one input event to the renderer.
///
/// Down begins a stroke, move extends it while one is active, and up or
/// leave ends it. Returns the segment painted, if any.
pub fn route_event<C: Clock>(
    renderer: &mut StrokeRenderer<C>,
    event: &InputEvent,
    style: &StyleConfiguration,
) -> Option<Segment> {
    match event {
        InputEvent::PointerDown { location } => {
            renderer.begin_stroke(location.to_stroke_point());
            None
        }
        InputEvent::PointerMove { location } => {
            // Hovering without a stroke is not worth a log line
            if renderer.is_drawing() {
                renderer.extend_stroke(location.to_stroke_point(), style)
            } else {
                None
            }
        }
        InputEvent::PointerUp { .. } | InputEvent::PointerLeave => {
            renderer.end_stroke();
            None
        }
    }
}
