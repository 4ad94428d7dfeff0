#![warn(clippy::all, rust_2018_idioms)]

pub mod app;
pub mod error;
pub mod export;
pub mod input;
pub mod renderer;
pub mod stroke;
pub mod style;
pub mod surface;
pub mod surface_texture;
pub mod util;

pub use app::SumiePadApp;
pub use error::{ExportError, RenderError, StyleError};
pub use export::ExportedImage;
pub use input::{InputEvent, InputHandler, InputLocation, route_event};
pub use renderer::StrokeRenderer;
pub use stroke::{Segment, StrokePoint, StrokeSession};
pub use style::{BrushType, PaperTexture, StyleConfiguration, width_for};
pub use surface::{Surface, SurfaceConfig};
pub use util::time::{Clock, ManualClock, SystemClock};
