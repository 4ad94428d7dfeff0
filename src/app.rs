use crate::export::ExportedImage;
use crate::input::{InputHandler, route_event};
use crate::renderer::StrokeRenderer;
use crate::style::StyleConfiguration;
use crate::surface::SurfaceConfig;
use crate::surface_texture::SurfaceTexture;

/// We derive Deserialize/Serialize so we can persist the ink settings on shutdown.
#[derive(serde::Deserialize, serde::Serialize, Debug, Default)]
#[serde(default)] // if we add new fields, give them default values when deserializing old state
pub struct SumiePadApp {
    style: StyleConfiguration,

    // The surface itself is never persisted
    #[serde(skip)]
    renderer: StrokeRenderer,
    #[serde(skip)]
    input: InputHandler,
    #[serde(skip)]
    texture: SurfaceTexture,
    #[serde(skip)]
    last_export: Option<String>,
}

impl SumiePadApp {
    /// Called once before the first frame.
    pub fn new(cc: &eframe::CreationContext<'_>) -> Self {
        let mut app: Self = cc
            .storage
            .and_then(|storage| eframe::get_value(storage, eframe::APP_KEY))
            .unwrap_or_default();

        let config = SurfaceConfig::default().with_pixel_ratio(cc.egui_ctx.pixels_per_point());
        app.renderer.set_config(config);
        app.renderer.init_surface(app.style.paper_texture);
        app
    }

    pub fn style(&self) -> &StyleConfiguration {
        &self.style
    }

    /// Replace the ink settings. A different paper starts a fresh surface.
    pub fn set_style(&mut self, style: StyleConfiguration) {
        let paper_changed = style.paper_texture != self.style.paper_texture;
        self.style = style;
        if paper_changed || !self.renderer.is_initialized() {
            self.renderer.init_surface(self.style.paper_texture);
        }
    }

    pub fn renderer(&self) -> &StrokeRenderer {
        &self.renderer
    }

    /// File name of the most recent successful export
    pub fn last_export(&self) -> Option<&str> {
        self.last_export.as_deref()
    }

    /// Snapshot the surface and hand it to the user
    pub fn export(&mut self) {
        let Some(exported) = self.renderer.export_raster() else {
            return;
        };
        match deliver(&exported) {
            Ok(()) => self.last_export = Some(exported.file_name().to_owned()),
            Err(err) => log::error!("Failed to deliver {}: {}", exported.file_name(), err),
        }
    }

    fn canvas(&mut self, ui: &mut egui::Ui) {
        let logical_size = self.renderer.config().logical_size();
        let (rect, _response) = ui.allocate_exact_size(logical_size, egui::Sense::drag());
        self.input.set_canvas_rect(rect);

        for event in self.input.process_input(ui.ctx()) {
            route_event(&mut self.renderer, &event, &self.style);
        }

        if let Some(surface) = self.renderer.surface() {
            let texture_id = self.texture.sync(ui.ctx(), surface);
            ui.painter().image(
                texture_id,
                rect,
                egui::Rect::from_min_max(egui::pos2(0.0, 0.0), egui::pos2(1.0, 1.0)),
                egui::Color32::WHITE,
            );
        }
    }
}

#[cfg(not(target_arch = "wasm32"))]
fn deliver(exported: &ExportedImage) -> Result<(), crate::error::ExportError> {
    let dir = std::env::current_dir()?;
    exported.save_to_dir(&dir).map(|_| ())
}

#[cfg(target_arch = "wasm32")]
fn deliver(exported: &ExportedImage) -> Result<(), crate::error::ExportError> {
    exported.trigger_download()
}

impl eframe::App for SumiePadApp {
    /// Called by the frame work to save state before shutdown.
    fn save(&mut self, storage: &mut dyn eframe::Storage) {
        eframe::set_value(storage, eframe::APP_KEY, self);
    }

    /// Called each time the UI needs repainting, which may be many times per second.
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        // Settings may have been swapped out from under us by storage
        let needs_surface = self
            .renderer
            .surface()
            .is_none_or(|surface| surface.paper() != self.style.paper_texture);
        if needs_surface {
            self.renderer.init_surface(self.style.paper_texture);
        }

        if ctx.input_mut(|i| i.consume_key(egui::Modifiers::COMMAND, egui::Key::S)) {
            self.export();
        }

        egui::CentralPanel::default().show(ctx, |ui| {
            egui::ScrollArea::both()
                .drag_to_scroll(false)
                .show(ui, |ui| self.canvas(ui));
        });
    }
}
