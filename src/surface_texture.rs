use egui::{Context, TextureHandle, TextureId, TextureOptions};
use uuid::Uuid;

use crate::surface::Surface;

/// GPU copy of the drawing surface, re-uploaded only when the pixels change
#[derive(Default)]
pub struct SurfaceTexture {
    handle: Option<TextureHandle>,
    /// Surface id and version of the last upload
    uploaded: Option<(Uuid, u64)>,
    uploads: u64,
}

// TextureHandle doesn't implement Debug
impl std::fmt::Debug for SurfaceTexture {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SurfaceTexture")
            .field("uploaded", &self.uploaded)
            .field("uploads", &self.uploads)
            .finish()
    }
}

impl SurfaceTexture {
    pub fn new() -> Self {
        Self::default()
    }

    /// Makes sure the texture shows `surface` and returns its id
    pub fn sync(&mut self, ctx: &Context, surface: &Surface) -> TextureId {
        let key = (surface.id(), surface.version());
        if let Some(handle) = &self.handle {
            if self.uploaded == Some(key) {
                return handle.id();
            }
        }

        let image = surface.to_color_image();
        let id = if let Some(handle) = self.handle.as_mut() {
            handle.set(image, TextureOptions::LINEAR);
            handle.id()
        } else {
            let handle = ctx.load_texture("sumie_surface", image, TextureOptions::LINEAR);
            let id = handle.id();
            self.handle = Some(handle);
            id
        };

        self.uploaded = Some(key);
        self.uploads += 1;
        log::trace!("Uploaded surface {} v{}", key.0, key.1);
        id
    }

    /// Number of uploads so far
    pub fn uploads(&self) -> u64 {
        self.uploads
    }

    /// Drops the GPU texture
    pub fn clear(&mut self) {
        self.handle = None;
        self.uploaded = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::style::PaperTexture;
    use crate::surface::SurfaceConfig;
    use egui::{Color32, Pos2};

    fn small_surface() -> Surface {
        let config = SurfaceConfig {
            logical_width: 10,
            logical_height: 10,
            device_pixel_ratio: 1.0,
        };
        Surface::new(config, PaperTexture::White)
    }

    #[test]
    fn test_cache_hit() {
        let ctx = Context::default();
        let surface = small_surface();
        let mut texture = SurfaceTexture::new();

        let first = texture.sync(&ctx, &surface);
        let second = texture.sync(&ctx, &surface);

        assert_eq!(first, second);
        assert_eq!(texture.uploads(), 1);
    }

    #[test]
    fn test_reupload_on_paint() {
        let ctx = Context::default();
        let mut surface = small_surface();
        let mut texture = SurfaceTexture::new();

        let first = texture.sync(&ctx, &surface);
        surface.paint_segment(Pos2::new(1.0, 1.0), Pos2::new(8.0, 8.0), 2.0, Color32::BLACK, 1.0);
        let second = texture.sync(&ctx, &surface);

        // Same texture slot, new pixels
        assert_eq!(first, second);
        assert_eq!(texture.uploads(), 2);
    }

    #[test]
    fn test_new_surface_reuploads() {
        let ctx = Context::default();
        let mut texture = SurfaceTexture::new();

        texture.sync(&ctx, &small_surface());
        texture.sync(&ctx, &small_surface());
        assert_eq!(texture.uploads(), 2);

        texture.clear();
        texture.sync(&ctx, &small_surface());
        assert_eq!(texture.uploads(), 3);
    }
}
