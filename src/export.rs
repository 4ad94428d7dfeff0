use std::io::Cursor;

use image::ImageFormat;

use crate::error::ExportError;
use crate::surface::Surface;

pub const FILE_PREFIX: &str = "AltmanPad_Sumie_";
pub const PNG_MIME: &str = "image/png";

/// `AltmanPad_Sumie_<unix millis>.png`
pub fn file_name_for(timestamp_millis: u64) -> String {
    format!("{FILE_PREFIX}{timestamp_millis}.png")
}

/// A PNG snapshot of the surface, ready to be handed to the user
#[derive(Clone, PartialEq, Eq)]
pub struct ExportedImage {
    file_name: String,
    bytes: Vec<u8>,
}

impl std::fmt::Debug for ExportedImage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ExportedImage")
            .field("file_name", &self.file_name)
            .field("bytes", &format!("<{} bytes>", self.bytes.len()))
            .finish()
    }
}

impl ExportedImage {
    pub fn from_surface(surface: &Surface, timestamp_millis: u64) -> Result<Self, image::ImageError> {
        let mut bytes = Vec::new();
        surface
            .image()
            .write_to(&mut Cursor::new(&mut bytes), ImageFormat::Png)?;

        log::debug!(
            "Encoded {}x{} surface to {} PNG bytes",
            surface.width(),
            surface.height(),
            bytes.len()
        );
        Ok(Self {
            file_name: file_name_for(timestamp_millis),
            bytes,
        })
    }

    pub fn file_name(&self) -> &str {
        &self.file_name
    }

    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }

    /// Decode the PNG again, mostly useful for checking an export
    pub fn decode(&self) -> Result<image::RgbaImage, image::ImageError> {
        Ok(image::load_from_memory_with_format(&self.bytes, ImageFormat::Png)?.to_rgba8())
    }

    /// Writes the file into `dir` and returns its full path
    #[cfg(not(target_arch = "wasm32"))]
    pub fn save_to_dir(&self, dir: &std::path::Path) -> Result<std::path::PathBuf, ExportError> {
        let path = dir.join(&self.file_name);
        std::fs::write(&path, &self.bytes)?;
        log::info!("Saved {} ({} bytes)", path.display(), self.bytes.len());
        Ok(path)
    }

    /// Hands the file to the browser as a download
    #[cfg(target_arch = "wasm32")]
    pub fn trigger_download(&self) -> Result<(), ExportError> {
        use wasm_bindgen::JsCast as _;

        let js_err = |err: wasm_bindgen::JsValue| ExportError::Download(format!("{err:?}"));

        let document = web_sys::window()
            .and_then(|window| window.document())
            .ok_or_else(|| ExportError::Download("no document".to_owned()))?;

        let parts = js_sys::Array::of1(&js_sys::Uint8Array::from(self.bytes.as_slice()));
        let options = web_sys::BlobPropertyBag::new();
        options.set_type(PNG_MIME);
        let blob = web_sys::Blob::new_with_u8_array_sequence_and_options(&parts, &options)
            .map_err(js_err)?;
        let url = web_sys::Url::create_object_url_with_blob(&blob).map_err(js_err)?;

        let anchor = document
            .create_element("a")
            .map_err(js_err)?
            .dyn_into::<web_sys::HtmlAnchorElement>()
            .map_err(|_| ExportError::Download("<a> is not an anchor element".to_owned()))?;
        anchor.set_href(&url);
        anchor.set_download(&self.file_name);
        anchor.click();

        web_sys::Url::revoke_object_url(&url).map_err(js_err)?;
        log::info!("Downloaded {} ({} bytes)", self.file_name, self.bytes.len());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::style::PaperTexture;
    use crate::surface::SurfaceConfig;

    #[test]
    fn test_file_name() {
        assert_eq!(file_name_for(42), "AltmanPad_Sumie_42.png");
    }

    #[test]
    fn test_png_signature() {
        let config = SurfaceConfig {
            logical_width: 8,
            logical_height: 4,
            device_pixel_ratio: 1.0,
        };
        let surface = Surface::new(config, PaperTexture::White);
        let exported = ExportedImage::from_surface(&surface, 1).unwrap();
        assert_eq!(&exported.bytes()[..8], b"\x89PNG\r\n\x1a\n");

        let decoded = exported.decode().unwrap();
        assert_eq!(decoded.dimensions(), (8, 4));
        assert_eq!(&decoded, surface.image());
    }

    #[cfg(not(target_arch = "wasm32"))]
    #[test]
    fn test_save_to_dir() {
        let dir = std::env::temp_dir().join(format!("sumie_pad_export_{}", uuid::Uuid::new_v4()));
        std::fs::create_dir_all(&dir).unwrap();

        let surface = Surface::new(SurfaceConfig::default(), PaperTexture::Gassen);
        let exported = ExportedImage::from_surface(&surface, 7).unwrap();
        let path = exported.save_to_dir(&dir).unwrap();

        assert_eq!(path.file_name().unwrap(), "AltmanPad_Sumie_7.png");
        assert_eq!(std::fs::read(&path).unwrap(), exported.bytes());
        std::fs::remove_dir_all(&dir).unwrap();
    }
}
