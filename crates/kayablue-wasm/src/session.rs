//! Edit session WASM bindings.
//!
//! The session owns the working image inside WASM memory. JavaScript only
//! receives pixel copies for drawing previews and the encoded bytes on export.
//!
//! # Example (TypeScript)
//!
//! ```typescript
//! const session = new EditSession({ devicePixelRatio: window.devicePixelRatio });
//! session.load(bytes);
//!
//! session.select_tool('rotate');
//! draw(session.preview_rotate(90));
//! session.commit();
//!
//! const out = session.export();
//! link.download = session.export_file_name(Date.now());
//! ```

use kayablue_core::{
    session, CropRegion, EditorConfig, EncodeSpec, OutputFormat, Tool, ToolParams, ViewSize,
};
use wasm_bindgen::prelude::*;

use crate::filters::FilterParameters;
use crate::to_js_error;
use crate::types::JsPixelBuffer;

fn parse_tool(name: &str) -> Result<Tool, JsValue> {
    Tool::from_name(name).ok_or_else(|| to_js_error(format!("Unknown tool: {name}")))
}

/// Preview/commit edit session for JavaScript
#[wasm_bindgen]
pub struct EditSession {
    inner: session::EditSession,
}

#[wasm_bindgen]
impl EditSession {
    /// Create a session. `config` may be `undefined` or a partial
    /// `EditorConfig` object (camelCase keys).
    #[wasm_bindgen(constructor)]
    pub fn new(config: JsValue) -> Result<EditSession, JsValue> {
        let config: EditorConfig = if config.is_undefined() || config.is_null() {
            EditorConfig::default()
        } else {
            serde_wasm_bindgen::from_value(config).map_err(to_js_error)?
        };
        Ok(Self::with_config(config))
    }

    /// Decode uploaded file bytes and make them the working image.
    pub fn load(&mut self, bytes: &[u8]) -> Result<(), JsValue> {
        self.inner.load(bytes).map_err(to_js_error)
    }

    /// Use already decoded pixels as the working image.
    pub fn load_image(&mut self, image: &JsPixelBuffer) {
        self.inner.load_buffer(image.inner().clone());
    }

    /// Drop the image and all tool state.
    pub fn reset(&mut self) {
        self.inner.reset();
    }

    /// Activate a tool by name: rotate, crop, resize, filters, compress, format.
    pub fn select_tool(&mut self, tool: &str) -> Result<(), JsValue> {
        self.inner.select_tool(parse_tool(tool)?);
        Ok(())
    }

    /// Name of the active tool, if any.
    #[wasm_bindgen(getter)]
    pub fn active_tool(&self) -> Option<String> {
        self.inner.active_tool().map(|tool| tool.name().to_string())
    }

    /// Identity parameters for a tool, as a plain object with a `tool` key.
    pub fn identity_params(&self, tool: &str) -> Result<JsValue, JsValue> {
        let params = self
            .inner
            .identity_params(parse_tool(tool)?)
            .map_err(to_js_error)?;
        serde_wasm_bindgen::to_value(&params).map_err(to_js_error)
    }

    /// Preview from a parameter object such as `{ tool: 'resize', width, height }`.
    pub fn preview(&mut self, params: JsValue) -> Result<JsPixelBuffer, JsValue> {
        let params: ToolParams = serde_wasm_bindgen::from_value(params).map_err(to_js_error)?;
        self.preview_params(params)
    }

    pub fn preview_rotate(&mut self, angle_degrees: f64) -> Result<JsPixelBuffer, JsValue> {
        self.preview_params(ToolParams::Rotate {
            angle: angle_degrees,
        })
    }

    #[allow(clippy::too_many_arguments)]
    pub fn preview_crop(
        &mut self,
        x: f64,
        y: f64,
        width: f64,
        height: f64,
        view_width: f64,
        view_height: f64,
    ) -> Result<JsPixelBuffer, JsValue> {
        self.preview_params(ToolParams::Crop {
            region: CropRegion::new(x, y, width, height),
            view: ViewSize::new(view_width, view_height),
        })
    }

    pub fn preview_resize(&mut self, width: u32, height: u32) -> Result<JsPixelBuffer, JsValue> {
        self.preview_params(ToolParams::Resize { width, height })
    }

    pub fn preview_filters(
        &mut self,
        params: &FilterParameters,
    ) -> Result<JsPixelBuffer, JsValue> {
        self.preview_params(ToolParams::Filters(*params.inner()))
    }

    /// Preview re-encoding at `quality` in the current output format, or
    /// WebP when that format is lossless.
    pub fn preview_compress(&mut self, quality: f32) -> Result<JsPixelBuffer, JsValue> {
        let format = self.inner.output_spec().format;
        self.preview_params(ToolParams::Compress(EncodeSpec::new(format, quality)))
    }

    /// Preview conversion to `format` at `quality`.
    pub fn preview_format(&mut self, format: &str, quality: f32) -> Result<JsPixelBuffer, JsValue> {
        let format: OutputFormat = format.parse().map_err(to_js_error)?;
        self.preview_params(ToolParams::Format(EncodeSpec::new(format, quality)))
    }

    /// Encoded size of the current compress/format preview.
    #[wasm_bindgen(getter)]
    pub fn preview_encoded_bytes(&self) -> Option<usize> {
        self.inner
            .preview_state()
            .and_then(|preview| preview.encoded_bytes)
    }

    /// Replace the working image with the preview.
    pub fn commit(&mut self) -> Result<(), JsValue> {
        self.inner.commit().map_err(to_js_error)
    }

    /// Drop the preview; the tool stays selected.
    pub fn discard_preview(&mut self) {
        self.inner.discard_preview();
    }

    /// Apply a parameter object directly, without a preview.
    pub fn apply(&mut self, params: JsValue) -> Result<(), JsValue> {
        let params: ToolParams = serde_wasm_bindgen::from_value(params).map_err(to_js_error)?;
        self.inner.apply(params).map_err(to_js_error)
    }

    /// Copy of the working image.
    pub fn image(&self) -> Option<JsPixelBuffer> {
        self.inner.image().cloned().map(JsPixelBuffer::from_core)
    }

    /// Copy of what should be on screen: the preview, else the working image.
    pub fn displayed(&self) -> Option<JsPixelBuffer> {
        self.inner.displayed().cloned().map(JsPixelBuffer::from_core)
    }

    #[wasm_bindgen(getter)]
    pub fn has_image(&self) -> bool {
        self.inner.image().is_some()
    }

    #[wasm_bindgen(getter)]
    pub fn generation(&self) -> f64 {
        self.inner.generation() as f64
    }

    #[wasm_bindgen(getter)]
    pub fn is_busy(&self) -> bool {
        self.inner.is_busy()
    }

    /// Encode the working image with the session's output format.
    pub fn export(&self) -> Result<Vec<u8>, JsValue> {
        self.inner
            .export()
            .map(|encoded| encoded.into_bytes())
            .map_err(to_js_error)
    }

    /// MIME type of [`export`](Self::export) output.
    #[wasm_bindgen(getter)]
    pub fn export_mime_type(&self) -> String {
        self.inner.output_spec().format.mime_type().to_string()
    }

    /// Download name for an export made at `timestamp_ms` (e.g. `Date.now()`).
    pub fn export_file_name(&self, timestamp_ms: f64) -> String {
        self.inner.export_file_name(timestamp_ms.max(0.0) as u64)
    }

    /// Download name stamped with the current time.
    pub fn suggested_file_name(&self) -> String {
        self.export_file_name(js_sys::Date::now())
    }

    /// Before/after summary against the uploaded file, e.g.
    /// `"2.0 MB -> 512.0 KB (75.0% smaller)"`.
    pub fn compression_summary(&self, encoded_bytes: usize) -> Option<String> {
        self.inner
            .compression_report(encoded_bytes)
            .map(|report| report.summary())
    }
}

impl EditSession {
    pub(crate) fn with_config(config: EditorConfig) -> Self {
        Self {
            inner: session::EditSession::with_config(config),
        }
    }

    fn preview_params(&mut self, params: ToolParams) -> Result<JsPixelBuffer, JsValue> {
        self.inner
            .preview(params)
            .map(|preview| JsPixelBuffer::from_core(preview.image.clone()))
            .map_err(to_js_error)
    }
}


#[cfg(all(test, target_arch = "wasm32"))]
mod wasm_tests {
    use super::*;
    use kayablue_core::PixelBuffer;
    use wasm_bindgen_test::*;

    wasm_bindgen_test_configure!(run_in_browser);

    fn loaded() -> EditSession {
        let mut session = EditSession::new(JsValue::UNDEFINED).unwrap();
        let img = PixelBuffer::filled(20, 10, [1, 2, 3, 255]).unwrap();
        session.load_image(&JsPixelBuffer::from_core(img));
        session
    }

    #[wasm_bindgen_test]
    fn test_config_object() {
        let config = js_sys::Object::new();
        js_sys::Reflect::set(&config, &"fileNamePrefix".into(), &"shot".into()).unwrap();

        let session = EditSession::new(config.into()).unwrap();
        assert_eq!(session.export_file_name(1.0), "shot-1.png");
    }

    #[wasm_bindgen_test]
    fn test_preview_from_object() {
        let mut session = loaded();
        let params = serde_wasm_bindgen::to_value(&ToolParams::Resize {
            width: 5,
            height: 5,
        })
        .unwrap();

        let preview = session.preview(params).unwrap();
        assert_eq!(preview.width(), 5);
    }

    #[wasm_bindgen_test]
    fn test_identity_params_round_trip() {
        let mut session = loaded();
        let params = session.identity_params("crop").unwrap();
        let preview = session.preview(params).unwrap();
        assert_eq!((preview.width(), preview.height()), (20, 10));
    }

    #[wasm_bindgen_test]
    fn test_commit_without_preview_is_error() {
        let mut session = loaded();
        let err = session.commit().err().and_then(|e| e.as_string());
        assert_eq!(err.as_deref(), Some("No preview to commit"));
    }

    #[wasm_bindgen_test]
    fn test_unknown_tool_is_error() {
        let mut session = loaded();
        assert!(session.select_tool("sharpen").is_err());
    }

    #[wasm_bindgen_test]
    fn test_suggested_file_name() {
        let session = loaded();
        assert!(session.suggested_file_name().starts_with("kayablue-image-"));
    }
}
