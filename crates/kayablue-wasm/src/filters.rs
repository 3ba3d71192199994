//! Filter parameters WASM bindings.
//!
//! This module provides JavaScript bindings for the FilterParameters type,
//! so the filter sliders can be driven from TypeScript.

use wasm_bindgen::prelude::*;

use crate::to_js_error;
use crate::types::JsPixelBuffer;

/// Filter parameters wrapper for JavaScript
#[wasm_bindgen]
pub struct FilterParameters {
    inner: kayablue_core::FilterParameters,
}

#[wasm_bindgen]
impl FilterParameters {
    /// Create new filter parameters at their identity values
    #[wasm_bindgen(constructor)]
    pub fn new() -> Self {
        Self {
            inner: kayablue_core::FilterParameters::new(),
        }
    }

    /// Get brightness percent
    #[wasm_bindgen(getter)]
    pub fn brightness(&self) -> f64 {
        self.inner.brightness
    }

    /// Set brightness percent (0 to 200)
    #[wasm_bindgen(setter)]
    pub fn set_brightness(&mut self, value: f64) {
        self.inner.brightness = value;
    }

    /// Get contrast percent
    #[wasm_bindgen(getter)]
    pub fn contrast(&self) -> f64 {
        self.inner.contrast
    }

    /// Set contrast percent (0 to 200)
    #[wasm_bindgen(setter)]
    pub fn set_contrast(&mut self, value: f64) {
        self.inner.contrast = value;
    }

    /// Get saturation percent
    #[wasm_bindgen(getter)]
    pub fn saturation(&self) -> f64 {
        self.inner.saturation
    }

    /// Set saturation percent (0 to 200)
    #[wasm_bindgen(setter)]
    pub fn set_saturation(&mut self, value: f64) {
        self.inner.saturation = value;
    }

    /// Get grayscale percent
    #[wasm_bindgen(getter)]
    pub fn grayscale(&self) -> f64 {
        self.inner.grayscale
    }

    /// Set grayscale percent (0 to 100)
    #[wasm_bindgen(setter)]
    pub fn set_grayscale(&mut self, value: f64) {
        self.inner.grayscale = value;
    }

    /// Get sepia percent
    #[wasm_bindgen(getter)]
    pub fn sepia(&self) -> f64 {
        self.inner.sepia
    }

    /// Set sepia percent (0 to 100)
    #[wasm_bindgen(setter)]
    pub fn set_sepia(&mut self, value: f64) {
        self.inner.sepia = value;
    }

    /// Get blur radius in pixels
    #[wasm_bindgen(getter)]
    pub fn blur(&self) -> f64 {
        self.inner.blur
    }

    /// Set blur radius in pixels
    #[wasm_bindgen(setter)]
    pub fn set_blur(&mut self, value: f64) {
        self.inner.blur = value;
    }

    /// Check if every filter is at its identity value
    pub fn is_identity(&self) -> bool {
        self.inner.is_identity()
    }

    /// Serialize to a plain object for storage
    pub fn to_json(&self) -> Result<JsValue, JsValue> {
        serde_wasm_bindgen::to_value(&self.inner).map_err(to_js_error)
    }

    /// Deserialize from a plain object; missing fields take identity values
    pub fn from_json(value: JsValue) -> Result<FilterParameters, JsValue> {
        let inner: kayablue_core::FilterParameters =
            serde_wasm_bindgen::from_value(value).map_err(to_js_error)?;
        Ok(Self { inner })
    }
}

impl Default for FilterParameters {
    fn default() -> Self {
        Self::new()
    }
}

impl FilterParameters {
    pub(crate) fn inner(&self) -> &kayablue_core::FilterParameters {
        &self.inner
    }
}

/// Apply color filters and blur, returning a new image.
///
/// # Example (TypeScript)
/// ```typescript
/// const params = new FilterParameters();
/// params.sepia = 60;
/// params.blur = 2;
///
/// const filtered = apply_filters(sourceImage, params);
/// ```
#[wasm_bindgen]
pub fn apply_filters(image: &JsPixelBuffer, params: &FilterParameters) -> JsPixelBuffer {
    JsPixelBuffer::from_core(kayablue_core::apply_filters(image.inner(), params.inner()))
}


#[cfg(all(test, target_arch = "wasm32"))]
mod wasm_tests {
    use super::*;
    use wasm_bindgen_test::*;

    wasm_bindgen_test_configure!(run_in_browser);

    #[wasm_bindgen_test]
    fn test_json_round_trip() {
        let mut params = FilterParameters::new();
        params.set_sepia(35.0);

        let json = params.to_json().unwrap();
        let back = FilterParameters::from_json(json).unwrap();
        assert_eq!(back.sepia(), 35.0);
        assert_eq!(back.brightness(), 100.0);
    }

    #[wasm_bindgen_test]
    fn test_from_partial_object() {
        let obj = js_sys::Object::new();
        js_sys::Reflect::set(&obj, &"blur".into(), &JsValue::from_f64(3.0)).unwrap();

        let params = FilterParameters::from_json(obj.into()).unwrap();
        assert_eq!(params.blur(), 3.0);
        assert_eq!(params.contrast(), 100.0);
    }

    #[wasm_bindgen_test]
    fn test_from_invalid_value() {
        assert!(FilterParameters::from_json(JsValue::from_str("nope")).is_err());
    }
}
