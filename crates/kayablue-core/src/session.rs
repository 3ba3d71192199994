//! The edit session: one authoritative buffer plus the active tool's preview.
//!
//! Each tool moves through `Idle -> Previewing -> Committed`. Previews are
//! computed from the current buffer and never modify it; only [`commit`]
//! (or a finished apply) replaces the buffer, after which no tool is active.
//!
//! Heavy operations can run off the UI thread with a three-step protocol:
//!
//! ```text
//! let pending = session.begin_apply(params)?;   // snapshot, mark in-flight
//! let finished = pending.run()?;                // pure, Send, any thread
//! session.finish_apply(finished)?;              // install unless stale
//! ```
//!
//! Every commit, load and reset bumps the session generation. A finished
//! operation whose generation no longer matches is discarded as stale.
//!
//! [`commit`]: EditSession::commit

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, warn};

use crate::buffer::PixelBuffer;
use crate::config::EditorConfig;
use crate::decode::{decode_image_with_limit, DecodeError};
use crate::encode::{download_file_name, encode, CompressionReport, EncodeError, EncodeSpec, Encoded};
use crate::filters::apply_filters;
use crate::transform::{
    crop, resize, rotate, CropRegion, InterpolationFilter, TransformError, ViewSize,
};
use crate::FilterParameters;

/// Counter used to recognize results computed from an outdated buffer.
pub type Generation = u64;

/// Errors raised by session operations.
#[derive(Debug, Error)]
pub enum SessionError {
    /// No image has been loaded
    #[error("No image loaded")]
    NoImage,

    /// Commit requested without a preview
    #[error("No preview to commit")]
    NoPreview,

    /// Another apply is still outstanding
    #[error("Another operation is still running")]
    Busy,

    /// The buffer changed while the operation was running
    #[error("Result discarded: the image changed while the operation was running")]
    Stale,

    /// Rotation angle is NaN or infinite
    #[error("Invalid rotation angle: {0}")]
    InvalidAngle(f64),

    #[error(transparent)]
    Decode(#[from] DecodeError),

    #[error(transparent)]
    Transform(#[from] TransformError),

    #[error(transparent)]
    Encode(#[from] EncodeError),
}

/// Editing tools.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Tool {
    Rotate,
    Crop,
    Resize,
    Filters,
    Compress,
    Format,
}

impl Tool {
    pub const ALL: [Tool; 6] = [
        Tool::Rotate,
        Tool::Crop,
        Tool::Resize,
        Tool::Filters,
        Tool::Compress,
        Tool::Format,
    ];

    /// Lowercase name, as used in serialized parameters.
    pub fn name(self) -> &'static str {
        match self {
            Tool::Rotate => "rotate",
            Tool::Crop => "crop",
            Tool::Resize => "resize",
            Tool::Filters => "filters",
            Tool::Compress => "compress",
            Tool::Format => "format",
        }
    }

    /// Look a tool up by name, ignoring case.
    pub fn from_name(name: &str) -> Option<Tool> {
        Tool::ALL
            .into_iter()
            .find(|tool| tool.name().eq_ignore_ascii_case(name.trim()))
    }
}

/// Parameters for one tool invocation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "tool", rename_all = "lowercase")]
pub enum ToolParams {
    /// Clockwise rotation in degrees
    Rotate { angle: f64 },
    /// Region in view units plus the view it was drawn on
    Crop { region: CropRegion, view: ViewSize },
    /// Exact output dimensions
    Resize { width: u32, height: u32 },
    Filters(FilterParameters),
    /// Re-encode at a quality. A lossless format is encoded as WebP.
    Compress(EncodeSpec),
    /// Re-encode in another format
    Format(EncodeSpec),
}

impl ToolParams {
    /// The tool these parameters belong to.
    pub fn tool(&self) -> Tool {
        match self {
            ToolParams::Rotate { .. } => Tool::Rotate,
            ToolParams::Crop { .. } => Tool::Crop,
            ToolParams::Resize { .. } => Tool::Resize,
            ToolParams::Filters(_) => Tool::Filters,
            ToolParams::Compress(_) => Tool::Compress,
            ToolParams::Format(_) => Tool::Format,
        }
    }

    /// The encode spec the tool runs with, for compress and format.
    fn output_spec(&self) -> Option<EncodeSpec> {
        match self {
            ToolParams::Compress(spec) => Some(spec.for_compression()),
            ToolParams::Format(spec) => Some(*spec),
            _ => None,
        }
    }
}

/// An uncommitted tool result.
#[derive(Debug, Clone, PartialEq)]
pub struct Preview {
    pub params: ToolParams,
    pub image: PixelBuffer,
    /// Encoded size, for the compress and format tools
    pub encoded_bytes: Option<usize>,
}

#[derive(Debug, Clone, Copy)]
struct RunSettings {
    interpolation: InterpolationFilter,
    device_pixel_ratio: f64,
}

struct Outcome {
    image: PixelBuffer,
    encoded_bytes: Option<usize>,
}

fn run_tool(
    image: &PixelBuffer,
    params: &ToolParams,
    settings: RunSettings,
) -> Result<Outcome, SessionError> {
    let mut encoded_bytes = None;
    let image = match params {
        ToolParams::Rotate { angle } => {
            if !angle.is_finite() {
                return Err(SessionError::InvalidAngle(*angle));
            }
            rotate(image, *angle, settings.interpolation)
        }
        ToolParams::Crop { region, view } => {
            crop(image, *region, *view, settings.device_pixel_ratio)?
        }
        ToolParams::Resize { width, height } => {
            resize(image, *width, *height, settings.interpolation)?
        }
        ToolParams::Filters(filters) => apply_filters(image, filters),
        ToolParams::Compress(spec) => {
            let encoded = encode(image, &spec.for_compression())?;
            encoded_bytes = Some(encoded.len());
            encoded.decode()?
        }
        ToolParams::Format(spec) => {
            let encoded = encode(image, spec)?;
            encoded_bytes = Some(encoded.len());
            encoded.decode()?
        }
    };
    Ok(Outcome {
        image,
        encoded_bytes,
    })
}

/// A snapshot of the session taken by [`EditSession::begin_apply`].
#[derive(Debug, Clone)]
pub struct PendingOperation {
    image: PixelBuffer,
    params: ToolParams,
    settings: RunSettings,
    generation: Generation,
}

impl PendingOperation {
    /// Generation of the buffer this operation was started from.
    pub fn generation(&self) -> Generation {
        self.generation
    }

    pub fn params(&self) -> &ToolParams {
        &self.params
    }

    /// Compute the result. Touches no session state.
    pub fn run(self) -> Result<FinishedOperation, SessionError> {
        let outcome = run_tool(&self.image, &self.params, self.settings)?;
        Ok(FinishedOperation {
            image: outcome.image,
            params: self.params,
            generation: self.generation,
            encoded_bytes: outcome.encoded_bytes,
        })
    }
}

/// A computed result waiting for [`EditSession::finish_apply`].
#[derive(Debug, Clone)]
pub struct FinishedOperation {
    image: PixelBuffer,
    params: ToolParams,
    generation: Generation,
    encoded_bytes: Option<usize>,
}

impl FinishedOperation {
    pub fn generation(&self) -> Generation {
        self.generation
    }

    pub fn image(&self) -> &PixelBuffer {
        &self.image
    }

    pub fn encoded_bytes(&self) -> Option<usize> {
        self.encoded_bytes
    }
}

/// Holds the current image and the state of the active tool.
#[derive(Debug, Clone, Default)]
pub struct EditSession {
    config: EditorConfig,
    image: Option<PixelBuffer>,
    original_size: Option<usize>,
    active_tool: Option<Tool>,
    preview: Option<Preview>,
    output: EncodeSpec,
    generation: Generation,
    in_flight: Option<Generation>,
}

impl EditSession {
    pub fn new() -> Self {
        Self::with_config(EditorConfig::default())
    }

    pub fn with_config(config: EditorConfig) -> Self {
        Self {
            output: config.output,
            config,
            ..Default::default()
        }
    }

    // ===== Accessors =====

    pub fn config(&self) -> &EditorConfig {
        &self.config
    }

    /// The authoritative buffer.
    pub fn image(&self) -> Option<&PixelBuffer> {
        self.image.as_ref()
    }

    /// What the user should see: the preview if there is one.
    pub fn displayed(&self) -> Option<&PixelBuffer> {
        self.preview
            .as_ref()
            .map(|p| &p.image)
            .or(self.image.as_ref())
    }

    pub fn active_tool(&self) -> Option<Tool> {
        self.active_tool
    }

    pub fn preview_state(&self) -> Option<&Preview> {
        self.preview.as_ref()
    }

    pub fn output_spec(&self) -> EncodeSpec {
        self.output
    }

    pub fn generation(&self) -> Generation {
        self.generation
    }

    pub fn is_busy(&self) -> bool {
        self.in_flight.is_some()
    }

    /// Size of the uploaded file, if the image came from [`load`](Self::load).
    pub fn original_size(&self) -> Option<usize> {
        self.original_size
    }

    // ===== Source lifecycle =====

    /// Decode `bytes` and make them the current image.
    ///
    /// On failure the session is left exactly as it was.
    pub fn load(&mut self, bytes: &[u8]) -> Result<(), SessionError> {
        let image = decode_image_with_limit(bytes, self.config.max_upload_bytes)?;
        self.replace_source(Some(image), Some(bytes.len()));
        Ok(())
    }

    /// Make an already decoded buffer the current image.
    pub fn load_buffer(&mut self, image: PixelBuffer) {
        self.replace_source(Some(image), None);
    }

    /// Drop the image and all tool state.
    pub fn reset(&mut self) {
        self.replace_source(None, None);
    }

    fn replace_source(&mut self, image: Option<PixelBuffer>, original_size: Option<usize>) {
        self.image = image;
        self.original_size = original_size;
        self.active_tool = None;
        self.preview = None;
        self.in_flight = None;
        self.output = self.config.output;
        self.generation += 1;

        match &self.image {
            Some(img) => debug!(
                width = img.width(),
                height = img.height(),
                original_size,
                generation = self.generation,
                "Loaded image"
            ),
            None => debug!(generation = self.generation, "Session reset"),
        }
    }

    // ===== Tools =====

    /// Activate `tool`. A preview belonging to another tool is discarded.
    pub fn select_tool(&mut self, tool: Tool) {
        if self.active_tool == Some(tool) {
            return;
        }
        if self.preview.is_some() {
            debug!(from = ?self.active_tool, to = ?tool, "Discarding preview on tool switch");
        }
        self.preview = None;
        self.active_tool = Some(tool);
    }

    /// Identity parameters for `tool` given the current buffer.
    pub fn identity_params(&self, tool: Tool) -> Result<ToolParams, SessionError> {
        let image = self.image.as_ref().ok_or(SessionError::NoImage)?;
        let (width, height) = image.dimensions();
        Ok(match tool {
            Tool::Rotate => ToolParams::Rotate { angle: 0.0 },
            Tool::Crop => {
                let view = ViewSize::new(width as f64, height as f64);
                ToolParams::Crop {
                    region: CropRegion::full(view),
                    view,
                }
            }
            Tool::Resize => ToolParams::Resize { width, height },
            Tool::Filters => ToolParams::Filters(FilterParameters::default()),
            Tool::Compress => ToolParams::Compress(self.output.for_compression()),
            Tool::Format => ToolParams::Format(self.output),
        })
    }

    /// Compute a preview of `params` from the current buffer.
    ///
    /// Parameters for a different tool switch tools first. If the
    /// computation fails, the session (including any earlier preview) is
    /// unchanged.
    pub fn preview(&mut self, params: ToolParams) -> Result<&Preview, SessionError> {
        let image = self.image.as_ref().ok_or(SessionError::NoImage)?;
        let outcome = run_tool(image, &params, self.settings())?;

        self.select_tool(params.tool());
        debug!(
            tool = ?params.tool(),
            width = outcome.image.width(),
            height = outcome.image.height(),
            encoded_bytes = outcome.encoded_bytes,
            "Preview updated"
        );

        Ok(self.preview.insert(Preview {
            params,
            image: outcome.image,
            encoded_bytes: outcome.encoded_bytes,
        }))
    }

    /// Drop the preview; the tool stays selected.
    pub fn discard_preview(&mut self) {
        self.preview = None;
    }

    /// Replace the buffer with the preview.
    pub fn commit(&mut self) -> Result<(), SessionError> {
        if self.in_flight.is_some() {
            warn!("Commit rejected: an operation is in flight");
            return Err(SessionError::Busy);
        }
        let Some(preview) = self.preview.take() else {
            warn!(tool = ?self.active_tool, "Commit rejected: nothing to commit");
            return Err(SessionError::NoPreview);
        };
        self.install(preview.image, &preview.params);
        Ok(())
    }

    fn install(&mut self, image: PixelBuffer, params: &ToolParams) {
        if let Some(spec) = params.output_spec() {
            self.output = spec;
        }
        self.image = Some(image);
        self.preview = None;
        self.active_tool = None;
        self.generation += 1;

        debug!(
            tool = ?params.tool(),
            generation = self.generation,
            "Committed"
        );
    }

    fn settings(&self) -> RunSettings {
        RunSettings {
            interpolation: self.config.interpolation,
            device_pixel_ratio: self.config.effective_dpr(),
        }
    }

    // ===== Off-thread apply =====

    /// Snapshot the buffer for `params` and mark the session in-flight.
    pub fn begin_apply(&mut self, params: ToolParams) -> Result<PendingOperation, SessionError> {
        if self.in_flight.is_some() {
            warn!(tool = ?params.tool(), "Apply rejected: another operation is in flight");
            return Err(SessionError::Busy);
        }
        let image = self.image.as_ref().ok_or(SessionError::NoImage)?.clone();
        self.in_flight = Some(self.generation);

        debug!(tool = ?params.tool(), generation = self.generation, "Apply started");
        Ok(PendingOperation {
            image,
            params,
            settings: self.settings(),
            generation: self.generation,
        })
    }

    /// Install a finished result unless the session moved on meanwhile.
    pub fn finish_apply(&mut self, finished: FinishedOperation) -> Result<(), SessionError> {
        if finished.generation != self.generation {
            warn!(
                started = finished.generation,
                current = self.generation,
                "Discarding stale result"
            );
            if self.in_flight == Some(finished.generation) {
                self.in_flight = None;
            }
            return Err(SessionError::Stale);
        }

        self.in_flight = None;
        self.install(finished.image, &finished.params);
        Ok(())
    }

    /// Report that the operation started at `generation` failed.
    pub fn finish_failed(&mut self, generation: Generation) {
        if self.in_flight == Some(generation) {
            debug!(generation, "Apply failed, clearing in-flight marker");
            self.in_flight = None;
        }
    }

    /// Run `params` against the current buffer and commit the result.
    pub fn apply(&mut self, params: ToolParams) -> Result<(), SessionError> {
        let pending = self.begin_apply(params)?;
        let generation = pending.generation();
        match pending.run() {
            Ok(finished) => self.finish_apply(finished),
            Err(e) => {
                self.finish_failed(generation);
                Err(e)
            }
        }
    }

    // ===== Output =====

    /// Encode the current buffer with the session's output spec.
    pub fn export(&self) -> Result<Encoded, SessionError> {
        let image = self.image.as_ref().ok_or(SessionError::NoImage)?;
        Ok(encode(image, &self.output)?)
    }

    /// Suggested download name for an export made at `timestamp_ms`.
    pub fn export_file_name(&self, timestamp_ms: u64) -> String {
        download_file_name(&self.config.file_name_prefix, self.output.format, timestamp_ms)
    }

    /// Uploaded size against `encoded_bytes`, when the upload size is known.
    pub fn compression_report(&self, encoded_bytes: usize) -> Option<CompressionReport> {
        self.original_size
            .map(|original| CompressionReport::new(original, encoded_bytes))
    }
}
