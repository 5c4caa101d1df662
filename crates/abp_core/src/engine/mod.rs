//! Media engine boundary.
//!
//! The engine is an external transcoder treated as a black box. It owns a
//! private virtual filesystem of named byte buffers; callers stage inputs
//! into it, run argument vectors against it and read outputs back.
//!
//! One engine instance is shared by a whole run and used strictly one call
//! at a time, so every method takes `&mut self`.
//!
//! Implementations:
//! - `FfmpegEngine`: runs the `ffmpeg` binary inside a scratch directory
//! - `MemoryEngine`: in-memory double that emulates copy/trim/concat

mod errors;
mod ffmpeg;
mod memory;

pub use errors::{EngineError, EngineResult};
pub use ffmpeg::FfmpegEngine;
pub use memory::MemoryEngine;

/// Operations the processing driver needs from a media engine.
pub trait MediaEngine {
    /// Short name for logs and error context.
    fn name(&self) -> &str;

    /// Initialize the engine. Called once before any other operation.
    fn load(&mut self) -> EngineResult<()>;

    /// Whether `load` has succeeded.
    fn is_loaded(&self) -> bool;

    /// Store bytes under `name`, replacing any previous content.
    fn write_file(&mut self, name: &str, data: &[u8]) -> EngineResult<()>;

    /// Read the bytes stored under `name`.
    fn read_file(&mut self, name: &str) -> EngineResult<Vec<u8>>;

    /// Run one invocation. Names in `args` refer to the virtual filesystem.
    ///
    /// Every line the engine logs while running is passed to `on_line`,
    /// whether or not the invocation succeeds.
    fn exec(&mut self, args: &[String], on_line: &mut dyn FnMut(&str)) -> EngineResult<()>;

    /// Remove `name` from the virtual filesystem.
    fn delete_file(&mut self, name: &str) -> EngineResult<()>;
}

/// Check that a virtual filesystem name is a single plain component.
pub fn validate_name(name: &str) -> EngineResult<()> {
    let invalid = name.is_empty()
        || name == "."
        || name == ".."
        || name.contains('/')
        || name.contains('\\')
        || name.contains('\0');

    if invalid {
        Err(EngineError::InvalidName(name.to_string()))
    } else {
        Ok(())
    }
}
