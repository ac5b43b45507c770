//! Cropkit WASM - WebAssembly bindings for cropkit
//!
//! This crate provides WASM bindings to expose the cropkit-core crop session
//! to JavaScript/TypeScript applications.
//!
//! # Module Structure
//!
//! - `types` - WASM-compatible wrapper types for bitmaps and crop results
//! - `session` - The interactive crop session
//! - `logging` - Console output for the core crate's logs
//!
//! # Usage
//!
//! ```typescript
//! import init, { JsBitmap, JsCropSession } from '@cropkit/wasm';
//!
//! // Initialize WASM module (must call first)
//! await init();
//!
//! const bitmap = new JsBitmap(imageData.width, imageData.height, imageData.data);
//! const session = new JsCropSession(bitmap, false, undefined);
//! session.on_crop_to_rect((result) => console.log(result.rect, result.angle));
//! session.perform_initial_setup(800, 600);
//! session.commit();
//! ```

use wasm_bindgen::prelude::*;

mod logging;
mod session;
mod types;

// Re-export public types
pub use logging::set_log_level;
pub use session::JsCropSession;
pub use types::JsBitmap;

/// Initialize the WASM module (called automatically on load)
#[wasm_bindgen(start)]
pub fn init() {
    logging::install();
}

/// Get the version of the WASM module
#[wasm_bindgen]
pub fn version() -> String {
    env!("CARGO_PKG_VERSION").to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version() {
        assert!(!version().is_empty());
    }
}
