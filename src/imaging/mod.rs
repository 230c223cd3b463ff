//! Format codec adapter, pure Rust with no system libraries.
//!
//! | Operation | Crate / function |
//! |---|---|
//! | **Probe** | `image::ImageReader::with_guessed_format` (magic bytes) |
//! | **Decode** | `image` crate decoders |
//! | **Resize** | `resize_exact` + `Lanczos3`, exact target size |
//! | **Encode** | `image` crate encoders; `icns` crate for Apple icons |
//!
//! The module is split into:
//! - **Parameters**: [`TargetFormat`], the encodings an entry can request
//! - **Layout**: pure functions picking the pixel layout a target can store
//! - **Backend**: [`ImageBackend`] trait + [`RustBackend`]
//! - **ICNS**: Apple icon families through the `icns` crate

pub mod backend;
pub(crate) mod icns;
pub mod layout;
mod params;
pub mod rust_backend;

pub use backend::{BackendError, ImageBackend};
pub use layout::fit_layout;
pub use params::{TargetFormat, UnknownFormat};
pub use rust_backend::{RustBackend, supported_input_extensions};
