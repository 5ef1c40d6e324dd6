//! Output forms for a finished export.
//!
//! Every writer takes the in-memory descriptor and matrix buffer only; none of
//! them know how clips or transitions were produced.
//!
//! - [`binary`]: raw little-endian `f32` payload
//! - [`script`]: human-readable setup script (clip ranges, transitions, layout constants)
//! - [`json`]: the same descriptor as `serde_json::Value`
//! - [`properties`]: key/value pairs on the armature object
//! - [`files`]: export directory layout and bundle writing

pub mod binary;
pub mod files;
pub mod json;
pub mod properties;
pub mod script;

pub use binary::{decode_le_f32, encode_le_f32, write_matrix_buffer};
pub use files::{export_dir, write_bundle, BundlePaths, EXPORT_DIR_NAME};
pub use json::{descriptor_json, single_descriptor_json};
pub use properties::{write_properties, write_single_properties};
pub use script::{render_descriptor, render_single_descriptor, write_descriptor, write_single_descriptor};
