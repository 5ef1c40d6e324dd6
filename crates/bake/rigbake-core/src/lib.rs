//! Rigbake Core (host-agnostic)
//!
//! Bakes skeletal animation clips into one flat buffer of per-bone 4x4 matrices
//! plus a descriptor telling a GPU-side player where each clip lives.
//!
//! API:
//! - [`export_multi`] / [`export_single`]: sample a [`PoseSource`] into a
//!   [`MatrixBuffer`] and descriptor, in memory.
//! - [`run_export`]: the full entry point; writes `.bin` + `.js` next to the
//!   saved document or stores custom properties on the armature, then notifies.
//! - [`StoredRig`]: a recorded armature usable as a host for offline baking.

pub mod config;
pub mod coords;
pub mod descriptor;
pub mod error;
pub mod export;
pub mod host;
pub mod interp;
pub mod packing;
pub mod plan;
pub mod registry;
pub mod sampling;
pub mod serialize;
pub mod stored_rig;
pub mod transition;

// Re-exports for hosts and adapters
pub use config::{ClipSelection, ExportConfig, ExportMode, ExportRequest, ExportTarget, SingleClipSettings};
pub use coords::CoordinateTransform;
pub use descriptor::{ExportDescriptor, SingleClipDescriptor, PLAYBACK_RATE};
pub use error::{ExportError, HostError, Result};
pub use export::{export_multi, export_single, run_export, ExportReport, Exporter, MultiExport, SingleExport};
pub use host::{
    HostStateGuard, LogNotifier, Notifier, Pose, PoseSource, PropertyStore, PropertyValue,
    SampledPose, Severity,
};
pub use interp::{LinearPoseInterpolator, PoseInterpolator, Trs};
pub use packing::{MatrixBuffer, FLOATS_PER_BONE};
pub use plan::{estimate_export, plan_clips, ClipPlan, ExportEstimate};
pub use registry::{Adjacency, ClipKind, ClipRecord, ClipRegistry};
pub use sampling::{sample_frames, FrameWindow};
pub use stored_rig::{parse_stored_rig_json, StoredAction, StoredRig};
pub use transition::{transition_name, TransitionSynthesizer, TRANSITION_FRAMES};
