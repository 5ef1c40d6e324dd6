//! Host capabilities the exporter needs, and the scoped state guard around them.
//!
//! The host's timeline is a single shared mutable resource: every pose read is a
//! `set frame -> evaluate -> read` sequence, so all methods take `&mut self` and
//! nothing here is meant to run concurrently.

use std::ops::{Deref, DerefMut};

use nalgebra::Matrix4;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::error::HostError;

/// Armature-space bone matrices at one frame, in the fixed bone order.
#[derive(Clone, Debug, PartialEq)]
pub struct Pose {
    pub bones: Vec<Matrix4<f32>>,
}

impl Pose {
    pub fn new(bones: Vec<Matrix4<f32>>) -> Self {
        Self { bones }
    }

    #[inline]
    pub fn bone_count(&self) -> usize {
        self.bones.len()
    }
}

/// One host evaluation: the armature's world matrix plus its pose.
#[derive(Clone, Debug, PartialEq)]
pub struct SampledPose {
    pub world: Matrix4<f32>,
    pub pose: Pose,
}

impl SampledPose {
    pub fn new(world: Matrix4<f32>, pose: Pose) -> Self {
        Self { world, pose }
    }
}

/// Timeline + pose readback of one armature inside the authoring tool.
pub trait PoseSource {
    /// Bone names in the order `evaluate` returns their matrices.
    /// Must not change during an export run.
    fn bone_names(&self) -> Vec<String>;

    fn current_frame(&self) -> u32;

    /// Move the timeline; the host re-evaluates before returning.
    fn set_current_frame(&mut self, frame: u32) -> Result<(), HostError>;

    /// Scene playback range `(start, end)`.
    fn scene_frame_range(&self) -> (u32, u32);

    fn active_action(&self) -> Option<String>;

    fn set_active_action(&mut self, action: Option<&str>) -> Result<(), HostError>;

    /// Keyed range `(first, last)` of an action, `None` if the host has no such action.
    fn action_frame_range(&self, action: &str) -> Option<(u32, u32)>;

    /// Read back the evaluated pose at the current frame.
    fn evaluate(&mut self) -> Result<SampledPose, HostError>;

    fn sample_at(&mut self, frame: u32) -> Result<SampledPose, HostError> {
        self.set_current_frame(frame)?;
        self.evaluate()
    }
}

/// Value stored under a key on the persisted armature object.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "data", rename_all = "camelCase")]
pub enum PropertyValue {
    FloatArray(Vec<f32>),
    Int(i64),
    Text(String),
}

/// Key/value persistence on the armature object.
pub trait PropertyStore {
    fn set_property(&mut self, key: &str, value: PropertyValue) -> Result<(), HostError>;

    /// Removing a missing key is not an error.
    fn remove_property(&mut self, key: &str) -> Result<(), HostError>;
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Info,
    Error,
}

/// Side channel for user-facing outcome messages.
pub trait Notifier {
    fn notify(&mut self, message: &str, severity: Severity);
}

/// Routes notifications to `tracing`.
#[derive(Clone, Copy, Debug, Default)]
pub struct LogNotifier;

impl Notifier for LogNotifier {
    fn notify(&mut self, message: &str, severity: Severity) {
        match severity {
            Severity::Info => info!(target: "rigbake::notify", "{message}"),
            Severity::Error => warn!(target: "rigbake::notify", "{message}"),
        }
    }
}

/// Holds the host's current frame and active action for the duration of a run.
///
/// Both are captured on acquisition and written back on drop, whichever way the
/// run exits. Restoration is best-effort: failures are logged, not raised.
pub struct HostStateGuard<'a, S: PoseSource + ?Sized> {
    source: &'a mut S,
    original_frame: u32,
    original_action: Option<String>,
}

impl<'a, S: PoseSource + ?Sized> HostStateGuard<'a, S> {
    pub fn acquire(source: &'a mut S) -> Self {
        let original_frame = source.current_frame();
        let original_action = source.active_action();
        Self {
            source,
            original_frame,
            original_action,
        }
    }

    pub fn original_frame(&self) -> u32 {
        self.original_frame
    }

    pub fn original_action(&self) -> Option<&str> {
        self.original_action.as_deref()
    }
}

impl<'a, S: PoseSource + ?Sized> Deref for HostStateGuard<'a, S> {
    type Target = S;
    fn deref(&self) -> &Self::Target {
        self.source
    }
}

impl<'a, S: PoseSource + ?Sized> DerefMut for HostStateGuard<'a, S> {
    fn deref_mut(&mut self) -> &mut Self::Target {
        self.source
    }
}

impl<'a, S: PoseSource + ?Sized> Drop for HostStateGuard<'a, S> {
    fn drop(&mut self) {
        // action first so the frame is re-evaluated under the original action
        if self.source.active_action() != self.original_action {
            if let Err(err) = self
                .source
                .set_active_action(self.original_action.as_deref())
            {
                warn!(
                    action = ?self.original_action,
                    "failed to restore active action: {err}"
                );
            }
        }
        if let Err(err) = self.source.set_current_frame(self.original_frame) {
            warn!(
                frame = self.original_frame,
                "failed to restore current frame: {err}"
            );
        }
    }
}
