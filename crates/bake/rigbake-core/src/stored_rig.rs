//! In-memory host: a recorded armature session that implements [`PoseSource`]
//! and [`PropertyStore`].
//!
//! Used for offline baking of captured rigs and for tests. Poses are keyed per
//! action and frame; evaluating a frame without a key holds the nearest earlier
//! key (or the first key before the first one). With no active action the rest
//! pose is returned.
//!
//! JSON shape (see `fixtures/rigs/*.json`):
//! ```json
//! {
//!   "boneNames": ["root", "spine"],
//!   "world": [16 floats, column-major],          // optional, identity
//!   "sceneRange": [1, 24],
//!   "currentFrame": 1,
//!   "activeAction": "Walk",                      // optional
//!   "restPose": [[16 floats], [16 floats]],     // optional, identity per bone
//!   "actions": {
//!     "Walk": { "range": [1, 5], "keys": [ { "frame": 1, "bones": [[...], [...]] } ] }
//!   }
//! }
//! ```

use std::collections::BTreeMap;

use indexmap::IndexMap;
use nalgebra::Matrix4;
use serde::Deserialize;

use crate::error::{ExportError, HostError, Result};
use crate::host::{Pose, PoseSource, PropertyStore, PropertyValue, SampledPose};

/// Keyed poses of one action.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct StoredAction {
    pub range: (u32, u32),
    pub keys: BTreeMap<u32, Vec<Matrix4<f32>>>,
}

impl StoredAction {
    fn pose_at(&self, frame: u32) -> Option<&Vec<Matrix4<f32>>> {
        self.keys
            .range(..=frame)
            .next_back()
            .or_else(|| self.keys.iter().next())
            .map(|(_, bones)| bones)
    }
}

#[derive(Clone, Debug, Default)]
pub struct StoredRig {
    bone_names: Vec<String>,
    world: Matrix4<f32>,
    scene_range: (u32, u32),
    current_frame: u32,
    active_action: Option<String>,
    rest_pose: Vec<Matrix4<f32>>,
    actions: IndexMap<String, StoredAction>,
    properties: IndexMap<String, PropertyValue>,
    frame_log: Vec<u32>,
    action_log: Vec<Option<String>>,
    fail_on_frame: Option<u32>,
}

impl StoredRig {
    pub fn new(bone_names: Vec<String>) -> Self {
        let rest_pose = vec![Matrix4::identity(); bone_names.len()];
        Self {
            bone_names,
            world: Matrix4::identity(),
            scene_range: (1, 250),
            current_frame: 1,
            rest_pose,
            ..Self::default()
        }
    }

    pub fn with_world(mut self, world: Matrix4<f32>) -> Self {
        self.world = world;
        self
    }

    pub fn with_scene_range(mut self, start: u32, end: u32) -> Self {
        self.scene_range = (start, end);
        self
    }

    pub fn with_current_frame(mut self, frame: u32) -> Self {
        self.current_frame = frame;
        self
    }

    pub fn with_active_action(mut self, action: Option<&str>) -> Self {
        self.active_action = action.map(str::to_string);
        self
    }

    pub fn with_rest_pose(mut self, bones: Vec<Matrix4<f32>>) -> Self {
        self.rest_pose = bones;
        self
    }

    /// Make `set_current_frame(frame)` fail, to exercise error paths.
    pub fn fail_on_frame(mut self, frame: u32) -> Self {
        self.fail_on_frame = Some(frame);
        self
    }

    pub fn add_action(&mut self, name: impl Into<String>, range: (u32, u32)) -> &mut StoredAction {
        self.actions
            .entry(name.into())
            .or_insert_with(|| StoredAction {
                range,
                keys: BTreeMap::new(),
            })
    }

    /// Key every frame of `range` with `f(frame, bone_index)`.
    pub fn add_action_with<F>(&mut self, name: impl Into<String>, range: (u32, u32), mut f: F)
    where
        F: FnMut(u32, usize) -> Matrix4<f32>,
    {
        let bones = self.bone_names.len();
        let action = self.add_action(name, range);
        for frame in range.0..=range.1 {
            let pose = (0..bones).map(|b| f(frame, b)).collect();
            action.keys.insert(frame, pose);
        }
    }

    pub fn action(&self, name: &str) -> Option<&StoredAction> {
        self.actions.get(name)
    }

    pub fn property(&self, key: &str) -> Option<&PropertyValue> {
        self.properties.get(key)
    }

    pub fn properties(&self) -> &IndexMap<String, PropertyValue> {
        &self.properties
    }

    /// Every frame passed to `set_current_frame`, in call order.
    pub fn frame_log(&self) -> &[u32] {
        &self.frame_log
    }

    /// Every action passed to `set_active_action`, in call order.
    pub fn action_log(&self) -> &[Option<String>] {
        &self.action_log
    }

    pub fn clear_logs(&mut self) {
        self.frame_log.clear();
        self.action_log.clear();
    }
}

impl PoseSource for StoredRig {
    fn bone_names(&self) -> Vec<String> {
        self.bone_names.clone()
    }

    fn current_frame(&self) -> u32 {
        self.current_frame
    }

    fn set_current_frame(&mut self, frame: u32) -> Result<(), HostError> {
        self.frame_log.push(frame);
        if self.fail_on_frame == Some(frame) {
            return Err(HostError::new(format!("frame {frame} failed to evaluate")));
        }
        self.current_frame = frame;
        Ok(())
    }

    fn scene_frame_range(&self) -> (u32, u32) {
        self.scene_range
    }

    fn active_action(&self) -> Option<String> {
        self.active_action.clone()
    }

    fn set_active_action(&mut self, action: Option<&str>) -> Result<(), HostError> {
        self.action_log.push(action.map(str::to_string));
        if let Some(name) = action {
            if !self.actions.contains_key(name) {
                return Err(HostError::new(format!("no action named '{name}'")));
            }
        }
        self.active_action = action.map(str::to_string);
        Ok(())
    }

    fn action_frame_range(&self, action: &str) -> Option<(u32, u32)> {
        self.actions.get(action).map(|a| a.range)
    }

    fn evaluate(&mut self) -> Result<SampledPose, HostError> {
        let bones = self
            .active_action
            .as_deref()
            .and_then(|name| self.actions.get(name))
            .and_then(|action| action.pose_at(self.current_frame))
            .unwrap_or(&self.rest_pose)
            .clone();
        Ok(SampledPose::new(self.world, Pose::new(bones)))
    }
}

impl PropertyStore for StoredRig {
    fn set_property(&mut self, key: &str, value: PropertyValue) -> Result<(), HostError> {
        self.properties.insert(key.to_string(), value);
        Ok(())
    }

    fn remove_property(&mut self, key: &str) -> Result<(), HostError> {
        self.properties.shift_remove(key);
        Ok(())
    }
}

// ----- JSON schema (serde) -----

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawRig {
    bone_names: Vec<String>,
    #[serde(default)]
    world: Option<Vec<f32>>,
    #[serde(default = "default_scene_range")]
    scene_range: (u32, u32),
    #[serde(default)]
    current_frame: Option<u32>,
    #[serde(default)]
    active_action: Option<String>,
    #[serde(default)]
    rest_pose: Option<Vec<Vec<f32>>>,
    #[serde(default)]
    actions: IndexMap<String, RawAction>,
}

#[derive(Debug, Deserialize)]
struct RawAction {
    range: (u32, u32),
    #[serde(default)]
    keys: Vec<RawKey>,
}

#[derive(Debug, Deserialize)]
struct RawKey {
    frame: u32,
    bones: Vec<Vec<f32>>,
}

fn default_scene_range() -> (u32, u32) {
    (1, 250)
}

fn to_matrix(values: &[f32], what: &str) -> Result<Matrix4<f32>> {
    if values.len() != 16 {
        return Err(ExportError::Serialization {
            reason: format!("{what}: expected 16 floats, got {}", values.len()),
        });
    }
    Ok(Matrix4::from_column_slice(values))
}

fn to_pose(raw: &[Vec<f32>], bone_count: usize, what: &str) -> Result<Vec<Matrix4<f32>>> {
    if raw.len() != bone_count {
        return Err(ExportError::BoneCountMismatch {
            expected: bone_count,
            actual: raw.len(),
        });
    }
    raw.iter().map(|m| to_matrix(m, what)).collect()
}

/// Parse a recorded rig session.
pub fn parse_stored_rig_json(s: &str) -> Result<StoredRig> {
    let raw: RawRig = serde_json::from_str(s)?;
    let bone_count = raw.bone_names.len();

    let mut rig = StoredRig::new(raw.bone_names).with_scene_range(raw.scene_range.0, raw.scene_range.1);
    if let Some(world) = &raw.world {
        rig.world = to_matrix(world, "world")?;
    }
    if let Some(rest) = &raw.rest_pose {
        rig.rest_pose = to_pose(rest, bone_count, "restPose")?;
    }
    rig.current_frame = raw.current_frame.unwrap_or(raw.scene_range.0);

    for (name, action) in raw.actions {
        if action.range.0 > action.range.1 {
            return Err(ExportError::invalid_range(name, action.range.0, action.range.1));
        }
        let mut keys = BTreeMap::new();
        for key in &action.keys {
            let what = format!("{name}@{}", key.frame);
            keys.insert(key.frame, to_pose(&key.bones, bone_count, &what)?);
        }
        rig.actions.insert(
            name,
            StoredAction {
                range: action.range,
                keys,
            },
        );
    }

    if let Some(active) = raw.active_action {
        if !rig.actions.contains_key(&active) {
            return Err(ExportError::UnknownAction { name: active });
        }
        rig.active_action = Some(active);
    }
    Ok(rig)
}
