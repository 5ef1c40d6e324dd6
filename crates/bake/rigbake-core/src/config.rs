//! Export configuration. Immutable once handed to an entry point.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::error::Result;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ExportMode {
    #[default]
    Single,
    Multi,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ExportTarget {
    /// `.bin` payload + `.js` descriptor next to the saved document.
    #[default]
    BinaryFile,
    /// Key/value pairs on the armature object.
    Property,
}

/// One entry of the multi-export clip list.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ClipSelection {
    /// Host action the clip is sampled from; also the clip name.
    pub action: String,
    pub include: bool,
    pub frame_step: u32,
    /// Use the action's keyed range instead of `custom_start..=custom_end`.
    pub use_full_range: bool,
    pub custom_start: u32,
    /// 0 means "action end".
    pub custom_end: u32,
}

impl Default for ClipSelection {
    fn default() -> Self {
        Self {
            action: String::new(),
            include: true,
            frame_step: 1,
            use_full_range: true,
            custom_start: 1,
            custom_end: 0,
        }
    }
}

impl ClipSelection {
    pub fn new(action: impl Into<String>) -> Self {
        Self {
            action: action.into(),
            ..Self::default()
        }
    }

    pub fn with_step(mut self, step: u32) -> Self {
        self.frame_step = step;
        self
    }

    pub fn with_range(mut self, start: u32, end: u32) -> Self {
        self.use_full_range = false;
        self.custom_start = start;
        self.custom_end = end;
        self
    }

    pub fn excluded(mut self) -> Self {
        self.include = false;
        self
    }
}

/// Settings used by single-clip mode.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SingleClipSettings {
    pub animation_name: String,
    pub use_custom_name: bool,
    /// 0 means "scene start".
    pub start_frame: u32,
    /// 0 means "scene end".
    pub end_frame: u32,
    pub frame_step: u32,
    pub export_all_frames: bool,
    /// Take `1..=action end` from the active action.
    pub use_full_range: bool,
}

impl Default for SingleClipSettings {
    fn default() -> Self {
        Self {
            animation_name: String::new(),
            use_custom_name: false,
            start_frame: 1,
            end_frame: 0,
            frame_step: 1,
            export_all_frames: false,
            use_full_range: false,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ExportConfig {
    pub mode: ExportMode,
    pub target: ExportTarget,
    /// Base name of multi exports (`{unit}_animations.*`, `{unit}Rest`).
    pub unit_name: String,
    /// Multi mode: ignore per-clip steps and take every frame.
    pub export_all_frames: bool,
    pub property_name: String,
    pub clips: Vec<ClipSelection>,
    pub single: SingleClipSettings,
}

impl Default for ExportConfig {
    fn default() -> Self {
        Self {
            mode: ExportMode::Single,
            target: ExportTarget::BinaryFile,
            unit_name: "unit".to_string(),
            export_all_frames: false,
            property_name: "animation_matrices".to_string(),
            clips: Vec::new(),
            single: SingleClipSettings::default(),
        }
    }
}

impl ExportConfig {
    pub fn from_json(s: &str) -> Result<Self> {
        Ok(serde_json::from_str(s)?)
    }

    pub fn multi(unit_name: impl Into<String>, clips: Vec<ClipSelection>) -> Self {
        Self {
            mode: ExportMode::Multi,
            unit_name: unit_name.into(),
            clips,
            ..Self::default()
        }
    }

    pub fn with_target(mut self, target: ExportTarget) -> Self {
        self.target = target;
        self
    }

    pub fn included_clips(&self) -> impl Iterator<Item = &ClipSelection> {
        self.clips
            .iter()
            .filter(|c| c.include && !c.action.is_empty())
    }
}

/// A configuration plus the host context the entry point needs.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExportRequest {
    pub config: ExportConfig,
    /// Saved location of the host document; binary exports land next to it.
    pub document_path: Option<PathBuf>,
}

impl ExportRequest {
    pub fn new(config: ExportConfig) -> Self {
        Self {
            config,
            document_path: None,
        }
    }

    pub fn with_document_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.document_path = Some(path.into());
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let cfg = ExportConfig::default();
        assert_eq!(cfg.mode, ExportMode::Single);
        assert_eq!(cfg.target, ExportTarget::BinaryFile);
        assert_eq!(cfg.unit_name, "unit");
        assert_eq!(cfg.property_name, "animation_matrices");
        let clip = ClipSelection::default();
        assert!(clip.include && clip.use_full_range);
        assert_eq!(clip.frame_step, 1);
    }

    #[test]
    fn parses_partial_json() {
        let cfg = ExportConfig::from_json(
            r#"{
                "mode": "multi",
                "target": "property",
                "unitName": "orc",
                "clips": [
                    { "action": "Walk", "frameStep": 2 },
                    { "action": "Idle", "include": false },
                    { "action": "Run", "useFullRange": false, "customStart": 3, "customEnd": 9 }
                ]
            }"#,
        )
        .unwrap();
        assert_eq!(cfg.mode, ExportMode::Multi);
        assert_eq!(cfg.target, ExportTarget::Property);
        assert_eq!(cfg.property_name, "animation_matrices");
        let included: Vec<&str> = cfg.included_clips().map(|c| c.action.as_str()).collect();
        assert_eq!(included, vec!["Walk", "Run"]);
        assert_eq!(cfg.clips[0].frame_step, 2);
        assert_eq!(cfg.clips[2], ClipSelection::new("Run").with_range(3, 9));
    }

    #[test]
    fn malformed_json_is_a_serialization_error() {
        assert!(matches!(
            ExportConfig::from_json("{ nope"),
            Err(crate::error::ExportError::Serialization { .. })
        ));
    }
}
