//! Export descriptors: everything a consumer needs to index the matrix buffer.

use serde::{Deserialize, Serialize};

use crate::registry::{Adjacency, ClipKind, ClipRecord};

/// Playback rate written next to every clip.
pub const PLAYBACK_RATE: u32 = 30;

/// Multi-clip descriptor. Built once per export from the registry.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExportDescriptor {
    pub unit_name: String,
    pub bone_names: Vec<String>,
    pub total_frames: usize,
    pub records: Vec<ClipRecord>,
    pub adjacency: Adjacency,
    pub playback_rate: u32,
}

impl ExportDescriptor {
    pub fn new(
        unit_name: impl Into<String>,
        bone_names: Vec<String>,
        records: Vec<ClipRecord>,
        adjacency: Adjacency,
    ) -> Self {
        let total_frames = records.iter().map(ClipRecord::frame_count).sum();
        Self {
            unit_name: unit_name.into(),
            bone_names,
            total_frames,
            records,
            adjacency,
            playback_rate: PLAYBACK_RATE,
        }
    }

    #[inline]
    pub fn num_bones(&self) -> usize {
        self.bone_names.len()
    }

    #[inline]
    pub fn animation_count(&self) -> usize {
        self.records.len()
    }

    pub fn frame_counts(&self) -> Vec<usize> {
        self.records.iter().map(ClipRecord::frame_count).collect()
    }

    pub fn frame_steps(&self) -> Vec<u32> {
        self.records.iter().map(|r| r.frame_step).collect()
    }

    /// Scene-frame windows each clip was sampled from.
    pub fn animation_ranges(&self) -> Vec<(u32, u32)> {
        self.records.iter().map(|r| r.source_range).collect()
    }

    pub fn animation_names(&self) -> Vec<&str> {
        self.records.iter().map(|r| r.name.as_str()).collect()
    }

    /// Rest pose and main clips, in buffer order.
    pub fn playable(&self) -> impl Iterator<Item = &ClipRecord> {
        self.records.iter().filter(|r| !r.is_transition())
    }

    pub fn transitions(&self) -> impl Iterator<Item = &ClipRecord> {
        self.records.iter().filter(|r| r.is_transition())
    }

    pub fn main_clips(&self) -> impl Iterator<Item = &ClipRecord> {
        self.records.iter().filter(|r| r.kind == ClipKind::Main)
    }

    /// Floats the matching buffer must hold.
    pub fn expected_float_count(&self) -> usize {
        self.total_frames * self.num_bones() * crate::packing::FLOATS_PER_BONE
    }
}

/// Descriptor for a single baked clip.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SingleClipDescriptor {
    pub name: String,
    pub bone_names: Vec<String>,
    pub num_frames: usize,
    pub start_frame: u32,
    pub end_frame: u32,
    pub frame_step: u32,
    pub export_all_frames: bool,
}

impl SingleClipDescriptor {
    #[inline]
    pub fn num_bones(&self) -> usize {
        self.bone_names.len()
    }

    /// `"{name}_f{start}_{end}_n{frames}"`, plus `"_s{step}"` unless every frame is taken.
    pub fn base_filename(&self) -> String {
        let mut base = format!(
            "{}_f{}_{}_n{}",
            self.name, self.start_frame, self.end_frame, self.num_frames
        );
        if !self.export_all_frames {
            base.push_str(&format!("_s{}", self.frame_step));
        }
        base
    }
}
