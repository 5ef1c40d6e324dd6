//! Descriptor as `serde_json::Value`, with the same field names the setup script uses.

use serde_json::{json, Value as JsonValue};

use crate::descriptor::{ExportDescriptor, SingleClipDescriptor};

pub fn descriptor_json(desc: &ExportDescriptor) -> JsonValue {
    let clips: Vec<JsonValue> = desc
        .records
        .iter()
        .map(|r| {
            json!({
                "name": r.name,
                "kind": r.kind,
                "startIndex": r.start_index,
                "endIndex": r.end_index,
                "playbackRate": desc.playback_rate,
                "isTransition": r.is_transition(),
            })
        })
        .collect();
    let ranges: Vec<[u32; 2]> = desc
        .animation_ranges()
        .into_iter()
        .map(|(s, e)| [s, e])
        .collect();

    json!({
        "unitName": desc.unit_name,
        "numBones": desc.num_bones(),
        "totalFrames": desc.total_frames,
        "animationCount": desc.animation_count(),
        "frameCounts": desc.frame_counts(),
        "frameSteps": desc.frame_steps(),
        "animationRanges": ranges,
        "animationNames": desc.animation_names(),
        "boneNames": desc.bone_names,
        "clips": clips,
        "transitions": desc.adjacency.map,
    })
}

/// Export the single-clip descriptor (stable schema for FFI/serialization).
pub fn single_descriptor_json(desc: &SingleClipDescriptor) -> JsonValue {
    serde_json::to_value(desc).unwrap_or(JsonValue::Null)
}
