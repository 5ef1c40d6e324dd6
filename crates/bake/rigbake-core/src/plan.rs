//! Clip resolution and the pre-flight size estimate.
//!
//! Planning touches only the host's action metadata, never the timeline, so it
//! can run before anything is sampled. Transition count grows as n·(n-1) in the
//! number of included clips; the estimate makes that visible up front.

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::config::ExportConfig;
use crate::error::{ExportError, Result};
use crate::host::PoseSource;
use crate::packing::FLOATS_PER_BONE;
use crate::sampling::FrameWindow;
use crate::transition::{transition_pair_count, TRANSITION_FRAMES};

/// A selected clip with its window resolved against the host.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClipPlan {
    pub name: String,
    pub action: String,
    pub window: FrameWindow,
    pub frames: Vec<u32>,
}

impl ClipPlan {
    #[inline]
    pub fn frame_count(&self) -> usize {
        self.frames.len()
    }

    /// Scene frame whose pose opens the clip.
    #[inline]
    pub fn first_frame(&self) -> u32 {
        self.window.start
    }

    /// Scene frame whose pose closes the clip.
    #[inline]
    pub fn last_frame(&self) -> u32 {
        self.window.end
    }
}

/// Resolve every included clip of a multi export, in selection order.
pub fn plan_clips<S: PoseSource + ?Sized>(source: &S, config: &ExportConfig) -> Result<Vec<ClipPlan>> {
    let mut plans = Vec::new();
    for clip in config.included_clips() {
        let (action_start, action_end) =
            source
                .action_frame_range(&clip.action)
                .ok_or_else(|| ExportError::UnknownAction {
                    name: clip.action.clone(),
                })?;
        let (start, end) = if clip.use_full_range {
            (action_start, action_end)
        } else {
            let end = if clip.custom_end != 0 {
                clip.custom_end
            } else {
                action_end
            };
            (clip.custom_start, end)
        };
        let window = FrameWindow::new(start, end, clip.frame_step, config.export_all_frames);
        let frames = window.frames(&clip.action)?;
        debug!(clip = %clip.action, start, end, frames = frames.len(), "planned clip");
        plans.push(ClipPlan {
            name: clip.action.clone(),
            action: clip.action.clone(),
            window,
            frames,
        });
    }
    if plans.is_empty() {
        return Err(ExportError::NoClipsSelected);
    }
    Ok(plans)
}

/// Size of a multi export before any pose is sampled.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExportEstimate {
    pub num_bones: usize,
    pub main_frames: usize,
    pub transition_pairs: usize,
    pub transition_frames: usize,
    /// Rest frame + main frames + transition frames.
    pub total_frames: usize,
    /// `transition_pairs * 10 * num_bones * 16`
    pub transition_floats: usize,
    pub total_floats: usize,
    pub total_bytes: usize,
}

impl ExportEstimate {
    pub fn for_plans(plans: &[ClipPlan], num_bones: usize) -> Self {
        let main_frames: usize = plans.iter().map(ClipPlan::frame_count).sum();
        let transition_pairs = transition_pair_count(plans.len());
        let transition_frames = transition_pairs * TRANSITION_FRAMES as usize;
        let total_frames = 1 + main_frames + transition_frames;
        let floats_per_frame = num_bones * FLOATS_PER_BONE;
        let total_floats = total_frames * floats_per_frame;
        Self {
            num_bones,
            main_frames,
            transition_pairs,
            transition_frames,
            total_frames,
            transition_floats: transition_frames * floats_per_frame,
            total_floats,
            total_bytes: total_floats * std::mem::size_of::<f32>(),
        }
    }
}

/// Plan and estimate in one call.
pub fn estimate_export<S: PoseSource + ?Sized>(
    source: &S,
    config: &ExportConfig,
) -> Result<ExportEstimate> {
    let plans = plan_clips(source, config)?;
    Ok(ExportEstimate::for_plans(&plans, source.bone_names().len()))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn plan(name: &str, frames: usize) -> ClipPlan {
        let end = frames as u32;
        ClipPlan {
            name: name.into(),
            action: name.into(),
            window: FrameWindow::new(1, end, 1, false),
            frames: (1..=end).collect(),
        }
    }

    #[test]
    fn estimate_counts_rest_main_and_transitions() {
        let plans = vec![plan("A", 3), plan("B", 5), plan("C", 2)];
        let est = ExportEstimate::for_plans(&plans, 4);
        assert_eq!(est.main_frames, 10);
        assert_eq!(est.transition_pairs, 6);
        assert_eq!(est.transition_frames, 60);
        assert_eq!(est.total_frames, 71);
        assert_eq!(est.transition_floats, 6 * 10 * 4 * 16);
        assert_eq!(est.total_floats, 71 * 4 * 16);
        assert_eq!(est.total_bytes, est.total_floats * 4);
    }

    #[test]
    fn single_clip_has_no_transitions() {
        let est = ExportEstimate::for_plans(&[plan("A", 3)], 2);
        assert_eq!(est.transition_pairs, 0);
        assert_eq!(est.total_frames, 4);
    }
}
