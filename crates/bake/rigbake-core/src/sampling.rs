//! Frame-index selection for a clip window.
//!
//! Model:
//! - `all_frames` selects every integer frame in `[start, end]`; the step is ignored.
//! - Otherwise frames are `start, start + step, ...` up to `end`, and `end` is
//!   appended when the stride skips it. The last inter-frame gap can therefore be
//!   shorter than `step`; the terminal pose is always sampled.

use serde::{Deserialize, Serialize};

use crate::error::{ExportError, Result};

/// Frame sequence for `[start, end]` sampled every `step` frames.
///
/// `clip` only labels the error.
pub fn sample_frames_for(
    clip: &str,
    start: u32,
    end: u32,
    step: u32,
    all_frames: bool,
) -> Result<Vec<u32>> {
    if start > end {
        return Err(ExportError::invalid_range(clip, start, end));
    }
    if all_frames {
        return Ok((start..=end).collect());
    }
    if step == 0 {
        return Err(ExportError::InvalidStep {
            clip: clip.to_string(),
        });
    }
    let mut frames: Vec<u32> = (start..=end).step_by(step as usize).collect();
    if frames.last() != Some(&end) {
        frames.push(end);
    }
    Ok(frames)
}

/// Unlabelled form of [`sample_frames_for`].
pub fn sample_frames(start: u32, end: u32, step: u32, all_frames: bool) -> Result<Vec<u32>> {
    sample_frames_for("", start, end, step, all_frames)
}

/// A resolved sampling window; the value form of the sampler inputs.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FrameWindow {
    pub start: u32,
    pub end: u32,
    pub step: u32,
    pub all_frames: bool,
}

impl FrameWindow {
    pub fn new(start: u32, end: u32, step: u32, all_frames: bool) -> Self {
        Self {
            start,
            end,
            step,
            all_frames,
        }
    }

    /// Step recorded in the descriptor: 1 whenever every frame is taken.
    #[inline]
    pub fn effective_step(&self) -> u32 {
        if self.all_frames {
            1
        } else {
            self.step
        }
    }

    pub fn frames(&self, clip: &str) -> Result<Vec<u32>> {
        sample_frames_for(clip, self.start, self.end, self.step, self.all_frames)
    }
}
