//! Transition synthesis: fixed-length baked clips bridging the end of one clip
//! to the start of another, so the runtime never has to blend.

use tracing::debug;

use crate::error::{ExportError, Result};
use crate::host::SampledPose;
use crate::interp::PoseInterpolator;

/// Positions per transition clip. Fixed; not part of the configuration.
pub const TRANSITION_FRAMES: u32 = 10;

/// Bridging step. Only 1 is supported; see [`transition_frames`].
pub const TRANSITION_STEP: u32 = 1;

/// Token between source and destination in a transition clip name.
pub const TRANSITION_SEPARATOR: &str = "_To_";

/// `"{source}_To_{destination}"`
pub fn transition_name(source: &str, destination: &str) -> String {
    format!("{source}{TRANSITION_SEPARATOR}{destination}")
}

/// Positions `1..=TRANSITION_FRAMES` to bake.
///
/// `step` is a reserved hook: values other than [`TRANSITION_STEP`] are
/// accepted and ignored, so every position is always emitted.
pub fn transition_frames(step: u32) -> Vec<u32> {
    if step != TRANSITION_STEP {
        debug!(step, "bridging step is not supported, baking every position");
    }
    (1..=TRANSITION_FRAMES).collect()
}

/// Ordered `(source, destination)` pairs: sources outer, destinations inner,
/// self-pairs skipped. Clips are compared by position, so repeated names still pair.
pub fn transition_pairs<T>(clips: &[T]) -> Vec<(&T, &T)> {
    let mut pairs = Vec::with_capacity(clips.len() * clips.len().saturating_sub(1));
    for (i, src) in clips.iter().enumerate() {
        for (j, dst) in clips.iter().enumerate() {
            if i != j {
                pairs.push((src, dst));
            }
        }
    }
    pairs
}

/// Number of ordered pairs for `n` included clips.
#[inline]
pub fn transition_pair_count(n: usize) -> usize {
    n * n.saturating_sub(1)
}

/// Bakes transition positions from two captured endpoint poses.
pub struct TransitionSynthesizer<'a, I: PoseInterpolator + ?Sized> {
    interpolator: &'a I,
    step: u32,
}

impl<'a, I: PoseInterpolator + ?Sized> TransitionSynthesizer<'a, I> {
    pub fn new(interpolator: &'a I) -> Self {
        Self {
            interpolator,
            step: TRANSITION_STEP,
        }
    }

    /// Reserved; see [`transition_frames`].
    pub fn with_step(mut self, step: u32) -> Self {
        self.step = step;
        self
    }

    /// Sampled positions, first and last always included.
    pub fn positions(&self) -> Vec<u32> {
        transition_frames(self.step)
    }

    /// Position 1 is `source_end` verbatim, position 10 is `destination_start`
    /// verbatim, positions in between sit at `t = (k - 1) / 9`.
    pub fn synthesize(
        &self,
        source_end: &SampledPose,
        destination_start: &SampledPose,
    ) -> Result<Vec<SampledPose>> {
        let expected = source_end.pose.bone_count();
        let actual = destination_start.pose.bone_count();
        if expected != actual {
            return Err(ExportError::BoneCountMismatch { expected, actual });
        }

        let last = TRANSITION_FRAMES;
        let span = (last - 1) as f32;
        let mut frames = Vec::with_capacity(last as usize);
        for k in self.positions() {
            let pose = if k == 1 {
                source_end.clone()
            } else if k == last {
                destination_start.clone()
            } else {
                let t = (k - 1) as f32 / span;
                self.interpolator
                    .interpolate_sampled(source_end, destination_start, t)
            };
            frames.push(pose);
        }
        Ok(frames)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::host::Pose;
    use crate::interp::LinearPoseInterpolator;
    use nalgebra::{Matrix4, Vector3};

    fn translated(x: f32) -> SampledPose {
        SampledPose::new(
            Matrix4::identity(),
            Pose::new(vec![Matrix4::new_translation(&Vector3::new(x, 0.0, 0.0))]),
        )
    }

    #[test]
    fn names_use_separator() {
        assert_eq!(transition_name("Walk", "Run"), "Walk_To_Run");
    }

    #[test]
    fn pairs_are_source_major_and_skip_self() {
        let clips = ["A", "B", "C"];
        let pairs: Vec<(&str, &str)> = transition_pairs(&clips)
            .into_iter()
            .map(|(a, b)| (*a, *b))
            .collect();
        assert_eq!(
            pairs,
            vec![
                ("A", "B"),
                ("A", "C"),
                ("B", "A"),
                ("B", "C"),
                ("C", "A"),
                ("C", "B")
            ]
        );
        assert_eq!(transition_pair_count(3), 6);
        assert_eq!(transition_pair_count(1), 0);
        assert_eq!(transition_pair_count(0), 0);
    }

    #[test]
    fn always_ten_positions() {
        assert_eq!(transition_frames(TRANSITION_STEP), (1..=10).collect::<Vec<_>>());
        // unsupported step is a no-op
        assert_eq!(transition_frames(3).len(), 10);
    }

    #[test]
    fn endpoints_are_exact_and_interior_is_linear() {
        let interp = LinearPoseInterpolator;
        let synth = TransitionSynthesizer::new(&interp);
        let src = translated(0.0);
        let dst = translated(9.0);
        let frames = synth.synthesize(&src, &dst).unwrap();
        assert_eq!(frames.len(), 10);
        assert_eq!(frames[0], src);
        assert_eq!(frames[9], dst);
        for (i, f) in frames.iter().enumerate() {
            let x = f.pose.bones[0][(0, 3)];
            assert!((x - i as f32).abs() < 1e-5, "position {} x={x}", i + 1);
        }
    }

    #[test]
    fn mismatched_bone_counts_are_rejected() {
        let interp = LinearPoseInterpolator;
        let synth = TransitionSynthesizer::new(&interp);
        let src = translated(0.0);
        let dst = SampledPose::new(Matrix4::identity(), Pose::new(vec![]));
        assert!(matches!(
            synth.synthesize(&src, &dst),
            Err(ExportError::BoneCountMismatch { .. })
        ));
    }
}
