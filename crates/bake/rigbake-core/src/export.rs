//! Export entry points.
//!
//! Order of a multi export:
//! 1. plan clips and log the size estimate (no timeline access)
//! 2. rest pose, one frame
//! 3. main clips in selection order, active action repointed per clip
//! 4. transitions for every ordered pair of distinct clips
//! 5. registry -> descriptor
//!
//! Steps 2–4 run inside a [`HostStateGuard`], so the host's current frame and
//! active action are restored however the run ends. Output is only written by
//! [`Exporter::run`], after the buffer and descriptor are complete.

use serde::{Deserialize, Serialize};
use tracing::{debug, error, info};

use crate::config::{ExportConfig, ExportMode, ExportRequest, ExportTarget};
use crate::coords::CoordinateTransform;
use crate::descriptor::{ExportDescriptor, SingleClipDescriptor};
use crate::error::{ExportError, Result};
use crate::host::{HostStateGuard, Notifier, PoseSource, PropertyStore, Severity};
use crate::interp::{LinearPoseInterpolator, PoseInterpolator};
use crate::packing::MatrixBuffer;
use crate::plan::{plan_clips, ExportEstimate};
use crate::registry::{ClipKind, ClipRecord, ClipRegistry};
use crate::sampling::sample_frames_for;
use crate::serialize::{
    export_dir, render_descriptor, render_single_descriptor, write_bundle, write_properties,
    write_single_properties, BundlePaths,
};
use crate::transition::{
    transition_name, transition_pairs, TransitionSynthesizer, TRANSITION_FRAMES, TRANSITION_STEP,
};

/// Result of a multi export, still in memory.
#[derive(Clone, Debug, PartialEq)]
pub struct MultiExport {
    pub descriptor: ExportDescriptor,
    pub buffer: MatrixBuffer,
    pub estimate: ExportEstimate,
}

/// Result of a single-clip export, still in memory.
#[derive(Clone, Debug, PartialEq)]
pub struct SingleExport {
    pub descriptor: SingleClipDescriptor,
    pub buffer: MatrixBuffer,
}

/// What [`Exporter::run`] reports back to its caller.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExportReport {
    pub message: String,
    pub mode: ExportMode,
    pub target: ExportTarget,
    pub total_frames: usize,
    pub num_bones: usize,
    /// Empty for single-clip exports.
    pub records: Vec<ClipRecord>,
    pub files: Option<BundlePaths>,
    pub estimate: Option<ExportEstimate>,
}

/// Bakes poses from a [`PoseSource`] into a matrix buffer and descriptor.
#[derive(Clone, Debug)]
pub struct Exporter<I = LinearPoseInterpolator> {
    transform: CoordinateTransform,
    interpolator: I,
}

impl Default for Exporter<LinearPoseInterpolator> {
    fn default() -> Self {
        Self::new(LinearPoseInterpolator)
    }
}

impl<I: PoseInterpolator> Exporter<I> {
    pub fn new(interpolator: I) -> Self {
        Self {
            transform: CoordinateTransform::z_up_to_y_up(),
            interpolator,
        }
    }

    pub fn with_transform(mut self, transform: CoordinateTransform) -> Self {
        self.transform = transform;
        self
    }

    pub fn transform(&self) -> &CoordinateTransform {
        &self.transform
    }

    pub fn export_multi<S: PoseSource + ?Sized>(
        &self,
        source: &mut S,
        config: &ExportConfig,
    ) -> Result<MultiExport> {
        let unit = config.unit_name.as_str();
        let bone_names = source.bone_names();
        let num_bones = bone_names.len();

        let plans = plan_clips(&*source, config)?;
        let estimate = ExportEstimate::for_plans(&plans, num_bones);
        info!(
            unit,
            clips = plans.len(),
            transition_pairs = estimate.transition_pairs,
            total_frames = estimate.total_frames,
            transition_floats = estimate.transition_floats,
            total_bytes = estimate.total_bytes,
            "starting multi export"
        );

        let mut host = HostStateGuard::acquire(source);
        let mut registry = ClipRegistry::new();
        let mut buffer = MatrixBuffer::with_frame_capacity(num_bones, estimate.total_frames);

        let (scene_start, _) = host.scene_frame_range();
        let rest_frame = if scene_start == 0 { 0 } else { 1 };
        let rest = host.sample_at(rest_frame)?;
        buffer.push_pose(&rest, &self.transform)?;
        registry.push(
            format!("{unit}Rest"),
            ClipKind::Rest,
            1,
            1,
            (rest_frame, rest_frame),
        );

        for plan in &plans {
            host.set_active_action(Some(plan.action.as_str()))?;
            for &frame in &plan.frames {
                let sampled = host.sample_at(frame)?;
                buffer.push_pose(&sampled, &self.transform)?;
            }
            let record = registry.push(
                plan.name.clone(),
                ClipKind::Main,
                plan.frame_count(),
                plan.window.effective_step(),
                (plan.window.start, plan.window.end),
            );
            debug!(
                clip = %record.name,
                start_index = record.start_index,
                end_index = record.end_index,
                "baked clip"
            );
        }

        let synthesizer = TransitionSynthesizer::new(&self.interpolator);
        for (src, dst) in transition_pairs(&plans) {
            let name = transition_name(&src.name, &dst.name);

            host.set_active_action(Some(src.action.as_str()))?;
            let source_end = host.sample_at(src.last_frame())?;
            host.set_active_action(Some(dst.action.as_str()))?;
            let destination_start = host.sample_at(dst.first_frame())?;

            let frames = synthesizer.synthesize(&source_end, &destination_start)?;
            for sampled in &frames {
                buffer.push_pose(sampled, &self.transform)?;
            }
            let record = registry.push(
                name,
                ClipKind::Transition,
                frames.len(),
                TRANSITION_STEP,
                (1, TRANSITION_FRAMES),
            );
            debug!(
                transition = %record.name,
                start_index = record.start_index,
                end_index = record.end_index,
                "baked transition"
            );
        }
        drop(host);

        let adjacency = registry.build_adjacency(unit);
        let descriptor = ExportDescriptor::new(unit, bone_names, registry.into_records(), adjacency);
        debug_assert_eq!(buffer.len(), descriptor.expected_float_count());
        info!(
            unit,
            sequences = descriptor.animation_count(),
            total_frames = descriptor.total_frames,
            bones = num_bones,
            "multi export baked"
        );

        Ok(MultiExport {
            descriptor,
            buffer,
            estimate,
        })
    }

    pub fn export_single<S: PoseSource + ?Sized>(
        &self,
        source: &mut S,
        config: &ExportConfig,
    ) -> Result<SingleExport> {
        let settings = &config.single;
        let active = source.active_action().filter(|a| !a.is_empty());

        let name = match (&active, settings.use_custom_name) {
            (Some(action), false) => action.clone(),
            _ if !settings.animation_name.is_empty() => settings.animation_name.clone(),
            _ => return Err(ExportError::AmbiguousName),
        };

        let (start, end) = if settings.use_full_range {
            let action = active.as_deref().ok_or(ExportError::NoActiveAction)?;
            let (_, action_end) =
                source
                    .action_frame_range(action)
                    .ok_or_else(|| ExportError::UnknownAction {
                        name: action.to_string(),
                    })?;
            (1, action_end)
        } else {
            let (scene_start, scene_end) = source.scene_frame_range();
            let start = if settings.start_frame != 0 {
                settings.start_frame
            } else {
                scene_start
            };
            let end = if settings.end_frame != 0 {
                settings.end_frame
            } else {
                scene_end
            };
            (start, end)
        };

        let frames = sample_frames_for(
            &name,
            start,
            end,
            settings.frame_step,
            settings.export_all_frames,
        )?;
        let bone_names = source.bone_names();
        info!(clip = %name, start, end, frames = frames.len(), "starting single export");

        let mut host = HostStateGuard::acquire(source);
        let mut buffer = MatrixBuffer::with_frame_capacity(bone_names.len(), frames.len());
        for &frame in &frames {
            let sampled = host.sample_at(frame)?;
            buffer.push_pose(&sampled, &self.transform)?;
        }
        drop(host);

        Ok(SingleExport {
            descriptor: SingleClipDescriptor {
                name,
                bone_names,
                num_frames: frames.len(),
                start_frame: start,
                end_frame: end,
                frame_step: settings.frame_step,
                export_all_frames: settings.export_all_frames,
            },
            buffer,
        })
    }

    /// Top-level entry: bake, write to the configured target, and report the
    /// outcome through `notifier`. Errors are reported and then returned.
    pub fn run<A, N>(
        &self,
        armature: Option<&mut A>,
        notifier: &mut N,
        request: &ExportRequest,
    ) -> Result<ExportReport>
    where
        A: PoseSource + PropertyStore + ?Sized,
        N: Notifier + ?Sized,
    {
        let result = self.run_inner(armature, request);
        match &result {
            Ok(report) => notifier.notify(&report.message, Severity::Info),
            Err(err) => {
                let prefix = match request.config.mode {
                    ExportMode::Multi => "Multi-export failed",
                    ExportMode::Single => "Export failed",
                };
                let message = format!("{prefix}: {err}");
                error!(category = err.category(), "{message}");
                notifier.notify(&message, Severity::Error);
            }
        }
        result
    }

    fn run_inner<A>(&self, armature: Option<&mut A>, request: &ExportRequest) -> Result<ExportReport>
    where
        A: PoseSource + PropertyStore + ?Sized,
    {
        let armature = armature.ok_or(ExportError::MissingArmature)?;
        let config = &request.config;
        let document_path = match config.target {
            ExportTarget::BinaryFile => Some(
                request
                    .document_path
                    .as_deref()
                    .ok_or(ExportError::UnsavedDocument)?,
            ),
            ExportTarget::Property => None,
        };

        match config.mode {
            ExportMode::Multi => {
                let baked = self.export_multi(&mut *armature, config)?;
                let desc = &baked.descriptor;
                let (files, message) = match document_path {
                    Some(path) => {
                        let script = render_descriptor(desc)?;
                        let base = format!("{}_animations", config.unit_name);
                        let paths = write_bundle(&export_dir(path), &base, &baked.buffer, &script)?;
                        let message = format!(
                            "Exported {} sequences ({} total frames) with {} bones to:\n{}\nJavaScript helper: {}",
                            desc.animation_count(),
                            desc.total_frames,
                            desc.num_bones(),
                            paths.binary.display(),
                            paths.script.display()
                        );
                        (Some(paths), message)
                    }
                    None => {
                        write_properties(desc, &baked.buffer, &config.property_name, armature)?;
                        let message = format!(
                            "Stored {} sequences ({} total frames) with {} bones in armature custom property '{}'",
                            desc.animation_count(),
                            desc.total_frames,
                            desc.num_bones(),
                            config.property_name
                        );
                        (None, message)
                    }
                };
                Ok(ExportReport {
                    message,
                    mode: config.mode,
                    target: config.target,
                    total_frames: desc.total_frames,
                    num_bones: desc.num_bones(),
                    records: desc.records.clone(),
                    files,
                    estimate: Some(baked.estimate),
                })
            }
            ExportMode::Single => {
                let baked = self.export_single(&mut *armature, config)?;
                let desc = &baked.descriptor;
                let (files, message) = match document_path {
                    Some(path) => {
                        let script = render_single_descriptor(desc)?;
                        let paths = write_bundle(
                            &export_dir(path),
                            &desc.base_filename(),
                            &baked.buffer,
                            &script,
                        )?;
                        let message = format!(
                            "Exported {} frames with {} bones to:\n{}\nJavaScript helper: {}",
                            desc.num_frames,
                            desc.num_bones(),
                            paths.binary.display(),
                            paths.script.display()
                        );
                        (Some(paths), message)
                    }
                    None => {
                        write_single_properties(
                            desc,
                            &baked.buffer,
                            &config.property_name,
                            armature,
                        )?;
                        let message = format!(
                            "Stored {} frames with {} bones in armature custom property '{}'",
                            desc.num_frames,
                            desc.num_bones(),
                            config.property_name
                        );
                        (None, message)
                    }
                };
                Ok(ExportReport {
                    message,
                    mode: config.mode,
                    target: config.target,
                    total_frames: desc.num_frames,
                    num_bones: desc.num_bones(),
                    records: Vec::new(),
                    files,
                    estimate: None,
                })
            }
        }
    }
}

/// [`Exporter::export_multi`] with the default transform and linear interpolation.
pub fn export_multi<S: PoseSource + ?Sized>(source: &mut S, config: &ExportConfig) -> Result<MultiExport> {
    Exporter::default().export_multi(source, config)
}

/// [`Exporter::export_single`] with the default transform.
pub fn export_single<S: PoseSource + ?Sized>(
    source: &mut S,
    config: &ExportConfig,
) -> Result<SingleExport> {
    Exporter::default().export_single(source, config)
}

/// [`Exporter::run`] with the default transform and linear interpolation.
pub fn run_export<A, N>(
    armature: Option<&mut A>,
    notifier: &mut N,
    request: &ExportRequest,
) -> Result<ExportReport>
where
    A: PoseSource + PropertyStore + ?Sized,
    N: Notifier + ?Sized,
{
    Exporter::default().run(armature, notifier, request)
}
