use rigbake_core::{
    export_single, parse_stored_rig_json, serialize::single_descriptor_json, ExportConfig,
    ExportError, PoseSource, StoredRig,
};

fn approx(a: f32, b: f32, eps: f32) {
    assert!((a - b).abs() <= eps, "left={a} right={b} eps={eps}");
}

fn two_clip_rig() -> StoredRig {
    let json = rigbake_test_fixtures::rigs::json("two-clip").expect("load two-clip fixture");
    parse_stored_rig_json(&json).expect("parse two-clip rig")
}

fn single(start: u32, end: u32, step: u32) -> ExportConfig {
    let mut config = ExportConfig::default();
    config.single.start_frame = start;
    config.single.end_frame = end;
    config.single.frame_step = step;
    config
}

#[test]
fn stepped_window_samples_start_step_and_end() {
    let mut rig = two_clip_rig();
    let baked = export_single(&mut rig, &single(1, 5, 2)).expect("single export");
    let desc = &baked.descriptor;

    assert_eq!(desc.name, "Idle");
    assert_eq!(desc.num_frames, 3);
    assert_eq!(desc.num_bones(), 2);
    assert_eq!(baked.buffer.len(), 96);
    assert_eq!(desc.base_filename(), "Idle_f1_5_n3_s2");

    // Idle root translation is +x by frame number: 1, 3, 5.
    for (i, expected) in [1.0, 3.0, 5.0].into_iter().enumerate() {
        approx(baked.buffer.frame(i).unwrap()[12], expected, 1e-6);
    }

    assert_eq!(&rig.frame_log()[..3], &[1, 3, 5]);
    assert_eq!(rig.current_frame(), 7);
}

#[test]
fn all_frames_ignores_the_step() {
    let mut rig = two_clip_rig();
    let mut config = single(1, 4, 3);
    config.single.export_all_frames = true;
    let baked = export_single(&mut rig, &config).expect("single export");
    assert_eq!(baked.descriptor.num_frames, 4);
    assert_eq!(baked.descriptor.base_filename(), "Idle_f1_4_n4");
    assert_eq!(&rig.frame_log()[..4], &[1, 2, 3, 4]);
}

#[test]
fn non_dividing_step_still_ends_on_the_last_frame() {
    let mut rig = two_clip_rig();
    let baked = export_single(&mut rig, &single(1, 5, 3)).expect("single export");
    assert_eq!(baked.descriptor.num_frames, 3);
    approx(baked.buffer.frame(2).unwrap()[12], 5.0, 1e-6);
}

#[test]
fn zero_bounds_fall_back_to_the_scene_range() {
    let mut rig = two_clip_rig();
    let baked = export_single(&mut rig, &single(0, 0, 8)).expect("single export");
    let desc = &baked.descriptor;
    assert_eq!((desc.start_frame, desc.end_frame), (1, 24));
    // 1, 9, 17, 24
    assert_eq!(desc.num_frames, 4);
}

#[test]
fn full_range_uses_the_active_action() {
    let mut rig = two_clip_rig();
    let mut config = single(3, 3, 1);
    config.single.use_full_range = true;
    let baked = export_single(&mut rig, &config).expect("single export");
    assert_eq!((baked.descriptor.start_frame, baked.descriptor.end_frame), (1, 5));
    assert_eq!(baked.descriptor.num_frames, 5);
}

#[test]
fn custom_name_overrides_the_action_name() {
    let mut rig = two_clip_rig();
    let mut config = single(1, 2, 1);
    config.single.use_custom_name = true;
    config.single.animation_name = "hello".into();
    let baked = export_single(&mut rig, &config).expect("single export");
    assert_eq!(baked.descriptor.name, "hello");

    let json = single_descriptor_json(&baked.descriptor);
    assert_eq!(json["name"], "hello");
    assert_eq!(json["numFrames"], 2);
}

#[test]
fn naming_and_range_errors() {
    let json = rigbake_test_fixtures::rigs::json("spin-scene-zero").expect("load spin fixture");
    let mut rig = parse_stored_rig_json(&json).expect("parse spin rig");

    // No active action and no name to fall back on.
    assert_eq!(
        export_single(&mut rig, &single(0, 8, 1)).unwrap_err(),
        ExportError::AmbiguousName
    );

    let mut full = single(0, 8, 1);
    full.single.animation_name = "spin".into();
    full.single.use_full_range = true;
    assert_eq!(
        export_single(&mut rig, &full).unwrap_err(),
        ExportError::NoActiveAction
    );

    let mut backwards = single(6, 2, 1);
    backwards.single.animation_name = "spin".into();
    assert_eq!(
        export_single(&mut rig, &backwards).unwrap_err(),
        ExportError::invalid_range("spin", 6, 2)
    );

    let mut zero_step = single(0, 8, 0);
    zero_step.single.animation_name = "spin".into();
    assert!(matches!(
        export_single(&mut rig, &zero_step).unwrap_err(),
        ExportError::InvalidStep { .. }
    ));

    assert!(rig.frame_log().is_empty());
}
