use std::sync::Arc;

use studio_animation_core::{
    parse_stored_model_json, AxisBlend, Config, ModelData, PoseAxis, PoseParamDecl, PoseParamSet,
    StudioInstance,
};

fn biped() -> Arc<ModelData> {
    let json = studio_test_fixtures::models::json("biped").expect("fixture");
    Arc::new(parse_stored_model_json(&json).expect("biped parses"))
}

fn turn_set() -> PoseParamSet {
    PoseParamSet::new(&[PoseParamDecl {
        name: "turn".into(),
        min: -1.0,
        max: 1.0,
        default: 0.0,
    }])
}

#[test]
fn set_clamps_into_declared_range_and_reports_it() {
    let mut pose = turn_set();
    assert_eq!(pose.set(0, 5.0), 1.0);
    assert_eq!(pose.get(0), 1.0);
    assert_eq!(pose.set(0, -3.0), -1.0);
    assert_eq!(pose.get(0), -1.0);
    assert_eq!(pose.range(0), Some((-1.0, 1.0)));
    assert_eq!(pose.lookup("turn"), Some(0));
    assert_eq!(pose.lookup("lean"), None);
}

#[test]
fn unknown_index_is_a_quiet_no_op() {
    let mut pose = turn_set();
    assert_eq!(pose.set(7, 0.25), 0.25);
    assert_eq!(pose.get(7), 0.0);
    assert_eq!(pose.range(7), None);
}

#[test]
fn no_axis_or_single_anchor_blends_wholly() {
    let pose = turn_set();
    assert_eq!(pose.resolve_blend(None), AxisBlend::WHOLE);
    let single = PoseAxis {
        param: 0,
        anchors: vec![0.0],
    };
    assert_eq!(pose.resolve_blend(Some(&single)), AxisBlend::WHOLE);
}

#[test]
fn mid_span_value_picks_the_bracketing_anchors() {
    let mut pose = turn_set();
    let axis = PoseAxis {
        param: 0,
        anchors: vec![-1.0, 0.0, 1.0],
    };
    pose.set(0, 0.5);
    let blend = pose.resolve_blend(Some(&axis));
    assert_eq!((blend.lo, blend.hi), (1, 2));
    assert!((blend.frac - 0.5).abs() < 1e-6);

    pose.set(0, -0.25);
    let blend = pose.resolve_blend(Some(&axis));
    assert_eq!((blend.lo, blend.hi), (0, 1));
    assert!((blend.frac - 0.75).abs() < 1e-6);
}

#[test]
fn values_at_or_past_the_ends_pin_to_the_end_anchors() {
    let mut pose = turn_set();
    let axis = PoseAxis {
        param: 0,
        anchors: vec![-1.0, 0.0, 1.0],
    };
    pose.set(0, -1.0);
    let blend = pose.resolve_blend(Some(&axis));
    assert_eq!((blend.lo, blend.hi, blend.frac), (0, 0, 0.0));

    pose.set(0, 1.0);
    let blend = pose.resolve_blend(Some(&axis));
    assert_eq!((blend.lo, blend.hi, blend.frac), (2, 2, 0.0));
}

#[test]
fn instance_pose_parameter_api_round_trips() {
    let mut inst = StudioInstance::new(biped(), Config::default());
    let turn = inst.lookup_pose_parameter("turn").expect("declared");
    assert_eq!(inst.set_pose_parameter(turn, 2.0), 1.0);
    assert_eq!(inst.pose_parameter(turn), 1.0);
    assert_eq!(inst.set_pose_parameter_by_name("turn", -0.5), Some(-0.5));
    assert_eq!(inst.set_pose_parameter_by_name("missing", 0.5), None);
    assert_eq!(inst.pose_parameter_range(turn), Some((-1.0, 1.0)));
}

#[test]
fn turn_parameter_blends_the_spine_between_variants() {
    // turn_walk anchors the spine at -45/0/+45 degrees across turn in [-1,1].
    let mut inst = StudioInstance::new(biped(), Config::default());
    inst.set_blend_time(0.0);
    inst.set_sequence_by_name("turn_walk").expect("exists");
    inst.set_pose_parameter_by_name("turn", 0.5);
    inst.update(0.0);

    let spine = inst.skeleton().find_bone("spine").expect("spine");
    let m = inst.bone_to_world()[spine];
    // Halfway between the middle and right anchors: 22.5 degrees of yaw.
    let expected = 22.5f32.to_radians();
    assert!((m[0][0] - expected.cos()).abs() < 1e-4, "got {}", m[0][0]);
    assert!((m[1][0] - expected.sin()).abs() < 1e-4, "got {}", m[1][0]);
}

#[test]
fn turn_extremes_pin_to_the_outer_variants() {
    let mut inst = StudioInstance::new(biped(), Config::default());
    inst.set_blend_time(0.0);
    inst.set_sequence_by_name("turn_walk").expect("exists");
    inst.set_pose_parameter_by_name("turn", -1.0);
    inst.update(0.0);

    let spine = inst.skeleton().find_bone("spine").expect("spine");
    let m = inst.bone_to_world()[spine];
    let expected = (-45.0f32).to_radians();
    assert!((m[1][0] - expected.sin()).abs() < 1e-4, "got {}", m[1][0]);
}
