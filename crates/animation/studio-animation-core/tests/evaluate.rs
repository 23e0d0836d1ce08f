use std::sync::Arc;

use studio_animation_core::{
    parse_stored_model_json, Bone, BonePostProcessor, BoneTransform, Config, ModelData, Placement,
    SequenceCatalog, Skeleton, StudioInstance,
};

fn biped() -> Arc<ModelData> {
    let json = studio_test_fixtures::models::json("biped").expect("fixture");
    Arc::new(parse_stored_model_json(&json).expect("biped parses"))
}

/// root -> head chain with no sequences: every bone holds its bind pose, so
/// aim adjustments are directly observable.
fn bare_chain() -> Arc<ModelData> {
    let skeleton = Skeleton::new(vec![
        Bone {
            name: "root".into(),
            parent: None,
            bind: BoneTransform::IDENTITY,
        },
        Bone {
            name: "head".into(),
            parent: Some(0),
            bind: BoneTransform::new([0.0, 0.0, 40.0], [0.0, 0.0, 0.0, 1.0]),
        },
    ])
    .expect("skeleton builds");
    Arc::new(ModelData {
        name: "chain".into(),
        skeleton,
        sequences: SequenceCatalog::new(vec![]),
        pose_params: vec![],
    })
}

fn origin(m: &[[f32; 4]; 3]) -> [f32; 3] {
    [m[0][3], m[1][3], m[2][3]]
}

#[test]
fn identical_inputs_produce_identical_outputs() {
    let model = biped();
    let mut a = StudioInstance::new(model.clone(), Config::default());
    let mut b = StudioInstance::new(model, Config::default());
    for inst in [&mut a, &mut b] {
        inst.set_pose_parameter_by_name("turn", 0.3);
        inst.update(0.016);
        inst.update(0.016);
        inst.update(0.1);
    }
    // Bit-for-bit: same model, same ops, same floats.
    assert_eq!(a.bone_to_world(), b.bone_to_world());
    assert_eq!(a.last_movement(), b.last_movement());
}

#[test]
fn undriven_bones_fall_back_to_bind_pose() {
    // wave only animates the head; root and spine must sit at bind.
    let mut inst = StudioInstance::new(biped(), Config::default());
    inst.set_blend_time(0.0);
    inst.set_sequence_by_name("wave").expect("exists");
    inst.update(0.0);

    let out = inst.bone_to_world();
    assert_eq!(origin(&out[0]), [0.0, 0.0, 0.0]);
    assert_eq!(origin(&out[1]), [0.0, 0.0, 20.0]);
    // head bind offset stacks on the spine: 20 + 24.
    assert_eq!(origin(&out[2]), [0.0, 0.0, 44.0]);
}

#[test]
fn hierarchy_accumulates_parent_before_child() {
    // walk at cycle 0.5 puts the root at the top of its bob (z = 2).
    let mut inst = StudioInstance::new(biped(), Config::default());
    inst.update(0.5);

    let out = inst.bone_to_world();
    let root = origin(&out[0]);
    let spine = origin(&out[1]);
    let head = origin(&out[2]);
    assert!((root[2] - 2.0).abs() < 1e-4);
    assert!((spine[2] - 22.0).abs() < 1e-4);
    assert!((head[2] - 46.0).abs() < 1e-4);
}

#[test]
fn placement_composes_onto_every_root() {
    let mut inst = StudioInstance::new(biped(), Config::default());
    inst.set_placement(Placement {
        origin: [5.0, -3.0, 1.0],
        yaw_deg: 90.0,
    });
    inst.update(0.0);

    let out = inst.bone_to_world();
    let root = origin(&out[0]);
    assert!((root[0] - 5.0).abs() < 1e-4);
    assert!((root[1] + 3.0).abs() < 1e-4);
    assert!((root[2] - 1.0).abs() < 1e-4);
    // The yaw shows up in the root basis.
    assert!(out[0][0][0].abs() < 1e-5);
    assert!((out[0][1][0] - 1.0).abs() < 1e-5);
}

#[test]
fn empty_skeleton_is_reported_not_ready() {
    let model = Arc::new(ModelData {
        name: "void".into(),
        skeleton: Skeleton::new(vec![]).expect("empty skeleton builds"),
        sequences: SequenceCatalog::new(vec![]),
        pose_params: vec![],
    });
    let mut inst = StudioInstance::new(model, Config::default());
    let out = inst.update(0.016);
    assert!(!out.is_ready());
    assert!(out.bone_to_world.is_empty());
    assert!(out.bbox.is_none());
}

#[test]
fn bbox_spans_the_evaluated_bone_origins() {
    let mut inst = StudioInstance::new(biped(), Config::default());
    inst.update(0.0);
    let bbox = inst.bbox().expect("skeleton evaluated");
    assert_eq!(bbox.mins, [0.0, 0.0, 0.0]);
    assert_eq!(bbox.maxs, [0.0, 0.0, 44.0]);
}

#[test]
fn look_target_turn_is_rate_limited() {
    let mut inst = StudioInstance::new(bare_chain(), Config::default());
    inst.set_look_chain_by_names(&["head"]);
    // Target at +Y, 90 degrees away, limited to 90 deg/s.
    inst.set_look_target([0.0, 100.0, 0.0], 90.0);

    inst.update(0.5);
    let m = inst.bone_to_world()[1];
    let sin45 = 45.0f32.to_radians().sin();
    assert!((m[1][0] - sin45).abs() < 1e-4, "first tick: got {}", m[1][0]);

    inst.update(0.5);
    let m = inst.bone_to_world()[1];
    assert!((m[1][0] - 1.0).abs() < 1e-4, "second tick: got {}", m[1][0]);

    // Converged; further ticks hold the aim.
    inst.update(0.5);
    let m = inst.bone_to_world()[1];
    assert!((m[1][0] - 1.0).abs() < 1e-4);
}

#[test]
fn look_turn_is_distributed_along_the_chain() {
    let mut inst = StudioInstance::new(biped(), Config::default());
    inst.set_look_chain_by_names(&["spine", "head"]);
    inst.set_look_target([0.0, 100.0, 0.0], 720.0);
    // walk does not rotate the spine at cycle 0, so the shares are visible.
    inst.update(1.0);

    let out = inst.bone_to_world();
    let sin45 = 45.0f32.to_radians().sin();
    let spine = out[1];
    let head = out[2];
    assert!((spine[1][0] - sin45).abs() < 1e-3, "spine {}", spine[1][0]);
    assert!((head[1][0] - 1.0).abs() < 1e-3, "head {}", head[1][0]);
}

#[test]
fn clearing_the_look_target_drops_the_turn() {
    let mut inst = StudioInstance::new(bare_chain(), Config::default());
    inst.set_look_chain_by_names(&["head"]);
    inst.set_look_target([0.0, 100.0, 0.0], 360.0);
    inst.update(1.0);
    assert!(inst.bone_to_world()[1][1][0].abs() > 0.9);

    inst.clear_look_target();
    inst.update(0.016);
    assert!(inst.bone_to_world()[1][1][0].abs() < 1e-5);
}

#[test]
fn target_straight_above_holds_the_current_yaw() {
    let mut inst = StudioInstance::new(bare_chain(), Config::default());
    inst.set_look_chain_by_names(&["head"]);
    // Directly above the head: yaw is undefined, so nothing turns.
    inst.set_look_target([0.0, 0.0, 1000.0], 360.0);
    inst.update(1.0);
    assert!(inst.bone_to_world()[1][1][0].abs() < 1e-6);
}

struct RootLift;

impl BonePostProcessor for RootLift {
    fn process(&mut self, _skeleton: &Skeleton, locals: &mut [BoneTransform]) {
        if let Some(root) = locals.first_mut() {
            root.pos[2] += 1.0;
        }
    }
}

#[test]
fn post_processor_runs_before_the_hierarchy_walk() {
    let mut inst = StudioInstance::new(biped(), Config::default());
    inst.set_post_processor(Some(Box::new(RootLift)));
    inst.update(0.0);

    let out = inst.bone_to_world();
    // The lift propagates to every descendant of the root.
    assert!((origin(&out[0])[2] - 1.0).abs() < 1e-5);
    assert!((origin(&out[2])[2] - 45.0).abs() < 1e-5);
}

#[test]
fn sequence_change_ramps_over_the_blend_time() {
    let mut inst = StudioInstance::new(biped(), Config::default());
    inst.update(0.3);
    inst.set_sequence_by_name("wave").expect("exists");
    assert!(inst.transition_amount() < 1e-6);

    // Default blend time is 0.2 s; halfway there after 0.1 s.
    inst.update(0.1);
    assert!((inst.transition_amount() - 0.5).abs() < 1e-5);
    let set = inst.build_blend_set();
    assert_eq!(set.len(), 2);
    assert_eq!(set[0].sequence, 0); // held walk pose
    assert!((set[0].weight - 1.0).abs() < 1e-6);
    assert!((set[1].weight - 0.5).abs() < 1e-6);

    // Past the blend window the previous pose is released.
    inst.update(0.2);
    assert_eq!(inst.transition_amount(), 1.0);
    assert_eq!(inst.build_blend_set().len(), 1);
}
