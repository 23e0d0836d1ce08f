use std::sync::Arc;

use criterion::{black_box, criterion_group, criterion_main, Criterion};

use studio_animation_core::{
    Bone, BoneChannel, BoneTransform, Config, ModelData, Sequence, SequenceCatalog,
    SequenceVariant, Skeleton, StudioInstance,
};

/// Synthetic chain skeleton with one looping sequence driving every bone.
fn chain_model(bones: usize, frames: usize) -> Arc<ModelData> {
    let skeleton = Skeleton::new(
        (0..bones)
            .map(|i| Bone {
                name: format!("bone{i}"),
                parent: if i == 0 { None } else { Some(i - 1) },
                bind: BoneTransform::new([0.0, 0.0, 1.0], [0.0, 0.0, 0.0, 1.0]),
            })
            .collect(),
    )
    .expect("chain skeleton builds");

    let channels = (0..bones)
        .map(|bone| BoneChannel {
            bone,
            frames: (0..frames)
                .map(|f| {
                    let z = 1.0 + (f as f32 / frames as f32).sin() * 0.1;
                    BoneTransform::new([0.0, 0.0, z], [0.0, 0.0, 0.0, 1.0])
                })
                .collect(),
        })
        .collect();

    let seq = Sequence {
        name: "cycle".into(),
        fps: 30.0,
        frame_count: frames as u32,
        looping: true,
        axis: None,
        variants: vec![SequenceVariant { channels }],
        motion: None,
    };

    Arc::new(ModelData {
        name: "chain".into(),
        skeleton,
        sequences: SequenceCatalog::new(vec![seq]),
        pose_params: vec![],
    })
}

fn bench_update(c: &mut Criterion) {
    let mut group = c.benchmark_group("instance_update");
    for bones in [16usize, 64, 256] {
        let mut inst = StudioInstance::new(chain_model(bones, 31), Config::default());
        // Warm the scratch buffers so the loop measures the steady state.
        inst.update(0.016);
        group.bench_function(format!("{bones}_bones"), |b| {
            b.iter(|| {
                let out = inst.update(black_box(0.016));
                black_box(out.bone_to_world.len())
            })
        });
    }
    group.finish();
}

fn bench_update_with_overlays(c: &mut Criterion) {
    let mut inst = StudioInstance::new(chain_model(64, 31), Config::default());
    for i in 0..4 {
        let h = inst.add_layer(i).expect("slot free");
        inst.set_overlay_sequence(h, 0, 0.5);
    }
    inst.update(0.016);
    c.bench_function("instance_update/64_bones_4_overlays", |b| {
        b.iter(|| {
            let out = inst.update(black_box(0.016));
            black_box(out.bone_to_world.len())
        })
    });
}

criterion_group!(benches, bench_update, bench_update_with_overlays);
criterion_main!(benches);
