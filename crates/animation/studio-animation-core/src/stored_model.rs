//! Parse StoredModel-style JSON (see fixtures/models/*.json) into a
//! `ModelData` asset: skeleton, sequence catalog, pose-parameter
//! declarations.
//!
//! Notes:
//! - Bones and channels reference each other by name in the JSON; indices
//!   are resolved here so the runtime never touches strings per frame.
//! - Pose axes name their parameter; unknown names are a parse error (the
//!   asset is malformed, not a runtime edge case).

use serde::Deserialize;

use crate::instance::ModelData;
use crate::pose::PoseParamDecl;
use crate::sequence::{
    BoneChannel, MotionSample, MotionTrack, PoseAxis, Sequence, SequenceCatalog, SequenceVariant,
};
use crate::skeleton::{Bone, Skeleton};
use studio_api_core::math::{Quat, Vec3, QUAT_IDENTITY, VEC3_ZERO};
use studio_api_core::BoneTransform;

/// Parse a stored model JSON document into a frozen `ModelData`.
pub fn parse_stored_model_json(s: &str) -> Result<ModelData, String> {
    let sm: StoredModel = serde_json::from_str(s).map_err(|e| format!("parse error: {e}"))?;

    let bones: Vec<Bone> = sm
        .bones
        .iter()
        .map(|b| {
            let parent = match &b.parent {
                Some(name) => Some(
                    sm.bones
                        .iter()
                        .position(|p| &p.name == name)
                        .ok_or_else(|| format!("bone '{}' has unknown parent '{name}'", b.name))?,
                ),
                None => None,
            };
            Ok(Bone {
                name: b.name.clone(),
                parent,
                bind: b.bind.as_ref().map(to_transform).unwrap_or_default(),
            })
        })
        .collect::<Result<_, String>>()?;
    let skeleton = Skeleton::new(bones).map_err(|e| e.to_string())?;

    let pose_params: Vec<PoseParamDecl> = sm
        .pose_parameters
        .into_iter()
        .map(|p| PoseParamDecl {
            name: p.name,
            min: p.min as f32,
            max: p.max as f32,
            default: p.default as f32,
        })
        .collect();

    let mut sequences = Vec::with_capacity(sm.sequences.len());
    for ss in sm.sequences {
        let axis = match ss.axis {
            Some(a) => {
                let param = pose_params
                    .iter()
                    .position(|p| p.name == a.param)
                    .ok_or_else(|| {
                        format!("sequence '{}' blends unknown parameter '{}'", ss.name, a.param)
                    })?;
                Some(PoseAxis {
                    param,
                    anchors: a.anchors.into_iter().map(|v| v as f32).collect(),
                })
            }
            None => None,
        };

        let mut variants = Vec::with_capacity(ss.variants.len());
        for sv in ss.variants {
            let mut channels = Vec::with_capacity(sv.channels.len());
            for ch in sv.channels {
                let bone = skeleton.find_bone(&ch.bone).ok_or_else(|| {
                    format!("sequence '{}' animates unknown bone '{}'", ss.name, ch.bone)
                })?;
                channels.push(BoneChannel {
                    bone,
                    frames: ch.frames.iter().map(to_transform).collect(),
                });
            }
            variants.push(SequenceVariant { channels });
        }

        if let Some(axis) = &axis {
            if axis.anchors.len() != variants.len() {
                return Err(format!(
                    "sequence '{}' declares {} anchors but {} variants",
                    ss.name,
                    axis.anchors.len(),
                    variants.len()
                ));
            }
        }

        sequences.push(Sequence {
            name: ss.name,
            fps: ss.fps as f32,
            frame_count: ss.frame_count,
            looping: ss.looping,
            axis,
            variants,
            motion: ss.motion.map(|m| MotionTrack {
                keys: m
                    .keys
                    .into_iter()
                    .map(|k| MotionSample {
                        pos: to_vec3(&k.pos),
                        yaw_deg: k.yaw_deg as f32,
                    })
                    .collect(),
            }),
        });
    }

    Ok(ModelData {
        name: sm.name,
        skeleton,
        sequences: SequenceCatalog::new(sequences),
        pose_params,
    })
}

fn to_vec3(v: &[f64]) -> Vec3 {
    let mut out = VEC3_ZERO;
    for (o, x) in out.iter_mut().zip(v.iter()) {
        *o = *x as f32;
    }
    out
}

fn to_quat(v: &[f64]) -> Quat {
    let mut out = QUAT_IDENTITY;
    for (o, x) in out.iter_mut().zip(v.iter()) {
        *o = *x as f32;
    }
    out
}

fn to_transform(t: &SmTransform) -> BoneTransform {
    BoneTransform {
        pos: t.pos.as_deref().map(to_vec3).unwrap_or(VEC3_ZERO),
        rot: t.rot.as_deref().map(to_quat).unwrap_or(QUAT_IDENTITY),
    }
}

// ----- JSON schema (serde) -----

#[derive(Debug, Deserialize)]
struct StoredModel {
    pub name: String,
    pub bones: Vec<SmBone>,
    #[serde(default)]
    #[serde(rename = "poseParameters")]
    pub pose_parameters: Vec<SmPoseParam>,
    #[serde(default)]
    pub sequences: Vec<SmSequence>,
}

#[derive(Debug, Deserialize)]
struct SmBone {
    pub name: String,
    #[serde(default)]
    pub parent: Option<String>,
    #[serde(default)]
    pub bind: Option<SmTransform>,
}

#[derive(Debug, Deserialize)]
struct SmTransform {
    #[serde(default)]
    pub pos: Option<Vec<f64>>,
    #[serde(default)]
    pub rot: Option<Vec<f64>>,
}

#[derive(Debug, Deserialize)]
struct SmPoseParam {
    pub name: String,
    pub min: f64,
    pub max: f64,
    #[serde(default)]
    pub default: f64,
}

#[derive(Debug, Deserialize)]
struct SmSequence {
    pub name: String,
    pub fps: f64,
    #[serde(rename = "frameCount")]
    pub frame_count: u32,
    #[serde(default)]
    pub looping: bool,
    #[serde(default)]
    pub axis: Option<SmAxis>,
    pub variants: Vec<SmVariant>,
    #[serde(default)]
    pub motion: Option<SmMotion>,
}

#[derive(Debug, Deserialize)]
struct SmAxis {
    pub param: String,
    pub anchors: Vec<f64>,
}

#[derive(Debug, Deserialize)]
struct SmVariant {
    pub channels: Vec<SmChannel>,
}

#[derive(Debug, Deserialize)]
struct SmChannel {
    pub bone: String,
    pub frames: Vec<SmTransform>,
}

#[derive(Debug, Deserialize)]
struct SmMotion {
    pub keys: Vec<SmMotionKey>,
}

#[derive(Debug, Deserialize)]
struct SmMotionKey {
    #[serde(default)]
    pub pos: Vec<f64>,
    #[serde(default)]
    #[serde(rename = "yawDeg")]
    pub yaw_deg: f64,
}
