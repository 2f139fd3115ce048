//! glTF skeletal animation conversion.
//!
//! Walks the skin's joint list in order: each joint gets its inverse bind
//! pose and the index of its parent within the same list (-1 for the
//! root). Channel keys append verbatim to the owning joint's
//! position/rotation/scale track as `(x, y, z[, w], time)` tuples; the
//! clip's duration is the maximum channel input time.

use std::path::Path;

use anyhow::{bail, Context, Result};
use hashbrown::HashMap;

use boreal_common::{NbrAnimation, NbrJoint};

/// Default frame rate stamped on exported clips.
pub const DEFAULT_FRAME_RATE: f32 = 30.0;

/// Convert one animation clip from a glTF/GLB file.
///
/// `animation_index` selects the clip (first when `None`); `frame_rate` is
/// recorded in the payload for playback pacing.
pub fn convert_gltf_animation(
    input: &Path,
    animation_index: Option<usize>,
    frame_rate: Option<f32>,
) -> Result<NbrAnimation> {
    let (document, buffers, _images) =
        gltf::import(input).with_context(|| format!("failed to load glTF '{}'", input.display()))?;

    let skin = document
        .skins()
        .next()
        .context("no skins found in glTF file")?;

    let animation = match animation_index {
        Some(index) => document
            .animations()
            .nth(index)
            .with_context(|| format!("animation index {index} not found in glTF"))?,
        None => document
            .animations()
            .next()
            .context("no animations found in glTF file")?,
    };

    // Joint order is the skin's joint list; parents resolve within it.
    let joint_nodes: Vec<gltf::Node> = skin.joints().collect();
    if joint_nodes.len() > u16::MAX as usize {
        bail!("skin has {} joints, the format caps at 65535", joint_nodes.len());
    }

    let joint_slot: HashMap<usize, usize> = joint_nodes
        .iter()
        .enumerate()
        .map(|(slot, node)| (node.index(), slot))
        .collect();

    // glTF stores children, not parents; invert the scene graph once.
    let mut parent_of: HashMap<usize, usize> = HashMap::new();
    for node in document.nodes() {
        for child in node.children() {
            parent_of.insert(child.index(), node.index());
        }
    }

    let skin_reader = skin.reader(|buffer| Some(&buffers[buffer.index()]));
    let inverse_binds: Vec<[[f32; 4]; 4]> = match skin_reader.read_inverse_bind_matrices() {
        Some(matrices) => matrices.collect(),
        None => vec![[[0.0; 4]; 4]; joint_nodes.len()],
    };
    if inverse_binds.len() < joint_nodes.len() {
        bail!("skin is missing inverse bind matrices");
    }

    let mut joints: Vec<NbrJoint> = joint_nodes
        .iter()
        .enumerate()
        .map(|(slot, node)| {
            let parent_index = parent_of
                .get(&node.index())
                .and_then(|parent| joint_slot.get(parent))
                .map(|&parent_slot| parent_slot as i16)
                .unwrap_or(-1);

            let mut inverse_bind_pose = [0f32; 16];
            for (column, values) in inverse_binds[slot].iter().enumerate() {
                inverse_bind_pose[column * 4..column * 4 + 4].copy_from_slice(values);
            }

            NbrJoint {
                parent_index,
                inverse_bind_pose,
                ..Default::default()
            }
        })
        .collect();

    let mut duration = 0f32;
    for channel in animation.channels() {
        let Some(&slot) = joint_slot.get(&channel.target().node().index()) else {
            continue;
        };

        let reader = channel.reader(|buffer| Some(&buffers[buffer.index()]));
        let times: Vec<f32> = reader
            .read_inputs()
            .context("animation channel has no input accessor")?
            .collect();
        if let Some(&last) = times.last() {
            duration = duration.max(last);
        }

        let Some(outputs) = reader.read_outputs() else {
            continue;
        };

        let joint = &mut joints[slot];
        match outputs {
            gltf::animation::util::ReadOutputs::Translations(values) => {
                for (value, &time) in values.zip(times.iter()) {
                    joint.positions.push([value[0], value[1], value[2], time]);
                }
            }
            gltf::animation::util::ReadOutputs::Rotations(values) => {
                for (value, &time) in values.into_f32().zip(times.iter()) {
                    joint
                        .rotations
                        .push([value[0], value[1], value[2], value[3], time]);
                }
            }
            gltf::animation::util::ReadOutputs::Scales(values) => {
                for (value, &time) in values.zip(times.iter()) {
                    joint.scales.push([value[0], value[1], value[2], time]);
                }
            }
            gltf::animation::util::ReadOutputs::MorphTargetWeights(_) => {}
        }
    }

    if duration <= 0.0 {
        bail!("animation has zero duration");
    }

    let animation_name = animation.name().unwrap_or("unnamed");
    tracing::info!(
        "converted animation '{animation_name}': {} joints, {duration:.2}s",
        joints.len()
    );

    Ok(NbrAnimation {
        joints,
        duration,
        frame_rate: frame_rate.unwrap_or(DEFAULT_FRAME_RATE),
    })
}

/// Log the animations a glTF file offers.
pub fn list_animations(input: &Path) -> Result<()> {
    let (document, _buffers, _images) =
        gltf::import(input).with_context(|| format!("failed to load glTF '{}'", input.display()))?;

    let animations: Vec<_> = document.animations().collect();
    if animations.is_empty() {
        tracing::info!("no animations found in '{}'", input.display());
        return Ok(());
    }

    tracing::info!("animations in '{}':", input.display());
    for (index, animation) in animations.iter().enumerate() {
        tracing::info!(
            "  [{index}] '{}': {} channels",
            animation.name().unwrap_or("unnamed"),
            animation.channels().count()
        );
    }
    Ok(())
}
