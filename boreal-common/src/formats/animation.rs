//! NBR skeletal animation payload.
//!
//! # Layout
//! ```text
//! joints_count u16
//! per joint:
//!     parent_index      i16   (-1 for the root)
//!     inverse_bind_pose [f32; 16]
//!     positions_count   u16
//!     positions         positions_count × (x, y, z, time) f32
//!     rotations_count   u16
//!     rotations         rotations_count × (x, y, z, w, time) f32
//!     scales_count      u16
//!     scales            scales_count × (x, y, z, time) f32
//! duration   f32
//! frame_rate f32
//! ```

use std::io::{Read, Write};

use crate::io::{BinaryRead, BinaryWrite};
use crate::NbrError;

/// One joint: hierarchy link, bind pose, and its three keyed tracks.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct NbrJoint {
    pub parent_index: i16,
    pub inverse_bind_pose: [f32; 16],
    /// `(x, y, z, time)` samples.
    pub positions: Vec<[f32; 4]>,
    /// `(x, y, z, w, time)` samples.
    pub rotations: Vec<[f32; 5]>,
    /// `(x, y, z, time)` samples.
    pub scales: Vec<[f32; 4]>,
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct NbrAnimation {
    pub joints: Vec<NbrJoint>,
    pub duration: f32,
    pub frame_rate: f32,
}

fn write_track<W: Write, const N: usize>(
    w: &mut W,
    track: &[[f32; N]],
) -> Result<(), NbrError> {
    if track.len() > u16::MAX as usize {
        return Err(NbrError::Malformed("animation track has too many keys"));
    }
    w.write_u16(track.len() as u16)?;
    for key in track {
        w.write_f32_slice(key)?;
    }
    Ok(())
}

fn read_track<R: Read, const N: usize>(r: &mut R) -> Result<Vec<[f32; N]>, NbrError> {
    let count = r.read_u16()? as usize;
    let mut track = Vec::with_capacity(count);
    for _ in 0..count {
        let mut key = [0f32; N];
        for v in &mut key {
            *v = r.read_f32()?;
        }
        track.push(key);
    }
    Ok(track)
}

impl NbrJoint {
    fn write_into<W: Write>(&self, w: &mut W) -> Result<(), NbrError> {
        w.write_i16(self.parent_index)?;
        w.write_f32_slice(&self.inverse_bind_pose)?;
        write_track(w, &self.positions)?;
        write_track(w, &self.rotations)?;
        write_track(w, &self.scales)
    }

    fn read_from<R: Read>(r: &mut R) -> Result<Self, NbrError> {
        let parent_index = r.read_i16()?;

        let mut inverse_bind_pose = [0f32; 16];
        for v in &mut inverse_bind_pose {
            *v = r.read_f32()?;
        }

        Ok(Self {
            parent_index,
            inverse_bind_pose,
            positions: read_track(r)?,
            rotations: read_track(r)?,
            scales: read_track(r)?,
        })
    }
}

impl NbrAnimation {
    pub(crate) fn write_into<W: Write>(&self, w: &mut W) -> Result<(), NbrError> {
        if self.joints.len() > u16::MAX as usize {
            return Err(NbrError::Malformed("animation has too many joints"));
        }

        w.write_u16(self.joints.len() as u16)?;
        for joint in &self.joints {
            joint.write_into(w)?;
        }
        w.write_f32(self.duration)?;
        w.write_f32(self.frame_rate)
    }

    pub(crate) fn read_from<R: Read>(r: &mut R) -> Result<Self, NbrError> {
        let joints_count = r.read_u16()? as usize;
        let mut joints = Vec::with_capacity(joints_count);
        for _ in 0..joints_count {
            joints.push(NbrJoint::read_from(r)?);
        }

        Ok(Self {
            joints,
            duration: r.read_f32()?,
            frame_rate: r.read_f32()?,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    #[test]
    fn roundtrip_two_joints() {
        let mut bind = [0f32; 16];
        bind[0] = 1.0;
        bind[5] = 1.0;
        bind[10] = 1.0;
        bind[15] = 1.0;

        let animation = NbrAnimation {
            joints: vec![
                NbrJoint {
                    parent_index: -1,
                    inverse_bind_pose: bind,
                    positions: vec![[0.0, 0.0, 0.0, 0.0], [0.0, 1.0, 0.0, 0.5]],
                    rotations: vec![[0.0, 0.0, 0.0, 1.0, 0.0]],
                    scales: vec![[1.0, 1.0, 1.0, 0.0]],
                },
                NbrJoint {
                    parent_index: 0,
                    inverse_bind_pose: bind,
                    positions: vec![],
                    rotations: vec![[0.0, 0.7071, 0.0, 0.7071, 0.25]],
                    scales: vec![],
                },
            ],
            duration: 0.5,
            frame_rate: 30.0,
        };

        let mut buf = Vec::new();
        animation.write_into(&mut buf).unwrap();

        let parsed = NbrAnimation::read_from(&mut Cursor::new(buf)).unwrap();
        assert_eq!(parsed, animation);
        assert_eq!(parsed.joints[1].parent_index, 0);
    }

    #[test]
    fn empty_animation_roundtrip() {
        let animation = NbrAnimation {
            joints: vec![],
            duration: 0.0,
            frame_rate: 30.0,
        };
        let mut buf = Vec::new();
        animation.write_into(&mut buf).unwrap();
        assert_eq!(
            NbrAnimation::read_from(&mut Cursor::new(buf)).unwrap(),
            animation
        );
    }
}
