//! Engine value types with byte codecs.
//!
//! These are the types scene files (`.nscn`) persist through the byte I/O
//! layer. Each `write_bytes`/`read_bytes` pair is the authoritative
//! round-trip definition for its type; fields serialize in declaration
//! order, little-endian, packed.

use std::io::{Read, Write};

use glam::{Quat, Vec3};

use crate::io::{BinaryRead, BinaryWrite};
use crate::NbrError;

fn write_vec3<W: Write>(w: &mut W, v: Vec3) -> Result<(), NbrError> {
    w.write_f32(v.x)?;
    w.write_f32(v.y)?;
    w.write_f32(v.z)
}

fn read_vec3<R: Read>(r: &mut R) -> Result<Vec3, NbrError> {
    Ok(Vec3::new(r.read_f32()?, r.read_f32()?, r.read_f32()?))
}

fn write_quat<W: Write>(w: &mut W, q: Quat) -> Result<(), NbrError> {
    w.write_f32(q.x)?;
    w.write_f32(q.y)?;
    w.write_f32(q.z)?;
    w.write_f32(q.w)
}

fn read_quat<R: Read>(r: &mut R) -> Result<Quat, NbrError> {
    Ok(Quat::from_xyzw(
        r.read_f32()?,
        r.read_f32()?,
        r.read_f32()?,
        r.read_f32()?,
    ))
}

/// World placement of an entity.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Transform {
    pub position: Vec3,
    pub rotation: Quat,
    pub scale: Vec3,
}

impl Default for Transform {
    fn default() -> Self {
        Self {
            position: Vec3::ZERO,
            rotation: Quat::IDENTITY,
            scale: Vec3::ONE,
        }
    }
}

impl Transform {
    pub fn write_bytes<W: Write>(&self, w: &mut W) -> Result<(), NbrError> {
        write_vec3(w, self.position)?;
        write_quat(w, self.rotation)?;
        write_vec3(w, self.scale)
    }

    pub fn read_bytes<R: Read>(r: &mut R) -> Result<Self, NbrError> {
        Ok(Self {
            position: read_vec3(r)?,
            rotation: read_quat(r)?,
            scale: read_vec3(r)?,
        })
    }
}

/// Free camera state as the renderer consumes it.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Camera {
    pub position: Vec3,
    pub target: Vec3,
    pub up: Vec3,
    pub yaw: f32,
    pub pitch: f32,
    pub zoom: f32,
    pub near: f32,
    pub far: f32,
}

impl Default for Camera {
    fn default() -> Self {
        Self {
            position: Vec3::ZERO,
            target: Vec3::NEG_Z,
            up: Vec3::Y,
            yaw: -90.0,
            pitch: 0.0,
            zoom: 45.0,
            near: 0.1,
            far: 100.0,
        }
    }
}

impl Camera {
    pub fn write_bytes<W: Write>(&self, w: &mut W) -> Result<(), NbrError> {
        write_vec3(w, self.position)?;
        write_vec3(w, self.target)?;
        write_vec3(w, self.up)?;
        w.write_f32(self.yaw)?;
        w.write_f32(self.pitch)?;
        w.write_f32(self.zoom)?;
        w.write_f32(self.near)?;
        w.write_f32(self.far)
    }

    pub fn read_bytes<R: Read>(r: &mut R) -> Result<Self, NbrError> {
        Ok(Self {
            position: read_vec3(r)?,
            target: read_vec3(r)?,
            up: read_vec3(r)?,
            yaw: r.read_f32()?,
            pitch: r.read_f32()?,
            zoom: r.read_f32()?,
            near: r.read_f32()?,
            far: r.read_f32()?,
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DirectionalLight {
    pub direction: Vec3,
    pub color: Vec3,
}

impl DirectionalLight {
    pub fn write_bytes<W: Write>(&self, w: &mut W) -> Result<(), NbrError> {
        write_vec3(w, self.direction)?;
        write_vec3(w, self.color)
    }

    pub fn read_bytes<R: Read>(r: &mut R) -> Result<Self, NbrError> {
        Ok(Self {
            direction: read_vec3(r)?,
            color: read_vec3(r)?,
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PointLight {
    pub position: Vec3,
    pub color: Vec3,
    pub radius: f32,
    pub fall_off: f32,
}

impl PointLight {
    pub fn write_bytes<W: Write>(&self, w: &mut W) -> Result<(), NbrError> {
        write_vec3(w, self.position)?;
        write_vec3(w, self.color)?;
        w.write_f32(self.radius)?;
        w.write_f32(self.fall_off)
    }

    pub fn read_bytes<R: Read>(r: &mut R) -> Result<Self, NbrError> {
        Ok(Self {
            position: read_vec3(r)?,
            color: read_vec3(r)?,
            radius: r.read_f32()?,
            fall_off: r.read_f32()?,
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SpotLight {
    pub position: Vec3,
    pub direction: Vec3,
    pub color: Vec3,
    pub radius: f32,
    pub outer_radius: f32,
}

impl SpotLight {
    pub fn write_bytes<W: Write>(&self, w: &mut W) -> Result<(), NbrError> {
        write_vec3(w, self.position)?;
        write_vec3(w, self.direction)?;
        write_vec3(w, self.color)?;
        w.write_f32(self.radius)?;
        w.write_f32(self.outer_radius)
    }

    pub fn read_bytes<R: Read>(r: &mut R) -> Result<Self, NbrError> {
        Ok(Self {
            position: read_vec3(r)?,
            direction: read_vec3(r)?,
            color: read_vec3(r)?,
            radius: r.read_f32()?,
            outer_radius: r.read_f32()?,
        })
    }
}

/// Everything the renderer needs for one frame's pass setup.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FrameData {
    pub camera: Camera,
    pub ambient: Vec3,
}

impl FrameData {
    pub fn write_bytes<W: Write>(&self, w: &mut W) -> Result<(), NbrError> {
        self.camera.write_bytes(w)?;
        write_vec3(w, self.ambient)
    }

    pub fn read_bytes<R: Read>(r: &mut R) -> Result<Self, NbrError> {
        Ok(Self {
            camera: Camera::read_bytes(r)?,
            ambient: read_vec3(r)?,
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AudioSourceDesc {
    pub volume: f32,
    pub pitch: f32,
    pub is_looping: bool,
    pub position: Vec3,
    pub velocity: Vec3,
    pub direction: Vec3,
}

impl Default for AudioSourceDesc {
    fn default() -> Self {
        Self {
            volume: 1.0,
            pitch: 1.0,
            is_looping: false,
            position: Vec3::ZERO,
            velocity: Vec3::ZERO,
            direction: Vec3::ZERO,
        }
    }
}

impl AudioSourceDesc {
    pub fn write_bytes<W: Write>(&self, w: &mut W) -> Result<(), NbrError> {
        w.write_f32(self.volume)?;
        w.write_f32(self.pitch)?;
        w.write_u8(self.is_looping as u8)?;
        write_vec3(w, self.position)?;
        write_vec3(w, self.velocity)?;
        write_vec3(w, self.direction)
    }

    pub fn read_bytes<R: Read>(r: &mut R) -> Result<Self, NbrError> {
        Ok(Self {
            volume: r.read_f32()?,
            pitch: r.read_f32()?,
            is_looping: r.read_u8()? != 0,
            position: read_vec3(r)?,
            velocity: read_vec3(r)?,
            direction: read_vec3(r)?,
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AudioListenerDesc {
    pub volume: f32,
    pub position: Vec3,
    pub velocity: Vec3,
}

impl Default for AudioListenerDesc {
    fn default() -> Self {
        Self {
            volume: 1.0,
            position: Vec3::ZERO,
            velocity: Vec3::ZERO,
        }
    }
}

impl AudioListenerDesc {
    pub fn write_bytes<W: Write>(&self, w: &mut W) -> Result<(), NbrError> {
        w.write_f32(self.volume)?;
        write_vec3(w, self.position)?;
        write_vec3(w, self.velocity)
    }

    pub fn read_bytes<R: Read>(r: &mut R) -> Result<Self, NbrError> {
        Ok(Self {
            volume: r.read_f32()?,
            position: read_vec3(r)?,
            velocity: read_vec3(r)?,
        })
    }
}

/// How a physics body participates in the simulation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum PhysicsBodyType {
    Static = 0,
    Dynamic = 1,
    Kinematic = 2,
}

impl PhysicsBodyType {
    fn from_byte(b: u8) -> Result<Self, NbrError> {
        Ok(match b {
            0 => Self::Static,
            1 => Self::Dynamic,
            2 => Self::Kinematic,
            _ => return Err(NbrError::Malformed("unknown physics body type")),
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PhysicsBodyDesc {
    pub position: Vec3,
    pub body_type: PhysicsBodyType,
    pub mass: f32,
    pub restitution: f32,
    pub friction: f32,
    pub is_awake: bool,
}

impl PhysicsBodyDesc {
    pub fn write_bytes<W: Write>(&self, w: &mut W) -> Result<(), NbrError> {
        write_vec3(w, self.position)?;
        w.write_u8(self.body_type as u8)?;
        w.write_f32(self.mass)?;
        w.write_f32(self.restitution)?;
        w.write_f32(self.friction)?;
        w.write_u8(self.is_awake as u8)
    }

    pub fn read_bytes<R: Read>(r: &mut R) -> Result<Self, NbrError> {
        Ok(Self {
            position: read_vec3(r)?,
            body_type: PhysicsBodyType::from_byte(r.read_u8()?)?,
            mass: r.read_f32()?,
            restitution: r.read_f32()?,
            friction: r.read_f32()?,
            is_awake: r.read_u8()? != 0,
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ColliderDesc {
    pub extents: Vec3,
    pub offset: Vec3,
    pub friction: f32,
    pub density: f32,
    pub is_sensor: bool,
}

impl ColliderDesc {
    pub fn write_bytes<W: Write>(&self, w: &mut W) -> Result<(), NbrError> {
        write_vec3(w, self.extents)?;
        write_vec3(w, self.offset)?;
        w.write_f32(self.friction)?;
        w.write_f32(self.density)?;
        w.write_u8(self.is_sensor as u8)
    }

    pub fn read_bytes<R: Read>(r: &mut R) -> Result<Self, NbrError> {
        Ok(Self {
            extents: read_vec3(r)?,
            offset: read_vec3(r)?,
            friction: r.read_f32()?,
            density: r.read_f32()?,
            is_sensor: r.read_u8()? != 0,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    #[test]
    fn transform_roundtrip() {
        let transform = Transform {
            position: Vec3::new(1.0, 2.0, 3.0),
            rotation: Quat::from_rotation_y(0.5),
            scale: Vec3::splat(2.0),
        };

        let mut buf = Vec::new();
        transform.write_bytes(&mut buf).unwrap();
        assert_eq!(buf.len(), 40);
        assert_eq!(
            Transform::read_bytes(&mut Cursor::new(buf)).unwrap(),
            transform
        );
    }

    #[test]
    fn camera_roundtrip() {
        let camera = Camera {
            position: Vec3::new(0.0, 5.0, 10.0),
            pitch: -15.0,
            ..Default::default()
        };

        let mut buf = Vec::new();
        camera.write_bytes(&mut buf).unwrap();
        assert_eq!(Camera::read_bytes(&mut Cursor::new(buf)).unwrap(), camera);
    }

    #[test]
    fn light_roundtrips() {
        let mut buf = Vec::new();
        let dir = DirectionalLight {
            direction: Vec3::new(0.0, -1.0, 0.2),
            color: Vec3::ONE,
        };
        dir.write_bytes(&mut buf).unwrap();

        let point = PointLight {
            position: Vec3::new(4.0, 1.0, 0.0),
            color: Vec3::new(1.0, 0.6, 0.3),
            radius: 8.0,
            fall_off: 1.5,
        };
        point.write_bytes(&mut buf).unwrap();

        let spot = SpotLight {
            position: Vec3::ZERO,
            direction: Vec3::NEG_Y,
            color: Vec3::ONE,
            radius: 12.5,
            outer_radius: 17.5,
        };
        spot.write_bytes(&mut buf).unwrap();

        let mut cur = Cursor::new(buf);
        assert_eq!(DirectionalLight::read_bytes(&mut cur).unwrap(), dir);
        assert_eq!(PointLight::read_bytes(&mut cur).unwrap(), point);
        assert_eq!(SpotLight::read_bytes(&mut cur).unwrap(), spot);
    }

    #[test]
    fn audio_descs_roundtrip() {
        let source = AudioSourceDesc {
            volume: 0.8,
            pitch: 1.2,
            is_looping: true,
            position: Vec3::new(1.0, 0.0, -1.0),
            ..Default::default()
        };
        let listener = AudioListenerDesc {
            volume: 0.5,
            ..Default::default()
        };

        let mut buf = Vec::new();
        source.write_bytes(&mut buf).unwrap();
        listener.write_bytes(&mut buf).unwrap();

        let mut cur = Cursor::new(buf);
        assert_eq!(AudioSourceDesc::read_bytes(&mut cur).unwrap(), source);
        assert_eq!(AudioListenerDesc::read_bytes(&mut cur).unwrap(), listener);
    }

    #[test]
    fn physics_descs_roundtrip() {
        let body = PhysicsBodyDesc {
            position: Vec3::new(0.0, 3.0, 0.0),
            body_type: PhysicsBodyType::Dynamic,
            mass: 2.5,
            restitution: 0.4,
            friction: 0.7,
            is_awake: true,
        };
        let collider = ColliderDesc {
            extents: Vec3::splat(0.5),
            offset: Vec3::ZERO,
            friction: 0.7,
            density: 1.0,
            is_sensor: false,
        };

        let mut buf = Vec::new();
        body.write_bytes(&mut buf).unwrap();
        collider.write_bytes(&mut buf).unwrap();

        let mut cur = Cursor::new(buf);
        assert_eq!(PhysicsBodyDesc::read_bytes(&mut cur).unwrap(), body);
        assert_eq!(ColliderDesc::read_bytes(&mut cur).unwrap(), collider);
    }
}
