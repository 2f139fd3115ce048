//! Ad-hoc scene files (`.nscn`).
//!
//! Built entirely on the value codecs in `boreal_common::values`. The
//! format is engine-build-local: the only guarantee is that the same build
//! reads back exactly what it wrote.
//!
//! # Layout
//! ```text
//! magic "NSCN" [u8; 4]
//! frame data
//! has_directional u8 (+ directional light)
//! point_lights_count  u32 + point lights
//! spot_lights_count   u32 + spot lights
//! transforms_count    u32 + transforms
//! bodies_count        u32 + (physics body desc, collider desc) pairs
//! ```

use std::io::{BufReader, BufWriter, Read, Write};
use std::path::Path;

use boreal_common::io::{open_file, BinaryRead, BinaryWrite, OpenMode};
use boreal_common::values::{
    AudioListenerDesc, ColliderDesc, DirectionalLight, FrameData, PhysicsBodyDesc, PointLight,
    SpotLight, Transform,
};
use boreal_common::NbrError;

const SCENE_MAGIC: &[u8; 4] = b"NSCN";

/// A saved scene: frame setup, lights, entity transforms, and physics
/// bodies.
#[derive(Debug, Clone, PartialEq)]
pub struct Scene {
    pub frame: FrameData,
    pub listener: AudioListenerDesc,
    pub directional_light: Option<DirectionalLight>,
    pub point_lights: Vec<PointLight>,
    pub spot_lights: Vec<SpotLight>,
    pub transforms: Vec<Transform>,
    pub bodies: Vec<(PhysicsBodyDesc, ColliderDesc)>,
}

impl Scene {
    pub fn save(&self, path: &Path) -> Result<(), NbrError> {
        let nscn_path = path.with_extension("nscn");
        let file = open_file(&nscn_path, OpenMode::WRITE | OpenMode::BINARY)?;
        let mut w = BufWriter::new(file);

        w.write_bytes(SCENE_MAGIC)?;
        self.write_into(&mut w)?;
        w.flush()?;

        tracing::info!("saved scene to '{}'", nscn_path.display());
        Ok(())
    }

    pub fn load(path: &Path) -> Result<Self, NbrError> {
        let file = open_file(path, OpenMode::READ | OpenMode::BINARY)?;
        let mut r = BufReader::new(file);

        let mut magic = [0u8; 4];
        r.read_exact(&mut magic)?;
        if &magic != SCENE_MAGIC {
            tracing::error!("'{}' is not a scene file", path.display());
            return Err(NbrError::Malformed("bad scene magic"));
        }

        Self::read_from(&mut r)
    }

    fn write_into<W: Write>(&self, w: &mut W) -> Result<(), NbrError> {
        self.frame.write_bytes(w)?;
        self.listener.write_bytes(w)?;

        w.write_u8(self.directional_light.is_some() as u8)?;
        if let Some(light) = &self.directional_light {
            light.write_bytes(w)?;
        }

        w.write_u32(self.point_lights.len() as u32)?;
        for light in &self.point_lights {
            light.write_bytes(w)?;
        }

        w.write_u32(self.spot_lights.len() as u32)?;
        for light in &self.spot_lights {
            light.write_bytes(w)?;
        }

        w.write_u32(self.transforms.len() as u32)?;
        for transform in &self.transforms {
            transform.write_bytes(w)?;
        }

        w.write_u32(self.bodies.len() as u32)?;
        for (body, collider) in &self.bodies {
            body.write_bytes(w)?;
            collider.write_bytes(w)?;
        }
        Ok(())
    }

    fn read_from<R: Read>(r: &mut R) -> Result<Self, NbrError> {
        let frame = FrameData::read_bytes(r)?;
        let listener = AudioListenerDesc::read_bytes(r)?;

        let directional_light = if r.read_u8()? != 0 {
            Some(DirectionalLight::read_bytes(r)?)
        } else {
            None
        };

        let point_count = r.read_u32()? as usize;
        let mut point_lights = Vec::with_capacity(point_count);
        for _ in 0..point_count {
            point_lights.push(PointLight::read_bytes(r)?);
        }

        let spot_count = r.read_u32()? as usize;
        let mut spot_lights = Vec::with_capacity(spot_count);
        for _ in 0..spot_count {
            spot_lights.push(SpotLight::read_bytes(r)?);
        }

        let transform_count = r.read_u32()? as usize;
        let mut transforms = Vec::with_capacity(transform_count);
        for _ in 0..transform_count {
            transforms.push(Transform::read_bytes(r)?);
        }

        let body_count = r.read_u32()? as usize;
        let mut bodies = Vec::with_capacity(body_count);
        for _ in 0..body_count {
            bodies.push((PhysicsBodyDesc::read_bytes(r)?, ColliderDesc::read_bytes(r)?));
        }

        Ok(Self {
            frame,
            listener,
            directional_light,
            point_lights,
            spot_lights,
            transforms,
            bodies,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use boreal_common::values::{Camera, PhysicsBodyType};
    use glam::{Quat, Vec3};
    use tempfile::TempDir;

    fn sample_scene() -> Scene {
        Scene {
            frame: FrameData {
                camera: Camera {
                    position: Vec3::new(0.0, 4.0, 12.0),
                    pitch: -20.0,
                    ..Default::default()
                },
                ambient: Vec3::splat(0.2),
            },
            listener: AudioListenerDesc::default(),
            directional_light: Some(DirectionalLight {
                direction: Vec3::new(-0.3, -1.0, 0.1),
                color: Vec3::ONE,
            }),
            point_lights: vec![PointLight {
                position: Vec3::new(2.0, 1.0, 0.0),
                color: Vec3::new(1.0, 0.4, 0.1),
                radius: 6.0,
                fall_off: 1.2,
            }],
            spot_lights: vec![],
            transforms: vec![
                Transform::default(),
                Transform {
                    position: Vec3::new(5.0, 0.0, -3.0),
                    rotation: Quat::from_rotation_y(1.2),
                    scale: Vec3::splat(0.5),
                },
            ],
            bodies: vec![(
                PhysicsBodyDesc {
                    position: Vec3::new(5.0, 0.0, -3.0),
                    body_type: PhysicsBodyType::Dynamic,
                    mass: 1.0,
                    restitution: 0.3,
                    friction: 0.8,
                    is_awake: true,
                },
                ColliderDesc {
                    extents: Vec3::splat(0.5),
                    offset: Vec3::ZERO,
                    friction: 0.8,
                    density: 1.0,
                    is_sensor: false,
                },
            )],
        }
    }

    #[test]
    fn scene_roundtrip_is_exact() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("level1");

        let scene = sample_scene();
        scene.save(&path).unwrap();

        let loaded = Scene::load(&dir.path().join("level1.nscn")).unwrap();
        assert_eq!(loaded, scene);
    }

    #[test]
    fn bad_magic_rejected() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("broken.nscn");
        std::fs::write(&path, b"NOPEnope").unwrap();

        assert!(matches!(
            Scene::load(&path),
            Err(NbrError::Malformed(_))
        ));
    }
}
