//! Attack definitions and their hit volumes, loaded from RON files.

use std::fs;
use std::path::Path;

use bevy::prelude::*;
use serde::Deserialize;

use super::error::DataLoadError;
use crate::physics::{LayerMask, PhysicsQuery};

/// Shape of a hit volume.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub enum HitShape {
    /// `size.x` is the radius.
    Sphere,
    /// `size.x` is the radius, `size.y` the full height.
    Capsule,
    /// `size` holds the half extents.
    Box,
}

/// A volume checked for overlaps when an attack connects.
///
/// Offset and rotation are relative to the attacker.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct HitVolume {
    pub shape: HitShape,
    #[serde(default)]
    pub offset: (f32, f32, f32),
    /// Euler angles in degrees (yaw, pitch, roll).
    #[serde(default)]
    pub rotation: (f32, f32, f32),
    pub size: (f32, f32, f32),
}

impl HitVolume {
    pub fn sphere(offset: Vec3, radius: f32) -> Self {
        Self {
            shape: HitShape::Sphere,
            offset: offset.into(),
            rotation: (0.0, 0.0, 0.0),
            size: (radius, 0.0, 0.0),
        }
    }

    pub fn local_rotation(&self) -> Quat {
        let (yaw, pitch, roll) = self.rotation;
        Quat::from_euler(
            EulerRot::YXZ,
            yaw.to_radians(),
            pitch.to_radians(),
            roll.to_radians(),
        )
    }

    /// Query every collider overlapping this volume placed relative to `origin`.
    pub fn overlap<P: PhysicsQuery>(
        &self,
        origin: &Transform,
        physics: &P,
        mask: LayerMask,
        out: &mut Vec<P::Collider>,
    ) {
        let position = origin.transform_point(Vec3::from(self.offset));
        let rotation = origin.rotation * self.local_rotation();
        let size = Vec3::from(self.size);

        match self.shape {
            HitShape::Sphere => physics.overlap_sphere(position, size.x, mask, out),
            HitShape::Capsule => {
                let half_up = rotation * Vec3::Y * (0.5 * (size.y - size.x));
                physics.overlap_capsule(position + half_up, position - half_up, size.x, mask, out);
            }
            HitShape::Box => physics.overlap_box(position, size, rotation, mask, out),
        }
    }

    fn validate(&self) -> Result<(), String> {
        let size = Vec3::from(self.size);
        match self.shape {
            HitShape::Sphere if size.x <= 0.0 => Err("sphere radius must be positive".into()),
            HitShape::Capsule if size.x <= 0.0 => Err("capsule radius must be positive".into()),
            HitShape::Capsule if size.y < size.x => {
                Err(format!("capsule height {} is below its radius {}", size.y, size.x))
            }
            HitShape::Box if size.min_element() <= 0.0 => {
                Err("box half extents must be positive".into())
            }
            _ => Ok(()),
        }
    }
}

/// One attack of a combo chain.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct AttackDefinition {
    pub name: String,
    #[serde(default = "default_multiplier")]
    pub damage_multiplier: f32,
    #[serde(default)]
    pub stamina_cost: f32,
    #[serde(default)]
    pub hit_volumes: Vec<HitVolume>,
}

fn default_multiplier() -> f32 {
    1.0
}

impl AttackDefinition {
    /// Check hit volume dimensions.
    pub fn validate(&self) -> Result<(), DataLoadError> {
        for (index, volume) in self.hit_volumes.iter().enumerate() {
            volume.validate().map_err(|details| DataLoadError::InvalidHitVolume {
                attack: self.name.clone(),
                index,
                details,
            })?;
        }
        Ok(())
    }
}

/// Parse and validate a single attack definition.
pub fn parse_attack(path: &str, contents: &str) -> Result<AttackDefinition, DataLoadError> {
    let attack: AttackDefinition =
        ron::from_str(contents).map_err(|e| DataLoadError::ParseError {
            path: path.to_string(),
            details: e.to_string(),
        })?;
    attack.validate()?;
    Ok(attack)
}

/// Load the basic attack chain from a directory of `.ron` files.
///
/// Files are ordered by name, which is the combo order. Broken files are
/// logged and skipped.
pub fn load_attack_chain(dir: impl AsRef<Path>) -> Result<Vec<AttackDefinition>, DataLoadError> {
    let dir = dir.as_ref();
    if !dir.exists() {
        return Err(DataLoadError::FileNotFound(dir.display().to_string()));
    }

    let entries = fs::read_dir(dir).map_err(|e| DataLoadError::ReadError {
        path: dir.display().to_string(),
        details: e.to_string(),
    })?;

    let mut paths: Vec<_> = entries
        .flatten()
        .map(|entry| entry.path())
        .filter(|path| path.extension().is_some_and(|ext| ext == "ron"))
        .collect();
    paths.sort();

    let mut attacks = Vec::with_capacity(paths.len());
    for path in paths {
        let display = path.display().to_string();
        let result = fs::read_to_string(&path)
            .map_err(|e| DataLoadError::ReadError {
                path: display.clone(),
                details: e.to_string(),
            })
            .and_then(|contents| parse_attack(&display, &contents));

        match result {
            Ok(attack) => {
                if attack.hit_volumes.is_empty() {
                    warn!("Attack '{}' has no hit volumes and will never connect", attack.name);
                }
                info!("Loaded attack definition: {}", attack.name);
                attacks.push(attack);
            }
            Err(e) => error!("{}", e),
        }
    }

    Ok(attacks)
}
