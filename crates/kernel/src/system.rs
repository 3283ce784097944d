//! Data-driven description of the celestial bodies.

use glam::Vec3;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::Path;

/// Errors from loading or validating a body table.
#[derive(Debug, thiserror::Error)]
pub enum SystemError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),
    #[error("body table is empty")]
    Empty,
    #[error("duplicate body name: {0}")]
    DuplicateName(String),
    #[error("body {body} references unknown or later parent {parent}")]
    UnknownParent { body: String, parent: String },
    #[error("body {0} orbits but has no parent")]
    MissingParent(String),
}

/// How a body moves around its parent.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum OrbitMode {
    /// Never moves.
    Stationary,
    /// Angle and radius are re-derived from the current positions each step.
    Free,
    /// Fixed radius with a persisted angle, for bodies whose parent moves.
    Tethered { radius: f32 },
}

/// One body of the table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BodyDesc {
    pub name: String,
    /// Texture file name, relative to the data directory.
    pub texture: String,
    #[serde(default)]
    pub parent: Option<String>,
    #[serde(default)]
    pub angular_speed: f32,
    pub position: Vec3,
    #[serde(default = "unit_scale")]
    pub scale: f32,
    pub orbit: OrbitMode,
}

fn unit_scale() -> f32 {
    1.0
}

impl BodyDesc {
    fn planet(name: &str, z: f32, angular_speed: f32) -> Self {
        Self {
            name: name.into(),
            texture: format!("{name}.png"),
            parent: Some("sun".into()),
            angular_speed,
            position: Vec3::new(0.0, 0.0, z),
            scale: 1.0,
            orbit: OrbitMode::Free,
        }
    }
}

/// An ordered body table. Parents always precede their children.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SystemDesc {
    pub bodies: Vec<BodyDesc>,
}

impl Default for SystemDesc {
    fn default() -> Self {
        Self::builtin()
    }
}

impl SystemDesc {
    /// The sun, eight planets and earth's moon.
    pub fn builtin() -> Self {
        let sun = BodyDesc {
            name: "sun".into(),
            texture: "sun.png".into(),
            parent: None,
            angular_speed: 0.0,
            position: Vec3::ZERO,
            scale: 5.0,
            orbit: OrbitMode::Stationary,
        };
        let moon = BodyDesc {
            name: "moon".into(),
            texture: "moon.png".into(),
            parent: Some("earth".into()),
            angular_speed: 4.0,
            position: Vec3::new(0.0, 0.0, -48.0),
            scale: 1.0,
            orbit: OrbitMode::Tethered { radius: 8.0 },
        };

        Self {
            bodies: vec![
                sun,
                BodyDesc::planet("mercury", -20.0, 1.0),
                BodyDesc::planet("venus", -30.0, 1.2),
                BodyDesc::planet("earth", -40.0, 1.1),
                moon,
                BodyDesc::planet("mars", -53.0, 1.5),
                BodyDesc::planet("jupiter", -65.0, 0.7),
                BodyDesc::planet("saturn", -75.0, 0.9),
                BodyDesc::planet("uranus", -85.0, 1.8),
                BodyDesc::planet("neptune", -95.0, 1.3),
            ],
        }
    }

    pub fn from_yaml(text: &str) -> Result<Self, SystemError> {
        let desc: SystemDesc = serde_yaml::from_str(text)?;
        desc.validate()?;
        Ok(desc)
    }

    pub fn load(path: &Path) -> Result<Self, SystemError> {
        let text = std::fs::read_to_string(path)?;
        let desc = Self::from_yaml(&text)?;
        tracing::info!(path = %path.display(), bodies = desc.bodies.len(), "loaded body table");
        Ok(desc)
    }

    pub fn to_yaml(&self) -> Result<String, SystemError> {
        Ok(serde_yaml::to_string(self)?)
    }

    pub fn validate(&self) -> Result<(), SystemError> {
        if self.bodies.is_empty() {
            return Err(SystemError::Empty);
        }

        let mut seen = HashSet::new();
        for body in &self.bodies {
            if let Some(parent) = &body.parent {
                if !seen.contains(parent.as_str()) {
                    return Err(SystemError::UnknownParent {
                        body: body.name.clone(),
                        parent: parent.clone(),
                    });
                }
            } else if body.orbit != OrbitMode::Stationary {
                return Err(SystemError::MissingParent(body.name.clone()));
            }

            if !seen.insert(body.name.as_str()) {
                return Err(SystemError::DuplicateName(body.name.clone()));
            }
        }
        Ok(())
    }

    /// Index of the body called `name`.
    pub fn index_of(&self, name: &str) -> Option<usize> {
        self.bodies.iter().position(|b| b.name == name)
    }

    /// Texture file names in table order.
    pub fn textures(&self) -> Vec<String> {
        self.bodies.iter().map(|b| b.texture.clone()).collect()
    }
}
