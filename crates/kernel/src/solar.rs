//! Runtime state of the body table.

use crate::orbit::{orbit, orbit_tethered, wrap_angle};
use crate::system::{OrbitMode, SystemDesc, SystemError};
use glam::{Mat4, Vec3};

/// Per-body runtime state.
#[derive(Debug, Clone, PartialEq)]
pub struct Body {
    pub name: String,
    pub texture: String,
    pub parent: Option<usize>,
    pub angular_speed: f32,
    pub scale: f32,
    pub orbit: OrbitMode,
    pub position: Vec3,
    /// Persisted angle for tethered bodies; unused otherwise.
    pub angle: f32,
}

/// The stepped solar system.
#[derive(Debug, Clone)]
pub struct SolarSystem {
    bodies: Vec<Body>,
    spin: f32,
    spin_axis: Vec3,
}

impl SolarSystem {
    pub fn new(desc: &SystemDesc) -> Result<Self, SystemError> {
        desc.validate()?;

        let mut bodies: Vec<Body> = Vec::with_capacity(desc.bodies.len());
        for body in &desc.bodies {
            let parent = body.parent.as_deref().and_then(|p| desc.index_of(p));
            let angle = match parent {
                Some(p) => {
                    let offset = body.position - bodies[p].position;
                    wrap_angle(offset.z.atan2(offset.x))
                }
                None => 0.0,
            };
            bodies.push(Body {
                name: body.name.clone(),
                texture: body.texture.clone(),
                parent,
                angular_speed: body.angular_speed,
                scale: body.scale,
                orbit: body.orbit,
                position: body.position,
                angle,
            });
        }

        Ok(Self {
            bodies,
            spin: 0.0,
            spin_axis: Vec3::new(1.0, 1.0, -1.0).normalize(),
        })
    }

    pub fn bodies(&self) -> &[Body] {
        &self.bodies
    }

    pub fn len(&self) -> usize {
        self.bodies.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bodies.is_empty()
    }

    /// Accumulated self-rotation angle shared by every body.
    pub fn spin(&self) -> f32 {
        self.spin
    }

    /// Advances every body by `dt` seconds.
    pub fn advance(&mut self, dt: f32) {
        self.spin += dt;

        for i in 0..self.bodies.len() {
            let Some(parent) = self.bodies[i].parent else {
                continue;
            };
            let center = self.bodies[parent].position;
            let body = &mut self.bodies[i];
            body.position = match body.orbit {
                OrbitMode::Stationary => body.position,
                OrbitMode::Free => orbit(body.position, center, body.angular_speed, dt),
                OrbitMode::Tethered { radius } => orbit_tethered(
                    body.position,
                    center,
                    body.angular_speed,
                    dt,
                    radius,
                    &mut body.angle,
                ),
            };
        }
    }

    /// Model matrix of body `index`: scale, then translation, then spin.
    pub fn transform(&self, index: usize) -> Option<Mat4> {
        let body = self.bodies.get(index)?;
        Some(
            Mat4::from_scale(Vec3::splat(body.scale))
                * Mat4::from_translation(body.position)
                * Mat4::from_axis_angle(self.spin_axis, self.spin),
        )
    }

    pub fn transforms(&self) -> impl Iterator<Item = Mat4> + '_ {
        (0..self.bodies.len()).filter_map(|i| self.transform(i))
    }
}
