use crate::RenderBackend;
use crate::types::ProgramId;
use crate::uniform::UniformValue;
use glam::{Mat3, Mat4, Vec3, Vec4};

pub const PROJECTION_UNIFORM: &str = "u_projection";
pub const VIEW_UNIFORM: &str = "u_view";

/// First-person camera: position plus yaw and pitch, with an orthonormal
/// basis and view matrix rebuilt by [`Camera::update`].
///
/// Roll is stored but does not enter the basis.
#[derive(Debug, Clone, PartialEq)]
pub struct Camera {
    projection: Mat4,
    view: Mat4,
    position: Vec3,
    x_axis: Vec3,
    y_axis: Vec3,
    z_axis: Vec3,
    pitch: f32,
    yaw: f32,
    roll: f32,
}

impl Camera {
    pub fn new(projection: Mat4) -> Self {
        let mut camera = Self {
            projection,
            view: Mat4::IDENTITY,
            position: Vec3::ZERO,
            x_axis: Vec3::X,
            y_axis: Vec3::Y,
            z_axis: Vec3::Z,
            pitch: 0.0,
            yaw: 0.0,
            roll: 0.0,
        };
        camera.update();
        camera
    }

    /// Rebuilds the basis (yaw about world Y, then pitch about the yawed X
    /// axis) and the view matrix.
    pub fn update(&mut self) {
        let ry = Mat3::from_axis_angle(Vec3::Y, -self.yaw);
        self.x_axis = (ry * Vec3::X).normalize();
        self.z_axis = (ry * Vec3::Z).normalize();

        let rx = Mat3::from_axis_angle(self.x_axis, -self.pitch);
        self.y_axis = (rx * Vec3::Y).normalize();
        self.z_axis = (rx * self.z_axis).normalize();

        let (ax, ay, az) = (self.x_axis, self.y_axis, self.z_axis);
        let p = self.position;
        self.view = Mat4::from_cols(
            Vec4::new(ax.x, ay.x, az.x, 0.0),
            Vec4::new(ax.y, ay.y, az.y, 0.0),
            Vec4::new(ax.z, ay.z, az.z, 0.0),
            Vec4::new(-p.dot(ax), -p.dot(ay), -p.dot(az), 1.0),
        );
    }

    pub fn set_projection(&mut self, projection: Mat4) {
        self.projection = projection;
    }

    pub fn set_position(&mut self, position: Vec3) {
        self.position = position;
    }

    /// Moves along the right axis.
    pub fn move_x(&mut self, amount: f32) {
        self.position += self.x_axis * amount;
    }

    /// Moves along the up axis.
    pub fn move_y(&mut self, amount: f32) {
        self.position += self.y_axis * amount;
    }

    /// Moves along the backward axis; the camera looks down `-z_axis`.
    pub fn move_z(&mut self, amount: f32) {
        self.position += self.z_axis * amount;
    }

    pub fn rotate_x(&mut self, amount: f32) {
        self.pitch += amount;
    }

    pub fn rotate_y(&mut self, amount: f32) {
        self.yaw += amount;
    }

    pub fn rotate_z(&mut self, amount: f32) {
        self.roll += amount;
    }

    pub fn projection(&self) -> Mat4 {
        self.projection
    }

    pub fn view(&self) -> Mat4 {
        self.view
    }

    pub fn position(&self) -> Vec3 {
        self.position
    }

    pub fn right(&self) -> Vec3 {
        self.x_axis
    }

    pub fn up(&self) -> Vec3 {
        self.y_axis
    }

    pub fn forward(&self) -> Vec3 {
        self.z_axis
    }

    pub fn pitch(&self) -> f32 {
        self.pitch
    }

    pub fn yaw(&self) -> f32 {
        self.yaw
    }

    pub fn roll(&self) -> f32 {
        self.roll
    }

    /// Binds `program` and uploads the projection and view uniforms.
    pub fn bind(&self, backend: &mut dyn RenderBackend, program: ProgramId) {
        backend.set_shader_program(program);
        backend.set_shader_uniform(
            program,
            PROJECTION_UNIFORM,
            &UniformValue::Mat4(self.projection),
        );
        backend.set_shader_uniform(program, VIEW_UNIFORM, &UniformValue::Mat4(self.view));
    }
}
