//! Nucleus particles and orbiting electrons

use glam::{Mat4, Quat, Vec3};

/// Particle types that make up a nucleus
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParticleKind {
    Proton,
    Neutron,
}

impl ParticleKind {
    /// Token used in `.aselement` files
    pub fn from_token(token: &str) -> Option<Self> {
        match token {
            "PROTON" => Some(ParticleKind::Proton),
            "NEUTRON" => Some(ParticleKind::Neutron),
            _ => None,
        }
    }

    pub fn color(&self) -> [f32; 4] {
        match self {
            ParticleKind::Proton => [0.85, 0.22, 0.2, 1.0],  // Red
            ParticleKind::Neutron => [0.6, 0.62, 0.66, 1.0], // Gray
        }
    }
}

/// A static member of the nucleus
#[derive(Debug, Clone, PartialEq)]
pub struct Particle {
    pub kind: ParticleKind,
    pub position: Vec3,
    pub scale: f32,
}

impl Particle {
    pub fn new(kind: ParticleKind, position: Vec3, scale: f32) -> Self {
        Self {
            kind,
            position,
            scale,
        }
    }

    pub fn color(&self) -> [f32; 4] {
        self.kind.color()
    }

    pub fn model_matrix(&self) -> Mat4 {
        Mat4::from_scale_rotation_translation(Vec3::splat(self.scale), Quat::IDENTITY, self.position)
    }
}

/// A light-emitting electron orbiting the nucleus center.
///
/// `origin` is the position at angle zero. The current position is `origin`
/// rotated about `axis` (through the world origin) by the accumulated angle.
#[derive(Debug, Clone, PartialEq)]
pub struct Electron {
    pub origin: Vec3,
    pub scale: f32,
    /// Degrees per second
    pub speed: f32,
    pub axis: Vec3,
    pub color: Vec3,
    angle: f32,
}

impl Electron {
    /// `None` when `axis` is too short to normalize
    pub fn new(origin: Vec3, scale: f32, speed: f32, axis: Vec3) -> Option<Self> {
        let axis = axis.try_normalize()?;
        Some(Self {
            origin,
            scale,
            speed,
            axis,
            color: Self::color_for_axis(axis),
            angle: 0.0,
        })
    }

    /// Electrons on the same plane share a tint
    pub fn color_for_axis(axis: Vec3) -> Vec3 {
        (Vec3::splat(0.35) + axis.abs() * 0.65).min(Vec3::ONE)
    }

    pub fn advance(&mut self, dt: f32) {
        self.angle = (self.angle + self.speed.to_radians() * dt) % std::f32::consts::TAU;
    }

    pub fn position(&self) -> Vec3 {
        Quat::from_axis_angle(self.axis, self.angle) * self.origin
    }

    pub fn model_matrix(&self) -> Mat4 {
        Mat4::from_scale_rotation_translation(
            Vec3::splat(self.scale),
            Quat::IDENTITY,
            self.position(),
        )
    }
}
