//! Hovering drone
//!
//! A quadcopter assembled from primitive shapes: a body, four arms and four
//! rotors. The whole rig bobs and sways; rotors spin about their local Y
//! axis, neighbours in opposite directions.

use std::f32::consts::{FRAC_PI_2, FRAC_PI_4};
use std::sync::Arc;

use glam::{Mat4, Quat, Vec3};
use gearfolio_geometry::{primitives, Mesh, ShapeError};
use serde::{Deserialize, Serialize};

use crate::instance::InstanceRaw;
use crate::instance_buffer::InstanceBuffer;
use crate::material::Material;
use crate::source::InstanceSource;

const ARM_COUNT: usize = 4;
const ARM_LENGTH: f32 = 0.55;
const ROTOR_RADIUS: f32 = 0.22;

/// Placement and motion of the drone
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DroneConfig {
    /// Hover center
    pub position: Vec3,
    /// Uniform scale of the whole rig
    pub scale: f32,
    /// Height of the hover bob
    pub hover_amplitude: f32,
    /// Angular frequency of the hover bob
    pub hover_frequency: f32,
    /// Maximum yaw sway in radians
    pub sway: f32,
    /// Rotor speed in radians per second
    pub rotor_speed: f32,
    /// Body and arm material
    pub body: Material,
    /// Rotor material
    pub rotor: Material,
}

impl Default for DroneConfig {
    fn default() -> Self {
        Self {
            position: Vec3::new(4.5, 1.5, -2.0),
            scale: 0.8,
            hover_amplitude: 0.15,
            hover_frequency: 1.5,
            sway: 0.25,
            rotor_speed: 30.0,
            body: Material::from_hex(0x1f2937).with_surface(0.6, 0.35),
            rotor: Material::from_hex(0x60a5fa).with_surface(0.2, 0.4),
        }
    }
}

/// Part groups of the rig, in group order
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DronePart {
    /// Central body
    Body,
    /// Arms reaching to the rotors
    Arm,
    /// Spinning rotor discs
    Rotor,
}

const PARTS: [DronePart; 3] = [DronePart::Body, DronePart::Arm, DronePart::Rotor];

impl DronePart {
    fn count(self) -> usize {
        match self {
            DronePart::Body => 1,
            DronePart::Arm | DronePart::Rotor => ARM_COUNT,
        }
    }
}

/// Direction of arm `i` in the XZ plane (diagonals)
fn arm_angle(i: usize) -> f32 {
    FRAC_PI_4 + FRAC_PI_2 * i as f32
}

/// Animated drone built from three meshes
pub struct DroneRig {
    config: DroneConfig,
    meshes: [Arc<Mesh>; 3],
    buffers: [Option<InstanceBuffer>; 3],
}

impl DroneRig {
    /// Build the part meshes
    pub fn new(config: DroneConfig) -> Result<Self, ShapeError> {
        let body = primitives::cuboid(Vec3::new(0.5, 0.16, 0.5))?;
        let arm = primitives::cuboid(Vec3::new(ARM_LENGTH, 0.05, 0.08))?;
        let rotor = primitives::cylinder(ROTOR_RADIUS, ROTOR_RADIUS, 0.02, 20)?;
        Ok(Self {
            config,
            meshes: [Arc::new(body), Arc::new(arm), Arc::new(rotor)],
            buffers: [None, None, None],
        })
    }

    /// Current configuration
    pub fn config(&self) -> &DroneConfig {
        &self.config
    }

    /// Transform of the whole rig at time `t`
    pub fn root_transform(&self, t: f32) -> Mat4 {
        let c = &self.config;
        let bob = (t * c.hover_frequency).sin() * c.hover_amplitude;
        let yaw = (t * 0.5).sin() * c.sway;
        let roll = (t * 0.8).sin() * c.sway * 0.3;
        Mat4::from_scale_rotation_translation(
            Vec3::splat(c.scale),
            Quat::from_rotation_y(yaw) * Quat::from_rotation_z(roll),
            c.position + Vec3::Y * bob,
        )
    }

    /// Local transform of instance `i` of `part` at time `t`
    pub fn part_transform(&self, part: DronePart, i: usize, t: f32) -> Mat4 {
        let angle = arm_angle(i);
        let dir = Vec3::new(angle.cos(), 0.0, angle.sin());
        match part {
            DronePart::Body => Mat4::IDENTITY,
            DronePart::Arm => Mat4::from_rotation_translation(
                Quat::from_rotation_y(-angle),
                dir * (ARM_LENGTH * 0.5),
            ),
            DronePart::Rotor => {
                let direction = if i % 2 == 0 { 1.0 } else { -1.0 };
                Mat4::from_rotation_translation(
                    Quat::from_rotation_y(direction * self.config.rotor_speed * t),
                    dir * ARM_LENGTH + Vec3::Y * 0.06,
                )
            }
        }
    }

    /// World matrices of every part, in group order
    pub fn pose(&self, t: f32) -> Vec<(DronePart, Mat4)> {
        let root = self.root_transform(t);
        PARTS
            .iter()
            .flat_map(|&part| (0..part.count()).map(move |i| (part, i)))
            .map(|(part, i)| (part, root * self.part_transform(part, i, t)))
            .collect()
    }

    fn material(&self, part: DronePart) -> Material {
        match part {
            DronePart::Rotor => self.config.rotor,
            _ => self.config.body,
        }
    }
}

impl InstanceSource for DroneRig {
    fn label(&self) -> &str {
        "drone"
    }

    fn group_count(&self) -> usize {
        PARTS.len()
    }

    fn group_mesh(&self, group: usize) -> Option<Arc<Mesh>> {
        self.meshes.get(group).cloned()
    }

    fn group_capacity(&self, group: usize) -> usize {
        PARTS.get(group).map_or(0, |p| p.count())
    }

    fn attach_buffers(&mut self) {
        for (group, part) in PARTS.iter().enumerate() {
            self.buffers[group] = Some(InstanceBuffer::new(part.count(), self.material(*part)));
        }
    }

    fn detach_buffers(&mut self) {
        self.buffers = [None, None, None];
    }

    fn update(&mut self, t: f32) {
        let root = self.root_transform(t);
        for (group, &part) in PARTS.iter().enumerate() {
            let matrices: Vec<Mat4> =
                (0..part.count()).map(|i| root * self.part_transform(part, i, t)).collect();
            let Some(buffer) = self.buffers[group].as_mut() else {
                continue;
            };
            for (slot, model) in matrices.into_iter().enumerate() {
                if let Err(e) = buffer.write_matrix(slot, model) {
                    log::warn!("Drone {:?}: {}", part, e);
                }
            }
            buffer.mark_dirty();
        }
    }

    fn drain_dirty(&mut self, sink: &mut dyn FnMut(usize, &[InstanceRaw])) {
        for (group, buffer) in self.buffers.iter_mut().enumerate() {
            if let Some(data) = buffer.as_mut().and_then(InstanceBuffer::take_dirty) {
                sink(group, data);
            }
        }
    }
}
