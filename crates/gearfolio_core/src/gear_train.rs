//! Spinning gears
//!
//! Gears are configured one by one but drawn per distinct [`GearSpec`]:
//! every group shares one cached mesh and one instance buffer, with the
//! gear's own material packed into each instance.

use std::f32::consts::PI;
use std::sync::Arc;

use glam::{EulerRot, Mat4, Quat, Vec3};
use gearfolio_geometry::{GearMeshCache, GearSpec, Mesh};

use crate::instance::InstanceRaw;
use crate::instance_buffer::InstanceBuffer;
use crate::material::Material;
use crate::source::InstanceSource;

/// One gear in the train
#[derive(Clone, Debug)]
pub struct GearInstance {
    /// Shape of the gear
    pub spec: GearSpec,
    /// Surface material
    pub material: Material,
    /// Center of rotation in world space
    pub position: Vec3,
    /// Fixed XYZ Euler tilt applied before the spin
    pub tilt: Vec3,
    /// Angular speed about the local Z axis (radians per second)
    pub spin_speed: f32,
    /// Spin angle at t = 0
    pub phase: f32,
    /// Uniform scale
    pub scale: f32,
}

impl GearInstance {
    /// A still, untilted gear at `position`
    pub fn new(spec: GearSpec, position: Vec3) -> Self {
        Self {
            spec,
            material: Material::default(),
            position,
            tilt: Vec3::ZERO,
            spin_speed: 0.0,
            phase: 0.0,
            scale: 1.0,
        }
    }

    /// Spin angle at elapsed time `t`
    #[inline]
    pub fn angle(&self, t: f32) -> f32 {
        self.spin_speed * t + self.phase
    }

    /// Model matrix at elapsed time `t`
    pub fn model_matrix(&self, t: f32) -> Mat4 {
        let tilt = Quat::from_euler(EulerRot::XYZ, self.tilt.x, self.tilt.y, self.tilt.z);
        let spin = Quat::from_rotation_z(self.angle(t));
        Mat4::from_scale_rotation_translation(Vec3::splat(self.scale), tilt * spin, self.position)
    }

    /// Make this gear mesh with `driver`
    ///
    /// Sets the spin to the opposite direction at the tooth ratio and picks
    /// the phase so that a driver tooth faces a valley of this gear along
    /// the line between the centers. Both gears are assumed untilted.
    pub fn driven_by(&mut self, driver: &GearInstance) {
        let ratio = driver.spec.tooth_count() as f32 / self.spec.tooth_count() as f32;
        let offset = self.position - driver.position;
        let contact = offset.y.atan2(offset.x);
        self.spin_speed = -driver.spin_speed * ratio;
        self.phase = contact + PI - PI / self.spec.tooth_count() as f32
            + (contact - driver.phase) * ratio;
    }
}

struct GearGroup {
    spec: GearSpec,
    mesh: Arc<Mesh>,
    members: Vec<usize>,
    buffer: Option<InstanceBuffer>,
}

/// All configured gears, grouped by shape
pub struct GearTrain {
    gears: Vec<GearInstance>,
    groups: Vec<GearGroup>,
}

impl GearTrain {
    /// Group `gears` by spec, building (or reusing) one mesh per group
    pub fn new(gears: Vec<GearInstance>, cache: &mut GearMeshCache) -> Self {
        let mut groups: Vec<GearGroup> = Vec::new();
        for (index, gear) in gears.iter().enumerate() {
            match groups.iter_mut().find(|g| g.spec == gear.spec) {
                Some(group) => group.members.push(index),
                None => groups.push(GearGroup {
                    spec: gear.spec,
                    mesh: cache.get_or_build(&gear.spec),
                    members: vec![index],
                    buffer: None,
                }),
            }
        }
        log::debug!("Gear train: {} gears in {} groups", gears.len(), groups.len());
        Self { gears, groups }
    }

    /// The gears in configuration order
    pub fn gears(&self) -> &[GearInstance] {
        &self.gears
    }

    /// Spec shared by a group
    pub fn group_spec(&self, group: usize) -> Option<&GearSpec> {
        self.groups.get(group).map(|g| &g.spec)
    }
}

impl InstanceSource for GearTrain {
    fn label(&self) -> &str {
        "gears"
    }

    fn group_count(&self) -> usize {
        self.groups.len()
    }

    fn group_mesh(&self, group: usize) -> Option<Arc<Mesh>> {
        self.groups.get(group).map(|g| Arc::clone(&g.mesh))
    }

    fn group_capacity(&self, group: usize) -> usize {
        self.groups.get(group).map_or(0, |g| g.members.len())
    }

    fn attach_buffers(&mut self) {
        for group in &mut self.groups {
            let material = self.gears[group.members[0]].material;
            group.buffer = Some(InstanceBuffer::new(group.members.len(), material));
        }
    }

    fn detach_buffers(&mut self) {
        for group in &mut self.groups {
            group.buffer = None;
        }
    }

    fn update(&mut self, t: f32) {
        for group in &mut self.groups {
            let Some(buffer) = group.buffer.as_mut() else {
                continue;
            };
            for (slot, &index) in group.members.iter().enumerate() {
                let gear = &self.gears[index];
                let raw = InstanceRaw::new(gear.model_matrix(t), &gear.material);
                if let Err(e) = buffer.write_raw(slot, raw) {
                    log::warn!("Gear {}: {}", index, e);
                }
            }
            buffer.mark_dirty();
        }
    }

    fn drain_dirty(&mut self, sink: &mut dyn FnMut(usize, &[InstanceRaw])) {
        for (group, g) in self.groups.iter_mut().enumerate() {
            if let Some(data) = g.buffer.as_mut().and_then(InstanceBuffer::take_dirty) {
                sink(group, data);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f32::consts::TAU;

    fn spec(teeth: u32) -> GearSpec {
        GearSpec::new(1.0, 0.85, 0.4, teeth, 0.2).unwrap()
    }

    #[test]
    fn test_groups_share_meshes() {
        let mut cache = GearMeshCache::new();
        let gears = vec![
            GearInstance::new(spec(12), Vec3::ZERO),
            GearInstance::new(spec(20), Vec3::X * 3.0),
            GearInstance::new(spec(12), Vec3::Y * 3.0),
        ];
        let train = GearTrain::new(gears, &mut cache);
        assert_eq!(train.group_count(), 2);
        assert_eq!(train.group_capacity(0), 2);
        assert_eq!(train.group_capacity(1), 1);
        assert_eq!(cache.len(), 2);
        assert_eq!(train.group_spec(1).map(GearSpec::tooth_count), Some(20));
    }

    #[test]
    fn test_spin_keeps_center_fixed() {
        let mut gear = GearInstance::new(spec(12), Vec3::new(2.0, -1.0, -5.0));
        gear.spin_speed = 1.3;
        gear.tilt = Vec3::new(0.4, 0.2, 0.0);
        for t in [0.0, 0.7, 5.0] {
            let center = gear.model_matrix(t).transform_point3(Vec3::ZERO);
            assert!((center - gear.position).length() < 1e-5);
        }
    }

    #[test]
    fn test_spin_is_periodic() {
        let mut gear = GearInstance::new(spec(12), Vec3::ZERO);
        gear.spin_speed = 0.5;
        let period = TAU / 0.5;
        assert!(gear.model_matrix(1.0).abs_diff_eq(gear.model_matrix(1.0 + period), 1e-4));
    }

    #[test]
    fn test_driven_gear_interleaves_teeth() {
        let mut driver = GearInstance::new(spec(12), Vec3::ZERO);
        driver.spin_speed = 0.8;
        driver.phase = 0.3;
        let mut driven = GearInstance::new(spec(20), Vec3::new(1.2, 1.1, 0.0));
        driven.driven_by(&driver);

        assert!((driven.spin_speed + 0.8 * 12.0 / 20.0).abs() < 1e-6);

        let offset = driven.position - driver.position;
        let contact = offset.y.atan2(offset.x);
        for t in [0.0, 1.7, 9.2] {
            // Fractional tooth position of each gear at the contact line
            let u_driver = (contact - driver.angle(t)) * 12.0 / TAU;
            let u_driven = (contact + PI - driven.angle(t)) * 20.0 / TAU;
            let sum = (u_driver + u_driven).rem_euclid(1.0);
            assert!((sum - 0.5).abs() < 1e-3, "t = {}: {}", t, sum);
        }
    }

    #[test]
    fn test_update_packs_per_gear_material() {
        let mut cache = GearMeshCache::new();
        let mut a = GearInstance::new(spec(12), Vec3::ZERO);
        a.material = Material::from_hex(0x3b82f6);
        let mut b = GearInstance::new(spec(12), Vec3::X);
        b.material = Material::from_hex(0xf59e0b);
        let mut train = GearTrain::new(vec![a.clone(), b.clone()], &mut cache);

        train.update(0.0);
        let mut calls = 0;
        train.drain_dirty(&mut |_, _| calls += 1);
        assert_eq!(calls, 0);

        train.attach_buffers();
        train.update(0.0);
        let mut colors = Vec::new();
        train.drain_dirty(&mut |_, data| colors.extend(data.iter().map(|r| r.color)));
        assert_eq!(colors, vec![a.material.base_color, b.material.base_color]);
    }
}
