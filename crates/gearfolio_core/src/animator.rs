//! Instanced animator
//!
//! Owns the descriptors of an instance field, partitioned by geometry
//! class, and one [`InstanceBuffer`] per class. Each update recomputes
//! every instance's transform with the active [`AnimationPreset`] and
//! writes it into its class buffer.
//!
//! Buffers are attached after construction (typically once the renderer
//! has created the matching GPU batches). A class without a buffer is
//! skipped for the frame.

use std::fmt;

use crate::instance::{InstanceDescriptor, InstanceRaw};
use crate::instance_buffer::{InstanceBuffer, InstanceBufferError};
use crate::material::Material;
use crate::preset::AnimationPreset;

/// Error type for animator setup
#[derive(Debug, Clone, PartialEq)]
pub enum AnimatorError {
    /// A descriptor or request names a class the animator does not have
    UnknownClass {
        /// Requested class
        class: usize,
        /// Number of classes
        class_count: usize,
    },
    /// The buffer's capacity does not match the class partition
    CapacityMismatch {
        /// Class the buffer was attached to
        class: usize,
        /// Instances in the class
        expected: usize,
        /// Capacity of the offered buffer
        actual: usize,
    },
    /// Error from an instance buffer write
    Buffer(InstanceBufferError),
}

impl fmt::Display for AnimatorError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AnimatorError::UnknownClass { class, class_count } => {
                write!(f, "Unknown geometry class {} (animator has {})", class, class_count)
            }
            AnimatorError::CapacityMismatch { class, expected, actual } => write!(
                f,
                "Buffer for class {} holds {} instances, partition has {}",
                class, actual, expected
            ),
            AnimatorError::Buffer(e) => write!(f, "Instance buffer error: {}", e),
        }
    }
}

impl std::error::Error for AnimatorError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            AnimatorError::Buffer(e) => Some(e),
            _ => None,
        }
    }
}

impl From<InstanceBufferError> for AnimatorError {
    fn from(e: InstanceBufferError) -> Self {
        AnimatorError::Buffer(e)
    }
}

/// What happened during one [`InstancedAnimator::update`]
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct FrameStats {
    /// Classes whose buffer was rewritten and marked dirty
    pub classes_updated: usize,
    /// Classes skipped because no buffer is attached
    pub classes_skipped: usize,
    /// Instances written this frame
    pub instances_written: usize,
}

/// Animates a field of instances across several geometry classes
pub struct InstancedAnimator {
    partitions: Vec<Vec<InstanceDescriptor>>,
    buffers: Vec<Option<InstanceBuffer>>,
    preset: AnimationPreset,
}

impl InstancedAnimator {
    /// Partition `descriptors` into `class_count` classes
    ///
    /// Order within a class follows the input order; an instance's slot is
    /// its position in its partition.
    pub fn new(
        descriptors: Vec<InstanceDescriptor>,
        class_count: usize,
        preset: AnimationPreset,
    ) -> Result<Self, AnimatorError> {
        let mut partitions = vec![Vec::new(); class_count];
        for d in descriptors {
            let partition = partitions
                .get_mut(d.class_index)
                .ok_or(AnimatorError::UnknownClass { class: d.class_index, class_count })?;
            partition.push(d);
        }

        log::debug!(
            "Animator partitioned {} instances into {} classes",
            partitions.iter().map(Vec::len).sum::<usize>(),
            class_count
        );

        Ok(Self {
            buffers: vec![None; class_count],
            partitions,
            preset,
        })
    }

    /// Number of geometry classes
    pub fn class_count(&self) -> usize {
        self.partitions.len()
    }

    /// Total number of instances
    pub fn instance_count(&self) -> usize {
        self.partitions.iter().map(Vec::len).sum()
    }

    /// Number of instances in `class` (the capacity its buffer must have)
    pub fn class_len(&self, class: usize) -> usize {
        self.partitions.get(class).map_or(0, Vec::len)
    }

    /// Descriptors of one class in slot order
    pub fn descriptors(&self, class: usize) -> &[InstanceDescriptor] {
        self.partitions.get(class).map_or(&[], Vec::as_slice)
    }

    /// The active preset
    pub fn preset(&self) -> &AnimationPreset {
        &self.preset
    }

    /// Switch to another preset; takes effect on the next update
    pub fn set_preset(&mut self, preset: AnimationPreset) {
        self.preset = preset;
    }

    /// Attach the buffer for `class`, replacing any previous one
    ///
    /// The buffer's capacity must equal the class partition size.
    pub fn attach_buffer(&mut self, class: usize, buffer: InstanceBuffer) -> Result<(), AnimatorError> {
        let class_count = self.class_count();
        let expected = self.class_len(class);
        let slot = self
            .buffers
            .get_mut(class)
            .ok_or(AnimatorError::UnknownClass { class, class_count })?;
        if buffer.capacity() != expected {
            return Err(AnimatorError::CapacityMismatch {
                class,
                expected,
                actual: buffer.capacity(),
            });
        }
        *slot = Some(buffer);
        Ok(())
    }

    /// Attach a correctly sized buffer to every class
    ///
    /// `materials[c]` is used for class `c`; missing entries fall back to
    /// the default material.
    pub fn attach_all(&mut self, materials: &[Material]) {
        for class in 0..self.class_count() {
            let material = materials.get(class).copied().unwrap_or_default();
            self.buffers[class] = Some(InstanceBuffer::new(self.class_len(class), material));
        }
    }

    /// Remove and return the buffer of `class`
    pub fn detach_buffer(&mut self, class: usize) -> Option<InstanceBuffer> {
        self.buffers.get_mut(class).and_then(Option::take)
    }

    /// Drop every attached buffer
    pub fn detach_all(&mut self) {
        for buffer in &mut self.buffers {
            *buffer = None;
        }
    }

    /// Whether `class` has a buffer attached
    pub fn is_attached(&self, class: usize) -> bool {
        matches!(self.buffers.get(class), Some(Some(_)))
    }

    /// Buffer of `class`, if attached
    pub fn buffer(&self, class: usize) -> Option<&InstanceBuffer> {
        self.buffers.get(class).and_then(Option::as_ref)
    }

    /// Recompute every attached class at elapsed time `t`
    ///
    /// Each updated class buffer is marked dirty exactly once.
    pub fn update(&mut self, t: f32) -> FrameStats {
        let mut stats = FrameStats::default();
        for (class, (partition, buffer)) in self.partitions.iter().zip(&mut self.buffers).enumerate() {
            let Some(buffer) = buffer else {
                log::trace!("Class {} has no buffer attached, skipping", class);
                stats.classes_skipped += 1;
                continue;
            };

            for (slot, descriptor) in partition.iter().enumerate() {
                let transform = self.preset.frame_transform(descriptor, t);
                match buffer.write(slot, &transform) {
                    Ok(()) => stats.instances_written += 1,
                    Err(e) => log::warn!("Class {}: {}", class, e),
                }
            }
            buffer.mark_dirty();
            stats.classes_updated += 1;
        }
        stats
    }

    /// Drain dirty class buffers as `(class, instances)` pairs
    pub fn take_dirty(&mut self) -> impl Iterator<Item = (usize, &[InstanceRaw])> + '_ {
        self.buffers
            .iter_mut()
            .enumerate()
            .filter_map(|(class, buffer)| buffer.as_mut()?.take_dirty().map(|data| (class, data)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::Vec3;

    fn descriptors(classes: &[usize]) -> Vec<InstanceDescriptor> {
        classes
            .iter()
            .enumerate()
            .map(|(i, &c)| InstanceDescriptor::new(Vec3::new(i as f32, 0.0, 0.0), c))
            .collect()
    }

    #[test]
    fn test_partition_sizes() {
        let animator =
            InstancedAnimator::new(descriptors(&[0, 1, 1, 2, 1]), 3, AnimationPreset::default()).unwrap();
        assert_eq!(animator.class_len(0), 1);
        assert_eq!(animator.class_len(1), 3);
        assert_eq!(animator.class_len(2), 1);
        assert_eq!(animator.instance_count(), 5);
        // Slot order follows input order
        let xs: Vec<f32> = animator.descriptors(1).iter().map(|d| d.base_position.x).collect();
        assert_eq!(xs, vec![1.0, 2.0, 4.0]);
    }

    #[test]
    fn test_unknown_class_rejected() {
        let result = InstancedAnimator::new(descriptors(&[0, 3]), 2, AnimationPreset::default());
        assert!(matches!(result, Err(AnimatorError::UnknownClass { class: 3, class_count: 2 })));
    }

    #[test]
    fn test_capacity_mismatch_rejected() {
        let mut animator =
            InstancedAnimator::new(descriptors(&[0, 0, 1]), 2, AnimationPreset::default()).unwrap();
        let err = animator
            .attach_buffer(0, InstanceBuffer::new(3, Material::GRAY))
            .unwrap_err();
        assert_eq!(err, AnimatorError::CapacityMismatch { class: 0, expected: 2, actual: 3 });
        assert!(!animator.is_attached(0));
        animator.attach_buffer(0, InstanceBuffer::new(2, Material::GRAY)).unwrap();
        assert!(animator.is_attached(0));
    }

    #[test]
    fn test_unattached_class_is_skipped() {
        let mut animator =
            InstancedAnimator::new(descriptors(&[0, 1, 1]), 2, AnimationPreset::default()).unwrap();
        animator.attach_buffer(1, InstanceBuffer::new(2, Material::GRAY)).unwrap();
        let stats = animator.update(0.5);
        assert_eq!(
            stats,
            FrameStats { classes_updated: 1, classes_skipped: 1, instances_written: 2 }
        );
        let dirty: Vec<usize> = animator.take_dirty().map(|(class, _)| class).collect();
        assert_eq!(dirty, vec![1]);
    }

    #[test]
    fn test_update_marks_each_class_dirty_once() {
        let mut animator =
            InstancedAnimator::new(descriptors(&[0, 1, 0, 1]), 2, AnimationPreset::default()).unwrap();
        animator.attach_all(&[Material::GRAY]);
        animator.update(1.0);
        assert_eq!(animator.buffer(0).map(InstanceBuffer::generation), Some(1));
        assert_eq!(animator.buffer(1).map(InstanceBuffer::generation), Some(1));
        // Missing material falls back to the default
        assert_eq!(animator.buffer(1).map(|b| *b.material()), Some(Material::default()));

        assert_eq!(animator.take_dirty().count(), 2);
        assert_eq!(animator.take_dirty().count(), 0);
    }

    #[test]
    fn test_written_transforms_match_preset() {
        let preset = AnimationPreset::wobble(0.5);
        let mut animator = InstancedAnimator::new(descriptors(&[0, 0]), 1, preset).unwrap();
        animator.attach_all(&[]);
        animator.update(2.0);
        let expected = preset.frame_transform(&animator.descriptors(0)[1], 2.0).to_matrix();
        let written = animator.buffer(0).unwrap().as_slice()[1].model_matrix();
        assert!(written.abs_diff_eq(expected, 1e-6));
    }

    #[test]
    fn test_detach() {
        let mut animator =
            InstancedAnimator::new(descriptors(&[0, 1]), 2, AnimationPreset::default()).unwrap();
        animator.attach_all(&[]);
        assert!(animator.detach_buffer(0).is_some());
        assert!(!animator.is_attached(0));
        animator.detach_all();
        assert_eq!(animator.update(0.0).classes_skipped, 2);
    }
}
