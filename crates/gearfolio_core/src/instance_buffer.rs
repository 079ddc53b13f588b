//! CPU-side instance buffers
//!
//! An [`InstanceBuffer`] holds a fixed number of [`InstanceRaw`] slots and a
//! dirty flag. Writers fill slots and mark the buffer dirty once; the
//! renderer drains it with [`InstanceBuffer::take_dirty`].

use std::fmt;

use glam::Mat4;

use crate::instance::{FrameTransform, InstanceRaw};
use crate::material::Material;

/// Error writing into an instance buffer
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InstanceBufferError {
    /// Slot index past the buffer's capacity
    OutOfBounds {
        /// Requested slot
        slot: usize,
        /// Buffer capacity
        capacity: usize,
    },
}

impl fmt::Display for InstanceBufferError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            InstanceBufferError::OutOfBounds { slot, capacity } => {
                write!(f, "Instance slot {} out of bounds (capacity {})", slot, capacity)
            }
        }
    }
}

impl std::error::Error for InstanceBufferError {}

/// Fixed-capacity instance storage for one mesh
#[derive(Clone, Debug)]
pub struct InstanceBuffer {
    slots: Vec<InstanceRaw>,
    material: Material,
    dirty: bool,
    generation: u64,
}

impl InstanceBuffer {
    /// Create a buffer with `capacity` hidden slots drawn with `material`
    pub fn new(capacity: usize, material: Material) -> Self {
        Self {
            slots: vec![InstanceRaw::hidden(); capacity],
            material,
            dirty: false,
            generation: 0,
        }
    }

    /// Number of slots
    #[inline]
    pub fn capacity(&self) -> usize {
        self.slots.len()
    }

    /// Material applied by [`write`](Self::write)
    pub fn material(&self) -> &Material {
        &self.material
    }

    /// Change the material used by future writes
    pub fn set_material(&mut self, material: Material) {
        self.material = material;
    }

    /// Write a transform into `slot` using the buffer's material
    pub fn write(&mut self, slot: usize, transform: &FrameTransform) -> Result<(), InstanceBufferError> {
        let raw = InstanceRaw::new(transform.to_matrix(), &self.material);
        self.write_raw(slot, raw)
    }

    /// Write a model matrix into `slot` using the buffer's material
    pub fn write_matrix(&mut self, slot: usize, model: Mat4) -> Result<(), InstanceBufferError> {
        let raw = InstanceRaw::new(model, &self.material);
        self.write_raw(slot, raw)
    }

    /// Write a prepared record into `slot`
    pub fn write_raw(&mut self, slot: usize, raw: InstanceRaw) -> Result<(), InstanceBufferError> {
        let capacity = self.capacity();
        let target = self
            .slots
            .get_mut(slot)
            .ok_or(InstanceBufferError::OutOfBounds { slot, capacity })?;
        *target = raw;
        Ok(())
    }

    /// Flag the contents as changed since the last upload
    pub fn mark_dirty(&mut self) {
        self.dirty = true;
        self.generation += 1;
    }

    /// Whether the contents changed since the last [`take_dirty`](Self::take_dirty)
    #[inline]
    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    /// Number of times the buffer has been marked dirty
    #[inline]
    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// Read-only view of all slots
    pub fn as_slice(&self) -> &[InstanceRaw] {
        &self.slots
    }

    /// Return the slots if dirty and clear the flag
    pub fn take_dirty(&mut self) -> Option<&[InstanceRaw]> {
        if self.dirty {
            self.dirty = false;
            Some(&self.slots)
        } else {
            None
        }
    }
}
