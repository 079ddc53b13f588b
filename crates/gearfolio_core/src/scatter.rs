//! Seeded placement of animated instances
//!
//! Scattering is a pure function of its [`ScatterConfig`]: the same seed
//! always produces the same descriptors.

use std::f32::consts::TAU;
use std::fmt;

use glam::Vec3;
use rand::{Rng, SeedableRng};
use rand_pcg::Pcg64;
use serde::{Deserialize, Serialize};

use crate::instance::InstanceDescriptor;

/// Parameters for [`scatter`]
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScatterConfig {
    /// Number of instances to place
    pub count: usize,
    /// Number of geometry classes; instances are assigned round-robin
    pub class_count: usize,
    /// Center of the placement box
    pub center: Vec3,
    /// Half-size of the placement box on each axis
    pub extent: Vec3,
    /// Uniform scale range (inclusive)
    pub scale_range: [f32; 2],
    /// Drift speed range (inclusive)
    pub speed_range: [f32; 2],
    /// Phase offset range (inclusive)
    pub phase_range: [f32; 2],
    /// RNG seed
    pub seed: u64,
}

impl Default for ScatterConfig {
    fn default() -> Self {
        Self {
            count: 500,
            class_count: 5,
            center: Vec3::new(0.0, 0.0, -6.0),
            extent: Vec3::new(18.0, 11.0, 8.0),
            scale_range: [0.08, 0.3],
            speed_range: [0.2, 1.2],
            phase_range: [0.0, TAU],
            seed: 0x6765_6172,
        }
    }
}

/// Invalid scatter parameters
#[derive(Debug, Clone, PartialEq)]
pub enum ScatterError {
    /// Instances requested but no class to put them in
    NoClasses,
    /// A range has min > max or a non-finite bound
    InvalidRange {
        /// Field name
        name: &'static str,
        /// The offending range
        range: [f32; 2],
    },
    /// Negative or non-finite placement extent
    InvalidExtent(Vec3),
}

impl fmt::Display for ScatterError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ScatterError::NoClasses => write!(f, "Scatter needs at least one geometry class"),
            ScatterError::InvalidRange { name, range } => {
                write!(f, "Invalid {} range [{}, {}]", name, range[0], range[1])
            }
            ScatterError::InvalidExtent(e) => write!(f, "Invalid scatter extent {:?}", e),
        }
    }
}

impl std::error::Error for ScatterError {}

fn check_range(name: &'static str, range: [f32; 2]) -> Result<(), ScatterError> {
    if range[0].is_finite() && range[1].is_finite() && range[0] <= range[1] {
        Ok(())
    } else {
        Err(ScatterError::InvalidRange { name, range })
    }
}

fn sample(rng: &mut Pcg64, range: [f32; 2]) -> f32 {
    if range[0] == range[1] {
        range[0]
    } else {
        rng.random_range(range[0]..=range[1])
    }
}

/// Place `config.count` instances at random inside the configured box
///
/// Draw order per instance is fixed (x, y, z, phase, scale, speed) so the
/// output only depends on the config.
pub fn scatter(config: &ScatterConfig) -> Result<Vec<InstanceDescriptor>, ScatterError> {
    if config.count > 0 && config.class_count == 0 {
        return Err(ScatterError::NoClasses);
    }
    if !config.extent.is_finite() || config.extent.min_element() < 0.0 {
        return Err(ScatterError::InvalidExtent(config.extent));
    }
    check_range("scale", config.scale_range)?;
    check_range("speed", config.speed_range)?;
    check_range("phase", config.phase_range)?;

    let mut rng = Pcg64::seed_from_u64(config.seed);
    let e = config.extent;
    let descriptors = (0..config.count)
        .map(|i| {
            let offset = Vec3::new(
                sample(&mut rng, [-e.x, e.x]),
                sample(&mut rng, [-e.y, e.y]),
                sample(&mut rng, [-e.z, e.z]),
            );
            InstanceDescriptor {
                base_position: config.center + offset,
                class_index: i % config.class_count,
                phase_offset: sample(&mut rng, config.phase_range),
                scale: sample(&mut rng, config.scale_range),
                speed: sample(&mut rng, config.speed_range),
            }
        })
        .collect();

    Ok(descriptors)
}
