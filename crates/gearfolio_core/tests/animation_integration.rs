//! End-to-end tests of scatter + animator + instance buffers

use std::f32::consts::TAU;

use gearfolio_core::{
    scatter, AnimationPreset, InstanceBuffer, InstancedAnimator, Material, ScatterConfig,
};

fn field(count: usize, classes: usize) -> InstancedAnimator {
    let config = ScatterConfig { count, class_count: classes, ..Default::default() };
    let descriptors = scatter(&config).unwrap();
    InstancedAnimator::new(descriptors, classes, AnimationPreset::default()).unwrap()
}

#[test]
fn five_hundred_instances_split_evenly_over_five_classes() {
    let mut animator = field(500, 5);
    for class in 0..5 {
        assert_eq!(animator.class_len(class), 100);
    }

    animator.attach_all(&[Material::GRAY; 5]);
    let stats = animator.update(0.0);
    assert_eq!(stats.classes_updated, 5);
    assert_eq!(stats.instances_written, 500);

    let sizes: Vec<(usize, usize)> = animator.take_dirty().map(|(c, data)| (c, data.len())).collect();
    assert_eq!(sizes, (0..5).map(|c| (c, 100)).collect::<Vec<_>>());
}

#[test]
fn buffers_match_partition_capacity() {
    let mut animator = field(37, 4);
    for class in 0..4 {
        let capacity = animator.class_len(class);
        let too_big = InstanceBuffer::new(capacity + 1, Material::GRAY);
        assert!(animator.attach_buffer(class, too_big).is_err());
        animator
            .attach_buffer(class, InstanceBuffer::new(capacity, Material::GRAY))
            .unwrap();
    }
    assert_eq!((0..4).map(|c| animator.class_len(c)).sum::<usize>(), 37);
    assert_eq!(animator.update(3.0).instances_written, 37);
}

#[test]
fn positions_repeat_after_one_wobble_period() {
    let mut animator = field(50, 2);
    animator.attach_all(&[]);
    let period = TAU / 0.5;

    animator.update(1.25);
    let before: Vec<_> = animator.buffer(0).unwrap().as_slice().iter().map(|r| r.translation()).collect();
    animator.update(1.25 + period);
    let after: Vec<_> = animator.buffer(0).unwrap().as_slice().iter().map(|r| r.translation()).collect();

    for (a, b) in before.iter().zip(&after) {
        assert!((*a - *b).length() < 1e-3, "{:?} vs {:?}", a, b);
    }
}

#[test]
fn long_runs_stay_finite() {
    let mut animator = field(100, 5);
    animator.attach_all(&[]);
    animator.set_preset(AnimationPreset::slide(0.5, -14.0, 16.0));
    for frame in 0..600 {
        let t = frame as f32 / 60.0 * 37.0;
        animator.update(t);
        for (_, data) in animator.take_dirty() {
            for raw in data {
                assert!(raw.model_matrix().is_finite(), "NaN at t = {}", t);
                let z = raw.translation().z;
                assert!((-14.0..2.0).contains(&z), "z = {} at t = {}", z, t);
            }
        }
    }
}

#[test]
fn huge_elapsed_time_stays_finite() {
    let mut animator = field(100, 5);
    animator.attach_all(&[]);
    animator.set_preset(AnimationPreset::slide(0.5, -14.0, 16.0));
    for t in [f32::MAX / 2.0, f32::MAX] {
        animator.update(t);
        for (_, data) in animator.take_dirty() {
            for raw in data {
                assert!(raw.model_matrix().is_finite(), "NaN at t = {}", t);
                let z = raw.translation().z;
                assert!((-14.0..2.0).contains(&z), "z = {} at t = {}", z, t);
            }
        }
    }
}

#[test]
fn each_class_is_marked_dirty_once_per_update() {
    let mut animator = field(20, 3);
    animator.attach_all(&[]);
    for frame in 1..=4u64 {
        animator.update(frame as f32 * 0.016);
        for class in 0..3 {
            assert_eq!(animator.buffer(class).unwrap().generation(), frame);
        }
    }
    assert_eq!(animator.take_dirty().count(), 3);
    assert_eq!(animator.take_dirty().count(), 0);
}

#[test]
fn update_before_attach_is_a_no_op() {
    let mut animator = field(20, 3);
    let stats = animator.update(1.0);
    assert_eq!(stats.classes_updated, 0);
    assert_eq!(stats.classes_skipped, 3);
    assert_eq!(animator.take_dirty().count(), 0);
}
