//! Floor sampling.
//!
//! The floor sensor casts one probe straight down from above the body origin
//! plus a ring of probes around it, then reduces the hits to a single floor
//! height. The layout of those probes is a [`ProbeLayout`]; the reduction is
//! [`sample_floor`], which is engine agnostic and receives ray casts through
//! the [`FloorRayCaster`] capability.

use std::f32::consts::TAU;

use bevy::prelude::*;

use crate::collision::CollisionData;
use crate::config::ControllerConfig;

/// Result of one floor sampling pass.
#[derive(Reflect, Debug, Clone, Copy, Default, PartialEq)]
pub struct FloorSample {
    /// Whether at least one probe hit something.
    pub hit: bool,
    /// Mean world height of the hit points, `0.0` when nothing was hit.
    pub average_height: f32,
    /// Number of probes that reported a hit.
    pub hit_count: u32,
}

impl FloorSample {
    /// A sample where no probe hit anything.
    pub fn miss() -> Self {
        Self::default()
    }

    /// Reduce a set of hit heights to a sample.
    ///
    /// Heights are summed in the order given, so a fixed probe order gives
    /// bit-identical results.
    pub fn from_heights(heights: impl IntoIterator<Item = f32>) -> Self {
        let mut sum = 0.0_f32;
        let mut count = 0_u32;
        for height in heights {
            sum += height;
            count += 1;
        }

        if count == 0 {
            Self::miss()
        } else {
            Self {
                hit: true,
                average_height: sum / count as f32,
                hit_count: count,
            }
        }
    }

    /// The sampled floor height, if any probe hit.
    pub fn height(&self) -> Option<f32> {
        self.hit.then_some(self.average_height)
    }
}

/// Geometry of the floor probes, in body-local space.
///
/// Derived once from the configuration and the capsule radius; see
/// [`ProbeLayout::new`].
#[derive(Reflect, Debug, Clone, Copy, PartialEq)]
pub struct ProbeLayout {
    /// Number of probes on the ring (at least one).
    pub ring_count: u32,
    /// Radius of the ring, equal to the capsule radius.
    pub radius: f32,
    /// Height of the probe origins above the body origin.
    pub elevation: f32,
    /// Cast distance of every probe.
    pub length: f32,
}

impl Default for ProbeLayout {
    fn default() -> Self {
        Self::new(&ControllerConfig::default(), 0.5)
    }
}

impl ProbeLayout {
    /// Build the layout for a capsule of the given radius.
    ///
    /// The ring sits at `knee_height + radius` above the body origin and each
    /// probe reaches `probe_extra_length` below the origin. A probe count of
    /// zero is raised to one.
    pub fn new(config: &ControllerConfig, radius: f32) -> Self {
        let elevation = config.knee_height + radius;
        Self {
            ring_count: config.probe_count.max(1),
            radius,
            elevation,
            length: elevation + config.probe_extra_length,
        }
    }

    /// Angle between two neighbouring ring probes.
    #[inline]
    pub fn angle_step(&self) -> f32 {
        TAU / self.ring_count as f32
    }

    /// Total number of probes (center plus ring).
    #[inline]
    pub fn probe_count(&self) -> usize {
        self.ring_count as usize + 1
    }

    /// Body-local probe origins: the center probe first, then the ring in order.
    pub fn local_origins(&self) -> impl Iterator<Item = Vec3> + '_ {
        let step = self.angle_step();
        let center = Vec3::new(0.0, self.elevation, 0.0);
        let ring = (0..self.ring_count).map(move |i| {
            let angle = step * i as f32;
            Vec3::new(
                angle.sin() * self.radius,
                self.elevation,
                angle.cos() * self.radius,
            )
        });
        std::iter::once(center).chain(ring)
    }

    /// World-space probe origins for a body at `pose`.
    pub fn world_origins<'a>(&'a self, pose: &'a Transform) -> impl Iterator<Item = Vec3> + 'a {
        self.local_origins().map(move |local| pose.transform_point(local))
    }
}

/// Capability to cast a ray straight down (world -Y).
///
/// Backends implement this over their query pipeline; tests implement it
/// over a height field. Closures `FnMut(Vec3, f32) -> Option<CollisionData>`
/// implement it directly.
pub trait FloorRayCaster {
    /// Cast from `origin` towards world down for at most `max_distance`.
    fn cast_down(&mut self, origin: Vec3, max_distance: f32) -> Option<CollisionData>;
}

impl<F> FloorRayCaster for F
where
    F: FnMut(Vec3, f32) -> Option<CollisionData>,
{
    fn cast_down(&mut self, origin: Vec3, max_distance: f32) -> Option<CollisionData> {
        self(origin, max_distance)
    }
}

/// Run every probe of `layout` for a body at `pose` and average the hits.
pub fn sample_floor(
    layout: &ProbeLayout,
    pose: &Transform,
    caster: &mut impl FloorRayCaster,
) -> FloorSample {
    let heights = layout
        .world_origins(pose)
        .filter_map(|origin| caster.cast_down(origin, layout.length))
        .map(|hit| hit.height());

    FloorSample::from_heights(heights)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    /// Infinite plane at `height`.
    fn plane(height: f32) -> impl FnMut(Vec3, f32) -> Option<CollisionData> {
        move |origin: Vec3, max: f32| {
            let distance = origin.y - height;
            (distance >= 0.0 && distance <= max)
                .then(|| CollisionData::along_ray(origin, Vec3::NEG_Y, distance, None))
        }
    }

    fn layout(count: u32) -> ProbeLayout {
        ProbeLayout::new(&ControllerConfig::default().with_probe_count(count), 0.5)
    }

    #[test]
    fn layout_derives_elevation_and_length() {
        let config = ControllerConfig::default();
        let layout = ProbeLayout::new(&config, 0.5);

        assert_relative_eq!(layout.elevation, config.knee_height + 0.5);
        assert_relative_eq!(layout.length, layout.elevation + config.probe_extra_length);
        assert_eq!(layout.ring_count, config.probe_count);
        assert_eq!(layout.probe_count(), config.probe_count as usize + 1);
    }

    #[test]
    fn zero_probe_count_is_raised_to_one() {
        let layout = layout(0);
        assert_eq!(layout.ring_count, 1);
        assert_eq!(layout.local_origins().count(), 2);
    }

    #[test]
    fn ring_origins_lie_on_the_capsule_radius() {
        let layout = layout(8);
        let origins: Vec<Vec3> = layout.local_origins().collect();

        assert_eq!(origins[0], Vec3::new(0.0, layout.elevation, 0.0));
        for origin in &origins[1..] {
            assert_relative_eq!(origin.y, layout.elevation);
            assert_relative_eq!(origin.xz().length(), 0.5, epsilon = 1e-6);
        }
        // First ring probe points along +Z.
        assert_relative_eq!(origins[1].z, 0.5);
        assert_relative_eq!(origins[1].x, 0.0);
    }

    #[test]
    fn world_origins_follow_body_pose() {
        let layout = layout(4);
        let pose = Transform::from_xyz(10.0, 2.0, -3.0);
        let origins: Vec<Vec3> = layout.world_origins(&pose).collect();

        assert_eq!(origins[0], Vec3::new(10.0, 2.0 + layout.elevation, -3.0));
    }

    #[test]
    fn no_hits_is_a_valid_miss() {
        let pose = Transform::from_xyz(0.0, 50.0, 0.0);
        let sample = sample_floor(&layout(8), &pose, &mut plane(0.0));

        assert!(!sample.hit);
        assert_eq!(sample.average_height, 0.0);
        assert_eq!(sample.height(), None);
    }

    #[test]
    fn flat_floor_averages_to_floor_height() {
        let pose = Transform::from_xyz(0.0, 2.1, 0.0);
        let sample = sample_floor(&layout(8), &pose, &mut plane(2.0));

        assert!(sample.hit);
        assert_eq!(sample.hit_count, 9);
        assert_relative_eq!(sample.average_height, 2.0, epsilon = 1e-6);
    }

    #[test]
    fn average_covers_only_probes_that_hit() {
        // Floor at 1.0 for x >= 0, nothing for x < 0.
        let mut half_floor = |origin: Vec3, max: f32| {
            if origin.x < -1e-4 {
                return None;
            }
            let distance = origin.y - 1.0;
            (distance >= 0.0 && distance <= max)
                .then(|| CollisionData::along_ray(origin, Vec3::NEG_Y, distance, None))
        };

        let pose = Transform::from_xyz(0.0, 1.0, 0.0);
        let sample = sample_floor(&layout(4), &pose, &mut half_floor);

        // Center, +Z, +X and -Z probes hit; -X misses.
        assert_eq!(sample.hit_count, 4);
        assert_relative_eq!(sample.average_height, 1.0, epsilon = 1e-6);
    }

    #[test]
    fn mixed_heights_average_exactly_the_hits() {
        for count in 1..=12 {
            let layout = layout(count);
            let pose = Transform::from_xyz(0.0, 3.0, 0.0);
            let mut seen = Vec::new();
            let mut stepped = |origin: Vec3, _max: f32| {
                // Every other probe misses; the others hit at varying heights.
                let index = seen.len();
                let height = 2.0 + index as f32 * 0.01;
                seen.push(height);
                (index % 2 == 0).then(|| CollisionData::new(0.0, Vec3::new(origin.x, height, origin.z), None))
            };

            let sample = sample_floor(&layout, &pose, &mut stepped);
            let hits: Vec<f32> = seen.iter().copied().step_by(2).collect();
            let expected = hits.iter().sum::<f32>() / hits.len() as f32;

            assert!(sample.hit);
            assert_eq!(sample.hit_count as usize, hits.len());
            assert_relative_eq!(sample.average_height, expected, epsilon = 1e-5);
        }
    }

    #[test]
    fn reduction_is_order_independent_in_value() {
        let forward = FloorSample::from_heights([1.0, 2.0, 4.0]);
        let backward = FloorSample::from_heights([4.0, 2.0, 1.0]);

        assert_eq!(forward.hit_count, backward.hit_count);
        assert_relative_eq!(forward.average_height, backward.average_height);
    }

    #[test]
    fn repeated_sampling_is_bit_identical() {
        let pose = Transform::from_xyz(0.3, 1.05, -0.7).with_rotation(Quat::from_rotation_y(0.4));
        let mut bumpy = |origin: Vec3, max: f32| {
            let height = (origin.x * 3.1).sin() * 0.05 + (origin.z * 1.7).cos() * 0.05 + 1.0;
            let distance = origin.y - height;
            (distance >= 0.0 && distance <= max)
                .then(|| CollisionData::along_ray(origin, Vec3::NEG_Y, distance, None))
        };

        let layout = layout(8);
        let first = sample_floor(&layout, &pose, &mut bumpy);
        for _ in 0..10 {
            let again = sample_floor(&layout, &pose, &mut bumpy);
            assert_eq!(first.average_height.to_bits(), again.average_height.to_bits());
            assert_eq!(first.hit_count, again.hit_count);
        }
    }
}
