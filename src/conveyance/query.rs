//! Spatial query targets: which entity answers discovery hits for an interactable.
use bevy::{
    math::bounding::{Aabb3d, BoundingSphere, RayCast3d},
    prelude::*,
};

/// Simple world-aligned shape used for hit tests. Rotation of the owning entity is ignored.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum QueryShape {
    Sphere { radius: f32 },
    Box { half_extents: Vec3 },
}

impl QueryShape {
    pub fn sphere(radius: f32) -> Self {
        Self::Sphere {
            radius: radius.max(0.0),
        }
    }

    pub fn cuboid(half_extents: Vec3) -> Self {
        Self::Box {
            half_extents: half_extents.abs(),
        }
    }

    /// Distance along the ray to the first hit, if any, with the shape centred at `center`.
    pub fn ray_hit_distance(&self, center: Vec3, ray: &RayCast3d) -> Option<f32> {
        match *self {
            Self::Sphere { radius } => {
                ray.sphere_intersection_at(&BoundingSphere::new(center, radius))
            }
            Self::Box { half_extents } => {
                ray.aabb_intersection_at(&Aabb3d::new(center, half_extents))
            }
        }
    }

    pub fn contains_point(&self, center: Vec3, point: Vec3) -> bool {
        match *self {
            Self::Sphere { radius } => center.distance_squared(point) <= radius * radius,
            Self::Box { half_extents } => {
                let offset = (point - center).abs();
                offset.cmple(half_extents).all()
            }
        }
    }
}

/// A query-only volume: ignores every channel except interaction discovery.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct QueryVolume {
    pub entity: Entity,
    pub shape: QueryShape,
}

/// The visible body of an interactable. Used for discovery only when no query volume is given.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PhysicalRepresentation {
    pub entity: Entity,
    pub bounds: QueryShape,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QueryTargetKind {
    Volume,
    Physical,
}

/// Whether discovery hits on a query target are accepted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CollisionResponse {
    #[default]
    Block,
    Ignore,
}

impl CollisionResponse {
    pub fn for_disabled(disabled: bool) -> Self {
        if disabled {
            Self::Ignore
        } else {
            Self::Block
        }
    }

    pub fn blocks(self) -> bool {
        matches!(self, Self::Block)
    }
}

/// The single entity that participates in spatial queries for an interactable.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct QueryTarget {
    pub entity: Entity,
    pub shape: QueryShape,
    pub kind: QueryTargetKind,
}

impl QueryTarget {
    /// A query volume always wins over the physical representation.
    pub fn choose(
        volume: Option<&QueryVolume>,
        physical: Option<&PhysicalRepresentation>,
    ) -> Option<Self> {
        match (volume, physical) {
            (Some(volume), _) => Some(Self {
                entity: volume.entity,
                shape: volume.shape,
                kind: QueryTargetKind::Volume,
            }),
            (None, Some(physical)) => Some(Self {
                entity: physical.entity,
                shape: physical.bounds,
                kind: QueryTargetKind::Physical,
            }),
            (None, None) => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ray_hits_sphere_and_box_in_front_only() {
        let ray = RayCast3d::new(Vec3::ZERO, Dir3::NEG_Z, 10.0);

        let sphere = QueryShape::sphere(1.0);
        let distance = sphere
            .ray_hit_distance(Vec3::new(0.0, 0.0, -5.0), &ray)
            .expect("sphere in front should be hit");
        assert!((distance - 4.0).abs() < 1e-4);
        assert!(sphere.ray_hit_distance(Vec3::new(0.0, 0.0, 5.0), &ray).is_none());

        let cuboid = QueryShape::cuboid(Vec3::splat(0.5));
        assert!(cuboid.ray_hit_distance(Vec3::new(0.0, 0.0, -3.0), &ray).is_some());
        assert!(cuboid.ray_hit_distance(Vec3::new(0.0, 0.0, -30.0), &ray).is_none());
    }

    #[test]
    fn containment_respects_shape_extents() {
        let cuboid = QueryShape::cuboid(Vec3::new(1.0, 2.0, 1.0));
        assert!(cuboid.contains_point(Vec3::ZERO, Vec3::new(0.5, 1.9, -0.9)));
        assert!(!cuboid.contains_point(Vec3::ZERO, Vec3::new(1.1, 0.0, 0.0)));

        let sphere = QueryShape::sphere(2.0);
        assert!(sphere.contains_point(Vec3::ONE, Vec3::new(1.0, 2.5, 1.0)));
        assert!(!sphere.contains_point(Vec3::ONE, Vec3::new(4.0, 1.0, 1.0)));
    }

    #[test]
    fn query_volume_takes_precedence() {
        let mut world = World::new();
        let volume_entity = world.spawn_empty().id();
        let mesh_entity = world.spawn_empty().id();
        let volume = QueryVolume {
            entity: volume_entity,
            shape: QueryShape::sphere(1.0),
        };
        let physical = PhysicalRepresentation {
            entity: mesh_entity,
            bounds: QueryShape::cuboid(Vec3::ONE),
        };

        let chosen = QueryTarget::choose(Some(&volume), Some(&physical)).expect("target");
        assert_eq!(chosen.entity, volume_entity);
        assert_eq!(chosen.kind, QueryTargetKind::Volume);

        let fallback = QueryTarget::choose(None, Some(&physical)).expect("target");
        assert_eq!(fallback.entity, mesh_entity);
        assert_eq!(fallback.kind, QueryTargetKind::Physical);

        assert!(QueryTarget::choose(None, None).is_none());
    }
}
