// Copyright 2026 the Tacticsgrid Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Scoped collision query sessions.
//!
//! A [`QuerySession`] borrows a committed [`Scene`] and answers ray, sphere
//! and segment queries against the subtree of one root. It owns its traversal
//! stack and hit buffer, so repeated queries do not allocate.

use glam::DVec3;
use tacticsgrid_index::Aabb3D;

use crate::error::{QueryError, QueryResult};
use crate::scene::Scene;
use crate::solid::{
    Solid, ray_aabb, ray_sphere, ray_triangle, sphere_aabb, sphere_segment, sphere_triangle,
};
use crate::types::{CollideMask, NodeContent, NodeId};

/// One intersection along a ray.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct RayHit {
    /// World-space hit point.
    pub point: DVec3,
    /// Ray parameter of the hit, in units of the direction's length.
    pub t: f64,
    /// Node whose solid or triangle was hit.
    pub node: NodeId,
}

/// Work counters, accumulated across the queries of a session.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct QueryStats {
    /// Scene nodes whose bounds were examined.
    pub nodes_visited: usize,
    /// Solids and mesh triangles run through an exact test.
    pub solids_tested: usize,
}

/// A probe reduced to what the traversal needs.
#[derive(Copy, Clone, Debug)]
enum Probe {
    Ray { origin: DVec3, dir: DVec3, t_max: f64 },
    Sphere { center: DVec3, radius: f64 },
    Segment { a: DVec3, b: DVec3 },
}

impl Probe {
    fn touches_box(&self, aabb: &Aabb3D) -> bool {
        match *self {
            Self::Ray { origin, dir, t_max } => ray_aabb(origin, dir, aabb, t_max),
            Self::Sphere { center, radius } => sphere_aabb(center, radius, aabb),
            Self::Segment { a, b } => ray_aabb(a, b - a, aabb, 1.0),
        }
    }

    /// Exact test of a world-space target. Returns the ray parameter for rays
    /// and `0.0` for a boolean contact.
    fn test(&self, target: &Solid) -> Option<f64> {
        match (*self, *target) {
            (Self::Ray { origin, dir, t_max }, Solid::Sphere { center, radius }) => {
                ray_sphere(origin, dir, center, radius, t_max)
            }
            (Self::Ray { origin, dir, t_max }, Solid::Polygon(tri)) => {
                ray_triangle(origin, dir, &tri, t_max)
            }
            (Self::Sphere { center, radius }, Solid::Sphere { center: c, radius: r }) => {
                (center.distance_squared(c) <= (radius + r) * (radius + r)).then_some(0.0)
            }
            (Self::Sphere { center, radius }, Solid::Polygon(tri)) => {
                sphere_triangle(center, radius, &tri).then_some(0.0)
            }
            (Self::Segment { a, b }, Solid::Sphere { center, radius }) => {
                sphere_segment(center, radius, a, b).then_some(0.0)
            }
            (Self::Segment { a, b }, Solid::Polygon(tri)) => ray_triangle(a, b - a, &tri, 1.0),
            _ => None,
        }
    }
}

/// Whether the traversal collects every hit or stops at the first.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
enum Collect {
    All,
    First,
}

/// A query context borrowed from a committed [`Scene`].
///
/// While a session is alive the scene cannot be edited, and because every
/// query takes `&mut self` a session is never used by two callers at once.
pub struct QuerySession<'a> {
    scene: &'a Scene,
    root: NodeId,
    stack: Vec<NodeId>,
    hits: Vec<RayHit>,
    stats: QueryStats,
}

impl core::fmt::Debug for QuerySession<'_> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("QuerySession")
            .field("root", &self.root)
            .field("hits", &self.hits.len())
            .field("stats", &self.stats)
            .finish_non_exhaustive()
    }
}

impl Scene {
    /// Open a query session over the subtree of `root`.
    ///
    /// Fails if the scene has uncommitted edits or `root` is stale.
    pub fn session(&self, root: NodeId) -> QueryResult<QuerySession<'_>> {
        self.check_ready(root)?;
        Ok(QuerySession {
            scene: self,
            root,
            stack: Vec::new(),
            hits: Vec::new(),
            stats: QueryStats::default(),
        })
    }
}

impl<'a> QuerySession<'a> {
    /// The scene this session reads.
    pub fn scene(&self) -> &'a Scene {
        self.scene
    }

    /// Root of the queried subtree.
    pub fn root(&self) -> NodeId {
        self.root
    }

    /// Work done so far.
    pub fn stats(&self) -> QueryStats {
        self.stats
    }

    /// Zero the work counters.
    pub fn reset_stats(&mut self) {
        self.stats = QueryStats::default();
    }

    /// Every intersection of the ray with geometry on `mask`, nearest first.
    ///
    /// Each solid or triangle reports at most one hit: its entry point, or
    /// its exit point if the ray starts inside a sphere. Hits at equal
    /// distance keep traversal order.
    pub fn ray_hits(
        &mut self,
        origin: DVec3,
        direction: DVec3,
        mask: CollideMask,
    ) -> QueryResult<&[RayHit]> {
        Solid::Ray { origin, direction }
            .validate()
            .map_err(QueryError::InvalidProbe)?;
        let probe = Probe::Ray {
            origin,
            dir: direction,
            t_max: f64::INFINITY,
        };
        self.hits.clear();
        self.traverse(probe, mask, Collect::All)?;
        self.hits.sort_by(|a, b| a.t.total_cmp(&b.t));
        for hit in &mut self.hits {
            hit.point = origin + direction * hit.t;
        }
        Ok(&self.hits)
    }

    /// Whether a sphere touches any geometry on `mask`.
    pub fn sphere_overlaps(
        &mut self,
        center: DVec3,
        radius: f64,
        mask: CollideMask,
    ) -> QueryResult<bool> {
        Solid::Sphere { center, radius }
            .validate()
            .map_err(QueryError::InvalidProbe)?;
        self.hits.clear();
        self.traverse(Probe::Sphere { center, radius }, mask, Collect::First)?;
        Ok(!self.hits.is_empty())
    }

    /// Whether the segment `a..b` touches any geometry on `mask`.
    pub fn segment_hits(&mut self, a: DVec3, b: DVec3, mask: CollideMask) -> QueryResult<bool> {
        Solid::Segment { a, b }
            .validate()
            .map_err(QueryError::InvalidProbe)?;
        self.hits.clear();
        self.traverse(Probe::Segment { a, b }, mask, Collect::First)?;
        Ok(!self.hits.is_empty())
    }

    fn traverse(&mut self, probe: Probe, mask: CollideMask, collect: Collect) -> QueryResult<()> {
        self.stack.clear();
        self.stack.push(self.root);
        while let Some(id) = self.stack.pop() {
            let node = self.scene.node(id).ok_or(QueryError::DanglingNode(id))?;
            self.stats.nodes_visited += 1;
            let Some(subtree) = node.world.subtree_bounds else {
                continue;
            };
            if !probe.touches_box(&subtree) {
                continue;
            }
            let content = &node.local.content;
            let candidate = content.into_mask().intersects(mask)
                && node
                    .world
                    .content_bounds
                    .is_some_and(|b| probe.touches_box(&b));
            if candidate {
                let world = node.world.transform;
                match content {
                    NodeContent::Collision(c) => {
                        for (index, solid) in c.solids.iter().enumerate() {
                            if !solid.is_target() {
                                continue;
                            }
                            let target = solid.transformed(&world);
                            target
                                .validate()
                                .map_err(|reason| QueryError::MalformedSolid {
                                    node: id,
                                    index,
                                    reason,
                                })?;
                            self.stats.solids_tested += 1;
                            if let Some(t) = probe.test(&target) {
                                self.hits.push(RayHit {
                                    point: DVec3::ZERO,
                                    t,
                                    node: id,
                                });
                                if collect == Collect::First {
                                    return Ok(());
                                }
                            }
                        }
                    }
                    NodeContent::Mesh(m) => {
                        for (triangle, tri) in m.triangles.iter().enumerate() {
                            let target = Solid::Polygon(*tri).transformed(&world);
                            target
                                .validate()
                                .map_err(|reason| QueryError::MalformedMesh {
                                    node: id,
                                    triangle,
                                    reason,
                                })?;
                            self.stats.solids_tested += 1;
                            if let Some(t) = probe.test(&target) {
                                self.hits.push(RayHit {
                                    point: DVec3::ZERO,
                                    t,
                                    node: id,
                                });
                                if collect == Collect::First {
                                    return Ok(());
                                }
                            }
                        }
                    }
                    NodeContent::Empty => {}
                }
            }
            self.stack.extend(node.children.iter().rev());
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{CollisionNode, LocalNode, MeshNode};
    use glam::DAffine3;

    fn square(z: f64) -> Vec<[DVec3; 3]> {
        vec![
            [
                DVec3::new(0.0, 0.0, z),
                DVec3::new(1.0, 0.0, z),
                DVec3::new(1.0, 1.0, z),
            ],
            [
                DVec3::new(0.0, 0.0, z),
                DVec3::new(1.0, 1.0, z),
                DVec3::new(0.0, 1.0, z),
            ],
        ]
    }

    fn floor_scene() -> (Scene, NodeId) {
        let mut scene = Scene::new();
        let root = scene.insert(None, LocalNode::named("level"));
        let floor = scene.insert(Some(root), LocalNode::named("floor"));
        scene.set_content(floor, NodeContent::Mesh(MeshNode::new(square(0.0))));
        (scene, root)
    }

    #[test]
    fn uncommitted_scene_refuses_sessions() {
        let (mut scene, root) = floor_scene();
        assert_eq!(scene.session(root).err(), Some(QueryError::Uncommitted));
        scene.commit();
        assert!(scene.session(root).is_ok());
    }

    #[test]
    fn stale_root_is_an_error() {
        let (mut scene, root) = floor_scene();
        scene.remove(root);
        scene.commit();
        assert_eq!(scene.session(root).err(), Some(QueryError::DanglingNode(root)));
    }

    #[test]
    fn ray_hits_are_sorted_and_two_sided() {
        let (mut scene, root) = floor_scene();
        let ceiling = scene.insert(Some(root), LocalNode::named("ceiling"));
        scene.set_content(ceiling, NodeContent::Mesh(MeshNode::new(square(2.0))));
        scene.commit();

        let mut session = scene.session(root).unwrap();
        let hits = session
            .ray_hits(DVec3::new(0.25, 0.75, 5.0), DVec3::NEG_Z, CollideMask::LEVEL)
            .unwrap();
        assert_eq!(hits.len(), 2);
        assert_eq!(hits[0].point, DVec3::new(0.25, 0.75, 2.0));
        assert_eq!(hits[0].node, ceiling);
        assert_eq!(hits[1].point, DVec3::new(0.25, 0.75, 0.0));

        // From below, the ceiling's underside still counts.
        let hits = session
            .ray_hits(DVec3::new(0.25, 0.75, 1.0), DVec3::Z, CollideMask::LEVEL)
            .unwrap();
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].t, 1.0);
    }

    #[test]
    fn shared_edge_reports_both_triangles() {
        let (mut scene, root) = floor_scene();
        scene.commit();
        let mut session = scene.session(root).unwrap();
        // (0.5, 0.5) lies on the diagonal shared by both triangles.
        let hits = session
            .ray_hits(DVec3::new(0.5, 0.5, 3.0), DVec3::NEG_Z, CollideMask::LEVEL)
            .unwrap();
        assert_eq!(hits.len(), 2);
        assert_eq!(hits[0].point, hits[1].point);
    }

    #[test]
    fn masks_filter_targets() {
        let (mut scene, root) = floor_scene();
        scene.commit();
        let mut session = scene.session(root).unwrap();
        let hits = session
            .ray_hits(DVec3::new(0.25, 0.75, 3.0), DVec3::NEG_Z, CollideMask::bit(4))
            .unwrap();
        assert!(hits.is_empty());
    }

    #[test]
    fn visibility_does_not_affect_queries() {
        let (mut scene, root) = floor_scene();
        let floor = scene.find_named(root, "floor").unwrap();
        scene.set_flags(floor, crate::NodeFlags::empty());
        scene.commit();
        let mut session = scene.session(root).unwrap();
        let hits = session
            .ray_hits(DVec3::new(0.25, 0.75, 3.0), DVec3::NEG_Z, CollideMask::LEVEL)
            .unwrap();
        assert_eq!(hits.len(), 1);
    }

    #[test]
    fn sphere_and_segment_queries() {
        let mut scene = Scene::new();
        let root = scene.insert(None, LocalNode::named("level"));
        let ball = scene.insert(
            Some(root),
            LocalNode {
                name: "ball".into(),
                transform: DAffine3::from_translation(DVec3::new(5.0, 0.0, 0.0)),
                content: NodeContent::Collision(CollisionNode::new(vec![Solid::Sphere {
                    center: DVec3::ZERO,
                    radius: 1.0,
                }])),
                ..Default::default()
            },
        );
        scene.commit();
        let mut session = scene.session(root).unwrap();

        assert!(
            session
                .sphere_overlaps(DVec3::new(3.0, 0.0, 0.0), 1.0, CollideMask::LEVEL)
                .unwrap(),
            "touching spheres overlap"
        );
        assert!(
            !session
                .sphere_overlaps(DVec3::new(2.5, 0.0, 0.0), 1.0, CollideMask::LEVEL)
                .unwrap()
        );
        assert!(
            session
                .segment_hits(DVec3::ZERO, DVec3::new(10.0, 0.0, 0.0), CollideMask::LEVEL)
                .unwrap()
        );
        assert!(
            !session
                .segment_hits(DVec3::ZERO, DVec3::new(3.5, 0.0, 0.0), CollideMask::LEVEL)
                .unwrap()
        );
        let hits = session
            .ray_hits(DVec3::ZERO, DVec3::X, CollideMask::LEVEL)
            .unwrap();
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].node, ball);
        assert_eq!(hits[0].t, 4.0);
    }

    #[test]
    fn probes_are_never_targets() {
        let mut scene = Scene::new();
        let root = scene.insert(None, LocalNode::named("level"));
        let probe = scene.insert(
            Some(root),
            LocalNode {
                content: NodeContent::Collision(CollisionNode::new(vec![Solid::Segment {
                    a: DVec3::new(-1.0, 0.0, 0.0),
                    b: DVec3::new(1.0, 0.0, 0.0),
                }])),
                ..Default::default()
            },
        );
        scene.set_from_mask(probe, CollideMask::LEVEL);
        scene.commit();
        let mut session = scene.session(root).unwrap();
        assert!(
            !session
                .sphere_overlaps(DVec3::ZERO, 1.0, CollideMask::LEVEL)
                .unwrap()
        );
        assert_eq!(session.stats().solids_tested, 0);
    }

    #[test]
    fn malformed_geometry_is_reported() {
        let (mut scene, root) = floor_scene();
        let bad = scene.insert(
            Some(root),
            LocalNode {
                content: NodeContent::Collision(CollisionNode::new(vec![Solid::Polygon([
                    DVec3::ZERO,
                    DVec3::X,
                    DVec3::X * 2.0,
                ])])),
                ..Default::default()
            },
        );
        scene.commit();
        let mut session = scene.session(root).unwrap();
        let err = session
            .ray_hits(DVec3::new(0.5, 0.0, 1.0), DVec3::NEG_Z, CollideMask::LEVEL)
            .unwrap_err();
        assert_eq!(
            err,
            QueryError::MalformedSolid {
                node: bad,
                index: 0,
                reason: "polygon has zero area",
            }
        );
    }

    #[test]
    fn invalid_probes_are_rejected() {
        let (mut scene, root) = floor_scene();
        scene.commit();
        let mut session = scene.session(root).unwrap();
        assert!(matches!(
            session.ray_hits(DVec3::ZERO, DVec3::ZERO, CollideMask::LEVEL),
            Err(QueryError::InvalidProbe(_))
        ));
        assert!(matches!(
            session.sphere_overlaps(DVec3::ZERO, 0.0, CollideMask::LEVEL),
            Err(QueryError::InvalidProbe(_))
        ));
        assert!(matches!(
            session.segment_hits(DVec3::NAN, DVec3::ZERO, CollideMask::LEVEL),
            Err(QueryError::InvalidProbe(_))
        ));
    }

    #[test]
    fn queries_stay_inside_the_root() {
        let (mut scene, root) = floor_scene();
        let other = scene.insert(None, LocalNode::named("other"));
        scene.set_content(other, NodeContent::Mesh(MeshNode::new(square(1.0))));
        scene.commit();
        let mut session = scene.session(root).unwrap();
        let hits = session
            .ray_hits(DVec3::new(0.25, 0.75, 3.0), DVec3::NEG_Z, CollideMask::LEVEL)
            .unwrap();
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].point.z, 0.0);
    }
}
