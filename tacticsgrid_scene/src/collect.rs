// Copyright 2026 the Tacticsgrid Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Gathering the collision solids of a subtree into a flat list.

use core::cmp::Ordering;

use glam::{DAffine3, DVec3};
use tacticsgrid_index::Aabb3D;

use crate::error::{QueryError, QueryResult};
use crate::optimize::OptimizeOptions;
use crate::scene::Scene;
use crate::solid::Solid;
use crate::types::{CollideMask, LocalNode, NodeContent, NodeId};

/// Name and tags a solid keeps through re-emission.
///
/// Empty when identity is not preserved, so that solids from differently
/// named nodes can share a group.
#[derive(Clone, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct IdentityKey {
    /// Node name.
    pub name: String,
    /// Tags, sorted by key.
    pub tags: Vec<(String, String)>,
}

impl IdentityKey {
    fn of(local: &LocalNode, options: &OptimizeOptions) -> Self {
        Self {
            name: if options.preserve_names {
                local.name.clone()
            } else {
                String::new()
            },
            tags: if options.preserve_tags {
                local
                    .tags
                    .iter()
                    .map(|(k, v)| (k.clone(), v.clone()))
                    .collect()
            } else {
                Vec::new()
            },
        }
    }
}

/// What solids must share to land in one collision node.
///
/// Ordered by transform (column-major, `total_cmp` per element), then mask,
/// then identity, which makes the order total even for NaN transforms.
#[derive(Clone, Debug)]
pub struct GroupKey {
    /// Transform from the solids' space to the optimized root.
    pub transform: DAffine3,
    /// Into mask.
    pub mask: CollideMask,
    /// Preserved name and tags.
    pub identity: IdentityKey,
}

impl Ord for GroupKey {
    fn cmp(&self, other: &Self) -> Ordering {
        let a = self.transform.to_cols_array();
        let b = other.transform.to_cols_array();
        a.iter()
            .zip(b.iter())
            .map(|(x, y)| x.total_cmp(y))
            .find(|o| o.is_ne())
            .unwrap_or(Ordering::Equal)
            .then_with(|| self.mask.cmp(&other.mask))
            .then_with(|| self.identity.cmp(&other.identity))
    }
}

impl PartialOrd for GroupKey {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl PartialEq for GroupKey {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other).is_eq()
    }
}

impl Eq for GroupKey {}

/// One collected solid.
#[derive(Clone, Debug, PartialEq)]
pub struct SolidRecord {
    /// The solid, in the space described by `transform`.
    pub solid: Solid,
    /// Transform from the solid's space to the optimized root.
    pub transform: DAffine3,
    /// Into mask of the node the solid came from.
    pub mask: CollideMask,
    /// Preserved name and tags.
    pub identity: IdentityKey,
    /// Representative point, in root space.
    pub origin: DVec3,
    /// Bounds, in root space.
    pub bounds: Aabb3D,
}

impl SolidRecord {
    fn new(solid: Solid, transform: DAffine3, mask: CollideMask, identity: IdentityKey) -> Self {
        let origin = transform.transform_point3(solid.origin());
        let bounds = solid
            .transformed(&transform)
            .bounds()
            .unwrap_or(Aabb3D::from_point(origin.to_array()));
        Self {
            solid,
            transform,
            mask,
            identity,
            origin,
            bounds,
        }
    }

    /// Sort and grouping key.
    pub fn group_key(&self) -> GroupKey {
        GroupKey {
            transform: self.transform,
            mask: self.mask,
            identity: self.identity.clone(),
        }
    }
}

/// Collect the collision solids below `root` and neutralise the nodes they
/// came from.
///
/// The root contributes its own solids first, with an identity transform.
/// Descendant collision nodes with a non-empty into mask follow in
/// pre-order. After a node is consumed it is left as a probe if it has a
/// from mask, removed if it has no children, and otherwise emptied. With
/// `convert_geometry`, mesh triangles follow as root-space polygons and each
/// converted mesh loses its into mask.
///
/// Works on local transforms, so the scene does not have to be committed.
pub fn collect_solids(
    scene: &mut Scene,
    root: NodeId,
    options: &OptimizeOptions,
) -> QueryResult<Vec<SolidRecord>> {
    if !scene.is_alive(root) {
        return Err(QueryError::DanglingNode(root));
    }
    let mut records = Vec::new();
    let nodes = scene.descendants(root);

    for &id in &nodes {
        let Some(local) = scene.local(id) else {
            continue;
        };
        let NodeContent::Collision(collision) = &local.content else {
            continue;
        };
        let transform = if id == root {
            DAffine3::IDENTITY
        } else if collision.into_mask.is_empty() {
            continue;
        } else {
            scene
                .transform_to(id, root)
                .ok_or(QueryError::DanglingNode(id))?
        };
        let identity = IdentityKey::of(local, options);
        records.extend(
            collision
                .solids
                .iter()
                .map(|s| SolidRecord::new(*s, transform, collision.into_mask, identity.clone())),
        );
        let is_probe = !collision.from_mask.is_empty();
        if is_probe {
            scene.set_into_mask(id, CollideMask::empty());
        } else if id != root && scene.children(id).is_empty() {
            scene.remove(id);
        } else {
            scene.clear_solids(id);
        }
    }
    let consumed = records.len();

    if options.convert_geometry {
        for &id in &nodes {
            let Some(local) = scene.local(id) else {
                continue;
            };
            let NodeContent::Mesh(mesh) = &local.content else {
                continue;
            };
            if mesh.into_mask.is_empty() {
                continue;
            }
            let to_root = scene
                .transform_to(id, root)
                .ok_or(QueryError::DanglingNode(id))?;
            let identity = IdentityKey::of(local, options);
            records.extend(mesh.triangles.iter().map(|tri| {
                let polygon = Solid::Polygon(tri.map(|v| to_root.transform_point3(v)));
                SolidRecord::new(polygon, DAffine3::IDENTITY, mesh.into_mask, identity.clone())
            }));
            scene.set_into_mask(id, CollideMask::empty());
        }
    }

    log::debug!(
        "collected {} solids and {} mesh triangles below {root:?}",
        consumed,
        records.len() - consumed
    );
    Ok(records)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{CollisionNode, MeshNode};

    fn sphere_at(x: f64) -> Solid {
        Solid::Sphere {
            center: DVec3::new(x, 0.0, 0.0),
            radius: 0.25,
        }
    }

    fn collision(solids: Vec<Solid>) -> NodeContent {
        NodeContent::Collision(CollisionNode::new(solids))
    }

    #[test]
    fn root_first_then_preorder() {
        let mut scene = Scene::new();
        let root = scene.insert(None, LocalNode::named("root"));
        scene.set_content(root, collision(vec![sphere_at(0.0)]));
        let a = scene.insert(Some(root), LocalNode::named("a"));
        scene.set_transform(a, DAffine3::from_translation(DVec3::new(0.0, 5.0, 0.0)));
        scene.set_content(a, collision(vec![sphere_at(1.0), sphere_at(2.0)]));

        let records = collect_solids(&mut scene, root, &OptimizeOptions::default()).unwrap();
        assert_eq!(records.len(), 3);
        assert_eq!(records[0].identity.name, "root");
        assert_eq!(records[0].transform, DAffine3::IDENTITY);
        assert_eq!(records[1].origin, DVec3::new(1.0, 5.0, 0.0));
        assert_eq!(records[2].origin, DVec3::new(2.0, 5.0, 0.0));
        assert_eq!(
            records[2].bounds,
            Aabb3D::new([1.75, 4.75, -0.25], [2.25, 5.25, 0.25])
        );

        assert!(scene.is_alive(root), "the root is never removed");
        assert!(!scene.is_alive(a), "childless consumed node is removed");
    }

    #[test]
    fn consumed_nodes_are_neutralised() {
        let mut scene = Scene::new();
        let root = scene.insert(None, LocalNode::named("root"));
        let probe = scene.insert(Some(root), LocalNode::named("probe"));
        scene.set_content(probe, collision(vec![sphere_at(0.0)]));
        scene.set_from_mask(probe, CollideMask::LEVEL);
        let parent = scene.insert(Some(root), LocalNode::named("parent"));
        scene.set_content(parent, collision(vec![sphere_at(1.0)]));
        let _child = scene.insert(Some(parent), LocalNode::named("child"));
        let skipped = scene.insert(Some(root), LocalNode::named("skipped"));
        scene.set_content(skipped, collision(vec![sphere_at(2.0)]));
        scene.set_into_mask(skipped, CollideMask::empty());

        let records = collect_solids(&mut scene, root, &OptimizeOptions::default()).unwrap();
        assert_eq!(records.len(), 2);

        let NodeContent::Collision(c) = &scene.local(probe).unwrap().content else {
            panic!("probe keeps its content");
        };
        assert_eq!(c.solids.len(), 1);
        assert!(c.into_mask.is_empty());
        assert_eq!(c.from_mask, CollideMask::LEVEL);

        let NodeContent::Collision(c) = &scene.local(parent).unwrap().content else {
            panic!("parent keeps its content");
        };
        assert!(c.solids.is_empty());

        let NodeContent::Collision(c) = &scene.local(skipped).unwrap().content else {
            panic!("skipped node is untouched");
        };
        assert_eq!(c.solids.len(), 1);
    }

    #[test]
    fn identity_follows_options() {
        let mut scene = Scene::new();
        let root = scene.insert(None, LocalNode::named("root"));
        let a = scene.insert(Some(root), LocalNode::named("wall"));
        scene.set_content(a, collision(vec![sphere_at(0.0)]));
        scene.set_tag(a, "z", "1");
        scene.set_tag(a, "a", "2");

        let mut keep = scene.clone();
        let records = collect_solids(&mut keep, root, &OptimizeOptions::default()).unwrap();
        assert_eq!(records[0].identity.name, "wall");
        assert_eq!(
            records[0].identity.tags,
            vec![("a".into(), "2".into()), ("z".into(), "1".into())]
        );

        let options = OptimizeOptions::default().preserve_identity(false);
        let records = collect_solids(&mut scene, root, &options).unwrap();
        assert_eq!(records[0].identity, IdentityKey::default());
    }

    #[test]
    fn meshes_are_baked_into_root_space() {
        let mut scene = Scene::new();
        let root = scene.insert(None, LocalNode::named("root"));
        let mesh = scene.insert(
            Some(root),
            LocalNode {
                transform: DAffine3::from_translation(DVec3::new(0.0, 0.0, 3.0)),
                content: NodeContent::Mesh(MeshNode::new(vec![[
                    DVec3::ZERO,
                    DVec3::new(3.0, 0.0, 0.0),
                    DVec3::new(0.0, 3.0, 0.0),
                ]])),
                ..LocalNode::named("floor")
            },
        );

        let plain = collect_solids(&mut scene, root, &OptimizeOptions::default()).unwrap();
        assert!(plain.is_empty(), "meshes are ignored unless converted");

        let options = OptimizeOptions {
            convert_geometry: true,
            ..Default::default()
        };
        let records = collect_solids(&mut scene, root, &options).unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].transform, DAffine3::IDENTITY);
        assert_eq!(records[0].origin, DVec3::new(1.0, 1.0, 3.0));
        assert_eq!(
            records[0].solid,
            Solid::Polygon([
                DVec3::new(0.0, 0.0, 3.0),
                DVec3::new(3.0, 0.0, 3.0),
                DVec3::new(0.0, 3.0, 3.0),
            ])
        );
        let NodeContent::Mesh(m) = &scene.local(mesh).unwrap().content else {
            panic!("mesh stays a mesh");
        };
        assert!(m.into_mask.is_empty());
        assert_eq!(m.triangles.len(), 1);
    }

    #[test]
    fn group_keys_order_totally() {
        let key = |x: f64, mask: u32| GroupKey {
            transform: DAffine3::from_translation(DVec3::new(x, 0.0, 0.0)),
            mask: CollideMask::from_bits_retain(mask),
            identity: IdentityKey::default(),
        };
        assert!(key(0.0, 1) < key(1.0, 1));
        assert!(key(0.0, 1) < key(0.0, 2));
        assert_eq!(key(f64::NAN, 1), key(f64::NAN, 1));
        assert!(key(1.0, 1) < key(f64::NAN, 1));
    }

    #[test]
    fn dangling_root_is_an_error() {
        let mut scene = Scene::new();
        let root = scene.insert(None, LocalNode::named("root"));
        scene.remove(root);
        assert_eq!(
            collect_solids(&mut scene, root, &OptimizeOptions::default()),
            Err(QueryError::DanglingNode(root))
        );
    }
}
