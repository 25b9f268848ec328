//! 3D-to-screen anchoring for the head beam.
//!
//! Every frame the [`HeadProjector`] resolves the robot's head node in a
//! [`SceneGraph`], lifts it by a fixed offset, projects it through a
//! [`Projector`] and converts the result to viewport pixels. No smoothing is
//! applied; the anchor follows the scene exactly.

mod camera;
mod head;
mod transform;

pub use camera::{PerspectiveCamera, Projector};
pub use head::{
    BeamPlacement, HeadAnchor, HeadProjector, HeadTracker, NodeId, ProjectorConfig, SceneGraph,
};
pub use transform::Transform;

#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Vec3 {
    pub x: f32,
    pub y: f32,
    pub z: f32,
}

impl Vec3 {
    pub const ZERO: Vec3 = Vec3::new(0.0, 0.0, 0.0);

    pub const fn new(x: f32, y: f32, z: f32) -> Self {
        Self { x, y, z }
    }
}

struct SceneNode {
    name: String,
    parent: Option<NodeId>,
    children: Vec<NodeId>,
    local: Transform,
}

/// A small in-memory scene graph with local transforms.
///
/// Stands in for a real engine in tests and the demo; world positions are the
/// composed parent chain applied to the origin.
#[derive(Default)]
pub struct StaticScene {
    nodes: Vec<SceneNode>,
    root: Option<NodeId>,
}

impl StaticScene {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add the model root. A later call replaces the root.
    pub fn add_root(&mut self, name: &str, local: Transform) -> NodeId {
        let id = self.push(name, None, local);
        self.root = Some(id);
        id
    }

    pub fn add_child(&mut self, parent: NodeId, name: &str, local: Transform) -> NodeId {
        let id = self.push(name, Some(parent), local);
        if let Some(node) = self.nodes.get_mut(parent.0) {
            node.children.push(id);
        }
        id
    }

    pub fn set_local(&mut self, node: NodeId, local: Transform) {
        if let Some(node) = self.nodes.get_mut(node.0) {
            node.local = local;
        }
    }

    fn push(&mut self, name: &str, parent: Option<NodeId>, local: Transform) -> NodeId {
        self.nodes.push(SceneNode {
            name: name.to_string(),
            parent,
            children: Vec::new(),
            local,
        });
        NodeId(self.nodes.len() - 1)
    }

    fn world_transform(&self, node: NodeId) -> Transform {
        let mut world = Transform::identity();
        let mut current = Some(node);
        while let Some(id) = current {
            let Some(node) = self.nodes.get(id.0) else {
                break;
            };
            world = node.local.then(&world);
            current = node.parent;
        }
        world
    }
}

impl SceneGraph for StaticScene {
    fn model_root(&self) -> Option<NodeId> {
        self.root
    }

    fn children(&self, node: NodeId) -> &[NodeId] {
        self.nodes
            .get(node.0)
            .map(|node| node.children.as_slice())
            .unwrap_or_default()
    }

    fn name(&self, node: NodeId) -> &str {
        self.nodes.get(node.0).map_or("", |node| node.name.as_str())
    }

    fn world_position(&self, node: NodeId) -> Vec3 {
        self.world_transform(node).translation()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scroll::ViewportState;

    #[test]
    fn test_world_position_composes_parents() {
        let mut scene = StaticScene::new();
        let root = scene.add_root("Robot", Transform::translate3d(0.0, -3.0, 0.0));
        let head = scene.add_child(root, "Head", Transform::translate3d(0.0, 1.0, 0.0));
        assert_eq!(scene.world_position(head), Vec3::new(0.0, -2.0, 0.0));

        scene.set_local(root, Transform::scale3d(2.0, 2.0, 2.0));
        assert_eq!(scene.world_position(head), Vec3::new(0.0, 2.0, 0.0));
    }

    #[test]
    fn test_rising_node_moves_anchor_up_monotonically() {
        let mut scene = StaticScene::new();
        let root = scene.add_root("Robot", Transform::identity());
        let head = scene.add_child(root, "Head", Transform::identity());
        let projector = HeadProjector::default();
        let camera = PerspectiveCamera::default();
        let viewport = ViewportState::new(1200.0, 800.0);

        // d(pixel_y)/d(world_y) = (h / 2) * f / depth with f = 1 / tan(fov / 2).
        let expected = 0.1 * 400.0 / 10.0 / (25.0f32).to_radians().tan();
        let mut previous: Option<f32> = None;
        for frame in 0..60 {
            let y = -3.0 + frame as f32 * 0.1;
            scene.set_local(head, Transform::translate3d(0.0, y, 0.0));
            let anchor = projector.frame(&scene, &camera, &viewport).unwrap();
            if let Some(prev) = previous {
                let delta = prev - anchor.y;
                assert!(delta > 0.0, "frame {frame} did not move up");
                // Evenly spaced world steps stay evenly spaced on screen.
                assert!((delta - expected).abs() < 0.05);
            }
            previous = Some(anchor.y);
        }
    }
}
