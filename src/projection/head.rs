use crate::reactive::{ReadSignal, Signal};
use crate::render::{Length, Property, Renderer, TargetId};
use crate::scroll::ViewportState;

use super::{Projector, Vec3};

/// Index of a node inside a [`SceneGraph`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct NodeId(pub usize);

/// Read access to the live 3D scene.
pub trait SceneGraph {
    /// The loaded model, if any.
    fn model_root(&self) -> Option<NodeId>;
    fn children(&self, node: NodeId) -> &[NodeId];
    fn name(&self, node: NodeId) -> &str;
    fn world_position(&self, node: NodeId) -> Vec3;
}

#[derive(Clone, Debug)]
pub struct ProjectorConfig {
    /// Added to the tracked node's world y so the anchor sits on top of the head.
    pub head_offset: f32,
    /// Viewport heights between the page bottom and the beam's base line.
    pub beam_base_vh: f32,
}

impl Default for ProjectorConfig {
    fn default() -> Self {
        Self {
            head_offset: 0.5,
            beam_base_vh: 1.13,
        }
    }
}

impl ProjectorConfig {
    pub fn with_head_offset(mut self, head_offset: f32) -> Self {
        self.head_offset = head_offset;
        self
    }

    pub fn with_beam_base(mut self, beam_base_vh: f32) -> Self {
        self.beam_base_vh = beam_base_vh;
        self
    }
}

/// Picks the node the beam follows.
#[derive(Clone, Copy, Debug, Default)]
pub struct HeadTracker;

impl HeadTracker {
    /// A child named like a head, else the first child, else the root itself.
    pub fn resolve<S: SceneGraph + ?Sized>(&self, scene: &S) -> Option<NodeId> {
        let root = scene.model_root()?;
        let children = scene.children(root);
        let head = children
            .iter()
            .copied()
            .find(|&child| scene.name(child).to_ascii_lowercase().contains("head"))
            .or_else(|| children.first().copied())
            .unwrap_or(root);
        Some(head)
    }
}

/// Screen-space point the head beam starts from, in pixels.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct HeadAnchor {
    pub x: f32,
    pub y: f32,
}

impl HeadAnchor {
    /// NDC to pixels with y pointing down.
    pub fn from_ndc(ndc: Vec3, viewport: &ViewportState) -> Self {
        Self {
            x: (ndc.x * 0.5 + 0.5) * viewport.width,
            y: (-ndc.y * 0.5 + 0.5) * viewport.height,
        }
    }
}

/// Projects the tracked head once per frame.
pub struct HeadProjector {
    config: ProjectorConfig,
    tracker: HeadTracker,
    anchor: Signal<Option<HeadAnchor>>,
}

impl HeadProjector {
    pub fn new(config: ProjectorConfig) -> Self {
        Self {
            config,
            tracker: HeadTracker,
            anchor: Signal::new(None),
        }
    }

    pub fn config(&self) -> &ProjectorConfig {
        &self.config
    }

    /// Latest projected anchor.
    pub fn anchor(&self) -> ReadSignal<Option<HeadAnchor>> {
        self.anchor.read_only()
    }

    /// Project the head for this frame.
    ///
    /// Returns `None` and leaves the published anchor alone while the model is
    /// not in the scene.
    pub fn frame<S: SceneGraph + ?Sized>(
        &self,
        scene: &S,
        camera: &dyn Projector,
        viewport: &ViewportState,
    ) -> Option<HeadAnchor> {
        let Some(node) = self.tracker.resolve(scene) else {
            log::trace!("no model in scene, head anchor unchanged");
            return None;
        };
        let mut world = scene.world_position(node);
        world.y += self.config.head_offset;

        let anchor = HeadAnchor::from_ndc(camera.project(world, viewport), viewport);
        log::trace!("head anchor at ({:.1}, {:.1})", anchor.x, anchor.y);
        self.anchor.set(Some(anchor));
        Some(anchor)
    }

    pub fn placement(&self, anchor: HeadAnchor, viewport: &ViewportState) -> BeamPlacement {
        BeamPlacement::from_anchor(anchor, viewport, self.config.beam_base_vh)
    }
}

impl Default for HeadProjector {
    fn default() -> Self {
        Self::new(ProjectorConfig::default())
    }
}

/// Where the upward beam sits so that its base touches the head.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct BeamPlacement {
    pub left: f32,
    pub bottom: f32,
}

impl BeamPlacement {
    pub fn from_anchor(anchor: HeadAnchor, viewport: &ViewportState, base_vh: f32) -> Self {
        Self {
            left: anchor.x,
            bottom: base_vh * viewport.height - anchor.y,
        }
    }

    pub fn apply(&self, target: &TargetId, renderer: &mut dyn Renderer) {
        renderer.set_property(target, &Property::Left, &Length::Px(self.left).into());
        renderer.set_property(target, &Property::Bottom, &Length::Px(self.bottom).into());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::projection::{PerspectiveCamera, StaticScene, Transform};
    use crate::render::{PropertyStore, PropertyValue};

    fn viewport() -> ViewportState {
        ViewportState::new(1200.0, 800.0)
    }

    fn robot() -> (StaticScene, NodeId) {
        let mut scene = StaticScene::new();
        let root = scene.add_root("Robot", Transform::identity());
        scene.add_child(root, "Body", Transform::translate3d(0.0, -1.0, 0.0));
        let head = scene.add_child(root, "Armature_HEAD", Transform::translate3d(0.0, 1.0, 0.0));
        (scene, head)
    }

    #[test]
    fn test_tracker_prefers_head_name() {
        let (scene, head) = robot();
        assert_eq!(HeadTracker.resolve(&scene), Some(head));
    }

    #[test]
    fn test_tracker_fallbacks() {
        let mut scene = StaticScene::new();
        assert_eq!(HeadTracker.resolve(&scene), None);

        let root = scene.add_root("Robot", Transform::identity());
        assert_eq!(HeadTracker.resolve(&scene), Some(root));

        let first = scene.add_child(root, "Body", Transform::identity());
        scene.add_child(root, "Legs", Transform::identity());
        assert_eq!(HeadTracker.resolve(&scene), Some(first));
    }

    #[test]
    fn test_anchor_above_center_for_raised_head() {
        let (scene, _) = robot();
        let projector = HeadProjector::default();
        let anchor = projector
            .frame(&scene, &PerspectiveCamera::default(), &viewport())
            .unwrap();
        assert!((anchor.x - 600.0).abs() < 1e-3);
        assert!(anchor.y < 400.0);
        assert_eq!(projector.anchor().get(), Some(anchor));
    }

    #[test]
    fn test_missing_model_keeps_last_anchor() {
        let projector = HeadProjector::default();
        let empty = StaticScene::new();
        assert!(projector
            .frame(&empty, &PerspectiveCamera::default(), &viewport())
            .is_none());
        assert_eq!(projector.anchor().get(), None);
    }

    #[test]
    fn test_beam_placement() {
        let placement = BeamPlacement::from_anchor(
            HeadAnchor { x: 600.0, y: 300.0 },
            &viewport(),
            1.13,
        );
        assert_eq!(placement.left, 600.0);
        assert!((placement.bottom - 604.0).abs() < 1e-3);

        let mut store = PropertyStore::default();
        let beam = TargetId::from("head-beam");
        placement.apply(&beam, &mut store);
        assert_eq!(
            store.get("head-beam", &Property::Left),
            Some(&PropertyValue::Length(Length::Px(600.0)))
        );
    }
}
