//! Looking frames up by name and reading their poses out of a [`World`].

use bilby_engine::entity::{EntityTransform, Label, Transform};
use bilby_engine::hierarchy::{EntityTransformExt, Hierarchy};
use hecs::{Entity, World};

/// Turns a frame name into a handle.
pub trait FrameResolver {
    /// Finds the frame called `name`, preferring frames below `container` when one is given.
    fn resolve(&self, container: Option<Entity>, name: &str) -> Option<Entity>;
}

/// Supplies the current world-space pose of a frame.
pub trait PoseProvider {
    /// Returns `None` when the frame no longer exists or carries no transform.
    fn world_pose(&self, frame: Entity) -> Option<Transform>;
}

/// A [`FrameResolver`] and [`PoseProvider`] over a [`hecs::World`] of labelled frames.
#[derive(Clone, Copy)]
pub struct SceneFrames<'a> {
    world: &'a World,
}

impl<'a> SceneFrames<'a> {
    pub fn new(world: &'a World) -> Self {
        Self { world }
    }

    fn has_label(&self, entity: Entity, name: &str) -> bool {
        self.world
            .get::<&Label>(entity)
            .map(|label| label.as_str() == name)
            .unwrap_or(false)
    }
}

impl FrameResolver for SceneFrames<'_> {
    fn resolve(&self, container: Option<Entity>, name: &str) -> Option<Entity> {
        if name.is_empty() {
            return None;
        }

        if let Some(container) = container {
            if self.has_label(container, name) {
                return Some(container);
            }

            let nested = Hierarchy::get_descendants(self.world, container)
                .into_iter()
                .find(|&entity| self.has_label(entity, name));
            if nested.is_some() {
                return nested;
            }
        }

        Label::new(name).locate_entity(self.world)
    }
}

impl PoseProvider for SceneFrames<'_> {
    fn world_pose(&self, frame: Entity) -> Option<Transform> {
        let transform = self.world.get::<&EntityTransform>(frame).ok()?;
        Some(transform.propagate(self.world, frame))
    }
}
