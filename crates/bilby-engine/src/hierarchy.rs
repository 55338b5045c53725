//! The hierarchy of a frame and a rig.

use crate::entity::{EntityTransform, Transform};
use std::collections::VecDeque;

/// A component that tracks all child entities of a parent entity
#[derive(Default, Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct Children(Vec<hecs::Entity>);

impl Children {
    /// Creates a new children component with the provided child entities.
    pub fn new(children: Vec<hecs::Entity>) -> Self {
        Self(children)
    }

    /// Returns an immutable view into the stored child entities.
    pub fn children(&self) -> &[hecs::Entity] {
        &self.0
    }

    /// Adds a new child entity to this component.
    pub fn push(&mut self, child: hecs::Entity) {
        if !self.0.contains(&child) {
            self.0.push(child);
        }
    }

    /// Removes a specific child entity.
    pub fn remove(&mut self, child: hecs::Entity) {
        self.0.retain(|&e| e != child);
    }
}

/// A component that points to the parent entity of an entity.
#[derive(Debug, Clone, Copy, serde::Serialize, serde::Deserialize, PartialEq, Eq)]
pub struct Parent(hecs::Entity);

impl Parent {
    /// Creates a new parent component with the provided parent entity.
    pub fn new(parent: hecs::Entity) -> Self {
        Self(parent)
    }

    /// Returns the parent entity of this component.
    pub fn parent(&self) -> hecs::Entity {
        self.0
    }
}

/// Helper functions for managing frame hierarchies
pub struct Hierarchy;

impl Hierarchy {
    /// Set the parent of a child entity, updating both Parent and Children components.
    ///
    /// Returns `false` without touching the world when the link would form a cycle.
    pub fn set_parent(world: &mut hecs::World, child: hecs::Entity, parent: hecs::Entity) -> bool {
        if child == parent || Self::is_descendant_of(world, parent, child) {
            log::warn!("Refusing to parent {:?} under its own descendant {:?}", child, parent);
            return false;
        }

        // Remove old parent relationship if it exists
        if let Some(old_parent) = Self::get_parent(world, child) {
            if let Ok(mut children) = world.get::<&mut Children>(old_parent) {
                children.remove(child);
            }
        }

        let _ = world.insert_one(child, Parent::new(parent));

        if let Ok(mut children) = world.get::<&mut Children>(parent) {
            children.push(child);
        } else {
            let _ = world.insert_one(parent, Children::new(vec![child]));
        }

        true
    }

    /// Get all children of an entity
    pub fn get_children(world: &hecs::World, entity: hecs::Entity) -> Vec<hecs::Entity> {
        world
            .get::<&Children>(entity)
            .map(|c| c.children().to_vec())
            .unwrap_or_default()
    }

    /// Get the parent of an entity
    pub fn get_parent(world: &hecs::World, entity: hecs::Entity) -> Option<hecs::Entity> {
        world.get::<&Parent>(entity).ok().map(|p| p.parent())
    }

    /// Get all descendants of an entity, nearest first.
    pub fn get_descendants(world: &hecs::World, entity: hecs::Entity) -> Vec<hecs::Entity> {
        let mut descendants = Vec::new();
        let mut queue = VecDeque::from(Self::get_children(world, entity));

        while let Some(current) = queue.pop_front() {
            descendants.push(current);
            queue.extend(Self::get_children(world, current));
        }

        descendants
    }

    /// Check if an entity is a descendant of another
    pub fn is_descendant_of(
        world: &hecs::World,
        entity: hecs::Entity,
        potential_ancestor: hecs::Entity,
    ) -> bool {
        let mut current = entity;

        while let Some(parent) = Self::get_parent(world, current) {
            if parent == potential_ancestor {
                return true;
            }
            current = parent;
        }

        false
    }
}

/// An extension trait for [EntityTransform] that allows for propagation of frames into a target transform.
pub trait EntityTransformExt {
    /// Walks up the [`hecs::World`] and calculates the final [Transform] for the frame based off its parents.
    fn propagate(&self, world: &hecs::World, target_entity: hecs::Entity) -> Transform;
}

impl EntityTransformExt for EntityTransform {
    fn propagate(&self, world: &hecs::World, target_entity: hecs::Entity) -> Transform {
        let mut result = self.sync();

        let mut current = target_entity;
        while let Some(parent_entity) = Hierarchy::get_parent(world, current) {
            if let Ok(parent_transform) = world.get::<&EntityTransform>(parent_entity) {
                let parent_pose = parent_transform.sync();

                result = Transform {
                    position: parent_pose.position
                        + parent_pose.rotation * (result.position * parent_pose.scale),
                    rotation: parent_pose.rotation * result.rotation,
                    scale: parent_pose.scale * result.scale,
                };
            }

            current = parent_entity;
        }

        result
    }
}
