use glam::{DMat4, DQuat, DVec3};
use hecs::{Entity, World};
use serde::{Deserialize, Serialize};
use std::fmt::{self, Display, Formatter};

/// Builds a rotation from an Euler triple in degrees about X, Y and Z.
///
/// The rotation is applied about Z first, then X, then Y, all in world axes. This is the
/// convention rig files and offsets are authored in.
pub fn rotation_from_euler_degrees(degrees: DVec3) -> DQuat {
    DQuat::from_euler(
        glam::EulerRot::YXZ,
        degrees.y.to_radians(),
        degrees.x.to_radians(),
        degrees.z.to_radians(),
    )
}

/// A type of transform that is attached to all frames. It contains the local and world transforms.
#[derive(Default, Debug, Deserialize, Serialize, Copy, PartialEq, Clone)]
pub struct EntityTransform {
    local: Transform,
    world: Transform,
}

impl EntityTransform {
    /// Creates a new [EntityTransform] from a local and world [Transform]
    pub fn new(local: Transform, world: Transform) -> Self {
        Self { local, world }
    }

    /// Creates a new [EntityTransform] from a world [Transform] and a default local transform.
    ///
    /// This is best for situations where a local transform is not required.
    pub fn new_from_world(world: Transform) -> Self {
        Self {
            world,
            local: Transform::default(),
        }
    }

    /// Gets a mutable reference to the local transform
    pub fn local_mut(&mut self) -> &mut Transform {
        &mut self.local
    }

    /// Combines both transforms into one, propagating the local transform
    /// to the world transform and returning a uniform [Transform]
    pub fn sync(&self) -> Transform {
        let combined = self.world.matrix() * self.local.matrix();
        let (scale, rotation, position) = combined.to_scale_rotation_translation();

        Transform {
            position,
            rotation,
            scale,
        }
    }
}

/// A position, rotation and scale of a frame.
///
/// Rotations are expected to be unit quaternions. Scale may be non-uniform, but anything
/// measured against a non-uniformly scaled frame picks up shear.
#[derive(Debug, Clone, Deserialize, Serialize, Copy, PartialEq)]
pub struct Transform {
    /// The position of the frame as [`DVec3`]
    pub position: DVec3,
    /// The rotation of the frame as [`DQuat`]
    pub rotation: DQuat,
    /// The scale of the frame as [`DVec3`]
    pub scale: DVec3,
}

impl Default for Transform {
    fn default() -> Self {
        Self {
            position: DVec3::ZERO,
            rotation: DQuat::IDENTITY,
            scale: DVec3::ONE,
        }
    }
}

impl Transform {
    /// Creates a new default instance of Transform
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a transform from its three parts.
    pub fn from_parts(position: DVec3, rotation: DQuat, scale: DVec3) -> Self {
        Self {
            position,
            rotation,
            scale,
        }
    }

    /// Replaces the position, keeping the rest of the transform.
    pub fn with_position(mut self, position: DVec3) -> Self {
        self.position = position;
        self
    }

    /// Replaces the rotation, keeping the rest of the transform.
    pub fn with_rotation(mut self, rotation: DQuat) -> Self {
        self.rotation = rotation;
        self
    }

    /// Replaces the scale, keeping the rest of the transform.
    pub fn with_scale(mut self, scale: DVec3) -> Self {
        self.scale = scale;
        self
    }

    /// Returns the homogeneous matrix of the frame, composed as translate * rotate * scale.
    pub fn matrix(&self) -> DMat4 {
        DMat4::from_scale_rotation_translation(self.scale, self.rotation, self.position)
    }

    /// Rotates the frame in its own space by an Euler triple in degrees.
    ///
    /// See [`rotation_from_euler_degrees`] for the axis order.
    pub fn rotate_euler_degrees(&mut self, degrees: DVec3) {
        self.rotation = (self.rotation * rotation_from_euler_degrees(degrees)).normalize();
    }
}

/// The name of a frame, used to look it up in a [`World`].
#[derive(Debug, Serialize, Deserialize, PartialEq, Eq, Hash, Clone)]
pub struct Label(String);

impl Label {
    /// Creates a new label component from any type that can be converted into a [`String`].
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    /// Returns the underlying string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Finds the first entity in the world carrying this label.
    pub fn locate_entity(&self, world: &World) -> Option<Entity> {
        world
            .query::<(Entity, &Label)>()
            .iter()
            .find_map(|(e, l)| if l == self { Some(e) } else { None })
    }
}

impl Display for Label {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}
