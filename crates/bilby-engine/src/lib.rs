//! Scene primitives shared by the bilby crates.
//!
//! A frame in a rig is a [`hecs::Entity`] carrying a [`entity::Label`] and an
//! [`entity::EntityTransform`], optionally parented to another frame through
//! [`hecs`] components from [`hierarchy`].

pub mod entity;
pub mod hierarchy;

pub use entity::{EntityTransform, Label, Transform, rotation_from_euler_degrees};
pub use hierarchy::{Children, EntityTransformExt, Hierarchy, Parent};
