//! A rig component that reads the yaw, pitch and roll of one frame relative to another.
//!
//! The host drives it in three steps:
//! 1. [`YawPitchRoll::bind`] resolves the origin and insertion frames once.
//! 2. [`YawPitchRoll::configure`] builds the [`FrameRelation`] once.
//! 3. [`YawPitchRoll::tick`] recomputes the readout every frame.
//!
//! None of these fail loudly. A component whose frames cannot be bound stays inert and keeps
//! reporting the zero vector.

use crate::mapping::AxisMapping;
use crate::relation::FrameRelation;
use crate::scene::{FrameResolver, PoseProvider};
use glam::DVec3;
use hecs::Entity;
use serde::{Deserialize, Serialize};

/// Whether a [`YawPitchRoll`] has frames to measure.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub enum BindingState {
    #[default]
    Unbound,
    Valid,
    /// At least one frame failed to resolve. Permanent for this instance.
    Invalid,
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum BindingError {
    #[error("origin frame `{0}` could not be resolved")]
    MissingOrigin(String),
    #[error("insertion frame `{0}` could not be resolved")]
    MissingInsertion(String),
    #[error("neither origin `{origin}` nor insertion `{insertion}` could be resolved")]
    MissingBoth { origin: String, insertion: String },
}

/// Yaw/pitch/roll readout of `insertion` relative to `origin`, in degrees.
#[derive(Debug, Default, Clone, Serialize, Deserialize)]
pub struct YawPitchRoll {
    #[serde(default)]
    pub mapping: AxisMapping,
    /// Label of the origin frame, used when no handle was supplied.
    #[serde(default)]
    pub origin: String,
    /// Label of the insertion frame, used when no handle was supplied.
    #[serde(default)]
    pub insertion: String,
    /// Corrective rotation on the origin frame, degrees about X, Y and Z.
    #[serde(default)]
    pub parent_offset: [f64; 3],

    #[serde(skip)]
    origin_frame: Option<Entity>,
    #[serde(skip)]
    insertion_frame: Option<Entity>,
    #[serde(skip)]
    state: BindingState,
    #[serde(skip)]
    relation: Option<FrameRelation>,
    #[serde(skip)]
    result: DVec3,
}

impl YawPitchRoll {
    /// Creates a component that will look its frames up by label.
    pub fn new(
        origin: impl Into<String>,
        insertion: impl Into<String>,
        parent_offset: [f64; 3],
        mapping: AxisMapping,
    ) -> Self {
        Self {
            mapping,
            origin: origin.into(),
            insertion: insertion.into(),
            parent_offset,
            ..Default::default()
        }
    }

    /// Supplies the frames directly. Name lookup is skipped for any handle given here.
    pub fn with_frames(mut self, origin: Entity, insertion: Entity) -> Self {
        self.origin_frame = Some(origin);
        self.insertion_frame = Some(insertion);
        self
    }

    /// Resolves whichever frames are still missing.
    ///
    /// Only the first call does anything; an instance is never re-validated.
    pub fn bind(
        &mut self,
        resolver: &impl FrameResolver,
        container: Option<Entity>,
    ) -> BindingState {
        if self.state != BindingState::Unbound {
            return self.state;
        }

        if self.origin_frame.is_none() {
            self.origin_frame = resolver.resolve(container, &self.origin);
        }
        if self.insertion_frame.is_none() {
            self.insertion_frame = resolver.resolve(container, &self.insertion);
        }

        let missing = match (self.origin_frame, self.insertion_frame) {
            (Some(_), Some(_)) => None,
            (None, Some(_)) => Some(BindingError::MissingOrigin(self.origin.clone())),
            (Some(_), None) => Some(BindingError::MissingInsertion(self.insertion.clone())),
            (None, None) => Some(BindingError::MissingBoth {
                origin: self.origin.clone(),
                insertion: self.insertion.clone(),
            }),
        };

        self.state = match missing {
            None => {
                log::debug!("Bound yaw/pitch/roll {} -> {}", self.origin, self.insertion);
                BindingState::Valid
            }
            Some(e) => {
                log::warn!("Yaw/pitch/roll disabled: {}", e);
                BindingState::Invalid
            }
        };

        self.state
    }

    /// Builds the frame relation from the offset and mapping. Does nothing unless bound.
    pub fn configure(&mut self) {
        if self.state != BindingState::Valid || self.relation.is_some() {
            return;
        }

        self.relation = Some(FrameRelation::configure(
            DVec3::from_array(self.parent_offset),
            self.mapping,
        ));
    }

    /// [`Self::bind`] followed by [`Self::configure`].
    pub fn setup(
        &mut self,
        resolver: &impl FrameResolver,
        container: Option<Entity>,
    ) -> BindingState {
        let state = self.bind(resolver, container);
        self.configure();
        state
    }

    /// Recomputes the readout from the current poses.
    ///
    /// If either pose is unavailable the previous readout is kept.
    pub fn tick(&mut self, poses: &impl PoseProvider) {
        if self.state != BindingState::Valid {
            return;
        }
        let (Some(relation), Some(origin), Some(insertion)) =
            (self.relation, self.origin_frame, self.insertion_frame)
        else {
            return;
        };

        let (Some(origin_pose), Some(insertion_pose)) =
            (poses.world_pose(origin), poses.world_pose(insertion))
        else {
            log_once::warn_once!(
                "Pose missing for {} -> {}, holding last readout",
                self.origin,
                self.insertion
            );
            return;
        };

        self.result = relation.evaluate(&origin_pose, &insertion_pose);
        log::trace!("{} -> {}: {:?}", self.origin, self.insertion, self.result);
    }

    /// The last readout, or zero if nothing has been computed yet.
    ///
    /// Read it from the thread that drives [`Self::tick`].
    pub fn result(&self) -> DVec3 {
        self.result
    }

    pub fn state(&self) -> BindingState {
        self.state
    }

    pub fn relation(&self) -> Option<&FrameRelation> {
        self.relation.as_ref()
    }

    pub fn origin_frame(&self) -> Option<Entity> {
        self.origin_frame
    }

    pub fn insertion_frame(&self) -> Option<Entity> {
        self.insertion_frame
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scene::SceneFrames;
    use bilby_engine::entity::{EntityTransform, Label, Transform};
    use glam::DQuat;
    use hecs::World;

    fn spawn_frame(world: &mut World, label: &str, rotation: DQuat) -> Entity {
        world.spawn((
            Label::new(label),
            EntityTransform::new_from_world(Transform::new().with_rotation(rotation)),
        ))
    }

    #[test]
    fn reads_the_insertion_relative_to_the_origin() {
        let mut world = World::new();
        spawn_frame(&mut world, "upper_arm", DQuat::IDENTITY);
        spawn_frame(&mut world, "forearm", DQuat::from_rotation_z(40f64.to_radians()));

        let mut ypr = YawPitchRoll::new("upper_arm", "forearm", [0.0; 3], AxisMapping::ZXY);
        let frames = SceneFrames::new(&world);
        assert_eq!(ypr.setup(&frames, None), BindingState::Valid);

        ypr.tick(&frames);
        // ZXY puts yaw in the Z channel
        assert!(ypr.result().abs_diff_eq(DVec3::new(0.0, 0.0, 40.0), 1e-6), "{:?}", ypr.result());
    }

    #[test]
    fn unresolved_frames_leave_the_component_inert() {
        let mut world = World::new();
        let arm = spawn_frame(&mut world, "upper_arm", DQuat::from_rotation_x(0.5));

        let mut ypr = YawPitchRoll::new("upper_arm", "missing", [0.0; 3], AxisMapping::XYZ);
        let frames = SceneFrames::new(&world);
        assert_eq!(ypr.setup(&frames, None), BindingState::Invalid);
        assert_eq!(ypr.origin_frame(), Some(arm));
        assert!(ypr.relation().is_none());

        for _ in 0..10 {
            ypr.tick(&frames);
            assert_eq!(ypr.result(), DVec3::ZERO);
        }
    }

    #[test]
    fn binding_is_not_retried() {
        let mut world = World::new();
        spawn_frame(&mut world, "hips", DQuat::IDENTITY);

        let mut ypr = YawPitchRoll::new("hips", "thigh", [0.0; 3], AxisMapping::XYZ);
        assert_eq!(ypr.bind(&SceneFrames::new(&world), None), BindingState::Invalid);

        spawn_frame(&mut world, "thigh", DQuat::from_rotation_y(0.3));
        let frames = SceneFrames::new(&world);
        assert_eq!(ypr.setup(&frames, None), BindingState::Invalid);
        ypr.tick(&frames);
        assert_eq!(ypr.result(), DVec3::ZERO);
    }

    #[test]
    fn supplied_frames_skip_name_lookup() {
        let mut world = World::new();
        let a = spawn_frame(&mut world, "a", DQuat::IDENTITY);
        let b = spawn_frame(&mut world, "b", DQuat::from_rotation_x(30f64.to_radians()));

        let mut ypr = YawPitchRoll::new("", "", [0.0; 3], AxisMapping::XYZ).with_frames(a, b);
        let frames = SceneFrames::new(&world);
        assert_eq!(ypr.setup(&frames, None), BindingState::Valid);

        ypr.tick(&frames);
        assert!(ypr.result().abs_diff_eq(DVec3::new(0.0, -30.0, 0.0), 1e-6));
    }

    #[test]
    fn relation_is_built_only_once() {
        let mut world = World::new();
        spawn_frame(&mut world, "a", DQuat::IDENTITY);
        spawn_frame(&mut world, "b", DQuat::from_rotation_z(40f64.to_radians()));

        let mut ypr = YawPitchRoll::new("a", "b", [0.0; 3], AxisMapping::XYZ);
        let frames = SceneFrames::new(&world);
        assert_eq!(ypr.setup(&frames, None), BindingState::Valid);
        let built = *ypr.relation().unwrap();

        ypr.parent_offset = [0.0, 90.0, 0.0];
        ypr.mapping = AxisMapping::ZXY;
        ypr.configure();
        ypr.tick(&frames);

        assert_eq!(ypr.relation(), Some(&built));
        assert_ne!(
            built,
            FrameRelation::configure(DVec3::from_array(ypr.parent_offset), ypr.mapping)
        );
        // still XYZ with no offset: yaw in the X channel
        assert!(ypr.result().abs_diff_eq(DVec3::new(40.0, 0.0, 0.0), 1e-6), "{:?}", ypr.result());
    }

    #[test]
    fn tick_before_configure_does_nothing() {
        let mut world = World::new();
        spawn_frame(&mut world, "a", DQuat::IDENTITY);
        spawn_frame(&mut world, "b", DQuat::from_rotation_z(0.4));

        let mut ypr = YawPitchRoll::new("a", "b", [0.0; 3], AxisMapping::XYZ);
        let frames = SceneFrames::new(&world);
        ypr.tick(&frames);
        assert_eq!(ypr.state(), BindingState::Unbound);

        ypr.bind(&frames, None);
        ypr.tick(&frames);
        assert_eq!(ypr.result(), DVec3::ZERO);
    }

    #[test]
    fn missing_pose_holds_the_last_readout() {
        let mut world = World::new();
        spawn_frame(&mut world, "a", DQuat::IDENTITY);
        let b = spawn_frame(&mut world, "b", DQuat::from_rotation_z(20f64.to_radians()));

        let mut ypr = YawPitchRoll::new("a", "b", [0.0; 3], AxisMapping::XYZ);
        ypr.setup(&SceneFrames::new(&world), None);
        ypr.tick(&SceneFrames::new(&world));
        let before = ypr.result();
        assert!((before.x - 20.0).abs() < 1e-6);

        world.despawn(b).unwrap();
        ypr.tick(&SceneFrames::new(&world));
        assert_eq!(ypr.result(), before);
    }

    #[test]
    fn configuration_parses_from_ron() {
        let text = r#"(mapping: YZX, origin: "hips", insertion: "thigh", parent_offset: (0.0, 90.0, 0.0))"#;
        let ypr: YawPitchRoll = ron::from_str(text).unwrap();
        assert_eq!(ypr.mapping, AxisMapping::YZX);
        assert_eq!(ypr.parent_offset, [0.0, 90.0, 0.0]);
        assert_eq!(ypr.state(), BindingState::Unbound);
        assert_eq!(ypr.result(), DVec3::ZERO);
    }
}
