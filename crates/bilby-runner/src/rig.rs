//! Rig description files (`.ron`) and loading them into a [`hecs::World`].

use bilby_engine::entity::{EntityTransform, Label, Transform, rotation_from_euler_degrees};
use bilby_engine::hierarchy::Hierarchy;
use bilby_rig::{AxisMapping, BindingState, SceneFrames, YawPitchRoll};
use glam::DVec3;
use hecs::{Entity, World};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fs;
use std::path::Path;

fn one() -> [f64; 3] {
    [1.0, 1.0, 1.0]
}

/// A single frame of the rig. Euler angles are in degrees.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FrameConfig {
    pub label: String,
    #[serde(default)]
    pub position: [f64; 3],
    #[serde(default)]
    pub rotation: [f64; 3],
    #[serde(default = "one")]
    pub scale: [f64; 3],
    #[serde(default)]
    pub parent: Option<String>,
    /// Added to the local rotation every tick.
    #[serde(default)]
    pub spin: [f64; 3],
}

impl FrameConfig {
    fn local_transform(&self) -> Transform {
        Transform::from_parts(
            DVec3::from_array(self.position),
            rotation_from_euler_degrees(DVec3::from_array(self.rotation)),
            DVec3::from_array(self.scale),
        )
    }
}

/// A yaw/pitch/roll readout between two frames.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConstraintConfig {
    pub origin: String,
    pub insertion: String,
    #[serde(default)]
    pub parent_offset: [f64; 3],
    #[serde(default)]
    pub mapping: AxisMapping,
    /// Label of the frame whose descendants are searched first.
    #[serde(default)]
    pub container: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RigConfig {
    #[serde(default)]
    pub frames: Vec<FrameConfig>,
    #[serde(default)]
    pub constraints: Vec<ConstraintConfig>,
}

impl RigConfig {
    /// Read a rig from a `.ron` file
    pub fn read_from(path: impl AsRef<Path>) -> anyhow::Result<Self> {
        let ron_str = fs::read_to_string(path.as_ref()).map_err(|e| {
            anyhow::anyhow!("Unable to read rig file {}: {}", path.as_ref().display(), e)
        })?;
        Self::from_ron(&ron_str)
    }

    pub fn from_ron(ron_str: &str) -> anyhow::Result<Self> {
        ron::de::from_str(ron_str).map_err(|e| anyhow::anyhow!("RON deserialization error: {}", e))
    }
}

/// A frame in the world with its per-tick spin.
struct Spinning {
    entity: Entity,
    spin: DVec3,
}

/// One constraint and the readout it is driving.
pub struct Readout {
    pub name: String,
    pub container: Option<Entity>,
    pub component: YawPitchRoll,
}

/// The loaded rig: frames in a world plus the components measuring them.
pub struct Rig {
    world: World,
    spinning: Vec<Spinning>,
    readouts: Vec<Readout>,
}

impl Rig {
    /// Spawns every frame, links parents, then binds and configures each constraint.
    ///
    /// Unknown parents are an error. Constraints naming unknown frames are kept but stay
    /// inert.
    pub fn load(config: &RigConfig) -> anyhow::Result<Self> {
        let mut world = World::new();
        let mut by_label = HashMap::new();
        let mut entities = Vec::with_capacity(config.frames.len());
        let mut spinning = Vec::new();

        for frame in &config.frames {
            let entity = world.spawn((
                Label::new(frame.label.clone()),
                EntityTransform::new(frame.local_transform(), Transform::default()),
            ));
            if by_label.contains_key(&frame.label) {
                log::warn!("Duplicate frame label `{}`, lookups are ambiguous", frame.label);
            } else {
                by_label.insert(frame.label.clone(), entity);
            }
            entities.push(entity);

            let spin = DVec3::from_array(frame.spin);
            if spin != DVec3::ZERO {
                spinning.push(Spinning { entity, spin });
            }
        }
        log::debug!("Spawned {} frames", config.frames.len());

        for (frame, &child) in config.frames.iter().zip(&entities) {
            let Some(parent) = &frame.parent else {
                continue;
            };
            let parent_entity = *by_label.get(parent).ok_or_else(|| {
                anyhow::anyhow!("Frame `{}` has unknown parent `{}`", frame.label, parent)
            })?;
            if !Hierarchy::set_parent(&mut world, child, parent_entity) {
                return Err(anyhow::anyhow!(
                    "Parenting `{}` under `{}` forms a cycle",
                    frame.label,
                    parent
                ));
            }
        }

        let mut readouts = Vec::with_capacity(config.constraints.len());
        {
            let frames = SceneFrames::new(&world);
            for constraint in &config.constraints {
                let container = constraint
                    .container
                    .as_deref()
                    .and_then(|label| Label::new(label).locate_entity(&world));

                let mut component = YawPitchRoll::new(
                    constraint.origin.clone(),
                    constraint.insertion.clone(),
                    constraint.parent_offset,
                    constraint.mapping,
                );
                if component.setup(&frames, container) == BindingState::Invalid {
                    log::warn!(
                        "Readout {} -> {} will stay at zero",
                        constraint.origin,
                        constraint.insertion
                    );
                }

                readouts.push(Readout {
                    name: format!("{}->{}", constraint.origin, constraint.insertion),
                    container,
                    component,
                });
            }
        }

        Ok(Self {
            world,
            spinning,
            readouts,
        })
    }

    /// Advances the animation one frame and recomputes every readout.
    pub fn tick(&mut self) {
        for frame in &self.spinning {
            if let Ok(mut transform) = self.world.get::<&mut EntityTransform>(frame.entity) {
                transform.local_mut().rotate_euler_degrees(frame.spin);
            }
        }

        let frames = SceneFrames::new(&self.world);
        for readout in &mut self.readouts {
            readout.component.tick(&frames);
        }
    }

    pub fn readouts(&self) -> &[Readout] {
        &self.readouts
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const ELBOW: &str = r#"
(
    frames: [
        (label: "shoulder", position: (0.0, 1.5, 0.0)),
        (label: "elbow", position: (0.3, 0.0, 0.0), parent: Some("shoulder"), spin: (0.0, 0.0, 10.0)),
    ],
    constraints: [
        (origin: "shoulder", insertion: "elbow", mapping: XYZ),
        (origin: "shoulder", insertion: "wrist"),
    ],
)
"#;

    #[test]
    fn parses_with_defaults() {
        let config = RigConfig::from_ron(ELBOW).unwrap();
        assert_eq!(config.frames.len(), 2);
        assert_eq!(config.frames[0].scale, [1.0, 1.0, 1.0]);
        assert_eq!(config.frames[1].parent.as_deref(), Some("shoulder"));
        assert_eq!(config.constraints[1].mapping, AxisMapping::ZXY);
        assert_eq!(config.constraints[1].parent_offset, [0.0; 3]);
    }

    #[test]
    fn ticking_spins_the_insertion() {
        let config = RigConfig::from_ron(ELBOW).unwrap();
        let mut rig = Rig::load(&config).unwrap();

        assert_eq!(rig.readouts()[0].component.state(), BindingState::Valid);
        assert_eq!(rig.readouts()[1].component.state(), BindingState::Invalid);

        for _ in 0..3 {
            rig.tick();
        }

        let elbow = rig.readouts()[0].component.result();
        assert!((elbow.x - 30.0).abs() < 1e-6, "{elbow:?}");
        assert_eq!(rig.readouts()[1].component.result(), DVec3::ZERO);
    }

    #[test]
    fn unknown_parent_is_an_error() {
        let config = RigConfig::from_ron(
            r#"(frames: [(label: "a", parent: Some("ghost"))], constraints: [])"#,
        )
        .unwrap();
        assert!(Rig::load(&config).is_err());
    }

    #[test]
    fn reads_from_disk() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("elbow.ron");
        fs::write(&path, ELBOW).unwrap();

        let config = RigConfig::read_from(&path).unwrap();
        assert_eq!(config.constraints.len(), 2);

        let missing = RigConfig::read_from(dir.path().join("missing.ron")).unwrap_err();
        assert!(missing.to_string().contains("missing.ron"), "{missing}");
    }
}
