//! Joint angle readouts for skeletal rigs.
//!
//! [`YawPitchRoll`] measures the rotation of an insertion frame against an origin frame every
//! tick, after a fixed corrective offset on the origin, and reports it as three angles in
//! degrees spread over the channels an [`AxisMapping`] selects. The maths lives in
//! [`relation::FrameRelation`] and can be used without a scene.

pub mod mapping;
pub mod relation;
pub mod scene;
pub mod yaw_pitch_roll;

pub use mapping::{AxisIndices, AxisMapping, ParseAxisMappingError};
pub use relation::{FrameRelation, YawPitchRollAngles};
pub use scene::{FrameResolver, PoseProvider, SceneFrames};
pub use yaw_pitch_roll::{BindingError, BindingState, YawPitchRoll};
