//! Relative rotation of one frame against another, read out as yaw/pitch/roll.
//!
//! The measurement works on homogeneous matrices:
//! 1. Both poses are expanded to translate * rotate * scale matrices.
//! 2. A fixed offset rotation is applied on the left of the origin matrix.
//! 3. The insertion matrix is brought into the space of the offset origin.
//! 4. The rotation part of the result is decomposed into three angles and written into
//!    the channels chosen by an [`AxisMapping`].

use crate::mapping::{AxisIndices, AxisMapping};
use bilby_engine::entity::{Transform, rotation_from_euler_degrees};
use glam::{DMat4, DQuat, DVec3};

/// Raw yaw, pitch and roll of a rotation, in radians, before any sign or channel mapping.
///
/// - Yaw: `asin(2xy + 2zw)`, -π/2 to π/2
/// - Pitch: `atan2(2xw - 2yz, 1 - 2x² - 2z²)`, -π to π
/// - Roll: `atan2(2yw - 2xz, 1 - 2y² - 2z²)`, -π to π
///
/// Near `|2xy + 2zw| = 1` pitch and roll become coupled (gimbal lock).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct YawPitchRollAngles {
    pub yaw: f64,
    pub pitch: f64,
    pub roll: f64,
}

impl From<DQuat> for YawPitchRollAngles {
    fn from(q: DQuat) -> Self {
        // rounding can push the sine just past 1 at the poles
        let sin_yaw = (2.0 * q.x * q.y + 2.0 * q.z * q.w).clamp(-1.0, 1.0);

        Self {
            yaw: sin_yaw.asin(),
            pitch: f64::atan2(
                2.0 * q.x * q.w - 2.0 * q.y * q.z,
                1.0 - 2.0 * q.x * q.x - 2.0 * q.z * q.z,
            ),
            roll: f64::atan2(
                2.0 * q.y * q.w - 2.0 * q.x * q.z,
                1.0 - 2.0 * q.y * q.y - 2.0 * q.z * q.z,
            ),
        }
    }
}

/// The configured measurement between an origin frame and an insertion frame.
///
/// Built once from the offset angles and mapping, then evaluated against fresh poses every
/// tick. Evaluation is pure: the same poses always produce the same readout.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FrameRelation {
    offset: DMat4,
    indices: AxisIndices,
}

impl Default for FrameRelation {
    fn default() -> Self {
        Self::configure(DVec3::ZERO, AxisMapping::default())
    }
}

impl FrameRelation {
    /// Builds the offset matrix from Euler degrees about X, Y and Z (see
    /// [`rotation_from_euler_degrees`]) and looks up the channel slots of `mapping`.
    ///
    /// Offsets are taken as given, there is no validation.
    pub fn configure(offset_euler_degrees: DVec3, mapping: AxisMapping) -> Self {
        let offset = DMat4::from_quat(rotation_from_euler_degrees(offset_euler_degrees));
        log::debug!(
            "Configured frame relation with offset {:?} and mapping {}",
            offset_euler_degrees,
            mapping
        );

        Self {
            offset,
            indices: mapping.indices(),
        }
    }

    /// Rotation of `insertion` as seen from `origin` with the offset applied to it.
    ///
    /// A singular origin (zero scale) is not rejected; the readout becomes NaN. With
    /// non-uniform scale on either pose the extracted rotation carries shear error.
    pub fn relative_rotation(&self, origin: &Transform, insertion: &Transform) -> DQuat {
        let effective_origin = self.offset * origin.matrix();

        if cfg!(debug_assertions) && effective_origin.determinant() == 0.0 {
            log_once::warn_once!("Origin frame matrix is singular, readouts will be NaN");
        }

        let local = effective_origin.inverse() * insertion.matrix();
        let (_, rotation, _) = local.to_scale_rotation_translation();
        rotation
    }

    /// Splits a rotation into degrees and places each angle in its mapped channel.
    ///
    /// Yaw is written as-is, pitch and roll are negated.
    pub fn decompose(&self, rotation: DQuat) -> DVec3 {
        let angles = YawPitchRollAngles::from(rotation);

        let mut readout = DVec3::ZERO;
        readout[self.indices.yaw] = angles.yaw.to_degrees();
        readout[self.indices.pitch] = -angles.pitch.to_degrees();
        readout[self.indices.roll] = -angles.roll.to_degrees();
        readout
    }

    /// [`Self::relative_rotation`] followed by [`Self::decompose`].
    pub fn evaluate(&self, origin: &Transform, insertion: &Transform) -> DVec3 {
        self.decompose(self.relative_rotation(origin, insertion))
    }
}
