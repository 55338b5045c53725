//! Axis orderings for yaw/pitch/roll readouts.

use serde::{Deserialize, Serialize};
use std::fmt::{self, Display, Formatter};
use std::str::FromStr;

/// Which output channel receives yaw, pitch and roll respectively.
///
/// The name reads left to right as yaw, pitch, roll, so [`AxisMapping::ZXY`] writes yaw into
/// the Z channel, pitch into X and roll into Y.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AxisMapping {
    #[default]
    ZXY = 0,
    XYZ = 1,
    XZY = 2,
    YXZ = 3,
    YZX = 4,
    ZYX = 5,
}

/// Output slots (0 = X, 1 = Y, 2 = Z) for each angle. Always a permutation of `{0, 1, 2}`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct AxisIndices {
    pub yaw: usize,
    pub pitch: usize,
    pub roll: usize,
}

impl AxisIndices {
    const fn new(yaw: usize, pitch: usize, roll: usize) -> Self {
        Self { yaw, pitch, roll }
    }

    /// The slots in yaw, pitch, roll order.
    pub const fn as_array(&self) -> [usize; 3] {
        [self.yaw, self.pitch, self.roll]
    }
}

impl AxisMapping {
    pub const ALL: [AxisMapping; 6] = [
        AxisMapping::ZXY,
        AxisMapping::XYZ,
        AxisMapping::XZY,
        AxisMapping::YXZ,
        AxisMapping::YZX,
        AxisMapping::ZYX,
    ];

    /// Looks up the output slots for this mapping.
    pub const fn indices(self) -> AxisIndices {
        match self {
            AxisMapping::ZXY => AxisIndices::new(2, 0, 1),
            AxisMapping::XYZ => AxisIndices::new(0, 1, 2),
            AxisMapping::XZY => AxisIndices::new(0, 2, 1),
            AxisMapping::YXZ => AxisIndices::new(1, 0, 2),
            AxisMapping::YZX => AxisIndices::new(1, 2, 0),
            AxisMapping::ZYX => AxisIndices::new(2, 1, 0),
        }
    }

    pub const fn as_str(self) -> &'static str {
        match self {
            AxisMapping::ZXY => "ZXY",
            AxisMapping::XYZ => "XYZ",
            AxisMapping::XZY => "XZY",
            AxisMapping::YXZ => "YXZ",
            AxisMapping::YZX => "YZX",
            AxisMapping::ZYX => "ZYX",
        }
    }
}

impl Display for AxisMapping {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown axis mapping `{0}`, expected one of ZXY, XYZ, XZY, YXZ, YZX, ZYX")]
pub struct ParseAxisMappingError(pub String);

impl FromStr for AxisMapping {
    type Err = ParseAxisMappingError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        AxisMapping::ALL
            .into_iter()
            .find(|mapping| mapping.as_str().eq_ignore_ascii_case(trimmed))
            .ok_or_else(|| ParseAxisMappingError(s.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_mapping_is_a_permutation() {
        for mapping in AxisMapping::ALL {
            let mut slots = mapping.indices().as_array();
            slots.sort_unstable();
            assert_eq!(slots, [0, 1, 2], "{mapping} does not use each axis once");
        }
    }

    #[test]
    fn indices_follow_the_letters() {
        for mapping in AxisMapping::ALL {
            let slots = mapping.indices().as_array();
            for (letter, slot) in mapping.as_str().chars().zip(slots) {
                let expected = match letter {
                    'X' => 0,
                    'Y' => 1,
                    'Z' => 2,
                    _ => unreachable!(),
                };
                assert_eq!(slot, expected, "{mapping}: {letter}");
            }
        }
    }

    #[test]
    fn zxy_is_the_default() {
        assert_eq!(AxisMapping::default(), AxisMapping::ZXY);
        assert_eq!(
            AxisMapping::ZXY.indices(),
            AxisIndices {
                yaw: 2,
                pitch: 0,
                roll: 1
            }
        );
    }

    #[test]
    fn parses_case_insensitively() {
        assert_eq!("yzx".parse::<AxisMapping>(), Ok(AxisMapping::YZX));
        assert_eq!(" XYZ ".parse::<AxisMapping>(), Ok(AxisMapping::XYZ));
        assert_eq!(
            "XXY".parse::<AxisMapping>(),
            Err(ParseAxisMappingError("XXY".to_string()))
        );
    }

    #[test]
    fn serializes_as_its_name() {
        let text = ron::to_string(&AxisMapping::YXZ).unwrap();
        assert_eq!(text, "YXZ");
        let back: AxisMapping = ron::from_str("ZYX").unwrap();
        assert_eq!(back, AxisMapping::ZYX);
    }
}
