use serde::{Deserialize, Serialize};
use std::fmt;

/// One of the three axes of the standard profile frame.
///
/// X runs along the profile length, Y is the vertical height axis and Z the
/// transverse width axis.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Axis {
    X,
    Y,
    Z,
}

impl Axis {
    /// Index into a `[x, y, z]` triple.
    pub fn index(self) -> usize {
        match self {
            Axis::X => 0,
            Axis::Y => 1,
            Axis::Z => 2,
        }
    }

    pub fn unit(self) -> [f64; 3] {
        let mut v = [0.0; 3];
        v[self.index()] = 1.0;
        v
    }
}

/// Canonical face of a profile's bounding solid.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Face {
    Top,
    Bottom,
    Left,
    Right,
    Front,
    Back,
}

impl Face {
    pub const ALL: [Face; 6] = [
        Face::Top,
        Face::Bottom,
        Face::Left,
        Face::Right,
        Face::Front,
        Face::Back,
    ];

    /// Axis along which increasing depth travels into the material.
    pub fn depth_axis(self) -> Axis {
        match self {
            Face::Top | Face::Bottom => Axis::Y,
            Face::Left | Face::Right => Axis::Z,
            Face::Front | Face::Back => Axis::X,
        }
    }

    /// Sign of the outward normal along the depth axis.
    pub fn sign(self) -> f64 {
        match self {
            Face::Top | Face::Right | Face::Back => 1.0,
            Face::Bottom | Face::Left | Face::Front => -1.0,
        }
    }

    /// Outward unit normal in the standard frame. Independent of profile family.
    pub fn normal(self) -> [f64; 3] {
        let mut n = [0.0; 3];
        n[self.depth_axis().index()] = self.sign();
        n
    }

    /// Faces whose local x runs along the profile length.
    pub fn is_longitudinal(self) -> bool {
        !matches!(self, Face::Front | Face::Back)
    }

    pub fn opposite(self) -> Face {
        match self {
            Face::Top => Face::Bottom,
            Face::Bottom => Face::Top,
            Face::Left => Face::Right,
            Face::Right => Face::Left,
            Face::Front => Face::Back,
            Face::Back => Face::Front,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Face::Top => "top",
            Face::Bottom => "bottom",
            Face::Left => "left",
            Face::Right => "right",
            Face::Front => "front",
            Face::Back => "back",
        }
    }

    /// Parse one of the canonical English face names (case-insensitive).
    pub fn from_name(name: &str) -> Option<Face> {
        let name = name.trim();
        Face::ALL
            .iter()
            .copied()
            .find(|f| f.as_str().eq_ignore_ascii_case(name))
    }
}

impl fmt::Display for Face {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
