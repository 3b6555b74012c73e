use serde::{Deserialize, Serialize};

use crate::face::Face;

/// Face-local machine coordinate as written in a DSTV block.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MachineCoordinate {
    /// Raw face token (`o`, `u`, `v`, `h`, or a canonical face name).
    pub face: String,
    /// Position along the main axis.
    pub x: f64,
    /// Position on the secondary axis.
    pub y: f64,
    /// 0 = surface, positive = into the material.
    pub depth: f64,
}

impl MachineCoordinate {
    pub fn new(face: impl Into<String>, x: f64, y: f64, depth: f64) -> Self {
        Self {
            face: face.into(),
            x,
            y,
            depth,
        }
    }
}

/// Output of the coordinate transform pipeline.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct StandardPosition {
    /// Point in the standard profile frame.
    pub position: [f64; 3],
    /// Outward unit normal of the machined surface.
    pub normal: [f64; 3],
    pub face: Face,
    pub depth: f64,
}

impl StandardPosition {
    /// The point on the material surface (position moved back out by `depth`).
    pub fn surface_point(&self) -> [f64; 3] {
        [
            self.position[0] + self.normal[0] * self.depth,
            self.position[1] + self.normal[1] * self.depth,
            self.position[2] + self.normal[2] * self.depth,
        ]
    }
}

/// A circular hole, through or blind.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HoleFeature {
    pub id: String,
    pub coordinate: MachineCoordinate,
    pub diameter: f64,
    pub is_through: bool,
    /// Explicit penetration depth; only meaningful for blind holes.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub depth: Option<f64>,
}

impl HoleFeature {
    pub fn through(id: impl Into<String>, coordinate: MachineCoordinate, diameter: f64) -> Self {
        Self {
            id: id.into(),
            coordinate,
            diameter,
            is_through: true,
            depth: None,
        }
    }

    pub fn blind(
        id: impl Into<String>,
        coordinate: MachineCoordinate,
        diameter: f64,
        depth: f64,
    ) -> Self {
        Self {
            id: id.into(),
            coordinate,
            diameter,
            is_through: false,
            depth: Some(depth),
        }
    }

    pub fn radius(&self) -> f64 {
        0.5 * self.diameter
    }
}

/// Flat feature record handed over by the file parser.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FeatureRecord {
    pub id: String,
    pub face: String,
    pub x: f64,
    pub y: f64,
    #[serde(default)]
    pub depth: f64,
    pub diameter: f64,
    pub is_through: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub blind_depth: Option<f64>,
}

impl FeatureRecord {
    pub fn into_hole(self) -> HoleFeature {
        HoleFeature {
            id: self.id,
            coordinate: MachineCoordinate::new(self.face, self.x, self.y, self.depth),
            diameter: self.diameter,
            is_through: self.is_through,
            depth: if self.is_through { None } else { self.blind_depth },
        }
    }
}

impl From<FeatureRecord> for HoleFeature {
    fn from(record: FeatureRecord) -> Self {
        record.into_hole()
    }
}
