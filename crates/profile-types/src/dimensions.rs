use serde::{Deserialize, Serialize};

use crate::family::ProfileFamily;

/// Errors raised when constructing profile dimensions.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum DimensionError {
    #[error("{parameter} must be positive and finite, got {value}")]
    NonPositive { parameter: &'static str, value: f64 },
}

fn check_positive(parameter: &'static str, value: f64) -> Result<f64, DimensionError> {
    if value.is_finite() && value > 0.0 {
        Ok(value)
    } else {
        Err(DimensionError::NonPositive { parameter, value })
    }
}

/// Static geometric description of the stock profile (millimetres).
///
/// Immutable once constructed; `length`, `height` and `width` are always
/// positive. Thicknesses are optional because not every family carries all of
/// them; the `nominal_*` accessors resolve missing values.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "DimensionsRecord", into = "DimensionsRecord")]
pub struct ProfileDimensions {
    length: f64,
    height: f64,
    width: f64,
    web_thickness: Option<f64>,
    flange_thickness: Option<f64>,
    wall_thickness: Option<f64>,
    family: ProfileFamily,
}

impl ProfileDimensions {
    pub fn new(
        family: ProfileFamily,
        length: f64,
        height: f64,
        width: f64,
    ) -> Result<Self, DimensionError> {
        Ok(Self {
            length: check_positive("length", length)?,
            height: check_positive("height", height)?,
            width: check_positive("width", width)?,
            web_thickness: None,
            flange_thickness: None,
            wall_thickness: None,
            family,
        })
    }

    pub fn with_web_thickness(mut self, t: f64) -> Result<Self, DimensionError> {
        self.web_thickness = Some(check_positive("web_thickness", t)?);
        Ok(self)
    }

    pub fn with_flange_thickness(mut self, t: f64) -> Result<Self, DimensionError> {
        self.flange_thickness = Some(check_positive("flange_thickness", t)?);
        Ok(self)
    }

    pub fn with_wall_thickness(mut self, t: f64) -> Result<Self, DimensionError> {
        self.wall_thickness = Some(check_positive("wall_thickness", t)?);
        Ok(self)
    }

    pub fn length(&self) -> f64 {
        self.length
    }

    pub fn height(&self) -> f64 {
        self.height
    }

    pub fn width(&self) -> f64 {
        self.width
    }

    pub fn family(&self) -> ProfileFamily {
        self.family
    }

    pub fn web_thickness(&self) -> Option<f64> {
        self.web_thickness
    }

    pub fn flange_thickness(&self) -> Option<f64> {
        self.flange_thickness
    }

    pub fn wall_thickness(&self) -> Option<f64> {
        self.wall_thickness
    }

    /// Flange thickness, falling back to wall then web thickness, then to the
    /// full height (solid section).
    pub fn nominal_flange_thickness(&self) -> f64 {
        self.flange_thickness
            .or(self.wall_thickness)
            .or(self.web_thickness)
            .unwrap_or(self.height)
    }

    /// Web thickness, falling back to wall then flange thickness, then to the
    /// full width (solid section). For plates this is the plate thickness.
    pub fn nominal_web_thickness(&self) -> f64 {
        self.web_thickness
            .or(self.wall_thickness)
            .or(self.flange_thickness)
            .unwrap_or(self.width)
    }

    /// Tube wall thickness, falling back to web then flange thickness.
    pub fn nominal_wall_thickness(&self) -> f64 {
        self.wall_thickness
            .or(self.web_thickness)
            .or(self.flange_thickness)
            .unwrap_or(0.5 * self.height.min(self.width))
    }

    /// Transverse extent of the section. Plates are described standing up,
    /// so theirs is the plate thickness.
    pub fn section_width(&self) -> f64 {
        match self.family {
            ProfileFamily::Plate => self.nominal_web_thickness(),
            _ => self.width,
        }
    }

    /// Half extents of the stock solid in the standard frame `[x, y, z]`.
    ///
    /// Plates lie flat: their thickness runs along Y and their DSTV height
    /// along Z.
    pub fn half_extents(&self) -> [f64; 3] {
        match self.family {
            ProfileFamily::Plate => [
                0.5 * self.length,
                0.5 * self.section_width(),
                0.5 * self.height,
            ],
            _ => [0.5 * self.length, 0.5 * self.height, 0.5 * self.width],
        }
    }
}

/// Wire form of [`ProfileDimensions`], validated on conversion.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct DimensionsRecord {
    length: f64,
    height: f64,
    width: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    web_thickness: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    flange_thickness: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    wall_thickness: Option<f64>,
    profile_family: ProfileFamily,
}

impl TryFrom<DimensionsRecord> for ProfileDimensions {
    type Error = DimensionError;

    fn try_from(r: DimensionsRecord) -> Result<Self, Self::Error> {
        let mut dims = ProfileDimensions::new(r.profile_family, r.length, r.height, r.width)?;
        if let Some(t) = r.web_thickness {
            dims = dims.with_web_thickness(t)?;
        }
        if let Some(t) = r.flange_thickness {
            dims = dims.with_flange_thickness(t)?;
        }
        if let Some(t) = r.wall_thickness {
            dims = dims.with_wall_thickness(t)?;
        }
        Ok(dims)
    }
}

impl From<ProfileDimensions> for DimensionsRecord {
    fn from(d: ProfileDimensions) -> Self {
        Self {
            length: d.length,
            height: d.height,
            width: d.width,
            web_thickness: d.web_thickness,
            flange_thickness: d.flange_thickness,
            wall_thickness: d.wall_thickness,
            profile_family: d.family,
        }
    }
}
