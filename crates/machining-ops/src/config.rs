//! Immutable configuration for the machining pipeline.
//!
//! Everything that varies by profile family lives in the two rule tables
//! here. A [`MachiningConfig`] is built once and handed to the resolver,
//! pipeline and applicator constructors.

use std::collections::{BTreeMap, HashMap};

use profile_types::{Face, ProfileFamily};
use serde::{Deserialize, Serialize};

/// Errors raised while loading or checking a configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("configuration is not valid JSON: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("cylinder_segments must be at least 3, got {0}")]
    TooFewSegments(usize),

    #[error("{name} must be non-negative and finite, got {value}")]
    InvalidTolerance { name: &'static str, value: f64 },

    #[error("transform rule for {family} {face} is listed more than once")]
    DuplicateTransformRule { family: ProfileFamily, face: Face },
}

// ---------------------------------------------------------------------------
// Face tokens
// ---------------------------------------------------------------------------

/// Mapping of the four DSTV face tokens for one profile family.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FaceTokenRule {
    /// `o`: top (oben).
    pub o: Option<Face>,
    /// `u`: bottom (unten).
    pub u: Option<Face>,
    /// `v`: front (vorne).
    pub v: Option<Face>,
    /// `h`: rear (hinten).
    pub h: Option<Face>,
    /// Used for unknown or unmapped tokens.
    pub fallback: Face,
}

impl FaceTokenRule {
    pub fn token(&self, token: char) -> Option<Face> {
        match token {
            'o' => self.o,
            'u' => self.u,
            'v' => self.v,
            'h' => self.h,
            _ => None,
        }
    }
}

/// Per-family face token tables plus the context-free table used when the
/// family is unknown.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FaceRuleTable {
    pub families: BTreeMap<ProfileFamily, FaceTokenRule>,
    pub context_free: FaceTokenRule,
}

impl FaceRuleTable {
    /// The token rule for `family`; families without an entry use the
    /// context-free table.
    pub fn rule(&self, family: ProfileFamily) -> &FaceTokenRule {
        self.families.get(&family).unwrap_or(&self.context_free)
    }

    pub fn has_family(&self, family: ProfileFamily) -> bool {
        self.families.contains_key(&family)
    }
}

impl Default for FaceRuleTable {
    fn default() -> Self {
        use Face::*;
        let rule = |o, u, v, h, fallback| FaceTokenRule {
            o,
            u,
            v,
            h,
            fallback,
        };
        let families = BTreeMap::from([
            (
                ProfileFamily::IProfile,
                rule(Some(Top), Some(Bottom), Some(Left), Some(Right), Left),
            ),
            (
                ProfileFamily::UProfile,
                rule(Some(Top), Some(Bottom), Some(Left), Some(Right), Left),
            ),
            (
                ProfileFamily::LProfile,
                rule(None, Some(Bottom), Some(Left), None, Left),
            ),
            (
                ProfileFamily::TProfile,
                rule(Some(Top), Some(Bottom), Some(Left), Some(Right), Top),
            ),
            (
                ProfileFamily::TubeRect,
                rule(Some(Top), Some(Bottom), Some(Left), Some(Right), Top),
            ),
            (
                ProfileFamily::TubeRound,
                rule(Some(Top), Some(Bottom), Some(Left), Some(Right), Top),
            ),
            (ProfileFamily::Plate, rule(None, None, Some(Left), Some(Right), Left)),
        ]);
        Self {
            families,
            context_free: rule(Some(Top), Some(Bottom), Some(Front), Some(Back), Top),
        }
    }
}

// ---------------------------------------------------------------------------
// Transform rules
// ---------------------------------------------------------------------------

/// Where a face-local axis has its zero.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AxisOrigin {
    /// Measured from the profile start or a reference edge; recentred by
    /// subtracting half the face span.
    Edge,
    /// Already centred on the face.
    Centered,
}

/// Which section thickness a surface offset refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Thickness {
    Web,
    Flange,
    Wall,
}

/// Signed position of a face's material surface along its depth axis.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum SurfaceOffset {
    /// Bounding box: face sign times the half extent.
    Extent,
    /// Face sign times half the thickness (a web centred on the axis).
    Centerline { thickness: Thickness },
    /// Inside surface of a wall standing on the negative side:
    /// `-half_extent + thickness`.
    InnerWall { thickness: Thickness },
    /// Outside of a round tube at the in-plane transverse coordinate.
    RoundSurface,
}

/// How one face of one family maps into the standard frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransformRule {
    pub x_origin: AxisOrigin,
    pub y_origin: AxisOrigin,
    pub surface: SurfaceOffset,
}

impl TransformRule {
    /// Rule for faces with no family-specific entry: x from the profile start
    /// on long faces, centred otherwise, surface on the bounding box.
    pub fn bounding(face: Face) -> Self {
        Self {
            x_origin: if face.is_longitudinal() {
                AxisOrigin::Edge
            } else {
                AxisOrigin::Centered
            },
            y_origin: AxisOrigin::Centered,
            surface: SurfaceOffset::Extent,
        }
    }
}

/// Wire form of one table entry.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TransformRuleEntry {
    pub family: ProfileFamily,
    pub face: Face,
    #[serde(flatten)]
    pub rule: TransformRule,
}

/// `(ProfileFamily, Face) → TransformRule`, built once.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(from = "Vec<TransformRuleEntry>", into = "Vec<TransformRuleEntry>")]
pub struct TransformRuleTable {
    rules: HashMap<(ProfileFamily, Face), TransformRule>,
    duplicates: Vec<(ProfileFamily, Face)>,
}

impl TransformRuleTable {
    pub fn empty() -> Self {
        Self {
            rules: HashMap::new(),
            duplicates: Vec::new(),
        }
    }

    pub fn with_rule(mut self, family: ProfileFamily, face: Face, rule: TransformRule) -> Self {
        if self.rules.insert((family, face), rule).is_some() {
            self.duplicates.push((family, face));
        }
        self
    }

    /// The rule for `family` on `face`, or [`TransformRule::bounding`].
    pub fn rule(&self, family: ProfileFamily, face: Face) -> TransformRule {
        self.rules
            .get(&(family, face))
            .copied()
            .unwrap_or_else(|| TransformRule::bounding(face))
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    fn check(&self) -> Result<(), ConfigError> {
        match self.duplicates.first() {
            Some(&(family, face)) => Err(ConfigError::DuplicateTransformRule { family, face }),
            None => Ok(()),
        }
    }
}

impl From<Vec<TransformRuleEntry>> for TransformRuleTable {
    fn from(entries: Vec<TransformRuleEntry>) -> Self {
        entries
            .into_iter()
            .fold(TransformRuleTable::empty(), |table, e| {
                table.with_rule(e.family, e.face, e.rule)
            })
    }
}

impl From<TransformRuleTable> for Vec<TransformRuleEntry> {
    fn from(table: TransformRuleTable) -> Self {
        let mut entries: Vec<TransformRuleEntry> = table
            .rules
            .into_iter()
            .map(|((family, face), rule)| TransformRuleEntry { family, face, rule })
            .collect();
        entries.sort_by_key(|e| (e.family, e.face));
        entries
    }
}

impl Default for TransformRuleTable {
    fn default() -> Self {
        use AxisOrigin::{Centered, Edge};
        use Face::*;
        use ProfileFamily::*;

        let long = |y_origin, surface| TransformRule {
            x_origin: Edge,
            y_origin,
            surface,
        };
        let web = SurfaceOffset::Centerline {
            thickness: Thickness::Web,
        };
        let inner = |thickness| SurfaceOffset::InnerWall { thickness };
        let extent = SurfaceOffset::Extent;

        let mut table = TransformRuleTable::empty();
        for family in [IProfile, TProfile] {
            table = table
                .with_rule(family, Top, long(Centered, extent))
                .with_rule(family, Bottom, long(Centered, extent))
                .with_rule(family, Left, long(Edge, web))
                .with_rule(family, Right, long(Edge, web));
        }
        table = table
            .with_rule(UProfile, Top, long(Centered, extent))
            .with_rule(UProfile, Bottom, long(Centered, extent))
            .with_rule(UProfile, Left, long(Edge, extent))
            .with_rule(UProfile, Right, long(Edge, inner(Thickness::Web)))
            .with_rule(LProfile, Top, long(Edge, inner(Thickness::Flange)))
            .with_rule(LProfile, Bottom, long(Edge, extent))
            .with_rule(LProfile, Left, long(Edge, extent))
            .with_rule(LProfile, Right, long(Edge, inner(Thickness::Web)))
            .with_rule(TubeRect, Top, long(Centered, extent))
            .with_rule(TubeRect, Bottom, long(Centered, extent))
            .with_rule(TubeRect, Left, long(Edge, extent))
            .with_rule(TubeRect, Right, long(Edge, extent))
            .with_rule(TubeRound, Top, long(Centered, SurfaceOffset::RoundSurface))
            .with_rule(TubeRound, Bottom, long(Centered, SurfaceOffset::RoundSurface))
            .with_rule(TubeRound, Left, long(Edge, SurfaceOffset::RoundSurface))
            .with_rule(TubeRound, Right, long(Edge, SurfaceOffset::RoundSurface))
            .with_rule(Plate, Top, long(Edge, extent))
            .with_rule(Plate, Bottom, long(Edge, extent))
            .with_rule(Plate, Left, long(Edge, web))
            .with_rule(Plate, Right, long(Edge, web));
        table
    }
}

// ---------------------------------------------------------------------------
// Tolerances and tooling
// ---------------------------------------------------------------------------

/// Tolerances for validation and the round-trip checks (millimetres).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Tolerance {
    /// Slack allowed on face bounds checks.
    pub bounds: f64,
    /// Allowed error when inverting a transform.
    pub round_trip: f64,
}

impl Default for Tolerance {
    fn default() -> Self {
        Self {
            bounds: 1e-6,
            round_trip: 1e-6,
        }
    }
}

/// Cutting-tool construction parameters.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ToolConfig {
    /// Facets used to approximate a hole's circle.
    pub cylinder_segments: usize,
    /// How far a blind-hole tool starts outside the surface.
    pub tool_clearance: f64,
}

impl Default for ToolConfig {
    fn default() -> Self {
        Self {
            cylinder_segments: 32,
            tool_clearance: 0.5,
        }
    }
}

/// Complete configuration of the machining core.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct MachiningConfig {
    pub face_rules: FaceRuleTable,
    pub transform_rules: TransformRuleTable,
    pub tolerance: Tolerance,
    pub tool: ToolConfig,
}

impl MachiningConfig {
    /// Coarse tooling for fast previews.
    pub fn preview() -> Self {
        Self {
            tool: ToolConfig {
                cylinder_segments: 12,
                ..ToolConfig::default()
            },
            ..Self::default()
        }
    }

    /// Fine tooling for export-quality meshes.
    pub fn fine() -> Self {
        Self {
            tool: ToolConfig {
                cylinder_segments: 64,
                ..ToolConfig::default()
            },
            ..Self::default()
        }
    }

    /// Parse and check a JSON configuration. Missing sections take their
    /// defaults.
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let config: MachiningConfig = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn to_json(&self) -> Result<String, ConfigError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.tool.cylinder_segments < 3 {
            return Err(ConfigError::TooFewSegments(self.tool.cylinder_segments));
        }
        for (name, value) in [
            ("tolerance.bounds", self.tolerance.bounds),
            ("tolerance.round_trip", self.tolerance.round_trip),
            ("tool.tool_clearance", self.tool.tool_clearance),
        ] {
            if !value.is_finite() || value < 0.0 {
                return Err(ConfigError::InvalidTolerance { name, value });
            }
        }
        self.transform_rules.check()
    }
}
