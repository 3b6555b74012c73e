//! Raw DSTV face token → canonical [`Face`].

use profile_types::{Face, ProfileFamily};
use tracing::warn;

use crate::config::FaceRuleTable;
use crate::types::TransformAmbiguity;

/// Result of resolving a face token. The face is always usable; `ambiguity`
/// records any default that was substituted.
#[derive(Debug, Clone, PartialEq)]
pub struct FaceResolution {
    pub face: Face,
    pub ambiguity: Option<TransformAmbiguity>,
}

/// Resolves face tokens through a per-family [`FaceRuleTable`].
#[derive(Debug, Clone, Default)]
pub struct FaceResolver {
    rules: FaceRuleTable,
}

impl FaceResolver {
    pub fn new(rules: FaceRuleTable) -> Self {
        Self { rules }
    }

    pub fn rules(&self) -> &FaceRuleTable {
        &self.rules
    }

    /// Resolve `token` for `family`. Never fails.
    pub fn resolve(&self, token: &str, family: ProfileFamily) -> FaceResolution {
        let normalized = token.trim().to_ascii_lowercase();

        // Canonical names are accepted for every family.
        if let Some(face) = Face::from_name(&normalized) {
            return FaceResolution {
                face,
                ambiguity: None,
            };
        }

        let rule = self.rules.rule(family);
        let mut chars = normalized.chars();
        let mapped = match (chars.next(), chars.next()) {
            (Some(c), None) => rule.token(c),
            _ => None,
        };

        let resolution = if !self.rules.has_family(family) {
            let face = mapped.unwrap_or(rule.fallback);
            FaceResolution {
                face,
                ambiguity: Some(TransformAmbiguity::UnknownFamily {
                    token: token.to_string(),
                    face,
                }),
            }
        } else if let Some(face) = mapped {
            FaceResolution {
                face,
                ambiguity: None,
            }
        } else {
            FaceResolution {
                face: rule.fallback,
                ambiguity: Some(TransformAmbiguity::UnknownToken {
                    token: token.to_string(),
                    family,
                    fallback: rule.fallback,
                }),
            }
        };

        if let Some(ambiguity) = &resolution.ambiguity {
            warn!(%family, token, face = %resolution.face, "{ambiguity}");
        }
        resolution
    }
}

/// Map a DSTV profile code to a family, reporting unrecognised codes.
pub fn resolve_family(code: &str) -> (ProfileFamily, Option<TransformAmbiguity>) {
    match ProfileFamily::from_dstv_code(code) {
        Some(family) => (family, None),
        None => {
            let ambiguity = TransformAmbiguity::UnrecognisedProfileCode {
                code: code.to_string(),
            };
            warn!(code, "{ambiguity}");
            (ProfileFamily::Unknown, Some(ambiguity))
        }
    }
}
