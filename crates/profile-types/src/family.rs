use serde::{Deserialize, Serialize};
use std::fmt;

/// Structural cross-section category of the stock profile.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ProfileFamily {
    IProfile,
    UProfile,
    LProfile,
    TubeRect,
    TubeRound,
    TProfile,
    Plate,
    Unknown,
}

impl ProfileFamily {
    pub const ALL: [ProfileFamily; 8] = [
        ProfileFamily::IProfile,
        ProfileFamily::UProfile,
        ProfileFamily::LProfile,
        ProfileFamily::TubeRect,
        ProfileFamily::TubeRound,
        ProfileFamily::TProfile,
        ProfileFamily::Plate,
        ProfileFamily::Unknown,
    ];

    /// Map a DSTV header profile code to a family.
    ///
    /// Returns `None` for codes outside the supported set; callers decide
    /// whether to fall back to [`ProfileFamily::Unknown`].
    pub fn from_dstv_code(code: &str) -> Option<ProfileFamily> {
        match code.trim().to_ascii_uppercase().as_str() {
            "I" => Some(ProfileFamily::IProfile),
            "U" => Some(ProfileFamily::UProfile),
            "L" => Some(ProfileFamily::LProfile),
            "M" => Some(ProfileFamily::TubeRect),
            "RO" | "RU" => Some(ProfileFamily::TubeRound),
            "T" => Some(ProfileFamily::TProfile),
            "B" | "BL" => Some(ProfileFamily::Plate),
            _ => None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            ProfileFamily::IProfile => "I_PROFILE",
            ProfileFamily::UProfile => "U_PROFILE",
            ProfileFamily::LProfile => "L_PROFILE",
            ProfileFamily::TubeRect => "TUBE_RECT",
            ProfileFamily::TubeRound => "TUBE_ROUND",
            ProfileFamily::TProfile => "T_PROFILE",
            ProfileFamily::Plate => "PLATE",
            ProfileFamily::Unknown => "UNKNOWN",
        }
    }

    pub fn is_tube(self) -> bool {
        matches!(self, ProfileFamily::TubeRect | ProfileFamily::TubeRound)
    }
}

impl fmt::Display for ProfileFamily {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
