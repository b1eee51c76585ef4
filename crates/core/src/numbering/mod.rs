//! Channel numbering conventions and the permutation tables between them.
//!
//! ACN is the hub convention: every conversion goes from a legacy numbering
//! into ACN or from ACN into a legacy numbering. The legacy conventions
//! (Furse-Malham B-format and SID) are only defined up to third order, which
//! bounds the tables below.

use std::{fmt, ops::Range, str::FromStr};

use serde::{Deserialize, Serialize};

use crate::{Dimensionality, ExchangeError, Result};

/// Highest decomposition order the legacy numberings define.
pub const MAX_LEGACY_ORDER: usize = 3;

/// Furse-Malham planar `W X Y U V P Q`, legacy index to ACN index.
pub const FURSE_MALHAM_PLANAR: [usize; 7] = [0, 2, 1, 4, 3, 6, 5];

/// SID planar (cosine before sine in every degree), legacy index to ACN index.
pub const SID_PLANAR: [usize; 7] = [0, 2, 1, 4, 3, 6, 5];

/// Furse-Malham `W X Y Z R S T U V K L M N O P Q`, legacy index to ACN index.
pub const FURSE_MALHAM_SPHERICAL: [usize; 16] =
    [0, 3, 1, 2, 6, 7, 5, 8, 4, 12, 13, 11, 14, 10, 15, 9];

/// SID (`m = +l, -l, +(l-1), -(l-1), .., 0` per degree), legacy index to
/// ACN index.
pub const SID_SPHERICAL: [usize; 16] = [0, 3, 1, 2, 8, 4, 7, 5, 6, 15, 9, 14, 10, 13, 11, 12];

/// Numbering conversion applied by a converter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Numbering {
    /// Channels are already ACN; no renumbering.
    #[default]
    Acn,
    /// From Furse-Malham (B-format) to ACN.
    FromFurseMalham,
    /// From SID to ACN.
    FromSid,
    /// From ACN to Furse-Malham (B-format).
    ToFurseMalham,
    /// From ACN to SID.
    ToSid,
}

/// Legacy numbering conventions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LegacyNumbering {
    FurseMalham,
    Sid,
}

/// Direction of a conversion relative to the native convention.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Direction {
    FromLegacy,
    ToLegacy,
}

impl Numbering {
    pub const ALL: [Numbering; 5] = [
        Numbering::Acn,
        Numbering::FromFurseMalham,
        Numbering::FromSid,
        Numbering::ToFurseMalham,
        Numbering::ToSid,
    ];

    /// The legacy convention and direction of this mode, `None` for ACN.
    pub fn legacy(self) -> Option<(LegacyNumbering, Direction)> {
        match self {
            Self::Acn => None,
            Self::FromFurseMalham => Some((LegacyNumbering::FurseMalham, Direction::FromLegacy)),
            Self::FromSid => Some((LegacyNumbering::Sid, Direction::FromLegacy)),
            Self::ToFurseMalham => Some((LegacyNumbering::FurseMalham, Direction::ToLegacy)),
            Self::ToSid => Some((LegacyNumbering::Sid, Direction::ToLegacy)),
        }
    }

    pub fn is_legacy(self) -> bool {
        self.legacy().is_some()
    }

    /// The mode that undoes this one.
    pub fn inverse(self) -> Self {
        match self {
            Self::Acn => Self::Acn,
            Self::FromFurseMalham => Self::ToFurseMalham,
            Self::FromSid => Self::ToSid,
            Self::ToFurseMalham => Self::FromFurseMalham,
            Self::ToSid => Self::FromSid,
        }
    }
}

impl fmt::Display for Numbering {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Acn => "acn",
            Self::FromFurseMalham => "from-furse-malham",
            Self::FromSid => "from-sid",
            Self::ToFurseMalham => "to-furse-malham",
            Self::ToSid => "to-sid",
        };
        f.write_str(name)
    }
}

impl FromStr for Numbering {
    type Err = ExchangeError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "acn" => Ok(Self::Acn),
            "from-furse-malham" | "from-fuma" => Ok(Self::FromFurseMalham),
            "from-sid" => Ok(Self::FromSid),
            "to-furse-malham" | "to-fuma" => Ok(Self::ToFurseMalham),
            "to-sid" => Ok(Self::ToSid),
            _ => Err(ExchangeError::UnknownMode(s.to_string())),
        }
    }
}

impl LegacyNumbering {
    /// Legacy index to ACN index table for the dimensionality.
    pub fn table(self, dimensionality: Dimensionality) -> &'static [usize] {
        match (self, dimensionality) {
            (Self::FurseMalham, Dimensionality::Planar) => &FURSE_MALHAM_PLANAR,
            (Self::Sid, Dimensionality::Planar) => &SID_PLANAR,
            (Self::FurseMalham, Dimensionality::Spherical) => &FURSE_MALHAM_SPHERICAL,
            (Self::Sid, Dimensionality::Spherical) => &SID_SPHERICAL,
        }
    }
}

/// Reorders one degree group.
///
/// `span` is the degree's channel span, `input` and `output` hold exactly that
/// span. Both legacy conventions keep every degree inside its ACN span, so
/// the table entries for the span point back into it.
pub(crate) fn permute_degree(
    table: &[usize],
    direction: Direction,
    span: Range<usize>,
    input: &[f32],
    output: &mut [f32],
) {
    let start = span.start;
    for (local, &acn) in table[span].iter().enumerate() {
        let target = acn - start;
        match direction {
            Direction::FromLegacy => output[target] = input[local],
            Direction::ToLegacy => output[local] = input[target],
        }
    }
}
