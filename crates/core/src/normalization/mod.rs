//! Normalization conventions and their per-harmonic weights.
//!
//! The native convention is semi-normalization (SN2D / SN3D). Every mode is
//! a transition into or out of it, expressed as one multiplier per harmonic.
//! Degree 0 weighs 1 in every mode.
//!
//! Legacy amplitude weights are the reciprocal peak magnitude of each
//! semi-normalized harmonic. The classic Furse-Malham degrees come from a
//! table, higher degrees from a search over the associated Legendre
//! function.

use std::{
    f32::consts::SQRT_2,
    f64::consts::FRAC_PI_2,
    fmt,
    str::FromStr,
};

use serde::{Deserialize, Serialize};

use crate::{numbering::MAX_LEGACY_ORDER, Dimensionality, ExchangeError, Result};

/// Semi-normalized to legacy amplitude (MaxN / Furse-Malham) weights for
/// spherical harmonics, indexed by `[degree][|m|]`.
pub const MAXN_SPHERICAL: [[f32; MAX_LEGACY_ORDER + 1]; MAX_LEGACY_ORDER + 1] = [
    [1.0, 0.0, 0.0, 0.0],
    [1.0, 1.0, 0.0, 0.0],
    // 2 / sqrt(3)
    [1.0, 1.154_700_5, 1.154_700_5, 0.0],
    // sqrt(45 / 32), 3 / sqrt(5), sqrt(8 / 5)
    [1.0, 1.185_854_1, 1.341_640_8, 1.264_911_1],
];

/// Normalization conversion applied by a converter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Normalization {
    /// Channels are already semi-normalized; no rescaling.
    #[default]
    Semi,
    /// From full normalization (N2D / N3D) to semi-normalization.
    FromFull,
    /// From legacy amplitude (MaxN, B-format) to semi-normalization.
    FromMaxN,
    /// From semi-normalization to full normalization (N2D / N3D).
    ToFull,
    /// From semi-normalization to legacy amplitude (MaxN, B-format).
    ToMaxN,
}

impl Normalization {
    pub const ALL: [Normalization; 5] = [
        Normalization::Semi,
        Normalization::FromFull,
        Normalization::FromMaxN,
        Normalization::ToFull,
        Normalization::ToMaxN,
    ];

    /// The mode that undoes this one.
    pub fn inverse(self) -> Self {
        match self {
            Self::Semi => Self::Semi,
            Self::FromFull => Self::ToFull,
            Self::FromMaxN => Self::ToMaxN,
            Self::ToFull => Self::FromFull,
            Self::ToMaxN => Self::FromMaxN,
        }
    }

    /// Multiplier applied to the harmonic `(degree, m)`.
    pub fn weight(self, degree: usize, m: isize, dimensionality: Dimensionality) -> f32 {
        match self {
            Self::Semi => 1.0,
            Self::ToFull => full_weight(degree, dimensionality),
            Self::FromFull => full_weight(degree, dimensionality).recip(),
            Self::ToMaxN => maxn_weight(degree, m, dimensionality),
            Self::FromMaxN => maxn_weight(degree, m, dimensionality).recip(),
        }
    }
}

/// Semi to full normalization multiplier of `degree`.
pub fn full_weight(degree: usize, dimensionality: Dimensionality) -> f32 {
    match dimensionality {
        Dimensionality::Spherical => ((2 * degree + 1) as f32).sqrt(),
        Dimensionality::Planar if degree == 0 => 1.0,
        Dimensionality::Planar => SQRT_2,
    }
}

/// Semi to legacy amplitude multiplier of the harmonic `(degree, m)`.
pub fn maxn_weight(degree: usize, m: isize, dimensionality: Dimensionality) -> f32 {
    let abs_m = m.unsigned_abs().min(degree);
    match dimensionality {
        // SN2D circular harmonics already peak at 1.
        Dimensionality::Planar => 1.0,
        Dimensionality::Spherical => match MAXN_SPHERICAL.get(degree) {
            Some(row) => row[abs_m],
            None => (1.0 / sn3d_peak(degree, abs_m)) as f32,
        },
    }
}

/// Polar samples per degree when bracketing the peak of a harmonic.
const PEAK_SAMPLES_PER_DEGREE: usize = 32;
const PEAK_TOLERANCE: f64 = 1e-12;

/// Largest magnitude of the SN3D harmonic `(degree, abs_m)` over the sphere.
///
/// The azimuthal factor peaks at 1, so this is the peak of the normalized
/// associated Legendre function over the elevation. The polar angle is
/// sampled finely enough that every lobe holds several samples, then the
/// best bracket is refined by golden-section search.
fn sn3d_peak(degree: usize, abs_m: usize) -> f64 {
    let scale = if abs_m == 0 { 1.0 } else { 2.0_f64.sqrt() };
    let magnitude = |theta: f64| scale * normalized_legendre(degree, abs_m, theta).abs();

    let steps = PEAK_SAMPLES_PER_DEGREE * (degree + 1);
    let step = FRAC_PI_2 / steps as f64;
    let best = (0..=steps)
        .map(|i| (i, magnitude(i as f64 * step)))
        .max_by(|a, b| a.1.total_cmp(&b.1))
        .map_or(0, |(i, _)| i);

    let mut low = best.saturating_sub(1) as f64 * step;
    let mut high = ((best + 1).min(steps) as f64 * step);
    let ratio = (5.0_f64.sqrt() - 1.0) / 2.0;
    let mut a = high - ratio * (high - low);
    let mut b = low + ratio * (high - low);
    let (mut fa, mut fb) = (magnitude(a), magnitude(b));
    while high - low > PEAK_TOLERANCE {
        if fa < fb {
            low = a;
            a = b;
            fa = fb;
            b = low + ratio * (high - low);
            fb = magnitude(b);
        } else {
            high = b;
            b = a;
            fb = fa;
            a = high - ratio * (high - low);
            fa = magnitude(a);
        }
    }
    fa.max(fb).max(magnitude(best as f64 * step))
}

/// `sqrt((l - m)! / (l + m)!) * P_l^m(cos theta)`, without the
/// Condon-Shortley phase. The recurrence stays in normalized form so large
/// degrees neither overflow nor underflow.
fn normalized_legendre(degree: usize, abs_m: usize, theta: f64) -> f64 {
    let (x, s) = (theta.cos(), theta.sin());

    let mut diagonal = 1.0;
    for k in 1..=abs_m {
        let k = k as f64;
        diagonal *= s * ((2.0 * k - 1.0) / (2.0 * k)).sqrt();
    }
    if degree == abs_m {
        return diagonal;
    }

    let m = abs_m as f64;
    let mut previous = diagonal;
    let mut current = x * (2.0 * m + 1.0).sqrt() * diagonal;
    for l in (abs_m + 2)..=degree {
        let l = l as f64;
        let next = ((2.0 * l - 1.0) * x * current
            - ((l - 1.0) * (l - 1.0) - m * m).sqrt() * previous)
            / (l * l - m * m).sqrt();
        previous = current;
        current = next;
    }
    current
}

impl fmt::Display for Normalization {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Semi => "semi",
            Self::FromFull => "from-full",
            Self::FromMaxN => "from-maxn",
            Self::ToFull => "to-full",
            Self::ToMaxN => "to-maxn",
        };
        f.write_str(name)
    }
}

impl FromStr for Normalization {
    type Err = ExchangeError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "semi" | "sn2d" | "sn3d" => Ok(Self::Semi),
            "from-full" | "from-n2d" | "from-n3d" => Ok(Self::FromFull),
            "from-maxn" => Ok(Self::FromMaxN),
            "to-full" | "to-n2d" | "to-n3d" => Ok(Self::ToFull),
            "to-maxn" => Ok(Self::ToMaxN),
            _ => Err(ExchangeError::UnknownMode(s.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const EPSILON: f32 = 1e-6;

    #[test]
    fn degree_zero_is_never_rescaled() {
        for mode in Normalization::ALL {
            for dimensionality in [Dimensionality::Planar, Dimensionality::Spherical] {
                assert_eq!(mode.weight(0, 0, dimensionality), 1.0);
            }
        }
    }

    #[test]
    fn full_weights_follow_degree() {
        assert!((full_weight(1, Dimensionality::Spherical) - 3.0_f32.sqrt()).abs() < EPSILON);
        assert!((full_weight(3, Dimensionality::Spherical) - 7.0_f32.sqrt()).abs() < EPSILON);
        assert_eq!(full_weight(2, Dimensionality::Planar), SQRT_2);
    }

    #[test]
    fn maxn_table_matches_closed_forms() {
        let expected = [
            (2, 1, 2.0 / 3.0_f32.sqrt()),
            (2, 2, 2.0 / 3.0_f32.sqrt()),
            (3, 1, (45.0_f32 / 32.0).sqrt()),
            (3, 2, 3.0 / 5.0_f32.sqrt()),
            (3, 3, (8.0_f32 / 5.0).sqrt()),
        ];
        for (degree, m, weight) in expected {
            for signed in [m, -m] {
                let table = maxn_weight(degree, signed, Dimensionality::Spherical);
                assert!((table - weight).abs() < EPSILON, "({degree}, {signed})");
            }
        }
        assert_eq!(maxn_weight(2, 0, Dimensionality::Spherical), 1.0);
        assert_eq!(maxn_weight(3, 0, Dimensionality::Spherical), 1.0);
    }

    #[test]
    fn peak_search_reproduces_the_table() {
        for degree in 0..=MAX_LEGACY_ORDER {
            for abs_m in 0..=degree {
                let searched = (1.0 / sn3d_peak(degree, abs_m)) as f32;
                let table = MAXN_SPHERICAL[degree][abs_m];
                assert!((searched - table).abs() < EPSILON, "({degree}, {abs_m})");
            }
        }
    }

    #[test]
    fn maxn_weights_extend_past_third_order() {
        // Sectoral harmonics peak on the equator:
        // sqrt(2) * sqrt((2l - 1)!! / (2l)!!).
        let sectoral_four = (2.0_f32 * 105.0 / 384.0).sqrt();
        let weight = maxn_weight(4, 4, Dimensionality::Spherical);
        assert!((weight - sectoral_four.recip()).abs() < EPSILON);
        assert_eq!(maxn_weight(4, -4, Dimensionality::Spherical), weight);

        // Zonal harmonics peak at the poles.
        assert!((maxn_weight(6, 0, Dimensionality::Spherical) - 1.0).abs() < EPSILON);
        assert_eq!(maxn_weight(9, 9, Dimensionality::Planar), 1.0);

        for degree in 4..=8 {
            for m in 1..=degree as isize {
                let weight = maxn_weight(degree, m, Dimensionality::Spherical);
                assert!(weight.is_finite() && weight >= 1.0, "({degree}, {m}): {weight}");
            }
        }
    }

    #[test]
    fn inverse_weights_are_reciprocal() {
        for mode in Normalization::ALL {
            for degree in 0..=5 {
                for m in -(degree as isize)..=(degree as isize) {
                    let forward = mode.weight(degree, m, Dimensionality::Spherical);
                    let back = mode.inverse().weight(degree, m, Dimensionality::Spherical);
                    assert!((forward * back - 1.0).abs() < EPSILON);
                }
            }
        }
    }

    #[test]
    fn parses_mode_names() {
        assert_eq!("SN3D".parse::<Normalization>().unwrap(), Normalization::Semi);
        assert_eq!("to-n2d".parse::<Normalization>().unwrap(), Normalization::ToFull);
        for mode in Normalization::ALL {
            assert_eq!(mode.to_string().parse::<Normalization>().unwrap(), mode);
        }
        assert!("maxn".parse::<Normalization>().is_err());
    }
}
