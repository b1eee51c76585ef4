//! Channel layout of a harmonic frame under the native ACN numbering.
//!
//! Planar (circular) frames hold one channel for degree 0 and a sine/cosine
//! pair for every higher degree. Spherical frames hold `2l + 1` channels for
//! degree `l`, ordered by increasing `m`.

use std::{fmt, ops::Range, str::FromStr};

use serde::{Deserialize, Serialize};

use crate::{ExchangeError, Result};

/// Spatial dimensionality of a harmonic decomposition.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Dimensionality {
    /// Circular harmonics, horizontal plane only.
    Planar,
    /// Spherical harmonics, full sphere.
    Spherical,
}

impl fmt::Display for Dimensionality {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Planar => f.write_str("planar"),
            Self::Spherical => f.write_str("spherical"),
        }
    }
}

impl FromStr for Dimensionality {
    type Err = ExchangeError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "planar" | "2d" => Ok(Self::Planar),
            "spherical" | "3d" => Ok(Self::Spherical),
            _ => Err(ExchangeError::UnknownMode(s.to_string())),
        }
    }
}

/// Largest channel count whose frame of `f32` samples fits in one slice.
pub const MAX_CHANNELS: usize = isize::MAX as usize / std::mem::size_of::<f32>();

/// Number of channels of a frame of the given order.
///
/// Every order accepted by [`HarmonicLayout::new`] is in range; use
/// [`checked_channel_count`] for unvalidated orders.
pub fn channel_count(order: usize, dimensionality: Dimensionality) -> usize {
    match dimensionality {
        Dimensionality::Planar => 2 * order + 1,
        Dimensionality::Spherical => (order + 1) * (order + 1),
    }
}

/// Channel count of `order`, or `None` when it exceeds [`MAX_CHANNELS`].
pub fn checked_channel_count(order: usize, dimensionality: Dimensionality) -> Option<usize> {
    let count = match dimensionality {
        Dimensionality::Planar => order.checked_mul(2)?.checked_add(1)?,
        Dimensionality::Spherical => {
            let side = order.checked_add(1)?;
            side.checked_mul(side)?
        }
    };
    (count <= MAX_CHANNELS).then_some(count)
}

/// Contiguous span of native channel indices that belong to `degree`.
pub fn degree_channel_range(
    order: usize,
    degree: usize,
    dimensionality: Dimensionality,
) -> Result<Range<usize>> {
    if degree > order {
        return Err(ExchangeError::InvalidDegree { degree, order });
    }
    Ok(degree_span(degree, dimensionality))
}

/// Harmonic degree that owns the native channel `channel`.
pub fn degree_of_channel(channel: usize, dimensionality: Dimensionality) -> usize {
    match dimensionality {
        Dimensionality::Planar => (channel + 1) / 2,
        Dimensionality::Spherical => {
            let mut degree = 0;
            while (degree + 1) * (degree + 1) <= channel {
                degree += 1;
            }
            degree
        }
    }
}

/// Native channel index of the harmonic `(degree, m)`.
///
/// Returns `None` when `m` does not name a component of `degree`: outside
/// `-degree..=degree` for spherical frames, anything but `±degree` for
/// planar ones.
pub fn harmonic_index(degree: usize, m: isize, dimensionality: Dimensionality) -> Option<usize> {
    let l = degree as isize;
    if m.unsigned_abs() > degree {
        return None;
    }
    match dimensionality {
        Dimensionality::Spherical => Some((l * l + l + m) as usize),
        Dimensionality::Planar if degree == 0 => Some(0),
        Dimensionality::Planar if m == -l => Some(2 * degree - 1),
        Dimensionality::Planar if m == l => Some(2 * degree),
        Dimensionality::Planar => None,
    }
}

/// Inverse of [`harmonic_index`]: the `(degree, m)` pair stored at `channel`.
pub fn harmonic_of_channel(channel: usize, dimensionality: Dimensionality) -> (usize, isize) {
    let degree = degree_of_channel(channel, dimensionality);
    let offset = channel - degree_span(degree, dimensionality).start;
    (degree, harmonic_in_degree(degree, offset, dimensionality))
}

/// The `m` of the channel at `offset` within the span of `degree`.
pub fn harmonic_in_degree(degree: usize, offset: usize, dimensionality: Dimensionality) -> isize {
    let l = degree as isize;
    match dimensionality {
        Dimensionality::Spherical => offset as isize - l,
        Dimensionality::Planar if degree == 0 => 0,
        Dimensionality::Planar if offset == 0 => -l,
        Dimensionality::Planar => l,
    }
}

fn degree_span(degree: usize, dimensionality: Dimensionality) -> Range<usize> {
    match dimensionality {
        Dimensionality::Planar if degree == 0 => 0..1,
        Dimensionality::Planar => (2 * degree - 1)..(2 * degree + 1),
        Dimensionality::Spherical => (degree * degree)..((degree + 1) * (degree + 1)),
    }
}

/// Fixed layout of a frame: a decomposition order in a dimensionality.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HarmonicLayout {
    order: usize,
    dimensionality: Dimensionality,
}

impl HarmonicLayout {
    /// Creates a layout. The order must be at least 1 and small enough for
    /// a frame to be addressable.
    pub fn new(order: usize, dimensionality: Dimensionality) -> Result<Self> {
        if order == 0 {
            return Err(ExchangeError::InvalidOrder {
                order,
                reason: "order must be at least 1",
            });
        }
        if checked_channel_count(order, dimensionality).is_none() {
            return Err(ExchangeError::InvalidOrder {
                order,
                reason: "channel count does not fit in memory",
            });
        }
        Ok(Self {
            order,
            dimensionality,
        })
    }

    pub fn order(&self) -> usize {
        self.order
    }

    pub fn dimensionality(&self) -> Dimensionality {
        self.dimensionality
    }

    pub fn channel_count(&self) -> usize {
        channel_count(self.order, self.dimensionality)
    }

    pub fn degree_range(&self, degree: usize) -> Result<Range<usize>> {
        degree_channel_range(self.order, degree, self.dimensionality)
    }

    /// Iterates over every degree of the frame together with its channel span.
    pub fn degrees(&self) -> impl Iterator<Item = (usize, Range<usize>)> {
        let dimensionality = self.dimensionality;
        (0..=self.order).map(move |degree| (degree, degree_span(degree, dimensionality)))
    }
}
