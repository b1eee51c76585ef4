//! Frame converter between channel numbering and normalization conventions.
//!
//! A converter owns a fixed layout and the currently selected pair of modes.
//! It never owns sample memory: callers hand in frames and receive them back
//! renumbered and rescaled. Renumbering happens inside each degree group, and
//! rescaling always applies to ACN-ordered data, so weights that differ
//! within a degree land on the right harmonic in both directions.

use std::{fmt, marker::PhantomData, ops::Range};

use crate::{
    layout::harmonic_in_degree,
    numbering::{permute_degree, Direction, LegacyNumbering, MAX_LEGACY_ORDER},
    Dimensionality, ExchangeError, HarmonicLayout, Normalization, Numbering, Result,
};

/// Largest degree group a legacy numbering can touch.
const GROUP_CAPACITY: usize = 2 * MAX_LEGACY_ORDER + 1;

/// Compile-time dimensionality of a converter.
pub trait Dimension: Copy + fmt::Debug + Default + PartialEq + Send + Sync + 'static {
    const DIMENSIONALITY: Dimensionality;
}

/// Circular harmonics.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Planar;

/// Spherical harmonics.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Spherical;

impl Dimension for Planar {
    const DIMENSIONALITY: Dimensionality = Dimensionality::Planar;
}

impl Dimension for Spherical {
    const DIMENSIONALITY: Dimensionality = Dimensionality::Spherical;
}

/// Operations shared by every converter.
pub trait HarmonicConverter {
    fn layout(&self) -> HarmonicLayout;

    fn numbering(&self) -> Numbering;

    fn set_numbering(&mut self, mode: Numbering);

    fn normalization(&self) -> Normalization;

    fn set_normalization(&mut self, mode: Normalization);

    /// Converts the first `channel_count` samples of `inputs` into `outputs`.
    fn process(&self, inputs: &[f32], outputs: &mut [f32]) -> Result<()>;

    /// Converts the first `channel_count` samples of `frame` in place.
    fn process_in_place(&self, frame: &mut [f32]) -> Result<()>;

    fn order(&self) -> usize {
        self.layout().order()
    }

    fn channel_count(&self) -> usize {
        self.layout().channel_count()
    }

    /// Selects the B-format import pair: Furse-Malham numbering and MaxN
    /// weighting into ACN / semi-normalization.
    fn configure_from_b_format(&mut self) {
        self.set_numbering(Numbering::FromFurseMalham);
        self.set_normalization(Normalization::FromMaxN);
    }

    /// Selects the B-format export pair.
    fn configure_to_b_format(&mut self) {
        self.set_numbering(Numbering::ToFurseMalham);
        self.set_normalization(Normalization::ToMaxN);
    }

    /// Converts a buffer of consecutive frames in place.
    fn process_frames_in_place(&self, frames: &mut [f32]) -> Result<()> {
        let channels = self.channel_count();
        if frames.len() % channels != 0 {
            return Err(ExchangeError::PartialFrame {
                len: frames.len(),
                channels,
            });
        }
        for frame in frames.chunks_exact_mut(channels) {
            self.process_in_place(frame)?;
        }
        Ok(())
    }
}

/// Converter for one dimensionality, fixed at compile time.
#[derive(Debug, Clone, PartialEq)]
pub struct ChannelConverter<D: Dimension> {
    layout: HarmonicLayout,
    numbering: Numbering,
    normalization: Normalization,
    /// Per ACN channel weight of `normalization`, empty in `Semi`.
    gains: Vec<f32>,
    _dimension: PhantomData<D>,
}

pub type PlanarConverter = ChannelConverter<Planar>;
pub type SphericalConverter = ChannelConverter<Spherical>;

impl<D: Dimension> ChannelConverter<D> {
    /// Creates a converter in `(Acn, Semi)` mode. The order must be at least 1.
    pub fn new(order: usize) -> Result<Self> {
        Ok(Self {
            layout: HarmonicLayout::new(order, D::DIMENSIONALITY)?,
            numbering: Numbering::default(),
            normalization: Normalization::default(),
            gains: Vec::new(),
            _dimension: PhantomData,
        })
    }

    fn refresh_gains(&mut self) {
        self.gains.clear();
        if self.normalization == Normalization::Semi {
            return;
        }
        let layout = self.layout;
        self.gains.reserve_exact(layout.channel_count());
        for (degree, span) in layout.degrees() {
            for offset in 0..span.len() {
                let m = harmonic_in_degree(degree, offset, D::DIMENSIONALITY);
                let gain = self.normalization.weight(degree, m, D::DIMENSIONALITY);
                self.gains.push(gain);
            }
        }
    }

    fn validate(&self, inputs: usize, outputs: usize) -> Result<()> {
        let needed = self.layout.channel_count();
        for got in [inputs, outputs] {
            if got < needed {
                return Err(ExchangeError::BufferTooSmall { needed, got });
            }
        }

        let order = self.layout.order();
        if self.numbering.is_legacy() && order > MAX_LEGACY_ORDER {
            return Err(ExchangeError::InvalidOrder {
                order,
                reason: "legacy numberings are only defined up to order 3",
            });
        }
        Ok(())
    }

    /// Applies the weights of the ACN channels `span` to `group`.
    fn rescale(&self, span: Range<usize>, group: &mut [f32]) {
        if self.normalization == Normalization::Semi {
            return;
        }
        for (sample, gain) in group.iter_mut().zip(&self.gains[span]) {
            *sample *= gain;
        }
    }

    /// Renumbers and rescales one degree group. `group` is a scratch copy of
    /// the incoming samples of `span`, so `output` may be the same memory the
    /// copy was taken from.
    fn exchange_group(
        &self,
        legacy: LegacyNumbering,
        direction: Direction,
        span: Range<usize>,
        group: &mut [f32],
        output: &mut [f32],
    ) {
        let table = legacy.table(D::DIMENSIONALITY);
        match direction {
            Direction::FromLegacy => {
                permute_degree(table, direction, span.clone(), group, output);
                self.rescale(span, output);
            }
            Direction::ToLegacy => {
                self.rescale(span.clone(), group);
                permute_degree(table, direction, span, group, output);
            }
        }
    }
}

impl<D: Dimension> HarmonicConverter for ChannelConverter<D> {
    fn layout(&self) -> HarmonicLayout {
        self.layout
    }

    fn numbering(&self) -> Numbering {
        self.numbering
    }

    fn set_numbering(&mut self, mode: Numbering) {
        self.numbering = mode;
    }

    fn normalization(&self) -> Normalization {
        self.normalization
    }

    fn set_normalization(&mut self, mode: Normalization) {
        if mode != self.normalization {
            self.normalization = mode;
            self.refresh_gains();
        }
    }

    fn process(&self, inputs: &[f32], outputs: &mut [f32]) -> Result<()> {
        self.validate(inputs.len(), outputs.len())?;

        match self.numbering.legacy() {
            None => {
                let channels = self.layout.channel_count();
                outputs[..channels].copy_from_slice(&inputs[..channels]);
                for (_, span) in self.layout.degrees() {
                    self.rescale(span.clone(), &mut outputs[span]);
                }
            }
            Some((legacy, direction)) => {
                for (_, span) in self.layout.degrees() {
                    let mut scratch = [0.0_f32; GROUP_CAPACITY];
                    let group = &mut scratch[..span.len()];
                    group.copy_from_slice(&inputs[span.clone()]);
                    let output = &mut outputs[span.clone()];
                    self.exchange_group(legacy, direction, span, group, output);
                }
            }
        }
        Ok(())
    }

    fn process_in_place(&self, frame: &mut [f32]) -> Result<()> {
        self.validate(frame.len(), frame.len())?;

        match self.numbering.legacy() {
            None => {
                for (_, span) in self.layout.degrees() {
                    self.rescale(span.clone(), &mut frame[span]);
                }
            }
            Some((legacy, direction)) => {
                for (_, span) in self.layout.degrees() {
                    let mut scratch = [0.0_f32; GROUP_CAPACITY];
                    let group = &mut scratch[..span.len()];
                    group.copy_from_slice(&frame[span.clone()]);
                    let output = &mut frame[span.clone()];
                    self.exchange_group(legacy, direction, span, group, output);
                }
            }
        }
        Ok(())
    }
}

/// Converter whose dimensionality is chosen at construction time.
#[derive(Debug, Clone, PartialEq)]
pub enum Converter {
    Planar(PlanarConverter),
    Spherical(SphericalConverter),
}

impl Converter {
    pub fn new(order: usize, dimensionality: Dimensionality) -> Result<Self> {
        Ok(match dimensionality {
            Dimensionality::Planar => Self::Planar(PlanarConverter::new(order)?),
            Dimensionality::Spherical => Self::Spherical(SphericalConverter::new(order)?),
        })
    }

    pub fn dimensionality(&self) -> Dimensionality {
        match self {
            Self::Planar(_) => Dimensionality::Planar,
            Self::Spherical(_) => Dimensionality::Spherical,
        }
    }
}

impl HarmonicConverter for Converter {
    fn layout(&self) -> HarmonicLayout {
        match self {
            Self::Planar(inner) => inner.layout(),
            Self::Spherical(inner) => inner.layout(),
        }
    }

    fn numbering(&self) -> Numbering {
        match self {
            Self::Planar(inner) => inner.numbering(),
            Self::Spherical(inner) => inner.numbering(),
        }
    }

    fn set_numbering(&mut self, mode: Numbering) {
        match self {
            Self::Planar(inner) => inner.set_numbering(mode),
            Self::Spherical(inner) => inner.set_numbering(mode),
        }
    }

    fn normalization(&self) -> Normalization {
        match self {
            Self::Planar(inner) => inner.normalization(),
            Self::Spherical(inner) => inner.normalization(),
        }
    }

    fn set_normalization(&mut self, mode: Normalization) {
        match self {
            Self::Planar(inner) => inner.set_normalization(mode),
            Self::Spherical(inner) => inner.set_normalization(mode),
        }
    }

    fn process(&self, inputs: &[f32], outputs: &mut [f32]) -> Result<()> {
        match self {
            Self::Planar(inner) => inner.process(inputs, outputs),
            Self::Spherical(inner) => inner.process(inputs, outputs),
        }
    }

    fn process_in_place(&self, frame: &mut [f32]) -> Result<()> {
        match self {
            Self::Planar(inner) => inner.process_in_place(frame),
            Self::Spherical(inner) => inner.process_in_place(frame),
        }
    }
}
