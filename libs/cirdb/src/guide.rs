//! Per-net routing guides over a coarse placement grid.
//!
//! A guide stores, for every net, an integer probability in `[0, max_range]`
//! for each grid cell, expressing how strongly the net prefers to be routed
//! through that cell. An aggregated average grid, weighted by each net's
//! minimum wire width, models how contested each cell is.
//!
//! The guide moves through three states:
//! [`GuideState::Uninitialized`] until the first guide is ingested,
//! [`GuideState::Accumulating`] while per-net values are written, and
//! [`GuideState::Ready`] after [`RouteGuide::init_average_prob`].
//! Costs are defined in every state; they are zero when the guide is
//! uninitialized or disabled.

use grid::Grid;

use crate::error::{Error, Result};
use crate::net::{Net, NetId};
use crate::table::Table;

/// The lifecycle state of a [`RouteGuide`].
#[derive(Debug, Copy, Clone, Default, Hash, Eq, PartialEq)]
pub enum GuideState {
    /// No guide has been ingested.
    #[default]
    Uninitialized,
    /// Dimensions are fixed and per-net values are being written.
    Accumulating,
    /// The average probability grid is up to date.
    Ready,
}

/// Routing guides for all nets of a design.
#[derive(Debug, Clone)]
pub struct RouteGuide {
    num_x: usize,
    num_y: usize,
    max_range: i64,
    guides: Vec<Grid<i64>>,
    has_guide: Vec<bool>,
    avg_prob: Grid<i64>,
    enable: bool,
    state: GuideState,
}

impl Default for RouteGuide {
    fn default() -> Self {
        Self {
            num_x: 0,
            num_y: 0,
            max_range: 0,
            guides: Vec::new(),
            has_guide: Vec::new(),
            avg_prob: Grid::new(0, 0),
            enable: true,
            state: GuideState::Uninitialized,
        }
    }
}

impl RouteGuide {
    /// Creates a zeroed guide of `num_x` by `num_y` cells for `num_nets` nets.
    ///
    /// `max_range` is the probability value meaning "certain". Fails if the
    /// grid is empty or too large to allocate for every net.
    pub fn new(num_x: usize, num_y: usize, max_range: i64, num_nets: usize) -> Result<Self> {
        if num_x == 0 || num_y == 0 {
            return Err(Error::InvalidArgument(format!(
                "guide grid must be non-empty, got {num_x}x{num_y}"
            )));
        }
        let fits = num_x
            .checked_mul(num_y)
            .and_then(|cells| cells.checked_mul(num_nets.saturating_add(1)))
            .and_then(|cells| cells.checked_mul(std::mem::size_of::<i64>()))
            .is_some_and(|bytes| bytes <= isize::MAX as usize);
        if !fits {
            return Err(Error::InvalidArgument(format!(
                "guide grid of {num_x}x{num_y} cells for {num_nets} nets is too large"
            )));
        }
        if max_range <= 0 {
            return Err(Error::InvalidArgument(format!(
                "guide range must be positive, got {max_range}"
            )));
        }
        Ok(Self {
            num_x,
            num_y,
            max_range,
            guides: vec![Grid::init(num_x, num_y, 0); num_nets],
            has_guide: vec![false; num_nets],
            avg_prob: Grid::init(num_x, num_y, 0),
            enable: true,
            state: GuideState::Accumulating,
        })
    }

    /// Initializes an uninitialized guide with the given dimensions, keeping
    /// the enable flag.
    ///
    /// On an initialized guide, checks that the dimensions match the ones
    /// already in use.
    pub fn ensure_init(
        &mut self,
        num_x: usize,
        num_y: usize,
        max_range: i64,
        num_nets: usize,
    ) -> Result<()> {
        if self.is_init() {
            let expected = (self.num_x, self.num_y, self.max_range);
            let found = (num_x, num_y, max_range);
            if expected != found {
                return Err(Error::GuideDimensionMismatch { expected, found });
            }
            return Ok(());
        }
        let enable = self.enable;
        *self = Self::new(num_x, num_y, max_range, num_nets)?;
        self.enable = enable;
        tracing::debug!(num_x, num_y, max_range, num_nets, "guide initialized");
        Ok(())
    }

    /// Enables or disables the guide.
    ///
    /// A disabled guide reports zero cost everywhere.
    pub fn set_enable(&mut self, enable: bool) {
        self.enable = enable;
    }

    /// Returns `true` if the guide is enabled.
    #[inline]
    pub fn is_enabled(&self) -> bool {
        self.enable
    }

    /// The lifecycle state.
    #[inline]
    pub fn state(&self) -> GuideState {
        self.state
    }

    /// Returns `true` once dimensions have been fixed by a first guide.
    #[inline]
    pub fn is_init(&self) -> bool {
        self.state != GuideState::Uninitialized
    }

    /// The number of cells in x.
    #[inline]
    pub fn num_x(&self) -> usize {
        self.num_x
    }

    /// The number of cells in y.
    #[inline]
    pub fn num_y(&self) -> usize {
        self.num_y
    }

    /// The probability value meaning "certain".
    #[inline]
    pub fn max_range(&self) -> i64 {
        self.max_range
    }

    /// The number of nets the guide was sized for.
    #[inline]
    pub fn num_nets(&self) -> usize {
        self.guides.len()
    }

    /// Sizes an initialized guide for at least `num_nets` nets.
    ///
    /// New nets start without guide data. The average grid is unaffected, so
    /// the state does not change.
    pub fn grow_nets(&mut self, num_nets: usize) {
        if !self.is_init() || num_nets <= self.guides.len() {
            return;
        }
        let (num_x, num_y) = (self.num_x, self.num_y);
        self.guides
            .resize_with(num_nets, || Grid::init(num_x, num_y, 0));
        self.has_guide.resize(num_nets, false);
    }

    /// Writes the raw probability of `net` at cell `(x, y)`.
    ///
    /// Invalidates a previously computed average.
    pub fn set_guide(&mut self, value: i64, net: NetId, x: usize, y: usize) -> Result<()> {
        self.check_cell(net, x, y)?;
        if !(0..=self.max_range).contains(&value) {
            return Err(Error::GuideValueOutOfRange {
                value,
                max_range: self.max_range,
            });
        }
        if let Some(cell) = self.guides[net.index()].get_mut(x, y) {
            *cell = value;
        }
        self.state = GuideState::Accumulating;
        Ok(())
    }

    /// Declares whether `net` has usable guide data.
    pub fn set_net_has_guide(&mut self, net: NetId, has_guide: bool) -> Result<()> {
        self.check_net(net)?;
        self.has_guide[net.index()] = has_guide;
        self.state = GuideState::Accumulating;
        Ok(())
    }

    /// Returns `true` if `net` has usable guide data.
    pub fn has_guide(&self, net: NetId) -> bool {
        self.has_guide.get(net.index()).copied().unwrap_or(false)
    }

    /// The raw probability of `net` at cell `(x, y)`.
    pub fn probability(&self, net: NetId, x: usize, y: usize) -> Result<i64> {
        self.check_cell(net, x, y)?;
        Ok(self.guides[net.index()][(x, y)])
    }

    /// The probability of `net` at cell `(x, y)` as a fraction of `max_range`.
    pub fn probability_ratio(&self, net: NetId, x: usize, y: usize) -> Result<f64> {
        Ok(self.probability(net, x, y)? as f64 / self.max_range as f64)
    }

    /// The width-weighted average probability at cell `(x, y)`.
    pub fn avg_probability(&self, x: usize, y: usize) -> Result<i64> {
        self.check_xy(x, y)?;
        Ok(self.avg_prob[(x, y)])
    }

    /// Computes the average probability grid from all nets with guide data.
    ///
    /// Each net is weighted by its minimum wire width; nets without guide
    /// data or with a non-positive width are left out. Nets without guide
    /// data are zeroed. If the total weight is zero the average grid is left
    /// untouched. Does nothing if the guide is disabled or uninitialized.
    pub fn init_average_prob(&mut self, nets: &Table<Net>) -> Result<()> {
        if !self.enable || !self.is_init() {
            return Ok(());
        }
        let mut weights = Vec::with_capacity(self.guides.len());
        for (idx, has_guide) in self.has_guide.iter().enumerate() {
            let net = nets.try_get(NetId::new(idx))?;
            weights.push(if *has_guide && net.min_width() > 0 {
                net.min_width()
            } else {
                0
            });
        }
        for (guide, has_guide) in self.guides.iter_mut().zip(self.has_guide.iter()) {
            if !has_guide {
                *guide = Grid::init(self.num_x, self.num_y, 0);
            }
        }

        let total_weight: i64 = weights.iter().sum();
        self.state = GuideState::Ready;
        if total_weight == 0 {
            tracing::debug!("no weighted guides, leaving average probability unset");
            return Ok(());
        }
        for x in 0..self.num_x {
            for y in 0..self.num_y {
                let sum: i64 = self
                    .guides
                    .iter()
                    .zip(weights.iter())
                    .map(|(guide, w)| guide[(x, y)] * w)
                    .sum();
                self.avg_prob[(x, y)] = sum / total_weight;
            }
        }
        tracing::debug!(total_weight, "computed average guide probability");
        Ok(())
    }

    /// The routing cost of `net` through cell `(x, y)`.
    ///
    /// The sum of the cost of deviating from the net's own guide and the
    /// cost of using a cell other nets want. Zero if the guide is disabled
    /// or uninitialized.
    pub fn cost(&self, net: NetId, x: usize, y: usize) -> Result<i64> {
        if !self.enable || !self.is_init() {
            return Ok(0);
        }
        self.check_cell(net, x, y)?;
        Ok(self.violate_cost(net, x, y) + self.congest_cost(net, x, y))
    }

    /// How strongly the guide supports routing `net` through `(x, y)`,
    /// from roughly 9 (unsupported) to 99 (certain).
    ///
    /// Zero if the guide is disabled or uninitialized, or if the net has
    /// no guide data.
    pub fn guide_confidence(&self, net: NetId, x: usize, y: usize) -> Result<i64> {
        if !self.enable || !self.is_init() {
            return Ok(0);
        }
        self.check_cell(net, x, y)?;
        if !self.has_guide[net.index()] {
            return Ok(0);
        }
        let ratio = self.ratio(net, x, y) as f64;
        let confidence = 99.76226 - 90. / (1. + (ratio / 38.5198).powf(4.73));
        Ok(confidence as i64)
    }

    /// Returns `true` if the guide is confident that `net` belongs in `(x, y)`,
    /// i.e. its probability there exceeds a fifth of `max_range`.
    pub fn confident(&self, net: NetId, x: usize, y: usize) -> Result<bool> {
        if !self.is_init() {
            return Err(Error::GuideNotInitialized);
        }
        Ok(self.probability(net, x, y)? > self.max_range / 5)
    }

    /// The probability of `net` at `(x, y)` as an integer percentage.
    #[inline]
    fn ratio(&self, net: NetId, x: usize, y: usize) -> i64 {
        self.guides[net.index()][(x, y)] * 100 / self.max_range
    }

    /// `-100 + 718.2 / 2^(ratio / 37)`, with an integer exponent.
    fn violate_cost(&self, net: NetId, x: usize, y: usize) -> i64 {
        if !self.has_guide[net.index()] {
            return 0;
        }
        let exp = (self.ratio(net, x, y) / 37) as i32;
        (-100. + 718.2 / 2f64.powi(exp)) as i64
    }

    fn congest_cost(&self, net: NetId, x: usize, y: usize) -> i64 {
        let avg = self.avg_prob[(x, y)];
        if self.has_guide[net.index()] {
            let own = self.guides[net.index()][(x, y)];
            (avg - own).max(0) * 3 / self.max_range
        } else {
            avg * 100 / self.max_range
        }
    }

    fn check_net(&self, net: NetId) -> Result<()> {
        if !self.is_init() {
            return Err(Error::GuideNotInitialized);
        }
        if net.index() >= self.guides.len() {
            return Err(Error::IdOutOfRange {
                kind: "net",
                index: net.index(),
                len: self.guides.len(),
            });
        }
        Ok(())
    }

    fn check_xy(&self, x: usize, y: usize) -> Result<()> {
        if !self.is_init() {
            return Err(Error::GuideNotInitialized);
        }
        if x >= self.num_x || y >= self.num_y {
            return Err(Error::GuideCellOutOfBounds {
                x,
                y,
                num_x: self.num_x,
                num_y: self.num_y,
            });
        }
        Ok(())
    }

    fn check_cell(&self, net: NetId, x: usize, y: usize) -> Result<()> {
        self.check_net(net)?;
        self.check_xy(x, y)
    }
}
