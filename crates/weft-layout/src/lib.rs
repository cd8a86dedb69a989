#![forbid(unsafe_code)]

//! Constraint-based layout for terminal UIs.
//!
//! This crate splits a rectangular area into segments along one axis from a
//! list of declarative size constraints, a flex policy, margins, and
//! inter-segment spacing. The split is computed by [`solver`], an
//! incremental Cassowary-style simplex solver, so competing desires (fixed
//! lengths, percentages, ratios, minimums, fill weights) are traded off by
//! explicit priority instead of ad-hoc rounding rules.
//!
//! ```
//! use weft_layout::{Constraint, Layout, Rect};
//!
//! let areas = Layout::horizontal()
//!     .constraints([Constraint::Percentage(50), Constraint::Percentage(50)])
//!     .split(Rect::new(0, 0, 10, 4));
//!
//! assert_eq!(areas[0], Rect::new(0, 0, 5, 4));
//! assert_eq!(areas[1], Rect::new(5, 0, 5, 4));
//! ```
//!
//! Layout is a pure function of its inputs: every call builds a fresh
//! solver, solves once, and discards it. Identical inputs produce
//! bit-identical rectangles, which keeps UIs stable across frames.

use std::collections::BTreeMap;
use std::fmt;

pub mod solver;

use solver::{Expression, Solver, SolverError, Strength, Variable};
pub use weft_core::geometry::{Rect, Sides, Size};

/// Fixed-point multiplier applied to cell coordinates before solving.
///
/// Sub-cell precision keeps fractional boundaries exact during the solve;
/// values are divided back down and rounded once at the end, so accumulated
/// floating error cannot shift integer cell boundaries.
const PRECISION: f64 = 100.0;

/// The direction to lay segments out in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Direction {
    /// Top to bottom.
    #[default]
    Vertical,
    /// Left to right.
    Horizontal,
}

/// A declarative size constraint for one segment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Constraint {
    /// At least this many cells; grows to fill slack by default.
    Min(u16),
    /// At most this many cells; prefers exactly this many.
    Max(u16),
    /// Exactly this many cells.
    Length(u16),
    /// A percentage of the total area (0-100).
    Percentage(u16),
    /// A fraction `numerator / denominator` of the total area.
    Ratio(u32, u32),
    /// A share of the remaining slack, proportional to the weight.
    Fill(u16),
}

/// How leftover space is distributed among the spacers around segments.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Flex {
    /// Pre-flex behavior: segments start-aligned and the last segment
    /// stretches to fill the remaining space.
    Legacy,
    /// Segments packed toward the start; the trailing spacer absorbs slack.
    #[default]
    Start,
    /// Segments centered; the flanking spacers share slack equally.
    Center,
    /// Segments packed toward the end; the leading spacer absorbs slack.
    End,
    /// Flush to both edges; interior spacers share slack equally.
    SpaceBetween,
    /// All spacers, flanks included, share slack equally.
    SpaceAround,
}

/// The gap between adjacent segments.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Spacing {
    /// Leave this many empty cells between segments.
    Space(u16),
    /// Overlap adjacent segments by this many cells.
    Overlap(u16),
}

impl Spacing {
    /// Spacing in scaled solver units; overlap is a negative gap.
    fn units(self) -> f64 {
        match self {
            Spacing::Space(n) => f64::from(n) * PRECISION,
            Spacing::Overlap(n) => -f64::from(n) * PRECISION,
        }
    }
}

impl Default for Spacing {
    fn default() -> Self {
        Spacing::Space(0)
    }
}

impl From<u16> for Spacing {
    fn from(gap: u16) -> Self {
        Spacing::Space(gap)
    }
}

/// Errors surfaced by the fallible split entry points.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LayoutError {
    /// The emitted required constraints admit no solution. Indicates a bug
    /// in constraint emission rather than bad user input; degenerate areas
    /// solve fine.
    Unsatisfiable,
    /// The solver violated an internal invariant.
    Internal(&'static str),
}

impl fmt::Display for LayoutError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LayoutError::Unsatisfiable => write!(f, "layout constraints are unsatisfiable"),
            LayoutError::Internal(msg) => write!(f, "layout solver error: {msg}"),
        }
    }
}

impl std::error::Error for LayoutError {}

impl From<SolverError> for LayoutError {
    fn from(err: SolverError) -> Self {
        match err {
            SolverError::Unsatisfiable => LayoutError::Unsatisfiable,
            SolverError::UnknownConstraint => LayoutError::Internal("unknown constraint"),
            SolverError::DuplicateEditVariable => LayoutError::Internal("duplicate edit variable"),
            SolverError::UnknownEditVariable => LayoutError::Internal("unknown edit variable"),
            SolverError::InvalidStrength => LayoutError::Internal("invalid strength"),
            SolverError::Internal(msg) => LayoutError::Internal(msg),
        }
    }
}

/// Constraint priorities used by the translator.
///
/// The relative order of these tiers is normative: segment sizes are ranked
/// spacer > min/max bound > length > percentage > ratio > max-preference >
/// fill > proportion > spacer growth > balancing, and layouts are visually
/// sensitive to that exact ranking.
mod strengths {
    use crate::solver::Strength;

    /// Spacer size equality; just below required so degenerate areas stay
    /// solvable.
    pub const SPACER_SIZE_EQ: Strength = Strength(Strength::REQUIRED.0 - 1.0);
    /// `Min` lower bounds.
    pub const MIN_SIZE_GTE: Strength = Strength(Strength::STRONG.0 * 100.0);
    /// `Max` upper bounds.
    pub const MAX_SIZE_LTE: Strength = Strength(Strength::STRONG.0 * 100.0);
    /// `Length` exact sizes.
    pub const LENGTH_SIZE_EQ: Strength = Strength(Strength::STRONG.0 * 10.0);
    /// `Percentage` sizes.
    pub const PERCENTAGE_SIZE_EQ: Strength = Strength::STRONG;
    /// `Ratio` sizes.
    pub const RATIO_SIZE_EQ: Strength = Strength(Strength::STRONG.0 / 10.0);
    /// `Max` preference for its full size.
    pub const MAX_SIZE_EQ: Strength = Strength(Strength::MEDIUM.0 * 10.0);
    /// `Min`/`Fill` growth toward the full area.
    pub const FILL_GROW: Strength = Strength::MEDIUM;
    /// Proportionality between fill-like segments, and legacy stretch-last.
    pub const GROW: Strength = Strength(Strength::MEDIUM.0 / 10.0);
    /// Spacer growth for flex modes that absorb slack into gaps.
    pub const SPACE_GROW: Strength = Strength(Strength::WEAK.0 * 10.0);
    /// Equal-size balancing between adjacent segments.
    pub const ALL_SEGMENT_GROW: Strength = Strength::WEAK;
}

/// A start/end variable pair spanning one segment or spacer along the split
/// axis. Created once per split call and discarded with the solver.
#[derive(Debug, Clone, Copy)]
struct Element {
    start: Variable,
    end: Variable,
}

impl Element {
    fn new(solver: &mut Solver) -> Self {
        Self {
            start: solver.new_variable(),
            end: solver.new_variable(),
        }
    }

    /// `end - start` as an expression.
    fn size(&self) -> Expression {
        Expression::term(self.end, 1.0).sub(Expression::term(self.start, 1.0))
    }

    fn has_size(&self, size: Expression, strength: Strength) -> solver::Constraint {
        solver::Constraint::equal(strength)
            .with_expression(self.size())
            .versus(size)
    }

    fn has_fixed_size(&self, size: f64, strength: Strength) -> solver::Constraint {
        self.has_size(Expression::constant(size), strength)
    }

    fn has_min_size(&self, size: f64, strength: Strength) -> solver::Constraint {
        solver::Constraint::greater_or_equal(strength)
            .with_expression(self.size())
            .versus(size)
    }

    fn has_max_size(&self, size: f64, strength: Strength) -> solver::Constraint {
        solver::Constraint::less_or_equal(strength)
            .with_expression(self.size())
            .versus(size)
    }
}

/// A one-dimensional split of an area into constraint-sized segments.
///
/// Built fluently, then applied with [`split`](Self::split) or
/// [`split_with_spacers`](Self::split_with_spacers):
///
/// ```
/// use weft_layout::{Constraint, Flex, Layout, Rect, Spacing};
///
/// let layout = Layout::vertical()
///     .constraints([Constraint::Length(1), Constraint::Min(0), Constraint::Length(1)])
///     .flex(Flex::Start)
///     .spacing(Spacing::Space(0));
///
/// let rows = layout.split(Rect::new(0, 0, 80, 24));
/// assert_eq!(rows.len(), 3);
/// assert_eq!(rows[0].height, 1);
/// assert_eq!(rows[1].height, 22);
/// assert_eq!(rows[2].height, 1);
/// ```
#[derive(Debug, Clone, Default)]
pub struct Layout {
    direction: Direction,
    constraints: Vec<Constraint>,
    flex: Flex,
    margin: Sides,
    spacing: Spacing,
}

impl Layout {
    /// Create a new vertical layout.
    pub fn vertical() -> Self {
        Self {
            direction: Direction::Vertical,
            ..Default::default()
        }
    }

    /// Create a new horizontal layout.
    pub fn horizontal() -> Self {
        Self {
            direction: Direction::Horizontal,
            ..Default::default()
        }
    }

    /// Set the layout direction.
    pub fn direction(mut self, direction: Direction) -> Self {
        self.direction = direction;
        self
    }

    /// Set the segment constraints.
    pub fn constraints(mut self, constraints: impl IntoIterator<Item = Constraint>) -> Self {
        self.constraints = constraints.into_iter().collect();
        self
    }

    /// Set the flex policy.
    pub fn flex(mut self, flex: Flex) -> Self {
        self.flex = flex;
        self
    }

    /// Set the margin.
    pub fn margin(mut self, margin: impl Into<Sides>) -> Self {
        self.margin = margin.into();
        self
    }

    /// Set the spacing between segments.
    pub fn spacing(mut self, spacing: impl Into<Spacing>) -> Self {
        self.spacing = spacing.into();
        self
    }

    /// Number of constraints (and thus output rects from [`split`](Self::split)).
    #[must_use]
    pub fn constraint_count(&self) -> usize {
        self.constraints.len()
    }

    /// Split the area into one rectangle per constraint, in input order.
    ///
    /// Total: if the solve fails (which only a constraint-emission bug can
    /// cause), degrades to zero-sized rectangles at the inner-area origin
    /// instead of aborting the render loop.
    pub fn split(&self, area: Rect) -> Vec<Rect> {
        self.try_split(area).unwrap_or_else(|_| {
            let inner = area.inner(self.margin);
            weft_core::warn!("layout solve failed; degrading to zero-size segments");
            vec![Rect::new(inner.x, inner.y, 0, 0); self.constraints.len()]
        })
    }

    /// Like [`split`](Self::split), additionally returning the spacer
    /// rectangles flanking and separating the segments (`segments + 1` of
    /// them), e.g. for divider rendering.
    pub fn split_with_spacers(&self, area: Rect) -> (Vec<Rect>, Vec<Rect>) {
        self.try_split_with_spacers(area).unwrap_or_else(|_| {
            let inner = area.inner(self.margin);
            weft_core::warn!("layout solve failed; degrading to zero-size segments");
            (
                vec![Rect::new(inner.x, inner.y, 0, 0); self.constraints.len()],
                vec![Rect::new(inner.x, inner.y, 0, 0); self.constraints.len() + 1],
            )
        })
    }

    /// Fallible variant of [`split`](Self::split).
    pub fn try_split(&self, area: Rect) -> Result<Vec<Rect>, LayoutError> {
        self.try_split_with_spacers(area).map(|(segments, _)| segments)
    }

    /// Fallible variant of [`split_with_spacers`](Self::split_with_spacers).
    pub fn try_split_with_spacers(&self, area: Rect) -> Result<(Vec<Rect>, Vec<Rect>), LayoutError> {
        let inner = area.inner(self.margin);
        let (area_start, area_end) = match self.direction {
            Direction::Horizontal => (
                f64::from(inner.x) * PRECISION,
                f64::from(inner.right()) * PRECISION,
            ),
            Direction::Vertical => (
                f64::from(inner.y) * PRECISION,
                f64::from(inner.bottom()) * PRECISION,
            ),
        };
        let gap = self.spacing.units();
        let count = self.constraints.len();

        let mut solver = Solver::new();

        // One element for the whole area, then the chain
        // spacer(0), segment(0), spacer(1), ..., segment(n-1), spacer(n).
        let area_element = Element::new(&mut solver);
        let mut spacers = Vec::with_capacity(count + 1);
        let mut segments = Vec::with_capacity(count);
        spacers.push(Element::new(&mut solver));
        for _ in 0..count {
            segments.push(Element::new(&mut solver));
            spacers.push(Element::new(&mut solver));
        }

        self.configure_area(&mut solver, area_element, area_start, area_end)?;
        self.configure_chain(&mut solver, &segments, &spacers, area_start, area_end, gap)?;
        self.configure_flex(&mut solver, &segments, &spacers, area_element, gap)?;
        self.configure_segments(&mut solver, &segments, area_element)?;
        self.configure_fill_proportions(&mut solver, &segments)?;
        self.configure_balance(&mut solver, &segments)?;

        let values: BTreeMap<Variable, f64> = solver.fetch_changes().into_iter().collect();
        let cell_of = |variable: Variable| -> u16 {
            let scaled = values.get(&variable).copied().unwrap_or(0.0) / PRECISION;
            scaled.round().clamp(0.0, f64::from(u16::MAX)) as u16
        };

        let segment_rects: Vec<Rect> = segments
            .iter()
            .map(|element| self.axis_rect(inner, cell_of(element.start), cell_of(element.end)))
            .collect();
        let spacer_rects: Vec<Rect> = spacers
            .iter()
            .map(|element| self.axis_rect(inner, cell_of(element.start), cell_of(element.end)))
            .collect();

        weft_core::debug!(
            segments = segment_rects.len(),
            spacers = spacer_rects.len(),
            "layout split solved"
        );

        Ok((segment_rects, spacer_rects))
    }

    /// Pin the area element to the inner bounds.
    fn configure_area(
        &self,
        solver: &mut Solver,
        area: Element,
        area_start: f64,
        area_end: f64,
    ) -> Result<(), LayoutError> {
        solver.add_constraint(
            &solver::Constraint::equal(Strength::REQUIRED)
                .with_variable(area.start)
                .versus(area_start),
        )?;
        solver.add_constraint(
            &solver::Constraint::equal(Strength::REQUIRED)
                .with_variable(area.end)
                .versus(area_end),
        )?;
        Ok(())
    }

    /// Required structure: contiguous chain in source order, segments inside
    /// the area and never inverted. Spacers may invert (negative size) only
    /// under `Spacing::Overlap`.
    fn configure_chain(
        &self,
        solver: &mut Solver,
        segments: &[Element],
        spacers: &[Element],
        area_start: f64,
        area_end: f64,
        gap: f64,
    ) -> Result<(), LayoutError> {
        let first_spacer = spacers[0];
        let last_spacer = spacers[spacers.len() - 1];

        solver.add_constraint(
            &solver::Constraint::equal(Strength::REQUIRED)
                .with_variable(first_spacer.start)
                .versus(area_start),
        )?;
        solver.add_constraint(
            &solver::Constraint::equal(Strength::REQUIRED)
                .with_variable(last_spacer.end)
                .versus(area_end),
        )?;

        for (index, segment) in segments.iter().enumerate() {
            solver.add_constraint(
                &solver::Constraint::equal(Strength::REQUIRED)
                    .with_variable(spacers[index].end)
                    .versus(Expression::term(segment.start, 1.0)),
            )?;
            solver.add_constraint(
                &solver::Constraint::equal(Strength::REQUIRED)
                    .with_variable(segment.end)
                    .versus(Expression::term(spacers[index + 1].start, 1.0)),
            )?;

            solver.add_constraint(&segment.has_min_size(0.0, Strength::REQUIRED))?;
            solver.add_constraint(
                &solver::Constraint::greater_or_equal(Strength::REQUIRED)
                    .with_variable(segment.start)
                    .versus(area_start),
            )?;
            solver.add_constraint(
                &solver::Constraint::less_or_equal(Strength::REQUIRED)
                    .with_variable(segment.end)
                    .versus(area_end),
            )?;
        }

        for (index, spacer) in spacers.iter().enumerate() {
            let flank = index == 0 || index == spacers.len() - 1;
            if gap >= 0.0 || flank {
                solver.add_constraint(&spacer.has_min_size(0.0, Strength::REQUIRED))?;
            }
        }

        Ok(())
    }

    /// Flex policy: which spacers are pinned to the configured gap and which
    /// absorb slack.
    fn configure_flex(
        &self,
        solver: &mut Solver,
        segments: &[Element],
        spacers: &[Element],
        area: Element,
        gap: f64,
    ) -> Result<(), LayoutError> {
        use strengths::{GROW, SPACE_GROW, SPACER_SIZE_EQ};

        let first = spacers[0];
        let last = spacers[spacers.len() - 1];
        let interior: &[Element] = if spacers.len() > 1 {
            &spacers[1..spacers.len() - 1]
        } else {
            &[]
        };

        match self.flex {
            Flex::Legacy => {
                for spacer in interior {
                    solver.add_constraint(&spacer.has_fixed_size(gap, SPACER_SIZE_EQ))?;
                }
                solver.add_constraint(&first.has_fixed_size(0.0, SPACER_SIZE_EQ))?;
                if spacers.len() > 1 {
                    solver.add_constraint(&last.has_fixed_size(0.0, SPACER_SIZE_EQ))?;
                }
                if let Some(last_segment) = segments.last() {
                    solver.add_constraint(&last_segment.has_size(area.size(), GROW))?;
                }
            }
            Flex::Start => {
                for spacer in interior {
                    solver.add_constraint(&spacer.has_fixed_size(gap, SPACER_SIZE_EQ))?;
                }
                solver.add_constraint(&first.has_fixed_size(0.0, SPACER_SIZE_EQ))?;
                if spacers.len() > 1 {
                    solver.add_constraint(&last.has_size(area.size(), SPACE_GROW))?;
                }
            }
            Flex::End => {
                for spacer in interior {
                    solver.add_constraint(&spacer.has_fixed_size(gap, SPACER_SIZE_EQ))?;
                }
                solver.add_constraint(&last.has_fixed_size(0.0, SPACER_SIZE_EQ))?;
                if spacers.len() > 1 {
                    solver.add_constraint(&first.has_size(area.size(), SPACE_GROW))?;
                }
            }
            Flex::Center => {
                for spacer in interior {
                    solver.add_constraint(&spacer.has_fixed_size(gap, SPACER_SIZE_EQ))?;
                }
                if spacers.len() > 1 {
                    solver.add_constraint(&first.has_size(last.size(), SPACER_SIZE_EQ))?;
                    solver.add_constraint(&last.has_size(area.size(), SPACE_GROW))?;
                }
                solver.add_constraint(&first.has_size(area.size(), SPACE_GROW))?;
            }
            Flex::SpaceBetween => {
                solver.add_constraint(&first.has_fixed_size(0.0, SPACER_SIZE_EQ))?;
                if spacers.len() > 1 {
                    solver.add_constraint(&last.has_fixed_size(0.0, SPACER_SIZE_EQ))?;
                }
                for pair in interior.windows(2) {
                    solver.add_constraint(&pair[0].has_size(pair[1].size(), SPACER_SIZE_EQ))?;
                }
                for spacer in interior {
                    solver.add_constraint(&spacer.has_min_size(gap, SPACER_SIZE_EQ))?;
                    solver.add_constraint(&spacer.has_size(area.size(), SPACE_GROW))?;
                }
            }
            Flex::SpaceAround => {
                for pair in spacers.windows(2) {
                    solver.add_constraint(&pair[0].has_size(pair[1].size(), SPACER_SIZE_EQ))?;
                }
                for spacer in spacers {
                    solver.add_constraint(&spacer.has_min_size(gap, SPACER_SIZE_EQ))?;
                    solver.add_constraint(&spacer.has_size(area.size(), SPACE_GROW))?;
                }
            }
        }

        Ok(())
    }

    /// Per-segment constraint groups, one strength tier per constraint kind.
    fn configure_segments(
        &self,
        solver: &mut Solver,
        segments: &[Element],
        area: Element,
    ) -> Result<(), LayoutError> {
        use strengths::{
            FILL_GROW, LENGTH_SIZE_EQ, MAX_SIZE_EQ, MAX_SIZE_LTE, MIN_SIZE_GTE, PERCENTAGE_SIZE_EQ,
            RATIO_SIZE_EQ,
        };

        for (&constraint, segment) in self.constraints.iter().zip(segments) {
            match constraint {
                Constraint::Length(length) => {
                    let length = f64::from(length) * PRECISION;
                    solver.add_constraint(&segment.has_fixed_size(length, LENGTH_SIZE_EQ))?;
                }
                Constraint::Percentage(percent) => {
                    let share = area.size().scale(f64::from(percent) / 100.0);
                    solver.add_constraint(&segment.has_size(share, PERCENTAGE_SIZE_EQ))?;
                }
                Constraint::Ratio(numerator, denominator) => {
                    let share = area
                        .size()
                        .scale(f64::from(numerator) / f64::from(denominator.max(1)));
                    solver.add_constraint(&segment.has_size(share, RATIO_SIZE_EQ))?;
                }
                Constraint::Min(min) => {
                    let min = f64::from(min) * PRECISION;
                    solver.add_constraint(&segment.has_min_size(min, MIN_SIZE_GTE))?;
                    solver.add_constraint(&segment.has_size(area.size(), FILL_GROW))?;
                }
                Constraint::Max(max) => {
                    let max = f64::from(max) * PRECISION;
                    solver.add_constraint(&segment.has_max_size(max, MAX_SIZE_LTE))?;
                    solver.add_constraint(&segment.has_fixed_size(max, MAX_SIZE_EQ))?;
                }
                Constraint::Fill(_) => {
                    solver.add_constraint(&segment.has_size(area.size(), FILL_GROW))?;
                }
            }
        }

        Ok(())
    }

    /// Pairwise proportionality between fill-like segments. `Fill` always
    /// participates with its weight; `Min` joins with weight 1 outside
    /// Legacy, which is what lets two starving `Min`s share space evenly.
    fn configure_fill_proportions(
        &self,
        solver: &mut Solver,
        segments: &[Element],
    ) -> Result<(), LayoutError> {
        let fill_like: Vec<(Element, f64)> = self
            .constraints
            .iter()
            .zip(segments)
            .filter_map(|(&constraint, &segment)| match constraint {
                Constraint::Fill(weight) => Some((segment, f64::from(weight))),
                Constraint::Min(_) if self.flex != Flex::Legacy => Some((segment, 1.0)),
                _ => None,
            })
            .collect();

        for (index, &(left, left_weight)) in fill_like.iter().enumerate() {
            for &(right, right_weight) in &fill_like[index + 1..] {
                solver.add_constraint(
                    &solver::Constraint::equal(strengths::GROW)
                        .with_expression(left.size().scale(right_weight))
                        .versus(right.size().scale(left_weight)),
                )?;
            }
        }

        Ok(())
    }

    /// Weak equal-size ties between adjacent segments, so unconstrained
    /// segments default to an even split of slack.
    fn configure_balance(
        &self,
        solver: &mut Solver,
        segments: &[Element],
    ) -> Result<(), LayoutError> {
        for pair in segments.windows(2) {
            solver.add_constraint(&pair[0].has_size(pair[1].size(), strengths::ALL_SEGMENT_GROW))?;
        }
        Ok(())
    }

    /// Build a rectangle spanning `[start, end)` cells along the split axis,
    /// carrying the inner area's extent on the other axis.
    fn axis_rect(&self, inner: Rect, start: u16, end: u16) -> Rect {
        let extent = end.saturating_sub(start);
        match self.direction {
            Direction::Horizontal => Rect::new(start, inner.y, extent, inner.height),
            Direction::Vertical => Rect::new(inner.x, start, inner.width, extent),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let layout = Layout::default();
        assert_eq!(layout.direction, Direction::Vertical);
        assert_eq!(layout.flex, Flex::Start);
        assert_eq!(layout.spacing, Spacing::Space(0));
        assert_eq!(layout.constraint_count(), 0);
        assert_eq!(layout.margin, Sides::default());
    }

    #[test]
    fn strength_tiers_are_strictly_ordered() {
        use strengths::*;
        let tiers = [
            Strength::REQUIRED,
            SPACER_SIZE_EQ,
            MIN_SIZE_GTE,
            LENGTH_SIZE_EQ,
            PERCENTAGE_SIZE_EQ,
            RATIO_SIZE_EQ,
            MAX_SIZE_EQ,
            FILL_GROW,
            GROW,
            SPACE_GROW,
            ALL_SEGMENT_GROW,
        ];
        for pair in tiers.windows(2) {
            assert!(pair[0].0 > pair[1].0, "{:?} !> {:?}", pair[0], pair[1]);
        }
        assert_eq!(MIN_SIZE_GTE, MAX_SIZE_LTE);
    }

    #[test]
    fn no_constraints_yield_no_segments() {
        let (segments, spacers) =
            Layout::horizontal().split_with_spacers(Rect::new(0, 0, 10, 2));
        assert!(segments.is_empty());
        assert_eq!(spacers.len(), 1);
        assert_eq!(spacers[0], Rect::new(0, 0, 10, 2));
    }

    #[test]
    fn single_length_under_slack() {
        let areas = Layout::horizontal()
            .constraints([Constraint::Length(5)])
            .split(Rect::new(0, 0, 10, 1));
        assert_eq!(areas, vec![Rect::new(0, 0, 5, 1)]);
    }

    #[test]
    fn single_length_clamped_to_area() {
        let areas = Layout::horizontal()
            .constraints([Constraint::Length(15)])
            .split(Rect::new(0, 0, 10, 1));
        assert_eq!(areas, vec![Rect::new(0, 0, 10, 1)]);
    }

    #[test]
    fn margin_is_applied() {
        let areas = Layout::vertical()
            .constraints([Constraint::Min(0)])
            .margin(Sides::all(1))
            .split(Rect::new(0, 0, 10, 10));
        assert_eq!(areas, vec![Rect::new(1, 1, 8, 8)]);
    }

    #[test]
    fn zero_area_is_not_an_error() {
        let layout = Layout::vertical().constraints([
            Constraint::Length(3),
            Constraint::Percentage(50),
        ]);
        let areas = layout.try_split(Rect::new(0, 0, 0, 0)).unwrap();
        assert_eq!(areas.len(), 2);
        assert!(areas.iter().all(Rect::is_empty));
    }

    #[test]
    fn spacing_from_u16() {
        assert_eq!(Spacing::from(3), Spacing::Space(3));
    }
}
