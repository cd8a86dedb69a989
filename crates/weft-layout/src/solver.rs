#![forbid(unsafe_code)]

//! Incremental Cassowary constraint solver.
//!
//! An implementation of the Cassowary linear arithmetic constraint solving
//! algorithm (Badros & Borning), a variation of the simplex method optimized
//! for incremental solving with prioritized (strength-weighted) constraints.
//!
//! The solver is deterministic: the tableau is kept in ordered maps keyed by
//! a globally increasing symbol id, the entering symbol follows Bland's rule
//! (lowest id with a negative objective coefficient), and minimum-ratio ties
//! break toward the lowest id. Solving the same constraint set twice yields
//! bit-identical values, which layout consumers rely on frame to frame.

use std::collections::BTreeMap;
use std::fmt;

/// Tolerance for floating-point comparisons.
const EPSILON: f64 = 1e-8;

fn near_zero(value: f64) -> bool {
    value.abs() < EPSILON
}

/// An opaque handle to a solver variable.
///
/// Variables are allocated by [`Solver::new_variable`] as arena indices.
/// Equality is identity: two variables compare equal only if they are the
/// same allocation. A `Variable` is only meaningful to the solver that
/// created it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Variable(usize);

/// A variable scaled by a coefficient.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Term {
    pub variable: Variable,
    pub coefficient: f64,
}

impl Term {
    /// Create a new term.
    pub const fn new(variable: Variable, coefficient: f64) -> Self {
        Self {
            variable,
            coefficient,
        }
    }
}

/// A linear expression: a sum of terms plus a constant.
///
/// Terms referencing the same variable are not pre-combined; the solver
/// merges duplicates when the expression enters the tableau. All operations
/// return new values.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Expression {
    pub terms: Vec<Term>,
    pub constant: f64,
}

impl Expression {
    /// A constant expression with no terms.
    pub fn constant(value: f64) -> Self {
        Self {
            terms: Vec::new(),
            constant: value,
        }
    }

    /// An expression holding a single scaled variable.
    pub fn term(variable: Variable, coefficient: f64) -> Self {
        Self {
            terms: vec![Term::new(variable, coefficient)],
            constant: 0.0,
        }
    }

    /// Sum of this expression and another.
    pub fn add(mut self, other: Expression) -> Expression {
        self.terms.extend(other.terms);
        self.constant += other.constant;
        self
    }

    /// Difference of this expression and another.
    pub fn sub(self, other: Expression) -> Expression {
        self.add(other.neg())
    }

    /// The negation of this expression.
    pub fn neg(mut self) -> Expression {
        for term in &mut self.terms {
            term.coefficient = -term.coefficient;
        }
        self.constant = -self.constant;
        self
    }

    /// This expression scaled by a factor.
    pub fn scale(mut self, factor: f64) -> Expression {
        for term in &mut self.terms {
            term.coefficient *= factor;
        }
        self.constant *= factor;
        self
    }
}

impl From<Variable> for Expression {
    fn from(variable: Variable) -> Self {
        Expression::term(variable, 1.0)
    }
}

impl From<f64> for Expression {
    fn from(constant: f64) -> Self {
        Expression::constant(constant)
    }
}

/// Constraint priority.
///
/// A positive weight determining how strongly a constraint's violation is
/// penalized relative to others. [`Strength::REQUIRED`] constraints can never
/// be violated; everything weaker is advisory and traded off by weighted
/// minimization. Tiers are spaced so that no quantity of weaker constraints
/// can outvote a single stronger one in practical layouts.
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd)]
pub struct Strength(pub f64);

impl Strength {
    pub const REQUIRED: Strength = Strength(1_001_001_000.0);
    pub const STRONG: Strength = Strength(1_000_000.0);
    pub const MEDIUM: Strength = Strength(1_000.0);
    pub const WEAK: Strength = Strength(1.0);

    /// Create a strength, clipped to at most `REQUIRED`.
    pub fn new(value: f64) -> Self {
        Self(value.min(Self::REQUIRED.0))
    }

    /// This strength scaled by a factor, clipped to at most `REQUIRED`.
    pub fn scaled(self, factor: f64) -> Self {
        Self::new(self.0 * factor)
    }

    /// Check whether this strength is required.
    pub fn is_required(&self) -> bool {
        self.0 >= Self::REQUIRED.0
    }
}

/// The relation a constraint imposes between its expression and zero.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operator {
    /// `expression == 0`
    Eq,
    /// `expression <= 0`
    Le,
    /// `expression >= 0`
    Ge,
}

/// A linear constraint: `expression OP 0` at a given strength.
#[derive(Debug, Clone)]
pub struct Constraint {
    pub expression: Expression,
    pub operator: Operator,
    pub strength: Strength,
}

impl Constraint {
    /// Create a constraint in canonical `expression OP 0` form.
    pub fn new(expression: Expression, operator: Operator, strength: Strength) -> Self {
        Self {
            expression,
            operator,
            strength,
        }
    }

    /// Start building an equality constraint.
    pub fn equal(strength: Strength) -> ConstraintBuilder {
        ConstraintBuilder::new(Operator::Eq, strength)
    }

    /// Start building a `<=` constraint.
    pub fn less_or_equal(strength: Strength) -> ConstraintBuilder {
        ConstraintBuilder::new(Operator::Le, strength)
    }

    /// Start building a `>=` constraint.
    pub fn greater_or_equal(strength: Strength) -> ConstraintBuilder {
        ConstraintBuilder::new(Operator::Ge, strength)
    }
}

/// Fluent builder for [`Constraint`].
///
/// Accumulates a left-hand expression via `with_*`, then closes with
/// [`build`](Self::build) (`lhs OP 0`) or [`versus`](Self::versus)
/// (`lhs - rhs OP 0`).
#[derive(Debug, Clone)]
pub struct ConstraintBuilder {
    expression: Expression,
    operator: Operator,
    strength: Strength,
}

impl ConstraintBuilder {
    fn new(operator: Operator, strength: Strength) -> Self {
        Self {
            expression: Expression::default(),
            operator,
            strength,
        }
    }

    /// Add a variable (coefficient 1) to the left-hand side.
    pub fn with_variable(mut self, variable: Variable) -> Self {
        self.expression.terms.push(Term::new(variable, 1.0));
        self
    }

    /// Add a scaled variable to the left-hand side.
    pub fn with_term(mut self, variable: Variable, coefficient: f64) -> Self {
        self.expression.terms.push(Term::new(variable, coefficient));
        self
    }

    /// Add an expression to the left-hand side.
    pub fn with_expression(mut self, expression: Expression) -> Self {
        self.expression = self.expression.add(expression);
        self
    }

    /// Add a constant to the left-hand side.
    pub fn with_constant(mut self, constant: f64) -> Self {
        self.expression.constant += constant;
        self
    }

    /// Close the constraint as `lhs OP 0`.
    pub fn build(self) -> Constraint {
        Constraint::new(self.expression, self.operator, self.strength)
    }

    /// Close the constraint as `lhs OP rhs`, normalized to `lhs - rhs OP 0`.
    pub fn versus(self, rhs: impl Into<Expression>) -> Constraint {
        Constraint::new(
            self.expression.sub(rhs.into()),
            self.operator,
            self.strength,
        )
    }
}

/// Identifier returned by [`Solver::add_constraint`], used for removal.
pub type ConstraintId = usize;

/// Errors reported by the solver.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SolverError {
    /// A required constraint conflicts with the existing required set.
    Unsatisfiable,
    /// The constraint id was never added (or already removed).
    UnknownConstraint,
    /// The variable is already registered as an edit variable.
    DuplicateEditVariable,
    /// The variable is not registered as an edit variable.
    UnknownEditVariable,
    /// Constraint strength must be positive; edit strengths below required.
    InvalidStrength,
    /// An internal invariant was violated.
    Internal(&'static str),
}

impl fmt::Display for SolverError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SolverError::Unsatisfiable => {
                write!(f, "required constraint cannot be satisfied")
            }
            SolverError::UnknownConstraint => write!(f, "constraint is not in the solver"),
            SolverError::DuplicateEditVariable => {
                write!(f, "variable is already an edit variable")
            }
            SolverError::UnknownEditVariable => write!(f, "variable is not an edit variable"),
            SolverError::InvalidStrength => write!(f, "constraint strength is invalid"),
            SolverError::Internal(msg) => write!(f, "internal solver error: {msg}"),
        }
    }
}

impl std::error::Error for SolverError {}

/// Internal tableau symbol kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
enum SymbolKind {
    /// An external variable (the unknowns being solved for).
    External,
    /// A slack variable for inequality constraints.
    Slack,
    /// An error variable for non-required constraints.
    Error,
    /// A dummy variable marking required equalities.
    Dummy,
}

/// A tableau symbol. Ordered by allocation id, so `BTreeMap` iteration
/// visits symbols in creation order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
struct Symbol {
    id: usize,
    kind: SymbolKind,
}

impl Symbol {
    fn is_pivotable(&self) -> bool {
        matches!(self.kind, SymbolKind::Slack | SymbolKind::Error)
    }
}

/// A row in the simplex tableau: `constant + Σ coefficient·symbol`.
#[derive(Debug, Clone, Default)]
struct Row {
    constant: f64,
    cells: BTreeMap<Symbol, f64>,
}

impl Row {
    fn new(constant: f64) -> Self {
        Self {
            constant,
            cells: BTreeMap::new(),
        }
    }

    /// Accumulate a coefficient for a symbol, dropping near-zero cells.
    fn insert(&mut self, symbol: Symbol, coefficient: f64) {
        let entry = self.cells.entry(symbol).or_insert(0.0);
        *entry += coefficient;
        if near_zero(*entry) {
            self.cells.remove(&symbol);
        }
    }

    /// Accumulate another row scaled by a coefficient.
    fn insert_row(&mut self, other: &Row, coefficient: f64) {
        self.constant += other.constant * coefficient;
        for (&symbol, &c) in &other.cells {
            self.insert(symbol, c * coefficient);
        }
    }

    fn remove(&mut self, symbol: Symbol) {
        self.cells.remove(&symbol);
    }

    fn coefficient_for(&self, symbol: Symbol) -> f64 {
        self.cells.get(&symbol).copied().unwrap_or(0.0)
    }

    fn reverse_sign(&mut self) {
        self.constant = -self.constant;
        for coefficient in self.cells.values_mut() {
            *coefficient = -*coefficient;
        }
    }

    /// Solve the row for `symbol`, leaving it expressed in the remaining
    /// symbols.
    fn solve_for(&mut self, symbol: Symbol) {
        let coefficient = self.cells.remove(&symbol).unwrap_or(1.0);
        let multiplier = -1.0 / coefficient;
        self.constant *= multiplier;
        for c in self.cells.values_mut() {
            *c *= multiplier;
        }
    }

    /// Solve the row for `rhs` after making `lhs` basic in it.
    fn solve_for_pair(&mut self, lhs: Symbol, rhs: Symbol) {
        self.insert(lhs, -1.0);
        self.solve_for(rhs);
    }

    /// Replace `symbol` with the given row, if present.
    fn substitute(&mut self, symbol: Symbol, row: &Row) {
        if let Some(coefficient) = self.cells.remove(&symbol) {
            self.insert_row(row, coefficient);
        }
    }
}

#[derive(Debug, Clone, Copy)]
struct Tag {
    marker: Symbol,
    other: Option<Symbol>,
}

#[derive(Debug, Clone)]
struct EditInfo {
    tag: Tag,
    constraint: ConstraintId,
    constant: f64,
}

/// The incremental constraint solver.
///
/// Owns the tableau, the mapping from external [`Variable`]s to internal
/// symbols, and the set of active constraints. One instance per layout call;
/// not shareable across concurrent calls.
#[derive(Debug, Default)]
pub struct Solver {
    objective: Row,
    artificial: Option<Row>,
    rows: BTreeMap<Symbol, Row>,
    constraints: BTreeMap<ConstraintId, (Tag, Strength)>,
    edits: BTreeMap<Variable, EditInfo>,
    infeasible_rows: Vec<Symbol>,
    var_symbols: BTreeMap<Variable, Symbol>,
    /// Last values handed out through `fetch_changes`.
    reported: BTreeMap<Variable, f64>,
    next_symbol: usize,
    next_variable: usize,
    next_constraint: usize,
}

impl Solver {
    /// Create an empty solver.
    pub fn new() -> Self {
        Self::default()
    }

    /// Allocate a fresh variable with value 0.
    pub fn new_variable(&mut self) -> Variable {
        let variable = Variable(self.next_variable);
        self.next_variable += 1;
        let symbol = self.new_symbol(SymbolKind::External);
        self.var_symbols.insert(variable, symbol);
        self.reported.insert(variable, 0.0);
        variable
    }

    /// Current solved value of a variable (0 if unconstrained).
    pub fn value_of(&self, variable: Variable) -> f64 {
        self.var_symbols
            .get(&variable)
            .and_then(|symbol| self.rows.get(symbol))
            .map(|row| row.constant)
            .unwrap_or(0.0)
    }

    /// Add a constraint, re-solving incrementally.
    ///
    /// Fails with [`SolverError::Unsatisfiable`] if the constraint is
    /// required and conflicts with the existing required set; previously
    /// added constraints remain satisfied in that case. Non-required
    /// constraints never fail: their violation is minimized, weighted by
    /// strength.
    pub fn add_constraint(&mut self, constraint: &Constraint) -> Result<ConstraintId, SolverError> {
        if !(constraint.strength.0 > 0.0) {
            return Err(SolverError::InvalidStrength);
        }

        let id = self.next_constraint;
        let (mut row, tag) = self.create_row(constraint);

        let mut subject = Self::choose_subject(&row, &tag);

        // A row of only dummy symbols encodes a required equality among
        // already-determined quantities: consistent iff the constant is zero.
        if subject.is_none()
            && row
                .cells
                .keys()
                .all(|symbol| symbol.kind == SymbolKind::Dummy)
        {
            if !near_zero(row.constant) {
                return Err(SolverError::Unsatisfiable);
            }
            subject = Some(tag.marker);
        }

        match subject {
            Some(subject) => {
                row.solve_for(subject);
                self.substitute(subject, &row);
                self.rows.insert(subject, row);
            }
            None => {
                // Phase-1 insertion can fail only for required constraints.
                // Snapshot the tableau so a rejected add is atomic.
                let saved_objective = self.objective.clone();
                let saved_rows = self.rows.clone();
                let saved_infeasible = self.infeasible_rows.clone();
                if !self.add_with_artificial_variable(&row)? {
                    self.objective = saved_objective;
                    self.rows = saved_rows;
                    self.infeasible_rows = saved_infeasible;
                    return Err(SolverError::Unsatisfiable);
                }
            }
        }

        self.next_constraint += 1;
        self.constraints.insert(id, (tag, constraint.strength));
        self.optimize(false)?;
        Ok(id)
    }

    /// Remove a previously added constraint.
    pub fn remove_constraint(&mut self, id: ConstraintId) -> Result<(), SolverError> {
        let (tag, strength) = self
            .constraints
            .remove(&id)
            .ok_or(SolverError::UnknownConstraint)?;

        self.remove_constraint_effects(&tag, strength);

        if self.rows.remove(&tag.marker).is_none() {
            // Marker is not basic: pivot it into the basis so its row can go.
            let leaving = self
                .marker_leaving_symbol(tag.marker)
                .ok_or(SolverError::Internal("marker row not found"))?;
            let mut row = self
                .rows
                .remove(&leaving)
                .ok_or(SolverError::Internal("leaving row vanished"))?;
            row.solve_for_pair(leaving, tag.marker);
            self.substitute(tag.marker, &row);
        }

        self.optimize(false)
    }

    /// Register a variable for value suggestions.
    ///
    /// The strength must be below required; suggestions are desires, not
    /// facts.
    pub fn add_edit_variable(
        &mut self,
        variable: Variable,
        strength: Strength,
    ) -> Result<(), SolverError> {
        if self.edits.contains_key(&variable) {
            return Err(SolverError::DuplicateEditVariable);
        }
        if strength.is_required() {
            return Err(SolverError::InvalidStrength);
        }
        let constraint = Constraint::equal(strength).with_variable(variable).build();
        let id = self.add_constraint(&constraint)?;
        let (tag, _) = self.constraints[&id];
        self.edits.insert(
            variable,
            EditInfo {
                tag,
                constraint: id,
                constant: 0.0,
            },
        );
        Ok(())
    }

    /// Drop an edit variable and its underlying constraint.
    pub fn remove_edit_variable(&mut self, variable: Variable) -> Result<(), SolverError> {
        let info = self
            .edits
            .remove(&variable)
            .ok_or(SolverError::UnknownEditVariable)?;
        self.remove_constraint(info.constraint)
    }

    /// Suggest a value for an edit variable.
    ///
    /// Applies the delta to the affected rows and restores feasibility by
    /// dual optimization, so the edit costs a handful of pivots instead of a
    /// full re-solve.
    pub fn suggest_value(&mut self, variable: Variable, value: f64) -> Result<(), SolverError> {
        let (tag, delta) = {
            let info = self
                .edits
                .get_mut(&variable)
                .ok_or(SolverError::UnknownEditVariable)?;
            let delta = value - info.constant;
            info.constant = value;
            (info.tag, delta)
        };

        // Fast paths: one of the error symbols is basic and absorbs the
        // delta directly.
        let absorbed = if let Some(row) = self.rows.get_mut(&tag.marker) {
            row.constant -= delta;
            if row.constant < 0.0 {
                self.infeasible_rows.push(tag.marker);
            }
            true
        } else if let Some(other) = tag.other {
            if let Some(row) = self.rows.get_mut(&other) {
                row.constant += delta;
                if row.constant < 0.0 {
                    self.infeasible_rows.push(other);
                }
                true
            } else {
                false
            }
        } else {
            false
        };

        if !absorbed {
            // Otherwise propagate the delta through every row holding the
            // marker.
            let mut newly_infeasible = Vec::new();
            for (&symbol, row) in &mut self.rows {
                let coefficient = row.coefficient_for(tag.marker);
                if coefficient != 0.0 {
                    row.constant += delta * coefficient;
                    if row.constant < 0.0 && symbol.kind != SymbolKind::External {
                        newly_infeasible.push(symbol);
                    }
                }
            }
            self.infeasible_rows.extend(newly_infeasible);
        }

        self.dual_optimize()
    }

    /// Variables whose solved value changed since the last fetch (or since
    /// solver creation), in ascending variable order.
    pub fn fetch_changes(&mut self) -> Vec<(Variable, f64)> {
        let mut changes = Vec::new();
        for (&variable, symbol) in &self.var_symbols {
            let current = self
                .rows
                .get(symbol)
                .map(|row| row.constant)
                .unwrap_or(0.0);
            let reported = self.reported.entry(variable).or_insert(0.0);
            if !near_zero(current - *reported) {
                *reported = current;
                changes.push((variable, current));
            }
        }
        changes
    }

    // ── Internals ───────────────────────────────────────────────────────

    fn new_symbol(&mut self, kind: SymbolKind) -> Symbol {
        let id = self.next_symbol;
        self.next_symbol += 1;
        Symbol { id, kind }
    }

    fn symbol_for(&mut self, variable: Variable) -> Symbol {
        if let Some(&symbol) = self.var_symbols.get(&variable) {
            return symbol;
        }
        let symbol = self.new_symbol(SymbolKind::External);
        self.var_symbols.insert(variable, symbol);
        self.reported.insert(variable, 0.0);
        symbol
    }

    /// Desugar a constraint into a tableau row plus its marker symbols.
    fn create_row(&mut self, constraint: &Constraint) -> (Row, Tag) {
        let mut row = Row::new(constraint.expression.constant);

        // Merge terms, substituting symbols that are already basic.
        for term in &constraint.expression.terms {
            if near_zero(term.coefficient) {
                continue;
            }
            let symbol = self.symbol_for(term.variable);
            if let Some(basic) = self.rows.get(&symbol) {
                let basic = basic.clone();
                row.insert_row(&basic, term.coefficient);
            } else {
                row.insert(symbol, term.coefficient);
            }
        }

        let strength = constraint.strength;
        let tag = match constraint.operator {
            Operator::Le | Operator::Ge => {
                let coefficient = if constraint.operator == Operator::Le {
                    1.0
                } else {
                    -1.0
                };
                let slack = self.new_symbol(SymbolKind::Slack);
                row.insert(slack, coefficient);
                if strength.is_required() {
                    Tag {
                        marker: slack,
                        other: None,
                    }
                } else {
                    let error = self.new_symbol(SymbolKind::Error);
                    row.insert(error, -coefficient);
                    self.objective.insert(error, strength.0);
                    Tag {
                        marker: slack,
                        other: Some(error),
                    }
                }
            }
            Operator::Eq => {
                if strength.is_required() {
                    let dummy = self.new_symbol(SymbolKind::Dummy);
                    row.insert(dummy, 1.0);
                    Tag {
                        marker: dummy,
                        other: None,
                    }
                } else {
                    let errplus = self.new_symbol(SymbolKind::Error);
                    let errminus = self.new_symbol(SymbolKind::Error);
                    row.insert(errplus, -1.0);
                    row.insert(errminus, 1.0);
                    self.objective.insert(errplus, strength.0);
                    self.objective.insert(errminus, strength.0);
                    Tag {
                        marker: errplus,
                        other: Some(errminus),
                    }
                }
            }
        };

        if row.constant < 0.0 {
            row.reverse_sign();
        }

        (row, tag)
    }

    /// Pick the symbol the new row will be solved for.
    fn choose_subject(row: &Row, tag: &Tag) -> Option<Symbol> {
        // Lowest external symbol first (BTreeMap order).
        for symbol in row.cells.keys() {
            if symbol.kind == SymbolKind::External {
                return Some(*symbol);
            }
        }
        if tag.marker.is_pivotable() && row.coefficient_for(tag.marker) < 0.0 {
            return Some(tag.marker);
        }
        if let Some(other) = tag.other {
            if other.is_pivotable() && row.coefficient_for(other) < 0.0 {
                return Some(other);
            }
        }
        None
    }

    /// Phase-1 insertion via an artificial variable. Returns whether the row
    /// could be satisfied.
    fn add_with_artificial_variable(&mut self, row: &Row) -> Result<bool, SolverError> {
        let artificial = self.new_symbol(SymbolKind::Slack);
        self.rows.insert(artificial, row.clone());
        self.artificial = Some(row.clone());

        self.optimize(true)?;
        let success = self
            .artificial
            .as_ref()
            .map(|objective| near_zero(objective.constant))
            .unwrap_or(false);
        self.artificial = None;

        if let Some(mut art_row) = self.rows.remove(&artificial) {
            if art_row.cells.is_empty() {
                return Ok(success);
            }
            let entering = art_row
                .cells
                .keys()
                .copied()
                .find(|symbol| symbol.is_pivotable());
            let Some(entering) = entering else {
                return Ok(false);
            };
            art_row.solve_for_pair(artificial, entering);
            self.substitute(entering, &art_row);
            self.rows.insert(entering, art_row);
        }

        for row in self.rows.values_mut() {
            row.remove(artificial);
        }
        self.objective.remove(artificial);
        Ok(success)
    }

    /// Replace a symbol throughout the tableau and both objectives.
    fn substitute(&mut self, symbol: Symbol, row: &Row) {
        let mut newly_infeasible = Vec::new();
        for (&basic, r) in &mut self.rows {
            r.substitute(symbol, row);
            if basic.kind != SymbolKind::External && r.constant < 0.0 {
                newly_infeasible.push(basic);
            }
        }
        self.infeasible_rows.extend(newly_infeasible);
        self.objective.substitute(symbol, row);
        if let Some(artificial) = &mut self.artificial {
            artificial.substitute(symbol, row);
        }
    }

    /// Primal simplex over the selected objective until optimal.
    fn optimize(&mut self, use_artificial: bool) -> Result<(), SolverError> {
        loop {
            let entering = {
                let objective = if use_artificial {
                    self.artificial
                        .as_ref()
                        .ok_or(SolverError::Internal("artificial objective missing"))?
                } else {
                    &self.objective
                };
                // Bland's rule: lowest symbol id with a negative coefficient.
                objective
                    .cells
                    .iter()
                    .find(|(symbol, coefficient)| {
                        symbol.kind != SymbolKind::Dummy && **coefficient < -EPSILON
                    })
                    .map(|(&symbol, _)| symbol)
            };
            let Some(entering) = entering else {
                return Ok(());
            };

            let Some(leaving) = self.leaving_symbol(entering) else {
                return Err(SolverError::Internal("objective is unbounded"));
            };
            let mut row = self
                .rows
                .remove(&leaving)
                .ok_or(SolverError::Internal("leaving row vanished"))?;
            row.solve_for_pair(leaving, entering);
            self.substitute(entering, &row);
            self.rows.insert(entering, row);
        }
    }

    /// Minimum-ratio test; ties break toward the lowest symbol id.
    fn leaving_symbol(&self, entering: Symbol) -> Option<Symbol> {
        let mut min_ratio = f64::INFINITY;
        let mut leaving = None;
        for (&symbol, row) in &self.rows {
            if symbol.kind == SymbolKind::External {
                continue;
            }
            let coefficient = row.coefficient_for(entering);
            if coefficient < -EPSILON {
                let ratio = -row.constant / coefficient;
                if ratio < min_ratio {
                    min_ratio = ratio;
                    leaving = Some(symbol);
                }
            }
        }
        leaving
    }

    /// Dual simplex: restore feasibility of rows whose constants went
    /// negative after an edit, pivoting along the cheapest objective ratio.
    fn dual_optimize(&mut self) -> Result<(), SolverError> {
        while let Some(leaving) = self.infeasible_rows.pop() {
            let entering = {
                let Some(row) = self.rows.get(&leaving) else {
                    continue;
                };
                if row.constant >= 0.0 {
                    continue;
                }
                let mut min_ratio = f64::INFINITY;
                let mut entering = None;
                for (&symbol, &coefficient) in &row.cells {
                    if coefficient > EPSILON && symbol.kind != SymbolKind::Dummy {
                        let ratio = self.objective.coefficient_for(symbol) / coefficient;
                        if ratio < min_ratio {
                            min_ratio = ratio;
                            entering = Some(symbol);
                        }
                    }
                }
                entering.ok_or(SolverError::Internal("dual optimize failed"))?
            };

            let mut row = self
                .rows
                .remove(&leaving)
                .ok_or(SolverError::Internal("leaving row vanished"))?;
            row.solve_for_pair(leaving, entering);
            self.substitute(entering, &row);
            self.rows.insert(entering, row);
        }
        Ok(())
    }

    /// Pick the row to pivot a non-basic marker into before removal.
    fn marker_leaving_symbol(&self, marker: Symbol) -> Option<Symbol> {
        let mut r1 = f64::INFINITY;
        let mut r2 = f64::INFINITY;
        let mut first = None;
        let mut second = None;
        let mut third = None;

        for (&symbol, row) in &self.rows {
            let coefficient = row.coefficient_for(marker);
            if near_zero(coefficient) {
                continue;
            }
            if symbol.kind == SymbolKind::External {
                if third.is_none() {
                    third = Some(symbol);
                }
            } else if coefficient < 0.0 {
                let ratio = -row.constant / coefficient;
                if ratio < r1 {
                    r1 = ratio;
                    first = Some(symbol);
                }
            } else {
                let ratio = row.constant / coefficient;
                if ratio < r2 {
                    r2 = ratio;
                    second = Some(symbol);
                }
            }
        }

        first.or(second).or(third)
    }

    /// Undo a constraint's error terms in the objective.
    fn remove_constraint_effects(&mut self, tag: &Tag, strength: Strength) {
        if tag.marker.kind == SymbolKind::Error {
            self.remove_marker_effects(tag.marker, strength);
        }
        if let Some(other) = tag.other {
            if other.kind == SymbolKind::Error {
                self.remove_marker_effects(other, strength);
            }
        }
    }

    fn remove_marker_effects(&mut self, marker: Symbol, strength: Strength) {
        if let Some(row) = self.rows.get(&marker) {
            let row = row.clone();
            self.objective.insert_row(&row, -strength.0);
        } else {
            self.objective.insert(marker, -strength.0);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn assert_close(actual: f64, expected: f64) {
        assert!(
            (actual - expected).abs() < 1e-6,
            "expected {expected}, got {actual}"
        );
    }

    #[test]
    fn fresh_variables_are_distinct() {
        let mut solver = Solver::new();
        let a = solver.new_variable();
        let b = solver.new_variable();
        assert_ne!(a, b);
    }

    #[test]
    fn required_equality() {
        let mut solver = Solver::new();
        let x = solver.new_variable();

        // x == 100
        let c = Constraint::equal(Strength::REQUIRED)
            .with_variable(x)
            .versus(100.0);
        solver.add_constraint(&c).unwrap();
        assert_close(solver.value_of(x), 100.0);
    }

    #[test]
    fn chained_equalities() {
        let mut solver = Solver::new();
        let x = solver.new_variable();
        let y = solver.new_variable();

        let c1 = Constraint::equal(Strength::REQUIRED)
            .with_variable(x)
            .versus(100.0);
        // y == x + 50
        let c2 = Constraint::equal(Strength::REQUIRED)
            .with_variable(y)
            .versus(Expression::term(x, 1.0).add(Expression::constant(50.0)));
        solver.add_constraint(&c1).unwrap();
        solver.add_constraint(&c2).unwrap();

        assert_close(solver.value_of(x), 100.0);
        assert_close(solver.value_of(y), 150.0);
    }

    #[test]
    fn stronger_constraint_wins() {
        let mut solver = Solver::new();
        let x = solver.new_variable();

        let weak = Constraint::equal(Strength::WEAK)
            .with_variable(x)
            .versus(100.0);
        let strong = Constraint::equal(Strength::STRONG)
            .with_variable(x)
            .versus(50.0);
        solver.add_constraint(&weak).unwrap();
        solver.add_constraint(&strong).unwrap();

        assert_close(solver.value_of(x), 50.0);
    }

    #[test]
    fn inequality_bounds_preference() {
        let mut solver = Solver::new();
        let x = solver.new_variable();

        // x >= 50 (required), prefer x == 20 (medium) -> bound wins.
        let ge = Constraint::greater_or_equal(Strength::REQUIRED)
            .with_variable(x)
            .versus(50.0);
        let prefer = Constraint::equal(Strength::MEDIUM)
            .with_variable(x)
            .versus(20.0);
        solver.add_constraint(&ge).unwrap();
        solver.add_constraint(&prefer).unwrap();

        assert_close(solver.value_of(x), 50.0);
    }

    #[test]
    fn conflicting_required_constraints_fail_atomically() {
        let mut solver = Solver::new();
        let x = solver.new_variable();

        let first = Constraint::equal(Strength::REQUIRED)
            .with_variable(x)
            .versus(10.0);
        let second = Constraint::equal(Strength::REQUIRED)
            .with_variable(x)
            .versus(20.0);
        solver.add_constraint(&first).unwrap();
        let err = solver.add_constraint(&second).unwrap_err();
        assert_eq!(err, SolverError::Unsatisfiable);

        // The original required constraint still holds.
        assert_close(solver.value_of(x), 10.0);
    }

    #[test]
    fn conflicting_required_inequalities_fail() {
        let mut solver = Solver::new();
        let x = solver.new_variable();

        let ge = Constraint::greater_or_equal(Strength::REQUIRED)
            .with_variable(x)
            .versus(100.0);
        let le = Constraint::less_or_equal(Strength::REQUIRED)
            .with_variable(x)
            .versus(50.0);
        solver.add_constraint(&ge).unwrap();
        assert_eq!(
            solver.add_constraint(&le).unwrap_err(),
            SolverError::Unsatisfiable
        );
        assert!(solver.value_of(x) >= 100.0 - 1e-6);
    }

    #[test]
    fn soft_conflict_resolved_by_weights() {
        let mut solver = Solver::new();
        let x = solver.new_variable();

        // Two medium desires; a strong one overrides both.
        let a = Constraint::equal(Strength::MEDIUM)
            .with_variable(x)
            .versus(10.0);
        let b = Constraint::equal(Strength::MEDIUM)
            .with_variable(x)
            .versus(30.0);
        let c = Constraint::equal(Strength::STRONG)
            .with_variable(x)
            .versus(42.0);
        solver.add_constraint(&a).unwrap();
        solver.add_constraint(&b).unwrap();
        solver.add_constraint(&c).unwrap();
        assert_close(solver.value_of(x), 42.0);
    }

    #[test]
    fn remove_constraint_restores_weaker_desire() {
        let mut solver = Solver::new();
        let x = solver.new_variable();

        let weak = Constraint::equal(Strength::WEAK)
            .with_variable(x)
            .versus(5.0);
        let strong = Constraint::equal(Strength::STRONG)
            .with_variable(x)
            .versus(9.0);
        solver.add_constraint(&weak).unwrap();
        let strong_id = solver.add_constraint(&strong).unwrap();
        assert_close(solver.value_of(x), 9.0);

        solver.remove_constraint(strong_id).unwrap();
        assert_close(solver.value_of(x), 5.0);
    }

    #[test]
    fn remove_unknown_constraint_errors() {
        let mut solver = Solver::new();
        assert_eq!(
            solver.remove_constraint(42).unwrap_err(),
            SolverError::UnknownConstraint
        );
    }

    #[test]
    fn non_positive_strength_rejected() {
        let mut solver = Solver::new();
        let x = solver.new_variable();
        let c = Constraint::equal(Strength(0.0)).with_variable(x).versus(1.0);
        assert_eq!(
            solver.add_constraint(&c).unwrap_err(),
            SolverError::InvalidStrength
        );
    }

    #[test]
    fn edit_variable_suggestions() {
        let mut solver = Solver::new();
        let x = solver.new_variable();
        let y = solver.new_variable();

        // y == x + 10
        let offset = Constraint::equal(Strength::REQUIRED)
            .with_variable(y)
            .versus(Expression::term(x, 1.0).add(Expression::constant(10.0)));
        solver.add_constraint(&offset).unwrap();

        solver.add_edit_variable(x, Strength::STRONG).unwrap();
        solver.suggest_value(x, 25.0).unwrap();
        assert_close(solver.value_of(x), 25.0);
        assert_close(solver.value_of(y), 35.0);

        solver.suggest_value(x, 40.0).unwrap();
        assert_close(solver.value_of(x), 40.0);
        assert_close(solver.value_of(y), 50.0);
    }

    #[test]
    fn edit_variable_misuse_errors() {
        let mut solver = Solver::new();
        let x = solver.new_variable();

        assert_eq!(
            solver.suggest_value(x, 1.0).unwrap_err(),
            SolverError::UnknownEditVariable
        );
        assert_eq!(
            solver.add_edit_variable(x, Strength::REQUIRED).unwrap_err(),
            SolverError::InvalidStrength
        );
        solver.add_edit_variable(x, Strength::STRONG).unwrap();
        assert_eq!(
            solver.add_edit_variable(x, Strength::STRONG).unwrap_err(),
            SolverError::DuplicateEditVariable
        );
        solver.remove_edit_variable(x).unwrap();
        solver.add_edit_variable(x, Strength::MEDIUM).unwrap();
    }

    #[test]
    fn fetch_changes_reports_only_moves() {
        let mut solver = Solver::new();
        let x = solver.new_variable();
        let y = solver.new_variable();

        let c = Constraint::equal(Strength::REQUIRED)
            .with_variable(x)
            .versus(7.0);
        solver.add_constraint(&c).unwrap();

        let changes = solver.fetch_changes();
        assert_eq!(changes.len(), 1);
        assert_eq!(changes[0].0, x);
        assert_close(changes[0].1, 7.0);

        // Nothing moved since the last fetch.
        assert!(solver.fetch_changes().is_empty());

        let c2 = Constraint::equal(Strength::REQUIRED)
            .with_variable(y)
            .versus(3.0);
        solver.add_constraint(&c2).unwrap();
        let changes = solver.fetch_changes();
        assert_eq!(changes.len(), 1);
        assert_eq!(changes[0].0, y);
    }

    #[test]
    fn repeated_solves_are_identical() {
        // Same constraint program twice must give bit-identical values.
        let build = || {
            let mut solver = Solver::new();
            let a = solver.new_variable();
            let b = solver.new_variable();
            let sum = Constraint::equal(Strength::REQUIRED)
                .with_variable(a)
                .with_variable(b)
                .versus(100.0);
            let want_a = Constraint::equal(Strength::MEDIUM)
                .with_variable(a)
                .versus(70.0);
            let want_b = Constraint::equal(Strength::MEDIUM)
                .with_variable(b)
                .versus(70.0);
            let balance = Constraint::equal(Strength::WEAK)
                .with_variable(a)
                .versus(Expression::term(b, 1.0));
            solver.add_constraint(&sum).unwrap();
            solver.add_constraint(&want_a).unwrap();
            solver.add_constraint(&want_b).unwrap();
            solver.add_constraint(&balance).unwrap();
            (solver.value_of(a), solver.value_of(b))
        };
        assert_eq!(build(), build());
    }

    #[test]
    fn expression_algebra() {
        let mut solver = Solver::new();
        let x = solver.new_variable();
        let e = Expression::term(x, 2.0)
            .add(Expression::constant(3.0))
            .scale(2.0);
        assert_eq!(e.constant, 6.0);
        assert_eq!(e.terms[0].coefficient, 4.0);

        let n = e.clone().neg();
        assert_eq!(n.constant, -6.0);
        assert_eq!(n.terms[0].coefficient, -4.0);

        let d = e.sub(Expression::constant(6.0));
        assert_eq!(d.constant, 0.0);
    }

    #[test]
    fn duplicate_terms_are_combined_in_tableau() {
        let mut solver = Solver::new();
        let x = solver.new_variable();

        // x + x == 10, terms deliberately not pre-combined.
        let c = Constraint::equal(Strength::REQUIRED)
            .with_term(x, 1.0)
            .with_term(x, 1.0)
            .versus(10.0);
        solver.add_constraint(&c).unwrap();
        assert_close(solver.value_of(x), 5.0);
    }

    #[test]
    fn strength_clipping() {
        assert!(Strength::new(f64::INFINITY).is_required());
        assert!(!Strength::STRONG.is_required());
        assert_eq!(Strength::MEDIUM.scaled(10.0).0, 10_000.0);
    }
}
