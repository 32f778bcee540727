//! Filter predicate tree.
//!
//! Filters are plain tagged values built with the constructors below and
//! translated to SQL at compile time. Member paths are either a field name
//! (`"title"`) or one navigation deep (`"Publisher.name"`).

use relq_driver::ScalarValue;

/// Comparison operators.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CompareOp {
    /// Equal.
    Eq,
    /// Not equal.
    Ne,
    /// Less than.
    Lt,
    /// Less than or equal.
    Le,
    /// Greater than.
    Gt,
    /// Greater than or equal.
    Ge,
    /// Substring match, rendered as `LIKE '%..%'`.
    Contains,
    /// Prefix match, rendered as `LIKE '..%'`.
    StartsWith,
    /// Suffix match, rendered as `LIKE '%..'`.
    EndsWith,
}

/// One side of a comparison.
#[derive(Debug, Clone, PartialEq)]
pub enum Operand {
    /// Reference to an entity member.
    Member(String),
    /// Literal value, bound as a named parameter.
    Constant(ScalarValue),
}

impl Operand {
    /// Creates a member reference.
    #[must_use]
    pub fn member(path: impl Into<String>) -> Self {
        Self::Member(path.into())
    }

    /// Creates a constant.
    #[must_use]
    pub fn constant(value: impl Into<ScalarValue>) -> Self {
        Self::Constant(value.into())
    }
}

/// A filter predicate over entity members.
#[derive(Debug, Clone, PartialEq)]
pub enum Filter {
    /// A comparison between two operands.
    Compare {
        /// Left operand.
        left: Operand,
        /// Operator.
        op: CompareOp,
        /// Right operand.
        right: Operand,
    },
    /// Both branches must hold.
    And(Box<Filter>, Box<Filter>),
    /// Either branch must hold.
    Or(Box<Filter>, Box<Filter>),
    /// The inner predicate must not hold.
    Not(Box<Filter>),
}

impl Filter {
    /// Creates a comparison between arbitrary operands.
    #[must_use]
    pub fn compare(left: Operand, op: CompareOp, right: Operand) -> Self {
        Self::Compare { left, op, right }
    }

    fn against(member: impl Into<String>, op: CompareOp, value: impl Into<ScalarValue>) -> Self {
        Self::Compare {
            left: Operand::Member(member.into()),
            op,
            right: Operand::Constant(value.into()),
        }
    }

    /// `member = value`.
    #[must_use]
    pub fn eq(member: impl Into<String>, value: impl Into<ScalarValue>) -> Self {
        Self::against(member, CompareOp::Eq, value)
    }

    /// `member <> value`.
    #[must_use]
    pub fn ne(member: impl Into<String>, value: impl Into<ScalarValue>) -> Self {
        Self::against(member, CompareOp::Ne, value)
    }

    /// `member < value`.
    #[must_use]
    pub fn lt(member: impl Into<String>, value: impl Into<ScalarValue>) -> Self {
        Self::against(member, CompareOp::Lt, value)
    }

    /// `member <= value`.
    #[must_use]
    pub fn le(member: impl Into<String>, value: impl Into<ScalarValue>) -> Self {
        Self::against(member, CompareOp::Le, value)
    }

    /// `member > value`.
    #[must_use]
    pub fn gt(member: impl Into<String>, value: impl Into<ScalarValue>) -> Self {
        Self::against(member, CompareOp::Gt, value)
    }

    /// `member >= value`.
    #[must_use]
    pub fn ge(member: impl Into<String>, value: impl Into<ScalarValue>) -> Self {
        Self::against(member, CompareOp::Ge, value)
    }

    /// Substring match on a text member.
    #[must_use]
    pub fn contains(member: impl Into<String>, needle: impl Into<String>) -> Self {
        Self::against(member, CompareOp::Contains, needle.into())
    }

    /// Prefix match on a text member.
    #[must_use]
    pub fn starts_with(member: impl Into<String>, prefix: impl Into<String>) -> Self {
        Self::against(member, CompareOp::StartsWith, prefix.into())
    }

    /// Suffix match on a text member.
    #[must_use]
    pub fn ends_with(member: impl Into<String>, suffix: impl Into<String>) -> Self {
        Self::against(member, CompareOp::EndsWith, suffix.into())
    }

    /// `member IS NULL`.
    #[must_use]
    pub fn is_null(member: impl Into<String>) -> Self {
        Self::against(member, CompareOp::Eq, ScalarValue::Null)
    }

    /// `member IS NOT NULL`.
    #[must_use]
    pub fn is_not_null(member: impl Into<String>) -> Self {
        Self::against(member, CompareOp::Ne, ScalarValue::Null)
    }

    /// Conjunction with `other`.
    #[must_use]
    pub fn and(self, other: Filter) -> Self {
        Self::And(Box::new(self), Box::new(other))
    }

    /// Disjunction with `other`.
    #[must_use]
    pub fn or(self, other: Filter) -> Self {
        Self::Or(Box::new(self), Box::new(other))
    }

    /// Negation.
    #[must_use]
    pub fn not(self) -> Self {
        Self::Not(Box::new(self))
    }
}
