//! AST node definitions.
//!
//! Nodes are stored in a [`Program`][crate::Program] arena and refer to their children by
//! [`NodeId`]. The root of a whole program is usually a [`StmtList`].

use std::time::Duration;

use crate::loc::Loc;
use crate::NodeId;

/// A node of an mtail syntax tree.
#[derive(Debug, Default, Clone)]
pub struct Node {
    /// A unique identifier for this node, usable as a (secondary) slotmap key.
    ///
    /// This allows to associate additional information with the node, such as its inferred type,
    /// as well as refer to it without violating borrowing rules.
    pub id: NodeId,

    /// The node's location in the source text.
    pub loc: Loc,

    /// What kind of node this is.
    ///
    /// The variants hold data specific to each node kind.
    pub kind: NodeKind,
}

/// An enumeration of all possible node kinds.
#[derive(Debug, Default, Clone)]
#[cfg_attr(feature = "serde", derive(mtail_derive::Serialize))]
pub enum NodeKind {
    /// A dummy node, the default value of `NodeKind`.
    ///
    /// Allows using `mem::take` to take ownership of the value. A dummy node is never a valid part
    /// of a program, and unparsing one is a fatal error.
    #[default]
    Dummy,

    /// A sequence of statements, each rendered on its own line.
    StmtList(StmtList),

    /// A comma-separated list of expressions.
    ExprList(ExprList),

    /// A conditional block with an optional else branch.
    Cond(Cond),

    /// A named pattern fragment definition: `const NAME /pattern/`.
    PatternFragmentDef(PatternFragmentDef),

    /// A regular expression pattern literal.
    PatternConst(PatternConst),

    /// A binary operator expression.
    Binary(BinaryExpr),

    /// An identifier.
    Id(Id),

    /// A reference to a pattern capture group: `$name`.
    Capref(Capref),

    /// A call of a builtin function.
    Builtin(Builtin),

    /// A metric access, optionally indexed by keys.
    Indexed(IndexedExpr),

    /// A metric declaration.
    Decl(Decl),

    /// A unary operator expression.
    Unary(UnaryExpr),

    /// A string literal.
    StringConst(StringConst),

    /// An integer literal.
    IntConst(IntConst),

    /// A floating-point number literal.
    FloatConst(FloatConst),

    /// A decorator definition: `def name { ... }`.
    DecoDef(DecoDef),

    /// A decorated block: `@name { ... }`.
    Deco(Deco),

    /// The `next` statement, marking where a decorated block is spliced in.
    Next,

    /// The `otherwise` condition.
    Otherwise,

    /// A metric element deletion.
    Del(Del),

    /// An implicit type conversion inserted by the type checker.
    Conv(Conv),

    /// An expression evaluated to form a pattern.
    PatternExpr(PatternExpr),

    /// A placeholder for a syntax error found while parsing.
    Error(ErrorNode),

    /// The `stop` statement.
    Stop,
}

macro_rules! impl_from_for_node_kind {
    ($($variant:ident($ty:ty),)+) => {
        $(
            impl From<$ty> for NodeKind {
                fn from(node: $ty) -> Self {
                    Self::$variant(node)
                }
            }
        )+
    };
}

impl_from_for_node_kind! {
    StmtList(StmtList),
    ExprList(ExprList),
    Cond(Cond),
    PatternFragmentDef(PatternFragmentDef),
    PatternConst(PatternConst),
    Binary(BinaryExpr),
    Id(Id),
    Capref(Capref),
    Builtin(Builtin),
    Indexed(IndexedExpr),
    Decl(Decl),
    Unary(UnaryExpr),
    StringConst(StringConst),
    IntConst(IntConst),
    FloatConst(FloatConst),
    DecoDef(DecoDef),
    Deco(Deco),
    Del(Del),
    Conv(Conv),
    PatternExpr(PatternExpr),
    Error(ErrorNode),
}

/// A sequence of statements.
#[derive(Debug, Default, Clone)]
#[cfg_attr(feature = "serde", derive(mtail_derive::Serialize))]
pub struct StmtList {
    /// The statements, in program order.
    pub children: Vec<NodeId>,
}

/// A list of expressions, such as call arguments or metric keys.
#[derive(Debug, Default, Clone)]
#[cfg_attr(feature = "serde", derive(mtail_derive::Serialize))]
pub struct ExprList {
    /// The expressions, in program order.
    pub children: Vec<NodeId>,
}

/// A conditional block.
#[derive(Debug, Clone)]
#[cfg_attr(feature = "serde", derive(mtail_derive::Serialize))]
pub struct Cond {
    /// The condition guarding the block.
    ///
    /// The condition may be absent for blocks synthesized by the parser.
    pub cond: Option<NodeId>,

    /// The block evaluated when the condition holds.
    pub truth: NodeId,

    /// The block evaluated when the condition does not hold.
    pub else_branch: Option<NodeId>,
}

/// A named pattern fragment definition.
#[derive(Debug, Clone)]
#[cfg_attr(feature = "serde", derive(mtail_derive::Serialize))]
pub struct PatternFragmentDef {
    /// The fragment's name, an [`Id`] node.
    pub id: NodeId,

    /// The pattern expression the name stands for.
    pub expr: NodeId,
}

/// A regular expression pattern literal.
#[derive(Debug, Clone)]
#[cfg_attr(feature = "serde", derive(mtail_derive::Serialize))]
pub struct PatternConst {
    /// The pattern text, with no surrounding slashes and no escaping.
    #[cfg_attr(feature = "serde", no_wrap)]
    pub pattern: String,
}

/// A binary operator expression.
#[derive(Debug, Clone)]
#[cfg_attr(feature = "serde", derive(mtail_derive::Serialize))]
pub struct BinaryExpr {
    /// The left operand of the operator.
    pub lhs: NodeId,

    /// The operator token.
    #[cfg_attr(feature = "serde", no_wrap)]
    pub op: Op,

    /// The right operand of the operator.
    pub rhs: NodeId,
}

/// An identifier.
#[derive(Debug, Clone)]
#[cfg_attr(feature = "serde", derive(mtail_derive::Serialize))]
pub struct Id {
    #[cfg_attr(feature = "serde", no_wrap)]
    pub name: String,
}

/// A reference to a pattern capture group.
#[derive(Debug, Clone)]
#[cfg_attr(feature = "serde", derive(mtail_derive::Serialize))]
pub struct Capref {
    /// The capture group's name or number, without the leading `$`.
    #[cfg_attr(feature = "serde", no_wrap)]
    pub name: String,
}

/// A call of a builtin function.
#[derive(Debug, Clone)]
#[cfg_attr(feature = "serde", derive(mtail_derive::Serialize))]
pub struct Builtin {
    /// The builtin's name.
    #[cfg_attr(feature = "serde", no_wrap)]
    pub name: String,

    /// The call's arguments, an [`ExprList`] node.
    pub args: Option<NodeId>,
}

/// A metric access, optionally indexed by keys: `requests[$method]`.
#[derive(Debug, Clone)]
#[cfg_attr(feature = "serde", derive(mtail_derive::Serialize))]
pub struct IndexedExpr {
    /// The metric being accessed.
    pub lhs: NodeId,

    /// The index keys, an [`ExprList`] node.
    ///
    /// An empty list means the metric is accessed without brackets.
    pub index: NodeId,
}

/// A metric declaration.
#[derive(Debug, Clone)]
#[cfg_attr(feature = "serde", derive(mtail_derive::Serialize))]
pub struct Decl {
    /// Whether the metric is hidden from export.
    #[cfg_attr(feature = "serde", no_wrap)]
    pub hidden: bool,

    /// What kind of metric this declares.
    #[cfg_attr(feature = "serde", no_wrap)]
    pub kind: MetricKind,

    /// The metric's name in the program.
    #[cfg_attr(feature = "serde", no_wrap)]
    pub name: String,

    /// The names of the metric's grouping keys.
    #[cfg_attr(feature = "serde", no_wrap)]
    pub keys: Vec<String>,

    /// The name the metric is exported under, if it differs from [`name`][Self::name].
    #[cfg_attr(feature = "serde", no_wrap)]
    pub exported_name: Option<String>,

    /// The bucket boundaries of a histogram.
    #[cfg_attr(feature = "serde", no_wrap)]
    pub buckets: Vec<f64>,

    /// The maximum number of elements the metric may hold.
    #[cfg_attr(feature = "serde", no_wrap)]
    pub limit: Option<u64>,
}

impl Decl {
    /// Creates a visible, unkeyed declaration of a metric.
    pub fn new(kind: MetricKind, name: impl Into<String>) -> Self {
        Self {
            hidden: false,
            kind,
            name: name.into(),
            keys: Vec::new(),
            exported_name: None,
            buckets: Vec::new(),
            limit: None,
        }
    }
}

/// An enumeration of all metric kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum MetricKind {
    /// A monotonically increasing counter.
    Counter,

    /// A value that may go up and down.
    Gauge,

    /// A gauge holding a duration.
    Timer,

    /// A text value.
    Text,

    /// A distribution of observations over buckets.
    Histogram,
}

impl MetricKind {
    /// The keyword introducing a declaration of this kind.
    pub fn keyword(self) -> &'static str {
        match self {
            Self::Counter => "counter",
            Self::Gauge => "gauge",
            Self::Timer => "timer",
            Self::Text => "text",
            Self::Histogram => "histogram",
        }
    }
}

/// A unary operator expression.
#[derive(Debug, Clone)]
#[cfg_attr(feature = "serde", derive(mtail_derive::Serialize))]
pub struct UnaryExpr {
    /// The operator token.
    #[cfg_attr(feature = "serde", no_wrap)]
    pub op: Op,

    /// The operand of the operator.
    pub expr: NodeId,
}

/// A string literal.
#[derive(Debug, Clone)]
#[cfg_attr(feature = "serde", derive(mtail_derive::Serialize))]
pub struct StringConst {
    /// The literal's text as it was lexed, without the quotes.
    #[cfg_attr(feature = "serde", no_wrap)]
    pub text: String,
}

/// An integer literal.
#[derive(Debug, Clone, Copy)]
#[cfg_attr(feature = "serde", derive(mtail_derive::Serialize))]
pub struct IntConst {
    #[cfg_attr(feature = "serde", no_wrap)]
    pub value: i64,
}

/// A floating-point number literal.
#[derive(Debug, Clone, Copy)]
#[cfg_attr(feature = "serde", derive(mtail_derive::Serialize))]
pub struct FloatConst {
    #[cfg_attr(feature = "serde", no_wrap)]
    pub value: f64,
}

/// A decorator definition.
#[derive(Debug, Clone)]
#[cfg_attr(feature = "serde", derive(mtail_derive::Serialize))]
pub struct DecoDef {
    /// The decorator's name.
    #[cfg_attr(feature = "serde", no_wrap)]
    pub name: String,

    /// The decorator's body, containing a [`Next`][NodeKind::Next] statement.
    pub block: NodeId,
}

/// A block wrapped in a decorator.
#[derive(Debug, Clone)]
#[cfg_attr(feature = "serde", derive(mtail_derive::Serialize))]
pub struct Deco {
    /// The name of the applied decorator.
    #[cfg_attr(feature = "serde", no_wrap)]
    pub name: String,

    /// The decorated block.
    pub block: NodeId,
}

/// A metric element deletion: `del requests[$host] after 1h`.
#[derive(Debug, Clone)]
#[cfg_attr(feature = "serde", derive(mtail_derive::Serialize))]
pub struct Del {
    /// The metric element being deleted.
    pub target: NodeId,

    /// How long the element is kept after its last update.
    ///
    /// `None` and a zero duration both mean the element is deleted immediately.
    #[cfg_attr(feature = "serde", no_wrap)]
    pub expiry: Option<Duration>,
}

/// An implicit type conversion.
#[derive(Debug, Clone)]
#[cfg_attr(feature = "serde", derive(mtail_derive::Serialize))]
pub struct Conv {
    /// The converted node.
    pub node: NodeId,
}

/// An expression evaluated to form a pattern.
#[derive(Debug, Clone)]
#[cfg_attr(feature = "serde", derive(mtail_derive::Serialize))]
pub struct PatternExpr {
    pub expr: NodeId,
}

/// A syntax error captured by the parser.
#[derive(Debug, Clone)]
#[cfg_attr(feature = "serde", derive(mtail_derive::Serialize))]
pub struct ErrorNode {
    /// The diagnostic text describing the error.
    #[cfg_attr(feature = "serde", no_wrap)]
    pub spelling: String,
}

/// An enumeration of operator tokens that may appear in [`BinaryExpr`] and [`UnaryExpr`].
///
/// The lexer produces the same tokens in both positions, so not every operator is valid in
/// every expression kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum Op {
    /// Less than.
    Lt,

    /// Greater than.
    Gt,

    /// Less than or equal to.
    Le,

    /// Greater than or equal to.
    Ge,

    /// Equals.
    Eq,

    /// Not equals.
    Ne,

    /// Left shift.
    Shl,

    /// Right shift.
    Shr,

    /// Bitwise and.
    BitAnd,

    /// Bitwise or.
    BitOr,

    /// Bitwise xor.
    Xor,

    /// Bitwise negation.
    Not,

    /// Logical and.
    And,

    /// Logical or.
    Or,

    /// Addition.
    Plus,

    /// Subtraction.
    Minus,

    /// Multiplication.
    Mul,

    /// Division.
    Div,

    /// Exponentiation.
    Pow,

    /// Assignment.
    Assign,

    /// In-place addition.
    AddAssign,

    /// Modulus.
    Mod,

    /// String concatenation.
    Concat,

    /// Pattern match.
    Match,

    /// Negated pattern match.
    NotMatch,

    /// Increment.
    Inc,

    /// Decrement.
    Dec,
}

impl Op {
    /// Every operator token, in declaration order.
    pub const ALL: [Op; 27] = [
        Op::Lt,
        Op::Gt,
        Op::Le,
        Op::Ge,
        Op::Eq,
        Op::Ne,
        Op::Shl,
        Op::Shr,
        Op::BitAnd,
        Op::BitOr,
        Op::Xor,
        Op::Not,
        Op::And,
        Op::Or,
        Op::Plus,
        Op::Minus,
        Op::Mul,
        Op::Div,
        Op::Pow,
        Op::Assign,
        Op::AddAssign,
        Op::Mod,
        Op::Concat,
        Op::Match,
        Op::NotMatch,
        Op::Inc,
        Op::Dec,
    ];
}
