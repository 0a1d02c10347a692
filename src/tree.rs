//! An owned, deserializable form of the AST.
//!
//! Tools that exchange syntax trees as data, such as JSON fixtures, describe them as a [`Tree`]
//! and lower it into a [`Program`] with [`Program::insert_tree`]:
//!
//! ```json
//! {
//!   "node": "binary",
//!   "type": "Int",
//!   "lhs": { "node": "id", "name": "x" },
//!   "op": "add_assign",
//!   "rhs": { "node": "int_const", "value": 1 }
//! }
//! ```

use std::time::Duration;

use serde::{Deserialize, Deserializer};

use crate::ast::{self, MetricKind, NodeKind, Op};
use crate::{NodeId, Program};

/// A syntax tree node owning its children.
#[derive(Debug, Clone, Deserialize)]
pub struct Tree {
    /// The type name inferred for this node.
    #[serde(default, rename = "type")]
    pub ty: Option<String>,

    #[serde(flatten)]
    pub kind: TreeKind,
}

/// An enumeration of all node kinds in the owned tree form. Mirrors [`NodeKind`].
#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "node", rename_all = "snake_case")]
pub enum TreeKind {
    StmtList {
        children: Vec<Tree>,
    },
    ExprList {
        children: Vec<Tree>,
    },
    Cond {
        #[serde(default)]
        cond: Option<Box<Tree>>,
        truth: Box<Tree>,
        #[serde(default)]
        else_branch: Option<Box<Tree>>,
    },
    PatternFragmentDef {
        id: Box<Tree>,
        expr: Box<Tree>,
    },
    PatternConst {
        pattern: String,
    },
    Binary {
        lhs: Box<Tree>,
        op: Op,
        rhs: Box<Tree>,
    },
    Id {
        name: String,
    },
    Capref {
        name: String,
    },
    Builtin {
        name: String,
        #[serde(default)]
        args: Option<Box<Tree>>,
    },
    Indexed {
        lhs: Box<Tree>,
        index: Box<Tree>,
    },
    Decl {
        #[serde(default)]
        hidden: bool,
        kind: MetricKind,
        name: String,
        #[serde(default)]
        keys: Vec<String>,
        #[serde(default)]
        exported_name: Option<String>,
        #[serde(default)]
        buckets: Vec<f64>,
        #[serde(default)]
        limit: Option<u64>,
    },
    Unary {
        op: Op,
        expr: Box<Tree>,
    },
    StringConst {
        text: String,
    },
    IntConst {
        value: i64,
    },
    FloatConst {
        value: f64,
    },
    DecoDef {
        name: String,
        block: Box<Tree>,
    },
    Deco {
        name: String,
        block: Box<Tree>,
    },
    Next,
    Otherwise,
    Del {
        target: Box<Tree>,
        /// The expiry, written as a (possibly fractional) number of seconds.
        #[serde(default, rename = "expiry_secs", deserialize_with = "deserialize_expiry")]
        expiry: Option<Duration>,
    },
    Conv {
        expr: Box<Tree>,
    },
    PatternExpr {
        expr: Box<Tree>,
    },
    Error {
        spelling: String,
    },
    Stop,
}

fn deserialize_expiry<'de, D>(deserializer: D) -> Result<Option<Duration>, D::Error>
where
    D: Deserializer<'de>,
{
    Option::<f64>::deserialize(deserializer)?
        .map(|secs| {
            Duration::try_from_secs_f64(secs).map_err(|e| {
                serde::de::Error::custom(format!("invalid expiry of {secs} seconds: {e}"))
            })
        })
        .transpose()
}

impl Program {
    /// Adds every node of `tree` to the program, returning the id of its root.
    ///
    /// Type names carried by the tree are recorded in [`Program::types`].
    pub fn insert_tree(&mut self, tree: Tree) -> NodeId {
        let Tree { ty, kind } = tree;

        let kind: NodeKind = match kind {
            TreeKind::StmtList { children } => ast::StmtList {
                children: self.insert_trees(children),
            }
            .into(),

            TreeKind::ExprList { children } => ast::ExprList {
                children: self.insert_trees(children),
            }
            .into(),

            TreeKind::Cond {
                cond,
                truth,
                else_branch,
            } => ast::Cond {
                cond: cond.map(|cond| self.insert_tree(*cond)),
                truth: self.insert_tree(*truth),
                else_branch: else_branch.map(|else_branch| self.insert_tree(*else_branch)),
            }
            .into(),

            TreeKind::PatternFragmentDef { id, expr } => ast::PatternFragmentDef {
                id: self.insert_tree(*id),
                expr: self.insert_tree(*expr),
            }
            .into(),

            TreeKind::PatternConst { pattern } => ast::PatternConst { pattern }.into(),

            TreeKind::Binary { lhs, op, rhs } => ast::BinaryExpr {
                lhs: self.insert_tree(*lhs),
                op,
                rhs: self.insert_tree(*rhs),
            }
            .into(),

            TreeKind::Id { name } => ast::Id { name }.into(),

            TreeKind::Capref { name } => ast::Capref { name }.into(),

            TreeKind::Builtin { name, args } => ast::Builtin {
                name,
                args: args.map(|args| self.insert_tree(*args)),
            }
            .into(),

            TreeKind::Indexed { lhs, index } => ast::IndexedExpr {
                lhs: self.insert_tree(*lhs),
                index: self.insert_tree(*index),
            }
            .into(),

            TreeKind::Decl {
                hidden,
                kind,
                name,
                keys,
                exported_name,
                buckets,
                limit,
            } => ast::Decl {
                hidden,
                kind,
                name,
                keys,
                exported_name,
                buckets,
                limit,
            }
            .into(),

            TreeKind::Unary { op, expr } => ast::UnaryExpr {
                op,
                expr: self.insert_tree(*expr),
            }
            .into(),

            TreeKind::StringConst { text } => ast::StringConst { text }.into(),

            TreeKind::IntConst { value } => ast::IntConst { value }.into(),

            TreeKind::FloatConst { value } => ast::FloatConst { value }.into(),

            TreeKind::DecoDef { name, block } => ast::DecoDef {
                name,
                block: self.insert_tree(*block),
            }
            .into(),

            TreeKind::Deco { name, block } => ast::Deco {
                name,
                block: self.insert_tree(*block),
            }
            .into(),

            TreeKind::Next => NodeKind::Next,

            TreeKind::Otherwise => NodeKind::Otherwise,

            TreeKind::Del { target, expiry } => ast::Del {
                target: self.insert_tree(*target),
                expiry,
            }
            .into(),

            TreeKind::Conv { expr } => ast::Conv {
                node: self.insert_tree(*expr),
            }
            .into(),

            TreeKind::PatternExpr { expr } => ast::PatternExpr {
                expr: self.insert_tree(*expr),
            }
            .into(),

            TreeKind::Error { spelling } => ast::ErrorNode { spelling }.into(),

            TreeKind::Stop => NodeKind::Stop,
        };

        let id = self.add(kind);

        if let Some(ty) = ty {
            self.set_type(id, ty);
        }

        id
    }

    fn insert_trees(&mut self, trees: Vec<Tree>) -> Vec<NodeId> {
        trees.into_iter().map(|tree| self.insert_tree(tree)).collect()
    }
}
