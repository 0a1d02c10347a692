//! Converts mtail program syntax trees back to program text.
//!
//! The AST lives in a [`Program`] arena. Nodes refer to each other by [`NodeId`], and the
//! type checker's inferences are attached to the same keys via [`Program::types`].
//! [`Program::unparse`] renders a subtree as canonical source text, one statement per line.

use slotmap::{SecondaryMap, SlotMap, new_key_type};

pub mod ast;
pub mod duration;
pub mod loc;
#[cfg(feature = "serde")]
mod serialize;
#[cfg(feature = "serde")]
pub mod tree;
pub mod unparse;

pub use unparse::{UnparseOptions, Unparser};

use crate::loc::Loc;

new_key_type! {
    pub struct NodeId;
}

/// An arena holding the syntax tree of an mtail program.
#[derive(Debug, Default, Clone)]
pub struct Program {
    /// All nodes of the program.
    pub nodes: SlotMap<NodeId, ast::Node>,

    /// Type names inferred for the nodes, used by the diagnostic rendering mode.
    pub types: SecondaryMap<NodeId, String>,
}

impl Program {
    /// Creates an empty program.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a node with no source location to the arena.
    pub fn add(&mut self, kind: impl Into<ast::NodeKind>) -> NodeId {
        self.add_at(Loc::Synthetic, kind)
    }

    /// Adds a node spanning `loc` to the arena.
    pub fn add_at(&mut self, loc: Loc, kind: impl Into<ast::NodeKind>) -> NodeId {
        let kind = kind.into();

        self.nodes.insert_with_key(|id| ast::Node { id, loc, kind })
    }

    /// Records the type name inferred for a node.
    pub fn set_type(&mut self, id: NodeId, ty: impl Into<String>) {
        self.types.insert(id, ty.into());
    }

    /// Returns the type name inferred for a node, if any.
    pub fn type_of(&self, id: NodeId) -> Option<&str> {
        self.types.get(id).map(String::as_str)
    }

    /// Renders the subtree rooted at `root` as program text.
    pub fn unparse(&self, root: NodeId) -> String {
        self.unparse_with(root, UnparseOptions::default())
    }

    /// Renders the subtree rooted at `root` as program text using the given options.
    pub fn unparse_with(&self, root: NodeId, options: UnparseOptions) -> String {
        Unparser::new(self, options).unparse(root)
    }
}

/// A value paired with the [`Program`] its node references resolve against.
#[derive(Debug)]
pub struct ProgramNode<'a, T: ?Sized> {
    inner: &'a T,
    program: &'a Program,
}

impl<T: ?Sized> Clone for ProgramNode<'_, T> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<T: ?Sized> Copy for ProgramNode<'_, T> {}

impl<'a, T: ?Sized> ProgramNode<'a, T> {
    pub fn new(inner: &'a T, program: &'a Program) -> Self {
        Self { inner, program }
    }

    pub fn inner(&self) -> &'a T {
        self.inner
    }

    pub fn program(&self) -> &'a Program {
        self.program
    }

    /// Projects the wrapped value, keeping the program.
    pub fn map<U: ?Sized>(&self, f: impl FnOnce(&'a T) -> &'a U) -> ProgramNode<'a, U> {
        ProgramNode::new(f(self.inner), self.program)
    }
}

impl<'a, T> ProgramNode<'a, Option<T>> {
    pub fn transpose(&self) -> Option<ProgramNode<'a, T>> {
        self.inner
            .as_ref()
            .map(|inner| ProgramNode::new(inner, self.program))
    }
}

/// Allows pairing AST values with their [`Program`].
pub trait WithProgram {
    fn with_program<'a>(&'a self, program: &'a Program) -> ProgramNode<'a, Self> {
        ProgramNode::new(self, program)
    }
}

impl WithProgram for NodeId {}
