//! Implements unparsing AST nodes back as mtail program text.
//!
//! The output is canonical: one statement per line, two spaces of indentation per nested block,
//! and a single space around binary operators. No parentheses are inserted, so a tree that was not
//! built by the parser may render as text that parses differently.
//!
//! Two kinds of malformed input are handled differently. An operator token that has no rendering
//! in its position, such as `++` in a binary expression, is emitted as an inline
//! `Unexpected op: ...` diagnostic. A [dummy node](ast::NodeKind::Dummy) means the tree itself is
//! broken, and unparsing it panics.

use std::fmt::{self, Display, Write as _};
use std::iter;

use crate::duration::GoDuration;
use crate::{NodeId, Program, ast};

const INDENT_WIDTH: usize = 2;

/// The type name emitted for nodes the type checker left unannotated.
const UNKNOWN_TYPE: &str = "None";

/// Options controlling how a program is unparsed.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct UnparseOptions {
    /// Wrap every node's text as `<Type>(...)`, where `Type` is the name recorded in
    /// [`Program::types`].
    pub emit_types: bool,
}

/// Converts a program's syntax tree back to program text.
///
/// An unparser renders a single tree: [`unparse`](Self::unparse) consumes it.
#[derive(Debug)]
pub struct Unparser<'a> {
    program: &'a Program,
    options: UnparseOptions,
    indent: usize,
    line: String,
    output: String,
}

impl<'a> Unparser<'a> {
    pub fn new(program: &'a Program, options: UnparseOptions) -> Self {
        Self {
            program,
            options,
            indent: 0,
            line: String::new(),
            output: String::new(),
        }
    }

    /// Renders the subtree rooted at `root`, returning the program text.
    ///
    /// Every line of the result, including the last one, is terminated by `\n`.
    ///
    /// # Panics
    ///
    /// Panics if the subtree contains a [dummy node](ast::NodeKind::Dummy) or refers to a node
    /// missing from the program.
    pub fn unparse(mut self, root: NodeId) -> String {
        log::trace!(
            "unparsing a program of {} node(s) (emit_types: {})",
            self.program.nodes.len(),
            self.options.emit_types,
        );

        self.visit(root);
        self.finish_line();

        log::trace!("unparsed into {} byte(s)", self.output.len());

        self.output
    }

    fn indent(&mut self) {
        self.indent += INDENT_WIDTH;
    }

    fn outdent(&mut self) {
        self.indent -= INDENT_WIDTH;
    }

    fn emit(&mut self, s: &str) {
        self.line.push_str(s);
    }

    fn emit_fmt(&mut self, args: fmt::Arguments<'_>) {
        // writing to a `String` never fails.
        let _ = self.line.write_fmt(args);
    }

    /// Moves the current line into the output, prefixed with the current indentation.
    ///
    /// The prefix is written even for an empty line, so every line at depth `d` starts with
    /// `2 * d` spaces.
    fn newline(&mut self) {
        self.output.extend(iter::repeat_n(' ', self.indent));
        self.output.push_str(&self.line);
        self.output.push('\n');
        self.line.clear();
    }

    /// Flushes the current line if anything was emitted to it.
    fn finish_line(&mut self) {
        if !self.line.is_empty() {
            self.newline();
        }
    }

    fn visit_separated(&mut self, children: &[NodeId], sep: &str) {
        for (idx, &child) in children.iter().enumerate() {
            if idx > 0 {
                self.emit(sep);
            }

            self.visit(child);
        }
    }

    fn visit_block(&mut self, block: NodeId) {
        self.newline();
        self.indent();
        self.visit(block);
        self.finish_line();
        self.outdent();
    }

    fn visit(&mut self, id: NodeId) {
        let program = self.program;
        let node = &program.nodes[id];

        if self.options.emit_types {
            let ty = program.type_of(id).unwrap_or(UNKNOWN_TYPE);
            self.emit_fmt(format_args!("<{ty}>("));
        }

        match &node.kind {
            ast::NodeKind::Dummy => panic!("encountered a dummy node {id:?} while unparsing"),

            ast::NodeKind::StmtList(list) => {
                for &child in &list.children {
                    self.visit(child);
                    self.newline();
                }
            }

            ast::NodeKind::ExprList(list) => self.visit_separated(&list.children, ", "),

            ast::NodeKind::Cond(cond) => {
                if let Some(expr) = cond.cond {
                    self.visit(expr);
                    self.emit(" ");
                }

                self.emit("{");
                self.visit_block(cond.truth);

                if let Some(else_branch) = cond.else_branch {
                    self.emit("} else {");
                    self.visit_block(else_branch);
                }

                self.emit("}");
            }

            ast::NodeKind::PatternFragmentDef(def) => {
                self.emit("const ");
                self.visit(def.id);
                self.emit(" ");
                self.visit(def.expr);
            }

            ast::NodeKind::PatternConst(pattern) => {
                self.emit_fmt(format_args!("{}", PatternLit(&pattern.pattern)));
            }

            ast::NodeKind::Binary(expr) => {
                self.visit(expr.lhs);

                match binary_op_symbol(expr.op) {
                    Some(symbol) => self.emit(symbol),
                    None => self.emit_unexpected_op(expr.op),
                }

                self.visit(expr.rhs);
            }

            ast::NodeKind::Id(ident) => self.emit(&ident.name),

            ast::NodeKind::Capref(capref) => self.emit_fmt(format_args!("${}", capref.name)),

            ast::NodeKind::Builtin(builtin) => {
                self.emit_fmt(format_args!("{}(", builtin.name));

                if let Some(args) = builtin.args {
                    self.visit(args);
                }

                self.emit(")");
            }

            ast::NodeKind::Indexed(expr) => {
                self.visit(expr.lhs);

                let has_keys = match &program.nodes[expr.index].kind {
                    ast::NodeKind::ExprList(list) => !list.children.is_empty(),
                    _ => true,
                };

                if has_keys {
                    self.emit("[");
                    self.visit(expr.index);
                    self.emit("]");
                }
            }

            ast::NodeKind::Decl(decl) => self.emit_decl(decl),

            ast::NodeKind::Unary(expr) => match expr.op {
                ast::Op::Inc => {
                    self.visit(expr.expr);
                    self.emit("++");
                }

                ast::Op::Dec => {
                    self.visit(expr.expr);
                    self.emit("--");
                }

                ast::Op::Not => {
                    self.emit("~");
                    self.visit(expr.expr);
                }

                op => self.emit_unexpected_op(op),
            },

            ast::NodeKind::StringConst(s) => self.emit_fmt(format_args!("\"{}\"", s.text)),

            ast::NodeKind::IntConst(int) => self.emit_fmt(format_args!("{}", int.value)),

            ast::NodeKind::FloatConst(float) => {
                self.emit_fmt(format_args!("{}", FloatLit(float.value)));
            }

            ast::NodeKind::DecoDef(def) => {
                self.emit_fmt(format_args!("def {} {{", def.name));
                self.visit_block(def.block);
                self.emit("}");
            }

            ast::NodeKind::Deco(deco) => {
                self.emit_fmt(format_args!("@{} {{", deco.name));
                self.visit_block(deco.block);
                self.emit("}");
            }

            ast::NodeKind::Next => self.emit("next"),

            ast::NodeKind::Otherwise => self.emit("otherwise"),

            ast::NodeKind::Del(del) => {
                self.emit("del ");
                self.visit(del.target);

                if let Some(expiry) = del.expiry.filter(|expiry| !expiry.is_zero()) {
                    self.emit_fmt(format_args!(" after {}", GoDuration(expiry)));
                }

                self.newline();
            }

            ast::NodeKind::Conv(conv) => self.visit(conv.node),

            ast::NodeKind::PatternExpr(expr) => self.visit(expr.expr),

            ast::NodeKind::Error(error) => {
                self.emit("// error");
                self.newline();
                self.emit(&error.spelling);
            }

            ast::NodeKind::Stop => self.emit("stop"),
        }

        if self.options.emit_types {
            self.emit(")");
        }
    }

    fn emit_decl(&mut self, decl: &ast::Decl) {
        if decl.hidden {
            self.emit("hidden ");
        }

        self.emit_fmt(format_args!("{} {}", decl.kind.keyword(), decl.name));

        if !decl.keys.is_empty() {
            self.emit_fmt(format_args!(" by {}", decl.keys.join(", ")));
        }

        if let Some(exported_name) = &decl.exported_name {
            self.emit_fmt(format_args!(" as \"{exported_name}\""));
        }

        for (idx, &bucket) in decl.buckets.iter().enumerate() {
            self.emit(if idx == 0 { " buckets " } else { ", " });
            self.emit_fmt(format_args!("{}", FloatLit(bucket)));
        }

        if let Some(limit) = decl.limit {
            self.emit_fmt(format_args!(" limit {limit}"));
        }
    }

    fn emit_unexpected_op(&mut self, op: ast::Op) {
        log::warn!("operator {op:?} cannot be rendered in this position");

        self.emit_fmt(format_args!("Unexpected op: {op:?}"));
    }
}

/// Returns the text of `op` used as a binary operator, including the surrounding spaces.
///
/// Returns `None` for tokens that are only valid as unary operators.
pub fn binary_op_symbol(op: ast::Op) -> Option<&'static str> {
    Some(match op {
        ast::Op::Lt => " < ",
        ast::Op::Gt => " > ",
        ast::Op::Le => " <= ",
        ast::Op::Ge => " >= ",
        ast::Op::Eq => " == ",
        ast::Op::Ne => " != ",
        ast::Op::Shl => " << ",
        ast::Op::Shr => " >> ",
        ast::Op::BitAnd => " & ",
        ast::Op::BitOr => " | ",
        ast::Op::Xor => " ^ ",
        ast::Op::Not => " ~ ",
        ast::Op::And => " && ",
        ast::Op::Or => " || ",
        ast::Op::Plus => " + ",
        ast::Op::Minus => " - ",
        ast::Op::Mul => " * ",
        ast::Op::Div => " / ",
        ast::Op::Pow => " ** ",
        ast::Op::Assign => " = ",
        ast::Op::AddAssign => " += ",
        ast::Op::Mod => " % ",
        // the type checker tells concatenation apart from addition by the operand types.
        ast::Op::Concat => " + ",
        ast::Op::Match => " =~ ",
        ast::Op::NotMatch => " !~ ",
        ast::Op::Inc | ast::Op::Dec => return None,
    })
}

/// A wrapper type that formats a pattern as a pattern literal: enclosed in slashes, with every
/// slash inside the pattern escaped.
#[derive(Debug, Clone, Copy)]
pub struct PatternLit<'a>(pub &'a str);

impl Display for PatternLit<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "/")?;

        let mut remaining = self.0;

        while let Some((s, rest)) = remaining.split_once('/') {
            write!(f, "{s}\\/")?;
            remaining = rest;
        }

        write!(f, "{remaining}/")
    }
}

/// The smallest decimal exponent written in exponent form when a float is formatted.
const FLOAT_EXP_FORM_MIN: i32 = 6;

/// The smallest decimal exponent written in plain form when a float is formatted.
const FLOAT_PLAIN_FORM_MIN: i32 = -4;

/// A wrapper type that formats a float with the fewest digits that parse back to the same value.
///
/// Magnitudes of at least `1e6` or below `1e-4` use the exponent form, with an explicit sign and
/// at least two exponent digits: `1e+06`, `1.5e-07`.
#[derive(Debug, Clone, Copy)]
pub struct FloatLit(pub f64);

impl Display for FloatLit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let value = self.0;

        if value.is_nan() {
            return write!(f, "NaN");
        }

        if value.is_infinite() {
            return write!(f, "{}Inf", if value > 0.0 { "+" } else { "-" });
        }

        // `{:e}` picks the shortest round-trip digits: `1.234567e6`.
        let exp_form = format!("{value:e}");
        let (mantissa, exp) = exp_form
            .rsplit_once('e')
            .and_then(|(mantissa, exp)| Some((mantissa, exp.parse::<i32>().ok()?)))
            .unwrap_or((exp_form.as_str(), 0));

        if (FLOAT_PLAIN_FORM_MIN..FLOAT_EXP_FORM_MIN).contains(&exp) {
            write!(f, "{value}")
        } else {
            let sign = if exp < 0 { '-' } else { '+' };

            write!(f, "{mantissa}e{sign}{:02}", exp.unsigned_abs())
        }
    }
}

impl ast::Node {
    /// Returns an object that implements [Display] to convert the node back to program text.
    pub fn display<'a>(&'a self, program: &'a Program) -> NodeDisplay<'a> {
        NodeDisplay {
            node: self,
            program,
        }
    }
}

/// A helper struct that writes a node out as program text.
#[derive(Debug, Clone, Copy)]
pub struct NodeDisplay<'a> {
    node: &'a ast::Node,
    program: &'a Program,
}

impl Display for NodeDisplay<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.program.unparse(self.node.id))
    }
}
