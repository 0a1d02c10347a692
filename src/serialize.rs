//! Implements [`Serialize`][serde::Serialize] for the AST.
//!
//! Node references are resolved against the program, so a serialized subtree is self-contained.

use serde::Serialize;
use serde::ser::{SerializeSeq, SerializeStruct};

use crate::loc::{Loc, Span};
use crate::{NodeId, ProgramNode, ast};

impl<'a, T> Serialize for ProgramNode<'a, [T]>
where
    ProgramNode<'a, T>: Serialize,
{
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        let mut seq = serializer.serialize_seq(Some(self.inner().len()))?;

        for element in self.inner() {
            seq.serialize_element(&ProgramNode::new(element, self.program()))?;
        }

        seq.end()
    }
}

impl<'a, T> Serialize for ProgramNode<'a, Vec<T>>
where
    ProgramNode<'a, T>: Serialize,
{
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        self.map(|vec| vec.as_slice()).serialize(serializer)
    }
}

impl<'a, T> Serialize for ProgramNode<'a, Option<T>>
where
    ProgramNode<'a, T>: Serialize,
{
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        self.transpose().serialize(serializer)
    }
}

impl Serialize for ProgramNode<'_, NodeId> {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        self.map(|&id| &self.program().nodes[id])
            .serialize(serializer)
    }
}

impl Serialize for ProgramNode<'_, Loc> {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        match self.inner() {
            Loc::Synthetic => serializer.serialize_unit_variant("Loc", 0, "Synthetic"),
            Loc::Span(span) => span.serialize(serializer),
        }
    }
}

impl Serialize for Span {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        let mut state = serializer.serialize_struct("Span", 2)?;
        state.serialize_field("start", &self.start())?;
        state.serialize_field("len", &self.len())?;

        state.end()
    }
}

impl Serialize for ProgramNode<'_, ast::Node> {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        let id = self.inner().id;
        let mut state = serializer.serialize_struct("Node", 3)?;
        state.serialize_field("loc", &self.map(|node| &node.loc))?;
        state.serialize_field("type", &self.program().type_of(id))?;
        state.serialize_field("kind", &self.map(|node| &node.kind))?;

        state.end()
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use crate::ast::{MetricKind, NodeKind, Op};
    use crate::loc::Span;
    use crate::{Program, WithProgram, ast};

    #[test]
    fn references_are_resolved() {
        let mut program = Program::new();
        let lhs = program.add_at(Span::new(0, 1).into(), ast::Id { name: "x".into() });
        let rhs = program.add(ast::IntConst { value: 1 });
        let sum = program.add(ast::BinaryExpr {
            lhs,
            op: Op::AddAssign,
            rhs,
        });
        program.set_type(sum, "Int");

        let value = serde_json::to_value(sum.with_program(&program)).unwrap();

        assert_eq!(
            value,
            json!({
                "loc": "Synthetic",
                "type": "Int",
                "kind": {
                    "Binary": {
                        "lhs": {
                            "loc": { "start": 0, "len": 1 },
                            "type": null,
                            "kind": { "Id": { "name": "x" } },
                        },
                        "op": "add_assign",
                        "rhs": {
                            "loc": "Synthetic",
                            "type": null,
                            "kind": { "IntConst": { "value": 1 } },
                        },
                    },
                },
            }),
        );
    }

    #[test]
    fn unit_and_optional_fields() {
        let mut program = Program::new();
        let next = program.add(NodeKind::Next);
        let truth = program.add(ast::StmtList {
            children: vec![next],
        });
        let decl = program.add(ast::Decl::new(MetricKind::Gauge, "g"));
        let cond = program.add(ast::Cond {
            cond: None,
            truth,
            else_branch: None,
        });

        let value = serde_json::to_value(cond.with_program(&program)).unwrap();
        assert_eq!(value["kind"]["Cond"]["cond"], json!(null));
        assert_eq!(
            value["kind"]["Cond"]["truth"]["kind"]["StmtList"]["children"][0]["kind"],
            json!("Next"),
        );

        let value = serde_json::to_value(decl.with_program(&program)).unwrap();
        assert_eq!(value["kind"]["Decl"]["kind"], json!("gauge"));
        assert_eq!(value["kind"]["Decl"]["keys"], json!([]));
    }
}
