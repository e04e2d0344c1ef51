//! Syntax tree produced by the parser.

use std::fmt;

use crate::funcs::Helper;
use crate::value::Value;

#[derive(Debug, Clone)]
pub(crate) enum Node {
    /// Source bytes copied to the output as they are.
    Text(Vec<u8>),
    Action(Pipeline),
    Branch(Branch),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum BranchKind {
    If,
    /// Like `If`, but `.` is the pipeline's value inside the first branch.
    With,
}

/// `{{if p}} then {{else}} otherwise {{end}}`, or the `with` form.
///
/// `{{else if q}}` is stored as an `otherwise` holding a single nested
/// branch.
#[derive(Debug, Clone)]
pub(crate) struct Branch {
    pub kind: BranchKind,
    pub pipeline: Pipeline,
    pub then: Vec<Node>,
    pub otherwise: Vec<Node>,
}

/// Commands joined by `|`. Never empty.
#[derive(Debug, Clone)]
pub(crate) struct Pipeline {
    pub commands: Vec<Command>,
}

/// One pipeline stage. Only a `Func` head takes arguments.
#[derive(Debug, Clone)]
pub(crate) struct Command {
    pub head: Operand,
    pub args: Vec<Operand>,
}

#[derive(Debug, Clone)]
pub(crate) enum Operand {
    /// A helper, bound to its implementation at parse time.
    Func {
        name: String,
        helper: Helper,
        line: usize,
    },
    Literal(Value),
    Dot,
    /// A parenthesised sub-pipeline.
    Pipeline(Pipeline),
}

impl fmt::Display for Operand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Func { name, .. } => f.write_str(name),
            Self::Literal(Value::Nil) => f.write_str("nil"),
            Self::Literal(Value::String(s)) => write!(f, "{s:?}"),
            Self::Literal(value) => write!(f, "{value}"),
            Self::Dot => f.write_str("."),
            Self::Pipeline(_) => f.write_str("(...)"),
        }
    }
}

/// Number of actions in `nodes`, counting branches and their contents.
pub(crate) fn count_actions(nodes: &[Node]) -> usize {
    nodes
        .iter()
        .map(|node| match node {
            Node::Text(_) => 0,
            Node::Action(_) => 1,
            Node::Branch(branch) => {
                1 + count_actions(&branch.then) + count_actions(&branch.otherwise)
            }
        })
        .sum()
}
