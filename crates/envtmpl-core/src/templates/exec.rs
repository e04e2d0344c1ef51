//! Evaluates a parsed template.
//!
//! Output is accumulated in a local buffer that is only returned on success,
//! so a failing helper never leaks partially rendered text to the caller.

use super::node::{BranchKind, Command, Node, Operand, Pipeline};
use crate::error::{CallError, ExecError};
use crate::funcs::{CallContext, Func, Helper};
use crate::value::Value;

pub(crate) fn execute(
    name: &str,
    nodes: &[Node],
    ctx: &CallContext<'_>,
) -> Result<Vec<u8>, ExecError> {
    let state = State { name, ctx };
    let mut out = Vec::new();
    // With no data, `.` starts out as nil and prints as `<no value>`.
    state.walk(nodes, &Value::Nil, &mut out)?;
    Ok(out)
}

struct State<'a> {
    name: &'a str,
    ctx: &'a CallContext<'a>,
}

impl State<'_> {
    fn walk(&self, nodes: &[Node], dot: &Value, out: &mut Vec<u8>) -> Result<(), ExecError> {
        for node in nodes {
            match node {
                Node::Text(text) => out.extend_from_slice(text),
                Node::Action(pipeline) => {
                    let value = self.eval_pipeline(pipeline, dot)?;
                    out.extend_from_slice(value.to_string().as_bytes());
                }
                Node::Branch(branch) => {
                    let value = self.eval_pipeline(&branch.pipeline, dot)?;
                    match (branch.kind, value.is_truthy()) {
                        (_, false) => self.walk(&branch.otherwise, dot, out)?,
                        (BranchKind::If, true) => self.walk(&branch.then, dot, out)?,
                        (BranchKind::With, true) => self.walk(&branch.then, &value, out)?,
                    }
                }
            }
        }
        Ok(())
    }

    fn eval_pipeline(&self, pipeline: &Pipeline, dot: &Value) -> Result<Value, ExecError> {
        let mut piped = None;
        for command in &pipeline.commands {
            piped = Some(self.eval_command(command, piped.take(), dot)?);
        }
        Ok(piped.unwrap_or(Value::Nil))
    }

    /// `piped` becomes the first argument of a helper call.
    fn eval_command(
        &self,
        command: &Command,
        piped: Option<Value>,
        dot: &Value,
    ) -> Result<Value, ExecError> {
        match &command.head {
            Operand::Func { name, helper, line } => {
                self.invoke(name, *helper, *line, piped, &command.args, dot)
            }
            other => self.eval_operand(other, dot),
        }
    }

    fn eval_operand(&self, operand: &Operand, dot: &Value) -> Result<Value, ExecError> {
        match operand {
            Operand::Literal(value) => Ok(value.clone()),
            Operand::Dot => Ok(dot.clone()),
            Operand::Pipeline(pipeline) => self.eval_pipeline(pipeline, dot),
            // A helper named as an argument is called with no arguments.
            Operand::Func { name, helper, line } => {
                self.invoke(name, *helper, *line, None, &[], dot)
            }
        }
    }

    fn invoke(
        &self,
        name: &str,
        helper: Helper,
        line: usize,
        piped: Option<Value>,
        args: &[Operand],
        dot: &Value,
    ) -> Result<Value, ExecError> {
        let func = match helper {
            Helper::Call(func) => func,
            Helper::And => return self.short_circuit(name, line, false, piped, args, dot),
            Helper::Or => return self.short_circuit(name, line, true, piped, args, dot),
        };
        let mut values = Vec::with_capacity(args.len() + 1);
        values.extend(piped);
        for arg in args {
            values.push(self.eval_operand(arg, dot)?);
        }
        self.call(name, func, line, &values)
    }

    /// `and` / `or`: returns the first value whose truth is `stop_on`, or the
    /// last value. Later arguments are never evaluated.
    fn short_circuit(
        &self,
        name: &str,
        line: usize,
        stop_on: bool,
        piped: Option<Value>,
        args: &[Operand],
        dot: &Value,
    ) -> Result<Value, ExecError> {
        tracing::trace!(func = name, line, "evaluating logic helper");
        let values = piped
            .into_iter()
            .map(Ok::<Value, ExecError>)
            .chain(args.iter().map(|arg| self.eval_operand(arg, dot)));

        let mut last = None;
        for value in values {
            let value = value?;
            if value.is_truthy() == stop_on {
                return Ok(value);
            }
            last = Some(value);
        }
        last.ok_or_else(|| self.error(name, line, CallError::ArityAtLeast { want: 1, got: 0 }))
    }

    fn call(&self, name: &str, func: Func, line: usize, args: &[Value]) -> Result<Value, ExecError> {
        tracing::trace!(func = name, args = args.len(), line, "calling helper");
        func(self.ctx, args).map_err(|source| self.error(name, line, source))
    }

    fn error(&self, func: &str, line: usize, source: CallError) -> ExecError {
        ExecError {
            name: self.name.to_owned(),
            line,
            func: func.to_owned(),
            source,
        }
    }
}
