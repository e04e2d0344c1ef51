//! Builds the syntax tree from lexer items.
//!
//! Helper names are resolved against the [`FuncRegistry`] here, so an unknown
//! helper is a parse error and never reaches execution.

use std::iter::Peekable;
use std::vec::IntoIter;

use super::lexer::{Item, Token};
use super::node::{Branch, BranchKind, Command, Node, Operand, Pipeline};
use crate::error::ParseError;
use crate::funcs::FuncRegistry;
use crate::value::Value;

/// What stopped a list of nodes.
enum ListEnd {
    Eof,
    /// `{{end}}`, fully consumed.
    End,
    /// `{{else`, with the rest of the action still to read.
    Else,
}

#[derive(Clone, Copy)]
enum Keyword {
    If,
    With,
    Else,
    End,
}

pub(crate) struct Parser<'a> {
    name: &'a str,
    funcs: &'a FuncRegistry,
    items: Peekable<IntoIter<Item>>,
    line: usize,
}

impl<'a> Parser<'a> {
    pub(crate) fn new(name: &'a str, funcs: &'a FuncRegistry, items: Vec<Item>) -> Self {
        Self {
            name,
            funcs,
            items: items.into_iter().peekable(),
            line: 1,
        }
    }

    pub(crate) fn parse(mut self) -> Result<Vec<Node>, ParseError> {
        let (nodes, end) = self.parse_list()?;
        match end {
            ListEnd::Eof => Ok(nodes),
            ListEnd::End => Err(self.error("unexpected {{end}}")),
            ListEnd::Else => Err(self.error("unexpected {{else}}")),
        }
    }

    fn next(&mut self) -> Option<Item> {
        let item = self.items.next()?;
        self.line = item.line;
        Some(item)
    }

    fn peek_keyword(&mut self) -> Option<Keyword> {
        match self.items.peek()?.token {
            Token::If => Some(Keyword::If),
            Token::With => Some(Keyword::With),
            Token::Else => Some(Keyword::Else),
            Token::End => Some(Keyword::End),
            _ => None,
        }
    }

    fn error(&self, message: impl Into<String>) -> ParseError {
        ParseError {
            name: self.name.to_owned(),
            line: self.line,
            message: message.into(),
        }
    }

    fn expect_right_delim(&mut self, context: &str) -> Result<(), ParseError> {
        match self.next() {
            Some(Item {
                token: Token::RightDelim,
                ..
            }) => Ok(()),
            Some(item) => Err(self.error(format!("unexpected {:?} in {context}", item.token))),
            None => Err(self.error("unclosed action")),
        }
    }

    /// Nodes up to the end of input, `{{end}}` or `{{else`.
    fn parse_list(&mut self) -> Result<(Vec<Node>, ListEnd), ParseError> {
        let mut nodes = Vec::new();
        while let Some(item) = self.next() {
            match item.token {
                Token::Text(text) => nodes.push(Node::Text(text)),
                Token::LeftDelim => match self.peek_keyword() {
                    Some(Keyword::If) => {
                        self.next();
                        nodes.push(Node::Branch(self.parse_branch(BranchKind::If)?));
                    }
                    Some(Keyword::With) => {
                        self.next();
                        nodes.push(Node::Branch(self.parse_branch(BranchKind::With)?));
                    }
                    Some(Keyword::End) => {
                        self.next();
                        self.expect_right_delim("end")?;
                        return Ok((nodes, ListEnd::End));
                    }
                    Some(Keyword::Else) => {
                        self.next();
                        return Ok((nodes, ListEnd::Else));
                    }
                    None => nodes.push(Node::Action(self.parse_pipeline(false)?)),
                },
                other => return Err(self.error(format!("unexpected {other:?} outside action"))),
            }
        }
        Ok((nodes, ListEnd::Eof))
    }

    /// Everything after the `if`/`with` keyword, through the matching `{{end}}`.
    fn parse_branch(&mut self, kind: BranchKind) -> Result<Branch, ParseError> {
        let keyword = match kind {
            BranchKind::If => "if",
            BranchKind::With => "with",
        };
        if matches!(self.items.peek(), Some(Item { token: Token::RightDelim, .. })) {
            return Err(self.error(format!("missing value for {keyword}")));
        }
        let pipeline = self.parse_pipeline(false)?;

        let (then, end) = self.parse_list()?;
        let otherwise = match end {
            ListEnd::End => Vec::new(),
            ListEnd::Eof => return Err(self.error("unexpected EOF")),
            // `{{else if ...}}` and `{{else with ...}}` share the outer `{{end}}`.
            ListEnd::Else => match self.peek_keyword() {
                Some(Keyword::If) => {
                    self.next();
                    vec![Node::Branch(self.parse_branch(BranchKind::If)?)]
                }
                Some(Keyword::With) => {
                    self.next();
                    vec![Node::Branch(self.parse_branch(BranchKind::With)?)]
                }
                _ => {
                    self.expect_right_delim("else")?;
                    let (otherwise, end) = self.parse_list()?;
                    match end {
                        ListEnd::End => otherwise,
                        ListEnd::Else => return Err(self.error("expected end; found {{else}}")),
                        ListEnd::Eof => return Err(self.error("unexpected EOF")),
                    }
                }
            },
        };

        Ok(Branch {
            kind,
            pipeline,
            then,
            otherwise,
        })
    }

    /// Parses up to and including the closing `}}`, or `)` when `in_paren`.
    fn parse_pipeline(&mut self, in_paren: bool) -> Result<Pipeline, ParseError> {
        let mut commands = Vec::new();
        loop {
            let command = self.parse_command()?;
            if !commands.is_empty() && !matches!(command.head, Operand::Func { .. }) {
                return Err(self.error(format!(
                    "non executable command in pipeline stage {}",
                    commands.len() + 1
                )));
            }
            commands.push(command);

            let Some(item) = self.next() else {
                return Err(self.error("unclosed action"));
            };
            match item.token {
                Token::Pipe => continue,
                Token::RightParen if in_paren => break,
                Token::RightDelim if !in_paren => break,
                Token::RightParen => return Err(self.error("unexpected right paren")),
                Token::RightDelim => return Err(self.error("unclosed left paren")),
                other => return Err(self.error(format!("unexpected {other:?} in pipeline"))),
            }
        }
        Ok(Pipeline { commands })
    }

    fn parse_command(&mut self) -> Result<Command, ParseError> {
        let mut operands = Vec::new();
        while let Some(item) = self.items.peek() {
            if matches!(
                item.token,
                Token::Pipe | Token::RightParen | Token::RightDelim
            ) {
                break;
            }
            if let Some(item) = self.next() {
                operands.push(self.parse_operand(item)?);
            }
        }

        let mut operands = operands.into_iter();
        let Some(head) = operands.next() else {
            return Err(self.error("missing value for command"));
        };
        let args: Vec<Operand> = operands.collect();

        match &head {
            Operand::Literal(Value::Nil) => return Err(self.error("nil is not a command")),
            Operand::Func { .. } => {}
            other if !args.is_empty() => {
                return Err(self.error(format!("can't give argument to non-function {other}")));
            }
            _ => {}
        }
        Ok(Command { head, args })
    }

    fn parse_operand(&mut self, item: Item) -> Result<Operand, ParseError> {
        let operand = match item.token {
            Token::Ident(name) => match self.funcs.get(&name) {
                Some(helper) => Operand::Func {
                    name,
                    helper,
                    line: item.line,
                },
                None => return Err(self.error(format!("function {name:?} not defined"))),
            },
            Token::String(s) => Operand::Literal(Value::String(s)),
            Token::Int(i) => Operand::Literal(Value::Int(i)),
            Token::Float(x) => Operand::Literal(Value::Float(x)),
            Token::Bool(b) => Operand::Literal(Value::Bool(b)),
            Token::Nil => Operand::Literal(Value::Nil),
            Token::Dot => Operand::Dot,
            Token::LeftParen => Operand::Pipeline(self.parse_pipeline(true)?),
            other => return Err(self.error(format!("unexpected {other:?} in operand"))),
        };
        Ok(operand)
    }
}
