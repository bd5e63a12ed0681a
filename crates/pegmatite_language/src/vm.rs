//! Frame-based virtual machine for Pegmatite bytecode.
//!
//! Each rule invocation gets a fresh frame of `slot_count` cells. A cell is
//! empty until written, then holds a match value, the failed sentinel, or a
//! saved position. Reading an empty cell, or reading a cell as the wrong kind,
//! is an internal error: generated code never does it.
//!
//! # Parse Session
//!
//! Everything that changes during a parse (position, silent depth, failure
//! tracker, memo table, location cache, state) lives in a session created
//! fresh for each [`execute`] call. The [`Program`] itself is only read.

#![allow(clippy::too_many_lines)]

mod context;
mod failures;
mod locate;
mod trace;

pub use context::{ActionContext, ActionResult, Escape};
pub use failures::FailureTracker;
pub use locate::Locator;
pub use trace::{LogTracer, TraceEvent, TraceEventKind, Tracer};

use std::collections::HashMap;
use std::sync::Arc;

use pegmatite_foundation::{
    Error, Expectation, Result, SyntaxError, Value, expectation::describe_found,
};

use crate::opcode::{ConstIdx, Opcode, Reg};
use crate::options::ParseOptions;
use crate::program::{CompiledRule, Constant, Program};

/// One frame cell.
#[derive(Clone, Debug, Default)]
enum Cell {
    #[default]
    Empty,
    Failed,
    Value(Value),
    Pos(usize),
}

/// Memo entry: the position after the rule and its result.
type MemoEntry = (usize, Option<Value>);

struct Session<'a, 't> {
    program: &'a Program,
    input: &'a str,
    pos: usize,
    silent: u32,
    failures: FailureTracker,
    memo: HashMap<(usize, usize), MemoEntry>,
    locator: Locator,
    report_start: usize,
    state: Value,
    options: Value,
    tracer: Option<&'t mut (dyn Tracer + 't)>,
}

fn cell_mut(frame: &mut [Cell], reg: Reg) -> Result<&mut Cell> {
    frame
        .get_mut(usize::from(reg))
        .ok_or_else(|| Error::internal(format!("slot r{reg} outside frame")))
}

fn cell(frame: &[Cell], reg: Reg) -> Result<&Cell> {
    match frame.get(usize::from(reg)) {
        Some(Cell::Empty) => Err(Error::internal(format!("slot r{reg} read before write"))),
        Some(cell) => Ok(cell),
        None => Err(Error::internal(format!("slot r{reg} outside frame"))),
    }
}

fn set(frame: &mut [Cell], reg: Reg, value: Cell) -> Result<()> {
    *cell_mut(frame, reg)? = value;
    Ok(())
}

fn is_failed(frame: &[Cell], reg: Reg) -> Result<bool> {
    match cell(frame, reg)? {
        Cell::Failed => Ok(true),
        Cell::Value(_) => Ok(false),
        _ => Err(Error::internal(format!("slot r{reg} holds no match result"))),
    }
}

fn saved_pos(frame: &[Cell], reg: Reg) -> Result<usize> {
    match cell(frame, reg)? {
        Cell::Pos(pos) => Ok(*pos),
        _ => Err(Error::internal(format!("slot r{reg} holds no position"))),
    }
}

fn value(frame: &[Cell], reg: Reg) -> Result<&Value> {
    match cell(frame, reg)? {
        Cell::Value(value) => Ok(value),
        _ => Err(Error::internal(format!("slot r{reg} holds no value"))),
    }
}

fn jump(ip: usize, offset: i16) -> Result<usize> {
    ip.checked_add_signed(isize::from(offset))
        .ok_or_else(|| Error::internal("jump before start of code"))
}

impl<'a, 't> Session<'a, 't> {
    fn string(&self, idx: ConstIdx) -> Result<&'a Arc<str>> {
        match self.program.constant(idx) {
            Some(Constant::String(s)) => Ok(s),
            _ => Err(Error::internal(format!("constant {idx} is not a string"))),
        }
    }

    fn expectation(&self, idx: ConstIdx) -> Result<&'a Expectation> {
        match self.program.constant(idx) {
            Some(Constant::Expectation(e)) => Ok(e),
            _ => Err(Error::internal(format!("constant {idx} is not an expectation"))),
        }
    }

    fn fail(&mut self, expectation: &Expectation) {
        if self.silent == 0 {
            self.failures.record(self.pos, expectation);
        }
    }

    fn next_char(&self) -> Option<char> {
        self.input.get(self.pos..).and_then(|rest| rest.chars().next())
    }

    fn emit(&mut self, kind: TraceEventKind, rule: &str, start: usize, result: Option<&Value>) {
        if !self.program.trace {
            return;
        }
        let end = if kind == TraceEventKind::Match { self.pos } else { start };
        let event = TraceEvent {
            kind,
            rule,
            location: self.locator.location(self.input, start, end),
            result,
        };
        match self.tracer.as_deref_mut() {
            Some(tracer) => tracer.trace(&event),
            None => LogTracer.trace(&event),
        }
    }

    fn trace_outcome(&mut self, rule: &str, start: usize, result: Option<&Value>) {
        let kind = if result.is_some() {
            TraceEventKind::Match
        } else {
            TraceEventKind::Fail
        };
        self.emit(kind, rule, start, result);
    }

    /// Invokes a rule, through the memo table when caching is on.
    fn call_rule(&mut self, index: usize) -> Result<Option<Value>> {
        let program = self.program;
        let rule = program
            .rules
            .get(index)
            .ok_or_else(|| Error::internal(format!("no rule {index}")))?;
        let start = self.pos;
        self.emit(TraceEventKind::Enter, &rule.name, start, None);

        if program.cache {
            if let Some((next, result)) = self.memo.get(&(index, start)) {
                let result = result.clone();
                self.pos = *next;
                self.trace_outcome(&rule.name, start, result.as_ref());
                return Ok(result);
            }
        }

        let result = self.run(rule)?;

        if program.cache {
            self.memo.insert((index, start), (self.pos, result.clone()));
        }
        self.trace_outcome(&rule.name, start, result.as_ref());
        Ok(result)
    }

    fn escape(&mut self, escape: Escape, span: (usize, usize)) -> Error {
        let (start, end) = span;
        let current = self.locator.location(self.input, start, end);
        let error = match escape {
            Escape::Expected {
                description,
                location,
            } => {
                let location = location.unwrap_or(current);
                let found = self
                    .input
                    .get(start..end)
                    .filter(|t| !t.is_empty())
                    .map(str::to_string);
                SyntaxError::expected(vec![Expectation::other(description)], found, location)
            }
            Escape::Error { message, location } => {
                SyntaxError::simple(message, location.unwrap_or(current))
            }
        };
        Error::syntax(error)
    }

    fn context<'c>(&'c mut self, labels: &'c [String], args: Vec<Value>, end: usize) -> ActionContext<'c> {
        ActionContext {
            input: self.input,
            span: self.report_start..end,
            labels,
            args,
            locator: &mut self.locator,
            state: &mut self.state,
            options: &self.options,
        }
    }

    /// Runs one rule's code in a fresh frame.
    fn run(&mut self, rule: &'a CompiledRule) -> Result<Option<Value>> {
        let mut frame = vec![Cell::Empty; rule.slot_count];
        let ops = &rule.code.ops;
        let mut ip = 0;

        while ip < ops.len() {
            let op = &ops[ip];
            ip += 1;

            match op {
                Opcode::SavePos(r) => set(&mut frame, *r, Cell::Pos(self.pos))?,
                Opcode::RestorePos(r) => self.pos = saved_pos(&frame, *r)?,

                Opcode::LoadNull(r) => set(&mut frame, *r, Cell::Value(Value::Null))?,
                Opcode::LoadFailed(r) => set(&mut frame, *r, Cell::Failed)?,
                Opcode::LoadString(r, idx) => {
                    let s = Arc::clone(self.string(*idx)?);
                    set(&mut frame, *r, Cell::Value(Value::String(s)))?;
                }
                Opcode::NewArray(r) => set(&mut frame, *r, Cell::Value(Value::empty_array()))?,
                Opcode::Append { array, item } => {
                    let item = value(&frame, *item)?.clone();
                    match cell_mut(&mut frame, *array)? {
                        Cell::Value(Value::Array(items)) => items.push_back(item),
                        _ => return Err(Error::internal(format!("slot r{array} holds no array"))),
                    }
                }
                Opcode::Wrap { elements, dst } => {
                    let items = elements
                        .iter()
                        .map(|r| value(&frame, *r).cloned())
                        .collect::<Result<_>>()?;
                    set(&mut frame, *dst, Cell::Value(Value::Array(items)))?;
                }
                Opcode::Text { start, dst } => {
                    let start = saved_pos(&frame, *start)?;
                    let text = self
                        .input
                        .get(start..self.pos)
                        .ok_or_else(|| Error::internal("text span off char boundary"))?;
                    set(&mut frame, *dst, Cell::Value(Value::from(text)))?;
                }
                Opcode::FailIfEmpty(r) => {
                    let empty = matches!(value(&frame, *r)?, Value::Array(items) if items.is_empty());
                    if empty {
                        set(&mut frame, *r, Cell::Failed)?;
                    }
                }

                Opcode::Jump(offset) => ip = jump(ip, *offset)?,
                Opcode::JumpIfFailed(r, offset) => {
                    if is_failed(&frame, *r)? {
                        ip = jump(ip, *offset)?;
                    }
                }
                Opcode::JumpIfNotFailed(r, offset) => {
                    if !is_failed(&frame, *r)? {
                        ip = jump(ip, *offset)?;
                    }
                }

                Opcode::MatchLiteral {
                    literal,
                    expected,
                    dst,
                } => {
                    let literal = self.string(*literal)?;
                    let matched = self
                        .input
                        .get(self.pos..)
                        .is_some_and(|rest| rest.starts_with(&**literal));
                    let result = if matched {
                        self.pos += literal.len();
                        Cell::Value(Value::String(Arc::clone(literal)))
                    } else {
                        self.fail(self.expectation(*expected)?);
                        Cell::Failed
                    };
                    set(&mut frame, *dst, result)?;
                }
                Opcode::MatchLiteralIc {
                    literal,
                    expected,
                    dst,
                } => {
                    let literal = self.string(*literal)?;
                    let rest = self.input.get(self.pos..).unwrap_or_default();
                    let len = rest
                        .char_indices()
                        .nth(literal.chars().count())
                        .map_or(rest.len(), |(i, _)| i);
                    let candidate = &rest[..len];
                    let result = if candidate.to_lowercase() == **literal {
                        self.pos += len;
                        Cell::Value(Value::from(candidate))
                    } else {
                        self.fail(self.expectation(*expected)?);
                        Cell::Failed
                    };
                    set(&mut frame, *dst, result)?;
                }
                Opcode::MatchChar {
                    ch,
                    literal,
                    expected,
                    dst,
                } => {
                    let result = if self.next_char() == Some(*ch) {
                        self.pos += ch.len_utf8();
                        Cell::Value(Value::String(Arc::clone(self.string(*literal)?)))
                    } else {
                        self.fail(self.expectation(*expected)?);
                        Cell::Failed
                    };
                    set(&mut frame, *dst, result)?;
                }
                Opcode::MatchClass {
                    class,
                    expected,
                    dst,
                } => {
                    let Some(Constant::Class(class)) = self.program.constant(*class) else {
                        return Err(Error::internal(format!("constant {class} is not a class")));
                    };
                    let result = match self.next_char() {
                        Some(c) if class.matches(c) => {
                            self.pos += c.len_utf8();
                            Cell::Value(Value::from(c.to_string()))
                        }
                        _ => {
                            self.fail(self.expectation(*expected)?);
                            Cell::Failed
                        }
                    };
                    set(&mut frame, *dst, result)?;
                }
                Opcode::MatchAny(dst) => {
                    let result = if let Some(c) = self.next_char() {
                        self.pos += c.len_utf8();
                        Cell::Value(Value::from(c.to_string()))
                    } else {
                        self.fail(&Expectation::Any);
                        Cell::Failed
                    };
                    set(&mut frame, *dst, result)?;
                }
                Opcode::CallRule { rule, dst } => {
                    let result = self.call_rule(usize::from(*rule))?;
                    set(&mut frame, *dst, result.map_or(Cell::Failed, Cell::Value))?;
                }

                Opcode::ReportSavedPos(r) => self.report_start = saved_pos(&frame, *r)?,
                Opcode::ReportCurrPos => self.report_start = self.pos,
                Opcode::CallAction {
                    action,
                    params,
                    dst,
                } => {
                    let Some(Constant::Action { labels, func, .. }) = self.program.constant(*action)
                    else {
                        return Err(Error::internal(format!("constant {action} is not an action")));
                    };
                    let args = params
                        .iter()
                        .map(|r| value(&frame, *r).cloned())
                        .collect::<Result<Vec<_>>>()?;
                    let end = self.pos;
                    let span = (self.report_start, end);
                    let outcome = func(&mut self.context(labels, args, end));
                    match outcome {
                        Ok(result) => set(&mut frame, *dst, Cell::Value(result))?,
                        Err(escape) => return Err(self.escape(escape, span)),
                    }
                }
                Opcode::CallPredicate {
                    predicate,
                    params,
                    negate,
                    dst,
                } => {
                    let Some(Constant::Predicate { labels, func, .. }) =
                        self.program.constant(*predicate)
                    else {
                        return Err(Error::internal(format!(
                            "constant {predicate} is not a predicate"
                        )));
                    };
                    let args = params
                        .iter()
                        .map(|r| value(&frame, *r).cloned())
                        .collect::<Result<Vec<_>>>()?;
                    let end = self.pos;
                    let span = (self.report_start, end);
                    let outcome = func(&mut self.context(labels, args, end));
                    match outcome {
                        Ok(holds) => {
                            let result = if holds == *negate {
                                Cell::Failed
                            } else {
                                Cell::Value(Value::Null)
                            };
                            set(&mut frame, *dst, result)?;
                        }
                        Err(escape) => return Err(self.escape(escape, span)),
                    }
                }

                Opcode::SilentEnter => self.silent += 1,
                Opcode::SilentExit => {
                    self.silent = self
                        .silent
                        .checked_sub(1)
                        .ok_or_else(|| Error::internal("unbalanced silent exit"))?;
                }
                Opcode::Expect(idx) => {
                    let expectation = self.expectation(*idx)?;
                    self.fail(expectation);
                }
            }
        }

        match frame.get_mut(rule.result_slot).map(std::mem::take) {
            Some(Cell::Value(value)) => Ok(Some(value)),
            Some(Cell::Failed) => Ok(None),
            _ => Err(Error::internal(format!(
                "rule {} left no result in its result slot",
                rule.name
            ))),
        }
    }

    /// Builds the error for a failed or incomplete parse.
    fn syntax_error(&mut self, matched: bool) -> Error {
        let at = if matched {
            self.pos.max(self.failures.max_pos())
        } else {
            self.failures.max_pos()
        };
        let found = self.input.get(at..).and_then(|rest| rest.chars().next());
        let end = found.map_or(at, |c| at + c.len_utf8());
        let location = self.locator.location(self.input, at, end);
        let found = found.map(String::from);

        let expected = if matched {
            vec![Expectation::End]
        } else {
            self.failures.take_expected()
        };
        if expected.is_empty() {
            return Error::syntax(SyntaxError {
                message: format!("Unexpected {}.", describe_found(found.as_deref())),
                expected: Some(expected),
                found,
                location,
            });
        }
        Error::syntax(SyntaxError::expected(expected, found, location))
    }
}

/// Parses `input` from the rule at index `start`.
///
/// # Errors
/// Returns a [`pegmatite_foundation::ErrorKind::Syntax`] error when the input
/// does not match, and an internal error if the program is malformed.
pub fn execute(
    program: &Program,
    input: &str,
    start: usize,
    options: ParseOptions<'_>,
) -> Result<Value> {
    let ParseOptions {
        tracer, options, ..
    } = options;

    let state = program
        .initializer
        .as_ref()
        .map_or(Value::Null, |init| init(&options));

    let mut session = Session {
        program,
        input,
        pos: 0,
        silent: 0,
        failures: FailureTracker::new(),
        memo: HashMap::new(),
        locator: Locator::new(),
        report_start: 0,
        state,
        options,
        tracer,
    };

    match session.call_rule(start)? {
        Some(result) if session.pos == input.len() => Ok(result),
        Some(_) => Err(session.syntax_error(true)),
        None => Err(session.syntax_error(false)),
    }
}
