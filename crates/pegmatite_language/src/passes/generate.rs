//! Bytecode generation.
//!
//! Each expression compiles to a fixed template around its children's code.
//! The templates keep one contract: on success the result slot holds a value
//! and the position is past the match; on failure the result slot holds the
//! failed sentinel and the position is where the node started.

#![allow(clippy::too_many_lines)]

use std::collections::HashMap;

use pegmatite_foundation::{ClassPart, Error, ErrorContext, ErrorKind, Expectation, Result};
use tracing::debug;

use crate::ast::{ExprKind, Expression, Grammar, Rule, Slot};
use crate::charclass::CharClass;
use crate::opcode::{Bytecode, ConstIdx, Opcode, Reg};
use crate::options::{CompileOptions, Optimize};
use crate::program::{CompiledRule, Constant, Program};

fn reg(slot: Option<Slot>) -> Result<Reg> {
    let slot = slot.ok_or_else(|| Error::codegen("expression has no allocated slot"))?;
    Reg::try_from(slot).map_err(|_| Error::codegen(format!("slot index {slot} out of range")))
}

struct Generator<'a> {
    options: &'a CompileOptions,
    rule_index: &'a HashMap<String, usize>,
    constants: Vec<Constant>,
}

impl Generator<'_> {
    fn constant(&mut self, constant: Constant) -> Result<ConstIdx> {
        let idx = ConstIdx::try_from(self.constants.len())
            .map_err(|_| Error::codegen("constant pool overflow"))?;
        self.constants.push(constant);
        Ok(idx)
    }

    fn params(expr: &Expression) -> Result<(Vec<String>, Box<[Reg]>)> {
        let params = expr
            .slots
            .params
            .as_ref()
            .ok_or_else(|| Error::codegen("code site has no allocated params"))?;
        let labels = params.iter().map(|(label, _)| label.clone()).collect();
        let regs = params
            .iter()
            .map(|(_, slot)| reg(Some(*slot)))
            .collect::<Result<Vec<_>>>()?;
        Ok((labels, regs.into_boxed_slice()))
    }

    fn rule(&mut self, rule: &Rule) -> Result<CompiledRule> {
        let slot_count = rule
            .slot_count
            .ok_or_else(|| Error::codegen("rule has no slot allocation"))?;
        let result_slot = rule
            .expression
            .slots
            .result
            .ok_or_else(|| Error::codegen("rule has no result slot"))?;
        let result = reg(Some(result_slot))?;

        let mut code = Bytecode::new();
        if let Some(failure) = &rule.failure {
            code.emit(Opcode::SilentEnter);
            self.expression(&rule.expression, &mut code)?;
            code.emit(Opcode::SilentExit);
            let done = code.emit(Opcode::JumpIfNotFailed(result, 0));
            let expected = self.constant(Constant::Expectation(failure.clone()))?;
            code.emit(Opcode::Expect(expected));
            code.patch_jump(done, code.len())?;
        } else {
            self.expression(&rule.expression, &mut code)?;
        }

        Ok(CompiledRule {
            name: rule.name.clone(),
            code,
            slot_count,
            result_slot,
        })
    }

    fn expression(&mut self, expr: &Expression, code: &mut Bytecode) -> Result<()> {
        let dst = reg(expr.slots.result)?;
        match &expr.kind {
            ExprKind::Choice(alternatives) => {
                if alternatives.is_empty() {
                    code.emit(Opcode::LoadFailed(dst));
                    return Ok(());
                }
                let mut exits = Vec::new();
                for (i, alternative) in alternatives.iter().enumerate() {
                    self.expression(alternative, code)?;
                    if i + 1 < alternatives.len() {
                        exits.push(code.emit(Opcode::JumpIfNotFailed(dst, 0)));
                    }
                }
                for exit in exits {
                    code.patch_jump(exit, code.len())?;
                }
            }

            ExprKind::Sequence(elements) => {
                let position = reg(expr.slots.position)?;
                code.emit(Opcode::SavePos(position));
                let mut fails = Vec::with_capacity(elements.len());
                let mut slots = Vec::with_capacity(elements.len());
                for element in elements {
                    self.expression(element, code)?;
                    let slot = reg(element.slots.result)?;
                    slots.push(slot);
                    fails.push(code.emit(Opcode::JumpIfFailed(slot, 0)));
                }
                code.emit(Opcode::Wrap {
                    elements: slots.into_boxed_slice(),
                    dst,
                });
                if !fails.is_empty() {
                    let done = code.emit(Opcode::Jump(0));
                    for fail in fails {
                        code.patch_jump(fail, code.len())?;
                    }
                    code.emit(Opcode::RestorePos(position));
                    code.emit(Opcode::LoadFailed(dst));
                    code.patch_jump(done, code.len())?;
                }
            }

            ExprKind::Labeled { expression, .. } | ExprKind::Group(expression) => {
                self.expression(expression, code)?;
            }

            ExprKind::Action {
                expression,
                code: source,
            } => {
                let position = reg(expr.slots.position)?;
                code.emit(Opcode::SavePos(position));
                self.expression(expression, code)?;
                let skip = code.emit(Opcode::JumpIfFailed(dst, 0));
                code.emit(Opcode::ReportSavedPos(position));
                let (labels, params) = Self::params(expr)?;
                let func = self
                    .options
                    .bindings
                    .action(source)
                    .cloned()
                    .ok_or_else(|| Error::new(ErrorKind::UnboundCode(source.trim().to_string())))?;
                let action = self.constant(Constant::Action {
                    code: source.clone(),
                    labels,
                    func,
                })?;
                code.emit(Opcode::CallAction {
                    action,
                    params,
                    dst,
                });
                code.patch_jump(skip, code.len())?;
            }

            ExprKind::Text(expression) => {
                let position = reg(expr.slots.position)?;
                code.emit(Opcode::SavePos(position));
                self.expression(expression, code)?;
                let skip = code.emit(Opcode::JumpIfFailed(dst, 0));
                code.emit(Opcode::Text {
                    start: position,
                    dst,
                });
                code.patch_jump(skip, code.len())?;
            }

            ExprKind::SimpleAnd(expression) => {
                let position = reg(expr.slots.position)?;
                self.lookahead(expression, position, code)?;
                let skip = code.emit(Opcode::JumpIfFailed(dst, 0));
                code.emit(Opcode::LoadNull(dst));
                code.patch_jump(skip, code.len())?;
            }

            ExprKind::SimpleNot(expression) => {
                let position = reg(expr.slots.position)?;
                self.lookahead(expression, position, code)?;
                let succeed = code.emit(Opcode::JumpIfFailed(dst, 0));
                code.emit(Opcode::LoadFailed(dst));
                let done = code.emit(Opcode::Jump(0));
                code.patch_jump(succeed, code.len())?;
                code.emit(Opcode::LoadNull(dst));
                code.patch_jump(done, code.len())?;
            }

            ExprKind::Optional(expression) => {
                self.expression(expression, code)?;
                let skip = code.emit(Opcode::JumpIfNotFailed(dst, 0));
                code.emit(Opcode::LoadNull(dst));
                code.patch_jump(skip, code.len())?;
            }

            ExprKind::ZeroOrMore(expression) | ExprKind::OneOrMore(expression) => {
                let item = reg(expression.slots.result)?;
                code.emit(Opcode::NewArray(dst));
                let top = code.len();
                self.expression(expression, code)?;
                let exit = code.emit(Opcode::JumpIfFailed(item, 0));
                code.emit(Opcode::Append { array: dst, item });
                code.emit_jump_back(Opcode::Jump(0), top)?;
                code.patch_jump(exit, code.len())?;
                if matches!(expr.kind, ExprKind::OneOrMore(_)) {
                    code.emit(Opcode::FailIfEmpty(dst));
                }
            }

            ExprKind::SemanticAnd(source) | ExprKind::SemanticNot(source) => {
                code.emit(Opcode::ReportCurrPos);
                let (labels, params) = Self::params(expr)?;
                let func = self
                    .options
                    .bindings
                    .predicate(source)
                    .cloned()
                    .ok_or_else(|| Error::new(ErrorKind::UnboundCode(source.trim().to_string())))?;
                let predicate = self.constant(Constant::Predicate {
                    code: source.clone(),
                    labels,
                    func,
                })?;
                code.emit(Opcode::CallPredicate {
                    predicate,
                    params,
                    negate: matches!(expr.kind, ExprKind::SemanticNot(_)),
                    dst,
                });
            }

            ExprKind::RuleRef(name) => {
                let index = *self
                    .rule_index
                    .get(name)
                    .ok_or_else(|| Error::missing_rule(name))?;
                let rule = u16::try_from(index)
                    .map_err(|_| Error::codegen("too many rules for a rule operand"))?;
                code.emit(Opcode::CallRule { rule, dst });
            }

            ExprKind::Literal { value, ignore_case } => {
                self.literal(value, *ignore_case, dst, code)?;
            }

            ExprKind::Class {
                parts,
                inverted,
                ignore_case,
            } => {
                for part in parts {
                    if let ClassPart::Range(start, end) = *part {
                        if start > end {
                            return Err(Error::new(ErrorKind::InvalidCharacterRange { start, end }));
                        }
                    }
                }
                let class = self.constant(Constant::Class(CharClass::new(
                    parts,
                    *inverted,
                    *ignore_case,
                    self.options.optimize,
                )))?;
                let expected = self.constant(Constant::Expectation(Expectation::Class {
                    parts: parts.clone(),
                    inverted: *inverted,
                    ignore_case: *ignore_case,
                }))?;
                code.emit(Opcode::MatchClass {
                    class,
                    expected,
                    dst,
                });
            }

            ExprKind::Any => {
                code.emit(Opcode::MatchAny(dst));
            }
        }
        Ok(())
    }

    /// Runs `expression` silently, then puts the position back.
    fn lookahead(&mut self, expression: &Expression, position: Reg, code: &mut Bytecode) -> Result<()> {
        code.emit(Opcode::SavePos(position));
        code.emit(Opcode::SilentEnter);
        self.expression(expression, code)?;
        code.emit(Opcode::SilentExit);
        code.emit(Opcode::RestorePos(position));
        Ok(())
    }

    fn literal(&mut self, value: &str, ignore_case: bool, dst: Reg, code: &mut Bytecode) -> Result<()> {
        let speed = self.options.optimize == Optimize::Speed;

        if speed && value.is_empty() {
            let literal = self.constant(Constant::String(value.into()))?;
            code.emit(Opcode::LoadString(dst, literal));
            return Ok(());
        }

        if ignore_case {
            let literal = self.constant(Constant::String(value.to_lowercase().into()))?;
            let expected = self.constant(Constant::Expectation(Expectation::literal(value, true)))?;
            code.emit(Opcode::MatchLiteralIc {
                literal,
                expected,
                dst,
            });
            return Ok(());
        }

        let literal = self.constant(Constant::String(value.into()))?;
        let expected = self.constant(Constant::Expectation(Expectation::literal(value, false)))?;
        let mut chars = value.chars();
        match (chars.next(), chars.next()) {
            (Some(ch), None) if speed => code.emit(Opcode::MatchChar {
                ch,
                literal,
                expected,
                dst,
            }),
            _ => code.emit(Opcode::MatchLiteral {
                literal,
                expected,
                dst,
            }),
        };
        Ok(())
    }
}

fn allowed_start_rules(grammar: &Grammar, options: &CompileOptions) -> Vec<String> {
    if options.allows_all_start_rules() {
        return grammar.rules.iter().map(|r| r.name.clone()).collect();
    }
    if options.allowed_start_rules.is_empty() {
        return vec![grammar.start_rule.clone()];
    }
    let mut allowed: Vec<String> = Vec::new();
    for name in &options.allowed_start_rules {
        let resolved = grammar.resolve(name);
        if !allowed.iter().any(|r| r == resolved) {
            allowed.push(resolved.to_string());
        }
    }
    allowed
}

/// Compiles every rule to bytecode and leaves the [`Program`] on the grammar.
///
/// # Errors
/// Fails on unbound code, invalid class ranges, and operand overflow.
pub fn generate_bytecode(grammar: &mut Grammar, options: &CompileOptions) -> Result<()> {
    let rule_index: HashMap<String, usize> = grammar
        .rules
        .iter()
        .enumerate()
        .map(|(i, r)| (r.name.clone(), i))
        .collect();

    let mut generator = Generator {
        options,
        rule_index: &rule_index,
        constants: Vec::new(),
    };
    let mut rules = Vec::with_capacity(grammar.rules.len());
    for rule in &grammar.rules {
        let compiled = generator.rule(rule).map_err(|e| {
            let mut context = ErrorContext::new().with_rule(&rule.name);
            if let Some(location) = rule.location {
                context = context.with_location(location);
            }
            e.with_context(context)
        })?;
        rules.push(compiled);
    }

    let initializer = match &grammar.initializer {
        Some(source) => Some(
            options
                .bindings
                .initializer()
                .cloned()
                .ok_or_else(|| Error::new(ErrorKind::UnboundCode(source.trim().to_string())))?,
        ),
        None => None,
    };

    let program = Program {
        rules,
        constants: generator.constants,
        allowed_start_rules: allowed_start_rules(grammar, options),
        start_rule: grammar.start_rule.clone(),
        aliases: grammar.aliases.clone(),
        rule_index,
        cache: options.cache,
        trace: options.trace,
        initializer,
    };
    debug!(
        rules = program.rules.len(),
        constants = program.constants.len(),
        instructions = program.instruction_count(),
        "generated bytecode"
    );
    grammar.program = Some(program);
    Ok(())
}
