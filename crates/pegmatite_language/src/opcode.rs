//! Bytecode instruction set for the Pegmatite matcher VM.
//!
//! Instructions address the slots of the current rule invocation's frame.
//! A slot holds a match value, the failed sentinel, or a saved position.
//! Jump offsets are relative to the instruction after the jump.

#![allow(clippy::doc_markdown)]

use std::fmt;

use pegmatite_foundation::{Error, Result};

/// Frame slot operand.
pub type Reg = u16;

/// Constant pool index operand.
pub type ConstIdx = u16;

/// A single bytecode instruction.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Opcode {
    // === Positions ===
    /// Save the current position into a slot.
    SavePos(Reg),
    /// Restore the current position from a slot.
    RestorePos(Reg),

    // === Values ===
    /// Store the null value (a successful empty match).
    LoadNull(Reg),
    /// Store the failed sentinel.
    LoadFailed(Reg),
    /// Store a string constant (a successful match).
    LoadString(Reg, ConstIdx),
    /// Store an empty array.
    NewArray(Reg),
    /// Append `item` to the array in `array`.
    Append {
        /// Slot holding the array.
        array: Reg,
        /// Slot holding the item.
        item: Reg,
    },
    /// Collect slots into an array: `dst = [elements...]`.
    Wrap {
        /// Element slots, in order.
        elements: Box<[Reg]>,
        /// Destination slot.
        dst: Reg,
    },
    /// Store the input text from the saved position to the current one.
    Text {
        /// Slot holding the start position.
        start: Reg,
        /// Destination slot.
        dst: Reg,
    },
    /// Replace an empty array with the failed sentinel.
    FailIfEmpty(Reg),

    // === Control Flow ===
    /// Unconditional jump (relative offset).
    Jump(i16),
    /// Jump if the slot holds the failed sentinel.
    JumpIfFailed(Reg, i16),
    /// Jump if the slot holds a value.
    JumpIfNotFailed(Reg, i16),

    // === Matching ===
    /// Match a string constant exactly.
    MatchLiteral {
        /// String constant.
        literal: ConstIdx,
        /// Expectation constant recorded on failure.
        expected: ConstIdx,
        /// Destination slot.
        dst: Reg,
    },
    /// Match a lowercased string constant case-insensitively; the result is
    /// the input text.
    MatchLiteralIc {
        /// Lowercased string constant.
        literal: ConstIdx,
        /// Expectation constant recorded on failure.
        expected: ConstIdx,
        /// Destination slot.
        dst: Reg,
    },
    /// Match one character; the result is the string constant.
    MatchChar {
        /// The character.
        ch: char,
        /// String constant holding the character.
        literal: ConstIdx,
        /// Expectation constant recorded on failure.
        expected: ConstIdx,
        /// Destination slot.
        dst: Reg,
    },
    /// Match one character against a class constant.
    MatchClass {
        /// Class constant.
        class: ConstIdx,
        /// Expectation constant recorded on failure.
        expected: ConstIdx,
        /// Destination slot.
        dst: Reg,
    },
    /// Match any one character.
    MatchAny(Reg),
    /// Invoke a rule, through the cache when enabled.
    CallRule {
        /// Rule index.
        rule: u16,
        /// Destination slot.
        dst: Reg,
    },

    // === Code ===
    /// Anchor the next action's span at a saved position.
    ReportSavedPos(Reg),
    /// Anchor the next call's span at the current position.
    ReportCurrPos,
    /// Invoke an action; its result replaces the match value in `dst`.
    CallAction {
        /// Action constant.
        action: ConstIdx,
        /// Label slots, in label order.
        params: Box<[Reg]>,
        /// Destination slot.
        dst: Reg,
    },
    /// Invoke a semantic predicate; `dst` is null on success, failed otherwise.
    CallPredicate {
        /// Predicate constant.
        predicate: ConstIdx,
        /// Label slots, in label order.
        params: Box<[Reg]>,
        /// Invert the result (`!{ ... }`).
        negate: bool,
        /// Destination slot.
        dst: Reg,
    },

    // === Failure Reporting ===
    /// Suppress expectation recording.
    SilentEnter,
    /// Undo one `SilentEnter`.
    SilentExit,
    /// Record an expectation constant at the current position.
    Expect(ConstIdx),
}

impl Opcode {
    /// Returns the mnemonic.
    #[must_use]
    pub const fn name(&self) -> &'static str {
        match self {
            Self::SavePos(_) => "SAVE_POS",
            Self::RestorePos(_) => "RESTORE_POS",
            Self::LoadNull(_) => "LOAD_NULL",
            Self::LoadFailed(_) => "LOAD_FAILED",
            Self::LoadString(..) => "LOAD_STRING",
            Self::NewArray(_) => "NEW_ARRAY",
            Self::Append { .. } => "APPEND",
            Self::Wrap { .. } => "WRAP",
            Self::Text { .. } => "TEXT",
            Self::FailIfEmpty(_) => "FAIL_IF_EMPTY",
            Self::Jump(_) => "JUMP",
            Self::JumpIfFailed(..) => "JUMP_IF_FAILED",
            Self::JumpIfNotFailed(..) => "JUMP_IF_NOT_FAILED",
            Self::MatchLiteral { .. } => "MATCH_LITERAL",
            Self::MatchLiteralIc { .. } => "MATCH_LITERAL_IC",
            Self::MatchChar { .. } => "MATCH_CHAR",
            Self::MatchClass { .. } => "MATCH_CLASS",
            Self::MatchAny(_) => "MATCH_ANY",
            Self::CallRule { .. } => "CALL_RULE",
            Self::ReportSavedPos(_) => "REPORT_SAVED_POS",
            Self::ReportCurrPos => "REPORT_CURR_POS",
            Self::CallAction { .. } => "CALL_ACTION",
            Self::CallPredicate { .. } => "CALL_PREDICATE",
            Self::SilentEnter => "SILENT_ENTER",
            Self::SilentExit => "SILENT_EXIT",
            Self::Expect(_) => "EXPECT",
        }
    }

    /// Returns the jump offset, if this is a jump.
    #[must_use]
    pub const fn jump_offset(&self) -> Option<i16> {
        match self {
            Self::Jump(o) | Self::JumpIfFailed(_, o) | Self::JumpIfNotFailed(_, o) => Some(*o),
            _ => None,
        }
    }
}

fn regs(f: &mut fmt::Formatter<'_>, slots: &[Reg]) -> fmt::Result {
    write!(f, "[")?;
    for (i, r) in slots.iter().enumerate() {
        if i > 0 {
            write!(f, ", ")?;
        }
        write!(f, "r{r}")?;
    }
    write!(f, "]")
}

/// Operands only; jump targets are rendered by the listing, which knows the
/// instruction index.
impl fmt::Display for Opcode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())?;
        match self {
            Self::SavePos(r)
            | Self::RestorePos(r)
            | Self::LoadNull(r)
            | Self::LoadFailed(r)
            | Self::NewArray(r)
            | Self::FailIfEmpty(r)
            | Self::MatchAny(r)
            | Self::ReportSavedPos(r) => write!(f, " r{r}"),
            Self::LoadString(r, c) => write!(f, " r{r}, c{c}"),
            Self::Append { array, item } => write!(f, " r{array}, r{item}"),
            Self::Wrap { elements, dst } => {
                write!(f, " r{dst}, ")?;
                regs(f, elements)
            }
            Self::Text { start, dst } => write!(f, " r{dst}, r{start}"),
            Self::Jump(o) => write!(f, " {o:+}"),
            Self::JumpIfFailed(r, o) | Self::JumpIfNotFailed(r, o) => write!(f, " r{r}, {o:+}"),
            Self::MatchLiteral {
                literal,
                expected,
                dst,
            }
            | Self::MatchLiteralIc {
                literal,
                expected,
                dst,
            } => write!(f, " r{dst}, c{literal}, c{expected}"),
            Self::MatchChar {
                ch,
                literal,
                expected,
                dst,
            } => write!(f, " r{dst}, {ch:?}, c{literal}, c{expected}"),
            Self::MatchClass {
                class,
                expected,
                dst,
            } => write!(f, " r{dst}, c{class}, c{expected}"),
            Self::CallRule { rule, dst } => write!(f, " r{dst}, rule{rule}"),
            Self::CallAction {
                action,
                params,
                dst,
            } => {
                write!(f, " r{dst}, c{action}, ")?;
                regs(f, params)
            }
            Self::CallPredicate {
                predicate,
                params,
                negate,
                dst,
            } => {
                write!(f, " r{dst}, c{predicate}, ")?;
                regs(f, params)?;
                if *negate {
                    write!(f, ", not")?;
                }
                Ok(())
            }
            Self::Expect(c) => write!(f, " c{c}"),
            Self::ReportCurrPos | Self::SilentEnter | Self::SilentExit => Ok(()),
        }
    }
}

/// A sequence of bytecode instructions.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Bytecode {
    /// The instructions.
    pub ops: Vec<Opcode>,
}

impl Bytecode {
    /// Creates an empty bytecode sequence.
    #[must_use]
    pub fn new() -> Self {
        Self { ops: Vec::new() }
    }

    /// Adds an instruction and returns its index.
    pub fn emit(&mut self, op: Opcode) -> usize {
        let idx = self.ops.len();
        self.ops.push(op);
        idx
    }

    /// Returns the current instruction count (next instruction index).
    #[must_use]
    pub fn len(&self) -> usize {
        self.ops.len()
    }

    /// Returns true if there are no instructions.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.ops.is_empty()
    }

    /// Points the jump at `idx` to the instruction index `target`.
    ///
    /// # Errors
    /// Fails if `idx` is not a jump or the offset does not fit in an `i16`.
    pub fn patch_jump(&mut self, idx: usize, target: usize) -> Result<()> {
        let offset = isize::try_from(target)
            .ok()
            .zip(isize::try_from(idx + 1).ok())
            .and_then(|(t, from)| i16::try_from(t - from).ok())
            .ok_or_else(|| Error::codegen("jump offset too large"))?;
        match self.ops.get_mut(idx) {
            Some(Opcode::Jump(o) | Opcode::JumpIfFailed(_, o) | Opcode::JumpIfNotFailed(_, o)) => {
                *o = offset;
                Ok(())
            }
            Some(other) => Err(Error::codegen(format!(
                "cannot patch non-jump instruction: {}",
                other.name()
            ))),
            None => Err(Error::codegen(format!("no instruction at {idx}"))),
        }
    }

    /// Emits a jump and immediately points it at an earlier `target`.
    ///
    /// # Errors
    /// Fails if the offset does not fit in an `i16`.
    pub fn emit_jump_back(&mut self, op: Opcode, target: usize) -> Result<()> {
        let idx = self.emit(op);
        self.patch_jump(idx, target)
    }

    /// Resolves the absolute target of the jump at `idx`.
    #[must_use]
    pub fn jump_target(&self, idx: usize) -> Option<usize> {
        let offset = self.ops.get(idx)?.jump_offset()?;
        (idx + 1).checked_add_signed(isize::from(offset))
    }
}
