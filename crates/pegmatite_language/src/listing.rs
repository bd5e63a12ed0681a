//! Readable program listings.

use std::fmt::Write;

use pegmatite_foundation::{Expectation, expectation::literal_escape};

use crate::program::{Constant, Program};

/// Renders a program: a header, each rule's instructions with resolved jump
/// targets, and the constant pool.
#[must_use]
pub fn render(program: &Program) -> String {
    let mut out = String::new();
    // Writing to a String cannot fail.
    let _ = write_program(&mut out, program);
    out
}

fn write_program(out: &mut String, program: &Program) -> std::fmt::Result {
    writeln!(out, "; start rule: {}", program.start_rule)?;
    writeln!(
        out,
        "; allowed start rules: {}",
        program.allowed_start_rules.join(", ")
    )?;
    for (alias, target) in &program.aliases {
        writeln!(out, "; alias {alias} -> {target}")?;
    }
    writeln!(out, "; cache: {}, trace: {}", program.cache, program.trace)?;
    if program.initializer.is_some() {
        writeln!(out, "; initializer: bound")?;
    }

    for (index, rule) in program.rules.iter().enumerate() {
        writeln!(out)?;
        writeln!(
            out,
            "rule {index} {} (slots: {}, result: r{})",
            rule.name, rule.slot_count, rule.result_slot
        )?;
        for (ip, op) in rule.code.ops.iter().enumerate() {
            match rule.code.jump_target(ip) {
                Some(target) => writeln!(out, "  {ip:04}  {op}  -> {target:04}")?,
                None => writeln!(out, "  {ip:04}  {op}")?,
            }
        }
    }

    writeln!(out)?;
    writeln!(out, "constants")?;
    for (idx, constant) in program.constants.iter().enumerate() {
        write!(out, "  c{idx:<5} {:<10}", constant.kind())?;
        match constant {
            Constant::String(s) => writeln!(out, "\"{}\"", literal_escape(s))?,
            Constant::Class(class) => {
                let described = Expectation::Class {
                    parts: class.parts().to_vec(),
                    inverted: class.is_inverted(),
                    ignore_case: class.ignores_case(),
                }
                .describe();
                writeln!(out, "{described}")?;
            }
            Constant::Expectation(e) => writeln!(out, "{}", e.describe())?,
            Constant::Action { code, labels, .. } | Constant::Predicate { code, labels, .. } => {
                writeln!(out, "{{ {} }} ({})", code.trim(), labels.join(", "))?;
            }
        }
    }
    Ok(())
}
