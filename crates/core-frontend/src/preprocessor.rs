//! A hand-written conditional-compilation scanner standing in for the real
//! preprocessor's callback stream (§4.7).
//!
//! `tree-sitter-cpp` parses `#if`/`#ifdef`/... directive *structure* but does
//! not evaluate conditions; it has no macro table. This module re-implements
//! just enough of that evaluation (integer literals, `defined(X)`,
//! `!defined(X)`, and bare identifiers looked up in the `-D`-derived macro
//! map) to decide which branches were *not* taken, conservatively treating
//! anything more complex as taken so uncertain code is never deleted.

use std::collections::{HashMap, HashSet};

use core_model::{InactivePreprocBlock, SourceRange};

struct Frame {
    /// Whether every ancestor `#if` chain's currently active branch is taken.
    /// An inactive ancestor makes everything inside it inactive regardless of
    /// this frame's own condition.
    parent_active: bool,
    taken: bool,
    any_true: bool,
    /// True once this chain has seen a `#elif`/`#else`. A chain that never
    /// branches and was never taken can have its directive lines removed
    /// along with its body (scenario 5); a chain with multiple arms keeps
    /// its `#if`/`#elif`/`#else`/`#endif` lines, since other arms may still
    /// be active and need them.
    had_siblings: bool,
    /// Start of the line carrying the opening `#if`/`#ifdef`/`#ifndef`.
    directive_start: u32,
    branch_start: u32,
    referenced_macros: HashSet<String>,
}

/// Scan `source` for conditional-compilation directives and return every
/// branch the scanner determined was not taken, each carrying the macro
/// identifiers its controlling expression referenced. Branches nested inside
/// an already-inactive ancestor are not reported separately, the ancestor's
/// range already covers them.
pub fn scan_inactive_blocks(
    source: &str,
    macros: &HashMap<String, String>,
) -> Vec<InactivePreprocBlock> {
    let mut blocks = Vec::new();
    let mut stack: Vec<Frame> = Vec::new();
    let mut offset: u32 = 0;

    for line in source.split_inclusive('\n') {
        let line_len = line.len() as u32;
        let line_start = offset;
        let line_end = offset + line_len;
        offset = line_end;

        let Some(rest) = line.trim_start().strip_prefix('#') else {
            continue;
        };
        let rest = rest.trim_start();

        if let Some(name) = rest.strip_prefix("ifdef") {
            let name = name.trim().to_string();
            let parent_active = stack.iter().all(|f| f.taken);
            let taken = macros.contains_key(&name);
            stack.push(Frame {
                parent_active,
                taken,
                any_true: taken,
                had_siblings: false,
                directive_start: line_start,
                branch_start: line_end,
                referenced_macros: HashSet::from([name]),
            });
        } else if let Some(name) = rest.strip_prefix("ifndef") {
            let name = name.trim().to_string();
            let parent_active = stack.iter().all(|f| f.taken);
            let taken = !macros.contains_key(&name);
            stack.push(Frame {
                parent_active,
                taken,
                any_true: taken,
                had_siblings: false,
                directive_start: line_start,
                branch_start: line_end,
                referenced_macros: HashSet::from([name]),
            });
        } else if let Some(cond) = rest.strip_prefix("if") {
            let parent_active = stack.iter().all(|f| f.taken);
            let (taken, refs) = eval_condition(cond.trim(), macros);
            stack.push(Frame {
                parent_active,
                taken,
                any_true: taken,
                had_siblings: false,
                directive_start: line_start,
                branch_start: line_end,
                referenced_macros: refs,
            });
        } else if let Some(cond) = rest.strip_prefix("elif") {
            if let Some(frame) = stack.last_mut() {
                close_branch(&mut blocks, frame, line_start, None);
                frame.had_siblings = true;
                if frame.any_true {
                    frame.taken = false;
                    frame.referenced_macros = HashSet::new();
                } else {
                    let (taken, refs) = eval_condition(cond.trim(), macros);
                    frame.any_true = frame.any_true || taken;
                    frame.taken = taken;
                    frame.referenced_macros = refs;
                }
                frame.branch_start = line_end;
            }
        } else if rest.starts_with("else") {
            if let Some(frame) = stack.last_mut() {
                close_branch(&mut blocks, frame, line_start, None);
                frame.had_siblings = true;
                frame.taken = !frame.any_true;
                frame.any_true = true;
                frame.referenced_macros = HashSet::new();
                frame.branch_start = line_end;
            }
        } else if rest.starts_with("endif") {
            if let Some(frame) = stack.pop() {
                let full_bounds = (!frame.had_siblings).then_some((frame.directive_start, line_end));
                close_branch(&mut blocks, &frame, line_start, full_bounds);
            }
        }
    }

    blocks
}

fn close_branch(blocks: &mut Vec<InactivePreprocBlock>, frame: &Frame, branch_end: u32, full_bounds: Option<(u32, u32)>) {
    if frame.parent_active && !frame.taken && branch_end > frame.branch_start {
        let (start, end) = full_bounds.unwrap_or((frame.branch_start, branch_end));
        blocks.push(InactivePreprocBlock {
            range: SourceRange::new(start, end),
            referenced_macros: frame.referenced_macros.clone(),
        });
    }
}

fn eval_condition(cond: &str, macros: &HashMap<String, String>) -> (bool, HashSet<String>) {
    if let Some(name) = extract_defined(cond) {
        let taken = macros.contains_key(&name);
        return (taken, HashSet::from([name]));
    }
    if let Some(rest) = cond.strip_prefix('!') {
        if let Some(name) = extract_defined(rest.trim()) {
            let taken = !macros.contains_key(&name);
            return (taken, HashSet::from([name]));
        }
    }

    if let Ok(n) = cond.trim().parse::<i64>() {
        return (n != 0, HashSet::new());
    }

    let refs = collect_identifiers(cond);
    if refs.len() == 1 {
        let name = refs.iter().next().unwrap().clone();
        let taken = match macros.get(&name) {
            Some(value) => value.trim().parse::<i64>().map(|n| n != 0).unwrap_or(true),
            None => false, // an undefined identifier in #if evaluates to 0
        };
        return (taken, refs);
    }

    // Anything more complex (arithmetic, `&&`/`||`, multiple macros): bias
    // toward keeping the branch active rather than guessing wrong.
    (true, refs)
}

fn extract_defined(cond: &str) -> Option<String> {
    let rest = cond.trim().strip_prefix("defined")?.trim();
    let name = rest
        .strip_prefix('(')
        .and_then(|s| s.strip_suffix(')'))
        .unwrap_or(rest)
        .trim();
    let first = name.chars().next()?;
    if first.is_alphabetic() || first == '_' {
        Some(name.to_string())
    } else {
        None
    }
}

fn collect_identifiers(cond: &str) -> HashSet<String> {
    let mut out = HashSet::new();
    let mut start = None;
    let mut push = |out: &mut HashSet<String>, s: &str, from: usize, to: usize| {
        let ident = &s[from..to];
        if ident != "defined" {
            out.insert(ident.to_string());
        }
    };
    for (i, c) in cond.char_indices() {
        if c.is_alphanumeric() || c == '_' {
            if start.is_none() {
                start = Some(i);
            }
        } else if let Some(s) = start.take() {
            push(&mut out, cond, s, i);
        }
    }
    if let Some(s) = start {
        push(&mut out, cond, s, cond.len());
    }
    out
}
