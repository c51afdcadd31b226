//! Emmet-style repeaters: `name_$*3` becomes `name_1`, `name_2`, `name_3`.
//!
//! Expansion is textual and runs before any other parsing. Lines indented
//! deeper than a repeater line form its subtree and are replicated (and
//! re-expanded) once per repetition.

use std::sync::LazyLock;

use regex::Regex;

use crate::core::line::depth_of;

/// Upper bound on repetitions for a single repeater line.
pub const MAX_REPEAT_COUNT: usize = 1000;

/// Upper bound on the lines a whole document may expand to.
pub const MAX_EXPANDED_LINES: usize = 100_000;

/// Expansion would exceed the line budget.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[error("repeaters expand to more than {limit} lines")]
pub struct ExpansionLimit
{
    pub limit: usize,
}

static REPEAT_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\$\*(\d+)").expect("repeat pattern compiles"));

/// Expand every repeater in `input` within [`MAX_EXPANDED_LINES`].
pub fn expand(input: &str) -> Result<String, ExpansionLimit>
{
    let lines: Vec<&str> = input.lines().collect();
    Ok(expand_lines(&lines, MAX_EXPANDED_LINES)?.join("\n"))
}

/// Expand a slice of lines without touching the input. Fails as soon as the
/// output grows past `limit` lines, so nested repeaters never materialise
/// their full product.
pub fn expand_lines(
    lines: &[&str],
    limit: usize,
) -> Result<Vec<String>, ExpansionLimit>
{
    let mut out = Vec::with_capacity(lines.len().min(limit));
    let mut i = 0;

    while i < lines.len()
    {
        let line = lines[i];
        let Some(count) = repeat_count(line)
        else
        {
            out.push(line.to_string());
            check_budget(out.len(), limit)?;
            i += 1;
            continue;
        };

        let end = subtree_end(lines, i);
        let count = count.min(MAX_REPEAT_COUNT);
        let subtree = if count > 0 { expand_lines(&lines[i + 1..end], limit)? } else { Vec::new() };

        for n in 1..=count
        {
            out.push(substitute(line, n));
            out.extend(subtree.iter().cloned());
            check_budget(out.len(), limit)?;
        }

        i = end;
    }

    Ok(out)
}

fn check_budget(
    len: usize,
    limit: usize,
) -> Result<(), ExpansionLimit>
{
    if len > limit { Err(ExpansionLimit { limit }) } else { Ok(()) }
}

/// The shared repeat count of a line, or `None` if it has no tokens or the
/// tokens disagree.
pub fn repeat_count(line: &str) -> Option<usize>
{
    let mut counts = REPEAT_RE
        .captures_iter(line)
        .map(|c| parse_count(&c[1]));

    let first = counts.next()?;
    counts
        .all(|c| c == first)
        .then_some(first)
}

/// Digits that overflow `usize` still mean "as many as allowed".
fn parse_count(digits: &str) -> usize
{
    digits
        .parse::<usize>()
        .unwrap_or(usize::MAX)
}

fn substitute(
    line: &str,
    n: usize,
) -> String
{
    REPEAT_RE
        .replace_all(line, n.to_string().as_str())
        .into_owned()
}

/// Exclusive end of the block indented deeper than `lines[start]`.
/// Blank lines inside the block are kept, trailing ones are not.
fn subtree_end(
    lines: &[&str],
    start: usize,
) -> usize
{
    let depth = depth_of(lines[start]);
    let mut end = start + 1;

    for (j, line) in lines
        .iter()
        .enumerate()
        .skip(start + 1)
    {
        if line.trim().is_empty()
        {
            continue;
        }
        if depth_of(line) <= depth
        {
            break;
        }
        end = j + 1;
    }

    end
}
