//! Per-line classification: indentation depth and directive shape.

use std::sync::LazyLock;

use regex::Regex;

/// Spaces per indentation level.
pub const SPACES_PER_LEVEL: usize = 4;

static MOVE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^\((.+)\)\s*(?:>\s*(.+))?$").expect("move pattern compiles")
});

static COPY_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^\[(.+)\]\s*(?:>\s*(.+))?$").expect("copy pattern compiles")
});

/// Leading whitespace of one line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Indent
{
    None,
    Tabs(usize),
    Spaces(usize),
    Mixed
    {
        tabs: usize, spaces: usize
    },
}

impl Indent
{
    pub fn measure(line: &str) -> Self
    {
        let (mut tabs, mut spaces) = (0, 0);
        for c in line.chars()
        {
            match c
            {
                '\t' => tabs += 1,
                ' ' => spaces += 1,
                _ => break,
            }
        }

        match (tabs, spaces)
        {
            (0, 0) => Indent::None,
            (t, 0) => Indent::Tabs(t),
            (0, s) => Indent::Spaces(s),
            (tabs, spaces) => Indent::Mixed { tabs, spaces },
        }
    }

    /// Tab count, or spaces divided by four.
    pub fn depth(self) -> usize
    {
        match self
        {
            Indent::None => 0,
            Indent::Tabs(t) => t,
            Indent::Spaces(s) => s / SPACES_PER_LEVEL,
            Indent::Mixed { tabs, spaces } => tabs + spaces / SPACES_PER_LEVEL,
        }
    }
}

/// Indentation depth of a raw line.
pub fn depth_of(line: &str) -> usize
{
    Indent::measure(line).depth()
}

/// Shape of one directive.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LineKind
{
    /// Plain name.
    Create
    {
        name: String
    },
    /// `[source]` or `[source] > target`.
    Copy
    {
        source: String, target: Option<String>
    },
    /// `(source)` or `(source) > target`.
    Move
    {
        source: String, target: Option<String>
    },
}

impl LineKind
{
    /// Classify a trimmed line. Move wins over copy, anything else is a create.
    pub fn classify(trimmed: &str) -> Self
    {
        if let Some((source, target)) = split_transfer(&MOVE_RE, trimmed)
        {
            return LineKind::Move { source, target };
        }
        if let Some((source, target)) = split_transfer(&COPY_RE, trimmed)
        {
            return LineKind::Copy { source, target };
        }
        LineKind::Create { name: trimmed.to_string() }
    }
}

fn split_transfer(
    re: &Regex,
    s: &str,
) -> Option<(String, Option<String>)>
{
    let caps = re.captures(s)?;
    let source = caps
        .get(1)?
        .as_str()
        .trim();
    if source.is_empty()
    {
        return None;
    }
    let target = caps
        .get(2)
        .map(|m| m.as_str().trim().to_string())
        .filter(|t| !t.is_empty());
    Some((source.to_string(), target))
}

/// One non-blank body line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedLine
{
    /// 1-based line number within the expanded body.
    pub number: usize,
    pub indent: Indent,
    pub kind: LineKind,
}

impl ParsedLine
{
    /// `None` for blank lines.
    pub fn parse(
        number: usize,
        raw: &str,
    ) -> Option<Self>
    {
        let trimmed = raw.trim();
        if trimmed.is_empty()
        {
            return None;
        }
        Some(Self { number, indent: Indent::measure(raw), kind: LineKind::classify(trimmed) })
    }

    pub fn depth(&self) -> usize
    {
        self.indent.depth()
    }
}
