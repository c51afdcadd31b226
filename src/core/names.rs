//! Name resolution: file-vs-directory inference, dot unescaping, source path
//! resolution, and name-replacement rules.
//!
//! A backslash immediately before a dot (`\.`) takes that dot out of extension
//! detection and is dropped from the final name, so `folder\.v2` is a
//! directory named `folder.v2`.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

/// Literal substring substitution applied to resolved names.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileNameReplacement
{
    pub search: String,
    pub replace: String,
}

impl FileNameReplacement
{
    pub fn new(
        search: impl Into<String>,
        replace: impl Into<String>,
    ) -> Self
    {
        Self { search: search.into(), replace: replace.into() }
    }

    /// Parse `SEARCH=REPLACE` as given on the command line.
    pub fn parse_pair(s: &str) -> Result<Self, String>
    {
        let (search, replace) = s
            .split_once('=')
            .ok_or_else(|| format!("expected SEARCH=REPLACE, got '{s}'"))?;
        if search.is_empty()
        {
            return Err("search text must not be empty".to_string());
        }
        Ok(Self::new(search, replace))
    }

    /// Replace every non-overlapping occurrence, left to right.
    /// An empty search string leaves the name untouched.
    pub fn apply(
        &self,
        name: &str,
    ) -> String
    {
        if self.search.is_empty()
        {
            return name.to_string();
        }
        name.replace(&self.search, &self.replace)
    }
}

/// Three-tier rule set: `all` applies to every name, then `files` or
/// `folders` depending on the entry kind. Each tier runs in declared order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Replacements
{
    pub all: Vec<FileNameReplacement>,
    pub files: Vec<FileNameReplacement>,
    pub folders: Vec<FileNameReplacement>,
}

impl Replacements
{
    pub fn is_empty(&self) -> bool
    {
        self.all.is_empty() && self.files.is_empty() && self.folders.is_empty()
    }

    /// Rules in application order for one kind of entry.
    pub fn rules_for(
        &self,
        is_directory: bool,
    ) -> impl Iterator<Item = &FileNameReplacement>
    {
        let tier = if is_directory { &self.folders } else { &self.files };
        self.all
            .iter()
            .chain(tier.iter())
    }

    pub fn apply(
        &self,
        name: &str,
        is_directory: bool,
    ) -> String
    {
        self.rules_for(is_directory)
            .fold(name.to_string(), |acc, rule| rule.apply(&acc))
    }

    /// Append `other`'s rules after ours, scope by scope.
    pub fn extend(
        &mut self,
        other: &Replacements,
    )
    {
        self.all
            .extend(other.all.iter().cloned());
        self.files
            .extend(other.files.iter().cloned());
        self.folders
            .extend(other.folders.iter().cloned());
    }
}

/// Stand-in for an escaped dot while looking for an extension.
const ESCAPED_DOT_MASK: char = '\u{0}';

/// Whether the basename carries an unescaped extension.
///
/// Mirrors `extname` rules: leading dots do not start an extension, so
/// `.github` has none while `.env.local` and `name.` do.
pub fn has_extension(name: &str) -> bool
{
    let masked = name.replace("\\.", &ESCAPED_DOT_MASK.to_string());
    let base = masked
        .trim_end_matches('/')
        .rsplit('/')
        .next()
        .unwrap_or("");
    base.trim_start_matches('.')
        .contains('.')
}

/// A name without an unescaped extension is a directory.
pub fn is_directory_name(name: &str) -> bool
{
    !has_extension(name)
}

/// Drop the backslash from every `\.`.
pub fn unescape(name: &str) -> String
{
    name.replace("\\.", ".")
}

/// Last path segment of a raw source, escapes intact.
pub fn source_basename(source: &str) -> &str
{
    let trimmed = source.trim_end_matches('/');
    trimmed
        .rsplit('/')
        .next()
        .filter(|s| !s.is_empty())
        .unwrap_or(trimmed)
}

/// Resolve a copy/move source: `~` expands to the home directory, other
/// relative paths are taken relative to `root`.
pub fn resolve_source(
    source: &str,
    root: &Path,
) -> PathBuf
{
    let unescaped = unescape(source);
    let expanded = shellexpand::tilde(&unescaped);
    let path = PathBuf::from(expanded.as_ref());
    if path.is_absolute() { path } else { root.join(path) }
}
