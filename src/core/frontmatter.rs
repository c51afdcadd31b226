//! Optional YAML front matter ahead of the structure body.
//!
//! ```text
//! ---
//! fileReplacements:
//!   - { search: "_file", replace: "-file" }
//! folderReplacements:
//!   - { search: "folder", replace: "bar" }
//! ---
//! folder
//!     name_file.ts
//! ```
//!
//! A block that fails to parse is not an error: the whole input is then
//! treated as body.

use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::core::names::{FileNameReplacement, Replacements};

static FRONTMATTER_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?s)\A\s*---[ \t]*\r?\n(?:(.*?)\r?\n)?---[ \t]*(?:\r?\n|\z)")
        .expect("front matter pattern compiles")
});

/// Name-replacement rules declared in front matter.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct StructureFrontmatter
{
    pub file_replacements: Vec<FileNameReplacement>,
    pub folder_replacements: Vec<FileNameReplacement>,
}

impl StructureFrontmatter
{
    /// As a rule set with empty `all` tier.
    pub fn as_replacements(&self) -> Replacements
    {
        Replacements {
            all: Vec::new(),
            files: self.file_replacements.clone(),
            folders: self.folder_replacements.clone(),
        }
    }
}

/// Front matter split from its body.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Extracted<'a>
{
    pub frontmatter: Option<StructureFrontmatter>,
    pub content: &'a str,
}

pub fn extract(input: &str) -> Extracted<'_>
{
    let no_frontmatter = Extracted { frontmatter: None, content: input };

    let Some(caps) = FRONTMATTER_RE.captures(input)
    else
    {
        return no_frontmatter;
    };

    let yaml = caps
        .get(1)
        .map_or("", |m| m.as_str());
    let rest = &input[caps
        .get(0)
        .map_or(0, |m| m.end())..];

    match serde_yaml::from_str::<Option<StructureFrontmatter>>(yaml)
    {
        Ok(fm) => Extracted { frontmatter: Some(fm.unwrap_or_default()), content: rest },
        Err(err) =>
        {
            debug!(%err, "front matter did not parse; treating input as body");
            no_frontmatter
        }
    }
}
