use std::fmt::Write as _;
use std::fs;

use anyhow::{Context, Result, anyhow, bail};
use camino::{Utf8Component, Utf8Path};
use serde::Deserialize;
use toml_edit::{Array, DocumentMut, Item, value};

use crate::templates;

/// Layout document, `scaffold.toml` or `.scaffold/config.toml`.
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct ScaffoldConfig {
    pub root: Option<String>,
    #[serde(default)]
    pub directories: Vec<String>,
    #[serde(default)]
    pub files: Vec<String>,
}

/// The two entry lists a config can hold.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Section {
    Directories,
    Files,
}

impl Section {
    pub fn key(&self) -> &'static str {
        match self {
            Section::Directories => "directories",
            Section::Files => "files",
        }
    }

    fn label(&self) -> &'static str {
        match self {
            Section::Directories => "directory",
            Section::Files => "file",
        }
    }
}

impl ScaffoldConfig {
    pub fn validate(&self) -> Result<()> {
        if let Some(root) = &self.root {
            if root.trim().is_empty() {
                bail!("`root` must not be empty");
            }
        }
        for entry in &self.directories {
            validate_entry(Section::Directories, entry)?;
        }
        for entry in &self.files {
            validate_entry(Section::Files, entry)?;
        }
        Ok(())
    }
}

/// Entries are joined onto the root, so they have to stay beneath it.
pub fn validate_entry(section: Section, entry: &str) -> Result<()> {
    let label = section.label();
    if entry.trim().is_empty() {
        bail!("{label} entry must not be empty");
    }
    let path = Utf8Path::new(entry);
    if path.is_absolute() || path.has_root() {
        bail!("{label} entry `{entry}` must be relative to the root");
    }
    if path
        .components()
        .any(|c| matches!(c, Utf8Component::ParentDir | Utf8Component::Prefix(_)))
    {
        bail!("{label} entry `{entry}` must not point outside the root");
    }
    Ok(())
}

pub fn parse(raw: &str, origin: &str) -> Result<ScaffoldConfig> {
    let config: ScaffoldConfig =
        toml::from_str(raw).with_context(|| format!("parsing config {}", origin))?;
    config
        .validate()
        .with_context(|| format!("validating config {}", origin))?;
    Ok(config)
}

/// Load a configuration file from disk, deserialize and validate it.
pub fn load_from_path(path: &Utf8Path) -> Result<ScaffoldConfig> {
    let raw = fs::read_to_string(path).with_context(|| format!("reading config {}", path))?;
    parse(&raw, path.as_str())
}

pub fn builtin() -> Result<ScaffoldConfig> {
    let raw = templates::builtin_layout()?;
    parse(&raw, "<built-in>")
}

pub fn write_example_config(path: &Utf8Path, overwrite: bool) -> Result<()> {
    if path.exists() && !overwrite {
        bail!("{} already exists; rerun with --force to overwrite", path);
    }

    templates::write_builtin_layout(path)
}

/// Append entries to one of the lists in an existing config, keeping its formatting.
///
/// Entries already listed are skipped. Returns how many were added.
pub fn add_entries(path: &Utf8Path, section: Section, entries: &[String]) -> Result<usize> {
    if entries.is_empty() {
        bail!("no {} entries given", section.label());
    }
    for entry in entries {
        validate_entry(section, entry)?;
    }
    if !path.exists() {
        bail!(
            "no config at {}; run `scaffold config generate` first",
            path
        );
    }

    let raw = fs::read_to_string(path).with_context(|| format!("reading config {}", path))?;
    let mut doc: DocumentMut = raw
        .parse()
        .with_context(|| format!("parsing config {}", path))?;

    let key = section.key();
    if !doc.as_table().contains_key(key) {
        doc[key] = value(Array::new());
    }

    let list = doc
        .get_mut(key)
        .and_then(Item::as_array_mut)
        .ok_or_else(|| anyhow!("config has non-array `{}` entry", key))?;

    let mut added = 0;
    for entry in entries {
        if list.iter().any(|item| item.as_str() == Some(entry.as_str())) {
            continue;
        }
        list.push(entry.as_str());
        added += 1;
    }

    if added > 0 {
        fs::write(path, doc.to_string()).with_context(|| format!("writing config {}", path))?;
    }
    Ok(added)
}

pub fn format_summary(config: &ScaffoldConfig) -> String {
    let mut out = String::new();
    let root = config.root.as_deref().unwrap_or("<unset>");

    let _ = writeln!(out, "Root: {}", root);
    let _ = writeln!(out, "Directories: {}", config.directories.len());
    for dir in &config.directories {
        let _ = writeln!(out, "  - {}/", dir.trim_end_matches('/'));
    }
    let _ = writeln!(out, "Files: {}", config.files.len());
    for file in &config.files {
        let _ = writeln!(out, "  - {}", file);
    }

    out
}
