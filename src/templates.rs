use std::fs;

use anyhow::{Context, Result, anyhow};
use camino::Utf8Path;
use rust_embed::RustEmbed;

#[derive(RustEmbed)]
#[folder = "templates"]
struct Templates;

/// Front-end layout shipped with the binary, used when no config file is found.
const BUILTIN_LAYOUT: &str = "config/scaffold.toml";

/// Raw TOML of the built-in layout.
pub fn builtin_layout() -> Result<String> {
    let file = Templates::get(BUILTIN_LAYOUT)
        .ok_or_else(|| anyhow!("built-in layout `{}` is not embedded", BUILTIN_LAYOUT))?;
    String::from_utf8(file.data.into_owned())
        .with_context(|| format!("decoding built-in layout `{}`", BUILTIN_LAYOUT))
}

/// Write the built-in layout out as an editable config file.
pub fn write_builtin_layout(destination: &Utf8Path) -> Result<()> {
    let raw = builtin_layout()?;
    if let Some(parent) = destination.parent().filter(|p| !p.as_str().is_empty()) {
        fs::create_dir_all(parent).with_context(|| format!("creating directory {}", parent))?;
    }
    fs::write(destination, raw).with_context(|| format!("writing config {}", destination))
}
