use anyhow::{Context, Result, anyhow};
use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use crate::layout::{Element, Layout};
use crate::theme::Shell;

pub const EMPTY_LAYOUT_WARNING: &str =
    "no prompt elements enabled; the installed prompt will only show the prompt symbol";

/// Human-readable report of what an install will render.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Summary {
    filtered: String,
    elements: Vec<Element>,
}

impl Summary {
    pub fn from_layout(layout: &Layout) -> Self {
        let filtered = layout.filtered();
        let mut elements: Vec<Element> = layout.flags().enabled().collect();
        elements.sort_by_key(|element| filtered.find(element.code()));

        Summary {
            filtered: filtered.to_string(),
            elements,
        }
    }

    pub fn warning(&self) -> Option<&'static str> {
        self.elements.is_empty().then_some(EMPTY_LAYOUT_WARNING)
    }

    /// Summary lines, without the warning.
    pub fn lines(&self) -> Vec<String> {
        if self.elements.is_empty() {
            return vec!["Active elements: (none)".to_string()];
        }

        let mut lines = vec![format!("Active elements: {}", self.filtered)];
        lines.extend(
            self.elements
                .iter()
                .map(|element| format!("  {}  {}", element.code(), element.label())),
        );
        lines
    }
}

/// Where the rendered theme goes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Destination {
    File(PathBuf),
    Stdout,
}

/// `~/.config/shellkit/prompt.<shell>`
pub fn default_output_path(shell: Shell) -> Result<PathBuf> {
    let home = dirs::home_dir().ok_or_else(|| anyhow!("could not determine home directory"))?;
    Ok(home
        .join(".config")
        .join("shellkit")
        .join(format!("prompt.{}", shell.as_str())))
}

/// Write the rendered theme to its destination.
pub fn install(rendered: &str, destination: &Destination) -> Result<()> {
    match destination {
        Destination::Stdout => {
            let mut stdout = io::stdout();
            stdout.write_all(rendered.as_bytes())?;
            stdout.flush()?;
        }
        Destination::File(path) => {
            if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
                fs::create_dir_all(parent).with_context(|| {
                    format!("failed to create directory {}", parent.display())
                })?;
            }
            fs::write(path, rendered)
                .with_context(|| format!("failed to write theme to {}", path.display()))?;
            log::info!("Wrote {} bytes to {}", rendered.len(), path.display());
        }
    }
    Ok(())
}

/// The line a user adds to their shell startup file.
pub fn source_hint(path: &Path, shell: Shell) -> String {
    format!(
        "To enable it, add this line to {}:\n  source \"{}\"",
        shell.rc_file(),
        path.display()
    )
}
