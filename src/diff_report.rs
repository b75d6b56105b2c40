//! Collects repository changes into a report small enough to send to a model.
//!
//! The report has up to three sections (staged, unstaged, untracked). Each
//! per-file diff is cut to a line budget by keeping its head and tail, then to
//! a character budget. Untracked files are read only up to what that budget
//! can keep. Sections are appended while the running total fits the report
//! budget; once one does not fit, it and every later section are replaced by
//! a short notice without being gathered.

use anyhow::Result;

pub const DEFAULT_MAX_TOTAL_CHARS: usize = 12_000;
pub const DEFAULT_MAX_FILE_CHARS: usize = 3_000;
pub const DEFAULT_MAX_DIFF_LINES: usize = 200;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DiffLimits {
    pub max_total_chars: usize,
    pub max_file_chars: usize,
    pub max_diff_lines: usize,
}

impl Default for DiffLimits {
    fn default() -> Self {
        DiffLimits {
            max_total_chars: DEFAULT_MAX_TOTAL_CHARS,
            max_file_chars: DEFAULT_MAX_FILE_CHARS,
            max_diff_lines: DEFAULT_MAX_DIFF_LINES,
        }
    }
}

/// Which side of the index a tracked change sits on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum ChangeKind {
    Staged,
    Unstaged,
}

impl ChangeKind {
    fn title(&self) -> &'static str {
        match self {
            ChangeKind::Staged => "Staged changes",
            ChangeKind::Unstaged => "Unstaged changes",
        }
    }
}

/// What could be read from the start of an untracked file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FileBody {
    /// Leading text, at most the requested number of bytes. `size` is the
    /// full file size in bytes.
    Text { head: String, size: u64 },
    Binary,
    /// Missing, a directory, a dangling link, or not permitted.
    Unreadable,
}

/// Read-only view of repository state.
pub trait ChangeSource {
    fn changed_files(&self, kind: ChangeKind) -> Result<Vec<String>>;

    fn file_diff(&self, kind: ChangeKind, path: &str) -> Result<String>;

    fn untracked_files(&self) -> Result<Vec<String>>;

    /// The first `max_bytes` bytes of an untracked file. Implementations must
    /// not read past that limit.
    fn untracked_body(&self, path: &str, max_bytes: usize) -> Result<FileBody>;
}

/// Bytes needed to hold `max_chars + 1` characters of UTF-8, so a cut body
/// still shows that it was cut.
pub fn byte_budget(max_chars: usize) -> usize {
    max_chars.saturating_add(1).saturating_mul(4)
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DiffReport {
    pub text: String,
    pub staged: Vec<String>,
    pub unstaged: Vec<String>,
    pub untracked: Vec<String>,
    /// Titles of sections dropped for exceeding the report budget.
    pub omitted_sections: Vec<&'static str>,
}

impl DiffReport {
    pub fn is_empty(&self) -> bool {
        self.staged.is_empty() && self.unstaged.is_empty() && self.untracked.is_empty()
    }

    pub fn has_staged(&self) -> bool {
        !self.staged.is_empty()
    }
}

/// Build the bounded report for the current state of `source`.
pub fn gather(source: &dyn ChangeSource, limits: &DiffLimits) -> Result<DiffReport> {
    let mut staged = source.changed_files(ChangeKind::Staged)?;
    let mut unstaged = source.changed_files(ChangeKind::Unstaged)?;
    let mut untracked = source.untracked_files()?;
    staged.sort();
    unstaged.sort();
    untracked.sort();

    log::debug!(
        "gathering diff report: {} staged, {} unstaged, {} untracked",
        staged.len(),
        unstaged.len(),
        untracked.len()
    );

    let mut sections: Vec<Section> = Vec::new();
    if !staged.is_empty() {
        sections.push(Section::Diff(ChangeKind::Staged, &staged));
    }
    if !unstaged.is_empty() {
        sections.push(Section::Diff(ChangeKind::Unstaged, &unstaged));
    }
    if !untracked.is_empty() {
        sections.push(Section::Untracked(&untracked));
    }

    let mut text = String::new();
    let mut used = 0;
    let mut omitted_sections = Vec::new();

    for section in sections {
        let title = section.title();

        if omitted_sections.is_empty() {
            let body = match section {
                Section::Diff(kind, files) => diff_section(source, kind, files, limits)?,
                Section::Untracked(files) => untracked_section(source, files, limits)?,
            };
            let block = format!("## {title}\n{body}\n");
            let len = block.chars().count();

            if used + len <= limits.max_total_chars {
                text.push_str(&block);
                used += len;
                continue;
            }
            log::info!("Omitting section {title:?} ({len} chars) to stay within budget");
        } else {
            log::info!("Omitting section {title:?}; budget already exceeded");
        }

        omitted_sections.push(title);
        text.push_str(&format!(
            "## {title}\n[section omitted: report budget of {} characters exceeded]\n\n",
            limits.max_total_chars
        ));
    }

    Ok(DiffReport {
        text,
        staged,
        unstaged,
        untracked,
        omitted_sections,
    })
}

enum Section<'a> {
    Diff(ChangeKind, &'a [String]),
    Untracked(&'a [String]),
}

impl Section<'_> {
    fn title(&self) -> &'static str {
        match self {
            Section::Diff(kind, _) => kind.title(),
            Section::Untracked(_) => "Untracked files",
        }
    }
}

fn diff_section(
    source: &dyn ChangeSource,
    kind: ChangeKind,
    files: &[String],
    limits: &DiffLimits,
) -> Result<String> {
    let mut out = file_list(files);

    for path in files {
        let diff = source.file_diff(kind, path)?;
        let diff = truncate_lines(&diff, limits.max_diff_lines);
        let diff = truncate_chars(&diff, limits.max_file_chars);
        out.push_str(&format!("\n### {path}\n```diff\n{}\n```\n", diff.trim_end()));
    }

    Ok(out)
}

fn untracked_section(
    source: &dyn ChangeSource,
    files: &[String],
    limits: &DiffLimits,
) -> Result<String> {
    let mut out = file_list(files);
    let max_bytes = byte_budget(limits.max_file_chars);

    for path in files {
        let body = match source.untracked_body(path, max_bytes)? {
            FileBody::Text { head, size } if (head.len() as u64) < size => {
                truncate_head(&head, limits.max_file_chars, size)
            }
            FileBody::Text { head, .. } => truncate_chars(&head, limits.max_file_chars),
            FileBody::Binary => "[binary file]".to_string(),
            FileBody::Unreadable => "[unreadable file]".to_string(),
        };
        out.push_str(&format!("\n### {path}\n```\n{}\n```\n", body.trim_end()));
    }

    Ok(out)
}

fn file_list(files: &[String]) -> String {
    let mut out = String::from("Files:\n");
    for path in files {
        out.push_str("  ");
        out.push_str(path);
        out.push('\n');
    }
    out
}

/// Keep at most `max_lines` lines: the first half and the last half, with a
/// marker counting what was dropped.
pub fn truncate_lines(text: &str, max_lines: usize) -> String {
    let lines: Vec<&str> = text.lines().collect();
    if lines.len() <= max_lines {
        return text.to_string();
    }

    let head = max_lines / 2;
    let tail = max_lines - head;
    let omitted = lines.len() - max_lines;

    let mut out: Vec<String> = lines[..head].iter().map(|l| l.to_string()).collect();
    out.push(format!("... [{omitted} lines omitted] ..."));
    out.extend(lines[lines.len() - tail..].iter().map(|l| l.to_string()));
    out.join("\n")
}

/// Keep at most `max_chars` characters, never splitting a character.
pub fn truncate_chars(text: &str, max_chars: usize) -> String {
    match text.char_indices().nth(max_chars) {
        None => text.to_string(),
        Some((cut, _)) => {
            let dropped = text[cut..].chars().count();
            format!("{}\n[truncated {dropped} chars]", &text[..cut])
        }
    }
}

/// Cut the leading part of a file that was only partly read. The dropped
/// amount is unknown in characters, so the marker gives the file size.
fn truncate_head(head: &str, max_chars: usize, size: u64) -> String {
    let kept = match head.char_indices().nth(max_chars) {
        Some((cut, _)) => &head[..cut],
        None => head,
    };
    format!("{kept}\n[truncated: file is {size} bytes]")
}
