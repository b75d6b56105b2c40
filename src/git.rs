use anyhow::{Context, Result, anyhow};
use std::fs::{self, File};
use std::io::{self, Read, Write};
use std::path::{Path, PathBuf};
use std::process::{Command as GitCommand, Stdio};

use crate::diff_report::{ChangeKind, ChangeSource, FileBody};

/// Run a git command and capture stdout as String.
pub fn git_output(args: &[&str]) -> Result<String> {
    run_git(None, args)
}

fn run_git(dir: Option<&Path>, args: &[&str]) -> Result<String> {
    let mut command = GitCommand::new("git");
    command.args(args);
    if let Some(dir) = dir {
        command.current_dir(dir);
    }

    let output = command
        .output()
        .with_context(|| format!("failed to run git {:?}", args))?;

    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        return Err(anyhow!(
            "git {:?} exited with status {:?}: {}",
            args,
            output.status.code(),
            stderr.trim()
        ));
    }

    Ok(String::from_utf8_lossy(&output.stdout).to_string())
}

/// Split `-z` output. Paths come back verbatim, without C-style quoting.
fn nul_separated(output: &str) -> Vec<String> {
    output
        .split('\0')
        .filter(|path| !path.is_empty())
        .map(str::to_string)
        .collect()
}

/// Decode the leading bytes of a file. A NUL byte or invalid UTF-8 marks it
/// binary, except for a character split by the read limit.
fn decode_head(head: Vec<u8>, size: u64) -> FileBody {
    if head.contains(&0) {
        return FileBody::Binary;
    }

    match String::from_utf8(head) {
        Ok(text) => FileBody::Text { head: text, size },
        Err(err) => {
            let utf8 = err.utf8_error();
            let cut_short = (err.as_bytes().len() as u64) < size;
            if !cut_short || utf8.error_len().is_some() {
                return FileBody::Binary;
            }
            let mut bytes = err.into_bytes();
            bytes.truncate(utf8.valid_up_to());
            match String::from_utf8(bytes) {
                Ok(text) => FileBody::Text { head: text, size },
                Err(_) => FileBody::Binary,
            }
        }
    }
}

fn read_head(path: &Path, max_bytes: usize) -> io::Result<(Vec<u8>, u64)> {
    let file = File::open(path)?;
    let size = file.metadata()?.len();
    let mut head = Vec::new();
    file.take(max_bytes as u64).read_to_end(&mut head)?;
    Ok((head, size))
}

/// Get the path to the Git directory (e.g. .git)
pub fn git_dir() -> Result<PathBuf> {
    let dir = git_output(&["rev-parse", "--git-dir"])?.trim().to_string();
    Ok(PathBuf::from(dir))
}

/// Write the commit message into .git/COMMIT_EDITMSG so the next `git commit`
/// will use it as the default message in the editor.
pub fn write_commit_editmsg(message: &str) -> Result<PathBuf> {
    let path = git_dir()?.join("COMMIT_EDITMSG");
    fs::write(&path, message)
        .with_context(|| format!("failed to write commit message to {:?}", path))?;
    Ok(path)
}

/// Current branch name. Works before the first commit too.
pub fn current_branch() -> Result<String> {
    let name = git_output(&["symbolic-ref", "--short", "HEAD"])?
        .trim()
        .to_string();
    Ok(name)
}

/// Stage all new, modified, and deleted files
pub fn stage_all() -> Result<()> {
    log::warn!("Staging all changes");
    git_output(&["add", "-A"])?;
    Ok(())
}

/// Create a commit with `message`, fed to git on stdin.
pub fn commit_with_message(message: &str) -> Result<()> {
    let mut child = GitCommand::new("git")
        .args(["commit", "--quiet", "-F", "-"])
        .stdin(Stdio::piped())
        .stdout(Stdio::inherit())
        .stderr(Stdio::piped())
        .spawn()
        .context("failed to run git commit")?;

    child
        .stdin
        .take()
        .ok_or_else(|| anyhow!("git commit stdin unavailable"))?
        .write_all(message.as_bytes())
        .context("failed to pass commit message to git")?;

    let output = child
        .wait_with_output()
        .context("failed to wait for git commit")?;

    if !output.status.success() {
        return Err(anyhow!(
            "git commit exited with status {:?}: {}",
            output.status.code(),
            String::from_utf8_lossy(&output.stderr).trim()
        ));
    }

    Ok(())
}

/// A working tree. Every command runs from its top level so the paths git
/// reports can be fed straight back to it.
#[derive(Debug)]
pub struct GitRepo {
    root: PathBuf,
}

impl GitRepo {
    /// Fails when the current directory is not inside a repository.
    pub fn open() -> Result<Self> {
        let root = git_output(&["rev-parse", "--show-toplevel"])
            .context("Not in a git repository")?
            .trim()
            .to_string();
        log::debug!("Using repository at {root}");
        Ok(GitRepo {
            root: PathBuf::from(root),
        })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn git(&self, args: &[&str]) -> Result<String> {
        run_git(Some(&self.root), args)
    }
}

impl ChangeSource for GitRepo {
    fn changed_files(&self, kind: ChangeKind) -> Result<Vec<String>> {
        let output = match kind {
            ChangeKind::Staged => self.git(&["diff", "--cached", "--name-only", "-z"])?,
            ChangeKind::Unstaged => self.git(&["diff", "--name-only", "-z"])?,
        };
        Ok(nul_separated(&output))
    }

    fn file_diff(&self, kind: ChangeKind, path: &str) -> Result<String> {
        let pathspec = format!(":(literal){path}");
        let mut args = vec!["-c", "core.quotePath=false", "diff", "--no-color"];
        if kind == ChangeKind::Staged {
            args.push("--cached");
        }
        args.extend(["--", pathspec.as_str()]);
        self.git(&args)
    }

    fn untracked_files(&self) -> Result<Vec<String>> {
        let output = self.git(&["ls-files", "-z", "--others", "--exclude-standard"])?;
        Ok(nul_separated(&output))
    }

    fn untracked_body(&self, path: &str, max_bytes: usize) -> Result<FileBody> {
        match read_head(&self.root.join(path), max_bytes) {
            Ok((head, size)) => Ok(decode_head(head, size)),
            Err(err) => {
                log::warn!("Could not read untracked file {path}: {err}");
                Ok(FileBody::Unreadable)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn repo_at(dir: &TempDir) -> GitRepo {
        GitRepo {
            root: dir.path().to_path_buf(),
        }
    }

    #[test]
    fn nul_separated_keeps_paths_verbatim() {
        let paths = nul_separated("café.txt\0 padded name \0dir/naïve.txt\0");
        assert_eq!(paths, vec!["café.txt", " padded name ", "dir/naïve.txt"]);
    }

    #[test]
    fn body_read_stops_at_the_limit() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("big.log"), "a".repeat(100_000)).unwrap();

        let body = repo_at(&dir).untracked_body("big.log", 16).unwrap();
        assert_eq!(
            body,
            FileBody::Text {
                head: "a".repeat(16),
                size: 100_000
            }
        );
    }

    #[test]
    fn character_split_by_the_limit_is_dropped() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("accents.txt"), "ééé").unwrap();

        let body = repo_at(&dir).untracked_body("accents.txt", 5).unwrap();
        assert_eq!(
            body,
            FileBody::Text {
                head: "éé".to_string(),
                size: 6
            }
        );
    }

    #[test]
    fn non_text_bodies_are_binary() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("nul.bin"), b"ab\0cd").unwrap();
        fs::write(dir.path().join("latin1.txt"), b"caf\xe9 au lait").unwrap();

        let repo = repo_at(&dir);
        assert_eq!(repo.untracked_body("nul.bin", 64).unwrap(), FileBody::Binary);
        assert_eq!(repo.untracked_body("latin1.txt", 64).unwrap(), FileBody::Binary);
    }

    #[test]
    fn missing_or_directory_bodies_are_unreadable() {
        let dir = TempDir::new().unwrap();
        fs::create_dir(dir.path().join("subdir")).unwrap();

        let repo = repo_at(&dir);
        assert_eq!(repo.untracked_body("gone.txt", 64).unwrap(), FileBody::Unreadable);
        assert_eq!(repo.untracked_body("subdir", 64).unwrap(), FileBody::Unreadable);
    }
}
