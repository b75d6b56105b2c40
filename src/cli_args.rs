use clap::{ArgAction, ArgGroup, Parser};
use std::path::PathBuf;

use crate::config::Provider;
use crate::theme::Shell;

/// install-theme options
#[derive(Parser, Debug)]
#[command(
    name = "install-theme",
    version,
    about = "Install a shell prompt theme described by a compact format string",
    after_help = "Element codes: u user, h host, i network interface, p IP address, \
                  d directory, c conda env, v virtualenv, g git branch.\n\
                  Other characters are ignored. Example: -f 'u@h [i:p] d (c) (v) (g)'"
)]
pub struct ThemeCli {
    /// Element codes in render order (default: uhipdcvg)
    #[arg(short = 'f', long = "format", value_name = "FORMAT")]
    pub format: Option<String>,

    /// Element codes to suppress; also accepted as -ex
    #[arg(long = "exclude", value_name = "CODES")]
    pub exclude: Option<String>,

    /// Shell to generate the prompt for
    #[arg(long, value_enum)]
    pub shell: Option<Shell>,

    /// Where to write the theme (default: ~/.config/shellkit/prompt.<shell>)
    #[arg(short, long, value_name = "PATH")]
    pub output: Option<PathBuf>,

    /// Print the theme to stdout instead of writing a file
    #[arg(long, conflicts_with = "output")]
    pub print: bool,

    /// Increase log verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = ArgAction::Count)]
    pub verbose: u8,
}

/// Rewrite the legacy single-dash `-ex` flag, and a bare `--exclude`, into
/// `--exclude=<value>`. A missing or option-like value becomes an empty set
/// instead of a usage error.
pub fn normalize_theme_args<I>(args: I) -> Vec<String>
where
    I: IntoIterator<Item = String>,
{
    let mut iter = args.into_iter().peekable();
    let mut out = Vec::new();

    if let Some(program) = iter.next() {
        out.push(program);
    }

    while let Some(arg) = iter.next() {
        if arg == "--" {
            out.push(arg);
            out.extend(iter);
            break;
        }

        if arg == "-ex" || arg == "--exclude" {
            let value = iter
                .next_if(|next| !next.starts_with('-'))
                .unwrap_or_default();
            out.push(format!("--exclude={value}"));
        } else if let Some(value) = arg.strip_prefix("-ex=") {
            out.push(format!("--exclude={value}"));
        } else {
            out.push(arg);
        }
    }

    out
}

/// ai-commit options
#[derive(Parser, Debug)]
#[command(
    name = "ai-commit",
    version,
    about = "LLM-assisted Git commit message generator"
)]
#[command(group(
    ArgGroup::new("model_group")
        .args(["model", "no_model"])
        .multiple(false)
))]
#[command(group(
    ArgGroup::new("output_mode")
        .args(["dry_run", "apply"])
        .multiple(false)
))]
pub struct CommitCli {
    /// Stage all changes (git add -A) before generating the message
    #[arg(short, long)]
    pub all: bool,

    /// Only print the generated message; do not commit
    #[arg(long)]
    pub dry_run: bool,

    /// Write the message into .git/COMMIT_EDITMSG instead of committing
    #[arg(long)]
    pub apply: bool,

    /// Model name to use (e.g. gpt-4o-mini). If 'none', acts like --no-model.
    #[arg(long)]
    pub model: Option<String>,

    /// Disable model calls; return a dummy message instead
    #[arg(long)]
    pub no_model: bool,

    /// Backend to send the diff to
    #[arg(long, value_enum)]
    pub provider: Option<Provider>,

    /// API key (otherwise uses OPENAI_API_KEY env var)
    #[arg(long, env = "OPENAI_API_KEY", hide_env_values = true)]
    pub api_key: Option<String>,

    /// Optional: a brief human description of the change
    #[arg(short, long)]
    pub context: Option<String>,

    /// Stream the model output as it is generated
    #[arg(long)]
    pub stream: bool,

    /// Character budget for the whole diff report
    #[arg(long, value_name = "CHARS")]
    pub max_total_chars: Option<usize>,

    /// Character budget for each file's diff or body
    #[arg(long, value_name = "CHARS")]
    pub max_file_chars: Option<usize>,

    /// Line budget for each file's diff
    #[arg(long, value_name = "LINES")]
    pub max_diff_lines: Option<usize>,

    /// Increase log verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = ArgAction::Count)]
    pub verbose: u8,
}
