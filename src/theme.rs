//! Renders a compiled [`Layout`] into a shell configuration file.

use std::collections::BTreeSet;
use std::fmt;

use serde::Deserialize;

use crate::layout::{Layout, RenderToken, TokenKind};

/// Target shell for the generated prompt.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum Shell {
    #[default]
    Bash,
    Zsh,
}

impl Shell {
    pub fn as_str(&self) -> &'static str {
        match self {
            Shell::Bash => "bash",
            Shell::Zsh => "zsh",
        }
    }

    pub fn rc_file(&self) -> &'static str {
        match self {
            Shell::Bash => "~/.bashrc",
            Shell::Zsh => "~/.zshrc",
        }
    }

    fn default_symbol(&self) -> &'static str {
        match self {
            Shell::Bash => r"\$",
            Shell::Zsh => "%#",
        }
    }
}

impl fmt::Display for Shell {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Terminal colour for a prompt segment. `Default` emits no escape at all.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Color {
    Default,
    Black,
    Red,
    Green,
    Yellow,
    Blue,
    Magenta,
    Cyan,
    White,
}

impl Color {
    fn ansi(&self) -> Option<u8> {
        match self {
            Color::Default => None,
            Color::Black => Some(30),
            Color::Red => Some(31),
            Color::Green => Some(32),
            Color::Yellow => Some(33),
            Color::Blue => Some(34),
            Color::Magenta => Some(35),
            Color::Cyan => Some(36),
            Color::White => Some(37),
        }
    }

    fn zsh_name(&self) -> Option<&'static str> {
        match self {
            Color::Default => None,
            Color::Black => Some("black"),
            Color::Red => Some("red"),
            Color::Green => Some("green"),
            Color::Yellow => Some("yellow"),
            Color::Blue => Some("blue"),
            Color::Magenta => Some("magenta"),
            Color::Cyan => Some("cyan"),
            Color::White => Some("white"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct Palette {
    pub user: Color,
    pub host: Color,
    pub network: Color,
    pub directory: Color,
    pub environment: Color,
    pub git: Color,
}

impl Default for Palette {
    fn default() -> Self {
        Palette {
            user: Color::Green,
            host: Color::Green,
            network: Color::Yellow,
            directory: Color::Blue,
            environment: Color::Magenta,
            git: Color::Cyan,
        }
    }
}

/// Everything the renderer needs besides the layout itself.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ThemeConfig {
    pub shell: Shell,
    pub palette: Palette,
    /// Trailing prompt symbol; the shell's usual `$`/`#` marker when unset.
    pub symbol: Option<String>,
}

impl ThemeConfig {
    fn symbol(&self) -> String {
        match &self.symbol {
            Some(symbol) => match self.shell {
                Shell::Bash => symbol.replace('\\', r"\\"),
                Shell::Zsh => symbol.replace('%', "%%"),
            },
            None => self.shell.default_symbol().to_string(),
        }
    }
}

/// Shell functions the prompt calls at render time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
enum Helper {
    Interface,
    Ip,
    Conda,
    Virtualenv,
    GitBranch,
}

impl Helper {
    fn call(&self) -> &'static str {
        match self {
            Helper::Interface => "$(__shellkit_iface)",
            Helper::Ip => "$(__shellkit_ip)",
            Helper::Conda => "$(__shellkit_conda)",
            Helper::Virtualenv => "$(__shellkit_venv)",
            Helper::GitBranch => "$(__shellkit_git_branch)",
        }
    }

    fn definition(&self) -> &'static str {
        match self {
            Helper::Interface => IFACE_FN,
            // the ip helper looks up the interface itself
            Helper::Ip => IP_FN,
            Helper::Conda => CONDA_FN,
            Helper::Virtualenv => VENV_FN,
            Helper::GitBranch => GIT_BRANCH_FN,
        }
    }
}

const IFACE_FN: &str = r#"__shellkit_iface() {
    ip route show default 2>/dev/null | awk '{ for (i = 1; i < NF; i++) if ($i == "dev") { print $(i + 1); exit } }'
}
"#;

const IP_FN: &str = r#"__shellkit_ip() {
    local iface
    iface="$(ip route show default 2>/dev/null | awk '{ for (i = 1; i < NF; i++) if ($i == "dev") { print $(i + 1); exit } }')"
    [ -n "$iface" ] || return 0
    ip -4 addr show "$iface" 2>/dev/null | awk '/inet / { sub(/\/.*/, "", $2); print $2; exit }'
}
"#;

const CONDA_FN: &str = r#"__shellkit_conda() {
    [ -n "$CONDA_DEFAULT_ENV" ] && printf '(%s)' "$CONDA_DEFAULT_ENV"
}
"#;

const VENV_FN: &str = r#"__shellkit_venv() {
    [ -n "$VIRTUAL_ENV" ] && printf '(%s)' "${VIRTUAL_ENV##*/}"
}
"#;

const GIT_BRANCH_FN: &str = r#"__shellkit_git_branch() {
    local branch
    branch="$(git symbolic-ref --short HEAD 2>/dev/null)" || return 0
    printf '(%s)' "$branch"
}
"#;

/// Render the complete configuration file for `layout`.
pub fn render(layout: &Layout, config: &ThemeConfig) -> String {
    let mut out = String::new();

    out.push_str("# Generated by install-theme. Re-run the installer instead of editing.\n");
    if layout.is_empty() {
        out.push_str("# No prompt elements enabled.\n");
    } else {
        out.push_str(&format!("# Elements: {}\n", layout.filtered()));
    }
    out.push('\n');

    let helpers = helpers_for(layout.tokens());
    if helpers.contains(&Helper::Conda) {
        out.push_str("export CONDA_CHANGEPS1=false\n");
    }
    if helpers.contains(&Helper::Virtualenv) {
        out.push_str("export VIRTUAL_ENV_DISABLE_PROMPT=1\n");
    }
    if helpers.contains(&Helper::Conda) || helpers.contains(&Helper::Virtualenv) {
        out.push('\n');
    }

    for helper in &helpers {
        out.push_str(helper.definition());
        out.push('\n');
    }

    let line = single_quote(&prompt_line(layout, config));
    match config.shell {
        Shell::Bash => out.push_str(&format!("PS1={line}\n")),
        Shell::Zsh => {
            out.push_str("setopt PROMPT_SUBST\n");
            out.push_str(&format!("PROMPT={line}\n"));
        }
    }

    out
}

/// The prompt string itself, before shell quoting.
pub fn prompt_line(layout: &Layout, config: &ThemeConfig) -> String {
    let mut line = String::new();

    for token in layout.tokens() {
        if token.leading_space {
            line.push(' ');
        }
        line.push_str(&segment(token.kind, config));
    }

    if !line.is_empty() {
        line.push(' ');
    }
    line.push_str(&config.symbol());
    line.push(' ');
    line
}

fn segment(kind: TokenKind, config: &ThemeConfig) -> String {
    let shell = config.shell;
    let palette = &config.palette;
    let (user, host, cwd) = match shell {
        Shell::Bash => (r"\u", r"\h", r"\w"),
        Shell::Zsh => ("%n", "%m", "%~"),
    };

    match kind {
        TokenKind::User => paint(user, palette.user, shell),
        TokenKind::Host => paint(host, palette.host, shell),
        TokenKind::UserHost => format!(
            "{}@{}",
            paint(user, palette.user, shell),
            paint(host, palette.host, shell)
        ),
        TokenKind::Network { interface, ip } => {
            let parts: Vec<&str> = [
                interface.then(|| Helper::Interface.call()),
                ip.then(|| Helper::Ip.call()),
            ]
            .into_iter()
            .flatten()
            .collect();
            paint(&parts.join(":"), palette.network, shell)
        }
        TokenKind::Directory => paint(cwd, palette.directory, shell),
        TokenKind::Conda => paint(Helper::Conda.call(), palette.environment, shell),
        TokenKind::Virtualenv => paint(Helper::Virtualenv.call(), palette.environment, shell),
        TokenKind::GitBranch => paint(Helper::GitBranch.call(), palette.git, shell),
    }
}

fn paint(text: &str, color: Color, shell: Shell) -> String {
    match shell {
        Shell::Bash => match color.ansi() {
            Some(code) => format!(r"\[\e[{code}m\]{text}\[\e[0m\]"),
            None => text.to_string(),
        },
        Shell::Zsh => match color.zsh_name() {
            Some(name) => format!("%F{{{name}}}{text}%f"),
            None => text.to_string(),
        },
    }
}

fn helpers_for(tokens: &[RenderToken]) -> BTreeSet<Helper> {
    let mut helpers = BTreeSet::new();
    for token in tokens {
        match token.kind {
            TokenKind::Network { interface, ip } => {
                if interface {
                    helpers.insert(Helper::Interface);
                }
                if ip {
                    helpers.insert(Helper::Ip);
                }
            }
            TokenKind::Conda => {
                helpers.insert(Helper::Conda);
            }
            TokenKind::Virtualenv => {
                helpers.insert(Helper::Virtualenv);
            }
            TokenKind::GitBranch => {
                helpers.insert(Helper::GitBranch);
            }
            TokenKind::User
            | TokenKind::Host
            | TokenKind::UserHost
            | TokenKind::Directory => {}
        }
    }
    helpers
}

fn single_quote(text: &str) -> String {
    format!("'{}'", text.replace('\'', r"'\''"))
}
