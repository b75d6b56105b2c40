use anyhow::{Context, Result};
use serde::Deserialize;
use std::env;
use std::fs;
use std::path::PathBuf;

use crate::cli_args::{CommitCli, ThemeCli};
use crate::diff_report::DiffLimits;
use crate::installer;
use crate::layout::DEFAULT_FORMAT;
use crate::llm::{ollama, openai};
use crate::theme::{Palette, Shell, ThemeConfig};

/// Which model backend to talk to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum Provider {
    #[default]
    Openai,
    Ollama,
}

impl Provider {
    fn default_model(&self) -> &'static str {
        match self {
            Provider::Openai => "gpt-5-nano",
            Provider::Ollama => "llama3.2",
        }
    }
}

/// Final resolved configuration for ai-commit.
#[derive(Debug, Clone)]
pub struct CommitConfig {
    pub provider: Provider,
    pub model: String,
    /// True for `--no-model` or a model named `none`.
    pub no_model: bool,
    pub openai_api_key: Option<String>,
    pub api_base_url: String,
    pub ollama_url: String,
    pub stream: bool,
    pub limits: DiffLimits,
}

impl CommitConfig {
    /// Build the final config from CLI flags, environment, TOML file, and defaults.
    ///
    /// Precedence:
    ///   1. CLI flags
    ///   2. Env vars (`SHELLKIT_MODEL`, `SHELLKIT_PROVIDER`, `OPENAI_API_KEY`,
    ///      `OPENAI_BASE_URL`, `OLLAMA_HOST`)
    ///   3. TOML `~/.config/shellkit.toml`
    ///   4. Hardcoded defaults
    pub fn from_sources(cli: &CommitCli) -> Result<Self> {
        let file_cfg = load_file_config()?;
        Self::resolve(cli, |key| env::var(key).ok(), file_cfg.commit)
    }

    fn resolve(
        cli: &CommitCli,
        env: impl Fn(&str) -> Option<String>,
        file: CommitFileConfig,
    ) -> Result<Self> {
        let provider = match cli.provider {
            Some(provider) => provider,
            None => match env("SHELLKIT_PROVIDER") {
                Some(name) => parse_provider(&name)?,
                None => file.provider.unwrap_or_default(),
            },
        };

        let model = cli
            .model
            .clone()
            .or_else(|| env("SHELLKIT_MODEL"))
            .or(file.model)
            .unwrap_or_else(|| provider.default_model().to_string());

        let no_model = cli.no_model || model.eq_ignore_ascii_case("none");

        let openai_api_key = cli
            .api_key
            .clone()
            .or_else(|| env("OPENAI_API_KEY"))
            .or(file.openai_api_key)
            .filter(|key| !key.trim().is_empty());

        let api_base_url = env("OPENAI_BASE_URL")
            .or(file.api_base_url)
            .unwrap_or_else(|| openai::DEFAULT_BASE_URL.to_string());

        let ollama_url = env("OLLAMA_HOST")
            .or(file.ollama_url)
            .unwrap_or_else(|| ollama::DEFAULT_URL.to_string());

        let defaults = DiffLimits::default();
        let limits = DiffLimits {
            max_total_chars: cli
                .max_total_chars
                .or(file.max_total_chars)
                .unwrap_or(defaults.max_total_chars),
            max_file_chars: cli
                .max_file_chars
                .or(file.max_file_chars)
                .unwrap_or(defaults.max_file_chars),
            max_diff_lines: cli
                .max_diff_lines
                .or(file.max_diff_lines)
                .unwrap_or(defaults.max_diff_lines),
        };

        Ok(CommitConfig {
            provider,
            model,
            no_model,
            openai_api_key,
            api_base_url,
            ollama_url,
            stream: cli.stream || file.stream.unwrap_or(false),
            limits,
        })
    }
}

fn parse_provider(name: &str) -> Result<Provider> {
    <Provider as clap::ValueEnum>::from_str(name, true)
        .map_err(|_| anyhow::anyhow!("unknown provider {name:?} (expected openai or ollama)"))
}

/// Final resolved settings for install-theme.
#[derive(Debug, Clone)]
pub struct ThemeSettings {
    pub format: String,
    pub exclude: String,
    pub theme: ThemeConfig,
    output: Option<PathBuf>,
}

impl ThemeSettings {
    /// CLI flags win over `[theme]` in `~/.config/shellkit.toml`, which wins
    /// over defaults.
    pub fn from_sources(cli: &ThemeCli) -> Result<Self> {
        let file_cfg = load_file_config()?;
        Ok(Self::resolve(cli, file_cfg.theme))
    }

    fn resolve(cli: &ThemeCli, file: ThemeFileConfig) -> Self {
        let format = cli
            .format
            .clone()
            .or(file.format)
            .unwrap_or_else(|| DEFAULT_FORMAT.to_string());
        let exclude = cli.exclude.clone().or(file.exclude).unwrap_or_default();

        let theme = ThemeConfig {
            shell: cli.shell.or(file.shell).unwrap_or_default(),
            palette: file.colors.unwrap_or_default(),
            symbol: file.symbol,
        };

        ThemeSettings {
            format,
            exclude,
            theme,
            output: cli.output.clone().or(file.output),
        }
    }

    pub fn output_path(&self) -> Result<PathBuf> {
        match &self.output {
            Some(path) => Ok(path.clone()),
            None => installer::default_output_path(self.theme.shell),
        }
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct FileConfig {
    pub commit: CommitFileConfig,
    pub theme: ThemeFileConfig,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct CommitFileConfig {
    pub provider: Option<Provider>,
    /// Default model to use when not provided via CLI or env.
    pub model: Option<String>,
    pub openai_api_key: Option<String>,
    pub api_base_url: Option<String>,
    pub ollama_url: Option<String>,
    pub stream: Option<bool>,
    pub max_total_chars: Option<usize>,
    pub max_file_chars: Option<usize>,
    pub max_diff_lines: Option<usize>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct ThemeFileConfig {
    pub format: Option<String>,
    pub exclude: Option<String>,
    pub shell: Option<Shell>,
    pub symbol: Option<String>,
    pub output: Option<PathBuf>,
    pub colors: Option<Palette>,
}

/// Return `~/.config/shellkit.toml`
fn config_path() -> Option<PathBuf> {
    let home = dirs::home_dir()?;
    Some(home.join(".config").join("shellkit.toml"))
}

fn load_file_config() -> Result<FileConfig> {
    let Some(path) = config_path() else {
        return Ok(FileConfig::default());
    };
    if !path.exists() {
        return Ok(FileConfig::default());
    }

    let data = fs::read_to_string(&path)
        .with_context(|| format!("failed to read config {}", path.display()))?;
    log::debug!("Loaded config from {}", path.display());
    parse_file_config(&data).with_context(|| format!("invalid config {}", path.display()))
}

pub fn parse_file_config(data: &str) -> Result<FileConfig> {
    Ok(toml::from_str::<FileConfig>(data)?)
}
