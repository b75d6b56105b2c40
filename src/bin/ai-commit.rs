use anyhow::{Result, bail};
use clap::Parser;
use colored::Colorize;
use indicatif::{ProgressBar, ProgressStyle};
use std::time::Duration;

use shellkit::cli_args::CommitCli;
use shellkit::config::CommitConfig;
use shellkit::diff_report;
use shellkit::git::{self, GitRepo};
use shellkit::{llm, logging, setup};

fn spinner(message: &str) -> ProgressBar {
    let pb = ProgressBar::new_spinner();
    if let Ok(style) = ProgressStyle::default_spinner().template("{spinner:.green} {msg}") {
        pb.set_style(style);
    }
    pb.set_message(message.to_string());
    pb.enable_steady_tick(Duration::from_millis(100));
    pb
}

fn main() -> Result<()> {
    let cli = CommitCli::parse();
    logging::init_logger(cli.verbose);

    let cfg = CommitConfig::from_sources(&cli)?;
    let repo = GitRepo::open()?;
    log::info!("Repository: {}", repo.root().display());

    if cli.all {
        git::stage_all()?;
    }

    let report = diff_report::gather(&repo, &cfg.limits)?;
    if report.is_empty() {
        println!("No changes found.");
        return Ok(());
    }
    log::trace!("Diff report:\n{}", report.text);

    let committing = !cli.dry_run && !cli.apply;
    if committing && !report.has_staged() {
        bail!("nothing staged to commit; stage files first or pass --all");
    }

    for title in &report.omitted_sections {
        log::warn!("{title} omitted from the prompt to stay within {} chars", cfg.limits.max_total_chars);
    }

    let client = setup::build_llm_client(&cfg)?;
    let branch = git::current_branch().unwrap_or_else(|err| {
        log::debug!("no branch name ({err}); using HEAD");
        "HEAD".to_string()
    });

    let progress = (!cfg.stream).then(|| spinner("Generating commit message..."));
    let raw = client.generate_commit_message(&branch, &report.text, cli.context.as_deref());
    if let Some(pb) = progress {
        pb.finish_and_clear();
    }
    let message = llm::clean_message(&raw?)?;

    println!();
    println!("----- Commit Message Preview -----");
    println!("{message}");
    println!("----------------------------------");

    if cli.dry_run {
        return Ok(());
    }

    if cli.apply {
        let path = git::write_commit_editmsg(&message)?;
        println!("{} Wrote commit message to {}", "✔".green(), path.display());
        return Ok(());
    }

    git::commit_with_message(&message)?;
    println!("{} Committed to {branch}", "✔".green());
    Ok(())
}
