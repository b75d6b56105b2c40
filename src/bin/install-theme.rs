use anyhow::Result;
use clap::Parser;
use colored::Colorize;

use shellkit::cli_args::{ThemeCli, normalize_theme_args};
use shellkit::config::ThemeSettings;
use shellkit::installer::{self, Destination, Summary};
use shellkit::{layout, logging, theme};

fn main() -> Result<()> {
    let cli = ThemeCli::parse_from(normalize_theme_args(std::env::args()));
    logging::init_logger(cli.verbose);

    let settings = ThemeSettings::from_sources(&cli)?;
    let layout = layout::compile(&settings.format, &settings.exclude);
    let summary = Summary::from_layout(&layout);
    let rendered = theme::render(&layout, &settings.theme);

    if cli.print {
        // keep stdout clean for redirection
        for line in summary.lines() {
            eprintln!("{line}");
        }
        if let Some(warning) = summary.warning() {
            eprintln!("{} {}", "Warning:".yellow().bold(), warning);
        }
        return installer::install(&rendered, &Destination::Stdout);
    }

    let path = settings.output_path()?;
    installer::install(&rendered, &Destination::File(path.clone()))?;

    for line in summary.lines() {
        println!("{line}");
    }
    if let Some(warning) = summary.warning() {
        println!("{} {}", "Warning:".yellow().bold(), warning);
    }
    println!(
        "{} {} prompt written to {}",
        "✔".green(),
        settings.theme.shell,
        path.display()
    );
    println!("{}", installer::source_hint(&path, settings.theme.shell));

    Ok(())
}
