use std::path::{Path, PathBuf};

use anyhow::{bail, Context};
use clap::{Parser, Subcommand};
use folio_catalog::{missing_keys, DirSource};
use folio_core::memory::MemoryPage;
use folio_core::timeline::TimelineContainer;
use folio_core::{
    apply, rebuild_timeline, LocaleCode, ManualDriver, Phase, SiteConfig, TypingMachine,
};

#[derive(Parser, Debug)]
#[command(
    name = "folio-cli",
    about = "Check locale resources and preview localized page behaviour offline."
)]
struct Args {
    /// Directory holding `<code>.json` locale resources.
    #[arg(short, long, default_value = "site/lang")]
    dir: PathBuf,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Load every locale and list keys missing relative to a reference locale.
    Check {
        #[arg(short, long, default_value = "de")]
        reference: String,
    },
    /// Print the frames of the typing animation for the given keys.
    Typing {
        #[arg(short, long)]
        locale: String,
        /// Translation keys of the texts to type, in order.
        #[arg(short, long, value_delimiter = ',', required = true)]
        keys: Vec<String>,
        /// Number of steps to run.
        #[arg(short, long, default_value_t = 40)]
        steps: usize,
    },
    /// Translate and decorate a timeline fixture, printing the resulting HTML.
    Timeline {
        /// JSON file holding one timeline container.
        #[arg(short, long)]
        input: PathBuf,
        #[arg(short, long)]
        locale: String,
        #[arg(long, default_value = "fa fa-briefcase")]
        icon: String,
    },
}

fn main() -> anyhow::Result<()> {
    let args = Args::parse();
    let source = DirSource::new(&args.dir);

    match args.command {
        Command::Check { reference } => check(&source, &reference),
        Command::Typing {
            locale,
            keys,
            steps,
        } => typing(&source, &locale, &keys, steps),
        Command::Timeline {
            input,
            locale,
            icon,
        } => timeline(&source, &input, &locale, &icon),
    }
}

fn check(source: &DirSource, reference: &str) -> anyhow::Result<()> {
    let reference = LocaleCode::parse(reference)?;
    let base = source
        .load(reference)
        .with_context(|| format!("Cannot load reference locale {reference}"))?;
    println!("{reference}: {} keys", base.len());

    let mut failures = 0;
    for locale in LocaleCode::ALL.into_iter().filter(|l| *l != reference) {
        match source.load(locale) {
            Ok(catalog) => {
                let missing = missing_keys(&base, &catalog);
                println!("{locale}: {} keys, {} missing", catalog.len(), missing.len());
                for key in missing {
                    println!("  - {key}");
                }
            }
            Err(err) => {
                failures += 1;
                println!("{locale}: {err}");
            }
        }
    }

    if failures > 0 {
        bail!("{failures} locale resource(s) could not be loaded");
    }
    Ok(())
}

fn typing(source: &DirSource, locale: &str, keys: &[String], steps: usize) -> anyhow::Result<()> {
    let locale = LocaleCode::parse(locale)?;
    let catalog = source.load(locale)?;
    let texts: Vec<String> = keys
        .iter()
        .map(|key| {
            catalog
                .get(key)
                .map(str::to_string)
                .with_context(|| format!("Key {key:?} missing from {locale}"))
        })
        .collect::<anyhow::Result<_>>()?;

    let mut machine = TypingMachine::new(ManualDriver::new(), SiteConfig::default().typing);
    machine.reset(texts);

    for _ in 0..steps {
        if machine.run_next().is_none() {
            break;
        }
        let marker = match machine.phase() {
            Phase::Typing => '>',
            Phase::Erasing => '<',
            Phase::Idle => ' ',
        };
        println!(
            "{:>7}ms {marker} [{}] {}",
            machine.driver().now_ms(),
            machine.text_index(),
            machine.rendered()
        );
    }
    Ok(())
}

fn timeline(source: &DirSource, input: &Path, locale: &str, icon: &str) -> anyhow::Result<()> {
    let locale = LocaleCode::parse(locale)?;
    let catalog = source.load(locale)?;
    let data = std::fs::read_to_string(input)
        .with_context(|| format!("Cannot read file {:?}", input))?;
    let container: TimelineContainer =
        serde_json::from_str(&data).with_context(|| format!("Invalid timeline in {:?}", input))?;
    let id = container.id.clone();

    let mut page = MemoryPage::new();
    page.push_timeline(container);
    let report = apply(&mut page, &catalog, locale);
    rebuild_timeline(&mut page, &id, icon);

    if !report.missing.is_empty() {
        eprintln!("missing keys: {}", report.missing.join(", "));
    }
    let rebuilt = page
        .timeline(&id)
        .context("Timeline vanished during rebuild")?;
    println!("{}", rebuilt.to_html());
    Ok(())
}
