//! cardfix CLI
//!
//! Command-line tool for reconciling the card database against correction sources.

mod logging;

use cardfix_core::{
    reconcile_store, run_batch, run_dedupe, run_rarity, BatchFile, BatchSource, CardStore,
    LoadedSource, Rarity, Rewrite, SourceKind, SourceReport,
};
use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};

/// Number of parsed corrections echoed before a wiki merge
const SAMPLE_SIZE: usize = 5;

#[derive(Parser)]
#[command(name = "cardfix")]
#[command(about = "Reconcile the card database against correction sources", long_about = None)]
#[command(version)]
struct Cli {
    /// Path to the canonical card store
    #[arg(short, long, global = true, default_value = "src/data/cards.json")]
    cards: PathBuf,

    /// Log every changed card
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Fix cards from the tab-separated source of truth
    Authoritative {
        /// Path to the authoritative export
        source: PathBuf,
    },

    /// Update cards from tab-separated wiki data
    Wiki {
        /// Path to the wiki export (ID, Name, Type, Race, Level, ATK, DEF, Password, Cost)
        source: PathBuf,
    },

    /// Import manually reviewed corrections from CSV
    Corrections {
        /// Path to the corrections CSV
        source: PathBuf,
    },

    /// Assign rarities from starchip costs in the authoritative export
    Rarity {
        /// Path to the authoritative export
        source: PathBuf,
    },

    /// Rename duplicate card names
    Dedupe {
        /// Lowest id that may be renamed
        #[arg(long, default_value_t = *cardfix_core::DEFAULT_RENAMABLE_IDS.start())]
        min_id: u32,

        /// Highest id that may be renamed
        #[arg(long, default_value_t = *cardfix_core::DEFAULT_RENAMABLE_IDS.end())]
        max_id: u32,
    },

    /// Apply several sources from a batch file
    Batch {
        /// Path to batch file (JSON)
        batch: PathBuf,
    },

    /// Create a batch file template
    CreateBatch {
        /// Output path for the batch file
        output: PathBuf,

        /// Sources to include (kind:path, kind is authoritative, wiki or manual)
        #[arg(short, long = "source")]
        sources: Vec<String>,
    },
}

fn main() {
    let cli = Cli::parse();
    logging::init_logging(cli.verbose);

    if let Err(e) = run(cli) {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

fn run(cli: Cli) -> cardfix_core::Result<()> {
    let store = CardStore::new(&cli.cards);

    match cli.command {
        Commands::Authoritative { source } => {
            cmd_reconcile(&store, SourceKind::Authoritative, &source)
        }
        Commands::Wiki { source } => cmd_reconcile(&store, SourceKind::Wiki, &source),
        Commands::Corrections { source } => cmd_reconcile(&store, SourceKind::Manual, &source),
        Commands::Rarity { source } => cmd_rarity(&store, &source),
        Commands::Dedupe { min_id, max_id } => cmd_dedupe(&store, min_id, max_id),
        Commands::Batch { batch } => cmd_batch(&batch),
        Commands::CreateBatch { output, sources } => {
            cmd_create_batch(&output, &cli.cards, &sources)
        }
    }
}

fn cmd_reconcile(store: &CardStore, kind: SourceKind, source: &Path) -> cardfix_core::Result<()> {
    println!("Loading {} corrections from {}...", kind, source.display());
    let loaded = LoadedSource::load(kind, source)?;
    println!(
        "Loaded {} corrections ({} lines skipped)",
        loaded.set.len(),
        loaded.set.skipped.len()
    );

    if kind == SourceKind::Wiki {
        println!();
        println!("Sample cards:");
        for correction in loaded.set.corrections.values().take(SAMPLE_SIZE) {
            println!("  {:03}: {}", correction.id, correction.name);
        }
    }

    println!();
    println!("Updating {}...", store.path().display());
    let result = reconcile_store(store, std::slice::from_ref(&loaded))?;

    for report in &result.outcome {
        print_source_report(report);
    }
    print_rewrite(&result);

    Ok(())
}

fn cmd_batch(batch_path: &Path) -> cardfix_core::Result<()> {
    let batch = BatchFile::load(batch_path)?;

    println!("Running batch with {} sources", batch.sources.len());
    println!("Cards: {}", batch.cards.display());
    println!();

    let result = run_batch(&batch)?;

    for report in &result.outcome {
        println!("Source: {} ({})", report.path.display(), report.kind);
        print_source_report(report);
        println!();
    }
    print_rewrite(&result);

    Ok(())
}

fn cmd_rarity(store: &CardStore, source: &Path) -> cardfix_core::Result<()> {
    let result = run_rarity(store, source)?;
    let report = &result.outcome;

    println!("Assigned rarity from starchip cost to {} cards", report.from_cost);
    println!("Assigned default rarity to {} cards without data", report.defaulted);
    println!("{} cards changed", report.changed);
    println!();
    println!("Rarity distribution:");
    for rarity in Rarity::ALL {
        let count = report.distribution.get(&rarity).copied().unwrap_or_default();
        println!("  {}: {}", rarity, count);
    }
    print_rewrite(&result);

    Ok(())
}

fn cmd_dedupe(store: &CardStore, min_id: u32, max_id: u32) -> cardfix_core::Result<()> {
    let result = run_dedupe(store, &(min_id..=max_id))?;
    let report = &result.outcome;

    println!("Found {} card names with duplicates", report.duplicated_names);
    for rename in &report.renames {
        println!("  Renamed card {}: \"{}\" -> \"{}\"", rename.id, rename.from, rename.to);
    }
    println!();
    println!("Renamed {} duplicate cards", report.renames.len());
    if report.remaining_duplicates == 0 {
        println!("No duplicates remain");
    } else {
        println!(
            "Warning: {} names are still shared by several cards",
            report.remaining_duplicates
        );
    }
    print_rewrite(&result);

    Ok(())
}

fn cmd_create_batch(output: &Path, cards: &Path, specs: &[String]) -> cardfix_core::Result<()> {
    let mut sources = Vec::new();

    // Parse sources: "kind:path"
    for spec in specs {
        let Some((kind, path)) = spec.split_once(':') else {
            eprintln!("Warning: Invalid source format '{}', expected 'kind:path'", spec);
            continue;
        };

        match kind.parse::<SourceKind>() {
            Ok(kind) => sources.push(BatchSource::new(kind, path)),
            Err(e) => eprintln!("Warning: {}", e),
        }
    }

    // If no sources provided, add placeholders
    if sources.is_empty() {
        sources.push(BatchSource::new(SourceKind::Authoritative, "ogmonsters"));
        sources.push(BatchSource::new(SourceKind::Manual, "corrected_cards.csv"));
    }

    let batch = BatchFile {
        cards: cards.to_path_buf(),
        sources,
    };
    batch.save(output)?;

    println!("Created batch file: {}", output.display());
    println!("Sources: {}", batch.sources.len());
    println!();
    println!("Edit the file to configure your batch, then run:");
    println!("  cardfix batch {}", output.display());

    Ok(())
}

fn print_source_report(report: &SourceReport) {
    for change in &report.report.changes {
        println!("  Updated card {:03}: {}", change.id, change.name);
    }
    if !report.report.unknown_ids.is_empty() {
        println!(
            "  Ignored {} corrections for unknown card ids",
            report.report.unknown_ids.len()
        );
    }
    println!("Updated {} {}", report.updates(), report.kind.update_unit());
    println!("Total corrections applied: {}", report.report.corrections_applied);
}

fn print_rewrite<T>(result: &Rewrite<T>) {
    println!();
    println!("Backup saved to: {}", result.backup.display());
    println!("Saved {} cards to: {}", result.cards, result.saved.display());
}
