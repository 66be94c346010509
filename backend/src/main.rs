//! Logmap CLI - turn pilot logbooks into resolved flight records
//!
//! # Main Commands
//!
//! ```bash
//! logmap serve                          # Start HTTP server (port 3000)
//! logmap import logbook.csv             # Import a logbook, print flights JSON
//! logmap import scan.txt --from 1 --to 2
//! ```
//!
//! # Debug Commands
//!
//! ```bash
//! logmap resolve PAL --context RPLN     # Show candidates and scores for a code
//! logmap rows pages.json                # Show tokenized rows and their classification
//! ```
//!
//! # Data Commands
//!
//! ```bash
//! logmap build-directory airports.csv -o data/airports.json   # Convert the OurAirports export
//! ```

use clap::{Parser, Subcommand};
use logmap::{
    classify_row, import_file, parse_file, AirportDirectory, AirportResolver, AppConfig,
    ColumnLayout, ImportOptions, ImportStatus, Logbook, SourceFormat,
};
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

#[derive(Parser)]
#[command(name = "logmap")]
#[command(about = "Import pilot logbooks and resolve their airports", long_about = None)]
struct Cli {
    /// Airport dataset (default: LOGMAP_AIRPORTS or data/airports.json)
    #[arg(long, global = true)]
    airports: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Import a logbook file (.csv, .txt, or .json PDF rows)
    Import {
        /// Input file
        input: PathBuf,

        /// Departure column index
        #[arg(long, requires = "to")]
        from: Option<usize>,

        /// Arrival column index
        #[arg(long, requires = "from")]
        to: Option<usize>,

        /// Logbook name
        #[arg(short, long, default_value = "Logbook 1")]
        logbook: String,

        /// Rows per concurrent batch (default: LOGMAP_BATCH_SIZE or 20)
        #[arg(long)]
        batch_size: Option<usize>,

        /// Output file for flights JSON (default: stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Show how a code resolves
    Resolve {
        /// Airport code
        code: String,

        /// Codes found in the same row's remarks
        #[arg(short, long, value_delimiter = ',')]
        context: Vec<String>,
    },

    /// Show tokenized rows with their classification
    Rows {
        /// Input file
        input: PathBuf,
    },

    /// Build the airport dataset from an OurAirports airports.csv
    BuildDirectory {
        /// OurAirports CSV export
        input: PathBuf,

        /// Output file for the dataset JSON (default: stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Start HTTP server
    Serve {
        /// Port to listen on (default: LOGMAP_PORT or 3000)
        #[arg(short, long)]
        port: Option<u16>,
    },
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    let result = match load_config(cli.airports) {
        Err(e) => Err(e),
        Ok(config) => match cli.command {
            Commands::Import {
                input,
                from,
                to,
                logbook,
                batch_size,
                output,
            } => {
                let options = ImportOptions {
                    from_column: from,
                    to_column: to,
                    batch_size: batch_size.unwrap_or(config.batch_size),
                };
                cmd_import(&config, &input, options, &logbook, output.as_deref()).await
            }

            Commands::Resolve { code, context } => cmd_resolve(&config, &code, &context),

            Commands::Rows { input } => cmd_rows(&config, &input),

            Commands::BuildDirectory { input, output } => {
                cmd_build_directory(&input, output.as_deref())
            }

            Commands::Serve { port } => cmd_serve(config, port).await,
        },
    };

    if let Err(e) = result {
        eprintln!("❌ Error: {}", e);
        std::process::exit(1);
    }
}

fn load_config(airports: Option<PathBuf>) -> Result<AppConfig, Box<dyn std::error::Error>> {
    let mut config = AppConfig::from_env()?;
    if let Some(path) = airports {
        config.airports_path = path;
    }
    Ok(config)
}

fn load_directory(config: &AppConfig) -> Result<AirportDirectory, Box<dyn std::error::Error>> {
    eprintln!("🗺️  Loading airports: {}", config.airports_path.display());
    let directory = AirportDirectory::load(&config.airports_path)?;
    eprintln!(
        "   {} airports, {} codes, {} shared codes, {} rejected",
        directory.len(),
        directory.index().len(),
        directory.duplicates().len(),
        directory.rejected()
    );
    Ok(directory)
}

fn resolver(config: &AppConfig) -> Result<AirportResolver, Box<dyn std::error::Error>> {
    let directory = load_directory(config)?;
    Ok(AirportResolver::new(Arc::new(directory), config.bias.clone()))
}

async fn cmd_import(
    config: &AppConfig,
    input: &Path,
    options: ImportOptions,
    name: &str,
    output: Option<&Path>,
) -> Result<(), Box<dyn std::error::Error>> {
    eprintln!("📄 Processing: {}", input.display());
    let resolver = resolver(config)?;
    let mut logbook = Logbook::new(name);

    let outcome = import_file(input, &resolver, logbook.session().distances(), options).await?;
    logbook.apply_import(&outcome);

    let stats = logbook.stats();
    eprintln!("\n📊 {}", logbook.name());
    eprintln!("   Flights:          {}", stats.flights);
    eprintln!("   Airports:         {}", stats.unique_airports);
    eprintln!("   Distance:         {:.0} km", stats.total_distance);
    eprintln!("   Total time:       {:.1} h", stats.total_time);
    eprintln!("   Cross country:    {:.1} h", stats.cross_country);
    eprintln!("   Night:            {:.1} h", stats.night);
    eprintln!("   Solo:             {:.1} h", stats.solo);
    eprintln!("   Actual IFR:       {:.1} h", stats.actual_instrument);
    eprintln!("   Rows skipped:     {}", outcome.rows_skipped);

    let missing = logbook.session().missing_airports();
    if !missing.is_empty() {
        eprintln!("\n⚠️  Missing airports: {}", missing.join(", "));
    }

    if let ImportStatus::NeedsColumnMapping { preview } = &outcome.status {
        eprintln!("\n⚠️  No flights found. First rows:");
        for (i, row) in preview.iter().enumerate() {
            let cells: Vec<String> = row.iter().enumerate().map(|(c, v)| format!("[{}] {}", c, v)).collect();
            eprintln!("   {}: {}", i + 1, cells.join("  "));
        }
        eprintln!("   Re-run with --from N --to N to assign the route columns.");
    }

    let json = serde_json::to_string_pretty(logbook.flights())?;
    write_output(&json, output)?;

    eprintln!("\n✨ Done!");
    Ok(())
}

fn cmd_resolve(config: &AppConfig, code: &str, context: &[String]) -> Result<(), Box<dyn std::error::Error>> {
    let resolver = resolver(config)?;
    let context: Vec<String> = context.iter().map(|c| c.trim().to_uppercase()).collect();

    let candidates = resolver.rank(code, &context);
    if candidates.is_empty() {
        return Err(format!("No airport uses the code {}", code.to_uppercase()).into());
    }

    eprintln!("\n🔎 {} candidate(s) for {}:", candidates.len(), code.to_uppercase());
    for c in &candidates {
        println!(
            "  {:>8.2}  {} ({}, {})",
            c.score,
            c.airport.name,
            c.airport.display_code(),
            c.airport.country
        );
        for reason in &c.reasons {
            println!("            - {}", reason);
        }
    }

    match resolver.best(code, &context) {
        Some(best) => eprintln!("\n✅ Resolved to {} ({})", best.airport.name, best.airport.display_code()),
        None => eprintln!("\n❌ No candidate scored above zero"),
    }
    Ok(())
}

fn cmd_rows(config: &AppConfig, input: &Path) -> Result<(), Box<dyn std::error::Error>> {
    let directory = load_directory(config)?;
    let parsed = parse_file(input)?;
    eprintln!("📄 {} ({}, {})", input.display(), parsed.format.as_str(), parsed.encoding);

    for group in &parsed.groups {
        if let Some(page) = group.page {
            println!("\n── Page {} ──", page);
        }
        let (layout, header_rows) = match parsed.format {
            SourceFormat::Delimited => ColumnLayout::for_delimited(&group.rows, &directory),
            _ => ColumnLayout::detect(&group.rows, &directory),
        };
        println!("layout: {}", serde_json::to_string(&layout)?);

        for (i, row) in group.rows.iter().enumerate() {
            let kind = if header_rows.contains(&i) {
                "header*".to_string()
            } else {
                format!("{:?}", classify_row(row, &directory)).to_lowercase()
            };
            println!("{:>4} {:<8} {}", i, kind, row.join(" | "));
        }
    }
    Ok(())
}

fn cmd_build_directory(input: &Path, output: Option<&Path>) -> Result<(), Box<dyn std::error::Error>> {
    eprintln!("🗺️  Converting: {}", input.display());
    let conversion = AirportDirectory::convert_ourairports(input)?;
    let directory = &conversion.directory;

    eprintln!("   Airports kept:    {}", directory.len());
    eprintln!("   Skipped by type:  {}", conversion.skipped_by_type);
    eprintln!("   Rejected:         {}", directory.rejected());
    eprintln!("   Shared codes:     {}", directory.duplicates().len());

    let json = serde_json::to_string_pretty(&directory.to_dataset())?;
    write_output(&json, output)?;

    eprintln!("\n✨ Done!");
    Ok(())
}

async fn cmd_serve(mut config: AppConfig, port: Option<u16>) -> Result<(), Box<dyn std::error::Error>> {
    if let Some(port) = port {
        config.port = port;
    }
    let directory = load_directory(&config)?;
    logmap::server::start_server(config, directory).await
}

fn write_output(content: &str, path: Option<&Path>) -> Result<(), Box<dyn std::error::Error>> {
    match path {
        Some(p) => {
            fs::write(p, content)?;
            eprintln!("💾 Output written to: {}", p.display());
        }
        None => {
            println!("{}", content);
        }
    }
    Ok(())
}
