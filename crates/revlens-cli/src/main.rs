mod analyze;

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use analyze::{run_analyze, AnalyzeArgs};

#[derive(Debug, Parser)]
#[command(name = "revlens")]
#[command(about = "Review analysis from CSV exports")]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Analyze review exports and write every generated artifact as a Word document
    Analyze(AnalyzeArgs),
    /// Render a CSV export as a paginated PDF
    Convert {
        /// Source CSV file
        csv: PathBuf,
        /// Destination PDF file (overwritten)
        pdf: PathBuf,
    },
    /// Print the text of a PDF
    Extract {
        /// PDF file to read
        pdf: PathBuf,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let config = revlens_core::load_app_config()?;
    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(config.log_level.clone()))?;
    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    match cli.command {
        Some(Commands::Analyze(args)) => {
            let written = run_analyze(&config, &args).await?;
            println!("wrote {} document(s) to {}", written.len(), args.out.display());
        }
        Some(Commands::Convert { csv, pdf }) => {
            revlens_docs::csv_to_pdf(&csv, &pdf)?;
            println!("{}", pdf.display());
        }
        Some(Commands::Extract { pdf }) => {
            print!("{}", revlens_docs::extract_text(&pdf)?);
        }
        None => println!("revlens: run `revlens --help` for available commands"),
    }

    Ok(())
}
