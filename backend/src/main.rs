//! Shopmigrate CLI - Convert store exports to Shopify import CSVs
//!
//! ```bash
//! shopmigrate customers customers.csv -o shopify_customers.csv
//! shopmigrate products catalog.csv --base-url https://shop.example.com/media/catalog/product
//! shopmigrate inspect catalog.csv      # Show encoding, separator and mapped columns
//! shopmigrate serve                    # Start HTTP server (port 3000)
//! ```

use clap::{Parser, Subcommand};
use shopmigrate::api::logs::log_error;
use shopmigrate::parser::{header::LogicalField, tokenize_line, HeaderIndex};
use shopmigrate::transform::inspect_customer_header;
use shopmigrate::transform::ProductField;
use shopmigrate::{
    convert_customers_file, convert_products_file, decode_bytes_auto, detect_delimiter, Config,
};
use std::fs;
use std::path::{Path, PathBuf};

type CliResult = Result<(), Box<dyn std::error::Error>>;

#[derive(Parser)]
#[command(name = "shopmigrate")]
#[command(about = "Convert store customer and product exports to Shopify import CSVs", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Convert a customer export
    Customers {
        /// Input CSV file
        input: PathBuf,

        /// Output file (default: stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Print the full outcome as JSON instead of CSV
        #[arg(long)]
        json: bool,
    },

    /// Convert a product export
    Products {
        /// Input CSV file
        input: PathBuf,

        /// Base URL for relative image paths (default: SHOPMIGRATE_IMAGE_BASE_URL)
        #[arg(short, long)]
        base_url: Option<String>,

        /// Output file (default: stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Print the full outcome as JSON instead of CSV
        #[arg(long)]
        json: bool,
    },

    /// Show how a file would be read
    Inspect {
        /// Input CSV file
        input: PathBuf,
    },

    /// Start HTTP server
    Serve {
        /// Port to listen on (default: SHOPMIGRATE_PORT or 3000)
        #[arg(short, long)]
        port: Option<u16>,
    },
}

#[tokio::main]
async fn main() {
    // Load .env file (if present)
    dotenvy::dotenv().ok();

    let cli = Cli::parse();
    let config = Config::from_env();

    let result = match cli.command {
        Commands::Customers {
            input,
            output,
            json,
        } => cmd_customers(&input, output.as_deref(), json),

        Commands::Products {
            input,
            base_url,
            output,
            json,
        } => cmd_products(&config, &input, base_url.as_deref(), output.as_deref(), json),

        Commands::Inspect { input } => cmd_inspect(&input),

        Commands::Serve { port } => cmd_serve(config, port).await,
    };

    if let Err(e) = result {
        log_error(format!("Error: {}", e));
        std::process::exit(1);
    }
}

fn cmd_customers(input: &Path, output: Option<&Path>, json: bool) -> CliResult {
    eprintln!("📄 Processing: {}", input.display());

    let outcome = convert_customers_file(input)?;
    let content = if json {
        serde_json::to_string_pretty(&outcome)?
    } else {
        outcome.to_csv()
    };
    write_output(&content, output)
}

fn cmd_products(
    config: &Config,
    input: &Path,
    base_url: Option<&str>,
    output: Option<&Path>,
    json: bool,
) -> CliResult {
    eprintln!("📄 Processing: {}", input.display());

    let outcome = convert_products_file(input, config.base_url_or(base_url))?;
    let content = if json {
        serde_json::to_string_pretty(&outcome)?
    } else {
        outcome.to_csv()
    };
    write_output(&content, output)
}

fn cmd_inspect(input: &Path) -> CliResult {
    let bytes = fs::read(input)?;
    let decoded = decode_bytes_auto(&bytes);

    println!("File:      {}", input.display());
    println!("Encoding:  {}", decoded.encoding);

    let Some(first) = decoded.text.lines().find(|l| !l.trim().is_empty()) else {
        println!("(empty file)");
        return Ok(());
    };
    let delimiter = detect_delimiter(first);
    println!("Separator: '{}'", format_delimiter(delimiter));

    match inspect_customer_header(&decoded.text) {
        Some((line, index)) => {
            println!("\nCustomer header on line {}:", line);
            print_mapping(&index);
        }
        None => println!("\nNo customer header in the first lines"),
    }

    let products = HeaderIndex::<ProductField>::resolve(&tokenize_line(first, delimiter));
    if products.contains(ProductField::Sku) {
        println!("\nProduct header on line 1:");
        print_mapping(&products);
    } else {
        println!("\nNot a product export (no sku column)");
    }

    Ok(())
}

fn print_mapping<F: LogicalField>(index: &HeaderIndex<F>) {
    for (field, column) in index.resolved() {
        println!("   {:<24} <- column {} ({})", field.name(), column + 1, index.columns()[column]);
    }
}

fn format_delimiter(d: char) -> String {
    match d {
        '\t' => "\\t".to_string(),
        c => c.to_string(),
    }
}

async fn cmd_serve(config: Config, port: Option<u16>) -> CliResult {
    let config = match port {
        Some(port) => config.with_port(port),
        None => config,
    };
    shopmigrate::server::start_server(config).await?;
    Ok(())
}

fn write_output(content: &str, path: Option<&Path>) -> CliResult {
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
