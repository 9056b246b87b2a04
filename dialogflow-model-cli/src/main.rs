use std::fs;
use std::path::PathBuf;

use clap::{Parser, Subcommand};
use dialogflow_model::traits::JsonDocument;
use dialogflow_model::{CanonicalModel, ConversionOptions, Exporter, IdStrategy, Importer};
use dialogflow_model_cli::validation::{validate_agent_dir, validate_locale, validate_model_file};
use dialogflow_model_cli::{logging, read_agent_dir, write_agent_dir};
use tracing::info;

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Print debug logging to stderr
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    commands: Commands,
}

/// Supported subcommands.
#[derive(Subcommand, Debug)]
enum Commands {
    /// Read a Dialogflow agent directory into a canonical model.
    Import {
        /// The agent directory containing `intents/` and `entities/`
        #[arg(short, long)]
        input: String,

        /// Locale of the user-says and entries files to read
        #[arg(short, long)]
        locale: String,

        /// The model file to write; stdout when omitted
        #[arg(short, long)]
        output: Option<String>,
    },

    /// Write a canonical model out as Dialogflow agent files.
    Export {
        /// The model file to read (current or legacy layout)
        #[arg(short, long)]
        input: String,

        /// Locale suffix for the user-says and entries files
        #[arg(short, long)]
        locale: String,

        /// The agent directory to write into
        #[arg(short, long)]
        output: String,

        /// Derive record ids from names instead of generating random ones
        #[arg(long)]
        deterministic_ids: bool,
    },
}

fn main() {
    let args = Args::parse();
    logging::init(args.verbose);

    let result = match args.commands {
        Commands::Import {
            input,
            locale,
            output,
        } => run_import(&input, &locale, output.as_deref()),
        Commands::Export {
            input,
            locale,
            output,
            deterministic_ids,
        } => run_export(&input, &locale, &output, deterministic_ids),
    };

    if let Err(e) = result {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

fn run_import(input: &str, locale: &str, output: Option<&str>) -> Result<(), String> {
    validate_locale(locale)?;
    validate_agent_dir(input)?;

    let files = read_agent_dir(&PathBuf::from(input))?;
    info!(count = files.len(), "read agent files");

    let model = Importer::new(ConversionOptions::new(locale)).import(&files);
    match output {
        Some(path) => model
            .write_to(path)
            .map_err(|e| format!("Cannot write {}: {}", path, e)),
        None => {
            let text = model.to_json_string().map_err(|e| e.to_string())?;
            println!("{}", text);
            Ok(())
        }
    }
}

fn run_export(
    input: &str,
    locale: &str,
    output: &str,
    deterministic_ids: bool,
) -> Result<(), String> {
    validate_locale(locale)?;
    validate_model_file(input)?;

    let text = fs::read_to_string(input).map_err(|e| format!("Cannot read {}: {}", input, e))?;
    let mut model = CanonicalModel::from_json_str(&text)
        .map_err(|e| format!("Cannot parse {}: {}", input, e))?;

    let id_strategy = if deterministic_ids {
        IdStrategy::Deterministic
    } else {
        IdStrategy::Random
    };
    let options = ConversionOptions::new(locale).with_id_strategy(id_strategy);
    let files = Exporter::new(options)
        .export(&mut model)
        .map_err(|e| e.to_string())?;

    write_agent_dir(&PathBuf::from(output), &files)?;
    info!(count = files.len(), output, "wrote agent files");
    Ok(())
}
