//! form_oxide - build, fill and flatten PDF text-field forms
//!
//! Usage:
//!   form_oxide generate blank.pdf --config fields.json -o out.pdf
//!   form_oxide generate blank.pdf --config fields.json --data values.json --flatten -o out.pdf
//!   form_oxide extract form.pdf -o fields.json
//!   form_oxide sample --config fields.json -o values.json

use clap::{ArgAction, Parser, Subcommand};
use form_oxide::config::{BuilderConfig, FlattenOptions};
use form_oxide::error::{Error, Result};
use form_oxide::store::FieldStore;
use form_oxide::{pdf, sample, schema};
use serde_json::Value;
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

#[derive(Parser, Debug)]
#[command(name = "form_oxide")]
#[command(author, version, about = "Build, fill and flatten PDF text-field forms", long_about = None)]
struct Args {
    /// Use debug logging level
    #[arg(short = 'd', long, action = ArgAction::SetTrue, global = true)]
    debug: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Write the configured fields into a PDF, optionally filled and flattened
    Generate {
        /// Source PDF
        pdf: PathBuf,
        /// Field configuration (JSON)
        #[arg(short, long)]
        config: PathBuf,
        /// Output PDF
        #[arg(short, long)]
        output: PathBuf,
        /// Values to fill, as a JSON object of field name to value
        #[arg(long)]
        data: Option<PathBuf>,
        /// Draw values into the page content and remove the form
        #[arg(long, action = ArgAction::SetTrue)]
        flatten: bool,
    },
    /// Read the text fields of an existing form into a configuration file
    Extract {
        /// Source PDF
        pdf: PathBuf,
        /// Output configuration (JSON)
        #[arg(short, long)]
        output: PathBuf,
    },
    /// Write sample values for every configured field
    Sample {
        /// Field configuration (JSON)
        #[arg(short, long)]
        config: PathBuf,
        /// Output values (JSON)
        #[arg(short, long)]
        output: PathBuf,
    },
}

fn main() {
    let args = Args::parse();

    let level = if args.debug { "debug" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level)).init();

    if let Err(e) = run(args.command) {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

fn run(command: Command) -> Result<()> {
    match command {
        Command::Generate {
            pdf,
            config,
            output,
            data,
            flatten,
        } => generate(&pdf, &config, &output, data.as_deref(), flatten),
        Command::Extract { pdf, output } => {
            let bytes = fs::read(&pdf)?;
            let fields = pdf::extract_fields(&bytes)?;
            schema::export_config_file(&output, &fields)?;
            println!("Extracted {} fields to {}", fields.len(), output.display());
            Ok(())
        },
        Command::Sample { config, output } => {
            let config = schema::import_config_file(&config)?;
            let values = sample::sample_data(&config.form_fields);
            fs::write(&output, serde_json::to_string_pretty(&values)?)?;
            println!("Wrote {} sample values to {}", values.len(), output.display());
            Ok(())
        },
    }
}

fn generate(
    pdf_path: &Path,
    config_path: &Path,
    output: &Path,
    data: Option<&Path>,
    flatten: bool,
) -> Result<()> {
    let config = schema::import_config_file(config_path)?;
    let store = FieldStore::with_fields(BuilderConfig::default(), config.form_fields.clone());
    let duplicates = store.duplicate_names();
    if !duplicates.is_empty() {
        log::warn!("Duplicate field names share one value: {}", duplicates.join(", "));
    }

    let source = fs::read(pdf_path)?;
    let mut bytes = pdf::materialize_fields(&source, &config.form_fields)?;

    let values = data.map(load_values).transpose()?;
    let options = FlattenOptions::default();
    bytes = match (values, flatten) {
        (Some(values), true) => {
            pdf::fill_and_flatten(&bytes, &config.form_fields, &values, &options)?
        },
        (Some(values), false) => {
            let (filled, report) = pdf::fill_fields(&bytes, &values)?;
            if !report.unmatched.is_empty() {
                eprintln!("Warning: no field named {}", report.unmatched.join(", "));
            }
            filled
        },
        (None, true) => pdf::flatten_fields(&bytes, &config.form_fields, &options)?,
        (None, false) => bytes,
    };

    fs::write(output, &bytes)?;
    println!(
        "Wrote {} ({} fields{})",
        output.display(),
        config.form_fields.len(),
        if flatten { ", flattened" } else { "" }
    );
    Ok(())
}

/// Read a name→value map; numbers and booleans are stringified, nulls skipped.
fn load_values(path: &Path) -> Result<HashMap<String, String>> {
    let raw: Value = serde_json::from_str(&fs::read_to_string(path)?)?;
    let Value::Object(map) = raw else {
        return Err(Error::InvalidConfig(format!(
            "{}: expected a JSON object of field values",
            path.display()
        )));
    };
    Ok(map
        .into_iter()
        .filter_map(|(name, value)| match value {
            Value::String(s) => Some((name, s)),
            Value::Null => None,
            other => Some((name, other.to_string())),
        })
        .collect())
}
