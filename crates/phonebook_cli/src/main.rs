//! Console entry point for the phonebook.
//!
//! # Responsibility
//! - Map subcommands onto `phonebook_core` services.
//! - Snapshot settings once per invocation and pass them down explicitly.

use anyhow::{bail, Context, Result};
use clap::{Args, Parser, Subcommand};
use log::info;
use phonebook_core::db::open_db;
use phonebook_core::{
    default_log_level, init_logging, phone_to_digit_stream, PhonebookService, Record,
    RecordField, SerialFormat, Settings, SqliteRecordStore, UniquenessPolicy,
};
use std::path::{Path, PathBuf};

const APP_DIR: &str = "phonebook";

#[derive(Parser)]
#[command(name = "phonebook", version, about = "Personal contact records")]
struct Cli {
    /// Settings file; defaults to the platform config directory.
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[arg(long, global = true)]
    log_level: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Add a record if the active write rule admits it.
    Add(RecordArgs),
    /// List records containing every given field value.
    Find(RecordArgs),
    /// List every record.
    List,
    /// Delete records containing every given field value.
    Delete {
        #[command(flatten)]
        query: RecordArgs,
        /// Required to delete with an empty query.
        #[arg(long)]
        all: bool,
    },
    /// Overwrite one field on records whose field contains `--match`.
    Update {
        field: RecordField,
        #[arg(long = "match")]
        matching: String,
        #[arg(long = "set")]
        value: String,
    },
    /// Overwrite every field on records matching the `--match-*` values.
    UpdateAll {
        #[command(flatten)]
        query: MatchArgs,
        #[command(flatten)]
        updated: RecordArgs,
    },
    /// Export every record using the configured or given format.
    Export {
        #[arg(long)]
        out: Option<PathBuf>,
        #[arg(long)]
        format: Option<SerialFormat>,
    },
    #[command(subcommand)]
    Config(ConfigCommand),
}

#[derive(Subcommand)]
enum ConfigCommand {
    Show,
    SetFormat { format: SerialFormat },
    /// none|name|phone|address|all, or legacy codes 1..5.
    SetRule { rule: UniquenessPolicy },
    SetDataDir { dir: PathBuf },
}

#[derive(Args)]
struct RecordArgs {
    #[arg(long)]
    name: Option<String>,
    #[arg(long)]
    phone: Option<String>,
    #[arg(long)]
    address: Option<String>,
}

#[derive(Args)]
struct MatchArgs {
    #[arg(long)]
    match_name: Option<String>,
    #[arg(long)]
    match_phone: Option<String>,
    #[arg(long)]
    match_address: Option<String>,
}

impl RecordArgs {
    fn to_record(&self) -> Result<Record> {
        build_record(&self.name, &self.phone, &self.address)
    }
}

impl MatchArgs {
    fn to_record(&self) -> Result<Record> {
        build_record(&self.match_name, &self.match_phone, &self.match_address)
    }
}

fn build_record(
    name: &Option<String>,
    phone: &Option<String>,
    address: &Option<String>,
) -> Result<Record> {
    let phone = phone
        .as_deref()
        .map(phone_to_digit_stream)
        .transpose()
        .context("invalid --phone value")?;
    Ok(Record {
        name: name.clone(),
        phone,
        address: address.clone(),
    })
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let config_path = match cli.config {
        Some(path) => path,
        None => default_config_path(),
    };
    let mut settings = Settings::load_or_init(&config_path, default_data_dir())
        .with_context(|| format!("failed to load settings from {}", config_path.display()))?;
    std::fs::create_dir_all(&settings.data_dir).with_context(|| {
        format!(
            "failed to create data directory {}",
            settings.data_dir.display()
        )
    })?;

    start_logging(cli.log_level.as_deref(), &settings.data_dir);

    info!(
        "event=cli_start module=cli status=ok format={} write_auth_rule={}",
        settings.serial_format, settings.write_auth_rule
    );

    let command = match cli.command {
        Command::Config(command) => return run_config(command, &mut settings, &config_path),
        other => other,
    };

    let conn = open_db(settings.records_db_path()).context("failed to open record storage")?;
    let service = PhonebookService::new(SqliteRecordStore::new(&conn))?;

    match command {
        Command::Add(args) => {
            let record = args.to_record()?;
            if service.add_record(&record, settings.write_auth_rule)? {
                println!("added: {record}");
            } else {
                println!(
                    "rejected: an existing record conflicts under write rule `{}`",
                    settings.write_auth_rule
                );
            }
        }
        Command::Find(args) => print_records(&service.find(&args.to_record()?)?),
        Command::List => print_records(&service.list()?),
        Command::Delete { query, all } => {
            let query = query.to_record()?;
            if query.is_unconstrained() && !all {
                bail!("refusing to delete every record without --all");
            }
            println!("deleted {} record(s)", service.remove(&query)?);
        }
        Command::Update {
            field,
            matching,
            value,
        } => {
            if matching.is_empty() {
                bail!("--match cannot be empty");
            }
            let (matching, value) = if field == RecordField::Phone {
                (phone_to_digit_stream(&matching)?, phone_to_digit_stream(&value)?)
            } else {
                (matching, value)
            };
            let query = single_field(field, matching);
            let updated = single_field(field, value);
            let changed = service.update_field(field, &query, &updated)?;
            println!("updated {changed} record(s)");
        }
        Command::UpdateAll { query, updated } => {
            let query = query.to_record()?;
            if query.is_unconstrained() {
                bail!("at least one --match-* value is required");
            }
            let changed = service.update_all_fields(&query, &updated.to_record()?)?;
            println!("updated {changed} record(s)");
        }
        Command::Export { out, format } => {
            let format = format.unwrap_or(settings.serial_format);
            let destination = out.unwrap_or_else(|| settings.export_path_for(format));
            let entries = service.export(format, &destination)?;
            println!(
                "exported {entries} entries as {format} to {}",
                destination.display()
            );
        }
        Command::Config(_) => unreachable!("handled before opening storage"),
    }

    Ok(())
}

fn run_config(command: ConfigCommand, settings: &mut Settings, config_path: &Path) -> Result<()> {
    match command {
        ConfigCommand::Show => {
            println!("{:<18}{}", "CONFIG_PATH", config_path.display());
            println!("{:<18}{}", "DATA_DIRECTORY", settings.data_dir.display());
            println!("{:<18}{}", "SERIAL_FORMAT", settings.serial_format);
            println!("{:<18}{}", "WRITE_AUTH_RULE", settings.write_auth_rule);
            return Ok(());
        }
        ConfigCommand::SetFormat { format } => settings.set_serial_format(format),
        ConfigCommand::SetRule { rule } => settings.set_write_auth_rule(rule),
        ConfigCommand::SetDataDir { dir } => settings.set_data_dir(dir)?,
    }
    settings.save(config_path)?;
    println!("settings saved to {}", config_path.display());
    Ok(())
}

fn single_field(field: RecordField, value: String) -> Record {
    match field {
        RecordField::Name => Record::query().with_name(value),
        RecordField::Phone => Record::query().with_phone(value),
        RecordField::Address => Record::query().with_address(value),
    }
}

fn print_records(records: &[Record]) {
    for record in records {
        println!("{record}");
    }
    println!("{} record(s)", records.len());
}

fn start_logging(level: Option<&str>, data_dir: &Path) {
    let log_dir = match std::path::absolute(data_dir.join("logs")) {
        Ok(dir) => dir,
        Err(err) => {
            eprintln!("logging disabled: {err}");
            return;
        }
    };
    if let Err(err) = init_logging(level.unwrap_or(default_log_level()), &log_dir) {
        eprintln!("logging disabled: {err}");
    }
}

fn default_config_path() -> PathBuf {
    dirs::config_dir()
        .map(|dir| dir.join(APP_DIR))
        .unwrap_or_else(|| PathBuf::from("config"))
        .join("config.toml")
}

fn default_data_dir() -> PathBuf {
    dirs::data_dir()
        .map(|dir| dir.join(APP_DIR))
        .unwrap_or_else(|| PathBuf::from("data"))
}
