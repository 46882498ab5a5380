use std::path::{Path, PathBuf};

use address_book_core::{column_index, AddressBookController, BookEvent, Person, SortOrder};
use address_book_store_sqlite::SqliteBookFile;
use anyhow::{anyhow, Context, Result};
use clap::{Args, Parser, Subcommand};
use serde_json::Value;
use tracing::{debug, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

const CLI_CONTRACT_VERSION: &str = "abook.v1";

type Controller = AddressBookController<SqliteBookFile>;

#[derive(Debug, Parser)]
#[command(name = "abook")]
#[command(about = "Address book CLI")]
struct Cli {
    /// Address book file to open and save.
    #[arg(long, env = "ABOOK_FILE", default_value = "./address_book.sqlite3")]
    file: PathBuf,

    /// Log filter used when `RUST_LOG` is unset.
    #[arg(long, env = "ABOOK_LOG", default_value = "warn")]
    log_level: String,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Append a person; creates the file when it does not exist yet.
    Add(PersonArgs),
    /// Replace fields of the person at an index; omitted fields keep their value.
    Edit(EditArgs),
    Remove(IndexArgs),
    Show(IndexArgs),
    List(ListArgs),
    Search(SearchArgs),
    Clear,
    Columns,
    Inspect,
}

#[derive(Debug, Args)]
struct PersonArgs {
    #[arg(long)]
    first_name: String,
    #[arg(long)]
    last_name: String,
    #[arg(long, default_value = "")]
    address: String,
    #[arg(long, default_value = "")]
    city: String,
    #[arg(long)]
    state: String,
    #[arg(long)]
    zip: String,
    #[arg(long)]
    phone: String,
}

#[derive(Debug, Args)]
struct EditArgs {
    #[arg(long)]
    index: usize,
    #[arg(long)]
    first_name: Option<String>,
    #[arg(long)]
    last_name: Option<String>,
    #[arg(long)]
    address: Option<String>,
    #[arg(long)]
    city: Option<String>,
    #[arg(long)]
    state: Option<String>,
    #[arg(long)]
    zip: Option<String>,
    #[arg(long)]
    phone: Option<String>,
}

#[derive(Debug, Args)]
struct IndexArgs {
    #[arg(long)]
    index: usize,
}

#[derive(Debug, Args)]
struct ListArgs {
    /// Column name or key, e.g. "Last Name" or `zip`.
    #[arg(long)]
    sort_by: Option<String>,
    #[arg(long, default_value_t = false)]
    descending: bool,
}

#[derive(Debug, Args)]
struct SearchArgs {
    query: String,
}

fn with_contract_version(value: Value) -> Value {
    match value {
        Value::Object(mut object) => {
            object.insert(
                "contract_version".to_string(),
                Value::String(CLI_CONTRACT_VERSION.to_string()),
            );
            Value::Object(object)
        }
        other => serde_json::json!({
            "contract_version": CLI_CONTRACT_VERSION,
            "payload": other
        }),
    }
}

fn emit_json(value: Value) -> Result<()> {
    let rendered = serde_json::to_string_pretty(&with_contract_version(value))?;
    println!("{rendered}");
    Ok(())
}

fn init_tracing(log_level: &str) -> Result<()> {
    let filter = match EnvFilter::try_from_default_env() {
        Ok(filter) => filter,
        Err(_) => EnvFilter::try_new(log_level)
            .with_context(|| format!("invalid log filter: {log_level}"))?,
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(std::io::stderr)
                .with_target(false),
        )
        .init();
    Ok(())
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(&cli.log_level)?;

    let mut controller = AddressBookController::new(SqliteBookFile::new());
    controller.book_mut().subscribe(|event: &BookEvent| {
        debug!(kind = event.as_str(), ?event, "address book changed");
    });

    match cli.command {
        Command::Add(args) => run_add(args, &mut controller, &cli.file),
        Command::Edit(args) => run_edit(args, &mut controller, &cli.file),
        Command::Remove(args) => run_remove(&args, &mut controller, &cli.file),
        Command::Show(args) => run_show(&args, &mut controller, &cli.file),
        Command::List(args) => run_list(&args, &mut controller, &cli.file),
        Command::Search(args) => run_search(&args, &mut controller, &cli.file),
        Command::Clear => run_clear(&mut controller, &cli.file),
        Command::Columns => run_columns(&controller),
        Command::Inspect => run_inspect(&controller, &cli.file),
    }
}

fn open(controller: &mut Controller, file: &Path) -> Result<()> {
    controller
        .open(file)
        .with_context(|| format!("failed to open address book {}", file.display()))
}

fn open_or_start_empty(controller: &mut Controller, file: &Path) -> Result<()> {
    if !file.exists() {
        info!(path = %file.display(), "address book file does not exist; starting empty");
        return Ok(());
    }
    open(controller, file)
}

fn or_current(value: Option<String>, current: &str) -> String {
    value.unwrap_or_else(|| current.to_string())
}

fn save(controller: &Controller, file: &Path) -> Result<()> {
    controller
        .save(file)
        .with_context(|| format!("failed to save address book {}", file.display()))
}

fn person_json(index: usize, person: &Person) -> Result<Value> {
    Ok(serde_json::json!({
        "index": index,
        "display_name": person.display_name(),
        "person": serde_json::to_value(person).context("failed to serialize person")?,
    }))
}

fn run_add(args: PersonArgs, controller: &mut Controller, file: &Path) -> Result<()> {
    let person = Person::new(
        args.first_name,
        args.last_name,
        args.address,
        args.city,
        args.state,
        args.zip,
        args.phone,
    )
    .context("person rejected")?;

    open_or_start_empty(controller, file)?;
    controller.add(person);
    save(controller, file)?;

    let index = controller.book().len() - 1;
    let added = controller.get(index)?;
    emit_json(serde_json::json!({
        "file": file.display().to_string(),
        "added": person_json(index, added)?,
        "count": controller.book().len(),
    }))
}

fn run_edit(args: EditArgs, controller: &mut Controller, file: &Path) -> Result<()> {
    open(controller, file)?;
    let current = controller.get(args.index)?;
    let person = Person::new(
        or_current(args.first_name, current.first_name()),
        or_current(args.last_name, current.last_name()),
        or_current(args.address, current.address()),
        or_current(args.city, current.city()),
        or_current(args.state, current.state()),
        or_current(args.zip, current.zip()),
        or_current(args.phone, current.phone()),
    )
    .context("person rejected")?;

    controller.set(args.index, person)?;
    save(controller, file)?;

    emit_json(serde_json::json!({
        "file": file.display().to_string(),
        "updated": person_json(args.index, controller.get(args.index)?)?,
    }))
}

fn run_remove(args: &IndexArgs, controller: &mut Controller, file: &Path) -> Result<()> {
    open(controller, file)?;
    let removed = controller.remove(args.index)?;
    save(controller, file)?;

    emit_json(serde_json::json!({
        "file": file.display().to_string(),
        "removed": person_json(args.index, &removed)?,
        "count": controller.book().len(),
    }))
}

fn run_show(args: &IndexArgs, controller: &mut Controller, file: &Path) -> Result<()> {
    open(controller, file)?;
    let book = controller.book();
    let person = book.get(args.index)?;

    let mut cells = serde_json::Map::new();
    for (column, name) in book.column_schema().iter().enumerate() {
        let cell = book.cell_at(args.index, column)?;
        let value = Value::String(cell.to_string());
        cells.insert((*name).to_string(), value);
    }

    let mut payload = person_json(args.index, person)?;
    if let Value::Object(object) = &mut payload {
        object.insert("cells".to_string(), Value::Object(cells));
    }
    emit_json(payload)
}

fn run_list(args: &ListArgs, controller: &mut Controller, file: &Path) -> Result<()> {
    open(controller, file)?;
    let book = controller.book();

    let order: Vec<usize> = match args.sort_by.as_deref() {
        Some(name) => {
            let column = column_index(name)
                .ok_or_else(|| anyhow!("unknown column to sort by: {name}"))?;
            let direction = if args.descending {
                SortOrder::Descending
            } else {
                SortOrder::Ascending
            };
            book.sorted_indices(column, direction)?
        }
        None => (0..book.len()).collect(),
    };

    let mut persons = Vec::with_capacity(order.len());
    for index in order {
        persons.push(person_json(index, book.get(index)?)?);
    }

    emit_json(serde_json::json!({
        "file": file.display().to_string(),
        "columns": book.column_schema(),
        "count": book.len(),
        "persons": persons,
    }))
}

fn run_search(args: &SearchArgs, controller: &mut Controller, file: &Path) -> Result<()> {
    open(controller, file)?;
    let book = controller.book();

    let mut matches = Vec::new();
    for index in book.search(&args.query) {
        matches.push(person_json(index, book.get(index)?)?);
    }

    emit_json(serde_json::json!({
        "file": file.display().to_string(),
        "query": args.query,
        "matches": matches,
    }))
}

fn run_clear(controller: &mut Controller, file: &Path) -> Result<()> {
    open(controller, file)?;
    let cleared = controller.book().len();
    controller.clear();
    save(controller, file)?;

    emit_json(serde_json::json!({
        "file": file.display().to_string(),
        "cleared": cleared,
    }))
}

fn run_columns(controller: &Controller) -> Result<()> {
    emit_json(serde_json::json!({
        "columns": controller.book().column_schema(),
    }))
}

fn run_inspect(controller: &Controller, file: &Path) -> Result<()> {
    let summary = controller
        .repository()
        .inspect(file)
        .with_context(|| format!("failed to inspect {}", file.display()))?;
    let value = serde_json::to_value(&summary)
        .context("failed to serialize file summary")?;
    emit_json(value)
}
