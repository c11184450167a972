use std::fs;
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use anyhow::{Context, Result, bail};
use clap::{Args, CommandFactory, Parser, Subcommand};
use notiontool_core::client::NotionClient;
use notiontool_core::config::{ClientConfig, load_config};
use notiontool_core::normalize::{FieldValue, ObjectKind, Record, SearchResult};
use notiontool_core::ops;

const CONFIG_PATH: &str = ".notiontool/config.toml";

#[derive(Debug, Parser)]
#[command(
    name = "notiontool",
    version,
    about = "CLI client for a Notion workspace: search, databases, pages, tasks"
)]
struct Cli {
    #[arg(long, global = true, value_name = "PATH", help = "Config file path")]
    config: Option<PathBuf>,
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Debug, Subcommand)]
enum Commands {
    #[command(about = "Search the workspace for pages and databases")]
    Search(SearchArgs),
    #[command(about = "Database operations")]
    Db(DbArgs),
    #[command(about = "Page operations")]
    Page(PageArgs),
    #[command(about = "Block operations")]
    Block(BlockArgs),
    #[command(about = "Task operations")]
    Task(TaskArgs),
}

#[derive(Debug, Args)]
struct SearchArgs {
    query: String,
    #[arg(short = 't', long = "type", value_name = "KIND", help = "Filter by type: page or database")]
    kind: Option<String>,
}

#[derive(Debug, Args)]
struct DbArgs {
    #[command(subcommand)]
    command: DbSubcommand,
}

#[derive(Debug, Subcommand)]
enum DbSubcommand {
    #[command(about = "List all databases visible to the token")]
    List,
    #[command(about = "Query a database's rows")]
    Query {
        database_id: String,
        #[arg(short = 'l', long, help = "Max rows to return")]
        limit: Option<usize>,
    },
}

#[derive(Debug, Args)]
struct PageArgs {
    #[command(subcommand)]
    command: PageSubcommand,
}

#[derive(Debug, Subcommand)]
enum PageSubcommand {
    #[command(about = "Show a page and its content")]
    Get { page_id: String },
    #[command(about = "Append a markdown file's content to a page")]
    Append {
        page_id: String,
        #[arg(short = 'f', long, value_name = "PATH")]
        file: PathBuf,
    },
    #[command(about = "Delete all content blocks from a page")]
    Clear {
        page_id: String,
        #[arg(long, help = "Confirm the deletion")]
        force: bool,
    },
}

#[derive(Debug, Args)]
struct BlockArgs {
    #[command(subcommand)]
    command: BlockSubcommand,
}

#[derive(Debug, Subcommand)]
enum BlockSubcommand {
    #[command(about = "Show a single block")]
    Get { block_id: String },
    #[command(about = "Replace a block's text content")]
    Update {
        block_id: String,
        #[arg(short = 'c', long)]
        content: String,
    },
    #[command(about = "Delete a single block")]
    Delete {
        block_id: String,
        #[arg(long, help = "Confirm the deletion")]
        force: bool,
    },
}

#[derive(Debug, Args)]
struct TaskArgs {
    #[command(subcommand)]
    command: TaskSubcommand,
}

#[derive(Debug, Subcommand)]
enum TaskSubcommand {
    #[command(about = "Create a task in a database")]
    Create {
        title: String,
        #[arg(short = 'd', long = "db", value_name = "DATABASE_ID")]
        database_id: String,
        #[arg(short = 's', long)]
        status: Option<String>,
    },
    #[command(about = "Update a task's title and/or status")]
    Update {
        page_id: String,
        #[arg(short = 's', long)]
        status: Option<String>,
        #[arg(short = 't', long)]
        title: Option<String>,
    },
}

fn main() -> ExitCode {
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    match run() {
        Ok(()) => ExitCode::SUCCESS,
        Err(error) => {
            eprintln!("error: {error:#}");
            let code = error
                .downcast_ref::<notiontool_core::Error>()
                .map(notiontool_core::Error::exit_code)
                .unwrap_or(1);
            ExitCode::from(u8::try_from(code).unwrap_or(1))
        }
    }
}

fn run() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Some(Commands::Search(args)) => run_search(&cli.config, args),
        Some(Commands::Db(DbArgs { command })) => match command {
            DbSubcommand::List => run_db_list(&cli.config),
            DbSubcommand::Query { database_id, limit } => {
                run_db_query(&cli.config, &database_id, limit)
            }
        },
        Some(Commands::Page(PageArgs { command })) => match command {
            PageSubcommand::Get { page_id } => run_page_get(&cli.config, &page_id),
            PageSubcommand::Append { page_id, file } => {
                run_page_append(&cli.config, &page_id, &file)
            }
            PageSubcommand::Clear { page_id, force } => {
                run_page_clear(&cli.config, &page_id, force)
            }
        },
        Some(Commands::Block(BlockArgs { command })) => match command {
            BlockSubcommand::Get { block_id } => run_block_get(&cli.config, &block_id),
            BlockSubcommand::Update { block_id, content } => {
                run_block_update(&cli.config, &block_id, &content)
            }
            BlockSubcommand::Delete { block_id, force } => {
                run_block_delete(&cli.config, &block_id, force)
            }
        },
        Some(Commands::Task(TaskArgs { command })) => match command {
            TaskSubcommand::Create {
                title,
                database_id,
                status,
            } => run_task_create(&cli.config, &database_id, &title, status.as_deref()),
            TaskSubcommand::Update {
                page_id,
                status,
                title,
            } => run_task_update(&cli.config, &page_id, title.as_deref(), status.as_deref()),
        },
        None => {
            let mut command = Cli::command();
            command.print_help()?;
            println!();
            Ok(())
        }
    }
}

fn build_client(config_override: &Option<PathBuf>) -> Result<NotionClient> {
    let config_path = config_override
        .clone()
        .unwrap_or_else(|| Path::new(CONFIG_PATH).to_path_buf());
    let tool_config = load_config(&config_path)?;
    let client_config = ClientConfig::from_config(&tool_config)?;
    Ok(NotionClient::new(client_config)?)
}

fn run_search(config: &Option<PathBuf>, args: SearchArgs) -> Result<()> {
    let kind = args
        .kind
        .as_deref()
        .map(ObjectKind::parse)
        .transpose()?;
    let mut client = build_client(config)?;
    let results = ops::search(&mut client, &args.query, kind)?;

    println!("query: {}", args.query);
    println!("results.count: {}", results.len());
    for result in &results {
        print_search_result(result);
    }
    Ok(())
}

fn run_db_list(config: &Option<PathBuf>) -> Result<()> {
    let mut client = build_client(config)?;
    let databases = ops::list_databases(&mut client)?;

    println!("databases.count: {}", databases.len());
    for database in &databases {
        print_search_result(database);
    }
    Ok(())
}

fn run_db_query(config: &Option<PathBuf>, database_id: &str, limit: Option<usize>) -> Result<()> {
    let mut client = build_client(config)?;
    let result = ops::query_database(&mut client, database_id, limit)?;

    println!("database: {database_id}");
    println!("title_field: {}", result.schema.title_field);
    println!("rows.count: {}", result.records.len());
    for record in &result.records {
        print_record(record);
    }
    Ok(())
}

fn run_page_get(config: &Option<PathBuf>, page_id: &str) -> Result<()> {
    let mut client = build_client(config)?;
    let view = ops::get_page(&mut client, page_id)?;

    println!("page: {}", view.record.title);
    println!("id: {}", view.record.id);
    println!("created: {}", view.created.as_deref().unwrap_or("n/a"));
    println!(
        "last_edited: {}",
        view.record.last_edited.as_deref().unwrap_or("n/a")
    );
    if view.content.is_empty() {
        println!("content: <empty>");
    } else {
        println!("content:");
        for line in &view.content {
            println!("{line}");
        }
    }
    Ok(())
}

fn run_page_append(config: &Option<PathBuf>, page_id: &str, file: &Path) -> Result<()> {
    let markdown = fs::read_to_string(file)
        .with_context(|| format!("failed to read {}", file.display()))?;
    let mut client = build_client(config)?;
    let appended = ops::append_page(&mut client, page_id, &markdown)?;

    println!("page: {page_id}");
    println!("appended_blocks: {appended}");
    Ok(())
}

fn run_page_clear(config: &Option<PathBuf>, page_id: &str, force: bool) -> Result<()> {
    if !force {
        bail!("`page clear` deletes every content block of {page_id}; pass --force to confirm");
    }
    let mut client = build_client(config)?;
    let deleted = ops::clear_page(&mut client, page_id)?;

    println!("page: {page_id}");
    println!("deleted_blocks: {deleted}");
    Ok(())
}

fn run_block_get(config: &Option<PathBuf>, block_id: &str) -> Result<()> {
    let mut client = build_client(config)?;
    let view = ops::get_block(&mut client, block_id)?;
    print_block(&view);
    Ok(())
}

fn run_block_update(config: &Option<PathBuf>, block_id: &str, content: &str) -> Result<()> {
    let mut client = build_client(config)?;
    let view = ops::update_block(&mut client, block_id, content)?;
    println!("updated: {}", view.id);
    print_block(&view);
    Ok(())
}

fn run_block_delete(config: &Option<PathBuf>, block_id: &str, force: bool) -> Result<()> {
    if !force {
        bail!("`block delete` removes block {block_id}; pass --force to confirm");
    }
    let mut client = build_client(config)?;
    ops::delete_block(&mut client, block_id)?;
    println!("deleted: {block_id}");
    Ok(())
}

fn run_task_create(
    config: &Option<PathBuf>,
    database_id: &str,
    title: &str,
    status: Option<&str>,
) -> Result<()> {
    let mut client = build_client(config)?;
    let record = ops::create_task(&mut client, database_id, title, status)?;

    println!("created: {}", record.id);
    println!("title: {}", record.title);
    if let Some(status) = status {
        println!("status: {status}");
    }
    Ok(())
}

fn run_task_update(
    config: &Option<PathBuf>,
    page_id: &str,
    title: Option<&str>,
    status: Option<&str>,
) -> Result<()> {
    let mut client = build_client(config)?;
    let record = ops::update_task(&mut client, page_id, title, status)?;

    println!("updated: {}", record.id);
    println!("title: {}", record.title);
    Ok(())
}

fn print_search_result(result: &SearchResult) {
    let edited = result.last_edited.as_deref().unwrap_or("n/a");
    println!(
        "- [{}] {} ({}) edited {}",
        result.kind.as_str(),
        result.title,
        result.id,
        edited
    );
}

fn print_block(view: &ops::BlockView) {
    println!("block: {}", view.id);
    println!("type: {}", view.kind);
    println!("content: {}", view.line.as_deref().unwrap_or("<empty>"));
}

fn print_record(record: &Record) {
    println!("- {} ({})", record.title, record.id);
    for (name, value) in &record.values {
        if matches!(value, FieldValue::Empty) {
            continue;
        }
        println!("    {name}: {}", value.display());
    }
}
