use clap::{Args, Parser, Subcommand};
use colored::Colorize;
use eyre::Result;
use focusflow::json::DEFAULT_EXPORT_FILE;
use focusflow::store::is_invalid_import;
use focusflow::{
    CategoryFilter, Chip, Command, Config, DueStatus, NewTask, OpenOptions, Outcome, SortKey, Stats, Task,
    TaskStore, TaskUpdate, ViewQuery, dates,
};
use std::path::PathBuf;
use std::process;
use tracing::Level;

#[derive(Parser)]
#[command(name = "focusflow")]
#[command(about = "FocusFlow - create, filter, sort and reorder tasks from the terminal")]
#[command(version = env!("GIT_DESCRIBE"))]
struct Cli {
    /// Directory holding the task database (overrides config)
    #[arg(short, long)]
    data_dir: Option<PathBuf>,

    /// Path to a YAML config file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Increase log verbosity (-v info, -vv debug)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Create a task
    Add {
        title: String,

        #[command(flatten)]
        fields: TaskFields,
    },

    /// List tasks through the filter, search and sort pipeline
    List {
        #[arg(long)]
        chip: Option<Chip>,

        /// Category to show ("all" for every category, "" for uncategorised)
        #[arg(long)]
        category: Option<String>,

        /// Case-insensitive title search
        #[arg(short, long, default_value = "")]
        search: String,

        #[arg(long)]
        sort: Option<SortKey>,

        /// Print the view and stats as JSON
        #[arg(long)]
        json: bool,
    },

    /// Mark a task done
    Done { id: String },

    /// Mark a task not done
    Undone { id: String },

    /// Edit a task
    Edit {
        id: String,

        #[arg(short, long)]
        title: Option<String>,

        #[command(flatten)]
        fields: TaskFields,
    },

    /// Delete a task
    Rm { id: String },

    /// Make two tasks trade places in manual order
    Reorder { id_a: String, id_b: String },

    /// Show collection-wide counts
    Stats,

    /// List the categories in use
    Categories,

    /// Write all tasks to a JSON file
    Export {
        #[arg(default_value = DEFAULT_EXPORT_FILE)]
        path: PathBuf,
    },

    /// Replace all tasks with the contents of a JSON file
    Import { path: PathBuf },
}

#[derive(Args)]
struct TaskFields {
    /// Due date: YYYY-MM-DD, YYYY-MM-DDTHH:MM or RFC 3339 ("" clears it)
    #[arg(long)]
    due: Option<String>,

    #[arg(long)]
    category: Option<String>,

    /// 1 = Low, 2 = Medium, 3 = High
    #[arg(short, long, value_parser = clap::value_parser!(u8).range(1..=3))]
    priority: Option<u8>,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let level = match cli.verbose {
        0 => Level::WARN,
        1 => Level::INFO,
        _ => Level::DEBUG,
    };
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_max_level(level)
        .init();

    let config = Config::load(cli.config.as_deref())?;
    let data_dir = cli.data_dir.clone().unwrap_or_else(|| config.data_dir.clone());

    let mut store = TaskStore::open(
        &data_dir,
        OpenOptions {
            seed_examples: config.seed_examples,
        },
    )?;

    if let Err(e) = run(&mut store, &config, cli.command) {
        if is_invalid_import(&e) {
            eprintln!("{} {}", "Import failed:".red().bold(), e);
            process::exit(1);
        }
        return Err(e);
    }

    Ok(())
}

fn run(store: &mut TaskStore, config: &Config, command: Commands) -> Result<()> {
    match command {
        Commands::Add { title, fields } => {
            let new = NewTask {
                title,
                due: fields.due.unwrap_or_default(),
                category: fields.category.unwrap_or_default(),
                priority: fields.priority.unwrap_or(focusflow::models::PRIORITY_MEDIUM),
            };
            match store.dispatch(Command::Create(new))? {
                Outcome::Created(Some(id)) => println!("Created task {}", id.cyan()),
                _ => println!("{}", "Title is empty, nothing created".yellow()),
            }
        }
        Commands::List {
            chip,
            category,
            search,
            sort,
            json,
        } => {
            let query = ViewQuery {
                chip: chip.unwrap_or(config.default_chip),
                category: category.as_deref().map(CategoryFilter::from).unwrap_or_default(),
                search,
                sort: sort.unwrap_or(config.default_sort),
            };
            let today = dates::today();
            let view = store.view_at(&query, today);

            if json {
                println!("{}", serde_json::to_string_pretty(&view)?);
                return Ok(());
            }

            print_stats(&view.stats);
            if view.is_empty() {
                println!("{}", "No tasks match".dimmed());
            }
            for task in &view.tasks {
                print_task(task, today);
            }
        }
        Commands::Done { id } => set_done(store, &id, true)?,
        Commands::Undone { id } => set_done(store, &id, false)?,
        Commands::Edit { id, title, fields } => {
            let id = store.resolve_id(&id)?;
            let changes = TaskUpdate {
                title,
                due: fields.due,
                category: fields.category,
                priority: fields.priority,
                done: None,
            };
            if changes.is_empty() {
                println!("{}", "Nothing to change".yellow());
                return Ok(());
            }
            store.dispatch(Command::Update { id: id.clone(), changes })?;
            println!("Updated task {}", id.cyan());
        }
        Commands::Rm { id } => {
            let id = store.resolve_id(&id)?;
            store.dispatch(Command::Delete { id: id.clone() })?;
            println!("Deleted task {}", id.cyan());
        }
        Commands::Reorder { id_a, id_b } => {
            let id_a = store.resolve_id(&id_a)?;
            let id_b = store.resolve_id(&id_b)?;
            match store.dispatch(Command::Reorder { id_a, id_b })? {
                Outcome::Reordered(true) => println!("Reordered tasks"),
                _ => println!("{}", "Nothing to reorder".yellow()),
            }
        }
        Commands::Stats => print_stats(&store.stats_at(dates::today())),
        Commands::Categories => {
            for category in store.categories() {
                println!("{}", category);
            }
        }
        Commands::Export { path } => {
            if let Outcome::Exported { path, count } = store.dispatch(Command::ExportFile { path })? {
                println!("Exported {} tasks to {}", count, path.display());
            }
        }
        Commands::Import { path } => {
            if let Outcome::Imported(count) = store.dispatch(Command::ImportFile { path })? {
                println!("Imported {} tasks", count);
            }
        }
    }

    Ok(())
}

fn set_done(store: &mut TaskStore, id: &str, done: bool) -> Result<()> {
    let id = store.resolve_id(id)?;
    store.dispatch(Command::Update {
        id: id.clone(),
        changes: TaskUpdate::done(done),
    })?;
    let state = if done { "done" } else { "not done" };
    println!("Marked task {} {}", id.cyan(), state);
    Ok(())
}

fn print_stats(stats: &Stats) {
    println!(
        "{} total  {} pending  {} completed  {} due today",
        stats.total.to_string().bold(),
        stats.pending.to_string().yellow(),
        stats.completed.to_string().green(),
        stats.today_count.to_string().cyan(),
    );
}

fn print_task(task: &Task, today: chrono::NaiveDate) {
    let check = if task.done { "[x]" } else { "[ ]" };
    let title = if task.done {
        task.title.dimmed().strikethrough()
    } else {
        task.title.normal()
    };

    let due = match (task.due_day(), task.due_status(today)) {
        (Some(day), DueStatus::Overdue) => format!("Due {}", day).red(),
        (Some(day), DueStatus::Today) => format!("Due {}", day).yellow(),
        (Some(day), _) => format!("Due {}", day).normal(),
        (None, _) => "No due".dimmed(),
    };

    let category = if task.category.is_empty() {
        "—"
    } else {
        task.category.as_str()
    };

    let priority = format!("Priority {}", task.priority_label());
    let priority = match task.priority {
        3 => priority.red(),
        2 => priority.yellow(),
        _ => priority.normal(),
    };

    println!(
        "{} {}  {}  {}  {}  {}",
        check,
        title,
        due,
        category.blue(),
        priority,
        task.id.dimmed()
    );
}
