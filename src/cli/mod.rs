pub mod list;
pub mod output;
pub mod transfer;

use std::{
    io::{stdout, IsTerminal},
    path::PathBuf,
};

use anyhow::{bail, Result};
use chrono::{DateTime, Utc};
use clap::{Parser, Subcommand};
use list::{process_list_command, ListCommand};
use tracing::{info, level_filters::LevelFilter};

use crate::{
    app::{commands::Action, state::AppState},
    session::start_session,
    storage::{
        kv_store::{FileStore, KeyValueStore},
        repository::Repository,
    },
    utils::{
        clock::{Clock, DefaultClock},
        dir::{create_application_default_path, create_dir},
        logging::{enable_logging, LogTarget},
    },
};

#[derive(Parser, Debug)]
#[command(name = "quicknotes", version, long_about = None)]
#[command(about = "Quick categorized notes with a per-category timer", long_about = None)]
pub(crate) struct Args {
    #[command(subcommand)]
    commands: Commands,
    #[arg(
        long,
        global = true,
        help = "Application directory. By default uses $XDG_STATE_HOME/quicknotes or $HOME/.local/state/quicknotes"
    )]
    dir: Option<PathBuf>,
    #[arg(long, global = true, help = "Print trace logs to the console")]
    log: bool,
}

#[derive(Subcommand, Debug)]
enum Commands {
    #[command(about = "Save a note under the selected category (or --category)")]
    Add {
        #[arg(short, long, help = "Category key to select before saving")]
        category: Option<String>,
        #[arg(required = true, num_args = 1..)]
        text: Vec<String>,
    },
    #[command(about = "Replace the text of a note")]
    Edit {
        id: String,
        #[arg(required = true, num_args = 1..)]
        text: Vec<String>,
    },
    #[command(about = "Delete a note")]
    Delete { id: String },
    #[command(about = "List notes, most recent first")]
    List {
        #[command(flatten)]
        command: ListCommand,
    },
    #[command(about = "Select the category new notes are saved under")]
    Select { category: String },
    #[command(about = "Select a category by its hotkey digit")]
    Hotkey {
        #[arg(value_parser = clap::value_parser!(u8).range(0..=9))]
        digit: u8,
    },
    #[command(
        about = "Pause the timer. Time between separate commands is not counted, use `session` for live timing"
    )]
    Pause,
    #[command(about = "Resume the timer")]
    Resume,
    #[command(about = "Pause the timer if it runs, resume it otherwise")]
    Toggle,
    #[command(about = "Show timer, categories and latest notes")]
    Status,
    #[command(about = "Show time per timer category")]
    Graph,
    #[command(about = "Export notes as JSON")]
    Export {
        #[arg(help = "Target file. Defaults to quicknotes-<timestamp>.json in the current directory")]
        path: Option<PathBuf>,
    },
    #[command(about = "Import notes from a JSON export, placing them before existing notes")]
    Import { path: PathBuf },
    #[command(about = "Show or change categories")]
    Config {
        #[command(subcommand)]
        command: ConfigCommand,
    },
    #[command(about = "Inspect or change the unsaved draft")]
    Draft {
        #[command(subcommand)]
        command: DraftCommand,
    },
    #[command(about = "Interactive session with a live timer")]
    Session,
}

#[derive(Subcommand, Debug)]
enum ConfigCommand {
    #[command(about = "Print categories as editable JSON")]
    Show,
    #[command(about = "Replace categories with a JSON file of the form {\"categories\": [...]}")]
    Apply { path: PathBuf },
    #[command(about = "Restore the built-in categories")]
    Reset,
}

#[derive(Subcommand, Debug)]
enum DraftCommand {
    Show,
    Set {
        #[arg(required = true, num_args = 1..)]
        text: Vec<String>,
    },
    Clear,
    #[command(about = "Save the draft as a note")]
    Submit,
}

pub async fn run_cli() -> Result<()> {
    let args = Args::parse();

    let logging_level = if args.log {
        Some(LevelFilter::TRACE)
    } else {
        None
    };
    let app_dir = args
        .dir
        .map_or_else(create_application_default_path, create_dir)?;
    let target = match args.commands {
        Commands::Session => LogTarget::Session,
        _ => LogTarget::Cli,
    };
    enable_logging(target, &app_dir, logging_level, args.log)?;

    let repository = Repository::new(FileStore::new(app_dir.join("storage"))?);

    process_command(args.commands, repository, &DefaultClock).await
}

/// Runs a one-shot command. Each run is a whole application lifetime: state is loaded, the
/// command is dispatched, and a command that may change the timer snapshots it on the way out.
async fn process_command<S: KeyValueStore>(
    command: Commands,
    repository: Repository<S>,
    clock: &impl Clock,
) -> Result<()> {
    if let Commands::Session = command {
        return start_session(repository).await;
    }
    let now = clock.time();
    let mut state = repository.load(now)?;
    let use_color = stdout().is_terminal();

    let actions = match command {
        Commands::Add { category, text } => {
            let mut actions = vec![];
            if let Some(category) = category {
                actions.push(Action::SelectCategory(category));
            }
            actions.push(Action::AddNote {
                text: text.join(" "),
            });
            actions
        }
        Commands::Edit { id, text } => {
            if state.notes.get(&id).is_none() {
                bail!("There is no note {id}");
            }
            vec![Action::UpdateNote {
                id,
                text: text.join(" "),
            }]
        }
        Commands::Delete { id } => vec![Action::DeleteNote { id }],
        Commands::Select { category } => vec![Action::SelectCategory(category)],
        Commands::Hotkey { digit } => vec![Action::Hotkey(digit)],
        Commands::Pause => vec![Action::Pause],
        Commands::Resume => vec![Action::Resume],
        Commands::Toggle => vec![Action::ToggleTimer],
        Commands::Import { path } => vec![Action::Import(transfer::read_file(&path).await?)],
        Commands::Config {
            command: ConfigCommand::Apply { path },
        } => vec![Action::ApplyConfig(transfer::read_file(&path).await?)],
        Commands::Config {
            command: ConfigCommand::Reset,
        } => vec![Action::ResetConfig],
        Commands::Draft {
            command: DraftCommand::Set { text },
        } => vec![Action::SaveDraft(text.join(" "))],
        Commands::Draft {
            command: DraftCommand::Clear,
        } => vec![Action::SaveDraft(String::new())],
        Commands::Draft {
            command: DraftCommand::Submit,
        } => vec![Action::SubmitDraft],

        // Read-only commands.
        Commands::List { command } => {
            return process_list_command(command, &state, use_color);
        }
        Commands::Status => {
            print!("{}", output::render_screen(&state, now, use_color));
            return Ok(());
        }
        Commands::Graph => {
            print!(
                "{}",
                output::graph::render_graph(&state.categories, state.timer.totals(), use_color)
            );
            return Ok(());
        }
        Commands::Export { path } => {
            let path = transfer::export_notes(&state.notes, path, now).await?;
            println!("Exported {} notes into {}", state.notes.len(), path.display());
            return Ok(());
        }
        Commands::Config {
            command: ConfigCommand::Show,
        } => {
            println!("{}", state.categories.to_editable_json()?);
            return Ok(());
        }
        Commands::Draft {
            command: DraftCommand::Show,
        } => {
            println!("{}", state.draft);
            return Ok(());
        }
        Commands::Session => return Ok(()),
    };

    let was_running = state.timer.is_running();
    apply_actions(&mut state, actions, &repository, now)?;

    match state.visible_status(now) {
        Some(status) => println!("{status}"),
        None => info!("Nothing changed"),
    }
    if state.timer.is_running() || state.timer.active_category().is_some() {
        println!("{}", output::render_timer(&state, now));
    }
    if let Some(hint) = timer_hint(was_running, &state) {
        println!("{hint}");
    }
    Ok(())
}

/// Shown when a one-shot command starts the timer. Time between commands is not counted.
fn timer_hint(was_running: bool, state: &AppState) -> Option<&'static str> {
    (!was_running && state.timer.is_running())
        .then_some("Timer started. Only a running `quicknotes session` counts time")
}

/// Dispatches actions in order and writes what they changed. A rejected action stops the run
/// before anything after it is applied.
fn apply_actions<S: KeyValueStore>(
    state: &mut AppState,
    actions: Vec<Action>,
    repository: &Repository<S>,
    now: DateTime<Utc>,
) -> Result<()> {
    for action in actions {
        let outcome = state.dispatch(action, now);
        repository.persist(state, &outcome.dirty, now)?;
        if let Some(reason) = outcome.rejected {
            bail!("{}: {reason}", outcome.status.unwrap_or("Rejected"));
        }
    }
    repository.save_timer_snapshot(state, now)?;
    Ok(())
}
