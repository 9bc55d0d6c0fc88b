//! services/client/src/bin/notes.rs

use chrono::Local;
use clap::{Args, Parser, Subcommand};
use client_lib::{
    adapters::{ApiClient, FileCredentialStore, HttpAuthAdapter, HttpIdeaAdapter, HttpNotesAdapter},
    config::Config,
    error::ClientError,
    transfer::{self, ExportKind},
};
use idea_notes_core::{
    classify,
    domain::{page_window, AiProvider, NoteChanges, NoteDraft, NoteId},
    ports::{AuthService, FavoritesService, NotesService},
    validation::{validate_note_changes, validate_note_draft},
    FavoriteMirror, GenerationStore, SessionStore, StoreError,
};
use std::io::{self, BufRead, Write};
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{debug, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(name = "notes", version, about = "Notes with AI idea generation")]
struct Cli {
    /// Backend base URL (overrides IDEA_NOTES_API_URL)
    #[arg(long, global = true)]
    api_url: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Log in and remember the token
    Login(AccountArgs),
    /// Create an account
    Register(AccountArgs),
    /// Forget the stored token
    Logout,
    /// Show the logged-in user
    Whoami,
    /// Manage notes
    #[command(subcommand)]
    Notes(NotesCommand),
    /// Manage favorites
    #[command(subcommand)]
    Favorites(FavoritesCommand),
    /// Export notes or favorites as JSON
    Export {
        #[arg(value_enum)]
        kind: ExportTarget,
        /// Directory to write into
        #[arg(long, default_value = ".")]
        dir: PathBuf,
    },
    /// Import notes from a JSON export
    Import { file: PathBuf },
    /// Generate an idea from notes
    Generate(GenerateArgs),
    /// Show generation history
    History {
        #[arg(long, default_value_t = 1)]
        page: u32,
    },
}

#[derive(Args)]
struct AccountArgs {
    username: String,
    /// Read from stdin when omitted
    #[arg(long)]
    password: Option<String>,
}

#[derive(Subcommand)]
enum NotesCommand {
    List,
    Show { id: NoteId },
    Create {
        #[arg(long)]
        title: String,
        #[arg(long)]
        content: String,
    },
    Edit {
        id: NoteId,
        #[arg(long)]
        title: Option<String>,
        #[arg(long)]
        content: Option<String>,
    },
    Delete { id: NoteId },
}

#[derive(Subcommand)]
enum FavoritesCommand {
    List,
    /// Favorite a note, or unfavorite it if it already is
    Toggle { id: NoteId },
}

#[derive(Clone, Copy, clap::ValueEnum)]
enum ExportTarget {
    Notes,
    Favorites,
}

#[derive(Args)]
struct GenerateArgs {
    /// Note to include; repeat for several
    #[arg(long = "note", required = true)]
    notes: Vec<NoteId>,
    #[arg(long)]
    prompt: Option<String>,
    /// openai, anthropic or gemini
    #[arg(long, default_value = "openai")]
    provider: AiProvider,
    /// Save the result as a note with this title
    #[arg(long)]
    save: Option<String>,
}

/// Everything a command may need, wired once at startup.
struct App {
    session: SessionStore,
    generation: GenerationStore,
    auth: Arc<HttpAuthAdapter>,
    notes: HttpNotesAdapter,
}

#[tokio::main]
async fn main() -> Result<(), ClientError> {
    let result = run(Cli::parse()).await;
    if let Some(message) = result.as_ref().err().and_then(ClientError::explained_message) {
        report(message);
        std::process::exit(1);
    }
    result
}

async fn run(cli: Cli) -> Result<(), ClientError> {
    // --- 1. Load Configuration & Set Up Logging ---
    let mut config = Config::from_env()?;
    if let Some(url) = cli.api_url.as_deref() {
        config.api_url = url.trim_end_matches('/').to_string();
    }
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(config.log_level.to_string()))
        .with(tracing_subscriber::fmt::layer().with_writer(io::stderr))
        .init();
    info!(api_url = %config.api_url, "Configuration loaded");

    // --- 2. Initialize Adapters ---
    let credentials = Arc::new(FileCredentialStore::new(config.credentials_path.clone()));
    debug!(path = %credentials.path().display(), "Using credential file");
    let api = ApiClient::new(&config.api_url, config.request_timeout, credentials.clone())?;
    let auth = Arc::new(HttpAuthAdapter::new(api.clone()));
    let ideas = Arc::new(HttpIdeaAdapter::new(api.clone()));
    let notes = HttpNotesAdapter::new(api);

    // --- 3. Build the Stores ---
    let app = App {
        session: SessionStore::new(auth.clone(), credentials),
        generation: GenerationStore::new(ideas),
        auth,
        notes,
    };

    // --- 4. Dispatch ---
    match cli.command {
        Command::Login(args) => login(&app, args).await,
        Command::Register(args) => register(&app, args).await,
        Command::Logout => {
            app.session.logout();
            println!("Logged out.");
            Ok(())
        }
        command => {
            if !app.session.check_auth() {
                return Err(ClientError::NotAuthenticated);
            }
            run_authenticated(&app, command).await
        }
    }
}

async fn run_authenticated(app: &App, command: Command) -> Result<(), ClientError> {
    match command {
        Command::Whoami => {
            let user = app.auth.current_user().await?;
            println!("{} (id {}, since {})", user.username, user.id, user.created_date.date_naive());
            Ok(())
        }
        Command::Notes(command) => notes_command(app, command).await,
        Command::Favorites(command) => favorites_command(app, command).await,
        Command::Export { kind, dir } => {
            let kind = match kind {
                ExportTarget::Notes => ExportKind::Notes,
                ExportTarget::Favorites => ExportKind::Favorites,
            };
            let today = Local::now().date_naive();
            let path = transfer::export(kind, &app.notes, &app.notes, &dir, today).await?;
            println!("Exported to {}", path.display());
            Ok(())
        }
        Command::Import { file } => {
            let summary = transfer::import_file(&app.notes, &file).await?;
            println!("Imported {} notes.", summary.count);
            Ok(())
        }
        Command::Generate(args) => generate(app, args).await,
        Command::History { page } => history(app, page).await,
        Command::Login(_) | Command::Register(_) | Command::Logout => Err(ClientError::Internal(
            "account commands are handled before authentication".to_string(),
        )),
    }
}

async fn login(app: &App, args: AccountArgs) -> Result<(), ClientError> {
    let password = password_or_prompt(args.password)?;
    app.session.login(&args.username, &password).await?;
    println!("Logged in as {}.", args.username);
    Ok(())
}

async fn register(app: &App, args: AccountArgs) -> Result<(), ClientError> {
    let password = password_or_prompt(args.password)?;
    app.session.register(&args.username, &password).await?;
    println!("Account {} created. Run `notes login {}` to sign in.", args.username, args.username);
    Ok(())
}

async fn notes_command(app: &App, command: NotesCommand) -> Result<(), ClientError> {
    let notes: &dyn NotesService = &app.notes;
    match command {
        NotesCommand::List => {
            let mut favorites = FavoriteMirror::default();
            favorites.load(&app.notes).await?;
            for note in notes.list_notes().await? {
                let star = if favorites.contains(note.id) { "*" } else { " " };
                println!("{star} {:>5}  {}", note.id, note.title);
            }
        }
        NotesCommand::Show { id } => {
            let note = notes.get_note(id).await?;
            println!("# {}\n\n{}\n\n(updated {})", note.title, note.content, note.updated_date);
        }
        NotesCommand::Create { title, content } => {
            let draft = NoteDraft { title, content };
            validate_note_draft(&draft).map_err(StoreError::Validation)?;
            let note = notes.create_note(&draft).await?;
            println!("Created note {}.", note.id);
        }
        NotesCommand::Edit { id, title, content } => {
            let changes = NoteChanges { title, content };
            validate_note_changes(&changes).map_err(StoreError::Validation)?;
            let note = notes.update_note(id, &changes).await?;
            println!("Updated note {}.", note.id);
        }
        NotesCommand::Delete { id } => {
            if !confirm(&format!("Delete note {id}?"))? {
                return Ok(());
            }
            let mut favorites = FavoriteMirror::default();
            favorites.load(&app.notes).await?;
            if favorites.delete_note(notes, id).await? {
                println!("Deleted note {id} and removed it from favorites.");
            } else {
                println!("Deleted note {id}.");
            }
        }
    }
    Ok(())
}

async fn favorites_command(app: &App, command: FavoritesCommand) -> Result<(), ClientError> {
    let favorites: &dyn FavoritesService = &app.notes;
    match command {
        FavoritesCommand::List => {
            for note in favorites.list_favorites().await? {
                println!("* {:>5}  {}", note.id, note.title);
            }
        }
        FavoritesCommand::Toggle { id } => {
            let mut mirror = FavoriteMirror::default();
            mirror.load(favorites).await?;
            if mirror.toggle(favorites, id).await? {
                println!("Note {id} added to favorites.");
            } else {
                println!("Note {id} removed from favorites.");
            }
        }
    }
    Ok(())
}

async fn generate(app: &App, args: GenerateArgs) -> Result<(), ClientError> {
    let store = &app.generation;
    store.set_selected_note_ids(&args.notes);

    let generation = store.generate_idea(args.prompt.as_deref(), args.provider).await?;
    println!("--- {} (generation {}) ---", generation.ai_provider, generation.id);
    println!("{}", generation.generated_content);

    if let Some(title) = args.save {
        store.save_as_note(generation.id, &title).await?;
        store.clear_selection();
        println!("Saved as note \"{}\".", title.trim());
    }
    Ok(())
}

async fn history(app: &App, page: u32) -> Result<(), ClientError> {
    let store = &app.generation;
    store.fetch_generation_history(page).await?;
    let state = store.snapshot();
    if state.generation_history.is_empty() {
        println!("No generations yet.");
        return Ok(());
    }
    for item in &state.generation_history {
        let preview: String = item.generated_content.chars().take(60).collect();
        println!(
            "{:>5}  {}  {:<9}  notes {:?}  {}",
            item.id,
            item.created_date.format("%Y-%m-%d %H:%M"),
            item.ai_provider,
            item.note_ids,
            preview.replace('\n', " ")
        );
    }
    let pages = state.history_pages();
    let window: Vec<String> = page_window(state.history_page, pages, 5)
        .map(|p| if p == state.history_page { format!("[{p}]") } else { p.to_string() })
        .collect();
    println!("page {} of {} ({} total)  {}", state.history_page, pages, state.history_total, window.join(" "));
    Ok(())
}

/// Prints the friendly form of a failure message on stderr.
fn report(message: &str) {
    let kind = classify(message);
    debug!(%kind, "{}", message);
    eprintln!("{}", kind.describe(message));
}

fn password_or_prompt(password: Option<String>) -> Result<String, ClientError> {
    if let Some(password) = password {
        return Ok(password);
    }
    eprint!("Password: ");
    io::stderr().flush()?;
    let mut line = String::new();
    io::stdin().lock().read_line(&mut line)?;
    Ok(line.trim_end_matches(['\r', '\n']).to_string())
}

fn confirm(question: &str) -> Result<bool, ClientError> {
    eprint!("{question} [y/N] ");
    io::stderr().flush()?;
    let mut line = String::new();
    io::stdin().lock().read_line(&mut line)?;
    Ok(matches!(line.trim(), "y" | "Y" | "yes"))
}
