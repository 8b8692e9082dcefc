//! One-shot CLI commands
//!
//! Each `run_*` function backs one `studywat` subcommand. They share a
//! [`Context`] holding the config, the session store and the API wrappers.

use anyhow::{Context as _, Result};
use colored::Colorize;
use std::io::Write;
use std::sync::Arc;
use std::time::Instant;
use tabled::{settings::Style, Table, Tabled};

use crate::api::{ApiClient, Backend};
use crate::catalog::cost::{estimated_cost, format_cost};
use crate::catalog::options::field_label;
use crate::catalog::{CatalogQuery, CatalogState, Fetch};
use crate::chat::{ChatProgress, ChatSession, SharedTranscript};
use crate::config::{ChatMode, Config};
use crate::lists::manager::ListCollection;
use crate::lists::validation::{emoji_or_default, truncate_title, DISPLAY_TITLE_LEN};
use crate::lists::{ListDraft, ListService, ToggleOutcome};
use crate::models::{Alert, Program, User};
use crate::notify::{Notifications, ToastKind};
use crate::profile::{format_trait, FitTier, ProfileLoader, Section};
use crate::session::{FileStorage, SessionHooks, SessionStore};

/// Everything a command needs to talk to the backend
pub struct Context {
    pub config: Config,
    pub session: Arc<SessionStore>,
    pub backend: Backend,
}

impl Context {
    /// Open the session file and build the API wrappers
    pub fn open(config: Config) -> Result<Self> {
        let storage = FileStorage::open_default().context("Failed to open session storage")?;
        let client = ApiClient::new(&config.api);
        let session = Arc::new(SessionStore::new(
            Backend::auth(&client),
            Arc::new(storage),
            Arc::new(SessionHooks::new()),
        ));
        let backend = Backend::new(&client, session.clone());
        Ok(Self {
            config,
            session,
            backend,
        })
    }

    /// The validated signed-in user, or an error telling how to sign in
    async fn require_user(&self) -> Result<User> {
        self.session
            .restore()
            .await
            .context("Not signed in. Run `studywat login --credential <token>` first.")
    }
}

// =========================================================================
// Session
// =========================================================================

pub async fn run_login(ctx: &Context, credential: &str) -> Result<()> {
    let user = ctx.session.login(credential).await.context("Sign-in failed")?;
    println!(
        "{} Signed in as {} <{}>",
        "✓".green(),
        user.name.bold(),
        user.email
    );
    Ok(())
}

pub async fn run_logout(ctx: &Context) -> Result<()> {
    if !ctx.session.is_authenticated() {
        println!("Not signed in.");
        return Ok(());
    }
    ctx.session.logout().await;
    println!("{} Signed out", "✓".green());
    Ok(())
}

pub async fn run_whoami(ctx: &Context) -> Result<()> {
    match ctx.session.restore().await {
        Some(user) => {
            println!("{}:  {}", "Name".bold(), user.name);
            println!("{}: {}", "Email".bold(), user.email);
            println!("{}:    {}", "ID".bold(), user.id);
        }
        None => println!("Not signed in."),
    }
    Ok(())
}

// =========================================================================
// Programs
// =========================================================================

#[derive(Tabled)]
struct ProgramRow {
    #[tabled(rename = "ID")]
    id: String,
    #[tabled(rename = "Program")]
    name: String,
    #[tabled(rename = "Institution")]
    institution: String,
    #[tabled(rename = "Country")]
    country: String,
    #[tabled(rename = "Field")]
    field: String,
    #[tabled(rename = "Years")]
    duration: String,
    #[tabled(rename = "Intakes")]
    intakes: String,
    #[tabled(rename = "Est. cost")]
    cost: String,
}

impl From<&Program> for ProgramRow {
    fn from(program: &Program) -> Self {
        let institution = program.institution.as_ref();
        Self {
            id: program.id.clone(),
            name: program.program_name.clone(),
            institution: institution
                .map(|i| i.institution_name.clone())
                .unwrap_or_default(),
            country: institution
                .map(|i| i.institution_country.clone())
                .unwrap_or_default(),
            field: program
                .field_of_study
                .as_deref()
                .map(|f| field_label(f).to_string())
                .unwrap_or_default(),
            duration: program
                .program_duration_years
                .map(|y| format!("{}", y))
                .unwrap_or_default(),
            intakes: program.intakes_label(),
            cost: format_cost(estimated_cost(program.fees.as_ref())),
        }
    }
}

/// Run a catalog fetch to completion and fold the result into `state`
async fn perform_fetch(backend: &Backend, state: &mut CatalogState, fetch: Fetch) -> Result<()> {
    match fetch {
        Fetch::Search { seq, filter } => {
            let result = backend.programs.list(&filter).await;
            state.apply_search(seq, result);
        }
        Fetch::ByIds { seq, ids } => {
            let result = backend.programs.by_ids(&ids).await;
            state.apply_by_ids(seq, result);
        }
    }
    if let crate::catalog::Load::Failed(message) = state.load() {
        anyhow::bail!("{}", message);
    }
    Ok(())
}

fn print_programs(state: &CatalogState) {
    let rows: Vec<ProgramRow> = state.visible().iter().map(ProgramRow::from).collect();
    if rows.is_empty() {
        println!("No programs match these filters.");
    } else {
        let mut table = Table::new(rows);
        table.with(Style::rounded());
        println!("{}", table);
    }
    println!(
        "Page {} of {} · {} programs",
        state.page(),
        state.total_pages().max(1),
        state.total()
    );
}

pub async fn run_programs(ctx: &Context, query: CatalogQuery) -> Result<()> {
    let mut state = CatalogState::from_query(query);
    if let Some(fetch) = state.refresh() {
        perform_fetch(&ctx.backend, &mut state, fetch).await?;
    }

    println!("{}", "=== Programs ===".bold().cyan());
    println!();
    print_programs(&state);
    println!(
        "{}: {}",
        "Link".dimmed(),
        state.query().to_query_string().dimmed()
    );
    Ok(())
}

// =========================================================================
// Saved lists
// =========================================================================

#[derive(Tabled)]
struct ListRow {
    #[tabled(rename = "ID")]
    id: String,
    #[tabled(rename = "List")]
    title: String,
    #[tabled(rename = "Programs")]
    programs: usize,
    #[tabled(rename = "Updated")]
    updated: String,
}

fn list_service(ctx: &Context) -> ListService {
    ListService::new(ctx.backend.program_lists.clone())
}

pub async fn run_lists(ctx: &Context) -> Result<()> {
    let user = ctx.require_user().await?;
    let lists = list_service(ctx)
        .load(&user.id)
        .await
        .context("Failed to load your lists")?;

    println!("{}", "=== Saved lists ===".bold().cyan());
    println!();
    if lists.is_empty() {
        println!("No lists yet.");
        println!();
        println!("Create one with:");
        println!("  studywat lists create <title> --emoji 🎓");
        return Ok(());
    }

    let rows: Vec<ListRow> = lists
        .iter()
        .map(|l| ListRow {
            id: l.id.clone(),
            title: format!(
                "{} {}",
                emoji_or_default(Some(l.emoji.as_str())),
                truncate_title(&l.title, DISPLAY_TITLE_LEN)
            ),
            programs: l.program_ids.len(),
            updated: l
                .updated_at
                .map(|t| t.format("%Y-%m-%d").to_string())
                .unwrap_or_default(),
        })
        .collect();
    let mut table = Table::new(rows);
    table.with(Style::rounded());
    println!("{}", table);
    Ok(())
}

pub async fn run_list_create(ctx: &Context, title: &str, emoji: Option<String>) -> Result<()> {
    let user = ctx.require_user().await?;
    let list = list_service(ctx)
        .create(&user.id, &ListDraft::new(title, emoji), Vec::new())
        .await
        .context("Failed to create list")?;
    println!(
        "{} Created {} {} ({})",
        "✓".green(),
        list.emoji,
        list.title.bold(),
        list.id
    );
    Ok(())
}

pub async fn run_list_rename(
    ctx: &Context,
    id: &str,
    title: &str,
    emoji: Option<String>,
) -> Result<()> {
    ctx.require_user().await?;
    let service = list_service(ctx);
    let list = service.api().get(id).await.context("List not found")?;
    let emoji = emoji.or_else(|| Some(list.emoji.clone()));
    let updated = service
        .edit(&list, &ListDraft::new(title, emoji))
        .await
        .context("Failed to update list")?;
    println!(
        "{} Renamed to {} {}",
        "✓".green(),
        updated.emoji,
        updated.title.bold()
    );
    Ok(())
}

pub async fn run_list_delete(ctx: &Context, id: &str, yes: bool) -> Result<()> {
    ctx.require_user().await?;
    if !yes {
        anyhow::bail!("Deleting a list cannot be undone. Pass --yes to confirm.");
    }
    list_service(ctx)
        .delete(id)
        .await
        .context("Failed to delete list")?;
    println!("{} Deleted list {}", "✓".green(), id);
    Ok(())
}

/// Add (`add == true`) or remove a program. A no-op when it is already in
/// the wanted state.
pub async fn run_list_membership(
    ctx: &Context,
    list_id: &str,
    program_id: &str,
    add: bool,
) -> Result<()> {
    ctx.require_user().await?;
    let service = list_service(ctx);
    let list = service.api().get(list_id).await.context("List not found")?;

    if list.contains(program_id) == add {
        let state = if add { "already in" } else { "not in" };
        println!("Program {} is {} {}", program_id, state, list.title.bold());
        return Ok(());
    }

    let mut lists = ListCollection::default();
    lists.apply_loaded(Ok(vec![list]));
    let mut notes = Notifications::new(std::time::Duration::from_secs(1));
    let outcome = service
        .toggle_membership(&mut lists, list_id, program_id, &mut notes)
        .await;

    for toast in notes.drain() {
        match toast.kind {
            ToastKind::Error => println!("{} {}", "✗".red(), toast.message),
            _ => println!("{} {}", "✓".green(), toast.message),
        }
    }
    if matches!(outcome, None | Some(ToggleOutcome::RolledBack)) {
        anyhow::bail!("List {} was not changed", list_id);
    }
    Ok(())
}

pub async fn run_list_show(ctx: &Context, id: &str, query: CatalogQuery) -> Result<()> {
    ctx.require_user().await?;
    let list = list_service(ctx)
        .api()
        .get(id)
        .await
        .context("List not found")?;

    println!(
        "{}",
        format!("=== {} {} ===", list.emoji, list.title).bold().cyan()
    );
    println!();

    let mut state = CatalogState::from_query(query.clone());
    let entered = state.enter_list(list);
    // Entering a list resets paging; re-apply what was asked for
    let mut fetch = entered;
    if query.limit != state.page_size() {
        fetch = state.set_page_size(query.limit).or(fetch);
    }
    if query.sort.is_some() {
        fetch = state.set_sort(query.sort).or(fetch);
    }
    if let Some(fetch) = fetch {
        perform_fetch(&ctx.backend, &mut state, fetch).await?;
    }
    if query.page > 1 {
        if let Some(fetch) = state.set_page(query.page) {
            perform_fetch(&ctx.backend, &mut state, fetch).await?;
        }
    }
    print_programs(&state);
    Ok(())
}

// =========================================================================
// Profile
// =========================================================================

pub async fn run_profile(ctx: &Context) -> Result<()> {
    let user = ctx.require_user().await?;
    let data = ProfileLoader::new(ctx.backend.profile.clone())
        .load(&user.id)
        .await;

    println!("{}", "=== Your traits ===".bold().cyan());
    println!();
    match &data.traits {
        Section::Loaded(traits) if traits.is_empty() => {
            println!("Chat with the advisor and your traits will appear here.")
        }
        Section::Loaded(traits) => {
            #[derive(Tabled)]
            struct TraitRow {
                #[tabled(rename = "Trait")]
                key: String,
                #[tabled(rename = "Value")]
                label: String,
                #[tabled(rename = "Confidence")]
                confidence: String,
                #[tabled(rename = "Description")]
                description: String,
            }
            let rows: Vec<TraitRow> = traits
                .iter()
                .map(|t| TraitRow {
                    key: format_trait(&t.trait_key),
                    label: t.label.clone(),
                    confidence: t
                        .confidence
                        .map(|c| format!("{:.0}%", c * 100.0))
                        .unwrap_or_default(),
                    description: t.label_description.clone(),
                })
                .collect();
            let mut table = Table::new(rows);
            table.with(Style::rounded());
            println!("{}", table);
        }
        Section::Failed(message) => println!("{}", message.red()),
        Section::Loading => {}
    }

    println!();
    println!("{}", "=== Suggested courses ===".bold().cyan());
    println!();
    match &data.recommendations {
        Section::Loaded(recs) => {
            if let Some(message) = &recs.message {
                println!("{}", message.italic());
                println!();
            }
            if recs.suggestions.is_empty() {
                println!("No course suggestions yet.");
            }
            for course in &recs.suggestions {
                let tier = FitTier::from_fit(course.fit);
                let (r, g, b) = tier.color();
                println!(
                    "{} {}",
                    format!(" {} ", tier.label()).on_truecolor(r, g, b).bold(),
                    course.name.bold()
                );
                if !course.matched_traits.is_empty() {
                    let matched: Vec<String> =
                        course.matched_traits.iter().map(|t| format_trait(t)).collect();
                    println!("  matches {}", matched.join(", ").cyan());
                }
                if let Some(reason) = &course.reason {
                    println!("  {}", reason.dimmed());
                }
            }
        }
        Section::Failed(message) => println!("{}", message.red()),
        Section::Loading => {}
    }
    Ok(())
}

// =========================================================================
// Chat
// =========================================================================

fn print_alerts(alerts: &[Alert]) {
    for alert in alerts {
        eprintln!(
            "{} {}: {}",
            "⚠".yellow(),
            alert.kind.replace('_', " ").yellow(),
            alert.message
        );
    }
}

pub async fn run_ask(ctx: &Context, message: &str, batch: bool) -> Result<()> {
    ctx.require_user().await?;
    let mode = if batch { ChatMode::Batch } else { ctx.config.chat.mode };
    let chat = ChatSession::new(
        ctx.backend.orchestrator.clone(),
        SharedTranscript::new(),
        mode,
    );
    // Earlier turns give the advisor context; a failed load still lets us ask
    if let Err(e) = chat.load_history().await {
        tracing::warn!("Continuing without chat history: {}", e);
    }

    let started = Instant::now();
    let mut stdout = std::io::stdout();
    let mut alerts = Vec::new();
    chat.send(message, |progress| match progress {
        ChatProgress::Delta(text) => {
            print!("{}", text);
            stdout.flush().ok();
        }
        ChatProgress::Alert(found) => alerts.extend(found),
        ChatProgress::Sent => {}
    })
    .await
    .context("The advisor did not reply")?;
    println!();

    print_alerts(&alerts);
    tracing::debug!("Turn finished in {:?}", started.elapsed());
    Ok(())
}

pub async fn run_chat_history(ctx: &Context, clear: bool) -> Result<()> {
    ctx.require_user().await?;
    let chat = ChatSession::new(
        ctx.backend.orchestrator.clone(),
        SharedTranscript::new(),
        ctx.config.chat.mode,
    );

    if clear {
        chat.clear_history()
            .await
            .context("Failed to clear chat history")?;
        println!("{} Chat history cleared", "✓".green());
        return Ok(());
    }

    chat.load_history()
        .await
        .context("Could not load your conversation")?;
    let messages = chat.transcript().messages();
    if messages.is_empty() {
        println!("No conversation yet. Start one with `studywat ask <message>`.");
        return Ok(());
    }
    for message in messages {
        let who = if message.is_user {
            "You".bold().blue()
        } else {
            "Advisor".bold().green()
        };
        println!(
            "{} {}",
            who,
            message.timestamp.format("%Y-%m-%d %H:%M").to_string().dimmed()
        );
        println!("{}", message.text);
        print_alerts(&message.alert);
        println!();
    }
    Ok(())
}
