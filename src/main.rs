//! news-admin: command-line console for the news server
//!
//! Usage:
//!   news-admin login <username>          # Password from NEWS_ADMIN_PASSWORD or stdin
//!   news-admin list --page 2 --lang de   # One page of articles, projected into German
//!   news-admin edit <id> --lang de --title "Servus"
//!
//! Required environment variables:
//! - NEWS_ADMIN_API_URL
//!
//! Optional:
//! - NEWS_ADMIN_STATE_DIR (defaults to .news-admin)
//! - NEWS_ADMIN_DEFAULT_LANG (defaults to en)
//! - NEWS_ADMIN_SANITIZE_PREVIEW (defaults to false)
//! - NEWS_ADMIN_REQUEST_TIMEOUT_SECS (no timeout when unset)

use anyhow::{bail, Context, Result};
use news_admin::analytics::{format_count, render_report};
use news_admin::api::{CoverImage, NewsClient};
use news_admin::auth::{AuthContext, FileTokenStore};
use news_admin::config::Config;
use news_admin::error::AdminError;
use news_admin::form::{CreateForm, EditSession, TranslationEdit};
use news_admin::i18n::{Language, LanguageRegistry};
use news_admin::listing::NewsList;
use news_admin::notify::ConsoleNotifier;
use news_admin::preview::{preview_for, render_preview};
use std::io::{BufRead, Write};
use tracing::info;

// ==================== Argument Helpers ====================

/// Value following `--name`, if present.
fn flag_value<'a>(args: &'a [String], name: &str) -> Option<&'a str> {
    args.iter()
        .position(|arg| arg == name)
        .and_then(|i| args.get(i + 1))
        .map(String::as_str)
}

fn has_flag(args: &[String], name: &str) -> bool {
    args.iter().any(|arg| arg == name)
}

/// First argument that is neither a flag nor a flag's value.
fn positional(args: &[String]) -> Option<&str> {
    let mut skip_next = false;
    for arg in args {
        if skip_next {
            skip_next = false;
            continue;
        }
        if arg.starts_with("--") {
            skip_next = !matches!(arg.as_str(), "--yes" | "--sanitize");
            continue;
        }
        return Some(arg.as_str());
    }
    None
}

fn required_id(args: &[String]) -> Result<&str> {
    positional(args).context("Article id is required")
}

fn language_arg(args: &[String], config: &Config) -> Result<Language> {
    let code = flag_value(args, "--lang").unwrap_or(&config.default_lang);
    Ok(Language::from_code(code)?)
}

/// `--content` text, or the contents of `--content-file`.
fn content_arg(args: &[String]) -> Result<Option<String>> {
    if let Some(content) = flag_value(args, "--content") {
        return Ok(Some(content.to_string()));
    }
    match flag_value(args, "--content-file") {
        Some(path) => Ok(Some(
            std::fs::read_to_string(path).with_context(|| format!("Failed to read {}", path))?,
        )),
        None => Ok(None),
    }
}

fn cover_arg(args: &[String]) -> Result<Option<CoverImage>> {
    flag_value(args, "--cover")
        .map(CoverImage::from_path)
        .transpose()
        .map_err(Into::into)
}

fn prompt_line(prompt: &str) -> Result<String> {
    eprint!("{}", prompt);
    std::io::stderr().flush()?;
    let mut line = String::new();
    std::io::stdin().lock().read_line(&mut line)?;
    Ok(line.trim_end_matches(['\r', '\n']).to_string())
}

// ==================== Session ====================

struct Session {
    config: Config,
    auth: AuthContext<FileTokenStore>,
}

impl Session {
    fn load(config: Config) -> Result<Self> {
        let auth = AuthContext::load(FileTokenStore::new(&config.state_dir))?;
        Ok(Self { config, auth })
    }

    fn anonymous_client(&self) -> Result<NewsClient> {
        Ok(NewsClient::new(&self.config)?)
    }

    /// Client carrying the stored token; fails when nobody is logged in.
    fn client(&self) -> Result<NewsClient> {
        let token = self.auth.require_auth()?;
        Ok(NewsClient::new(&self.config)?.with_token(token))
    }
}

// ==================== Commands ====================

async fn login_command(session: &mut Session, args: &[String]) -> Result<()> {
    let username = match positional(args) {
        Some(username) => username.to_string(),
        None => prompt_line("Username: ")?,
    };
    let password = match std::env::var("NEWS_ADMIN_PASSWORD") {
        Ok(password) => password,
        Err(_) => prompt_line("Password: ")?,
    };

    let client = session.anonymous_client()?;
    session.auth.login(&client, &username, &password).await?;

    match session.auth.user() {
        Some(user) => println!("Logged in as {} ({})", user.username, user.role),
        None => println!("Logged in"),
    }
    Ok(())
}

fn whoami_command(session: &Session) -> Result<()> {
    session.auth.require_auth()?;
    match session.auth.user() {
        Some(user) => println!("{} ({}) id={}", user.username, user.role, user.id),
        None => println!("Logged in (identity unavailable)"),
    }
    Ok(())
}

async fn list_command(session: &Session, args: &[String]) -> Result<()> {
    let lang = language_arg(args, &session.config)?;
    let page = match flag_value(args, "--page") {
        Some(page) => page.parse().context("--page must be a positive number")?,
        None => 1,
    };

    let mut list = NewsList::new(session.client()?, lang);
    list.load(page).await?;

    println!(
        "Page {} of {} ({})",
        list.page(),
        list.total_pages(),
        lang.name()
    );
    for row in list.rows() {
        let title = if row.has_translation { row.title.as_str() } else { "(no translation)" };
        let created = row
            .created_at
            .map(|t| t.format("%Y-%m-%d").to_string())
            .unwrap_or_default();
        println!(
            "{:<26} {:>8} views  {:<10}  {}",
            row.id,
            format_count(row.views),
            created,
            title
        );
        if !row.excerpt.is_empty() {
            println!("{:<26} {}", "", row.excerpt);
        }
    }
    Ok(())
}

async fn show_command(session: &Session, args: &[String]) -> Result<()> {
    let id = required_id(args)?;
    let record = session.client()?.get_news(id).await?;
    let normalized = record.normalized();

    println!("id:            {}", record.id);
    println!("original lang: {}", record.original_lang);
    println!("views:         {}", format_count(record.views));
    if let Some(cover) = &record.cover_image {
        println!("cover:         {}", cover);
    }
    let registry = LanguageRegistry::get();
    for code in normalized.languages() {
        println!(
            "[{}] {:<8} {}",
            code,
            registry.display_name(code),
            normalized.title_for(code).unwrap_or("(missing title)")
        );
    }
    for code in normalized.incomplete_languages() {
        println!("warning: {} has only one of title/content", code);
    }
    Ok(())
}

async fn preview_command(session: &Session, args: &[String]) -> Result<()> {
    let id = required_id(args)?;
    let lang = language_arg(args, &session.config)?;
    let client = session.client()?;
    let record = client.get_news(id).await?;

    let sanitize = session.config.sanitize_preview || has_flag(args, "--sanitize");
    let html = render_preview(&preview_for(&record, lang), lang, client.base_url(), sanitize);

    match flag_value(args, "--out") {
        Some(path) => {
            std::fs::write(path, html).with_context(|| format!("Failed to write {}", path))?;
            info!("Preview written to {}", path);
        }
        None => print!("{}", html),
    }
    Ok(())
}

async fn create_command(session: &Session, args: &[String]) -> Result<()> {
    let mut form = CreateForm::new(language_arg(args, &session.config)?);
    form.title = flag_value(args, "--title").unwrap_or_default().to_string();
    form.content = content_arg(args)?.unwrap_or_default();
    form.cover_image = cover_arg(args)?;

    let record = form.submit(&session.client()?, &ConsoleNotifier).await?;
    println!("{}", record.id);
    Ok(())
}

async fn edit_command(session: &Session, args: &[String]) -> Result<()> {
    let id = required_id(args)?;
    let client = session.client()?;

    if let Some(code) = flag_value(args, "--original-lang") {
        let content_flags = ["--lang", "--title", "--content", "--content-file", "--cover"];
        if content_flags.iter().any(|flag| has_flag(args, flag)) {
            bail!("--original-lang cannot be combined with content changes");
        }
        let lang = Language::from_code(code)?;
        let mut edit = EditSession::open(client.get_news(id).await?, None);
        edit.set_original_language(lang, &client, &ConsoleNotifier).await?;
        return Ok(());
    }

    let lang = language_arg(args, &session.config)?;
    let mut edit = EditSession::open(client.get_news(id).await?, Some(lang));
    if edit.current_language() != lang {
        edit.switch_language(lang);
    }
    if let Some(title) = flag_value(args, "--title") {
        edit.set_title(title);
    }
    if let Some(content) = content_arg(args)? {
        edit.set_content(content);
    }
    edit.set_cover_image(cover_arg(args)?);

    edit.submit(&client, &ConsoleNotifier).await?;
    Ok(())
}

async fn translate_command(session: &Session, args: &[String]) -> Result<()> {
    let id = required_id(args)?;
    let code = flag_value(args, "--lang").context("--lang is required")?;
    let lang = Language::from_code(code)?;
    let client = session.client()?;

    let record = client.get_news(id).await?;
    let mut edit = TranslationEdit::open(&record, lang)?;
    if let Some(title) = flag_value(args, "--title") {
        edit.title = title.to_string();
    }
    if let Some(content) = content_arg(args)? {
        edit.content = content;
    }

    edit.submit(&client, &ConsoleNotifier).await?;
    Ok(())
}

async fn delete_command(session: &Session, args: &[String]) -> Result<()> {
    let id = required_id(args)?;
    let skip_prompt = has_flag(args, "--yes");
    let page = match flag_value(args, "--page") {
        Some(page) => page.parse().context("--page must be a positive number")?,
        None => 1,
    };

    let mut list = NewsList::new(session.client()?, language_arg(args, &session.config)?);
    list.load(page).await?;

    let confirm = |id: &str| {
        skip_prompt
            || prompt_line(&format!("Delete article {}? [y/N] ", id))
                .map(|answer| matches!(answer.trim(), "y" | "Y" | "yes"))
                .unwrap_or(false)
    };

    if !list.delete(id, confirm, &ConsoleNotifier).await? {
        println!("Cancelled");
    }
    Ok(())
}

async fn analytics_command(session: &Session, args: &[String]) -> Result<()> {
    let lang = language_arg(args, &session.config)?;
    let summary = session.client()?.analytics().await?;
    print!("{}", render_report(&summary, lang));
    Ok(())
}

fn languages_command() {
    for lang in Language::all() {
        let rtl = if lang.is_rtl() { "  (rtl)" } else { "" };
        println!("{}  {:<8} {}{}", lang.code(), lang.name(), lang.native_name(), rtl);
    }
}

// ==================== Main ====================

fn print_usage() {
    println!(
        r#"
Admin console for multilingual news articles

USAGE:
    news-admin <COMMAND> [ARGS]

COMMANDS:
    login [username]                         Log in and store the session token
    logout                                   Forget the stored token
    whoami                                   Show the logged-in user
    list [--page N] [--lang CODE]            List one page of articles
    show <id>                                Show the languages of an article
    preview <id> [--lang CODE] [--out FILE]  Render an HTML preview
    create --lang CODE --title T (--content HTML | --content-file F) --cover IMG
    edit <id> [--lang CODE] [--title T] [--content HTML | --content-file F] [--cover IMG]
    edit <id> --original-lang CODE           Change only the authoritative language
    translate <id> --lang CODE [--title T] [--content HTML | --content-file F]
    delete <id> [--page N] [--yes]           Delete an article after confirmation
    analytics [--lang CODE]                  Show the analytics dashboard
    languages                                List supported languages

ENVIRONMENT VARIABLES:
    NEWS_ADMIN_API_URL               News server base URL (required)
    NEWS_ADMIN_PASSWORD              Password for 'login' (prompted when unset)
    NEWS_ADMIN_STATE_DIR             Token directory (default: .news-admin)
    NEWS_ADMIN_DEFAULT_LANG          Language when --lang is omitted (default: en)
    NEWS_ADMIN_SANITIZE_PREVIEW      Sanitize preview content (default: false)
    NEWS_ADMIN_REQUEST_TIMEOUT_SECS  Request timeout (default: none)
"#
    );
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Command {
    Login,
    Logout,
    Whoami,
    List,
    Show,
    Preview,
    Create,
    Edit,
    Translate,
    Delete,
    Analytics,
    Languages,
    Help,
}

impl Command {
    fn parse(name: &str) -> Option<Command> {
        Some(match name {
            "login" => Command::Login,
            "logout" => Command::Logout,
            "whoami" => Command::Whoami,
            "list" => Command::List,
            "show" => Command::Show,
            "preview" => Command::Preview,
            "create" => Command::Create,
            "edit" => Command::Edit,
            "translate" => Command::Translate,
            "delete" => Command::Delete,
            "analytics" => Command::Analytics,
            "languages" => Command::Languages,
            "--help" | "-h" | "help" => Command::Help,
            _ => return None,
        })
    }
}

async fn run(command: Command, args: &[String]) -> Result<()> {
    match command {
        Command::Help => {
            print_usage();
            return Ok(());
        }
        Command::Languages => {
            languages_command();
            return Ok(());
        }
        _ => {}
    }

    let config = Config::from_env()?;
    let mut session = Session::load(config)?;

    match command {
        Command::Login => login_command(&mut session, args).await,
        Command::Logout => {
            session.auth.logout()?;
            println!("Logged out");
            Ok(())
        }
        Command::Whoami => whoami_command(&session),
        Command::List => list_command(&session, args).await,
        Command::Show => show_command(&session, args).await,
        Command::Preview => preview_command(&session, args).await,
        Command::Create => create_command(&session, args).await,
        Command::Edit => edit_command(&session, args).await,
        Command::Translate => translate_command(&session, args).await,
        Command::Delete => delete_command(&session, args).await,
        Command::Analytics => analytics_command(&session, args).await,
        Command::Help | Command::Languages => Ok(()),
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file if present
    let _ = dotenvy::dotenv();

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("news_admin=info".parse()?),
        )
        .with_writer(std::io::stderr)
        .init();

    let args: Vec<String> = std::env::args().collect();
    if args.len() < 2 {
        print_usage();
        return Ok(());
    }

    let Some(command) = Command::parse(&args[1]) else {
        eprintln!("Unknown command: {}", args[1]);
        print_usage();
        std::process::exit(1);
    };

    if let Err(e) = run(command, &args[2..]).await {
        if matches!(e.downcast_ref::<AdminError>(), Some(AdminError::Unauthenticated)) {
            eprintln!("Not logged in. Run `news-admin login <username>` first.");
        } else {
            eprintln!("Error: {:#}", e);
        }
        std::process::exit(1);
    }
    Ok(())
}
