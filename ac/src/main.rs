//! ac - conformity analyzer client
//!
//! CLI entry point: analysis, history, property listings and sign-in.

use std::fs;
use std::io::BufRead;
use std::path::Path;
use std::process::ExitCode;
use std::sync::Arc;

use clap::{CommandFactory, FromArgMatches};
use colored::*;
use eyre::{Context, Result};
use tracing::{debug, info};

use analyzer::cli::{Cli, Command, OutputFormat, generate_after_help, get_log_path};
use analyzer::config::Config;
use analyzer::events::{ActivityBus, ApiEvent, create_activity_bus, read_activity, spawn_activity_logger};
use analyzer::http::ApiClient;
use analyzer::lifecycle::RequestLifecycle;
use analyzer::notify::{ConsolePresenter, Notifier};
use analyzer::services::{AnalysisService, HistoryService};
use analyzer::views::guard::LOGIN_ROUTE;
use analyzer::views::{
    Access, AnalyzerView, GlobalLoader, HistoryView, LoginView, PropertyListView, RouteGuard, Verdict, score_label,
};
use backstore::{AuthBackend, AuthClient, PropertyStore};

fn setup_logging(cli_log_level: Option<&str>, config_log_level: Option<&str>) -> Result<()> {
    let log_path = get_log_path();
    if let Some(log_dir) = log_path.parent() {
        fs::create_dir_all(log_dir).context("Failed to create log directory")?;
    }

    // Priority: CLI --log-level > config file > INFO
    let level = match cli_log_level.or(config_log_level).map(|s| s.to_uppercase()) {
        Some(s) => match s.as_str() {
            "TRACE" => tracing::Level::TRACE,
            "DEBUG" => tracing::Level::DEBUG,
            "INFO" => tracing::Level::INFO,
            "WARN" | "WARNING" => tracing::Level::WARN,
            "ERROR" => tracing::Level::ERROR,
            _ => {
                eprintln!("Warning: Unknown log-level '{}', defaulting to INFO", s);
                tracing::Level::INFO
            }
        },
        None => tracing::Level::INFO,
    };

    let log_file = fs::File::create(&log_path).context("Failed to create log file")?;

    tracing_subscriber::fmt()
        .with_writer(log_file)
        .with_ansi(false)
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env().add_directive(level.into()))
        .init();

    info!("Logging initialized (level: {:?})", level);
    Ok(())
}

fn read_password() -> Result<String> {
    eprint!("Password: ");
    let mut line = String::new();
    std::io::stdin()
        .lock()
        .read_line(&mut line)
        .context("Failed to read password from stdin")?;
    Ok(line.trim_end_matches(['\r', '\n']).to_string())
}

/// Everything a command needs to reach the servers
struct App {
    config: Config,
    lifecycle: Arc<RequestLifecycle>,
    notifier: Arc<dyn Notifier>,
    client: Arc<ApiClient>,
}

impl App {
    fn auth(&self) -> Result<AuthClient> {
        AuthClient::from_config(&self.config.backstore).context("Failed to create auth client")
    }
}

#[tokio::main]
async fn main() -> Result<ExitCode> {
    let cmd = Cli::command().after_help(generate_after_help());
    let cli = Cli::from_arg_matches(&cmd.get_matches())?;

    let config = Config::load(cli.config.as_ref()).context("Failed to load configuration")?;
    setup_logging(cli.log_level.as_deref(), config.log_level.as_deref()).context("Failed to setup logging")?;
    config.validate().context("Invalid configuration")?;
    info!(base_url = %config.api.base_url, "ac loaded config");

    let lifecycle = Arc::new(RequestLifecycle::new());
    let loader = GlobalLoader::stderr(lifecycle.state());
    let notifier: Arc<dyn Notifier> = Arc::new(ConsolePresenter::stderr(config.notifications.display()));

    let (activity, activity_logger): (Option<Arc<ActivityBus>>, _) = if config.activity.enabled {
        let bus = create_activity_bus();
        let handle = spawn_activity_logger(&bus, &config.activity.dir);
        (Some(bus), Some(handle))
    } else {
        (None, None)
    };

    let client = Arc::new(
        ApiClient::from_config(&config.api, lifecycle.clone(), notifier.clone(), activity)
            .context("Failed to create API client")?,
    );

    let app = App {
        config,
        lifecycle,
        notifier,
        client,
    };

    debug!(command = ?cli.command, "main: dispatching command");
    let result = run(&app, cli.command).await;

    // The client holds the last handle on the activity bus
    drop(app);
    if let Some(handle) = activity_logger {
        let _ = handle.await;
    }
    let _ = loader.flush();

    result
}

async fn run(app: &App, command: Command) -> Result<ExitCode> {
    match command {
        Command::Analyze { text, file } => {
            let text = match (text, file) {
                (Some(text), _) => text,
                (None, Some(path)) => read_text(&path)?,
                (None, None) => String::new(),
            };
            cmd_analyze(app, text).await
        }
        Command::History {
            page,
            limit,
            search,
            min_score,
            format,
        } => {
            let limit = limit.unwrap_or(app.config.history.page_size);
            cmd_history(app, page, limit, search.unwrap_or_default(), min_score, format).await
        }
        Command::Properties => cmd_properties(app).await,
        Command::Login { email, password } => {
            let password = match password {
                Some(p) => p,
                None => read_password()?,
            };
            cmd_login(app, email, password).await
        }
        Command::Logout => cmd_logout(app).await,
        Command::Whoami { role } => cmd_whoami(app, role),
        Command::Activity { lines } => cmd_activity(app, lines),
    }
}

fn read_text(path: &Path) -> Result<String> {
    fs::read_to_string(path).context(format!("Failed to read {}", path.display()))
}

async fn cmd_analyze(app: &App, text: String) -> Result<ExitCode> {
    debug!(len = text.len(), "cmd_analyze: called");
    let service = Arc::new(AnalysisService::new(app.client.clone()));
    let mut view = AnalyzerView::new(service, app.notifier.clone());
    view.set_text(text);

    // Failures have already been notified on stderr
    if view.submit().await.is_err() {
        return Ok(ExitCode::FAILURE);
    }

    if let (Some(result), Some(verdict)) = (view.result(), view.verdict()) {
        let title = match verdict {
            Verdict::Compliant => verdict.title().green().bold(),
            Verdict::Partial => verdict.title().yellow().bold(),
        };
        println!("{}  {}", score_label(result.score).bold(), title);
        println!("{}", verdict.description());
        println!("{} {}", "Status:".dimmed(), result.status);
    }
    Ok(ExitCode::SUCCESS)
}

async fn cmd_history(
    app: &App,
    page: u32,
    limit: u32,
    search: String,
    min_score: Option<u32>,
    format: OutputFormat,
) -> Result<ExitCode> {
    debug!(page, limit, %search, ?min_score, "cmd_history: called");
    let service = Arc::new(HistoryService::new(app.client.clone()));
    let mut view = HistoryView::new(service, limit).with_query(
        page,
        search,
        min_score.unwrap_or(analyzer::views::history::DEFAULT_MIN_SCORE),
    );

    if view.refresh().await.is_err() {
        return Ok(ExitCode::FAILURE);
    }

    match format {
        OutputFormat::Json => {
            let out = serde_json::json!({
                "data": view.items(),
                "pagination": view.pagination(),
            });
            println!("{}", serde_json::to_string_pretty(&out)?);
        }
        OutputFormat::Text => print!("{}", view.render()),
    }
    Ok(ExitCode::SUCCESS)
}

async fn cmd_properties(app: &App) -> Result<ExitCode> {
    debug!("cmd_properties: called");
    let auth = app.auth()?;
    let session = auth.restore();
    let store = PropertyStore::from_config(&app.config.backstore).context("Failed to create property store")?;

    let mut view = PropertyListView::new(Arc::new(store), app.lifecycle.clone());
    view.load(session.as_ref()).await;
    println!("{}", "Published properties".bold());
    print!("{}", view.render());
    Ok(ExitCode::SUCCESS)
}

async fn cmd_login(app: &App, email: String, password: String) -> Result<ExitCode> {
    debug!(%email, "cmd_login: called");
    let auth: Arc<dyn AuthBackend> = Arc::new(app.auth()?);
    let mut view = LoginView::new(auth.clone());
    view.set_email(email);
    view.set_password(password);

    match view.submit().await {
        Ok(redirect) => {
            let who = auth
                .get_session()
                .and_then(|s| s.user.email)
                .unwrap_or_default();
            println!("{} Signed in as {}", "✓".green(), who.cyan());
            debug!(%redirect, "cmd_login: redirect target");
            Ok(ExitCode::SUCCESS)
        }
        Err(e) => {
            eprintln!("{} {}", "✗".red(), e);
            Ok(ExitCode::FAILURE)
        }
    }
}

async fn cmd_logout(app: &App) -> Result<ExitCode> {
    debug!("cmd_logout: called");
    let auth = app.auth()?;
    auth.restore();
    auth.sign_out().await.context("Failed to sign out")?;
    println!("{} Signed out", "✓".green());
    Ok(ExitCode::SUCCESS)
}

fn cmd_whoami(app: &App, role: Option<String>) -> Result<ExitCode> {
    debug!(?role, "cmd_whoami: called");
    let auth = app.auth()?;
    let session = auth.restore();
    let guard = role.clone().map(RouteGuard::with_role).unwrap_or_default();

    match guard.check(session.as_ref().map(|s| &s.user)) {
        Access::Allow => {
            if let Some(session) = session {
                let user = session.user;
                println!("User: {}", user.id.cyan());
                if let Some(email) = &user.email {
                    println!("  Email: {}", email);
                }
                println!("  Role: {}", user.role().unwrap_or("-"));
            }
            Ok(ExitCode::SUCCESS)
        }
        Access::Redirect(LOGIN_ROUTE) => {
            println!("Not signed in (ac login --email ...)");
            Ok(ExitCode::FAILURE)
        }
        Access::Redirect(_) => {
            println!(
                "{} Role {} required",
                "✗".red(),
                role.as_deref().unwrap_or("-").yellow()
            );
            Ok(ExitCode::FAILURE)
        }
    }
}

fn cmd_activity(app: &App, lines: usize) -> Result<ExitCode> {
    debug!(lines, "cmd_activity: called");
    let entries = read_activity(&app.config.activity.dir, Some(lines)).context("Failed to read activity log")?;
    if entries.is_empty() {
        println!("No activity recorded");
        return Ok(ExitCode::SUCCESS);
    }

    for entry in entries {
        let ts = entry.timestamp.format("%Y-%m-%d %H:%M:%S");
        let id = entry.event.short_id();
        let detail = match &entry.event {
            ApiEvent::RequestStarted { method, path, .. } => format!("{} {}", method, path),
            ApiEvent::RequestSucceeded { status, duration_ms, .. } => {
                format!("{} in {}ms", status.to_string().green(), duration_ms)
            }
            ApiEvent::RequestFailed {
                kind,
                status,
                duration_ms,
                ..
            } => {
                let status = status.map(|s| s.to_string()).unwrap_or_else(|| "-".to_string());
                format!("{} {:?} in {}ms", status.red(), kind, duration_ms)
            }
        };
        println!("{} {} {:<16} {}", ts.to_string().dimmed(), id, entry.event.event_type(), detail);
    }
    Ok(ExitCode::SUCCESS)
}
