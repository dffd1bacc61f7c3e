//! Subcommand implementations.

use std::path::Path;

use anyhow::{bail, Context, Result};
use auth_adapters::{parse_callback, AuthSession};
use chrono::Utc;
use domains::{AnalysisResult, FileHandle, FileMetadata, FileUpload, Item, NewItem, DEFAULT_MIME};
use services::{
    extract_metadata, format_bytes, ChatAssistant, DiskFile, ItemFilter, ItemTagger, LoadOutcome,
    SyncOutcome,
};
use storage_adapters::check_backend_health;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};

use crate::cli::{AuthAction, ItemsAction, ListArgs, ReportArgs};
use crate::wiring::App;

// ── scan ────────────────────────────────────────────────────────────────────

pub async fn scan(app: &App, path: &Path, no_local: bool, json: bool) -> Result<()> {
    let file = DiskFile::open(path)
        .await
        .with_context(|| format!("cannot open {}", path.display()))?;
    let metadata = extract_metadata(&file).await?;
    let result = app.analyzer(!no_local).classify(&file, &metadata).await?;

    if json {
        println!("{}", serde_json::to_string_pretty(&result)?);
    } else {
        print_report(&metadata, &result);
    }
    Ok(())
}

fn print_report(metadata: &FileMetadata, result: &AnalysisResult) {
    let header: Vec<&str> = metadata.magic_bytes.split(' ').take(16).collect();
    println!("File:     {}", metadata.name);
    println!("Size:     {}", format_bytes(metadata.size, 2));
    println!("Type:     {}", metadata.mime_type);
    println!("Header:   {}", header.join(" "));
    println!();
    println!("Verdict:  {} ({}/100)", result.threat_level, result.score);
    println!("Summary:  {}", result.summary);
    for detail in &result.technical_details {
        println!("  - {detail}");
    }
    println!("Advice:   {}", result.recommendation);
}

// ── engine ──────────────────────────────────────────────────────────────────

#[cfg(feature = "web-axum")]
pub async fn engine(app: &App, bind: Option<String>) -> Result<()> {
    let bind = bind.unwrap_or_else(|| app.config.engine.bind.clone());
    let listener = tokio::net::TcpListener::bind(&bind)
        .await
        .with_context(|| format!("cannot listen on {bind}"))?;
    tracing::info!(%bind, "local analysis engine listening");
    axum::serve(listener, api_adapters::router(api_adapters::EngineState::default()))
        .await
        .context("engine stopped")?;
    Ok(())
}

#[cfg(not(feature = "web-axum"))]
pub async fn engine(_app: &App, _bind: Option<String>) -> Result<()> {
    bail!("built without the web-axum feature")
}

// ── items ───────────────────────────────────────────────────────────────────

pub async fn items(app: &App, action: ItemsAction) -> Result<()> {
    let board = app.board();
    if !matches!(action, ItemsAction::Health) {
        if let LoadOutcome::Demo(failure) = board.refresh().await {
            eprintln!("warning: showing demo data ({}): {}", failure.reason, failure.message);
        }
    }

    match action {
        ItemsAction::List(args) => {
            let filter = to_filter(args);
            print_items(&board.filtered(&filter).await);
        }
        ItemsAction::Report(args) => report(app, &board, args).await?,
        ItemsAction::Claim { id } => {
            let user = app.current_user().await?;
            let pending = board.claim(&id, user.as_ref()).await?;
            match pending.wait().await {
                SyncOutcome::Confirmed => println!("Claimed {id}. The owner will be notified."),
                SyncOutcome::RolledBack(e) => bail!("claim rejected by the server, item is OPEN again: {e}"),
                other => bail!("claim not confirmed: {other:?}"),
            }
        }
        ItemsAction::Resolve { id } => {
            let user = app.require_user().await?;
            board.resolve(&id, &user).await?;
            println!("{}", resolved_notice(&id));
        }
        ItemsAction::Delete { id } => {
            let user = app.require_user().await?;
            let pending = board.delete(&id, &user).await?;
            match pending.wait().await {
                SyncOutcome::Confirmed => println!("Deleted {id}."),
                SyncOutcome::Unconfirmed(e) => eprintln!("warning: deleted locally, server did not confirm: {e}"),
                other => bail!("delete not confirmed: {other:?}"),
            }
        }
        ItemsAction::Mine => {
            let user = app.require_user().await?;
            println!("Reported by you:");
            print_items(&board.reported_by(&user.id).await);
            println!("\nClaimed by you:");
            print_items(&board.claimed_by(&user.id).await);
        }
        ItemsAction::Health => {
            let health = check_backend_health(&reqwest::Client::new(), app.config.api_base_url.as_deref()).await;
            println!("{}", serde_json::to_string(&health)?);
        }
    }
    Ok(())
}

/// The catalog has no resolve endpoint, so the transition lives only in this process.
fn resolved_notice(id: &str) -> String {
    format!("Marked {id} as returned locally. The catalog has no resolve endpoint, so this is not saved.")
}

fn to_filter(args: ListArgs) -> ItemFilter {
    ItemFilter {
        kind: args.kind.map(Into::into),
        categories: args.categories.into_iter().map(Into::into).collect(),
        search: args.search,
        from: args.from,
        to: args.to,
    }
}

fn print_items(items: &[Item]) {
    if items.is_empty() {
        println!("  (none)");
        return;
    }
    for item in items {
        println!(
            "  {:<38} {:<5} {:<8} {:<11} {}  {} @ {}",
            item.id,
            format!("{:?}", item.kind).to_uppercase(),
            item.status,
            item.category.as_str(),
            item.date,
            item.title,
            item.location
        );
    }
}

async fn read_upload(path: &Path) -> Result<(FileUpload, String)> {
    let file = DiskFile::open(path)
        .await
        .with_context(|| format!("cannot open {}", path.display()))?;
    let upload = FileUpload {
        name: file.name().to_string(),
        mime_type: file.declared_type().unwrap_or(DEFAULT_MIME).to_string(),
        body: file.read_all().await?,
    };
    Ok((upload, file.local_reference().await))
}

async fn report(app: &App, board: &services::ItemBoard, args: ReportArgs) -> Result<()> {
    let user = app.require_user().await?;

    let image_url = match &args.image {
        Some(path) => {
            let (upload, local) = read_upload(path).await?;
            board.upload_image(&upload, local).await
        }
        None => String::new(),
    };

    let fields = NewItem {
        kind: args.kind.into(),
        title: args.title,
        description: args.description,
        category: args.category.into(),
        location: args.location,
        date: args.date.unwrap_or_else(|| Utc::now().date_naive()),
        image_url,
        contact_info: args.contact,
    };
    let (item, pending) = board.report(fields, &user).await;
    match pending.wait().await {
        SyncOutcome::Confirmed => println!("Reported {} ({}).", item.title, item.id),
        SyncOutcome::RolledBack(e) => bail!("could not save to the catalog: {e}"),
        other => bail!("report not confirmed: {other:?}"),
    }
    Ok(())
}

// ── auth ────────────────────────────────────────────────────────────────────

pub async fn auth(app: &App, action: AuthAction) -> Result<()> {
    let client = app.hosted_ui()?;
    match action {
        AuthAction::LoginUrl => println!("{}", client.config().login_url()?),
        AuthAction::LogoutUrl => println!("{}", client.config().logout_url()?),
        AuthAction::Callback { redirect } => {
            let code = parse_callback(&redirect)?.context("redirect carries no authorization code")?;
            let tokens = client.exchange_code(&code).await?;
            let profile = client.user_info(&tokens.access_token).await?;

            let access = secrecy::ExposeSecret::expose_secret(&tokens.access_token).to_string();
            let session = AuthSession::new();
            session.sign_in(tokens, profile.to_user()).await;
            if let Some(user) = session.current_user().await {
                println!("Signed in as {} <{}>", user.name, user.email);
            }
            println!("export LOSTIT_TOKEN={access}");
        }
    }
    Ok(())
}

// ── tag / chat ──────────────────────────────────────────────────────────────

pub async fn tag(app: &App, image: &Path) -> Result<()> {
    let (upload, _) = read_upload(image).await?;
    let mut tagger = ItemTagger::new(app.model());
    if let Some(model) = &app.config.ai.tagging_model {
        tagger = tagger.with_model(model.clone());
    }
    let suggestion = tagger.suggest(&upload).await?;
    println!("{}", serde_json::to_string_pretty(&suggestion)?);
    Ok(())
}

pub async fn chat(app: &App) -> Result<()> {
    let mut assistant = ChatAssistant::new(app.model());
    if let Some(model) = &app.config.ai.chat_model {
        assistant = assistant.with_model(model.clone());
    }

    let mut stdout = tokio::io::stdout();
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    println!("Hi! Ask me about reporting or recovering items. /quit leaves.");
    loop {
        stdout.write_all(b"> ").await?;
        stdout.flush().await?;
        let Some(line) = lines.next_line().await? else {
            break;
        };
        if line.trim() == "/quit" {
            break;
        }
        match assistant.send(&line).await {
            Ok(Some(reply)) => println!("{}", reply.text),
            Ok(None) => {}
            Err(e) => eprintln!("error: {e}"),
        }
    }
    Ok(())
}
