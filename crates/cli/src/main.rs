mod cli;
mod commands;
mod config;
mod server_client;
mod terminal;
mod workspace;

use std::path::Path;

use anyhow::{bail, Context, Result};
use clap::Parser;
use tracing::{error, info, warn};

use rfpcat_ingest::FormatDecoder;
use rfpcat_llm::{Categorizer, RfpCategorizer};
use rfpcat_outline::{HeadingParser, HtmlEscaper};

use crate::cli::CliArgs;
use crate::commands::{Command, HELP};
use crate::config::CliConfig;
use crate::server_client::ServerClient;
use crate::terminal::Terminal;
use crate::workspace::Workspace;

#[tokio::main]
async fn main() -> Result<()> {
    rfpcat_core::config::load_dotenv();

    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .with_target(false)
        .init();

    let args = CliArgs::parse();
    let terminal = Terminal::new();

    let config = CliConfig::load(args.config.as_deref())
        .context("failed to load configuration")?;

    let parser = HeadingParser::with_marker(&config.heading_marker)
        .with_context(|| format!("invalid heading marker {:?}", config.heading_marker))?;
    let mut workspace = Workspace::new(FormatDecoder::default(), parser);

    let (categorizer, label) = match build_categorizer(&args, &config).await {
        Ok((categorizer, label)) => (Some(categorizer), label),
        Err(e) if args.out.is_none() => {
            warn!(error = %e, "no categorizer available");
            terminal.print_error(&format!("{:#}", e))?;
            (None, "not configured".to_string())
        }
        Err(e) => return Err(e),
    };

    if let Some(out) = &args.out {
        let categorizer = categorizer.context("no categorizer available")?;
        return run_once(&mut workspace, categorizer.as_ref(), &args, out).await;
    }

    if !args.files.is_empty() {
        workspace.load_paths(&args.files).await;
    }
    if let Some(path) = &args.text {
        workspace.set_pasted(read_text(path).await?);
    }

    terminal.print_banner(&label)?;
    if !workspace.files().is_empty() {
        terminal.print_files(workspace.files(), |name| workspace.is_selected(name))?;
    }

    loop {
        let line = match terminal.read_input()? {
            Some(line) => line,
            None => break,
        };

        let command = match Command::parse(&line) {
            Ok(Some(command)) => command,
            Ok(None) => continue,
            Err(e) => {
                terminal.print_error(&e.to_string())?;
                continue;
            }
        };

        if command == Command::Quit {
            break;
        }
        if let Err(e) = run_command(&mut workspace, categorizer.as_deref(), &terminal, &args.title, command).await {
            terminal.print_error(&format!("{:#}", e))?;
        }
    }

    terminal.print_info("Goodbye.")?;
    Ok(())
}

/// Remote client when a server URL is given, otherwise a direct LLM
/// categorizer built from the config file, environment and flags.
async fn build_categorizer(
    args: &CliArgs,
    config: &CliConfig,
) -> Result<(Box<dyn Categorizer>, String)> {
    if let Some(url) = args.server.as_deref().or(config.server_url.as_deref()) {
        let client = ServerClient::new(url);
        if let Err(e) = client.health_check().await {
            warn!(server = %client.base_url(), error = %e, "server health check failed");
        }
        let label = format!("server {}", client.base_url());
        info!(%label, "using remote categorizer");
        return Ok((Box::new(client), label));
    }

    let provider = args
        .provider
        .clone()
        .unwrap_or_else(|| config.default_provider.clone());
    let model = config.resolve_model(&provider, args.model.as_deref());
    let api_key = config.resolve_api_key(&provider, args.api_key.as_deref());
    let (llm, ollama) = config.provider_configs(&provider, &model, api_key);

    let categorizer = RfpCategorizer::from_config(&llm, &ollama, &config.heading_marker)
        .with_context(|| format!("failed to create {} provider", provider))?;
    let label = format!("{}/{}", provider, model);
    info!(%label, "using LLM categorizer");
    Ok((Box::new(categorizer), label))
}

/// Decode, select, categorize and write the page, then exit.
async fn run_once(
    workspace: &mut Workspace,
    categorizer: &dyn Categorizer,
    args: &CliArgs,
    out: &Path,
) -> Result<()> {
    if !args.files.is_empty() {
        workspace.load_paths(&args.files).await;
    }

    if args.select.is_empty() {
        workspace.select_all();
    } else {
        for name in &args.select {
            if !workspace.files().iter().any(|f| &f.name == name) {
                bail!("no loaded file named '{}'", name);
            }
            workspace.select(name);
        }
    }

    if let Some(path) = &args.text {
        workspace.set_pasted(read_text(path).await?);
    }

    let sections = workspace
        .submit(categorizer)
        .await
        .context("categorization failed")?
        .toc()
        .len();

    let page = workspace
        .render_page(&args.title, &HtmlEscaper)
        .context("nothing to render")?;
    tokio::fs::write(out, page)
        .await
        .with_context(|| format!("failed to write {}", out.display()))?;

    info!(path = %out.display(), sections, "page written");
    Ok(())
}

async fn run_command(
    workspace: &mut Workspace,
    categorizer: Option<&dyn Categorizer>,
    terminal: &Terminal,
    title: &str,
    command: Command,
) -> Result<()> {
    match command {
        Command::Load(paths) => {
            workspace.load_paths(&paths).await;
            terminal.print_files(workspace.files(), |name| workspace.is_selected(name))?;
        }
        Command::List => {
            terminal.print_files(workspace.files(), |name| workspace.is_selected(name))?;
        }
        Command::Toggle(name) => {
            if !workspace.files().iter().any(|f| f.name == name) {
                bail!("no loaded file named '{}'", name);
            }
            workspace.toggle(&name);
            terminal.print_files(workspace.files(), |name| workspace.is_selected(name))?;
        }
        Command::Remove(name) => {
            workspace.remove(&name);
            terminal.print_files(workspace.files(), |name| workspace.is_selected(name))?;
        }
        Command::Show => {
            let text = workspace.submission_text();
            if text.trim().is_empty() {
                terminal.print_info("Nothing to submit: paste text or select files.")?;
            } else {
                if workspace.pasted().is_some_and(|p| !p.trim().is_empty()) {
                    terminal.print_info("(pasted text)")?;
                }
                terminal.print_text(&text)?;
            }
        }
        Command::Paste(path) => {
            let text = read_text(&path).await?;
            terminal.print_info(&format!("Pasted {} characters.", text.chars().count()))?;
            workspace.set_pasted(text);
        }
        Command::ClearPaste => {
            workspace.clear_pasted();
            terminal.print_info("Pasted text cleared.")?;
        }
        Command::Submit => {
            let categorizer = categorizer.context("no categorizer configured")?;
            let spinner = terminal.start_spinner("Categorizing...")?;
            let result = workspace.submit(categorizer).await.map(|o| o.toc().to_vec());
            spinner.stop();
            match result {
                Ok(toc) => terminal.print_toc(&toc)?,
                Err(e) => {
                    error!(error = %e, "submit failed");
                    bail!("{}", e);
                }
            }
        }
        Command::Toc => match workspace.outline() {
            Some(outline) => terminal.print_toc(outline.toc())?,
            None => terminal.print_info("Nothing categorized yet.")?,
        },
        Command::Export(path) => {
            let page = workspace
                .render_page(title, &HtmlEscaper)
                .context("nothing categorized yet")?;
            tokio::fs::write(&path, page)
                .await
                .with_context(|| format!("failed to write {}", path.display()))?;
            terminal.print_info(&format!("Wrote {}", path.display()))?;
        }
        Command::Help => terminal.print_info(HELP)?,
        Command::Quit => {}
    }
    Ok(())
}

async fn read_text(path: &Path) -> Result<String> {
    tokio::fs::read_to_string(path)
        .await
        .with_context(|| format!("failed to read {}", path.display()))
}
