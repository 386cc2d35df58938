//! Scribe CLI - drive the editor save protocol from the command line

use anyhow::Context;
use clap::{Arg, ArgAction, ArgMatches, Command};
use scribe_client::{
    HttpTransport, MemoryPage, MemoryTextArea, PageHandles, SaveController, SaveOutcome,
};
use scribe_core::Config;
use scribe_server::SaveServer;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tracing::{error, info, warn, Level};

fn cli() -> Command {
    Command::new("scribe")
        .version(env!("CARGO_PKG_VERSION"))
        .about("Asynchronous save protocol for in-page editors")
        .long_about(
            "Scribe posts editor buffers to a save endpoint as multipart form data, \
            applies the JSON reply to the page state, and keeps editing sessions alive. \
            It also ships a reference save endpoint for local use and testing.",
        )
        .subcommand_required(true)
        .arg(
            Arg::new("config")
                .short('c')
                .long("config")
                .global(true)
                .help("Path to configuration file (JSON format)")
                .value_parser(clap::value_parser!(PathBuf)),
        )
        .arg(
            Arg::new("verbose")
                .short('v')
                .long("verbose")
                .global(true)
                .help("Enable debug logging")
                .action(ArgAction::SetTrue),
        )
        .subcommand(
            Command::new("save")
                .about("Save a file's contents to an editor page URL")
                .arg(
                    Arg::new("url")
                        .long("url")
                        .required(true)
                        .help("URL of the editing page; the save is posted here"),
                )
                .arg(
                    Arg::new("file")
                        .long("file")
                        .required(true)
                        .help("File whose contents are saved")
                        .value_parser(clap::value_parser!(PathBuf)),
                )
                .arg(
                    Arg::new("file-hash")
                        .long("file-hash")
                        .help("Hash of the version being edited; fetched from the URL when omitted"),
                )
                .arg(
                    Arg::new("saved-on")
                        .long("saved-on")
                        .help("Time of the last save as shown on the page"),
                ),
        )
        .subcommand(
            Command::new("keepalive")
                .about("Ping a URL on a fixed interval to keep a session alive")
                .arg(Arg::new("url").long("url").required(true))
                .arg(
                    Arg::new("interval-ms")
                        .long("interval-ms")
                        .default_value("60000")
                        .value_parser(clap::value_parser!(u64).range(1..)),
                )
                .arg(
                    Arg::new("count")
                        .long("count")
                        .help("Stop after this many pings")
                        .value_parser(clap::value_parser!(u64)),
                ),
        )
        .subcommand(
            Command::new("serve")
                .about("Run the reference save endpoint")
                .arg(
                    Arg::new("root")
                        .long("root")
                        .help("Directory holding one sub-directory per application")
                        .value_parser(clap::value_parser!(PathBuf)),
                )
                .arg(
                    Arg::new("hostname")
                        .short('H')
                        .long("hostname")
                        .help("Hostname or IP address to bind the server to"),
                )
                .arg(
                    Arg::new("port")
                        .short('p')
                        .long("port")
                        .value_parser(clap::value_parser!(u16).range(1..)),
                ),
        )
        .subcommand(Command::new("validate-config").about("Check the configuration and exit"))
}

fn load_config(matches: &ArgMatches) -> anyhow::Result<Config> {
    let path = matches.get_one::<PathBuf>("config");
    let mut config = Config::load(path.map(|p| p.as_path()))?;
    config.apply_environment_overrides(&Config::environment_overrides())?;
    Ok(config)
}

fn memory_page(url: &str, file_hash: &str, saved_on: &str) -> Arc<MemoryPage> {
    Arc::new(
        MemoryPage::new(url)
            .with_input("file_hash", file_hash)
            .with_input("saved_on", saved_on)
            .with_element("exposed", ""),
    )
}

fn controller(config: &Config, page: Arc<MemoryPage>, text: String) -> anyhow::Result<SaveController> {
    let handles = PageHandles {
        widget: None,
        text_area: Arc::new(MemoryTextArea::new(text)),
        dom: page.clone(),
        navigator: page,
    };
    let transport = Arc::new(HttpTransport::new()?);
    Ok(SaveController::new(config.client.clone(), handles, transport))
}

async fn run_save(config: Config, args: &ArgMatches) -> anyhow::Result<()> {
    let url = args.get_one::<String>("url").context("missing --url")?;
    let file = args.get_one::<PathBuf>("file").context("missing --file")?;
    let file_hash = args.get_one::<String>("file-hash");
    let saved_on = args.get_one::<String>("saved-on").map(String::as_str).unwrap_or("");

    let text = tokio::fs::read_to_string(file)
        .await
        .with_context(|| format!("Failed to read {}", file.display()))?;

    let page = memory_page(url, file_hash.map(String::as_str).unwrap_or(""), saved_on);
    let controller = controller(&config, page, text)?;

    if file_hash.is_none() {
        match controller.seed_inputs().await.context("failed to load the page")? {
            Some(snapshot) => info!(
                "Editing version {} saved on {}",
                snapshot.file_hash, snapshot.saved_on
            ),
            None => info!("{} is a new file", url),
        }
    }

    match controller.save().await {
        SaveOutcome::Saved {
            file_hash,
            saved_on,
            exposed,
        } => {
            println!("saved on {} (hash {})", saved_on, file_hash);
            for link in exposed {
                println!("  exposes {} -> {}", link.name, link.href);
            }
            Ok(())
        }
        SaveOutcome::Redirected { location } => {
            anyhow::bail!("server refused the save; continue at {}", location)
        }
        SaveOutcome::Failed(e) => Err(anyhow::Error::new(e).context("save failed")),
    }
}

async fn run_keepalive(config: Config, args: &ArgMatches) -> anyhow::Result<()> {
    let url = args.get_one::<String>("url").context("missing --url")?.clone();
    let interval_ms = *args.get_one::<u64>("interval-ms").unwrap_or(&60_000);
    let limit = args.get_one::<u64>("count").copied();

    let page = memory_page(&url, "", "");
    let controller = controller(&config, page, String::new())?;

    let mut ticker = tokio::time::interval(Duration::from_millis(interval_ms));
    let mut sent = 0u64;
    info!("Pinging {} every {} ms", url, interval_ms);

    loop {
        tokio::select! {
            _ = ticker.tick() => {
                if let Err(e) = controller.ping(&url).await {
                    warn!("Keepalive failed: {}", e);
                }
                sent += 1;
                if limit.is_some_and(|limit| sent >= limit) {
                    break;
                }
            }
            _ = tokio::signal::ctrl_c() => {
                info!("Shutdown signal received");
                break;
            }
        }
    }

    info!("Sent {} keepalive pings", sent);
    Ok(())
}

async fn run_serve(mut config: Config, args: &ArgMatches) -> anyhow::Result<()> {
    if let Some(root) = args.get_one::<PathBuf>("root") {
        config.server.root = root.clone();
    }
    if let Some(hostname) = args.get_one::<String>("hostname") {
        config.server.hostname = hostname.clone();
    }
    if let Some(port) = args.get_one::<u16>("port") {
        config.server.port = *port;
    }
    config.validate()?;

    let server = SaveServer::new(config.server.clone());
    let listener = server.bind().await?;

    println!("Scribe save endpoint");
    println!("Root: {}", config.server.root.display());
    println!("Server: http://{}", config.server.bind_address());
    println!("Press Ctrl+C to stop.");

    server
        .serve(listener, async {
            match tokio::signal::ctrl_c().await {
                Ok(()) => info!("Shutdown signal received"),
                Err(e) => error!("Failed to listen for shutdown signal: {}", e),
            }
        })
        .await?;

    Ok(())
}

fn run_validate(config: &Config) -> anyhow::Result<()> {
    config.validate()?;
    println!("Configuration is valid");
    println!(
        "  save timeout: {} ms, keepalive timeout: {} ms",
        config.client.save_timeout_ms, config.client.keepalive_timeout_ms
    );
    println!("  server: {} (root {})", config.server.bind_address(), config.server.root.display());
    Ok(())
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let matches = cli().get_matches();
    let verbose = matches.get_flag("verbose");

    tracing_subscriber::fmt()
        .with_max_level(if verbose { Level::DEBUG } else { Level::INFO })
        .with_target(verbose)
        .with_line_number(verbose)
        .init();

    let config = match load_config(&matches) {
        Ok(config) => config,
        Err(e) => {
            error!("Failed to load configuration: {:#}", e);
            std::process::exit(1);
        }
    };

    let result = match matches.subcommand() {
        Some(("save", args)) => run_save(config, args).await,
        Some(("keepalive", args)) => run_keepalive(config, args).await,
        Some(("serve", args)) => run_serve(config, args).await,
        Some(("validate-config", _)) => run_validate(&config),
        _ => unreachable!("a subcommand is required"),
    };

    if let Err(e) = result {
        eprintln!("error: {:#}", e);
        std::process::exit(1);
    }

    Ok(())
}
