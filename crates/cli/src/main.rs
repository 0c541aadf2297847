use anyhow::{Context, Result};
use behave_core::logging::{LoggingConfig, init_logging, sanitize_path};
use behave_core::Config;
use behave_store::{DatabaseProbe, ProbeReport};
use behave_transport::{ConnectionManager, Endpoint, SocketIoConnector};
use behave_ui::render::{self, RenderOptions};
use behave_ui::{ChatSession, SessionOptions, SubmitOutcome, TranscriptChange};
use clap::{Parser, Subcommand};
use owo_colors::OwoColorize;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::io::{AsyncBufReadExt, BufReader};

const DEFAULT_CONFIG_PATH: &str = "behave.toml";

/// Behave - terminal chat client for the BDD assistant backend
#[derive(Parser, Debug)]
#[command(name = "behave")]
#[command(about = "Chat with the Behave Yourself assistant over Socket.IO", long_about = None)]
#[command(version = "0.1.0")]
struct Cli {
    /// Path to behave.toml (default: ./behave.toml, built-in defaults if absent)
    #[arg(short, long, value_name = "PATH")]
    config: Option<PathBuf>,

    /// Verbose output
    #[arg(short, long)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Open an interactive chat session
    Chat {
        /// Backend URL (overrides server.url)
        #[arg(long, value_name = "URL")]
        url: Option<String>,

        /// Chat namespace (overrides server.namespace)
        #[arg(long, value_name = "NS")]
        namespace: Option<String>,
    },
    /// Ping the configured MongoDB deployment and exit
    Probe {
        /// Connection string (overrides database.uri and BEHAVE_MONGODB_URI)
        #[arg(long, value_name = "URI")]
        uri: Option<String>,
    },
    /// Print the effective configuration
    Config {
        /// Print the annotated example instead
        #[arg(long)]
        example: bool,
    },
}

fn main() {
    if let Err(e) = run() {
        eprintln!("{} {:#}", "Error:".red().bold(), e);
        std::process::exit(1);
    }
}

fn run() -> Result<()> {
    let cli = Cli::parse();

    let config = load_config(cli.config.as_deref())?;

    let mut logging = LoggingConfig::from(config.logging.clone());
    if cli.verbose {
        logging = logging.with_level("debug");
    }
    let _guard = init_logging(Some(logging)).context("Failed to initialize logging")?;

    if cli.verbose {
        let path = cli.config.as_deref().unwrap_or(Path::new(DEFAULT_CONFIG_PATH));
        eprintln!("{} Using config: {}", "Info:".blue().bold(), sanitize_path(path));
    }

    match cli.command {
        Commands::Config { example } => cmd_config(&config, example),
        Commands::Probe { uri } => runtime()?.block_on(cmd_probe(&config, uri)),
        Commands::Chat { url, namespace } => runtime()?.block_on(cmd_chat(config, url, namespace)),
    }
}

fn runtime() -> Result<tokio::runtime::Runtime> {
    tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
        .context("Failed to start async runtime")
}

/// Load config from an explicit path, or from ./behave.toml when present.
///
/// An explicit path must exist; a missing default file means built-in defaults.
fn load_config(path: Option<&Path>) -> Result<Config> {
    match path {
        Some(path) => Config::from_file(path).with_context(|| format!("Failed to load config from {}", path.display())),
        None => {
            let path = Path::new(DEFAULT_CONFIG_PATH);
            if path.exists() {
                Config::from_file(path).with_context(|| format!("Failed to load config from {}", path.display()))
            } else {
                Ok(Config::default())
            }
        }
    }
}

/// Apply command-line overrides to the `[server]` section and re-validate
fn apply_server_overrides(config: &mut Config, url: Option<String>, namespace: Option<String>) -> Result<()> {
    if let Some(url) = url {
        config.server.url = url;
    }
    if let Some(namespace) = namespace {
        config.server.namespace = namespace;
    }
    config.validate().context("Invalid server settings")?;
    Ok(())
}

fn render_config(config: &Config, example: bool) -> Result<String> {
    if example {
        return Ok(Config::example().to_string());
    }
    config.to_toml_string().context("Failed to serialize config")
}

fn cmd_config(config: &Config, example: bool) -> Result<()> {
    print!("{}", render_config(config, example)?);
    Ok(())
}

async fn cmd_probe(config: &Config, uri: Option<String>) -> Result<()> {
    let probe = match uri {
        Some(uri) => DatabaseProbe::new(uri),
        None => DatabaseProbe::from_config(&config.database)?,
    };

    let report = probe.probe().await.context("Error connecting to MongoDB")?;
    println!("{} {}", "Success:".green().bold(), probe_summary(&report));
    Ok(())
}

fn probe_summary(report: &ProbeReport) -> String {
    format!(
        "Pinged {} in {} ms. You successfully connected to MongoDB!",
        report.hosts.join(", "),
        report.latency.as_millis()
    )
}

async fn cmd_chat(mut config: Config, url: Option<String>, namespace: Option<String>) -> Result<()> {
    apply_server_overrides(&mut config, url, namespace)?;

    if config.database.probe_on_start {
        cmd_probe(&config, None).await?;
    }

    let options = RenderOptions { color: atty::is(atty::Stream::Stdout), ..RenderOptions::default() };
    let manager = Arc::new(ConnectionManager::new(
        Endpoint::from(&config.server),
        Arc::new(SocketIoConnector::new()),
    ));
    let privacy = LoggingConfig::from(config.logging.clone()).privacy;
    let mut session = ChatSession::open(
        manager,
        SessionOptions::default().with_welcome(config.chat.welcome.clone()).with_privacy(privacy),
    )
    .await;

    println!("{}\n", render::render_title(&config.chat.title, &options));
    let entries = session.snapshot();
    if !entries.is_empty() {
        println!("{}\n", render::render_transcript(&entries, session.is_processing(), &options));
    }
    prompt();

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let ctrl_c = tokio::signal::ctrl_c();
    tokio::pin!(ctrl_c);
    loop {
        tokio::select! {
            line = lines.next_line() => {
                let Some(line) = line.context("Failed to read from stdin")? else {
                    break;
                };
                if line.trim() == "/quit" {
                    break;
                }
                match session.submit(&line).await {
                    SubmitOutcome::Accepted { index } => {
                        if let Some(entry) = session.entry(index) {
                            println!("\n{}\n", render::render_entry(&entry, &options));
                        }
                        println!("{}", render::render_thinking(&options));
                    }
                    SubmitOutcome::Empty => prompt(),
                    SubmitOutcome::Busy => {
                        eprintln!("{} Still waiting for the previous reply", "Info:".yellow().bold());
                    }
                }
            }
            change = session.next_change() => {
                match change {
                    Some(TranscriptChange::Appended(index)) | Some(TranscriptChange::ToolCompleted(index)) => {
                        if let Some(entry) = session.entry(index) {
                            println!("\n{}", render::render_entry(&entry, &options));
                        }
                    }
                    Some(TranscriptChange::TurnFinished) => {
                        println!();
                        prompt();
                    }
                    None => break,
                }
            }
            _ = &mut ctrl_c => break,
        }
    }

    if let Err(e) = session.close().await {
        tracing::warn!(error = %e, "Failed to close connection cleanly");
    }
    Ok(())
}

fn prompt() {
    print!("> ");
    let _ = std::io::stdout().flush();
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;
    use tempfile::TempDir;

    #[test]
    fn test_cli_verify() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_cli_default_values() {
        let cli = Cli::try_parse_from(["behave", "chat"]).unwrap();
        assert!(cli.config.is_none());
        assert!(!cli.verbose);
        assert!(matches!(cli.command, Commands::Chat { url: None, namespace: None }));
    }

    #[test]
    fn test_cli_with_config_and_verbose() {
        let cli = Cli::try_parse_from(["behave", "--config", "/path/to/behave.toml", "-v", "config"]).unwrap();
        assert_eq!(cli.config, Some(PathBuf::from("/path/to/behave.toml")));
        assert!(cli.verbose);
        assert!(matches!(cli.command, Commands::Config { example: false }));
    }

    #[test]
    fn test_cli_chat_overrides() {
        let cli =
            Cli::try_parse_from(["behave", "chat", "--url", "http://example.com:9000", "--namespace", "/other"]).unwrap();
        if let Commands::Chat { url, namespace } = cli.command {
            assert_eq!(url.as_deref(), Some("http://example.com:9000"));
            assert_eq!(namespace.as_deref(), Some("/other"));
        } else {
            panic!("Expected Chat command");
        }
    }

    #[test]
    fn test_cli_probe_command() {
        let cli = Cli::try_parse_from(["behave", "probe", "--uri", "mongodb://localhost:27017"]).unwrap();
        if let Commands::Probe { uri } = cli.command {
            assert_eq!(uri.as_deref(), Some("mongodb://localhost:27017"));
        } else {
            panic!("Expected Probe command");
        }
    }

    #[test]
    fn test_cli_requires_subcommand() {
        assert!(Cli::try_parse_from(["behave"]).is_err());
    }

    #[test]
    fn test_load_config_explicit_path() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("behave.toml");
        std::fs::write(&path, "[server]\nurl = \"http://chat.local:8080\"\n").unwrap();

        let config = load_config(Some(&path)).unwrap();
        assert_eq!(config.server.url, "http://chat.local:8080");
        assert_eq!(config.server.namespace, "/socket/chat");
    }

    #[test]
    fn test_load_config_explicit_path_missing() {
        let temp = TempDir::new().unwrap();
        let err = load_config(Some(&temp.path().join("missing.toml"))).unwrap_err();
        assert!(err.to_string().contains("Failed to load config"));
    }

    #[test]
    fn test_load_config_invalid() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("behave.toml");
        std::fs::write(&path, "invalid toml").unwrap();
        assert!(load_config(Some(&path)).is_err());
    }

    #[test]
    fn test_load_config_example_parses() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("behave.toml");
        std::fs::write(&path, Config::example()).unwrap();
        let config = load_config(Some(&path)).unwrap();
        assert_eq!(config.server, Config::default().server);
        assert!(!config.database.probe_on_start);
    }

    #[test]
    fn test_apply_server_overrides() {
        let mut config = Config::default();
        apply_server_overrides(&mut config, Some("https://chat.example.com".to_string()), None).unwrap();
        assert_eq!(config.server.url, "https://chat.example.com");
        assert_eq!(config.server.namespace, "/socket/chat");

        let mut config = Config::default();
        let err = apply_server_overrides(&mut config, None, Some("no-slash".to_string())).unwrap_err();
        assert!(err.to_string().contains("Invalid server settings"));
    }

    #[test]
    fn test_render_config() {
        let config = Config::default();
        let rendered = render_config(&config, false).unwrap();
        assert_eq!(Config::from_toml_str(&rendered).unwrap(), config);

        let example = render_config(&config, true).unwrap();
        assert!(example.contains("[server]"));
        assert!(example.contains("namespace = \"/socket/chat\""));
    }

    #[test]
    fn test_probe_summary_names_hosts() {
        let report = ProbeReport {
            hosts: vec!["db1.example.com:27017".to_string(), "db2.example.com:27017".to_string()],
            latency: std::time::Duration::from_millis(42),
        };
        assert_eq!(
            probe_summary(&report),
            "Pinged db1.example.com:27017, db2.example.com:27017 in 42 ms. You successfully connected to MongoDB!"
        );
    }

    #[tokio::test]
    async fn test_cmd_probe_invalid_uri_fails() {
        let err = cmd_probe(&Config::default(), Some("not-a-uri".to_string())).await.unwrap_err();
        assert!(err.to_string().contains("MongoDB"));
    }
}
