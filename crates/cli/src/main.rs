use clap::Parser;

#[derive(Parser)]
#[command(name = "clospots")]
#[command(version, about = "LINE bot that finds cafés open near you", long_about = None)]
struct Cli {
    /// Config file path (default: CLOSPOTS_CONFIG_PATH or ~/.clospots/config.json)
    #[arg(long, short, value_name = "PATH")]
    config: Option<std::path::PathBuf>,

    /// Webhook HTTP port (default from config or 8000)
    #[arg(long, short)]
    port: Option<u16>,

    /// Bind address (default from config or 127.0.0.1)
    #[arg(long, value_name = "ADDR")]
    bind: Option<String>,

    /// Log at debug level (RUST_LOG still takes precedence)
    #[arg(long, short)]
    debug: bool,
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    let level = if cli.debug { "debug" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level)).init();

    if let Err(e) = run_server(cli).await {
        log::error!("server failed: {:#}", e);
        std::process::exit(1);
    }
}

async fn run_server(cli: Cli) -> anyhow::Result<()> {
    let mut config = lib::config::load_config(cli.config)?;
    if let Some(p) = cli.port {
        config.server.port = p;
    }
    if let Some(b) = cli.bind {
        config.server.bind = b;
    }
    log::info!("starting clospots on {}:{}", config.server.bind, config.server.port);
    lib::server::run_server(config).await
}
