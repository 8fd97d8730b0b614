use clap::{Parser, ValueEnum};
use snapshotter_mcp_server::config::LogFormat;
use snapshotter_mcp_server::server::{http, stdio};
use snapshotter_mcp_server::{Config, McpServer};
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::TcpListener;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum Transport {
    Stdio,
    Http,
    Tcp,
}

/// MCP server exposing the Snapshotter Core API as tools
#[derive(Parser, Debug)]
#[command(name = "snapshotter-mcp-server")]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[arg(short, long, value_enum, env = "MCP_TRANSPORT", default_value = "stdio")]
    transport: Transport,

    /// Bind address for the http and tcp transports
    #[arg(long, env = "MCP_HOST", default_value = "127.0.0.1")]
    host: String,

    #[arg(short, long, env = "MCP_PORT", default_value_t = 8000)]
    port: u16,
}

#[tokio::main]
async fn main() -> eyre::Result<()> {
    let cli = Cli::parse();
    let config = Config::from_env()?;

    init_tracing(config.log_format);

    info!("Starting Snapshotter MCP Server ({:?} transport)...", cli.transport);

    let mcp_server = Arc::new(McpServer::new(&config)?);
    info!(
        "Serving {} tools from {}",
        mcp_server.tool_definitions().len(),
        config.api_base_url
    );

    match cli.transport {
        Transport::Stdio => stdio::serve_stdio(mcp_server).await,
        Transport::Http => {
            let addr: SocketAddr = format!("{}:{}", cli.host, cli.port).parse()?;
            http::serve(mcp_server, addr).await
        }
        Transport::Tcp => {
            let addr: SocketAddr = format!("{}:{}", cli.host, cli.port).parse()?;
            serve_tcp(mcp_server, addr).await
        }
    }
}

// stdout carries the protocol on the stdio transport, so logs always go to stderr.
fn init_tracing(format: LogFormat) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .with_thread_ids(false)
        .with_line_number(true);

    match format {
        LogFormat::Text => builder.init(),
        LogFormat::Json => builder.json().init(),
    }
}

async fn serve_tcp(mcp_server: Arc<McpServer>, addr: SocketAddr) -> eyre::Result<()> {
    let listener = TcpListener::bind(&addr).await?;
    info!("MCP server listening on tcp://{}", listener.local_addr()?);

    loop {
        let (socket, peer_addr) = listener.accept().await?;
        let mcp_server = Arc::clone(&mcp_server);

        tokio::spawn(async move {
            let (reader, writer) = socket.into_split();
            if let Err(e) = stdio::serve_lines(mcp_server, reader, writer).await {
                error!("Error handling connection from {}: {}", peer_addr, e);
            }
        });
    }
}
