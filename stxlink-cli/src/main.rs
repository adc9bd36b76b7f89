use anyhow::Result;
use clap::{Parser, Subcommand};
use stxlink_cli::{commands, load_config, ParityArg};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

#[derive(Parser)]
#[command(name = "stxlink")]
#[command(about = "stxlink - STX/ETX framed text link with ACK/NAK handshake", long_about = None)]
#[command(version)]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// JSON configuration file
    #[arg(short, long, global = true)]
    config: Option<String>,

    /// Override the configured parity
    #[arg(long, global = true, value_enum)]
    parity: Option<ParityArg>,

    /// Disable the trailing checksum byte
    #[arg(long, global = true)]
    no_checksum: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print or write the default configuration
    Config {
        /// Output file for the configuration
        #[arg(short, long)]
        output: Option<String>,
    },

    /// Build a frame and print it as hex
    Frame {
        /// Text payload
        text: String,

        /// Mark the frame as continued
        #[arg(long)]
        more: bool,
    },

    /// Check a captured frame given as hex
    Inspect {
        /// Frame bytes in hex
        hex: String,

        /// Print the report as JSON
        #[arg(long)]
        json: bool,
    },

    /// Connect to a listener and deliver texts as one message
    Send {
        /// Peer address
        #[arg(short, long)]
        addr: String,

        /// Texts to send, one frame each
        #[arg(required = true)]
        texts: Vec<String>,
    },

    /// Accept one peer and print the texts it delivers
    Listen {
        /// Address to bind
        #[arg(short, long, default_value = "127.0.0.1:7070")]
        bind: String,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Setup logging
    let filter = if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::new("info")
    };

    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(filter)
        .init();

    if let Commands::Config { output } = &cli.command {
        return commands::config::execute(output.as_deref());
    }

    let config = load_config(cli.config.as_deref(), cli.parity, cli.no_checksum)?;

    // Execute command
    match cli.command {
        Commands::Config { .. } => Ok(()),

        Commands::Frame { text, more } => commands::frame::execute(&text, more, &config),

        Commands::Inspect { hex, json } => commands::inspect::execute(&hex, json, &config),

        Commands::Send { addr, texts } => commands::send::execute(&addr, &texts, &config),

        Commands::Listen { bind } => commands::listen::execute(&bind, &config),
    }
}
