//! atmodem CLI
//!
//! Talks to a modem exposed through a serial-to-TCP bridge.

use std::process;
use std::time::Duration;

use atmodem::commands::{self, network, sim, status};
use atmodem::{Config, Engine, Status, TcpTransport};
use clap::{Parser, Subcommand};
use tracing_subscriber::{fmt, EnvFilter};

/// atmodem CLI
#[derive(Parser, Debug)]
#[command(name = "atmodem-cli")]
#[command(about = "Send AT commands to a cellular modem over a TCP serial bridge")]
#[command(version)]
struct Args {
    /// Bridge address (host:port)
    #[arg(short, long, default_value = "127.0.0.1:4000")]
    bridge: String,

    /// Command timeout in milliseconds
    #[arg(short, long, default_value = "9000")]
    timeout_ms: u64,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Send a raw command and print every response line
    Raw {
        /// Command text, e.g. AT+CGMI
        command: String,
    },

    /// Query signal quality
    Csq,

    /// Query network registration
    Creg,

    /// Query SIM PIN state
    Cpin,

    /// Check that the modem answers AT
    Ping,

    /// Print unsolicited lines for a while
    Listen {
        /// How long to listen, in seconds
        #[arg(default_value = "30")]
        seconds: u64,
    },
}

fn main() {
    // Initialize tracing/logging
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,atmodem=debug"));

    fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_thread_ids(true)
        .init();

    let args = Args::parse();

    tracing::info!("atmodem CLI v{}", atmodem::VERSION);
    tracing::info!("Bridge address: {}", args.bridge);

    let config = Config::builder().default_timeout_ms(args.timeout_ms).build();

    let transport = match TcpTransport::connect(&args.bridge, Duration::from_secs(1)) {
        Ok(t) => t,
        Err(e) => {
            tracing::error!("Failed to connect to {}: {}", args.bridge, e);
            process::exit(1);
        }
    };

    let engine = match Engine::start(config, transport) {
        Ok(e) => e,
        Err(e) => {
            tracing::error!("Failed to start engine: {}", e);
            process::exit(1);
        }
    };

    if let Err(e) = run(&engine, args.command) {
        eprintln!("(error) {}", e);
        engine.stop();
        process::exit(1);
    }

    engine.stop();
}

fn run(engine: &Engine, command: Commands) -> atmodem::Result<()> {
    match command {
        Commands::Raw { command } => {
            let reply = commands::raw(engine, &command, Duration::ZERO)?;

            for line in &reply.lines {
                println!("{}", line);
            }
            match reply.status {
                Status::Ok => println!("OK"),
                Status::Error(line) => println!("{}", line),
            }
        }

        Commands::Csq => {
            let quality = status::signal_quality(engine)?;
            match quality.dbm() {
                Some(dbm) => println!("rssi {} ({} dBm)", quality.rssi, dbm),
                None => println!("rssi {} (unknown)", quality.rssi),
            }
            println!("ber {} ({})", quality.ber, quality.ber_description());
        }

        Commands::Creg => {
            let stat = network::registration(engine)?;
            println!("{}", stat);
        }

        Commands::Cpin => {
            let pin = sim::pin_status(engine)?;
            println!("{:?}", pin);
        }

        Commands::Ping => {
            commands::probe(engine)?;
            println!("PONG");
        }

        Commands::Listen { seconds } => {
            let unsolicited = engine.unsolicited();
            let deadline = std::time::Instant::now() + Duration::from_secs(seconds);

            loop {
                let remaining = deadline.saturating_duration_since(std::time::Instant::now());
                match unsolicited.recv_timeout(remaining) {
                    Ok(line) => println!("{}", line),
                    Err(_) => break,
                }
            }
        }
    }

    Ok(())
}
