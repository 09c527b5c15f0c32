use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use voicelab_core::prediction::ModelId;

mod commands;

#[derive(Parser)]
#[command(name = "voicelab")]
#[command(about = "VoiceLab - Alzheimer's voice screening client", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Register a new account
    Register {
        name: String,
        email: String,
        password: String,
    },
    /// Log in and persist the session
    Login { email: String, password: String },
    /// Clear the persisted session
    Logout,
    /// Show the current session
    Whoami,
    /// Analyze an audio file and print the screening result
    Analyze {
        /// Path to the audio file
        file: std::path::PathBuf,
        /// Model to run
        #[arg(long, default_value_t = ModelId::CnnLstm)]
        model: ModelId,
        /// Average both models into an ensemble prediction
        #[arg(long)]
        ensemble: bool,
        /// Also generate an AI caregiver report for the result
        #[arg(long)]
        report: bool,
    },
    /// Chat with the AI caregiver assistant
    Chat,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Register {
            name,
            email,
            password,
        } => commands::auth::register(&name, &email, &password).await?,
        Commands::Login { email, password } => commands::auth::login(&email, &password).await?,
        Commands::Logout => commands::auth::logout().await?,
        Commands::Whoami => commands::auth::whoami().await?,
        Commands::Analyze {
            file,
            model,
            ensemble,
            report,
        } => commands::analyze::run(&file, model, ensemble, report).await?,
        Commands::Chat => commands::chat::run().await?,
    }

    Ok(())
}
