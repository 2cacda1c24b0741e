//! mockexam CLI: sign up, upload questions, take timed tests, review results.

use std::path::PathBuf;
use std::process;

use clap::{Parser, Subcommand};

mod commands;

#[derive(Parser)]
#[command(
    name = "mockexam",
    version,
    about = "Timed mock-exam practice from your own question bank"
)]
struct Cli {
    /// Data directory for records (overrides config)
    #[arg(long, global = true)]
    data_dir: Option<PathBuf>,

    /// Config file path
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Create starter config and sample question CSV
    Init,

    /// Create an account and log in
    Signup {
        #[arg(long)]
        name: String,

        #[arg(long)]
        email: String,

        #[arg(long)]
        password: String,
    },

    /// Log in to an existing account
    Login {
        #[arg(long)]
        email: String,

        #[arg(long)]
        password: String,
    },

    /// Log out
    Logout,

    /// Show the logged-in user
    Whoami,

    /// Add questions from a CSV file to your question bank
    Upload {
        /// Path to a .csv (or .pdf, not yet supported) file
        file: PathBuf,
    },

    /// Print or save the question CSV template
    SampleCsv {
        /// Write to this file instead of stdout
        #[arg(long)]
        output: Option<PathBuf>,
    },

    /// Take a timed test (commands are read from stdin)
    Take,

    /// List past results, or show one in detail
    Results {
        /// Result ID to show
        #[arg(long)]
        id: Option<String>,

        /// Include every question with your answer (text output, needs --id)
        #[arg(long)]
        review: bool,

        /// Output format: text, json
        #[arg(long, default_value = "text")]
        format: String,
    },

    /// Show aggregate stats and recent tests
    Stats,
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("mockexam_core=warn".parse().expect("static directive")),
        )
        .init();

    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Init => commands::init::execute(),
        command => match commands::Workspace::open(cli.data_dir, cli.config.as_deref()) {
            Ok(mut ws) => match command {
                Commands::Signup {
                    name,
                    email,
                    password,
                } => commands::account::signup(&mut ws, &name, &email, &password),
                Commands::Login { email, password } => {
                    commands::account::login(&mut ws, &email, &password)
                }
                Commands::Logout => commands::account::logout(&mut ws),
                Commands::Whoami => commands::account::whoami(&ws),
                Commands::Upload { file } => commands::upload::execute(&mut ws, &file),
                Commands::SampleCsv { output } => commands::upload::sample(output),
                Commands::Take => commands::take::execute(&mut ws).await,
                Commands::Results { id, review, format } => {
                    commands::results::execute(&ws, id, review, &format)
                }
                Commands::Stats => commands::results::stats(&ws),
                Commands::Init => unreachable!("handled above"),
            },
            Err(e) => Err(e),
        },
    };

    if let Err(e) = result {
        eprintln!("Error: {e:#}");
        process::exit(1);
    }
}
