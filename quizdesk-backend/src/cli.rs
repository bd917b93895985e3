use clap::Parser;

/// QuizDesk backend server.
#[derive(Debug, Parser)]
#[command(name = "quizdesk-backend", version, about)]
pub struct CliArgs {
    /// Path to configuration file (.toml, .yaml, .yml or .json).
    #[arg(short = 'c', long = "config-path", env = "QUIZDESK_CONFIG_PATH")]
    pub config_path: Option<String>,
}
