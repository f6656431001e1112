use clap::Parser;

use nestegg::api::{self, Cli, Command};

#[tokio::main]
async fn main() {
    env_logger::init();

    let cli = Cli::parse();
    let result = match cli.command {
        Command::Serve(args) => api::run_serve_command(&args).await,
        Command::Project(args) => api::run_project_command(&args),
    };

    if let Err(message) = result {
        eprintln!("Error: {message}");
        std::process::exit(1);
    }
}
