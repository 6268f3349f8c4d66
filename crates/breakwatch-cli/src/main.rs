use clap::{CommandFactory, Parser, Subcommand};

mod commands;
mod keyboard;
mod notifier;

#[derive(Parser)]
#[command(name = "breakwatch", version, about = "Keyboard-aware micro-break reminder")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the break reminder in the foreground
    Run {
        /// Log at debug level regardless of settings
        #[arg(short, long)]
        verbose: bool,
    },
    /// Settings management
    Config {
        #[command(subcommand)]
        action: commands::config::ConfigAction,
    },
    /// Print the current arbiter state as JSON
    Status,
    /// Generate shell completions
    Completions {
        /// Target shell
        shell: clap_complete::Shell,
    },
}

fn main() {
    let cli = Cli::parse();
    let result = match cli.command {
        Commands::Run { verbose } => commands::run::run(verbose),
        Commands::Config { action } => commands::config::run(action),
        Commands::Status => commands::status::run(),
        Commands::Completions { shell } => {
            clap_complete::generate(
                shell,
                &mut Cli::command(),
                "breakwatch",
                &mut std::io::stdout(),
            );
            Ok(())
        }
    };

    if let Err(e) = result {
        eprintln!("error: {e}");
        std::process::exit(1);
    }
}
