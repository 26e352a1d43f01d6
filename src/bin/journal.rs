use clap::{Parser, Subcommand};
use golden_mass::journal::Journal;
use golden_mass::utils::logger;

#[derive(Parser)]
#[command(name = "journal")]
#[command(about = "Keep short notes between research sessions")]
struct Cli {
    /// Directory holding saves.json, last_save.txt and next.txt
    #[arg(long, default_value = ".")]
    dir: String,

    #[arg(short, long)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Record what was just done
    Save {
        #[arg(required = true)]
        what: Vec<String>,
    },
    /// Show the last saves and the next steps
    Load,
}

fn main() {
    let cli = Cli::parse();
    logger::init_cli_logger(cli.verbose);

    let journal = Journal::new(&cli.dir);
    let result = match cli.command {
        Commands::Save { what } => journal.save(&what.join(" ")).map(|entry| {
            println!("✅ Saved: {} at {}", entry.what, entry.time);
        }),
        Commands::Load => load(&journal),
    };

    if let Err(e) = result {
        eprintln!("❌ {}", e.user_friendly_message());
        std::process::exit(e.exit_code());
    }
}

fn load(journal: &Journal) -> golden_mass::Result<()> {
    let entries = journal.load()?;
    if entries.is_empty() {
        println!("No saves found");
    } else {
        println!("Last saves:");
        for entry in &entries {
            println!("  [{}] {}", entry.time, entry.what);
        }
    }

    if let Some(next) = journal.next_steps()? {
        println!();
        println!("Next steps:");
        println!("{}", next.trim_end());
    }
    Ok(())
}
