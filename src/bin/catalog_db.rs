use clap::{Parser, Subcommand};
use golden_mass::analysis::ratios::mass_ratio;
use golden_mass::catalog::{self, store::CatalogStore};
use golden_mass::utils::logger;

#[derive(Parser)]
#[command(name = "catalog_db")]
#[command(about = "Manage the SQLite particle catalog")]
struct Cli {
    #[arg(long, default_value = "data/db/particle_physics.db")]
    db: String,

    #[arg(short, long)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Create the database and load the built-in Standard Model table
    Init,
    /// List particles by mass with lepton mass ratios
    View,
    /// Upsert particles from a .csv or .json file
    Import { file: String },
}

fn main() {
    let cli = Cli::parse();
    logger::init_cli_logger(cli.verbose);

    if let Err(e) = run(&cli) {
        tracing::error!("❌ {} (Category: {:?})", e, e.category());
        eprintln!("❌ {}", e.user_friendly_message());
        eprintln!("💡 {}", e.recovery_suggestion());
        std::process::exit(e.exit_code());
    }
}

fn run(cli: &Cli) -> golden_mass::Result<()> {
    let mut store = CatalogStore::open(&cli.db)?;

    match &cli.command {
        Commands::Init => {
            let written = store.upsert_all(&catalog::standard_model())?;
            println!("✅ Database ready at {} ({} particles)", cli.db, written);
            for (kind, count) in store.count_by_kind()? {
                println!("  {:<12} {}", kind, count);
            }
        }
        Commands::Import { file } => {
            let particles = catalog::load_catalog_file(file)?;
            let written = store.upsert_all(&particles)?;
            println!("✅ Imported {} particles from {}", written, file);
            println!("📊 Catalog now holds {} particles", store.count()?);
        }
        Commands::View => view(&store)?,
    }
    Ok(())
}

fn view(store: &CatalogStore) -> golden_mass::Result<()> {
    let particles = store.list_by_mass()?;

    println!("{}", "=".repeat(64));
    println!("PARTICLE DATABASE CONTENTS");
    println!("{}", "=".repeat(64));
    println!(
        "{:<20} {:>14} {:>8} {:>6} {:<12}",
        "Name", "Mass (GeV)", "Charge", "Spin", "Kind"
    );
    println!("{}", "-".repeat(64));
    for p in &particles {
        println!(
            "{:<20} {:>14.6e} {:>8.3} {:>6} {:<12}",
            p.name, p.mass_gev, p.charge, p.spin, p.kind
        );
    }
    println!("{}", "=".repeat(64));

    let ratios = [
        ("m_mu/m_e", "muon", "electron"),
        ("m_tau/m_mu", "tau", "muon"),
        ("m_tau/m_e", "tau", "electron"),
    ];
    println!();
    println!("Mass Ratios:");
    for (label, num, den) in ratios {
        match mass_ratio(&particles, num, den) {
            Some(r) => println!("  {} = {:.2}", label, r),
            None => println!("  {} = n/a", label),
        }
    }
    Ok(())
}
