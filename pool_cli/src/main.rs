mod render;

use clap::{Args, Parser, Subcommand, ValueEnum};
use pool_core::*;
use serde::Serialize;
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "pooldose")]
#[command(about = "Pool dosing calculator for pH, chlorine and Tempo Sticks", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Use this config file instead of the default location
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Override data directory
    #[arg(long, global = true)]
    data_dir: Option<PathBuf>,

    /// Override pool registry file
    #[arg(long, global = true)]
    registry: Option<PathBuf>,
}

#[derive(Subcommand)]
enum Commands {
    /// Compute a dosing recommendation from a water test
    Dose(DoseArgs),

    /// Manage registered pools
    Pools {
        #[command(subcommand)]
        command: PoolCommands,
    },
}

#[derive(Subcommand)]
enum PoolCommands {
    /// List registered pool names
    List,

    /// Register a new pool
    Add {
        /// Pool name
        name: String,

        /// Pool volume in m³
        volume: f64,
    },

    /// Show a pool's volume and details
    Show {
        /// Pool name
        name: String,
    },
}

#[derive(Args)]
struct DoseArgs {
    /// Registered pool to dose
    #[arg(long, conflicts_with = "volume", required_unless_present = "volume")]
    pool: Option<String>,

    /// Pool volume in m³, instead of a registered pool
    #[arg(long)]
    volume: Option<f64>,

    /// Current pH
    #[arg(long, default_value_t = 7.0)]
    ph: f64,

    /// Current free chlorine (mg/l)
    #[arg(long, default_value_t = 0.0)]
    chlorine: f64,

    /// The house is let out
    #[arg(long)]
    occupied: bool,

    /// A Tempo Stick is already in the skimmer/chlorinator (only if at least 0.5 stick is left)
    #[arg(long)]
    has_stick: bool,

    /// Number of Tempo Sticks already in place (implies --has-stick)
    #[arg(long, value_parser = clap::value_parser!(u32).range(1..=2))]
    sticks: Option<u32>,

    /// Maintenance target policy (defaults to the configured one)
    #[arg(long, value_enum)]
    policy: Option<PolicyArg>,

    /// Print the recommendation as JSON
    #[arg(long)]
    json: bool,
}

#[derive(Clone, Copy, ValueEnum)]
enum PolicyArg {
    Fixed,
    ByOccupancy,
}

impl From<PolicyArg> for MaintenancePolicy {
    fn from(arg: PolicyArg) -> Self {
        match arg {
            PolicyArg::Fixed => MaintenancePolicy::fixed(),
            PolicyArg::ByOccupancy => MaintenancePolicy::by_occupancy(),
        }
    }
}

/// JSON document printed by `dose --json`
#[derive(Serialize)]
struct DoseReport<'a> {
    pool: Option<&'a Pool>,
    input: &'a MeasurementInput,
    policy: &'a DosingPolicy,
    recommendation: &'a DosingRecommendation,
}

fn main() -> Result<()> {
    // Initialize logging
    pool_core::logging::init();

    let cli = Cli::parse();

    let mut config = match &cli.config {
        Some(path) => Config::load_from(path)?,
        None => Config::load()?,
    };
    if let Some(data_dir) = cli.data_dir {
        config.data.data_dir = data_dir;
    }
    if let Some(registry) = cli.registry {
        config.registry.file = registry;
    }

    let mut registry = CsvRegistry::new(config.registry_path());

    match cli.command {
        Commands::Dose(args) => cmd_dose(args, &registry, &config),
        Commands::Pools { command } => match command {
            PoolCommands::List => cmd_list(&registry),
            PoolCommands::Add { name, volume } => cmd_add(&mut registry, &name, volume),
            PoolCommands::Show { name } => cmd_show(&registry, &name),
        },
    }
}

fn cmd_dose(args: DoseArgs, registry: &impl PoolRegistry, config: &Config) -> Result<()> {
    let pool = args.pool.as_deref().map(|name| registry.lookup(name)).transpose()?;
    let volume = match (&pool, args.volume) {
        (Some(pool), _) => pool.volume_m3,
        (None, Some(volume)) => volume,
        (None, None) => {
            return Err(Error::InvalidInput(
                "either --pool or --volume is required".into(),
            ))
        }
    };

    let occupancy = if args.occupied {
        Occupancy::Occupied
    } else {
        Occupancy::Vacant
    };

    let mut input = MeasurementInput::new(volume, args.ph, args.chlorine, occupancy);
    if args.has_stick || args.sticks.is_some() {
        let count = args.sticks.map(StickCount::try_from).transpose()?;
        input = input.with_existing_sticks(count);
    }

    let policy = match args.policy {
        Some(arg) => DosingPolicy::new(arg.into()),
        None => config.dosing.clone(),
    };

    tracing::debug!(
        "Evaluating {:?} under the {} maintenance policy",
        input,
        policy.maintenance.name()
    );
    let recommendation = evaluate(&input, &policy)?;

    if args.json {
        let report = DoseReport {
            pool: pool.as_ref(),
            input: &input,
            policy: &policy,
            recommendation: &recommendation,
        };
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        println!(
            "{}",
            render::render_report(pool.as_ref(), &input, &recommendation)
        );
    }

    Ok(())
}

fn cmd_list(registry: &impl PoolRegistry) -> Result<()> {
    let names = registry.list_names()?;
    if names.is_empty() {
        println!("No pools registered - add one with `pooldose pools add <NAME> <VOLUME>`.");
        return Ok(());
    }

    for name in names {
        println!("{}", name);
    }
    Ok(())
}

fn cmd_add(registry: &mut impl PoolRegistry, name: &str, volume: f64) -> Result<()> {
    let pool = registry.add(name, volume)?;
    println!(
        "✓ Added {} (address set to the pool name)",
        pool.heading()
    );
    Ok(())
}

fn cmd_show(registry: &impl PoolRegistry, name: &str) -> Result<()> {
    let pool = registry.lookup(name)?;
    println!("{}", pool.heading());
    for line in pool.info.display_lines() {
        println!("  {}", line);
    }
    Ok(())
}
