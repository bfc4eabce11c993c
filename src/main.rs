//! Binary entrypoint for the shopexpand CLI.
//!
//! Commands:
//! - `init` - write a starter `shopexpand.toml`
//! - `check` - validate the configuration and print the catalog it builds
//! - `resolve --speaker/--greeting/--location` - show which owner a shop resolves to
//! - `open ... [--buy N]` - simulate opening a shop, optionally buying listings
//!
//! See the library crate docs for module-level details: `shopexpand::`.
use anyhow::{bail, Result};
use clap::{Args, Parser, Subcommand};
use log::{info, warn};
use std::path::Path;
use std::time::Instant;

use shopexpand::augment::{
    build, resolve, Engine, HookSet, Item, MenuChange, OpenOutcome, ShopContext, ShopMenu,
};
use shopexpand::conditions::WorldConditions;
use shopexpand::config::Config;
use shopexpand::SimulatedHost;

#[derive(Parser)]
#[command(name = "shopexpand")]
#[command(about = "Inject configured items into merchant shops and check the result offline")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Configuration file path (can be used before or after subcommand)
    #[arg(short, long, default_value = "shopexpand.toml", global = true)]
    config: String,

    /// Verbose logging (-v, -vv for more; may appear before or after subcommand)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,
}

#[derive(Args, Debug, Clone, Default)]
struct ShopArgs {
    /// Portrait speaker name, if the shop has one
    #[arg(long)]
    speaker: Option<String>,
    /// Greeting text shown in the shop
    #[arg(long)]
    greeting: Option<String>,
    /// Location the shop was opened in
    #[arg(long)]
    location: Option<String>,
}

impl ShopArgs {
    fn context(&self) -> ShopContext {
        ShopContext {
            speaker: self.speaker.clone(),
            greeting: self.greeting.clone(),
            location: self.location.clone(),
        }
    }
}

#[derive(Subcommand)]
enum Commands {
    /// Write a starter configuration file
    Init {
        /// Overwrite an existing file
        #[arg(long)]
        force: bool,
    },
    /// Validate the configuration and print the resulting catalog
    Check {
        /// Print the catalog as JSON
        #[arg(long)]
        json: bool,
    },
    /// Resolve the owner id of a shop
    Resolve {
        #[command(flatten)]
        shop: ShopArgs,
    },
    /// Simulate opening a shop with the configured catalog
    Open {
        #[command(flatten)]
        shop: ShopArgs,
        /// Override the world season
        #[arg(long)]
        season: Option<String>,
        /// Override the day of the season
        #[arg(long)]
        day: Option<u32>,
        /// Override the year
        #[arg(long)]
        year: Option<u32>,
        /// Override the weather
        #[arg(long)]
        weather: Option<String>,
        /// Set a world flag (repeatable)
        #[arg(long = "flag")]
        flags: Vec<String>,
        /// Buy the listing at this index after opening (repeatable)
        #[arg(long)]
        buy: Vec<usize>,
        /// Print the result as JSON
        #[arg(long)]
        json: bool,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Load config early to configure logging (except for Init which writes it)
    let pre_config = match cli.command {
        Commands::Init { .. } => None,
        _ => Config::load(&cli.config).ok(),
    };
    init_logging(&pre_config, cli.verbose);

    match cli.command {
        Commands::Init { force } => {
            if Path::new(&cli.config).exists() && !force {
                bail!("{} already exists (use --force to overwrite)", cli.config);
            }
            Config::create_default(&cli.config)?;
            info!("Configuration file created at {}", cli.config);
        }
        Commands::Check { json } => {
            let config = match pre_config {
                Some(config) => config,
                None => Config::load(&cli.config)?,
            };
            run_check(&config, json)?;
        }
        Commands::Resolve { shop } => {
            println!("{}", resolve(&shop.context()));
        }
        Commands::Open {
            shop,
            season,
            day,
            year,
            weather,
            flags,
            buy,
            json,
        } => {
            let config = match pre_config {
                Some(config) => config,
                None => Config::load(&cli.config)?,
            };
            let mut world = config.world.clone();
            if let Some(season) = season {
                world.season = season;
            }
            if let Some(day) = day {
                world.day = day;
            }
            if let Some(year) = year {
                world.year = year;
            }
            if let Some(weather) = weather {
                world.weather = weather;
            }
            if let Some(ref location) = shop.location {
                world.location = location.clone();
            }
            world.flags.extend(flags);
            run_open(&config, shop.context(), WorldConditions::new(world), &buy, json)?;
        }
    }

    Ok(())
}

fn run_check(config: &Config, json: bool) -> Result<()> {
    let warnings = config.validate();
    for warning in &warnings {
        warn!("{}", warning);
    }

    let (registry, report) = build(&config.objects, &config.item_table());

    if json {
        let payload = serde_json::json!({
            "report": report,
            "owners": registry.owners().collect::<Vec<_>>(),
            "entries": registry.entries(),
            "warnings": warnings,
        });
        println!("{}", serde_json::to_string_pretty(&payload)?);
    } else {
        for entry in registry.entries() {
            println!(
                "{:<14} {:<24} price {:>6}{}",
                entry.owner,
                entry.derived_name,
                entry.base.sale_price,
                entry
                    .condition
                    .as_deref()
                    .map(|c| format!("  if {}", c))
                    .unwrap_or_default()
            );
        }
        println!(
            "{} accepted, {} rejected, {} duplicates, {} warnings",
            report.accepted,
            report.rejected,
            report.duplicates,
            warnings.len()
        );
    }

    if report.rejected > 0 {
        std::process::exit(1);
    }
    Ok(())
}

fn run_open(
    config: &Config,
    context: ShopContext,
    conditions: WorldConditions,
    buy: &[usize],
    json: bool,
) -> Result<()> {
    let start = Instant::now();
    let settle = config.engine.settle_delay();

    let mut engine = Engine::new(settle);
    let mut hooks = HookSet::new();
    engine.attach(&mut hooks, start);
    let mut host = SimulatedHost::new(config, hooks);
    engine.on_update_tick(start + settle, &mut host);

    let mut menu = ShopMenu::new(context);
    let outcome = engine.on_menu_changed(MenuChange::opened(&mut menu), &conditions, host.hooks_mut());

    let mut bought = Vec::new();
    for &index in buy {
        match host.buy(&menu, index) {
            Some(slot) => {
                engine.on_holder_changed(true, &mut host.holder);
                bought.push(slot);
            }
            None => warn!("Cannot buy listing {}: no such listing or inventory full", index),
        }
    }
    engine.on_menu_changed(MenuChange::closed(), &conditions, host.hooks_mut());

    let owner = match &outcome {
        Some(OpenOutcome::Augmented { owner, .. }) | Some(OpenOutcome::Unaugmented { owner, .. }) => {
            owner.clone()
        }
        _ => resolve(&menu.context),
    };
    let holder: Vec<(usize, &Item)> = host.held().collect();

    if json {
        let payload = serde_json::json!({
            "owner": owner,
            "listings": menu.for_sale,
            "holder": holder.iter().map(|(slot, item)| serde_json::json!({ "slot": slot, "item": item })).collect::<Vec<_>>(),
            "metrics": engine.metrics(),
        });
        println!("{}", serde_json::to_string_pretty(&payload)?);
        return Ok(());
    }

    println!("Shop owner: {}", owner);
    if menu.for_sale.is_empty() {
        println!("No items injected.");
    }
    for (idx, listing) in menu.for_sale.iter().enumerate() {
        let kind = if listing.item.is_injected() { "stack" } else { "plain" };
        println!(
            "{:>2}) {} x{} [{}] price {} stock {}",
            idx,
            listing.item.name(),
            listing.item.quantity(),
            kind,
            listing.price,
            if listing.stock.is_unbounded() { "unbounded".to_string() } else { format!("{:?}", listing.stock) }
        );
    }
    if !bought.is_empty() {
        println!("Inventory after purchase:");
        for (slot, item) in holder {
            let kind = if item.is_injected() { "stack" } else { "plain" };
            println!("  slot {:>2}: {} x{} [{}]", slot, item.name(), item.quantity(), kind);
        }
    }
    Ok(())
}

fn init_logging(config: &Option<Config>, verbosity: u8) {
    use std::io::Write;
    let mut builder = env_logger::Builder::new();
    // CLI verbosity overrides config
    let base_level = match (verbosity, config) {
        (0, Some(cfg)) => cfg.logging.level_filter(),
        (0, None) => log::LevelFilter::Info,
        (1, _) => log::LevelFilter::Debug,
        _ => log::LevelFilter::Trace,
    };
    builder.filter_level(base_level);

    let log_file = config
        .as_ref()
        .and_then(|cfg| cfg.logging.file.as_ref())
        .and_then(|file| {
            std::fs::OpenOptions::new()
                .create(true)
                .append(true)
                .open(file)
                .ok()
        });

    if let Some(f) = log_file {
        let write_mutex = std::sync::Arc::new(std::sync::Mutex::new(f));
        // Mirror to the console only when someone is watching it
        let is_tty = atty::is(atty::Stream::Stderr);
        builder.format(move |fmt, record| {
            let ts = chrono::Utc::now().format("%Y-%m-%dT%H:%M:%SZ");
            let line = format!("{} [{}] {}", ts, record.level(), record.args());
            if let Ok(mut guard) = write_mutex.lock() {
                let _ = writeln!(guard, "{}", line);
            }
            if is_tty {
                writeln!(fmt, "{}", line)
            } else {
                Ok(())
            }
        });
    } else {
        builder.format(|fmt, record| {
            let ts = chrono::Utc::now().format("%Y-%m-%dT%H:%M:%SZ");
            writeln!(fmt, "{} [{}] {}", ts, record.level(), record.args())
        });
    }
    let _ = builder.try_init();
}
