//! Binary entrypoint for the itemproto CLI.
//!
//! Commands:
//! - `init` - write a starter `itemproto.toml` and create the prototype store
//! - `types [--json]` - list the component types builders can create
//! - `show <id>` - describe the latest revision of a component
//! - `export <id> [--revision <n>]` - print a component's `<Definition>` XML
//! - `import <type> <name> <file>` - create a draft from a `<Definition>` file
//! - `olc` - interactive building session reading commands from stdin
//!
//! See the library crate docs for module-level details: `itemproto::`.
use std::io::Write;

use anyhow::{anyhow, Context, Result};
use clap::{Parser, Subcommand};
use log::{info, warn};
use tokio::io::{AsyncBufReadExt, BufReader};

use itemproto::components::{
    BuildContext, ComponentManager, ComponentStore, MetricUnits, ProtoKey,
};
use itemproto::config::Config;
use itemproto::olc::Workshop;

#[derive(Parser)]
#[command(name = "itemproto")]
#[command(about = "Build and revise item component prototypes")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Configuration file path (can be used before or after subcommand)
    #[arg(short, long, default_value = "itemproto.toml", global = true)]
    config: String,

    /// Verbose logging (-v, -vv for more; may appear before or after subcommand)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,
}

#[derive(Subcommand)]
enum Commands {
    /// Write a default configuration and create the store
    Init,
    /// List component types
    Types {
        /// Print type help as JSON
        #[arg(long)]
        json: bool,
    },
    /// Describe the latest revision of a component
    Show { id: u64 },
    /// Print the XML definition of a component
    Export {
        id: u64,
        /// A specific revision instead of the latest
        #[arg(short, long)]
        revision: Option<u32>,
    },
    /// Create a draft component from a <Definition> XML file
    Import {
        /// Builder keyword of the component type, e.g. belt
        component_type: String,
        name: String,
        file: String,
    },
    /// Interactive building session on stdin
    Olc,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    if let Commands::Init = cli.command {
        init_logging(&None, cli.verbose);
        return init(&cli.config).await;
    }

    let config = match Config::load(&cli.config).await {
        Ok(config) => config,
        Err(e) => {
            let config = Config::default();
            init_logging(&None, cli.verbose);
            warn!("{}; using built-in defaults", e);
            return run(cli.command, &cli.config, config).await;
        }
    };
    init_logging(&Some(config.clone()), cli.verbose);
    run(cli.command, &cli.config, config).await
}

async fn init(path: &str) -> Result<()> {
    if tokio::fs::try_exists(path).await.unwrap_or(false) {
        println!("Configuration {} already exists; leaving it alone.", path);
    } else {
        Config::create_default(path).await?;
        println!("Wrote default configuration to {}", path);
    }
    let config = Config::load(path).await?;
    let db_path = config.db_path();
    ComponentStore::open(&db_path)
        .with_context(|| format!("Failed to open store at {}", db_path.display()))?;
    println!("Component store ready at {}", db_path.display());
    Ok(())
}

async fn run(command: Commands, config_path: &str, config: Config) -> Result<()> {
    let manager = ComponentManager::with_builtin_types();

    match command {
        Commands::Init => init(config_path).await?,
        Commands::Types { json } => {
            if json {
                let help: Vec<_> = manager.all_type_help().collect();
                println!("{}", serde_json::to_string_pretty(&help)?);
            } else {
                for (keyword, type_name) in manager.keywords() {
                    let short = manager
                        .type_help(type_name)
                        .map(|help| help.short_help.clone())
                        .unwrap_or_default();
                    println!("{:<22} {:<22} {}", keyword, type_name, short);
                }
            }
        }
        Commands::Show { id } => {
            let store = open_store(&config)?;
            let prototype = store.latest_component(&manager, id)?;
            let catalog = config.build_catalog();
            let ctx = BuildContext::new(&config.builder.author, &catalog, &MetricUnits);
            println!("{}", prototype.component_description_olc(&ctx));
        }
        Commands::Export { id, revision } => {
            let store = open_store(&config)?;
            let prototype = match revision {
                Some(revision) => store.load_component(&manager, ProtoKey::new(id, revision))?,
                None => store.latest_component(&manager, id)?,
            };
            println!("{}", prototype.save_to_xml());
        }
        Commands::Import {
            component_type,
            name,
            file,
        } => {
            let xml = tokio::fs::read_to_string(&file)
                .await
                .map_err(|e| anyhow!("Failed to read {}: {}", file, e))?;
            let store = open_store(&config)?;
            let id = store.next_component_id()?;
            let mut prototype =
                manager.new_prototype(&component_type, id, &config.builder.author, &name)?;
            prototype
                .load_from_xml(&xml)
                .with_context(|| format!("Invalid definition in {}", file))?;
            store.save_component(&mut prototype)?;
            info!("imported {} as {} component {}", file, prototype.type_name(), prototype.key());
            println!(
                "Imported {} component {} ({}) as a draft.",
                prototype.type_name(),
                prototype.key(),
                prototype.name()
            );
        }
        Commands::Olc => olc_loop(manager, config).await?,
    }
    Ok(())
}

fn open_store(config: &Config) -> Result<ComponentStore> {
    let db_path = config.db_path();
    ComponentStore::open(&db_path)
        .with_context(|| format!("Failed to open store at {}", db_path.display()))
}

async fn olc_loop(manager: ComponentManager, config: Config) -> Result<()> {
    let store = open_store(&config)?;
    let mut workshop = Workshop::new(
        manager,
        store,
        Box::new(config.build_catalog()),
        Box::new(MetricUnits),
        &config.builder.author,
    )
    .with_self_approval(config.builder.allow_self_approval);

    info!("olc session started for {}", config.builder.author);
    println!("Building as {}. Type comp help for commands, quit to leave.", config.builder.author);
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    loop {
        print!("> ");
        std::io::stdout().flush()?;
        let Some(line) = lines.next_line().await? else {
            break;
        };
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        if line.eq_ignore_ascii_case("quit") || line.eq_ignore_ascii_case("exit") {
            break;
        }
        match workshop.handle_line(line) {
            Ok(reply) => println!("{}", reply),
            Err(err) => {
                warn!("olc command failed: {}", err);
                println!("That did not work: {}", err);
            }
        }
    }
    info!("olc session ended");
    Ok(())
}

fn init_logging(config: &Option<Config>, verbosity: u8) {
    let mut builder = env_logger::Builder::new();
    let config_level = config
        .as_ref()
        .and_then(|cfg| cfg.logging.level.parse::<log::LevelFilter>().ok())
        .unwrap_or(log::LevelFilter::Info);
    // CLI verbosity overrides config
    let level = match verbosity {
        0 => config_level,
        1 => log::LevelFilter::Debug,
        _ => log::LevelFilter::Trace,
    };
    builder.filter_level(level);

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

    match log_file {
        Some(file) => {
            let file = std::sync::Mutex::new(file);
            // Interactive sessions also echo to the console
            let is_tty = atty::is(atty::Stream::Stderr);
            builder.format(move |fmt, record| {
                let line = format!(
                    "{} [{}] {}",
                    chrono::Utc::now().format("%Y-%m-%dT%H:%M:%SZ"),
                    record.level(),
                    record.args()
                );
                if let Ok(mut guard) = file.lock() {
                    let _ = writeln!(guard, "{}", line);
                }
                if is_tty {
                    writeln!(fmt, "{}", line)
                } else {
                    Ok(())
                }
            });
        }
        None => {
            builder.format(|fmt, record| {
                writeln!(
                    fmt,
                    "{} [{}] {}",
                    chrono::Utc::now().format("%Y-%m-%dT%H:%M:%SZ"),
                    record.level(),
                    record.args()
                )
            });
        }
    }
    let _ = builder.try_init();
}
