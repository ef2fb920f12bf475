use anyhow::{Context, Result, bail};
use clap::{Parser, Subcommand};
use fcmodel::{
    AbstractGoods, GameContext, PlaceholderContext, TradeRoute, TradeRouteStop, World,
};
use fcxml::{WriterConfig, XmlReader, XmlRecord, XmlWriter};
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

#[derive(Parser)]
#[command(name = "fcroute", version)]
#[command(about = "Inspect, check and reformat colony trade route files")]
struct Cli {
    /// Log level (error, warn, info, debug, trace)
    #[arg(long, env = "FCROUTE_LOG", default_value = "warn", global = true)]
    log_level: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print a route (or a single stop) with its loading instructions
    Show {
        #[arg(value_name = "FILE")]
        file: PathBuf,

        /// JSON location registry used to resolve stop locations
        #[arg(long, env = "FCROUTE_WORLD")]
        world: Option<PathBuf>,
    },

    /// Check that a route can be assigned to a carrier
    Check {
        #[arg(value_name = "FILE")]
        file: PathBuf,

        /// JSON location registry used to resolve stop locations
        #[arg(long, env = "FCROUTE_WORLD")]
        world: Option<PathBuf>,
    },

    /// Re-serialize a route or stop in canonical form
    Fmt {
        #[arg(value_name = "FILE")]
        file: PathBuf,

        /// Output file (default: stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Spaces per nesting level
        #[arg(long, default_value_t = 2)]
        indent: usize,

        /// Single line, no XML declaration
        #[arg(long, conflicts_with = "indent")]
        compact: bool,

        /// JSON writer settings (`indent`, `declaration`); unset fields keep their defaults
        #[arg(long, value_name = "FILE", conflicts_with_all = ["indent", "compact"])]
        config: Option<PathBuf>,
    },
}

/// Top-level element of a route file.
enum Document {
    Route(TradeRoute),
    Stop(TradeRouteStop),
}

fn main() -> Result<()> {
    // Load .env before parsing so it can feed the env fallbacks.
    let _ = dotenvy::dotenv();
    let cli = Cli::parse();

    let level = std::str::FromStr::from_str(&cli.log_level).unwrap_or(log::LevelFilter::Warn);
    env_logger::Builder::new()
        .filter_level(level)
        .format_timestamp(None)
        .init();

    match cli.command {
        Commands::Show { file, world } => show(&file, world.as_deref()),
        Commands::Check { file, world } => check(&file, world.as_deref()),
        Commands::Fmt {
            file,
            output,
            indent,
            compact,
            config,
        } => {
            let config = if let Some(path) = config {
                load_writer_config(&path)?
            } else if compact {
                WriterConfig::compact()
            } else {
                WriterConfig {
                    indent: Some(indent),
                    declaration: true,
                }
            };
            format(&file, output.as_deref(), config)
        }
    }
}

fn load_writer_config(path: &Path) -> Result<WriterConfig> {
    let data = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read {}", path.display()))?;
    let config = serde_json::from_str(&data)
        .with_context(|| format!("Failed to parse writer config {}", path.display()))?;
    log::debug!("Writer config from {}: {:?}", path.display(), config);
    Ok(config)
}

fn load(file: &Path, world: Option<&Path>) -> Result<Document> {
    let world = world
        .map(|path| {
            World::load_json(path)
                .with_context(|| format!("Failed to load world from {}", path.display()))
        })
        .transpose()?;
    let context: &dyn GameContext = match &world {
        Some(world) => world,
        None => &PlaceholderContext,
    };

    let mut xr = XmlReader::open(file)
        .with_context(|| format!("Failed to read {}", file.display()))?;
    xr.next_tag()
        .with_context(|| format!("No root element in {}", file.display()))?;

    let name = xr.local_name().to_string();
    let document = if name == TradeRoute::TAG {
        Document::Route(TradeRoute::from_xml(&mut xr, Some(context))?)
    } else if name == TradeRouteStop::TAG {
        Document::Stop(TradeRouteStop::from_xml(&mut xr, Some(context))?)
    } else {
        bail!(
            "{}: expected <{}> or <{}>, found <{}>",
            file.display(),
            TradeRoute::TAG,
            TradeRouteStop::TAG,
            name
        );
    };
    log::info!("Loaded {}", file.display());
    Ok(document)
}

fn show(file: &Path, world: Option<&Path>) -> Result<()> {
    match load(file, world)? {
        Document::Route(route) => {
            println!("Trade route: {} ({})", route.name, route.id);
            if let Some(owner) = &route.owner {
                println!("Owner: {}", owner);
            }
            for (i, stop) in route.stops().iter().enumerate() {
                print_stop(i + 1, stop);
            }
        }
        Document::Stop(stop) => print_stop(1, &stop),
    }
    Ok(())
}

fn print_stop(number: usize, stop: &TradeRouteStop) {
    let label = stop.to_string();
    let label = if label.is_empty() { "<no location>" } else { label.as_str() };
    println!("  {}. {}", number, label);
    println!("       unload: {}", describe_goods(stop.goods_to_unload()));
    println!("       load:   {}", describe_goods(stop.goods_to_load()));
}

fn describe_goods(goods: Option<&[AbstractGoods]>) -> String {
    match goods {
        None => "-".to_string(),
        Some([]) => "nothing".to_string(),
        Some(goods) => goods
            .iter()
            .map(|g| g.to_string())
            .collect::<Vec<_>>()
            .join(", "),
    }
}

fn check(file: &Path, world: Option<&Path>) -> Result<()> {
    let Document::Route(route) = load(file, world)? else {
        bail!("{}: a single stop is not a trade route", file.display());
    };
    route
        .verify()
        .with_context(|| format!("{} failed verification", file.display()))?;
    println!("ok: '{}' with {} stops", route.name, route.stops().len());
    Ok(())
}

fn format(file: &Path, output: Option<&Path>, config: WriterConfig) -> Result<()> {
    // Placeholder resolution keeps every location id as written.
    let document = load(file, None)?;
    match output {
        Some(path) => {
            let out = BufWriter::new(
                File::create(path).with_context(|| format!("Failed to create {}", path.display()))?,
            );
            write_document(&document, out, config)?;
            log::info!("Written to: {}", path.display());
        }
        None => write_document(&document, std::io::stdout().lock(), config)?,
    }
    Ok(())
}

fn write_document<W: Write>(document: &Document, out: W, config: WriterConfig) -> Result<()> {
    let mut xw = XmlWriter::new(out, config);
    match document {
        Document::Route(route) => route.to_xml(&mut xw)?,
        Document::Stop(stop) => stop.to_xml(&mut xw)?,
    }
    xw.finish()?;
    Ok(())
}
