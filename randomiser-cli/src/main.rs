use clap::{Parser, Subcommand, ValueEnum};
use log::{debug, LevelFilter};
use std::path::PathBuf;

use loot_randomiser_core::seedlist::SeedList;
use loot_randomiser_core::{
    data, Category, HintDisplay, RandomiserError, Result, Role, Seed, Session, Settings, Tag,
};

#[derive(Debug, Parser)]
#[command(name = "loot-randomiser", version, about = "Borderlands 2 loot randomiser tool")]
struct Args {
    /// Settings file. Defaults to the per-user config directory.
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[arg(long, global = true, default_value_t = false)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// List every option a seed can carry.
    Tags,
    /// Make a new seed from a set of options.
    Generate {
        /// Option to enable, by name. Repeatable.
        #[arg(long = "tag", value_name = "NAME")]
        tags: Vec<String>,
        /// Start from nothing instead of the default options.
        #[arg(long, default_value_t = false)]
        no_defaults: bool,
    },
    /// Decode a seed and show what it turns on.
    Inspect { seed: String },
    /// Apply a seed and print where every item went.
    Apply {
        seed: String,
        #[arg(long, value_enum, default_value_t = RoleArg::Host)]
        role: RoleArg,
    },
    /// Apply a seed and fill in its tracker.
    Reveal {
        seed: String,
        #[arg(long, conflicts_with = "spoilers", default_value_t = false)]
        hints: bool,
        #[arg(long, default_value_t = false)]
        spoilers: bool,
    },
    /// Show saved seeds.
    List,
    /// Change how hint pickups are shown in the tracker.
    HintDisplay {
        #[arg(value_enum)]
        display: HintDisplayArg,
    },
}

#[derive(Copy, Clone, Debug, ValueEnum)]
enum RoleArg {
    Host,
    Client,
}

#[derive(Copy, Clone, Debug, ValueEnum)]
enum HintDisplayArg {
    None,
    Vague,
    Spoiler,
}

impl From<HintDisplayArg> for HintDisplay {
    fn from(arg: HintDisplayArg) -> Self {
        match arg {
            HintDisplayArg::None => HintDisplay::None,
            HintDisplayArg::Vague => HintDisplay::Vague,
            HintDisplayArg::Spoiler => HintDisplay::Spoiler,
        }
    }
}

fn setup_logging(verbose: bool) -> std::result::Result<(), fern::InitError> {
    let level = if verbose {
        LevelFilter::Debug
    } else {
        LevelFilter::Info
    };

    fern::Dispatch::new()
        .format(|out, message, record| {
            out.finish(format_args!(
                "{} [{}] {}: {}",
                chrono::Local::now().format("%H:%M:%S"),
                record.level(),
                record.target(),
                message
            ))
        })
        .level(level)
        .chain(std::io::stderr())
        .apply()?;
    Ok(())
}

fn settings_path(args: &Args) -> PathBuf {
    match &args.config {
        Some(path) => path.clone(),
        None => dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("LootRandomiser")
            .join("settings.json"),
    }
}

fn print_tags() {
    for category in Category::ALL {
        println!("{}:", category.caption());
        for info in loot_randomiser_core::tags::TAG_TABLE
            .iter()
            .filter(|info| info.category == category)
        {
            let default = if info.default { " (default)" } else { "" };
            println!("  {:<20} {}{}", info.ident, info.caption, default);
            println!("  {:<20} {}", "", info.description);
        }
    }
}

fn parse_tags(names: &[String], defaults: bool) -> Result<Tag> {
    let mut tags = if defaults { Tag::defaults() } else { Tag::NONE };
    for name in names {
        tags |= Tag::parse_flag(name)
            .ok_or_else(|| RandomiserError::Config(format!("unknown option '{}'", name)))?;
    }
    Ok(tags)
}

fn session(settings: Settings, role: Role) -> Result<Session> {
    Ok(Session::new(data::catalog()?, settings).with_role(role))
}

/// Clients get their seed from the host; here that is the command line.
fn apply(session: &mut Session, seed: &Seed) -> Result<()> {
    match session.role() {
        Role::Host => session.apply(seed),
        Role::Client => session.receive_seed(seed.as_str()),
    }
}

fn print_placements(session: &Session) {
    let Some(applied) = session.current() else {
        return;
    };
    println!(
        "{} locations, {} items",
        applied.locations().len(),
        applied.item_count()
    );
    for &(location, pool) in &applied.assignment.placements {
        println!(
            "  {} -> {}",
            session.catalog().location(location).name(),
            session.catalog().pool(pool).name()
        );
    }
}

fn run(args: Args) -> Result<()> {
    let path = settings_path(&args);
    debug!("settings file {}", path.display());
    let mut settings = Settings::load(&path)?;

    match args.command {
        Command::Tags => print_tags(),
        Command::Generate { tags, no_defaults } => {
            let seed = Seed::generate(parse_tags(&tags, !no_defaults)?);
            println!("{}", seed);
        }
        Command::Inspect { seed } => {
            let seed = Seed::from_string(&seed)?;
            print!("{}", seed.describe());

            let session = session(settings, Role::Host)?;
            if !session.catalog().supports(seed.version()) {
                println!("Not supported by this version of the randomiser.");
            }
            let missing = session.missing_content(seed.tags());
            if !missing.is_empty() {
                println!("Missing content: {}", missing.join(", "));
            }
        }
        Command::Apply { seed, role } => {
            let seed = Seed::from_string(&seed)?;
            let role = match role {
                RoleArg::Host => Role::Host,
                RoleArg::Client => Role::Client,
            };
            let mut session = session(settings, role)?;
            apply(&mut session, &seed)?;
            print_placements(&session);
            if let Some(tracker) = session.tracker() {
                println!("Tracker: {}", tracker.path().display());
            }
            session.shutdown();
        }
        Command::Reveal {
            seed,
            hints,
            spoilers,
        } => {
            let seed = Seed::from_string(&seed)?;
            let mut session = session(settings, Role::Host)?;
            session.apply(&seed)?;
            let changed = if spoilers || !hints {
                session.populate_spoilers()?
            } else {
                session.populate_hints()?
            };
            println!("Updated {} tracker lines", changed);
            session.shutdown();
        }
        Command::List => {
            let list = SeedList::load(settings.seed_list_path())?;
            for seed in list.seeds() {
                println!("{}", seed);
            }
        }
        Command::HintDisplay { display } => {
            settings.hint_display = display.into();
            settings.save(&path)?;
            println!("Saved {}", path.display());
        }
    }
    Ok(())
}

fn main() {
    let args = Args::parse();

    if let Err(err) = setup_logging(args.verbose) {
        eprintln!("Failed to set up logging: {err}");
    }

    if let Err(err) = run(args) {
        eprintln!("Error: {err}");
        std::process::exit(1);
    }
}
