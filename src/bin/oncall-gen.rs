#![forbid(unsafe_code)]
use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use clap::{Args, Parser, Subcommand, ValueEnum};
use oncall_gen::{
    config::{Config, EXAMPLE_CONFIG},
    io,
    report::{ReportRenderer, TextReport},
    scheduler::{LeastLoaded, Scheduler},
};
use std::path::{Path, PathBuf};
#[cfg(feature = "logging")]
use tracing_subscriber::{fmt::Subscriber, EnvFilter};

/// Générateur de planning d'astreinte (sans base de données)
#[derive(Parser, Debug)]
#[command(author, version, about)]
struct Cli {
    /// Active les logs (feature `logging`)
    #[arg(long, global = true)]
    log: bool,

    /// Fichier YAML de configuration
    #[arg(long, short, global = true, default_value = "oncall.yaml")]
    config: PathBuf,

    #[command(subcommand)]
    cmd: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Calculer les occurrences et les membres éligibles
    #[command(visible_aliases = ["gen", "g"])]
    Generate(GenerateArgs),

    /// Afficher le calendrier des jours fériés
    Holidays {
        #[arg(long, value_enum, default_value_t = Format::Text)]
        format: Format,
    },

    /// Afficher les membres et leurs contraintes
    ShowConfig,

    /// Afficher un exemple de configuration
    ConfigExample,
}

#[derive(Args, Debug)]
struct GenerateArgs {
    /// Instant de référence (RFC3339), maintenant par défaut
    #[arg(long)]
    now: Option<String>,
    /// Attribuer chaque occurrence au membre éligible le moins chargé
    #[arg(long)]
    assign: bool,
    #[arg(long)]
    out_json: Option<PathBuf>,
    #[arg(long)]
    out_csv: Option<PathBuf>,
    /// Export CSV des assignations (avec `--assign`)
    #[arg(long, requires = "assign")]
    assignments_csv: Option<PathBuf>,
}

#[derive(ValueEnum, Clone, Copy, Debug)]
enum Format {
    Text,
    Json,
    Yaml,
}

#[cfg(feature = "logging")]
fn init_logging(enabled: bool, default_directive: Option<&str>) {
    if !enabled {
        return;
    }
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_directive.unwrap_or("info")));
    let _ = Subscriber::builder()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init();
}

#[cfg(not(feature = "logging"))]
fn init_logging(_enabled: bool, _default_directive: Option<&str>) {}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let code = match cli.cmd {
        Commands::ConfigExample => {
            print!("{EXAMPLE_CONFIG}");
            0
        }
        Commands::Generate(args) => generate(args, &load(&cli.config, cli.log)?)?,
        Commands::Holidays { format } => holidays(format, &load(&cli.config, cli.log)?)?,
        Commands::ShowConfig => show_config(&load(&cli.config, cli.log)?)?,
    };

    std::process::exit(code);
}

fn load(path: &Path, log: bool) -> Result<Config> {
    let cfg = Config::load(path)?;
    init_logging(log, cfg.loglevel.as_deref());
    Ok(cfg)
}

fn generate(args: GenerateArgs, cfg: &Config) -> Result<i32> {
    let settings = &cfg.oncall_generator;
    let now = match args.now {
        Some(raw) => DateTime::parse_from_rfc3339(&raw)
            .with_context(|| format!("invalid --now {raw:?}, expected RFC3339"))?
            .with_timezone(&Utc),
        None => Utc::now(),
    };
    let horizon = settings.horizon()?;
    let calendar = settings.load_calendar()?;
    let mut scheduler = Scheduler::new(&settings.roster).with_horizon(horizon);
    if let Some(cal) = &calendar {
        scheduler = scheduler.with_calendar(cal);
    }

    println!(
        "Generating oncall schedule for the next {} day(s) from {}",
        horizon.days(),
        now.to_rfc3339()
    );
    let report = scheduler.availability(now)?;
    let renderer = TextReport;
    print!("{}", renderer.render_availability(&report));

    let table = if args.assign {
        let table = scheduler.assign(&report, &mut LeastLoaded);
        print!("{}", renderer.render_assignments(&table));
        Some(table)
    } else {
        None
    };

    if let Some(path) = args.out_json {
        io::export_report_json(path, &report, table.as_ref(), now)?;
    }
    if let Some(path) = args.out_csv {
        io::export_availability_csv(path, &report)?;
    }
    if let (Some(path), Some(table)) = (args.assignments_csv, &table) {
        io::export_assignments_csv(path, table)?;
    }

    let incomplete = report.uncovered() > 0 || table.is_some_and(|t| t.unassigned > 0);
    // Code 2 = WARNING/INCOMPLETE
    Ok(if incomplete { 2 } else { 0 })
}

fn holidays(format: Format, cfg: &Config) -> Result<i32> {
    let calendar = cfg
        .oncall_generator
        .load_calendar()?
        .context("no public_holiday_calendar_file configured")?;
    match format {
        Format::Text => print!("{}", calendar.to_text()),
        Format::Json => println!("{}", calendar.to_json()?),
        Format::Yaml => print!("{}", calendar.to_yaml()?),
    }
    Ok(0)
}

fn show_config(cfg: &Config) -> Result<i32> {
    let settings = &cfg.oncall_generator;
    println!("Schedule duration: {} day(s)", settings.horizon()?.days());
    if let Some(file) = &settings.public_holiday_calendar_file {
        println!("Holiday calendar : {}", file.display());
    }
    println!("Members:");
    for (idx, m) in settings.roster.members.iter().enumerate() {
        let c = &m.constraints;
        println!("{}) {} <{}>", idx + 1, m.name, m.email);
        println!("    Constraints:");
        println!("    - timezone        : {}", c.timezone);
        println!("    - earliest hour   : {}", c.earliest_oncall_hour);
        println!("    - latest hour     : {}", c.latest_oncall_hour);
        println!("    - public holidays :");
        println!("            country name: {}", c.public_holidays.country_name);
        println!("            include_dates:");
        for d in &c.public_holidays.include_dates {
            println!("            - {d}");
        }
        println!("            exclude_dates:");
        for d in &c.public_holidays.exclude_dates {
            println!("            - {d}");
        }
    }
    println!("Shifts:");
    for s in &settings.roster.shifts {
        println!(
            "- {}: {} from {} to {}",
            s.name,
            s.days.join(", "),
            s.start_time,
            s.end_time
        );
    }
    Ok(0)
}
