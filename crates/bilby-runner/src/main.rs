mod rig;

use clap::{Parser, ValueEnum};
use colored::Colorize;
use env_logger::Builder;
use log::LevelFilter;
use rig::{Rig, RigConfig};
use serde::Serialize;
use std::path::PathBuf;

#[derive(Clone, Copy, Debug, ValueEnum)]
enum OutputFormat {
    Text,
    Ron,
}

#[derive(Parser)]
#[command(name = "bilby-runner")]
#[command(about = "Tick a rig and print the yaw/pitch/roll readouts of its joints")]
struct Cli {
    #[arg(help = "Rig description file (.ron)")]
    rig: PathBuf,

    #[arg(short, long, default_value_t = 1, help = "Number of frames to tick")]
    ticks: u32,

    #[arg(short, long, value_enum, default_value_t = OutputFormat::Text, help = "Output format")]
    format: OutputFormat,

    #[arg(short, long, help = "Only log warnings and errors")]
    quiet: bool,
}

#[derive(Serialize)]
struct ReadoutRow {
    name: String,
    mapping: String,
    state: String,
    degrees: [f64; 3],
}

fn init_logger(quiet: bool) {
    let own_level = if quiet {
        LevelFilter::Warn
    } else {
        LevelFilter::Debug
    };

    Builder::new()
        .format(|buf, record| {
            use std::io::Write;

            let ts = chrono::offset::Local::now().format("%Y-%m-%dT%H:%M:%S");

            let colored_level = match record.level() {
                log::Level::Error => record.level().to_string().red().bold(),
                log::Level::Warn => record.level().to_string().yellow().bold(),
                log::Level::Info => record.level().to_string().green().bold(),
                log::Level::Debug => record.level().to_string().blue().bold(),
                log::Level::Trace => record.level().to_string().cyan().bold(),
            };

            let file_info = format!(
                "{}:{}",
                record.file().unwrap_or("unknown"),
                record.line().unwrap_or(0)
            )
            .bright_black();

            writeln!(
                buf,
                "{} {} [{}] - {}",
                file_info,
                ts.to_string().bright_black(),
                colored_level,
                record.args()
            )
        })
        .filter_level(LevelFilter::Warn)
        .filter(Some("bilby_engine"), own_level)
        .filter(Some("bilby_rig"), own_level)
        .filter(Some("bilby_runner"), own_level)
        .parse_default_env()
        .init();
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_logger(cli.quiet);

    let config = RigConfig::read_from(&cli.rig)?;
    log::info!(
        "Loaded rig {} ({} frames, {} readouts)",
        cli.rig.display(),
        config.frames.len(),
        config.constraints.len()
    );

    let mut rig = Rig::load(&config)?;
    for frame in 0..cli.ticks {
        rig.tick();
        log::debug!("Ticked frame {}", frame + 1);
    }

    let rows = rig
        .readouts()
        .iter()
        .map(|readout| {
            let scope = readout
                .container
                .map(|entity| format!(" (in {:?})", entity))
                .unwrap_or_default();
            ReadoutRow {
                name: format!("{}{}", readout.name, scope),
                mapping: readout.component.mapping.to_string(),
                state: format!("{:?}", readout.component.state()),
                degrees: readout.component.result().to_array(),
            }
        })
        .collect::<Vec<_>>();

    match cli.format {
        OutputFormat::Text => {
            for row in &rows {
                println!(
                    "{:<32} {} {:>8} x {:>9.3} y {:>9.3} z {:>9.3}",
                    row.name, row.mapping, row.state, row.degrees[0], row.degrees[1], row.degrees[2]
                );
            }
        }
        OutputFormat::Ron => {
            let text = ron::ser::to_string_pretty(&rows, ron::ser::PrettyConfig::default())
                .map_err(|e| anyhow::anyhow!("RON serialization error: {}", e))?;
            println!("{}", text);
        }
    }

    Ok(())
}
