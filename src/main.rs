use std::io::{self, BufRead, Write};
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use log::{error, info};

use tankobon::config::{CONFIG_FILE_NAME, SeriesConfig};
use tankobon::error::{Error, Result};
use tankobon::{VolumeConfig, VolumeReport};

#[derive(Parser)]
#[command(name = "tankobon")]
#[command(about = "Assemble per-chapter CBZ archives into one sequentially paged volume", long_about = None)]
struct Cli {
    /// Series settings file
    #[arg(long, global = true, default_value = CONFIG_FILE_NAME)]
    config: PathBuf,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Create the working directories and store series/writer settings
    Init {
        /// Directory that will hold the chapter archives
        #[arg(long, default_value = "cbz")]
        source: PathBuf,

        /// Scratch directory for chapter extraction
        #[arg(long, default_value = "temp")]
        work: PathBuf,

        /// Series name (prompted for when omitted)
        #[arg(long)]
        series: Option<String>,

        /// Writer name (prompted for when omitted; may be left blank)
        #[arg(long)]
        writer: Option<String>,
    },

    /// Assemble the chapter archives into volume VOLUME
    Process {
        /// Volume number, starting at 1
        #[arg(value_parser = clap::value_parser!(u32).range(1..))]
        volume: u32,

        /// Directory holding the chapter archives, cover and extra pages
        #[arg(long, default_value = "cbz")]
        source: PathBuf,

        /// Output directory [default: "Volume <VOLUME>"]
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Scratch directory for chapter extraction
        #[arg(long, default_value = "temp")]
        work: PathBuf,

        /// Move processed originals here after a successful run
        #[arg(long)]
        hold: Option<PathBuf>,
    },
}

fn ensure_dir(path: &Path) -> Result<()> {
    if path.exists() {
        println!("Directory '{}' already exists.", path.display());
    } else {
        std::fs::create_dir_all(path)?;
        println!("Created directory: {}", path.display());
    }
    Ok(())
}

/// Reads one answer line. `None` once input is exhausted.
fn read_answer(input: &mut impl BufRead) -> Result<Option<String>> {
    let mut line = String::new();
    if input.read_line(&mut line)? == 0 {
        return Ok(None);
    }
    Ok(Some(line.trim().to_string()))
}

fn print_label(label: &str) -> Result<()> {
    print!("{}: ", label);
    io::stdout().flush()?;
    Ok(())
}

/// Asks until a non-empty series name is given. Closed input is an error.
fn ask_series(input: &mut impl BufRead) -> Result<String> {
    loop {
        print_label("Enter the series name")?;
        match read_answer(input)? {
            Some(answer) if !answer.is_empty() => return Ok(answer),
            Some(_) => continue,
            None => return Err(Error::InvalidConfig("series name is required".to_string())),
        }
    }
}

fn ask_writer(input: &mut impl BufRead) -> Result<String> {
    print_label("Enter the writer's name (optional)")?;
    Ok(read_answer(input)?.unwrap_or_default())
}

async fn init(
    config_path: &Path,
    source: &Path,
    work: &Path,
    series: Option<String>,
    writer: Option<String>,
) -> Result<()> {
    ensure_dir(source)?;
    ensure_dir(work)?;

    let series = match series {
        Some(series) => series,
        None => ask_series(&mut io::stdin().lock())?,
    };
    let writer = match writer {
        Some(writer) => writer,
        None => ask_writer(&mut io::stdin().lock())?,
    };

    SeriesConfig::new(series, Some(writer)).save(config_path).await?;
    println!("Stored series and writer info in {}", config_path.display());
    Ok(())
}

fn print_report(report: &VolumeReport) {
    println!("\nVolume {} assembled:", report.volume_number);
    for chapter in &report.chapters {
        println!(
            "  Chapter {:>3}  {:<40} {:>4} page(s)",
            chapter.display_index, chapter.file_name, chapter.page_count
        );
    }
    for skipped in &report.skipped {
        println!("  skipped      {:<40} {}", skipped.file_name, skipped.reason);
    }
    println!("  Pages:      {}", report.page_count);
    println!("  ComicInfo:  {}", report.descriptor_path.display());
    println!("  Archive:    {} ({} entries)", report.archive_path.display(), report.archive_entries);
    if !report.held.is_empty() {
        println!("  Held:       {} original(s)", report.held.len());
    }
}

async fn run(cli: Cli) -> Result<()> {
    match cli.command {
        Commands::Init {
            source,
            work,
            series,
            writer,
        } => init(&cli.config, &source, &work, series, writer).await,

        Commands::Process {
            volume,
            source,
            output,
            work,
            hold,
        } => {
            // Loaded first so a missing config aborts before anything is created.
            let series = SeriesConfig::load(&cli.config).await?;
            info!("Series '{}', volume {}", series.series_name, volume);

            let mut builder = VolumeConfig::builder();
            builder
                .metadata(series.to_metadata())
                .volume_number(volume)
                .source_path(source)
                .target_path(output.unwrap_or_else(|| PathBuf::from(format!("Volume {}", volume))))
                .work_path(work);
            if let Some(hold) = hold {
                builder.hold_path(hold);
            }

            let report = builder.build()?.assemble().await?;
            print_report(&report);
            Ok(())
        }
    }
}

#[tokio::main]
async fn main() -> ExitCode {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let cli = Cli::parse();

    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e @ Error::MissingConfig(_)) => {
            error!("{}", e);
            ExitCode::from(2)
        }
        Err(e) => {
            error!("{}", e);
            ExitCode::FAILURE
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    #[test]
    fn test_ask_series_skips_blank_answers() {
        let mut input = Cursor::new("\n   \nBerserk\n");
        assert_eq!(ask_series(&mut input).unwrap(), "Berserk");
    }

    #[test]
    fn test_ask_series_fails_on_closed_input() {
        let mut input = Cursor::new("");
        assert!(matches!(ask_series(&mut input), Err(Error::InvalidConfig(_))));

        let mut input = Cursor::new("\n  \n");
        assert!(matches!(ask_series(&mut input), Err(Error::InvalidConfig(_))));
    }

    #[test]
    fn test_ask_writer_may_be_blank_or_closed() {
        assert_eq!(ask_writer(&mut Cursor::new("Kentaro Miura\n")).unwrap(), "Kentaro Miura");
        assert_eq!(ask_writer(&mut Cursor::new("\n")).unwrap(), "");
        assert_eq!(ask_writer(&mut Cursor::new("")).unwrap(), "");
    }
}
