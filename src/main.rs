use clap::{Parser, Subcommand};
use env_logger::Builder;
use ::log::LevelFilter;
use std::io::{self, BufRead, Write};
use std::path::PathBuf;

mod annotation;
mod merge;
mod model;
mod render;
mod resource_log;
mod spikes;

pub type Result<T> = anyhow::Result<T>;

/// Simulation time covered by the default annotation schedule, in ms.
const DEFAULT_SIM_TIME: f64 = 21000.0;

#[derive(Parser)]
#[command(name = "neuroplot")]
#[command(about = "Post-processing for neuromodulation simulation output", long_about = None)]
struct Cli {
    /// Log debug details (RUST_LOG overrides).
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    cmd: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Plot CPU time (and memory) from an MPI resource log.
    Cpu {
        /// Resource log file; prompted for when omitted.
        log: Option<PathBuf>,

        /// One line per core instead of the mean.
        #[arg(long)]
        per_core: bool,

        /// Add a memory usage panel.
        #[arg(long)]
        with_ram: bool,

        #[command(flatten)]
        chart: ChartArgs,
    },
    /// Plot a spike count histogram from a directory of .gdf files.
    Spikes {
        /// Directory with .gdf files; prompted for when omitted.
        dir: Option<PathBuf>,

        /// Histogram bin width in ms.
        #[arg(long, default_value_t = spikes::DEFAULT_BIN_WIDTH)]
        bin_width: f64,

        #[command(flatten)]
        chart: ChartArgs,
    },
    /// Merge per-thread shards (name-N.ext) into name.ext and delete them.
    Merge {
        /// Results directory; prompted for when omitted.
        dir: Option<PathBuf>,
    },
}

#[derive(clap::Args)]
struct ChartArgs {
    /// Simulation length in ms.
    #[arg(long, default_value_t = DEFAULT_SIM_TIME)]
    sim_time: f64,

    /// Annotation JSON file; the built-in schedule is used when omitted.
    #[arg(long)]
    annotations: Option<PathBuf>,

    /// Output PDF path.
    #[arg(short = 'o', long)]
    out: Option<PathBuf>,
}

impl ChartArgs {
    fn annotation(&self) -> Result<annotation::Annotation> {
        match &self.annotations {
            Some(path) => annotation::load_annotation_file(path),
            None => Ok(annotation::default_schedule()),
        }
    }

    fn out_or(&self, default: &str) -> PathBuf {
        self.out.clone().unwrap_or_else(|| PathBuf::from(default))
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    Builder::new()
        .filter_level(if cli.verbose {
            LevelFilter::Debug
        } else {
            LevelFilter::Info
        })
        .parse_default_env()
        .init();

    match cli.cmd {
        Commands::Cpu {
            log,
            per_core,
            with_ram,
            chart,
        } => {
            let path = path_or_prompt(log, "Enter path to the file with '.out' format: ")?;

            // 1) Parse the resource log.
            let series = resource_log::parse_resource_log(&path)?;

            // 2) Aggregate per time step.
            let mode = if per_core {
                model::CpuMode::PerCore
            } else {
                model::CpuMode::Mean
            };
            let data = model::aggregate(&series, mode)?;

            // 3) Render.
            let out = chart.out_or(render::RESOURCE_CHART_FILE);
            render::render_resource_chart(
                &data,
                &chart.annotation()?,
                &render::ResourceChartOptions {
                    sim_time: chart.sim_time,
                    with_ram,
                    out: out.clone(),
                },
            )?;
            println!("Wrote {}", out.display());
        }
        Commands::Spikes {
            dir,
            bin_width,
            chart,
        } => {
            let dir = path_or_prompt(dir, "Enter path to the result folder: ")?;

            let times = spikes::collect_spikes(&dir)?;
            let hist = spikes::bin_spikes(&times, bin_width)?;

            let out = chart.out_or(render::SPIKE_CHART_FILE);
            render::render_spike_chart(
                &hist,
                &chart.annotation()?,
                &render::SpikeChartOptions {
                    sim_time: chart.sim_time,
                    out: out.clone(),
                },
            )?;
            println!("Wrote {}", out.display());
        }
        Commands::Merge { dir } => {
            let dir = path_or_prompt(dir, "Enter path to the result folder: ")?;
            let merged = merge::merge_directory(&dir)?;
            if merged.is_empty() {
                println!("No threaded files in {}", dir.display());
            }
            for file in merged {
                println!(
                    "Wrote {} ({} shards, {} bytes)",
                    file.main.display(),
                    file.shards.len(),
                    file.bytes
                );
            }
        }
    }

    Ok(())
}

/// Use the given path, or ask for one on stdin.
fn path_or_prompt(arg: Option<PathBuf>, message: &str) -> Result<PathBuf> {
    if let Some(path) = arg {
        return Ok(path);
    }

    let mut stdout = io::stdout();
    stdout.write_all(message.as_bytes())?;
    stdout.flush()?;

    let mut line = String::new();
    io::stdin().lock().read_line(&mut line)?;
    let line = line.trim();
    if line.is_empty() {
        anyhow::bail!("no path entered");
    }
    Ok(PathBuf::from(line))
}
