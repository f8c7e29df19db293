//! cyd-cli - Command line tool for exercising the yield dashboard data
//! engine: run the startup load sequence against a backend and inspect
//! or edit the persisted job queue.

use clap::{Parser, Subcommand};
use cyd_core::selection::Crop;
use cyd_db::JobStore;
use cyd_engine::orchestrator::Orchestrator;
use cyd_engine::source::HttpSource;
use cyd_store::jobs::{JobStatus, QueuedJob};
use cyd_store::StateHandle;

#[derive(Parser)]
#[command(
    name = "cyd-cli",
    version,
    about = "Crop yield dashboard data engine toolkit"
)]
struct Cli {
    /// Path to the durable job queue database
    #[arg(long, default_value = "cyd-jobs.sqlite")]
    jobs_db: String,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Run the full startup load sequence and print a dataset summary
    Load {
        /// Base URL of the dataset backend
        #[arg(short, long)]
        base_url: String,

        /// Crop to load (corn or soybean)
        #[arg(short, long, default_value = "corn", value_parser = parse_crop)]
        crop: Crop,

        /// Season year; defaults to the crop's default year
        #[arg(short, long)]
        year: Option<i32>,

        /// Day of year (zero-padded to 3 digits)
        #[arg(short, long, default_value = "284")]
        day: String,
    },

    /// List the persisted job queue
    Jobs,

    /// Append a pending model-run job to the queue
    Enqueue {
        #[arg(long)]
        id: u64,

        #[arg(long, default_value = "corn", value_parser = parse_crop)]
        crop: Crop,

        #[arg(long)]
        year: i32,

        #[arg(long, default_value = "284")]
        day: String,
    },

    /// Clear the job queue, in memory and on disk
    ClearJobs,
}

fn parse_crop(s: &str) -> Result<Crop, String> {
    match s.to_lowercase().as_str() {
        "corn" => Ok(Crop::Corn),
        "soybean" => Ok(Crop::Soybean),
        other => Err(format!("unknown crop '{}', expected corn or soybean", other)),
    }
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<()> {
    env_logger::init();
    let cli = Cli::parse();
    let job_store = JobStore::open(&cli.jobs_db)?;

    match cli.command {
        Command::Load {
            base_url,
            crop,
            year,
            day,
        } => {
            let state = StateHandle::new();
            let orch = Orchestrator::new(HttpSource::new(&base_url), state, job_store);
            orch.restore_jobs();
            {
                let mut state = orch.state().borrow_mut();
                state.set_crop(crop);
                state.set_year(year.unwrap_or_else(|| crop.default_year()));
                state.set_day(&day);
            }
            orch.load_all().await;

            let state = orch.state().borrow();
            println!("{}", state.map_title());
            println!("  predictions:      {} records", state.predictions().len());
            println!("  historical:       {} records", state.historical().len());
            println!("  averaged:         {} records", state.averaged().len());
            println!("  multi-year:       {} records", state.multi_year().len());
            println!("  county reference: {} names", state.county_reference().len());
            println!("  queued jobs:      {}", state.jobs().len());
            for (key, count) in state.cache_snapshot() {
                println!(
                    "  cache {:?} {} {} day {}: {} records",
                    key.kind, key.crop.as_str(), key.year, key.day, count
                );
            }
        }

        Command::Jobs => {
            let queue = job_store.load_jobs().unwrap_or_default();
            if queue.is_empty() {
                println!("job queue is empty");
            }
            for job in queue {
                println!(
                    "#{} {} {} day {} [{:?}]",
                    job.id, job.crop.as_str(), job.year, job.day, job.status
                );
            }
        }

        Command::Enqueue {
            id,
            crop,
            year,
            day,
        } => {
            let orch = Orchestrator::new(
                HttpSource::new(""),
                StateHandle::new(),
                job_store,
            );
            orch.restore_jobs();
            orch.enqueue_job(QueuedJob {
                id,
                crop,
                year,
                day: cyd_core::selection::pad_day(&day),
                status: JobStatus::Pending,
            });
            println!("enqueued job #{}", id);
        }

        Command::ClearJobs => {
            let orch = Orchestrator::new(
                HttpSource::new(""),
                StateHandle::new(),
                job_store,
            );
            orch.clear_jobs();
            println!("job queue cleared");
        }
    }
    Ok(())
}
