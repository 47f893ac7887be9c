#[macro_use] extern crate log;

use std::time::Duration;

use structopt::StructOpt;

mod cluster;
mod command;

use crate::cluster::Cluster;
use crate::command::{Command, Execution};

#[derive(StructOpt)]
#[structopt(name = "harness")]
struct Opt {
    /// JSON scenario to replay
    #[structopt(short, long)]
    file: std::path::PathBuf,

    /// Log more, up to -vvv
    #[structopt(short, long, parse(from_occurrences))]
    verbose: u8,
}

fn setup_logger(verbose: u8) -> Result<(), fern::InitError> {
    let level = match verbose {
    | 0 => log::LevelFilter::Info,
    | 1 => log::LevelFilter::Debug,
    | _ => log::LevelFilter::Trace,
    };
    fern::Dispatch::new()
        .format(|out, message, record| {
            out.finish(format_args!(
                "[{}][{}] {}",
                record.level(),
                record.target(),
                message,
            ))
        })
        .level(level)
        .chain(std::io::stderr())
        .apply()?;
    Ok(())
}

/// Applies one command to a running cluster. Returns `false` if it was an
/// expectation that failed.
async fn step(cluster: &Cluster, command: Command) -> Result<bool, Box<dyn std::error::Error>> {
    match command {
    | Command::Start { id, seq, value } => cluster.peer(id)?.start(seq, value),
    | Command::Done { id, seq } => cluster.peer(id)?.done(seq),
    | Command::Kill { id } => cluster.peer(id)?.kill(),
    | Command::Report => cluster.report(),
    | Command::Expect { id, seq, value, within_ms } => {
        let within = Duration::from_millis(within_ms);
        let seen = cluster.expect(id, seq, &value, within).await?;
        if seen != value {
            error!("peer {} instance {}: expected {:?}, saw {:?}", id, seq, value, seen);
            return Ok(false)
        }
        info!("peer {} instance {}: {:?}", id, seq, seen);
    }
    | Command::ExpectMin { id, min, within_ms } => {
        let within = Duration::from_millis(within_ms);
        let seen = cluster.expect_min(id, min, within).await?;
        if seen < min {
            error!("peer {} min: expected at least {}, saw {}", id, min, seen);
            return Ok(false)
        }
        info!("peer {} min {}", id, seen);
    }
    | Command::Spawn { .. } | Command::Sleep { .. } => (),
    }
    Ok(true)
}

/// Replays `execution`, returning how many expectations failed.
async fn run(execution: Execution) -> Result<usize, Box<dyn std::error::Error>> {
    let mut cluster: Option<Cluster> = None;
    let mut failures = 0;

    for command in execution.0 {
        debug!("executing {:?}", command);
        match command {
        | Command::Spawn { count, port, unreliable } => {
            cluster = Some(Cluster::spawn(count, port, unreliable).await?);
        }
        | Command::Sleep { ms } => {
            tokio::time::sleep(Duration::from_millis(ms)).await;
        }
        | command => {
            let cluster = cluster
                .as_ref()
                .ok_or("scenario must spawn a cluster first")?;
            if !step(cluster, command).await? {
                failures += 1;
            }
        }
        }
    }

    Ok(failures)
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let opt = Opt::from_args();
    setup_logger(opt.verbose)?;

    let file = std::fs::File::open(&opt.file)?;
    let execution: Execution = serde_json::from_reader(std::io::BufReader::new(file))?;

    let failures = run(execution).await?;
    if failures > 0 {
        error!("{} expectation(s) failed", failures);
        std::process::exit(1);
    }
    info!("all expectations met");
    Ok(())
}
