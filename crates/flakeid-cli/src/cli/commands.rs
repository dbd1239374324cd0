use std::{
    collections::HashSet,
    fmt,
    io::{self, Write},
    thread::{self, ScopedJoinHandle},
    time::{Duration, Instant, UNIX_EPOCH},
};

use anyhow::{Context, anyhow, bail};
use flakeid::{
    AtomicGenerator, BitLayout, Encoding, Generator, IdConverter, IdGenerator, IdParts,
    LockGenerator, WallClock, yield_backoff,
};
use tracing::{debug, info};

use super::config::{BenchMode, Command, Config, Convert};

/// Runs the configured subcommand, writing its output to stdout.
pub fn run(config: &Config) -> anyhow::Result<()> {
    let stdout = io::stdout();
    let mut out = stdout.lock();

    match &config.command {
        Command::Generate { count, numeric } => generate(config, *count, *numeric, &mut out)?,
        Command::Decompose { id } => write!(out, "{}", decompose(config, id)?)?,
        Command::Convert { direction } => writeln!(out, "{}", convert(direction)?)?,
        Command::Bench { workers, ids, mode } => {
            writeln!(out, "{}", bench(config, *workers, *ids, *mode)?)?;
        }
    }

    out.flush()?;
    Ok(())
}

pub fn generate(
    config: &Config,
    count: usize,
    numeric: bool,
    out: &mut impl Write,
) -> anyhow::Result<()> {
    let generator = Generator::with_layout(config.generator_id, config.epoch, config.layout)?;
    info!(%generator, count, numeric, "generating identifiers");

    for _ in 0..count {
        if numeric {
            writeln!(out, "{}", generator.generate_long())?;
        } else {
            writeln!(out, "{}", generator.generate())?;
        }
    }
    Ok(())
}

/// An identifier split into its fields, ready for display.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Decomposition {
    pub value: u64,
    pub parts: IdParts,
    pub layout: BitLayout,
    pub epoch: Duration,
}

impl fmt::Display for Decomposition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let bits = self.layout.bits(self.value);
        let (t, g) = (
            usize::from(self.layout.time_bits()),
            usize::from(self.layout.generator_bits()),
        );

        writeln!(f, "id         {}", self.value)?;
        writeln!(f, "compact    {}", Encoding::BigEndianCompact.encode(self.value))?;
        writeln!(
            f,
            "bits       {} {} {}",
            field_run(&bits[..t]),
            field_run(&bits[t..t + g]),
            field_run(&bits[t + g..]),
        )?;
        writeln!(f, "time       {} ms since epoch", self.parts.time_offset_ms)?;
        match self
            .parts
            .created_at(self.epoch)
            .and_then(|at| at.duration_since(UNIX_EPOCH).ok())
        {
            Some(since) => writeln!(f, "created    {} ms since 1970-01-01T00:00:00Z", since.as_millis())?,
            None => writeln!(f, "created    out of range")?,
        }
        writeln!(f, "generator  {}", self.parts.generator_id)?;
        writeln!(f, "sequence   {}", self.parts.sequence)
    }
}

fn field_run(bits: &str) -> &str {
    if bits.is_empty() { "-" } else { bits }
}

/// Decomposes either a decimal integer or a big-endian compact string.
pub fn decompose(config: &Config, id: &str) -> anyhow::Result<Decomposition> {
    let value = if !id.is_empty() && id.bytes().all(|b| b.is_ascii_digit()) {
        id.parse::<u64>()
            .with_context(|| format!("{id} does not fit in 64 bits"))?
    } else {
        Encoding::BigEndianCompact
            .decode(id)
            .with_context(|| format!("{id} is not a compact identifier"))?
    };
    debug!(value, "decomposing identifier");

    Ok(Decomposition {
        value,
        parts: config.layout.decompose(value),
        layout: config.layout,
        epoch: config.epoch,
    })
}

pub fn convert(direction: &Convert) -> anyhow::Result<String> {
    Ok(match direction {
        Convert::ToLong { text } => IdConverter::to_long(text)?.to_string(),
        Convert::ToText { value } => IdConverter::to_text(*value),
    })
}

/// Outcome of one `bench` run.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BenchReport {
    pub mode: BenchMode,
    pub workers: usize,
    pub total: usize,
    pub unique: usize,
    pub elapsed: Duration,
}

impl BenchReport {
    #[allow(clippy::cast_precision_loss)]
    pub fn ids_per_ms(&self) -> f64 {
        let millis = self.elapsed.as_secs_f64() * 1000.0;
        if millis == 0.0 {
            return self.total as f64;
        }
        self.total as f64 / millis
    }
}

impl fmt::Display for BenchReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{:?}: {} ids from {} workers in {:?} ({} unique, {:.0} ids/ms)",
            self.mode,
            self.total,
            self.workers,
            self.elapsed,
            self.unique,
            self.ids_per_ms()
        )
    }
}

/// Generates `workers * ids` identifiers concurrently and verifies that none
/// repeat and each worker saw strictly increasing values.
pub fn bench(
    config: &Config,
    workers: usize,
    ids: usize,
    mode: BenchMode,
) -> anyhow::Result<BenchReport> {
    info!(workers, ids, ?mode, layout = ?config.layout, "starting benchmark");

    let start = Instant::now();
    let batches = match mode {
        BenchMode::PerWorker => run_per_worker(config, workers, ids)?,
        BenchMode::Lock => {
            let time = WallClock::with_epoch(config.epoch)?;
            let generator = LockGenerator::new(config.generator_id, config.layout, time)?;
            run_shared(&generator, workers, ids)?
        }
        BenchMode::Atomic => {
            let time = WallClock::with_epoch(config.epoch)?;
            let generator = AtomicGenerator::new(config.generator_id, config.layout, time)?;
            run_shared(&generator, workers, ids)?
        }
    };
    let elapsed = start.elapsed();

    for (worker, batch) in batches.iter().enumerate() {
        if !batch.windows(2).all(|pair| pair[0] < pair[1]) {
            bail!("worker {worker} produced identifiers out of order");
        }
    }

    let total = batches.iter().map(Vec::len).sum();
    let mut seen = HashSet::with_capacity(total);
    for &id in batches.iter().flatten() {
        seen.insert(id);
    }

    let report = BenchReport {
        mode,
        workers,
        total,
        unique: seen.len(),
        elapsed,
    };
    if report.unique != report.total {
        bail!(
            "{} duplicate identifiers out of {}",
            report.total - report.unique,
            report.total
        );
    }

    info!(
        total = report.total,
        elapsed_ms = elapsed.as_millis(),
        ids_per_ms = report.ids_per_ms(),
        "benchmark finished"
    );
    Ok(report)
}

fn run_per_worker(config: &Config, workers: usize, ids: usize) -> anyhow::Result<Vec<Vec<u64>>> {
    thread::scope(|s| {
        let handles = (0..workers as u64)
            .map(|offset| {
                let generator_id = config.generator_id + offset;
                s.spawn(move || -> anyhow::Result<Vec<u64>> {
                    let generator =
                        Generator::with_layout(generator_id, config.epoch, config.layout)?;
                    debug!(%generator, "worker started");
                    Ok((0..ids).map(|_| generator.generate_long()).collect())
                })
            })
            .collect();
        join_all(handles)
    })
}

fn run_shared<G>(generator: &G, workers: usize, ids: usize) -> anyhow::Result<Vec<Vec<u64>>>
where
    G: IdGenerator + Sync,
    G::Err: std::error::Error + Send + Sync + 'static,
{
    thread::scope(|s| {
        let handles = (0..workers)
            .map(|_| {
                s.spawn(move || -> anyhow::Result<Vec<u64>> {
                    let mut batch = Vec::with_capacity(ids);
                    for _ in 0..ids {
                        batch.push(generator.try_next_id(yield_backoff)?);
                    }
                    Ok(batch)
                })
            })
            .collect();
        join_all(handles)
    })
}

fn join_all(
    handles: Vec<ScopedJoinHandle<'_, anyhow::Result<Vec<u64>>>>,
) -> anyhow::Result<Vec<Vec<u64>>> {
    handles
        .into_iter()
        .enumerate()
        .map(|(worker, handle)| {
            handle
                .join()
                .map_err(|_| anyhow!("worker {worker} panicked"))?
        })
        .collect()
}
