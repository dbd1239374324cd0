use core::time::Duration;

use anyhow::bail;
use clap::{Parser, Subcommand, ValueEnum};
use flakeid::{BitLayout, DEFAULT_EPOCH, WallClock};

/// Command-line arguments for the `flakeid` binary.
///
/// Global settings describe the generator identity shared by every
/// subcommand. Each can also be supplied through the environment (or a `.env`
/// file), which is how a deployment pins a node's generator id.
#[derive(Parser, Debug, Clone)]
#[command(
    name = "flakeid",
    version,
    about = "Generate, inspect and benchmark Snowflake-style 64-bit IDs"
)]
pub struct CliArgs {
    /// Generator (node) id embedded in every identifier.
    ///
    /// Must fit the generator field of the selected layout: `[0, 1024)` for
    /// `default`, `[0, 512)` for `wide-sequence`.
    ///
    /// Environment variable: `FLAKEID_GENERATOR_ID`
    #[arg(long, env = "FLAKEID_GENERATOR_ID", default_value_t = 0, global = true)]
    pub generator_id: u64,

    /// Epoch in milliseconds since 1970-01-01 UTC. Defaults to 2013-01-01.
    ///
    /// Environment variable: `FLAKEID_EPOCH_MS`
    #[arg(
        long,
        env = "FLAKEID_EPOCH_MS",
        default_value_t = DEFAULT_EPOCH.as_millis() as u64,
        global = true
    )]
    pub epoch_ms: u64,

    /// Bit layout of the identifiers.
    ///
    /// Environment variable: `FLAKEID_LAYOUT`
    #[arg(
        long,
        env = "FLAKEID_LAYOUT",
        value_enum,
        default_value_t = LayoutArg::Default,
        global = true
    )]
    pub layout: LayoutArg,

    #[command(subcommand)]
    pub command: Command,
}

/// Named bit layouts selectable from the command line.
#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum LayoutArg {
    /// 42 time bits, 10 generator bits, 12 sequence bits.
    Default,
    /// 42 time bits, 9 generator bits, 13 sequence bits.
    WideSequence,
}

impl From<LayoutArg> for BitLayout {
    fn from(arg: LayoutArg) -> Self {
        match arg {
            LayoutArg::Default => Self::DEFAULT,
            LayoutArg::WideSequence => Self::WIDE_SEQUENCE,
        }
    }
}

#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Print freshly generated identifiers, one per line.
    Generate {
        /// How many identifiers to generate.
        #[arg(short = 'n', long, default_value_t = 1)]
        count: usize,

        /// Print the numeric value instead of the compact string.
        #[arg(long)]
        numeric: bool,
    },

    /// Split an identifier into its fields.
    Decompose {
        /// A big-endian compact string (as printed by `generate`) or a
        /// decimal integer.
        id: String,
    },

    /// Convert between numbers and little-endian compact strings.
    Convert {
        #[command(subcommand)]
        direction: Convert,
    },

    /// Generate identifiers from several threads and check they never collide.
    Bench {
        /// Number of worker threads.
        #[arg(short, long, default_value_t = num_cpus::get())]
        workers: usize,

        /// Identifiers generated by each worker.
        #[arg(short, long, default_value_t = 100_000)]
        ids: usize,

        /// How workers obtain identifiers.
        #[arg(short, long, value_enum, default_value_t = BenchMode::PerWorker)]
        mode: BenchMode,
    },
}

#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum Convert {
    /// Parse a little-endian compact string into its numeric value.
    ToLong { text: String },
    /// Render a numeric value as a little-endian compact string.
    ToText { value: u64 },
}

/// Concurrency pattern exercised by `bench`.
#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum BenchMode {
    /// One generator per worker, with consecutive generator ids.
    PerWorker,
    /// One generator shared behind a mutex.
    Lock,
    /// One generator shared through a compare-and-swap state word.
    Atomic,
}

#[derive(Debug, Clone)]
pub struct Config {
    pub generator_id: u64,
    pub epoch: Duration,
    pub layout: BitLayout,
    pub command: Command,
}

impl TryFrom<CliArgs> for Config {
    type Error = anyhow::Error;

    fn try_from(args: CliArgs) -> Result<Self, Self::Error> {
        let layout = BitLayout::from(args.layout);
        let epoch = Duration::from_millis(args.epoch_ms);

        if u128::from(args.generator_id) >= layout.generator_count() {
            bail!(
                "FLAKEID_GENERATOR_ID ({}) exceeds the generator id space of the {:?} layout (max = {})",
                args.generator_id,
                args.layout,
                layout.max_generator_id()
            );
        }

        // Surface a future epoch before any command runs.
        WallClock::with_epoch(epoch)?;

        if let Command::Bench { workers, ids, mode } = &args.command {
            if *workers == 0 {
                bail!("--workers must be greater than 0");
            }
            if *ids == 0 {
                bail!("--ids must be greater than 0");
            }
            let available = layout.generator_count() - u128::from(args.generator_id);
            if *mode == BenchMode::PerWorker && *workers as u128 > available {
                bail!(
                    "--workers ({workers}) exceeds the {available} generator ids available from FLAKEID_GENERATOR_ID ({})",
                    args.generator_id
                );
            }
        }

        Ok(Self {
            generator_id: args.generator_id,
            epoch,
            layout,
            command: args.command,
        })
    }
}
