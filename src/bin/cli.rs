//! LodeKV CLI
//!
//! Command-line interface over a local LodeKV directory.

use std::process;
use std::sync::Arc;

use clap::{Parser, Subcommand, ValueEnum};
use lodekv::storage::StorageManager;
use lodekv::wal::Wal;
use lodekv::{ByteWiseComparator, Config, Engine, KeyComparator, StringKeyComparator};
use tracing_subscriber::{fmt, EnvFilter};

/// LodeKV CLI
#[derive(Parser, Debug)]
#[command(name = "lodekv-cli")]
#[command(about = "CLI for the LodeKV embedded key-value store")]
#[command(version)]
struct Args {
    /// Data directory
    #[arg(short, long, default_value = "./lodekv_data")]
    data_dir: String,

    /// WAL segment size in bytes before rollover
    #[arg(long, default_value_t = 64 * 1024 * 1024)]
    segment_bytes: u64,

    /// MemTable size in bytes before flush
    #[arg(long, default_value_t = 4 * 1024 * 1024)]
    buffer_bytes: u64,

    /// Key order
    #[arg(long, value_enum, default_value_t = Order::Bytewise)]
    comparator: Order,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, ValueEnum)]
enum Order {
    Bytewise,
    String,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Commit key-value pairs in one transaction
    Put {
        /// Alternating keys and values: KEY VALUE [KEY VALUE ...]
        #[arg(required = true, num_args = 2..)]
        pairs: Vec<String>,
    },

    /// Get a value by key
    Get {
        /// The key to get
        key: String,
    },

    /// Get several keys at once
    MultiGet {
        /// The keys to get
        #[arg(required = true)]
        keys: Vec<String>,
    },

    /// Print every transaction in the WAL
    WalDump,

    /// List SSTables and their key counts
    Tables,
}

fn main() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,lodekv=debug"));

    fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_thread_ids(true)
        .init();

    let args = Args::parse();

    if let Err(e) = run(args) {
        tracing::error!("{}", e);
        process::exit(1);
    }
}

fn run(args: Args) -> lodekv::Result<()> {
    let comparator: Arc<dyn KeyComparator> = match args.comparator {
        Order::Bytewise => Arc::new(ByteWiseComparator),
        Order::String => Arc::new(StringKeyComparator),
    };
    let config = Config::builder()
        .directory(&args.data_dir)
        .segment_max_size_bytes(args.segment_bytes)
        .buffer_size_bytes(args.buffer_bytes)
        .key_comparator(comparator)
        .build();

    match args.command {
        Commands::Put { pairs } => {
            if pairs.len() % 2 != 0 {
                return Err(lodekv::LodeError::Config(
                    "put expects KEY VALUE pairs".to_string(),
                ));
            }
            let engine = Engine::open(config)?;
            let mut txn = engine.new_transaction();
            for pair in pairs.chunks(2) {
                txn.put(pair[0].as_str(), pair[1].as_str())?;
            }
            txn.commit()?;
            println!("OK ({} pairs)", pairs.len() / 2);
            engine.close()
        }
        Commands::Get { key } => {
            let engine = Engine::open(config)?;
            let result = engine.new_readonly_transaction().get(key.as_str())?;
            if result.exists {
                println!("{}", result.value.as_string());
            } else {
                println!("(nil)");
            }
            engine.close()
        }
        Commands::MultiGet { keys } => {
            let engine = Engine::open(config)?;
            let results = engine
                .new_readonly_transaction()
                .multi_get(keys.iter().map(String::as_str))?;
            for result in results {
                if result.exists {
                    println!("{} = {}", result.key.as_string(), result.value.as_string());
                } else {
                    println!("{} = (nil)", result.key.as_string());
                }
            }
            engine.close()
        }
        Commands::WalDump => {
            config.validate()?;
            let wal = Wal::open(&config.directory, config.segment_max_size_bytes)?;
            for (index, entry) in wal.read_all()?.iter().enumerate() {
                println!("#{} {:?} ({} pairs)", index, entry.status, entry.pairs.len());
                for pair in &entry.pairs {
                    println!("    {} = {}", pair.key.as_string(), pair.value.as_string());
                }
            }
            Ok(())
        }
        Commands::Tables => {
            config.validate()?;
            let storage =
                StorageManager::open(&config.directory, config.bloom_false_positive_rate)?;
            for table in storage.sstables() {
                let pairs = table.all_key_values()?;
                println!("{} ({} keys)", table.path().display(), pairs.len());
            }
            Ok(())
        }
    }
}
