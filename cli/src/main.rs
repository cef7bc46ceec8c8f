mod batch;

use clap::{ArgAction, Parser, Subcommand, ValueEnum};
use std::fs;
use std::path::PathBuf;
use tracing::Level;

use microbuf::{decode_to_json, encode_message, values_from_json};
use microbuf_compiler::{error::MicrobufError, Target};

use batch::{load_schema, run_batch, BatchOptions};

#[derive(Parser)]
#[command(name = "microbuf")]
#[command(about = "Compile .mmsg message schemas to fixed-layout Rust, C++ and MATLAB interfaces", long_about = None)]
struct Cli {
    /// Increase log output (-v for info, -vv for debug)
    #[arg(short, long, action = ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Clone, Copy, ValueEnum)]
enum TargetArg {
    Rust,
    Cpp,
    Matlab,
    All,
}

impl TargetArg {
    fn targets(self) -> Vec<Target> {
        match self {
            TargetArg::Rust => vec![Target::Rust],
            TargetArg::Cpp => vec![Target::Cpp],
            TargetArg::Matlab => vec![Target::Matlab],
            TargetArg::All => Target::ALL.to_vec(),
        }
    }
}

#[derive(Subcommand)]
enum Commands {
    /// Generate sources for one or more `.mmsg` schema files
    Gen {
        /// Input `.mmsg` files
        #[arg(required = true)]
        files: Vec<PathBuf>,

        /// Output directory, created when missing
        #[arg(short, long)]
        out: PathBuf,

        /// Language(s) to generate
        #[arg(short, long, value_enum, default_value_t = TargetArg::All)]
        target: TargetArg,

        /// Stop at the first schema that fails
        #[arg(long)]
        fail_fast: bool,
    },

    /// Print the compiled layout of a `.mmsg` file as JSON
    Layout {
        /// Input `.mmsg` file
        file: PathBuf,
    },

    /// Encode field values given as JSON into a binary message
    Encode {
        /// `.mmsg` schema of the message
        #[arg(short, long)]
        schema: PathBuf,

        /// JSON file holding an object keyed by field name, or an array in field order
        #[arg(long)]
        values: PathBuf,

        /// Output binary file
        #[arg(short, long)]
        output: PathBuf,
    },

    /// Decode a binary message and print it as JSON
    Decode {
        /// `.mmsg` schema of the message
        #[arg(short, long)]
        schema: PathBuf,

        /// Input binary file
        #[arg(short, long)]
        input: PathBuf,
    },
}

fn init_logging(verbose: u8) {
    let level = match verbose {
        0 => Level::WARN,
        1 => Level::INFO,
        _ => Level::DEBUG,
    };
    tracing_subscriber::fmt()
        .with_max_level(level)
        .with_writer(std::io::stderr)
        .init();
}

fn main() -> Result<(), MicrobufError> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    match cli.command {
        Commands::Gen {
            files,
            out,
            target,
            fail_fast,
        } => {
            let options = BatchOptions {
                out_dir: out,
                targets: target.targets(),
                fail_fast,
            };
            let report = run_batch(&files, &options)?;
            for (path, err) in &report.failures {
                eprintln!("{}: {}", path.display(), err);
            }
            let report = report.into_result()?;
            println!(
                "Generated {} files from {} schemas into {}",
                report.written.len(),
                report.processed,
                options.out_dir.display()
            );
            Ok(())
        }

        Commands::Layout { file } => {
            let (_message, plan) = load_schema(&file)?;
            println!("{}", serde_json::to_string_pretty(&plan)?);
            Ok(())
        }

        Commands::Encode { schema, values, output } => {
            let (message, plan) = load_schema(&schema)?;
            let json: serde_json::Value = serde_json::from_str(&fs::read_to_string(&values)?)?;
            let values = values_from_json(&message, &json)?;
            let bytes = encode_message(&message, &plan, &values)?;
            fs::write(&output, &bytes)?;
            println!("Encoded {} ({} bytes) → {}", message.name(), bytes.len(), output.display());
            Ok(())
        }

        Commands::Decode { schema, input } => {
            let (message, plan) = load_schema(&schema)?;
            let data = fs::read(&input)?;
            println!("{}", decode_to_json(&message, &plan, &data)?);
            Ok(())
        }
    }
}
