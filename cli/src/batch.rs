//! Batch driver for `microbuf gen`: compiles `.mmsg` files one by one and
//! writes the generated sources for every requested target.

use std::fs;
use std::path::{Path, PathBuf};

use microbuf_compiler::{
    compile_schema,
    error::MicrobufError,
    gen_cpp::{CPP_RUNTIME_FILENAME, CPP_RUNTIME_HEADER},
    generate_sources, LayoutPlan, MessageSpec, Target,
};
use tracing::{error, info, warn};

pub const SCHEMA_EXTENSION: &str = "mmsg";

pub struct BatchOptions {
    pub out_dir:   PathBuf,
    pub targets:   Vec<Target>,
    pub fail_fast: bool,
}

#[derive(Debug, Default)]
pub struct BatchReport {
    pub processed: usize,
    pub written:   Vec<PathBuf>,
    pub failures:  Vec<(PathBuf, MicrobufError)>,
}

impl BatchReport {
    pub fn into_result(self) -> Result<BatchReport, MicrobufError> {
        if self.failures.is_empty() {
            Ok(self)
        } else {
            Err(MicrobufError::BatchFailed {
                failed: self.failures.len(),
                total:  self.processed,
            })
        }
    }
}

/// The message name of a schema file is its stem; only `.mmsg` files are
/// accepted.
pub fn message_name(path: &Path) -> Result<String, MicrobufError> {
    let invalid = || MicrobufError::InvalidInput(path.display().to_string());
    if path.extension().and_then(|ext| ext.to_str()) != Some(SCHEMA_EXTENSION) {
        return Err(invalid());
    }
    path.file_stem()
        .and_then(|stem| stem.to_str())
        .map(str::to_string)
        .ok_or_else(invalid)
}

pub fn load_schema(path: &Path) -> Result<(MessageSpec, LayoutPlan), MicrobufError> {
    let name = message_name(path)?;
    let text = fs::read_to_string(path)?;
    compile_schema(&name, &text)
}

fn process_file(path: &Path, options: &BatchOptions) -> Result<Vec<PathBuf>, MicrobufError> {
    let (message, plan) = load_schema(path)?;
    let mut written = Vec::new();
    for file in generate_sources(&message, &plan, &options.targets)? {
        let out_path = options.out_dir.join(&file.filename);
        fs::write(&out_path, &file.contents)?;
        written.push(out_path);
    }
    Ok(written)
}

/// Generate sources for every file in `inputs`, in order.
///
/// A failing file is logged and skipped unless `fail_fast` is set. Only
/// failures to prepare the output directory abort the batch as a whole.
pub fn run_batch(inputs: &[PathBuf], options: &BatchOptions) -> Result<BatchReport, MicrobufError> {
    fs::create_dir_all(&options.out_dir)?;

    let mut report = BatchReport::default();
    if options.targets.contains(&Target::Cpp) {
        let runtime = options.out_dir.join(CPP_RUNTIME_FILENAME);
        fs::write(&runtime, CPP_RUNTIME_HEADER)?;
        report.written.push(runtime);
    }

    for path in inputs {
        report.processed += 1;
        match process_file(path, options) {
            Ok(written) => {
                info!(file = %path.display(), outputs = written.len(), "compiled schema");
                report.written.extend(written);
            }
            Err(err) => {
                error!(file = %path.display(), "{}", err);
                report.failures.push((path.clone(), err));
                if options.fail_fast {
                    warn!(remaining = inputs.len() - report.processed, "stopping at first failure");
                    break;
                }
            }
        }
    }
    Ok(report)
}
