use tracing::info;

use crate::{
    emitter::{emitter_for, GeneratedFile, Target},
    error::MicrobufError,
    layout::{compile_layout, LayoutPlan},
    parser::parse_message,
    types::MessageSpec,
};

/// Parse a `.mmsg` document and compile its layout.
/// Returns `Err(MicrobufError)` if parsing, validation or layout fails.
pub fn compile_schema(name: &str, text: &str) -> Result<(MessageSpec, LayoutPlan), MicrobufError> {
    let message = parse_message(name, text)?;
    let plan = compile_layout(&message)?;
    Ok((message, plan))
}

/// Run the default emitter of every target in `targets` over one compiled
/// message.
pub fn generate_sources(
    message: &MessageSpec,
    plan: &LayoutPlan,
    targets: &[Target],
) -> Result<Vec<GeneratedFile>, MicrobufError> {
    let mut files = Vec::with_capacity(targets.len());
    for &target in targets {
        let file = emitter_for(target).generate(message, plan)?;
        info!(
            msg = message.name(),
            %target,
            filename = %file.filename,
            "generated source"
        );
        files.push(file);
    }
    Ok(files)
}
