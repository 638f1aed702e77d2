//! Entry point for the objstream demo: parse an OBJ file into indexed
//! meshes and report what was built.

use anyhow::{Context, Result};
use meshbuild::IndexedMeshBuilder;
use objstream::{LogReporter, Parser};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum InputMode {
    Bytes,
    Text,
}

fn parse_mode_arg() -> InputMode {
    // Accept: --mode=bytes|text, default = bytes
    let mut mode = InputMode::Bytes;
    for arg in std::env::args() {
        if let Some(val) = arg.strip_prefix("--mode=") {
            mode = match val.to_ascii_lowercase().as_str() {
                "bytes" => InputMode::Bytes,
                "text" => InputMode::Text,
                other => {
                    eprintln!("[warn] Unknown mode '{}', falling back to bytes.", other);
                    InputMode::Bytes
                }
            };
        }
    }
    mode
}

fn parse_input_arg() -> Option<String> {
    for arg in std::env::args() {
        if let Some(val) = arg.strip_prefix("--input=") {
            return Some(val.to_owned());
        }
    }
    // First bare argument works too.
    std::env::args().skip(1).find(|arg| !arg.starts_with("--"))
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let Some(path) = parse_input_arg() else {
        anyhow::bail!("usage: app --input=<file.obj> [--mode=bytes|text]");
    };
    let mode = parse_mode_arg();

    let raw = std::fs::read(&path).with_context(|| format!("Failed to read OBJ file: {path}"))?;
    log::info!("Parsing {} ({} bytes, mode={:?})", path, raw.len(), mode);

    let mut parser = Parser::with_reporter(IndexedMeshBuilder::new(), Box::new(LogReporter));
    match mode {
        InputMode::Bytes => parser.parse_bytes(&raw)?,
        InputMode::Text => parser.parse_text(&String::from_utf8_lossy(&raw))?,
    }
    let builder = parser.finalize();

    for mesh in builder.meshes() {
        log::info!(
            "mesh '{}' (group '{}', material '{}', smoothing {}): {} vertices, {} triangles",
            mesh.name,
            mesh.group_name,
            mesh.material_name,
            mesh.smoothing_group,
            mesh.data.vertices.len(),
            mesh.data.triangle_count(),
        );
    }
    log::info!("Done: {} meshes built.", builder.meshes().len());

    Ok(())
}
