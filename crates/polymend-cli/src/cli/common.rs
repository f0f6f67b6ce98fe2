//! Common utilities shared across CLI commands.

use std::io::{self, IsTerminal, Read, Write};
use std::path::{Path, PathBuf};

use anyhow::Context;
use polymend::GeoJsonLayer;
use tracing::info;

/// Argument value meaning "stdin" or "stdout".
pub const STDIO: &str = "-";

/// Where a layer comes from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Source {
    Stdin,
    File(PathBuf),
}

impl Source {
    pub fn parse(arg: &str) -> Self {
        if arg == STDIO {
            Source::Stdin
        } else {
            Source::File(PathBuf::from(arg))
        }
    }

    pub fn is_stdin(&self) -> bool {
        matches!(self, Source::Stdin)
    }
}

/// Where a modified layer goes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Target {
    Stdout,
    File(PathBuf),
}

impl Target {
    /// Resolve `-o` / `--in-place` against the input.
    pub fn resolve(
        output: Option<&Path>,
        in_place: bool,
        source: &Source,
    ) -> anyhow::Result<Self> {
        match (output, in_place, source) {
            (Some(_), true, _) => {
                anyhow::bail!("--output and --in-place are mutually exclusive")
            }
            (None, true, Source::Stdin) => {
                anyhow::bail!("--in-place needs a file input, not stdin")
            }
            (None, true, Source::File(path)) => Ok(Target::File(path.clone())),
            (Some(path), false, _) if path == Path::new(STDIO) => Ok(Target::Stdout),
            (Some(path), false, _) => Ok(Target::File(path.to_path_buf())),
            (None, false, _) => Ok(Target::Stdout),
        }
    }

    /// Files are only touched when the layer changed; stdout always gets
    /// the layer so `repair` works as a filter.
    pub fn needs_write(&self, modified: bool) -> bool {
        modified || *self == Target::Stdout
    }
}

/// Read a GeoJSON layer from a file or stdin.
pub fn read_layer(source: &Source) -> anyhow::Result<GeoJsonLayer> {
    match source {
        Source::Stdin => {
            let mut content = String::new();
            io::stdin()
                .read_to_string(&mut content)
                .context("Failed to read from stdin")?;
            GeoJsonLayer::parse("stdin", &content).context("Failed to parse GeoJSON from stdin")
        }
        Source::File(path) => GeoJsonLayer::open(path)
            .with_context(|| format!("Failed to read layer {}", path.display())),
    }
}

/// Write a layer to its target.
pub fn write_layer(layer: &GeoJsonLayer, target: &Target, pretty: bool) -> anyhow::Result<()> {
    match target {
        Target::Stdout => {
            let text = layer.to_json_string(pretty).context("Failed to serialize layer")?;
            let mut stdout = io::stdout().lock();
            writeln!(stdout, "{}", text).context("Failed to write to stdout")?;
            info!("wrote layer to stdout");
        }
        Target::File(path) => {
            layer
                .save(path, pretty)
                .with_context(|| format!("Failed to write layer {}", path.display()))?;
        }
    }
    Ok(())
}

/// True when the operator can be prompted.
pub fn can_prompt(source: &Source) -> bool {
    !source.is_stdin() && io::stdin().is_terminal()
}
