//! Nesting View CLI
//!
//! Usage:
//!   nesting-view [OPTIONS] [FILE]
//!
//! Options:
//!   -c, --config <FILE>    Viewer configuration (TOML format)
//!   -o, --output <FILE>    Write to a file instead of stdout
//!   -f, --format <FORMAT>  svg or png
//!   -n, --nesting <ID>     Nesting to load when FILE is a directory
//!   -h, --help             Print help

use std::io::{self, IsTerminal, Read, Write};
use std::path::{Path, PathBuf};

use clap::{Parser, ValueEnum};
use tracing_subscriber::EnvFilter;

use nesting_view::layout::Point;
use nesting_view::{
    ConfigError, ExportOptions, JsonFileSource, LayoutRequest, LayoutResponse, LoadError, NestingView,
    ViewCommand, ViewStatus, ViewerConfig,
};

#[derive(Clone, Copy, PartialEq, Eq, ValueEnum)]
enum Format {
    Svg,
    Png,
}

#[derive(Parser)]
#[command(name = "nesting-view")]
#[command(about = "Render autoclave nesting layouts to SVG or PNG")]
struct Cli {
    /// Layout response JSON, or a directory of <nesting>.json files (reads stdin if not provided)
    input: Option<PathBuf>,

    /// Viewer configuration file (TOML format)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Output file (stdout if not provided)
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Output format
    #[arg(short, long, value_enum, default_value = "svg")]
    format: Format,

    /// Nesting id to load from a directory input
    #[arg(short, long)]
    nesting: Option<String>,

    /// Canvas width in pixels
    #[arg(short, long)]
    width: Option<f64>,

    /// Canvas height in pixels
    #[arg(short = 'H', long)]
    height: Option<f64>,

    /// Zoom level (clamped to the configured range)
    #[arg(long)]
    zoom: Option<f64>,

    #[arg(long, default_value_t = 0.0, allow_negative_numbers = true)]
    pan_x: f64,

    #[arg(long, default_value_t = 0.0, allow_negative_numbers = true)]
    pan_y: f64,

    /// Fit the surface into the canvas (overrides --zoom and --pan-*)
    #[arg(long)]
    fit: bool,

    /// Item id to draw as selected
    #[arg(long, allow_negative_numbers = true)]
    select: Option<i64>,

    /// Item id to draw as hovered, with its tooltip
    #[arg(long, allow_negative_numbers = true)]
    hover: Option<i64>,

    /// Only draw placements on this layer
    #[arg(long, value_parser = clap::value_parser!(u8).range(1..=2))]
    layer: Option<u8>,

    #[arg(long)]
    no_grid: bool,

    #[arg(long)]
    no_tooltips: bool,

    /// PNG pixels per SVG unit
    #[arg(long, default_value_t = 1.0)]
    scale: f32,

    /// Debug logging on stderr
    #[arg(short, long)]
    verbose: bool,
}

fn main() {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    // If no input file and stdin is a terminal (interactive), show intro help
    if cli.input.is_none() && io::stdin().is_terminal() {
        print_intro();
        return;
    }

    let config = match &cli.config {
        Some(path) => match ViewerConfig::from_file(path) {
            Ok(config) => config,
            Err(e) => {
                eprintln!("Error loading config '{}': {}", path.display(), e);
                std::process::exit(1);
            }
        },
        None => ViewerConfig::default(),
    };
    let config = match apply_overrides(config, &cli) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Error: {}", e);
            std::process::exit(1);
        }
    };

    let mut view = NestingView::new(config);
    match &cli.input {
        Some(path) => {
            let request = LayoutRequest::new(nesting_id(path, cli.nesting.as_deref()));
            view.load(&JsonFileSource::new(path), request);
        }
        None => {
            let mut buffer = String::new();
            if let Err(e) = io::stdin().read_to_string(&mut buffer) {
                eprintln!("Error reading from stdin: {}", e);
                std::process::exit(1);
            }
            let stdin = |_: &LayoutRequest| -> Result<LayoutResponse, LoadError> {
                LayoutResponse::from_json(&buffer)
            };
            view.load(&stdin, LayoutRequest::new("stdin"));
        }
    }

    if let ViewStatus::Failed { message, .. } = view.session().status() {
        eprintln!("Error: {}", message);
        std::process::exit(1);
    }

    view.select(cli.select);
    view.hover(cli.hover);
    if cli.fit {
        view.apply_command(ViewCommand::Fit);
    } else {
        let zoom = cli.zoom.unwrap_or(view.viewport().zoom());
        view.viewport_mut()
            .set_view(zoom, Point::new(cli.pan_x, cli.pan_y));
    }

    let bytes = match cli.format {
        Format::Svg => view.svg().into_bytes(),
        Format::Png => match view.export_png(&ExportOptions::default().with_scale(cli.scale)) {
            Ok(png) => png,
            Err(e) => {
                eprintln!("Error: {}", e);
                std::process::exit(1);
            }
        },
    };

    if let Err(e) = write_output(&bytes, cli.output.as_deref()) {
        eprintln!("Error writing output: {}", e);
        std::process::exit(1);
    }
}

fn init_tracing(verbose: bool) {
    let filter = if verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"))
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .init();
}

/// Apply command-line overrides and re-check the result
fn apply_overrides(mut config: ViewerConfig, cli: &Cli) -> Result<ViewerConfig, ConfigError> {
    if let Some(width) = cli.width {
        config.canvas.width = width;
    }
    if let Some(height) = cli.height {
        config.canvas.height = height;
    }
    if cli.layer.is_some() {
        config.display.layer_filter = cli.layer;
    }
    if cli.no_grid {
        config.display.show_grid = false;
    }
    if cli.no_tooltips {
        config.display.show_tooltips = false;
    }
    config.validate()?;
    Ok(config)
}

/// The explicit `--nesting`, else the file stem of the input
fn nesting_id(path: &Path, explicit: Option<&str>) -> String {
    explicit
        .map(str::to_string)
        .or_else(|| {
            path.file_stem()
                .map(|stem| stem.to_string_lossy().into_owned())
        })
        .unwrap_or_default()
}

fn write_output(bytes: &[u8], output: Option<&Path>) -> io::Result<()> {
    match output {
        Some(path) => std::fs::write(path, bytes),
        None => {
            let mut stdout = io::stdout().lock();
            stdout.write_all(bytes)?;
            stdout.flush()
        }
    }
}

fn print_intro() {
    println!(
        r#"Nesting View - render autoclave nesting layouts

USAGE:
    nesting-view [OPTIONS] [FILE]
    cat layout.json | nesting-view > layout.svg

INPUT:
    A layout response {{ "success": true, "layoutData": {{ ... }} }}
    or a bare layoutData object. When FILE is a directory, the file
    <nesting>.json inside it is read (see --nesting).

OPTIONS:
    -c, --config       Viewer configuration (TOML file)
    -o, --output       Output file
    -f, --format       svg (default) or png
    --zoom, --pan-x, --pan-y, --fit
                       Initial view
    --select, --hover  Item ids to highlight
    --layer            Only draw layer 1 or 2
    -v, --verbose      Debug logging on stderr
    -h, --help         Print help

Set RUST_LOG to control logging (default: warn)."#
    );
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cli(args: &[&str]) -> Cli {
        Cli::parse_from(std::iter::once("nesting-view").chain(args.iter().copied()))
    }

    #[test]
    fn test_overrides_are_applied() {
        let config = apply_overrides(
            ViewerConfig::default(),
            &cli(&["-w", "640", "-H", "480", "--layer", "2", "--no-grid"]),
        )
        .unwrap();
        assert_eq!(config.canvas.width, 640.0);
        assert_eq!(config.canvas.height, 480.0);
        assert_eq!(config.display.layer_filter, Some(2));
        assert!(!config.display.show_grid);
    }

    #[test]
    fn test_invalid_canvas_override_is_rejected() {
        let err = apply_overrides(ViewerConfig::default(), &cli(&["--width", "0"])).unwrap_err();
        assert!(matches!(
            err,
            ConfigError::Invalid {
                field: "canvas.width",
                ..
            }
        ));
        assert!(apply_overrides(ViewerConfig::default(), &cli(&["--height=-5"])).is_err());
    }

    #[test]
    fn test_nesting_id_defaults_to_file_stem() {
        assert_eq!(nesting_id(Path::new("layouts/42.json"), None), "42");
        assert_eq!(nesting_id(Path::new("layouts"), Some("7")), "7");
    }
}
