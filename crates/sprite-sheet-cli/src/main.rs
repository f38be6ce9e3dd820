use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::Context;
use clap::{ArgAction, Parser, Subcommand};
use globset::{Glob, GlobSetBuilder};
use image::ImageFormat;
use serde::Deserialize;
use sprite_sheet_core::config::{ColorMode, FrameSelection};
use sprite_sheet_core::{PackOutput, PackerConfig, Sheet, SheetPacker, TileSize};
use tracing::{info, warn};
use walkdir::WalkDir;

#[derive(Parser, Debug)]
#[command(
    name = "sprite-sheet",
    about = "Pack rendered animation frames into a sprite sheet",
    version,
    author
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
    /// Show a progress spinner (disable with --progress false or --quiet)
    #[arg(long, default_value_t = true, action=ArgAction::Set, global=true, help_heading = "Logging/UX")]
    progress: bool,
    /// Increase verbosity (-v, -vv)
    #[arg(short, long, action=ArgAction::Count, global=true, help_heading = "Logging/UX")]
    verbose: u8,
    /// Quiet mode (overrides verbose)
    #[arg(
        short,
        long,
        default_value_t = false,
        global = true,
        help_heading = "Logging/UX"
    )]
    quiet: bool,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Pack frames into a sprite sheet
    Pack(PackArgs),
    /// Layout-only: print the grid for N frames of a tile size (no images)
    Layout(LayoutArgs),
}

#[derive(Parser, Debug, Clone)]
struct PackArgs {
    // Input
    /// Frame files or directories, in animation order (directories are walked sorted by name)
    #[arg(help_heading = "Input", required_unless_present = "sequence")]
    inputs: Vec<PathBuf>,
    /// Renderer frame path pattern; a run of '#' is the zero-padded frame number
    #[arg(long, conflicts_with = "inputs", help_heading = "Input")]
    sequence: Option<String>,
    /// First frame number of --sequence
    #[arg(long, default_value_t = 1, help_heading = "Input")]
    start: i64,
    /// End frame number of --sequence (exclusive)
    #[arg(long, default_value_t = 30, help_heading = "Input")]
    end: i64,
    /// Frame number increment of --sequence
    #[arg(long, default_value_t = 3, help_heading = "Input")]
    frame_step: i64,
    /// Include patterns (glob) for directory inputs
    #[arg(long, help_heading = "Input")]
    include: Vec<String>,
    /// Exclude patterns (glob) for directory inputs
    #[arg(long, help_heading = "Input")]
    exclude: Vec<String>,

    // Output
    /// Output sprite sheet file
    #[arg(short, long, help_heading = "Output")]
    output: Option<PathBuf>,
    /// Image format: auto (from extension) | png | jpeg | bmp | tga | gif | tiff | webp | ...
    #[arg(long, default_value = "auto", help_heading = "Output")]
    format: String,
    /// Metadata format: none | json-array | json (alias) | json-hash
    #[arg(long, default_value = "none", help_heading = "Output")]
    metadata: String,
    /// Export sheet stats (JSON) to this file
    #[arg(long, help_heading = "Output")]
    export_stats: Option<PathBuf>,

    // Sheet
    /// Number of frames per row
    #[arg(long, default_value_t = 8, help_heading = "Sheet")]
    columns: u32,
    /// Frame selection stride
    #[arg(long, default_value_t = 1, help_heading = "Sheet")]
    step: usize,
    /// Frame selection policy: compat | stride
    #[arg(long, default_value = "compat", help_heading = "Sheet")]
    selection: String,
    /// Canvas color mode: rgba | rgb | la | l | rgba16 | rgb16 | ...
    #[arg(long, default_value = "rgba", help_heading = "Sheet")]
    mode: String,
    /// Decode frames in parallel (requires core feature `parallel`)
    #[arg(long, default_value_t = false, help_heading = "Sheet")]
    parallel: bool,

    // Config
    /// YAML config file path (overrides sheet options)
    #[arg(long, help_heading = "Config")]
    config: Option<PathBuf>,
    /// Print the merged configuration (after CLI/YAML) and exit
    #[arg(long, default_value_t = false, help_heading = "Config")]
    print_config: bool,
    /// Output format for --print-config: json|yaml
    #[arg(long, default_value = "json", value_parser = ["json", "yaml"], help_heading = "Config")]
    print_config_format: String,
    /// Dry run: load and composite but do not write files
    #[arg(long, default_value_t = false, help_heading = "Config")]
    dry_run: bool,
}

#[derive(Parser, Debug, Clone)]
struct LayoutArgs {
    /// Tile size, e.g. 64x64
    #[arg(long)]
    tile: String,
    /// Number of frames
    #[arg(long)]
    frames: usize,
    /// Number of frames per row
    #[arg(long, default_value_t = 8)]
    columns: u32,
    /// Metadata format: json-array | json (alias) | json-hash
    #[arg(long, default_value = "json-array")]
    metadata: String,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_tracing_with_level(cli.quiet, cli.verbose);
    match &cli.command {
        Commands::Pack(args) => run_pack(args, cli.progress && !cli.quiet),
        Commands::Layout(args) => run_layout(args),
    }
}

fn run_pack(cli: &PackArgs, show_progress: bool) -> anyhow::Result<()> {
    let cfg = build_config(cli)?;
    if cli.print_config {
        match cli.print_config_format.as_str() {
            "yaml" => println!("{}", serde_yaml::to_string(&cfg)?),
            _ => println!("{}", serde_json::to_string_pretty(&cfg)?),
        }
        return Ok(());
    }

    let output = cli.output.clone().unwrap_or_default();
    let format = check_output(&output, &cli.format)?;
    let json_path = match cli.metadata.as_str() {
        "none" => None,
        "json-array" | "json" | "json-hash" => Some(metadata_path(&output)?),
        other => anyhow::bail!("unknown metadata format: {}", other),
    };
    info!(?output, "saving sprite sheet");

    let paths = match &cli.sequence {
        Some(pattern) => {
            sprite_sheet_core::frame_paths(pattern, cli.start, cli.end, cli.frame_step)?
        }
        None => gather_paths(&cli.inputs, &cli.include, &cli.exclude)?,
    };
    info!(count = paths.len(), "frame paths");

    let packer = SheetPacker::new(&paths, cfg)?;
    let out = pack_with_progress(packer, show_progress)?;
    let layout = out.layout();
    info!(
        frames = out.sheet.frames.len(),
        columns = layout.columns,
        rows = layout.rows,
        width = layout.canvas_width,
        height = layout.canvas_height,
        "sheet packed"
    );

    if !cli.dry_run {
        sprite_sheet_core::save_canvas(&out.canvas, &output, format)
            .with_context(|| format!("failed to save output file {}", output.display()))?;
        info!(?output, "sheet written");
    }

    let value = metadata_value(&cli.metadata, &out.sheet)?;
    if let (Some(value), Some(json_path)) = (value, json_path) {
        if !cli.dry_run {
            fs::write(&json_path, serde_json::to_string_pretty(&value)?)
                .with_context(|| format!("write {}", json_path.display()))?;
            info!(?json_path, "metadata written");
        }
    }

    if let Some(stats_path) = &cli.export_stats {
        let stats = out.stats();
        if !cli.dry_run {
            fs::write(stats_path, serde_json::to_string_pretty(&stats)?)
                .with_context(|| format!("write {}", stats_path.display()))?;
            info!(?stats_path, "stats exported");
        } else {
            println!("{}", stats.summary());
        }
    }
    Ok(())
}

fn run_layout(args: &LayoutArgs) -> anyhow::Result<()> {
    let tile = parse_tile(&args.tile)?;
    let cfg = PackerConfig {
        max_columns: args.columns,
        ..Default::default()
    };
    let sheet = sprite_sheet_core::plan_sheet(tile, args.frames, &cfg)?;
    let value = metadata_value(&args.metadata, &sheet)?
        .ok_or_else(|| anyhow::anyhow!("layout needs a metadata format, got 'none'"))?;
    println!("{}", serde_json::to_string_pretty(&value)?);
    Ok(())
}

fn metadata_value(kind: &str, sheet: &Sheet) -> anyhow::Result<Option<serde_json::Value>> {
    Ok(match kind {
        "none" => None,
        "json-array" | "json" => Some(sprite_sheet_core::to_json_array(sheet)),
        "json-hash" => Some(sprite_sheet_core::to_json_hash(sheet)),
        other => anyhow::bail!("unknown metadata format: {}", other),
    })
}

fn build_config(cli: &PackArgs) -> anyhow::Result<PackerConfig> {
    let color_mode: ColorMode = cli
        .mode
        .parse()
        .map_err(|_| anyhow::anyhow!("unknown color mode: {}", cli.mode))?;
    let selection: FrameSelection = cli
        .selection
        .parse()
        .map_err(|_| anyhow::anyhow!("unknown frame selection: {}", cli.selection))?;
    if cli.parallel && !cfg!(feature = "parallel") {
        warn!("--parallel requested but built without feature `parallel`; decoding sequentially");
    }
    let cfg = PackerConfig {
        max_columns: cli.columns,
        step: cli.step,
        color_mode,
        selection,
        parallel: cli.parallel,
    };
    // Config file sets sheet options en bloc
    let cfg = match &cli.config {
        Some(path) => {
            let file = fs::read_to_string(path)
                .with_context(|| format!("read config {}", path.display()))?;
            let y: YamlConfig = serde_yaml::from_str(&file)?;
            y.into_packer_config(cfg)?
        }
        None => cfg,
    };
    cfg.validate()?;
    Ok(cfg)
}

/// Checks the output path before any frame is decoded.
///
/// Returns the explicit image format, or `None` when it comes from the extension.
fn check_output(path: &Path, format: &str) -> anyhow::Result<Option<ImageFormat>> {
    if path.as_os_str().is_empty() {
        anyhow::bail!("Must provide output path");
    }

    let format = if format.eq_ignore_ascii_case("auto") {
        if ImageFormat::from_path(path).is_err() {
            anyhow::bail!(
                "Automatic image format not supported for path: '{}'",
                path.display()
            );
        }
        None
    } else {
        let f = ImageFormat::from_extension(format.to_ascii_lowercase())
            .ok_or_else(|| anyhow::anyhow!("unknown image format: {}", format))?;
        Some(f)
    };

    let parent = match path.parent() {
        Some(p) if !p.as_os_str().is_empty() => p,
        _ => Path::new("."),
    };
    check_dir_writable(parent).with_context(|| {
        format!(
            "Permission denied (cannot write output file): '{}'",
            path.display()
        )
    })?;
    Ok(format)
}

/// Creates and removes a scratch file in `dir`; mode bits alone miss ownership and ACLs.
fn check_dir_writable(dir: &Path) -> std::io::Result<()> {
    let scratch = dir.join(format!(".sprite-sheet-write-check-{}", std::process::id()));
    fs::OpenOptions::new()
        .write(true)
        .create_new(true)
        .open(&scratch)?;
    fs::remove_file(&scratch)
}

/// Metadata goes next to the sheet as `<stem>.json`; it must not replace the sheet itself.
fn metadata_path(output: &Path) -> anyhow::Result<PathBuf> {
    let json_path = output.with_extension("json");
    if json_path == output {
        anyhow::bail!(
            "metadata file would overwrite the sprite sheet: '{}'",
            output.display()
        );
    }
    Ok(json_path)
}

fn parse_tile(s: &str) -> anyhow::Result<TileSize> {
    let (w, h) = s
        .split_once(['x', 'X'])
        .ok_or_else(|| anyhow::anyhow!("tile size must look like WxH, got '{}'", s))?;
    Ok(TileSize::new(
        w.trim().parse().with_context(|| format!("tile width '{w}'"))?,
        h.trim().parse().with_context(|| format!("tile height '{h}'"))?,
    ))
}

fn pack_with_progress(packer: SheetPacker, progress: bool) -> anyhow::Result<PackOutput> {
    use indicatif::{ProgressBar, ProgressStyle};
    let bar = if progress {
        let b = ProgressBar::new_spinner();
        b.set_style(ProgressStyle::with_template(
            "{spinner:.green} packing {msg} [{elapsed_precise}]",
        )?);
        b.set_message(format!("{} paths", packer.paths().len()));
        b.enable_steady_tick(Duration::from_millis(100));
        Some(b)
    } else {
        None
    };
    let result = packer.pack();
    if let Some(b) = &bar {
        b.finish_and_clear();
    }
    Ok(result?)
}

fn gather_paths(
    inputs: &[PathBuf],
    include: &[String],
    exclude: &[String],
) -> anyhow::Result<Vec<PathBuf>> {
    // Build glob matchers
    let mut inc_set = None;
    if !include.is_empty() {
        let mut b = GlobSetBuilder::new();
        for pat in include {
            b.add(Glob::new(pat)?);
        }
        inc_set = Some(b.build()?);
    }
    let mut exc_set = None;
    if !exclude.is_empty() {
        let mut b = GlobSetBuilder::new();
        for pat in exclude {
            b.add(Glob::new(pat)?);
        }
        exc_set = Some(b.build()?);
    }
    let mut list: Vec<PathBuf> = Vec::new();
    for path in inputs {
        if path.is_dir() {
            for entry in WalkDir::new(path)
                .sort_by_file_name()
                .into_iter()
                .filter_map(|e| e.ok())
            {
                let p = entry.path();
                if p.is_file()
                    && !should_skip(p, inc_set.as_ref(), exc_set.as_ref())
                    && is_image(p)
                {
                    list.push(p.to_path_buf());
                }
            }
        } else {
            // explicit files keep their position, even if missing: the core reports them
            list.push(path.clone());
        }
    }
    Ok(list)
}

fn should_skip(
    p: &Path,
    include: Option<&globset::GlobSet>,
    exclude: Option<&globset::GlobSet>,
) -> bool {
    let s = p.to_string_lossy().replace('\\', "/");
    if let Some(ex) = exclude {
        if ex.is_match(&s) {
            return true;
        }
    }
    if let Some(inc) = include {
        if !inc.is_match(&s) {
            return true;
        }
    }
    false
}

fn is_image(p: &Path) -> bool {
    matches!(
        p.extension()
            .and_then(|e| e.to_str())
            .map(|s| s.to_ascii_lowercase()),
        Some(ext) if matches!(ext.as_str(), "png" | "jpg" | "jpeg" | "bmp" | "tga" | "gif" | "tif" | "tiff" | "webp" | "exr")
    )
}

fn init_tracing_with_level(quiet: bool, verbose: u8) {
    let level = if quiet {
        "error".to_string()
    } else {
        match verbose {
            0 => "info".into(),
            1 => "debug".into(),
            _ => "trace".into(),
        }
    };
    let _ = tracing_subscriber::fmt()
        .with_env_filter(level)
        .with_target(false)
        .try_init();
}

#[derive(Debug, Deserialize, Default)]
struct YamlConfig {
    max_columns: Option<u32>,
    columns: Option<u32>,
    step: Option<usize>,
    mode: Option<String>,
    selection: Option<String>,
    parallel: Option<bool>,
}

impl YamlConfig {
    fn into_packer_config(self, mut cfg: PackerConfig) -> anyhow::Result<PackerConfig> {
        if let Some(v) = self.max_columns.or(self.columns) {
            cfg.max_columns = v;
        }
        if let Some(v) = self.step {
            cfg.step = v;
        }
        if let Some(v) = self.mode {
            cfg.color_mode = v
                .parse()
                .map_err(|_| anyhow::anyhow!("unknown color mode in config: {}", v))?;
        }
        if let Some(v) = self.selection {
            cfg.selection = v
                .parse()
                .map_err(|_| anyhow::anyhow!("unknown frame selection in config: {}", v))?;
        }
        if let Some(v) = self.parallel {
            cfg.parallel = v;
        }
        Ok(cfg)
    }
}
