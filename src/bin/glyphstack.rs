use std::path::PathBuf;

use anyhow::Context as _;
use clap::{Parser, Subcommand};
use glyphstack::{
    ActivateOutcome, EditorSettings, LatticeConverter, LayerStore, Project, ProjectState,
    raster::data_url,
};

#[derive(Parser, Debug)]
#[command(name = "glyphstack", version)]
struct Cli {
    /// Log debug output to stderr.
    #[arg(long, short, global = true)]
    verbose: bool,

    /// Editor settings JSON. Missing files fall back to defaults.
    #[arg(long, global = true)]
    settings: Option<PathBuf>,

    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Convert an image to ASCII art text.
    Convert(ConvertArgs),
    /// Build a project with one ASCII layer per input image.
    New(NewArgs),
    /// Export a project file as a standalone HTML page.
    Export(ExportArgs),
}

#[derive(Parser, Debug)]
struct ConvertArgs {
    /// Input image (PNG, JPEG, GIF, ...).
    #[arg(long = "in")]
    in_path: PathBuf,

    /// Lattice width in characters.
    #[arg(long, default_value_t = glyphstack::lattice::convert::DEFAULT_RESOLUTION)]
    resolution: u32,

    /// Emit styled markup instead of bare glyphs.
    #[arg(long)]
    styled: bool,

    /// Output text file; stdout when omitted.
    #[arg(long)]
    out: Option<PathBuf>,
}

#[derive(Parser, Debug)]
struct NewArgs {
    /// Source images, bottom layer first.
    #[arg(long = "image", required = true)]
    images: Vec<PathBuf>,

    /// Output project JSON.
    #[arg(long)]
    out: PathBuf,

    /// Lattice width in characters.
    #[arg(long, default_value_t = glyphstack::lattice::convert::DEFAULT_RESOLUTION)]
    resolution: u32,

    /// Project name.
    #[arg(long)]
    name: Option<String>,
}

#[derive(Parser, Debug)]
struct ExportArgs {
    /// Input project JSON.
    #[arg(long = "in")]
    in_path: PathBuf,

    /// Output HTML path.
    #[arg(long)]
    out: PathBuf,

    /// Force the parallax script on.
    #[arg(long)]
    parallax: bool,

    /// Leave out the generator badge regardless of settings.
    #[arg(long)]
    no_generator_link: bool,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_max_level(if cli.verbose {
            tracing::Level::DEBUG
        } else {
            tracing::Level::WARN
        })
        .init();

    let settings = match &cli.settings {
        Some(path) => EditorSettings::load(path)
            .with_context(|| format!("load settings '{}'", path.display()))?,
        None => EditorSettings::default(),
    };

    match cli.cmd {
        Command::Convert(args) => cmd_convert(args),
        Command::New(args) => cmd_new(args, &settings),
        Command::Export(args) => cmd_export(args, &settings),
    }
}

fn cmd_convert(args: ConvertArgs) -> anyhow::Result<()> {
    let bytes = std::fs::read(&args.in_path)
        .with_context(|| format!("read image '{}'", args.in_path.display()))?;
    let lattice = LatticeConverter::with_resolution(args.resolution)
        .convert_bytes(&bytes)
        .with_context(|| format!("convert '{}'", args.in_path.display()))?;

    let text = if args.styled {
        glyphstack::to_styled_text(&lattice)
    } else {
        let mut plain = glyphstack::to_plain_text(&lattice);
        plain.push('\n');
        plain
    };

    match &args.out {
        Some(path) => std::fs::write(path, text)
            .with_context(|| format!("write '{}'", path.display()))?,
        None => print!("{text}"),
    }
    Ok(())
}

fn cmd_new(args: NewArgs, settings: &EditorSettings) -> anyhow::Result<()> {
    let store = LayerStore::new().with_save_preference(settings.auto_save_on_layer_change);
    let mut project = Project::new(store);
    if args.name.is_some() {
        project.name = args.name;
    }

    for path in &args.images {
        let mime = path
            .extension()
            .and_then(|ext| ext.to_str())
            .and_then(data_url::mime_for_extension);
        anyhow::ensure!(mime.is_some(), "unsupported image type '{}'", path.display());
        let bytes =
            std::fs::read(path).with_context(|| format!("read image '{}'", path.display()))?;
        let (id, outcome) = project.store.create_ascii_layer(args.resolution);
        anyhow::ensure!(
            outcome == ActivateOutcome::Activated,
            "layer {id} could not be activated: {outcome:?}"
        );
        project
            .store
            .set_lattice_from_image(id, &bytes, Some(args.resolution))
            .with_context(|| format!("convert '{}'", path.display()))?;
        if let Some(stem) = path.file_stem() {
            project.store.rename(stem.to_string_lossy());
        }
        project.store.commit();
    }

    project
        .serialize()
        .save(&args.out)
        .with_context(|| format!("write project '{}'", args.out.display()))?;
    tracing::info!(layers = args.images.len(), out = %args.out.display(), "project written");
    Ok(())
}

fn cmd_export(args: ExportArgs, settings: &EditorSettings) -> anyhow::Result<()> {
    let state = ProjectState::from_path(&args.in_path)?;
    let mut project = Project::default();
    project.hydrate(state)?;
    if args.parallax {
        project.parallax_enabled = true;
    }

    let include_link = settings.include_generator_link && !args.no_generator_link;
    let html = project
        .export_html(include_link)
        .with_context(|| format!("export '{}'", args.in_path.display()))?;
    std::fs::write(&args.out, html)
        .with_context(|| format!("write '{}'", args.out.display()))?;
    Ok(())
}
