use std::path::PathBuf;

use anyhow::Context as _;
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "storyframe", version)]
struct Cli {
    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Composite a photo under a frame and write the PNG.
    Compose(ComposeArgs),
    /// Write the chroma-keyed frame on its own.
    Key(KeyArgs),
}

#[derive(Parser, Debug)]
struct ComposeArgs {
    /// Frame image: path, `file://` URL or `data:` URL.
    #[arg(long)]
    frame: String,

    /// User photo: path, `file://` URL or `data:` URL.
    #[arg(long)]
    photo: Option<String>,

    /// Session script JSON replayed before export.
    #[arg(long)]
    script: Option<PathBuf>,

    /// Engine config JSON.
    #[arg(long)]
    config: Option<PathBuf>,

    /// Output PNG path.
    #[arg(long, default_value = storyframe::DEFAULT_EXPORT_FILE_NAME)]
    out: PathBuf,

    /// Print the final photo transform as JSON on stdout.
    #[arg(long, default_value_t = false)]
    print_transform: bool,
}

#[derive(Parser, Debug)]
struct KeyArgs {
    /// Frame image: path, `file://` URL or `data:` URL.
    #[arg(long)]
    frame: String,

    /// Output PNG path.
    #[arg(long)]
    out: PathBuf,

    /// Channel values below this become transparent.
    #[arg(long, default_value_t = storyframe::DEFAULT_KEY_THRESHOLD)]
    threshold: u8,
}

fn main() -> anyhow::Result<()> {
    init_tracing();
    let cli = Cli::parse();
    match cli.cmd {
        Command::Compose(args) => cmd_compose(args),
        Command::Key(args) => cmd_key(args),
    }
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("storyframe=info"));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init();
}

fn cmd_compose(args: ComposeArgs) -> anyhow::Result<()> {
    let config = match &args.config {
        Some(path) => storyframe::EngineConfig::load(path)?,
        None => storyframe::EngineConfig::default(),
    };
    let script = args
        .script
        .as_deref()
        .map(storyframe::SessionScript::load)
        .transpose()?;

    let mut engine = storyframe::FrameEngine::new(config)?;
    engine.mount_surface()?;

    let frame = storyframe::AssetSource::parse(&args.frame)?;
    engine.set_frame_source(frame);
    if let Some(photo) = &args.photo {
        engine.set_user_photo(Some(storyframe::AssetSource::parse(photo)?));
    }
    engine.wait_for_loads();

    if !engine.has_frame() {
        anyhow::bail!("frame '{}' could not be loaded", args.frame);
    }
    if args.photo.is_some() && !engine.has_photo() {
        anyhow::bail!("photo could not be loaded");
    }

    if let Some(script) = &script {
        script.apply(&mut engine);
    }

    let exported = engine
        .export_composite()?
        .context("no drawing surface mounted")?;
    exported.write_to_path(&args.out)?;

    if args.print_transform {
        let json = serde_json::to_string_pretty(&engine.transform())
            .context("serialize photo transform")?;
        println!("{json}");
    }

    eprintln!("wrote {}", args.out.display());
    Ok(())
}

fn cmd_key(args: KeyArgs) -> anyhow::Result<()> {
    let source = storyframe::AssetSource::parse(&args.frame)?;
    let bytes = source.read_bytes()?;
    let processed = storyframe::key_frame(storyframe::decode_rgba8(&bytes)?, args.threshold);
    let (width, height) = processed.image.dimensions();
    let png = storyframe::encode_png(width, height, processed.image.as_raw())?;
    let exported = storyframe::ExportedImage { width, height, png };
    exported.write_to_path(&args.out)?;

    eprintln!(
        "wrote {} ({} transparent pixels)",
        args.out.display(),
        processed.transparent_pixels
    );
    Ok(())
}
