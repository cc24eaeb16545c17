// ABOUTME: Main entry point for the big-deck program.
// ABOUTME: Provides CLI interface and executes commands from the library.

use big_deck::{Canvas, Config, PrintRenderer, ThemeEngine};
use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// List the pages of a deck
    Info(InfoArgs),

    /// Export every page of a deck as an image
    Export(ExportArgs),

    /// Print a deck to a text handout
    Print(PrintArgs),

    /// Watch a deck and re-export its pages on every change
    Watch(WatchArgs),

    /// List the built-in themes
    Themes,
}

#[derive(Args)]
struct InfoArgs {
    /// Path to the markdown deck
    #[arg(short, long)]
    input: PathBuf,
}

#[derive(Args)]
struct ExportArgs {
    /// Path to the markdown deck
    #[arg(short, long)]
    input: PathBuf,

    /// Directory for the exported images
    #[arg(short, long)]
    output: PathBuf,

    /// File name prefix for each image
    #[arg(long)]
    basename: Option<String>,

    /// Image type (png, jpg, bmp, ...)
    #[arg(long = "type")]
    image_type: Option<String>,

    /// Surface width in pixels
    #[arg(long)]
    width: Option<u32>,

    /// Surface height in pixels
    #[arg(long)]
    height: Option<u32>,

    /// Theme to apply
    #[arg(long)]
    theme: Option<String>,

    /// Export the overview thumbnails instead of the pages
    #[arg(long)]
    overview: bool,
}

#[derive(Args)]
struct PrintArgs {
    /// Path to the markdown deck
    #[arg(short, long)]
    input: PathBuf,

    /// Path to the handout file
    #[arg(short, long)]
    output: PathBuf,

    /// Theme to apply
    #[arg(long)]
    theme: Option<String>,
}

#[derive(Args)]
struct WatchArgs {
    /// Path to the markdown deck
    #[arg(short, long)]
    input: PathBuf,

    /// Directory for the exported images
    #[arg(short, long)]
    output: PathBuf,

    /// Theme to apply
    #[arg(long)]
    theme: Option<String>,
}

fn info(args: &InfoArgs, config: &Config) -> anyhow::Result<()> {
    let render = config.get_render_config(None, None, None, None);
    let mut canvas = big_deck::open_deck(&args.input, config.theme.as_deref(), &render)?;

    println!("{}", canvas.title());
    for i in 0..canvas.page_count() {
        canvas.move_to(i);
        println!("{:>3}  {}", i + 1, canvas.page_title());
    }
    Ok(())
}

fn export(args: &ExportArgs, config: &Config) -> anyhow::Result<()> {
    let render = config.get_render_config(
        args.width,
        args.height,
        args.image_type.clone(),
        args.basename.clone(),
    );
    let theme = args.theme.as_deref().or(config.theme.as_deref());
    let mut canvas = big_deck::open_deck(&args.input, theme, &render)?;
    if args.overview {
        canvas.toggle_overview_mode();
    }

    let basename = args.output.join(&render.base_name);
    let report = canvas.save(&basename.to_string_lossy(), &render.format)?;

    if report.cancelled {
        anyhow::bail!("Export cancelled after {} images", report.files.len());
    }
    println!("Exported {} images to {:?}", report.files.len(), args.output);
    Ok(())
}

fn print(args: &PrintArgs, config: &Config) -> anyhow::Result<()> {
    let mut canvas = Canvas::new(PrintRenderer::new(&args.output));
    if let Some(theme) = args.theme.as_deref().or(config.theme.as_deref()) {
        big_deck::BuiltinThemes.validate(theme)?;
        canvas.reload_theme(Some(theme))?;
    }

    let source = big_deck::FileSource::open(&args.input)?;
    canvas.parse_source(Box::new(source));
    if canvas.deck().is_empty() {
        anyhow::bail!("No pages could be parsed from {:?}", args.input);
    }

    let outcome = canvas.print_all()?;
    if outcome.is_cancelled() {
        anyhow::bail!("Printing was cancelled");
    }
    println!("Handout written to {:?}", args.output);
    Ok(())
}

fn main() -> anyhow::Result<()> {
    env_logger::init();
    let cli = Cli::parse();
    let config = Config::from_env();

    let result = match &cli.command {
        Some(Commands::Info(args)) => info(args, &config),
        Some(Commands::Export(args)) => {
            println!("Executing export command...");
            export(args, &config)
        }
        Some(Commands::Print(args)) => {
            println!("Executing print command...");
            print(args, &config)
        }
        Some(Commands::Watch(args)) => {
            println!("Executing watch command...");
            let watch_config =
                config.get_watch_config(args.input.clone(), args.output.clone(), args.theme.clone());
            big_deck::watch_deck(watch_config).map_err(anyhow::Error::from)
        }
        Some(Commands::Themes) => {
            for name in big_deck::theme::builtin_names() {
                println!("{}", name);
            }
            Ok(())
        }
        None => {
            println!("No command specified. Use --help for usage information.");
            Ok(())
        }
    };

    match result {
        Ok(()) => Ok(()),
        Err(e) => {
            eprintln!("Error: {}", e);
            std::process::exit(1);
        }
    }
}
