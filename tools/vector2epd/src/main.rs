use anyhow::Context;
use clap::{Parser, ValueEnum};
use flexi_logger::Logger;
use libepdfont::{
    convert, to_epdf_bytes, to_header_string, BitDepth, CodepointInterval, ConvertConfig,
};
use std::fs;
use std::path::PathBuf;

use crate::font_stack::FontStack;

mod font_stack;

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
enum OutputFormat {
    /// C header with static tables
    Header,
    /// EPDF binary
    Binary,
}

#[derive(Parser)]
#[command(version, about = "Converts a font stack into an e-paper bitmap font.")]
struct Cli {
    #[arg(help = "Name of the font, used for the output file and the C symbols.")]
    name: String,

    #[arg(help = "Font size in points at the given dpi.")]
    size: u32,

    #[arg(help = "Font files, ordered by descending priority.", required = true)]
    fontstack: Vec<PathBuf>,

    #[arg(long = "2bit", help = "Generate 2-bit grayscale instead of 1-bit black and white.")]
    two_bit: bool,

    #[arg(
        long = "additional-intervals",
        value_name = "MIN,MAX",
        help = "Additional code point interval to export. Can be repeated."
    )]
    additional_intervals: Vec<CodepointInterval>,

    #[arg(long, help = "Export only the additional intervals.", default_value_t = false)]
    no_default_intervals: bool,

    #[arg(long, help = "Output directory.", default_value = ".")]
    output_dir: PathBuf,

    #[arg(long, value_enum, default_value_t = OutputFormat::Header)]
    format: OutputFormat,

    #[arg(long, help = "Rendering resolution.", default_value_t = 150)]
    dpi: u32,
}

fn main() -> anyhow::Result<()> {
    let args = Cli::parse();
    let _logger = Logger::try_with_env_or_str("info")?.start()?;

    let depth = if args.two_bit {
        BitDepth::TwoBit
    } else {
        BitDepth::OneBit
    };
    let mut config = ConvertConfig::new(depth, args.size);
    if args.no_default_intervals {
        config.requested_intervals.clear();
    }
    let config = config.with_additional_intervals(args.additional_intervals);

    let stack = FontStack::open(&args.fontstack, args.size, args.dpi)
        .context("Could not load font stack")?;
    let font = convert(&config, &stack)?;

    let (file_name, contents) = match args.format {
        OutputFormat::Header => (
            format!("{}.h", args.name),
            to_header_string(&font, &args.name, args.size)?.into_bytes(),
        ),
        OutputFormat::Binary => (format!("{}.epdf", args.name), to_epdf_bytes(&font)?),
    };

    fs::create_dir_all(&args.output_dir)
        .with_context(|| format!("Could not create {}", args.output_dir.display()))?;
    let output = args.output_dir.join(file_name);
    fs::write(&output, &contents).with_context(|| format!("Could not write {}", output.display()))?;

    log::info!("Created {}", output.display());
    log::info!("  glyphs:      {}", font.glyph_count());
    log::info!("  file size:   {:.1} KB", contents.len() as f64 / 1024.0);
    log::info!("  bitmap data: {:.1} KB", font.bitmap_blob.len() as f64 / 1024.0);
    Ok(())
}
