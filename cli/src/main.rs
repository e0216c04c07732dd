//! pdfgrid CLI - ruled table extraction tool

use std::fs;
use std::path::{Path, PathBuf};

use clap::{Args, Parser, Subcommand, ValueEnum};
use colored::Colorize;

use pdfgrid::{
    extract_tables_from_file, JsonFormat, LopdfSource, PageSelection, PageSource, PageTables,
    RenderOptions, TableExtractor, YAxis,
};

type CliResult = Result<(), Box<dyn std::error::Error>>;

#[derive(Parser)]
#[command(name = "pdfgrid")]
#[command(version)]
#[command(about = "Extract ruled tables from PDF files", long_about = None)]
struct Cli {
    /// Input PDF file (prints Markdown when no subcommand is given)
    #[arg(value_name = "FILE")]
    input: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Extract tables as JSON
    Json {
        #[command(flatten)]
        extract: ExtractArgs,

        /// Output file (stdout if not specified)
        #[arg(short, long, value_name = "FILE")]
        output: Option<PathBuf>,

        /// Output compact JSON
        #[arg(long)]
        compact: bool,
    },

    /// Extract tables as Markdown
    #[command(alias = "md")]
    Markdown {
        #[command(flatten)]
        extract: ExtractArgs,

        /// Output file (stdout if not specified)
        #[arg(short, long, value_name = "FILE")]
        output: Option<PathBuf>,

        /// Rendering of tables with merged cells
        #[arg(long, value_enum, default_value = "markdown")]
        table_mode: TableMode,

        /// Omit the per-page headings
        #[arg(long)]
        no_page_headings: bool,
    },

    /// Extract tables as tab-separated text
    Text {
        #[command(flatten)]
        extract: ExtractArgs,

        /// Output file (stdout if not specified)
        #[arg(short, long, value_name = "FILE")]
        output: Option<PathBuf>,
    },

    /// Show the rulers, regions and tables found on one page
    Inspect {
        /// Input PDF file
        #[arg(value_name = "FILE")]
        input: PathBuf,

        /// Page to inspect (1-indexed)
        #[arg(short, long, default_value_t = 1)]
        page: u32,

        #[command(flatten)]
        tuning: TuningArgs,
    },

    /// Show version information
    Version,
}

/// Input selection shared by the extraction commands.
#[derive(Args)]
struct ExtractArgs {
    /// Input PDF file
    #[arg(value_name = "FILE")]
    input: PathBuf,

    /// Page range (e.g., "1-10", "1,3,5")
    #[arg(long)]
    pages: Option<String>,

    /// Fail on the first unreadable page instead of skipping it
    #[arg(long)]
    strict: bool,

    #[command(flatten)]
    tuning: TuningArgs,
}

/// Geometry tolerances.
#[derive(Args)]
struct TuningArgs {
    /// Maximum thickness of a ruling line
    #[arg(long, default_value_t = 2.0, env = "PDFGRID_LINE_MAX_WIDTH")]
    line_max_width: f32,

    /// Largest gap bridged when joining collinear segments
    #[arg(long, default_value_t = 5.0)]
    gap_tolerance: f32,

    /// Distance within which a segment end counts as reaching a ruler
    #[arg(long, default_value_t = 5.0)]
    snap_tolerance: f32,

    /// Page coordinates grow downward (origin at the top-left)
    #[arg(long)]
    y_down: bool,
}

impl Default for TuningArgs {
    fn default() -> Self {
        let defaults = pdfgrid::ExtractOptions::default();
        Self {
            line_max_width: defaults.line_max_width,
            gap_tolerance: defaults.gap_tolerance,
            snap_tolerance: defaults.snap_tolerance,
            y_down: defaults.y_axis == YAxis::Down,
        }
    }
}

impl TuningArgs {
    fn options(&self) -> pdfgrid::ExtractOptions {
        pdfgrid::ExtractOptions::new()
            .with_line_max_width(self.line_max_width)
            .with_gap_tolerance(self.gap_tolerance)
            .with_snap_tolerance(self.snap_tolerance)
            .with_y_axis(if self.y_down { YAxis::Down } else { YAxis::Up })
    }
}

impl ExtractArgs {
    fn options(&self) -> Result<pdfgrid::ExtractOptions, Box<dyn std::error::Error>> {
        let mut options = self.tuning.options();
        if let Some(p) = &self.pages {
            options = options.with_pages(p.parse::<PageSelection>()?);
        }
        if !self.strict {
            options = options.lenient();
        }
        Ok(options)
    }

    fn run(&self) -> Result<Vec<PageTables>, Box<dyn std::error::Error>> {
        let pages = extract_tables_from_file(&self.input, &self.options()?)?;
        let count: usize = pages.iter().map(|p| p.tables.len()).sum();
        log::info!("{}: {} tables", self.input.display(), count);
        Ok(pages)
    }
}

#[derive(Copy, Clone, PartialEq, Eq, ValueEnum)]
enum TableMode {
    /// Pipe tables, merged cells left blank
    Markdown,
    /// HTML tables with rowspan/colspan
    Html,
}

impl From<TableMode> for pdfgrid::TableFallback {
    fn from(mode: TableMode) -> Self {
        match mode {
            TableMode::Markdown => pdfgrid::TableFallback::Markdown,
            TableMode::Html => pdfgrid::TableFallback::Html,
        }
    }
}

fn main() {
    env_logger::init();

    let cli = Cli::parse();

    let result = match cli.command {
        Some(Commands::Json {
            extract,
            output,
            compact,
        }) => cmd_json(&extract, output.as_deref(), compact),
        Some(Commands::Markdown {
            extract,
            output,
            table_mode,
            no_page_headings,
        }) => cmd_markdown(&extract, output.as_deref(), table_mode, !no_page_headings),
        Some(Commands::Text { extract, output }) => cmd_text(&extract, output.as_deref()),
        Some(Commands::Inspect {
            input,
            page,
            tuning,
        }) => cmd_inspect(&input, page, &tuning),
        Some(Commands::Version) => {
            cmd_version();
            Ok(())
        }
        None => {
            if let Some(input) = cli.input {
                let extract = ExtractArgs {
                    input,
                    pages: None,
                    strict: false,
                    tuning: TuningArgs::default(),
                };
                cmd_markdown(&extract, None, TableMode::Markdown, true)
            } else {
                println!("{}", "Usage: pdfgrid <FILE>".yellow());
                println!("       pdfgrid --help for more information");
                Ok(())
            }
        }
    };

    if let Err(e) = result {
        eprintln!("{}: {}", "Error".red().bold(), e);
        std::process::exit(1);
    }
}

fn write_output(output: Option<&Path>, content: &str) -> CliResult {
    if let Some(path) = output {
        fs::write(path, content)?;
        println!("{} {}", "Saved to".green(), path.display());
    } else {
        println!("{}", content);
    }
    Ok(())
}

fn cmd_json(extract: &ExtractArgs, output: Option<&Path>, compact: bool) -> CliResult {
    let pages = extract.run()?;

    let format = if compact {
        JsonFormat::Compact
    } else {
        JsonFormat::Pretty
    };

    let json = pdfgrid::render::to_json(&pages, format)?;
    write_output(output, &json)
}

fn cmd_markdown(
    extract: &ExtractArgs,
    output: Option<&Path>,
    table_mode: TableMode,
    page_headings: bool,
) -> CliResult {
    let pages = extract.run()?;

    let render_options = RenderOptions::new()
        .with_table_fallback(table_mode.into())
        .with_page_headings(page_headings);

    let markdown = pdfgrid::render::to_markdown(&pages, &render_options)?;
    write_output(output, &markdown)
}

fn cmd_text(extract: &ExtractArgs, output: Option<&Path>) -> CliResult {
    let pages = extract.run()?;
    let text = pdfgrid::render::to_text(&pages)?;
    write_output(output, &text)
}

fn cmd_inspect(input: &Path, page: u32, tuning: &TuningArgs) -> CliResult {
    let source = LopdfSource::load_file(input)?;
    let content = source.page_content(page)?;
    let analysis =
        TableExtractor::new(tuning.options()).analyze(&content.operations, &content.fragments);

    println!("{}", "Page Analysis".cyan().bold());
    println!("{}", "─".repeat(40).dimmed());
    println!("{}: {}", "File".bold(), input.display());
    println!(
        "{}: {} of {} (PDF {})",
        "Page".bold(),
        page,
        source.page_count(),
        source.version()
    );
    println!("{}: {}", "Operations".bold(), content.operations.len());
    println!("{}: {}", "Text fragments".bold(), content.fragments.len());
    println!("{}: {}", "Edges".bold(), analysis.edges.len());

    println!();
    println!("{}", "Rulers".cyan().bold());
    println!("{}", "─".repeat(40).dimmed());
    for (label, rulers) in [
        ("x", &analysis.rulers.vertical),
        ("y", &analysis.rulers.horizontal),
    ] {
        for ruler in rulers.iter() {
            let spans: Vec<String> = ruler
                .intervals
                .iter()
                .map(|iv| format!("{:.1}..{:.1}", iv.start, iv.end))
                .collect();
            println!("  {}={:<8.1} {}", label, ruler.position, spans.join(" ").dimmed());
        }
    }

    println!();
    println!("{}", "Regions".cyan().bold());
    println!("{}", "─".repeat(40).dimmed());
    for (i, region) in analysis.regions.iter().enumerate() {
        let b = &region.bbox;
        println!(
            "  #{} ({:.1}, {:.1})-({:.1}, {:.1}) {:.1}x{:.1}, {}x{} cells",
            i + 1,
            b.x_min,
            b.y_min,
            b.x_max,
            b.y_max,
            b.width(),
            b.height(),
            region.row_count(),
            region.column_count()
        );
    }

    println!();
    println!("{}", "Tables".cyan().bold());
    println!("{}", "─".repeat(40).dimmed());
    for (i, table) in analysis.tables.iter().enumerate() {
        println!(
            "  #{} {} rows x {} columns, {} merged cells",
            i + 1,
            table.row_count(),
            table.column_count(),
            table.merges.len()
        );
        for m in &table.merges {
            println!(
                "     {} row {} col {} spans {}x{}",
                "├─".dimmed(),
                m.row,
                m.col,
                m.height,
                m.width
            );
        }
    }

    Ok(())
}

fn cmd_version() {
    println!("{} {}", "pdfgrid".cyan().bold(), env!("CARGO_PKG_VERSION"));
    println!("Ruled table extraction from PDF pages");
    println!();
    println!("License: MIT");
}
