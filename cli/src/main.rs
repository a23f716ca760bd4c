use clap::{Parser, ValueEnum};
use log::warn;
use oxigraph::io::RdfFormat;
use shapecheck::{validate_file, TextOptions, ValidationOptions, Validator};
use std::path::PathBuf;

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Parser, Debug)]
struct ShapesArgs {
    /// Path to the shapes file
    #[arg(short, long, value_name = "FILE")]
    shapes_file: PathBuf,
}

#[derive(Parser, Debug)]
struct RunArgs {
    /// Validate shapes one after another instead of on a worker pool
    #[arg(long)]
    sequential: bool,

    /// Time budget for each shape, in milliseconds
    #[arg(long, value_name = "MS")]
    timeout_ms: Option<u64>,

    /// Number of worker threads used for parallel validation
    #[arg(long, value_name = "N")]
    max_concurrency: Option<usize>,

    /// Maximum nesting of shape references (logical operators, sh:node, qualified shapes)
    #[arg(long, value_name = "N")]
    max_depth: Option<usize>,
}

impl RunArgs {
    fn options(&self) -> ValidationOptions {
        let mut options = ValidationOptions::default().with_parallel(!self.sequential);
        if let Some(timeout_ms) = self.timeout_ms {
            options = options.with_timeout_ms(timeout_ms);
        }
        if let Some(max_concurrency) = self.max_concurrency {
            options = options.with_max_concurrency(max_concurrency);
        }
        if let Some(max_depth) = self.max_depth {
            options = options.with_max_recursion_depth(max_depth);
        }
        options
    }
}

#[derive(ValueEnum, Clone, Debug, Default)]
enum ValidateOutputFormat {
    #[default]
    Turtle,
    #[value(name = "ntriples")]
    NTriples,
    #[value(name = "rdfxml")]
    RdfXml,
    /// Human-readable summary grouped by focus node
    Summary,
}

#[derive(Parser)]
struct ValidateArgs {
    #[clap(flatten)]
    shapes: ShapesArgs,

    /// Path to the data file
    #[arg(short, long, value_name = "FILE")]
    data_file: PathBuf,

    #[clap(flatten)]
    run: RunArgs,

    /// The output format for the validation report
    #[arg(long, value_enum, default_value_t = ValidateOutputFormat::Turtle)]
    format: ValidateOutputFormat,
}

#[derive(Parser)]
struct GraphvizArgs {
    #[clap(flatten)]
    shapes: ShapesArgs,
}

#[derive(clap::Subcommand)]
enum Commands {
    /// Validate the data against the shapes
    Validate(ValidateArgs),
    /// Output the Graphviz DOT string of the shape reference graph
    Graphviz(GraphvizArgs),
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::init();
    let cli = Cli::parse();

    match cli.command {
        Commands::Validate(args) => {
            let report = validate_file(&args.data_file, &args.shapes.shapes_file, &args.run.options())?;
            for diagnostic in report.diagnostics() {
                warn!("{}", diagnostic);
            }

            let format = match args.format {
                ValidateOutputFormat::Summary => {
                    print!("{}", report.summary());
                    return Ok(());
                }
                ValidateOutputFormat::Turtle => RdfFormat::Turtle,
                ValidateOutputFormat::NTriples => RdfFormat::NTriples,
                ValidateOutputFormat::RdfXml => RdfFormat::RdfXml,
            };
            let report_str = report.to_text(&TextOptions::default().with_format(format))?;
            println!("{}", report_str);
        }
        Commands::Graphviz(args) => {
            let validator = Validator::from_file(&args.shapes.shapes_file, ValidationOptions::default())?;
            println!("{}", validator.to_graphviz());
        }
    }
    Ok(())
}
