use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand, ValueEnum};

use rusty_lab::{
    load_file, CurveFitter, DataTable, ExportFormat, FillMethod, FitResult, NormalizeMethod,
};

/// Clean laboratory measurements, fit curves and export the results.
#[derive(Parser, Debug)]
#[command(name = "rusty-lab", version, about, long_about = None)]
struct Cli {
    /// Measurement file (.csv, .txt, .xlsx, .json or .parquet)
    input: PathBuf,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Show columns, their kinds and missing-value counts
    Summary,
    /// Apply cleaning steps and optionally export the result
    Clean(CleanArgs),
    /// Fit a curve through two columns
    Fit(FitArgs),
}

#[derive(Args, Debug)]
struct CleanArgs {
    /// Remove rows containing a missing value
    #[arg(long)]
    drop_nulls: bool,

    /// Remove repeated rows, keeping the first occurrence
    #[arg(long)]
    drop_duplicates: bool,

    /// Impute missing values
    #[arg(long, value_enum)]
    fill: Option<FillArg>,

    /// Scale columns
    #[arg(long, value_enum)]
    normalize: Option<NormalizeArg>,

    /// Degree for polynomial interpolation
    #[arg(long, default_value_t = 2)]
    degree: usize,

    /// Neighbours for KNN imputation
    #[arg(short, long)]
    k: Option<usize>,

    /// Columns to operate on (default: all)
    #[arg(long, value_delimiter = ',')]
    columns: Vec<String>,

    /// Export destination; the format follows the extension
    #[arg(short, long)]
    output: Option<PathBuf>,
}

#[derive(Args, Debug)]
struct FitArgs {
    #[arg(value_enum)]
    method: FitArg,

    /// Independent variable
    #[arg(long)]
    x: String,

    /// Dependent variable
    #[arg(long)]
    y: String,

    /// Polynomial / interpolation degree
    #[arg(long, default_value_t = 2)]
    degree: usize,

    /// Drop rows with missing values before fitting
    #[arg(long)]
    drop_nulls: bool,

    /// Print a smooth curve of this many points
    #[arg(long)]
    points: Option<usize>,

    /// Emit the full result as JSON
    #[arg(long)]
    json: bool,
}

#[derive(ValueEnum, Clone, Copy, Debug)]
enum FillArg {
    Mean,
    Linear,
    Polynomial,
    Knn,
}

#[derive(ValueEnum, Clone, Copy, Debug)]
enum NormalizeArg {
    MinMax,
    ZScore,
    MaxAbs,
}

#[derive(ValueEnum, Clone, Copy, Debug)]
enum FitArg {
    Linear,
    Polynomial,
    Lagrange,
}

impl From<NormalizeArg> for NormalizeMethod {
    fn from(arg: NormalizeArg) -> Self {
        match arg {
            NormalizeArg::MinMax => NormalizeMethod::MinMax,
            NormalizeArg::ZScore => NormalizeMethod::ZScore,
            NormalizeArg::MaxAbs => NormalizeMethod::MaxAbs,
        }
    }
}

fn main() -> Result<()> {
    env_logger::init();
    let cli = Cli::parse();

    let dataset = load_file(&cli.input)
        .with_context(|| format!("loading {}", cli.input.display()))?;
    let mut table = DataTable::new();
    table.load(dataset);

    match cli.command {
        Command::Summary => print_overview(&table),
        Command::Clean(args) => run_clean(&mut table, args)?,
        Command::Fit(args) => run_fit(&mut table, args)?,
    }

    if !table.log().is_empty() {
        println!("\n{}", table.summary());
    }
    Ok(())
}

fn print_overview(table: &DataTable) {
    let Some(data) = table.current() else {
        return;
    };
    println!("{} rows", data.len());
    for col in data.columns() {
        println!(
            "  {:<24} {:<8} {} missing",
            col.name,
            col.kind().to_string(),
            col.missing_count()
        );
    }
}

fn run_clean(table: &mut DataTable, args: CleanArgs) -> Result<()> {
    if args.drop_nulls {
        let n = table.remove_null_rows()?;
        println!("removed {n} rows with missing values");
    }
    if args.drop_duplicates {
        let n = table.remove_duplicate_rows()?;
        println!("removed {n} duplicate rows");
    }
    if let Some(fill) = args.fill {
        let method = match fill {
            FillArg::Mean => FillMethod::Mean,
            FillArg::Linear => FillMethod::LinearInterp,
            FillArg::Polynomial => FillMethod::PolynomialInterp {
                degree: args.degree,
            },
            FillArg::Knn => FillMethod::Knn { k: args.k },
        };
        let n = table.fill_nulls(args.columns.as_slice(), method)?;
        println!("filled {n} missing values");
    }
    if let Some(norm) = args.normalize {
        let n = table.normalize(args.columns.as_slice(), norm.into())?;
        println!("normalized {n} rows");
    }

    print_overview(table);

    if let Some(output) = args.output {
        let format = ExportFormat::from_path(&output)
            .with_context(|| format!("unknown export format for {}", output.display()))?;
        for path in table.export(&output, format)? {
            println!("wrote {}", path.display());
        }
    }
    Ok(())
}

fn run_fit(table: &mut DataTable, args: FitArgs) -> Result<()> {
    if args.drop_nulls {
        table.remove_null_rows()?;
    }
    let data = table.current().context("no data loaded")?;
    let result = match args.method {
        FitArg::Linear => CurveFitter::linear(data, &args.x, &args.y)?,
        FitArg::Polynomial => CurveFitter::polynomial(data, &args.x, &args.y, args.degree)?,
        FitArg::Lagrange => CurveFitter::lagrange(data, &args.x, &args.y, args.degree)?,
    };

    if args.json {
        println!("{}", serde_json::to_string_pretty(&result)?);
    } else {
        print_fit(&result, args.points);
    }
    Ok(())
}

fn print_fit(result: &FitResult, points: Option<usize>) {
    println!("{} vs {}", result.y_column, result.x_column);
    println!("{}", result.equation);
    println!("R² = {:.4}", result.metrics.r2);
    println!("MAE = {:.4}", result.metrics.mae);
    println!("MSE = {:.4}", result.metrics.mse);

    if let Some(n) = points {
        println!();
        for (x, y) in result.sample_curve(n) {
            println!("{x:.6}\t{y:.6}");
        }
    }
}
