//! fieldrecon CLI - reconstruct dense fields from sparse sensor readings

mod synthetic;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use indicatif::{ProgressBar, ProgressStyle};
use std::path::{Path, PathBuf};
use std::time::Instant;
use tracing::{debug, info, Level};
use tracing_subscriber::FmtSubscriber;

use fieldrecon_algorithms::evaluation::{absolute_error, compare_fields};
use fieldrecon_algorithms::interpolation::{KnnInterpolator, ObservationSet, Support};
use fieldrecon_colormap::{auto_params, save_panels, shared_params, ColorScheme, Panel};
use fieldrecon_core::io::{read_field, write_field};
use fieldrecon_core::Field;

// ─── CLI structure ──────────────────────────────────────────────────────

#[derive(Parser)]
#[command(name = "fieldrecon")]
#[command(author, version, about = "Reconstruct dense fields from sparse observations", long_about = None)]
struct Cli {
    /// Verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Show information about a field file
    Info {
        /// Input field file
        input: PathBuf,
    },
    /// Generate a synthetic temperature field and its sensor readings
    Synthesize {
        /// Output file for the full (ground truth) field
        truth: PathBuf,
        /// Output file for the observed field (zero away from sensors)
        observed: PathBuf,
        /// Grid rows
        #[arg(long, default_value = "200")]
        rows: usize,
        /// Grid columns
        #[arg(long, default_value = "200")]
        cols: usize,
        /// Sensor spacing in cells
        #[arg(short, long, default_value = "10")]
        stride: usize,
        /// Background temperature
        #[arg(short, long, default_value = "298")]
        base: f64,
    },
    /// List the nearest observations of one cell and their weights
    Neighbors {
        /// Observed field file
        input: PathBuf,
        /// Query row
        #[arg(long)]
        row: usize,
        /// Query column
        #[arg(long)]
        col: usize,
        /// Number of neighbors
        #[arg(short, default_value = "5")]
        k: usize,
        /// Which cells are observations: nonzero, valid
        #[arg(long, default_value = "nonzero")]
        support: String,
    },
    /// Reconstruct a dense field with k-nearest-neighbor interpolation
    Reconstruct {
        /// Observed field file
        input: PathBuf,
        /// Output file for the reconstructed field
        output: PathBuf,
        /// Number of neighbors combined per cell
        #[arg(short, default_value = "5")]
        k: usize,
        /// Which cells are observations: nonzero, valid
        #[arg(long, default_value = "nonzero")]
        support: String,
        /// Ground-truth field to score the reconstruction against
        #[arg(long)]
        truth: Option<PathBuf>,
        /// Save a PNG figure (truth, reconstruction, absolute error)
        #[arg(long)]
        plot: Option<PathBuf>,
        /// Color scheme for the figure: jet, heat, blue-white-red, grayscale
        #[arg(long, default_value = "jet")]
        scheme: String,
        /// Pixels per cell in the figure
        #[arg(long, default_value = "2")]
        scale: u32,
    },
}

// ─── Helpers ────────────────────────────────────────────────────────────

fn setup_logging(verbose: bool) {
    let level = if verbose { Level::DEBUG } else { Level::INFO };
    let subscriber = FmtSubscriber::builder()
        .with_max_level(level)
        .with_target(false)
        .finish();
    tracing::subscriber::set_global_default(subscriber).expect("setting default subscriber failed");
}

fn spinner(msg: &str) -> ProgressBar {
    let pb = ProgressBar::new_spinner();
    pb.set_style(
        ProgressStyle::default_spinner()
            .template("{spinner:.green} {msg}")
            .unwrap(),
    );
    pb.set_message(msg.to_string());
    pb.enable_steady_tick(std::time::Duration::from_millis(100));
    pb
}

fn read_input(path: &Path) -> Result<Field<f64>> {
    let pb = spinner("Reading field...");
    let field: Field<f64> = read_field(path)
        .with_context(|| format!("Failed to read field {}", path.display()))?;
    pb.finish_and_clear();
    info!("Input: {} x {}", field.cols(), field.rows());
    Ok(field)
}

fn write_output(field: &Field<f64>, path: &Path) -> Result<()> {
    let pb = spinner("Writing output...");
    write_field(field, path).with_context(|| format!("Failed to write {}", path.display()))?;
    pb.finish_and_clear();
    Ok(())
}

fn done(name: &str, path: &Path, elapsed: std::time::Duration) {
    println!("{} saved to: {}", name, path.display());
    println!("  Processing time: {:.2?}", elapsed);
}

fn parse_support(s: &str) -> Result<Support> {
    match s.to_lowercase().as_str() {
        "nonzero" | "non-zero" => Ok(Support::NonZero),
        "valid" | "all" => Ok(Support::Valid),
        _ => anyhow::bail!("Unknown support: {}. Use nonzero or valid.", s),
    }
}

fn parse_scheme(s: &str) -> Result<ColorScheme> {
    ColorScheme::from_name(s).ok_or_else(|| {
        let names: Vec<&str> = ColorScheme::ALL.iter().map(ColorScheme::name).collect();
        anyhow::anyhow!("Unknown color scheme: {}. Use one of: {}.", s, names.join(", "))
    })
}

fn build_interpolator(observed: &Field<f64>, support: Support, k: usize) -> Result<KnnInterpolator> {
    let interp = KnnInterpolator::from_field(observed, support, k)
        .context("Failed to set up interpolation")?;
    info!(
        "Observations: {} (k = {}, using {})",
        interp.observations().len(),
        interp.k(),
        interp.effective_k()
    );
    Ok(interp)
}

fn save_figure(
    predicted: &Field<f64>,
    truth: Option<&Field<f64>>,
    scheme: ColorScheme,
    scale: u32,
    path: &Path,
) -> Result<()> {
    let pb = spinner("Rendering figure...");
    let saved = match truth {
        Some(truth) => {
            let error = absolute_error(predicted, truth)?;
            let shared = shared_params(&[truth, predicted], scheme);
            debug!("Figure range: {:.3} .. {:.3}", shared.min, shared.max);
            let panels = [
                Panel::new(truth, shared.clone()),
                Panel::new(predicted, shared),
                Panel::new(&error, auto_params(&error, ColorScheme::Heat)),
            ];
            save_panels(&panels, scale, path)
        }
        None => save_panels(&[Panel::new(predicted, auto_params(predicted, scheme))], scale, path),
    };
    saved.with_context(|| format!("Failed to save figure {}", path.display()))?;
    pb.finish_and_clear();
    println!("Figure saved to: {}", path.display());
    Ok(())
}

// ─── Main ───────────────────────────────────────────────────────────────

fn main() -> Result<()> {
    let cli = Cli::parse();
    setup_logging(cli.verbose);

    match cli.command {
        Commands::Info { input } => {
            let field = read_input(&input)?;
            let (rows, cols) = field.shape();
            let stats = field.statistics();

            println!("File: {}", input.display());
            println!("Dimensions: {} x {} ({} cells)", cols, rows, field.len());
            if let Some(nodata) = field.nodata() {
                println!("NoData: {}", nodata);
            }
            println!("\nStatistics:");
            if let Some(min) = stats.min {
                println!("  Min: {:.4}", min);
            }
            if let Some(max) = stats.max {
                println!("  Max: {:.4}", max);
            }
            if let Some(mean) = stats.mean {
                println!("  Mean: {:.4}", mean);
            }
            println!(
                "  Valid cells: {} ({:.1}%)",
                stats.valid_count,
                100.0 * stats.valid_count as f64 / field.len().max(1) as f64
            );
            println!(
                "  Non-zero cells (observations): {}",
                ObservationSet::from_field(&field, Support::NonZero).len()
            );
        }

        Commands::Synthesize {
            truth,
            observed,
            rows,
            cols,
            stride,
            base,
        } => {
            let start = Instant::now();
            let field = synthetic::temperature_field(rows, cols, base)
                .context("Failed to generate field")?;
            let sensors =
                synthetic::sample_sensors(&field, stride).context("Failed to place sensors")?;
            let elapsed = start.elapsed();
            info!(
                "Sensors: {}",
                ObservationSet::from_field(&sensors, Support::NonZero).len()
            );
            write_output(&field, &truth)?;
            write_output(&sensors, &observed)?;
            done("Truth", &truth, elapsed);
            done("Observed", &observed, elapsed);
        }

        Commands::Neighbors {
            input,
            row,
            col,
            k,
            support,
        } => {
            let support = parse_support(&support)?;
            let observed = read_input(&input)?;
            let interp = build_interpolator(&observed, support, k)?;

            println!("Nearest observations to ({}, {}):", row, col);
            println!(
                "  {:>5} {:>6} {:>6} {:>12} {:>10} {:>10}",
                "index", "row", "col", "value", "distance", "weight"
            );
            for n in interp.neighbors(row, col) {
                println!(
                    "  {:>5} {:>6} {:>6} {:>12.4} {:>10.4} {:>10.6}",
                    n.index, n.row, n.col, n.value, n.distance, n.weight
                );
            }
        }

        Commands::Reconstruct {
            input,
            output,
            k,
            support,
            truth,
            plot,
            scheme,
            scale,
        } => {
            let support = parse_support(&support)?;
            let scheme = parse_scheme(&scheme)?;
            let observed = read_input(&input)?;
            let truth = truth.as_deref().map(read_input).transpose()?;

            let interp = build_interpolator(&observed, support, k)?;
            let start = Instant::now();
            let predicted = interp.predict().context("Failed to reconstruct field")?;
            let elapsed = start.elapsed();
            write_output(&predicted, &output)?;
            done("Reconstruction", &output, elapsed);

            if let Some(truth) = &truth {
                let stats = compare_fields(&predicted, truth)
                    .context("Failed to score reconstruction")?;
                println!("mae: {:.6}", stats.mae);
                println!(
                    "  RMSE: {:.6}, Max error: {:.6}, Bias: {:.6} ({} cells)",
                    stats.rmse, stats.max_abs_err, stats.mean_bias, stats.n
                );
            }

            if let Some(plot) = &plot {
                save_figure(&predicted, truth.as_ref(), scheme, scale, plot)?;
            }
        }
    }

    Ok(())
}
