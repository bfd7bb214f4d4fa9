use std::error::Error;
use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Args as ClapArgs, Parser, Subcommand};
use summits::core::{DemSource, DistanceModel, Interpolation, LinearUnit, SummitLayer};
use summits::merge::io::{self as merge_io, merge_layers, MergeConfig, MergeReport};
use summits::merge::{ClusterParams, LinkMode, ReferenceMatchParams};
use summits::pipeline;
use summits::stats::{load_dem, AccuracyParams, LoadedDem, SampleAt};

#[derive(Parser, Debug)]
#[command(name = "summits", about = "Merge DEM summit detections and measure them")]
struct Cli {
    /// Log per-group decisions.
    #[arg(short, long, global = true)]
    verbose: bool,
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Cluster per-DEM candidate layers into merged summits.
    Merge(MergeArgs),
    /// Apply exchange-col and merge-into corrections to a merged set.
    Resolve(ResolveArgs),
    /// Attach surveyed reference summits to merged summits.
    Match(MatchArgs),
    /// Sample summit and col elevations on DEM rasters.
    Prominence(ProminenceArgs),
    /// Compare per-DEM detections against surveyed summits.
    Stats(StatsArgs),
}

#[derive(ClapArgs, Debug)]
struct MergeArgs {
    /// JSON merge configuration; replaces the layer and distance options.
    #[arg(long, conflicts_with_all = ["layers", "distance"])]
    config: Option<PathBuf>,
    /// Candidate layer documents, one per DEM.
    #[arg(long = "layer", value_name = "PATH", required_unless_present = "config")]
    layers: Vec<PathBuf>,
    /// Neighbourhood distance below which detections are linked.
    #[arg(long, required_unless_present = "config")]
    distance: Option<f64>,
    /// Unit of `--distance`.
    #[arg(long, default_value = "map units")]
    unit: LinearUnit,
    /// Unit of the layers' coordinate system.
    #[arg(long)]
    crs_unit: Option<String>,
    /// Require both summits and cols to be close before linking.
    #[arg(long)]
    link_cols: bool,
    /// Output report; defaults to the configured path.
    #[arg(long)]
    out: Option<PathBuf>,
}

#[derive(ClapArgs, Debug)]
struct ResolveArgs {
    /// Merge report produced by `summits merge`.
    #[arg(long = "in")]
    input: PathBuf,
    #[arg(long)]
    out: PathBuf,
}

#[derive(ClapArgs, Debug)]
struct MatchArgs {
    #[arg(long = "in")]
    input: PathBuf,
    /// Reference summit list.
    #[arg(long)]
    references: PathBuf,
    #[arg(long)]
    summit_tolerance: f64,
    #[arg(long)]
    col_tolerance: f64,
    /// Unit of both tolerances.
    #[arg(long, default_value = "map units")]
    unit: LinearUnit,
    #[arg(long)]
    crs_unit: Option<String>,
    #[arg(long)]
    out: PathBuf,
    /// Where to write references that no summit took.
    #[arg(long)]
    remainder: Option<PathBuf>,
}

#[derive(ClapArgs, Debug)]
struct ProminenceArgs {
    #[arg(long = "in")]
    input: PathBuf,
    /// DEM raster documents; the DEM is recognised from the file name.
    #[arg(long = "dem", value_name = "PATH", required = true)]
    dems: Vec<PathBuf>,
    /// Sample at surveyed positions instead of detected ones.
    #[arg(long)]
    surveyed: bool,
    /// Interpolate between cell centres instead of reading the containing cell.
    #[arg(long)]
    bilinear: bool,
    #[arg(long)]
    out: PathBuf,
}

#[derive(ClapArgs, Debug)]
struct StatsArgs {
    #[arg(long = "in")]
    input: PathBuf,
    #[arg(long = "dem", value_name = "PATH")]
    dems: Vec<PathBuf>,
    /// Unit of reported distances.
    #[arg(long, default_value = "map units")]
    unit: LinearUnit,
    #[arg(long)]
    crs_unit: Option<String>,
    /// Summits whose notes equal this are left out (repeatable).
    #[arg(long = "skip-notes", value_name = "TEXT")]
    skip_notes: Vec<String>,
    #[arg(long)]
    bilinear: bool,
    #[arg(long)]
    out: PathBuf,
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logging(cli.verbose);
    let outcome = run(cli.command);
    let tally = summits::core::log_tally();
    if tally.warnings + tally.errors > 0 {
        eprintln!(
            "finished with {} warning(s), {} error(s) logged",
            tally.warnings, tally.errors
        );
    }
    match outcome {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("error: {err}");
            ExitCode::FAILURE
        }
    }
}

#[cfg(not(feature = "tracing"))]
fn init_logging(verbose: bool) {
    let level = if verbose {
        log::LevelFilter::Debug
    } else {
        log::LevelFilter::Info
    };
    let _ = summits::core::init_with_level(level);
}

#[cfg(feature = "tracing")]
fn init_logging(_verbose: bool) {
    let _ = tracing_log::LogTracer::init();
    summits::core::init_tracing(false);
}

fn run(command: Command) -> Result<(), Box<dyn Error>> {
    match command {
        Command::Merge(args) => run_merge(args),
        Command::Resolve(args) => run_resolve(args),
        Command::Match(args) => run_match(args),
        Command::Prominence(args) => run_prominence(args),
        Command::Stats(args) => run_stats(args),
    }
}

fn distance_model(crs_unit: Option<&str>) -> Result<DistanceModel, Box<dyn Error>> {
    Ok(match crs_unit {
        Some(unit) => DistanceModel::from_crs_unit(unit)?,
        None => DistanceModel::map_units(),
    })
}

fn run_merge(args: MergeArgs) -> Result<(), Box<dyn Error>> {
    let (report, default_out) = match &args.config {
        Some(path) => {
            let config = MergeConfig::load_json(path)?;
            (config.run()?, config.output_path())
        }
        None => {
            let distance = args.distance.ok_or("--distance is required without --config")?;
            let mut params = ClusterParams::new(distance, args.unit);
            if args.link_cols {
                params = params.with_link(LinkMode::SummitAndCol);
            }
            let layers = args
                .layers
                .iter()
                .map(|path| merge_io::read_json(path))
                .collect::<Result<Vec<SummitLayer>, _>>()?;
            let model = distance_model(args.crs_unit.as_deref())?;
            (
                merge_layers(layers, params, model)?,
                PathBuf::from("summits_merged.json"),
            )
        }
    };
    let out = args.out.unwrap_or(default_out);
    report.write_json(&out)?;
    println!(
        "merged {} candidate(s) from {} DEM(s) into {} summit(s)",
        report.set.candidates.len(),
        report.sources.len(),
        report.set.groups.len()
    );
    Ok(())
}

fn run_resolve(args: ResolveArgs) -> Result<(), Box<dyn Error>> {
    let mut report = MergeReport::load_json(&args.input)?;
    let corrections = pipeline::resolve(&mut report)?;
    report.write_json(&args.out)?;
    println!(
        "exchanged {}, absorbed {}, malformed {}",
        corrections.exchanged.len(),
        corrections.absorbed.len(),
        corrections.malformed.len()
    );
    for note in &corrections.malformed {
        println!("  {}: {}", note.group, note.message);
    }
    Ok(())
}

fn run_match(args: MatchArgs) -> Result<(), Box<dyn Error>> {
    let mut report = MergeReport::load_json(&args.input)?;
    let references = merge_io::load_references(&args.references)?;
    let model = distance_model(args.crs_unit.as_deref())?;
    let params = ReferenceMatchParams {
        summit_tolerance: args.summit_tolerance,
        col_tolerance: args.col_tolerance,
        unit: args.unit,
    };
    let outcome = pipeline::match_all(&mut report.set, &references, &model, &params)?;
    report.write_json(&args.out)?;
    if let Some(path) = &args.remainder {
        merge_io::write_json(&outcome.automatic.remainder, path)?;
    }
    println!(
        "matched {}, manual {}, remaining {}",
        outcome.automatic.matched.len(),
        outcome.manual,
        outcome.automatic.remainder.len()
    );
    Ok(())
}

fn interpolation(bilinear: bool) -> Interpolation {
    if bilinear {
        Interpolation::Bilinear
    } else {
        Interpolation::Nearest
    }
}

fn load_dems(paths: &[PathBuf]) -> Result<Vec<LoadedDem>, Box<dyn Error>> {
    let mut dems = Vec::with_capacity(paths.len());
    for path in paths {
        dems.push(load_dem(path, None)?);
    }
    Ok(dems)
}

fn dem_names(dems: &[LoadedDem]) -> String {
    let names: Vec<&str> = dems.iter().map(|d| DemSource::token(d.source)).collect();
    names.join(", ")
}

fn run_prominence(args: ProminenceArgs) -> Result<(), Box<dyn Error>> {
    let report = MergeReport::load_json(&args.input)?;
    let dems = load_dems(&args.dems)?;
    let sample_at = if args.surveyed {
        SampleAt::Surveyed
    } else {
        SampleAt::Detected
    };
    let table = pipeline::prominence_table(
        &report.set,
        &dems,
        sample_at,
        interpolation(args.bilinear),
    )?;
    table.write_json(&args.out)?;
    println!(
        "{} summit(s) on {}, {} out of coverage",
        table.rows.len(),
        dem_names(&dems),
        table.out_of_coverage
    );
    Ok(())
}

fn run_stats(args: StatsArgs) -> Result<(), Box<dyn Error>> {
    let report = MergeReport::load_json(&args.input)?;
    let dems = load_dems(&args.dems)?;
    let model = distance_model(args.crs_unit.as_deref())?;
    let mut params = AccuracyParams {
        unit: args.unit,
        interpolation: interpolation(args.bilinear),
        ..Default::default()
    };
    if !args.skip_notes.is_empty() {
        params.skip_notes = args.skip_notes;
    }
    let accuracy = pipeline::accuracy_report(&report.set, &dems, model, params)?;
    accuracy.write_json(&args.out)?;
    println!(
        "{} record(s), {} skipped summit(s)",
        accuracy.records.len(),
        accuracy.skipped
    );
    for s in &accuracy.summaries {
        if let Some(p) = s.position {
            println!(
                "  {}: {} record(s), mean position error {:.6}",
                s.source, s.records, p.mean
            );
        }
    }
    Ok(())
}
