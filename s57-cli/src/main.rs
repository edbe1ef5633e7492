//! `decoder` — the thin CLI binary over the `s57-parse`/`s57-interp` library
//! crates. Reads one S-57 cell file, writes a GeoJSON feature collection and
//! an optional sector-light sidecar into the output directory, and prints a
//! single-line JSON metadata object to stdout.

use clap::Parser;
use s57_interp::output::Metadata;
use std::path::PathBuf;
use std::process::ExitCode;

#[derive(Debug, thiserror::Error)]
enum CliError {
    #[error("reading {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("decoding {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: s57_parse::ParseError,
    },
    #[error("building features for {path}: {source}")]
    Build {
        path: PathBuf,
        #[source]
        source: s57_interp::BuildError,
    },
    #[error("writing {path}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("serializing output: {0}")]
    Serialize(#[from] serde_json::Error),
    #[error("input cell path has no file stem: {0}")]
    NoChartId(PathBuf),
}

#[derive(Parser)]
#[command(name = "decoder")]
#[command(about = "Decode one IHO S-57 ENC cell into a normalized GeoJSON feature collection")]
struct Cli {
    /// S-57 cell file to decode (e.g. US4AK4PH.000)
    #[arg(value_name = "INPUT-CELL")]
    input_cell: PathBuf,

    /// Directory to write the GeoJSON feature collection and sector-light
    /// sidecar into
    #[arg(value_name = "OUTPUT-DIR")]
    output_dir: PathBuf,

    /// Raise the log level from info to debug
    #[arg(short, long)]
    verbose: bool,
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    if cli.verbose {
        env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("debug")).init();
    } else {
        env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    }

    match run(&cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            log::error!("{}", e);
            ExitCode::FAILURE
        }
    }
}

fn run(cli: &Cli) -> Result<(), CliError> {
    let chart_id = cli
        .input_cell
        .file_stem()
        .and_then(|s| s.to_str())
        .ok_or_else(|| CliError::NoChartId(cli.input_cell.clone()))?
        .to_string();

    log::info!("decoding cell {}", cli.input_cell.display());
    let data = std::fs::read(&cli.input_cell).map_err(|source| CliError::Read {
        path: cli.input_cell.clone(),
        source,
    })?;

    let world = s57_interp::decode(&data).map_err(|source| CliError::Parse {
        path: cli.input_cell.clone(),
        source,
    })?;
    log::info!(
        "parsed {} recoverable decode warnings (see above)",
        world.stats.total()
    );

    let output = s57_interp::builder::build_features(&world, &chart_id).map_err(|source| {
        CliError::Build {
            path: cli.input_cell.clone(),
            source,
        }
    })?;
    log::info!("built {} features", output.features.len());

    std::fs::create_dir_all(&cli.output_dir).map_err(|source| CliError::Write {
        path: cli.output_dir.clone(),
        source,
    })?;

    let geojson_path = cli.output_dir.join(format!("{}.geojson", chart_id));
    let geojson = s57_interp::output::feature_collection_json(&output.features)?;
    std::fs::write(&geojson_path, geojson).map_err(|source| CliError::Write {
        path: geojson_path.clone(),
        source,
    })?;

    let sector_lights_path = if output.sector_lights.is_empty() {
        None
    } else {
        let path = cli.output_dir.join(format!("{}.sectors.json", chart_id));
        let sidecar = s57_interp::output::sector_lights_json(&output.sector_lights)?;
        std::fs::write(&path, sidecar).map_err(|source| CliError::Write {
            path: path.clone(),
            source,
        })?;
        Some(path)
    };

    let metadata = Metadata::from_build(
        &output,
        geojson_path.display().to_string(),
        sector_lights_path.map(|p| p.display().to_string()),
    );
    println!("{}", metadata.to_json_line()?);

    Ok(())
}
