//! rivernet CLI - drainage networks from channel node tables

mod plot;

use anyhow::{bail, Context, Result};
use clap::{Args, Parser, Subcommand};
use indicatif::{ProgressBar, ProgressStyle};
use std::path::{Path, PathBuf};
use std::time::Instant;
use tracing::{info, Level};
use tracing_subscriber::FmtSubscriber;

use rivernet_algorithms::network::{build_network, Network, NetworkParams, Topology};
use rivernet_algorithms::path::{extract_path, FlowPath};
use rivernet_algorithms::profile::LongProfile;
use rivernet_core::io::{
    read_network_export, read_node_table, write_geojson, write_node_export, NetworkExport,
};
use rivernet_core::{NodeSchema, NodeTable, SegmentAttributes, SegmentId};

// ─── CLI structure ──────────────────────────────────────────────────────

#[derive(Parser)]
#[command(name = "rivernet")]
#[command(author, version, about = "Drainage network topology from channel node tables", long_about = None)]
struct Cli {
    /// Verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

/// Column naming of the node table.
#[derive(Args, Debug, Default)]
struct SchemaArgs {
    /// TOML file with column names
    #[arg(long)]
    schema: Option<PathBuf>,
    /// Use the older `node` / `receiver_node` column names
    #[arg(long)]
    legacy_columns: bool,
    /// Name of the node id column
    #[arg(long)]
    node_column: Option<String>,
    /// Name of the receiver id column
    #[arg(long)]
    receiver_column: Option<String>,
}

impl SchemaArgs {
    fn resolve(&self) -> Result<NodeSchema> {
        if self.schema.is_some() && self.legacy_columns {
            bail!("--schema and --legacy-columns cannot be combined");
        }
        let mut schema = match &self.schema {
            Some(path) => NodeSchema::from_toml_file(path)
                .with_context(|| format!("Failed to load column schema {}", path.display()))?,
            None if self.legacy_columns => NodeSchema::legacy(),
            None => NodeSchema::default(),
        };
        if let Some(name) = &self.node_column {
            schema.node_id = name.clone();
        }
        if let Some(name) = &self.receiver_column {
            schema.receiver = name.clone();
        }
        schema.validate().context("Invalid column schema")?;
        Ok(schema)
    }
}

#[derive(Subcommand)]
enum Commands {
    /// Build the segment network of a node table
    Build {
        /// Node table CSV
        input: PathBuf,
        /// Output segments file (GeoJSON)
        output: PathBuf,
        /// Include mean chi
        #[arg(short, long)]
        chi: bool,
        /// Include mean drainage area in km²
        #[arg(short = 'a', long)]
        drainage_area: bool,
        /// Include mean, minimum and maximum elevation
        #[arg(short, long)]
        elevation: bool,
        /// Include chord slope
        #[arg(short, long)]
        slope: bool,
        /// Include mean ksn (m_chi)
        #[arg(short, long)]
        ksn: bool,
        /// Include every attribute
        #[arg(long)]
        all_attributes: bool,
        /// Only build the basin with this key
        #[arg(long)]
        basin: Option<i64>,
        /// Node export CSV [default: <output>_nodes.csv]
        #[arg(long)]
        nodes: Option<PathBuf>,
        /// Also write a segment selection GeoJSON
        #[arg(long)]
        select: Option<PathBuf>,
        #[command(flatten)]
        columns: SchemaArgs,
    },
    /// Extract and plot the flow path from a segment to the outlet
    Path {
        /// Node export CSV written by `build`
        nodes: PathBuf,
        /// Upstream-most segment of the path
        #[arg(long)]
        id: u32,
        /// Plot the long profile of the path
        #[arg(long)]
        lp: bool,
        /// Plot the long profile of all channels with the path highlighted
        #[arg(long)]
        lp_all: bool,
        /// Plot the path nodes colored by log10(ksn)
        #[arg(long)]
        lp_ksn: bool,
        /// Plot a map of the network with the path highlighted
        #[arg(long)]
        map: bool,
        /// Plot a map of the path alone
        #[arg(long)]
        path_map: bool,
        /// Plot title
        #[arg(long)]
        title: Option<String>,
        /// Directory for plots
        #[arg(long, default_value = ".")]
        out_dir: PathBuf,
        /// Write the path nodes to this CSV
        #[arg(long)]
        path_nodes: Option<PathBuf>,
        #[command(flatten)]
        columns: SchemaArgs,
    },
    /// Summarize the topology of a node table
    Info {
        /// Node table CSV
        input: PathBuf,
        /// Only analyze the basin with this key
        #[arg(long)]
        basin: Option<i64>,
        #[command(flatten)]
        columns: SchemaArgs,
    },
}

// ─── Helpers ────────────────────────────────────────────────────────────

fn setup_logging(verbose: bool) -> Result<()> {
    let level = if verbose { Level::DEBUG } else { Level::INFO };
    let subscriber = FmtSubscriber::builder()
        .with_max_level(level)
        .with_target(false)
        .finish();
    tracing::subscriber::set_global_default(subscriber).context("Failed to set default subscriber")
}

fn spinner(msg: &str) -> ProgressBar {
    let pb = ProgressBar::new_spinner();
    pb.set_style(
        ProgressStyle::default_spinner()
            .template("{spinner:.green} {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner()),
    );
    pb.set_message(msg.to_string());
    pb.enable_steady_tick(std::time::Duration::from_millis(100));
    pb
}

fn read_nodes(path: &Path, schema: &NodeSchema) -> Result<NodeTable> {
    let pb = spinner("Reading node table...");
    let nodes = read_node_table(path, schema)
        .with_context(|| format!("Failed to read node table {}", path.display()))?;
    pb.finish_and_clear();
    info!("Input: {} nodes", nodes.len());
    Ok(nodes)
}

fn read_export(path: &Path, schema: &NodeSchema) -> Result<NetworkExport> {
    let pb = spinner("Reading network...");
    let export = read_network_export(path, schema)
        .with_context(|| format!("Failed to read node export {}", path.display()))?;
    pb.finish_and_clear();
    info!("Input: {} segments over {} nodes", export.segments.len(), export.nodes.len());
    Ok(export)
}

fn write_network(network: &Network, output: &Path, nodes_out: &Path, select: Option<&Path>, schema: &NodeSchema) -> Result<()> {
    let pb = spinner("Writing output...");
    write_geojson(output, &network.to_features()).context("Failed to write segments")?;
    write_node_export(nodes_out, &network.nodes, &network.segments, &network.node_kinds(), schema)
        .context("Failed to write node export")?;
    if let Some(select) = select {
        write_geojson(select, &network.selection_features()).context("Failed to write segment selection")?;
    }
    pb.finish_and_clear();
    Ok(())
}

fn done(name: &str, path: &Path, elapsed: std::time::Duration) {
    println!("{} saved to: {}", name, path.display());
    println!("  Processing time: {:.2?}", elapsed);
}

/// Append `.geojson` unless the path already ends with it.
fn geojson_path(path: PathBuf) -> PathBuf {
    let has_ext = path
        .extension()
        .is_some_and(|ext| ext.eq_ignore_ascii_case("geojson"));
    if has_ext {
        path
    } else {
        let mut name = path.into_os_string();
        name.push(".geojson");
        PathBuf::from(name)
    }
}

/// `<stem>_nodes.csv` next to the segments file.
fn default_nodes_path(output: &Path) -> PathBuf {
    let stem = output
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| "network".to_string());
    output.with_file_name(format!("{}_nodes.csv", stem))
}

fn attributes(chi: bool, drainage_area: bool, elevation: bool, slope: bool, ksn: bool, all: bool) -> SegmentAttributes {
    if all {
        return SegmentAttributes::all();
    }
    SegmentAttributes {
        slope,
        elevation,
        drainage_area,
        chi,
        ksn,
    }
}

fn print_topology(topology: &Topology) {
    println!("  Channel heads: {}", topology.channel_heads.len());
    println!("  Confluences: {}", topology.confluences.len());
    println!("  Mouths: {}", topology.mouths.len());
}

fn describe_path(path: &FlowPath) -> String {
    let mut ids: Vec<String> = path.ids().iter().map(|id| id.to_string()).collect();
    ids.push("outlet".to_string());
    ids.join(" -> ")
}

// ─── Main ───────────────────────────────────────────────────────────────

fn main() -> Result<()> {
    let cli = Cli::parse();
    setup_logging(cli.verbose)?;

    match cli.command {
        // ── Build ────────────────────────────────────────────────────
        Commands::Build {
            input,
            output,
            chi,
            drainage_area,
            elevation,
            slope,
            ksn,
            all_attributes,
            basin,
            nodes,
            select,
            columns,
        } => {
            let schema = columns.resolve()?;
            let output = geojson_path(output);
            let nodes_out = nodes.unwrap_or_else(|| default_nodes_path(&output));
            let select = select.map(geojson_path);
            let table = read_nodes(&input, &schema)?;

            let start = Instant::now();
            let params = NetworkParams {
                basin_key: basin,
                attributes: attributes(chi, drainage_area, elevation, slope, ksn, all_attributes),
            };
            let network = build_network(&table, &params).context("Failed to build network")?;
            let elapsed = start.elapsed();

            write_network(&network, &output, &nodes_out, select.as_deref(), &schema)?;
            println!("Network: {} segments", network.segments.len());
            print_topology(&network.topology);
            done("Segments", &output, elapsed);
            println!("Node export saved to: {}", nodes_out.display());
            if let Some(select) = &select {
                println!("Segment selection saved to: {}", select.display());
                println!("  Open it in a GIS to pick a starting segment_ID.");
            }
        }

        // ── Path ─────────────────────────────────────────────────────
        Commands::Path {
            nodes,
            id,
            lp,
            lp_all,
            lp_ksn,
            map,
            path_map,
            title,
            out_dir,
            path_nodes,
            columns,
        } => {
            let schema = columns.resolve()?;
            let export = read_export(&nodes, &schema)?;

            let start = Instant::now();
            let path = extract_path(&export.segments, SegmentId(id)).context("Failed to extract path")?;
            let profile = LongProfile::for_path(&path, &export.nodes).context("Failed to build long profile")?;
            let elapsed = start.elapsed();

            println!("Path: {}", describe_path(&path));
            println!("  Nodes: {}", profile.len());
            if let (Some((d0, d1)), Some((z0, z1))) = (profile.distance_range(), profile.elevation_range()) {
                println!("  Distance: {:.3} - {:.3} km", d0, d1);
                println!("  Elevation: {:.1} - {:.1} m", z0, z1);
            }
            println!("  Processing time: {:.2?}", elapsed);

            if let Some(out) = &path_nodes {
                let kinds = Topology::analyze(&export.nodes)
                    .context("Failed to classify nodes")?
                    .node_kinds();
                write_node_export(out, &export.nodes, path.segments(), &kinds, &schema)
                    .context("Failed to write path nodes")?;
                println!("Path nodes saved to: {}", out.display());
            }

            let title = title.unwrap_or_else(|| format!("Flow path from segment {}", id));
            if lp_ksn && !export.nodes.columns().m_chi {
                bail!("--lp-ksn needs an m_chi column in {}", nodes.display());
            }
            if lp || lp_all || lp_ksn || map || path_map {
                std::fs::create_dir_all(&out_dir)
                    .with_context(|| format!("Failed to create {}", out_dir.display()))?;
            }
            let mut figures = Vec::new();
            if lp {
                figures.push(("PathChannelLongProfile", plot::path_long_profile(&profile, &title)));
            }
            if lp_all {
                figures.push((
                    "AllChannelLongProfile",
                    plot::all_channel_long_profile(&export.segments, &export.nodes, &profile, &title)?,
                ));
            }
            if lp_ksn {
                figures.push((
                    "KsnLongProfile",
                    plot::ksn_long_profile(&export.segments, &export.nodes, &profile, &title)?,
                ));
            }
            if map {
                figures.push((
                    "NetworkMap",
                    plot::network_map(&export.segments, &export.nodes, &profile, &title)?,
                ));
            }
            if path_map {
                figures.push(("PathMap", plot::path_map(&profile, &title)));
            }
            for (name, figure) in figures {
                let file = out_dir.join(format!("{}.svg", name));
                figure.save(&file)?;
                println!("Plot saved to: {}", file.display());
            }
        }

        // ── Info ─────────────────────────────────────────────────────
        Commands::Info { input, basin, columns } => {
            let schema = columns.resolve()?;
            let table = read_nodes(&input, &schema)?;
            let params = NetworkParams {
                basin_key: basin,
                ..NetworkParams::default()
            };
            let network = build_network(&table, &params).context("Failed to build network")?;
            let cols = network.nodes.columns();
            let outlets = network.segments.iter().filter(|s| s.toseg.is_outlet()).count();

            println!("File: {}", input.display());
            println!("Nodes: {}", network.nodes.len());
            println!("Segments: {} ({} draining off the map)", network.segments.len(), outlets);
            print_topology(&network.topology);
            println!(
                "Optional columns: chi={} m_chi={} basin_key={}",
                cols.chi, cols.m_chi, cols.basin_key
            );
            if !network.nodes.extra_columns().is_empty() {
                println!("Extra columns: {}", network.nodes.extra_columns().join(", "));
            }
        }
    }

    Ok(())
}
