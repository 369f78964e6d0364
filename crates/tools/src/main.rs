use std::fs;
use std::path::PathBuf;

use clap::{Parser, Subcommand};
use formats::{QuantizedMeshHeader, SphereMethod};
use scene::{TileAddress, mesh_max_error_param};
use tools::{
    ToolError, encode_mesh, header_report, parse_bounds, parse_mesh_input, transform_report,
};
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "qmesh", version, about = "quantized-mesh terrain utilities")]
struct Args {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Encode a JSON mesh ({positions, indices}) into a .terrain tile
    Encode {
        #[arg(long)]
        input: PathBuf,

        #[arg(long)]
        output: PathBuf,

        /// Tile bounds: minx,miny,maxx,maxy (degrees)
        #[arg(long)]
        bounds: Option<String>,

        /// Append oct-encoded vertex normals
        #[arg(long)]
        normals: bool,

        /// auto | bbox | naive | ritter
        #[arg(long, default_value = "auto")]
        sphere: SphereMethod,
    },

    /// Print the header of a .terrain tile as JSON
    Header { file: PathBuf },

    /// Print the model matrix of a tile
    Transform { z: u8, x: u32, y: u32 },

    /// Print the mesh max error requested at zoom z
    MeshError { z: u8 },
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    match Args::parse().command {
        Command::Encode {
            input,
            output,
            bounds,
            normals,
            sphere,
        } => {
            let json = fs::read_to_string(&input).map_err(|e| ToolError::Io {
                path: input.display().to_string(),
                source: e.to_string(),
            })?;
            let mesh = parse_mesh_input(&json)?;
            let bounds = bounds.as_deref().map(parse_bounds).transpose()?;
            debug!(
                vertices = mesh.positions.len() / 3,
                triangles = mesh.indices.len() / 3,
                "encoding mesh"
            );
            let bytes = encode_mesh(&mesh, bounds, sphere, normals)?;
            fs::write(&output, &bytes).map_err(|e| ToolError::Io {
                path: output.display().to_string(),
                source: e.to_string(),
            })?;
            info!("wrote {} ({} bytes)", output.display(), bytes.len());
        }
        Command::Header { file } => {
            let mut reader = fs::File::open(&file).map_err(|e| ToolError::Io {
                path: file.display().to_string(),
                source: e.to_string(),
            })?;
            let header = QuantizedMeshHeader::read_from(&mut reader)?;
            println!(
                "{}",
                serde_json::to_string_pretty(&header_report(header))?
            );
        }
        Command::Transform { z, x, y } => {
            let tile = TileAddress::new(x, y, z);
            if !tile.is_valid() {
                return Err(format!("tile {tile} is outside the zoom {z} grid").into());
            }
            println!("{}", serde_json::to_string_pretty(&transform_report(tile))?);
        }
        Command::MeshError { z } => println!("{}", mesh_max_error_param(z)),
    }
    Ok(())
}
