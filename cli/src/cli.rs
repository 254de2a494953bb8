use std::path::PathBuf;

/// Area-weighted prorata of polygon attributes
#[derive(clap::Parser, Debug)]
#[command(name = "prorata", version, about, propagate_version = true)]
pub struct Cli {
    /// Increase output verbosity (-v, -vv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(clap::Subcommand, Debug)]
pub enum Commands {
    /// Sum source fields onto target polygons, weighted by overlap area.
    ///
    /// Each source polygon contributes value * intersection_area / source_area.
    /// Overlapping source polygons are counted independently.
    Sum(SumArgs),

    /// List the fields of a layer
    Fields(FieldsArgs),
}

#[derive(clap::Args, Debug)]
pub struct SumArgs {
    /// Target polygon layer to enrich (.geojson, .json or .shp)
    #[arg(value_hint = clap::ValueHint::FilePath)]
    pub target: PathBuf,

    /// Source polygon layer holding the values (.geojson, .json or .shp)
    #[arg(value_hint = clap::ValueHint::FilePath)]
    pub source: PathBuf,

    /// Numeric source fields to prorate (repeat or comma-separate)
    #[arg(short, long = "field", value_delimiter = ',', required = true)]
    pub fields: Vec<String>,

    /// Output GeoJSON file
    #[arg(short, long, value_hint = clap::ValueHint::FilePath)]
    pub output: PathBuf,

    /// Overwrite the output file if it exists
    #[arg(long)]
    pub force: bool,
}

impl SumArgs {
    /// Requested field names, trimmed, blanks removed.
    pub fn field_names(&self) -> Vec<String> {
        self.fields.iter()
            .map(|f| f.trim().to_string())
            .filter(|f| !f.is_empty())
            .collect()
    }
}

#[derive(clap::Args, Debug)]
pub struct FieldsArgs {
    /// Polygon layer to inspect (.geojson, .json or .shp)
    #[arg(value_hint = clap::ValueHint::FilePath)]
    pub layer: PathBuf,
}
