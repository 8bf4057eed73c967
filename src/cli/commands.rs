use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "embedstore", about = "Embedded vector store with similarity search")]
pub struct Cli {
    #[command(flatten)]
    pub store: StoreArgs,

    #[command(subcommand)]
    pub command: Commands,
}

/// Overrides layered on top of `--config` and `EMBEDSTORE_*` variables.
#[derive(Args, Debug, Default)]
pub struct StoreArgs {
    /// JSON file with name, dimension, directory, threshold, num_results
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,
    /// Collection name
    #[arg(long, global = true)]
    pub name: Option<String>,
    /// Embedding dimension
    #[arg(long, global = true)]
    pub dimension: Option<i64>,
    /// Storage root (collection lives in <dir>/<name>)
    #[arg(long, global = true)]
    pub dir: Option<PathBuf>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Add a document
    Add {
        text: String,
        /// Overwrite (or create) the record with this id
        #[arg(long)]
        id: Option<String>,
    },
    /// Add documents from a JSON array of strings or {"text", "id"} objects
    AddBatch { json: String },
    /// Similarity search
    Search {
        query: String,
        #[arg(long)]
        threshold: Option<f64>,
        #[arg(long)]
        limit: Option<usize>,
    },
    /// Rank records against a stored record's vector
    Similar {
        id: String,
        #[arg(long)]
        threshold: Option<f64>,
        #[arg(long)]
        limit: Option<usize>,
    },
    /// Show a record
    Get { id: String },
    /// Delete a record
    Delete { id: String },
    /// List record ids in insertion order
    List,
    /// Count records
    Count,
    /// Delete every record in the collection
    Reset,
}
