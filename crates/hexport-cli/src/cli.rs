use clap::Parser;
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "hexport")]
#[command(about = "Convert a static file into a hex-encoded APEX static file import script", long_about = None)]
#[command(version)]
pub struct Cli {
    /// File to convert (e.g. shared_components/files/app-styles.css)
    pub source: PathBuf,

    /// SQL script to write; an existing file is read for its object id, then overwritten
    pub output: PathBuf,

    /// Name the file is registered under in the application (e.g. css/app-styles.css)
    pub logical_name: String,

    /// Source bytes per hex chunk (default from config: 100)
    #[arg(long)]
    pub chunk_size: Option<usize>,

    /// Config file (default: nearest hexport.toml, then user config)
    #[arg(long, env = "HEXPORT_CONFIG")]
    pub config: Option<PathBuf>,

    /// Print the summary as JSON
    #[arg(long)]
    pub json: bool,
}
