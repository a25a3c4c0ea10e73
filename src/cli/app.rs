use clap::{Parser, Subcommand, ValueEnum};

#[derive(Parser)]
#[command(name = "qvd")]
#[command(about = "QlikView Data (QVD) file toolkit")]
#[command(version)]
pub struct Cli {
    /// Control colored output
    #[arg(long, default_value = "auto", global = true)]
    pub color: ColorMode,

    /// Write output to a file instead of stdout
    #[arg(short, long, global = true)]
    pub output: Option<String>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Clone, Copy, ValueEnum)]
pub enum ColorMode {
    Auto,
    Always,
    Never,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Show table metadata and per-field bit layout
    Info {
        /// Path to the QVD file
        #[arg(short, long)]
        file: String,

        /// Output in JSON format
        #[arg(long)]
        json: bool,
    },

    /// Print the first rows of the table
    Head {
        /// Path to the QVD file
        #[arg(short, long)]
        file: String,

        /// Number of rows to print
        #[arg(short = 'n', long, default_value_t = 10)]
        rows: usize,

        /// Output in JSON format
        #[arg(long)]
        json: bool,
    },

    /// Export the full table as CSV or JSON
    Export {
        /// Path to the QVD file
        #[arg(short, long)]
        file: String,

        /// Output format: csv or json
        #[arg(long, default_value = "csv")]
        format: String,
    },

    /// Hex dump of the header, symbol, or index section
    Dump {
        /// Path to the QVD file
        #[arg(short, long)]
        file: String,

        /// Section to dump: header, symbols, or index
        #[arg(short, long, default_value = "header")]
        section: String,

        /// Maximum bytes to dump (default: 256)
        #[arg(short, long)]
        length: Option<usize>,
    },
}
