use clap::{Args, Subcommand};

#[derive(Args, Debug, Clone)]
pub struct ParseArgs {
    /// CSV file to ingest
    pub file: String,

    #[arg(long, help = "Treat the first row as data, not as a header")]
    pub no_headers: bool,

    #[arg(long, default_value_t = 0, help = "Leading rows to discard before the header")]
    pub skip_rows: usize,

    #[arg(long, help = "Year assumed for rows without a usable date")]
    pub default_year: Option<i32>,

    #[arg(long, help = "Site name assigned to rows without site data")]
    pub default_site: Option<String>,

    #[arg(long, help = "Customer scope tag recorded on the upload")]
    pub customer: Option<String>,

    #[arg(long, help = "JSON file overriding the built-in inference tables")]
    pub tables: Option<String>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Detect the column layout of a file without validating rows
    Inspect {
        /// CSV file to inspect
        file: String,

        #[arg(long, help = "Treat the first row as data, not as a header")]
        no_headers: bool,

        #[arg(long, default_value_t = 0)]
        skip_rows: usize,

        #[arg(long, help = "JSON file overriding the built-in inference tables")]
        tables: Option<String>,
    },
    /// Parse and validate a file, printing the summary and a preview
    Parse {
        #[command(flatten)]
        parse: ParseArgs,

        #[arg(long, help = "Print the parse report as JSON instead of a table")]
        json: bool,

        #[arg(
            long,
            help = "If specified, writes the JSON report to this file instead of stdout"
        )]
        output: Option<String>,
    },
    /// Run the full upload → parse → import lifecycle against a store
    Import {
        #[command(flatten)]
        parse: ParseArgs,

        #[arg(long, help = "Create missing sites and reporting periods")]
        auto_create: bool,

        #[arg(long, help = "Force every row into this reporting year")]
        year: Option<i32>,

        #[arg(long, requires = "year", help = "Quarter within --year (1-4)")]
        quarter: Option<u8>,

        #[arg(
            long,
            default_value = "emissary-store.json",
            help = "Path of the JSON activity store"
        )]
        store: String,
    },
}
