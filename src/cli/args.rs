use clap::{ArgAction, Parser, Subcommand};

#[derive(Parser, Debug, Clone)]
#[command(
    name = "logdesk",
    version,
    about = "table export, sorting and data helpers for the log console",
    long_about = "logdesk reads rendered log-console pages and applies the console's client-side helpers: CSV export, column sorting, required-field validation, JSON fetch with error banners, and value formatting.\n\nExamples:\n  logdesk export -i logs.html -o logs.csv\n  logdesk sort -i logs.html --column 2 --desc\n  logdesk fetch -u http://localhost:5000/api/stats\n  logdesk format bytes 1536\n\nTip: Use --config to persist defaults such as the export directory."
)]
pub struct CliArgs {
    #[arg(
        short = 'v',
        long = "vb",
        visible_alias = "verbose",
        action = ArgAction::Count,
        global = true,
        help_heading = "Output",
        help = "Increase verbosity (-v, -vv)."
    )]
    pub verbose: u8,

    #[arg(
        long = "nc",
        visible_alias = "no-color",
        global = true,
        help_heading = "Output",
        help = "Disable colored output."
    )]
    pub no_color: bool,

    #[arg(
        short = 'C',
        long = "cfg",
        visible_alias = "config",
        value_name = "FILE",
        global = true,
        help_heading = "Input",
        help = "Path to config file (defaults to ~/.logdesk/config.yml)."
    )]
    pub config: Option<String>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug, Clone)]
pub enum Command {
    /// Export a page table to CSV.
    Export {
        #[arg(short = 'i', long = "input", value_name = "PAGE", help = "Rendered HTML page.")]
        input: String,

        #[arg(
            short = 't',
            long = "tid",
            visible_alias = "table-id",
            value_name = "ID",
            help = "Table id (defaults to the first table)."
        )]
        table_id: Option<String>,

        #[arg(
            short = 'o',
            long = "output",
            value_name = "FILENAME",
            help = "Download filename (defaults to config default_filename)."
        )]
        output: Option<String>,

        #[arg(
            short = 'd',
            long = "od",
            visible_alias = "out-dir",
            value_name = "DIR",
            help = "Download directory (defaults to config export_dir)."
        )]
        out_dir: Option<String>,

        #[arg(
            long = "qp",
            visible_alias = "quote-policy",
            value_name = "POLICY",
            help = "Embedded quote handling: doubled or verbatim."
        )]
        quote_policy: Option<String>,
    },

    /// Sort a page table by column and print the result as CSV.
    Sort {
        #[arg(short = 'i', long = "input", value_name = "PAGE", help = "Rendered HTML page.")]
        input: String,

        #[arg(
            short = 't',
            long = "tid",
            visible_alias = "table-id",
            value_name = "ID",
            help = "Table id (defaults to the first table)."
        )]
        table_id: Option<String>,

        #[arg(short = 'c', long = "column", value_name = "N", help = "Zero-based column index.")]
        column: usize,

        #[arg(long = "desc", visible_alias = "descending", help = "Sort descending.")]
        descending: bool,
    },

    /// Fetch JSON from a URL.
    Fetch {
        #[arg(short = 'u', long = "url", value_name = "URL", help = "Target URL (relative URLs use base_url).")]
        url: String,

        #[arg(short = 'X', long = "method", value_name = "METHOD", help = "HTTP method (default GET).")]
        method: Option<String>,

        #[arg(
            short = 'H',
            long = "header",
            value_name = "KEY: VALUE",
            action = ArgAction::Append,
            help = "Extra request header (repeatable)."
        )]
        header: Vec<String>,

        #[arg(short = 'D', long = "data", value_name = "JSON", help = "Request body.")]
        data: Option<String>,

        #[arg(long = "timeout", value_name = "SECS", help = "Request timeout in seconds (0 = none).")]
        timeout: Option<u64>,
    },

    /// Check required fields of a form.
    Validate {
        #[arg(short = 'i', long = "input", value_name = "PAGE", help = "Rendered HTML page.")]
        input: String,

        #[arg(
            short = 'f',
            long = "form",
            value_name = "SELECTOR",
            default_value = "form",
            help = "CSS selector of the form."
        )]
        form: String,
    },

    /// List the affordances a page wires up on load.
    Inspect {
        #[arg(short = 'i', long = "input", value_name = "PAGE", help = "Rendered HTML page.")]
        input: String,
    },

    /// Write a commented default config to --config or ~/.logdesk/config.yml (never overwrites).
    InitConfig,

    /// Format a value the way the console displays it.
    Format {
        #[command(subcommand)]
        kind: FormatKind,
    },
}

#[derive(Subcommand, Debug, Clone)]
pub enum FormatKind {
    /// Byte count with binary units.
    Bytes {
        bytes: u64,
        #[arg(long = "decimals", default_value_t = 2, allow_negative_numbers = true)]
        decimals: i32,
    },
    /// Seconds as hours, minutes and seconds.
    Duration { seconds: u64 },
    /// ISO-8601 timestamp as dd/mm/yyyy hh:mm:ss.
    Date { value: String },
}
