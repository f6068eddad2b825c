//! `fieldsplit` command-line front end.
//!
//! ## Usage
//!
//! ```bash
//! # One file per value of the 3rd tab-separated field
//! fieldsplit -d '\t' -f 3 -p out/ data.tsv
//!
//! # Select the field by header label, keep the header in every output file
//! fieldsplit -d , -F country -h -s .csv -p by_country/ 'visits-*.csv.gz'
//!
//! # Hash keys into 100 files named 000..099
//! fieldsplit -d , -f 1 -b 100 -p buckets/ < data.csv
//! ```

use anyhow::{Context, Result, bail};
use clap::{ArgAction, Parser};
use fieldsplit::config::resolve_delimiter;
use fieldsplit::{Bucketer, FieldSelector, InputSource, SplitConfig, run};
use std::path::PathBuf;
use std::process::ExitCode;

#[derive(Parser)]
#[command(name = "fieldsplit")]
#[command(about = "Split delimited rows into one file per value of a field")]
#[command(version)]
#[command(disable_help_flag = true)]
struct Cli {
    /// 1-based position of the field that selects the output file
    #[arg(short = 'f', long = "field", conflicts_with = "field_label")]
    field: Option<usize>,

    /// Header label of the field that selects the output file
    #[arg(short = 'F', long = "field-label")]
    field_label: Option<String>,

    /// Field delimiter (escapes like \t allowed; default: $DELIMITER or 0xfe)
    #[arg(short, long)]
    delimiter: Option<String>,

    /// Directory to write output files into
    #[arg(short = 'p', long = "path", default_value = ".")]
    path: PathBuf,

    /// Suffix appended to every output file name
    #[arg(short, long)]
    suffix: Option<String>,

    /// Copy each input's header line to the top of every new output file
    #[arg(short = 'h', long = "keep-header")]
    keep_header: bool,

    /// Hash keys into this many files, zero-padded to the argument's width
    #[arg(short, long)]
    buckets: Option<String>,

    /// Keep at most this many output files open at once
    #[arg(long)]
    max_open_files: Option<usize>,

    /// Print run statistics as JSON to stderr when done
    #[arg(long)]
    stats: bool,

    /// Print help
    #[arg(long, action = ArgAction::Help)]
    help: Option<bool>,

    /// Input files or glob patterns (`-` or none for stdin)
    inputs: Vec<String>,
}

impl Cli {
    fn into_config(self) -> Result<(SplitConfig, Vec<InputSource>, bool)> {
        let field = match (self.field, self.field_label) {
            (Some(0), _) => bail!("field positions start at 1"),
            (Some(position), None) => FieldSelector::Index(position - 1),
            (None, Some(label)) => FieldSelector::Label(label),
            _ => bail!("either -f or -F must be specified"),
        };

        let mut config = SplitConfig {
            field: Some(field),
            delimiter: resolve_delimiter(self.delimiter.as_deref())?,
            output_dir: self.path,
            suffix: self.suffix,
            keep_header: self.keep_header,
            ..SplitConfig::default()
        };
        if let Some(text) = &self.buckets {
            config = config.buckets(text.parse::<Bucketer>()?);
        }
        if let Some(limit) = self.max_open_files {
            config = config.max_open_files(limit);
        }

        let inputs = self.inputs.iter().map(|a| InputSource::from_arg(a)).collect();
        Ok((config, inputs, self.stats))
    }
}

fn main() -> ExitCode {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();

    let cli = Cli::parse();
    match split(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("fieldsplit: {err:#}");
            ExitCode::FAILURE
        }
    }
}

fn split(cli: Cli) -> Result<()> {
    let (config, inputs, print_stats) = cli.into_config()?;
    let stats = run(&config, &inputs)?;
    if print_stats {
        eprintln!("{}", stats.to_json().context("render statistics")?);
    }
    Ok(())
}
