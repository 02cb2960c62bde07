use clap::Subcommand;
use samscope_core::{
    core::sam_collection,
    structs::toml::{Output, SamOptions, SamToml},
};

#[derive(Subcommand, Debug)]
pub(crate) enum Commands {
    /// Decode accounts and groups from a SAM Registry export
    Acquire {
        /// Path to a JSON Registry export of the SAM hive
        #[arg(long)]
        export: String,
        /// Output format. JSON or JSONL.
        #[arg(long, default_value_t = String::from("JSON"))]
        format: String,
        /// Optional output directory for storing results
        #[arg(long, default_value_t = String::from("./tmp"))]
        output_dir: String,
        /// GZIP Compress results
        #[arg(long)]
        compress: bool,
        /// Fail a record on the first field that cannot be decoded
        #[arg(long)]
        strict: bool,
        /// Encoding of embedded strings. utf16 or utf8
        #[arg(long, default_value = None)]
        encoding: Option<String>,
        /// Decode accounts and groups on separate threads
        #[arg(long)]
        parallel: bool,
    },
}

/// Build the collector from command line arguments and run it
pub(crate) fn run_collector(command: &Commands, output: Output) {
    let collector = setup_collector(command, output);
    println!(
        "[samscope] Writing output to: {}",
        collector.output.directory
    );

    match sam_collection(&collector) {
        Ok(results) => println!(
            "[samscope] Decoded {} accounts and {} groups ({} failures)",
            results.accounts.len(),
            results.groups.len(),
            results.failures.len()
        ),
        Err(err) => println!("[samscope] Failed to decode SAM data: {err}"),
    }
}

fn setup_collector(command: &Commands, mut output: Output) -> SamToml {
    match command {
        Commands::Acquire {
            export,
            format,
            output_dir,
            compress,
            strict,
            encoding,
            parallel,
        } => {
            output.compress = *compress;
            if !format.is_empty() {
                output.format = format.to_lowercase();
            }
            if !output_dir.is_empty() {
                output.directory = output_dir.to_string();
            }

            SamToml {
                output,
                sam: SamOptions {
                    export: export.to_string(),
                    accounts_path: None,
                    groups_path: None,
                    strict_fields: Some(*strict),
                    encoding: encoding.clone(),
                    parallel: Some(*parallel),
                },
            }
        }
    }
}
