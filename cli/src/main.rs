use base64::{engine::general_purpose, Engine};
use clap::Parser;
use collector::system::{run_collector, Commands};
use log::info;
use samscope_core::structs::toml::Output;

mod collector;

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Full path to TOML collector
    #[arg(short, long)]
    toml: Option<String>,

    /// Base64 encoded TOML file
    #[arg(short, long)]
    data: Option<String>,

    #[command(subcommand)]
    command: Option<Commands>,
}

fn main() {
    let args = Args::parse();
    println!("[samscope] Starting SAM collection!");

    if let Some(toml) = args.toml {
        if !toml.is_empty() {
            let collection_results = samscope_core::core::parse_toml_file(&toml);
            match collection_results {
                Ok(_) => info!("[samscope] Collection success"),
                Err(err) => {
                    println!("[samscope] Failed to collect SAM data: {err:?}");
                    return;
                }
            }
        }
    } else if let Some(data) = args.data {
        if !data.is_empty() {
            let toml_data_results = general_purpose::STANDARD.decode(&data);
            let toml_data = match toml_data_results {
                Ok(results) => results,
                Err(err) => {
                    println!(
                        "[samscope] Failed to base64 decode TOML collector {data}, error: {err:?}",
                    );
                    return;
                }
            };
            let collection_results = samscope_core::core::parse_toml_data(&toml_data);
            match collection_results {
                Ok(_) => info!("[samscope] Collection success"),
                Err(err) => {
                    println!("[samscope] Failed to collect SAM data: {err:?}");
                    return;
                }
            }
        }
    } else if let Some(command) = args.command {
        let output = Output {
            name: String::from("local_collector"),
            directory: String::from("./tmp"),
            format: String::from("json"),
            compress: false,
            logging: Some(String::from("warn")),
        };
        run_collector(&command, output);
    } else {
        println!("[samscope] No TOML file, data or command provided!");
        return;
    }
    println!("[samscope] Finished SAM collection!");
}
