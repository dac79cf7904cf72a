use std::process;

use clap::Parser;
use sql_query_renderer::{
    app::{
        BatchParams, RenderParams, calculate_exit_code, create_output_options, run_batch,
        run_connection, run_render
    },
    cli::{Cli, Commands},
    config::Config,
    error::AppResult,
    logging,
    output::{format_batch_report, format_connection, format_render_report}
};

fn main() {
    match run() {
        Ok(code) => process::exit(code),
        Err(e) => {
            eprintln!("Error: {}", e);
            process::exit(1);
        }
    }
}

fn run() -> AppResult<i32> {
    let cli = Cli::parse();
    let config = match &cli.config {
        Some(path) => Config::load_from(path)?,
        None => Config::load()?
    };

    match cli.command {
        Commands::Render {
            sql,
            params,
            types,
            dialect,
            connection,
            output_format,
            verify,
            no_color
        } => {
            logging::init(&config.logging.level, !no_color);
            let report = run_render(
                RenderParams {
                    sql,
                    params,
                    types,
                    dialect,
                    connection,
                    verify
                },
                &config
            )?;
            let opts = create_output_options(output_format, no_color);
            println!("{}", format_render_report(&report, &opts));
            Ok(0)
        }
        Commands::Batch {
            input,
            dialect,
            connection,
            output_format,
            progress,
            no_color
        } => {
            logging::init(&config.logging.level, !no_color);
            let report = run_batch(
                BatchParams {
                    input: input.display().to_string(),
                    dialect,
                    connection,
                    progress
                },
                &config
            )?;
            let opts = create_output_options(output_format, no_color);
            println!("{}", format_batch_report(&report, &opts));
            Ok(calculate_exit_code(&report))
        }
        Commands::Connection {
            name,
            output_format,
            no_color
        } => {
            logging::init(&config.logging.level, !no_color);
            let settings = run_connection(name.as_deref(), &config)?;
            let opts = create_output_options(output_format, no_color);
            println!("{}", format_connection(&settings, &opts));
            Ok(0)
        }
    }
}
