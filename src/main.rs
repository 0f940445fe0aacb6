use clap::Parser;
use schemamap::cli::{Cli, Command};
use schemamap::{cmd_init, cmd_query, cmd_render, cmd_serve};
use tracing_subscriber::EnvFilter;

fn main() {
    // Logs go to stderr so `render` output on stdout stays clean.
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    let exit_code = match cli.command {
        Command::Render(args) => cmd_render(args),
        Command::Serve(args) => cmd_serve(args),
        Command::Query(args) => cmd_query(args),
        Command::Init(args) => cmd_init(args),
    };

    std::process::exit(exit_code);
}
