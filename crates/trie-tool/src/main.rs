extern crate alloc;

use std::process::ExitCode;

use bpaf::Bpaf;

mod commands;
mod config;
mod logging;

use crate::commands::build::{BuildArgs, build_args};
use crate::commands::dump::{DumpArgs, dump_args};
use crate::commands::get::{GetArgs, get_args};
use crate::commands::keys::{KeysArgs, keys_args};
use crate::commands::list::{ListArgs, list_args};
use crate::logging::LogLevel;

#[derive(Debug, Clone, Bpaf)]
#[bpaf(options, version, fallback_to_usage, generate(cli))]
#[allow(clippy::upper_case_acronyms)]
/// Build, inspect and query code point tries and byte tries
struct CLI {
    /// The level of logging. In order, from the most verbose to the least verbose:
    /// debug, info, warn, error. Without it, TRIE_TOOL_LOG is used.
    #[bpaf(
        long("log-level"),
        argument("none|debug|info|warn|error"),
        fallback(LogLevel::None),
        display_fallback
    )]
    log_level: LogLevel,

    #[bpaf(external(commands))]
    command: Commands,
}

#[derive(Debug, Clone, Bpaf)]
enum Commands {
    /// Build a code point trie from a TOML map description
    #[bpaf(command("build"))]
    Build(#[bpaf(external(build_args))] BuildArgs),

    /// Print the value ranges of a binary code point trie
    #[bpaf(command("dump"))]
    Dump(#[bpaf(external(dump_args))] DumpArgs),

    /// Print the value of one code point
    #[bpaf(command("get"))]
    Get(#[bpaf(external(get_args))] GetArgs),

    /// Build a byte trie from a TOML key set
    #[bpaf(command("keys"))]
    Keys(#[bpaf(external(keys_args))] KeysArgs),

    /// List the keys and values of a byte trie
    #[bpaf(command("list"))]
    List(#[bpaf(external(list_args))] ListArgs),

    /// Print version information
    #[bpaf(command("version"))]
    Version,
}

fn main() -> ExitCode {
    let cli = cli().run();
    logging::init(cli.log_level);

    let result = match cli.command {
        Commands::Build(args) => args.run(),
        Commands::Dump(args) => args.run(&mut std::io::stdout().lock()),
        Commands::Get(args) => args.run(&mut std::io::stdout().lock()),
        Commands::Keys(args) => args.run(),
        Commands::List(args) => args.run(&mut std::io::stdout().lock()),
        Commands::Version => {
            println!("trie-tool {}", env!("CARGO_PKG_VERSION"));
            return ExitCode::SUCCESS;
        }
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {e:#}");
            ExitCode::from(1)
        }
    }
}
