//! CLI tool for Z21 configuration containers.

mod commands;
mod exit_codes;
mod output;

use clap::{ArgGroup, CommandFactory, Parser, Subcommand, ValueEnum};
use clap_complete::{Shell, generate};
use std::path::PathBuf;
use z21cfg::ButtonKind;

use exit_codes::ExitCode;

/// Z21 model-railway configuration tool
#[derive(Parser)]
#[command(name = "z21cfg")]
#[command(author, version, about = "Read and edit Z21 configuration files", long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Output format
    #[arg(long, short = 'f', value_enum, default_value = "human", global = true)]
    format: OutputFormat,

    /// Increase log verbosity (-v info, -vv debug, -vvv trace)
    #[arg(long, short = 'v', action = clap::ArgAction::Count, global = true)]
    verbose: u8,
}

#[derive(Subcommand)]
enum Commands {
    /// Print a summary of a container (alias: r)
    #[command(alias = "r")]
    Read {
        /// Container file to read
        file: PathBuf,
    },

    /// Export a container to JSON
    Export {
        /// Container file to export
        file: PathBuf,

        /// JSON file to write
        output: PathBuf,
    },

    /// List locomotives (alias: l)
    #[command(alias = "l")]
    #[command(group(ArgGroup::new("filter").args(["address", "name", "search"])))]
    List {
        /// Container file to list
        file: PathBuf,

        /// Show every field and the function table
        #[arg(long, short = 'd')]
        detailed: bool,

        /// Only locomotives with this address
        #[arg(long, short = 'a')]
        address: Option<u32>,

        /// Only the locomotive with this name (case-insensitive)
        #[arg(long, short = 'n')]
        name: Option<String>,

        /// Only locomotives whose name contains this text
        #[arg(long, short = 's')]
        search: Option<String>,
    },

    /// Show container members and payload format (alias: i)
    #[command(alias = "i")]
    Info {
        /// Container file to inspect
        file: PathBuf,
    },

    /// Edit one locomotive and write the container back
    Edit {
        /// Container file to edit
        file: PathBuf,

        /// Address of the locomotive to edit
        #[arg(long, short = 'a')]
        address: u32,

        /// New address
        #[arg(long)]
        new_address: Option<u32>,

        /// New name
        #[arg(long, short = 'n')]
        name: Option<String>,

        /// New maximum speed
        #[arg(long)]
        speed: Option<u32>,

        /// New traction direction
        #[arg(long, value_enum)]
        direction: Option<Direction>,

        #[command(flatten)]
        write: WriteArgs,
    },

    /// Add, change or remove a locomotive function
    Function {
        #[command(subcommand)]
        action: FunctionAction,
    },

    /// Generate shell completions
    Completions {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: Shell,
    },
}

#[derive(Subcommand)]
enum FunctionAction {
    /// Add a function or change an existing one
    Set {
        /// Container file to edit
        file: PathBuf,

        /// Address of the locomotive
        #[arg(long, short = 'a')]
        address: u32,

        /// Function number (0-127)
        #[arg(long, short = 'F', value_parser = clap::value_parser!(u8).range(0..=127))]
        number: u8,

        /// Icon name
        #[arg(long)]
        icon: Option<String>,

        /// Keyboard shortcut
        #[arg(long)]
        shortcut: Option<String>,

        /// Button kind (switch, push-button, time, or a numeric code)
        #[arg(long)]
        button: Option<ButtonKind>,

        /// Duration in seconds; makes the function a time button
        #[arg(long)]
        duration: Option<f64>,

        /// Display position
        #[arg(long)]
        position: Option<i64>,

        #[command(flatten)]
        write: WriteArgs,
    },

    /// Remove a function
    Remove {
        /// Container file to edit
        file: PathBuf,

        /// Address of the locomotive
        #[arg(long, short = 'a')]
        address: u32,

        /// Function number (0-127)
        #[arg(long, short = 'F', value_parser = clap::value_parser!(u8).range(0..=127))]
        number: u8,

        #[command(flatten)]
        write: WriteArgs,
    },
}

/// Options shared by every command that writes a container.
#[derive(clap::Args)]
struct WriteArgs {
    /// Write to this file instead of replacing the input
    #[arg(short = 'o', long)]
    output: Option<PathBuf>,

    /// Fail if a locomotive has no matching stored vehicle
    #[arg(long)]
    strict: bool,

    /// Deflate level for the rewritten payload (1-9)
    #[arg(short = 'l', long, value_parser = clap::value_parser!(u32).range(1..=9))]
    level: Option<u32>,
}

#[derive(Copy, Clone, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    Human,
    Json,
}

#[derive(Copy, Clone, PartialEq, Eq, ValueEnum)]
pub enum Direction {
    Forward,
    Reverse,
}

fn init_logging(verbose: u8) {
    let level = match verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level))
        .format_timestamp(None)
        .init();
}

fn main() {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let exit_code = match cli.command {
        Commands::Read { file } => commands::read(&file, cli.format),

        Commands::Export { file, output } => commands::export(&file, &output, cli.format),

        Commands::List {
            file,
            detailed,
            address,
            name,
            search,
        } => {
            let filter = match (address, name, search) {
                (Some(address), _, _) => commands::LocoFilter::Address(address),
                (_, Some(name), _) => commands::LocoFilter::Name(name),
                (_, _, Some(term)) => commands::LocoFilter::Search(term),
                _ => commands::LocoFilter::All,
            };
            commands::list(&file, &filter, detailed, cli.format)
        }

        Commands::Info { file } => commands::info(&file, cli.format),

        Commands::Edit {
            file,
            address,
            new_address,
            name,
            speed,
            direction,
            write,
        } => commands::edit(&commands::EditConfig {
            path: &file,
            address,
            new_address,
            name,
            speed,
            direction: direction.map(|d| d == Direction::Forward),
            write: write.to_config(),
            format: cli.format,
        }),

        Commands::Function { action } => match action {
            FunctionAction::Set {
                file,
                address,
                number,
                icon,
                shortcut,
                button,
                duration,
                position,
                write,
            } => commands::function_set(&commands::FunctionSetConfig {
                path: &file,
                address,
                number,
                icon,
                shortcut,
                button,
                duration,
                position,
                write: write.to_config(),
                format: cli.format,
            }),

            FunctionAction::Remove {
                file,
                address,
                number,
                write,
            } => commands::function_remove(
                &file,
                address,
                number,
                &write.to_config(),
                cli.format,
            ),
        },

        Commands::Completions { shell } => {
            let mut cmd = Cli::command();
            let name = cmd.get_name().to_string();
            generate(shell, &mut cmd, name, &mut std::io::stdout());
            ExitCode::Success
        }
    };

    std::process::exit(exit_code.code());
}

impl WriteArgs {
    fn to_config(&self) -> commands::WriteConfig {
        commands::WriteConfig {
            output: self.output.clone(),
            strict: self.strict,
            level: self.level,
        }
    }
}
