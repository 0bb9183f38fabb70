//! Command implementations for the CLI.

use std::path::{Path, PathBuf};

use z21cfg::{
    ButtonKind, Container, FunctionInfo, Locomotive, ParseOutcome, ParsedConfiguration,
    WriteOptions,
};

use crate::OutputFormat;
use crate::exit_codes::{ExitCode, error_to_exit_code};
use crate::output::{config_to_json, create_formatter};

/// Which locomotives `list` shows.
pub enum LocoFilter {
    All,
    Address(u32),
    Name(String),
    Search(String),
}

/// Write settings shared by the editing commands.
pub struct WriteConfig {
    pub output: Option<PathBuf>,
    pub strict: bool,
    pub level: Option<u32>,
}

/// Configuration for the edit command.
pub struct EditConfig<'a> {
    pub path: &'a Path,
    pub address: u32,
    pub new_address: Option<u32>,
    pub name: Option<String>,
    pub speed: Option<u32>,
    pub direction: Option<bool>,
    pub write: WriteConfig,
    pub format: OutputFormat,
}

/// Configuration for the function set command.
pub struct FunctionSetConfig<'a> {
    pub path: &'a Path,
    pub address: u32,
    pub number: u8,
    pub icon: Option<String>,
    pub shortcut: Option<String>,
    pub button: Option<ButtonKind>,
    pub duration: Option<f64>,
    pub position: Option<i64>,
    pub write: WriteConfig,
    pub format: OutputFormat,
}

/// Read command implementation
pub fn read(path: &Path, format: OutputFormat) -> ExitCode {
    let formatter = create_formatter(format);

    let outcome = match open_and_parse(path) {
        Ok((_, outcome)) => outcome,
        Err(code) => return code,
    };

    print!("{}", formatter.format_summary(&outcome));

    if outcome.is_fallback() {
        ExitCode::Warning
    } else {
        ExitCode::Success
    }
}

/// Export command implementation
pub fn export(path: &Path, output: &Path, format: OutputFormat) -> ExitCode {
    let formatter = create_formatter(format);

    let outcome = match open_and_parse(path) {
        Ok((_, outcome)) => outcome,
        Err(code) => return code,
    };

    let document = config_to_json(outcome.config());
    let text = match serde_json::to_string_pretty(&document) {
        Ok(text) => text,
        Err(e) => {
            eprintln!("Error: {}", e);
            return ExitCode::FatalError;
        }
    };
    if let Err(e) = std::fs::write(output, text) {
        eprintln!("Error writing {}: {}", output.display(), e);
        return ExitCode::IoError;
    }

    print!("{}", formatter.format_export(output, outcome.config()));

    if outcome.is_fallback() {
        ExitCode::Warning
    } else {
        ExitCode::Success
    }
}

/// List command implementation
pub fn list(path: &Path, filter: &LocoFilter, detailed: bool, format: OutputFormat) -> ExitCode {
    let formatter = create_formatter(format);

    let outcome = match open_and_parse(path) {
        Ok((_, outcome)) => outcome,
        Err(code) => return code,
    };
    let config = outcome.config();

    let selected = select(config, filter);
    if selected.is_empty() && !matches!(filter, LocoFilter::All) {
        eprintln!("No locomotive matches the filter");
        return ExitCode::Warning;
    }

    print!("{}", formatter.format_list(&selected, detailed));

    ExitCode::Success
}

fn select<'a>(config: &'a ParsedConfiguration, filter: &LocoFilter) -> Vec<&'a Locomotive> {
    match filter {
        LocoFilter::All => config.locomotives.iter().collect(),
        LocoFilter::Address(address) => config
            .locomotives
            .iter()
            .filter(|loco| loco.address == *address)
            .collect(),
        LocoFilter::Name(name) => config.find_by_name(name).into_iter().collect(),
        LocoFilter::Search(term) => config.search(term),
    }
}

/// Info command implementation
pub fn info(path: &Path, format: OutputFormat) -> ExitCode {
    let formatter = create_formatter(format);

    let container = match open_container(path) {
        Ok(c) => c,
        Err(code) => return code,
    };

    let info = match container.info() {
        Ok(info) => info,
        Err(e) => {
            eprintln!("Error reading container: {}", e);
            return error_to_exit_code(&e);
        }
    };

    let status = match container.parse() {
        Ok(ParseOutcome::Parsed(config)) => {
            format!("parsed ({} locomotives)", config.locomotives.len())
        }
        Ok(ParseOutcome::Fallback { reason, .. }) => format!("unparsed ({})", reason),
        Err(e) => format!("error ({})", e),
    };

    print!("{}", formatter.format_info(&info, &status));

    ExitCode::Success
}

/// Edit command implementation
pub fn edit(config: &EditConfig<'_>) -> ExitCode {
    let (container, mut parsed) = match open_for_edit(config.path) {
        Ok(opened) => opened,
        Err(code) => return code,
    };

    let Some(loco) = parsed.find_by_address_mut(config.address) else {
        eprintln!("Error: No locomotive with address {}", config.address);
        return ExitCode::BadArgs;
    };

    if let Some(address) = config.new_address {
        loco.address = address;
    }
    if let Some(name) = &config.name {
        loco.name = name.clone();
    }
    if let Some(speed) = config.speed {
        loco.speed = speed;
    }
    if let Some(forward) = config.direction {
        loco.direction = forward;
    }

    write_back(&container, &mut parsed, &config.write, config.format)
}

/// Function set command implementation
pub fn function_set(config: &FunctionSetConfig<'_>) -> ExitCode {
    let (container, mut parsed) = match open_for_edit(config.path) {
        Ok(opened) => opened,
        Err(code) => return code,
    };

    let Some(loco) = parsed.find_by_address_mut(config.address) else {
        eprintln!("Error: No locomotive with address {}", config.address);
        return ExitCode::BadArgs;
    };

    if let Err(e) = apply_function(loco, config) {
        eprintln!("Error: {}", e);
        return error_to_exit_code(&e);
    }

    write_back(&container, &mut parsed, &config.write, config.format)
}

fn apply_function(loco: &mut Locomotive, config: &FunctionSetConfig<'_>) -> z21cfg::Result<()> {
    let mut info = match loco.function(config.number) {
        Some(existing) => existing.clone(),
        None => FunctionInfo::new(config.number)?.with_position(loco.next_position()),
    };

    if let Some(icon) = &config.icon {
        info.image_name = icon.clone();
    }
    if let Some(shortcut) = &config.shortcut {
        info.shortcut = shortcut.clone();
    }
    if let Some(position) = config.position {
        info.position = position;
    }
    if let Some(kind) = config.button {
        info.set_button(kind);
    }
    if let Some(seconds) = config.duration {
        if config.button.is_some_and(|kind| kind != ButtonKind::Timed) {
            return Err(z21cfg::Error::invalid_value(
                "duration",
                format!("{} (only time buttons have a duration)", seconds),
            ));
        }
        info.set_timed(seconds)?;
    }

    loco.insert_function(info)?;
    Ok(())
}

/// Function remove command implementation
pub fn function_remove(
    path: &Path,
    address: u32,
    number: u8,
    write: &WriteConfig,
    format: OutputFormat,
) -> ExitCode {
    let (container, mut parsed) = match open_for_edit(path) {
        Ok(opened) => opened,
        Err(code) => return code,
    };

    let Some(loco) = parsed.find_by_address_mut(address) else {
        eprintln!("Error: No locomotive with address {}", address);
        return ExitCode::BadArgs;
    };
    if loco.remove_function(number).is_none() {
        eprintln!("Error: Function F{} not found on {}", number, loco);
        return ExitCode::BadArgs;
    }

    write_back(&container, &mut parsed, write, format)
}

fn write_back(
    container: &Container,
    parsed: &mut ParsedConfiguration,
    write: &WriteConfig,
    format: OutputFormat,
) -> ExitCode {
    let formatter = create_formatter(format);

    let mut options = WriteOptions::new().strict_identity(write.strict);
    if let Some(level) = write.level {
        options = options.level_clamped(level);
    }
    let output = write.output.as_deref().unwrap_or(container.path());

    match container.write_with_options(parsed, output, &options) {
        Ok(result) => {
            print!("{}", formatter.format_write_result(&result));
            if result.is_complete() {
                ExitCode::Success
            } else {
                ExitCode::Warning
            }
        }
        Err(e) => {
            eprintln!("Error writing {}: {}", output.display(), e);
            error_to_exit_code(&e)
        }
    }
}

/// Opens and parses a container that is about to be edited.
///
/// Only a cleanly parsed configuration can be written back.
fn open_for_edit(path: &Path) -> Result<(Container, ParsedConfiguration), ExitCode> {
    let (container, outcome) = open_and_parse(path)?;
    match outcome {
        ParseOutcome::Parsed(config) => Ok((container, config)),
        ParseOutcome::Fallback { reason, .. } => {
            eprintln!("Error: Cannot edit {}: {}", path.display(), reason);
            Err(ExitCode::BadContainer)
        }
    }
}

fn open_and_parse(path: &Path) -> Result<(Container, ParseOutcome), ExitCode> {
    let container = open_container(path)?;
    let outcome = container.parse().map_err(|e| {
        eprintln!("Error parsing {}: {}", path.display(), e);
        error_to_exit_code(&e)
    })?;
    Ok((container, outcome))
}

/// Helper to open a container, reporting a missing file without a panic
fn open_container(path: &Path) -> Result<Container, ExitCode> {
    if !path.exists() {
        eprintln!("Error: File not found: {}", path.display());
        return Err(ExitCode::IoError);
    }

    Container::open(path).map_err(|e| {
        eprintln!("Error opening container: {}", e);
        error_to_exit_code(&e)
    })
}
