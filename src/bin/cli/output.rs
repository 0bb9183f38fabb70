//! Output formatting for CLI operations.

use std::path::Path;

use serde_json::{Value, json};
use z21cfg::read::ContainerInfo;
use z21cfg::{FunctionInfo, Locomotive, ParseOutcome, ParsedConfiguration, WriteResult};

/// Trait for output formatting
pub trait OutputFormatter {
    /// Formats a summary of a parsed container
    fn format_summary(&self, outcome: &ParseOutcome) -> String;

    /// Formats a list of locomotives
    fn format_list(&self, locomotives: &[&Locomotive], detailed: bool) -> String;

    /// Formats container information
    fn format_info(&self, info: &ContainerInfo, status: &str) -> String;

    /// Formats the result of an export
    fn format_export(&self, output: &Path, config: &ParsedConfiguration) -> String;

    /// Formats write results
    fn format_write_result(&self, result: &WriteResult) -> String;
}

/// Human-readable output formatter
pub struct HumanFormatter;

impl HumanFormatter {
    fn push_functions(output: &mut String, loco: &Locomotive) {
        if loco.function_count() == 0 {
            output.push_str("  No functions\n");
            return;
        }
        output.push_str(&format!(
            "  {:>4} {:>4} {:<16} {:<8} {:<12} {:>8} {}\n",
            "Fn", "Pos", "Icon", "Key", "Button", "Time", "Active"
        ));
        for info in loco.sorted_functions() {
            output.push_str(&format_function_row(info));
        }
    }
}

fn format_function_row(info: &FunctionInfo) -> String {
    let time = if info.is_timed() {
        format!("{}s", info.duration)
    } else {
        "-".to_string()
    };
    format!(
        "  {:>4} {:>4} {:<16} {:<8} {:<12} {:>8} {}\n",
        format!("F{}", info.number()),
        info.position,
        or_dash(&info.image_name),
        or_dash(&info.shortcut),
        info.button.to_string(),
        time,
        if info.active { "yes" } else { "no" }
    )
}

fn or_dash(value: &str) -> &str {
    if value.is_empty() { "-" } else { value }
}

fn direction_label(forward: bool) -> &'static str {
    if forward { "forward" } else { "reverse" }
}

impl OutputFormatter for HumanFormatter {
    fn format_summary(&self, outcome: &ParseOutcome) -> String {
        let config = outcome.config();
        let mut output = String::new();

        output.push_str("Configuration Summary:\n");
        output.push_str(&"-".repeat(40));
        output.push('\n');
        if let Some(reason) = outcome.fallback_reason() {
            output.push_str(&format!("  Status:         unparsed ({})\n", reason));
        }
        output.push_str(&format!("  Version:        {}\n", config.version));
        output.push_str(&format!(
            "  Locomotives:    {}\n",
            config.locomotives.len()
        ));
        output.push_str(&format!(
            "  Accessories:    {}\n",
            config.accessories.len()
        ));
        output.push_str(&format!("  Layouts:        {}\n", config.layouts.len()));
        output.push_str(&format!(
            "  Unknown blocks: {}\n",
            config.unknown_blocks.len()
        ));

        for loco in &config.locomotives {
            output.push_str(&format!(
                "  - {} (address {}, {} functions)\n",
                or_dash(&loco.name),
                loco.address,
                loco.function_count()
            ));
        }
        for block in &config.unknown_blocks {
            output.push_str(&format!(
                "  ? {} bytes at offset {}\n",
                block.length, block.offset
            ));
        }

        output
    }

    fn format_list(&self, locomotives: &[&Locomotive], detailed: bool) -> String {
        let mut output = String::new();

        if detailed {
            for loco in locomotives {
                output.push_str(&format!("{}\n", loco));
                output.push_str(&"-".repeat(40));
                output.push('\n');
                output.push_str(&format!("  Address:        {}\n", loco.address));
                output.push_str(&format!("  Max speed:      {}\n", loco.speed));
                output.push_str(&format!(
                    "  Direction:      {}\n",
                    direction_label(loco.direction)
                ));
                if let Some(id) = loco.vehicle_id {
                    output.push_str(&format!("  Vehicle:        {}\n", id));
                }
                Self::push_functions(&mut output, loco);
                output.push('\n');
            }
            return output;
        }

        output.push_str(&format!(
            "{:>7} {:>6} {:<9} {:>5} {}\n",
            "Address", "Speed", "Direction", "Funcs", "Name"
        ));
        output.push_str(&"-".repeat(60));
        output.push('\n');
        for loco in locomotives {
            output.push_str(&format!(
                "{:>7} {:>6} {:<9} {:>5} {}\n",
                loco.address,
                loco.speed,
                direction_label(loco.direction),
                loco.function_count(),
                loco.name
            ));
        }
        output.push_str(&"-".repeat(60));
        output.push('\n');
        output.push_str(&format!("{} locomotives\n", locomotives.len()));

        output
    }

    fn format_info(&self, info: &ContainerInfo, status: &str) -> String {
        let mut output = String::new();

        output.push_str("Container Information:\n");
        output.push_str(&"-".repeat(40));
        output.push('\n');
        output.push_str(&format!(
            "  File size:      {}\n",
            humanize_bytes(info.file_size)
        ));
        output.push_str(&format!("  Signature:      {}\n", info.signature.name()));

        if !info.is_zip {
            output.push_str(&format!("  Status:         {}\n", status));
            return output;
        }

        match &info.payload {
            Some(payload) => output.push_str(&format!(
                "  Payload:        {} ({})\n",
                payload.name, payload.format
            )),
            None => output.push_str("  Payload:        none\n"),
        }
        output.push_str(&format!("  Status:         {}\n", status));
        output.push_str(&format!("  Members:        {}\n", info.members.len()));
        output.push_str(&format!(
            "  Total size:     {}\n",
            humanize_bytes(info.total_size())
        ));
        output.push_str(&format!(
            "  Packed size:    {}\n",
            humanize_bytes(info.packed_size())
        ));
        output.push_str(&format!(
            "  Ratio:          {:.1}%\n",
            info.compression_ratio() * 100.0
        ));
        if let Some(comment) = &info.comment {
            output.push_str(&format!("  Comment:        {}\n", comment));
        }

        output.push('\n');
        output.push_str(&format!(
            "{:>12} {:>12} {:<10} {}\n",
            "Size", "Packed", "Method", "Name"
        ));
        output.push_str(&"-".repeat(60));
        output.push('\n');
        for member in &info.members {
            output.push_str(&format!(
                "{:>12} {:>12} {:<10} {}{}\n",
                humanize_bytes(member.size),
                humanize_bytes(member.compressed_size),
                format!("{:?}", member.method),
                member.name,
                if member.is_payload { " *" } else { "" }
            ));
        }

        output
    }

    fn format_export(&self, output: &Path, config: &ParsedConfiguration) -> String {
        format!(
            "Exported {} locomotives to {}\n",
            config.locomotives.len(),
            output.display()
        )
    }

    fn format_write_result(&self, result: &WriteResult) -> String {
        let mut output = String::new();

        output.push_str(&format!(
            "Wrote {} ({} locomotives updated, {} members copied)\n",
            result.output.display(),
            result.locomotives_updated,
            result.members_copied
        ));
        if result.functions_inserted + result.functions_updated + result.functions_deleted > 0 {
            output.push_str(&format!(
                "  Functions: {} inserted, {} updated, {} deleted\n",
                result.functions_inserted, result.functions_updated, result.functions_deleted
            ));
        }
        if !result.is_complete() {
            output.push_str("Not written (no matching stored vehicle):\n");
            for loco in &result.unresolved {
                output.push_str(&format!("  {} (address {})\n", loco.name, loco.address));
            }
        }

        output
    }
}

/// JSON output formatter
pub struct JsonFormatter;

impl OutputFormatter for JsonFormatter {
    fn format_summary(&self, outcome: &ParseOutcome) -> String {
        let mut obj = config_to_json(outcome.config());
        obj["fallback"] = json!(outcome.fallback_reason().map(|r| r.to_string()));
        serde_json::to_string_pretty(&obj).unwrap_or_else(|_| "{}".to_string())
    }

    fn format_list(&self, locomotives: &[&Locomotive], detailed: bool) -> String {
        let items: Vec<_> = locomotives
            .iter()
            .map(|loco| {
                let mut obj = locomotive_to_json(loco);
                if detailed {
                    obj["vehicle_id"] = json!(loco.vehicle_id.map(|id| id.as_i64()));
                    obj["function_details"] = loco
                        .sorted_functions()
                        .into_iter()
                        .map(function_to_json)
                        .collect();
                }
                obj
            })
            .collect();

        serde_json::to_string_pretty(&items).unwrap_or_else(|_| "[]".to_string())
    }

    fn format_info(&self, info: &ContainerInfo, status: &str) -> String {
        let obj = json!({
            "file_size": info.file_size,
            "signature": info.signature.name(),
            "is_zip": info.is_zip,
            "payload": info.payload.as_ref().map(|p| json!({
                "name": p.name,
                "format": p.format.to_string(),
                "generation": p.format.generation(),
            })),
            "status": status,
            "total_size": info.total_size(),
            "packed_size": info.packed_size(),
            "compression_ratio": info.compression_ratio(),
            "comment": info.comment,
            "members": info.members.iter().map(|m| json!({
                "name": m.name,
                "size": m.size,
                "compressed_size": m.compressed_size,
                "method": format!("{:?}", m.method),
                "is_payload": m.is_payload,
            })).collect::<Vec<_>>(),
        });

        serde_json::to_string_pretty(&obj).unwrap_or_else(|_| "{}".to_string())
    }

    fn format_export(&self, output: &Path, config: &ParsedConfiguration) -> String {
        let obj = json!({
            "output": output.display().to_string(),
            "locomotives": config.locomotives.len(),
        });

        serde_json::to_string_pretty(&obj).unwrap_or_else(|_| "{}".to_string())
    }

    fn format_write_result(&self, result: &WriteResult) -> String {
        let obj = json!({
            "success": result.is_complete(),
            "output": result.output.display().to_string(),
            "payload_member": result.payload_member,
            "payload_bytes": result.payload_bytes,
            "members_copied": result.members_copied,
            "locomotives_updated": result.locomotives_updated,
            "functions_inserted": result.functions_inserted,
            "functions_updated": result.functions_updated,
            "functions_deleted": result.functions_deleted,
            "staged": result.staged,
            "unresolved": result.unresolved.iter().map(|u| json!({
                "index": u.index,
                "address": u.address,
                "name": u.name,
            })).collect::<Vec<_>>(),
        });

        serde_json::to_string_pretty(&obj).unwrap_or_else(|_| "{}".to_string())
    }
}

/// Creates the appropriate formatter based on output format
pub fn create_formatter(format: super::OutputFormat) -> Box<dyn OutputFormatter> {
    match format {
        super::OutputFormat::Human => Box::new(HumanFormatter),
        super::OutputFormat::Json => Box::new(JsonFormatter),
    }
}

/// Builds the export document for a configuration.
pub fn config_to_json(config: &ParsedConfiguration) -> Value {
    json!({
        "version": config.version,
        "locomotives": config.locomotives.iter().map(locomotive_to_json).collect::<Vec<_>>(),
        "accessories": config.accessories.iter().map(|a| json!({
            "address": a.address,
            "name": a.name,
            "type": a.kind,
            "state": a.state,
        })).collect::<Vec<_>>(),
        "layouts": config.layouts.iter().map(|l| json!({
            "name": l.name,
            "track_type": l.track_type,
            "blocks": l.blocks,
        })).collect::<Vec<_>>(),
        "unknown_blocks": config.unknown_blocks.iter().map(|b| json!({
            "offset": b.offset,
            "length": b.length,
            "data": hex_encode(&b.data),
        })).collect::<Vec<_>>(),
    })
}

fn locomotive_to_json(loco: &Locomotive) -> Value {
    let functions: serde_json::Map<String, Value> = loco
        .functions()
        .into_iter()
        .map(|(number, active)| (number.to_string(), Value::Bool(active)))
        .collect();
    let cvs: serde_json::Map<String, Value> = loco
        .cvs
        .iter()
        .map(|(cv, value)| (cv.to_string(), json!(value)))
        .collect();

    json!({
        "address": loco.address,
        "name": loco.name,
        "functions": functions,
        "cvs": cvs,
        "speed": loco.speed,
        "direction": loco.direction,
    })
}

fn function_to_json(info: &FunctionInfo) -> Value {
    json!({
        "number": info.number(),
        "image_name": info.image_name,
        "shortcut": info.shortcut,
        "position": info.position,
        "duration": info.duration,
        "button": info.button.name(),
        "button_code": info.button.code(),
        "active": info.active,
    })
}

/// Encodes bytes as lowercase hex
pub fn hex_encode(data: &[u8]) -> String {
    use std::fmt::Write;

    let mut out = String::with_capacity(data.len() * 2);
    for byte in data {
        let _ = write!(out, "{:02x}", byte);
    }
    out
}

/// Converts bytes to a human-readable string
pub fn humanize_bytes(bytes: u64) -> String {
    const KB: u64 = 1024;
    const MB: u64 = KB * 1024;
    const GB: u64 = MB * 1024;

    if bytes >= GB {
        format!("{:.1} GB", bytes as f64 / GB as f64)
    } else if bytes >= MB {
        format!("{:.1} MB", bytes as f64 / MB as f64)
    } else if bytes >= KB {
        format!("{:.1} KB", bytes as f64 / KB as f64)
    } else {
        format!("{} B", bytes)
    }
}
