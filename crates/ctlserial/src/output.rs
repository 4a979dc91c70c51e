use std::io::IsTerminal;
use std::time::{SystemTime, UNIX_EPOCH};

use clap::ValueEnum;
use comfy_table::{presets::UTF8_FULL, ContentArrangement, Table};
use ctlserial_envelope::{InvalidLine, ParsedLine};
use ctlserial_executor::{ExecutorStats, Value};
use serde::Serialize;

#[derive(Clone, Debug, Copy, ValueEnum)]
pub enum OutputFormat {
    Json,
    Table,
    Pretty,
}

impl OutputFormat {
    pub fn default_for_stdout() -> Self {
        if std::io::stdout().is_terminal() {
            Self::Table
        } else {
            Self::Json
        }
    }
}

#[derive(Serialize)]
struct ResultOutput<'a> {
    opcode: u8,
    values: &'a [Value],
    attempts: u64,
    log_messages: u64,
}

pub fn print_result(opcode: u8, values: &[Value], stats: &ExecutorStats, format: OutputFormat) {
    match format {
        OutputFormat::Json => {
            let out = ResultOutput {
                opcode,
                values,
                attempts: stats.attempts,
                log_messages: stats.log_messages,
            };
            println!(
                "{}",
                serde_json::to_string(&out).unwrap_or_else(|_| "{}".to_string())
            );
        }
        OutputFormat::Table => {
            let mut table = Table::new();
            table
                .load_preset(UTF8_FULL)
                .set_content_arrangement(ContentArrangement::Dynamic)
                .set_header(vec!["INDEX", "TYPE", "VALUE"]);
            for (index, value) in values.iter().enumerate() {
                table.add_row(vec![
                    index.to_string(),
                    value_type(value).to_string(),
                    value.to_string(),
                ]);
            }
            println!("{table}");
        }
        OutputFormat::Pretty => {
            println!(
                "opcode=0x{opcode:02X} attempts={} values=[{}]",
                stats.attempts,
                join_values(values)
            );
        }
    }
}

#[derive(Serialize)]
struct LineOutput<'a> {
    kind: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    sequence: Option<u8>,
    #[serde(skip_serializing_if = "Option::is_none")]
    values: Option<&'a [Value]>,
    #[serde(skip_serializing_if = "Option::is_none")]
    text: Option<String>,
    timestamp: String,
}

/// Print one classified line seen by `monitor`.
pub fn print_line(line: &ParsedLine, format: OutputFormat) {
    let (kind, sequence, values, text) = match line {
        ParsedLine::Response(response) => (
            "response",
            Some(response.sequence),
            Some(response.values.as_slice()),
            None,
        ),
        ParsedLine::LogMessage(text) => ("log", None, None, Some(text.clone())),
        ParsedLine::Invalid(reason) => ("invalid", None, None, Some(invalid_text(reason))),
    };

    match format {
        OutputFormat::Json => {
            let out = LineOutput {
                kind,
                sequence,
                values,
                text,
                timestamp: now_unix_seconds(),
            };
            println!(
                "{}",
                serde_json::to_string(&out).unwrap_or_else(|_| "{}".to_string())
            );
        }
        OutputFormat::Table => {
            let mut table = Table::new();
            table
                .load_preset(UTF8_FULL)
                .set_content_arrangement(ContentArrangement::Dynamic)
                .set_header(vec!["KIND", "SEQ", "CONTENT"])
                .add_row(vec![
                    kind.to_string(),
                    sequence.map(|s| format!("{s:02X}")).unwrap_or_default(),
                    values.map(join_values).or(text).unwrap_or_default(),
                ]);
            println!("{table}");
        }
        OutputFormat::Pretty => match (sequence, values) {
            (Some(sequence), Some(values)) => {
                println!("{kind} seq={sequence:02X} values=[{}]", join_values(values));
            }
            _ => println!("{kind} {}", text.unwrap_or_default()),
        },
    }
}

fn invalid_text(reason: &InvalidLine) -> String {
    match reason {
        InvalidLine::Empty => String::new(),
        other => other.to_string(),
    }
}

fn value_type(value: &Value) -> &'static str {
    if value.is_text() {
        "string"
    } else {
        "int"
    }
}

fn join_values(values: &[Value]) -> String {
    values
        .iter()
        .map(|value| match value {
            Value::Int(n) => n.to_string(),
            Value::Text(s) => format!("{s:?}"),
        })
        .collect::<Vec<_>>()
        .join(", ")
}

fn now_unix_seconds() -> String {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs().to_string())
        .unwrap_or_else(|_| "0".to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn joins_mixed_values() {
        let values = [Value::from(0), Value::from(-3), Value::from("ok")];
        assert_eq!(join_values(&values), "0, -3, \"ok\"");
    }

    #[test]
    fn result_json_shape() {
        let values = [Value::from(0), Value::from("volts")];
        let out = ResultOutput {
            opcode: 0x61,
            values: &values,
            attempts: 2,
            log_messages: 0,
        };
        let json = serde_json::to_value(&out).unwrap();
        assert_eq!(
            json,
            serde_json::json!({"opcode": 97, "values": [0, "volts"], "attempts": 2, "log_messages": 0})
        );
    }
}
