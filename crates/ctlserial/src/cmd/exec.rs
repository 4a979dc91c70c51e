use ctlserial_envelope::OPCODE_MAX;
use ctlserial_executor::Value;
use tracing::debug;

use crate::cmd::ExecArgs;
use crate::exit::{execute_error, CliError, CliResult, SUCCESS, USAGE};
use crate::output::{print_result, OutputFormat};

pub fn run(args: ExecArgs, format: OutputFormat) -> CliResult<i32> {
    let opcode = parse_opcode(&args.opcode)?;
    let values: Vec<Value> = args.args.iter().map(|arg| parse_arg(arg)).collect();

    let mut device = args.link.connect()?;
    debug!(opcode, args = values.len(), "executing command");
    let result = device
        .execute(opcode, &values)
        .map_err(|err| execute_error("exec failed", err))?;

    print_result(opcode as u8, &result, &device.stats(), format);
    Ok(SUCCESS)
}

/// Accepts `114`, `0x72` or `r`.
fn parse_opcode(input: &str) -> CliResult<u32> {
    let input = input.trim();
    let parsed = if let Some(hex) = input
        .strip_prefix("0x")
        .or_else(|| input.strip_prefix("0X"))
    {
        u32::from_str_radix(hex, 16).ok()
    } else if let Ok(n) = input.parse::<u32>() {
        Some(n)
    } else {
        let mut chars = input.chars();
        match (chars.next(), chars.next()) {
            (Some(c), None) if c.is_ascii() => Some(c as u32),
            _ => None,
        }
    };

    match parsed {
        Some(opcode) if opcode <= OPCODE_MAX => Ok(opcode),
        Some(opcode) => Err(CliError::new(
            USAGE,
            format!("opcode {opcode} is out of range (max {OPCODE_MAX})"),
        )),
        None => Err(CliError::new(USAGE, format!("invalid opcode: {input}"))),
    }
}

fn parse_arg(input: &str) -> Value {
    match input.parse::<i64>() {
        Ok(n) => Value::Int(n),
        Err(_) => Value::Text(input.to_string()),
    }
}
