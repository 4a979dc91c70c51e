#![cfg(all(unix, feature = "cli"))]

use std::io::{BufRead, BufReader, Write};
use std::net::TcpListener;
use std::process::{Command, Output};
use std::thread;

use ctlserial::envelope::{Command as DeviceCommand, EnvelopeDecoder, EnvelopeEncoder};
use ctlserial::Value;

/// Serve one connection like firmware would: every decodable command line is
/// passed to `respond`, whose lines are written back verbatim.
fn spawn_device<F>(mut respond: F) -> String
where
    F: FnMut(&DeviceCommand) -> Vec<String> + Send + 'static,
{
    let listener = TcpListener::bind("127.0.0.1:0").expect("listener should bind");
    let addr = listener
        .local_addr()
        .expect("listener should have an address")
        .to_string();

    thread::spawn(move || {
        let (stream, _) = listener.accept().expect("client should connect");
        let mut writer = stream.try_clone().expect("stream should clone");
        let reader = BufReader::new(stream);
        for line in reader.lines() {
            let Ok(line) = line else { break };
            let Ok(command) = EnvelopeDecoder::decode_command(&line) else {
                continue;
            };
            for reply in respond(&command) {
                if writer.write_all(reply.as_bytes()).is_err() {
                    return;
                }
            }
        }
    });

    addr
}

/// Serve one connection that streams `lines` unprompted.
fn spawn_talker(lines: Vec<String>) -> String {
    let listener = TcpListener::bind("127.0.0.1:0").expect("listener should bind");
    let addr = listener
        .local_addr()
        .expect("listener should have an address")
        .to_string();

    thread::spawn(move || {
        let (mut stream, _) = listener.accept().expect("client should connect");
        for line in lines {
            let _ = stream.write_all(format!("{line}\r\n").as_bytes());
        }
        let _ = stream.flush();
        // Keep the link open until the client hangs up.
        let mut sink = String::new();
        let _ = BufReader::new(stream).read_line(&mut sink);
    });

    addr
}

fn reply(command: &DeviceCommand, values: &[Value]) -> String {
    EnvelopeEncoder::encode_response(command.sequence(), values)
        .expect("response should encode")
        .frame()
        .to_string()
}

fn ctlserial(args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_ctlserial"))
        .env_remove("CTLSERIAL_PORT")
        .env_remove("CTLSERIAL_TCP")
        .arg("--log-level")
        .arg("error")
        .args(args)
        .output()
        .expect("ctlserial should run")
}

#[test]
fn exec_prints_result_values_as_json() {
    let addr = spawn_device(|command| {
        let mut values = vec![Value::from(0)];
        values.extend(command.args().iter().cloned());
        vec![
            "#!command received\r\n".to_string(),
            reply(command, &values),
        ]
    });

    let output = ctlserial(&["exec", "--tcp", &addr, "0x61", "7", "volts", "--format", "json"]);

    assert_eq!(output.status.code(), Some(0), "stderr: {}", String::from_utf8_lossy(&output.stderr));
    let json: serde_json::Value =
        serde_json::from_slice(&output.stdout).expect("stdout should be json");
    assert_eq!(json["opcode"], 0x61);
    assert_eq!(json["values"], serde_json::json!([0, 7, "volts"]));
    assert_eq!(json["attempts"], 1);
    assert_eq!(json["log_messages"], 1);
}

#[test]
fn corrupted_reply_is_retried() {
    let mut calls = 0;
    let addr = spawn_device(move |command| {
        calls += 1;
        let line = reply(command, &[Value::from(0), Value::from(123)]);
        if calls == 1 {
            vec![line.replace("123", "124")]
        } else {
            vec![line]
        }
    });

    let output = ctlserial(&["exec", "--tcp", &addr, "r", "--format", "json"]);

    assert_eq!(output.status.code(), Some(0), "stderr: {}", String::from_utf8_lossy(&output.stderr));
    let json: serde_json::Value =
        serde_json::from_slice(&output.stdout).expect("stdout should be json");
    assert_eq!(json["values"], serde_json::json!([0, 123]));
    assert_eq!(json["attempts"], 2);
}

#[test]
fn device_error_status_exits_data_invalid() {
    let addr = spawn_device(|command| {
        vec![reply(command, &[Value::from(1), Value::from("Command error")])]
    });

    let output = ctlserial(&["exec", "--tcp", &addr, "0x65", "0"]);

    assert_eq!(output.status.code(), Some(60));
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("Command error"), "stderr: {stderr}");
}

#[test]
fn no_status_returns_raw_values() {
    let addr = spawn_device(|command| vec![reply(command, &[Value::from(1), Value::from(2)])]);

    let output = ctlserial(&["exec", "--tcp", &addr, "--no-status", "1", "--format", "json"]);

    assert_eq!(output.status.code(), Some(0));
    let json: serde_json::Value =
        serde_json::from_slice(&output.stdout).expect("stdout should be json");
    assert_eq!(json["values"], serde_json::json!([1, 2]));
}

#[test]
fn silent_device_times_out() {
    let addr = spawn_device(|_| Vec::new());

    let output = ctlserial(&[
        "exec", "--tcp", &addr, "--retries", "1", "--timeout", "100ms", "1",
    ]);

    assert_eq!(output.status.code(), Some(124));
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("after 2 attempts"), "stderr: {stderr}");
}

#[test]
fn too_many_arguments_exit_data_invalid() {
    let addr = spawn_device(|command| vec![reply(command, &[Value::from(0)])]);
    let args: Vec<String> = (0..13).map(|n| n.to_string()).collect();
    let mut argv = vec!["exec", "--tcp", addr.as_str(), "1"];
    argv.extend(args.iter().map(String::as_str));

    let output = ctlserial(&argv);

    assert_eq!(output.status.code(), Some(60));
}

#[test]
fn missing_device_exits_usage() {
    let output = ctlserial(&["exec", "1"]);

    assert_eq!(output.status.code(), Some(64));
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("--port or --tcp"), "stderr: {stderr}");
}

#[test]
fn monitor_prints_classified_lines() {
    let response = EnvelopeEncoder::encode_response(3, &[Value::from(0), Value::from(9)])
        .expect("response should encode");
    let addr = spawn_talker(vec![
        "#!booting".to_string(),
        "sensor online".to_string(),
        response.frame().trim_end().to_string(),
    ]);

    let output = ctlserial(&["monitor", "--tcp", &addr, "--count", "3", "--format", "json"]);

    assert_eq!(output.status.code(), Some(0), "stderr: {}", String::from_utf8_lossy(&output.stderr));
    let stdout = String::from_utf8_lossy(&output.stdout);
    let records: Vec<serde_json::Value> = stdout
        .lines()
        .map(|line| serde_json::from_str(line).expect("each line should be json"))
        .collect();
    assert_eq!(records.len(), 3);
    assert_eq!(records[0]["kind"], "log");
    assert_eq!(records[0]["text"], "booting");
    assert_eq!(records[1]["text"], "sensor online");
    assert_eq!(records[2]["kind"], "response");
    assert_eq!(records[2]["sequence"], 3);
    assert_eq!(records[2]["values"], serde_json::json!([0, 9]));
}

#[test]
fn version_prints_package_version() {
    let output = ctlserial(&["version"]);

    assert_eq!(output.status.code(), Some(0));
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert_eq!(stdout.trim(), format!("ctlserial {}", env!("CARGO_PKG_VERSION")));
}

#[test]
fn extended_version_reports_only_known_provenance() {
    let output = ctlserial(&["version", "--extended"]);

    assert_eq!(output.status.code(), Some(0));
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains(&format!("version: {}", env!("CARGO_PKG_VERSION"))));
    assert!(stdout.contains("checksum=crc8-smbus"));
    for line in stdout.lines() {
        assert!(!line.ends_with(": unknown"), "unset build field: {line}");
    }
}
