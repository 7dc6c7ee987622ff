//! Board Checker CLI
//!
//! Validates board layouts and API payloads against the wire schema.
//! Useful for hand-edited board files before pasting them into the
//! settings editor, and for recorded event streams.
//!
//! Usage:
//!   board_checker validate <type> <json-file>
//!   board_checker validate <type> --stdin
//!   board_checker list-types
//!   board_checker generate-example <type>
//!
//! Types: board, board-action, bus-event, success-response, error-response

// Dev tool - allow unwrap for CLI simplicity
#![allow(clippy::unwrap_used)]
#![allow(clippy::expect_used)]

use serde::Deserialize;
use serde_json::Value;
use std::env;
use std::fs;
use std::io::{self, Read};
use std::process;

use homegrid::bus::BoardEvent;
use homegrid::layout::{count_items, validate_board, Board, LayoutAction, Viewport};
use homegrid::persist::board_sha;

/// Action request as the API accepts it: viewport plus the flattened action.
#[derive(Debug, Deserialize)]
struct BoardActionRequest {
    #[allow(dead_code)]
    viewport: Viewport,
    #[serde(flatten)]
    #[allow(dead_code)]
    action: LayoutAction,
}

#[derive(Debug, Deserialize)]
struct SuccessResponse {
    #[allow(dead_code)]
    ok: bool,
}

#[derive(Debug, Deserialize)]
struct ErrorResponse {
    #[allow(dead_code)]
    error: String,
}

const SUPPORTED_TYPES: &[&str] = &[
    "board",
    "board-action",
    "bus-event",
    "success-response",
    "error-response",
];

fn main() {
    let args: Vec<String> = env::args().collect();

    if args.len() < 2 {
        print_usage();
        process::exit(1);
    }

    match args[1].as_str() {
        "validate" => {
            if args.len() < 3 {
                eprintln!("Error: Missing type argument");
                print_usage();
                process::exit(1);
            }
            let schema_type = &args[2];
            let json = if args.len() >= 4 {
                if args[3] == "--stdin" {
                    read_stdin()
                } else {
                    read_file(&args[3])
                }
            } else {
                read_stdin()
            };
            validate(schema_type, &json);
        }
        "list-types" => {
            println!("Supported schema types:");
            for t in SUPPORTED_TYPES {
                println!("  {}", t);
            }
        }
        "generate-example" => {
            if args.len() < 3 {
                eprintln!("Error: Missing type argument");
                print_usage();
                process::exit(1);
            }
            generate_example(&args[2]);
        }
        "help" | "--help" | "-h" => {
            print_usage();
        }
        _ => {
            eprintln!("Unknown command: {}", args[1]);
            print_usage();
            process::exit(1);
        }
    }
}

fn print_usage() {
    eprintln!("Board Checker - Validate board layouts and API payloads");
    eprintln!();
    eprintln!("Usage:");
    eprintln!("  board_checker validate <type> <json-file>");
    eprintln!("  board_checker validate <type> --stdin");
    eprintln!("  board_checker list-types");
    eprintln!("  board_checker generate-example <type>");
    eprintln!();
    eprintln!("Examples:");
    eprintln!("  board_checker validate board ~/.local/share/homegrid/board.json");
    eprintln!("  echo '{{\"ok\":true}}' | board_checker validate success-response --stdin");
    eprintln!("  board_checker generate-example board-action");
}

fn read_stdin() -> String {
    let mut input = String::new();
    io::stdin()
        .read_to_string(&mut input)
        .expect("Failed to read stdin");
    input
}

fn read_file(path: &str) -> String {
    fs::read_to_string(path).unwrap_or_else(|e| {
        eprintln!("Error reading file '{}': {}", path, e);
        process::exit(1);
    })
}

fn validate(schema_type: &str, json: &str) {
    // First, parse as generic JSON to catch syntax errors
    let value: Value = match serde_json::from_str(json) {
        Ok(v) => v,
        Err(e) => {
            eprintln!("INVALID: JSON parse error: {}", e);
            process::exit(1);
        }
    };

    // The board type gets a semantic pass on top of the schema check:
    // per-array id uniqueness and group capacity.
    if schema_type == "board" {
        let board = match serde_json::from_value::<Board>(value) {
            Ok(b) => b,
            Err(e) => {
                eprintln!("INVALID: Schema validation failed for 'board': {}", e);
                process::exit(1);
            }
        };
        if let Err(e) = validate_board(&board) {
            eprintln!("INVALID: Board invariant violated: {}", e);
            process::exit(1);
        }
        println!(
            "VALID: board {} ({} desktop / {} mobile cells, {} items total)",
            board_sha(&board),
            board.desktop.len(),
            board.mobile.len(),
            count_items(&board.desktop) + count_items(&board.mobile)
        );
        return;
    }

    let result = match schema_type {
        "board-action" => serde_json::from_value::<BoardActionRequest>(value).map(|_| ()),
        "bus-event" => serde_json::from_value::<BoardEvent>(value).map(|_| ()),
        "success-response" => serde_json::from_value::<SuccessResponse>(value).map(|_| ()),
        "error-response" => serde_json::from_value::<ErrorResponse>(value).map(|_| ()),
        _ => {
            eprintln!("Unknown schema type: {}", schema_type);
            eprintln!("Run 'board_checker list-types' to see supported types");
            process::exit(1);
        }
    };

    match result {
        Ok(()) => {
            println!("VALID: JSON conforms to '{}' schema", schema_type);
        }
        Err(e) => {
            eprintln!(
                "INVALID: Schema validation failed for '{}': {}",
                schema_type, e
            );
            process::exit(1);
        }
    }
}

fn generate_example(schema_type: &str) {
    let example: Value = match schema_type {
        "board" => serde_json::json!({
            "desktop": [
                {
                    "id": "a1b2c3d4e5",
                    "label": "Jellyfin",
                    "url": "http://nas.local:8096",
                    "config": { "type": "shortcut", "options": {} }
                },
                {
                    "id": "f6g7h8i9j0",
                    "label": "Media",
                    "config": {
                        "type": "group",
                        "options": {
                            "items": [
                                { "id": "m1", "name": "Sonarr", "url": "http://nas.local:8989" }
                            ],
                            "max_items": 6
                        }
                    }
                }
            ],
            "mobile": []
        }),
        "board-action" => serde_json::json!({
            "viewport": "desktop",
            "action": "move-into-group",
            "item_id": "a1b2c3d4e5",
            "group_id": "f6g7h8i9j0"
        }),
        "bus-event" => serde_json::json!({
            "type": "SessionEnded",
            "payload": {
                "item_id": "a1b2c3d4e5",
                "applied": {
                    "action": "reorder",
                    "from_id": "a1b2c3d4e5",
                    "to_id": "f6g7h8i9j0"
                }
            }
        }),
        "success-response" => serde_json::json!({ "ok": true }),
        "error-response" => serde_json::json!({ "error": "duplicate item id `a1` in desktop layout" }),
        _ => {
            eprintln!("Unknown schema type: {}", schema_type);
            process::exit(1);
        }
    };

    println!("{}", serde_json::to_string_pretty(&example).unwrap());
}
