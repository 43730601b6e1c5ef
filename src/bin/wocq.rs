//! A tiny inspection CLI: looks up one `(map, key)` pair against a
//! discovered profile and prints the decoded value as JSON.

use std::process::ExitCode;

use serde_json::json;
use wocdb::decode::Value;
use wocdb::query::{Key, ShowContent};
use wocdb::Query;

fn value_to_json(value: &Value) -> serde_json::Value {
    match value {
        Value::HashList(hashes) => json!(hashes),
        Value::StringList(strings) => json!(strings),
        Value::TripleList(triples) => json!(triples),
        Value::SingleHashRecord { time, author, hash_hex } => {
            json!({ "time": time, "author": author, "hash": hash_hex })
        }
        Value::Pointer { hash_hex, offset, length } => {
            json!({ "hash": hash_hex, "offset": offset, "length": length })
        }
        Value::Raw(bytes) => json!({ "raw_len": bytes.len() }),
    }
}

fn show_content_to_json(content: &ShowContent) -> serde_json::Value {
    match content {
        ShowContent::Tree(entries) => json!(entries
            .iter()
            .map(|e| json!({ "mode": e.mode, "filename": e.filename, "hash": e.hash_hex }))
            .collect::<Vec<_>>()),
        ShowContent::Commit(commit) => json!({
            "tree": commit.tree,
            "parents": commit.parents,
            "author": commit.author,
            "committer": commit.committer,
            "message": commit.message,
        }),
        ShowContent::Blob(text) => json!(text),
    }
}

fn main() -> ExitCode {
    let args: Vec<String> = std::env::args().collect();
    let [_, map_or_object, key] = args.as_slice() else {
        eprintln!("usage: wocq <map-or-object> <key>");
        return ExitCode::FAILURE;
    };

    let query = match Query::open(&[]) {
        Ok(q) => q,
        Err(e) => {
            eprintln!("unable to load profile: {e}");
            return ExitCode::FAILURE;
        }
    };

    let result = match map_or_object.as_str() {
        "tree" | "commit" | "blob" => {
            let hash = match data_encoding::HEXLOWER.decode(key.as_bytes()) {
                Ok(bytes) => bytes,
                Err(_) => {
                    eprintln!("key must be 40-character hex for {map_or_object}");
                    return ExitCode::FAILURE;
                }
            };
            query
                .show_content(map_or_object, &hash)
                .map(|content| show_content_to_json(&content))
        }
        other => {
            let key = if key.len() == 40 && key.bytes().all(|b| b.is_ascii_hexdigit()) {
                Key::HashHex(key)
            } else {
                Key::Str(key)
            };
            query.get_values(other, key).map(|value| value_to_json(&value))
        }
    };

    match result {
        Ok(json) => {
            println!("{}", serde_json::to_string_pretty(&json).expect("serializing a json::Value never fails"));
            ExitCode::SUCCESS
        }
        Err(e) => {
            eprintln!("{e}");
            ExitCode::FAILURE
        }
    }
}
