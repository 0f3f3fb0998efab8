use std::path::PathBuf;

use serde::Serialize;

use crate::config::{self, Config};

/// Output the hashline reference document.
pub fn run(json: bool) {
    let root = PathBuf::from(".");
    let state = gather_state(&root);

    if json {
        print_json(&state);
    } else {
        print_markdown(&state);
    }
}

// ── State gathering ───────────────────────────────────────────────────

struct CurrentState {
    config_error: Option<String>,
    config_found: bool,
    exclude: Vec<String>,
    hash_length: Option<usize>,
    prefix: Option<String>,
}

fn gather_state(root: &std::path::Path) -> CurrentState {
    let config_found = root.join(config::CONFIG_FILE).exists();

    match Config::load(root) {
        Ok(c) => CurrentState {
            config_error: None,
            config_found,
            exclude: c.exclude,
            hash_length: c.hash_length,
            prefix: c.prefix,
        },
        Err(e) => {
            let defaults = Config::defaults();
            CurrentState {
                config_error: Some(e.to_string()),
                config_found,
                exclude: defaults.exclude,
                hash_length: defaults.hash_length,
                prefix: defaults.prefix,
            }
        },
    }
}

// ── Markdown output ───────────────────────────────────────────────────

fn print_markdown(state: &CurrentState) {
    let version = env!("CARGO_PKG_VERSION");
    print_markdown_header(version);
    print_markdown_state(state);
    println!();
    print_markdown_exit_codes();
}

fn print_markdown_header(version: &str) {
    print!(
        "\
# hashline {version}

Content-hashed line references. Address lines by `<line>:<hash>` tags and
refuse edits whose tags no longer match the file.

## Tag Syntax

    #HL 12:a3f|    let total = 0;     annotated line (prefix, line, hash, content)
    12:a3f                             bare reference
    +#HL 12:a3f|added line             diff marker before the tag is allowed

The hash covers the line number and the content without trailing whitespace.
Hashes are 3 hex chars up to 4096 lines, 4 above; a line that collides with an
earlier one gets one extra char.

## Workflow

    hashline annotate <file>                       Print the file with tags
    hashline edit <file> replace <ref> --text X    Replace a line (or --end <ref> for a range)
    hashline edit <file> delete <ref> --end <ref>  Delete a range
    hashline edit <file> insert_after <ref> --text X
    hashline verify <file> <ref>                   Check one reference
    hashline range <file> <start> <end>            Print a verified range
    hashline map <file>                            List every reference
    hashline strip <file>                          Remove tags
    hashline serve                                 JSON requests on stdin

## Configuration (.hashline.toml)

    prefix = \"#HL \"             # or false for bare tags
    hash_length = 3               # fixed length (3-8), adaptive if unset
    exclude = [\"**/*.lock\"]       # never annotate these paths
    cache_capacity = 64           # serve: cached annotations
    max_file_bytes = 1048576      # refuse to annotate larger files

## Current State

"
    );
}

fn print_markdown_state(state: &CurrentState) {
    match (&state.config_error, state.config_found) {
        (Some(e), _) => println!("Config:     .hashline.toml (invalid: {e})"),
        (None, true) => println!("Config:     .hashline.toml (found)"),
        (None, false) => println!("Config:     .hashline.toml (not found, using defaults)"),
    }

    match &state.prefix {
        Some(p) => println!("Prefix:     {p:?}"),
        None => println!("Prefix:     (none)"),
    }

    match state.hash_length {
        Some(n) => println!("Length:     {n}"),
        None => println!("Length:     adaptive"),
    }

    if state.exclude.is_empty() {
        println!("Exclude:    (none)");
    } else {
        println!("Exclude:    {}", state.exclude.join(", "));
    }
}

fn print_markdown_exit_codes() {
    print!(
        "\
## Exit Codes

| Code | Meaning |
|------|---------|
| 0    | Success / reference fresh |
| 1    | Stale reference |
| 2    | Reference out of range |
| 3    | Runtime error |
"
    );
}

// ── JSON output ───────────────────────────────────────────────────────

#[derive(Serialize)]
struct InfoJson {
    current_state: StateJson,
    exit_codes: Vec<ExitCodeInfo>,
    operations: Vec<&'static str>,
    version: String,
}

#[derive(Serialize)]
struct ExitCodeInfo {
    code: u8,
    meaning: String,
}

#[derive(Serialize)]
struct StateJson {
    config_error: Option<String>,
    config_found: bool,
    exclude: Vec<String>,
    hash_length: Option<usize>,
    prefix: Option<String>,
}

fn print_json(state: &CurrentState) {
    let info = InfoJson {
        current_state: StateJson {
            config_error: state.config_error.clone(),
            config_found: state.config_found,
            exclude: state.exclude.clone(),
            hash_length: state.hash_length,
            prefix: state.prefix.clone(),
        },
        exit_codes: vec![
            ExitCodeInfo { code: 0, meaning: "Success / reference fresh".to_string() },
            ExitCodeInfo { code: 1, meaning: "Stale reference".to_string() },
            ExitCodeInfo { code: 2, meaning: "Reference out of range".to_string() },
            ExitCodeInfo { code: 3, meaning: "Runtime error".to_string() },
        ],
        operations: vec!["replace", "delete", "insert_before", "insert_after"],
        version: env!("CARGO_PKG_VERSION").to_string(),
    };

    // serde_json::to_string_pretty won't fail on this structure.
    let json = serde_json::to_string_pretty(&info).unwrap_or_default();
    println!("{json}");
}
