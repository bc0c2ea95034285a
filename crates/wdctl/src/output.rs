//! Output formatting for CLI responses

use anyhow::Error;
use colored::Colorize;
use serde::Serialize;
use serde_json::json;
use wdog::NodeInfo;

use crate::error::error_type_name;
use crate::ops::Outcome;

/// Print error in JSON format
pub fn print_error_json(error: &Error) {
    let error_json = json!({
        "success": false,
        "error": {
            "message": format!("{error:#}"),
            "type": error_type_name(error)
        }
    });
    print_json(&error_json);
}

/// Print error in human-readable format
pub fn print_error_human(error: &Error) {
    eprintln!("{} {}", "Error:".red().bold(), error);

    let mut source = error.source();
    while let Some(err) = source {
        eprintln!("  {} {}", "Caused by:".yellow(), err);
        source = err.source();
    }
}

/// Collects operation outcomes. Human output is printed as it arrives so
/// that a later failure still shows what was applied.
#[derive(Debug)]
pub struct Report {
    json: bool,
    outcomes: Vec<Outcome>,
}

impl Report {
    pub fn new(json: bool) -> Self {
        Self {
            json,
            outcomes: Vec::new(),
        }
    }

    pub fn push(&mut self, outcome: Outcome) {
        if !self.json {
            print_outcome(&outcome);
        }
        self.outcomes.push(outcome);
    }

    /// Emit the JSON document, optionally with extra top-level fields.
    pub fn finish(self, extra: Option<serde_json::Value>) {
        if !self.json {
            return;
        }
        let mut output = json!({
            "success": true,
            "nodes": self.outcomes,
        });
        if let (Some(object), Some(serde_json::Value::Object(extra))) =
            (output.as_object_mut(), extra)
        {
            object.extend(extra);
        }
        print_json(&output);
    }
}

fn print_outcome(outcome: &Outcome) {
    match &outcome.old {
        Some(old) => println!(
            "{}: {} -> {}",
            outcome.node.bold(),
            old.dimmed(),
            outcome.value
        ),
        None => println!("{}: {}", outcome.node.bold(), outcome.value),
    }
}

/// Print node descriptions
pub fn print_nodes(nodes: &[NodeInfo], json: bool) {
    if json {
        print_json(&json!({
            "success": true,
            "nodes": nodes,
        }));
        return;
    }
    for node in nodes {
        println!(
            "{} [{}] {}",
            node.name.bold(),
            node.access.as_str().cyan(),
            node.description
        );
    }
}

/// Print a run summary in human form
pub fn print_summary(lines: &[(&str, String)]) {
    println!("{}", "Run summary:".bold());
    for (label, value) in lines {
        println!("  {label}: {value}");
    }
}

fn print_json(value: &impl Serialize) {
    match serde_json::to_string_pretty(value) {
        Ok(s) => println!("{s}"),
        Err(e) => eprintln!("Failed to format output as JSON: {e}"),
    }
}
