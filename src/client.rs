//! Argument parsing and command execution for the `lineagegraph` binary.

use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};

use serde_json::{Map, Value, json};

use crate::errors::GraphResult;
use crate::graph::Graph;
use crate::io::{self, FileHeader, OpaqueBytes};
use crate::validation::{AdjacencyReport, validate_adjacency};

const COMMANDS: [&str; 2] = ["status", "check"];

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CommandLineConfig {
    pub file: PathBuf,
    pub command: String,
    pub strict: bool,
}

impl CommandLineConfig {
    pub fn from_args(args: &[&str]) -> Result<Self, String> {
        let mut file = None;
        let mut command = String::from("status");
        let mut strict = false;
        let mut iter = args.iter().skip(1);
        while let Some(arg) = iter.next() {
            match *arg {
                "--file" => {
                    file = Some(PathBuf::from(
                        iter.next()
                            .ok_or_else(|| "--file requires a value".to_string())?,
                    ));
                }
                "--command" => {
                    command = iter
                        .next()
                        .ok_or_else(|| "--command requires a value".to_string())?
                        .to_string();
                }
                "--strict" => strict = true,
                other if other.starts_with('-') => {
                    return Err(format!("unknown flag {other}"));
                }
                _ => {
                    command = arg.to_string();
                }
            }
        }
        if !COMMANDS.contains(&command.as_str()) {
            return Err(format!("unknown command {command}"));
        }
        let file = file.ok_or_else(|| "--file is required".to_string())?;
        Ok(Self {
            file,
            command,
            strict,
        })
    }

    pub fn help() -> &'static str {
        "Usage: lineagegraph --file PATH [--command status|check] [--strict]\n"
    }
}

/// JSON produced by a command, plus whether the graph failed validation.
#[derive(Clone, Debug)]
pub struct CommandOutput {
    pub json: String,
    pub has_issues: bool,
}

type OpaqueGraph = Graph<Vec<u8>, Vec<u8>>;

/// Load an enveloped graph file, taking attribute widths from its header.
pub fn open_graph_file(path: &Path) -> GraphResult<(FileHeader, OpaqueGraph)> {
    let mut input = BufReader::new(File::open(path)?);
    let header = io::read_header(&mut input)?;
    let serializer = (
        OpaqueBytes::new(header.vertex_width as usize),
        OpaqueBytes::new(header.edge_width as usize),
    );
    let mut graph = OpaqueGraph::new();
    io::read(&mut graph, &serializer, input)?;
    Ok((header, graph))
}

pub fn run_command(config: &CommandLineConfig) -> GraphResult<CommandOutput> {
    let (header, graph) = open_graph_file(&config.file)?;
    let mut object = Map::new();
    object.insert("command".into(), Value::String(config.command.clone()));
    object.insert("file".into(), json!(config.file.display().to_string()));
    object.insert("header".into(), serde_json::to_value(header)?);

    let has_issues = match config.command.as_str() {
        "check" => {
            let report = validate_adjacency(&graph);
            let has_issues = report.has_issues();
            object.insert("report".into(), report_to_value(&report)?);
            has_issues
        }
        _ => {
            object.insert("vertices".into(), json!(graph.vertex_count()));
            object.insert("edges".into(), json!(graph.edge_count()));
            false
        }
    };

    Ok(CommandOutput {
        json: serde_json::to_string(&Value::Object(object))?,
        has_issues,
    })
}

fn report_to_value(report: &AdjacencyReport) -> GraphResult<Value> {
    Ok(serde_json::to_value(report)?)
}
