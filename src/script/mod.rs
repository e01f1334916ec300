/*!
 * Script Parser
 * Turns process script text into descriptors the engine can load
 *
 * A script is a sequence of process blocks:
 *
 * ```text
 * process 1
 *     lifespan 5
 *     prio 3          # optional, defaults to 0
 *     start 0         # optional, defaults to 0
 *     acquire 0 1 2   # resource, age to request at, hold duration
 * end
 * ```
 *
 * `#` starts a comment running to the end of the line. Any malformed line
 * aborts the load; the simulation core never sees partially-parsed data.
 */

use crate::core::limits::{MAX_PRIORITY, RESOURCE_SLOTS};
use crate::core::types::{Pid, Priority, ResourceId, Tick};
use crate::sim::ProcessScript;
use log::debug;
use std::collections::HashSet;
use std::path::Path;
use thiserror::Error;

/// Script loading result
pub type ScriptResult<T> = Result<T, ScriptError>;

/// Load-phase errors; any of these aborts before the simulation starts
#[derive(Error, Debug)]
pub enum ScriptError {
    #[error("failed to read script: {0}")]
    Io(#[from] std::io::Error),

    #[error("line {line}: unknown directive `{directive}`")]
    UnknownDirective { line: usize, directive: String },

    #[error("line {line}: `{directive}` expects {expected} argument(s), got {got}")]
    WrongArgCount {
        line: usize,
        directive: &'static str,
        expected: usize,
        got: usize,
    },

    #[error("line {line}: malformed number `{value}`")]
    MalformedNumber { line: usize, value: String },

    #[error("line {line}: `{directive}` outside a process block")]
    OutsideProcess {
        line: usize,
        directive: &'static str,
    },

    #[error("line {line}: `process` block opened inside another (missing `end`?)")]
    NestedProcess { line: usize },

    #[error("script ended inside a process block (missing `end`)")]
    UnterminatedProcess,

    #[error("line {line}: duplicate process id {pid}")]
    DuplicatePid { line: usize, pid: Pid },

    #[error("line {line}: process {pid} has no usable lifespan")]
    MissingLifespan { line: usize, pid: Pid },

    #[error("line {line}: resource {resource} out of range (table holds {slots})")]
    ResourceOutOfRange {
        line: usize,
        resource: ResourceId,
        slots: usize,
    },

    #[error("line {line}: priority {priority} exceeds the maximum {max}")]
    PriorityOutOfRange {
        line: usize,
        priority: Priority,
        max: Priority,
    },

    #[error(
        "line {line}: process {pid} cannot hold resource {resource} past its \
         lifespan (requested at {at} for {duration}, lifespan {lifespan})"
    )]
    HoldOutlivesProcess {
        line: usize,
        pid: Pid,
        resource: ResourceId,
        at: Tick,
        duration: Tick,
        lifespan: Tick,
    },
}

/// Read and parse a script file
pub fn load_script(path: &Path) -> ScriptResult<Vec<ProcessScript>> {
    let text = std::fs::read_to_string(path)?;
    parse_script(&text)
}

/// Parse script text into process descriptors, in script order
pub fn parse_script(text: &str) -> ScriptResult<Vec<ProcessScript>> {
    let mut scripts = Vec::new();
    let mut seen = HashSet::new();
    let mut block: Option<Block> = None;

    for (index, raw) in text.lines().enumerate() {
        let line = index + 1;
        let tokens: Vec<&str> = raw
            .split_whitespace()
            .take_while(|token| !token.starts_with('#'))
            .collect();
        let Some((&directive, args)) = tokens.split_first() else {
            continue;
        };

        match directive {
            "process" => {
                if block.is_some() {
                    return Err(ScriptError::NestedProcess { line });
                }
                let pid = parse_number::<Pid>(line, "process", args, 0, 1)?;
                if !seen.insert(pid) {
                    return Err(ScriptError::DuplicatePid { line, pid });
                }
                block = Some(Block {
                    script: ProcessScript::new(pid, 0, 0, 0),
                    opened_at: line,
                });
            }
            "end" => {
                let finished = block.take().ok_or(ScriptError::OutsideProcess {
                    line,
                    directive: "end",
                })?;
                scripts.push(finished.validate(line)?);
            }
            "lifespan" => {
                let value = parse_number::<Tick>(line, "lifespan", args, 0, 1)?;
                in_block(&mut block, line, "lifespan")?.script.lifespan = value;
            }
            "prio" => {
                let value = parse_number::<Priority>(line, "prio", args, 0, 1)?;
                if value > MAX_PRIORITY {
                    return Err(ScriptError::PriorityOutOfRange {
                        line,
                        priority: value,
                        max: MAX_PRIORITY,
                    });
                }
                in_block(&mut block, line, "prio")?.script.priority = value;
            }
            "start" => {
                let value = parse_number::<Tick>(line, "start", args, 0, 1)?;
                in_block(&mut block, line, "start")?.script.start = value;
            }
            "acquire" => {
                let resource = parse_number::<ResourceId>(line, "acquire", args, 0, 3)?;
                let at = parse_number::<Tick>(line, "acquire", args, 1, 3)?;
                let duration = parse_number::<Tick>(line, "acquire", args, 2, 3)?;
                if resource >= RESOURCE_SLOTS {
                    return Err(ScriptError::ResourceOutOfRange {
                        line,
                        resource,
                        slots: RESOURCE_SLOTS,
                    });
                }
                let current = in_block(&mut block, line, "acquire")?;
                current.script.acquires.push(crate::sim::AcquireSpec {
                    resource,
                    at,
                    duration,
                });
            }
            other => {
                return Err(ScriptError::UnknownDirective {
                    line,
                    directive: other.to_string(),
                });
            }
        }
    }

    if block.is_some() {
        return Err(ScriptError::UnterminatedProcess);
    }

    debug!("parsed {} process block(s)", scripts.len());
    Ok(scripts)
}

struct Block {
    script: ProcessScript,
    opened_at: usize,
}

impl Block {
    /// Checks performed once the block closes and the lifespan is known
    fn validate(self, end_line: usize) -> ScriptResult<ProcessScript> {
        let script = self.script;
        if script.lifespan == 0 {
            return Err(ScriptError::MissingLifespan {
                line: self.opened_at,
                pid: script.pid,
            });
        }
        for acquire in &script.acquires {
            // A hold shrinks only on run ticks, so the request must be
            // issued and fully drained within the lifespan
            if acquire.at >= script.lifespan
                || acquire.at + acquire.duration > script.lifespan
            {
                return Err(ScriptError::HoldOutlivesProcess {
                    line: end_line,
                    pid: script.pid,
                    resource: acquire.resource,
                    at: acquire.at,
                    duration: acquire.duration,
                    lifespan: script.lifespan,
                });
            }
        }
        Ok(script)
    }
}

fn in_block<'a>(
    block: &'a mut Option<Block>,
    line: usize,
    directive: &'static str,
) -> ScriptResult<&'a mut Block> {
    block
        .as_mut()
        .ok_or(ScriptError::OutsideProcess { line, directive })
}

fn parse_number<T: std::str::FromStr>(
    line: usize,
    directive: &'static str,
    args: &[&str],
    index: usize,
    expected: usize,
) -> ScriptResult<T> {
    if args.len() != expected {
        return Err(ScriptError::WrongArgCount {
            line,
            directive,
            expected,
            got: args.len(),
        });
    }
    args[index]
        .parse()
        .map_err(|_| ScriptError::MalformedNumber {
            line,
            value: args[index].to_string(),
        })
}
