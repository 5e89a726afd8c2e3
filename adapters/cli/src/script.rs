//! Plain-text command scripts driving the tongue from the command line.
//!
//! One instruction per line: `extend`, `release`, `turn <direction>`,
//! `tick [count]` and `reset`. Blank lines and `#` comments are skipped.

use anteater_core::{Command, Direction};
use thiserror::Error;

const COMMENT: char = '#';

/// Failures raised while parsing a script.
#[derive(Debug, Error, PartialEq, Eq)]
pub(crate) enum ScriptError {
    /// The first word of a line is not a known instruction.
    #[error("line {line}: unknown instruction `{word}`")]
    UnknownInstruction {
        /// One-based line number.
        line: usize,
        /// Offending word.
        word: String,
    },
    /// `turn` was given something other than a compass direction.
    #[error("line {line}: unknown direction `{word}`")]
    UnknownDirection {
        /// One-based line number.
        line: usize,
        /// Offending word.
        word: String,
    },
    /// `turn` was given no direction.
    #[error("line {line}: `turn` expects a direction")]
    MissingDirection {
        /// One-based line number.
        line: usize,
    },
    /// `tick` was given a count that is not a positive integer.
    #[error("line {line}: invalid tick count `{word}`")]
    InvalidTickCount {
        /// One-based line number.
        line: usize,
        /// Offending word.
        word: String,
    },
    /// Extra words followed a complete instruction.
    #[error("line {line}: unexpected `{word}` after instruction")]
    TrailingInput {
        /// One-based line number.
        line: usize,
        /// First unexpected word.
        word: String,
    },
}

/// A command together with the number of times it runs back to back.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) struct Instruction {
    /// Command to apply.
    pub(crate) command: Command,
    /// Consecutive applications, at least one.
    pub(crate) repeat: u32,
}

impl Instruction {
    const fn once(command: Command) -> Self {
        Self { command, repeat: 1 }
    }
}

/// Parses a script into one instruction per non-empty line.
pub(crate) fn parse(source: &str) -> Result<Vec<Instruction>, ScriptError> {
    let mut instructions = Vec::new();
    for (index, raw) in source.lines().enumerate() {
        let line = index + 1;
        let content = raw.split(COMMENT).next().unwrap_or_default();
        let mut words = content.split_whitespace();
        let Some(instruction) = words.next() else {
            continue;
        };

        match instruction.to_ascii_lowercase().as_str() {
            "extend" => instructions.push(Instruction::once(Command::BeginExtend)),
            "release" => instructions.push(Instruction::once(Command::EndExtend)),
            "reset" => instructions.push(Instruction::once(Command::Reset)),
            "turn" => {
                let word = words.next().ok_or(ScriptError::MissingDirection { line })?;
                let direction = parse_direction(word).ok_or_else(|| {
                    ScriptError::UnknownDirection {
                        line,
                        word: word.to_owned(),
                    }
                })?;
                instructions.push(Instruction::once(Command::SetNextDirection { direction }));
            }
            "tick" => {
                let repeat = match words.next() {
                    None => 1,
                    Some(word) => match word.parse::<u32>() {
                        Ok(count) if count > 0 => count,
                        _ => {
                            return Err(ScriptError::InvalidTickCount {
                                line,
                                word: word.to_owned(),
                            })
                        }
                    },
                };
                instructions.push(Instruction {
                    command: Command::Tick,
                    repeat,
                });
            }
            _ => {
                return Err(ScriptError::UnknownInstruction {
                    line,
                    word: instruction.to_owned(),
                })
            }
        }

        if let Some(word) = words.next() {
            return Err(ScriptError::TrailingInput {
                line,
                word: word.to_owned(),
            });
        }
    }
    Ok(instructions)
}

fn parse_direction(word: &str) -> Option<Direction> {
    match word.to_ascii_lowercase().as_str() {
        "north" | "n" | "up" => Some(Direction::North),
        "east" | "e" | "right" => Some(Direction::East),
        "south" | "s" | "down" => Some(Direction::South),
        "west" | "w" | "left" => Some(Direction::West),
        _ => None,
    }
}

/// Script that draws a 6x11 rectangle from the anchor back onto itself and
/// waits out the capture countdown.
pub(crate) fn demo(move_cooldown: u32, capture_delay: u32) -> String {
    let moves = |cells: u32| cells.saturating_mul(move_cooldown);
    format!(
        "# rectangle demo\n\
         extend\n\
         tick {south}\n\
         turn west\n\
         tick {west}\n\
         turn north\n\
         tick {north}\n\
         turn east\n\
         tick {east}\n\
         tick {countdown}\n",
        south = moves(10),
        west = moves(5),
        north = moves(10),
        east = moves(5),
        countdown = capture_delay.max(1),
    )
}
