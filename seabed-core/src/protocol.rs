//! Host line protocol: frame ingestion and command emission.
//!
//! One match is an init frame (the creature roster) followed by one turn
//! frame per cycle. Frames are whitespace-separated integer lines except the
//! radar quadrant token. Parsing is incremental over any line source, so the
//! same code reads a live stdin stream and a recorded transcript; blank
//! lines and `#` comments are skipped, and errors carry the 1-based line
//! number of the source. The command side renders the engine's intents as
//! `MOVE x y light [note]` / `WAIT light [note]` lines.

use std::fmt;

use serde::Serialize;

use crate::error::ParseError;
use crate::geom::Point;

// ── Frame data ──────────────────────────────────────────────────────

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct CreatureSpec {
    pub id: i32,
    pub color: i32,
    pub kind: i32,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct InitFrame {
    pub creatures: Vec<CreatureSpec>,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct DroneStatus {
    pub id: i32,
    pub x: i32,
    pub y: i32,
    pub emergency: bool,
    pub battery: i32,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ScanPair {
    pub drone_id: i32,
    pub creature_id: i32,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct VisibleCreature {
    pub id: i32,
    pub x: i32,
    pub y: i32,
    pub vx: i32,
    pub vy: i32,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Serialize)]
pub enum Quadrant {
    TopLeft,
    TopRight,
    BottomLeft,
    BottomRight,
}

impl Quadrant {
    /// Axis signs of the quadrant direction (+y is down).
    #[inline]
    pub fn signs(self) -> (f64, f64) {
        match self {
            Quadrant::TopLeft => (-1.0, -1.0),
            Quadrant::TopRight => (1.0, -1.0),
            Quadrant::BottomLeft => (-1.0, 1.0),
            Quadrant::BottomRight => (1.0, 1.0),
        }
    }

    pub fn token(self) -> &'static str {
        match self {
            Quadrant::TopLeft => "TL",
            Quadrant::TopRight => "TR",
            Quadrant::BottomLeft => "BL",
            Quadrant::BottomRight => "BR",
        }
    }

    fn from_token(token: &str, line: usize) -> Result<Self, ParseError> {
        match token {
            "TL" => Ok(Quadrant::TopLeft),
            "TR" => Ok(Quadrant::TopRight),
            "BL" => Ok(Quadrant::BottomLeft),
            "BR" => Ok(Quadrant::BottomRight),
            _ => Err(ParseError::UnknownQuadrant {
                line,
                token: token.to_string(),
            }),
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct RadarBlip {
    pub drone_id: i32,
    pub creature_id: i32,
    pub quadrant: Quadrant,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TurnFrame {
    pub my_score: i32,
    pub foe_score: i32,
    pub my_saved: Vec<i32>,
    pub foe_saved: Vec<i32>,
    pub my_drones: Vec<DroneStatus>,
    pub foe_drones: Vec<DroneStatus>,
    pub scans: Vec<ScanPair>,
    pub visibles: Vec<VisibleCreature>,
    pub blips: Vec<RadarBlip>,
}

// ── Line source ─────────────────────────────────────────────────────

/// Incremental reader over protocol lines. Counts every raw line so parse
/// errors point at the actual transcript line.
pub struct LineReader<I> {
    lines: I,
    line_no: usize,
}

impl<I> LineReader<I>
where
    I: Iterator<Item = String>,
{
    pub fn new(lines: I) -> Self {
        LineReader { lines, line_no: 0 }
    }

    pub fn line_no(&self) -> usize {
        self.line_no
    }

    /// Next meaningful line, skipping blanks and `#` comments.
    fn next_line(&mut self, expected: &'static str) -> Result<String, ParseError> {
        loop {
            let line = self.lines.next().ok_or(ParseError::UnexpectedEof {
                line: self.line_no + 1,
                expected,
            })?;
            self.line_no += 1;
            let trimmed = line.trim();
            if trimmed.is_empty() || trimmed.starts_with('#') {
                continue;
            }
            return Ok(trimmed.to_string());
        }
    }

    /// Like `next_line`, but a clean end of stream yields `None`.
    fn next_line_or_end(&mut self, expected: &'static str) -> Result<Option<String>, ParseError> {
        match self.next_line(expected) {
            Ok(line) => Ok(Some(line)),
            Err(ParseError::UnexpectedEof { .. }) => Ok(None),
            Err(err) => Err(err),
        }
    }
}

fn parse_int(token: &str, line: usize) -> Result<i32, ParseError> {
    token.parse::<i32>().map_err(|_| ParseError::InvalidInt {
        line,
        token: token.to_string(),
    })
}

fn parse_count(token: &str, line: usize) -> Result<usize, ParseError> {
    let value = parse_int(token, line)?;
    usize::try_from(value).map_err(|_| ParseError::InvalidInt {
        line,
        token: token.to_string(),
    })
}

fn split_exact(line: &str, line_no: usize, expected: usize) -> Result<Vec<&str>, ParseError> {
    let fields: Vec<&str> = line.split_whitespace().collect();
    if fields.len() != expected {
        return Err(ParseError::FieldCount {
            line: line_no,
            expected,
            found: fields.len(),
        });
    }
    Ok(fields)
}

// ── Frame parsing ───────────────────────────────────────────────────

pub fn parse_init_frame<I>(reader: &mut LineReader<I>) -> Result<InitFrame, ParseError>
where
    I: Iterator<Item = String>,
{
    let count = read_count(reader, "creature count")?;
    let mut creatures = Vec::with_capacity(count);
    for _ in 0..count {
        let line = reader.next_line("creature spec")?;
        let fields = split_exact(&line, reader.line_no(), 3)?;
        creatures.push(CreatureSpec {
            id: parse_int(fields[0], reader.line_no())?,
            color: parse_int(fields[1], reader.line_no())?,
            kind: parse_int(fields[2], reader.line_no())?,
        });
    }
    Ok(InitFrame { creatures })
}

/// Parse the next turn frame. `Ok(None)` means the stream ended cleanly at a
/// frame boundary; an end of stream inside a frame is an error.
pub fn parse_turn_frame<I>(reader: &mut LineReader<I>) -> Result<Option<TurnFrame>, ParseError>
where
    I: Iterator<Item = String>,
{
    let Some(first) = reader.next_line_or_end("my score")? else {
        return Ok(None);
    };
    let my_score = parse_int(split_exact(&first, reader.line_no(), 1)?[0], reader.line_no())?;
    let foe_score = read_int(reader, "foe score")?;

    let my_saved = read_id_list(reader, "saved count", "saved creature id")?;
    let foe_saved = read_id_list(reader, "foe saved count", "foe saved creature id")?;

    let my_drones = read_drone_list(reader, "my drone count")?;
    let foe_drones = read_drone_list(reader, "foe drone count")?;

    let scan_count = read_count(reader, "drone scan count")?;
    let mut scans = Vec::with_capacity(scan_count);
    for _ in 0..scan_count {
        let line = reader.next_line("drone scan pair")?;
        let fields = split_exact(&line, reader.line_no(), 2)?;
        scans.push(ScanPair {
            drone_id: parse_int(fields[0], reader.line_no())?,
            creature_id: parse_int(fields[1], reader.line_no())?,
        });
    }

    let visible_count = read_count(reader, "visible creature count")?;
    let mut visibles = Vec::with_capacity(visible_count);
    for _ in 0..visible_count {
        let line = reader.next_line("visible creature")?;
        let fields = split_exact(&line, reader.line_no(), 5)?;
        visibles.push(VisibleCreature {
            id: parse_int(fields[0], reader.line_no())?,
            x: parse_int(fields[1], reader.line_no())?,
            y: parse_int(fields[2], reader.line_no())?,
            vx: parse_int(fields[3], reader.line_no())?,
            vy: parse_int(fields[4], reader.line_no())?,
        });
    }

    let blip_count = read_count(reader, "radar blip count")?;
    let mut blips = Vec::with_capacity(blip_count);
    for _ in 0..blip_count {
        let line = reader.next_line("radar blip")?;
        let fields = split_exact(&line, reader.line_no(), 3)?;
        blips.push(RadarBlip {
            drone_id: parse_int(fields[0], reader.line_no())?,
            creature_id: parse_int(fields[1], reader.line_no())?,
            quadrant: Quadrant::from_token(fields[2], reader.line_no())?,
        });
    }

    Ok(Some(TurnFrame {
        my_score,
        foe_score,
        my_saved,
        foe_saved,
        my_drones,
        foe_drones,
        scans,
        visibles,
        blips,
    }))
}

fn read_int<I>(reader: &mut LineReader<I>, expected: &'static str) -> Result<i32, ParseError>
where
    I: Iterator<Item = String>,
{
    let line = reader.next_line(expected)?;
    let fields = split_exact(&line, reader.line_no(), 1)?;
    parse_int(fields[0], reader.line_no())
}

fn read_count<I>(reader: &mut LineReader<I>, expected: &'static str) -> Result<usize, ParseError>
where
    I: Iterator<Item = String>,
{
    let line = reader.next_line(expected)?;
    let fields = split_exact(&line, reader.line_no(), 1)?;
    parse_count(fields[0], reader.line_no())
}

fn read_id_list<I>(
    reader: &mut LineReader<I>,
    count_name: &'static str,
    entry_name: &'static str,
) -> Result<Vec<i32>, ParseError>
where
    I: Iterator<Item = String>,
{
    let count = read_count(reader, count_name)?;
    let mut ids = Vec::with_capacity(count);
    for _ in 0..count {
        ids.push(read_int(reader, entry_name)?);
    }
    Ok(ids)
}

fn read_drone_list<I>(
    reader: &mut LineReader<I>,
    count_name: &'static str,
) -> Result<Vec<DroneStatus>, ParseError>
where
    I: Iterator<Item = String>,
{
    let count = read_count(reader, count_name)?;
    let mut drones = Vec::with_capacity(count);
    for _ in 0..count {
        let line = reader.next_line("drone status")?;
        let fields = split_exact(&line, reader.line_no(), 5)?;
        drones.push(DroneStatus {
            id: parse_int(fields[0], reader.line_no())?,
            x: parse_int(fields[1], reader.line_no())?,
            y: parse_int(fields[2], reader.line_no())?,
            emergency: parse_int(fields[3], reader.line_no())? != 0,
            battery: parse_int(fields[4], reader.line_no())?,
        });
    }
    Ok(drones)
}

// ── Commands ────────────────────────────────────────────────────────

/// One navigation intent per drone per turn. Coordinates are clamped into
/// the operating area at construction; rendering never re-checks them.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub enum Command {
    Move {
        x: i32,
        y: i32,
        light: bool,
        note: Option<String>,
    },
    Hold {
        light: bool,
        note: Option<String>,
    },
}

impl Command {
    pub fn move_to(dest: Point, light: bool, note: Option<String>) -> Command {
        let (x, y) = dest.grid_coords();
        Command::Move { x, y, light, note }
    }

    pub fn hold(light: bool, note: Option<String>) -> Command {
        Command::Hold { light, note }
    }

    pub fn light(&self) -> bool {
        match self {
            Command::Move { light, .. } | Command::Hold { light, .. } => *light,
        }
    }
}

impl fmt::Display for Command {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Command::Move { x, y, light, note } => {
                write!(f, "MOVE {} {} {}", x, y, *light as i32)?;
                if let Some(note) = note {
                    write!(f, " {note}")?;
                }
                Ok(())
            }
            Command::Hold { light, note } => {
                write!(f, "WAIT {}", *light as i32)?;
                if let Some(note) = note {
                    write!(f, " {note}")?;
                }
                Ok(())
            }
        }
    }
}
