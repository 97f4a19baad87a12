//! Line-oriented console: parses commands from stdin and dispatches them.
//!
//! ```text
//! play | pause | toggle      start/stop auto-advance
//! step                       advance one generation
//! clear                      stop and rebuild the grid
//! cell <row> <col>           flip one cell
//! width <n> | height <n>     resize the grid
//! delay <ms>                 change the delay between generations
//! show                       print the board
//! status                     print a JSON status line
//! help                       list commands
//! quit                       stop the runner and exit
//! ```

use std::io::BufRead;

use serde::Serialize;
use tokio::sync::mpsc;
use tracing::{debug, warn};

use crate::controller::Controller;
use crate::render::{self, SharedView};

const HELP: &str = "commands: play | pause | toggle | step | clear | cell <row> <col> | \
                    width <n> | height <n> | delay <ms> | show | status | help | quit";

/// One parsed console line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConsoleCommand {
    /// Start auto-advance.
    Play,
    /// Stop auto-advance.
    Pause,
    /// Flip between playing and paused.
    Toggle,
    /// Advance one generation.
    Step,
    /// Stop and rebuild the grid.
    Clear,
    /// Flip one cell.
    Cell {
        /// Row of the cell.
        row: usize,
        /// Column of the cell.
        col: usize,
    },
    /// New width entry, validated by the controller.
    Width(String),
    /// New height entry, validated by the controller.
    Height(String),
    /// New delay entry, validated by the controller.
    Delay(String),
    /// Print the board.
    Show,
    /// Print the status as JSON.
    Status,
    /// List commands.
    Help,
    /// Stop and exit.
    Quit,
}

/// Why a console line could not be parsed.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ParseError {
    /// The line held only whitespace.
    #[error("empty command")]
    Empty,

    /// The first word is not a command.
    #[error("unknown command {command:?}")]
    Unknown {
        /// The unrecognised word.
        command: String,
    },

    /// A required argument is missing.
    #[error("{command} needs <{argument}>")]
    MissingArgument {
        /// The command.
        command: &'static str,
        /// Name of the missing argument.
        argument: &'static str,
    },

    /// More words than the command takes.
    #[error("{command} takes no further arguments, got {extra:?}")]
    UnexpectedArgument {
        /// The command.
        command: &'static str,
        /// The first surplus word.
        extra: String,
    },

    /// A cell coordinate is not a non-negative integer.
    #[error("invalid coordinate {raw:?}")]
    InvalidCoordinate {
        /// The rejected word.
        raw: String,
    },
}

/// Whether the console loop keeps reading.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flow {
    /// Read the next line.
    Continue,
    /// Leave the loop.
    Quit,
}

/// Snapshot printed by the `status` command.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SimulationStatus {
    /// Whether auto-advance is on.
    pub running: bool,
    /// Delay between generations in milliseconds.
    pub delay_ms: u64,
    /// Columns of the most recently requested grid.
    pub cells_x: usize,
    /// Rows of the most recently requested grid.
    pub cells_y: usize,
    /// Generation shown by the view.
    pub generation: u64,
    /// Alive cells shown by the view.
    pub population: usize,
    /// Whether the game-over line is shown.
    pub game_over: bool,
    /// Validity of the width field.
    pub width_valid: bool,
    /// Validity of the height field.
    pub height_valid: bool,
    /// Validity of the delay field.
    pub delay_valid: bool,
    /// Seconds since start-up.
    pub elapsed_seconds: u64,
}

/// Parse one console line.
pub fn parse(line: &str) -> Result<ConsoleCommand, ParseError> {
    let mut words = line.split_whitespace();
    let Some(head) = words.next() else {
        return Err(ParseError::Empty);
    };

    let command = match head.to_ascii_lowercase().as_str() {
        "play" | "start" => (ConsoleCommand::Play, "play"),
        "pause" | "stop" => (ConsoleCommand::Pause, "pause"),
        "toggle" | "p" => (ConsoleCommand::Toggle, "toggle"),
        "step" | "s" => (ConsoleCommand::Step, "step"),
        "clear" => (ConsoleCommand::Clear, "clear"),
        "cell" | "c" => {
            let row = coordinate(words.next(), "cell", "row")?;
            let col = coordinate(words.next(), "cell", "col")?;
            (ConsoleCommand::Cell { row, col }, "cell")
        }
        "width" => (ConsoleCommand::Width(argument(words.next(), "width", "n")?), "width"),
        "height" => (ConsoleCommand::Height(argument(words.next(), "height", "n")?), "height"),
        "delay" => (ConsoleCommand::Delay(argument(words.next(), "delay", "ms")?), "delay"),
        "show" => (ConsoleCommand::Show, "show"),
        "status" => (ConsoleCommand::Status, "status"),
        "help" | "?" => (ConsoleCommand::Help, "help"),
        "quit" | "exit" | "q" => (ConsoleCommand::Quit, "quit"),
        _ => {
            return Err(ParseError::Unknown {
                command: head.to_owned(),
            });
        }
    };

    match words.next() {
        Some(extra) => Err(ParseError::UnexpectedArgument {
            command: command.1,
            extra: extra.to_owned(),
        }),
        None => Ok(command.0),
    }
}

fn argument(
    word: Option<&str>,
    command: &'static str,
    argument: &'static str,
) -> Result<String, ParseError> {
    word.map(str::to_owned)
        .ok_or(ParseError::MissingArgument { command, argument })
}

fn coordinate(
    word: Option<&str>,
    command: &'static str,
    name: &'static str,
) -> Result<usize, ParseError> {
    let raw = argument(word, command, name)?;
    raw.parse()
        .map_err(|_err| ParseError::InvalidCoordinate { raw: raw.clone() })
}

/// Collect the status from the controller and the view.
pub fn status(controller: &Controller, view: &SharedView) -> SimulationStatus {
    let operator = controller.operator();
    let (cells_x, cells_y) = controller.dimensions();
    let (width_valid, height_valid, delay_valid) = controller.fields_valid();
    let (generation, population, game_over) = render::lock(view).map_or((0, 0, false), |view| {
        (view.generation(), view.population(), view.is_game_over())
    });
    SimulationStatus {
        running: operator.is_running(),
        delay_ms: operator.delay_ms(),
        cells_x,
        cells_y,
        generation,
        population,
        game_over,
        width_valid,
        height_valid,
        delay_valid,
        elapsed_seconds: operator.elapsed_seconds(),
    }
}

/// Execute one command and return the text to show, if any.
pub async fn execute(
    command: ConsoleCommand,
    controller: &mut Controller,
    view: &SharedView,
) -> (Flow, Option<String>) {
    let reply = match command {
        ConsoleCommand::Play => Some(running_reply(controller.play())),
        ConsoleCommand::Pause => {
            controller.pause();
            Some(running_reply(false))
        }
        ConsoleCommand::Toggle => Some(running_reply(controller.toggle_game())),
        ConsoleCommand::Step => {
            controller.step().await;
            None
        }
        ConsoleCommand::Clear => {
            controller.clear().await;
            None
        }
        ConsoleCommand::Cell { row, col } => {
            controller.toggle_cell(row, col).await;
            None
        }
        ConsoleCommand::Width(raw) => Some(field_reply("width", controller.change_width(&raw).await)),
        ConsoleCommand::Height(raw) => {
            Some(field_reply("height", controller.change_height(&raw).await))
        }
        ConsoleCommand::Delay(raw) => Some(field_reply("delay", controller.change_delay(&raw))),
        ConsoleCommand::Show => Some(
            render::lock(view).map_or_else(|e| format!("view unavailable: {e}"), |view| view.render()),
        ),
        ConsoleCommand::Status => Some(
            serde_json::to_string(&status(controller, view))
                .unwrap_or_else(|e| format!("status unavailable: {e}")),
        ),
        ConsoleCommand::Help => Some(HELP.to_owned()),
        ConsoleCommand::Quit => {
            controller.quit();
            return (Flow::Quit, None);
        }
    };
    (Flow::Continue, reply)
}

fn running_reply(running: bool) -> String {
    let state = if running { "running" } else { "paused" };
    state.to_owned()
}

fn field_reply<E: std::fmt::Display>(field: &str, outcome: Result<bool, E>) -> String {
    match outcome {
        Ok(true) => format!("{field} updated"),
        Ok(false) => format!("{field} accepted"),
        Err(e) => format!("{field} invalid: {e}"),
    }
}

/// Lines read from the console, in order. A closed channel is end of input.
pub type ConsoleLines = mpsc::UnboundedReceiver<std::io::Result<String>>;

/// Start a thread that forwards stdin lines into a channel.
///
/// The thread is detached: runtime shutdown never waits on a pending read.
/// It ends at end of input, after a read error, or once the receiver is
/// dropped.
pub fn spawn_stdin_reader() -> std::io::Result<ConsoleLines> {
    let (tx, rx) = mpsc::unbounded_channel();
    std::thread::Builder::new()
        .name("life-stdin".to_owned())
        .spawn(move || {
            for line in std::io::stdin().lock().lines() {
                let failed = line.is_err();
                if tx.send(line).is_err() || failed {
                    break;
                }
            }
            debug!("Console reader finished");
        })?;
    Ok(rx)
}

/// Run commands from `lines` until `quit` or end of input.
///
/// End of input counts as `quit`. A read error is returned as is.
pub async fn run(
    mut lines: ConsoleLines,
    controller: &mut Controller,
    view: &SharedView,
) -> std::io::Result<()> {
    println!("{HELP}");

    while let Some(line) = lines.recv().await {
        let line = line?;
        let command = match parse(&line) {
            Ok(command) => command,
            Err(ParseError::Empty) => continue,
            Err(e) => {
                warn!(error = %e, "Unrecognised input");
                println!("{e}");
                continue;
            }
        };
        debug!(?command, "Console command");

        let (flow, reply) = execute(command, controller, view).await;
        if let Some(reply) = reply {
            println!("{reply}");
        }
        if flow == Flow::Quit {
            return Ok(());
        }
    }

    controller.quit();
    Ok(())
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::indexing_slicing)]
mod tests {
    use std::sync::Arc;

    use life_core::{Command, OperatorState};

    use super::*;
    use crate::render::BoardView;

    #[test]
    fn parses_every_command() {
        let cases = [
            ("play", ConsoleCommand::Play),
            ("PAUSE", ConsoleCommand::Pause),
            ("toggle", ConsoleCommand::Toggle),
            ("  step  ", ConsoleCommand::Step),
            ("clear", ConsoleCommand::Clear),
            ("cell 3 4", ConsoleCommand::Cell { row: 3, col: 4 }),
            ("width 12", ConsoleCommand::Width("12".to_owned())),
            ("height abc", ConsoleCommand::Height("abc".to_owned())),
            ("delay 250", ConsoleCommand::Delay("250".to_owned())),
            ("show", ConsoleCommand::Show),
            ("status", ConsoleCommand::Status),
            ("help", ConsoleCommand::Help),
            ("quit", ConsoleCommand::Quit),
        ];
        for (line, expected) in cases {
            assert_eq!(parse(line).unwrap(), expected, "line {line:?}");
        }
    }

    #[test]
    fn rejects_malformed_lines() {
        assert_eq!(parse("   "), Err(ParseError::Empty));
        assert!(matches!(parse("jump"), Err(ParseError::Unknown { .. })));
        assert!(matches!(
            parse("cell 3"),
            Err(ParseError::MissingArgument { command: "cell", argument: "col" })
        ));
        assert!(matches!(parse("cell -1 2"), Err(ParseError::InvalidCoordinate { .. })));
        assert!(matches!(parse("width"), Err(ParseError::MissingArgument { .. })));
        assert!(matches!(parse("step 2"), Err(ParseError::UnexpectedArgument { .. })));
    }

    #[tokio::test]
    async fn execute_queues_commands_and_reports_fields() {
        let operator = Arc::new(OperatorState::new(100, 0));
        let mut controller = Controller::new(Arc::clone(&operator), 4, 4);
        let view = BoardView::shared();

        let (flow, reply) = execute(ConsoleCommand::Width("9".to_owned()), &mut controller, &view).await;
        assert_eq!(flow, Flow::Continue);
        assert_eq!(reply.as_deref(), Some("width updated"));

        let (_, reply) = execute(ConsoleCommand::Delay("0".to_owned()), &mut controller, &view).await;
        assert!(reply.unwrap().starts_with("delay invalid"));

        execute(ConsoleCommand::Cell { row: 1, col: 1 }, &mut controller, &view).await;
        assert_eq!(
            operator.drain_commands().await,
            vec![
                Command::Resize { cells_x: 9, cells_y: 4 },
                Command::ToggleCell { row: 1, col: 1 },
            ]
        );

        let (flow, _) = execute(ConsoleCommand::Quit, &mut controller, &view).await;
        assert_eq!(flow, Flow::Quit);
        assert!(operator.is_stop_requested());
    }

    #[tokio::test]
    async fn status_serializes_to_json() {
        let operator = Arc::new(OperatorState::new(100, 0));
        let mut controller = Controller::new(operator, 8, 6);
        let view = BoardView::shared();

        let (_, reply) = execute(ConsoleCommand::Status, &mut controller, &view).await;
        let json: serde_json::Value = serde_json::from_str(&reply.unwrap()).unwrap();

        assert_eq!(json["running"], false);
        assert_eq!(json["delay_ms"], 100);
        assert_eq!(json["cells_x"], 8);
        assert_eq!(json["cells_y"], 6);
        assert_eq!(json["delay_valid"], true);
    }

    fn feed(lines: &[&str]) -> (mpsc::UnboundedSender<std::io::Result<String>>, ConsoleLines) {
        let (tx, rx) = mpsc::unbounded_channel();
        for line in lines {
            tx.send(Ok((*line).to_owned())).unwrap();
        }
        (tx, rx)
    }

    #[tokio::test]
    async fn run_stops_reading_at_quit() {
        let operator = Arc::new(OperatorState::new(100, 0));
        let mut controller = Controller::new(Arc::clone(&operator), 4, 4);
        let view = BoardView::shared();
        let (_tx, rx) = feed(&["width 9", "jump", "", "quit", "play"]);

        run(rx, &mut controller, &view).await.unwrap();

        assert!(operator.is_stop_requested());
        assert!(operator.is_paused(), "lines after quit must not run");
        assert_eq!(
            operator.drain_commands().await,
            vec![Command::Resize { cells_x: 9, cells_y: 4 }]
        );
    }

    #[tokio::test]
    async fn end_of_input_counts_as_quit() {
        let operator = Arc::new(OperatorState::new(100, 0));
        let mut controller = Controller::new(Arc::clone(&operator), 4, 4);
        let view = BoardView::shared();
        let (tx, rx) = feed(&["cell 1 2"]);
        drop(tx);

        run(rx, &mut controller, &view).await.unwrap();

        assert!(operator.is_stop_requested());
        assert_eq!(
            operator.drain_commands().await,
            vec![Command::ToggleCell { row: 1, col: 2 }]
        );
    }

    #[tokio::test]
    async fn read_error_is_returned() {
        let operator = Arc::new(OperatorState::new(100, 0));
        let mut controller = Controller::new(Arc::clone(&operator), 4, 4);
        let view = BoardView::shared();
        let (tx, rx) = feed(&[]);
        tx.send(Err(std::io::Error::other("broken pipe"))).unwrap();

        let err = run(rx, &mut controller, &view).await.unwrap_err();

        assert_eq!(err.to_string(), "broken pipe");
        assert!(!operator.is_stop_requested());
    }
}
