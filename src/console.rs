//! Terminal surface: line commands in, a live countdown line out.

use chrono::Local;
use regex::Regex;
use std::io::{BufRead, Write};
use std::sync::LazyLock;
use tracing::{debug, warn};

use crate::error::TimerError;
use crate::notifier::completion_message;
use crate::pomodoro::events::{EventSink, Snapshot, TimerEvent};
use crate::pomodoro::pomodoro::Mode;
use crate::runtime::{Command, Reply, Request, RequestSender, send_command_blocking};

static SET_DURATION: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(?:set\s+)?([a-z_-]+)\s+(\S+)$").expect("duration command pattern")
});

pub const HELP: &str = "commands: [enter]/t toggle, s start, p pause, r reset, \
set <focus|short|long> <minutes>, status, theme (show), tt toggle theme, q quit";

const PROGRESS_WIDTH: usize = 10;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConsoleInput {
    Command(Command),
    Help,
    Quit,
}

pub fn parse_console_command(line: &str) -> Result<ConsoleInput, TimerError> {
    let line = line.trim().to_lowercase();
    let command = match line.as_str() {
        "" | "t" | "toggle" | "space" => Command::Toggle,
        "s" | "start" => Command::Start,
        "p" | "pause" => Command::Pause,
        "r" | "reset" => Command::Reset,
        "status" | "?" => Command::Status,
        "theme" => Command::Theme,
        "tt" | "toggle-theme" | "toggle_theme" => Command::ToggleTheme,
        "h" | "help" => return Ok(ConsoleInput::Help),
        "q" | "quit" | "exit" => return Ok(ConsoleInput::Quit),
        other => {
            let captures = SET_DURATION
                .captures(other)
                .ok_or_else(|| TimerError::UnknownCommand(other.to_string()))?;
            let mode = Mode::parse(&captures[1])
                .ok_or_else(|| TimerError::UnknownCommand(other.to_string()))?;
            let minutes = captures[2]
                .parse::<i64>()
                .map_err(|_| TimerError::InvalidMinutes(captures[2].to_string()))?;
            Command::UpdateConfig { mode, minutes }
        }
    };
    Ok(ConsoleInput::Command(command))
}

/// Bar that drains as the period runs down, e.g. `[#######---]`.
pub fn progress_bar(fraction: f64) -> String {
    let filled = (fraction.clamp(0.0, 1.0) * PROGRESS_WIDTH as f64).round() as usize;
    format!(
        "[{}{}]",
        "#".repeat(filled),
        "-".repeat(PROGRESS_WIDTH - filled)
    )
}

pub fn status_line(snapshot: &Snapshot) -> String {
    format!(
        "{} {} {} {} {}  session #{}  completed {}",
        snapshot.mode.emoji(),
        snapshot.mode.as_str(),
        snapshot.format_remaining(),
        progress_bar(snapshot.fraction_remaining()),
        if snapshot.running { "running" } else { "paused" },
        snapshot.session_number,
        snapshot.focus_intervals_completed
    )
}

/// Redraws the countdown in place and prints a line per completed period.
pub struct ConsoleSink<W: Write> {
    out: W,
}

impl<W: Write> ConsoleSink<W> {
    pub fn new(out: W) -> Self {
        Self { out }
    }

    pub fn into_inner(self) -> W {
        self.out
    }

    fn render(&mut self, event: &TimerEvent) -> std::io::Result<()> {
        match event {
            TimerEvent::Progress { snapshot } => {
                write!(self.out, "\r{}   ", status_line(snapshot))?;
            }
            TimerEvent::PeriodCompleted {
                ended, starting, ..
            } => {
                let (summary, body) = completion_message(*ended);
                writeln!(self.out)?;
                writeln!(
                    self.out,
                    "🔔 [{}] {} {}",
                    Local::now().format("%H:%M:%S"),
                    summary,
                    body
                )?;
                writeln!(
                    self.out,
                    "{} Switched to {} mode",
                    starting.emoji(),
                    starting.as_str()
                )?;
            }
            TimerEvent::SessionCountersChanged { .. } => {}
        }
        self.out.flush()
    }
}

impl<W: Write> EventSink for ConsoleSink<W> {
    fn on_event(&mut self, event: &TimerEvent) {
        if let Err(e) = self.render(event) {
            warn!(error = %e, "failed to draw timer");
        }
    }
}

fn print_reply<W: Write>(out: &mut W, command: &Command, reply: &Reply) -> std::io::Result<()> {
    match command {
        Command::Status => writeln!(out, "\n{}", status_line(&reply.snapshot)),
        Command::ToggleTheme | Command::Theme => writeln!(out, "\ntheme: {}", reply.theme.as_str()),
        _ => Ok(()),
    }
}

/// Reads commands line by line until `quit` or end of input, then asks the
/// runtime to stop. Blocks, so it runs on its own thread.
pub fn read_commands<R: BufRead, W: Write>(
    input: R,
    mut out: W,
    requests: RequestSender,
) -> std::io::Result<()> {
    for line in input.lines() {
        let line = line?;
        match parse_console_command(&line) {
            Ok(ConsoleInput::Command(command)) => {
                match send_command_blocking(&requests, command.clone()) {
                    Ok(reply) => print_reply(&mut out, &command, &reply)?,
                    Err(TimerError::RuntimeClosed) => break,
                    Err(e) => writeln!(out, "\n{}", e)?,
                }
            }
            Ok(ConsoleInput::Help) => writeln!(out, "\n{}", HELP)?,
            Ok(ConsoleInput::Quit) => break,
            Err(e) => writeln!(out, "\n{} ({})", e, HELP)?,
        }
    }
    debug!("console input finished");
    let _ = requests.send(Request::Shutdown);
    Ok(())
}

/// Spawn the stdin reader. A plain thread, so a pending read never holds
/// up runtime shutdown.
pub fn spawn_stdin_reader(requests: RequestSender) {
    std::thread::spawn(move || {
        let stdin = std::io::stdin();
        if let Err(e) = read_commands(stdin.lock(), std::io::stdout(), requests.clone()) {
            warn!(error = %e, "failed to read stdin");
            let _ = requests.send(Request::Shutdown);
        }
    });
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;

    fn command(line: &str) -> Command {
        match parse_console_command(line).unwrap() {
            ConsoleInput::Command(c) => c,
            other => panic!("expected a command, got {:?}", other),
        }
    }

    #[test]
    fn single_letter_shortcuts() {
        assert_eq!(command(""), Command::Toggle);
        assert_eq!(command("s"), Command::Start);
        assert_eq!(command(" P "), Command::Pause);
        assert_eq!(command("r"), Command::Reset);
        assert_eq!(command("theme"), Command::Theme);
        assert_eq!(command("tt"), Command::ToggleTheme);
        assert_eq!(parse_console_command("q").unwrap(), ConsoleInput::Quit);
    }

    #[test]
    fn duration_commands() {
        assert_eq!(
            command("set focus 10"),
            Command::UpdateConfig {
                mode: Mode::Focus,
                minutes: 10
            }
        );
        assert_eq!(
            command("long 20"),
            Command::UpdateConfig {
                mode: Mode::LongBreak,
                minutes: 20
            }
        );
        assert_eq!(
            command("set short -2"),
            Command::UpdateConfig {
                mode: Mode::ShortBreak,
                minutes: -2
            }
        );
    }

    #[test]
    fn bad_input_is_an_error() {
        assert_matches!(
            parse_console_command("set focus ten"),
            Err(TimerError::InvalidMinutes(m)) if m == "ten"
        );
        assert_matches!(
            parse_console_command("set focus 2.5"),
            Err(TimerError::InvalidMinutes(_))
        );
        assert_matches!(
            parse_console_command("set lunch 30"),
            Err(TimerError::UnknownCommand(_))
        );
        assert_matches!(
            parse_console_command("dance"),
            Err(TimerError::UnknownCommand(c)) if c == "dance"
        );
    }

    #[test]
    fn console_sink_draws_progress_and_completion() {
        let mut sink = ConsoleSink::new(Vec::new());
        let snapshot = Snapshot {
            mode: Mode::Focus,
            running: true,
            remaining_seconds: 1499,
            total_seconds: 1500,
            focus_intervals_completed: 0,
            session_number: 1,
        };
        sink.on_event(&TimerEvent::Progress { snapshot });
        sink.on_event(&TimerEvent::PeriodCompleted {
            ended: Mode::Focus,
            starting: Mode::ShortBreak,
            snapshot,
        });

        let out = String::from_utf8(sink.into_inner()).unwrap();
        assert!(out.starts_with("\r🍅 FOCUS 24:59 [##########] running  session #1  completed 0"));
        assert!(out.contains("Focus session complete!"));
        assert!(out.contains("Switched to SHORT BREAK mode"));
    }

    #[test]
    fn progress_bar_drains_with_the_period() {
        assert_eq!(progress_bar(1.0), "[##########]");
        assert_eq!(progress_bar(0.5), "[#####-----]");
        assert_eq!(progress_bar(0.0), "[----------]");
        assert_eq!(progress_bar(1.5), "[##########]");
    }

    #[test]
    fn status_line_shows_remaining_fraction() {
        let snapshot = Snapshot {
            mode: Mode::ShortBreak,
            running: false,
            remaining_seconds: 90,
            total_seconds: 300,
            focus_intervals_completed: 1,
            session_number: 2,
        };
        assert_eq!(
            status_line(&snapshot),
            "☕ SHORT BREAK 01:30 [###-------] paused  session #2  completed 1"
        );
    }

    #[tokio::test]
    async fn read_commands_drives_the_runtime() {
        use crate::pomodoro::controller::SessionController;
        use crate::pomodoro::pomodoro::DurationConfig;
        use crate::pomodoro::scheduler::ManualTicker;
        use crate::runtime::{Runtime, request_channel};
        use crate::settings::MemorySettingsStore;
        use std::io::Cursor;

        let (tx, rx) = request_channel();
        let controller = SessionController::new(DurationConfig::default(), ManualTicker::default());
        let runtime = Runtime::new(controller, MemorySettingsStore::default());

        let input = Cursor::new("set focus 10\nset focus 0\nbogus\ntheme\ntt\ns\nstatus\nq\nreset\n");
        let reader = std::thread::spawn(move || {
            let mut out = Vec::new();
            read_commands(input, &mut out, tx).unwrap();
            String::from_utf8(out).unwrap()
        });

        let last = runtime.run(rx).await;
        let out = reader.join().unwrap();

        // Stops at `q`; the trailing reset never runs.
        assert_eq!(last.remaining_seconds, 600);
        assert_eq!(last.total_seconds, 600);
        assert!(!last.running);
        assert!(out.contains("invalid duration"));
        assert!(out.contains("unknown command"));
        assert!(out.contains("theme: light\n"));
        assert!(out.contains("theme: dark\n"));
        assert!(out.contains("🍅 FOCUS 10:00 [##########] running"));
    }
}
