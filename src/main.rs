use clap::Parser;
use std::time::Duration;
use tracing::info;

use focus_it::cli::Cli;
use focus_it::console::{self, ConsoleSink, status_line};
use focus_it::logging;
use focus_it::notifier::DesktopNotifier;
use focus_it::pomodoro::controller::SessionController;
use focus_it::pomodoro::events::Snapshot;
use focus_it::pomodoro::pomodoro::{DurationConfig, Mode, TICK_INTERVAL_MS};
use focus_it::pomodoro::scheduler::TokioTicker;
use focus_it::runtime::{Request, RequestReceiver, RequestSender, Runtime, request_channel};
use focus_it::settings::FileSettingsStore;
use focus_it::ws::websocket_server::{BroadcastSink, create_event_channel, start_websocket_server};

fn print_banner(title: &str, config: &DurationConfig) {
    println!("🍅 Focus It - {}", title);
    println!("======================================================");
    println!(
        "Pomodoro settings: {}min focus / {}min short break / {}min long break",
        config.minutes(Mode::Focus),
        config.minutes(Mode::ShortBreak),
        config.minutes(Mode::LongBreak)
    );
}

fn print_summary(last: &Snapshot) {
    println!("\n--- Session Statistics ---");
    println!("Focus periods completed: {}", last.focus_intervals_completed);
    println!("Stopped at: {}", status_line(last));
    println!("--------------------------\n");
}

/// Run the controller until it stops on its own or Ctrl+C arrives.
async fn run_until_interrupted<S, St>(
    runtime: Runtime<S, St>,
    tx: &RequestSender,
    rx: RequestReceiver,
) -> Snapshot
where
    S: focus_it::pomodoro::scheduler::TickScheduler,
    St: focus_it::settings::SettingsStore,
{
    let run = runtime.run(rx);
    tokio::pin!(run);
    tokio::select! {
        last = &mut run => last,
        _ = tokio::signal::ctrl_c() => {
            info!("interrupted");
            let _ = tx.send(Request::Shutdown);
            run.await
        }
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    let log_path = cli.log.clone().unwrap_or_else(logging::default_log_path);
    let console_level = if cli.daemon { "info" } else { "warn" };
    let _log_guard = logging::init(&log_path, console_level, cli.verbose);

    let config = cli.duration_config()?;

    let (tx, rx) = request_channel();
    let ticker = TokioTicker::new(tx.clone(), Duration::from_millis(TICK_INTERVAL_MS));
    let mut controller = SessionController::new(config, ticker);
    if !cli.no_notify {
        controller.subscribe(DesktopNotifier);
    }

    if cli.daemon {
        return run_daemon_mode(cli, controller, tx, rx).await;
    }

    let store = FileSettingsStore::new();
    print_banner("Terminal Timer", &config);
    println!("Logging to: {}", log_path.display());
    println!("Settings: {}", store.path().display());
    println!("{}\n", console::HELP);

    controller.subscribe(ConsoleSink::new(std::io::stdout()));
    println!("{}", status_line(&controller.snapshot()));

    let runtime = Runtime::new(controller, store);
    console::spawn_stdin_reader(tx.clone());

    let last = run_until_interrupted(runtime, &tx, rx).await;
    print_summary(&last);
    Ok(())
}

/// Run in daemon mode - WebSocket bridge for a browser front end
async fn run_daemon_mode(
    cli: Cli,
    mut controller: SessionController<TokioTicker>,
    tx: RequestSender,
    rx: RequestReceiver,
) -> Result<(), Box<dyn std::error::Error>> {
    let store = FileSettingsStore::new();
    print_banner("Daemon Mode", controller.config());
    println!("Settings: {}", store.path().display());
    println!("Running WebSocket server on ws://{}\n", cli.addr);

    let events = create_event_channel();
    controller.subscribe(BroadcastSink::new(events.clone()));
    let runtime = Runtime::new(controller, store);

    let server = start_websocket_server(cli.addr, tx.clone(), events);
    tokio::pin!(server);
    let run = run_until_interrupted(runtime, &tx, rx);
    tokio::pin!(run);

    let last = tokio::select! {
        last = &mut run => last,
        res = &mut server => {
            res?;
            let _ = tx.send(Request::Shutdown);
            run.await
        }
    };

    print_summary(&last);
    Ok(())
}
