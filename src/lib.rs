// Library surface shared by the binary and the unit tests.
pub mod cli;
pub mod console;
pub mod error;
pub mod logging;
pub mod notifier;
pub mod pomodoro;
pub mod runtime;
pub mod settings;
pub mod ws;

pub use error::TimerError;
pub use pomodoro::controller::SessionController;
pub use pomodoro::events::{EventSink, Snapshot, TimerEvent};
pub use pomodoro::pomodoro::{DurationConfig, Mode};
