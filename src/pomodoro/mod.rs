pub mod controller;
pub mod events;
#[allow(clippy::module_inception)]
pub mod pomodoro;
pub mod scheduler;
pub mod session;
