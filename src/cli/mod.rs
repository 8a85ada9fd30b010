mod command;
mod runner;
mod util;

pub use command::Command;
pub use runner::{Outcome, OutputMode, run};
pub use util::parse_params;
