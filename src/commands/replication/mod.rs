mod psync;
mod replconf;

pub use psync::{psync, PsyncArguments};
pub use replconf::{replconf, ReplconfArguments};
