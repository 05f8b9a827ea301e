mod watch_loop;

pub use watch_loop::{CycleReport, EntryOutcome, WatchError, WatchLoop};
