#[cfg(all(feature = "tui", not(feature = "line")))]
mod render_help;
#[cfg(all(feature = "tui", not(feature = "line")))]
mod tui_mode;
#[cfg(feature = "line")]
mod line_mode;

use std::fs::{self, OpenOptions};

use anyhow::Result;
use env_logger::{Env, Target};

use calcvault::session::Session;
use calcvault::store::Store;

const LOG_FILE: &str = "calcvault.log";

/// Logs go to a file in the data directory so they never draw over the screen.
fn init_logging(store: &Store) {
    let mut builder = env_logger::Builder::from_env(Env::default().default_filter_or("off"));
    let file = fs::create_dir_all(store.dir()).and_then(|_| {
        OpenOptions::new()
            .create(true)
            .append(true)
            .open(store.dir().join(LOG_FILE))
    });
    if let Ok(file) = file {
        builder.target(Target::Pipe(Box::new(file)));
    }
    builder.init();
}

#[cfg(feature = "line")]
fn run(session: Session) -> Result<()> {
    line_mode::run_line(session)
}

#[cfg(all(feature = "tui", not(feature = "line")))]
fn run(session: Session) -> Result<()> {
    tui_mode::run_tui(session)
}

#[cfg(not(any(feature = "tui", feature = "line")))]
fn run(_session: Session) -> Result<()> {
    anyhow::bail!("built without a front-end, enable the `tui` or `line` feature")
}

fn main() -> Result<()> {
    let store = Store::from_env();
    init_logging(&store);
    log::info!("starting, data directory {}", store.dir().display());

    let session = Session::open(store)?;
    run(session)
}
