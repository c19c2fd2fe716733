use std::io::{self, BufRead, Write};

use clap::Parser;
use fluxc::{run, Args, Config, Error};
use fluxplugins::arabic::PlausibilityWarning;

/// Ask on the terminal whether to continue despite warnings.
fn ask(warnings: &[PlausibilityWarning]) -> bool {
    let mut stderr = io::stderr();
    let _ = write!(
        stderr,
        "{} warnings, add the routines anyway? [y/N] ",
        warnings.len()
    );
    let _ = stderr.flush();
    let mut answer = String::new();
    if io::stdin().lock().read_line(&mut answer).is_err() {
        return false;
    }
    matches!(answer.trim(), "y" | "Y" | "yes")
}

fn main() -> Result<(), Error> {
    env_logger::builder()
        .format(|buf, record| {
            let ts = buf.timestamp_micros();
            let style = buf.default_level_style(record.level());
            writeln!(
                buf,
                "{}: {:?}: {style}{}{style:#}: {}",
                ts,
                std::thread::current().id(),
                record.level(),
                record.args()
            )
        })
        .init();

    let config = Config::new(Args::parse());
    log::debug!("{config:?}");
    let mut stdout = io::stdout().lock();
    run(&config, &mut stdout, &mut ask)
}
