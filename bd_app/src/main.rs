//! bdEngine test application
//!
//! Opens the engine's window and renders until it is closed. An optional
//! first argument names a `.toml` or `.ron` engine configuration.

use std::panic::{self, AssertUnwindSafe};
use std::process::ExitCode;

use bd_engine::foundation::logging;
use bd_engine::{Engine, EngineError};

fn run() -> Result<i32, EngineError> {
    let mut engine = Engine::from_args(std::env::args().skip(1))?;
    logging::init(&engine.config().log_level);

    engine.init()?;
    engine.run()
}

fn main() -> ExitCode {
    // Panics are reported below instead of by the default hook
    panic::set_hook(Box::new(|info| log::error!("{info}")));

    match panic::catch_unwind(AssertUnwindSafe(run)) {
        Ok(Ok(code)) => ExitCode::from(u8::try_from(code).unwrap_or(1)),
        Ok(Err(e)) => {
            eprintln!("Caught exception: {e}");
            ExitCode::FAILURE
        }
        Err(_) => {
            eprintln!("Caught unknown exception");
            ExitCode::FAILURE
        }
    }
}
