use dlaunch::cli;
use dlaunch::daemon::{launch, Launch};
use dlaunch::runtime::{CommandRuntime, Runtime};

fn main() {
    dlaunch::logs::init();

    let code = match cli::native().and_then(launch) {
        // The invoking process leaves immediately; the detached child carries on
        Ok(Launch::Parent(_)) => 0,
        Ok(Launch::Ready(args)) => CommandRuntime::native().start(args),
        Err(e) => {
            eprintln!("Error: {}", e);
            e.exit_code()
        }
    };

    std::process::exit(code);
}
