// This Source Code Form is subject to the terms of the Mozilla Public License, v. 2.0.
// If a copy of the MPL was not distributed with this file,
// You can obtain one at <https://mozilla.org/MPL/2.0/>.

use boing::app::App;

fn run() -> anyhow::Result<()> {
    App::new().run()
}

fn main() {
    init_logging();

    if let Err(err) = run() {
        eprintln!("Error: {}", err);
        for cause in err.chain().skip(1) {
            eprintln!("because: {}", cause);
        }
        std::process::exit(1);
    }
}

/// `RUST_LOG` wins when set; otherwise default to info for this crate in
/// debug builds and warnings-only everywhere else.
fn init_logging() {
    let filter = if cfg!(debug_assertions) {
        concat!("warn,", env!("CARGO_PKG_NAME"), "=info")
    } else {
        "warn"
    };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(filter)).init();
}

// End of File
