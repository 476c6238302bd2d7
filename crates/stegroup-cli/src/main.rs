//! `stegroup` binary entrypoint.

use std::process;

#[tokio::main]
async fn main() {
    let code = stegroup_cli::run().await;
    if code != 0 {
        process::exit(code);
    }
}
