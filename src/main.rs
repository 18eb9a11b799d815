mod calc;
mod catalog;
mod config;
mod db;
mod docx;
mod error;
mod exchange;
mod ipc;
mod logging;
mod model;
mod render;
mod session;
mod students;
mod transcript;

use serde_json::json;
use std::io::{self, BufRead, Write};
use tracing::{error, info, warn};

fn main() {
    let config = match config::Config::load() {
        Ok(c) => c,
        Err(e) => {
            eprintln!("transcriptd: {e}");
            std::process::exit(2);
        }
    };
    logging::init_logging(&config.log_filter);
    info!(version = env!("CARGO_PKG_VERSION"), "transcriptd starting");

    let startup_workspace = config.workspace.clone();
    let mut state = ipc::AppState::new(config);
    if let Some(ws) = startup_workspace {
        if let Err(e) = ipc::select_workspace(&mut state, ws.clone()) {
            // the host can still pick another workspace over IPC
            warn!(workspace = %ws.display(), error = %e, "could not open configured workspace");
        }
    }

    let stdin = io::stdin();
    let mut stdout = io::stdout();

    for line in stdin.lock().lines() {
        let line = match line {
            Ok(v) => v,
            Err(e) => {
                error!(error = %e, "stdin read failed");
                break;
            }
        };
        if line.trim().is_empty() {
            continue;
        }

        let resp = match serde_json::from_str::<ipc::Request>(&line) {
            Ok(req) => ipc::handle_request(&mut state, req),
            // no id to answer to
            Err(e) => {
                warn!(error = %e, "unparseable request line");
                json!({ "ok": false, "error": { "code": "bad_json", "message": e.to_string() } })
            }
        };
        let _ = writeln!(
            stdout,
            "{}",
            serde_json::to_string(&resp).unwrap_or_else(|_| "{\"ok\":false}".to_string())
        );
        let _ = stdout.flush();
    }
    info!("stdin closed, exiting");
}
