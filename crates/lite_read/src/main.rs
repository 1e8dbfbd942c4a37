//! Command-line host: attaches an overlay to a local HTML file and answers JSON-lines
//! requests read from stdin.
//!
//! ```text
//! lite_read page.html [--preset=<json>] [--dump]
//! ```

use std::env;
use std::path::PathBuf;
use std::process::exit;

use anyhow::{Context as _, Error, anyhow, bail};
use dom::Document;
use env_logger::{Builder, Env};
use log::{error, info, warn};
use overlay::runtime::{Envelope, run};
use overlay::{OverlayConfig, OverlayEngine, Preset, Request, Response};
use tokio::fs;
use tokio::io::{AsyncBufReadExt as _, AsyncWriteExt as _, BufReader, Stdout, stdin, stdout};
use tokio::sync::{mpsc, oneshot};

struct Args {
    path: PathBuf,
    preset: Option<Preset>,
    dump: bool,
}

fn parse_args() -> Result<Args, Error> {
    let mut path = None;
    let mut preset = None;
    let mut dump = false;
    for arg in env::args().skip(1) {
        if arg == "--dump" {
            dump = true;
        } else if let Some(json) = arg.strip_prefix("--preset=") {
            preset = Some(serde_json::from_str(json).context("invalid --preset")?);
        } else if arg.starts_with("--") {
            bail!("unknown option {arg}");
        } else if path.replace(PathBuf::from(&arg)).is_some() {
            bail!("only one HTML file may be given");
        }
    }
    let path =
        path.ok_or_else(|| anyhow!("usage: lite_read <page.html> [--preset=<json>] [--dump]"))?;
    Ok(Args { path, preset, dump })
}

async fn ask(requests: &mpsc::Sender<Envelope>, request: Request) -> Result<Response, Error> {
    let (reply, answer) = oneshot::channel();
    requests
        .send((request, reply))
        .await
        .map_err(|_| anyhow!("overlay engine stopped"))?;
    Ok(answer.await?)
}

async fn write_line(out: &mut Stdout, bytes: &[u8]) -> Result<(), Error> {
    out.write_all(bytes).await?;
    out.write_all(b"\n").await?;
    out.flush().await?;
    Ok(())
}

async fn serve(args: Args) -> Result<(), Error> {
    let html = fs::read_to_string(&args.path)
        .await
        .with_context(|| format!("reading {}", args.path.display()))?;
    let document = Document::parse_html(&html)?;
    let engine = OverlayEngine::attach(document, OverlayConfig::from_env());

    let (request_tx, request_rx) = mpsc::channel(16);
    // No live page behind a file, so the mutation source closes immediately.
    let (_, mutation_rx) = mpsc::channel(1);
    let task = tokio::spawn(run(engine, request_rx, mutation_rx));
    let mut out = stdout();

    if let Some(preset) = args.preset {
        let response = ask(&request_tx, preset.into_request()).await?;
        if response.is_error() {
            warn!("preset rejected: {response:?}");
        }
    }

    let mut lines = BufReader::new(stdin()).lines();
    let mut served = 0_usize;
    while let Some(line) = lines.next_line().await? {
        let trimmed = line.trim();
        if trimmed.is_empty() {
            continue;
        }
        let response = match serde_json::from_str::<Request>(trimmed) {
            Ok(request) => ask(&request_tx, request).await?,
            Err(err) => {
                warn!("malformed request: {err}");
                Response::error(format!("malformed request: {err}"))
            }
        };
        write_line(&mut out, &serde_json::to_vec(&response)?).await?;
        served += 1;
    }

    drop(request_tx);
    let engine = task.await?;
    info!("served {served} requests");
    if args.dump {
        write_line(&mut out, engine.document().to_html().as_bytes()).await?;
    }
    Ok(())
}

#[tokio::main(flavor = "current_thread")]
async fn main() {
    let _log_init: Result<(), _> = Builder::from_env(Env::default().filter_or("RUST_LOG", "warn"))
        .is_test(false)
        .try_init();
    let result = match parse_args() {
        Ok(args) => serve(args).await,
        Err(err) => Err(err),
    };
    if let Err(err) = result {
        error!("error: {err:#}");
        exit(1);
    }
}
