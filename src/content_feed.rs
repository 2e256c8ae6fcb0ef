use std::sync::Arc;
use std::sync::mpsc::{Receiver, Sender};
use std::thread;

use crate::config::BoothConfig;
use crate::content::ContentSource;
use crate::content_client::HttpContentSource;
use crate::fake_content::FakeContentSource;
use crate::state::{Delta, ProviderCommand};

pub fn source_from_config(config: &BoothConfig) -> Arc<dyn ContentSource> {
    match config.content_url.as_ref() {
        Some(url) => Arc::new(HttpContentSource::new(
            url.clone(),
            config.content_token.clone(),
            config.content_timeout,
        )),
        None => Arc::new(FakeContentSource::new(config.fake_fail_rate)),
    }
}

/// Runs generation requests off the UI thread. Each request is an independent job,
/// so a slow card never holds up the others. Results come back as `Delta`s tagged
/// with the request token; the card drops any it no longer waits for.
pub fn spawn_content_worker(
    tx: Sender<Delta>,
    cmd_rx: Receiver<ProviderCommand>,
    source: Arc<dyn ContentSource>,
    parallelism: usize,
) -> thread::JoinHandle<()> {
    thread::spawn(move || {
        let pool = build_fetch_pool(parallelism);
        if pool.is_none() {
            let _ = tx.send(Delta::Log(
                "[WARN] Fetch pool unavailable; using one thread per request".to_string(),
            ));
        }

        // Exits once the UI drops its sender.
        while let Ok(cmd) = cmd_rx.recv() {
            match cmd {
                ProviderCommand::Generate {
                    card,
                    token,
                    request,
                } => {
                    let tx = tx.clone();
                    let source = source.clone();
                    let job = move || {
                        let kind = request.kind;
                        let delta = match source.generate(&request) {
                            Ok(payload) if payload.kind() == kind => Delta::CardReady {
                                kind,
                                card,
                                token,
                                payload,
                            },
                            Ok(payload) => Delta::CardFailed {
                                kind,
                                card,
                                token,
                                error: format!(
                                    "backend returned {} content",
                                    payload.kind().label()
                                ),
                            },
                            Err(err) => Delta::CardFailed {
                                kind,
                                card,
                                token,
                                error: format!("{err:#}"),
                            },
                        };
                        let _ = tx.send(delta);
                    };

                    if let Some(pool) = pool.as_ref() {
                        pool.spawn(job);
                    } else {
                        thread::spawn(job);
                    }
                }
            }
        }
    })
}

fn build_fetch_pool(threads: usize) -> Option<rayon::ThreadPool> {
    rayon::ThreadPoolBuilder::new()
        .num_threads(threads.max(1))
        .thread_name(|idx| format!("content-{idx}"))
        .build()
        .ok()
}
