use std::path::PathBuf;
use std::sync::mpsc;
use std::thread;

use crate::config::EngineConfig;
use crate::observe::{ChannelProgressSink, Observers};
use crate::pipeline::convert_export;
use crate::EngineEvent;

#[derive(Debug, Clone)]
pub struct ConvertJob {
    pub input: PathBuf,
    pub output: PathBuf,
    pub config: EngineConfig,
}

/// One conversion running on a background thread.
///
/// Events arrive in order and end with `EngineEvent::Finished`. Dropping the
/// handle abandons the result; the run itself finishes in the background.
pub struct EngineHandle {
    event_rx: mpsc::Receiver<EngineEvent>,
}

impl EngineHandle {
    pub fn start(job: ConvertJob) -> Self {
        let (event_tx, event_rx) = mpsc::channel();

        thread::spawn(move || {
            let sink = ChannelProgressSink::new(event_tx.clone());
            let observers = Observers::new(&sink, &sink);
            let result = match tokio::runtime::Builder::new_multi_thread()
                .enable_all()
                .build()
            {
                Ok(runtime) => runtime
                    .block_on(convert_export(&job.input, &job.output, &job.config, observers))
                    .map_err(|err| err.to_string()),
                Err(err) => Err(format!("cannot start async runtime: {err}")),
            };
            let _ = event_tx.send(EngineEvent::Finished(result));
        });

        Self { event_rx }
    }

    /// Blocks for the next event; `None` once the run is over and drained.
    pub fn recv(&self) -> Option<EngineEvent> {
        self.event_rx.recv().ok()
    }

    pub fn try_recv(&self) -> Option<EngineEvent> {
        self.event_rx.try_recv().ok()
    }
}
