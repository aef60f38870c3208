use std::sync::mpsc;

use omnivore_logging::{LogEntry, LogSink, NullLogSink};

use crate::EngineEvent;

/// Receiver of live status events.
pub trait ProgressSink: Send + Sync {
    fn emit(&self, event: EngineEvent);
}

#[derive(Debug, Default, Clone, Copy)]
pub struct NullProgressSink;

impl ProgressSink for NullProgressSink {
    fn emit(&self, _event: EngineEvent) {}
}

/// Forwards progress and log entries into one event channel.
pub struct ChannelProgressSink {
    tx: mpsc::Sender<EngineEvent>,
}

impl ChannelProgressSink {
    pub fn new(tx: mpsc::Sender<EngineEvent>) -> Self {
        Self { tx }
    }
}

impl ProgressSink for ChannelProgressSink {
    fn emit(&self, event: EngineEvent) {
        let _ = self.tx.send(event);
    }
}

impl LogSink for ChannelProgressSink {
    fn record(&self, entry: LogEntry) {
        let _ = self.tx.send(EngineEvent::Log(entry));
    }
}

/// The two side channels threaded through a conversion.
#[derive(Clone, Copy)]
pub struct Observers<'a> {
    pub progress: &'a dyn ProgressSink,
    pub log: &'a dyn LogSink,
}

impl<'a> Observers<'a> {
    pub fn new(progress: &'a dyn ProgressSink, log: &'a dyn LogSink) -> Self {
        Self { progress, log }
    }
}

impl Observers<'static> {
    /// Observers that drop everything.
    pub fn silent() -> Self {
        Self {
            progress: &NullProgressSink,
            log: &NullLogSink,
        }
    }
}
