use std::sync::mpsc;

use engine_logging::{engine_debug, engine_info};

use crate::HarvestEvent;

pub trait ProgressSink: Send + Sync {
    fn emit(&self, event: HarvestEvent);
}

pub struct ChannelProgressSink {
    tx: mpsc::Sender<HarvestEvent>,
}

impl ChannelProgressSink {
    pub fn new(tx: mpsc::Sender<HarvestEvent>) -> Self {
        Self { tx }
    }
}

impl ProgressSink for ChannelProgressSink {
    fn emit(&self, event: HarvestEvent) {
        let _ = self.tx.send(event);
    }
}

/// Writes events to the log instead of forwarding them.
#[derive(Debug, Default, Clone, Copy)]
pub struct LogProgressSink;

impl ProgressSink for LogProgressSink {
    fn emit(&self, event: HarvestEvent) {
        match event {
            HarvestEvent::Stage { kind, stage } => engine_debug!("{kind} harvest: {stage:?}"),
            HarvestEvent::Progress(p) => engine_info!(
                "revealed {}/{} after step {} (images {}/{} resolved)",
                p.revealed,
                p.target,
                p.step,
                p.images.resolved,
                p.images.total()
            ),
            HarvestEvent::Completed {
                kind,
                extracted,
                added,
                corpus_len,
            } => engine_info!(
                "{kind} harvest complete: extracted={extracted} added={added} corpus={corpus_len}"
            ),
        }
    }
}
