use std::collections::HashSet;

use crate::record::Record;
use crate::signature::Signature;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MergeOutcome {
    pub corpus: Vec<Record>,
    pub added: usize,
}

impl MergeOutcome {
    /// A merge that admitted nothing is a successful no-op, not a failure.
    pub fn is_noop(&self) -> bool {
        self.added == 0
    }
}

/// Appends the records of `batch` whose signatures are not yet known.
///
/// Existing records are never removed or reordered. Signatures admitted from the
/// batch join the known set immediately, so a batch with internal duplicates
/// contributes only the first occurrence.
pub fn merge(existing: Vec<Record>, batch: impl IntoIterator<Item = Record>) -> MergeOutcome {
    let mut seen: HashSet<Signature> = existing.iter().map(Signature::of).collect();
    let mut corpus = existing;
    let before = corpus.len();

    for record in batch {
        let signature = record.signature();
        if seen.contains(&signature) {
            engine_logging::engine_trace!("merge skipped duplicate {}", signature);
            continue;
        }
        seen.insert(signature);
        corpus.push(record);
    }

    let added = corpus.len() - before;
    MergeOutcome { corpus, added }
}
