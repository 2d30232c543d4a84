use std::collections::HashMap;

use tracing::{debug, info, warn};

use super::canto::{BlockSettings, Canto, CantoBuffer, CantoId, WorkPart};
use super::lines::{canto_ordinal, clean_line, LineClassifier, LineKind};
use crate::error::Result;

/// Ordinals common enough to cross-check the counted canto number.
const ORDINALS: &[&str] = &[
    "PRIMO", "SECONDO", "TERZO", "QUARTO", "QUINTO", "SESTO", "SETTIMO", "OTTAVO", "NONO",
    "DECIMO",
];

/// Finite-state fold over page-ordered lines.
///
/// Cantos are numbered by counting headings since their part began; the
/// ordinal word of the heading is not trusted.
pub struct Segmenter<'a> {
    classifier: &'a LineClassifier,
    source: String,
    blocks: BlockSettings,
    part: Option<WorkPart>,
    open: Option<CantoBuffer>,
    counters: HashMap<WorkPart, u32>,
    pre_bounded: bool,
    last_page: usize,
    closed: Vec<Canto>,
}

impl<'a> Segmenter<'a> {
    pub fn new(classifier: &'a LineClassifier, source: &str, blocks: BlockSettings) -> Self {
        Segmenter {
            classifier,
            source: source.to_string(),
            blocks,
            part: None,
            open: None,
            counters: HashMap::new(),
            pre_bounded: false,
            last_page: 0,
            closed: Vec::new(),
        }
    }

    /// A segmenter whose single canto is known up front; headings are skipped
    /// and every verse line joins that canto.
    pub fn pre_bounded(
        classifier: &'a LineClassifier,
        source: &str,
        blocks: BlockSettings,
        canto: CantoId,
        start_page: usize,
    ) -> Self {
        let mut seg = Segmenter::new(classifier, source, blocks);
        seg.part = Some(canto.part);
        seg.open = Some(CantoBuffer::new(canto, start_page));
        seg.pre_bounded = true;
        seg.last_page = start_page;
        seg
    }

    /// Classify one line found on `page` (1-based) and fold it into the state.
    pub fn push_line(&mut self, page: usize, line: &str) -> Result<()> {
        self.last_page = page;
        let kind = self.classifier.classify(line)?;
        if self.pre_bounded {
            if kind == LineKind::Verse {
                if let Some(buf) = self.open.as_mut() {
                    buf.push(&clean_line(line));
                }
            }
            return Ok(());
        }

        match kind {
            LineKind::PartMarker(part) => {
                self.close(page.saturating_sub(1));
                self.part = Some(part);
            }
            LineKind::CantoMarker => {
                let Some(part) = self.part else {
                    debug!(page, line, "canto heading before any cantica, ignored");
                    return Ok(());
                };
                self.close(page.saturating_sub(1));
                let counter = self.counters.entry(part).or_insert(0);
                *counter += 1;
                let id = CantoId {
                    part,
                    number: *counter,
                };
                check_ordinal(id, line);
                self.open = Some(CantoBuffer::new(id, page));
            }
            LineKind::Verse => {
                if let Some(buf) = self.open.as_mut() {
                    buf.push(&clean_line(line));
                }
            }
            LineKind::Noise(_) => {}
        }
        Ok(())
    }

    pub fn push_page<S: AsRef<str>>(&mut self, page: usize, lines: &[S]) -> Result<()> {
        self.last_page = page;
        for line in lines {
            self.push_line(page, line.as_ref())?;
        }
        Ok(())
    }

    /// Close whatever is still open and hand back all cantos in closing order.
    pub fn finish(mut self) -> Vec<Canto> {
        self.close(self.last_page);
        self.closed
    }

    fn close(&mut self, end_page: usize) {
        let Some(buf) = self.open.take() else {
            return;
        };
        if buf.is_empty() {
            warn!(canto = %buf.id, "closing canto with no verses");
        }
        let canto = buf.finish(&self.source, end_page, self.blocks);
        info!(
            canto = %canto.id(),
            pages = ?canto.source.pages,
            verses = canto.counts.versi,
            stanzas = canto.counts.terzine,
            blocks = canto.counts.recitation_blocks,
            "closed canto"
        );
        self.closed.push(canto);
    }
}

fn check_ordinal(id: CantoId, line: &str) {
    let Some(ordinal) = canto_ordinal(line) else {
        return;
    };
    if let Some(pos) = ORDINALS.iter().position(|o| *o == ordinal) {
        if pos as u32 + 1 != id.number {
            warn!(
                canto = %id,
                heading = %ordinal,
                "heading ordinal disagrees with counted canto number"
            );
        }
    }
}
