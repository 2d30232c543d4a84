pub mod canto;
pub mod group;
pub mod lines;
pub mod segment;

use canto::{BlockSettings, Canto, CantoId};
use lines::LineClassifier;
use segment::Segmenter;

use crate::error::Result;
use crate::source::Page;

/// Two-stage pipeline: lines → classified lines → closed cantos.
pub fn segment_document(
    classifier: &LineClassifier,
    source: &str,
    pages: &[Page],
    blocks: BlockSettings,
) -> Result<Vec<Canto>> {
    let mut seg = Segmenter::new(classifier, source, blocks);
    fold_pages(&mut seg, pages)?;
    Ok(seg.finish())
}

/// Same fold with the canto fixed in advance; `pages` is the canto's range.
pub fn segment_canto(
    classifier: &LineClassifier,
    source: &str,
    pages: &[Page],
    blocks: BlockSettings,
    canto: CantoId,
) -> Result<Canto> {
    let start = pages.first().map(|p| p.number).unwrap_or(1);
    let mut seg = Segmenter::pre_bounded(classifier, source, blocks, canto, start);
    fold_pages(&mut seg, pages)?;
    // A pre-bounded segmenter always holds exactly its one canto.
    let mut cantos = seg.finish();
    Ok(cantos.remove(0))
}

fn fold_pages(seg: &mut Segmenter<'_>, pages: &[Page]) -> Result<()> {
    for page in pages {
        seg.push_page(page.number, page.lines.as_slice())?;
    }
    Ok(())
}
