use serde::Serialize;

use crate::parser::canto::{escape_markup, CantoId, Verse};

const SHORT_BREAK: &str = "<break time='120ms'/>";
const LONG_BREAK: &str = "<break time='220ms'/>";

#[derive(Debug, Clone, Serialize)]
pub struct RecitationBlock {
    pub urn: String,
    pub start_verso: u32,
    pub end_verso: u32,
    pub versi: Vec<String>,
    pub ssml: String,
}

/// Slide a window of `size` verses with stride `max(1, size - overlap)`.
///
/// Stops as soon as a window reaches the end of the list, so the last block
/// may be shorter than `size` but is never followed by a duplicate tail.
pub fn build(canto: CantoId, verses: &[Verse], size: usize, overlap: usize) -> Vec<RecitationBlock> {
    let mut blocks = Vec::new();
    if size == 0 {
        return blocks;
    }
    let step = size.saturating_sub(overlap).max(1);
    let n = verses.len();
    let mut i = 0;

    while i < n {
        let chunk = &verses[i..(i + size).min(n)];
        let start = chunk[0].number;
        let end = chunk[chunk.len() - 1].number;
        blocks.push(RecitationBlock {
            urn: canto.range_urn(start, end),
            start_verso: start,
            end_verso: end,
            versi: chunk.iter().map(|v| v.urn.clone()).collect(),
            ssml: block_ssml(chunk),
        });
        if i + size >= n {
            break;
        }
        i += step;
    }

    blocks
}

/// Paragraph markup with a longer pause after every third verse of the block.
pub fn block_ssml(verses: &[Verse]) -> String {
    let mut out = String::from("<p>");
    for (i, v) in verses.iter().enumerate() {
        out.push_str("<s>");
        out.push_str(&escape_markup(&v.text_original));
        out.push_str("</s>");
        out.push_str(if (i + 1) % 3 == 0 { LONG_BREAK } else { SHORT_BREAK });
    }
    out.push_str("</p>");
    out
}
