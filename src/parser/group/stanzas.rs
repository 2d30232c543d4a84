use serde::Serialize;

use crate::parser::canto::{CantoId, Verse};

pub const TERZINA: usize = 3;

/// Placeholder scheme; no rhyme analysis is performed.
pub const RHYME_SCHEME: &str = "aba";

#[derive(Debug, Clone, Serialize)]
pub struct Stanza {
    pub urn: String,
    pub start_verso: u32,
    pub end_verso: u32,
    pub rhyme_scheme: &'static str,
    pub versi: Vec<String>,
}

/// Split verses into consecutive terzine; a short tail is dropped.
pub fn group(canto: CantoId, verses: &[Verse]) -> Vec<Stanza> {
    verses
        .chunks_exact(TERZINA)
        .map(|chunk| {
            let start = chunk[0].number;
            let end = chunk[TERZINA - 1].number;
            Stanza {
                urn: canto.range_urn(start, end),
                start_verso: start,
                end_verso: end,
                rhyme_scheme: RHYME_SCHEME,
                versi: chunk.iter().map(|v| v.urn.clone()).collect(),
            }
        })
        .collect()
}
