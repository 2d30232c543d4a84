//! Canto records: parts, verse identifiers and per-verse annotations.

use std::fmt;
use std::sync::LazyLock;

use regex::Regex;
use serde::Serialize;

use crate::error::{CommediaError, Result};

use super::group::{recitation, stanzas};

static LAST_WORD_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[A-Za-zÀ-ÖØ-öø-ÿ’']+").unwrap());

/// Positional placeholder cycle, not a phonetic rhyme judgment.
pub const RHYME_CYCLE: [&str; 3] = ["a", "b", "a"];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum WorkPart {
    Inferno,
    Purgatorio,
    Paradiso,
}

impl WorkPart {
    pub fn name(self) -> &'static str {
        match self {
            WorkPart::Inferno => "Inferno",
            WorkPart::Purgatorio => "Purgatorio",
            WorkPart::Paradiso => "Paradiso",
        }
    }

    /// Short code used in every identifier. `par` sorts before `purg`, so
    /// identifiers sort into document order only within a cantica.
    pub fn code(self) -> &'static str {
        match self {
            WorkPart::Inferno => "inf",
            WorkPart::Purgatorio => "purg",
            WorkPart::Paradiso => "par",
        }
    }

    /// Resolve a cantica from its name by lowercase prefix (`inf`, `pur`, `par`).
    pub fn from_name(name: &str) -> Result<Self> {
        let lower = name.trim().to_lowercase();
        if lower.starts_with("inf") {
            Ok(WorkPart::Inferno)
        } else if lower.starts_with("pur") {
            Ok(WorkPart::Purgatorio)
        } else if lower.starts_with("par") {
            Ok(WorkPart::Paradiso)
        } else {
            Err(CommediaError::UnknownPart(name.to_string()))
        }
    }
}

impl fmt::Display for WorkPart {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl Serialize for WorkPart {
    fn serialize<S: serde::Serializer>(&self, s: S) -> std::result::Result<S::Ok, S::Error> {
        s.serialize_str(self.name())
    }
}

/// Part + canto number: the prefix shared by all identifiers inside a canto.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CantoId {
    pub part: WorkPart,
    pub number: u32,
}

impl CantoId {
    pub fn verse_urn(&self, verse: u32) -> String {
        format!("{}.{:03}", self, verse)
    }

    pub fn range_urn(&self, start: u32, end: u32) -> String {
        format!("{}.{:03}-{:03}", self, start, end)
    }

    pub fn file_name(&self) -> String {
        format!("{}_{:02}.json", self.part.code(), self.number)
    }
}

impl fmt::Display for CantoId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{:02}", self.part.code(), self.number)
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct Verse {
    pub urn: String,
    pub number: u32,
    pub text_original: String,
    pub last_word: String,
    pub rhyme_letter: &'static str,
    pub ssml: String,
}

impl Verse {
    pub fn new(canto: CantoId, number: u32, text: &str) -> Self {
        Verse {
            urn: canto.verse_urn(number),
            number,
            text_original: text.to_string(),
            last_word: last_word(text),
            rhyme_letter: RHYME_CYCLE[((number - 1) % 3) as usize],
            ssml: verse_ssml(text),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Counts {
    pub versi: usize,
    pub terzine: usize,
    pub recitation_blocks: usize,
}

#[derive(Debug, Clone, Serialize)]
pub struct SourceRef {
    pub pdf: String,
    /// Inclusive, 1-based.
    pub pages: [usize; 2],
}

/// A finished canto, shaped as its output document.
#[derive(Debug, Clone, Serialize)]
pub struct Canto {
    #[serde(rename = "cantica")]
    pub part: WorkPart,
    #[serde(rename = "canto")]
    pub number: u32,
    pub source: SourceRef,
    pub counts: Counts,
    #[serde(rename = "versi")]
    pub verses: Vec<Verse>,
    #[serde(rename = "terzine")]
    pub stanzas: Vec<stanzas::Stanza>,
    pub recitation_blocks: Vec<recitation::RecitationBlock>,
}

impl Canto {
    pub fn id(&self) -> CantoId {
        CantoId {
            part: self.part,
            number: self.number,
        }
    }
}

/// Block layout applied when a canto is closed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BlockSettings {
    pub size: usize,
    pub overlap: usize,
}

impl Default for BlockSettings {
    fn default() -> Self {
        BlockSettings {
            size: 12,
            overlap: 0,
        }
    }
}

/// Verses collected for a canto that is still open.
#[derive(Debug)]
pub struct CantoBuffer {
    pub id: CantoId,
    pub start_page: usize,
    verses: Vec<Verse>,
}

impl CantoBuffer {
    pub fn new(id: CantoId, start_page: usize) -> Self {
        CantoBuffer {
            id,
            start_page,
            verses: Vec::new(),
        }
    }

    pub fn push(&mut self, text: &str) {
        let n = self.verses.len() as u32 + 1;
        self.verses.push(Verse::new(self.id, n, text));
    }

    pub fn is_empty(&self) -> bool {
        self.verses.is_empty()
    }

    pub fn finish(self, source: &str, end_page: usize, blocks: BlockSettings) -> Canto {
        let stanzas = stanzas::group(self.id, &self.verses);
        let recitation_blocks =
            recitation::build(self.id, &self.verses, blocks.size, blocks.overlap);
        Canto {
            part: self.id.part,
            number: self.id.number,
            source: SourceRef {
                pdf: source.to_string(),
                pages: [self.start_page, end_page.max(self.start_page)],
            },
            counts: Counts {
                versi: self.verses.len(),
                terzine: stanzas.len(),
                recitation_blocks: recitation_blocks.len(),
            },
            verses: self.verses,
            stanzas,
            recitation_blocks,
        }
    }
}

/// Lowercased final run of letters, apostrophes included.
pub fn last_word(text: &str) -> String {
    LAST_WORD_RE
        .find_iter(text)
        .last()
        .map(|m| m.as_str().to_lowercase())
        .unwrap_or_default()
}

pub fn escape_markup(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
}

pub fn verse_ssml(text: &str) -> String {
    format!("<s>{}</s>", escape_markup(text))
}

#[cfg(test)]
mod tests {
    use super::*;

    const INF_1: CantoId = CantoId {
        part: WorkPart::Inferno,
        number: 1,
    };

    #[test]
    fn part_from_name_prefix() {
        assert_eq!(WorkPart::from_name("inferno").unwrap(), WorkPart::Inferno);
        assert_eq!(WorkPart::from_name(" PURGATORIO ").unwrap(), WorkPart::Purgatorio);
        assert_eq!(WorkPart::from_name("Paradiso").unwrap(), WorkPart::Paradiso);
    }

    #[test]
    fn unknown_part_is_error() {
        let err = WorkPart::from_name("Vita Nova").unwrap_err();
        assert!(matches!(err, CommediaError::UnknownPart(name) if name == "Vita Nova"));
    }

    #[test]
    fn part_codes() {
        let parts = [WorkPart::Inferno, WorkPart::Purgatorio, WorkPart::Paradiso];
        let codes: Vec<_> = parts.iter().map(|p| p.code()).collect();
        assert_eq!(codes, vec!["inf", "purg", "par"]);
    }

    #[test]
    fn identifiers_order_within_a_cantica_only() {
        let purg = CantoId { part: WorkPart::Purgatorio, number: 33 };
        let par = CantoId { part: WorkPart::Paradiso, number: 1 };
        assert!(INF_1.verse_urn(9) < INF_1.verse_urn(10));
        assert!(purg.verse_urn(1) < purg.verse_urn(145));
        assert!(par.verse_urn(1) < purg.verse_urn(1));
    }

    #[test]
    fn urns() {
        let id = CantoId {
            part: WorkPart::Purgatorio,
            number: 7,
        };
        assert_eq!(id.verse_urn(12), "purg.07.012");
        assert_eq!(id.range_urn(1, 3), "purg.07.001-003");
        assert_eq!(id.file_name(), "purg_07.json");
    }

    #[test]
    fn last_word_handles_accents_and_punctuation() {
        assert_eq!(last_word("che la diritta via era smarrita."), "smarrita");
        assert_eq!(last_word("Per me si va ne la città dolente,"), "dolente");
        assert_eq!(last_word("e cortesia fu lui esser villano, perché"), "perché");
        assert_eq!(last_word("Per me si va ne la città"), "città");
        assert_eq!(last_word("ch’i’ fui per ritornar più volte vòlto."), "vòlto");
        assert_eq!(last_word("E quindi uscimmo a riveder l’"), "l’");
        assert_eq!(last_word("... 33"), "");
    }

    #[test]
    fn markup_escapes_entities() {
        assert_eq!(verse_ssml("a <b> & c"), "<s>a &lt;b&gt; &amp; c</s>");
    }

    #[test]
    fn rhyme_letters_cycle() {
        let letters: Vec<_> = (1..=6).map(|n| Verse::new(INF_1, n, "x y").rhyme_letter).collect();
        assert_eq!(letters, vec!["a", "b", "a", "a", "b", "a"]);
    }

    #[test]
    fn empty_buffer_finishes_with_zero_counts() {
        let canto = CantoBuffer::new(INF_1, 4).finish("doc.pdf", 3, BlockSettings::default());
        assert_eq!(
            canto.counts,
            Counts {
                versi: 0,
                terzine: 0,
                recitation_blocks: 0
            }
        );
        assert_eq!(canto.source.pages, [4, 4]);
    }

    #[test]
    fn serializes_with_italian_field_names() {
        let mut buf = CantoBuffer::new(INF_1, 1);
        buf.push("Nel mezzo del cammin di nostra vita");
        let canto = buf.finish("doc.pdf", 1, BlockSettings::default());
        let v = serde_json::to_value(&canto).unwrap();
        assert_eq!(v["cantica"], "Inferno");
        assert_eq!(v["canto"], 1);
        assert_eq!(v["source"]["pages"], serde_json::json!([1, 1]));
        assert_eq!(v["counts"]["versi"], 1);
        assert_eq!(v["versi"][0]["urn"], "inf.01.001");
        assert_eq!(v["versi"][0]["last_word"], "vita");
        assert!(v["terzine"].as_array().unwrap().is_empty());
    }
}
