use std::sync::LazyLock;

use regex::{Regex, RegexBuilder};
use tracing::trace;

use super::canto::WorkPart;
use crate::error::{CommediaError, Result};

static PART_RE: LazyLock<Regex> = LazyLock::new(|| {
    RegexBuilder::new(r"^\s*(INFERNO|PURGATORIO|PARADISO)\s*$")
        .case_insensitive(true)
        .build()
        .unwrap()
});
static CANTO_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^\s*CANTO\s+([A-ZÀÈÉÌÒÙ]+(?:\s+[A-ZÀÈÉÌÒÙ]+)?)\s*$").unwrap()
});
static CAPS_ARTIFACT_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^[A-Z\s.\-]+$").unwrap());
static WORD_CHAR_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\w").unwrap());

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoiseFamily {
    RunningTitle,
    Boilerplate,
    Index,
    PageNumber,
    Illustration,
    Custom,
    /// Empty, too short, or a caps-only heading artifact.
    Artifact,
}

/// Built-in noise table, evaluated in order.
const DEFAULT_NOISE: &[(NoiseFamily, &str)] = &[
    (NoiseFamily::RunningTitle, r"LA\s+DIVINA\s+COMMEDIA"),
    (NoiseFamily::RunningTitle, r"DANTE\s+ALIGHIERI"),
    (NoiseFamily::Boilerplate, r"Propriet[aà]\s+letteraria.*"),
    (NoiseFamily::Boilerplate, r"Milano\.\s*–\s*Tip\.\s*Treves\."),
    (NoiseFamily::Boilerplate, r"PREFAZIONE"),
    (NoiseFamily::Boilerplate, r"Liber\s+Liber"),
    (NoiseFamily::Index, r"INDICE.*"),
    (NoiseFamily::PageNumber, r"\d+"),
    (NoiseFamily::Illustration, r"Raffaello\..*"),
    (NoiseFamily::Illustration, r"Michelangelo\..*"),
    (NoiseFamily::Illustration, r"Luca\s+Signorelli\..*"),
    (NoiseFamily::Illustration, r"Disegno\s+di\s+.*"),
    (NoiseFamily::Illustration, r"Miniatura\s+del\s+.*"),
    (NoiseFamily::Illustration, r"Pagina\s+del\s+Dante.*"),
];

#[derive(Debug, Clone)]
pub struct NoiseRule {
    pub family: NoiseFamily,
    pattern: Regex,
}

impl NoiseRule {
    /// Compile `pattern` anchored to the whole trimmed line, case-insensitive.
    pub fn new(family: NoiseFamily, pattern: &str) -> Result<Self> {
        let pattern = RegexBuilder::new(&format!(r"^\s*(?:{})\s*$", pattern))
            .case_insensitive(true)
            .build()
            .map_err(|source| CommediaError::InvalidPattern {
                pattern: pattern.to_string(),
                source,
            })?;
        Ok(NoiseRule { family, pattern })
    }

    pub fn matches(&self, line: &str) -> bool {
        self.pattern.is_match(line)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LineKind {
    Noise(NoiseFamily),
    PartMarker(WorkPart),
    CantoMarker,
    Verse,
}

#[derive(Debug, Clone)]
pub struct LineClassifier {
    noise: Vec<NoiseRule>,
}

impl Default for LineClassifier {
    fn default() -> Self {
        let noise = DEFAULT_NOISE
            .iter()
            .map(|(family, pat)| NoiseRule::new(*family, pat).unwrap())
            .collect();
        LineClassifier { noise }
    }
}

impl LineClassifier {
    /// Built-in table plus `extra` patterns appended as `Custom` rules.
    pub fn with_extra_noise<S: AsRef<str>>(extra: &[S]) -> Result<Self> {
        let mut classifier = LineClassifier::default();
        for pat in extra {
            classifier
                .noise
                .push(NoiseRule::new(NoiseFamily::Custom, pat.as_ref())?);
        }
        Ok(classifier)
    }

    /// Noise → PartMarker → CantoMarker → Verse, first match wins.
    pub fn classify(&self, line: &str) -> Result<LineKind> {
        let line = clean_line(line);
        if let Some(rule) = self.noise.iter().find(|r| r.matches(&line)) {
            trace!(family = ?rule.family, %line, "noise");
            return Ok(LineKind::Noise(rule.family));
        }
        if let Some(caps) = PART_RE.captures(&line) {
            return Ok(LineKind::PartMarker(WorkPart::from_name(&caps[1])?));
        }
        if CANTO_RE.is_match(&line) {
            return Ok(LineKind::CantoMarker);
        }
        if is_probable_verse(&line) {
            Ok(LineKind::Verse)
        } else {
            Ok(LineKind::Noise(NoiseFamily::Artifact))
        }
    }
}

/// The ordinal words of a canto heading, e.g. `"TRENTESIMOTERZO"`.
pub fn canto_ordinal(line: &str) -> Option<String> {
    CANTO_RE
        .captures(&clean_line(line))
        .map(|caps| caps[1].split_whitespace().collect::<Vec<_>>().join(" "))
}

/// Strip soft hyphens and surrounding whitespace.
pub fn clean_line(line: &str) -> String {
    line.replace('\u{00ad}', "").trim().to_string()
}

fn is_probable_verse(line: &str) -> bool {
    if line.is_empty() {
        return false;
    }
    if CAPS_ARTIFACT_RE.is_match(line) && line.split_whitespace().count() <= 4 {
        return false;
    }
    WORD_CHAR_RE.find_iter(line).take(2).count() >= 2
}

#[cfg(test)]
mod tests {
    use super::*;

    fn kind(line: &str) -> LineKind {
        LineClassifier::default().classify(line).unwrap()
    }

    const ARTIFACT: LineKind = LineKind::Noise(NoiseFamily::Artifact);

    #[test]
    fn page_numbers_are_noise() {
        assert_eq!(kind("47"), LineKind::Noise(NoiseFamily::PageNumber));
        assert_eq!(kind("  5 "), LineKind::Noise(NoiseFamily::PageNumber));
    }

    #[test]
    fn running_titles_are_noise() {
        assert_eq!(kind("LA DIVINA COMMEDIA"), LineKind::Noise(NoiseFamily::RunningTitle));
        assert_eq!(kind("Dante Alighieri"), LineKind::Noise(NoiseFamily::RunningTitle));
        assert_eq!(kind("INDICE DEI CANTI"), LineKind::Noise(NoiseFamily::Index));
    }

    #[test]
    fn illustration_captions_are_noise() {
        assert_eq!(
            kind("Disegno di Gustavo Doré"),
            LineKind::Noise(NoiseFamily::Illustration)
        );
        assert_eq!(
            kind("Luca Signorelli. Particolare del Giudizio"),
            LineKind::Noise(NoiseFamily::Illustration)
        );
    }

    #[test]
    fn part_markers() {
        assert_eq!(kind("INFERNO"), LineKind::PartMarker(WorkPart::Inferno));
        assert_eq!(kind(" purgatorio "), LineKind::PartMarker(WorkPart::Purgatorio));
        assert_eq!(kind("Paradiso"), LineKind::PartMarker(WorkPart::Paradiso));
    }

    #[test]
    fn canto_markers() {
        assert_eq!(kind("CANTO PRIMO"), LineKind::CantoMarker);
        assert_eq!(kind("CANTO TRENTESIMO TERZO"), LineKind::CantoMarker);
        assert_eq!(kind("CANTO UNDECIMO"), LineKind::CantoMarker);
        assert_eq!(canto_ordinal("CANTO  TRENTESIMO   TERZO").as_deref(), Some("TRENTESIMO TERZO"));
    }

    #[test]
    fn lowercase_canto_is_verse() {
        assert_eq!(kind("Canto la guerra e il pio Enea"), LineKind::Verse);
    }

    #[test]
    fn noise_takes_precedence_over_markers() {
        let c = LineClassifier::with_extra_noise(&["INFERNO", "CANTO PRIMO"]).unwrap();
        assert_eq!(c.classify("Inferno").unwrap(), LineKind::Noise(NoiseFamily::Custom));
        assert_eq!(c.classify("CANTO PRIMO").unwrap(), LineKind::Noise(NoiseFamily::Custom));
        assert_eq!(c.classify("CANTO SECONDO").unwrap(), LineKind::CantoMarker);
    }

    #[test]
    fn verses() {
        assert_eq!(kind("Nel mezzo del cammin di nostra vita"), LineKind::Verse);
        assert_eq!(kind("«Vexilla regis prodeunt inferni"), LineKind::Verse);
        assert_eq!(kind("Io."), LineKind::Verse);
    }

    #[test]
    fn rejects_artifacts() {
        assert_eq!(kind(""), ARTIFACT);
        assert_eq!(kind("   "), ARTIFACT);
        assert_eq!(kind("— ."), ARTIFACT);
        assert_eq!(kind("a"), ARTIFACT);
        assert_eq!(kind("NOTE AL TESTO"), ARTIFACT);
        assert_eq!(kind("A. B. C."), ARTIFACT);
    }

    #[test]
    fn long_caps_line_is_verse() {
        assert_eq!(kind("PER ME SI VA NE LA CITTA DOLENTE"), LineKind::Verse);
    }

    #[test]
    fn soft_hyphens_stripped() {
        assert_eq!(clean_line("  smar\u{00ad}rita \n"), "smarrita");
        assert_eq!(kind("\u{00ad}47\u{00ad}"), LineKind::Noise(NoiseFamily::PageNumber));
    }

    #[test]
    fn bad_extra_pattern_is_error() {
        let err = LineClassifier::with_extra_noise(&["(unclosed"]).unwrap_err();
        assert!(matches!(err, CommediaError::InvalidPattern { .. }));
    }
}
