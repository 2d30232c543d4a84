pub mod recitation;
pub mod stanzas;
