//! Dictionary lemmatizer for nouns.
//!
//! The stemmer already strips regular inflections, so what is left to fold
//! is the irregular vocabulary the suffix rules cannot see.

use std::collections::HashMap;

use lazy_static::lazy_static;

const IRREGULAR_NOUNS: &[(&str, &str)] = &[
    ("men", "man"),
    ("women", "woman"),
    ("children", "child"),
    ("feet", "foot"),
    ("teeth", "tooth"),
    ("geese", "goose"),
    ("mice", "mouse"),
    ("lice", "louse"),
    ("oxen", "ox"),
    ("dice", "die"),
    ("wives", "wife"),
    ("knives", "knife"),
    ("lives", "life"),
    ("leaves", "leaf"),
    ("halves", "half"),
    ("wolves", "wolf"),
    ("thieves", "thief"),
    ("shelves", "shelf"),
    ("loaves", "loaf"),
    ("calves", "calf"),
    ("criteria", "criterion"),
    ("phenomena", "phenomenon"),
    ("data", "datum"),
    ("media", "medium"),
    ("bacteria", "bacterium"),
    ("curricula", "curriculum"),
    ("memoranda", "memorandum"),
    ("strata", "stratum"),
    ("alumni", "alumnus"),
    ("cacti", "cactus"),
    ("fungi", "fungus"),
    ("nuclei", "nucleus"),
    ("stimuli", "stimulus"),
    ("syllabi", "syllabus"),
    ("radii", "radius"),
    ("analyses", "analysis"),
    ("crises", "crisis"),
    ("theses", "thesis"),
    ("hypotheses", "hypothesis"),
    ("diagnoses", "diagnosis"),
    ("oases", "oasis"),
    ("parentheses", "parenthesis"),
    ("indices", "index"),
    ("matrices", "matrix"),
    ("vertices", "vertex"),
    ("appendices", "appendix"),
    ("bureaux", "bureau"),
    ("plateaux", "plateau"),
    ("chateaux", "chateau"),
    ("corpora", "corpus"),
    ("genera", "genus"),
    ("larvae", "larva"),
    ("antennae", "antenna"),
    ("formulae", "formula"),
    ("vertebrae", "vertebra"),
    ("seraphim", "seraph"),
    ("cherubim", "cherub"),
];

lazy_static! {
    static ref NOUN_EXCEPTIONS: HashMap<&'static str, &'static str> =
        IRREGULAR_NOUNS.iter().copied().collect();
}

/// Returns the dictionary lemma for `token`, or the token itself when the
/// dictionary has no entry for it.
pub fn lemmatize(token: &str) -> &str {
    NOUN_EXCEPTIONS.get(token).copied().unwrap_or(token)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_irregular_nouns() {
        assert_eq!(lemmatize("children"), "child");
        assert_eq!(lemmatize("women"), "woman");
        assert_eq!(lemmatize("crises"), "crisis");
    }

    #[test]
    fn test_unknown_token_passes_through() {
        assert_eq!(lemmatize("senat"), "senat");
        assert_eq!(lemmatize(""), "");
    }

    #[test]
    fn test_lemmas_are_not_themselves_exceptions() {
        for (_, lemma) in IRREGULAR_NOUNS {
            assert_eq!(lemmatize(lemma), *lemma, "{} should be a fixed point", lemma);
        }
    }
}
