//! Rule-based lemmatizers
//!
//! Each language reduces a token to a base form with a small set of
//! morphological rules. Tokens default to nouns, so verbs and adjectives pass
//! through mostly unchanged.

use crate::domain::Language;

/// Reduces a single token to its base form
pub trait Lemmatizer: Send + Sync {
    fn lemmatize(&self, token: &str) -> String;
}

/// The lemmatizer for a language
pub fn for_language(language: Language) -> Box<dyn Lemmatizer> {
    match language {
        Language::En => Box::new(EnglishLemmatizer),
        Language::Fr => Box::new(FrenchLemmatizer),
        Language::Ar => Box::new(ArabicLemmatizer),
    }
}

// ========== English ==========

/// Irregular plurals
const ENGLISH_IRREGULAR: &[(&str, &str)] = &[
    ("children", "child"),
    ("feet", "foot"),
    ("geese", "goose"),
    ("lice", "louse"),
    ("men", "man"),
    ("mice", "mouse"),
    ("oxen", "ox"),
    ("teeth", "tooth"),
    ("women", "woman"),
    ("data", "datum"),
    ("criteria", "criterion"),
    ("phenomena", "phenomenon"),
];

/// Words that look plural but are not
const ENGLISH_KEEP: &[&str] = &[
    "always", "abdomen", "amen", "afterwards", "besides", "does", "goes", "hers", "news",
    "omen", "ours", "perhaps", "series", "sometimes", "species", "specimen", "thanks",
    "theirs", "towards", "whereas", "yours",
];

/// Noun suffix rules, longest suffix first
const ENGLISH_SUFFIXES: &[(&str, &str)] = &[
    ("sses", "ss"),
    ("ches", "ch"),
    ("shes", "sh"),
    ("ies", "y"),
    ("xes", "x"),
    ("zes", "z"),
    ("men", "man"),
    ("s", ""),
];

/// Noun-default English lemmatizer; preserves case
#[derive(Debug, Clone, Copy, Default)]
pub struct EnglishLemmatizer;

impl Lemmatizer for EnglishLemmatizer {
    fn lemmatize(&self, token: &str) -> String {
        if !token.chars().all(|c| c.is_ascii_alphabetic()) {
            return token.to_string();
        }

        let lower = token.to_ascii_lowercase();
        if let Some((_, lemma)) = ENGLISH_IRREGULAR.iter().find(|(form, _)| *form == lower) {
            return match_case(token, lemma);
        }

        if token.len() <= 3
            || ENGLISH_KEEP.contains(&lower.as_str())
            || ["ss", "us", "is"].iter().any(|s| lower.ends_with(s))
        {
            return token.to_string();
        }

        for (suffix, replacement) in ENGLISH_SUFFIXES {
            if !lower.ends_with(suffix) {
                continue;
            }
            let stem_len = token.len() - suffix.len();
            // "ties" -> "tie", not "ty"
            if *suffix == "ies" && stem_len < 2 {
                continue;
            }
            let stem = &token[..stem_len];
            let suffix_upper = token[stem_len..].chars().all(|c| c.is_ascii_uppercase());
            let replacement = if suffix_upper {
                replacement.to_ascii_uppercase()
            } else {
                replacement.to_string()
            };
            return format!("{}{}", stem, replacement);
        }

        token.to_string()
    }
}

/// Apply the capitalization of `original` to `lemma`
fn match_case(original: &str, lemma: &str) -> String {
    if original.chars().all(|c| c.is_uppercase()) {
        return lemma.to_uppercase();
    }
    if original.chars().next().is_some_and(char::is_uppercase) {
        let mut chars = lemma.chars();
        return match chars.next() {
            Some(first) => first.to_uppercase().chain(chars).collect(),
            None => String::new(),
        };
    }
    lemma.to_string()
}

// ========== French ==========

/// Plurals in -aux/-eux that do not follow the trailing-letter rule
const FRENCH_IRREGULAR: &[(&str, &str)] = &[
    ("animaux", "animal"),
    ("chevaux", "cheval"),
    ("cheveux", "cheveu"),
    ("feux", "feu"),
    ("généraux", "général"),
    ("hôpitaux", "hôpital"),
    ("jeux", "jeu"),
    ("journaux", "journal"),
    ("lieux", "lieu"),
    ("locaux", "local"),
    ("maux", "mal"),
    ("normaux", "normal"),
    ("principaux", "principal"),
    ("sociaux", "social"),
    ("travaux", "travail"),
    ("yeux", "œil"),
];

/// Words ending in -s or -x that are not plurals
const FRENCH_KEEP: &[&str] = &[
    "alors", "après", "autrefois", "avis", "bois", "corps", "depuis", "dans", "fois",
    "français", "jamais", "mais", "moins", "mois", "nous", "parfois", "pays", "plus", "puis",
    "sans", "sous", "temps", "toujours", "tous", "très", "trois", "vers", "vous",
];

/// Noun-default French lemmatizer; folds regular plurals
#[derive(Debug, Clone, Copy, Default)]
pub struct FrenchLemmatizer;

impl Lemmatizer for FrenchLemmatizer {
    fn lemmatize(&self, token: &str) -> String {
        let lower = token.to_lowercase();
        if let Some((_, lemma)) = FRENCH_IRREGULAR.iter().find(|(form, _)| *form == lower) {
            return match_case(token, lemma);
        }

        if token.chars().count() <= 3
            || FRENCH_KEEP.contains(&lower.as_str())
            || !token.chars().all(char::is_alphabetic)
        {
            return token.to_string();
        }

        // Only -eaux is a reliable -x plural; heureux, prix and voix are singular
        let strip = lower.ends_with('s') || lower.ends_with("eaux");
        if strip && !lower.ends_with("ss") {
            let mut lemma = token.to_string();
            lemma.pop();
            return lemma;
        }

        token.to_string()
    }
}

// ========== Arabic ==========

/// Light Arabic normalizer: drops diacritics and tatweel, folds alef variants
#[derive(Debug, Clone, Copy, Default)]
pub struct ArabicLemmatizer;

impl Lemmatizer for ArabicLemmatizer {
    fn lemmatize(&self, token: &str) -> String {
        token
            .chars()
            .filter(|c| !is_tashkeel(*c) && *c != TATWEEL)
            .map(|c| match c {
                '\u{0622}' | '\u{0623}' | '\u{0625}' | '\u{0671}' => '\u{0627}',
                other => other,
            })
            .collect()
    }
}

const TATWEEL: char = '\u{0640}';

fn is_tashkeel(c: char) -> bool {
    matches!(c, '\u{064B}'..='\u{0652}' | '\u{0670}')
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_english_regular_plurals() {
        let en = EnglishLemmatizer;
        assert_eq!(en.lemmatize("dogs"), "dog");
        assert_eq!(en.lemmatize("cities"), "city");
        assert_eq!(en.lemmatize("ties"), "tie");
        assert_eq!(en.lemmatize("boxes"), "box");
        assert_eq!(en.lemmatize("churches"), "church");
        assert_eq!(en.lemmatize("wishes"), "wish");
        assert_eq!(en.lemmatize("classes"), "class");
        assert_eq!(en.lemmatize("firemen"), "fireman");
    }

    #[test]
    fn test_english_keeps_non_plurals() {
        let en = EnglishLemmatizer;
        for word in [
            "I", "am", "happy", "great", "feel", "is", "was", "this", "bus", "glass", "thanks",
            "n't", "'s",
        ] {
            assert_eq!(en.lemmatize(word), word);
        }
    }

    #[test]
    fn test_english_preserves_case() {
        let en = EnglishLemmatizer;
        assert_eq!(en.lemmatize("Dogs"), "Dog");
        assert_eq!(en.lemmatize("CITIES"), "CITY");
        assert_eq!(en.lemmatize("Children"), "Child");
    }

    #[test]
    fn test_french_plurals() {
        let fr = FrenchLemmatizer;
        assert_eq!(fr.lemmatize("questions"), "question");
        assert_eq!(fr.lemmatize("chevaux"), "cheval");
        assert_eq!(fr.lemmatize("bateaux"), "bateau");
        assert_eq!(fr.lemmatize("heureux"), "heureux");
        assert_eq!(fr.lemmatize("vous"), "vous");
        assert_eq!(fr.lemmatize("les"), "les");
        assert_eq!(fr.lemmatize("prix"), "prix");
    }

    #[test]
    fn test_arabic_normalization() {
        let ar = ArabicLemmatizer;
        assert_eq!(ar.lemmatize("مَرْحَبًا"), "مرحبا");
        assert_eq!(ar.lemmatize("أهلا"), "اهلا");
        assert_eq!(ar.lemmatize("إسلام"), "اسلام");
        assert_eq!(ar.lemmatize("جميـــل"), "جميل");
    }

    #[test]
    fn test_for_language() {
        assert_eq!(for_language(Language::En).lemmatize("cats"), "cat");
        assert_eq!(for_language(Language::Ar).lemmatize("آمن"), "امن");
    }
}
