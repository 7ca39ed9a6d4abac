//! Word tokenizer
//!
//! Splits an utterance into word and punctuation tokens. Punctuation is
//! separated from words, intra-word hyphens are kept, English contractions
//! and French elisions become tokens of their own.

use crate::domain::Language;

/// English clitics split off the end of a word
const ENGLISH_CLITICS: &[&str] = &["'s", "'re", "'ve", "'ll", "'d", "'m"];

/// French elided articles and pronouns split off the start of a word
const FRENCH_ELISIONS: &[&str] = &[
    "jusqu'", "lorsqu'", "puisqu'", "quoiqu'", "qu'", "c'", "d'", "j'", "l'", "m'", "n'", "s'",
    "t'",
];

const APOSTROPHES: [char; 2] = ['\'', '\u{2019}'];

/// Language-aware word tokenizer
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Tokenizer {
    language: Language,
}

impl Tokenizer {
    pub fn new(language: Language) -> Self {
        Self { language }
    }

    pub fn language(&self) -> Language {
        self.language
    }

    /// Split `text` into tokens, punctuation included
    pub fn tokenize(&self, text: &str) -> Vec<String> {
        let mut tokens = Vec::new();
        for chunk in text.split_whitespace() {
            for raw in split_chunk(chunk) {
                match raw {
                    Piece::Word(word) => self.split_clitics(word, &mut tokens),
                    Piece::Punct(punct) => tokens.push(punct),
                }
            }
        }
        tokens
    }

    fn split_clitics(&self, word: String, out: &mut Vec<String>) {
        if !word.contains(APOSTROPHES) {
            out.push(word);
            return;
        }

        // Typographic apostrophes are folded so clitics compare equal
        let word = word.replace('\u{2019}', "'");
        match self.language {
            Language::En => split_english(word, out),
            Language::Fr => split_french(word, out),
            Language::Ar => out.push(word),
        }
    }
}

/// Whether the character can be part of a word
pub fn is_word_char(c: char) -> bool {
    c.is_alphanumeric() || is_combining_mark(c)
}

/// Whether a token consists of punctuation or symbols only
pub fn is_punctuation(token: &str) -> bool {
    !token.is_empty() && !token.chars().any(is_word_char)
}

fn is_combining_mark(c: char) -> bool {
    matches!(c,
        '\u{0300}'..='\u{036F}'
        | '\u{0610}'..='\u{061A}'
        | '\u{064B}'..='\u{065F}'
        | '\u{0670}'
        | '\u{06D6}'..='\u{06ED}')
}

enum Piece {
    Word(String),
    Punct(String),
}

/// Split a whitespace-free chunk into word runs and punctuation runs
fn split_chunk(chunk: &str) -> Vec<Piece> {
    let chars: Vec<char> = chunk.chars().collect();
    let mut pieces = Vec::new();
    let mut word = String::new();
    let mut i = 0;

    while i < chars.len() {
        let c = chars[i];
        let next_is_word = chars.get(i + 1).is_some_and(|n| is_word_char(*n));

        if is_word_char(c) {
            word.push(c);
            i += 1;
            continue;
        }

        // Hyphens and apostrophes glue word characters together
        if !word.is_empty() && next_is_word && (c == '-' || APOSTROPHES.contains(&c)) {
            word.push(c);
            i += 1;
            continue;
        }

        if !word.is_empty() {
            pieces.push(Piece::Word(std::mem::take(&mut word)));
        }

        // Runs of the same mark ("...", "!!") stay together
        let mut punct = String::from(c);
        i += 1;
        while i < chars.len() && chars[i] == c {
            punct.push(c);
            i += 1;
        }
        pieces.push(Piece::Punct(punct));
    }

    if !word.is_empty() {
        pieces.push(Piece::Word(word));
    }
    pieces
}

fn split_english(word: String, out: &mut Vec<String>) {
    let lower = word.to_lowercase();

    if lower.ends_with("n't") && word.len() > 3 && word.is_char_boundary(word.len() - 3) {
        let (stem, clitic) = word.split_at(word.len() - 3);
        out.push(stem.to_string());
        out.push(clitic.to_string());
        return;
    }

    if let Some(pos) = word.rfind('\'') {
        let clitic = &word[pos..];
        if pos > 0 && ENGLISH_CLITICS.contains(&clitic.to_lowercase().as_str()) {
            out.push(word[..pos].to_string());
            out.push(clitic.to_string());
            return;
        }
    }

    out.push(word);
}

fn split_french(mut word: String, out: &mut Vec<String>) {
    loop {
        let lower = word.to_lowercase();
        let Some(elision) = FRENCH_ELISIONS
            .iter()
            .find(|e| {
                lower.starts_with(**e) && lower.len() > e.len() && word.is_char_boundary(e.len())
            })
        else {
            break;
        };

        let rest = word.split_off(elision.len());
        out.push(word);
        word = rest;
    }
    out.push(word);
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tokens(language: Language, text: &str) -> Vec<String> {
        Tokenizer::new(language).tokenize(text)
    }

    #[test]
    fn test_splits_punctuation_from_words() {
        assert_eq!(tokens(Language::En, "Hello, world!"), vec!["Hello", ",", "world", "!"]);
        assert_eq!(tokens(Language::En, "wait...what?"), vec!["wait", "...", "what", "?"]);
    }

    #[test]
    fn test_keeps_intra_word_hyphens() {
        assert_eq!(
            tokens(Language::En, "a well-known e-mail -"),
            vec!["a", "well-known", "e-mail", "-"]
        );
    }

    #[test]
    fn test_english_contractions() {
        assert_eq!(tokens(Language::En, "I don't know"), vec!["I", "do", "n't", "know"]);
        assert_eq!(tokens(Language::En, "what's up"), vec!["what", "'s", "up"]);
        assert_eq!(tokens(Language::En, "I\u{2019}m fine"), vec!["I", "'m", "fine"]);
        assert_eq!(tokens(Language::En, "'quoted'"), vec!["'", "quoted", "'"]);
    }

    #[test]
    fn test_french_elisions() {
        assert_eq!(
            tokens(Language::Fr, "qu'est-ce que c'est ?"),
            vec!["qu'", "est-ce", "que", "c'", "est", "?"]
        );
        assert_eq!(tokens(Language::Fr, "L'heure d'aujourd'hui"), vec![
            "L'", "heure", "d'", "aujourd'hui"
        ]);
    }

    #[test]
    fn test_arabic_punctuation() {
        assert_eq!(tokens(Language::Ar, "كيف حالك؟"), vec!["كيف", "حالك", "؟"]);
        assert_eq!(tokens(Language::Ar, "مَرْحَبًا، صديقي"), vec!["مَرْحَبًا", "،", "صديقي"]);
    }

    #[test]
    fn test_is_punctuation() {
        assert!(is_punctuation("?"));
        assert!(is_punctuation("..."));
        assert!(is_punctuation("؟"));
        assert!(!is_punctuation("n't"));
        assert!(!is_punctuation("42"));
        assert!(!is_punctuation(""));
    }
}
