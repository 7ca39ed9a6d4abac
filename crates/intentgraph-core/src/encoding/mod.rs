//! Feature encoding
//!
//! Turns the context graph of one language into numeric training data:
//!
//! - [`Normalizer`]: tokenization, punctuation removal and lemmatization
//! - [`Vocabulary`] / [`LabelSet`]: sorted index spaces derived from the graph
//! - [`Vectorizer`]: bag-of-words inputs and one-hot targets
//! - [`TrainingSetAssembler`]: shuffled (input, target) pairs
//! - [`EncodingArtifact`]: the persisted, fingerprinted index spaces

pub mod artifact;
pub mod lemmatizer;
pub mod normalizer;
pub mod tokenizer;
pub mod training;
pub mod vectorizer;
pub mod vocabulary;

pub use artifact::{EncodingArtifact, FORMAT_VERSION, compute_fingerprint};
pub use lemmatizer::{ArabicLemmatizer, EnglishLemmatizer, FrenchLemmatizer, Lemmatizer};
pub use normalizer::Normalizer;
pub use tokenizer::Tokenizer;
pub use training::{ClassifierTrainer, TrainedModel, TrainingSet, TrainingSetAssembler};
pub use vectorizer::Vectorizer;
pub use vocabulary::{LabelSet, Vocabulary, VocabularyBuilder};
