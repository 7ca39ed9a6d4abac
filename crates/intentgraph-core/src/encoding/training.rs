//! Training-set assembly
//!
//! Pairs every pattern of a language with its context's label, encodes both
//! and shuffles the result. Training itself is delegated to a
//! [`ClassifierTrainer`].

use std::path::PathBuf;

use rand::SeedableRng;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::domain::{ContextGraphRepository, LabelledPattern, Language};
use crate::error::{Error, Result};

use super::artifact::EncodingArtifact;
use super::vectorizer::Vectorizer;
use super::vocabulary::{LabelSet, Vocabulary, VocabularyBuilder};

/// Parallel input and target vectors for one language
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrainingSet {
    pub language: Language,
    pub inputs: Vec<Vec<f32>>,
    pub targets: Vec<Vec<f32>>,
    pub vocabulary: Vocabulary,
    pub labels: LabelSet,
}

impl TrainingSet {
    /// Encode labelled patterns and shuffle them with `rng`
    pub fn from_patterns(
        vectorizer: &Vectorizer,
        patterns: &[LabelledPattern],
        rng: &mut StdRng,
    ) -> Result<Self> {
        let language = vectorizer.language();
        let mut examples = Vec::with_capacity(patterns.len());

        for pattern in patterns {
            let label = pattern
                .label
                .as_deref()
                .ok_or_else(|| Error::UnlabeledContext {
                    code: pattern.context_code.clone(),
                    language: language.to_string(),
                })?;
            examples.push((
                vectorizer.encode_input(&pattern.text),
                vectorizer.encode_label(label)?,
            ));
        }

        examples.shuffle(rng);
        let (inputs, targets) = examples.into_iter().unzip();

        Ok(Self {
            language,
            inputs,
            targets,
            vocabulary: vectorizer.vocabulary().clone(),
            labels: vectorizer.labels().clone(),
        })
    }

    pub fn len(&self) -> usize {
        self.inputs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.inputs.is_empty()
    }

    /// Split off the last `validation_fraction` of examples for validation.
    ///
    /// The training part is rounded up, so small sets keep at least as many
    /// training examples as validation examples would suggest.
    pub fn split(mut self, validation_fraction: f64) -> (TrainingSet, TrainingSet) {
        let fraction = validation_fraction.clamp(0.0, 1.0);
        let train_len = (self.len() as f64 * (1.0 - fraction)).ceil() as usize;
        let train_len = train_len.min(self.len());

        let validation = TrainingSet {
            language: self.language,
            inputs: self.inputs.split_off(train_len),
            targets: self.targets.split_off(train_len),
            vocabulary: self.vocabulary.clone(),
            labels: self.labels.clone(),
        };
        (self, validation)
    }

    /// The artifact describing this set's encoding
    pub fn artifact(&self) -> EncodingArtifact {
        EncodingArtifact::new(self.language, self.vocabulary.clone(), self.labels.clone())
    }
}

/// Builds training sets from the stored graph
pub struct TrainingSetAssembler<'a> {
    repository: &'a dyn ContextGraphRepository,
    seed: Option<u64>,
}

impl<'a> TrainingSetAssembler<'a> {
    pub fn new(repository: &'a dyn ContextGraphRepository) -> Self {
        Self {
            repository,
            seed: None,
        }
    }

    /// Make the shuffle reproducible
    pub fn with_seed(mut self, seed: Option<u64>) -> Self {
        self.seed = seed;
        self
    }

    fn rng(&self) -> StdRng {
        match self.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        }
    }

    /// Derive vocabulary and labels from the graph, then assemble
    pub async fn assemble(&self, language: Language) -> Result<TrainingSet> {
        let (vocabulary, labels) = VocabularyBuilder::new(self.repository).build(language).await?;
        self.assemble_with(&Vectorizer::new(language, vocabulary, labels))
            .await
    }

    /// Assemble with an existing encoding, such as one loaded from an artifact
    pub async fn assemble_with(&self, vectorizer: &Vectorizer) -> Result<TrainingSet> {
        let language = vectorizer.language();
        let patterns = self.repository.list_labelled_patterns(language).await?;
        let set = TrainingSet::from_patterns(vectorizer, &patterns, &mut self.rng())?;

        info!(
            language = %language,
            examples = set.len(),
            vocabulary = set.vocabulary.len(),
            labels = set.labels.len(),
            seeded = self.seed.is_some(),
            "Training set assembled"
        );
        Ok(set)
    }
}

/// A model produced by a trainer
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TrainedModel {
    /// Where the trainer wrote its model
    pub artifact_path: PathBuf,
}

/// External classifier training
pub trait ClassifierTrainer {
    fn fit(&mut self, training_set: &TrainingSet) -> Result<TrainedModel>;
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::encoding::Normalizer;

    fn labelled(code: &str, label: Option<&str>, text: &str) -> LabelledPattern {
        LabelledPattern {
            context_code: code.to_string(),
            label: label.map(str::to_string),
            text: text.to_string(),
        }
    }

    fn patterns() -> Vec<LabelledPattern> {
        vec![
            labelled("mood", Some("Mood"), "I am happy"),
            labelled("mood", Some("Mood"), "I feel great"),
            labelled("greet", Some("Greeting"), "hello"),
            labelled("greet", Some("Greeting"), "hi there"),
        ]
    }

    fn vectorizer(patterns: &[LabelledPattern]) -> Vectorizer {
        let normalizer = Normalizer::for_language(Language::En);
        let vocabulary =
            Vocabulary::from_utterances(&normalizer, patterns.iter().map(|p| p.text.as_str()));
        let labels = LabelSet::new(patterns.iter().filter_map(|p| p.label.clone()));
        Vectorizer::new(Language::En, vocabulary, labels)
    }

    #[test]
    fn test_examples_are_parallel_and_one_hot() {
        let patterns = patterns();
        let set = TrainingSet::from_patterns(
            &vectorizer(&patterns),
            &patterns,
            &mut StdRng::seed_from_u64(7),
        )
        .unwrap();

        assert_eq!(set.len(), 4);
        assert_eq!(set.targets.len(), 4);
        for (input, target) in set.inputs.iter().zip(&set.targets) {
            assert_eq!(input.len(), set.vocabulary.len());
            assert_eq!(target.len(), 2);
            assert_eq!(target.iter().sum::<f32>(), 1.0);
        }
    }

    #[test]
    fn test_seeded_shuffle_is_reproducible() {
        let patterns = patterns();
        let v = vectorizer(&patterns);

        let a = TrainingSet::from_patterns(&v, &patterns, &mut StdRng::seed_from_u64(42)).unwrap();
        let b = TrainingSet::from_patterns(&v, &patterns, &mut StdRng::seed_from_u64(42)).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn test_unlabeled_context_is_fatal() {
        let mut patterns = patterns();
        patterns.push(labelled("orphan", None, "who am I"));

        match TrainingSet::from_patterns(
            &vectorizer(&patterns),
            &patterns,
            &mut StdRng::seed_from_u64(1),
        ) {
            Err(Error::UnlabeledContext { code, language }) => {
                assert_eq!(code, "orphan");
                assert_eq!(language, "en");
            }
            other => panic!("unexpected result: {other:?}"),
        }
    }

    #[test]
    fn test_label_outside_label_set_is_fatal() {
        let patterns = patterns();
        let v = vectorizer(&patterns);
        let stray = vec![labelled("weather", Some("Weather"), "is it raining")];

        assert!(matches!(
            TrainingSet::from_patterns(&v, &stray, &mut StdRng::seed_from_u64(1)),
            Err(Error::UnknownLabel { .. })
        ));
    }

    #[test]
    fn test_split_keeps_tail_for_validation() {
        let patterns: Vec<_> = (0..10)
            .map(|i| labelled("c", Some("C"), &format!("utterance {i}")))
            .collect();
        let set = TrainingSet::from_patterns(
            &vectorizer(&patterns),
            &patterns,
            &mut StdRng::seed_from_u64(3),
        )
        .unwrap();
        let tail = set.inputs[9].clone();

        let (train, validation) = set.split(0.1);
        assert_eq!(train.len(), 9);
        assert_eq!(validation.len(), 1);
        assert_eq!(validation.inputs[0], tail);
        assert_eq!(validation.vocabulary, train.vocabulary);
    }

    #[test]
    fn test_split_rounds_training_part_up() {
        let patterns = patterns();
        let set = TrainingSet::from_patterns(
            &vectorizer(&patterns),
            &patterns,
            &mut StdRng::seed_from_u64(3),
        )
        .unwrap();

        let (train, validation) = set.split(0.1);
        assert_eq!((train.len(), validation.len()), (4, 0));
    }

    struct RecordingTrainer {
        seen: usize,
    }

    impl ClassifierTrainer for RecordingTrainer {
        fn fit(&mut self, training_set: &TrainingSet) -> Result<TrainedModel> {
            self.seen = training_set.len();
            Ok(TrainedModel {
                artifact_path: PathBuf::from("model.bin"),
            })
        }
    }

    #[test]
    fn test_trainer_receives_training_set() {
        let patterns = patterns();
        let set = TrainingSet::from_patterns(
            &vectorizer(&patterns),
            &patterns,
            &mut StdRng::seed_from_u64(5),
        )
        .unwrap();

        let mut trainer = RecordingTrainer { seen: 0 };
        let model = trainer.fit(&set).unwrap();
        assert_eq!(trainer.seen, 4);
        assert_eq!(model.artifact_path, PathBuf::from("model.bin"));
    }
}
