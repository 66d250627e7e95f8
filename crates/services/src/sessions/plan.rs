use std::num::NonZeroUsize;

use rand::Rng;
use rand::seq::SliceRandom;
use tracing::info;

use quiz_core::model::{Question, QuestionBank, QuestionStatsMap, QuizFilters, QuizMode};

/// Selection result for a quiz build.
#[derive(Debug, Clone, PartialEq)]
pub struct DeckPlan {
    pub questions: Vec<Question>,
    /// Size of the candidate pool the deck was drawn from.
    pub pool_size: usize,
    /// True when review-wrong found nothing and the whole bank was used.
    pub fell_back: bool,
}

impl DeckPlan {
    /// Total number of questions in this plan.
    #[must_use]
    pub fn len(&self) -> usize {
        self.questions.len()
    }

    /// Returns true when no questions were selected.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.questions.is_empty()
    }
}

/// Builds a quiz deck from the bank according to the user's filters.
pub struct DeckBuilder<'a> {
    bank: &'a QuestionBank,
    filters: &'a QuizFilters,
    stats: &'a QuestionStatsMap,
}

impl<'a> DeckBuilder<'a> {
    #[must_use]
    pub fn new(
        bank: &'a QuestionBank,
        filters: &'a QuizFilters,
        stats: &'a QuestionStatsMap,
    ) -> Self {
        Self {
            bank,
            filters,
            stats,
        }
    }

    fn is_review_candidate(&self, question: &Question) -> bool {
        self.stats
            .get(question.id())
            .is_some_and(|s| s.is_net_negative())
    }

    /// Questions eligible for the deck, in bank order, and whether the
    /// review-wrong fallback fired.
    ///
    /// - Topic and difficulty match exactly unless set to "all".
    /// - `paper1`/`paper2` keep questions for that paper or for both.
    /// - `reviewWrong` keeps questions answered wrong more often than right;
    ///   when none qualify the entire bank is returned, ignoring every other
    ///   filter, so a quiz can always start.
    #[must_use]
    pub fn candidate_pool(&self) -> (Vec<&'a Question>, bool) {
        let review_only = self.filters.mode == QuizMode::ReviewWrong;
        let pool: Vec<&'a Question> = self
            .bank
            .iter()
            .filter(|q| self.filters.matches_static(q))
            .filter(|q| !review_only || self.is_review_candidate(q))
            .collect();

        if review_only && pool.is_empty() {
            return (self.bank.iter().collect(), true);
        }
        (pool, false)
    }

    /// Shuffle the candidate pool uniformly and keep up to `requested`
    /// questions.
    pub fn build<R: Rng + ?Sized>(self, requested: NonZeroUsize, rng: &mut R) -> DeckPlan {
        let (mut pool, fell_back) = self.candidate_pool();
        let pool_size = pool.len();
        if fell_back {
            info!(
                pool_size,
                "no questions need review, drawing from the whole bank"
            );
        }

        pool.shuffle(rng);
        pool.truncate(requested.get());

        DeckPlan {
            questions: pool.into_iter().cloned().collect(),
            pool_size,
            fell_back,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use quiz_core::model::{
        Difficulty, DifficultyFilter, Paper, QuestionDraft, QuestionId, QuestionStats, TopicFilter,
    };
    use quiz_core::time::fixed_now;
    use rand::SeedableRng;
    use rand::rngs::StdRng;
    use std::collections::HashSet;

    fn question(id: &str, topic: &str, difficulty: u8, paper: Paper) -> Question {
        QuestionDraft {
            id: QuestionId::new(id),
            topic: topic.into(),
            difficulty,
            paper,
            question: format!("Question {id}"),
            options: vec!["a".into(), "b".into(), "c".into(), "d".into()],
            answer_index: 0,
            explanation: None,
        }
        .validate()
        .unwrap()
    }

    fn bank() -> QuestionBank {
        QuestionBank::new(vec![
            question("alg-1", "Algebra", 1, Paper::Paper1),
            question("alg-2", "Algebra", 2, Paper::Paper2),
            question("alg-3", "Algebra", 2, Paper::Both),
            question("vec-1", "Vectors", 1, Paper::Paper1),
            question("vec-2", "Vectors", 3, Paper::Paper2),
            question("cal-1", "Calculus", 4, Paper::Both),
        ])
        .unwrap()
    }

    fn count(n: usize) -> NonZeroUsize {
        NonZeroUsize::new(n).unwrap()
    }

    fn ids(questions: &[&Question]) -> Vec<String> {
        questions.iter().map(|q| q.id().to_string()).collect()
    }

    fn wrong_stats(id: &str, correct: u32, wrong: u32) -> (QuestionId, QuestionStats) {
        let mut stats = QuestionStats::default();
        for _ in 0..correct {
            stats.record_attempt(true, fixed_now());
        }
        for _ in 0..wrong {
            stats.record_attempt(false, fixed_now());
        }
        (QuestionId::new(id), stats)
    }

    #[test]
    fn wildcards_keep_everything() {
        let bank = bank();
        let filters = QuizFilters::default();
        let stats = QuestionStatsMap::new();
        let (pool, fell_back) = DeckBuilder::new(&bank, &filters, &stats).candidate_pool();
        assert_eq!(pool.len(), bank.len());
        assert!(!fell_back);
    }

    #[test]
    fn topic_and_difficulty_are_exact_matches() {
        let bank = bank();
        let filters = QuizFilters::new(
            TopicFilter::Only("Algebra".into()),
            DifficultyFilter::Only(Difficulty::new(2).unwrap()),
            QuizMode::Mixed,
        );
        let stats = QuestionStatsMap::new();
        let (pool, _) = DeckBuilder::new(&bank, &filters, &stats).candidate_pool();
        assert_eq!(ids(&pool), vec!["alg-2", "alg-3"]);
    }

    #[test]
    fn paper_modes_include_both() {
        let bank = bank();
        let stats = QuestionStatsMap::new();

        let p1 = QuizFilters::default().with_mode(QuizMode::Paper1);
        let (pool, _) = DeckBuilder::new(&bank, &p1, &stats).candidate_pool();
        assert_eq!(ids(&pool), vec!["alg-1", "alg-3", "vec-1", "cal-1"]);

        let p2 = QuizFilters::default().with_mode(QuizMode::Paper2);
        let (pool, _) = DeckBuilder::new(&bank, &p2, &stats).candidate_pool();
        assert_eq!(ids(&pool), vec!["alg-2", "alg-3", "vec-2", "cal-1"]);
    }

    #[test]
    fn review_wrong_keeps_net_negative_questions() {
        let bank = bank();
        let stats: QuestionStatsMap = [
            wrong_stats("alg-1", 0, 1),
            wrong_stats("alg-2", 1, 1),
            wrong_stats("vec-2", 1, 3),
            wrong_stats("cal-1", 2, 0),
        ]
        .into_iter()
        .collect();
        let filters = QuizFilters::default().with_mode(QuizMode::ReviewWrong);

        let (pool, fell_back) = DeckBuilder::new(&bank, &filters, &stats).candidate_pool();
        assert_eq!(ids(&pool), vec!["alg-1", "vec-2"]);
        assert!(!fell_back);
    }

    #[test]
    fn review_wrong_respects_topic_filter() {
        let bank = bank();
        let stats: QuestionStatsMap = [wrong_stats("alg-1", 0, 1), wrong_stats("vec-2", 0, 2)]
            .into_iter()
            .collect();
        let filters = QuizFilters::new(
            TopicFilter::Only("Vectors".into()),
            DifficultyFilter::All,
            QuizMode::ReviewWrong,
        );
        let (pool, _) = DeckBuilder::new(&bank, &filters, &stats).candidate_pool();
        assert_eq!(ids(&pool), vec!["vec-2"]);
    }

    #[test]
    fn empty_review_pool_falls_back_to_whole_bank() {
        let bank = bank();
        let stats = QuestionStatsMap::new();
        // Topic would narrow the pool to two questions; the fallback ignores it.
        let filters = QuizFilters::new(
            TopicFilter::Only("Vectors".into()),
            DifficultyFilter::All,
            QuizMode::ReviewWrong,
        );

        let (pool, fell_back) = DeckBuilder::new(&bank, &filters, &stats).candidate_pool();
        assert!(fell_back);
        assert_eq!(pool.len(), bank.len());

        let plan = DeckBuilder::new(&bank, &filters, &stats)
            .build(count(10), &mut StdRng::seed_from_u64(1));
        assert_eq!(plan.len(), bank.len());
        assert!(plan.fell_back);
    }

    #[test]
    fn non_review_modes_never_fall_back() {
        let bank = bank();
        let stats = QuestionStatsMap::new();
        let filters = QuizFilters::new(
            TopicFilter::Only("Geometry".into()),
            DifficultyFilter::All,
            QuizMode::Mixed,
        );
        let plan = DeckBuilder::new(&bank, &filters, &stats)
            .build(count(5), &mut StdRng::seed_from_u64(3));
        assert!(plan.is_empty());
        assert!(!plan.fell_back);
    }

    #[test]
    fn deck_length_is_min_of_request_and_pool_without_duplicates() {
        let bank = bank();
        let filters = QuizFilters::default();
        let stats = QuestionStatsMap::new();
        let mut rng = StdRng::seed_from_u64(42);

        for requested in 1..=10 {
            let plan = DeckBuilder::new(&bank, &filters, &stats).build(count(requested), &mut rng);
            assert_eq!(plan.len(), requested.min(bank.len()));
            assert_eq!(plan.pool_size, bank.len());
            let unique: HashSet<_> = plan.questions.iter().map(|q| q.id().clone()).collect();
            assert_eq!(unique.len(), plan.len());
        }
    }

    #[test]
    fn shuffle_reaches_every_question_in_first_slot() {
        let bank = bank();
        let filters = QuizFilters::default();
        let stats = QuestionStatsMap::new();
        let mut rng = StdRng::seed_from_u64(7);

        let mut firsts = HashSet::new();
        for _ in 0..500 {
            let plan = DeckBuilder::new(&bank, &filters, &stats).build(count(1), &mut rng);
            firsts.insert(plan.questions[0].id().clone());
        }
        assert_eq!(firsts.len(), bank.len());
    }

    #[test]
    fn empty_bank_yields_empty_deck() {
        let bank = QuestionBank::default();
        let filters = QuizFilters::default().with_mode(QuizMode::ReviewWrong);
        let stats = QuestionStatsMap::new();
        let plan = DeckBuilder::new(&bank, &filters, &stats)
            .build(count(3), &mut StdRng::seed_from_u64(0));
        assert!(plan.is_empty());
    }
}
