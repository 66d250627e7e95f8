use std::collections::HashSet;

use quiz_core::model::{Difficulty, Question, QuestionBank, QuestionId};

use super::engine::QuizSession;

/// One incorrectly answered question, with what the right answer was.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReviewItem {
    pub question_id: QuestionId,
    pub topic: String,
    pub difficulty: Difficulty,
    pub question: String,
    pub correct_letter: char,
    pub explanation: Option<String>,
}

impl ReviewItem {
    fn from_question(question: &Question) -> Self {
        Self {
            question_id: question.id().clone(),
            topic: question.topic().to_string(),
            difficulty: question.difficulty(),
            question: question.body().to_string(),
            correct_letter: question.answer_letter(),
            explanation: question.explanation().map(str::to_string),
        }
    }
}

/// Review section of the results screen.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Review {
    /// No incorrect answers this quiz.
    Perfect,
    /// Wrongly answered questions, in question bank order.
    Mistakes(Vec<ReviewItem>),
}

/// End-of-quiz summary derived from the session counters.
#[derive(Debug, Clone, PartialEq)]
pub struct QuizResults {
    /// Deck length, including unanswered and skipped questions.
    pub total: usize,
    pub correct: u32,
    pub wrong: u32,
    pub skipped: u32,
    /// `correct + wrong`; skips are not answers.
    pub answered: u32,
    /// Percent of answered questions that were correct, 0 when none were.
    pub accuracy: f64,
    pub xp_earned: u32,
    pub review: Review,
}

impl QuizResults {
    /// Summarize a session, looking review items up in `bank`.
    #[must_use]
    pub fn summarize(session: &QuizSession, bank: &QuestionBank) -> Self {
        let correct = session.correct();
        let wrong = session.wrong();
        let answered = correct + wrong;
        let accuracy = if answered > 0 {
            f64::from(correct) / f64::from(answered) * 100.0
        } else {
            0.0
        };

        let review = if session.wrong_ids().is_empty() {
            Review::Perfect
        } else {
            let wrong_ids: HashSet<&QuestionId> = session.wrong_ids().iter().collect();
            Review::Mistakes(
                bank.iter()
                    .filter(|q| wrong_ids.contains(q.id()))
                    .map(ReviewItem::from_question)
                    .collect(),
            )
        };

        Self {
            total: session.deck().len(),
            correct,
            wrong,
            skipped: session.skipped(),
            answered,
            accuracy,
            xp_earned: session.xp_earned(),
            review,
        }
    }

    /// Accuracy rounded to a whole percent.
    #[must_use]
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    pub fn accuracy_rounded(&self) -> u32 {
        self.accuracy.round() as u32
    }

    #[must_use]
    pub fn is_perfect(&self) -> bool {
        matches!(self.review, Review::Perfect)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use quiz_core::model::{Paper, QuestionDraft};

    fn question(id: &str, answer_index: usize, explanation: Option<&str>) -> Question {
        QuestionDraft {
            id: QuestionId::new(id),
            topic: "Functions".into(),
            difficulty: 3,
            paper: Paper::Paper2,
            question: format!("Body {id}"),
            options: vec!["a".into(), "b".into(), "c".into(), "d".into()],
            answer_index,
            explanation: explanation.map(str::to_string),
        }
        .validate()
        .unwrap()
    }

    fn bank() -> QuestionBank {
        QuestionBank::new(vec![
            question("q1", 0, None),
            question("q2", 1, Some("Slope is rise over run.")),
            question("q3", 2, None),
            question("q4", 3, None),
            question("q5", 0, None),
        ])
        .unwrap()
    }

    #[test]
    fn ending_early_scores_partial_quiz() {
        let bank = bank();
        let mut session = QuizSession::new();
        session.start(bank.questions().to_vec());

        // q1 correct, q2 wrong, q3 correct, then stop.
        session.submit_answer(0).unwrap();
        session.next();
        session.submit_answer(0).unwrap();
        session.next();
        session.submit_answer(2).unwrap();
        session.end();

        let results = QuizResults::summarize(&session, &bank);
        assert_eq!(results.total, 5);
        assert_eq!(results.answered, 3);
        assert_eq!(results.accuracy_rounded(), 67);
        let Review::Mistakes(items) = &results.review else {
            panic!("expected mistakes");
        };
        assert_eq!(items.len(), 1);
        assert_eq!(items[0].question_id, QuestionId::new("q2"));
        assert_eq!(items[0].correct_letter, 'B');
        assert_eq!(
            items[0].explanation.as_deref(),
            Some("Slope is rise over run.")
        );
    }

    #[test]
    fn review_is_in_bank_order() {
        let bank = bank();
        let mut session = QuizSession::new();
        let deck = vec![
            bank.questions()[3].clone(),
            bank.questions()[0].clone(),
        ];
        session.start(deck);
        session.submit_answer(0).unwrap(); // q4 wrong
        session.next();
        session.submit_answer(1).unwrap(); // q1 wrong

        let results = QuizResults::summarize(&session, &bank);
        let Review::Mistakes(items) = results.review else {
            panic!("expected mistakes");
        };
        let ids: Vec<_> = items.iter().map(|i| i.question_id.as_str()).collect();
        assert_eq!(ids, vec!["q1", "q4"]);
    }

    #[test]
    fn no_mistakes_is_a_perfect_run() {
        let bank = bank();
        let mut session = QuizSession::new();
        session.start(vec![bank.questions()[0].clone()]);
        session.submit_answer(0).unwrap();
        session.next();

        let results = QuizResults::summarize(&session, &bank);
        assert!(results.is_perfect());
        assert_eq!(results.accuracy_rounded(), 100);
        assert_eq!(results.xp_earned, 35);
    }

    #[test]
    fn all_skipped_has_zero_accuracy() {
        let bank = bank();
        let mut session = QuizSession::new();
        session.start(bank.questions().to_vec());
        while session.skip() {}

        let results = QuizResults::summarize(&session, &bank);
        assert_eq!(results.answered, 0);
        assert_eq!(results.skipped, 5);
        assert_eq!(results.accuracy_rounded(), 0);
        assert!(results.is_perfect());
    }
}
