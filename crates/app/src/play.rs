use std::error::Error;

use quiz_core::model::{Question, QuestionBank, QuestionStatsMap, option_letter};
use services::{
    AnswerResult, QuizRequest, QuizResults, QuizServices, QuizSession, Review, SessionState,
};
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader, Lines, Stdin};

type BoxResult<T> = Result<T, Box<dyn Error>>;

/// One line of player input while a question is on screen.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Input {
    Answer(usize),
    Skip,
    Quit,
    Continue,
    Unknown,
}

fn parse_input(line: &str) -> Input {
    let line = line.trim().to_ascii_lowercase();
    match line.as_str() {
        "" => Input::Continue,
        "s" | "skip" => Input::Skip,
        "q" | "quit" | "end" => Input::Quit,
        "a" | "1" => Input::Answer(0),
        "b" | "2" => Input::Answer(1),
        "c" | "3" => Input::Answer(2),
        "d" | "4" => Input::Answer(3),
        _ => Input::Unknown,
    }
}

struct Terminal {
    lines: Lines<BufReader<Stdin>>,
}

impl Terminal {
    fn new() -> Self {
        Self {
            lines: BufReader::new(tokio::io::stdin()).lines(),
        }
    }

    /// Print `prompt` and read one line; `None` on end of input.
    async fn ask(&mut self, prompt: &str) -> BoxResult<Option<String>> {
        let mut stdout = tokio::io::stdout();
        stdout.write_all(prompt.as_bytes()).await?;
        stdout.flush().await?;
        Ok(self.lines.next_line().await?)
    }
}

/// Ask a yes/no question on stdin.
pub(crate) async fn confirm(prompt: &str) -> BoxResult<bool> {
    let answer = Terminal::new().ask(&format!("{prompt} [y/N] ")).await?;
    Ok(answer.is_some_and(|a| matches!(a.trim().to_ascii_lowercase().as_str(), "y" | "yes")))
}

/// Play one quiz in the terminal until the deck runs out or the player quits.
pub(crate) async fn run_quiz(
    services: &QuizServices,
    request: &QuizRequest,
    retry: bool,
) -> BoxResult<()> {
    let quiz = services.quiz_loop();
    let mut session = QuizSession::new();

    let start = if retry {
        quiz.retry_incorrect(&mut session, request).await?
    } else {
        quiz.start_quiz(&mut session, request).await?
    };
    if start.fell_back {
        println!("Nothing needs review yet, so questions come from the whole bank.");
    }
    if start.deck_len == 0 {
        println!("No questions match these filters.");
        return Ok(());
    }

    let mut terminal = Terminal::new();
    loop {
        match session.state() {
            SessionState::InQuestion => {
                let Some(question) = session.current_question() else {
                    break;
                };
                print_question(&session, question);
                let Some(line) = terminal.ask("[a-d] answer, s skip, q end > ").await? else {
                    break;
                };
                match parse_input(&line) {
                    Input::Answer(selected) => {
                        if let Some(result) = quiz.answer_current(&mut session, selected).await? {
                            print_feedback(&result);
                        }
                    }
                    Input::Skip => {
                        session.skip();
                    }
                    Input::Quit => break,
                    Input::Continue | Input::Unknown => {
                        println!("Type a, b, c or d to answer, s to skip, q to end.");
                    }
                }
            }
            SessionState::Answered => {
                let Some(line) = terminal.ask("Enter for next, q to end > ").await? else {
                    break;
                };
                if parse_input(&line) == Input::Quit {
                    break;
                }
                session.next();
            }
            SessionState::Idle | SessionState::Finished => break,
        }
    }

    let results = quiz.end(&mut session);
    print_results(&results);
    Ok(())
}

fn print_question(session: &QuizSession, question: &Question) {
    let progress = session.progress();
    println!();
    println!(
        "Question {}/{} | {} | difficulty {} | {}",
        progress.position.unwrap_or(0),
        progress.total,
        question.topic(),
        question.difficulty(),
        question.paper(),
    );
    println!("{}", question.body());
    for (index, option) in question.options().iter().enumerate() {
        if let Some(letter) = option_letter(index) {
            println!("  {letter}) {option}");
        }
    }
}

fn print_feedback(result: &AnswerResult) {
    let correct_letter = option_letter(result.answer.correct_index).unwrap_or('?');
    if result.answer.is_correct {
        println!("Correct! +{} XP", result.answer.xp);
    } else {
        println!(
            "Not quite. The answer was {correct_letter}. +{} XP",
            result.answer.xp
        );
    }
    if let Some(explanation) = &result.explanation {
        println!("{explanation}");
    }
    println!(
        "Streak {} | total XP {}",
        result.profile.streak, result.profile.xp
    );
}

fn print_results(results: &QuizResults) {
    println!();
    println!("Quiz complete");
    println!(
        "Answered {} of {} | correct {} | wrong {} | skipped {}",
        results.answered, results.total, results.correct, results.wrong, results.skipped
    );
    println!(
        "Accuracy {}% | XP earned {}",
        results.accuracy_rounded(),
        results.xp_earned
    );

    match &results.review {
        Review::Perfect => println!("No mistakes to review."),
        Review::Mistakes(items) => {
            println!();
            println!("Review:");
            for item in items {
                println!(
                    "- [{} | difficulty {}] {}",
                    item.topic, item.difficulty, item.question
                );
                println!("  Correct answer: {}", item.correct_letter);
                if let Some(explanation) = &item.explanation {
                    println!("  {explanation}");
                }
            }
        }
    }
}

/// Correct and attempted counts per topic, skipping unattempted topics.
///
/// Summed as `u64` since imported records are not bounded.
fn topic_totals<'a>(
    bank: &'a QuestionBank,
    snapshot: &QuestionStatsMap,
) -> Vec<(&'a str, u64, u64)> {
    bank.topics()
        .into_iter()
        .filter_map(|topic| {
            let (correct, attempts) = bank
                .iter()
                .filter(|q| q.topic() == topic)
                .filter_map(|q| snapshot.get(q.id()))
                .fold((0u64, 0u64), |(c, a), s| {
                    (c + u64::from(s.correct), a + u64::from(s.attempts))
                });
            (attempts > 0).then_some((topic, correct, attempts))
        })
        .collect()
}

/// Print the aggregate profile and a per-topic breakdown of stored stats.
pub(crate) async fn print_stats(services: &QuizServices) -> BoxResult<()> {
    let stats = services.stats();
    let profile = stats.profile().await?;
    let snapshot = stats.snapshot().await?;
    let bank = services.bank();

    println!("XP: {}", profile.xp);
    println!("Streak: {}", profile.streak);
    println!(
        "Answered: {} (correct {})",
        profile.total_answered, profile.total_correct
    );
    match profile.accuracy_percent() {
        Some(accuracy) => println!("Accuracy: {accuracy:.0}%"),
        None => println!("Accuracy: -"),
    }

    let needs_review = snapshot.values().filter(|s| s.is_net_negative()).count();
    println!(
        "Questions seen: {} of {} | need review: {needs_review}",
        snapshot.len(),
        bank.len()
    );

    for (topic, correct, attempts) in topic_totals(&bank, &snapshot) {
        println!("  {topic}: {correct}/{attempts} correct");
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use quiz_core::model::{Paper, QuestionDraft, QuestionId, QuestionStats};

    fn bank() -> QuestionBank {
        let draft = |id: &str, topic: &str| QuestionDraft {
            id: QuestionId::new(id),
            topic: topic.into(),
            difficulty: 1,
            paper: Paper::Both,
            question: "Q".into(),
            options: vec!["a".into(), "b".into(), "c".into(), "d".into()],
            answer_index: 0,
            explanation: None,
        };
        QuestionBank::from_drafts(vec![
            draft("a1", "Algebra"),
            draft("a2", "Algebra"),
            draft("v1", "Vectors"),
        ])
        .unwrap()
    }

    #[test]
    fn topic_totals_handle_huge_imported_counters() {
        let bank = bank();
        let huge = QuestionStats {
            attempts: 4_000_000_000,
            correct: 3_000_000_000,
            wrong: 1_000_000_000,
            ..QuestionStats::default()
        };
        let snapshot: QuestionStatsMap = [
            (QuestionId::new("a1"), huge.clone()),
            (QuestionId::new("a2"), huge),
        ]
        .into_iter()
        .collect();

        let totals = topic_totals(&bank, &snapshot);
        assert_eq!(totals, vec![("Algebra", 6_000_000_000, 8_000_000_000)]);
    }

    #[test]
    fn input_accepts_letters_and_digits() {
        assert_eq!(parse_input("a"), Input::Answer(0));
        assert_eq!(parse_input(" D \n"), Input::Answer(3));
        assert_eq!(parse_input("2"), Input::Answer(1));
        assert_eq!(parse_input("s"), Input::Skip);
        assert_eq!(parse_input("Q"), Input::Quit);
        assert_eq!(parse_input(""), Input::Continue);
        assert_eq!(parse_input("e"), Input::Unknown);
        assert_eq!(parse_input("5"), Input::Unknown);
    }
}
