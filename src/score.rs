//! Quiz score tallying and percentage normalization

/// Point value of one selected quiz option
pub type QuizAnswer = u32;

/// Cumulative point total across the quiz, immutable once complete
pub type TraumaScore = u32;

/// Highest attainable trauma score; the fixed normalization constant for
/// [`trauma_percentage`].
pub const MAX_SCORE: TraumaScore = 50;

/// Sum an ordered sequence of answer point values into a trauma score.
///
/// Insertion order equals question order; one answer per question. The tally
/// saturates rather than wrapping so a hostile input cannot overflow.
pub fn tally(answers: &[QuizAnswer]) -> TraumaScore {
    answers.iter().fold(0, |acc, a| acc.saturating_add(*a))
}

/// Normalize a trauma score to an integer display percentage in [0, 100].
///
/// Linear against [`MAX_SCORE`], rounded, clamped at 100. Monotonically
/// non-decreasing in the score.
pub fn trauma_percentage(score: TraumaScore) -> u32 {
    let pct = (score as f64 / MAX_SCORE as f64 * 100.0).round() as u32;
    pct.min(100)
}
