//! Quiz stage: a short fixed list of multiple-choice questions

/// A multiple-choice question
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct QuizQuestion {
    pub prompt: &'static str,
    pub options: &'static [&'static str],
    /// Index into `options`
    pub correct: usize,
    pub explanation: &'static str,
}

pub const QUIZ: &[QuizQuestion] = &[
    QuizQuestion {
        prompt: "What does 'void' mean in main?",
        options: &["Returns Integer", "Returns Nothing", "Avoids Errors"],
        correct: 1,
        explanation: "Correct! Void methods return nada!",
    },
    QuizQuestion {
        prompt: "What does % do?",
        options: &["Percentage", "Divide", "Remainder"],
        correct: 2,
        explanation: "Yep! It's the Modulo operator.",
    },
    QuizQuestion {
        prompt: "What is a Class?",
        options: &["Blueprint for Objects", "Variable", "Function"],
        correct: 0,
        explanation: "Exactly! Like a recipe for cookies.",
    },
];

/// Feedback shown after answering
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AnswerFeedback {
    pub chosen: usize,
    pub correct: usize,
    pub is_correct: bool,
    pub message: String,
}

/// What `advance` did
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QuizProgress {
    /// Show question `index`
    Question(usize),
    /// All questions answered
    Finished,
}

/// Position in the quiz
///
/// The index only moves forward and never passes `questions.len()`.
#[derive(Debug, Clone)]
pub struct QuizState {
    questions: &'static [QuizQuestion],
    index: usize,
    answered: Option<usize>,
}

impl Default for QuizState {
    fn default() -> Self {
        Self::new(QUIZ)
    }
}

impl QuizState {
    pub fn new(questions: &'static [QuizQuestion]) -> Self {
        Self {
            questions,
            index: 0,
            answered: None,
        }
    }

    pub fn index(&self) -> usize {
        self.index
    }

    pub fn len(&self) -> usize {
        self.questions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.questions.is_empty()
    }

    pub fn is_finished(&self) -> bool {
        self.index >= self.questions.len()
    }

    pub fn current(&self) -> Option<&'static QuizQuestion> {
        self.questions.get(self.index)
    }

    pub fn answered(&self) -> Option<usize> {
        self.answered
    }

    /// Answer the current question; a question takes exactly one answer
    pub fn answer(&mut self, choice: usize) -> Option<AnswerFeedback> {
        if self.answered.is_some() {
            return None;
        }
        let question = self.current()?;
        if choice >= question.options.len() {
            return None;
        }
        self.answered = Some(choice);

        let is_correct = choice == question.correct;
        let message = if is_correct {
            question.explanation.to_string()
        } else {
            format!("Not quite! {}", question.explanation)
        };
        Some(AnswerFeedback {
            chosen: choice,
            correct: question.correct,
            is_correct,
            message,
        })
    }

    /// Move past the current question
    pub fn advance(&mut self) -> QuizProgress {
        if self.index < self.questions.len() {
            self.index += 1;
        }
        self.answered = None;
        if self.is_finished() {
            QuizProgress::Finished
        } else {
            QuizProgress::Question(self.index)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_questions_are_well_formed() {
        for q in QUIZ {
            assert!(q.correct < q.options.len(), "bad answer index for '{}'", q.prompt);
            assert!(!q.explanation.is_empty());
        }
    }

    #[test]
    fn test_correct_and_wrong_answers() {
        let mut quiz = QuizState::default();
        let fb = quiz.answer(1).unwrap();
        assert!(fb.is_correct);
        assert_eq!(fb.message, QUIZ[0].explanation);

        quiz.advance();
        let fb = quiz.answer(0).unwrap();
        assert!(!fb.is_correct);
        assert_eq!(fb.correct, 2);
        assert!(fb.message.starts_with("Not quite! "));
    }

    #[test]
    fn test_single_answer_per_question() {
        let mut quiz = QuizState::default();
        assert!(quiz.answer(0).is_some());
        assert!(quiz.answer(1).is_none());
        assert_eq!(quiz.answered(), Some(0));
    }

    #[test]
    fn test_out_of_range_answer_ignored() {
        let mut quiz = QuizState::default();
        assert!(quiz.answer(9).is_none());
        assert_eq!(quiz.answered(), None);
    }

    #[test]
    fn test_index_is_monotonic_and_bounded() {
        let mut quiz = QuizState::default();
        assert_eq!(quiz.advance(), QuizProgress::Question(1));
        assert_eq!(quiz.advance(), QuizProgress::Question(2));
        assert_eq!(quiz.advance(), QuizProgress::Finished);
        assert_eq!(quiz.advance(), QuizProgress::Finished);
        assert_eq!(quiz.index(), QUIZ.len());
        assert!(quiz.current().is_none());
        assert!(quiz.answer(0).is_none());
    }
}
