use super::classify::ResolvedQuestion;
use super::types::Question;

#[derive(Debug, Clone, Default)]
pub struct Sequencer {
    steps: Vec<ResolvedQuestion>,
    current: usize,
    navigating_back: bool,
}

impl Sequencer {
    pub fn new(questions: Vec<Question>) -> Self {
        let mut questions = questions
            .into_iter()
            .enumerate()
            .map(|(index, mut q)| {
                if q.position.is_none() {
                    q.position = Some(index as u32 + 1);
                }
                q
            })
            .collect::<Vec<Question>>();
        // sort_by_key is stable, ties keep input order
        questions.sort_by_key(|q| q.position.unwrap_or(u32::MAX));

        Self {
            steps: questions.into_iter().map(ResolvedQuestion::new).collect(),
            current: 0,
            navigating_back: false,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }

    pub fn total(&self) -> usize {
        self.steps.len()
    }

    pub fn current_step(&self) -> usize {
        self.current
    }

    pub fn current(&self) -> Option<&ResolvedQuestion> {
        self.steps.get(self.current)
    }

    pub fn steps(&self) -> &[ResolvedQuestion] {
        &self.steps
    }

    pub fn is_last_step(&self) -> bool {
        !self.steps.is_empty() && self.current == self.steps.len() - 1
    }

    pub fn is_navigating_back(&self) -> bool {
        self.navigating_back
    }

    pub fn next(&mut self) {
        if self.steps.is_empty() {
            return;
        }
        self.current = (self.current + 1).min(self.steps.len() - 1);
        self.navigating_back = false;
    }

    pub fn previous(&mut self) {
        self.current = self.current.saturating_sub(1);
        self.navigating_back = true;
    }
}
