use super::types::{Answer, AnswerValue};

#[derive(Debug, Clone, Default, PartialEq)]
pub struct AnswerStore {
    answers: Vec<Answer>,
}

impl AnswerStore {
    pub fn seeded(initial: &[Answer]) -> Self {
        let mut store = Self::default();
        for answer in initial {
            store.upsert(answer.clone());
        }
        store
    }

    // Replaces the entry for the same question in place, otherwise appends.
    pub fn upsert(&mut self, answer: Answer) {
        match self
            .answers
            .iter_mut()
            .find(|a| a.question_id == answer.question_id)
        {
            Some(existing) => *existing = answer,
            None => self.answers.push(answer),
        }
    }

    pub fn get(&self, question_id: &str) -> Option<&Answer> {
        self.answers.iter().find(|a| a.question_id == question_id)
    }

    pub fn value(&self, question_id: &str) -> Option<&AnswerValue> {
        self.get(question_id).and_then(|a| a.answer.as_ref())
    }

    pub fn answers(&self) -> &[Answer] {
        &self.answers
    }

    pub fn len(&self) -> usize {
        self.answers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.answers.is_empty()
    }

    pub fn set_value(&mut self, question_id: &str, value: AnswerValue) {
        if let Some(existing) = self
            .answers
            .iter_mut()
            .find(|a| a.question_id == question_id)
        {
            existing.answer = Some(value);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::AnswerStore;
    use crate::survey::types::Answer;

    #[test]
    fn upsert_keeps_one_entry_per_question() {
        let mut store = AnswerStore::default();
        store.upsert(Answer::text("q1", "a"));
        store.upsert(Answer::text("q2", "b"));
        store.upsert(Answer::text("q1", "c"));
        store.upsert(Answer::text("q1", "d"));
        assert_eq!(store.len(), 2);
        assert_eq!(store.answers()[0].question_id, "q1");
        assert_eq!(store.value("q1").and_then(|v| v.as_text()), Some("d"));
    }

    #[test]
    fn seeding_collapses_duplicates() {
        let store = AnswerStore::seeded(&[
            Answer::text("q1", "old"),
            Answer::text("q1", "new"),
        ]);
        assert_eq!(store.len(), 1);
        assert_eq!(store.value("q1").and_then(|v| v.as_text()), Some("new"));
    }
}
