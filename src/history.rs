use crate::schema::{ConversationTurn, Language};
use crate::utils::truncate_chars;
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::collections::{BTreeSet, VecDeque};
use std::fmt;

/// Per-session FIFO buffer of answered turns.
#[derive(Debug, Clone)]
pub struct ConversationHistory {
    turns: VecDeque<ConversationTurn>,
    capacity: usize,
}

impl ConversationHistory {
    pub fn new(capacity: usize) -> Self {
        Self {
            turns: VecDeque::with_capacity(capacity),
            capacity,
        }
    }

    pub fn push(&mut self, turn: ConversationTurn) {
        self.turns.push_back(turn);
        while self.turns.len() > self.capacity {
            self.turns.pop_front();
        }
    }

    pub fn len(&self) -> usize {
        self.turns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.turns.is_empty()
    }

    pub fn turns(&self) -> impl Iterator<Item = &ConversationTurn> {
        self.turns.iter()
    }

    /// The most recent `n` turns, oldest first.
    pub fn recent(&self, n: usize) -> impl Iterator<Item = &ConversationTurn> {
        self.turns.iter().skip(self.turns.len().saturating_sub(n))
    }

    /// Renders the last `window` turns for the system instruction, answers cut to `excerpt_chars`.
    pub fn render(&self, window: usize, excerpt_chars: usize, label: &str, question: &str, answer: &str) -> String {
        if self.turns.is_empty() || window == 0 {
            return String::new();
        }

        let mut out = format!("\n{}:\n", label);
        for turn in self.recent(window) {
            out.push_str(&format!(
                "{}: {}\n{}: {}...\n",
                question,
                turn.question,
                answer,
                truncate_chars(&turn.answer, excerpt_chars)
            ));
        }
        out
    }

    pub fn summary(&self) -> Option<ConversationSummary> {
        let last = self.turns.back()?;

        let languages: BTreeSet<Language> = self.turns.iter().map(|t| t.language).collect();
        let mut recent_topics: Vec<&'static str> = Vec::new();
        for turn in self.recent(5) {
            if let Some(topic) = topic_of(&turn.question) {
                if !recent_topics.contains(&topic) {
                    recent_topics.push(topic);
                }
            }
        }

        Some(ConversationSummary {
            total_questions: self.turns.len(),
            languages: languages.into_iter().collect(),
            recent_topics,
            last_interaction: last.timestamp,
        })
    }
}

fn topic_of(question: &str) -> Option<&'static str> {
    let q = question.to_lowercase();
    if q.contains("budget") {
        Some("Budget")
    } else if ["entité", "région", "entity"].iter().any(|k| q.contains(k)) {
        Some("Entités")
    } else if ["prévision", "forecast"].iter().any(|k| q.contains(k)) {
        Some("Prévisions")
    } else if q.contains("ramadan") {
        Some("Ramadan")
    } else {
        None
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct ConversationSummary {
    pub total_questions: usize,
    pub languages: Vec<Language>,
    pub recent_topics: Vec<&'static str>,
    pub last_interaction: DateTime<Utc>,
}

impl fmt::Display for ConversationSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let languages = self
            .languages
            .iter()
            .map(|l| l.to_string())
            .collect::<Vec<_>>()
            .join(", ");
        let topics = if self.recent_topics.is_empty() {
            "Général".to_string()
        } else {
            self.recent_topics.join(", ")
        };
        writeln!(f, "📊 Résumé de la conversation:")?;
        writeln!(f, "• Nombre total de questions: {}", self.total_questions)?;
        writeln!(f, "• Langues utilisées: {}", languages)?;
        writeln!(f, "• Sujets récents: {}", topics)?;
        write!(
            f,
            "• Dernière interaction: {}",
            self.last_interaction.format("%d/%m/%Y %H:%M")
        )
    }
}
