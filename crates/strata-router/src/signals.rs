//! Text signals: urgency, context, energy level.
//!
//! Keyword matching runs over a normalized copy of the text (lowercase,
//! non-alphanumerics collapsed to single spaces, padded), so phrases match
//! on word boundaries only.

use serde::Serialize;
use strata_core::config::RoutingConfig;
use strata_core::models::{Context, EnergyLevel, Entity, Priority};

/// Context keyword table, in tie-break order.
const CONTEXT_KEYWORDS: &[(Context, &[&str])] = &[
    (Context::Phone, &["call", "phone", "ring", "dial", "voicemail", "text back"]),
    (
        Context::Errands,
        &["buy", "pick up", "drop off", "store", "shop", "groceries", "post office", "errand"],
    ),
    (Context::Office, &["print", "office", "sign", "scan", "meeting room", "whiteboard"]),
    (Context::Home, &["home", "house", "garden", "laundry", "kitchen"]),
    (Context::Reading, &["read", "article", "book", "paper", "whitepaper", "documentation"]),
    (Context::Waiting, &["waiting for", "waiting on", "awaiting", "follow up", "pending reply"]),
    (
        Context::Computer,
        &["email", "online", "website", "spreadsheet", "code", "upload", "download"],
    ),
];

/// Energy keyword table, in tie-break order.
const ENERGY_KEYWORDS: &[(EnergyLevel, &[&str])] = &[
    (EnergyLevel::Creative, &["design", "brainstorm", "write", "draft", "sketch", "idea"]),
    (
        EnergyLevel::Administrative,
        &["invoice", "expense", "form", "paperwork", "schedule", "file", "report", "receipt"],
    ),
    (EnergyLevel::High, &["plan", "strategy", "analyze", "negotiate", "presentation", "architect"]),
    (EnergyLevel::Low, &["check", "reply", "confirm", "quick", "remind", "forward"]),
];

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Signals {
    pub urgency: f64,
    pub context: Context,
    /// False when no keyword matched and `context` is the default.
    pub context_matched: bool,
    pub energy: EnergyLevel,
    /// Matched urgency keywords, alphabetical.
    pub urgency_terms: Vec<String>,
}

/// Text normalized for phrase matching.
#[derive(Debug, Clone)]
pub struct NormalizedText(String);

impl NormalizedText {
    pub fn new(text: &str) -> Self {
        let mut out = String::with_capacity(text.len() + 2);
        out.push(' ');
        let mut gap = true;
        for c in text.chars() {
            if c.is_alphanumeric() {
                out.extend(c.to_lowercase());
                gap = false;
            } else if !gap {
                out.push(' ');
                gap = true;
            }
        }
        if !gap {
            out.push(' ');
        }
        Self(out)
    }

    pub fn is_blank(&self) -> bool {
        self.0.trim().is_empty()
    }

    /// Whole-word (or whole-phrase) match. `phrase` must be lowercase.
    pub fn has(&self, phrase: &str) -> bool {
        let needle = format!(" {} ", phrase.trim());
        self.0.contains(&needle)
    }

    pub fn has_any(&self, phrases: &[&str]) -> bool {
        phrases.iter().any(|p| self.has(p))
    }

    fn count(&self, phrases: &[&str]) -> usize {
        phrases.iter().filter(|p| self.has(p)).count()
    }
}

/// Summed keyword weights plus a bump for explicit task priority, capped at 1.
pub fn urgency(text: &NormalizedText, entity: &Entity, config: &RoutingConfig) -> (f64, Vec<String>) {
    let mut terms = Vec::new();
    let mut score = 0.0;
    for (keyword, weight) in &config.urgency_keywords {
        if text.has(&keyword.to_lowercase()) {
            score += weight.max(0.0);
            terms.push(keyword.clone());
        }
    }
    if let Entity::Task(task) = entity {
        score += match task.priority {
            Some(Priority::Urgent) => 0.5,
            Some(Priority::High) => 0.2,
            _ => 0.0,
        };
    }
    (score.min(1.0), terms)
}

/// Best-scoring context; ties go to the earlier table row. COMPUTER when nothing matches.
pub fn context(text: &NormalizedText) -> (Context, bool) {
    best_match(text, CONTEXT_KEYWORDS)
        .map(|c| (c, true))
        .unwrap_or((Context::default(), false))
}

/// Keyword energy, overridden by task duration at either extreme.
pub fn energy(text: &NormalizedText, entity: &Entity, config: &RoutingConfig) -> EnergyLevel {
    if let Entity::Task(task) = entity {
        if let Some(hours) = task.estimated_hours {
            if hours > config.long_task_min_hours {
                return EnergyLevel::High;
            }
            if hours < config.short_task_max_hours {
                return EnergyLevel::Low;
            }
        }
    }
    best_match(text, ENERGY_KEYWORDS).unwrap_or_default()
}

pub fn analyze(entity: &Entity, config: &RoutingConfig) -> Signals {
    let text = NormalizedText::new(&entity.text());
    let (urgency, urgency_terms) = urgency(&text, entity, config);
    let (context, context_matched) = context(&text);
    Signals {
        urgency,
        context,
        context_matched,
        energy: energy(&text, entity, config),
        urgency_terms,
    }
}

fn best_match<T: Copy>(text: &NormalizedText, table: &[(T, &[&str])]) -> Option<T> {
    let mut best: Option<(T, usize)> = None;
    for (value, keywords) in table {
        let hits = text.count(keywords);
        if hits > best.map(|(_, n)| n).unwrap_or(0) {
            best = Some((*value, hits));
        }
    }
    best.map(|(v, _)| v)
}

#[cfg(test)]
mod tests {
    use super::*;
    use strata_core::models::{Message, Task};

    fn task(title: &str, hours: Option<f64>) -> Entity {
        Entity::Task(Task {
            id: "t".to_string(),
            title: title.to_string(),
            description: None,
            estimated_hours: hours,
            priority: None,
            due_date: None,
        })
    }

    #[test]
    fn phrases_match_on_word_boundaries() {
        let t = NormalizedText::new("Recall: please pick-up the parcel!");
        assert!(!t.has("call"));
        assert!(t.has("pick up"));
        assert!(t.has("parcel"));
        assert!(NormalizedText::new("  ...  ").is_blank());
    }

    #[test]
    fn alarm_words_outweigh_schedule_words() {
        let config = RoutingConfig::default();
        let alarm = analyze(&task("Server outage is critical", None), &config);
        let schedule = analyze(&task("Deadline for the report", None), &config);
        assert!(alarm.urgency > schedule.urgency);
        assert_eq!(alarm.urgency_terms, vec!["critical".to_string()]);
    }

    #[test]
    fn urgency_is_capped() {
        let config = RoutingConfig::default();
        let s = analyze(
            &task("URGENT asap critical emergency, needed today immediately", None),
            &config,
        );
        assert_eq!(s.urgency, 1.0);
    }

    #[test]
    fn context_defaults_to_computer() {
        let config = RoutingConfig::default();
        let s = analyze(&task("Think about things", None), &config);
        assert_eq!(s.context, Context::Computer);
        assert!(!s.context_matched);

        let s = analyze(&task("Call supplier about invoice", None), &config);
        assert_eq!(s.context, Context::Phone);
        assert!(s.context_matched);
    }

    #[test]
    fn duration_overrides_energy_keywords() {
        let config = RoutingConfig::default();
        assert_eq!(analyze(&task("Draft the keynote", Some(6.0)), &config).energy, EnergyLevel::High);
        assert_eq!(analyze(&task("Draft the keynote", Some(0.25)), &config).energy, EnergyLevel::Low);
        assert_eq!(analyze(&task("Draft the keynote", Some(2.0)), &config).energy, EnergyLevel::Creative);
        assert_eq!(analyze(&task("Stuff", Some(2.0)), &config).energy, EnergyLevel::Medium);
    }

    #[test]
    fn messages_use_subject_and_body() {
        let config = RoutingConfig::default();
        let m = Entity::Message(Message {
            id: "m".to_string(),
            subject: "Quick one".to_string(),
            body: "Please read the attached article".to_string(),
            sender: None,
            channel: None,
        });
        let s = analyze(&m, &config);
        assert_eq!(s.context, Context::Reading);
        assert_eq!(s.energy, EnergyLevel::Low);
    }

    proptest::proptest! {
        #[test]
        fn urgency_stays_in_unit_interval(title in ".{0,80}", hours in proptest::option::of(0.0f64..20.0)) {
            let config = RoutingConfig::default();
            let s = analyze(&task(&title, hours), &config);
            proptest::prop_assert!((0.0..=1.0).contains(&s.urgency));
        }

        #[test]
        fn analysis_is_deterministic(title in "[a-z ]{0,60}") {
            let config = RoutingConfig::default();
            let e = task(&title, None);
            proptest::prop_assert_eq!(analyze(&e, &config), analyze(&e, &config));
        }
    }
}
