//! Static bank of screening questions, keyed by canonical technology
//! identifier, with a deterministic mixed-difficulty selection.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Difficulty {
    Basic,
    Intermediate,
    Advanced,
}

/// A single screening question. Immutable, drawn from the static bank.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TechnicalQuestion {
    pub technology: String,
    pub text: String,
    pub difficulty: Difficulty,
}

type BankEntry = (&'static str, &'static [(&'static str, Difficulty)]);

use Difficulty::{Advanced, Basic, Intermediate};

const BANK: &[BankEntry] = &[
    (
        "python",
        &[
            ("What is the difference between lists and tuples in Python?", Basic),
            ("How do you handle exceptions in Python?", Basic),
            ("Explain the concept of decorators in Python with an example.", Intermediate),
            ("What are Python generators and when would you use them?", Intermediate),
            ("What is the Global Interpreter Lock (GIL) in Python?", Advanced),
        ],
    ),
    (
        "javascript",
        &[
            ("What is the difference between 'let', 'const', and 'var'?", Basic),
            ("What is the difference between '==' and '===' in JavaScript?", Basic),
            ("Explain closures in JavaScript with an example.", Intermediate),
            ("How do you handle asynchronous operations in JavaScript?", Intermediate),
            ("What is the event loop in JavaScript?", Advanced),
        ],
    ),
    (
        "react",
        &[
            ("Explain the difference between functional and class components.", Basic),
            ("How do you manage state in a React application?", Basic),
            ("What are React hooks and why are they useful?", Intermediate),
            ("What is the virtual DOM and how does it work?", Intermediate),
            ("How does React's reconciliation algorithm decide what to re-render?", Advanced),
        ],
    ),
    (
        "java",
        &[
            ("What are the main principles of Object-Oriented Programming?", Basic),
            ("Explain the concept of polymorphism in Java.", Basic),
            ("What is the difference between abstract classes and interfaces?", Intermediate),
            ("How does garbage collection work in Java?", Intermediate),
            ("What is the Java Memory Model?", Advanced),
        ],
    ),
    (
        "sql",
        &[
            ("What is the difference between INNER JOIN and LEFT JOIN?", Basic),
            ("What is normalization in database design?", Intermediate),
            ("What are database indexes and when should you use them?", Intermediate),
            ("How do you optimize a slow-running SQL query?", Intermediate),
            ("Explain the ACID properties of database transactions.", Advanced),
        ],
    ),
    (
        "aws",
        &[
            ("What is the difference between EC2 and Lambda?", Basic),
            ("What are the main AWS storage services?", Basic),
            ("How do you secure data in AWS S3?", Intermediate),
            ("What is auto-scaling in AWS and how does it work?", Intermediate),
            ("Explain the concept of Infrastructure as Code.", Advanced),
        ],
    ),
    (
        "docker",
        &[
            ("What is the difference between Docker images and containers?", Basic),
            ("What are Docker volumes and bind mounts?", Basic),
            ("What is Docker Compose and when would you use it?", Intermediate),
            ("How do you handle persistent data in Docker containers?", Intermediate),
            ("How do you optimize Docker images for production?", Advanced),
        ],
    ),
    (
        "kubernetes",
        &[
            ("What is the difference between Pods and Services in Kubernetes?", Basic),
            ("What is a Kubernetes deployment?", Basic),
            ("How do you manage configuration in Kubernetes?", Intermediate),
            ("How does service discovery work in Kubernetes?", Intermediate),
            ("What are Kubernetes operators?", Advanced),
        ],
    ),
    (
        "git",
        &[
            ("How do you resolve merge conflicts in Git?", Basic),
            ("What is the difference between 'git pull' and 'git fetch'?", Basic),
            ("How do you undo changes in Git?", Basic),
            ("What is the difference between 'git merge' and 'git rebase'?", Intermediate),
            ("What branching strategy would you choose for a small team, and why?", Intermediate),
        ],
    ),
    (
        "mongodb",
        &[
            ("What is a MongoDB document and how does it differ from a relational database row?", Basic),
            ("When would you embed documents versus reference them in MongoDB?", Intermediate),
            ("How do indexes work in MongoDB and how do you spot a missing one?", Intermediate),
            ("What is the aggregation pipeline and what have you used it for?", Intermediate),
            ("How does MongoDB handle replication and what consistency trade-offs does it make?", Advanced),
        ],
    ),
];

/// Default number of questions asked per screening session.
pub const DEFAULT_QUESTION_COUNT: usize = 5;

/// Read-only question bank, loaded once at process start and shared across
/// sessions without synchronization.
#[derive(Debug)]
pub struct QuestionBank {
    entries: Vec<(String, Vec<TechnicalQuestion>)>,
}

impl QuestionBank {
    pub fn new() -> Self {
        let entries = BANK
            .iter()
            .map(|(tech, questions)| {
                let qs = questions
                    .iter()
                    .map(|(text, difficulty)| TechnicalQuestion {
                        technology: tech.to_string(),
                        text: text.to_string(),
                        difficulty: *difficulty,
                    })
                    .collect();
                (tech.to_string(), qs)
            })
            .collect();
        Self { entries }
    }

    pub fn questions_for(&self, technology: &str) -> &[TechnicalQuestion] {
        self.entries
            .iter()
            .find(|(tech, _)| tech == technology)
            .map(|(_, qs)| qs.as_slice())
            .unwrap_or(&[])
    }

    /// Selects up to `count` questions for a normalized stack.
    ///
    /// Distribution: proportional across the stack's represented technologies
    /// in declared order, at least one per technology while `count` allows.
    /// Within a technology the split targets 60/30/10
    /// basic/intermediate/advanced, rounded so totals sum exactly; tier
    /// shortfalls refill from the technology's other tiers, then from other
    /// stack technologies in order. If `count` exceeds the distinct questions
    /// available, everything available is returned. Deterministic: the same
    /// stack and count always yield the same list, questions ordered by stack
    /// position then ascending difficulty.
    pub fn select(&self, stack: &[String], count: usize) -> Vec<TechnicalQuestion> {
        let represented: Vec<&str> = stack
            .iter()
            .map(String::as_str)
            .filter(|tech| !self.questions_for(tech).is_empty())
            .collect();
        if represented.is_empty() || count == 0 {
            return Vec::new();
        }

        let available: Vec<usize> = represented
            .iter()
            .map(|tech| self.questions_for(tech).len())
            .collect();
        let target = count.min(available.iter().sum());

        // Proportional quotas: base share plus one extra for the first
        // `remainder` technologies, then clamp to availability and round-robin
        // any unassigned count into technologies with spare questions.
        let n = represented.len();
        let base = target / n;
        let remainder = target % n;
        let mut quotas: Vec<usize> = (0..n)
            .map(|i| (base + usize::from(i < remainder)).min(available[i]))
            .collect();
        let mut assigned: usize = quotas.iter().sum();
        'fill: while assigned < target {
            let before = assigned;
            for i in 0..n {
                if assigned == target {
                    break 'fill;
                }
                if quotas[i] < available[i] {
                    quotas[i] += 1;
                    assigned += 1;
                }
            }
            if assigned == before {
                break;
            }
        }

        let mut selected = Vec::with_capacity(target);
        for (tech, quota) in represented.iter().zip(quotas) {
            selected.extend(self.pick_for_technology(tech, quota));
        }
        selected
    }

    /// Picks `quota` questions from one technology, biased 60/30/10 across
    /// difficulty tiers and emitted in ascending difficulty.
    fn pick_for_technology(&self, technology: &str, quota: usize) -> Vec<TechnicalQuestion> {
        let questions = self.questions_for(technology);
        let tiers = [Basic, Intermediate, Advanced];

        let basic_target = ((quota as f32) * 0.6).round() as usize;
        let intermediate_target = ((quota as f32) * 0.3).round() as usize;
        let advanced_target = quota.saturating_sub(basic_target + intermediate_target);
        let mut targets = [basic_target, intermediate_target, advanced_target];

        // Rounding can overshoot the quota by one; trim from the hardest tier.
        let mut overshoot = (basic_target + intermediate_target + advanced_target)
            .saturating_sub(quota);
        for tier in (0..3).rev() {
            while overshoot > 0 && targets[tier] > 0 {
                targets[tier] -= 1;
                overshoot -= 1;
            }
        }

        let mut picked = Vec::with_capacity(quota);
        let mut carry = 0usize;
        for (tier, difficulty) in tiers.iter().enumerate() {
            let wanted = targets[tier] + carry;
            let from_tier: Vec<&TechnicalQuestion> = questions
                .iter()
                .filter(|q| q.difficulty == *difficulty)
                .take(wanted)
                .collect();
            carry = wanted - from_tier.len();
            picked.extend(from_tier.into_iter().cloned());
        }
        // Leftover demand after the advanced tier sweeps any unpicked
        // question, easiest first.
        if carry > 0 {
            for difficulty in tiers {
                for q in questions.iter().filter(|q| q.difficulty == difficulty) {
                    if carry == 0 {
                        break;
                    }
                    if !picked.contains(q) {
                        picked.push(q.clone());
                        carry -= 1;
                    }
                }
            }
        }
        picked.sort_by_key(|q| q.difficulty);
        picked
    }
}

impl Default for QuestionBank {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn stack(techs: &[&str]) -> Vec<String> {
        techs.iter().map(|t| t.to_string()).collect()
    }

    #[test]
    fn test_bank_covers_at_least_nine_technologies_with_five_questions() {
        let bank = QuestionBank::new();
        assert!(BANK.len() >= 9);
        for (tech, _) in BANK {
            assert!(
                bank.questions_for(tech).len() >= 5,
                "{tech} has too few questions"
            );
        }
    }

    #[test]
    fn test_select_python_docker_five() {
        let bank = QuestionBank::new();
        let selected = bank.select(&stack(&["python", "docker"]), 5);

        assert_eq!(selected.len(), 5);
        assert!(selected.iter().any(|q| q.technology == "python"));
        assert!(selected.iter().any(|q| q.technology == "docker"));

        // No duplicates.
        for (i, q) in selected.iter().enumerate() {
            assert!(!selected[i + 1..].contains(q));
        }

        // Difficulty mix approximates 60/30/10: mostly basic, no more than
        // one advanced at this count.
        let basic = selected.iter().filter(|q| q.difficulty == Basic).count();
        let advanced = selected.iter().filter(|q| q.difficulty == Advanced).count();
        assert!(basic >= 2, "expected a basic-heavy mix, got {selected:?}");
        assert!(advanced <= 1);
    }

    #[test]
    fn test_select_orders_by_stack_then_difficulty() {
        let bank = QuestionBank::new();
        let selected = bank.select(&stack(&["docker", "python"]), 4);

        let techs: Vec<&str> = selected.iter().map(|q| q.technology.as_str()).collect();
        assert_eq!(techs, vec!["docker", "docker", "python", "python"]);
        for pair in selected.chunks(2) {
            assert!(pair[0].difficulty <= pair[1].difficulty);
        }
    }

    #[test]
    fn test_select_caps_at_available_questions() {
        let bank = QuestionBank::new();
        let selected = bank.select(&stack(&["git"]), 50);
        assert_eq!(selected.len(), bank.questions_for("git").len());
    }

    #[test]
    fn test_select_more_techs_than_count_takes_first_techs() {
        let bank = QuestionBank::new();
        let selected = bank.select(&stack(&["python", "java", "sql", "aws", "git", "react"]), 5);
        assert_eq!(selected.len(), 5);
        let techs: Vec<&str> = selected.iter().map(|q| q.technology.as_str()).collect();
        assert_eq!(techs, vec!["python", "java", "sql", "aws", "git"]);
    }

    #[test]
    fn test_select_is_deterministic() {
        let bank = QuestionBank::new();
        let s = stack(&["javascript", "kubernetes", "sql"]);
        assert_eq!(bank.select(&s, 5), bank.select(&s, 5));
    }

    #[test]
    fn test_select_skips_unknown_technologies() {
        let bank = QuestionBank::new();
        let selected = bank.select(&stack(&["cobol", "python"]), 3);
        assert_eq!(selected.len(), 3);
        assert!(selected.iter().all(|q| q.technology == "python"));
    }

    #[test]
    fn test_select_empty_stack_returns_nothing() {
        let bank = QuestionBank::new();
        assert!(bank.select(&[], 5).is_empty());
        assert!(bank.select(&stack(&["cobol"]), 5).is_empty());
    }

    #[test]
    fn test_single_question_is_basic() {
        let bank = QuestionBank::new();
        let selected = bank.select(&stack(&["python"]), 1);
        assert_eq!(selected.len(), 1);
        assert_eq!(selected[0].difficulty, Basic);
    }
}
