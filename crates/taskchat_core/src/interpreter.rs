//! Free-text command interpretation.
//!
//! Commands are classified by case-insensitive keyword containment against a
//! ranked rule table. The first rule whose keywords appear anywhere in the
//! input wins, so "add this to my list" is an `add` and never a `list`.
//!
//! Interpretation is pure: the caller receives a [`Mutation`] describing what
//! to change in its task collection plus the reply text, and applies both
//! itself.

use crate::model::Task;
use regex::Regex;
use serde::Serialize;
use std::sync::OnceLock;

pub const ADD_PROMPT: &str = "What task would you like to add?";
pub const COMPLETE_PROMPT: &str =
    "Which task would you like to mark as completed? Please specify the task number.";
pub const DELETE_PROMPT: &str =
    "Which task would you like to delete? Please specify the task number.";
pub const EMPTY_LIST_REPLY: &str = "You have no tasks yet. Add some tasks!";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Intent {
    Add,
    Complete,
    Delete,
    List,
    Unknown,
}

impl Intent {
    pub fn name(self) -> &'static str {
        match self {
            Self::Add => "add",
            Self::Complete => "complete",
            Self::Delete => "delete",
            Self::List => "list",
            Self::Unknown => "unknown",
        }
    }
}

/// Change the caller must make to its task collection. Indices are 0-based
/// positions in the slice that was interpreted against.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Mutation {
    None,
    Append { text: String },
    Complete { index: usize },
    Remove { index: usize },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Interpretation {
    pub intent: Intent,
    pub mutation: Mutation,
    pub reply: String,
}

type Handler = fn(&str, &[Task]) -> (Mutation, String);

pub struct Rule {
    pub intent: Intent,
    pub keywords: &'static [&'static str],
    handler: Handler,
}

impl Rule {
    /// `lowered` must already be lowercased.
    pub fn matches(&self, lowered: &str) -> bool {
        self.keywords.iter().any(|keyword| lowered.contains(keyword))
    }

    pub fn apply(&self, input: &str, tasks: &[Task]) -> Interpretation {
        let (mutation, reply) = (self.handler)(input, tasks);
        Interpretation {
            intent: self.intent,
            mutation,
            reply,
        }
    }
}

/// Evaluated top to bottom; order is the tie-break between overlapping keywords.
pub const RULES: &[Rule] = &[
    Rule {
        intent: Intent::Add,
        keywords: &["add", "create"],
        handler: handle_add,
    },
    Rule {
        intent: Intent::Complete,
        keywords: &["complete", "done"],
        handler: handle_complete,
    },
    Rule {
        intent: Intent::Delete,
        keywords: &["delete", "remove"],
        handler: handle_delete,
    },
    Rule {
        intent: Intent::List,
        keywords: &["list", "show"],
        handler: handle_list,
    },
];

fn matching_rule(input: &str) -> Option<&'static Rule> {
    let lowered = input.to_lowercase();
    RULES.iter().find(|rule| rule.matches(&lowered))
}

pub fn classify(input: &str) -> Intent {
    matching_rule(input)
        .map(|rule| rule.intent)
        .unwrap_or(Intent::Unknown)
}

pub fn interpret(input: &str, tasks: &[Task]) -> Interpretation {
    match matching_rule(input) {
        Some(rule) => rule.apply(input, tasks),
        None => Interpretation {
            intent: Intent::Unknown,
            mutation: Mutation::None,
            reply: unknown_reply(input),
        },
    }
}

fn add_keywords() -> &'static Regex {
    static ADD_KEYWORDS: OnceLock<Regex> = OnceLock::new();
    ADD_KEYWORDS.get_or_init(|| Regex::new(r"(?i-u)add|create|task").expect("regex"))
}

/// Drops every `add`, `create` and `task` occurrence, even mid-word, then trims.
/// Case folding is ASCII only, so `ſ` and the Kelvin sign are left alone.
pub fn strip_add_keywords(input: &str) -> String {
    add_keywords().replace_all(input, "").trim().to_string()
}

/// First run of ASCII digits anywhere in `input`. Numbers too large for
/// `u64` count as absent.
pub fn extract_number(input: &str) -> Option<u64> {
    let start = input.find(|ch: char| ch.is_ascii_digit())?;
    let rest = &input[start..];
    let end = rest
        .find(|ch: char| !ch.is_ascii_digit())
        .unwrap_or(rest.len());
    rest[..end].parse().ok()
}

/// 0-based index referenced by the first number in `input`.
pub fn extract_index(input: &str) -> Option<usize> {
    let number = extract_number(input)?;
    usize::try_from(number).ok()?.checked_sub(1)
}

pub fn resolve_index(input: &str, len: usize) -> Option<usize> {
    extract_index(input).filter(|index| *index < len)
}

fn handle_add(input: &str, _tasks: &[Task]) -> (Mutation, String) {
    let text = strip_add_keywords(input);
    if text.is_empty() {
        return (Mutation::None, ADD_PROMPT.to_string());
    }

    let reply = format!("Added \"{text}\" to your tasks!");
    (Mutation::Append { text }, reply)
}

fn handle_complete(input: &str, tasks: &[Task]) -> (Mutation, String) {
    match resolve_index(input, tasks.len()) {
        Some(index) => (
            Mutation::Complete { index },
            format!("Marked \"{}\" as completed!", tasks[index].text),
        ),
        None => (Mutation::None, COMPLETE_PROMPT.to_string()),
    }
}

fn handle_delete(input: &str, tasks: &[Task]) -> (Mutation, String) {
    match resolve_index(input, tasks.len()) {
        Some(index) => (
            Mutation::Remove { index },
            format!("Deleted \"{}\" from your tasks.", tasks[index].text),
        ),
        None => (Mutation::None, DELETE_PROMPT.to_string()),
    }
}

fn handle_list(_input: &str, tasks: &[Task]) -> (Mutation, String) {
    (Mutation::None, format_task_list(tasks))
}

pub fn format_task_list(tasks: &[Task]) -> String {
    if tasks.is_empty() {
        return EMPTY_LIST_REPLY.to_string();
    }

    let mut lines = Vec::with_capacity(tasks.len() + 1);
    lines.push(format!("You have {} tasks:", tasks.len()));
    for (position, task) in tasks.iter().enumerate() {
        let status = if task.completed {
            "✓ Completed"
        } else {
            "○ Pending"
        };
        lines.push(format!("{}. {} - {}", position + 1, task.text, status));
    }
    lines.join("\n")
}

pub fn unknown_reply(input: &str) -> String {
    format!(
        "I understood: \"{input}\". You can ask me to add, complete, delete, or list your tasks!"
    )
}
