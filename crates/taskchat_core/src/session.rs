use crate::error::AppError;
use crate::interpreter::{self, Interpretation, Mutation};
use crate::model::{ConversationEntry, Role, Task, TaskSummary};
use time::macros::format_description;
use time::{OffsetDateTime, UtcOffset};

pub const GREETING: &str =
    "Hello! I'm your Task Master. How can I help you manage your tasks today?";

/// Owner of the task collection and the conversation log. Commands are
/// processed one at a time; the interpreter only ever sees a borrowed
/// snapshot of `tasks`.
#[derive(Debug, Clone)]
pub struct ChatSession {
    tasks: Vec<Task>,
    messages: Vec<ConversationEntry>,
    last_id_nanos: i128,
}

impl Default for ChatSession {
    fn default() -> Self {
        Self::new()
    }
}

impl ChatSession {
    pub fn new() -> Self {
        Self::with_tasks(Vec::new())
    }

    pub fn with_tasks(tasks: Vec<Task>) -> Self {
        let greeting = ConversationEntry {
            role: Role::Assistant,
            content: GREETING.to_string(),
            timestamp: clock_time(),
        };

        Self {
            tasks,
            messages: vec![greeting],
            last_id_nanos: 0,
        }
    }

    pub fn tasks(&self) -> &[Task] {
        &self.tasks
    }

    pub fn messages(&self) -> &[ConversationEntry] {
        &self.messages
    }

    pub fn summary(&self) -> TaskSummary {
        TaskSummary::of(&self.tasks)
    }

    /// Runs one command through the interpreter and records both sides of the
    /// exchange. Blank input is ignored and leaves the session untouched.
    pub fn submit(&mut self, input: &str) -> Option<Interpretation> {
        if input.trim().is_empty() {
            return None;
        }

        self.push_message(Role::User, input.to_string());

        let interpretation = interpreter::interpret(input, &self.tasks);
        tracing::debug!(
            intent = interpretation.intent.name(),
            mutation = ?interpretation.mutation,
            "interpreted command"
        );

        self.apply(&interpretation.mutation);
        self.push_message(Role::Assistant, interpretation.reply.clone());

        Some(interpretation)
    }

    /// Applies a mutation produced against the current collection and returns
    /// the task it touched. Out-of-range indices are ignored.
    pub fn apply(&mut self, mutation: &Mutation) -> Option<Task> {
        match mutation {
            Mutation::None => None,
            Mutation::Append { text } => {
                let task = Task {
                    id: self.next_id(),
                    text: text.clone(),
                    completed: false,
                    created_at: clock_time(),
                };
                tracing::debug!(task_id = %task.id, "appended task");
                self.tasks.push(task.clone());
                Some(task)
            }
            Mutation::Complete { index } => {
                let task = self.tasks.get_mut(*index)?;
                task.completed = true;
                Some(task.clone())
            }
            Mutation::Remove { index } => {
                if *index >= self.tasks.len() {
                    return None;
                }
                let removed = self.tasks.remove(*index);
                tracing::debug!(task_id = %removed.id, "removed task");
                Some(removed)
            }
        }
    }

    /// Flips completion for the task with `id`. Unlike the `complete` command
    /// this can reopen a task.
    pub fn toggle_task(&mut self, id: &str) -> Result<Task, AppError> {
        let trimmed_id = id.trim();
        if trimmed_id.is_empty() {
            return Err(AppError::invalid_input("id is required"));
        }

        let task = self
            .tasks
            .iter_mut()
            .find(|task| task.id == trimmed_id)
            .ok_or_else(|| AppError::invalid_input("task not found"))?;
        task.completed = !task.completed;

        Ok(task.clone())
    }

    pub fn remove_task(&mut self, id: &str) -> Result<Task, AppError> {
        let trimmed_id = id.trim();
        if trimmed_id.is_empty() {
            return Err(AppError::invalid_input("id is required"));
        }

        let index = self
            .tasks
            .iter()
            .position(|task| task.id == trimmed_id)
            .ok_or_else(|| AppError::invalid_input("task not found"))?;

        Ok(self.tasks.remove(index))
    }

    fn push_message(&mut self, role: Role, content: String) {
        self.messages.push(ConversationEntry {
            role,
            content,
            timestamp: clock_time(),
        });
    }

    fn next_id(&mut self) -> String {
        let now = OffsetDateTime::now_utc().unix_timestamp_nanos();
        let nanos = now.max(self.last_id_nanos + 1);
        self.last_id_nanos = nanos;
        format!("task-{nanos}")
    }
}

fn local_offset() -> UtcOffset {
    UtcOffset::current_local_offset().unwrap_or(UtcOffset::UTC)
}

/// Wall-clock `HH:MM` in the local offset, as shown next to messages and tasks.
pub fn clock_time() -> String {
    let now = OffsetDateTime::now_utc().to_offset(local_offset());
    now.format(format_description!("[hour]:[minute]"))
        .unwrap_or_else(|_| "--:--".to_string())
}
