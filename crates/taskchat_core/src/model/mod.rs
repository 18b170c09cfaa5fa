mod conversation;
mod task;

pub use conversation::{ConversationEntry, Role};
pub use task::{Task, TaskSummary};
