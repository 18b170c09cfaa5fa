//! Requests understood by the task backend used by the form-based screen.
//!
//! Only request descriptors live here; sending them is left to whatever HTTP
//! transport the caller has. The chat session never touches the backend.

use crate::error::AppError;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use time::format_description::well_known::Rfc3339;
use time::{OffsetDateTime, UtcOffset};
use url::Url;

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Priority {
    Low,
    #[default]
    Medium,
    High,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RecurringInterval {
    Daily,
    Weekly,
    Monthly,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RemoteStatus {
    Pending,
    Completed,
}

impl Priority {
    pub fn parse(raw: &str) -> Result<Self, AppError> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "low" => Ok(Self::Low),
            "medium" => Ok(Self::Medium),
            "high" => Ok(Self::High),
            other => Err(AppError::invalid_input(format!("unknown priority '{other}'"))),
        }
    }
}

impl RecurringInterval {
    /// `none` and blank mean "not recurring".
    pub fn parse(raw: &str) -> Result<Option<Self>, AppError> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "" | "none" => Ok(None),
            "daily" => Ok(Some(Self::Daily)),
            "weekly" => Ok(Some(Self::Weekly)),
            "monthly" => Ok(Some(Self::Monthly)),
            other => Err(AppError::invalid_input(format!(
                "unknown recurring interval '{other}'"
            ))),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Method {
    Get,
    Post,
    Put,
    Patch,
    Delete,
}

impl Method {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Get => "GET",
            Self::Post => "POST",
            Self::Put => "PUT",
            Self::Patch => "PATCH",
            Self::Delete => "DELETE",
        }
    }
}

/// List filters as entered in the filter bar. Blank values are dropped from
/// the query string.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct TaskFilter {
    pub status: Option<String>,
    pub priority: Option<String>,
    pub search: Option<String>,
    pub sort: Option<String>,
}

impl TaskFilter {
    pub fn query_pairs(&self) -> Vec<(&'static str, String)> {
        [
            ("status", &self.status),
            ("priority", &self.priority),
            ("search", &self.search),
            ("sort", &self.sort),
        ]
        .into_iter()
        .filter_map(|(key, value)| {
            value
                .as_deref()
                .map(str::trim)
                .filter(|value| !value.is_empty())
                .map(|value| (key, value.to_string()))
        })
        .collect()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewTask {
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub priority: Priority,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub due_date: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tags: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub recurring_interval: Option<RecurringInterval>,
}

impl NewTask {
    pub fn new<T: Into<String>>(title: T) -> Self {
        Self {
            title: title.into(),
            description: String::new(),
            priority: Priority::default(),
            due_date: None,
            tags: None,
            recurring_interval: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ApiRequest {
    pub method: Method,
    /// Unencoded path segments below the base URL.
    pub segments: Vec<String>,
    pub query: Vec<(&'static str, String)>,
    pub body: Option<Value>,
}

impl ApiRequest {
    fn new(method: Method, segments: Vec<String>) -> Self {
        Self {
            method,
            segments,
            query: Vec::new(),
            body: None,
        }
    }

    /// Resolves the request against `base_url`. Segments are appended to any
    /// path the base already carries.
    pub fn url(&self, base_url: &str) -> Result<Url, AppError> {
        let mut url = Url::parse(base_url.trim()).map_err(|err| {
            AppError::invalid_input(format!("invalid api base url '{base_url}': {err}"))
        })?;

        url.path_segments_mut()
            .map_err(|_| {
                AppError::invalid_input(format!("api base url '{base_url}' cannot have a path"))
            })?
            .pop_if_empty()
            .extend(&self.segments);

        if !self.query.is_empty() {
            url.query_pairs_mut().extend_pairs(
                self.query
                    .iter()
                    .map(|(key, value)| (*key, value.as_str())),
            );
        }

        Ok(url)
    }
}

fn tasks_segments(user_id: &str) -> Result<Vec<String>, AppError> {
    let trimmed = user_id.trim();
    if trimmed.is_empty() {
        return Err(AppError::invalid_input("user id is required"));
    }
    Ok(vec!["api".into(), trimmed.to_string(), "tasks".into()])
}

fn task_segments(user_id: &str, task_id: &str) -> Result<Vec<String>, AppError> {
    let trimmed_id = task_id.trim();
    if trimmed_id.is_empty() {
        return Err(AppError::invalid_input("id is required"));
    }
    let mut segments = tasks_segments(user_id)?;
    segments.push(trimmed_id.to_string());
    Ok(segments)
}

/// Accepts any RFC3339 timestamp and re-renders it in UTC, the form the
/// backend stores.
pub fn normalize_due_date(raw: &str) -> Result<String, AppError> {
    let parsed = OffsetDateTime::parse(raw.trim(), &Rfc3339)
        .map_err(|_| AppError::invalid_input("due_date must be RFC3339"))?;
    parsed
        .to_offset(UtcOffset::UTC)
        .format(&Rfc3339)
        .map_err(|err| AppError::invalid_data(err.to_string()))
}

pub fn list_tasks(user_id: &str, filter: &TaskFilter) -> Result<ApiRequest, AppError> {
    let mut request = ApiRequest::new(Method::Get, tasks_segments(user_id)?);
    request.query = filter.query_pairs();
    Ok(request)
}

pub fn create_task(user_id: &str, task: &NewTask) -> Result<ApiRequest, AppError> {
    if task.title.trim().is_empty() {
        return Err(AppError::invalid_input("title is required"));
    }

    let mut task = task.clone();
    task.due_date = task
        .due_date
        .as_deref()
        .map(normalize_due_date)
        .transpose()?;

    let mut request = ApiRequest::new(Method::Post, tasks_segments(user_id)?);
    request.body = Some(serde_json::to_value(&task)?);
    Ok(request)
}

pub fn complete_task(user_id: &str, task_id: &str) -> Result<ApiRequest, AppError> {
    let mut segments = task_segments(user_id, task_id)?;
    segments.push("complete".into());
    Ok(ApiRequest::new(Method::Patch, segments))
}

pub fn reopen_task(user_id: &str, task_id: &str) -> Result<ApiRequest, AppError> {
    let mut request = ApiRequest::new(Method::Put, task_segments(user_id, task_id)?);
    request.body = Some(serde_json::json!({ "status": RemoteStatus::Pending }));
    Ok(request)
}

pub fn delete_task(user_id: &str, task_id: &str) -> Result<ApiRequest, AppError> {
    Ok(ApiRequest::new(Method::Delete, task_segments(user_id, task_id)?))
}
