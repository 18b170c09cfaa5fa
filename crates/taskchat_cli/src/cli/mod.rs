use clap::{Parser, Subcommand};
use taskchat_core::config::{ConfigOverrides, canonical_key};
use taskchat_core::error::AppError;

#[derive(Parser, Debug)]
#[command(name = "taskchat", author, version, about, long_about = None)]
pub struct Cli {
    /// Defaults to an interactive chat when omitted
    #[command(subcommand)]
    pub command: Option<Command>,

    /// Output JSON
    #[arg(long, global = true)]
    pub json: bool,

    /// Override configuration values (format KEY=VALUE)
    #[arg(long = "config-override", value_name = "KEY=VALUE", global = true)]
    pub config_override: Vec<String>,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Chat with the task assistant
    ///
    /// Example: taskchat chat
    Chat,
    /// Send messages to a fresh session and print the transcript
    ///
    /// Example: taskchat run "add buy milk" "complete 1" "list"
    Run {
        #[arg(required = true, value_name = "MESSAGE")]
        messages: Vec<String>,
    },
    /// Show which intent a message is understood as
    ///
    /// Example: taskchat classify "add this to my list"
    Classify { message: String },
    /// Print the backend request for a task operation
    ///
    /// Example: taskchat request list --status pending
    Request {
        #[command(subcommand)]
        request: RequestCommand,
    },
}

#[derive(Subcommand, Debug)]
pub enum RequestCommand {
    /// List tasks
    ///
    /// Example: taskchat request list --priority high --sort due_date
    List {
        #[arg(long)]
        status: Option<String>,
        #[arg(long)]
        priority: Option<String>,
        #[arg(long)]
        search: Option<String>,
        #[arg(long)]
        sort: Option<String>,
    },
    /// Create a task
    ///
    /// Example: taskchat request create "Buy groceries" --priority high --tags home
    Create {
        title: String,
        #[arg(long, default_value = "")]
        description: String,
        #[arg(long, default_value = "medium")]
        priority: String,
        #[arg(long, value_name = "RFC3339")]
        due_date: Option<String>,
        #[arg(long)]
        tags: Option<String>,
        #[arg(long, value_name = "INTERVAL")]
        recurring: Option<String>,
    },
    /// Mark a task as completed
    Complete { id: String },
    /// Set a completed task back to pending
    Reopen { id: String },
    /// Delete a task
    Delete { id: String },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigOverrideTarget {
    Theme,
    Alias(String),
    ReplyDelay,
    UserId,
    ApiBaseUrl,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedConfigOverride {
    pub target: ConfigOverrideTarget,
    pub value: String,
}

/// Parse a raw `KEY=VALUE` override string into a structured target.
pub fn parse_config_override(raw: &str) -> Result<ParsedConfigOverride, String> {
    let trimmed = raw.trim();
    let (key_raw, value_raw) = trimmed
        .split_once('=')
        .ok_or_else(|| "override must be in KEY=VALUE format".to_string())?;

    let value = value_raw.trim().to_string();
    let (field, remainder) = key_raw
        .split_once('.')
        .map(|(field, rest)| (field.trim(), Some(rest.trim())))
        .unwrap_or((key_raw.trim(), None));

    let canonical_field =
        canonical_key(field).ok_or_else(|| "override key cannot be empty".to_string())?;

    let scalar = |target: ConfigOverrideTarget| {
        if remainder.is_some() {
            Err(format!("{canonical_field} override cannot have subfields"))
        } else {
            Ok(ParsedConfigOverride {
                target,
                value: value.clone(),
            })
        }
    };

    match canonical_field.as_str() {
        "theme" => scalar(ConfigOverrideTarget::Theme),
        "reply_delay_ms" | "reply_delay" | "delay" => scalar(ConfigOverrideTarget::ReplyDelay),
        "user_id" | "user" => scalar(ConfigOverrideTarget::UserId),
        "api_base_url" | "api_url" => scalar(ConfigOverrideTarget::ApiBaseUrl),
        "aliases" | "alias" => {
            let alias_name = remainder
                .filter(|segment| !segment.is_empty())
                .ok_or_else(|| "aliases override requires an alias name".to_string())?;
            Ok(ParsedConfigOverride {
                target: ConfigOverrideTarget::Alias(alias_name.to_string()),
                value: value.clone(),
            })
        }
        other => Err(format!("unknown config field '{other}'")),
    }
}

/// Folds every `--config-override` value into one set of overrides; later
/// values win.
pub fn collect_overrides(raw: &[String]) -> Result<ConfigOverrides, AppError> {
    let mut overrides = ConfigOverrides::default();

    for entry in raw {
        let parsed = parse_config_override(entry).map_err(AppError::invalid_input)?;
        match parsed.target {
            ConfigOverrideTarget::Theme => overrides.theme = Some(parsed.value),
            ConfigOverrideTarget::Alias(name) => {
                overrides.aliases.insert(name, parsed.value);
            }
            ConfigOverrideTarget::ReplyDelay => {
                let delay = parsed.value.parse::<u64>().map_err(|_| {
                    AppError::invalid_input("reply_delay_ms must be a whole number of milliseconds")
                })?;
                overrides.reply_delay_ms = Some(delay);
            }
            ConfigOverrideTarget::UserId => overrides.user_id = Some(parsed.value),
            ConfigOverrideTarget::ApiBaseUrl => overrides.api_base_url = Some(parsed.value),
        }
    }

    Ok(overrides)
}
