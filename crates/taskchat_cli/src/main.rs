use clap::Parser;
use std::io::{self, BufRead, Write};
use std::time::Duration;
use tabled::{Table, Tabled};
use taskchat_cli::cli::{Cli, Command, RequestCommand, collect_overrides};
use taskchat_core::api::{self, ApiRequest, NewTask, Priority, RecurringInterval, TaskFilter};
use taskchat_core::config::{Config, Palette, load_config_with_fallback, merge_overrides};
use taskchat_core::error::AppError;
use taskchat_core::interpreter;
use taskchat_core::model::{ConversationEntry, Role, Task};
use taskchat_core::session::ChatSession;
use tracing_subscriber::EnvFilter;

const LOG_ENV_VAR: &str = "TASKCHAT_LOG";

const CHAT_HELP: &str = "\
Usage: type a request and press enter.

  add <text>        add a task (\"create\" works too)
  complete <n>      mark task number n as completed (\"done\" works too)
  delete <n>        delete task number n (\"remove\" works too)
  list              list your tasks (\"show\" works too)

  /tasks            show the task sidebar
  /toggle <id>      flip a task between pending and completed
  /remove <id>      remove a task by id
  /history          reprint the conversation
  help, ?           show this help
  exit, quit        leave the chat";

#[derive(Tabled)]
struct TaskRow {
    #[tabled(rename = "#")]
    position: usize,
    id: String,
    text: String,
    status: &'static str,
    created: String,
}

fn init_tracing() {
    let filter = EnvFilter::try_from_env(LOG_ENV_VAR).unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .init();
}

fn normalize_parse_error(err: clap::Error) -> AppError {
    let rendered = err.to_string();
    let first_line = rendered.lines().next().unwrap_or("invalid command").trim();
    let message = first_line
        .strip_prefix("error: ")
        .unwrap_or(first_line)
        .to_string();
    AppError::invalid_input(message)
}

fn load_config(raw_overrides: &[String]) -> Result<Config, AppError> {
    let overrides = collect_overrides(raw_overrides)?;
    let loaded = load_config_with_fallback();
    let config = merge_overrides(&loaded.config, &overrides);
    tracing::debug!(
        theme = ?config.theme,
        aliases = config.aliases.len(),
        reply_delay_ms = config.reply_delay_ms,
        "configuration loaded"
    );
    Ok(config)
}

fn render_entry(entry: &ConversationEntry, palette: &Palette) -> String {
    let label = match entry.role {
        Role::User => palette.mutedize(entry.role.label()),
        Role::Assistant => palette.accentize(entry.role.label()),
    };
    format!("[{}] {}: {}", entry.timestamp, label, entry.content)
}

fn print_entry(entry: &ConversationEntry, palette: &Palette) {
    println!("{}", render_entry(entry, palette));
}

fn print_task_table(session: &ChatSession) {
    if session.tasks().is_empty() {
        println!("No tasks yet");
        return;
    }

    let rows = session
        .tasks()
        .iter()
        .enumerate()
        .map(|(index, task)| TaskRow {
            position: index + 1,
            id: task.id.clone(),
            text: task.text.clone(),
            status: task.status_label(),
            created: task.created_at.clone(),
        });
    println!("{}", Table::new(rows));

    let summary = session.summary();
    println!("Tasks: {} | Completed: {}", summary.total, summary.completed);
}

fn print_task_change(verb: &str, task: &Task) {
    println!("{verb} task: {} ({}) - {}", task.text, task.id, task.status_label());
}

fn run_sidebar_command(
    line: &str,
    session: &mut ChatSession,
    palette: &Palette,
) -> Result<(), AppError> {
    let mut parts = line.split_whitespace();
    let command = parts.next().unwrap_or_default();
    let argument = parts.next().unwrap_or_default();

    match command {
        "tasks" => print_task_table(session),
        "toggle" => {
            let task = session.toggle_task(argument)?;
            print_task_change("Toggled", &task);
        }
        "remove" => {
            let task = session.remove_task(argument)?;
            print_task_change("Removed", &task);
        }
        "history" => {
            for entry in session.messages() {
                print_entry(entry, palette);
            }
        }
        other => {
            return Err(AppError::invalid_input(format!(
                "unknown command '/{other}'"
            )));
        }
    }

    Ok(())
}

fn pause(config: &Config) {
    if config.reply_delay_ms > 0 {
        std::thread::sleep(Duration::from_millis(config.reply_delay_ms));
    }
}

fn run_interactive(config: &Config) -> Result<(), AppError> {
    let palette = config.palette();
    let mut session = ChatSession::new();
    for entry in session.messages() {
        print_entry(entry, &palette);
    }

    let mut input = String::new();
    let stdin = io::stdin();
    let mut stdin_lock = stdin.lock();

    loop {
        io::stdout().flush()?;
        input.clear();
        let bytes = stdin_lock.read_line(&mut input)?;

        if bytes == 0 {
            break;
        }

        let line = input.trim_end_matches(['\r', '\n']);
        let trimmed = line.trim();
        if trimmed.is_empty() {
            continue;
        }

        if trimmed.eq_ignore_ascii_case("exit") || trimmed.eq_ignore_ascii_case("quit") {
            break;
        }

        if trimmed == "help" || trimmed == "?" {
            println!("{CHAT_HELP}");
            continue;
        }

        if let Some(sidebar) = trimmed.strip_prefix('/') {
            if let Err(err) = run_sidebar_command(sidebar, &mut session, &palette) {
                eprintln!("ERROR: {}", err);
            }
            continue;
        }

        let message = config.expand_alias(line);
        pause(config);
        if session.submit(message).is_some()
            && let Some(reply) = session.messages().last()
        {
            print_entry(reply, &palette);
        }
    }

    Ok(())
}

fn run_messages(config: &Config, messages: &[String], json: bool) -> Result<(), AppError> {
    let mut session = ChatSession::new();
    for message in messages {
        session.submit(config.expand_alias(message));
    }

    if json {
        let payload = serde_json::json!({
            "messages": session.messages(),
            "tasks": session.tasks(),
            "summary": session.summary(),
        });
        println!("{}", serde_json::to_string_pretty(&payload)?);
    } else {
        let palette = config.palette();
        for entry in session.messages() {
            print_entry(entry, &palette);
        }
    }

    Ok(())
}

fn build_request(config: &Config, request: RequestCommand) -> Result<ApiRequest, AppError> {
    let user_id = config.user_id();
    match request {
        RequestCommand::List {
            status,
            priority,
            search,
            sort,
        } => {
            let filter = TaskFilter {
                status,
                priority,
                search,
                sort,
            };
            api::list_tasks(user_id, &filter)
        }
        RequestCommand::Create {
            title,
            description,
            priority,
            due_date,
            tags,
            recurring,
        } => {
            let task = NewTask {
                description,
                priority: Priority::parse(&priority)?,
                due_date: due_date.filter(|value| !value.trim().is_empty()),
                tags: tags.filter(|value| !value.trim().is_empty()),
                recurring_interval: match recurring {
                    Some(value) => RecurringInterval::parse(&value)?,
                    None => None,
                },
                ..NewTask::new(title)
            };
            api::create_task(user_id, &task)
        }
        RequestCommand::Complete { id } => api::complete_task(user_id, &id),
        RequestCommand::Reopen { id } => api::reopen_task(user_id, &id),
        RequestCommand::Delete { id } => api::delete_task(user_id, &id),
    }
}

fn print_request(config: &Config, request: &ApiRequest, json: bool) -> Result<(), AppError> {
    let url = request.url(config.api_base_url())?;
    if json {
        let payload = serde_json::json!({
            "method": request.method.as_str(),
            "url": url.as_str(),
            "body": request.body,
        });
        println!("{}", payload);
    } else {
        println!("{} {}", request.method.as_str(), url);
        if let Some(body) = request.body.as_ref() {
            println!("{}", serde_json::to_string_pretty(body)?);
        }
    }
    Ok(())
}

fn run_command(cli: Cli) -> Result<(), AppError> {
    let config = load_config(&cli.config_override)?;

    match cli.command.unwrap_or(Command::Chat) {
        Command::Chat => run_interactive(&config)?,
        Command::Run { messages } => run_messages(&config, &messages, cli.json)?,
        Command::Classify { message } => {
            let intent = interpreter::classify(config.expand_alias(&message));
            if cli.json {
                println!(
                    "{}",
                    serde_json::json!({ "input": message, "intent": intent })
                );
            } else {
                println!("{}", intent.name());
            }
        }
        Command::Request { request } => {
            let request = build_request(&config, request)?;
            print_request(&config, &request, cli.json)?;
        }
    }

    Ok(())
}

fn main() {
    init_tracing();

    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(err) if !err.use_stderr() => {
            print!("{err}");
            return;
        }
        Err(err) => {
            eprintln!("ERROR: {}", normalize_parse_error(err));
            std::process::exit(1);
        }
    };

    if let Err(err) = run_command(cli) {
        eprintln!("ERROR: {}", err);
        std::process::exit(1);
    }
}
