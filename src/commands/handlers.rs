//! Clipstack - Command handlers
//!
//! Text commands a presentation process sends to the engine, one per line

use serde::Serialize;
use serde_json::Value;

use crate::clipboard::ClipboardItemView;
use crate::engine::Engine;

/// Command execution result
#[derive(Debug, Serialize)]
pub struct CommandResult<T> {
    pub success: bool,
    pub data: Option<T>,
    pub error: Option<String>,
}

impl<T> CommandResult<T> {
    pub fn ok(data: T) -> Self {
        Self {
            success: true,
            data: Some(data),
            error: None,
        }
    }

    pub fn err(error: String) -> Self {
        Self {
            success: false,
            data: None,
            error: Some(error),
        }
    }
}

/// Outcome of handling one command line
#[derive(Debug)]
pub enum Reply {
    /// Send this back to the presenter
    Result(CommandResult<Value>),
    /// Shut the engine down
    Quit,
}

/// Parse and execute one command line
///
/// - `list` -> current history views
/// - `promote <index>` -> restore entry to the clipboard and move it to the top
/// - `delete <index>` / `clear`
/// - `pause` / `resume`
/// - `quit`
pub fn handle_command(engine: &Engine, line: &str) -> Reply {
    let mut parts = line.split_whitespace();
    let cmd = parts.next().unwrap_or("").to_lowercase();
    let arg = parts.next();

    let result = match cmd.as_str() {
        "list" => get_clipboard_history(engine),
        "promote" => with_index(arg, |index| promote_item(engine, index)),
        "delete" => with_index(arg, |index| delete_item(engine, index)),
        "clear" => clear_all_history(engine),
        "pause" => {
            engine.pause();
            CommandResult::ok(Value::Bool(true))
        }
        "resume" => {
            engine.resume();
            CommandResult::ok(Value::Bool(true))
        }
        "quit" | "exit" => return Reply::Quit,
        "" => CommandResult::err("Empty command".to_string()),
        other => CommandResult::err(format!("Unknown command: {}", other)),
    };
    Reply::Result(result)
}

/// Get clipboard history list
pub fn get_clipboard_history(engine: &Engine) -> CommandResult<Value> {
    views_result(engine.snapshot().views())
}

/// Promote an entry and restore it to the clipboard
pub fn promote_item(engine: &Engine, index: usize) -> CommandResult<Value> {
    match engine.request_promote(index) {
        Ok(snapshot) => views_result(snapshot.views()),
        Err(e) => CommandResult::err(format!("Failed to promote item: {}", e)),
    }
}

/// Delete specified entry
pub fn delete_item(engine: &Engine, index: usize) -> CommandResult<Value> {
    match engine.remove(index) {
        Ok(snapshot) => views_result(snapshot.views()),
        Err(e) => CommandResult::err(format!("Failed to delete item: {}", e)),
    }
}

/// Clear all history entries
pub fn clear_all_history(engine: &Engine) -> CommandResult<Value> {
    views_result(engine.clear().views())
}

/// Render a result as a single JSON line tagged `command_result`
pub fn reply_line(result: &CommandResult<Value>) -> String {
    #[derive(Serialize)]
    struct Line<'a> {
        event: &'static str,
        #[serde(flatten)]
        result: &'a CommandResult<Value>,
    }

    serde_json::to_string(&Line {
        event: "command_result",
        result,
    })
    .unwrap_or_else(|e| format!(r#"{{"event":"command_result","success":false,"error":"{}"}}"#, e))
}

fn with_index<F>(arg: Option<&str>, f: F) -> CommandResult<Value>
where
    F: FnOnce(usize) -> CommandResult<Value>,
{
    match arg.map(str::parse::<usize>) {
        Some(Ok(index)) => f(index),
        Some(Err(_)) => CommandResult::err(format!("Invalid index: {}", arg.unwrap_or_default())),
        None => CommandResult::err("Missing index".to_string()),
    }
}

fn views_result(views: Vec<ClipboardItemView>) -> CommandResult<Value> {
    match serde_json::to_value(views) {
        Ok(value) => CommandResult::ok(value),
        Err(e) => CommandResult::err(format!("Failed to serialize history: {}", e)),
    }
}
