use playbook_core::types::HttpReply;
use playbook_core::MissingVariable;
use playbook_exec::ExecutorStep;
use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum OutputFormat {
    Text,
    /// One JSON object per line.
    Json,
}

pub fn print_result<T: Serialize>(format: OutputFormat, quiet: bool, result: &T) {
    if quiet {
        return;
    }
    match format {
        OutputFormat::Text => {
            if let Ok(json) = serde_json::to_string_pretty(result) {
                println!("{json}");
            }
        }
        OutputFormat::Json => {
            if let Ok(json) = serde_json::to_string(result) {
                println!("{json}");
            }
        }
    }
}

pub fn print_error(format: OutputFormat, quiet: bool, message: &str) {
    if quiet {
        return;
    }
    match format {
        OutputFormat::Text => eprintln!("error: {message}"),
        OutputFormat::Json => {
            let err = serde_json::json!({"error": message});
            eprintln!("{}", serde_json::to_string(&err).unwrap_or_default());
        }
    }
}

/// Prints one trace event; nested credential playbooks are indented in text mode.
pub fn print_step(format: OutputFormat, quiet: bool, depth: usize, step: &ExecutorStep) {
    if quiet {
        return;
    }
    match format {
        OutputFormat::Text => println!("{}{}", "  ".repeat(depth), step_line(step)),
        OutputFormat::Json => {
            if let Ok(json) = serde_json::to_string(step) {
                println!("{json}");
            }
        }
    }
}

/// Tracks playbook nesting from the start and end events of a trace.
#[derive(Debug, Default)]
pub struct Nesting {
    open: usize,
}

impl Nesting {
    /// Indentation level for `step`.
    pub fn depth_of(&mut self, step: &ExecutorStep) -> usize {
        let depth = self.open;
        match step {
            ExecutorStep::PlaybookStarted { .. } => self.open += 1,
            ExecutorStep::PlaybookFinished | ExecutorStep::PlaybookAborted { .. } => {
                self.open = self.open.saturating_sub(1);
                return self.open;
            }
            // A failed stage ends its playbook without an end event.
            ExecutorStep::HttpRequestPrepareError { .. }
            | ExecutorStep::HttpErrorReceived { .. }
            | ExecutorStep::ResponseProcessingError { .. } => {
                self.open = self.open.saturating_sub(1);
            }
            _ => {}
        }
        depth
    }
}

/// Single-line text rendering. Credential values are never printed here.
pub fn step_line(step: &ExecutorStep) -> String {
    let name = step.name();
    match step {
        ExecutorStep::PlaybookStarted { name: playbook } => format!("{name} {playbook}"),
        ExecutorStep::RequestStarted { reference } => format!("{name} {reference}"),
        ExecutorStep::AuthStarted { name: auth }
        | ExecutorStep::CredentialRetrievedFromCache { name: auth, .. } => format!("{name} {auth}"),
        ExecutorStep::CredentialVariablesSubstituted {
            name: auth, missing, ..
        } => format!("{name} {auth}{}", missing_suffix(missing)),
        ExecutorStep::PayloadVariablesSubstituted { missing, .. } => {
            format!("{name}{}", missing_suffix(missing))
        }
        ExecutorStep::HttpRequestPrepared { request, .. } => {
            format!("{name} {} {}", request.method, request.url)
        }
        ExecutorStep::HttpResponseReceived { response } => match response {
            HttpReply::Response(r) => format!("{name} {}", r.status_code),
            HttpReply::Mock => format!("{name} (mock)"),
        },
        ExecutorStep::VariablesAssigned { assignments } => {
            let names: Vec<&str> = assignments
                .assignments
                .iter()
                .map(|a| a.name.as_str())
                .collect();
            if names.is_empty() {
                name.to_string()
            } else {
                format!("{name} {}", names.join(", "))
            }
        }
        ExecutorStep::PlaybookAborted { error }
        | ExecutorStep::AuthAborted { error }
        | ExecutorStep::HttpRequestPrepareError { error }
        | ExecutorStep::ResponseProcessingError { error } => format!("{name}: {error}"),
        ExecutorStep::HttpErrorReceived { error } => format!("{name}: {error}"),
        ExecutorStep::PlaybookFinished | ExecutorStep::AuthFinished => name.to_string(),
    }
}

fn missing_suffix(missing: &[MissingVariable]) -> String {
    if missing.is_empty() {
        return String::new();
    }
    format!(" (missing: {})", playbook_core::missing_variable_names(missing))
}
