//! # Smoke Scenarios
//!
//! Built-in prompts sent to the server, and the checks computed from each
//! response. Every ✅/❌ line printed here comes from an evaluated check.

use tracing::{info, warn};

use crate::client::SmokeClient;
use crate::error::SmokeError;
use crate::probe::{extract_message_content, looks_like_json};
use crate::schemas::{ChatResponse, Message};
use crate::Result;

const SIMPLE_JSON_SYSTEM: &str =
    "You are a helpful assistant. Respond with a simple JSON object with a 'result' field.";

const AGENT_FORMAT_SYSTEM: &str = "You are an AI agent. When you need to use a tool, respond with JSON in this format: \
{\"thought\": \"your thinking\", \"action\": \"tool_name\", \"action_input\": {\"param\": \"value\"}}. \
Otherwise, respond with {\"thought\": \"your thinking\", \"action\": \"finish\", \"action_input\": {\"result\": \"your answer\"}}.";

/// A check computed from one response.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Check {
    /// Status code is 200.
    Status,
    /// `choices[0].message.content` is present.
    Choices,
    /// The extracted content looks like it holds a JSON object.
    JsonContent,
}

impl Check {
    pub fn name(self) -> &'static str {
        match self {
            Check::Status => "status",
            Check::Choices => "choices",
            Check::JsonContent => "json-content",
        }
    }
}

/// Checks for prompts that ask for a JSON reply.
pub const JSON_REPLY_CHECKS: &[Check] = &[Check::Status, Check::Choices, Check::JsonContent];

/// Checks for free-form prose prompts.
pub const REPLY_CHECKS: &[Check] = &[Check::Status, Check::Choices];

/// One prompt to send and check.
#[derive(Debug, Clone, PartialEq)]
pub struct Scenario {
    pub name: &'static str,
    pub description: &'static str,
    pub messages: Vec<Message>,
    pub checks: &'static [Check],
}

/// The prompts run when no scenario is selected.
pub fn builtin_scenarios() -> Vec<Scenario> {
    vec![
        Scenario {
            name: "simple-json",
            description: "Arithmetic question answered as a JSON object",
            messages: vec![
                Message::system(SIMPLE_JSON_SYSTEM),
                Message::user("What is 2 + 2?"),
            ],
            checks: JSON_REPLY_CHECKS,
        },
        Scenario {
            name: "agent-format",
            description: "Tool-use instruction answered in the agent JSON format",
            messages: vec![
                Message::system(AGENT_FORMAT_SYSTEM),
                Message::user("List the contents of the current directory. Use the 'list_directory' tool with path '.'"),
            ],
            checks: JSON_REPLY_CHECKS,
        },
        Scenario {
            name: "hello-world",
            description: "Single user prompt with no system message",
            messages: vec![Message::user("Create a simple hello world program in Python")],
            checks: REPLY_CHECKS,
        },
    ]
}

/// Resolve scenario names. An empty selection means all built-in scenarios.
pub fn select_scenarios(names: &[String]) -> Result<Vec<Scenario>> {
    let all = builtin_scenarios();
    if names.is_empty() {
        return Ok(all);
    }

    names
        .iter()
        .map(|name| {
            all.iter().find(|s| s.name == name.as_str()).cloned().ok_or_else(|| {
                let known: Vec<&str> = all.iter().map(|s| s.name).collect();
                SmokeError::Config(format!(
                    "Unknown scenario '{}'. Valid options are: {}",
                    name,
                    known.join(", ")
                ))
            })
        })
        .collect()
}

#[derive(Debug, Clone, PartialEq)]
pub struct CheckOutcome {
    pub name: &'static str,
    pub passed: bool,
    pub detail: String,
}

impl CheckOutcome {
    fn new(name: &'static str, passed: bool, detail: impl Into<String>) -> Self {
        Self {
            name,
            passed,
            detail: detail.into(),
        }
    }
}

/// Compute the requested checks for one response, in the order given.
pub fn evaluate(response: &ChatResponse, checks: &[Check]) -> (Option<String>, Vec<CheckOutcome>) {
    let content = extract_message_content(response);

    let outcomes = checks
        .iter()
        .map(|&check| {
            let name = check.name();
            match (check, &content) {
                (Check::Status, _) => CheckOutcome::new(
                    name,
                    response.status == 200,
                    format!("expected 200, got {}", response.status),
                ),
                (Check::Choices, Some(_)) => CheckOutcome::new(name, true, "choices[0].message.content present"),
                (Check::Choices, None) => CheckOutcome::new(name, false, "no choices[0].message.content in response"),
                (Check::JsonContent, Some(text)) if looks_like_json(text) => {
                    CheckOutcome::new(name, true, "model output contains a JSON object")
                }
                (Check::JsonContent, Some(_)) => CheckOutcome::new(name, false, "model output does not contain a JSON object"),
                (Check::JsonContent, None) => CheckOutcome::new(name, false, "no model output to inspect"),
            }
        })
        .collect();

    (content, outcomes)
}

#[derive(Debug, Clone, PartialEq)]
pub struct ScenarioReport {
    pub scenario: String,
    pub response: ChatResponse,
    pub content: Option<String>,
    pub checks: Vec<CheckOutcome>,
}

impl ScenarioReport {
    pub fn passed(&self) -> bool {
        self.checks.iter().all(|c| c.passed)
    }

    pub fn check(&self, name: &str) -> Option<&CheckOutcome> {
        self.checks.iter().find(|c| c.name == name)
    }

    fn print(&self) {
        println!("Status code: {}", self.response.status);
        println!("Response: {}", self.response.body);
        if let Some(content) = &self.content {
            println!("\nModel output: {}", content);
        }
        for check in &self.checks {
            let mark = if check.passed { "✅" } else { "❌" };
            println!("{} {}: {}", mark, check.name, check.detail);
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct SuiteSummary {
    pub reports: Vec<ScenarioReport>,
}

impl SuiteSummary {
    pub fn all_passed(&self) -> bool {
        self.reports.iter().all(ScenarioReport::passed)
    }

    pub fn failed_checks(&self) -> usize {
        self.reports
            .iter()
            .flat_map(|r| r.checks.iter())
            .filter(|c| !c.passed)
            .count()
    }
}

/// Send one scenario and evaluate its checks.
pub async fn run_scenario(client: &SmokeClient, scenario: &Scenario) -> Result<ScenarioReport> {
    println!("\n🧪 {} - {}", scenario.name, scenario.description);

    let response = client.send_chat_request(scenario.messages.clone(), false).await?;
    let (content, checks) = evaluate(&response, scenario.checks);

    let report = ScenarioReport {
        scenario: scenario.name.to_string(),
        response,
        content,
        checks,
    };
    report.print();

    if report.passed() {
        info!(scenario = scenario.name, "scenario passed");
    } else {
        warn!(scenario = scenario.name, "scenario has failing checks");
    }

    Ok(report)
}

/// Run scenarios in order. The first network or decode failure aborts the run.
pub async fn run_scenarios(client: &SmokeClient, scenarios: &[Scenario]) -> Result<SuiteSummary> {
    println!(
        "Testing chat-completion service at {} (model {})",
        client.display_base_url(),
        client.model()
    );

    let mut summary = SuiteSummary::default();
    for scenario in scenarios {
        let report = run_scenario(client, scenario).await.map_err(|err| {
            println!("❌ {} aborted: {}", scenario.name, err);
            err
        })?;
        summary.reports.push(report);
    }

    println!("\n=== {} scenario(s) run, {} failed check(s) ===", summary.reports.len(), summary.failed_checks());
    Ok(summary)
}
