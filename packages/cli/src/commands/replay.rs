use anyhow::{Context, Result};
use async_trait::async_trait;
use clap::Args;
use colored::Colorize;
use pageforge_common::FileSystem;
use pageforge_editor::{
    Completion, ConditionGroup, EditSession, EditorConfig, EditorError, MutationRemote, NavigationTarget,
    Notification, Notifier, PageVariation, RemoteError, RemoteRequest, RenderRuntime, Services, Severity,
    Snapshot,
};
use serde::Deserialize;
use serde_json::Value;
use std::path::PathBuf;
use std::sync::{Arc, Mutex};
use tracing::{debug, info};

#[derive(Args, Debug)]
pub struct ReplayArgs {
    /// JSON intent script to replay
    pub script: PathBuf,

    /// Print the draft after every step
    #[arg(short, long)]
    pub verbose: bool,
}

/// A variation plus the intents to run against it
#[derive(Debug, Deserialize)]
pub struct Script {
    pub variation: PageVariation,

    #[serde(default)]
    pub steps: Vec<Step>,
}

/// One operator intent; save/delete steps script the remote's answer
#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "intent", rename_all = "camelCase")]
pub enum Step {
    Move { from: usize, to: usize },
    SetScope { id: String },
    SetDevice { id: String },
    AddCustom { id: String },
    RemoveCustom { id: String },
    Toggle { group: ConditionGroup, id: String },
    Save {
        /// Remote rejection message; the save succeeds when absent
        #[serde(default)]
        reject: Option<String>,

        /// Result payload merged into the committed snapshot
        #[serde(default)]
        result: Option<Value>,
    },
    Delete {
        #[serde(default)]
        reject: Option<String>,
    },
}

impl Step {
    fn name(&self) -> &'static str {
        match self {
            Step::Move { .. } => "move",
            Step::SetScope { .. } => "setScope",
            Step::SetDevice { .. } => "setDevice",
            Step::AddCustom { .. } => "addCustom",
            Step::RemoveCustom { .. } => "removeCustom",
            Step::Toggle { .. } => "toggle",
            Step::Save { .. } => "save",
            Step::Delete { .. } => "delete",
        }
    }
}

/// What happened to a single step
#[derive(Debug, Clone, PartialEq)]
pub enum StepOutcome {
    Applied,
    Rejected(EditorError),
    Completed(Completion),
}

#[derive(Debug)]
pub struct ReplayReport {
    pub outcomes: Vec<(&'static str, StepOutcome)>,
    pub draft: Snapshot,
    pub committed: Snapshot,
    pub navigations: Vec<NavigationTarget>,
    pub notifications: Vec<Notification>,
}

/// Remote answering each call with the outcome queued by the current step
#[derive(Default)]
struct ScriptedRemote {
    next: Mutex<Option<Result<Value, RemoteError>>>,
}

impl ScriptedRemote {
    fn answer_with(&self, reject: Option<&str>, result: Option<Value>) {
        let outcome = match reject {
            Some(message) => Err(RemoteError::new(message)),
            None => Ok(result.unwrap_or(Value::Null)),
        };
        *self.lock() = Some(outcome);
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Option<Result<Value, RemoteError>>> {
        self.next.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

#[async_trait]
impl MutationRemote for ScriptedRemote {
    async fn execute(&self, request: RemoteRequest) -> Result<Value, RemoteError> {
        debug!(operation = request.operation.name(), payload = %request.payload, "Scripted remote call");
        self.lock().take().unwrap_or(Ok(Value::Null))
    }
}

/// Notifier printing toasts to the terminal and keeping them for the report
#[derive(Default)]
struct ConsoleNotifier {
    seen: Mutex<Vec<Notification>>,
}

impl Notifier for ConsoleNotifier {
    fn notify(&self, notification: Notification) {
        let badge = match notification.severity {
            Severity::Success => "toast".green(),
            Severity::Error => "toast".red(),
            Severity::Info => "toast".blue(),
        };
        println!("   {} {}", badge.bold(), notification.message);

        if let Ok(mut seen) = self.seen.lock() {
            seen.push(notification);
        }
    }
}

#[derive(Default)]
struct ConsoleRuntime {
    navigations: Mutex<Vec<NavigationTarget>>,
}

impl RenderRuntime for ConsoleRuntime {
    fn navigate(&self, target: NavigationTarget) {
        let path = target.path().unwrap_or_else(|| "<exit>".to_string());
        println!("   {} {}", "navigate".cyan().bold(), path);

        if let Ok(mut navigations) = self.navigations.lock() {
            navigations.push(target);
        }
    }
}

pub async fn replay(args: ReplayArgs, config: &EditorConfig, fs: &dyn FileSystem) -> Result<()> {
    println!("🔁 {} Pageforge replay", "Starting".green().bold());
    println!("   Script: {}", args.script.display());
    println!();

    let content = fs
        .read_to_string(&args.script)
        .with_context(|| format!("Cannot read {}", args.script.display()))?;
    let script: Script = serde_json::from_str(&content)
        .with_context(|| format!("Invalid script {}", args.script.display()))?;

    let report = run_script(script, config, args.verbose).await?;

    println!();
    println!("✨ {} Replay complete!", "Done".green().bold());
    println!("   Steps: {}", report.outcomes.len());
    println!("{}", "   Committed:".bright_white());
    println!("{}", serde_json::to_string_pretty(&report.committed)?);
    if report.draft != report.committed {
        println!("{}", "   Draft (unsaved):".yellow());
        println!("{}", serde_json::to_string_pretty(&report.draft)?);
    }

    Ok(())
}

/// Run every step of a script against a fresh session
pub async fn run_script(script: Script, config: &EditorConfig, verbose: bool) -> Result<ReplayReport> {
    let remote = Arc::new(ScriptedRemote::default());
    let notifier = Arc::new(ConsoleNotifier::default());
    let runtime = Arc::new(ConsoleRuntime::default());
    let services = Services::new(remote.clone(), notifier.clone(), runtime.clone());

    let mut session = EditSession::open(script.variation, config, services)?;
    info!(variation = session.id(), steps = script.steps.len(), "Replaying script");

    let mut outcomes = Vec::with_capacity(script.steps.len());
    for (index, step) in script.steps.into_iter().enumerate() {
        let name = step.name();
        let outcome = run_step(&mut session, &remote, step).await;

        match &outcome {
            StepOutcome::Applied => println!("  {} {} {}", "✓".green(), index + 1, name),
            StepOutcome::Rejected(err) => println!("  {} {} {}: {}", "✗".red(), index + 1, name, err),
            StepOutcome::Completed(completion) if completion.is_committed() => {
                println!("  {} {} {} committed", "✓".green(), index + 1, name)
            }
            StepOutcome::Completed(_) => println!("  {} {} {} rolled back", "↺".yellow(), index + 1, name),
        }
        if verbose {
            println!("{}", serde_json::to_string(session.draft())?);
        }

        outcomes.push((name, outcome));
    }

    let navigations = runtime
        .navigations
        .lock()
        .map(|n| n.clone())
        .unwrap_or_default();
    let notifications = notifier.seen.lock().map(|n| n.clone()).unwrap_or_default();

    Ok(ReplayReport {
        outcomes,
        draft: session.draft().clone(),
        committed: session.committed().clone(),
        navigations,
        notifications,
    })
}

async fn run_step(session: &mut EditSession, remote: &ScriptedRemote, step: Step) -> StepOutcome {
    let result = match step {
        Step::Move { from, to } => session.move_component(from, to),
        Step::SetScope { id } => session.set_scope(&id),
        Step::SetDevice { id } => session.set_device(&id),
        Step::AddCustom { id } => session.add_custom(&id),
        Step::RemoveCustom { id } => session.remove_custom(&id),
        Step::Toggle { group, id } => session.toggle_condition(group, &id),
        Step::Save { reject, result } => {
            remote.answer_with(reject.as_deref(), result);
            return completed(session.save().await);
        }
        Step::Delete { reject } => {
            remote.answer_with(reject.as_deref(), None);
            return completed(session.delete().await);
        }
    };

    match result {
        Ok(()) => StepOutcome::Applied,
        Err(err) => StepOutcome::Rejected(err),
    }
}

fn completed(result: Result<Completion, EditorError>) -> StepOutcome {
    match result {
        Ok(completion) => StepOutcome::Completed(completion),
        Err(err) => StepOutcome::Rejected(err),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pageforge_common::MockFileSystem;
    use pageforge_editor::Operation;

    const SCRIPT: &str = r#"{
        "variation": {
            "id": "store.home",
            "components": [
                { "treePath": "store.home/carousel", "isSortable": true },
                { "treePath": "store.home/shelf", "isSortable": true },
                { "treePath": "store.home/footer", "isSortable": false }
            ],
            "customConditions": [{ "id": "logged-in", "label": "Logged in" }]
        },
        "steps": [
            { "intent": "move", "from": 0, "to": 1 },
            { "intent": "setDevice", "id": "mobile" },
            { "intent": "addCustom", "id": "logged-in" },
            { "intent": "save", "reject": "503 Service Unavailable" },
            { "intent": "toggle", "group": "scope", "id": "template" },
            { "intent": "move", "from": 0, "to": 7 },
            { "intent": "save" }
        ]
    }"#;

    #[test]
    fn test_parse_script() {
        let script: Script = serde_json::from_str(SCRIPT).unwrap();
        assert_eq!(script.variation.components.len(), 3);
        assert_eq!(script.steps.len(), 7);
        assert!(matches!(
            script.steps[4],
            Step::Toggle { group: ConditionGroup::Scope, .. }
        ));
    }

    #[tokio::test]
    async fn test_replay_rolls_back_then_commits() {
        let script: Script = serde_json::from_str(SCRIPT).unwrap();
        let report = run_script(script, &EditorConfig::default(), false).await.unwrap();

        let names: Vec<_> = report.outcomes.iter().map(|(name, _)| *name).collect();
        assert_eq!(
            names,
            vec!["move", "setDevice", "addCustom", "save", "toggle", "move", "save"]
        );

        match &report.outcomes[3].1 {
            StepOutcome::Completed(completion) => assert!(!completion.is_committed()),
            other => panic!("unexpected outcome {:?}", other),
        }
        assert_eq!(
            report.outcomes[5].1,
            StepOutcome::Rejected(EditorError::OutOfRange { index: 7, len: 3 })
        );

        // the rejected save restored the opening state, so only the scope change was saved
        assert_eq!(report.committed, report.draft);
        assert_eq!(report.committed.conditions.scope(), "template");
        assert_eq!(report.committed.conditions.device(), "any");
        assert!(report.committed.conditions.custom().is_empty());
        assert_eq!(
            report.committed.components.get(0).map(|c| c.tree_path.as_str()),
            Some("store.home/carousel")
        );

        assert_eq!(report.notifications.len(), 1);
        assert_eq!(report.notifications[0].severity, Severity::Error);
        assert_eq!(report.navigations, vec![NavigationTarget::Exit]);
    }

    #[tokio::test]
    async fn test_replay_delete_rejection_stays_open() {
        let script: Script = serde_json::from_str(
            r#"{
                "variation": { "id": "v1", "components": [] },
                "steps": [{ "intent": "delete", "reject": "forbidden" }]
            }"#,
        )
        .unwrap();

        let report = run_script(script, &EditorConfig::default(), false).await.unwrap();
        assert!(report.navigations.is_empty());
        assert_eq!(
            report.notifications[0].message,
            "Error: route could not be deleted."
        );
    }

    #[tokio::test]
    async fn test_replay_reads_script_through_filesystem() {
        let mut fs = MockFileSystem::new();
        fs.add_file(PathBuf::from("/scripts/home.json"), SCRIPT);

        let args = ReplayArgs {
            script: PathBuf::from("/scripts/home.json"),
            verbose: false,
        };
        replay(args, &EditorConfig::default(), &fs).await.unwrap();

        let missing = ReplayArgs {
            script: PathBuf::from("/scripts/missing.json"),
            verbose: false,
        };
        assert!(replay(missing, &EditorConfig::default(), &fs).await.is_err());
    }

    #[tokio::test]
    async fn test_scripted_remote_defaults_to_success() {
        let remote = ScriptedRemote::default();
        let request = RemoteRequest::new(Operation::Save, Value::Null);
        assert_eq!(remote.execute(request).await, Ok(Value::Null));

        remote.answer_with(Some("nope"), None);
        let request = RemoteRequest::new(Operation::Delete, Value::Null);
        assert_eq!(remote.execute(request).await, Err(RemoteError::new("nope")));
    }
}
