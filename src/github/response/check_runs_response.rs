use serde::Deserialize;

const COMPLETED_STATUS: &str = "completed";
const PASSING_CONCLUSIONS: [&str; 3] = ["success", "skipped", "neutral"];

#[derive(Debug, Clone, Default, Deserialize)]
pub struct CheckRuns {
    #[serde(default)]
    pub total_count: u64,
    #[serde(default)]
    pub check_runs: Vec<CheckRun>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CheckRun {
    pub name: String,
    pub status: String,
    pub conclusion: Option<String>,
}

impl CheckRun {
    pub fn is_completed(&self) -> bool {
        self.status == COMPLETED_STATUS
    }

    /// A completed run with no conclusion counts as failed.
    pub fn is_failure(&self) -> bool {
        match self.conclusion.as_deref() {
            Some(conclusion) => !PASSING_CONCLUSIONS.contains(&conclusion),
            None => true,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn run(status: &str, conclusion: Option<&str>) -> CheckRun {
        CheckRun {
            name: "build".to_owned(),
            status: status.to_owned(),
            conclusion: conclusion.map(str::to_owned),
        }
    }

    #[test]
    fn should_treat_success_skipped_and_neutral_as_passing() {
        for conclusion in ["success", "skipped", "neutral"] {
            assert!(!run("completed", Some(conclusion)).is_failure());
        }
    }

    #[test]
    fn should_treat_other_conclusions_as_failure() {
        for conclusion in ["failure", "cancelled", "timed_out", "action_required"] {
            assert!(run("completed", Some(conclusion)).is_failure());
        }
    }

    #[test]
    fn should_only_be_completed_when_status_is_completed() {
        assert!(run("completed", Some("success")).is_completed());
        assert!(!run("in_progress", None).is_completed());
        assert!(!run("queued", None).is_completed());
    }

    #[test]
    fn should_default_missing_fields() {
        let runs: CheckRuns = serde_json::from_str("{}").unwrap();

        assert_eq!(runs.total_count, 0);
        assert!(runs.check_runs.is_empty());
    }
}
