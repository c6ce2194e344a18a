use assert_cmd::Command;
use predicates::prelude::*;
use serde_json::Value;
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::{tempdir, TempDir};

struct Workspace {
    _dir: TempDir,
    file: PathBuf,
    config: PathBuf,
}

impl Workspace {
    fn new(role: &str) -> Self {
        let dir = tempdir().unwrap();
        let file = dir.path().join("board.json");
        let config = dir.path().join("config.toml");
        fs::write(&config, format!("role = \"{}\"\nsprint_length_days = 14\n", role)).unwrap();
        Self {
            _dir: dir,
            file,
            config,
        }
    }

    fn admin() -> Self {
        Self::new("admin")
    }

    fn cmd(&self) -> Command {
        let mut cmd = Command::cargo_bin("sprintboard").unwrap();
        cmd.env_remove("SPRINTBOARD_FILE")
            .env_remove("SPRINTBOARD_CONFIG")
            .env_remove("SPRINTBOARD_ORG")
            .env_remove("SPRINTBOARD_DEBUG_LOG")
            .arg("--file")
            .arg(&self.file)
            .arg("--config")
            .arg(&self.config);
        cmd
    }

    fn run(&self, args: &[&str]) -> Value {
        let output = self
            .cmd()
            .args(args)
            .assert()
            .success()
            .get_output()
            .stdout
            .clone();
        parse_json_output(&String::from_utf8_lossy(&output))
    }

    fn fail(&self, args: &[&str]) -> Value {
        let output = self
            .cmd()
            .args(args)
            .assert()
            .failure()
            .get_output()
            .stderr
            .clone();
        parse_json_output(&String::from_utf8_lossy(&output))
    }

    fn project(&self) -> String {
        let json = self.run(&["project", "create", "--key", "web", "--name", "Website"]);
        extract_id(&json)
    }

    fn sprint(&self, project: &str) -> String {
        let json = self.run(&["sprint", "create", "--project", project]);
        extract_id(&json)
    }

    fn issue(&self, sprint: &str, title: &str) -> String {
        let json = self.run(&["issue", "create", "--sprint", sprint, "--title", title]);
        extract_id(&json)
    }

    fn data(&self) -> Value {
        let raw = fs::read_to_string(&self.file).unwrap();
        parse_json_output(&raw)["data"].clone()
    }
}

fn parse_json_output(output: &str) -> Value {
    serde_json::from_str(output.trim()).expect("Failed to parse JSON output")
}

fn extract_id(json: &Value) -> String {
    json["data"]["id"].as_str().unwrap().to_string()
}

fn file_exists(path: &Path) -> bool {
    path.exists()
}

mod project_tests {
    use super::*;

    #[test]
    fn test_project_create_and_list() {
        let ws = Workspace::admin();
        let json = ws.run(&["project", "create", "--key", "web", "--name", "Website"]);

        assert!(json["success"].as_bool().unwrap());
        assert_eq!(json["data"]["key"], "WEB");
        assert_eq!(json["data"]["organization_id"], "default");
        assert!(file_exists(&ws.file));

        let list = ws.run(&["project", "list"]);
        assert_eq!(list["data"]["count"], 1);
        assert_eq!(list["data"]["items"][0]["name"], "Website");
    }

    #[test]
    fn test_member_cannot_create_project() {
        let ws = Workspace::new("member");
        let json = ws.fail(&["project", "create", "--key", "web", "--name", "Website"]);

        assert!(!json["success"].as_bool().unwrap());
        assert!(json["error"].as_str().unwrap().contains("cannot create projects"));
    }

    #[test]
    fn test_invalid_project_key() {
        let ws = Workspace::admin();
        let json = ws.fail(&["project", "create", "--key", "w", "--name", "Website"]);
        assert!(json["error"].as_str().unwrap().contains("Invalid project key"));
    }

    #[test]
    fn test_projects_are_scoped_to_organization() {
        let ws = Workspace::admin();
        ws.project();

        let output = ws
            .cmd()
            .args(["--org", "acme", "project", "list"])
            .assert()
            .success()
            .get_output()
            .stdout
            .clone();
        let json = parse_json_output(&String::from_utf8_lossy(&output));
        assert_eq!(json["data"]["count"], 0);
    }
}

mod sprint_tests {
    use super::*;

    #[test]
    fn test_sprint_create_uses_defaults() {
        let ws = Workspace::admin();
        ws.project();

        let json = ws.run(&["sprint", "create", "--project", "WEB", "--start", "2024-01-01"]);
        assert_eq!(json["data"]["name"], "WEB-1");
        assert_eq!(json["data"]["status"], "PLANNED");
        assert_eq!(json["data"]["start_date"], "2024-01-01T00:00:00Z");
        assert_eq!(json["data"]["end_date"], "2024-01-15T00:00:00Z");

        let second = ws.run(&["sprint", "create", "--project", "WEB"]);
        assert_eq!(second["data"]["name"], "WEB-2");

        let list = ws.run(&["sprint", "list", "--project", "web"]);
        assert_eq!(list["data"]["count"], 2);
    }

    #[test]
    fn test_sprint_create_rejects_inverted_window() {
        let ws = Workspace::admin();
        ws.project();

        let json = ws.fail(&[
            "sprint",
            "create",
            "--project",
            "WEB",
            "--start",
            "2024-01-08",
            "--end",
            "2024-01-01",
        ]);
        assert!(json["error"].as_str().unwrap().contains("must end after it starts"));
    }

    #[test]
    fn test_sprint_create_rejects_unrepresentable_length() {
        let ws = Workspace::admin();
        fs::write(&ws.config, "role = \"admin\"\nsprint_length_days = 200000000\n").unwrap();
        ws.project();

        let json = ws.fail(&["sprint", "create", "--project", "WEB", "--start", "2024-01-01"]);
        assert_eq!(json["success"], false);
        assert!(json["error"].as_str().unwrap().contains("last supported date"));
        let list = ws.run(&["sprint", "list", "--project", "WEB"]);
        assert_eq!(list["data"]["count"], 0);
    }

    #[test]
    fn test_sprint_status_window() {
        let ws = Workspace::admin();
        ws.project();
        let json = ws.run(&[
            "sprint",
            "create",
            "--project",
            "WEB",
            "--start",
            "2024-01-01",
            "--end",
            "2024-01-08",
        ]);
        let id = extract_id(&json);

        let inside = ws.run(&["sprint", "status", "--id", &id, "--at", "2024-01-01"]);
        assert_eq!(inside["data"]["can_start"], true);
        assert_eq!(inside["data"]["can_end"], false);

        let at_end = ws.run(&["sprint", "status", "--id", &id, "--at", "2024-01-08"]);
        assert_eq!(at_end["data"]["can_start"], false);
    }

    #[test]
    fn test_sprint_start_and_end() {
        let ws = Workspace::admin();
        let project = ws.project();
        let sprint = ws.sprint(&project);

        let started = ws.run(&["sprint", "start", "--id", &sprint]);
        assert_eq!(started["data"]["sprint"]["status"], "ACTIVE");
        assert_eq!(
            started["data"]["notifications"][0]["message"],
            "Sprint status updated successfully"
        );

        let status = ws.run(&["sprint", "status", "--id", &sprint]);
        assert_eq!(status["data"]["can_end"], true);

        let ended = ws.run(&["sprint", "end", "--id", &sprint]);
        assert_eq!(ended["data"]["sprint"]["status"], "COMPLETED");

        ws.cmd()
            .args(["sprint", "start", "--id", &sprint])
            .assert()
            .failure()
            .stderr(predicate::str::contains("cannot move to ACTIVE"));
    }

    #[test]
    fn test_second_active_sprint_is_rejected() {
        let ws = Workspace::admin();
        let project = ws.project();
        let first = ws.sprint(&project);
        let second = ws.sprint(&project);

        ws.run(&["sprint", "start", "--id", &first]);
        let json = ws.fail(&["sprint", "start", "--id", &second]);
        assert!(json["error"].as_str().unwrap().contains("already active"));
        assert_eq!(ws.data()["sprints"][1]["status"], "PLANNED");
    }

    #[test]
    fn test_unknown_sprint() {
        let ws = Workspace::admin();
        ws.cmd()
            .args(["sprint", "status", "--id", "ghost"])
            .assert()
            .failure()
            .stderr(predicate::str::contains("Not found"));
    }
}

mod issue_tests {
    use super::*;

    #[test]
    fn test_issue_create_defaults() {
        let ws = Workspace::admin();
        let project = ws.project();
        let sprint = ws.sprint(&project);

        let json = ws.run(&["issue", "create", "--sprint", &sprint, "--title", "Fix login"]);
        assert_eq!(json["data"]["status"], "TODO");
        assert_eq!(json["data"]["priority"], "MEDIUM");
        assert_eq!(json["data"]["project_id"], project.as_str());

        let list = ws.run(&["issue", "list", "--sprint", &sprint]);
        assert_eq!(list["data"]["count"], 1);
    }

    #[test]
    fn test_issue_create_with_priority() {
        let ws = Workspace::admin();
        let project = ws.project();
        let sprint = ws.sprint(&project);

        let json = ws.run(&[
            "issue",
            "create",
            "--sprint",
            &sprint,
            "--title",
            "Outage",
            "--priority",
            "urgent",
            "--assignee",
            "sam",
        ]);
        assert_eq!(json["data"]["priority"], "URGENT");
        assert_eq!(json["data"]["assignee"], "sam");

        let bad = ws.fail(&[
            "issue", "create", "--sprint", &sprint, "--title", "x", "--priority", "whenever",
        ]);
        assert!(bad["error"].as_str().unwrap().contains("priority"));
    }

    #[test]
    fn test_issue_move_persists() {
        let ws = Workspace::admin();
        let project = ws.project();
        let sprint = ws.sprint(&project);
        let issue = ws.issue(&sprint, "Fix login");

        let json = ws.run(&["issue", "move", "--id", &issue, "--to", "in-progress"]);
        assert_eq!(json["data"]["outcome"], "moved");
        assert_eq!(json["data"]["issue"]["status"], "IN_PROGRESS");
        assert_eq!(
            json["data"]["notifications"][0]["message"],
            "Issue moved to IN_PROGRESS"
        );
        assert_eq!(ws.data()["issues"][0]["status"], "IN_PROGRESS");
    }

    #[test]
    fn test_issue_move_to_same_status_is_unchanged() {
        let ws = Workspace::admin();
        let project = ws.project();
        let sprint = ws.sprint(&project);
        let issue = ws.issue(&sprint, "Fix login");

        let json = ws.run(&["issue", "move", "--id", &issue, "--to", "TODO"]);
        assert_eq!(json["data"]["outcome"], "unchanged");
        assert_eq!(json["data"]["notifications"].as_array().unwrap().len(), 0);
    }

    #[test]
    fn test_issue_move_unknown_issue_or_status() {
        let ws = Workspace::admin();
        let project = ws.project();
        let sprint = ws.sprint(&project);
        let issue = ws.issue(&sprint, "Fix login");

        ws.cmd()
            .args(["issue", "move", "--id", "ghost", "--to", "DONE"])
            .assert()
            .failure()
            .stderr(predicate::str::contains("Not found"));
        ws.cmd()
            .args(["issue", "move", "--id", &issue, "--to", "BLOCKED"])
            .assert()
            .failure()
            .stderr(predicate::str::contains("Unknown issue status"));
    }
}

mod board_tests {
    use super::*;

    #[test]
    fn test_board_show_groups_by_column() {
        let ws = Workspace::admin();
        let project = ws.project();
        let sprint = ws.sprint(&project);
        let first = ws.issue(&sprint, "First");
        ws.issue(&sprint, "Second");
        ws.run(&["issue", "move", "--id", &first, "--to", "DONE"]);

        let json = ws.run(&["board", "show", "--project", "WEB"]);
        let columns = json["data"]["columns"].as_array().unwrap();
        assert_eq!(columns.len(), 4);
        assert_eq!(columns[0]["column"]["key"], "TODO");
        assert_eq!(columns[0]["issues"][0]["title"], "Second");
        assert_eq!(columns[3]["issues"][0]["title"], "First");
        assert_eq!(json["data"]["unplaced"].as_array().unwrap().len(), 0);
        assert_eq!(json["data"]["sprint"]["id"], sprint.as_str());
    }

    #[test]
    fn test_board_show_with_custom_columns() {
        let ws = Workspace::admin();
        fs::write(
            &ws.config,
            "role = \"admin\"\n\n[[columns]]\nkey = \"TODO\"\nname = \"Backlog\"\n\n[[columns]]\nkey = \"DONE\"\nname = \"Shipped\"\n",
        )
        .unwrap();
        let project = ws.project();
        let sprint = ws.sprint(&project);
        let issue = ws.issue(&sprint, "Half way");
        ws.run(&["issue", "move", "--id", &issue, "--to", "IN_REVIEW"]);

        let json = ws.run(&["board", "show", "--project", "WEB"]);
        assert_eq!(json["data"]["columns"][0]["column"]["name"], "Backlog");
        assert_eq!(json["data"]["unplaced"][0]["title"], "Half way");
    }

    #[test]
    fn test_board_show_prefers_active_sprint() {
        let ws = Workspace::admin();
        let project = ws.project();
        ws.sprint(&project);
        let second = ws.sprint(&project);
        ws.run(&["sprint", "start", "--id", &second]);

        let json = ws.run(&["board", "show", "--project", "WEB"]);
        assert_eq!(json["data"]["sprint"]["id"], second.as_str());
        assert_eq!(json["data"]["eligibility"]["can_end"], true);
    }

    #[test]
    fn test_board_show_unknown_sprint() {
        let ws = Workspace::admin();
        let project = ws.project();
        ws.sprint(&project);

        ws.cmd()
            .args(["board", "show", "--project", "WEB", "--sprint", "ghost"])
            .assert()
            .failure()
            .stderr(predicate::str::contains("Sprint ghost"));
    }

    #[test]
    fn test_board_show_empty_project() {
        let ws = Workspace::admin();
        ws.project();

        let json = ws.run(&["board", "show", "--project", "WEB"]);
        assert!(json["data"]["sprint"].is_null());
        assert_eq!(json["data"]["eligibility"]["can_start"], false);
    }
}

mod misc_tests {
    use super::*;

    #[test]
    fn test_file_is_required() {
        let ws = Workspace::admin();
        Command::cargo_bin("sprintboard")
            .unwrap()
            .env_remove("SPRINTBOARD_FILE")
            .args(["--config", ws.config.to_str().unwrap(), "project", "list"])
            .assert()
            .failure()
            .stderr(predicate::str::contains("--file is required"));
    }

    #[test]
    fn test_completions() {
        Command::cargo_bin("sprintboard")
            .unwrap()
            .args(["completions", "bash"])
            .assert()
            .success()
            .stdout(predicate::str::contains("sprintboard"));
    }

    #[test]
    fn test_file_from_env() {
        let ws = Workspace::admin();
        Command::cargo_bin("sprintboard")
            .unwrap()
            .env("SPRINTBOARD_FILE", &ws.file)
            .env("SPRINTBOARD_CONFIG", &ws.config)
            .args(["project", "create", "--key", "api", "--name", "API"])
            .assert()
            .success();
        assert_eq!(ws.data()["projects"][0]["key"], "API");
    }

    #[test]
    fn test_corrupt_data_file() {
        let ws = Workspace::admin();
        fs::write(&ws.file, "{ nope").unwrap();
        ws.cmd()
            .args(["project", "list"])
            .assert()
            .failure()
            .stderr(predicate::str::contains("Serialization error"));
    }
}
