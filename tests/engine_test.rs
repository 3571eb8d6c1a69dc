use std::collections::VecDeque;
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

use housekeep::cleaner::{DeletionEngine, DeletionStatus, RunConfig};
use housekeep::common::platform::{HostLayout, Platform};
use housekeep::common::prompt::Confirm;
use housekeep::scanner::targets::{Category, ScanLimits};

/// Replays canned answers and records every question asked
struct ScriptedConfirm {
    answers: VecDeque<bool>,
    prompts: Vec<String>,
}

impl ScriptedConfirm {
    fn new(answers: &[bool]) -> Self {
        Self {
            answers: answers.iter().copied().collect(),
            prompts: Vec::new(),
        }
    }
}

impl Confirm for ScriptedConfirm {
    fn confirm(&mut self, prompt: &str, _default: bool) -> bool {
        self.prompts.push(prompt.to_string());
        self.answers.pop_front().unwrap_or(false)
    }
}

/// Says yes, after changing the filesystem between the scan and the
/// deletion loop
struct MutatingConfirm<F: FnMut()> {
    before_answer: Option<F>,
}

impl<F: FnMut()> Confirm for MutatingConfirm<F> {
    fn confirm(&mut self, _prompt: &str, _default: bool) -> bool {
        if let Some(mut change) = self.before_answer.take() {
            change();
        }
        true
    }
}

fn touch(path: &Path) {
    fs::create_dir_all(path.parent().unwrap()).unwrap();
    fs::write(path, b"some bytes").unwrap();
}

/// Linux layout whose temp category points at `<home>/scratch`
fn layout(home: &Path) -> HostLayout {
    let mut layout = HostLayout::for_home(Platform::Linux, home.to_path_buf());
    layout.temp_dir = home.join("scratch");
    layout.docker_bin = PathBuf::from("/nonexistent/docker");
    layout
}

#[test]
fn test_dry_run_touches_nothing() {
    let tmp = TempDir::new().unwrap();
    let scratch = tmp.path().join("scratch");
    for i in 0..10 {
        touch(&scratch.join(format!("file{}.txt", i)));
    }

    let layout = layout(tmp.path());
    let limits = ScanLimits::default();
    let mut confirm = ScriptedConfirm::new(&[true, true]);
    let run = RunConfig {
        force: true,
        dry_run: true,
        min_age_days: 0,
    };
    let report = DeletionEngine::new(&layout, &limits, run, &mut confirm).delete_category(Category::Temp);

    assert_eq!(report.status, DeletionStatus::DryRun);
    assert_eq!(report.candidates, 10);
    assert_eq!(report.deleted, 0);
    assert_eq!(report.exit_code(), 0);
    assert!(confirm.prompts.is_empty());
    for i in 0..10 {
        assert!(scratch.join(format!("file{}.txt", i)).exists());
    }
}

#[test]
fn test_force_still_asks_about_dev_files() {
    let tmp = TempDir::new().unwrap();
    let scratch = tmp.path().join("scratch");
    touch(&scratch.join("proj/node_modules/pkg/index.js"));
    touch(&scratch.join("notes.txt"));

    let layout = layout(tmp.path());
    let limits = ScanLimits::default();
    let mut confirm = ScriptedConfirm::new(&[false]);
    let run = RunConfig {
        force: true,
        ..RunConfig::default()
    };
    let report = DeletionEngine::new(&layout, &limits, run, &mut confirm).delete_category(Category::Temp);

    assert_eq!(report.status, DeletionStatus::Cancelled);
    assert_eq!(report.exit_code(), 1);
    assert_eq!(confirm.prompts.len(), 1);
    assert!(confirm.prompts[0].contains("development files"));
    assert!(scratch.join("proj/node_modules/pkg/index.js").exists());
    assert!(scratch.join("notes.txt").exists());
}

#[test]
fn test_force_skips_generic_prompt_without_dev_files() {
    let tmp = TempDir::new().unwrap();
    let scratch = tmp.path().join("scratch");
    touch(&scratch.join("a.txt"));
    touch(&scratch.join("b/c.txt"));

    let layout = layout(tmp.path());
    let limits = ScanLimits::default();
    let mut confirm = ScriptedConfirm::new(&[]);
    let run = RunConfig {
        force: true,
        ..RunConfig::default()
    };
    let report = DeletionEngine::new(&layout, &limits, run, &mut confirm).delete_category(Category::Temp);

    assert_eq!(report.status, DeletionStatus::Completed);
    assert_eq!(report.deleted, 2);
    assert_eq!(report.failed, 0);
    assert!(confirm.prompts.is_empty());
    assert!(!scratch.join("a.txt").exists());
    // directories are left behind, only files go
    assert!(scratch.join("b").is_dir());
}

#[test]
fn test_end_to_end_keeps_git_metadata() {
    let tmp = TempDir::new().unwrap();
    let scratch = tmp.path().join("scratch");
    touch(&scratch.join(".git/config"));
    touch(&scratch.join("node_modules/pkg/index.js"));
    touch(&scratch.join("cache.tmp"));

    let layout = layout(tmp.path());
    let limits = ScanLimits::default();
    let mut confirm = ScriptedConfirm::new(&[true, true]);
    let report = DeletionEngine::new(&layout, &limits, RunConfig::default(), &mut confirm)
        .delete_category(Category::Temp);

    assert_eq!(report.status, DeletionStatus::Completed);
    assert_eq!(report.candidates, 2);
    assert_eq!(report.deleted, 2);
    assert_eq!(confirm.prompts.len(), 2);
    assert!(confirm.prompts[0].contains("2 items"));
    assert!(scratch.join(".git/config").exists());
    assert!(!scratch.join("node_modules/pkg/index.js").exists());
    assert!(!scratch.join("cache.tmp").exists());
}

#[test]
fn test_declining_generic_prompt_skips_dev_prompt() {
    let tmp = TempDir::new().unwrap();
    touch(&tmp.path().join("scratch/dist/app.js"));

    let layout = layout(tmp.path());
    let limits = ScanLimits::default();
    let mut confirm = ScriptedConfirm::new(&[false, true]);
    let report = DeletionEngine::new(&layout, &limits, RunConfig::default(), &mut confirm)
        .delete_category(Category::Temp);

    assert_eq!(report.status, DeletionStatus::Cancelled);
    assert_eq!(confirm.prompts.len(), 1);
    assert!(tmp.path().join("scratch/dist/app.js").exists());
}

#[test]
fn test_min_age_leaves_recent_files() {
    let tmp = TempDir::new().unwrap();
    touch(&tmp.path().join("scratch/recent.txt"));

    let layout = layout(tmp.path());
    let limits = ScanLimits::default();
    let mut confirm = ScriptedConfirm::new(&[true]);
    let run = RunConfig {
        min_age_days: 7,
        ..RunConfig::default()
    };
    let report = DeletionEngine::new(&layout, &limits, run, &mut confirm).delete_category(Category::Temp);

    assert_eq!(report.status, DeletionStatus::NothingToDelete);
    assert!(confirm.prompts.is_empty());
    assert!(tmp.path().join("scratch/recent.txt").exists());
}

#[test]
fn test_node_modules_removed_whole() {
    let tmp = TempDir::new().unwrap();
    touch(&tmp.path().join("dev/web/package.json"));
    touch(&tmp.path().join("dev/web/node_modules/react/index.js"));
    touch(&tmp.path().join("dev/web/node_modules/react/lib/dom.js"));
    touch(&tmp.path().join("dev/api/node_modules/express/index.js"));

    let layout = layout(tmp.path());
    let limits = ScanLimits::default();
    let mut confirm = ScriptedConfirm::new(&[true]);
    let run = RunConfig {
        force: true,
        ..RunConfig::default()
    };
    let report = DeletionEngine::new(&layout, &limits, run, &mut confirm).delete_category(Category::NodeModules);

    assert_eq!(report.status, DeletionStatus::Completed);
    assert_eq!(report.deleted, 2);
    assert_eq!(confirm.prompts.len(), 1);
    assert!(!tmp.path().join("dev/web/node_modules").exists());
    assert!(!tmp.path().join("dev/api/node_modules").exists());
    assert!(tmp.path().join("dev/web/package.json").exists());
}

#[test]
fn test_unsupported_category_exit_code() {
    let tmp = TempDir::new().unwrap();
    let layout = layout(tmp.path());
    let limits = ScanLimits::default();
    let mut confirm = ScriptedConfirm::new(&[]);
    let report = DeletionEngine::new(&layout, &limits, RunConfig::default(), &mut confirm)
        .delete_category(Category::Xcode);
    assert_eq!(report.status, DeletionStatus::Unsupported);
    assert_eq!(report.exit_code(), 1);
}

#[test]
fn test_one_failure_does_not_stop_the_rest() {
    let tmp = TempDir::new().unwrap();
    let scratch = tmp.path().join("scratch");
    for name in ["a1.txt", "a2.txt", "mid/victim.txt", "z1.txt", "z2.txt"] {
        touch(&scratch.join(name));
    }

    let layout = layout(tmp.path());
    let limits = ScanLimits::default();
    // `mid` turns into a plain file, so `mid/victim.txt` fails with
    // ENOTDIR regardless of privileges
    let mid = scratch.join("mid");
    let mut confirm = MutatingConfirm {
        before_answer: Some(|| {
            fs::remove_dir_all(&mid).unwrap();
            fs::write(&mid, b"not a directory").unwrap();
        }),
    };
    let report = DeletionEngine::new(&layout, &limits, RunConfig::default(), &mut confirm)
        .delete_category(Category::Temp);

    assert_eq!(report.status, DeletionStatus::Completed);
    assert_eq!(report.candidates, 5);
    assert_eq!(report.deleted, 4);
    assert_eq!(report.failed, 1);
    assert_eq!(report.exit_code(), 0);
    assert_eq!(report.errors.len(), 1);
    assert!(report.errors[0].contains("victim.txt"));
    for name in ["a1.txt", "a2.txt", "z1.txt", "z2.txt"] {
        assert!(!scratch.join(name).exists(), "{} should be gone", name);
    }
}
