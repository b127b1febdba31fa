use anyhow::{Result, bail};
use log::debug;
use std::path::PathBuf;

use crate::runtime::Runtime;

pub mod export;
pub mod import;

pub use export::{ExportOptions, ExportOutcome};
pub use import::{ImportError, ImportOptions, ImportSummary};

/// What a run of the tool does.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Action {
    /// Dump the installed packages to a new manifest.
    Export,
    /// Reinstall the packages listed in a manifest.
    Import(PathBuf),
}

impl Action {
    /// A manifest argument means import; no argument means the user has to choose.
    pub fn from_manifest_arg(manifest: Option<PathBuf>) -> Option<Self> {
        manifest.map(Action::Import)
    }
}

const MENU: &str = "\
What would you like to do?
  1) Export installed packages
  2) Import packages from a backup";

/// Ask the user to pick an action from the interactive menu.
#[tracing::instrument(skip(runtime))]
pub fn select_action<R: Runtime>(runtime: &R) -> Result<Action> {
    println!("{}", MENU);
    let answer = runtime.prompt("Choice [1/2]")?;
    debug!("Menu answer: {:?}", answer);

    match answer.to_lowercase().as_str() {
        "1" | "e" | "export" => Ok(Action::Export),
        "2" | "i" | "import" => {
            let raw = runtime.prompt("Path to the manifest file")?;
            let path = unquote(&raw);
            if path.is_empty() {
                bail!("No manifest path given");
            }
            Ok(Action::Import(PathBuf::from(path)))
        }
        _ => bail!("Invalid choice \"{}\": expected 1 (export) or 2 (import)", answer),
    }
}

/// Strip one pair of surrounding quotes, as left by "Copy as path".
fn unquote(raw: &str) -> &str {
    let trimmed = raw.trim();
    ['"', '\'']
        .iter()
        .find_map(|q| {
            trimmed
                .strip_prefix(*q)
                .and_then(|rest| rest.strip_suffix(*q))
        })
        .unwrap_or(trimmed)
        .trim()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::runtime::MockRuntime;
    use mockall::predicate::eq;

    fn runtime_answering(answers: &'static [&'static str]) -> MockRuntime {
        let mut runtime = MockRuntime::new();
        let mut seq = mockall::Sequence::new();
        for answer in answers {
            runtime
                .expect_prompt()
                .times(1)
                .in_sequence(&mut seq)
                .returning(move |_| Ok(answer.to_string()));
        }
        runtime
    }

    #[test]
    fn test_from_manifest_arg() {
        assert_eq!(Action::from_manifest_arg(None), None);
        assert_eq!(
            Action::from_manifest_arg(Some(PathBuf::from("b.json"))),
            Some(Action::Import(PathBuf::from("b.json")))
        );
    }

    #[test]
    fn test_select_export() {
        for answer in ["1", "e", "Export"] {
            let mut runtime = MockRuntime::new();
            runtime
                .expect_prompt()
                .with(eq("Choice [1/2]"))
                .times(1)
                .returning(move |_| Ok(answer.to_string()));
            assert_eq!(select_action(&runtime).unwrap(), Action::Export);
        }
    }

    #[test]
    fn test_select_import_asks_for_path() {
        let runtime = runtime_answering(&["2", "C:\\Backups\\backup.json"]);
        assert_eq!(
            select_action(&runtime).unwrap(),
            Action::Import(PathBuf::from("C:\\Backups\\backup.json"))
        );
    }

    #[test]
    fn test_select_import_strips_quotes() {
        let runtime = runtime_answering(&["import", "\"/tmp/my backups/backup.json\""]);
        assert_eq!(
            select_action(&runtime).unwrap(),
            Action::Import(PathBuf::from("/tmp/my backups/backup.json"))
        );
    }

    #[test]
    fn test_select_import_requires_path() {
        let runtime = runtime_answering(&["2", "  "]);
        let err = select_action(&runtime).unwrap_err();
        assert!(err.to_string().contains("No manifest path given"));
    }

    #[test]
    fn test_select_rejects_unknown_choice() {
        let runtime = runtime_answering(&["3"]);
        let err = select_action(&runtime).unwrap_err();
        assert!(err.to_string().contains("Invalid choice \"3\""));
    }

    #[test]
    fn test_unquote() {
        assert_eq!(unquote("'a b'"), "a b");
        assert_eq!(unquote("\"a\""), "a");
        assert_eq!(unquote("\"a"), "\"a");
        assert_eq!(unquote(" plain "), "plain");
    }
}
