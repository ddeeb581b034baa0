//! Package manager acquisition adapter
//!
//! Installs ffmpeg through whichever system package manager is present.
//! Nothing outside this module touches installation state.

use std::process::Stdio;
use std::time::Duration;

use async_trait::async_trait;
use tokio::process::Command;
use tokio::time::timeout;
use tracing::{debug, info, warn};

use crate::ports::AcquirePort;

/// Budget for the `--version` presence check of a package manager
const PRESENCE_TIMEOUT: Duration = Duration::from_secs(10);

/// One way of installing ffmpeg
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PackageRecipe {
    /// Program probed with `--version` before anything else runs
    pub manager: String,
    /// Index refresh; its exit status is ignored (`yum check-update` exits 100)
    pub refresh: Option<Vec<String>>,
    pub install: Vec<String>,
}

impl PackageRecipe {
    pub fn new(manager: &str, refresh: Option<&[&str]>, install: &[&str]) -> Self {
        let owned = |args: &[&str]| args.iter().map(|a| a.to_string()).collect::<Vec<_>>();
        Self {
            manager: manager.to_string(),
            refresh: refresh.map(owned),
            install: owned(install),
        }
    }
}

/// Recipes tried in order on the given platform (`std::env::consts::OS`)
pub fn recipes_for(os: &str) -> Vec<PackageRecipe> {
    match os {
        "linux" => vec![
            PackageRecipe::new(
                "apt",
                Some(&["apt", "update"]),
                &["apt", "install", "-y", "ffmpeg"],
            ),
            PackageRecipe::new(
                "dnf",
                Some(&["dnf", "check-update"]),
                &["dnf", "install", "-y", "ffmpeg"],
            ),
            PackageRecipe::new(
                "yum",
                Some(&["yum", "check-update"]),
                &["yum", "install", "-y", "ffmpeg"],
            ),
            PackageRecipe::new(
                "pacman",
                Some(&["pacman", "-Sy"]),
                &["pacman", "-S", "--noconfirm", "ffmpeg"],
            ),
            PackageRecipe::new(
                "zypper",
                Some(&["zypper", "refresh"]),
                &["zypper", "install", "-y", "ffmpeg"],
            ),
            PackageRecipe::new("snap", None, &["snap", "install", "ffmpeg"]),
        ],
        "macos" => vec![PackageRecipe::new("brew", None, &["brew", "install", "ffmpeg"])],
        "windows" => vec![
            PackageRecipe::new(
                "winget",
                None,
                &[
                    "winget",
                    "install",
                    "--id",
                    "Gyan.FFmpeg",
                    "-e",
                    "--accept-source-agreements",
                    "--accept-package-agreements",
                ],
            ),
            PackageRecipe::new("choco", None, &["choco", "install", "ffmpeg", "-y"]),
        ],
        _ => Vec::new(),
    }
}

/// Package manager based acquisition adapter
#[derive(Debug, Clone)]
pub struct PackageManagerAdapter {
    recipes: Vec<PackageRecipe>,
}

impl Default for PackageManagerAdapter {
    fn default() -> Self {
        Self::new()
    }
}

impl PackageManagerAdapter {
    /// Adapter using the current platform's recipes
    pub fn new() -> Self {
        Self::with_recipes(recipes_for(std::env::consts::OS))
    }

    pub fn with_recipes(recipes: Vec<PackageRecipe>) -> Self {
        Self { recipes }
    }

    pub fn recipes(&self) -> &[PackageRecipe] {
        &self.recipes
    }

    async fn is_present(manager: &str) -> bool {
        let mut command = Command::new(manager);
        command
            .arg("--version")
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .kill_on_drop(true);

        matches!(
            timeout(PRESENCE_TIMEOUT, command.status()).await,
            Ok(Ok(status)) if status.success()
        )
    }

    /// Run a command line; Ok(true) on zero exit, stderr returned on failure
    async fn run(argv: &[String]) -> Result<bool, String> {
        let Some((program, args)) = argv.split_first() else {
            return Err("empty command".to_string());
        };

        let output = Command::new(program)
            .args(args)
            .stdin(Stdio::null())
            .kill_on_drop(true)
            .output()
            .await
            .map_err(|e| format!("{}: {}", program, e))?;

        if output.status.success() {
            Ok(true)
        } else {
            let stderr = String::from_utf8_lossy(&output.stderr);
            Err(stderr.trim().lines().last().unwrap_or("").to_string())
        }
    }

    async fn try_recipe(recipe: &PackageRecipe) -> bool {
        if !Self::is_present(&recipe.manager).await {
            debug!(manager = %recipe.manager, "Package manager not found");
            return false;
        }

        info!(manager = %recipe.manager, "Installing ffmpeg");

        if let Some(refresh) = &recipe.refresh {
            if let Err(e) = Self::run(refresh).await {
                debug!(manager = %recipe.manager, "Index refresh reported: {}", e);
            }
        }

        match Self::run(&recipe.install).await {
            Ok(_) => true,
            Err(e) => {
                warn!(manager = %recipe.manager, "Install failed: {}", e);
                false
            }
        }
    }
}

#[async_trait]
impl AcquirePort for PackageManagerAdapter {
    async fn acquire(&self) -> bool {
        if self.recipes.is_empty() {
            warn!(os = std::env::consts::OS, "No known package manager for this platform");
            return false;
        }

        for recipe in &self.recipes {
            if Self::try_recipe(recipe).await {
                info!(manager = %recipe.manager, "ffmpeg installed");
                return true;
            }
        }

        warn!("Could not install ffmpeg automatically; install it manually");
        false
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_linux_order() {
        let managers: Vec<String> = recipes_for("linux").into_iter().map(|r| r.manager).collect();
        assert_eq!(managers, ["apt", "dnf", "yum", "pacman", "zypper", "snap"]);
    }

    #[test]
    fn test_every_recipe_installs_ffmpeg() {
        for os in ["linux", "macos", "windows"] {
            let recipes = recipes_for(os);
            assert!(!recipes.is_empty(), "{}", os);
            for recipe in recipes {
                assert_eq!(recipe.install[0], recipe.manager);
                assert!(recipe.install.iter().any(|a| a.to_lowercase().contains("ffmpeg")));
            }
        }
    }

    #[test]
    fn test_unknown_platform_has_no_recipes() {
        assert!(recipes_for("plan9").is_empty());
    }

    #[tokio::test]
    async fn test_no_recipes_fails() {
        assert!(!PackageManagerAdapter::with_recipes(Vec::new()).acquire().await);
    }

    #[tokio::test]
    async fn test_missing_managers_are_skipped() {
        let adapter = PackageManagerAdapter::with_recipes(vec![PackageRecipe::new(
            "/nonexistent/pkg",
            None,
            &["/nonexistent/pkg", "install", "ffmpeg"],
        )]);
        assert!(!adapter.acquire().await);
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_first_working_manager_wins() {
        use std::os::unix::fs::PermissionsExt;

        let dir = tempfile::tempdir().unwrap();
        let write_tool = |name: &str, body: &str| {
            let path = dir.path().join(name);
            std::fs::write(&path, format!("#!/bin/sh\n{}\n", body)).unwrap();
            std::fs::set_permissions(&path, std::fs::Permissions::from_mode(0o755)).unwrap();
            path.to_string_lossy().to_string()
        };

        let broken = write_tool("broken", r#"[ "$1" = "--version" ] && exit 0; exit 1"#);
        let working = write_tool("working", "exit 0");

        let adapter = PackageManagerAdapter::with_recipes(vec![
            PackageRecipe::new("/nonexistent/pkg", None, &["/nonexistent/pkg"]),
            PackageRecipe::new(&broken, Some(&[&broken, "refresh"]), &[&broken, "install"]),
            PackageRecipe::new(&working, None, &[&working, "install"]),
        ]);

        assert!(adapter.acquire().await);
    }
}
