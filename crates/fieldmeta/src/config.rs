use anyhow::{anyhow, Result};
use directories::{BaseDirs, ProjectDirs};
use figment::{
    providers::{Env, Format, Serialized, Toml},
    Figment,
};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Connection settings and defaults for the field commands
#[derive(Debug, Deserialize, Serialize, Default, PartialEq)]
pub struct Config {
    /// Jira instance URL
    pub url: Option<String>,
    /// Username for Basic Auth; Bearer auth is used when absent
    pub user: Option<String>,
    /// API token, password or personal access token
    pub token: Option<String>,
    /// Default project key or name
    pub project: Option<String>,
    /// Default issue type name
    pub issue_type: Option<String>,
}

impl Config {
    pub fn load(config_path: Option<PathBuf>) -> Result<Self> {
        let mut figment = Figment::new().merge(Serialized::defaults(Config::default()));

        let explicit_path = config_path.as_deref();
        if let Some(path) = explicit_path {
            if !path.exists() {
                return Err(anyhow!("Config file not found: {}", path.display()));
            }
        }

        for path in config_paths(explicit_path) {
            if path.exists() {
                figment = figment.merge(Toml::file(path));
            }
        }

        figment = figment.merge(Env::prefixed("FIELDMETA_").only(&[
            "url",
            "user",
            "token",
            "project",
            "issue_type",
        ]));

        figment
            .extract()
            .map_err(|e| anyhow!("Failed to load config: {}", e))
    }

    pub fn merge_with_cli(
        &mut self,
        cli_url: Option<String>,
        cli_user: Option<String>,
        cli_token: Option<String>,
    ) {
        if let Some(url) = cli_url {
            self.url = Some(url);
        }
        if let Some(user) = cli_user {
            self.user = Some(user);
        }
        if let Some(token) = cli_token {
            self.token = Some(token);
        }
    }

    /// Ensure the settings needed to reach the server are present
    pub fn validate(&self) -> Result<()> {
        if self.url.is_none() {
            return Err(anyhow!(
                "Jira URL not configured. Set via --url, FIELDMETA_URL env var, or config file"
            ));
        }
        if self.token.is_none() {
            return Err(anyhow!(
                "Jira token not configured. Set via --token, FIELDMETA_TOKEN env var, or config file"
            ));
        }
        Ok(())
    }
}

fn config_paths(explicit: Option<&Path>) -> Vec<PathBuf> {
    let mut paths = Vec::new();

    if let Some(path) = explicit {
        paths.push(path.to_path_buf());
        return paths;
    }

    if let Some(path) = get_project_config_path() {
        push_unique(&mut paths, path);
    }
    if let Some(path) = get_xdg_config_path() {
        push_unique(&mut paths, path);
    }
    if let Some(path) = get_local_config_path() {
        push_unique(&mut paths, path);
    }

    paths
}

fn push_unique(paths: &mut Vec<PathBuf>, path: PathBuf) {
    if !paths.contains(&path) {
        paths.push(path);
    }
}

fn get_project_config_path() -> Option<PathBuf> {
    ProjectDirs::from("", "", "fieldmeta").map(|d| d.config_dir().join("config.toml"))
}

fn get_xdg_config_path() -> Option<PathBuf> {
    if let Some(dir) = std::env::var_os("XDG_CONFIG_HOME") {
        return Some(PathBuf::from(dir).join("fieldmeta").join("config.toml"));
    }

    BaseDirs::new().map(|dirs| {
        dirs.home_dir()
            .join(".config")
            .join("fieldmeta")
            .join("config.toml")
    })
}

fn get_local_config_path() -> Option<PathBuf> {
    std::env::current_dir()
        .ok()
        .map(|dir| dir.join(".fieldmeta.toml"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn explicit_config_file_is_loaded() {
        figment::Jail::expect_with(|jail| {
            jail.create_file(
                "custom.toml",
                r#"
                url = "https://jira.example.com"
                token = "secret"
                project = "OPS"
                issue_type = "Bug"
                "#,
            )?;

            let config = Config::load(Some(PathBuf::from("custom.toml"))).unwrap();
            assert_eq!(config.url.as_deref(), Some("https://jira.example.com"));
            assert_eq!(config.project.as_deref(), Some("OPS"));
            assert_eq!(config.issue_type.as_deref(), Some("Bug"));
            assert!(config.user.is_none());
            Ok(())
        });
    }

    #[test]
    fn env_overrides_file() {
        figment::Jail::expect_with(|jail| {
            jail.create_file("custom.toml", r#"url = "https://file.example.com""#)?;
            jail.set_env("FIELDMETA_URL", "https://env.example.com");
            jail.set_env("FIELDMETA_ISSUE_TYPE", "Story");

            let config = Config::load(Some(PathBuf::from("custom.toml"))).unwrap();
            assert_eq!(config.url.as_deref(), Some("https://env.example.com"));
            assert_eq!(config.issue_type.as_deref(), Some("Story"));
            Ok(())
        });
    }

    #[test]
    fn missing_explicit_config_is_an_error() {
        let err = Config::load(Some(PathBuf::from("/definitely/not/here.toml"))).unwrap_err();
        assert!(err.to_string().contains("Config file not found"));
    }

    #[test]
    fn cli_values_win_and_validate() {
        let mut config = Config::default();
        assert!(config.validate().is_err());

        config.merge_with_cli(
            Some("https://jira.example.com".into()),
            None,
            Some("pat".into()),
        );
        assert!(config.validate().is_ok());
    }
}
