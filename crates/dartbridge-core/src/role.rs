//! Process role: which side of the bridge this process runs

use std::fmt;
use std::path::Path;
use std::str::FromStr;

use crate::error::{Error, Result};

/// The role a process plays, fixed for its lifetime
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Role {
    /// Watches the dart recognition display and publishes rounds
    Producer,
    /// Receives rounds and enters scores into the scoreboard
    Consumer,
}

impl Role {
    /// Pick the role from which surface is present
    ///
    /// Exactly one of the two surfaces must exist; a process never plays both.
    pub fn detect(source: &Path, sink: &Path) -> Result<Self> {
        match (source.exists(), sink.exists()) {
            (true, false) => Ok(Role::Producer),
            (false, true) => Ok(Role::Consumer),
            (true, true) => Err(Error::config_invalid(format!(
                "both source ({}) and sink ({}) are present; pass --role to choose",
                source.display(),
                sink.display()
            ))),
            (false, false) => Err(Error::no_surface(
                source.parent().unwrap_or_else(|| Path::new(".")),
            )),
        }
    }

    pub fn is_producer(&self) -> bool {
        matches!(self, Role::Producer)
    }

    pub fn is_consumer(&self) -> bool {
        matches!(self, Role::Consumer)
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Role::Producer => write!(f, "producer"),
            Role::Consumer => write!(f, "consumer"),
        }
    }
}

impl FromStr for Role {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "producer" | "source" => Ok(Role::Producer),
            "consumer" | "sink" => Ok(Role::Consumer),
            other => Err(Error::config(format!("unknown role: {}", other))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_detect_producer() {
        let temp = tempdir().unwrap();
        let source = temp.path().join("source.txt");
        std::fs::write(&source, "- - -").unwrap();

        let role = Role::detect(&source, &temp.path().join("sink")).unwrap();
        assert_eq!(role, Role::Producer);
    }

    #[test]
    fn test_detect_consumer() {
        let temp = tempdir().unwrap();
        let sink = temp.path().join("sink");
        std::fs::create_dir_all(&sink).unwrap();

        let role = Role::detect(&temp.path().join("source.txt"), &sink).unwrap();
        assert_eq!(role, Role::Consumer);
    }

    #[test]
    fn test_detect_neither_is_fatal() {
        let temp = tempdir().unwrap();
        let err = Role::detect(&temp.path().join("source.txt"), &temp.path().join("sink"))
            .unwrap_err();
        assert!(err.is_fatal());
    }

    #[test]
    fn test_detect_both_is_ambiguous() {
        let temp = tempdir().unwrap();
        let source = temp.path().join("source.txt");
        let sink = temp.path().join("sink");
        std::fs::write(&source, "").unwrap();
        std::fs::create_dir_all(&sink).unwrap();

        let err = Role::detect(&source, &sink).unwrap_err();
        assert!(err.to_string().contains("--role"));
    }

    #[test]
    fn test_from_str() {
        assert_eq!("producer".parse::<Role>().unwrap(), Role::Producer);
        assert_eq!("Consumer".parse::<Role>().unwrap(), Role::Consumer);
        assert!("referee".parse::<Role>().is_err());
    }
}
