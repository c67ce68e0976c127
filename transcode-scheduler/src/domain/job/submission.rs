//! Job submission payload.

use serde::{Deserialize, Deserializer};

use crate::{Error, Result};

/// Fields accepted when a client submits a job.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct JobSubmission {
    #[serde(default, alias = "source")]
    pub input: Option<String>,
    #[serde(default, alias = "destination")]
    pub output: Option<String>,
    /// Preset name.
    #[serde(default)]
    pub preset: Option<String>,
    #[serde(default, deserialize_with = "lenient_i64")]
    pub priority: Option<i64>,
    /// `k=v,k=v` list.
    #[serde(default)]
    pub arguments: Option<String>,
}

impl JobSubmission {
    pub fn new(
        input: impl Into<String>,
        output: impl Into<String>,
        preset: impl Into<String>,
    ) -> Self {
        Self {
            input: Some(input.into()),
            output: Some(output.into()),
            preset: Some(preset.into()),
            priority: None,
            arguments: None,
        }
    }

    pub fn with_priority(mut self, priority: i64) -> Self {
        self.priority = Some(priority);
        self
    }

    pub fn with_arguments(mut self, arguments: impl Into<String>) -> Self {
        self.arguments = Some(arguments.into());
        self
    }

    /// Check required fields, collecting every problem into one error.
    ///
    /// `preset_found` reports whether the named preset resolved; pass `true`
    /// when no lookup has happened yet.
    pub fn validate(&self, preset_found: bool) -> Result<()> {
        let mut problems = Vec::new();
        if blank(&self.input) {
            problems.push("input can't be blank".to_string());
        }
        if blank(&self.output) {
            problems.push("output can't be blank".to_string());
        }
        match &self.preset {
            Some(name) if !name.trim().is_empty() => {
                if !preset_found {
                    problems.push(format!("preset '{}' does not exist", name.trim()));
                }
            }
            _ => problems.push("preset can't be blank".to_string()),
        }

        if problems.is_empty() {
            Ok(())
        } else {
            Err(Error::validation(problems.join("; ")))
        }
    }

    pub(crate) fn preset_name(&self) -> Option<&str> {
        self.preset
            .as_deref()
            .map(str::trim)
            .filter(|name| !name.is_empty())
    }
}

fn blank(value: &Option<String>) -> bool {
    value.as_deref().is_none_or(|v| v.trim().is_empty())
}

fn lenient_i64<'de, D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Option<i64>, D::Error> {
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Raw {
        Int(i64),
        Text(String),
    }

    match Option::<Raw>::deserialize(deserializer)? {
        None => Ok(None),
        Some(Raw::Int(n)) => Ok(Some(n)),
        Some(Raw::Text(s)) if s.trim().is_empty() => Ok(None),
        Some(Raw::Text(s)) => s.trim().parse().map(Some).map_err(serde::de::Error::custom),
    }
}
