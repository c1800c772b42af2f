//! Capability configuration from TOML (`[[capabilities]]` tables)
//!
//! An entry whose id names a built-in capability adjusts it; any other entry
//! defines a custom capability and needs both `system` and `instruction`.
//!
//! ```toml
//! disabled_capabilities = ["first_principles"]
//!
//! [[capabilities]]
//! id = "skeptic"
//! priority = 120
//!
//! [[capabilities]]
//! id = "lawyer"
//! system = "You are a contract lawyer."
//! instruction = "Review the following clause and answer: {query}"
//! priority = 80
//! ```

use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use superposition_domain::capability::QUERY_PLACEHOLDER;
use superposition_domain::{
    Capability, CapabilityId, CapabilityRegistry, CapabilityTemplate, ConfigIssue,
    ConfigIssueCode, builtin_capabilities,
};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FileCapabilityConfig {
    pub id: String,
    #[serde(default)]
    pub system: Option<String>,
    /// Task instruction; `{query}` is replaced by the query text
    #[serde(default)]
    pub instruction: Option<String>,
    #[serde(default)]
    pub priority: Option<u32>,
    #[serde(default = "default_enabled")]
    pub enabled: bool,
}

fn default_enabled() -> bool {
    true
}

impl FileCapabilityConfig {
    fn apply_to(&self, mut capability: Capability) -> Capability {
        if let Some(priority) = self.priority {
            capability.priority = priority;
        }
        capability.enabled = self.enabled;
        capability
    }
}

/// Build the registry: built-ins, adjusted and extended by `entries`, then
/// `disabled` applied.
pub fn build_registry(
    entries: &[FileCapabilityConfig],
    disabled: &[String],
) -> (CapabilityRegistry, Vec<ConfigIssue>) {
    let mut issues = Vec::new();
    let mut catalog = builtin_capabilities();
    let mut seen = HashSet::new();

    for (index, entry) in entries.iter().enumerate() {
        let id = entry.id.trim();
        if id.is_empty() {
            issues.push(ConfigIssue::error(
                ConfigIssueCode::EmptyId,
                format!("capabilities[{}]: id must not be empty", index),
            ));
            continue;
        }
        if !seen.insert(id.to_string()) {
            issues.push(ConfigIssue::error(
                ConfigIssueCode::DuplicateId,
                format!("capabilities[{}]: '{}' is defined more than once", index, id),
            ));
            continue;
        }

        let custom = match (&entry.system, &entry.instruction) {
            (Some(system), Some(instruction)) => {
                if !instruction.contains(QUERY_PLACEHOLDER) {
                    issues.push(ConfigIssue::warning(
                        ConfigIssueCode::MissingPlaceholder,
                        format!(
                            "capabilities.{}: instruction has no {} placeholder; the query is appended",
                            id, QUERY_PLACEHOLDER
                        ),
                    ));
                }
                Some(CapabilityTemplate::Custom {
                    system: system.clone(),
                    instruction: instruction.clone(),
                })
            }
            (None, None) => None,
            _ => {
                issues.push(ConfigIssue::error(
                    ConfigIssueCode::UnknownValue,
                    format!(
                        "capabilities.{}: system and instruction must be given together",
                        id
                    ),
                ));
                continue;
            }
        };

        let position = catalog.iter().position(|c| c.id.as_str() == id);
        match (position, custom) {
            (Some(index), Some(template)) => {
                catalog[index].template = template;
                catalog[index] = entry.apply_to(catalog[index].clone());
            }
            (Some(index), None) => catalog[index] = entry.apply_to(catalog[index].clone()),
            (None, Some(template)) => catalog.push(entry.apply_to(Capability::new(id, template))),
            (None, None) => issues.push(ConfigIssue::error(
                ConfigIssueCode::UnknownCapability,
                format!(
                    "capabilities.{}: not a built-in capability, so system and instruction are required",
                    id
                ),
            )),
        }
    }

    for id in disabled {
        match catalog.iter_mut().find(|c| c.id.as_str() == id.trim()) {
            Some(capability) => capability.enabled = false,
            None => issues.push(ConfigIssue::warning(
                ConfigIssueCode::UnknownCapability,
                format!("disabled_capabilities: '{}' matches no capability", id),
            )),
        }
    }

    let registry = CapabilityRegistry::new();
    for capability in catalog {
        // Ids are unique at this point
        if let Err(e) = registry.register(capability) {
            issues.push(ConfigIssue::error(ConfigIssueCode::DuplicateId, e.to_string()));
        }
    }
    (registry, issues)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Deserialize)]
    struct Wrapper {
        #[serde(default)]
        capabilities: Vec<FileCapabilityConfig>,
        #[serde(default)]
        disabled_capabilities: Vec<String>,
    }

    fn parse(toml_str: &str) -> Wrapper {
        toml::from_str(toml_str).unwrap()
    }

    fn active_ids(registry: &CapabilityRegistry) -> Vec<String> {
        registry
            .list_active()
            .into_iter()
            .map(|c| c.id.to_string())
            .collect()
    }

    #[test]
    fn test_no_entries_yields_builtins() {
        let (registry, issues) = build_registry(&[], &[]);
        assert!(issues.is_empty());
        assert_eq!(registry.len(), builtin_capabilities().len());
    }

    #[test]
    fn test_custom_capability_and_disable() {
        let config = parse(
            r#"
disabled_capabilities = ["first_principles"]

[[capabilities]]
id = "lawyer"
system = "You are a contract lawyer."
instruction = "Review: {query}"
priority = 500
"#,
        );

        let (registry, issues) =
            build_registry(&config.capabilities, &config.disabled_capabilities);
        assert!(issues.is_empty());

        let active = active_ids(&registry);
        assert_eq!(active[0], "lawyer");
        assert!(!active.contains(&"first_principles".to_string()));

        let lawyer = registry.get(&CapabilityId::from("lawyer")).unwrap();
        assert_eq!(lawyer.template.render("Is clause 4 valid?"), "Review: Is clause 4 valid?");
    }

    #[test]
    fn test_builtin_adjustment() {
        let config = parse(
            r#"
[[capabilities]]
id = "skeptic"
priority = 1000

[[capabilities]]
id = "analyst"
enabled = false
"#,
        );

        let (registry, issues) = build_registry(&config.capabilities, &[]);
        assert!(issues.is_empty());

        let active = active_ids(&registry);
        assert_eq!(active[0], "skeptic");
        assert!(!active.contains(&"analyst".to_string()));
        assert_eq!(
            registry.get(&CapabilityId::from("skeptic")).unwrap().template,
            CapabilityTemplate::Skeptic
        );
    }

    #[test]
    fn test_issues_reported() {
        let config = parse(
            r#"
disabled_capabilities = ["nope"]

[[capabilities]]
id = ""

[[capabilities]]
id = "poet"
system = "You write verse."
instruction = "Answer in rhyme."

[[capabilities]]
id = "poet"
system = "Again"
instruction = "{query}"

[[capabilities]]
id = "ghost"
"#,
        );

        let (registry, issues) =
            build_registry(&config.capabilities, &config.disabled_capabilities);
        let codes: Vec<_> = issues.iter().map(|i| i.code).collect();
        assert_eq!(
            codes,
            vec![
                ConfigIssueCode::EmptyId,
                ConfigIssueCode::MissingPlaceholder,
                ConfigIssueCode::DuplicateId,
                ConfigIssueCode::UnknownCapability,
                ConfigIssueCode::UnknownCapability,
            ]
        );
        assert!(!issues[1].is_error());
        assert!(!issues[4].is_error());
        assert!(registry.get(&CapabilityId::from("poet")).is_some());
    }
}
