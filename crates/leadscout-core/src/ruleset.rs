//! YAML loader for the ICP ruleset file.
//!
//! The file is the tenant's editable ruleset; the database copy (per
//! owner) takes precedence when present. Shape mirrors [`IcpRuleset`].

use std::path::Path;

use crate::icp::IcpRuleset;
use crate::ConfigError;

/// Load an ICP ruleset from a YAML file.
///
/// # Errors
///
/// Returns [`ConfigError::RulesetFile`] if the file cannot be read or does
/// not parse as a ruleset.
pub fn load_ruleset_file(path: &Path) -> Result<IcpRuleset, ConfigError> {
    let raw = std::fs::read_to_string(path).map_err(|e| ConfigError::RulesetFile {
        path: path.display().to_string(),
        reason: e.to_string(),
    })?;
    let ruleset: IcpRuleset =
        serde_yaml::from_str(&raw).map_err(|e| ConfigError::RulesetFile {
            path: path.display().to_string(),
            reason: e.to_string(),
        })?;
    Ok(ruleset)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_a_minimal_ruleset() {
        let yaml = "\
industries:
  - label: SaaS
    points: 10
company_sizes:
  - label: 51-200
    min: 51
    max: 200
    points: 10
negative_signals:
  - label: layoffs
    points: -10
";
        let ruleset: IcpRuleset = serde_yaml::from_str(yaml).expect("parse ruleset yaml");
        assert_eq!(ruleset.industries.len(), 1);
        assert!(ruleset.industries[0].enabled);
        assert_eq!(ruleset.company_sizes[0].max, Some(200));
        assert_eq!(ruleset.negative_signals[0].points, -10);
        assert!(ruleset.funding_stages.is_empty());
    }

    #[test]
    fn missing_file_is_a_ruleset_file_error() {
        let result = load_ruleset_file(Path::new("/nonexistent/ruleset.yaml"));
        assert!(matches!(result, Err(ConfigError::RulesetFile { .. })));
    }
}
