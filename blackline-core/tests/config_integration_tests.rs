// blackline-core/tests/config_integration_tests.rs
use anyhow::Result;
use std::io::Write;
use tempfile::NamedTempFile;
use test_log::test;

use blackline_core::config::{self, BlacklineConfig, Category, DetectionRule, ExportConfig};
use blackline_core::{DetectionEngine, RegexEngine};

fn write_yaml(yaml: &str) -> Result<NamedTempFile> {
    let mut file = NamedTempFile::new()?;
    file.write_all(yaml.as_bytes())?;
    Ok(file)
}

#[test]
fn test_load_default_rules() {
    let config = BlacklineConfig::load_default_rules().unwrap();
    assert!(!config.rules.is_empty());
    let name_rule = config.rules.iter().find(|r| r.name == "person_name").unwrap();
    assert_eq!(name_rule.category, Category::Name);
    assert!(name_rule.shift_sentence_initial);
    let email_rule = config.rules.iter().find(|r| r.name == "email").unwrap();
    assert!(!email_rule.shift_sentence_initial);
}

#[test]
fn test_load_from_file() -> Result<()> {
    let file = write_yaml(
        r#"
rules:
  - name: employee_id
    category: Name
    pattern: "EMP-\\d{6}"
export:
  page_width: "210mm"
  page_height: "297mm"
  margin: "20mm"
  font_family: "Arial"
  font_size: "11pt"
  line_height: "1.0"
"#,
    )?;
    let config = BlacklineConfig::load_from_file(file.path())?;
    assert_eq!(config.rules.len(), 1);
    assert_eq!(config.rules[0].name, "employee_id");
    assert_eq!(config.rules[0].pattern.as_deref(), Some(r"EMP-\d{6}"));
    assert!(!config.rules[0].opt_in);
    assert_eq!(config.export.page_width, "210mm");
    assert_eq!(config.export.font_family, "Arial");
    Ok(())
}

#[test]
fn test_load_from_file_uses_export_defaults_when_section_missing() -> Result<()> {
    let file = write_yaml(
        r#"
rules:
  - name: ticket
    category: Date
    pattern: "T-\\d+"
"#,
    )?;
    let config = BlacklineConfig::load_from_file(file.path())?;
    assert_eq!(config.export, ExportConfig::default());
    Ok(())
}

#[test]
fn test_load_from_file_rejects_invalid_regex() -> Result<()> {
    let file = write_yaml(
        r#"
rules:
  - name: broken
    category: Email
    pattern: "([a-z"
"#,
    )?;
    let err = BlacklineConfig::load_from_file(file.path()).unwrap_err();
    assert!(err.to_string().contains("broken"));
    Ok(())
}

#[test]
fn test_load_from_file_rejects_duplicate_names() -> Result<()> {
    let file = write_yaml(
        r#"
rules:
  - name: dup
    category: Email
    pattern: "a"
  - name: dup
    category: Phone
    pattern: "b"
"#,
    )?;
    assert!(BlacklineConfig::load_from_file(file.path()).is_err());
    Ok(())
}

#[test]
fn test_load_from_file_rejects_unsafe_export_values() -> Result<()> {
    let file = write_yaml(
        r#"
rules: []
export:
  font_family: "Arial; } body { display:none"
"#,
    )?;
    assert!(BlacklineConfig::load_from_file(file.path()).is_err());
    Ok(())
}

#[test]
fn test_merge_rules_no_user_config() -> Result<()> {
    let defaults = BlacklineConfig::load_default_rules()?;
    let merged = config::merge_rules(defaults.clone(), None);
    assert_eq!(merged, defaults);
    Ok(())
}

#[test]
fn test_merge_rules_override_and_add() -> Result<()> {
    let defaults = BlacklineConfig::load_default_rules()?;
    let user = BlacklineConfig {
        rules: vec![
            DetectionRule {
                name: "email".to_string(),
                category: Category::Email,
                pattern: Some(r"\b[a-z]+@corp\.example\b".to_string()),
                ..Default::default()
            },
            DetectionRule {
                name: "badge".to_string(),
                category: Category::Name,
                pattern: Some(r"\bB\d{4}\b".to_string()),
                ..Default::default()
            },
        ],
        export: ExportConfig::default(),
    };
    let merged = config::merge_rules(defaults.clone(), Some(user));
    assert_eq!(merged.rules.len(), defaults.rules.len() + 1);
    assert_eq!(merged.rules[0].pattern.as_deref(), Some(r"\b[a-z]+@corp\.example\b"));
    assert_eq!(merged.rules.last().map(|r| r.name.as_str()), Some("badge"));

    let engine = RegexEngine::new(merged)?;
    let found = engine.detect("alice@corp.example wears B1234; bob@other.org does not.");
    let texts: Vec<&str> = found.iter().map(|c| c.text.as_str()).collect();
    assert_eq!(texts, ["alice@corp.example", "B1234"]);
    Ok(())
}

#[test]
fn test_opt_in_rules_need_enabling() -> Result<()> {
    let mut config = BlacklineConfig::load_default_rules()?;
    config.rules.push(DetectionRule {
        name: "zip_code".to_string(),
        category: Category::Date,
        pattern: Some(r"\b\d{5}\b".to_string()),
        opt_in: true,
        ..Default::default()
    });

    let mut without = config.clone();
    without.set_active_rules(&[], &["person_name".to_string()]);
    assert!(without.rules.iter().all(|r| r.name != "zip_code" && r.name != "person_name"));

    config.set_active_rules(&["zip_code".to_string()], &[]);
    assert!(config.rules.iter().any(|r| r.name == "zip_code"));
    Ok(())
}

#[test]
fn test_enabled_flag_overrides_opt_in() -> Result<()> {
    let mut config = BlacklineConfig::load_default_rules()?;
    config.rules.push(DetectionRule {
        name: "zip_code".to_string(),
        category: Category::Date,
        pattern: Some(r"\b\d{5}\b".to_string()),
        opt_in: true,
        enabled: Some(true),
        ..Default::default()
    });
    config.rules[0].enabled = Some(false);

    let mut active = config.clone();
    active.set_active_rules(&[], &[]);
    let names: Vec<&str> = active.rules.iter().map(|r| r.name.as_str()).collect();
    assert_eq!(names, ["phone", "ssn", "date", "person_name", "zip_code"]);

    // Naming a rule explicitly enables it even when its flag says otherwise.
    config.set_active_rules(&["email".to_string()], &[]);
    assert_eq!(config.rules[0].name, "email");
    let engine = RegexEngine::new(config)?;
    assert_eq!(engine.compiled_rules().rules.len(), 6);
    Ok(())
}

#[test]
fn test_load_effective_config_with_explicit_path() -> Result<()> {
    let file = write_yaml(
        r#"
rules:
  - name: phone
    category: Phone
    pattern: "\\+44 \\d{4} \\d{6}"
"#,
    )?;
    let config = config::load_effective_config(Some(file.path()))?;
    let phone = config.rules.iter().find(|r| r.name == "phone").unwrap();
    assert_eq!(phone.pattern.as_deref(), Some(r"\+44 \d{4} \d{6}"));
    assert_eq!(config.rules.len(), BlacklineConfig::load_default_rules()?.rules.len());
    Ok(())
}
