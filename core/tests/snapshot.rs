//! Snapshot interchange: export shape, import validation, fresh identities.

use season_core::{
    config::SeasonConfig,
    persona::{persona_templates, Persona, MAX_PERSONAS},
    snapshot::{
        export_json, import_json, validate, Scope, SnapshotError, ValidationIssue, SNAPSHOT_VERSION,
    },
};
use serde_json::{json, Value};

fn valid_document() -> Value {
    json!({
        "version": 1,
        "config": {
            "totalDays": 85, "totalTiers": 100, "xpPerTier": 80000,
            "xpPerMinute": 300, "dailyQuestXp": 25000, "weeklyChallengeXp": 120000,
            "isWeeklyStackable": true, "milestoneXp": 2400000,
            "challengeClearMins": 180, "costPerTier": 1.5
        },
        "personas": [
            { "name": "The Weekend Warrior", "color": "#818cf8",
              "sessionsPerWeek": 2, "minutesPerSession": 180, "startDay": 0 },
            { "name": "The Late Starter", "color": "#22d3ee",
              "sessionsPerWeek": 6, "minutesPerSession": 90, "startDay": 20 }
        ]
    })
}

fn import(value: &Value) -> Result<season_core::snapshot::ImportedWorkspace, SnapshotError> {
    import_json(&value.to_string())
}

#[test]
fn valid_document_imports() {
    let imported = import(&valid_document()).expect("valid snapshot");
    assert_eq!(imported.config, SeasonConfig::default());
    assert_eq!(imported.personas.len(), 2);
    assert_eq!(imported.personas[1].start_day, 20);
    assert_eq!(imported.personas[1].minutes_per_session, 90.0);
}

#[test]
fn imported_personas_get_fresh_unique_ids() {
    let mut doc = valid_document();
    doc["personas"][0]["id"] = json!("smuggled-id");
    let a = import(&doc).unwrap();
    let b = import(&doc).unwrap();

    assert_ne!(a.personas[0].id, "smuggled-id");
    assert_ne!(a.personas[0].id, a.personas[1].id);
    assert_ne!(a.personas[0].id, b.personas[0].id);
}

#[test]
fn export_omits_identity_and_round_trips() {
    let config = SeasonConfig::default();
    let personas: Vec<Persona> = persona_templates().iter().take(3).map(Persona::from_template).collect();

    let text = export_json(&config, &personas).unwrap();
    let value: Value = serde_json::from_str(&text).unwrap();
    assert_eq!(value["version"], json!(SNAPSHOT_VERSION));
    assert!(value["personas"][0].get("id").is_none());
    assert_eq!(value["personas"][0]["sessionsPerWeek"], json!(2));

    let imported = import_json(&text).unwrap();
    assert_eq!(imported.config, config);
    let templates: Vec<_> = imported.personas.iter().map(Persona::template).collect();
    let originals: Vec<_> = personas.iter().map(Persona::template).collect();
    assert_eq!(templates, originals);
}

#[test]
fn missing_config_field_is_reported_by_name() {
    let mut doc = valid_document();
    doc["config"].as_object_mut().unwrap().remove("xpPerTier");

    let err = import(&doc).unwrap_err();
    assert_eq!(
        err.first_issue(),
        Some(&ValidationIssue::MissingField { scope: Scope::Config, field: "xpPerTier" })
    );
    assert_eq!(err.to_string(), "missing config field \"xpPerTier\"");
}

#[test]
fn missing_persona_field_names_the_persona() {
    let mut doc = valid_document();
    doc["personas"][1].as_object_mut().unwrap().remove("startDay");

    let err = import(&doc).unwrap_err();
    assert_eq!(
        err.first_issue(),
        Some(&ValidationIssue::MissingField { scope: Scope::Persona(1), field: "startDay" })
    );
    assert_eq!(err.to_string(), "missing persona #2 field \"startDay\"");
}

#[test]
fn first_issue_comes_first_and_others_are_counted() {
    let mut doc = valid_document();
    let config = doc["config"].as_object_mut().unwrap();
    config.remove("totalDays");
    config.remove("costPerTier");
    doc["personas"][0].as_object_mut().unwrap().remove("color");

    let report = validate(&doc);
    assert_eq!(report.issues.len(), 3);
    let err = import(&doc).unwrap_err();
    assert_eq!(
        err.to_string(),
        "missing config field \"totalDays\" (and 2 more issues)"
    );
}

#[test]
fn wrong_shapes_are_rejected() {
    let mut doc = valid_document();
    doc["config"] = json!([1, 2, 3]);
    assert_eq!(
        import(&doc).unwrap_err().first_issue(),
        Some(&ValidationIssue::ConfigNotObject)
    );

    let mut doc = valid_document();
    doc["personas"] = json!([]);
    assert_eq!(
        import(&doc).unwrap_err().first_issue(),
        Some(&ValidationIssue::PersonasNotList)
    );

    let mut doc = valid_document();
    doc.as_object_mut().unwrap().remove("personas");
    assert_eq!(
        import(&doc).unwrap_err().first_issue(),
        Some(&ValidationIssue::PersonasNotList)
    );

    let mut doc = valid_document();
    doc.as_object_mut().unwrap().remove("config");
    assert_eq!(
        import(&doc).unwrap_err().first_issue(),
        Some(&ValidationIssue::MissingConfig)
    );

    assert_eq!(
        import(&json!("just a string")).unwrap_err().first_issue(),
        Some(&ValidationIssue::RootNotObject)
    );
}

#[test]
fn unparsable_text_is_a_parse_error() {
    assert!(matches!(import_json("{ not json"), Err(SnapshotError::Parse(_))));
}

#[test]
fn wrong_types_and_ranges_are_rejected() {
    let mut doc = valid_document();
    doc["config"]["isWeeklyStackable"] = json!("yes");
    assert!(matches!(
        import(&doc).unwrap_err().first_issue(),
        Some(ValidationIssue::WrongType { field: "isWeeklyStackable", .. })
    ));

    let mut doc = valid_document();
    doc["config"]["xpPerTier"] = json!(0);
    assert!(matches!(
        import(&doc).unwrap_err().first_issue(),
        Some(ValidationIssue::OutOfRange { field: "xpPerTier", .. })
    ));

    let mut doc = valid_document();
    doc["personas"][0]["sessionsPerWeek"] = json!(8);
    assert!(matches!(
        import(&doc).unwrap_err().first_issue(),
        Some(ValidationIssue::OutOfRange { scope: Scope::Persona(0), field: "sessionsPerWeek", .. })
    ));

    let mut doc = valid_document();
    doc["personas"][0]["sessionsPerWeek"] = json!(2.5);
    assert!(matches!(
        import(&doc).unwrap_err().first_issue(),
        Some(ValidationIssue::WrongType { field: "sessionsPerWeek", .. })
    ));

    let mut doc = valid_document();
    doc["personas"][1]["startDay"] = json!(85);
    assert!(matches!(
        import(&doc).unwrap_err().first_issue(),
        Some(ValidationIssue::OutOfRange { field: "startDay", .. })
    ));
}

#[test]
fn unsupported_version_is_rejected() {
    let mut doc = valid_document();
    doc["version"] = json!(2);
    assert!(matches!(
        import(&doc).unwrap_err().first_issue(),
        Some(ValidationIssue::UnsupportedVersion { .. })
    ));

    doc["version"] = json!(1.5);
    assert!(matches!(
        import(&doc).unwrap_err().first_issue(),
        Some(ValidationIssue::UnsupportedVersion { .. })
    ));
}

#[test]
fn whole_numbers_written_as_floats_are_accepted() {
    let mut doc = valid_document();
    doc["version"] = json!(1.0);
    doc["config"]["totalDays"] = json!(70.0);
    doc["personas"][0]["startDay"] = json!(3.0);
    let imported = import(&doc).unwrap();
    assert_eq!(imported.config.total_days, 70);
    assert_eq!(imported.personas[0].start_day, 3);
}

#[test]
fn oversized_persona_list_is_truncated() {
    let mut doc = valid_document();
    let persona = doc["personas"][0].clone();
    doc["personas"] = Value::Array(vec![persona; MAX_PERSONAS + 2]);
    assert_eq!(import(&doc).unwrap().personas.len(), MAX_PERSONAS);
}
