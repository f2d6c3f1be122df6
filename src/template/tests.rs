use super::catalog::*;
use super::*;

fn draft(name: &str, base_prompt: &str) -> TemplateDraft {
    TemplateDraft {
        name: name.to_string(),
        description: format!("{} description", name),
        category: String::new(),
        base_prompt: base_prompt.to_string(),
        variables: Vec::new(),
    }
}

fn custom(id: &str, name: &str, category: Option<&str>, created_at: i64) -> Template {
    Template {
        id: id.to_string(),
        name: name.to_string(),
        description: String::new(),
        category: category.map(str::to_string),
        base_prompt: "Do it.".to_string(),
        variables: Vec::new(),
        created_at: Some(created_at),
    }
}

#[test]
fn test_normalize_key() {
    assert_eq!(normalize_key("key points"), "KEYPOINTS");
    assert_eq!(normalize_key("call_to-action!"), "CALL_TOACTION");
    assert_eq!(normalize_key("v2"), "V2");
    assert_eq!(normalize_key("é?"), "");
}

#[test]
fn test_builtin_templates_have_unique_normalized_keys() {
    let templates = builtin_templates();
    assert_eq!(templates.len(), 7);
    assert_eq!(templates[0].id, "blog-post");

    for template in &templates {
        let mut keys: Vec<_> = template.variables.iter().map(|v| v.key.clone()).collect();
        for key in &keys {
            assert_eq!(key, &normalize_key(key));
            assert!(template.base_prompt.contains(&format!("[{}]", key)));
        }
        keys.sort();
        keys.dedup();
        assert_eq!(keys.len(), template.variables.len());
    }
}

#[test]
fn test_template_serialization_uses_original_field_names() {
    let template = builtin_templates().remove(4);
    let json = serde_json::to_value(&template).unwrap();

    assert!(json.get("basePrompt").is_some());
    assert_eq!(json["variables"][1]["type"], "textarea");
    assert_eq!(json["variables"][0]["type"], "input");
    assert!(json.get("createdAt").is_none());

    let parsed: Template = serde_json::from_value(json).unwrap();
    assert_eq!(parsed, template);
}

#[test]
fn test_create_template_normalizes_and_stamps() {
    let mut new_draft = draft("Haiku", "Write a haiku about [SUBJECT].");
    new_draft.category = "  Creative ".to_string();
    new_draft.variables = vec![TemplateVariable {
        key: "subject".to_string(),
        label: "Subject".to_string(),
        placeholder: String::new(),
        kind: VariableKind::SingleLine,
    }];

    let (updated, created) = create_template(&[], new_draft, 1_700_000_000_000).unwrap();
    assert_eq!(updated.len(), 1);
    assert_eq!(created.id, "custom-1700000000000");
    assert_eq!(created.created_at, Some(1_700_000_000_000));
    assert_eq!(created.category.as_deref(), Some("Creative"));
    assert_eq!(created.variables[0].key, "SUBJECT");
}

#[test]
fn test_create_template_rejects_invalid_drafts() {
    assert_eq!(
        create_template(&[], draft("", "x"), 1).unwrap_err(),
        TemplateError::MissingField("name")
    );
    assert_eq!(
        create_template(&[], draft("Name", "  "), 1).unwrap_err(),
        TemplateError::MissingField("base prompt")
    );

    let mut duplicate = draft("Dup", "[A] [A]");
    duplicate.variables = vec![TemplateVariable::new("a", "A"), TemplateVariable::new("A", "A")];
    assert!(matches!(
        create_template(&[], duplicate, 1),
        Err(TemplateError::InvalidVariable(_))
    ));

    let mut empty_key = draft("Empty", "x");
    empty_key.variables = vec![TemplateVariable {
        key: "***".to_string(),
        label: "Stars".to_string(),
        placeholder: String::new(),
        kind: VariableKind::SingleLine,
    }];
    assert!(matches!(
        create_template(&[], empty_key, 1),
        Err(TemplateError::InvalidVariable(_))
    ));
}

#[test]
fn test_create_template_avoids_id_collisions() {
    let existing = vec![custom("custom-5", "A", None, 5)];
    let (updated, created) = create_template(&existing, draft("B", "b"), 5).unwrap();
    assert_eq!(created.id, "custom-6");
    assert_eq!(updated.len(), 2);
}

#[test]
fn test_update_and_delete() {
    let existing = vec![custom("custom-1", "A", None, 1), custom("custom-2", "B", None, 2)];

    let updated = update_template(&existing, "custom-1", draft("A2", "new")).unwrap();
    assert_eq!(updated[0].name, "A2");
    assert_eq!(updated[0].created_at, Some(1));

    assert_eq!(
        update_template(&existing, "missing", draft("X", "x")).unwrap_err(),
        TemplateError::NotFound("missing".to_string())
    );
    assert_eq!(
        delete_template(&existing, "blog-post").unwrap_err(),
        TemplateError::BuiltIn("blog-post".to_string())
    );

    let remaining = delete_template(&existing, "custom-1").unwrap();
    assert_eq!(remaining.len(), 1);
    assert_eq!(remaining[0].id, "custom-2");

    assert_eq!(selection_after_delete("custom-1", "custom-1"), "blog-post");
    assert_eq!(selection_after_delete("custom-2", "custom-1"), "custom-2");
}

#[test]
fn test_reorder_templates() {
    let existing = vec![
        custom("a", "A", None, 1),
        custom("b", "B", None, 2),
        custom("c", "C", None, 3),
    ];

    let moved = reorder_templates(&existing, 0, 2).unwrap();
    let ids: Vec<_> = moved.iter().map(|t| t.id.as_str()).collect();
    assert_eq!(ids, vec!["b", "c", "a"]);

    assert_eq!(
        reorder_templates(&existing, 3, 0).unwrap_err(),
        TemplateError::IndexOutOfRange { index: 3, len: 3 }
    );
}

#[test]
fn test_find_template_falls_back_to_first_builtin() {
    let existing = vec![custom("custom-9", "Mine", None, 9)];
    assert_eq!(find_template(&existing, "custom-9").name, "Mine");
    assert_eq!(find_template(&existing, "gone").id, "blog-post");
    assert_eq!(all_templates(&existing).len(), 8);
}

#[test]
fn test_search_matches_name_or_description() {
    let templates = builtin_templates();
    let hits = search_templates(&templates, "EMAIL");
    assert_eq!(hits.len(), 1);
    assert_eq!(hits[0].id, "email-draft");

    let hits = search_templates(&templates, "summarize");
    assert_eq!(hits[0].id, "summarize-document");
}

#[test]
fn test_group_by_category_orders_categories_only() {
    let templates = vec![
        custom("1", "Zeta", Some("Writing"), 3),
        custom("2", "Alpha", None, 1),
        custom("3", "Mid", Some("Code"), 2),
        custom("4", "Beta", Some("Writing"), 4),
    ];

    let groups = group_templates(&templates, SortKey::Category, SortOrder::Asc);
    let categories: Vec<_> = groups.iter().map(|g| g.category.as_str()).collect();
    assert_eq!(categories, vec!["Code", "Uncategorized", "Writing"]);
    let writing: Vec<_> = groups[2].templates.iter().map(|t| t.name.as_str()).collect();
    assert_eq!(writing, vec!["Zeta", "Beta"]);

    let groups = group_templates(&templates, SortKey::Category, SortOrder::Desc);
    assert_eq!(groups[0].category, "Writing");
}

#[test]
fn test_group_by_name_and_date_keeps_uncategorized_last() {
    let templates = vec![
        custom("1", "Zeta", Some("Writing"), 3),
        custom("2", "Alpha", None, 1),
        custom("3", "Beta", Some("Writing"), 4),
        custom("4", "Gamma", Some("Art"), 2),
    ];

    let groups = group_templates(&templates, SortKey::Name, SortOrder::Asc);
    let categories: Vec<_> = groups.iter().map(|g| g.category.as_str()).collect();
    assert_eq!(categories, vec!["Art", "Writing", "Uncategorized"]);
    assert_eq!(groups[1].templates[0].name, "Beta");

    let groups = group_templates(&templates, SortKey::Date, SortKey::Date.default_order());
    assert_eq!(groups[1].templates[0].name, "Beta");
    assert_eq!(groups[1].templates[1].name, "Zeta");
}

#[test]
fn test_backfill_created_at() {
    let mut template = custom("1", "A", None, 0);
    template.created_at = None;
    let filled = catalog::backfill_created_at(vec![template]);
    assert_eq!(filled[0].created_at, Some(0));
}

#[test]
fn test_format_timestamp() {
    assert_eq!(format_timestamp(Some(1_700_000_000_000)), "Nov 14, 2023");
    assert_eq!(format_timestamp(Some(0)), "");
    assert_eq!(format_timestamp(None), "");
}
