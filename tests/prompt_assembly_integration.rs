//! End-to-end prompt assembly over the built-in and custom templates.

use promptforge::prompt::{FORMAT_OPTIONS, STYLE_OPTIONS, TONE_OPTIONS};
use promptforge::template::catalog::{all_templates, create_template};
use promptforge::template::{TemplateDraft, TemplateVariable};
use promptforge::{PromptInputs, assemble_prompt, builtin_templates};

#[test]
fn test_every_builtin_assembles_with_defaults() {
    for template in builtin_templates() {
        let inputs = PromptInputs::for_template(&template);
        let prompt = assemble_prompt(&inputs, &template);

        assert!(prompt.starts_with("Act as a helpful assistant."), "{}", template.id);
        assert!(prompt.contains("Please adhere to the following constraints:"));
        assert!(prompt.contains(&format!("- Tone: {}", TONE_OPTIONS[0])));
        assert!(prompt.contains(&format!("- Style: {}", STYLE_OPTIONS[0])));
        assert!(prompt.contains(&format!("- Output Format: {}", FORMAT_OPTIONS[0])));
        assert!(!prompt.contains("IMPORTANT: Do NOT include"));

        for variable in &template.variables {
            assert!(
                prompt.contains(&format!("[{}]", variable.label)),
                "unfilled {} should show its label",
                variable.key
            );
        }
    }
}

#[test]
fn test_assembly_is_deterministic() {
    let template = builtin_templates().remove(0);
    let inputs = PromptInputs::for_template(&template)
        .with("TOPIC", "WebAssembly")
        .with("context", "Audience knows JavaScript.");

    assert_eq!(
        assemble_prompt(&inputs, &template),
        assemble_prompt(&inputs.clone(), &template)
    );
}

#[test]
fn test_custom_template_round_trip_through_catalog() {
    let draft = TemplateDraft {
        name: "Release Notes".to_string(),
        description: "Summarize a release".to_string(),
        category: " Engineering ".to_string(),
        base_prompt: "Write release notes for version [VERSION] covering [CHANGES].".to_string(),
        variables: vec![
            TemplateVariable::new("version", "Version"),
            TemplateVariable::new("changes", "Changes").multi_line(),
        ],
    };

    let (custom, created) = create_template(&[], draft, 1_700_000_000_000).unwrap();
    assert_eq!(created.category.as_deref(), Some("Engineering"));
    assert_eq!(all_templates(&custom).last(), Some(&created));

    let inputs = PromptInputs::for_template(&created)
        .with("VERSION", "2.0")
        .with("negativeConstraints", "marketing language\nemoji");
    let prompt = assemble_prompt(&inputs, &created);

    assert!(prompt.contains(
        "Your task is to: Write release notes for version 2.0 covering [Changes]."
    ));
    assert!(prompt.ends_with(
        "IMPORTANT: Do NOT include the following:\n- marketing language\n- emoji"
    ));
}
