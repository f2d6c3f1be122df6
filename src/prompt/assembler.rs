//! Deterministic prompt assembly.
//!
//! Sections are emitted in a fixed order and separated by a blank line:
//!
//! 1. persona (`Act as ...`), when set
//! 2. the task, built from the template's base prompt
//! 3. a fenced context block, when set
//! 4. the constraints header, always, followed by one bullet per set field
//! 5. negative constraints, when set, one bullet per line
//!
//! Each variable replaces only the first occurrence of its `[KEY]` token.
//! Unfilled variables leave a visible `[Label]` marker behind.

use crate::prompt::inputs::PromptInputs;
use crate::template::Template;

const CONSTRAINTS_HEADER: &str = "Please adhere to the following constraints:";
const NEGATIVE_HEADER: &str = "IMPORTANT: Do NOT include the following:";

/// Merge `inputs` into `template`, producing the final prompt.
pub fn assemble_prompt(inputs: &PromptInputs, template: &Template) -> String {
    let mut sections: Vec<String> = Vec::with_capacity(5);

    if !inputs.persona.is_empty() {
        sections.push(format!("Act as {}.", inputs.persona));
    }

    sections.push(format!("Your task is to: {}", render_task(inputs, template)));

    if !inputs.context.is_empty() {
        sections.push(format!(
            "Use the following context as background information:\n---\n{}\n---",
            inputs.context
        ));
    }

    sections.push(render_constraints(inputs));

    if !inputs.negative_constraints.is_empty() {
        let bullets: Vec<String> = inputs
            .negative_constraints
            .split('\n')
            .map(|segment| format!("- {}", segment))
            .collect();
        sections.push(format!("{}\n{}", NEGATIVE_HEADER, bullets.join("\n")));
    }

    sections.join("\n\n").trim().to_string()
}

/// Substitute template variables into the base prompt, first occurrence only.
pub fn render_task(inputs: &PromptInputs, template: &Template) -> String {
    template
        .variables
        .iter()
        .fold(template.base_prompt.clone(), |task, variable| {
            let value = match inputs.variable(&variable.key) {
                Some(v) if !v.is_empty() => v.to_string(),
                _ => format!("[{}]", variable.label),
            };
            task.replacen(&variable.token(), &value, 1)
        })
}

fn render_constraints(inputs: &PromptInputs) -> String {
    let fields = [
        ("Target Audience", &inputs.audience),
        ("Tone", &inputs.tone),
        ("Style", &inputs.style),
        ("Output Format", &inputs.format),
        ("Length", &inputs.length),
    ];

    let mut block = CONSTRAINTS_HEADER.to_string();
    for (label, value) in fields {
        if !value.is_empty() {
            block.push_str(&format!("\n- {}: {}", label, value));
        }
    }
    block
}
