//! Templates shipped with the application.

use crate::template::types::{Template, TemplateVariable};

fn builtin(
    id: &str,
    name: &str,
    description: &str,
    category: &str,
    base_prompt: &str,
    variables: Vec<TemplateVariable>,
) -> Template {
    Template {
        id: id.to_string(),
        name: name.to_string(),
        description: description.to_string(),
        category: Some(category.to_string()),
        base_prompt: base_prompt.to_string(),
        variables,
        created_at: None,
    }
}

/// All built-in templates in display order. The first one is the default selection.
pub fn builtin_templates() -> Vec<Template> {
    vec![
        builtin(
            "blog-post",
            "Blog Post Idea",
            "Generate a blog post outline or full content.",
            "Content Creation",
            "Generate a blog post titled \"[TITLE]\" about [TOPIC]. The post should include an engaging introduction, a main body covering these key points: [KEY_POINTS], and a concluding paragraph with a clear call to action: [CALL_TO_ACTION].",
            vec![
                TemplateVariable::new("TITLE", "Blog Post Title")
                    .with_placeholder("e.g., 10 Ways AI is Revolutionizing Web Development"),
                TemplateVariable::new("TOPIC", "Main Topic").with_placeholder(
                    "e.g., The impact of AI on modern web development practices",
                ),
                TemplateVariable::new("KEY_POINTS", "Key Points")
                    .with_placeholder("e.g., - AI-powered code generation\n- Automated testing\n- Personalized user experiences")
                    .multi_line(),
                TemplateVariable::new("CALL_TO_ACTION", "Call to Action")
                    .with_placeholder("e.g., \"Share your thoughts in the comments below!\""),
            ],
        ),
        builtin(
            "email-draft",
            "Email Draft",
            "Create a professional or casual email.",
            "Communication",
            "Draft an email to [RECIPIENT] with the subject line \"[SUBJECT]\". The core message is: [MESSAGE]. Please sign off with \"[SIGN_OFF]\" from [SENDER_NAME].",
            vec![
                TemplateVariable::new("RECIPIENT", "Recipient")
                    .with_placeholder("e.g., The Marketing Team"),
                TemplateVariable::new("SUBJECT", "Subject")
                    .with_placeholder("e.g., Q3 Marketing Campaign Kick-off"),
                TemplateVariable::new("MESSAGE", "Main Message")
                    .with_placeholder("Summarize the core message of the email, including any questions or required actions.")
                    .multi_line(),
                TemplateVariable::new("SENDER_NAME", "Sender Name")
                    .with_placeholder("e.g., Alex Johnson"),
                TemplateVariable::new("SIGN_OFF", "Desired Sign-off")
                    .with_placeholder("e.g., Best regards, Cheers, Sincerely"),
            ],
        ),
        builtin(
            "code-generator",
            "Code Snippet Generator",
            "Generate code in a specific language.",
            "Development",
            "Write a function in [LANGUAGE] that [FUNCTION_PURPOSE]. It must adhere to these requirements: [REQUIREMENTS]. Include a brief explanation and a usage example.",
            vec![
                TemplateVariable::new("LANGUAGE", "Programming Language")
                    .with_placeholder("e.g., Python, JavaScript, TypeScript"),
                TemplateVariable::new("FUNCTION_PURPOSE", "Function Purpose")
                    .with_placeholder("e.g., takes a list of numbers and returns the sum")
                    .multi_line(),
                TemplateVariable::new("REQUIREMENTS", "Specific Requirements")
                    .with_placeholder("e.g., - Must be asynchronous\n- Handle null inputs gracefully\n- Add comments for clarity")
                    .multi_line(),
            ],
        ),
        builtin(
            "class-generator",
            "Class Generator",
            "Generate a class structure in an object-oriented language.",
            "Development",
            "Create a class named `[CLASS_NAME]` in [LANGUAGE]. The purpose of this class is to [FUNCTION_PURPOSE]. It should have the following properties and methods, and adhere to these requirements: [REQUIREMENTS].",
            vec![
                TemplateVariable::new("LANGUAGE", "Programming Language")
                    .with_placeholder("e.g., TypeScript, Python, Java"),
                TemplateVariable::new("CLASS_NAME", "Class Name")
                    .with_placeholder("e.g., User, DataProcessor"),
                TemplateVariable::new("FUNCTION_PURPOSE", "Purpose of the Class")
                    .with_placeholder("e.g., manage user data and authentication")
                    .multi_line(),
                TemplateVariable::new("REQUIREMENTS", "Properties, Methods, and Requirements")
                    .with_placeholder("e.g.,- Properties: id, username, email\n- Methods: constructor, save(), delete()\n- Must be immutable")
                    .multi_line(),
            ],
        ),
        builtin(
            "story-generator",
            "Story Generator",
            "Generate a short story script, then create voice and video.",
            "Creative",
            "Generate a short story script based on the following details. The story should be imaginative and suitable for a short animated video.\n\nTheme: [THEME]\n\nCharacters:\n[CHARACTERS]\n\nKey Plot Points:\n[PLOT_POINTS]",
            vec![
                TemplateVariable::new("THEME", "Story Theme")
                    .with_placeholder("e.g., A magical friendship, a space adventure"),
                TemplateVariable::new("CHARACTERS", "Main Characters")
                    .with_placeholder("e.g., - A curious fox named Finn\n- A grumpy but wise old owl")
                    .multi_line(),
                TemplateVariable::new("PLOT_POINTS", "Key Plot Points")
                    .with_placeholder("e.g., - The characters discover a hidden map\n- They overcome a challenge\n- They find a surprising treasure")
                    .multi_line(),
            ],
        ),
        builtin(
            "social-media-post",
            "Social Media Post",
            "Craft a post for various social media platforms.",
            "Content Creation",
            "Create a social media post for [PLATFORM] about [CONTENT_IDEA]. Include a clear call to action: [CALL_TO_ACTION]. Suggest relevant hashtags like [HASHTAGS].",
            vec![
                TemplateVariable::new("PLATFORM", "Platform")
                    .with_placeholder("e.g., Twitter, LinkedIn, Instagram"),
                TemplateVariable::new("CONTENT_IDEA", "Content Idea")
                    .with_placeholder("e.g., Announcing a new product feature for real-time collaboration.")
                    .multi_line(),
                TemplateVariable::new("CALL_TO_ACTION", "Call to Action")
                    .with_placeholder("e.g., \"Check it out now!\", \"What do you think?\""),
                TemplateVariable::new("HASHTAGS", "Example Hashtags")
                    .with_placeholder("e.g., #AI, #NewFeature, #Tech"),
            ],
        ),
        builtin(
            "summarize-document",
            "Document Summarizer",
            "Summarize a piece of text.",
            "Productivity",
            "Provide a summary of the following text in the form of [SUMMARY_TYPE]:\n\n[DOCUMENT_TEXT]",
            vec![
                TemplateVariable::new("SUMMARY_TYPE", "Type of Summary").with_placeholder(
                    "e.g., key bullet points, a short paragraph, an executive summary",
                ),
                TemplateVariable::new("DOCUMENT_TEXT", "Document Text")
                    .with_placeholder("Paste the text you want to summarize here.")
                    .multi_line(),
            ],
        ),
    ]
}

pub fn is_builtin(id: &str) -> bool {
    builtin_templates().iter().any(|t| t.id == id)
}
