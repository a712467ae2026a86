// Feedback prompt templates.
// Backends wrap the rendered prompt in whatever framing their wire format needs.

pub const FEEDBACK_PROMPT_TEMPLATE: &str =
    "Analyze this resume and provide improvement suggestions:\n\n{resume_text}";

/// Framing required by the Claude text-completions API on Bedrock.
pub const HUMAN_TURN: &str = "\n\nHuman:";
pub const ASSISTANT_TURN: &str = "\n\nAssistant:";

pub fn render_feedback_prompt(resume_text: &str) -> String {
    FEEDBACK_PROMPT_TEMPLATE.replace("{resume_text}", resume_text)
}

pub fn frame_completion_prompt(prompt: &str) -> String {
    format!("{HUMAN_TURN}{prompt}{ASSISTANT_TURN}")
}
