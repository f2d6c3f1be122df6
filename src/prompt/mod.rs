pub mod assembler;
pub mod inputs;


pub use assembler::{assemble_prompt, render_task};
pub use inputs::{FORMAT_OPTIONS, PromptInputs, STYLE_OPTIONS, TONE_OPTIONS};
