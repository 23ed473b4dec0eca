//! Agent roles and the messages the pipeline sends them

use crate::analysis::CodeStructure;
use crate::corpus::ExamplePair;

pub const DOC_AGENT_NAME: &str = "doc_generation_agent";
pub const QUALITY_AGENT_NAME: &str = "quality_check_agent";

pub const DOC_AGENT_SYSTEM_MESSAGE: &str = "You are a Python documentation writer. \
Given Python code, its structure, a draft docstring and reference examples, \
write a comprehensive and accurate docstring for the code. \
Reply with the docstring text only.";

pub const QUALITY_AGENT_SYSTEM_MESSAGE: &str = "You are a code documentation quality checker. \
Given Python code and a generated docstring, evaluate the docstring for accuracy, completeness, and clarity. \
Suggest improvements if necessary, otherwise reply 'Docstring is good.'";

const EXAMPLES_HEADER: &str =
    "Here are some examples of good code-docstring pairs to use as reference:\n\n";

const REFINEMENT_INSTRUCTION: &str = "Based on the code structure, transformer output, and examples, generate a comprehensive and accurate docstring.";

/// Numbered examples block, empty when there are no examples
pub fn format_examples(examples: &[ExamplePair]) -> String {
    if examples.is_empty() {
        return String::new();
    }
    let mut block = String::from(EXAMPLES_HEADER);
    for (i, example) in examples.iter().enumerate() {
        block.push_str(&format!(
            "Example {}:\nCode:\n{}\nDocstring:\n{}\n\n",
            i + 1,
            example.code,
            example.docstring
        ));
    }
    block
}

pub fn build_refinement_prompt(
    code: &str,
    structure: &CodeStructure,
    draft: &str,
    examples: &[ExamplePair],
) -> String {
    format!(
        "Code to document:\n```python\n{code}\n```\n\n\
         Code structure (from AST analysis):\n```json\n{structure}\n```\n\n\
         {draft}\n\n\
         {examples}\
         {instruction}\n",
        code = code,
        structure = structure.to_pretty_json(),
        draft = draft,
        examples = format_examples(examples),
        instruction = REFINEMENT_INSTRUCTION,
    )
}

pub fn build_quality_message(code: &str, structure: &CodeStructure, docstring: &str) -> String {
    format!(
        "Code:\n{}\nCode structure:\n{}\nDocstring:\n{}",
        code,
        structure.to_pretty_json(),
        docstring
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::analyze;

    #[test]
    fn test_examples_block() {
        let block = format_examples(&[
            ExamplePair::new("x = 1", "Sets x."),
            ExamplePair::new("y = 2", "Sets y."),
        ]);
        assert!(block.starts_with(EXAMPLES_HEADER));
        assert!(block.contains("Example 1:\nCode:\nx = 1\nDocstring:\nSets x.\n\n"));
        assert!(block.contains("Example 2:\nCode:\ny = 2\nDocstring:\nSets y.\n\n"));
        assert!(format_examples(&[]).is_empty());
    }

    #[test]
    fn test_refinement_prompt_sections() {
        let code = "def f(a, b):\n    return a + b";
        let structure = analyze(code);
        let prompt = build_refinement_prompt(
            code,
            &structure,
            "Initial docstring from transformer model:\nAdds.",
            &[ExamplePair::new("x = 1", "Sets x.")],
        );

        assert!(prompt.contains("```python\ndef f(a, b):\n    return a + b\n```"));
        assert!(prompt.contains("```json\n{\n  \"functions\""));
        assert!(prompt.contains("Initial docstring from transformer model:\nAdds."));
        assert!(prompt.contains("Example 1:"));
        assert!(prompt.trim_end().ends_with(REFINEMENT_INSTRUCTION));
    }

    #[test]
    fn test_refinement_prompt_without_examples() {
        let structure = analyze("x = 1");
        let prompt = build_refinement_prompt("x = 1", &structure, "draft", &[]);
        assert!(!prompt.contains("Here are some examples"));
        assert!(prompt.contains("draft\n\nBased on the code structure"));
    }

    #[test]
    fn test_quality_message_layout() {
        let structure = analyze("x = 1");
        let message = build_quality_message("x = 1", &structure, "Sets x.");
        assert!(message.starts_with("Code:\nx = 1\nCode structure:\n{"));
        assert!(message.ends_with("}\nDocstring:\nSets x."));
    }
}
