//! Answer generation and output cleanup.

use std::sync::Arc;

use docsqa_core::AppResult;
use docsqa_providers::GenerationClient;
use regex::Regex;

use crate::types::GeneratedAnswer;

const SYSTEM_PROMPT: &str = "\
You are a helpful documentation assistant for a software development team.

Your role:
- Answer questions using ONLY the provided source documents
- Cite sources using [1], [2], [3] notation after each claim (these numbers match the sources in the context)
- Be precise and accurate
- If information is not in the sources, say \"Não encontrei informação suficiente nas fontes que me foram indexadas como contexto\".
- Keep answers concise but complete
- Always cite ALL sources that support your answer

Important rules:
- Never make up information
- Always cite your sources using [1], [2], [3], etc
- Use the exact citation numbers from the context
- Cite multiple sources if they all support the same point";

/// Builds the prompts, invokes the LLM once, and cleans the output.
pub struct AnswerGenerator {
    client: Arc<dyn GenerationClient>,
}

impl AnswerGenerator {
    pub fn new(client: Arc<dyn GenerationClient>) -> Self {
        Self { client }
    }

    /// Generate a cited answer for `question` from `context`.
    ///
    /// Provider errors propagate as fatal; retries live at the provider
    /// boundary, not here.
    pub async fn generate(&self, question: &str, context: &str) -> AppResult<GeneratedAnswer> {
        let user_prompt = build_user_prompt(question, context);

        let generation = self.client.generate(SYSTEM_PROMPT, &user_prompt).await?;
        let text = clean_answer(&generation.text);
        let token_count = text.split_whitespace().count() as u32;

        tracing::debug!(
            "Generated answer in {} ms ({} words)",
            generation.latency_ms,
            token_count
        );

        Ok(GeneratedAnswer {
            text,
            generation_time_ms: generation.latency_ms,
            token_count,
        })
    }
}

/// Embed context and question, with a hint of the highest citation label
/// actually present in the context. A mismatch between this count and the
/// evidence passed to the context builder would surface here.
fn build_user_prompt(question: &str, context: &str) -> String {
    let label_re = Regex::new(r"(?m)^\[(\d+)\]").expect("static regex");
    let max_source = label_re
        .captures_iter(context)
        .filter_map(|cap| cap[1].parse::<u32>().ok())
        .max()
        .unwrap_or(0);

    format!(
        "Based on the following sources, answer the question.\n\n{}\n\nQuestion: {}\n\nAnswer (remember to cite sources with [1], [2], [3], etc - you have {} sources available):",
        context, question, max_source
    )
}

/// Normalize LLM output formatting.
///
/// Strips decorative horizontal rules, stray empty quote markers and an
/// orphaned trailing code fence, trims trailing whitespace per line,
/// ensures a blank line before headers, and collapses runs of 3+ blank
/// lines to 2.
fn clean_answer(text: &str) -> String {
    let mut lines: Vec<String> = text
        .lines()
        .map(|line| line.trim_end().to_string())
        .filter(|line| !is_horizontal_rule(line) && line.trim() != ">")
        .collect();

    // A lone unmatched fence is always an artifact; drop the last one.
    let fence_count = lines.iter().filter(|line| is_code_fence(line)).count();
    if fence_count % 2 == 1 {
        if let Some(pos) = lines.iter().rposition(|line| is_code_fence(line)) {
            lines.remove(pos);
        }
    }

    let mut cleaned: Vec<String> = Vec::with_capacity(lines.len());
    let mut blank_run = 0;
    for line in lines {
        if line.is_empty() {
            blank_run += 1;
            if blank_run > 2 {
                continue;
            }
        } else {
            if line.starts_with('#') && blank_run == 0 && !cleaned.is_empty() {
                cleaned.push(String::new());
            }
            blank_run = 0;
        }
        cleaned.push(line);
    }

    cleaned.join("\n").trim().to_string()
}

fn is_horizontal_rule(line: &str) -> bool {
    let trimmed = line.trim();
    trimmed.len() >= 3
        && (trimmed.chars().all(|c| c == '-')
            || trimmed.chars().all(|c| c == '*')
            || trimmed.chars().all(|c| c == '_'))
}

fn is_code_fence(line: &str) -> bool {
    line.trim_start().starts_with("```")
}
