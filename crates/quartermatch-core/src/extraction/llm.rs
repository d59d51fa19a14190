use std::io::{self, Write};
use std::process::{Command, Stdio};
use std::thread;

use indexmap::IndexMap;
use rust_decimal::Decimal;
use serde_json::{Map, Value};

use crate::error::QuartermatchError;
use crate::extraction::{Document, MetricSource};
use crate::model::{MetricExtractionResult, QuarterValues, RawValue};
use crate::parsing::fuzzy::LabelMatcher;

/// A text completion backend.
pub trait LanguageModel {
    fn complete(&self, prompt: &str) -> Result<String, QuartermatchError>;

    /// Name of the model or command (for diagnostics).
    fn model_name(&self) -> &str;
}

/// Runs an external command, writing the prompt to its stdin and reading
/// the completion from its stdout.
pub struct CommandModel {
    command_line: String,
    program: String,
    args: Vec<String>,
}

impl CommandModel {
    /// Build from a whitespace-separated command line, e.g. `llm -m gpt-4o-mini`.
    pub fn parse(command_line: &str) -> Result<Self, QuartermatchError> {
        let mut parts = command_line.split_whitespace().map(str::to_string);
        let program = parts
            .next()
            .ok_or_else(|| QuartermatchError::Llm("empty LLM command".into()))?;
        Ok(CommandModel {
            command_line: command_line.trim().to_string(),
            program,
            args: parts.collect(),
        })
    }
}

impl LanguageModel for CommandModel {
    fn complete(&self, prompt: &str) -> Result<String, QuartermatchError> {
        let mut child = Command::new(&self.program)
            .args(&self.args)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(|e| QuartermatchError::Llm(format!("failed to start '{}': {}", self.program, e)))?;

        // stdin is fed from its own thread while stdout and stderr drain,
        // so a child that writes before reading all input cannot block us.
        let output = thread::scope(|scope| -> Result<_, QuartermatchError> {
            let writer = child
                .stdin
                .take()
                .map(|mut stdin| scope.spawn(move || stdin.write_all(prompt.as_bytes())));

            let output = child.wait_with_output()?;

            if let Some(writer) = writer {
                match writer.join() {
                    Ok(Ok(())) => {}
                    // the child exited without reading all of the prompt
                    Ok(Err(e)) if e.kind() == io::ErrorKind::BrokenPipe => {}
                    Ok(Err(e)) => return Err(e.into()),
                    Err(_) => {
                        return Err(QuartermatchError::Llm("prompt writer thread panicked".into()))
                    }
                }
            }
            Ok(output)
        })?;

        if !output.status.success() {
            return Err(QuartermatchError::Llm(format!(
                "'{}' exited with code {}: {}",
                self.command_line,
                output.status.code().unwrap_or(-1),
                String::from_utf8_lossy(&output.stderr).trim()
            )));
        }

        Ok(String::from_utf8_lossy(&output.stdout).to_string())
    }

    fn model_name(&self) -> &str {
        &self.command_line
    }
}

/// Extraction strategy that asks a language model for the metric values.
pub struct LlmExtractor<M> {
    model: M,
    metrics: Vec<String>,
    quarters: Vec<String>,
    matcher: LabelMatcher,
}

impl<M: LanguageModel> LlmExtractor<M> {
    pub fn new(model: M, metrics: Vec<String>, quarters: Vec<String>, matcher: LabelMatcher) -> Self {
        LlmExtractor {
            model,
            metrics,
            quarters,
            matcher,
        }
    }

    pub fn prompt(&self, content: &str) -> String {
        build_prompt(&self.metrics, &self.quarters, content)
    }
}

impl<M: LanguageModel> MetricSource for LlmExtractor<M> {
    fn extract(&self, document: &Document) -> Result<MetricExtractionResult, QuartermatchError> {
        let prompt = self.prompt(&document.plain_text());
        tracing::debug!(
            model = self.model.model_name(),
            source = document.kind(),
            prompt_chars = prompt.len(),
            "requesting completion"
        );
        let response = self.model.complete(&prompt)?;
        parse_response(&response, &self.metrics, &self.quarters, &self.matcher)
    }

    fn strategy_name(&self) -> &str {
        "llm"
    }
}

/// Prompt asking for one JSON object keyed by quarter, then metric.
pub fn build_prompt(metrics: &[String], quarters: &[String], content: &str) -> String {
    let mut prompt = String::new();
    prompt.push_str("Given the following content extracted from a PDF/Excel file, ");
    prompt.push_str(&format!(
        "your job is to extract the following metrics for {}:\n",
        quarters.join(" and ")
    ));
    for metric in metrics {
        prompt.push_str(&format!("- {metric}\n"));
    }
    prompt.push_str(
        "\nAnswer with a single JSON object and nothing else. Its keys are the quarter labels \
         exactly as written above; each value is an object mapping every metric name exactly as \
         written above to its numeric value as it appears in the content.\n",
    );
    prompt.push_str("\nContent: ");
    prompt.push_str(content);
    prompt.push('\n');
    prompt
}

/// Map a model response onto the metric registry.
///
/// The first balanced `{ ... }` object of the response is parsed, so code
/// fences and surrounding prose are tolerated. Quarter keys must match exactly; metric
/// keys are matched exactly or else by label similarity. Metrics with no
/// value in any quarter are absent from the result.
pub fn parse_response(
    response: &str,
    metrics: &[String],
    quarters: &[String],
    matcher: &LabelMatcher,
) -> Result<MetricExtractionResult, QuartermatchError> {
    let json = json_object_span(response)
        .ok_or_else(|| QuartermatchError::Llm("response contains no JSON object".into()))?;
    let root: Map<String, Value> = serde_json::from_str(json)
        .map_err(|e| QuartermatchError::Llm(format!("response is not a JSON object: {e}")))?;

    let mut result: IndexMap<String, QuarterValues> = IndexMap::new();
    for metric in metrics {
        let mut values = QuarterValues::new();
        for quarter in quarters {
            let Some(Value::Object(by_metric)) = root.get(quarter) else {
                continue;
            };
            if let Some(value) = lookup_metric(by_metric, metric, matcher).and_then(to_raw_value) {
                values.insert(quarter.clone(), value);
            }
        }
        if values.is_empty() {
            tracing::warn!(metric = %metric, "metric missing from model response");
        } else {
            result.insert(metric.clone(), values);
        }
    }

    Ok(MetricExtractionResult::new(result))
}

/// The object opening at the first `{`, up to its matching `}`. Braces
/// inside JSON strings are not counted.
fn json_object_span(response: &str) -> Option<&str> {
    let start = response.find('{')?;
    let mut depth = 0usize;
    let mut in_string = false;
    let mut escaped = false;

    for (offset, c) in response[start..].char_indices() {
        if in_string {
            match c {
                _ if escaped => escaped = false,
                '\\' => escaped = true,
                '"' => in_string = false,
                _ => {}
            }
            continue;
        }
        match c {
            '"' => in_string = true,
            '{' => depth += 1,
            '}' => {
                depth -= 1;
                if depth == 0 {
                    return Some(&response[start..=start + offset]);
                }
            }
            _ => {}
        }
    }
    None
}

fn lookup_metric<'a>(
    by_metric: &'a Map<String, Value>,
    metric: &str,
    matcher: &LabelMatcher,
) -> Option<&'a Value> {
    if let Some(value) = by_metric.get(metric) {
        return Some(value);
    }
    by_metric
        .iter()
        .filter_map(|(key, value)| matcher.score(key, metric).map(|s| (s, value)))
        .fold(None, |best: Option<(u8, &Value)>, (score, value)| match best {
            Some((best_score, _)) if best_score >= score => best,
            _ => Some((score, value)),
        })
        .map(|(_, value)| value)
}

fn to_raw_value(value: &Value) -> Option<RawValue> {
    match value {
        Value::Number(n) => n.to_string().parse::<Decimal>().ok().map(RawValue::Number),
        Value::String(s) if !s.trim().is_empty() => Some(RawValue::Text(s.clone())),
        _ => None,
    }
}
