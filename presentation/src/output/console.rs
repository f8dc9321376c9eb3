//! Console output formatter for tool catalogs and execution results

use colored::Colorize;
use geotools_domain::{
    BatchReport, ControlMode, ExecutionResult, ExecutionStatus, ParameterRole, RegisteredTool,
    ToolDescriptor,
};
use serde::Serialize;
use std::sync::Arc;

/// Formats catalogs and results for console display
pub struct ConsoleFormatter;

impl ConsoleFormatter {
    /// Tools grouped under their group key, in registry order.
    pub fn format_tool_list(tools: &[Arc<RegisteredTool>]) -> String {
        if tools.is_empty() {
            return format!("{}\n", "No tools registered.".dimmed());
        }

        let width = tools.iter().map(|t| t.id().len()).max().unwrap_or(0);
        let mut output = String::new();
        let mut current_group: Option<&str> = None;

        for tool in tools {
            let group = tool.descriptor.group.as_str();
            if current_group != Some(group) {
                if current_group.is_some() {
                    output.push('\n');
                }
                let title = if group.is_empty() { "(ungrouped)" } else { group };
                output.push_str(&format!("{}\n", title.cyan().bold()));
                current_group = Some(group);
            }
            output.push_str(&format!(
                "  {:<width$}  {}\n",
                tool.id().yellow(),
                tool.descriptor.name,
                width = width
            ));
        }

        output
    }

    /// Parameter table of one tool.
    pub fn format_description(descriptor: &ToolDescriptor, mode: ControlMode) -> String {
        let mut output = String::new();

        output.push_str(&Self::header(&descriptor.name));
        output.push('\n');
        output.push_str(&format!("{} {}\n", "Id:".cyan().bold(), descriptor.id));
        if !descriptor.group.is_empty() {
            output.push_str(&format!("{} {}\n", "Group:".cyan().bold(), descriptor.group));
        }
        if !descriptor.description.is_empty() {
            output.push_str(&format!("\n{}\n", descriptor.description));
        }

        let title = match mode {
            ControlMode::Single => "Parameters",
            ControlMode::Batch => "Parameters (batch mode)",
        };
        output.push_str(&Self::section_header(title));

        for param in descriptor.describe(mode) {
            let role = match param.role {
                ParameterRole::Input => "required".red().to_string(),
                ParameterRole::OptionalInput => "optional".dimmed().to_string(),
                ParameterRole::Output => "output".green().to_string(),
            };
            output.push_str(&format!(
                "\n{} {} [{}] {}\n",
                param.name.yellow().bold(),
                format!("({})", param.display_name).dimmed(),
                param.kind,
                role
            ));
            if let Some(default) = &param.default_value {
                output.push_str(&format!("    default:     {}\n", default));
            }
            if param
                .constraints
                .as_object()
                .is_some_and(|c| !c.is_empty())
            {
                output.push_str(&format!("    constraints: {}\n", param.constraints));
            }
            output.push_str(&format!("    control:     {}\n", param.control));
        }

        output
    }

    /// One execution result (single mode).
    pub fn format_result(result: &ExecutionResult) -> String {
        let mut output = format!(
            "{} {}{}\n",
            Self::status_badge(result.status),
            result.tool_id.bold(),
            Self::duration(result)
        );
        output.push_str(&Self::result_details(result));
        output
    }

    /// Per-item lines followed by the summary.
    pub fn format_report(report: &BatchReport) -> String {
        let mut output = String::new();
        output.push_str(&Self::section_header(&format!("Batch: {}", report.tool_id)));

        for result in &report.results {
            let index = result.item_index.map(|i| i + 1).unwrap_or_default();
            output.push_str(&format!(
                "\n{} {:>3}. {}{}\n",
                Self::status_badge(result.status),
                index,
                result.input_name.as_deref().unwrap_or("-"),
                Self::duration(result)
            ));
            output.push_str(&Self::result_details(result));
        }

        let summary = report.summary.to_string();
        let summary = if report.all_succeeded() {
            summary.green().bold()
        } else {
            summary.yellow().bold()
        };
        output.push_str(&format!("\n{} {}\n", "Summary:".cyan().bold(), summary));
        if report.cancelled {
            output.push_str(&format!("{}\n", "Batch cancelled; remaining items skipped.".yellow()));
        } else if report.halted {
            output.push_str(&format!("{}\n", "Batch halted after a failure.".yellow()));
        }

        output
    }

    /// Format as JSON
    pub fn format_json<T: Serialize>(value: &T) -> String {
        serde_json::to_string_pretty(value).unwrap_or_else(|_| "{}".to_string())
    }

    fn result_details(result: &ExecutionResult) -> String {
        let mut output = String::new();
        for produced in &result.outputs {
            let count = produced
                .feature_count
                .map(|n| format!(" ({} features)", n))
                .unwrap_or_default();
            output.push_str(&format!(
                "      {} {} -> {}{}\n",
                "output".dimmed(),
                produced.parameter,
                produced.pointer,
                count
            ));
        }
        if let Some(error) = &result.error {
            let parameter = error
                .parameter
                .as_deref()
                .map(|p| format!(" [{}]", p))
                .unwrap_or_default();
            output.push_str(&format!(
                "      {}{} {}\n",
                format!("{} error", error.kind).red(),
                parameter,
                error.message
            ));
        }
        output
    }

    fn status_badge(status: ExecutionStatus) -> String {
        match status {
            ExecutionStatus::Succeeded => "[ ok ]".green().bold().to_string(),
            ExecutionStatus::Failed => "[fail]".red().bold().to_string(),
            ExecutionStatus::Skipped => "[skip]".dimmed().to_string(),
        }
    }

    fn duration(result: &ExecutionResult) -> String {
        result
            .duration_ms
            .map(|ms| format!(" {}", format!("{}ms", ms).dimmed()))
            .unwrap_or_default()
    }

    fn header(title: &str) -> String {
        let line = "=".repeat(60);
        format!("{}\n{:^60}\n{}", line.cyan(), title.bold(), line.cyan())
    }

    fn section_header(title: &str) -> String {
        format!("\n{}\n{}\n", title.cyan().bold(), "-".repeat(40))
    }
}
