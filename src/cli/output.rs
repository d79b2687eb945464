//! Rendering for `contech-config`.

use crate::config::DriverConfig;
use crate::mode::Mode;

/// Result of one installation check.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CheckStatus {
    pub passed: bool,
    pub message: String,
    pub details: Option<String>,
}

impl CheckStatus {
    pub fn passed(message: impl Into<String>) -> Self {
        Self {
            passed: true,
            message: message.into(),
            details: None,
        }
    }

    pub fn failed(message: impl Into<String>) -> Self {
        Self {
            passed: false,
            message: message.into(),
            details: None,
        }
    }

    pub fn with_details(mut self, details: impl Into<String>) -> Self {
        self.details = Some(details.into());
        self
    }
}

/// Renders the configuration, with the resolved mode when there is one.
pub fn format_config(config: &DriverConfig, mode: Option<&Mode>) -> String {
    let mut output = config.to_string();
    if let Some(mode) = mode {
        output.push_str(&format!("  Runtime: {}\n", describe_runtime(config, mode)));
        output.push_str(&format!("  Embeds State: {}\n", mode.embeds_state()));
    }
    output
}

fn describe_runtime(config: &DriverConfig, mode: &Mode) -> String {
    match mode.runtime(config).artifact() {
        Some(path) => path.display().to_string(),
        None => "none".to_string(),
    }
}

/// Renders check results in the order they ran.
pub fn format_checks(results: &[(String, CheckStatus)]) -> String {
    let mut output = String::new();

    output.push_str("Installation Check\n");
    output.push_str(&"\u{2501}".repeat(42));
    output.push_str("\n\n");

    for (name, status) in results {
        let symbol = if status.passed { "\u{2713}" } else { "\u{2717}" };
        output.push_str(&format!("{} {}\n", symbol, name));
        output.push_str(&format!("  Message: {}\n", status.message));
        if let Some(ref details) = status.details {
            output.push_str(&format!("  Details: {}\n", details));
        }
        output.push('\n');
    }

    let failed = results.iter().filter(|(_, s)| !s.passed).count();
    if failed == 0 {
        output.push_str("All checks passed\n");
    } else {
        output.push_str(&format!("{} of {} checks failed\n", failed, results.len()));
    }

    output
}
