use std::fmt;

/// Outcome of one check
#[derive(Debug, Clone, PartialEq)]
pub enum CheckStatus {
    /// Check passed
    Ok,
    /// Input is usable but suspicious
    Warning(String),
    /// Input must be fixed
    Failed(String),
}

impl CheckStatus {
    fn tone(&self) -> Tone {
        match self {
            CheckStatus::Ok => Tone::Good,
            CheckStatus::Warning(_) => Tone::Caution,
            CheckStatus::Failed(_) => Tone::Bad,
        }
    }
}

/// A named check and its outcome
#[derive(Debug, Clone, PartialEq)]
pub struct ValidationCheck {
    /// What was checked
    pub name: String,
    /// Outcome
    pub status: CheckStatus,
}

impl ValidationCheck {
    pub(crate) fn ok(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            status: CheckStatus::Ok,
        }
    }

    pub(crate) fn warning(name: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            status: CheckStatus::Warning(message.into()),
        }
    }

    pub(crate) fn failed(name: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            status: CheckStatus::Failed(message.into()),
        }
    }
}

/// All checks run against one workbook
#[derive(Debug, Clone)]
pub struct ValidationReport {
    /// Checks in the order they ran
    pub checks: Vec<ValidationCheck>,
    /// Workbook that was validated
    pub source: String,
}

#[derive(Debug, Clone, Copy)]
enum Tone {
    Title,
    Strong,
    Good,
    Caution,
    Bad,
}

impl ValidationReport {
    /// Empty report for a workbook
    pub fn new(source: impl Into<String>) -> Self {
        Self {
            checks: Vec::new(),
            source: source.into(),
        }
    }

    /// Record a check
    pub fn add_check(&mut self, check: ValidationCheck) {
        self.checks.push(check);
    }

    fn count(&self, pred: impl Fn(&CheckStatus) -> bool) -> usize {
        self.checks.iter().filter(|c| pred(&c.status)).count()
    }

    /// Any check failed
    pub fn has_failures(&self) -> bool {
        self.failure_count() > 0
    }

    /// Any check warned
    pub fn has_warnings(&self) -> bool {
        self.warning_count() > 0
    }

    /// Number of passed checks
    pub fn success_count(&self) -> usize {
        self.count(|s| matches!(s, CheckStatus::Ok))
    }

    /// Number of warnings
    pub fn warning_count(&self) -> usize {
        self.count(|s| matches!(s, CheckStatus::Warning(_)))
    }

    /// Number of failures
    pub fn failure_count(&self) -> usize {
        self.count(|s| matches!(s, CheckStatus::Failed(_)))
    }

    /// Messages of all failed checks, in check order
    pub fn failure_messages(&self) -> Vec<String> {
        self.checks
            .iter()
            .filter_map(|c| match &c.status {
                CheckStatus::Failed(msg) => Some(msg.clone()),
                _ => None,
            })
            .collect()
    }

    /// Render the report with terminal colours (plain text without the
    /// `colorized_output` feature)
    pub fn format_colored(&self) -> String {
        #[cfg(feature = "colorized_output")]
        {
            use console::style;
            self.render(|tone, text| {
                let styled = style(text);
                match tone {
                    Tone::Title => styled.bold().cyan(),
                    Tone::Strong => styled.bold(),
                    Tone::Good => styled.green(),
                    Tone::Caution => styled.yellow(),
                    Tone::Bad => styled.red(),
                }
                .to_string()
            })
        }

        #[cfg(not(feature = "colorized_output"))]
        {
            self.to_string()
        }
    }

    fn render(&self, paint: impl Fn(Tone, &str) -> String) -> String {
        let mut out = String::new();
        let title = "Input Workbook Validation Report";
        out.push_str(&paint(Tone::Title, title));
        out.push('\n');
        out.push_str(&paint(Tone::Title, &"=".repeat(title.len())));
        out.push('\n');
        out.push_str(&format!("{}: {}\n\n", paint(Tone::Strong, "Workbook"), self.source));

        for check in &self.checks {
            let (symbol, detail) = match &check.status {
                CheckStatus::Ok => ("✓", None),
                CheckStatus::Warning(msg) => ("⚠", Some(("WARNING", msg))),
                CheckStatus::Failed(msg) => ("✗", Some(("FAILED", msg))),
            };
            let tone = check.status.tone();
            out.push_str(&format!("[{}] {}", paint(tone, symbol), paint(tone, &check.name)));
            if let Some((label, msg)) = detail {
                out.push_str(&format!(" - {}: {}", paint(tone, label), msg));
            }
            out.push('\n');
        }

        out.push_str(&format!(
            "\n{}: {} passed, {} warnings, {} failed\n\n",
            paint(Tone::Strong, "Summary"),
            paint(Tone::Good, &self.success_count().to_string()),
            paint(Tone::Caution, &self.warning_count().to_string()),
            paint(Tone::Bad, &self.failure_count().to_string()),
        ));

        let verdict = if self.has_failures() {
            paint(Tone::Bad, "Validation FAILED")
        } else if self.has_warnings() {
            paint(Tone::Caution, "Validation PASSED with warnings")
        } else {
            paint(Tone::Good, "Validation PASSED")
        };
        out.push_str(&verdict);
        out.push('\n');
        out
    }
}

impl fmt::Display for ValidationReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.render(|_, text| text.to_string()))
    }
}
