use anyhow::{Context, Result};
use serde::Serialize;
use std::fmt;

use lipidconv::job::ConversionOutcome;

#[cfg(feature = "colorized_output")]
use console::style;

/// What the convert command reports.
#[derive(Debug, Serialize)]
pub struct Summary {
    #[serde(flatten)]
    pub outcome: ConversionOutcome,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub polarity_switched: Option<bool>,
}

impl Summary {
    fn polarity_label(&self) -> &'static str {
        match self.polarity_switched {
            Some(true) => "switching",
            Some(false) => "single",
            None => "not probed",
        }
    }

    /// Format the summary with colors (requires console feature)
    pub fn format_colored(&self) -> String {
        #[cfg(feature = "colorized_output")]
        {
            let mut output = String::new();
            output.push_str(&format!("{}\n", style("Conversion complete").bold().green()));
            output.push_str(&format!("{}\n", style("===================").green()));
            output.push_str(&format!(
                "{}: {}\n",
                style("Output").bold(),
                self.outcome.output.display()
            ));
            output.push_str(&format!(
                "{}: {}\n",
                style("Levels").bold(),
                style(self.outcome.level_count).cyan()
            ));
            output.push_str(&format!(
                "{}: {}\n",
                style("Invocations").bold(),
                style(self.outcome.invocations).cyan()
            ));
            let merged = if self.outcome.merged {
                style("yes").green()
            } else {
                style("no").yellow()
            };
            output.push_str(&format!("{}: {}\n", style("Merged").bold(), merged));
            output.push_str(&format!(
                "{}: {}\n",
                style("Polarity").bold(),
                self.polarity_label()
            ));
            output
        }

        #[cfg(not(feature = "colorized_output"))]
        {
            format!("{}", self)
        }
    }
}

impl fmt::Display for Summary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Conversion complete")?;
        writeln!(f, "===================")?;
        writeln!(f, "Output: {}", self.outcome.output.display())?;
        writeln!(f, "Levels: {}", self.outcome.level_count)?;
        writeln!(f, "Invocations: {}", self.outcome.invocations)?;
        writeln!(f, "Merged: {}", if self.outcome.merged { "yes" } else { "no" })?;
        writeln!(f, "Polarity: {}", self.polarity_label())
    }
}

pub fn print_summary(summary: &Summary, json: bool) -> Result<()> {
    if json {
        let text = serde_json::to_string_pretty(summary).context("Failed to serialize summary")?;
        println!("{}", text);
    } else {
        print!("{}", summary.format_colored());
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use std::path::PathBuf;

    fn summary(polarity_switched: Option<bool>) -> Summary {
        Summary {
            outcome: ConversionOutcome {
                output: PathBuf::from("out/run.mzXML"),
                level_count: 3,
                invocations: 3,
                merged: true,
                finished_at: Utc::now(),
            },
            polarity_switched,
        }
    }

    #[test]
    fn test_plain_summary() {
        let text = summary(Some(true)).to_string();
        assert!(text.contains("Levels: 3"));
        assert!(text.contains("Merged: yes"));
        assert!(text.contains("Polarity: switching"));
    }

    #[test]
    fn test_json_summary_is_flat() {
        let value = serde_json::to_value(summary(None)).unwrap();
        assert_eq!(value["level_count"], 3);
        assert_eq!(value["merged"], true);
        assert!(value.get("polarity_switched").is_none());
        assert!(value.get("finished_at").is_some());
    }
}
