use crate::error::{MosaicError, Result};
use log::debug;
use std::ffi::OsString;
use std::io::ErrorKind;
use std::process::Command;

/// Run an external GDAL program to completion.
///
/// A missing binary is `ToolNotFound`; a non-zero exit is `ToolFailed`
/// carrying the program's stderr.
pub fn run_tool(program: &str, args: &[OsString]) -> Result<()> {
    debug!("Running {} {:?}", program, args);

    let output = match Command::new(program).args(args).output() {
        Ok(output) => output,
        Err(e) if e.kind() == ErrorKind::NotFound => {
            return Err(MosaicError::ToolNotFound {
                tool: program.to_string(),
            })
        }
        Err(e) => return Err(e.into()),
    };

    if output.status.success() {
        Ok(())
    } else {
        let stderr = String::from_utf8_lossy(&output.stderr).trim().to_string();
        let stderr = if stderr.is_empty() {
            format!("exited with {}", output.status)
        } else {
            stderr
        };
        Err(MosaicError::ToolFailed {
            tool: program.to_string(),
            stderr,
        })
    }
}

/// Try each program name in order, moving on only while the binary is missing
pub fn run_first_available(programs: &[String], args: &[OsString]) -> Result<()> {
    let mut last_missing = None;
    for program in programs {
        match run_tool(program, args) {
            Err(MosaicError::ToolNotFound { tool }) => {
                debug!("{} not found, trying next candidate", tool);
                last_missing = Some(tool);
            }
            other => return other,
        }
    }
    Err(MosaicError::ToolNotFound {
        tool: last_missing.unwrap_or_else(|| "<none>".to_string()),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_tool() {
        let result = run_tool("vrt-mosaic-no-such-binary", &[]);
        assert!(matches!(result, Err(MosaicError::ToolNotFound { tool }) if tool == "vrt-mosaic-no-such-binary"));
    }

    #[test]
    fn test_all_candidates_missing() {
        let programs = vec!["no-such-a".to_string(), "no-such-b".to_string()];
        let result = run_first_available(&programs, &[]);
        assert!(matches!(result, Err(MosaicError::ToolNotFound { tool }) if tool == "no-such-b"));
    }

    #[cfg(unix)]
    #[test]
    fn test_failing_tool_reports_failure() {
        let result = run_tool("false", &[]);
        assert!(matches!(result, Err(MosaicError::ToolFailed { .. })));
    }

    #[cfg(unix)]
    #[test]
    fn test_fallback_stops_at_first_present() {
        let programs = vec!["no-such-a".to_string(), "true".to_string()];
        assert!(run_first_available(&programs, &[]).is_ok());
    }
}
