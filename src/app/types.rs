//! Application types for CLI commands.

/// Output from CLI command execution.
///
/// Represents the final output ready for display, including the exit
/// code and the text to print to stdout.
///
/// # Example
///
/// ```
/// use blog_query::app::CommandOutput;
///
/// let output = CommandOutput::success("No posts yet\n");
/// assert_eq!(output.exit_code, 0);
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandOutput {
    /// Process exit code: 0 on success, 1 when the command failed.
    pub exit_code: i32,
    /// Rendered output for stdout.
    pub stdout:    String
}

impl CommandOutput {
    pub fn success(stdout: impl Into<String>) -> Self {
        Self {
            exit_code: 0,
            stdout:    stdout.into()
        }
    }

    pub fn failure(stdout: impl Into<String>) -> Self {
        Self {
            exit_code: 1,
            stdout:    stdout.into()
        }
    }
}
