//! Runtime options for graphs and dumps

/// Options every graph created by a [`crate::File`] carries
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct GraphOptions {
    /// Run the verifier after each structural operation and log violations
    pub check_invariants: bool,
}

impl GraphOptions {
    /// Environment variable read by [`GraphOptions::from_env`]
    pub const ENV_CHECK_INVARIANTS: &'static str = "IRKIT_CHECK_INVARIANTS";

    /// Build options from the process environment
    ///
    /// `IRKIT_CHECK_INVARIANTS` set to `1`, `true`, `yes` or `on` enables invariant checks.
    pub fn from_env() -> Self {
        let check_invariants = std::env::var(Self::ENV_CHECK_INVARIANTS)
            .map(|value| parse_flag(&value))
            .unwrap_or(false);
        Self { check_invariants }
    }

    /// Enable or disable invariant checks
    pub fn with_invariant_checks(mut self, enabled: bool) -> Self {
        self.check_invariants = enabled;
        self
    }
}

fn parse_flag(value: &str) -> bool {
    matches!(
        value.trim().to_ascii_lowercase().as_str(),
        "1" | "true" | "yes" | "on"
    )
}

/// Options for the text dump
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DumpOptions {
    /// Append the user list of each instruction
    pub show_users: bool,
    /// Print the result type of each instruction
    pub show_types: bool,
}

impl Default for DumpOptions {
    fn default() -> Self {
        Self {
            show_users: false,
            show_types: true,
        }
    }
}
