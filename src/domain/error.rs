//! Domain error types.

/// A parse error with position information for rule parsing.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
#[error("parse error at position {position}: {message}")]
pub struct ParseError {
    pub message: String,
    pub position: usize,
}

impl ParseError {
    /// Format the error with a caret pointing at the error position in the input.
    pub fn display_with_context(&self, input: &str) -> String {
        let caret = " ".repeat(self.position) + "^";
        format!(
            "{input}\n{caret}\n{err}",
            input = input,
            caret = caret,
            err = self
        )
    }
}

/// Top-level error type for sniperscan.
///
/// The first group is per-ticker and is always converted into an
/// `EvaluationResult::Failure`; the config group is fatal at startup.
#[derive(Debug, thiserror::Error)]
pub enum ScanError {
    #[error("insufficient data: have {bars} bars, need {minimum}")]
    InsufficientData { bars: usize, minimum: usize },

    #[error("bars are not strictly ordered by date")]
    UnorderedBars,

    #[error("low liquidity: average volume {average_volume:.0} below floor {floor:.0}")]
    LowLiquidity { average_volume: f64, floor: f64 },

    #[error("undefined volatility: ATR is zero, negative or missing")]
    UndefinedVolatility,

    #[error("provider error: {reason}")]
    Provider { reason: String },

    #[error("fetch timed out after {seconds}s")]
    Timeout { seconds: u64 },

    #[error("config parse error in {file}: {reason}")]
    ConfigParse { file: String, reason: String },

    #[error("missing config key [{section}] {key}")]
    ConfigMissing { section: String, key: String },

    #[error("invalid config value [{section}] {key}: {reason}")]
    ConfigInvalid {
        section: String,
        key: String,
        reason: String,
    },

    #[error(transparent)]
    RuleParse(#[from] ParseError),

    #[error("invalid rule: {reason}")]
    RuleInvalid { reason: String },

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl From<&ScanError> for std::process::ExitCode {
    fn from(err: &ScanError) -> Self {
        let code: u8 = match err {
            ScanError::Io(_) => 1,
            ScanError::ConfigParse { .. }
            | ScanError::ConfigMissing { .. }
            | ScanError::ConfigInvalid { .. } => 2,
            ScanError::RuleParse(_) | ScanError::RuleInvalid { .. } => 4,
            ScanError::InsufficientData { .. }
            | ScanError::UnorderedBars
            | ScanError::LowLiquidity { .. }
            | ScanError::UndefinedVolatility
            | ScanError::Provider { .. }
            | ScanError::Timeout { .. } => 5,
        };
        std::process::ExitCode::from(code)
    }
}
