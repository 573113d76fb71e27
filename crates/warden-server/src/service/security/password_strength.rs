//! Optional password strength policy based on zxcvbn.

use serde::{Deserialize, Serialize};
use zxcvbn::feedback::Feedback;
use zxcvbn::zxcvbn;

use crate::utility::tracing_targets::TRACING_TARGET_PASSWORD_STRENGTH as TRACING_TARGET;
use crate::{Error, Result};

/// Highest score zxcvbn reports.
pub const MAX_PASSWORD_SCORE: u8 = 4;

/// Password strength policy.
///
/// A minimum score of `0` disables the check.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PasswordStrength {
    min_score: u8,
}

/// Outcome of a strength evaluation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PasswordStrengthResult {
    /// Score from 0 (weakest) to 4 (strongest).
    pub score: u8,
    /// Estimated guesses needed to crack the password.
    pub guesses: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub warning: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub suggestions: Vec<String>,
}

impl PasswordStrength {
    /// Creates a policy that rejects scores below `min_score`.
    ///
    /// Scores above [`MAX_PASSWORD_SCORE`] are clamped.
    #[inline]
    pub const fn with_min_score(min_score: u8) -> Self {
        let min_score = if min_score > MAX_PASSWORD_SCORE {
            MAX_PASSWORD_SCORE
        } else {
            min_score
        };
        Self { min_score }
    }

    /// Returns the configured minimum score.
    #[inline]
    pub const fn min_score(&self) -> u8 {
        self.min_score
    }

    /// Returns whether the policy rejects anything at all.
    #[inline]
    pub const fn is_enabled(&self) -> bool {
        self.min_score > 0
    }

    /// Scores a password. `user_inputs` are penalized when they appear in it.
    pub fn evaluate(&self, password: &str, user_inputs: &[&str]) -> PasswordStrengthResult {
        let entropy = zxcvbn(password, user_inputs);
        let (warning, suggestions) = entropy
            .feedback()
            .map(split_feedback)
            .unwrap_or_default();

        PasswordStrengthResult {
            score: entropy.score().into(),
            guesses: entropy.guesses(),
            warning,
            suggestions,
        }
    }

    /// Rejects the password with [`ErrorKind::Validation`] if it scores
    /// below the minimum.
    ///
    /// [`ErrorKind::Validation`]: crate::ErrorKind::Validation
    pub fn validate_password(&self, password: &str, user_inputs: &[&str]) -> Result<()> {
        if !self.is_enabled() {
            return Ok(());
        }

        let result = self.evaluate(password, user_inputs);
        if result.score >= self.min_score {
            return Ok(());
        }

        tracing::debug!(
            target: TRACING_TARGET,
            score = result.score,
            min_score = self.min_score,
            "Password rejected as too weak"
        );

        let mut message = format!(
            "password is too weak (score {} of {}, minimum {})",
            result.score, MAX_PASSWORD_SCORE, self.min_score
        );
        if let Some(warning) = result.warning {
            message.push_str(": ");
            message.push_str(&warning);
        }

        Err(Error::validation(message))
    }
}

fn split_feedback(feedback: &Feedback) -> (Option<String>, Vec<String>) {
    let warning = feedback.warning().map(|w| w.to_string());
    let suggestions = feedback
        .suggestions()
        .iter()
        .map(|s| s.to_string())
        .collect();
    (warning, suggestions)
}
