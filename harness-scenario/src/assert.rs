//! Step assertions.
//!
//! Each helper returns `Ok(())` or a [`ScenarioError::Assertion`] carrying
//! rendered expected and actual outcomes, so a step body can chain them
//! with `?`.

use crate::error::{ScenarioError, ScenarioResult};
use harness_sdk::SdkResult;
use std::fmt::Debug;

/// `actual == expected`.
///
/// # Errors
///
/// `ScenarioError::Assertion` when the values differ.
pub fn expect_eq<T>(context: &str, expected: T, actual: T) -> ScenarioResult<()>
where
    T: PartialEq + Debug,
{
    if actual == expected {
        Ok(())
    } else {
        Err(ScenarioError::assertion(
            context,
            format!("{expected:?}"),
            format!("{actual:?}"),
        ))
    }
}

/// `condition` holds.
///
/// # Errors
///
/// `ScenarioError::Assertion` when it does not.
pub fn expect_true(context: &str, condition: bool) -> ScenarioResult<()> {
    if condition {
        Ok(())
    } else {
        Err(ScenarioError::assertion(context, "true", "false"))
    }
}

/// `outcome` is a contract revert whose message contains `needle`.
///
/// # Errors
///
/// `ScenarioError::Assertion` when the call succeeded or failed for
/// another reason.
pub fn expect_revert<T: Debug>(
    context: &str,
    outcome: SdkResult<T>,
    needle: &str,
) -> ScenarioResult<()> {
    let expected = format!("revert containing {needle:?}");
    match outcome {
        Err(err) if err.is_revert_containing(needle) => Ok(()),
        Err(err) => Err(ScenarioError::assertion(context, expected, err.to_string())),
        Ok(value) => Err(ScenarioError::assertion(
            context,
            expected,
            format!("success with {value:?}"),
        )),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use harness_sdk::SdkError;

    #[test]
    fn eq_reports_both_sides() {
        assert!(expect_eq("balance", 1u64, 1u64).is_ok());
        let err = expect_eq("balance of OWNER", 1u64, 0u64).unwrap_err();
        assert_eq!(err.to_string(), "balance of OWNER: expected 1, got 0");
    }

    #[test]
    fn true_fails_on_false() {
        assert!(expect_true("approved", true).is_ok());
        assert!(matches!(
            expect_true("approved", false),
            Err(ScenarioError::Assertion { .. })
        ));
    }

    #[test]
    fn revert_needs_matching_message() {
        let reverted: SdkResult<()> = Err(SdkError::call("mint", "Already minted"));
        assert!(expect_revert("second mint", reverted, "Already minted").is_ok());

        let other: SdkResult<()> = Err(SdkError::call("mint", "Only owner can mint"));
        let err = expect_revert("second mint", other, "Already minted").unwrap_err();
        assert!(err.to_string().contains("Only owner can mint"));

        let err = expect_revert("second mint", Ok(3u64), "Already minted").unwrap_err();
        assert!(err.to_string().contains("success with 3"));
    }
}
