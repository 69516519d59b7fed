//! Result type alias for OptiMed

use super::errors::OptimedError;

/// Result type alias for OptiMed operations
///
/// # Examples
///
/// ```
/// use optimed::domain::result::Result;
/// use optimed::domain::errors::OptimedError;
///
/// fn failing_function() -> Result<()> {
///     Err(OptimedError::Validation("Invalid input".to_string()))
/// }
///
/// assert!(failing_function().is_err());
/// ```
pub type Result<T> = std::result::Result<T, OptimedError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_result_with_question_mark() -> Result<()> {
        fn inner() -> Result<i32> {
            Ok(42)
        }

        let value = inner()?;
        assert_eq!(value, 42);
        Ok(())
    }
}
