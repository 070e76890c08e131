// Error handling macros
// Provides macros for simplified error handling

/// Return early with an error if a condition is not satisfied
#[macro_export]
macro_rules! ensure {
    ($cond:expr, $error:expr) => {
        if !($cond) {
            return Err(::core::convert::Into::into($error));
        }
    };
}

/// Bail early with an error
#[macro_export]
macro_rules! bail {
    ($error:expr) => {
        return Err(::core::convert::Into::into($error))
    };
}

#[cfg(test)]
mod tests {
    use crate::SerializationError;

    fn check_positive(value: i64) -> Result<i64, SerializationError> {
        crate::ensure!(value > 0, SerializationError::internal("value must be positive"));
        Ok(value)
    }

    fn always_empty() -> Result<(), SerializationError> {
        crate::bail!(SerializationError::EmptyBatch);
    }

    #[test]
    fn test_ensure_and_bail() {
        assert_eq!(check_positive(3), Ok(3));
        assert!(matches!(check_positive(-1), Err(SerializationError::Internal(_))));
        assert_eq!(always_empty(), Err(SerializationError::EmptyBatch));
    }
}
