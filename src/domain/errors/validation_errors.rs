use thiserror::Error;

/// Validation errors for domain value objects and declared resource configuration
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    // BucketName validation errors
    #[error("Bucket name too short: {actual} characters (min: {min})")]
    BucketNameTooShort { actual: usize, min: usize },

    #[error("Bucket name too long: {actual} characters (max: {max})")]
    BucketNameTooLong { actual: usize, max: usize },

    #[error("Bucket name must start with lowercase letter or number")]
    BucketNameInvalidStart,

    #[error("Bucket name must end with lowercase letter or number")]
    BucketNameInvalidEnd,

    #[error(
        "Invalid character in bucket name: '{0}'. Only lowercase letters, numbers, and hyphens allowed"
    )]
    BucketNameInvalidCharacter(char),

    // RuleId validation errors
    #[error("Lifecycle rule ID cannot be empty")]
    EmptyRuleId,

    #[error("Lifecycle rule ID too long: {actual} characters (max: {max})")]
    RuleIdTooLong { actual: usize, max: usize },

    #[error("Lifecycle rule has no ID; it must be created before it can be updated")]
    MissingRuleId,

    // Lifecycle block validation errors
    #[error("Invalid date for '{field}': '{value}' (expected YYYY-MM-DD)")]
    InvalidDate { field: String, value: String },

    #[error("Invalid storage class: '{0}' (expected one of Standard, IA, Archive)")]
    InvalidStorageClass(String),

    #[error("'{field}' cannot be negative: {value}")]
    NegativeDays { field: String, value: i64 },

    #[error("At most {max} '{block}' block(s) allowed, got {count}")]
    TooManyBlocks {
        block: String,
        count: usize,
        max: usize,
    },

    #[error("Invalid value for field '{field}': '{value}' (expected: {expected})")]
    InvalidField {
        field: String,
        value: String,
        expected: String,
    },
}
