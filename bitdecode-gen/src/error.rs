use std::io;

use thiserror::Error;

/// Generator error variants.
#[derive(Debug, Error)]
pub enum Error {
    /// The pattern algebra or tree construction rejected the input.
    #[error(transparent)]
    Pattern(#[from] bitdecode_pattern::Error),

    /// A user-supplied struct definition used the reserved name.
    #[error("the struct name `{0}` is reserved for internal use")]
    ReservedName(String),

    /// A pattern referenced a struct that was never defined.
    #[error("pattern `{pattern}` maps to unknown struct `{name}`")]
    UnknownStruct {
        /// The undefined struct name.
        name: String,
        /// The referencing pattern string.
        pattern: String,
    },

    /// A pattern referenced an operation that was never defined.
    #[error("pattern `{pattern}` references unknown operation `{name}`")]
    UnknownOperation {
        /// The undefined operation name.
        name: String,
        /// The referencing pattern string.
        pattern: String,
    },

    /// A `call` or `eval` action expression could not be parsed.
    #[error("malformed action expression: {0}")]
    ActionSyntax(String),

    /// A `call` action named a function missing from `deffun`.
    #[error("call to unknown function `{0}`")]
    UnknownFunction(String),

    /// The input document was not valid YAML for the expected schema.
    #[error("malformed input document: {0}")]
    InputDoc(#[from] serde_yaml::Error),

    /// The template engine collaborator reported a failure.
    #[error("template engine failed: {0}")]
    Render(String),

    /// Writing to the output sink failed.
    #[error(transparent)]
    Io(#[from] io::Error),
}
