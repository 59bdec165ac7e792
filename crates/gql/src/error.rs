use thiserror::Error;

pub type GenResult<T> = Result<T, GenError>;

/// Errors raised while turning SDL into generated SDK sources.
#[derive(Error, Debug)]
pub enum GenError {
    /// The SDL text could not be parsed.
    #[error("Failed to parse SDL: {0}")]
    Parse(String),

    /// Two type definitions share a name.
    #[error("Type `{0}` is defined more than once")]
    DuplicateType(String),

    /// The model dependency graph is not a DAG.
    #[error("Dependency cycle between models: {}", models.join(" -> "))]
    Cycle {
        /// Models taking part in the cycle, in declaration order.
        models: Vec<String>,
    },

    /// Two root operations map to the same client method name.
    #[error("Operations collide on client method `{0}`")]
    MethodCollision(String),

    /// A template failed to load or render.
    #[error("Template error: {0}")]
    Template(#[from] minijinja::Error),

    /// Writing generated output failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}
