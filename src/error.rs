use thiserror::Error;

/// Top-level error type for the morphing engine.
#[derive(Debug, Error)]
pub enum MorphError {
    #[error("malformed shape: {0}")]
    MalformedShape(#[from] ShapeError),

    #[error("invalid options: {0}")]
    InvalidOptions(#[from] OptionsError),

    #[error("internal inconsistency: {0}")]
    InternalInconsistency(#[from] InternalError),
}

/// Errors describing path input the engine refuses to work with.
#[derive(Debug, Error)]
pub enum ShapeError {
    #[error("syntax error at byte {offset}: {message}")]
    Syntax { offset: usize, message: String },

    #[error("contour {contour}, segment {segment}: non-finite coordinate")]
    NonFinite { contour: usize, segment: usize },

    #[error("contour {contour}, segment {segment}: starts {gap} away from the previous end")]
    Discontinuous {
        contour: usize,
        segment: usize,
        gap: f64,
    },
}

/// Errors related to caller-supplied configuration.
#[derive(Debug, Error)]
pub enum OptionsError {
    #[error("{name} must be finite and positive, got {value}")]
    NotPositive { name: &'static str, value: f64 },

    #[error("{name} must be at least {min}, got {value}")]
    TooSmall {
        name: &'static str,
        value: usize,
        min: usize,
    },

    #[error("{name} must be at most {max}, got {value}")]
    TooLarge {
        name: &'static str,
        value: usize,
        max: usize,
    },

    #[error("accuracy needs more than {limit} points for one contour")]
    TooFine { limit: usize },
}

/// Invariant violations inside the engine. Seeing one of these is a bug.
#[derive(Debug, Error)]
pub enum InternalError {
    #[error("cannot align polygons of {left} and {right} points")]
    CountMismatch { left: usize, right: usize },

    #[error("contour pairing left {0} contour(s) unassigned")]
    UnpairedContours(usize),
}

/// Convenience type alias for results using [`MorphError`].
pub type Result<T> = std::result::Result<T, MorphError>;
