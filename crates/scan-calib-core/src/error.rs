/// Errors returned by the geometry, filter and color operations.
///
/// None of these are fatal: each is a normal outcome the caller acts on
/// (wait for the next capture, ask for a new selection, report upstream).
#[derive(thiserror::Error, Debug, Clone, PartialEq)]
pub enum GeometryError {
    #[error("insufficient points: got {got}, need at least {required}")]
    InsufficientPoints { got: usize, required: usize },
    #[error(
        "degenerate geometry: eigenvalues {min_eigenvalue:.3e}, {mid_eigenvalue:.3e}, \
         {max_eigenvalue:.3e}"
    )]
    DegenerateGeometry {
        min_eigenvalue: f64,
        mid_eigenvalue: f64,
        max_eigenvalue: f64,
    },
    #[error("no matching points ({context})")]
    NoMatchFound { context: &'static str },
    #[error("rotation is not orthonormal with det = +1 (det={det:.6})")]
    NonRigidTransform { det: f64 },
}
