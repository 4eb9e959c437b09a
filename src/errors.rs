error_chain! {
    errors {
        DimensionMismatch(s: String) {
            description("Dimension mismatch")
            display("Dimension mismatch: {}", s)
        }
        InvalidArgument(s: String) {
            description("Invalid argument")
            display("Invalid argument: {}", s)
        }
        ComputationFailed(s: String) {
            description("Computation failed")
            display("Computation failed: {}", s)
        }
        IndexError(s: &'static str) {
            description("Index error")
            display("Index error: {}", s)
        }
    }
}

impl Error {
    /// True for errors a caller could have avoided by passing valid arguments (shape mismatches
    /// and malformed flags), as opposed to numerical failures.
    pub fn is_invalid_argument(&self) -> bool {
        match *self.kind() {
            ErrorKind::DimensionMismatch(_) | ErrorKind::InvalidArgument(_) => true,
            _ => false,
        }
    }
}
