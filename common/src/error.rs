use crate::Point;

/// Failures raised by the knowledge base.
///
/// `OutOfBounds` is a caller mistake and leaves the knowledge base untouched.
/// Every other variant means the accumulated knowledge is inconsistent; the
/// knowledge base that produced it refuses further updates.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum KnowledgeError {
    #[error("cell {point} is outside the {height}x{width} board")]
    OutOfBounds {
        point: Point,
        height: usize,
        width: usize,
    },
    #[error("constraint claims {count} mines among {cells} cells")]
    CountExceedsCells { count: usize, cells: usize },
    #[error("constraint count {count} cannot drop by {removed}")]
    CountUnderflow { count: usize, removed: usize },
    #[error("cell {point} was concluded to be both a mine and safe")]
    Contradiction { point: Point },
    #[error("knowledge base is compromised by an earlier inconsistency")]
    Compromised,
}
