//! Port traits abstracting all I/O away from the pipeline.

use camino::Utf8Path;
use importfix_solution::Solution;

/// Source of the initial solution snapshot.
pub trait SolutionSource {
    fn load_solution(&self) -> anyhow::Result<Solution>;
}

/// File-system write operations.
pub trait WritePort {
    fn write_file(&self, path: &Utf8Path, contents: &[u8]) -> anyhow::Result<()>;
}
