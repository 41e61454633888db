/// Errors that can occur while loading the gamelist table.
#[derive(Debug, thiserror::Error)]
pub enum GamelistError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),
}
