#[derive(thiserror::Error, Debug)]
#[non_exhaustive]
pub enum Error {
    #[error("line header is {len} bytes, expected 28")]
    MalformedLineHeader { len: usize },

    #[error("corrected frame decoded to counter {actual}, expected {expected}")]
    CodecInvariantViolation { expected: u32, actual: u32 },

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, Error>;
