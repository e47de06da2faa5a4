/// Returned when a reader runs out of bits or meets a value it can't decode
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SerdeErr;

impl std::fmt::Display for SerdeErr {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Failed to deserialize: input is truncated or malformed")
    }
}

impl std::error::Error for SerdeErr {}
