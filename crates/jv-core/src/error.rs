use thiserror::Error;

pub type JvResult<T> = Result<T, JvError>;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum JvError {
    #[error("Non-finite numeric value for {what}: {value}")]
    NonFinite { what: &'static str, value: f64 },
}
