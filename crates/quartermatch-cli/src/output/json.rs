use quartermatch_core::error::QuartermatchError;
use serde::Serialize;

pub fn print<T: Serialize>(value: &T) -> Result<(), QuartermatchError> {
    let json = serde_json::to_string_pretty(value)?;
    println!("{json}");
    Ok(())
}
