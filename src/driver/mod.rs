pub mod android;
pub mod traits;

#[cfg(test)]
pub mod testing;
