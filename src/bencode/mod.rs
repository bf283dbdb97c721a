pub mod compact;
pub mod encoder;
pub mod response;
#[cfg(test)]
pub mod testing;
