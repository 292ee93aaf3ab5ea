pub mod math;
#[cfg(test)]
mod tests;
