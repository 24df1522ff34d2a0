pub mod addr;
pub mod error;
pub mod net;
pub mod sim;
pub mod term;
pub mod topo;
pub mod viz;

#[cfg(test)]
mod test;
