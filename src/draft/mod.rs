// Draft domain logic: pick records, snake-order turn math, budgets, and the
// accept-pick protocol.

pub mod budget;
pub mod engine;
pub mod order;
pub mod pick;
