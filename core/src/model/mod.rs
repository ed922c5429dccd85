pub mod range;
pub mod record;
