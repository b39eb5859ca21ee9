pub mod filters;
pub mod submissions;
