pub mod email;
pub mod response;
