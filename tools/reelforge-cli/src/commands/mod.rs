pub mod info;
pub mod init;
pub mod render;
pub mod retarget;
pub mod validate;
