pub mod anim;
pub mod buffer;
pub mod dot;
