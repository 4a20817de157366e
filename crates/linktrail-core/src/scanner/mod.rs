pub mod blocks;
pub mod noise;
pub mod patterns;
