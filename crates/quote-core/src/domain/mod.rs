//! 시세 스냅샷을 위한 도메인 모델.

mod asset;
mod universe;

pub use asset::*;
pub use universe::*;
