pub mod fitted;
pub mod gbdt;
pub mod linear;

pub mod factory;
pub mod regressor_trait;
