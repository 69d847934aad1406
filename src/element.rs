pub mod interp;
pub mod mesh;
pub mod quadrature;
pub mod rod;
pub mod rotation;
pub mod slerp;
