//! Internal distance units
//!
//! Scene coordinates use an internal unit where one meter is `1e-9` units,
//! which keeps both planetary surfaces and intergalactic distances inside
//! comfortable `f64` range.

/// Meters to internal units
pub const M_TO_U: f64 = 1e-9;
/// Kilometers to internal units
pub const KM_TO_U: f64 = M_TO_U * 1000.0;
/// Parsecs to internal units
pub const PC_TO_U: f64 = 3.085_677_581_491_367e13 * KM_TO_U;
/// Kiloparsecs to internal units
pub const KPC_TO_U: f64 = PC_TO_U * 1000.0;
/// Megaparsecs to internal units
pub const MPC_TO_U: f64 = KPC_TO_U * 1000.0;
