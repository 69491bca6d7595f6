// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

pub mod amount;
pub mod currency;
pub mod feeds;
pub mod ids;
pub mod model;
pub mod ports;
pub mod routes;
pub mod store;

pub use amount::*;
pub use currency::Currency;
pub use feeds::*;
pub use ids::*;
pub use model::*;
pub use ports::*;
pub use routes::*;
