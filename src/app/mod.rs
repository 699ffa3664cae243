//! Application core: actuator state, message routing and the menu state
//! machine.
//!
//! Nothing in here touches hardware. Every peripheral is reached through
//! the **port traits** in [`ports`], so the whole layer runs under
//! `cargo test` on the host with recording mocks.

pub mod actuator;
pub mod controller;
pub mod messages;
pub mod ports;
pub mod ui;
