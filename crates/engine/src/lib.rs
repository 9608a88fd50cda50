//! Media-buy orchestration: ties targeting access control, format
//! resolution and creative validation together and drives the ad-server
//! collaborator.

pub mod adserver;
pub mod media_buy;

pub use adserver::{AdServerClient, AppliedOrder, MockAdServer, OrderSpec, SlotRef};
pub use media_buy::{BrokerEngine, CreateMediaBuyRequest, PackageRequest};
