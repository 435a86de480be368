// [libs/domain/pipeline/src/phases/mod.rs]
pub mod p1_passive_recon;
pub mod p2_active_recon;
pub mod p3_endpoint_intel;
pub mod p4_verification;
pub mod p5_planning;
pub mod p6_reporting;
pub mod safety_net;
